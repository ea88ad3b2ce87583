//! Native functions exposed to scripts
//!
//! Every function reads its whole parameter list, checks for errors once,
//! and returns either its results or the failure signal. Argument errors are
//! logged with the function name.

use crate::client::{split_command, Connector, Reply};
use crate::connection::{Connection, ConnectionSet};
use crate::reply::{get_returns, reply_to_value};
use scriptargs_runtime::native::{failure, nothing};
use scriptargs_runtime::{ArgReader, CastRegistry, ErrorCategory, Frame, Handle, ReaderConfig, Value};
use std::sync::Arc;

pub const CREATE_CLIENT: &str = "createRedisClient";
pub const PING: &str = "redisClientPing";
pub const COMMAND: &str = "redisClientCommand";
pub const SET: &str = "redisClientSet";
pub const GET: &str = "redisClientGet";
pub const DESTROY: &str = "redisClientDestroy";

const LOG_TARGET: &str = "scriptargs::kv";

/// Everything the functions share
pub struct KvState {
    pub(crate) connector: Arc<dyn Connector>,
    pub(crate) connections: ConnectionSet,
    pub(crate) registry: CastRegistry,
    pub(crate) reader_config: ReaderConfig,
}

impl KvState {
    pub fn new(connector: Arc<dyn Connector>, registry: CastRegistry, reader_config: ReaderConfig) -> Self {
        KvState {
            connector,
            connections: ConnectionSet::new(),
            registry,
            reader_config,
        }
    }

    pub fn connections(&self) -> &ConnectionSet {
        &self.connections
    }

    fn reader<'a>(&'a self, frame: &'a Frame) -> ArgReader<'a, Frame> {
        ArgReader::with_registry(frame, &self.registry).with_config(self.reader_config)
    }
}

/// Log the reader's error and return the failure signal
fn rejected(function: &str, reader: &ArgReader<'_, Frame>) -> Vec<Value> {
    if let Some(message) = reader.full_error_message(function) {
        tracing::warn!(target: LOG_TARGET, "{}", message);
    }
    failure()
}

/// `createRedisClient(host, port)` -> connection | nil, code, message
pub fn create_client(state: &KvState, frame: &Frame) -> Vec<Value> {
    let mut reader = state.reader(frame);
    let host = reader.read_string();
    let port: i64 = reader.read_number();

    let port = match u16::try_from(port) {
        Ok(port) => port,
        Err(_) => {
            reader.set_custom_error_with(format!("Invalid port {}", port), ErrorCategory::BadArgument);
            0
        }
    };

    if reader.has_errors() {
        return rejected(CREATE_CLIENT, &reader);
    }

    match state.connector.connect(&host, port) {
        Ok(client) => {
            let connection = state.connections.open(format!("{}:{}", host, port), client);
            tracing::info!(target: LOG_TARGET, id = connection.id(), endpoint = connection.endpoint(), "connected");
            vec![Value::LightUserData(Handle::from_arc(connection))]
        }
        Err(error) => {
            tracing::warn!(target: LOG_TARGET, host = %host, port, "connect failed: {}", error);
            vec![
                Value::Nil,
                Value::Number(f64::from(error.code)),
                Value::string(error.message),
            ]
        }
    }
}

/// `redisClientPing(connection)` -> status text
pub fn ping(state: &KvState, frame: &Frame) -> Vec<Value> {
    let mut reader = state.reader(frame);
    let connection = reader.read_user_data::<Connection>();

    let connection = match connection {
        Some(connection) if !reader.has_errors() => connection,
        _ => return rejected(PING, &reader),
    };

    match connection.command(&["PING".to_string()]) {
        Ok(Reply::Status(text) | Reply::String(text) | Reply::Error(text)) => vec![Value::string(text)],
        Ok(reply) => vec![reply_to_value(&reply)],
        Err(error) => {
            tracing::warn!(target: LOG_TARGET, id = connection.id(), "{} failed: {}", PING, error);
            failure()
        }
    }
}

/// `redisClientCommand(connection, command)` -> converted reply; error
/// replies give `nil, message`
pub fn command(state: &KvState, frame: &Frame) -> Vec<Value> {
    let mut reader = state.reader(frame);
    let connection = reader.read_user_data::<Connection>();
    let line = reader.read_string();

    let args = split_command(&line);
    if args.is_empty() {
        reader.set_custom_error("Empty command");
    }

    let connection = match connection {
        Some(connection) if !reader.has_errors() => connection,
        _ => return rejected(COMMAND, &reader),
    };

    tracing::debug!(target: LOG_TARGET, id = connection.id(), command = %line, "command");
    match connection.command(&args) {
        Ok(Reply::Error(message)) => vec![Value::Nil, Value::string(message)],
        Ok(reply) => vec![reply_to_value(&reply)],
        Err(error) => {
            tracing::warn!(target: LOG_TARGET, id = connection.id(), "{} failed: {}", COMMAND, error);
            failure()
        }
    }
}

/// `redisClientSet(connection, key, value)` -> true
pub fn set(state: &KvState, frame: &Frame) -> Vec<Value> {
    let mut reader = state.reader(frame);
    let connection = reader.read_user_data::<Connection>();
    let key = reader.read_string();
    let value = reader.read_string();

    let connection = match connection {
        Some(connection) if !reader.has_errors() => connection,
        _ => return rejected(SET, &reader),
    };

    match connection.command(&["SET".to_string(), key, value]) {
        Ok(Reply::Error(message)) => {
            tracing::warn!(target: LOG_TARGET, id = connection.id(), "{} failed: {}", SET, message);
            failure()
        }
        Ok(_) => vec![Value::Bool(true)],
        Err(error) => {
            tracing::warn!(target: LOG_TARGET, id = connection.id(), "{} failed: {}", SET, error);
            failure()
        }
    }
}

/// `redisClientGet(connection, key)` -> string | number | nil | table, count
pub fn get(state: &KvState, frame: &Frame) -> Vec<Value> {
    let mut reader = state.reader(frame);
    let connection = reader.read_user_data::<Connection>();
    let key = reader.read_string();

    let connection = match connection {
        Some(connection) if !reader.has_errors() => connection,
        _ => return rejected(GET, &reader),
    };

    match connection.command(&["GET".to_string(), key]) {
        Ok(reply) => get_returns(&reply),
        Err(error) => {
            tracing::warn!(target: LOG_TARGET, id = connection.id(), "{} failed: {}", GET, error);
            nothing()
        }
    }
}

/// `redisClientDestroy(connection)` -> nothing
pub fn destroy(state: &KvState, frame: &Frame) -> Vec<Value> {
    let mut reader = state.reader(frame);
    let connection = reader.read_user_data::<Connection>();

    let connection = match connection {
        Some(connection) if !reader.has_errors() => connection,
        _ => return rejected(DESTROY, &reader),
    };

    if connection.close() {
        tracing::info!(target: LOG_TARGET, id = connection.id(), "closed");
    }
    state.connections.forget(connection.id());
    nothing()
}
