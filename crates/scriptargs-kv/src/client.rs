//! Key-value client abstraction
//!
//! The wire protocol lives outside this crate. A [`Connector`] hands out
//! [`KvClient`]s that execute commands and return [`Reply`] trees. The
//! in-memory backend implements the small command subset the module and its
//! tests need.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Server reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Status(String),
    Error(String),
    Integer(i64),
    Nil,
    String(String),
    Array(Vec<Reply>),
}

/// Command execution failures (as opposed to error replies)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KvError {
    #[error("connection is closed")]
    Closed,

    #[error("empty command")]
    EmptyCommand,

    #[error("I/O error: {0}")]
    Io(String),
}

/// Connection failure with the client library's error code
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} (code {code})")]
pub struct ConnectError {
    pub code: i32,
    pub message: String,
}

pub trait KvClient: Send {
    /// Execute one command, `args[0]` being the command name
    fn command(&mut self, args: &[String]) -> Result<Reply, KvError>;
}

pub trait Connector: Send + Sync {
    fn connect(&self, host: &str, port: u16) -> Result<Box<dyn KvClient>, ConnectError>;
}

/// Split a command line into arguments
pub fn split_command(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Text(String),
    List(Vec<String>),
}

type Store = Arc<Mutex<BTreeMap<String, Entry>>>;

/// In-memory backend; every client from one connector shares the same data
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    store: Store,
    refusal: Option<ConnectError>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connector whose every connect attempt fails
    pub fn refusing(code: i32, message: impl Into<String>) -> Self {
        MemoryConnector {
            store: Store::default(),
            refusal: Some(ConnectError {
                code,
                message: message.into(),
            }),
        }
    }
}

impl Connector for MemoryConnector {
    fn connect(&self, host: &str, port: u16) -> Result<Box<dyn KvClient>, ConnectError> {
        if let Some(refusal) = &self.refusal {
            return Err(refusal.clone());
        }
        tracing::debug!(target: "scriptargs::kv", host, port, "memory client connected");
        Ok(Box::new(MemoryClient {
            store: Arc::clone(&self.store),
        }))
    }
}

#[derive(Debug)]
pub struct MemoryClient {
    store: Store,
}

const WRONG_TYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

impl KvClient for MemoryClient {
    fn command(&mut self, args: &[String]) -> Result<Reply, KvError> {
        let (name, rest) = args.split_first().ok_or(KvError::EmptyCommand)?;
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        let name = name.to_ascii_uppercase();

        let reply = match (name.as_str(), rest) {
            ("PING", []) => Reply::Status("PONG".to_string()),
            ("PING", [message]) => Reply::String(message.clone()),
            ("SET", [key, value]) => {
                store.insert(key.clone(), Entry::Text(value.clone()));
                Reply::Status("OK".to_string())
            }
            ("GET", [key]) => match store.get(key) {
                Some(Entry::Text(value)) => Reply::String(value.clone()),
                Some(Entry::List(_)) => Reply::Error(WRONG_TYPE.to_string()),
                None => Reply::Nil,
            },
            ("DEL", keys) if !keys.is_empty() => {
                let removed = keys.iter().filter(|key| store.remove(*key).is_some()).count();
                Reply::Integer(removed as i64)
            }
            ("EXISTS", keys) if !keys.is_empty() => {
                let found = keys.iter().filter(|key| store.contains_key(*key)).count();
                Reply::Integer(found as i64)
            }
            ("INCR", [key]) => increment(&mut store, key),
            ("RPUSH", [key, values @ ..]) if !values.is_empty() => {
                match store.entry(key.clone()).or_insert_with(|| Entry::List(Vec::new())) {
                    Entry::List(list) => {
                        list.extend(values.iter().cloned());
                        Reply::Integer(list.len() as i64)
                    }
                    Entry::Text(_) => Reply::Error(WRONG_TYPE.to_string()),
                }
            }
            ("LRANGE", [key, start, stop]) => match (start.parse::<i64>(), stop.parse::<i64>()) {
                (Ok(start), Ok(stop)) => match store.get(key) {
                    Some(Entry::List(list)) => Reply::Array(
                        list_range(list, start, stop)
                            .iter()
                            .map(|item| Reply::String(item.clone()))
                            .collect(),
                    ),
                    Some(Entry::Text(_)) => Reply::Error(WRONG_TYPE.to_string()),
                    None => Reply::Array(Vec::new()),
                },
                _ => Reply::Error("ERR value is not an integer or out of range".to_string()),
            },
            ("KEYS", [pattern]) => Reply::Array(
                store
                    .keys()
                    .filter(|key| glob_match(pattern, key))
                    .map(|key| Reply::String(key.clone()))
                    .collect(),
            ),
            ("PING" | "SET" | "GET" | "DEL" | "EXISTS" | "INCR" | "RPUSH" | "LRANGE" | "KEYS", _) => {
                Reply::Error(format!(
                    "ERR wrong number of arguments for '{}' command",
                    name.to_ascii_lowercase()
                ))
            }
            _ => Reply::Error(format!("ERR unknown command '{}'", args[0])),
        };

        Ok(reply)
    }
}

fn increment(store: &mut BTreeMap<String, Entry>, key: &str) -> Reply {
    let current = match store.get(key) {
        None => 0,
        Some(Entry::Text(text)) => match text.parse::<i64>() {
            Ok(n) => n,
            Err(_) => return Reply::Error("ERR value is not an integer or out of range".to_string()),
        },
        Some(Entry::List(_)) => return Reply::Error(WRONG_TYPE.to_string()),
    };

    match current.checked_add(1) {
        Some(next) => {
            store.insert(key.to_string(), Entry::Text(next.to_string()));
            Reply::Integer(next)
        }
        None => Reply::Error("ERR increment or decrement would overflow".to_string()),
    }
}

/// Inclusive range with negative indices counting from the end
fn list_range(list: &[String], start: i64, stop: i64) -> &[String] {
    let len = list.len() as i64;
    let resolve = |index: i64| if index < 0 { len + index } else { index };
    let start = resolve(start).max(0);
    let stop = resolve(stop).min(len - 1);

    if start > stop || start >= len {
        return &[];
    }
    &list[start as usize..=stop as usize]
}

/// `*` and `?` wildcards
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    t = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}
