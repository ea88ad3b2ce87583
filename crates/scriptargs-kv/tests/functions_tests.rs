//! End-to-end tests of the key-value functions called through a function table

use pretty_assertions::assert_eq;
use rstest::rstest;
use scriptargs_config::Config;
use scriptargs_kv::{KvModule, MemoryConnector};
use scriptargs_runtime::{failure, nothing, FunctionTable, Handle, ReaderConfig, Value};
use std::sync::Arc;

fn setup() -> (KvModule, FunctionTable) {
    let module = KvModule::in_memory(&Config::default());
    let mut table = FunctionTable::new();
    module.register_functions(&mut table).unwrap();
    (module, table)
}

fn call(table: &FunctionTable, name: &str, args: Vec<Value>) -> Vec<Value> {
    table.call(name, args).unwrap()
}

fn connect(table: &FunctionTable) -> Value {
    let mut returns = call(table, "createRedisClient", vec![Value::string("localhost"), Value::Number(6379.0)]);
    assert_eq!(returns.len(), 1);
    returns.remove(0)
}

// ============================================================================
// createRedisClient
// ============================================================================

#[test]
fn test_create_and_ping() {
    let (module, table) = setup();
    let connection = connect(&table);

    assert!(matches!(connection, Value::LightUserData(_)));
    assert_eq!(module.open_connections(), 1);
    assert_eq!(call(&table, "redisClientPing", vec![connection]), vec![Value::string("PONG")]);
}

#[rstest]
#[case::missing_port(vec![Value::string("localhost")])]
#[case::bool_host(vec![Value::Bool(true), Value::Number(6379.0)])]
#[case::negative_port(vec![Value::string("localhost"), Value::Number(-1.0)])]
#[case::port_too_large(vec![Value::string("localhost"), Value::Number(65536.0)])]
fn test_create_rejects_bad_arguments(#[case] args: Vec<Value>) {
    let (module, table) = setup();
    assert_eq!(call(&table, "createRedisClient", args), failure());
    assert_eq!(module.open_connections(), 0);
}

#[test]
fn test_unparseable_port_follows_reader_policy() {
    let args = || vec![Value::string("localhost"), Value::string("redis")];

    let (_module, table) = setup();
    assert!(matches!(call(&table, "createRedisClient", args()).as_slice(), [Value::LightUserData(_)]));

    let mut config = Config::default();
    config.reader = ReaderConfig::strict();
    let module = KvModule::in_memory(&config);
    let mut table = FunctionTable::new();
    module.register_functions(&mut table).unwrap();
    assert_eq!(call(&table, "createRedisClient", args()), failure());
}

fn trailing_checked_table() -> (KvModule, FunctionTable) {
    let mut config = Config::default();
    config.reader.check_trailing = true;
    let module = KvModule::in_memory(&config);
    let mut table = FunctionTable::new();
    module.register_functions(&mut table).unwrap();
    (module, table)
}

#[test]
fn test_trailing_arguments_are_ignored_by_default() {
    let (module, table) = setup();
    let extra = vec![Value::string("localhost"), Value::Number(6379.0), Value::Nil];
    let connection = match call(&table, "createRedisClient", extra).as_slice() {
        [connection @ Value::LightUserData(_)] => connection.clone(),
        other => panic!("unexpected returns {:?}", other),
    };
    assert_eq!(module.open_connections(), 1);

    assert_eq!(
        call(
            &table,
            "redisClientSet",
            vec![connection.clone(), Value::string("k"), Value::string("v"), Value::Nil]
        ),
        vec![Value::Bool(true)]
    );
    assert_eq!(
        call(&table, "redisClientGet", vec![connection, Value::string("k"), Value::Number(1.0)]),
        vec![Value::string("v")]
    );
}

#[test]
fn test_trailing_arguments_rejected_when_checked() {
    let (module, table) = trailing_checked_table();
    assert_eq!(
        call(&table, "createRedisClient", vec![Value::string("localhost"), Value::Number(6379.0), Value::Nil]),
        failure()
    );
    assert_eq!(module.open_connections(), 0);

    let connection = connect(&table);
    assert_eq!(
        call(&table, "redisClientSet", vec![connection.clone(), Value::string("k"), Value::string("v")]),
        vec![Value::Bool(true)]
    );
    assert_eq!(
        call(
            &table,
            "redisClientSet",
            vec![connection, Value::string("k"), Value::string("v"), Value::Nil]
        ),
        failure()
    );
}

#[test]
fn test_create_reports_connect_failure() {
    let module = KvModule::new(&Config::default(), Arc::new(MemoryConnector::refusing(1, "Connection refused")));
    let mut table = FunctionTable::new();
    module.register_functions(&mut table).unwrap();

    assert_eq!(
        call(&table, "createRedisClient", vec![Value::string("10.0.0.1"), Value::Number(6379.0)]),
        vec![Value::Nil, Value::Number(1.0), Value::string("Connection refused")]
    );
    assert_eq!(module.open_connections(), 0);
}

// ============================================================================
// Handle validation
// ============================================================================

#[rstest]
#[case::ping("redisClientPing", vec![])]
#[case::command("redisClientCommand", vec![Value::string("PING")])]
#[case::set("redisClientSet", vec![Value::string("k"), Value::string("v")])]
#[case::get("redisClientGet", vec![Value::string("k")])]
#[case::destroy("redisClientDestroy", vec![])]
fn test_functions_reject_foreign_handles(#[case] name: &str, #[case] rest: Vec<Value>) {
    let (_module, table) = setup();

    for handle in [
        Value::Nil,
        Value::Number(1.0),
        Value::string("connection"),
        Value::LightUserData(Handle::new(42_u32)),
        Value::UserData(Handle::new("not a connection")),
    ] {
        let mut args = vec![handle];
        args.extend(rest.iter().cloned());
        assert_eq!(call(&table, name, args), failure(), "{}", name);
    }
}

// ============================================================================
// Set / Get / Command
// ============================================================================

#[test]
fn test_set_then_get() {
    let (_module, table) = setup();
    let connection = connect(&table);

    assert_eq!(
        call(&table, "redisClientSet", vec![connection.clone(), Value::string("greeting"), Value::string("hi")]),
        vec![Value::Bool(true)]
    );
    assert_eq!(
        call(&table, "redisClientGet", vec![connection.clone(), Value::string("greeting")]),
        vec![Value::string("hi")]
    );
    assert_eq!(
        call(&table, "redisClientGet", vec![connection, Value::string("missing")]),
        vec![Value::Nil]
    );
}

#[test]
fn test_set_coerces_numbers_to_text() {
    let (_module, table) = setup();
    let connection = connect(&table);

    assert_eq!(
        call(&table, "redisClientSet", vec![connection.clone(), Value::Number(7.0), Value::Number(0.5)]),
        vec![Value::Bool(true)]
    );
    assert_eq!(
        call(&table, "redisClientGet", vec![connection, Value::string("7")]),
        vec![Value::string("0.5")]
    );
}

#[test]
fn test_set_rejects_table_value() {
    let (_module, table) = setup();
    let connection = connect(&table);

    assert_eq!(
        call(&table, "redisClientSet", vec![connection, Value::string("k"), Value::sequence(vec![])]),
        failure()
    );
}

#[test]
fn test_get_of_list_reports_nothing() {
    let (_module, table) = setup();
    let connection = connect(&table);

    call(&table, "redisClientCommand", vec![connection.clone(), Value::string("RPUSH list a")]);
    assert_eq!(
        call(&table, "redisClientGet", vec![connection, Value::string("list")]),
        nothing()
    );
}

#[test]
fn test_command_conversions() {
    let (_module, table) = setup();
    let connection = connect(&table);
    let command = |line: &str| call(&table, "redisClientCommand", vec![connection.clone(), Value::string(line)]);

    assert_eq!(command("SET counter 41"), vec![Value::string("OK")]);
    assert_eq!(command("INCR counter"), vec![Value::Number(42.0)]);
    assert_eq!(command("GET nothing"), vec![Value::Nil]);
    assert_eq!(command("RPUSH list a b 3"), vec![Value::Number(3.0)]);

    let list = command("LRANGE list 0 -1");
    assert_eq!(
        list,
        vec![Value::sequence(vec![Value::string("a"), Value::string("b"), Value::string("3")])]
    );
}

#[test]
fn test_command_error_reply() {
    let (_module, table) = setup();
    let connection = connect(&table);

    assert_eq!(
        call(&table, "redisClientCommand", vec![connection.clone(), Value::string("FLY away")]),
        vec![Value::Nil, Value::string("ERR unknown command 'FLY'")]
    );
    assert_eq!(
        call(&table, "redisClientCommand", vec![connection, Value::string("   ")]),
        failure()
    );
}

// ============================================================================
// Destroy and lifecycle
// ============================================================================

#[test]
fn test_destroy_closes_connection() {
    let (module, table) = setup();
    let connection = connect(&table);

    assert_eq!(call(&table, "redisClientDestroy", vec![connection.clone()]), nothing());
    assert_eq!(module.open_connections(), 0);
    assert_eq!(call(&table, "redisClientPing", vec![connection.clone()]), failure());
    assert_eq!(call(&table, "redisClientDestroy", vec![connection]), nothing());
}

#[test]
fn test_shutdown_closes_everything() {
    let (module, table) = setup();
    let first = connect(&table);
    let second = connect(&table);

    assert_eq!(module.shutdown(), 2);
    assert_eq!(module.open_connections(), 0);
    assert_eq!(call(&table, "redisClientPing", vec![first]), failure());
    assert_eq!(call(&table, "redisClientPing", vec![second]), failure());
}

#[test]
fn test_connections_share_the_store() {
    let (_module, table) = setup();
    let writer = connect(&table);
    let reader = connect(&table);

    call(&table, "redisClientSet", vec![writer, Value::string("k"), Value::string("v")]);
    assert_eq!(
        call(&table, "redisClientGet", vec![reader, Value::string("k")]),
        vec![Value::string("v")]
    );
}
