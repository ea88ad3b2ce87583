//! Reply to script value conversion

use crate::client::Reply;
use scriptargs_runtime::{Value, ValueTable};

/// Single value for a reply: text for strings and status lines, numbers for
/// integers, nil for nil and error replies, a table for arrays
pub fn reply_to_value(reply: &Reply) -> Value {
    match reply {
        Reply::String(text) | Reply::Status(text) => Value::string(text.as_str()),
        Reply::Integer(n) => Value::Number(*n as f64),
        Reply::Nil | Reply::Error(_) => Value::Nil,
        Reply::Array(elements) => Value::Table(array_to_table(elements)),
    }
}

/// 1-based table. Only string and integer elements are kept; anything else
/// (nested arrays included) becomes a nil entry, i.e. no entry at all.
pub fn array_to_table(elements: &[Reply]) -> ValueTable {
    let mut table = ValueTable::new();
    for (index, element) in elements.iter().enumerate() {
        let value = match element {
            Reply::String(text) => Value::string(text.as_str()),
            Reply::Integer(n) => Value::Number(*n as f64),
            _ => continue,
        };
        table.insert(Value::Number((index + 1) as f64), value);
    }
    table
}

/// Return values of a GET: one value, `(table, count)` for arrays, nothing
/// for status and error replies
pub fn get_returns(reply: &Reply) -> Vec<Value> {
    match reply {
        Reply::String(_) | Reply::Integer(_) | Reply::Nil => vec![reply_to_value(reply)],
        Reply::Array(elements) => vec![
            Value::Table(array_to_table(elements)),
            Value::Number(elements.len() as f64),
        ],
        Reply::Status(_) | Reply::Error(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(reply_to_value(&Reply::String("v".to_string())), Value::string("v"));
        assert_eq!(reply_to_value(&Reply::Status("OK".to_string())), Value::string("OK"));
        assert_eq!(reply_to_value(&Reply::Integer(-4)), Value::Number(-4.0));
        assert_eq!(reply_to_value(&Reply::Nil), Value::Nil);
        assert_eq!(reply_to_value(&Reply::Error("ERR".to_string())), Value::Nil);
    }

    #[test]
    fn test_array_uses_each_element() {
        let table = array_to_table(&[
            Reply::String("a".to_string()),
            Reply::Array(vec![Reply::Integer(1)]),
            Reply::Integer(7),
            Reply::Nil,
            Reply::String("b".to_string()),
        ]);

        assert_eq!(table.get(&Value::Number(1.0)), Some(&Value::string("a")));
        assert_eq!(table.get(&Value::Number(2.0)), None);
        assert_eq!(table.get(&Value::Number(3.0)), Some(&Value::Number(7.0)));
        assert_eq!(table.get(&Value::Number(4.0)), None);
        assert_eq!(table.get(&Value::Number(5.0)), Some(&Value::string("b")));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_get_returns() {
        assert_eq!(get_returns(&Reply::Nil), vec![Value::Nil]);
        assert_eq!(get_returns(&Reply::Status("OK".to_string())), Vec::<Value>::new());

        let returns = get_returns(&Reply::Array(vec![Reply::String("x".to_string())]));
        assert_eq!(returns.len(), 2);
        assert_eq!(returns[1], Value::Number(1.0));
    }
}
