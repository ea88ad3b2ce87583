//! Aggregate reads

use super::ArgReader;
use crate::frame::CallFrame;
use crate::value::Value;

impl<'a, F: CallFrame + ?Sized> ArgReader<'a, F> {
    /// Numeric entries of a table, in iteration order
    pub fn read_number_table(&mut self) -> Vec<f32> {
        let mut out = Vec::new();
        self.read_number_table_into(&mut out);
        out
    }

    /// Like [`read_number_table`](Self::read_number_table), reusing `out`.
    /// Non-numeric entries are skipped.
    pub fn read_number_table_into(&mut self, out: &mut Vec<f32>) {
        out.clear();

        match self.current() {
            Some(Value::Table(table)) => {
                self.index += 1;
                out.extend(table.values().filter_map(|value| match value {
                    Value::Number(n) => Some(*n as f32),
                    _ => None,
                }));
            }
            _ => self.fail("table"),
        }
    }
}
