//! Generic value passthrough
//!
//! For native functions that want raw values instead of coerced scalars,
//! e.g. to forward the remaining arguments somewhere else.

use crate::frame::CallFrame;
use crate::value::Value;

/// Container that can absorb values straight from a call frame
pub trait ArgumentContainer {
    /// Read values starting at `position`; returns how many slots were consumed
    fn read_from<F: CallFrame + ?Sized>(&mut self, frame: &F, position: usize) -> usize;

    /// Copy of the single value at `position`
    fn read_single<F: CallFrame + ?Sized>(frame: &F, position: usize) -> Option<Value>
    where
        Self: Sized,
    {
        frame.slot(position).cloned()
    }
}

/// Ordered list of raw argument values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.values
    }
}

impl ArgumentContainer for Arguments {
    /// Replaces the contents with every value from `position` to the end
    fn read_from<F: CallFrame + ?Sized>(&mut self, frame: &F, position: usize) -> usize {
        self.values.clear();
        let start = position.max(1);
        for index in start..=frame.len() {
            if let Some(value) = frame.slot(index) {
                self.values.push(value.clone());
            }
        }
        self.values.len()
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Arguments { values }
    }
}

impl<'a> IntoIterator for &'a Arguments {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
