//! Call frames
//!
//! A call frame is the ordered list of values a host passes to one native
//! function invocation. Positions are 1-based; any position past the end is
//! an absent slot.

use crate::value::{SlotType, ToStringHook, Value};

/// Minimal accessor surface the argument reader depends on
pub trait CallFrame {
    /// Number of values supplied by the caller
    fn len(&self) -> usize;

    /// Value at a 1-based position, `None` when absent
    fn slot(&self, position: usize) -> Option<&Value>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot_type(&self, position: usize) -> SlotType {
        self.slot(position).map_or(SlotType::None, Value::slot_type)
    }

    /// Stringify override for the value at `position`
    fn tostring_hook(&self, position: usize) -> Option<ToStringHook> {
        self.slot(position).and_then(|v| v.tostring_hook().cloned())
    }
}

/// Owned call frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    args: Vec<Value>,
}

impl Frame {
    pub fn new(args: Vec<Value>) -> Self {
        Frame { args }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: Value) {
        self.args.push(value);
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.args
    }
}

impl CallFrame for Frame {
    fn len(&self) -> usize {
        self.args.len()
    }

    fn slot(&self, position: usize) -> Option<&Value> {
        slot_at(&self.args, position)
    }
}

impl CallFrame for [Value] {
    fn len(&self) -> usize {
        <[Value]>::len(self)
    }

    fn slot(&self, position: usize) -> Option<&Value> {
        slot_at(self, position)
    }
}

fn slot_at(args: &[Value], position: usize) -> Option<&Value> {
    position.checked_sub(1).and_then(|index| args.get(index))
}

impl From<Vec<Value>> for Frame {
    fn from(args: Vec<Value>) -> Self {
        Frame::new(args)
    }
}

impl FromIterator<Value> for Frame {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Frame::new(iter.into_iter().collect())
    }
}
