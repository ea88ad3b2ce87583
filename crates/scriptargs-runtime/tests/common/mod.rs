//! Shared test utilities
//!
//! Frame construction and a couple of handle types registered in a local
//! cast registry.

#![allow(dead_code)]

use scriptargs_runtime::{CastRegistry, Frame, Handle, UserData, Value};

// Re-export testing utilities
pub use pretty_assertions::{assert_eq, assert_ne};

#[derive(Debug, PartialEq)]
pub struct Vehicle {
    pub model: u16,
}

impl UserData for Vehicle {
    const CLASS_NAME: &'static str = "vehicle";
}

#[derive(Debug, PartialEq)]
pub struct Player {
    pub name: String,
}

impl UserData for Player {
    const CLASS_NAME: &'static str = "player";
}

/// Registry knowing both test handle types
pub fn registry() -> CastRegistry {
    CastRegistry::builder()
        .register::<Vehicle>()
        .register::<Player>()
        .build()
}

pub fn frame(values: Vec<Value>) -> Frame {
    Frame::new(values)
}

pub fn vehicle(model: u16) -> Value {
    Value::UserData(Handle::new(Vehicle { model }))
}

pub fn player(name: &str) -> Value {
    Value::UserData(Handle::new(Player {
        name: name.to_string(),
    }))
}
