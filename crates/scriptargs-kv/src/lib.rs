//! Scriptargs KV - Key-value client functions for scripting hosts
//!
//! Exposes a connect/ping/command/set/get/destroy function set whose
//! arguments are marshalled with `scriptargs-runtime`:
//! - Client and connector traits with an in-memory backend
//! - Connections handed to scripts as opaque handles
//! - Reply to value conversion
//! - Module info, registration and lifecycle

pub mod client;
pub mod connection;
pub mod functions;
pub mod module;
pub mod reply;

pub use client::{ConnectError, Connector, KvClient, KvError, MemoryConnector, Reply};
pub use connection::{Connection, ConnectionSet};
pub use functions::KvState;
pub use module::{KvModule, ModuleInfo};
