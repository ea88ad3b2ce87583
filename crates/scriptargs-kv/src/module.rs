//! Module lifecycle: info, registration, pulse and shutdown

use crate::client::{Connector, MemoryConnector};
use crate::connection::Connection;
use crate::functions::{self, KvState};
use scriptargs_config::Config;
use scriptargs_runtime::{
    BuildError, CastRegistry, Frame, FunctionTable, NativeFunctionBuilder, RegistryError, Value,
};
use std::sync::Arc;

/// Name reported when the configuration has no `[module]` section
pub const DEFAULT_NAME: &str = "ml_redis";

/// What the module reports to the host on initialisation
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleInfo {
    pub name: String,
    pub author: String,
    pub version: String,
}

impl ModuleInfo {
    pub fn from_config(config: &Config) -> Self {
        let name = match &config.module.module {
            Some(section) => section.name.clone(),
            None => DEFAULT_NAME.to_string(),
        };

        ModuleInfo {
            name,
            author: config.module_author().to_string(),
            version: config.module_version().to_string(),
        }
    }

    /// Version as the host's float, 0.0 when it does not parse
    pub fn version_number(&self) -> f32 {
        self.version.parse().unwrap_or(0.0)
    }
}

pub struct KvModule {
    info: ModuleInfo,
    state: Arc<KvState>,
}

impl KvModule {
    pub fn new(config: &Config, connector: Arc<dyn Connector>) -> Self {
        let state = KvState::new(connector, Self::cast_registry(), config.reader);
        KvModule {
            info: ModuleInfo::from_config(config),
            state: Arc::new(state),
        }
    }

    /// Module backed by the in-memory store
    pub fn in_memory(config: &Config) -> Self {
        Self::new(config, Arc::new(MemoryConnector::new()))
    }

    pub fn info(&self) -> &ModuleInfo {
        &self.info
    }

    /// Registry knowing every handle type this module hands out
    pub fn cast_registry() -> CastRegistry {
        CastRegistry::builder().register::<Connection>().build()
    }

    /// Install [`Self::cast_registry`] process-wide
    pub fn install_casts() -> Result<&'static CastRegistry, RegistryError> {
        Self::cast_registry().install()
    }

    /// Register the six functions, replacing same-named ones.
    ///
    /// Extra arguments are left to the reader: they only fail when the
    /// reader config enables `check_trailing`.
    pub fn register_functions(&self, table: &mut FunctionTable) -> Result<(), BuildError> {
        let entries: [(&str, fn(&KvState, &Frame) -> Vec<Value>); 6] = [
            (functions::CREATE_CLIENT, functions::create_client),
            (functions::PING, functions::ping),
            (functions::COMMAND, functions::command),
            (functions::SET, functions::set),
            (functions::GET, functions::get),
            (functions::DESTROY, functions::destroy),
        ];

        for (name, implementation) in entries {
            let state = Arc::clone(&self.state);
            let function = NativeFunctionBuilder::new(name)
                .variadic()
                .with_implementation(move |frame| implementation(&state, frame))
                .build()?;
            table.register(function);
        }

        tracing::debug!(target: "scriptargs::kv", module = %self.info.name, "functions registered");
        Ok(())
    }

    /// Periodic housekeeping; always succeeds
    pub fn pulse(&self) -> bool {
        let pruned = self.state.connections.prune();
        if pruned > 0 {
            tracing::debug!(target: "scriptargs::kv", pruned, "pruned connections");
        }
        true
    }

    pub fn resource_starting(&self, resource: &str) {
        tracing::debug!(target: "scriptargs::kv", resource, "resource starting");
    }

    pub fn resource_stopping(&self, resource: &str) {
        tracing::debug!(target: "scriptargs::kv", resource, "resource stopping");
    }

    pub fn resource_stopped(&self, resource: &str) {
        tracing::debug!(target: "scriptargs::kv", resource, "resource stopped");
    }

    /// Close every connection this module opened; returns how many were open
    pub fn shutdown(&self) -> usize {
        let closed = self.state.connections.close_all();
        tracing::info!(target: "scriptargs::kv", module = %self.info.name, closed, "module shut down");
        closed
    }

    pub fn open_connections(&self) -> usize {
        self.state.connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptargs_config::ModuleSection;

    #[test]
    fn test_default_info() {
        let info = ModuleInfo::from_config(&Config::default());
        assert_eq!(info.name, DEFAULT_NAME);
        assert_eq!(info.author, "");
        assert_eq!(info.version_number(), 1.0);
    }

    #[test]
    fn test_info_from_section() {
        let mut config = Config::default();
        config.module.module = Some(ModuleSection {
            name: "cache".to_string(),
            author: Some("ops".to_string()),
            version: Some("2.5".to_string()),
        });

        let info = ModuleInfo::from_config(&config);
        assert_eq!(info.name, "cache");
        assert_eq!(info.author, "ops");
        assert_eq!(info.version_number(), 2.5);
    }

    #[test]
    fn test_register_functions() {
        let module = KvModule::in_memory(&Config::default());
        let mut table = FunctionTable::new();
        module.register_functions(&mut table).unwrap();

        let names: Vec<&str> = table.names().collect();
        assert_eq!(
            names,
            vec![
                "createRedisClient",
                "redisClientCommand",
                "redisClientDestroy",
                "redisClientGet",
                "redisClientPing",
                "redisClientSet",
            ]
        );
        assert!(module.pulse());
    }
}
