//! Opaque handle cast registry
//!
//! Maps native types to validator closures that recover a typed reference
//! from an untyped [`Handle`]. The reader never inspects handle payloads
//! itself; it asks the registry and trusts the answer.
//!
//! A process-wide registry is installed once, before any call frame is
//! processed, and is read-only afterwards. Readers can also be bound to an
//! explicit registry, which is what tests do.

use crate::value::Handle;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Native type usable as a handle parameter
pub trait UserData: Any + Send + Sync {
    /// Class tag used in error messages
    const CLASS_NAME: &'static str;
}

type CastFn = Arc<dyn Fn(&Handle) -> Option<Arc<dyn Any + Send + Sync>> + Send + Sync>;

#[derive(Clone)]
struct CastEntry {
    class_name: &'static str,
    cast: CastFn,
}

/// Registry errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("cast registry already installed")]
    AlreadyInstalled,
}

static GLOBAL: OnceLock<CastRegistry> = OnceLock::new();
static EMPTY: OnceLock<CastRegistry> = OnceLock::new();

/// The installed process-wide registry, or an empty one
pub fn global() -> &'static CastRegistry {
    match GLOBAL.get() {
        Some(registry) => registry,
        None => EMPTY.get_or_init(CastRegistry::default),
    }
}

/// Type identifier to validator map
#[derive(Clone, Default)]
pub struct CastRegistry {
    entries: HashMap<TypeId, CastEntry>,
}

impl CastRegistry {
    pub fn builder() -> CastRegistryBuilder {
        CastRegistryBuilder::default()
    }

    /// Recover a `T` from a handle; unregistered types never cast
    pub fn cast<T: UserData>(&self, handle: &Handle) -> Option<Arc<T>> {
        let entry = self.entries.get(&TypeId::of::<T>())?;
        (entry.cast)(handle)?.downcast::<T>().ok()
    }

    pub fn is_registered<T: UserData>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Class tag of the handle's payload, `"userdata"` when unknown
    pub fn class_name_of(&self, handle: &Handle) -> &'static str {
        self.entries
            .get(&handle.payload_type_id())
            .map_or("userdata", |entry| entry.class_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Install as the process-wide registry. Only the first call succeeds.
    pub fn install(self) -> Result<&'static CastRegistry, RegistryError> {
        let count = self.len();
        GLOBAL.set(self).map_err(|_| RegistryError::AlreadyInstalled)?;
        tracing::info!(target: "scriptargs::registry", types = count, "cast registry installed");
        Ok(global())
    }
}

impl fmt::Debug for CastRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.entries.values().map(|e| e.class_name).collect();
        names.sort_unstable();
        f.debug_struct("CastRegistry").field("classes", &names).finish()
    }
}

/// Builder for [`CastRegistry`]
#[derive(Default)]
pub struct CastRegistryBuilder {
    entries: HashMap<TypeId, CastEntry>,
}

impl CastRegistryBuilder {
    /// Register `T` with an exact payload type match
    pub fn register<T: UserData>(self) -> Self {
        self.register_with::<T, _>(|handle| handle.downcast::<T>())
    }

    /// Register `T` with a custom validator
    pub fn register_with<T, F>(mut self, validator: F) -> Self
    where
        T: UserData,
        F: Fn(&Handle) -> Option<Arc<T>> + Send + Sync + 'static,
    {
        let cast: CastFn =
            Arc::new(move |handle| validator(handle).map(|typed| typed as Arc<dyn Any + Send + Sync>));
        self.entries.insert(
            TypeId::of::<T>(),
            CastEntry {
                class_name: T::CLASS_NAME,
                cast,
            },
        );
        self
    }

    pub fn build(self) -> CastRegistry {
        CastRegistry {
            entries: self.entries,
        }
    }
}
