//! Connections handed to scripts as opaque handles

use crate::client::{KvClient, KvError, Reply};
use scriptargs_runtime::UserData;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// A client connection. Closing drops the client; the handle stays valid
/// but every later command fails with [`KvError::Closed`].
pub struct Connection {
    id: u64,
    endpoint: String,
    client: Mutex<Option<Box<dyn KvClient>>>,
}

impl UserData for Connection {
    const CLASS_NAME: &'static str = "redis-context";
}

impl Connection {
    pub fn new(id: u64, endpoint: impl Into<String>, client: Box<dyn KvClient>) -> Self {
        Connection {
            id,
            endpoint: endpoint.into(),
            client: Mutex::new(Some(client)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// `host:port`
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn command(&self, args: &[String]) -> Result<Reply, KvError> {
        let mut client = self.client.lock().unwrap_or_else(PoisonError::into_inner);
        client.as_mut().ok_or(KvError::Closed)?.command(args)
    }

    /// Drop the client; returns whether it was open
    pub fn close(&self) -> bool {
        let mut client = self.client.lock().unwrap_or_else(PoisonError::into_inner);
        client.take().is_some()
    }

    pub fn is_open(&self) -> bool {
        self.client.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("endpoint", &self.endpoint)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Connections opened through one module, tracked weakly so scripts still
/// own their lifetime
#[derive(Debug, Default)]
pub struct ConnectionSet {
    next_id: AtomicU64,
    open: Mutex<BTreeMap<u64, Weak<Connection>>>,
}

impl ConnectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, endpoint: impl Into<String>, client: Box<dyn KvClient>) -> Arc<Connection> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let connection = Arc::new(Connection::new(id, endpoint, client));
        self.lock().insert(id, Arc::downgrade(&connection));
        connection
    }

    /// Stop tracking a connection that was closed explicitly
    pub fn forget(&self, id: u64) {
        self.lock().remove(&id);
    }

    /// Drop entries whose connection is gone or closed; returns how many
    pub fn prune(&self) -> usize {
        let mut open = self.lock();
        let before = open.len();
        open.retain(|_, weak| weak.upgrade().map_or(false, |c| c.is_open()));
        before - open.len()
    }

    /// Close every tracked connection; returns how many were still open
    pub fn close_all(&self) -> usize {
        let drained = std::mem::take(&mut *self.lock());
        drained
            .into_values()
            .filter_map(|weak| weak.upgrade())
            .filter(|connection| connection.close())
            .count()
    }

    /// Live, open connections
    pub fn len(&self) -> usize {
        self.lock()
            .values()
            .filter(|weak| weak.upgrade().map_or(false, |c| c.is_open()))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<u64, Weak<Connection>>> {
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
