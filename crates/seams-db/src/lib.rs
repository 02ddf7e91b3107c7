pub mod admin;
pub mod channels;
pub mod dms;
pub mod error;
pub mod identity;
pub mod messaging;
pub mod migrations;
pub mod models;
pub mod policy;
pub mod snapshot;
pub mod state;
pub mod users;

use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{error, info};

pub use error::{StoreError, StoreResult};
pub use state::StoreState;

struct Inner {
    state: StoreState,
    snapshots: Option<Connection>,
}

/// The process-wide store.
///
/// Every operation runs under one lock, and a successful mutation is
/// snapshotted before that lock is released, so snapshots follow the same
/// total order as the mutations themselves.
pub struct Database {
    inner: Mutex<Inner>,
}

impl Database {
    /// Open (or create) the snapshot file at `path` and load the last saved state.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run(&conn)?;

        let state = match snapshot::load(&conn)? {
            Some(state) => {
                info!(
                    "Loaded snapshot from {} ({} users, {} channels, {} DMs)",
                    path.display(),
                    state.users.len(),
                    state.channels.len(),
                    state.dms.len()
                );
                state
            }
            None => {
                info!("No snapshot at {}, starting empty", path.display());
                StoreState::new()
            }
        };

        Ok(Self {
            inner: Mutex::new(Inner {
                state,
                snapshots: Some(conn),
            }),
        })
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: StoreState::new(),
                snapshots: None,
            }),
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| StoreError::Storage(anyhow::anyhow!("Store lock poisoned: {}", e)))
    }

    /// Run a read-only operation against the current state.
    pub fn read<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&StoreState) -> StoreResult<T>,
    {
        let inner = self.lock()?;
        f(&inner.state)
    }

    /// Run a mutating operation and commit the result.
    ///
    /// Operations validate before they mutate, so an `Err` leaves the state
    /// untouched and nothing is saved. Snapshot failures are logged and do
    /// not fail the operation.
    pub fn write<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut StoreState) -> StoreResult<T>,
    {
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let value = f(&mut inner.state)?;

        if let Some(conn) = inner.snapshots.as_mut() {
            if let Err(e) = snapshot::save(conn, &inner.state) {
                error!("Failed to save snapshot: {:#}", e);
            }
        }
        Ok(value)
    }

    /// Reset every entity and counter.
    pub fn clear(&self) -> StoreResult<()> {
        self.write(|state| {
            state.clear();
            Ok(())
        })?;
        info!("Store cleared");
        Ok(())
    }
}
