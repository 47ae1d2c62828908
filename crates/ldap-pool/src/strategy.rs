//! Checkout and checkin strategies.
//!
//! | Pool type   | Available connection | Pool below max   | Pool at max        |
//! |-------------|----------------------|------------------|--------------------|
//! | `Blocking`  | hand it out          | create one       | wait for a checkin |
//! | `SoftLimit` | hand it out          | create one       | create one         |
//! | `Shared`    | hand it out          | create one       | reuse the oldest   |
//!
//! Blocking and soft-limit pools hand each connection to one caller at a
//! time. A shared pool keeps every connection in its available queue and
//! hands the same connection to several callers in rotation; its active
//! queue counts outstanding checkouts rather than distinct connections.

use std::fmt;
use std::sync::Arc;

use crate::error::PoolError;
use crate::pool::{PoolEntry, PoolInner, PoolState};

/// How a pool behaves when it has no idle connection to hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PoolType {
    /// Never exceed the maximum size; wait for a checkin when full.
    #[default]
    Blocking,
    /// Create connections beyond the maximum size rather than wait. The
    /// extra connections are pruned once idle.
    SoftLimit,
    /// Share connections between callers once the pool is full. Never
    /// blocks.
    Shared,
}

impl PoolType {
    /// Short lowercase name of the strategy.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blocking => "blocking",
            Self::SoftLimit => "soft-limit",
            Self::Shared => "shared",
        }
    }
}

impl fmt::Display for PoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PoolInner {
    pub(crate) fn check_out_blocking(&self) -> Result<Arc<PoolEntry>, PoolError> {
        let max = self.config.max_pool_size();
        let (mut entry, create) = {
            let mut state = self.state.lock();
            match state.activate_next() {
                Some(entry) => (Some(entry), false),
                None => (None, state.active.len() < max),
            }
        };

        if create {
            let _creating = self.check_out_lock.lock();
            let size = {
                let state = self.state.lock();
                state.available.len() + state.active.len()
            };
            if size < max {
                entry = self.create_active();
            }
            if entry.is_none() {
                tracing::debug!("create failed or pool is full, waiting for a checkin");
            }
        }

        let entry = match entry {
            Some(entry) => entry,
            None => self.block_available()?,
        };
        self.activate_and_validate(entry)
    }

    pub(crate) fn check_out_soft_limit(&self) -> Result<Arc<PoolEntry>, PoolError> {
        let mut entry = self.state.lock().activate_next();

        if entry.is_none() {
            let _creating = self.check_out_lock.lock();
            entry = self.create_active();
            match &entry {
                Some(created) => {
                    let state = self.state.lock();
                    let size = state.available.len() + state.active.len();
                    if size > self.config.max_pool_size() {
                        tracing::debug!(
                            connection_id = created.id(),
                            size,
                            max = self.config.max_pool_size(),
                            "soft limit exceeded"
                        );
                    }
                }
                None => tracing::debug!("create failed, waiting for a checkin"),
            }
        }

        let entry = match entry {
            Some(entry) => entry,
            None => self.block_available()?,
        };
        self.activate_and_validate(entry)
    }

    pub(crate) fn check_out_shared(&self) -> Result<Arc<PoolEntry>, PoolError> {
        let max = self.config.max_pool_size();
        let (mut entry, create) = {
            let mut state = self.state.lock();
            if state.active.len() < state.available.len() {
                (retrieve_shared(&mut state), false)
            } else if state.active.len() < max {
                (None, true)
            } else {
                (retrieve_shared(&mut state), false)
            }
        };

        if create {
            let _creating = self.check_out_lock.lock();
            let below_max = self.state.lock().available.len() < max;
            if below_max {
                entry = self.create_shared();
            }
            if entry.is_none() {
                tracing::debug!("create failed or pool is full, sharing an available connection");
                entry = retrieve_shared(&mut self.state.lock());
            }
        }

        let entry = entry.ok_or(PoolError::Exhausted)?;
        self.activate_and_validate(entry)
    }

    /// Create a connection into both the available and active queues.
    fn create_shared(&self) -> Option<Arc<PoolEntry>> {
        let entry = self.create_entry()?;
        let mut state = self.state.lock();
        if state.closed {
            drop(state);
            self.destroy(&entry);
            return None;
        }
        state.available.push_back(Arc::clone(&entry));
        state.active.push_back(Arc::clone(&entry));
        tracing::trace!(connection_id = entry.id(), "created shared connection");
        Some(entry)
    }

    pub(crate) fn check_in_exclusive(&self, entry: &Arc<PoolEntry>) {
        let valid = self.validate_and_passivate(entry);

        let mut state = self.state.lock();
        if state.closed {
            tracing::debug!(connection_id = entry.id(), "pool is closed, discarding checkin");
            return;
        }
        if !state.remove_active(entry) {
            tracing::warn!(
                connection_id = entry.id(),
                "checked in connection is not active in this pool"
            );
            return;
        }
        if valid {
            state.available.push_back(Arc::clone(entry));
            tracing::trace!(connection_id = entry.id(), "returned connection to pool");
            self.not_empty.notify_one();
        } else {
            drop(state);
            self.destroy(entry);
        }
    }

    pub(crate) fn check_in_shared(&self, entry: &Arc<PoolEntry>) {
        let valid = !self.config.validate_on_check_in() || self.validate_entry(entry);
        if !valid {
            tracing::warn!(connection_id = entry.id(), "connection failed check in validation");
        }

        let mut state = self.state.lock();
        if state.closed {
            tracing::debug!(connection_id = entry.id(), "pool is closed, discarding checkin");
            return;
        }
        let was_active = state.remove_active(entry);
        let destroy = !valid && state.remove_available(entry);
        drop(state);

        if !was_active {
            tracing::warn!(
                connection_id = entry.id(),
                "checked in connection is not active in this pool"
            );
        }
        if destroy {
            self.destroy(entry);
        }
    }
}

/// Rotate the oldest available connection to the back of the available
/// queue and record a checkout of it.
fn retrieve_shared(state: &mut PoolState) -> Option<Arc<PoolEntry>> {
    let entry = state.available.pop_front()?;
    state.available.push_back(Arc::clone(&entry));
    state.active.push_back(Arc::clone(&entry));
    Some(entry)
}
