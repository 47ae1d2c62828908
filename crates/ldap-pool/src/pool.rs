//! Connection pool implementation.
//!
//! The pool keeps two queues: `available` holds connections ready for
//! checkout and `active` holds connections handed to callers. Both queues,
//! and the closed and initialized flags, live in one [`PoolState`] behind
//! the pool lock; a condition variable signals waiters when a connection is
//! checked in.
//!
//! A second lock serializes the decision to create a new connection so
//! concurrent checkouts cannot race past the size limit. It is never held
//! while waiting for a checkin.
//!
//! How checkout and checkin use the queues depends on the [`PoolType`]; see
//! the `strategy` module.

use std::collections::VecDeque;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ldap_client::Connection;
use parking_lot::{Condvar, Mutex};

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::lifecycle::ConnectionFactory;
use crate::maintenance::Scheduler;
use crate::strategy::PoolType;

/// Operations common to every pool.
pub trait ConnectionPool: Send + Sync + fmt::Debug {
    /// Start background maintenance and fill the pool to its minimum size.
    fn initialize(&self) -> Result<(), PoolError>;

    /// Obtain a connection.
    fn check_out(&self) -> Result<PooledConnection, PoolError>;

    /// Return a connection. Never fails.
    fn check_in(&self, connection: PooledConnection);

    /// Destroy every connection and stop background maintenance.
    fn close(&self);

    /// Number of connections available for checkout.
    fn available_count(&self) -> usize;

    /// Number of connections checked out.
    fn active_count(&self) -> usize;

    /// Destroy expired idle connections down to the minimum size.
    fn prune(&self);

    /// Validate idle connections and refill to the minimum size.
    fn validate(&self);
}

/// A connection tracked by the pool, with the time it was created.
///
/// Identity is the wrapped connection's id.
pub(crate) struct PoolEntry {
    pub(crate) connection: Arc<Connection>,
    pub(crate) created_at: Instant,
}

impl PoolEntry {
    pub(crate) fn id(&self) -> u64 {
        self.connection.id()
    }
}

#[derive(Default)]
pub(crate) struct PoolState {
    pub(crate) available: VecDeque<Arc<PoolEntry>>,
    pub(crate) active: VecDeque<Arc<PoolEntry>>,
    pub(crate) initialized: bool,
    pub(crate) closed: bool,
}

impl PoolState {
    /// Move the oldest available connection to the active queue.
    pub(crate) fn activate_next(&mut self) -> Option<Arc<PoolEntry>> {
        let entry = self.available.pop_front()?;
        self.active.push_back(Arc::clone(&entry));
        Some(entry)
    }

    /// Remove one occurrence of `entry` from the active queue.
    pub(crate) fn remove_active(&mut self, entry: &PoolEntry) -> bool {
        remove_one(&mut self.active, entry.id())
    }

    /// Remove `entry` from the available queue.
    pub(crate) fn remove_available(&mut self, entry: &PoolEntry) -> bool {
        remove_one(&mut self.available, entry.id())
    }
}

fn remove_one(queue: &mut VecDeque<Arc<PoolEntry>>, id: u64) -> bool {
    match queue.iter().position(|e| e.id() == id) {
        Some(index) => queue.remove(index).is_some(),
        None => false,
    }
}

/// Internal metrics tracking.
#[derive(Debug, Default)]
struct PoolMetricsInner {
    connections_created: u64,
    connections_destroyed: u64,
    checkouts_successful: u64,
    checkouts_failed: u64,
    validations_performed: u64,
    validations_failed: u64,
    activations_failed: u64,
    prunes_performed: u64,
}

pub(crate) struct PoolInner {
    pub(crate) config: PoolConfig,
    pub(crate) pool_type: PoolType,
    pub(crate) block_wait_time: Duration,
    factory: Arc<dyn ConnectionFactory>,

    pub(crate) state: Mutex<PoolState>,
    /// Signaled when a connection is checked in.
    pub(crate) not_empty: Condvar,
    /// Serializes the create-or-block decision.
    pub(crate) check_out_lock: Mutex<()>,

    scheduler: Mutex<Option<Scheduler>>,
    metrics: Mutex<PoolMetricsInner>,
    created_at: Instant,
}

impl PoolInner {
    /// Create a connection, not yet placed in either queue.
    pub(crate) fn create_entry(&self) -> Option<Arc<PoolEntry>> {
        let connection = self.factory.create()?;
        self.metrics.lock().connections_created += 1;
        Some(Arc::new(PoolEntry {
            connection: Arc::new(connection),
            created_at: Instant::now(),
        }))
    }

    /// Create a connection directly into the active queue.
    ///
    /// Must not be called with the pool lock held.
    pub(crate) fn create_active(&self) -> Option<Arc<PoolEntry>> {
        let entry = self.create_entry()?;
        let mut state = self.state.lock();
        if state.closed {
            drop(state);
            self.destroy(&entry);
            return None;
        }
        state.active.push_back(Arc::clone(&entry));
        tracing::trace!(connection_id = entry.id(), "created active connection");
        Some(entry)
    }

    pub(crate) fn destroy(&self, entry: &PoolEntry) {
        self.factory.destroy(&entry.connection);
        self.metrics.lock().connections_destroyed += 1;
    }

    /// Remove `entry` from both queues and destroy it.
    pub(crate) fn remove_and_destroy(&self, entry: &PoolEntry) {
        {
            let mut state = self.state.lock();
            state.remove_active(entry);
            while state.remove_available(entry) {}
        }
        self.destroy(entry);
    }

    /// Wait for a connection to be checked in, for at most the block wait
    /// time (zero waits forever).
    ///
    /// On timeout nothing has been dequeued.
    pub(crate) fn block_available(&self) -> Result<Arc<PoolEntry>, PoolError> {
        let wait = self.block_wait_time;
        let deadline = (!wait.is_zero()).then(|| Instant::now() + wait);
        let mut state = self.state.lock();
        tracing::trace!(
            available = state.available.len(),
            active = state.active.len(),
            ?wait,
            "waiting for available connection"
        );
        loop {
            if state.closed {
                return Err(PoolError::Interrupted);
            }
            if let Some(entry) = state.activate_next() {
                return Ok(entry);
            }
            match deadline {
                Some(deadline) => {
                    if self.not_empty.wait_until(&mut state, deadline).timed_out() {
                        if state.closed {
                            return Err(PoolError::Interrupted);
                        }
                        return state
                            .activate_next()
                            .ok_or(PoolError::BlockingTimeout { waited: wait });
                    }
                }
                None => self.not_empty.wait(&mut state),
            }
        }
    }

    /// Activate `entry` and, if configured, validate it before handing it
    /// out. A failing connection is removed from both queues and destroyed.
    pub(crate) fn activate_and_validate(
        &self,
        entry: Arc<PoolEntry>,
    ) -> Result<Arc<PoolEntry>, PoolError> {
        if !self.factory.activate(&entry.connection) {
            tracing::warn!(connection_id = entry.id(), "connection failed activation");
            self.metrics.lock().activations_failed += 1;
            self.remove_and_destroy(&entry);
            return Err(PoolError::Activation);
        }
        if self.config.validate_on_check_out() && !self.validate_entry(&entry) {
            tracing::warn!(connection_id = entry.id(), "connection failed check out validation");
            self.remove_and_destroy(&entry);
            return Err(PoolError::Validation);
        }
        Ok(entry)
    }

    /// Validate `entry` if configured for check-in, then passivate it.
    pub(crate) fn validate_and_passivate(&self, entry: &PoolEntry) -> bool {
        let mut valid = true;
        if self.config.validate_on_check_in() {
            valid = self.validate_entry(entry);
            if !valid {
                tracing::warn!(connection_id = entry.id(), "connection failed check in validation");
            }
        }
        if valid && !self.factory.passivate(&entry.connection) {
            tracing::warn!(connection_id = entry.id(), "connection failed passivation");
            valid = false;
        }
        valid
    }

    pub(crate) fn validate_entry(&self, entry: &PoolEntry) -> bool {
        let valid = self.factory.validate(&entry.connection);
        let mut metrics = self.metrics.lock();
        metrics.validations_performed += 1;
        if !valid {
            metrics.validations_failed += 1;
        }
        valid
    }

    /// Create available connections until the pool reaches its minimum
    /// size, making at most twice that many attempts.
    ///
    /// Runs with the pool lock held.
    fn grow_to_min(&self, state: &mut PoolState) {
        let min = self.config.min_pool_size();
        let mut attempts = 0;
        while state.available.len() < min && attempts < min * 2 {
            attempts += 1;
            let Some(entry) = self.create_entry() else {
                continue;
            };
            if self.config.validate_on_check_in() && !self.validate_entry(&entry) {
                tracing::warn!(connection_id = entry.id(), "new connection failed validation");
                self.destroy(&entry);
                continue;
            }
            tracing::trace!(connection_id = entry.id(), "created available connection");
            state.available.push_back(entry);
        }
        if state.available.len() < min {
            tracing::warn!(
                available = state.available.len(),
                min,
                attempts,
                "unable to fill pool to minimum size"
            );
        }
    }

    fn initialize(self: &Arc<Self>) -> Result<(), PoolError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(PoolError::PoolClosed);
        }
        if state.initialized {
            tracing::debug!("pool already initialized");
            return Ok(());
        }

        tracing::debug!(
            pool_type = %self.pool_type,
            min = self.config.min_pool_size(),
            max = self.config.max_pool_size(),
            "initializing pool"
        );
        *self.scheduler.lock() = Some(Scheduler::start(self));

        self.grow_to_min(&mut state);
        state.initialized = true;
        self.not_empty.notify_all();
        tracing::info!(
            pool_type = %self.pool_type,
            available = state.available.len(),
            "connection pool initialized"
        );
        Ok(())
    }

    pub(crate) fn check_out(&self) -> Result<Arc<PoolEntry>, PoolError> {
        {
            let state = self.state.lock();
            if state.closed {
                return Err(PoolError::PoolClosed);
            }
            if !state.initialized {
                return Err(PoolError::NotInitialized);
            }
        }

        let result = match self.pool_type {
            PoolType::Blocking => self.check_out_blocking(),
            PoolType::SoftLimit => self.check_out_soft_limit(),
            PoolType::Shared => self.check_out_shared(),
        };

        let mut metrics = self.metrics.lock();
        match &result {
            Ok(entry) => {
                metrics.checkouts_successful += 1;
                tracing::trace!(connection_id = entry.id(), "checked out connection");
            }
            Err(e) => {
                metrics.checkouts_failed += 1;
                tracing::debug!(error = %e, "check out failed");
            }
        }
        result
    }

    pub(crate) fn check_in(&self, entry: &Arc<PoolEntry>) {
        match self.pool_type {
            PoolType::Blocking | PoolType::SoftLimit => self.check_in_exclusive(entry),
            PoolType::Shared => self.check_in_shared(entry),
        }
    }

    /// Remove `entry` from the pool's bookkeeping without destroying it.
    fn detach(&self, entry: &PoolEntry) {
        let mut state = self.state.lock();
        state.remove_active(entry);
        while state.remove_available(entry) {}
        tracing::debug!(connection_id = entry.id(), "detached connection from pool");
    }

    fn close(&self) {
        let entries = {
            let mut state = self.state.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            let mut drained: Vec<Arc<PoolEntry>> = state.available.drain(..).collect();
            drained.extend(state.active.drain(..));
            let mut entries: Vec<Arc<PoolEntry>> = Vec::with_capacity(drained.len());
            for entry in drained {
                if !entries.iter().any(|e| e.id() == entry.id()) {
                    entries.push(entry);
                }
            }
            entries
        };
        self.not_empty.notify_all();

        for entry in &entries {
            self.destroy(entry);
        }

        let scheduler = self.scheduler.lock().take();
        if let Some(scheduler) = scheduler {
            scheduler.stop();
        }
        tracing::info!(destroyed = entries.len(), "connection pool closed");
    }

    /// Destroy expired connections from the head of the available queue
    /// until the pool shrinks to its minimum size or the head is not yet
    /// expired. Skipped while any connection is checked out.
    pub(crate) fn prune(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        if !state.active.is_empty() {
            tracing::debug!(active = state.active.len(), "pool is active, skipping prune");
            return;
        }

        let min = self.config.min_pool_size();
        let expiration = self.config.expiration_time();
        let mut pruned = 0usize;
        while state.available.len() > min {
            let expired = state
                .available
                .front()
                .is_some_and(|e| e.created_at.elapsed() > expiration);
            if !expired {
                break;
            }
            if let Some(entry) = state.available.pop_front() {
                tracing::trace!(connection_id = entry.id(), "pruning expired connection");
                self.destroy(&entry);
                pruned += 1;
            }
        }
        self.metrics.lock().prunes_performed += 1;
        tracing::debug!(pruned, available = state.available.len(), "prune complete");
    }

    /// Validate every available connection if periodic validation is on,
    /// destroy the failures, then refill to the minimum size. Skipped while
    /// any connection is checked out.
    pub(crate) fn validate(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        if !state.active.is_empty() {
            tracing::debug!(active = state.active.len(), "pool is active, skipping validate");
            return;
        }

        if self.config.validate_periodically() {
            let failed: Vec<Arc<PoolEntry>> = state
                .available
                .iter()
                .filter(|entry| !self.validate_entry(entry))
                .cloned()
                .collect();
            for entry in &failed {
                tracing::warn!(connection_id = entry.id(), "connection failed periodic validation");
                state.remove_available(entry);
                self.destroy(entry);
            }
            tracing::debug!(failed = failed.len(), "periodic validation complete");
        }

        self.grow_to_min(&mut state);
        self.not_empty.notify_all();
    }

    fn status(&self) -> PoolStatus {
        let state = self.state.lock();
        let total = match self.pool_type {
            PoolType::Shared => state.available.len(),
            PoolType::Blocking | PoolType::SoftLimit => state.available.len() + state.active.len(),
        };
        PoolStatus {
            available: state.available.len(),
            in_use: state.active.len(),
            total,
            max: self.config.max_pool_size(),
        }
    }

    fn metrics(&self) -> PoolMetrics {
        let inner = self.metrics.lock();
        PoolMetrics {
            connections_created: inner.connections_created,
            connections_destroyed: inner.connections_destroyed,
            checkouts_successful: inner.checkouts_successful,
            checkouts_failed: inner.checkouts_failed,
            validations_performed: inner.validations_performed,
            validations_failed: inner.validations_failed,
            activations_failed: inner.activations_failed,
            prunes_performed: inner.prunes_performed,
            uptime: self.created_at.elapsed(),
        }
    }
}

/// A pool of LDAP connections.
///
/// The pool closes itself when dropped; connections still checked out at
/// that point are closed and are not returned on drop.
///
/// # Example
///
/// ```rust,ignore
/// use ldap_pool::{LdapConnectionFactory, Pool, PoolConfig, PoolType};
///
/// let pool = Pool::builder(Arc::new(factory))
///     .pool_type(PoolType::Blocking)
///     .pool_config(PoolConfig::builder().min_pool_size(2).max_pool_size(8).build()?)
///     .block_wait_time(Duration::from_secs(5))
///     .build();
/// pool.initialize()?;
///
/// let conn = pool.check_out()?;
/// conn.search(SearchRequest::new("ou=people,dc=vt,dc=edu", "(uid=dfisher)"))?;
/// // returned to the pool on drop
/// ```
pub struct Pool {
    inner: Arc<PoolInner>,
}

impl Pool {
    /// Create a new pool builder over `factory`.
    #[must_use]
    pub fn builder(factory: Arc<dyn ConnectionFactory>) -> PoolBuilder {
        PoolBuilder::new(factory)
    }

    /// Create an uninitialized pool.
    #[must_use]
    pub fn new(
        pool_type: PoolType,
        config: PoolConfig,
        factory: Arc<dyn ConnectionFactory>,
    ) -> Self {
        Self::builder(factory)
            .pool_type(pool_type)
            .pool_config(config)
            .build()
    }

    /// Start background maintenance and fill the pool to its minimum size.
    pub fn initialize(&self) -> Result<(), PoolError> {
        self.inner.initialize()
    }

    /// Get a connection from the pool.
    ///
    /// Fails with [`PoolError::NotInitialized`] before
    /// [`initialize`](Self::initialize).
    pub fn check_out(&self) -> Result<PooledConnection, PoolError> {
        let entry = self.inner.check_out()?;
        Ok(PooledConnection {
            entry,
            pool: Arc::clone(&self.inner),
            detached: false,
        })
    }

    /// Return a connection to the pool.
    ///
    /// Equivalent to dropping it.
    pub fn check_in(&self, connection: PooledConnection) {
        drop(connection);
    }

    /// Close the pool. Idempotent.
    pub fn close(&self) {
        self.inner.close();
    }

    /// Check if the pool is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    /// Number of connections available for checkout.
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.inner.state.lock().available.len()
    }

    /// Number of connections checked out.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.inner.state.lock().active.len()
    }

    /// Run the prune task now.
    pub fn prune(&self) {
        self.inner.prune();
    }

    /// Run the validate task now.
    pub fn validate(&self) {
        self.inner.validate();
    }

    /// The checkout strategy.
    #[must_use]
    pub fn pool_type(&self) -> PoolType {
        self.inner.pool_type
    }

    /// Get the pool configuration.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// Get the current pool status.
    #[must_use]
    pub fn status(&self) -> PoolStatus {
        self.inner.status()
    }

    /// Get pool metrics.
    #[must_use]
    pub fn metrics(&self) -> PoolMetrics {
        self.inner.metrics()
    }
}

impl ConnectionPool for Pool {
    fn initialize(&self) -> Result<(), PoolError> {
        Pool::initialize(self)
    }

    fn check_out(&self) -> Result<PooledConnection, PoolError> {
        Pool::check_out(self)
    }

    fn check_in(&self, connection: PooledConnection) {
        Pool::check_in(self, connection);
    }

    fn close(&self) {
        Pool::close(self);
    }

    fn available_count(&self) -> usize {
        Pool::available_count(self)
    }

    fn active_count(&self) -> usize {
        Pool::active_count(self)
    }

    fn prune(&self) {
        Pool::prune(self);
    }

    fn validate(&self) {
        Pool::validate(self);
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        self.inner.close();
    }
}

impl fmt::Debug for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self.status();
        f.debug_struct("Pool")
            .field("pool_type", &self.inner.pool_type)
            .field("available", &status.available)
            .field("active", &status.in_use)
            .field("max", &status.max)
            .finish()
    }
}

/// Builder for creating a connection pool.
///
/// # Example
///
/// ```rust,ignore
/// let pool = Pool::builder(factory)
///     .pool_type(PoolType::SoftLimit)
///     .pool_config(pool_config)
///     .build();
/// ```
pub struct PoolBuilder {
    factory: Arc<dyn ConnectionFactory>,
    pool_config: PoolConfig,
    pool_type: PoolType,
    block_wait_time: Duration,
}

impl PoolBuilder {
    /// Create a new pool builder with default settings.
    #[must_use]
    pub fn new(factory: Arc<dyn ConnectionFactory>) -> Self {
        Self {
            factory,
            pool_config: PoolConfig::default(),
            pool_type: PoolType::default(),
            block_wait_time: Duration::ZERO,
        }
    }

    /// Set the pool configuration.
    #[must_use]
    pub fn pool_config(mut self, config: PoolConfig) -> Self {
        self.pool_config = config;
        self
    }

    /// Set the checkout strategy.
    #[must_use]
    pub fn pool_type(mut self, pool_type: PoolType) -> Self {
        self.pool_type = pool_type;
        self
    }

    /// Set how long a checkout blocks waiting for a checkin; zero waits
    /// forever. Ignored by shared pools, which never block.
    #[must_use]
    pub fn block_wait_time(mut self, wait: Duration) -> Self {
        self.block_wait_time = wait;
        self
    }

    /// Build the pool. It must be initialized before use.
    #[must_use]
    pub fn build(self) -> Pool {
        tracing::debug!(
            pool_type = %self.pool_type,
            min = self.pool_config.min_pool_size(),
            max = self.pool_config.max_pool_size(),
            "connection pool created"
        );
        Pool {
            inner: Arc::new(PoolInner {
                config: self.pool_config,
                pool_type: self.pool_type,
                block_wait_time: self.block_wait_time,
                factory: self.factory,
                state: Mutex::new(PoolState::default()),
                not_empty: Condvar::new(),
                check_out_lock: Mutex::new(()),
                scheduler: Mutex::new(None),
                metrics: Mutex::new(PoolMetricsInner::default()),
                created_at: Instant::now(),
            }),
        }
    }
}

/// Status information about the pool.
#[derive(Debug, Clone, Copy)]
pub struct PoolStatus {
    /// Number of connections available for checkout.
    pub available: usize,
    /// Number of outstanding checkouts. A shared connection counts once per
    /// checkout, so this can exceed `total`.
    pub in_use: usize,
    /// Total number of distinct connections.
    pub total: usize,
    /// Maximum pool size.
    pub max: usize,
}

impl PoolStatus {
    /// Calculate the utilization percentage, capped at 100.
    ///
    /// Oversubscribed shared pools and soft-limit pools grown past `max`
    /// report full utilization.
    #[must_use]
    pub fn utilization(&self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        (self.in_use.min(self.max) as f64 / self.max as f64) * 100.0
    }

    /// Check if the pool is at capacity.
    #[must_use]
    pub fn is_at_capacity(&self) -> bool {
        self.total >= self.max
    }
}

/// Metrics collected from the pool.
#[derive(Debug, Clone)]
pub struct PoolMetrics {
    /// Total connections created since pool start.
    pub connections_created: u64,
    /// Total connections destroyed since pool start.
    pub connections_destroyed: u64,
    /// Successful checkouts.
    pub checkouts_successful: u64,
    /// Failed checkouts (exhaustion, timeouts, activation or validation).
    pub checkouts_failed: u64,
    /// Validations performed.
    pub validations_performed: u64,
    /// Validations that failed.
    pub validations_failed: u64,
    /// Activations that failed.
    pub activations_failed: u64,
    /// Prune runs that were not skipped.
    pub prunes_performed: u64,
    /// Time since pool creation.
    pub uptime: Duration,
}

impl PoolMetrics {
    /// Calculate checkout success rate (0.0 to 1.0).
    #[must_use]
    pub fn checkout_success_rate(&self) -> f64 {
        let total = self.checkouts_successful + self.checkouts_failed;
        if total == 0 {
            return 1.0;
        }
        self.checkouts_successful as f64 / total as f64
    }

    /// Calculate validation success rate (0.0 to 1.0).
    #[must_use]
    pub fn validation_success_rate(&self) -> f64 {
        if self.validations_performed == 0 {
            return 1.0;
        }
        let successful = self.validations_performed - self.validations_failed;
        successful as f64 / self.validations_performed as f64
    }
}

/// A connection retrieved from the pool.
///
/// Dereferences to [`Connection`]. When dropped, the connection is checked
/// back in. Use [`detach()`](PooledConnection::detach) to take it out of the
/// pool instead.
pub struct PooledConnection {
    entry: Arc<PoolEntry>,
    pool: Arc<PoolInner>,
    detached: bool,
}

impl PooledConnection {
    /// When the underlying connection was created.
    #[must_use]
    pub fn created_at(&self) -> Instant {
        self.entry.created_at
    }

    /// Shared handle to the connection, for shared pools whose connections
    /// are used from several threads.
    #[must_use]
    pub fn connection(&self) -> &Arc<Connection> {
        &self.entry.connection
    }

    /// Remove the connection from the pool and take ownership of it.
    ///
    /// The pool no longer counts it; closing it becomes the caller's
    /// responsibility.
    #[must_use]
    pub fn detach(mut self) -> Arc<Connection> {
        self.detached = true;
        self.pool.detach(&self.entry);
        Arc::clone(&self.entry.connection)
    }
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.entry.connection
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if !self.detached {
            self.pool.check_in(&self.entry);
        }
    }
}

impl fmt::Debug for PooledConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledConnection")
            .field("connection", &*self.entry.connection)
            .field("created_at", &self.entry.created_at)
            .finish()
    }
}
