//! Background prune and validate tasks.

use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use parking_lot::{Condvar, Mutex};

use crate::pool::PoolInner;

/// Stop flag shared with the maintenance thread.
type StopSignal = Arc<(Mutex<bool>, Condvar)>;

/// Runs a pool's prune and validate tasks at their configured periods on
/// a dedicated thread.
///
/// The thread holds only a weak reference to the pool and exits once the
/// pool is gone or [`stop`](Self::stop) is called.
pub(crate) struct Scheduler {
    stop: StopSignal,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub(crate) fn start(pool: &Arc<PoolInner>) -> Self {
        let stop: StopSignal = Arc::new((Mutex::new(false), Condvar::new()));
        let weak = Arc::downgrade(pool);
        let signal = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name(format!("ldap-pool-{}", pool.pool_type))
            .spawn(move || run(&weak, &signal));

        match handle {
            Ok(handle) => Self {
                stop,
                handle: Some(handle),
            },
            Err(e) => {
                tracing::error!(error = %e, "unable to start pool maintenance thread");
                Self { stop, handle: None }
            }
        }
    }

    /// Signal the thread and wait for it to finish its current task.
    pub(crate) fn stop(mut self) {
        {
            let (stopped, wakeup) = &*self.stop;
            *stopped.lock() = true;
            wakeup.notify_all();
        }
        if let Some(handle) = self.handle.take() {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                tracing::error!("pool maintenance thread panicked");
            }
        }
    }
}

fn run(pool: &Weak<PoolInner>, stop: &StopSignal) {
    let (prune_period, validate_period) = match pool.upgrade() {
        Some(pool) => (pool.config.prune_period(), pool.config.validate_period()),
        None => return,
    };
    let mut next_prune = Instant::now() + prune_period;
    let mut next_validate = Instant::now() + validate_period;
    tracing::debug!(?prune_period, ?validate_period, "pool maintenance started");

    let (stopped, wakeup) = &**stop;
    loop {
        {
            let mut stopped = stopped.lock();
            let deadline = next_prune.min(next_validate);
            while !*stopped && Instant::now() < deadline {
                if wakeup.wait_until(&mut stopped, deadline).timed_out() {
                    break;
                }
            }
            if *stopped {
                break;
            }
        }

        let Some(pool) = pool.upgrade() else {
            break;
        };
        let now = Instant::now();
        if now >= next_prune {
            tracing::trace!("running prune task");
            pool.prune();
            next_prune = now + prune_period;
        }
        if now >= next_validate {
            tracing::trace!("running validate task");
            pool.validate();
            next_validate = now + validate_period;
        }
    }
    tracing::debug!("pool maintenance stopped");
}
