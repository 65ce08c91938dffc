//! Background revalidation of the state as the chain advances.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::SystemTime;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info};

use crate::{SchedulerConfig, Validator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Active,
    Paused,
    Stopped,
}

#[derive(Debug)]
struct SchedulerState {
    run: RunState,
    target_height: Option<u64>,
    validated_height: Option<u64>,
    validated: bool,
    last_result_time: Option<SystemTime>,
}

struct Shared {
    state: Mutex<SchedulerState>,
    signal: Condvar,
}

/// Runs a [`Validator`] on a dedicated thread whenever the target height
/// changes, and again at the same height after each idle timeout.
///
/// A failed validation stops the scheduler for good; the host node keeps
/// running and can read the outcome through [`ValidatorScheduler::is_validated`].
pub struct ValidatorScheduler {
    shared: Arc<Shared>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ValidatorScheduler {
    /// Spawn the validation thread. Nothing is validated until a height is
    /// set.
    pub fn start(
        validator: Arc<dyn Validator + Send + Sync>,
        config: SchedulerConfig,
    ) -> io::Result<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(SchedulerState {
                run: RunState::Active,
                target_height: None,
                validated_height: None,
                validated: false,
                last_result_time: None,
            }),
            signal: Condvar::new(),
        });

        let thread_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || run(thread_shared, validator, config))?;
        info!("merkle validator scheduler started");

        Ok(Self {
            shared,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Stop validating and wait for the thread to exit. A validation in
    /// progress runs to completion first.
    pub fn stop(&self) {
        {
            let mut state = self.shared.state.lock();
            if state.run != RunState::Stopped {
                state.run = RunState::Stopped;
                info!("merkle validator scheduler stopping");
            }
        }
        self.shared.signal.notify_all();
        if let Some(handle) = self.handle.lock().take() {
            if handle.join().is_err() {
                error!("merkle validator thread panicked");
            }
        }
    }

    /// Suspend validation until [`ValidatorScheduler::resume`].
    pub fn pause(&self) {
        let mut state = self.shared.state.lock();
        if state.run == RunState::Active {
            state.run = RunState::Paused;
            debug!("merkle validator paused");
        }
    }

    /// Resume validation and re-check the target height immediately.
    pub fn resume(&self) {
        let mut state = self.shared.state.lock();
        if state.run == RunState::Paused {
            state.run = RunState::Active;
            debug!("merkle validator resumed");
            self.shared.signal.notify_all();
        }
    }

    /// Set the height to validate next. A new height is picked up at once;
    /// setting the current one again does not trigger a run.
    pub fn set_height(&self, height: u64) {
        let mut state = self.shared.state.lock();
        if state.target_height != Some(height) {
            state.target_height = Some(height);
            self.shared.signal.notify_all();
        }
    }

    /// Whether the last validation run succeeded.
    pub fn is_validated(&self) -> bool {
        self.shared.state.lock().validated
    }

    /// When the last validation run finished.
    pub fn last_result_time(&self) -> Option<SystemTime> {
        self.shared.state.lock().last_result_time
    }

    /// Whether the scheduler has not stopped, paused or not.
    pub fn is_running(&self) -> bool {
        self.shared.state.lock().run != RunState::Stopped
    }

    /// Whether validation is suspended.
    pub fn is_paused(&self) -> bool {
        self.shared.state.lock().run == RunState::Paused
    }

    /// The most recently requested height.
    pub fn target_height(&self) -> Option<u64> {
        self.shared.state.lock().target_height
    }

    /// Height of the last successful validation.
    pub fn validated_height(&self) -> Option<u64> {
        self.shared.state.lock().validated_height
    }
}

impl Drop for ValidatorScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(shared: Arc<Shared>, validator: Arc<dyn Validator + Send + Sync>, config: SchedulerConfig) {
    loop {
        let height = {
            let mut state = shared.state.lock();
            loop {
                match state.run {
                    RunState::Stopped => return,
                    RunState::Paused => shared.signal.wait(&mut state),
                    RunState::Active => match state.target_height {
                        Some(target) if state.validated_height != Some(target) => break target,
                        _ => {
                            let timed_out = shared
                                .signal
                                .wait_for(&mut state, config.wait_timeout)
                                .timed_out();
                            if timed_out && state.run == RunState::Active {
                                if let Some(target) = state.target_height {
                                    break target;
                                }
                            }
                        }
                    },
                }
            }
        };

        debug!(height, "running merkle validation");
        let result = validator.validate(height);

        let mut state = shared.state.lock();
        state.last_result_time = Some(SystemTime::now());
        match result {
            Ok(()) => {
                state.validated = true;
                state.validated_height = Some(height);
                debug!(height, "merkle validation succeeded");
            }
            Err(e) => {
                state.validated = false;
                state.run = RunState::Stopped;
                error!(height, error = %e, "merkle validation failed, validator stopped");
                return;
            }
        }
    }
}
