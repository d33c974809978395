//! Shutdown signal double driven by the test.

use std::sync::{Arc, Condvar, Mutex};

use crate::process::{ShutdownError, ShutdownSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignalState {
    Pending,
    Delivered(i32),
    Closed,
}

#[derive(Clone)]
pub struct TestShutdownSignal {
    inner: Arc<(Mutex<SignalState>, Condvar)>,
}

impl TestShutdownSignal {
    pub fn new() -> Self {
        Self {
            inner: Arc::new((Mutex::new(SignalState::Pending), Condvar::new())),
        }
    }

    /// Delivers `signal` to the waiting supervisor.
    pub fn trigger(&self, signal: i32) {
        self.set(SignalState::Delivered(signal));
    }

    /// Releases the waiter without delivering a signal.
    pub fn close(&self) {
        self.set(SignalState::Closed);
    }

    fn set(&self, state: SignalState) {
        let (lock, cvar) = &*self.inner;
        let mut current = lock.lock().expect("shutdown mutex poisoned");
        if *current == SignalState::Pending {
            *current = state;
        }
        cvar.notify_all();
    }
}

impl Default for TestShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal for TestShutdownSignal {
    fn wait(&self) -> Result<Option<i32>, ShutdownError> {
        let (lock, cvar) = &*self.inner;
        let mut state = lock.lock().expect("shutdown mutex poisoned");
        while *state == SignalState::Pending {
            state = cvar
                .wait(state)
                .expect("shutdown mutex poisoned during wait");
        }
        Ok(match *state {
            SignalState::Delivered(signal) => Some(signal),
            SignalState::Pending | SignalState::Closed => None,
        })
    }
}
