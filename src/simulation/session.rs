//! Scoped ownership of a simulator connection
//!
//! A `Session` is the only way the editor and the aggregator reach the
//! simulator. Closing is explicit through [`Session::close`]; a session that
//! goes out of scope without it (early return, `?`, panic) is closed on drop
//! and any failure there is only logged.

use log::warn;

use super::control::SimControl;
use super::error::{Result, SimError};

pub struct Session<C: SimControl> {
    control: Option<C>,
}

impl<C: SimControl> Session<C> {
    /// Take ownership of an already-started simulator
    pub fn open(control: C) -> Self {
        Self {
            control: Some(control),
        }
    }

    pub fn is_open(&self) -> bool {
        self.control.is_some()
    }

    /// Borrow the simulator, failing with `SessionNotReady` once closed
    pub fn control(&mut self) -> Result<&mut C> {
        self.control.as_mut().ok_or(SimError::SessionNotReady)
    }

    /// Close the simulator. Further use of the session fails with
    /// `SessionNotReady`; closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        match self.control.take() {
            Some(mut control) => control.close(),
            None => Ok(()),
        }
    }
}

impl<C: SimControl> Drop for Session<C> {
    fn drop(&mut self) {
        if let Some(mut control) = self.control.take() {
            if let Err(e) = control.close() {
                warn!("Failed to close simulation session: {}", e);
            }
        }
    }
}
