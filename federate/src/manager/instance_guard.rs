use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::FederateError;

static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Marks a live manager for the process; released on drop
pub(crate) struct InstanceGuard;

impl InstanceGuard {
    pub(crate) fn acquire() -> Result<Self, FederateError> {
        ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| FederateError::ManagerAlreadyActive)?;
        Ok(Self)
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        ACTIVE.store(false, Ordering::Release);
    }
}
