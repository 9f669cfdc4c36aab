use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use log::{debug, warn};

use crate::{
    ambassador::{attribute_values::AttributeValues, federate_ambassador::FederateAmbassador},
    callback::{callback::Callback, error::CallbackError, time_channel::TimeMutator},
    types::{AttributeHandle, ClassHandle, LogicalTime, ObjectHandle},
};

const CHANNEL: &str = "CallbackBuffer";

/// Which callback families are traced at debug level
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallbackLogging {
    pub time: bool,
    pub updates: bool,
    pub ownership: bool,
}

/// The federate ambassador handed to the RTI
///
/// Every object and ownership callback is snapshotted into a [`Callback`] and queued, to be
/// drained by the driving thread outside the RTI's tick. Time callbacks skip the queue and
/// update the [`TimeMutator`] directly, since spinning loops wait on them.
#[derive(Clone)]
pub struct CallbackBuffer {
    queue: Arc<Mutex<VecDeque<Callback>>>,
    time: TimeMutator,
    logging: CallbackLogging,
}

impl CallbackBuffer {
    pub fn new(time: TimeMutator, logging: CallbackLogging) -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            time,
            logging,
        }
    }

    /// Whether no callbacks are waiting (panicking version)
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_is_empty` for non-panicking error handling.
    pub fn is_empty(&self) -> bool {
        self.try_is_empty()
            .expect("Lock on CallbackBuffer is held by current thread.")
    }

    pub fn try_is_empty(&self) -> Result<bool, CallbackError> {
        let queue = self
            .queue
            .lock()
            .map_err(|_| CallbackError::LockPoisoned { channel: CHANNEL })?;
        Ok(queue.is_empty())
    }

    /// Take the oldest buffered callback (panicking version)
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_pop_next` for non-panicking error handling.
    pub fn pop_next(&self) -> Option<Callback> {
        self.try_pop_next()
            .expect("Lock on CallbackBuffer is held by current thread.")
    }

    pub fn try_pop_next(&self) -> Result<Option<Callback>, CallbackError> {
        let mut queue = self
            .queue
            .lock()
            .map_err(|_| CallbackError::LockPoisoned { channel: CHANNEL })?;
        Ok(queue.pop_front())
    }

    /// Take everything buffered so far, oldest first
    pub fn try_drain(&self) -> Result<Vec<Callback>, CallbackError> {
        let mut queue = self
            .queue
            .lock()
            .map_err(|_| CallbackError::LockPoisoned { channel: CHANNEL })?;
        Ok(queue.drain(..).collect())
    }

    fn push(&self, callback: Callback) {
        let traced = match &callback {
            Callback::Reflect { .. } | Callback::Discover { .. } | Callback::Remove { .. } => {
                self.logging.updates
            }
            _ => self.logging.ownership,
        };
        if traced {
            debug!("Buffered {}", callback.log());
        }

        match self.queue.lock() {
            Ok(mut queue) => queue.push_back(callback),
            Err(_) => warn!("Dropped {}: callback buffer lock is poisoned", callback.log()),
        }
    }

    fn time_callback(
        &self,
        operation: &'static str,
        result: Result<(), CallbackError>,
        time: LogicalTime,
    ) {
        if self.logging.time {
            debug!("{operation} at {time}");
        }
        if let Err(error) = result {
            warn!("Could not record {operation} at {time}: {error}");
        }
    }
}

impl FederateAmbassador for CallbackBuffer {
    fn discover_object_instance(&self, object: ObjectHandle, class: ClassHandle, _name: &str) {
        self.push(Callback::Discover { object, class });
    }

    fn reflect_attribute_values(
        &self,
        object: ObjectHandle,
        values: &AttributeValues,
        time: Option<LogicalTime>,
    ) {
        self.push(Callback::Reflect {
            object,
            values: values.clone(),
            time,
        });
    }

    fn remove_object_instance(&self, object: ObjectHandle, time: Option<LogicalTime>) {
        self.push(Callback::Remove { object, time });
    }

    fn provide_attribute_value_update(&self, object: ObjectHandle, attributes: &[AttributeHandle]) {
        self.push(Callback::ProvideUpdate {
            object,
            attributes: attributes.to_vec(),
        });
    }

    fn attribute_ownership_acquisition_notification(
        &self,
        object: ObjectHandle,
        attributes: &[AttributeHandle],
    ) {
        self.push(Callback::OwnershipAcquired {
            object,
            attributes: attributes.to_vec(),
        });
    }

    fn attribute_ownership_unavailable(
        &self,
        object: ObjectHandle,
        attributes: &[AttributeHandle],
    ) {
        self.push(Callback::OwnershipUnavailable {
            object,
            attributes: attributes.to_vec(),
        });
    }

    fn request_attribute_ownership_release(
        &self,
        object: ObjectHandle,
        attributes: &[AttributeHandle],
    ) {
        self.push(Callback::ReleaseRequest {
            object,
            attributes: attributes.to_vec(),
        });
    }

    fn time_regulation_enabled(&self, time: LogicalTime) {
        let result = self.time.try_enable_regulation(time);
        self.time_callback("time regulation enabled", result, time);
    }

    fn time_constrained_enabled(&self, time: LogicalTime) {
        let result = self.time.try_enable_constrained(time);
        self.time_callback("time constrained enabled", result, time);
    }

    fn time_advance_grant(&self, time: LogicalTime) {
        let result = self.time.try_grant(time);
        self.time_callback("time advance grant", result, time);
    }
}
