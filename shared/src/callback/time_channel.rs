use std::sync::{Arc, RwLock};

use crate::{callback::error::CallbackError, types::LogicalTime};

const CHANNEL: &str = "TimeChannel";

/// Observer of every time-advance grant, notified after the advancer state is updated
///
/// Runs while the channel is locked, so it must not query the channel itself.
pub trait TimeListener: Send + Sync {
    fn time_advanced(&mut self, time: LogicalTime);
}

// TimeChannel
#[derive(Clone)]
pub struct TimeChannel {
    data: Arc<RwLock<TimeData>>,
}

impl TimeChannel {
    pub fn new_channel() -> (TimeMutator, TimeAccessor) {
        let channel = Self {
            data: Arc::new(RwLock::new(TimeData::new())),
        };

        let mutator = TimeMutator::new(&channel);
        let accessor = TimeAccessor::new(&channel);

        (mutator, accessor)
    }

    fn try_read<T>(&self, read: impl FnOnce(&TimeData) -> T) -> Result<T, CallbackError> {
        let data = self
            .data
            .as_ref()
            .read()
            .map_err(|_| CallbackError::LockPoisoned { channel: CHANNEL })?;
        Ok(read(&data))
    }

    fn try_write<T>(&self, write: impl FnOnce(&mut TimeData) -> T) -> Result<T, CallbackError> {
        let mut data = self
            .data
            .as_ref()
            .write()
            .map_err(|_| CallbackError::LockPoisoned { channel: CHANNEL })?;
        Ok(write(&mut data))
    }
}

// TimeData
struct TimeData {
    granted: LogicalTime,
    advancing: bool,
    constrained: bool,
    regulating: bool,
    coupled: bool,
    coupling_granted: bool,
    listeners: Vec<Box<dyn TimeListener>>,
}

impl TimeData {
    fn new() -> Self {
        Self {
            granted: 0.0,
            advancing: false,
            constrained: false,
            regulating: false,
            coupled: false,
            coupling_granted: true,
            listeners: Vec::new(),
        }
    }

    fn grant(&mut self, time: LogicalTime) {
        if self.coupled {
            self.granted = time;
            self.advancing = false;
        } else {
            self.coupling_granted = true;
        }

        // advancer state is settled before anyone else hears about the grant
        for listener in self.listeners.iter_mut() {
            listener.time_advanced(time);
        }
    }
}

// TimeMutator
/// Callback-side handle: only flips flags, never calls the RTI
#[derive(Clone)]
pub struct TimeMutator {
    channel: TimeChannel,
}

impl TimeMutator {
    fn new(channel: &TimeChannel) -> Self {
        Self {
            channel: channel.clone(),
        }
    }

    pub fn try_grant(&self, time: LogicalTime) -> Result<(), CallbackError> {
        self.channel.try_write(|data| data.grant(time))
    }

    pub fn try_enable_constrained(&self, time: LogicalTime) -> Result<(), CallbackError> {
        self.channel.try_write(|data| {
            data.constrained = true;
            data.granted = time;
        })
    }

    pub fn try_enable_regulation(&self, time: LogicalTime) -> Result<(), CallbackError> {
        self.channel.try_write(|data| {
            data.regulating = true;
            data.granted = time;
        })
    }
}

// TimeAccessor
/// Driving-thread handle used by the advancer and the coupler
#[derive(Clone)]
pub struct TimeAccessor {
    channel: TimeChannel,
}

impl TimeAccessor {
    fn new(channel: &TimeChannel) -> Self {
        Self {
            channel: channel.clone(),
        }
    }

    /// Get the granted time (panicking version)
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_granted_time` for non-panicking error handling.
    pub fn granted_time(&self) -> LogicalTime {
        self.try_granted_time()
            .expect("Lock on TimeChannel is held by current thread.")
    }

    /// Get the granted time (non-panicking version)
    pub fn try_granted_time(&self) -> Result<LogicalTime, CallbackError> {
        self.channel.try_read(|data| data.granted)
    }

    /// Whether a next-event request is outstanding (panicking version)
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_is_advancing` for non-panicking error handling.
    pub fn is_advancing(&self) -> bool {
        self.try_is_advancing()
            .expect("Lock on TimeChannel is held by current thread.")
    }

    pub fn try_is_advancing(&self) -> Result<bool, CallbackError> {
        self.channel.try_read(|data| data.advancing)
    }

    /// Mark a next-event request as outstanding, before it is issued
    pub fn try_begin_advance(&self) -> Result<(), CallbackError> {
        self.channel.try_write(|data| data.advancing = true)
    }

    /// Clear the outstanding flag after the RTI refused a request
    pub fn try_abandon_advance(&self) -> Result<(), CallbackError> {
        self.channel.try_write(|data| data.advancing = false)
    }

    pub fn try_is_constrained(&self) -> Result<bool, CallbackError> {
        self.channel.try_read(|data| data.constrained)
    }

    pub fn try_is_regulating(&self) -> Result<bool, CallbackError> {
        self.channel.try_read(|data| data.regulating)
    }

    pub fn try_is_coupled(&self) -> Result<bool, CallbackError> {
        self.channel.try_read(|data| data.coupled)
    }

    /// From here on grants move the advancer instead of the coupler
    pub fn try_set_coupled(&self) -> Result<(), CallbackError> {
        self.channel.try_write(|data| data.coupled = true)
    }

    pub fn try_coupling_granted(&self) -> Result<bool, CallbackError> {
        self.channel.try_read(|data| data.coupling_granted)
    }

    pub fn try_begin_coupling_advance(&self) -> Result<(), CallbackError> {
        self.channel.try_write(|data| data.coupling_granted = false)
    }

    pub fn try_add_listener(&self, listener: Box<dyn TimeListener>) -> Result<(), CallbackError> {
        self.channel.try_write(|data| data.listeners.push(listener))
    }
}
