use std::{
    collections::VecDeque,
    thread,
    time::{Duration, Instant},
};

use crate::{
    ambassador::rti_ambassador::RtiAmbassador,
    callback::{callback::Callback, callback_buffer::CallbackBuffer, time_channel::TimeAccessor},
    link::{
        cancellation::CancellationToken,
        error::LinkError,
        tick_config::{TickConfig, TickKind},
    },
    types::LogicalTime,
};

/// A federate's connection to the RTI
///
/// Owns the ambassador, drains the callback buffer after each tick, and runs the polling loops
/// that wait on RTI progress. Ownership notices are separated from the rest of the callbacks
/// because they are applied as soon as they arrive, while everything else waits for the
/// driving thread to route it.
pub struct RtiLink {
    ambassador: Box<dyn RtiAmbassador>,
    callbacks: CallbackBuffer,
    time: TimeAccessor,
    config: TickConfig,
    cancel: CancellationToken,
    ownership_notices: VecDeque<Callback>,
    inbox: VecDeque<Callback>,
}

impl RtiLink {
    pub fn new(
        ambassador: Box<dyn RtiAmbassador>,
        callbacks: CallbackBuffer,
        time: TimeAccessor,
        config: TickConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            ambassador,
            callbacks,
            time,
            config,
            cancel,
            ownership_notices: VecDeque::new(),
            inbox: VecDeque::new(),
        }
    }

    pub fn ambassador(&mut self) -> &mut dyn RtiAmbassador {
        self.ambassador.as_mut()
    }

    pub fn callbacks(&self) -> &CallbackBuffer {
        &self.callbacks
    }

    pub fn time(&self) -> &TimeAccessor {
        &self.time
    }

    pub fn config(&self) -> &TickConfig {
        &self.config
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn granted_time(&self) -> Result<LogicalTime, LinkError> {
        Ok(self.time.try_granted_time()?)
    }

    /// Tick the RTI once, then sort whatever it delivered
    pub fn tick(&mut self, kind: TickKind) -> Result<(), LinkError> {
        let (min, max) = self.config.bounds(kind);
        self.ambassador
            .tick(min, max)
            .map_err(|source| LinkError::rti("tick", source))?;
        self.pump()
    }

    /// Move buffered callbacks into the link's queues without ticking
    pub fn pump(&mut self) -> Result<(), LinkError> {
        for callback in self.callbacks.try_drain()? {
            if callback.is_ownership_notice() {
                self.ownership_notices.push_back(callback);
            } else {
                self.inbox.push_back(callback);
            }
        }
        Ok(())
    }

    pub fn take_ownership_notices(&mut self) -> VecDeque<Callback> {
        std::mem::take(&mut self.ownership_notices)
    }

    pub fn take_inbox(&mut self) -> VecDeque<Callback> {
        std::mem::take(&mut self.inbox)
    }

    /// Put callbacks back ahead of anything that arrived since they were taken
    pub fn defer(&mut self, callbacks: VecDeque<Callback>) {
        let mut callbacks = callbacks;
        callbacks.append(&mut self.inbox);
        self.inbox = callbacks;
    }

    pub fn has_pending(&self) -> bool {
        !self.inbox.is_empty() || !self.ownership_notices.is_empty()
    }

    /// Poll until `poll` reports completion
    ///
    /// Each round checks the cancellation token and the timeout, then sleeps for the
    /// configured backoff. The poll itself is expected to tick.
    pub fn wait_until<E, F>(
        &mut self,
        operation: &'static str,
        timeout: Option<Duration>,
        mut poll: F,
    ) -> Result<(), E>
    where
        E: From<LinkError>,
        F: FnMut(&mut Self) -> Result<bool, E>,
    {
        self.wait_for(operation, timeout, |link| Ok(poll(link)?.then_some(())))
    }

    /// Poll until `poll` produces a value, with the same bounds as [`RtiLink::wait_until`]
    pub fn wait_for<T, E, F>(
        &mut self,
        operation: &'static str,
        timeout: Option<Duration>,
        mut poll: F,
    ) -> Result<T, E>
    where
        E: From<LinkError>,
        F: FnMut(&mut Self) -> Result<Option<T>, E>,
    {
        let started = Instant::now();
        loop {
            if let Some(value) = poll(self)? {
                return Ok(value);
            }
            if self.cancel.is_cancelled() {
                return Err(LinkError::Cancelled { operation }.into());
            }
            if let Some(timeout) = timeout {
                let waited = started.elapsed();
                if waited >= timeout {
                    return Err(LinkError::TimedOut { operation, waited }.into());
                }
            }
            if !self.config.poll_backoff.is_zero() {
                thread::sleep(self.config.poll_backoff);
            }
        }
    }
}
