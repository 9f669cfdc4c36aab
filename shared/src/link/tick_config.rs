use std::{default::Default, time::Duration};

/// How long a single RTI tick may wait for callbacks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickKind {
    /// Bounded wait used while polling for a specific callback
    Short,
    /// Drains whatever the RTI has ready
    Long,
}

/// Contains Config properties for ticking the RTI and for the loops that spin on it
#[derive(Clone, Debug)]
pub struct TickConfig {
    /// Minimum and maximum wall time of a short tick
    pub short_tick: (Duration, Duration),
    /// Minimum and maximum wall time of a long tick
    pub long_tick: (Duration, Duration),
    /// Sleep between polls of a spin loop
    pub poll_backoff: Duration,
    /// Bound on the constrained/regulating handshake and blocking advances. `None` waits forever.
    pub advance_timeout: Option<Duration>,
    /// Bound on each coupling rendezvous loop. `None` waits forever.
    pub coupling_timeout: Option<Duration>,
    /// Bound on waiting for an ownership outcome. `None` waits forever.
    pub ownership_timeout: Option<Duration>,
}

impl TickConfig {
    pub fn bounds(&self, kind: TickKind) -> (Duration, Duration) {
        match kind {
            TickKind::Short => self.short_tick,
            TickKind::Long => self.long_tick,
        }
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            short_tick: (Duration::from_millis(100), Duration::from_millis(500)),
            long_tick: (Duration::ZERO, Duration::ZERO),
            poll_backoff: Duration::ZERO,
            advance_timeout: None,
            coupling_timeout: None,
            ownership_timeout: None,
        }
    }
}
