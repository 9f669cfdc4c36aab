use log::{debug, info};

use hla_sim_shared::{LogicalTime, RtiLink, TickKind, LOOKAHEAD};

use crate::error::FederateError;

/// Progress through the constrained/regulating handshake
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdvancerState {
    Uninitialized,
    ConstrainedPending,
    RegulatingPending,
    Steady,
}

/// Drives this federate's logical time
///
/// Grants are recorded by the callback buffer in the link's time channel, before any
/// `TimeListener` hears of them, so the in-flight flag read here is never stale.
pub struct Advancer {
    state: AdvancerState,
}

impl Advancer {
    pub fn new() -> Self {
        Self {
            state: AdvancerState::Uninitialized,
        }
    }

    pub fn state(&self) -> AdvancerState {
        self.state
    }

    /// Become time constrained, then time regulating at the current time with zero lookahead
    pub fn initialise(&mut self, link: &mut RtiLink) -> Result<(), FederateError> {
        self.expect(AdvancerState::Uninitialized)?;
        let timeout = link.config().advance_timeout;

        self.state = AdvancerState::ConstrainedPending;
        link.ambassador()
            .enable_time_constrained()
            .map_err(|source| FederateError::rti("enable time constrained", source))?;
        link.wait_until::<FederateError, _>("time constrained", timeout, |link| {
            link.tick(TickKind::Long)?;
            Ok(link.time().try_is_constrained()?)
        })?;

        self.state = AdvancerState::RegulatingPending;
        let time = link.granted_time()?;
        link.ambassador()
            .enable_time_regulation(time, LOOKAHEAD)
            .map_err(|source| FederateError::rti("enable time regulation", source))?;
        link.wait_until::<FederateError, _>("time regulation", timeout, |link| {
            link.tick(TickKind::Long)?;
            Ok(link.time().try_is_regulating()?)
        })?;

        self.state = AdvancerState::Steady;
        info!("Time constrained and regulating from {}", link.granted_time()?);
        Ok(())
    }

    /// Request a grant up to `target`
    ///
    /// A non-blocking call issues one request and ticks once. A blocking call keeps
    /// requesting, or ticking while a request is in flight, until the granted time is
    /// exactly `target`. Targets behind the granted time are rejected by the RTI.
    pub fn advance_to(
        &mut self,
        link: &mut RtiLink,
        target: LogicalTime,
        blocking: bool,
    ) -> Result<(), FederateError> {
        self.expect(AdvancerState::Steady)?;

        if !blocking {
            if !link.time().try_is_advancing()? {
                Self::request(link, target)?;
            }
            link.tick(TickKind::Long)?;
            return Ok(());
        }

        let timeout = link.config().advance_timeout;
        link.wait_until::<FederateError, _>("advance time", timeout, |link| {
            let time = link.time();
            if time.try_granted_time()? == target && !time.try_is_advancing()? {
                return Ok(true);
            }
            if time.try_is_advancing()? {
                link.tick(TickKind::Long)?;
            } else {
                Self::request(link, target)?;
            }
            Ok(false)
        })
    }

    fn request(link: &mut RtiLink, target: LogicalTime) -> Result<(), FederateError> {
        link.time().try_begin_advance()?;
        if let Err(source) = link.ambassador().next_event_request_available(target) {
            link.time().try_abandon_advance()?;
            return Err(FederateError::rti("next event request", source));
        }
        debug!("Requested advance to {target}");
        Ok(())
    }

    fn expect(&self, expected: AdvancerState) -> Result<(), FederateError> {
        if self.state != expected {
            return Err(FederateError::AdvancerNotReady {
                state: self.state,
                expected,
            });
        }
        Ok(())
    }
}

impl Default for Advancer {
    fn default() -> Self {
        Self::new()
    }
}
