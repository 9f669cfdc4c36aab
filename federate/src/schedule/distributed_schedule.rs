use log::debug;

use hla_sim_shared::LogicalTime;

use crate::{
    error::FederateError,
    manager::FederateManager,
    schedule::{basic_schedule::BasicSchedule, schedule_base::ScheduleBase, stopwatch::Stopwatch},
};

/// Read-only view of the model, run once per tick before local actions
pub type DisplayAction = Box<dyn FnMut(&FederateManager)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Freshest {
    Local,
    External,
}

/// Wraps a host schedule with the federation's synchronization points
///
/// Each tick first advances logical time to the next local action, then applies every remote
/// change up to that time, and only then runs the local actions. No local action ever sees
/// the model behind the federation.
pub struct DistributedSchedule<S: ScheduleBase = BasicSchedule> {
    base: S,
    display: Option<DisplayAction>,
    rti_timer: Stopwatch,
    model_timer: Stopwatch,
    freshest: Freshest,
}

impl<S: ScheduleBase> DistributedSchedule<S> {
    pub fn new(base: S) -> Self {
        Self {
            base,
            display: None,
            rti_timer: Stopwatch::new(),
            model_timer: Stopwatch::new(),
            freshest: Freshest::Local,
        }
    }

    pub fn base(&self) -> &S {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut S {
        &mut self.base
    }

    /// Replace the display action. It must not write shared objects.
    pub fn set_display_action(&mut self, action: DisplayAction) {
        self.display = Some(action);
    }

    /// Earliest pending local action, ordinary or last
    pub fn next_time(&self) -> Option<LogicalTime> {
        match (self.base.next_action_time(), self.base.next_last_action_time()) {
            (Some(action), Some(last)) => Some(action.min(last)),
            (action, last) => action.or(last),
        }
    }

    /// Advance to the next local action time, then settle the group due there
    pub fn pre_execute(&mut self, manager: &mut FederateManager) -> Result<(), FederateError> {
        if let Some(time) = self.next_time() {
            debug!("Advancing to {time}");
            self.rti_timer.start();
            let advanced = manager.advance_to(time, true);
            self.rti_timer.stop();
            advanced?;
        }
        self.base.pre_execute();
        Ok(())
    }

    /// Run one tick
    pub fn execute(&mut self, manager: &mut FederateManager) -> Result<(), FederateError> {
        if !self.base.is_pre_executed() {
            self.pre_execute(manager)?;
        }

        self.rti_timer.start();
        let flushed = manager.flush_callback_buffer();
        if flushed.is_ok() {
            if !manager.external_queue().is_empty() {
                self.freshest = Freshest::External;
            }
            manager.flush_external_event_queue();
            manager.reset_ownership();
        }
        self.rti_timer.stop();
        flushed?;

        if let Some(display) = self.display.as_mut() {
            self.model_timer.start();
            display(manager);
            self.model_timer.stop();
        }

        if self.base.group_len() > 0 {
            self.freshest = Freshest::Local;
        }
        self.model_timer.start();
        self.base.execute_group(manager);
        self.base.reschedule_group();
        if manager.lazy_deletion() {
            let deleted = manager.clean_public_objects();
            if !deleted.is_empty() {
                debug!("Swept {} dropped objects", deleted.len());
            }
        }
        self.model_timer.stop();
        Ok(())
    }

    /// Execute ticks while the next local action is due at or before `end`
    pub fn run_until(
        &mut self,
        manager: &mut FederateManager,
        end: LogicalTime,
    ) -> Result<(), FederateError> {
        while self.next_time().is_some_and(|next| next <= end) {
            self.execute(manager)?;
        }
        Ok(())
    }

    /// Time of the freshest state the model has seen
    ///
    /// After a tick that only applied remote changes this is the earliest external event time
    /// still relevant, otherwise the base schedule's time.
    pub fn current_time(&self, manager: &FederateManager) -> LogicalTime {
        match self.freshest {
            Freshest::External => {
                let queue = manager.external_queue();
                let last = queue.find_last();
                queue.peek_time().map_or(last, |next| next.min(last))
            }
            Freshest::Local => self.base.current_time(),
        }
    }

    /// Wall time spent waiting on the RTI and applying remote changes
    pub fn rti_timer(&self) -> &Stopwatch {
        &self.rti_timer
    }

    /// Wall time spent in display and model actions
    pub fn model_timer(&self) -> &Stopwatch {
        &self.model_timer
    }
}

impl Default for DistributedSchedule<BasicSchedule> {
    fn default() -> Self {
        Self::new(BasicSchedule::new())
    }
}
