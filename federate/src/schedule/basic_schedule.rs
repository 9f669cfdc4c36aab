use log::warn;

use hla_sim_shared::{EventQueue, LogicalTime};

use crate::{
    error::FederateError,
    manager::FederateManager,
    schedule::schedule_base::{ScheduleBase, ScheduledAction},
};

// Entry
struct Entry {
    action: ScheduledAction,
    interval: Option<LogicalTime>,
    last: bool,
}

/// A single-threaded discrete-event schedule
///
/// Actions due at the same time run in the order they were scheduled. Actions scheduled with
/// [`BasicSchedule::schedule_at_end`] run after every ordinary action of their tick.
pub struct BasicSchedule {
    actions: EventQueue<Entry>,
    last_actions: EventQueue<Entry>,
    group: Vec<Entry>,
    current: LogicalTime,
    pre_executed: bool,
}

impl BasicSchedule {
    pub fn new() -> Self {
        Self {
            actions: EventQueue::new(),
            last_actions: EventQueue::new(),
            group: Vec::new(),
            current: 0.0,
            pre_executed: false,
        }
    }

    /// Run `action` once at `time`
    pub fn schedule_at(
        &mut self,
        time: LogicalTime,
        action: ScheduledAction,
    ) -> Result<(), FederateError> {
        self.insert(time, action, None, false)
    }

    /// Run `action` at `start` and every `interval` after it
    pub fn schedule_repeating(
        &mut self,
        start: LogicalTime,
        interval: LogicalTime,
        action: ScheduledAction,
    ) -> Result<(), FederateError> {
        if interval.is_nan() || interval <= 0.0 {
            return Err(FederateError::InvalidInterval { interval });
        }
        self.insert(start, action, Some(interval), false)
    }

    /// Run `action` once at `time`, after the ordinary actions due then
    pub fn schedule_at_end(
        &mut self,
        time: LogicalTime,
        action: ScheduledAction,
    ) -> Result<(), FederateError> {
        self.insert(time, action, None, true)
    }

    /// Pending actions, not counting the current group
    pub fn len(&self) -> usize {
        self.actions.len() + self.last_actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.group.is_empty()
    }

    fn insert(
        &mut self,
        time: LogicalTime,
        action: ScheduledAction,
        interval: Option<LogicalTime>,
        last: bool,
    ) -> Result<(), FederateError> {
        if time < self.current {
            return Err(FederateError::ScheduleInPast {
                time,
                current: self.current,
            });
        }
        let entry = Entry {
            action,
            interval,
            last,
        };
        let queue = if last {
            &mut self.last_actions
        } else {
            &mut self.actions
        };
        queue.try_enqueue(entry, time)?;
        Ok(())
    }

    fn next_time(&self) -> Option<LogicalTime> {
        match (self.next_action_time(), self.next_last_action_time()) {
            (Some(action), Some(last)) => Some(action.min(last)),
            (action, last) => action.or(last),
        }
    }
}

impl ScheduleBase for BasicSchedule {
    fn next_action_time(&self) -> Option<LogicalTime> {
        self.actions.peek_time()
    }

    fn next_last_action_time(&self) -> Option<LogicalTime> {
        self.last_actions.peek_time()
    }

    fn pre_execute(&mut self) {
        self.pre_executed = true;
        let Some(time) = self.next_time() else {
            return;
        };
        self.current = time;

        for queue in [&mut self.actions, &mut self.last_actions] {
            while queue.peek_time() == Some(time) {
                if let Some((_, entry)) = queue.next() {
                    self.group.push(entry);
                }
            }
        }
    }

    fn is_pre_executed(&self) -> bool {
        self.pre_executed
    }

    fn group_len(&self) -> usize {
        self.group.len()
    }

    fn execute_group(&mut self, manager: &mut FederateManager) {
        for entry in self.group.iter_mut() {
            if let Err(error) = (entry.action)(manager) {
                warn!("Action at {} failed: {error}", self.current);
            }
        }
    }

    fn reschedule_group(&mut self) {
        for entry in std::mem::take(&mut self.group) {
            let Some(interval) = entry.interval else {
                continue;
            };
            let time = self.current + interval;
            let queue = if entry.last {
                &mut self.last_actions
            } else {
                &mut self.actions
            };
            if let Err(error) = queue.try_enqueue(entry, time) {
                warn!("Dropped repeating action: {error}");
            }
        }
        self.pre_executed = false;
    }

    fn current_time(&self) -> LogicalTime {
        self.current
    }
}

impl Default for BasicSchedule {
    fn default() -> Self {
        Self::new()
    }
}
