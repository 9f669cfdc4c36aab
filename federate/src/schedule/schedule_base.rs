use hla_sim_shared::LogicalTime;

use crate::{error::FederateError, manager::FederateManager};

/// A model action run against the federate when its time comes up
pub type ScheduledAction = Box<dyn FnMut(&mut FederateManager) -> Result<(), FederateError>>;

/// The host discrete-event scheduler a [`DistributedSchedule`](super::DistributedSchedule)
/// synchronizes with the federation
///
/// A tick is `pre_execute`, which settles the group of actions due next, followed by
/// `execute_group` and `reschedule_group`.
pub trait ScheduleBase {
    /// Time of the earliest ordinary action, if any
    fn next_action_time(&self) -> Option<LogicalTime>;

    /// Time of the earliest action that runs after the ordinary ones of its tick
    fn next_last_action_time(&self) -> Option<LogicalTime>;

    /// Pull every action due at the earliest pending time into the current group
    fn pre_execute(&mut self);

    fn is_pre_executed(&self) -> bool;

    /// Number of actions in the current group
    fn group_len(&self) -> usize;

    fn execute_group(&mut self, manager: &mut FederateManager);

    /// Put repeating actions of the executed group back in the queue and clear the group
    fn reschedule_group(&mut self);

    /// Time of the most recently settled group
    fn current_time(&self) -> LogicalTime;
}
