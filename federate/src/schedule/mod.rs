mod basic_schedule;
pub use basic_schedule::BasicSchedule;

mod distributed_schedule;
pub use distributed_schedule::{DisplayAction, DistributedSchedule};

mod schedule_base;
pub use schedule_base::{ScheduleBase, ScheduledAction};

mod stopwatch;
pub use stopwatch::Stopwatch;
