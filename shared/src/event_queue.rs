use thiserror::Error;

use crate::types::LogicalTime;

/// Errors that can occur during EventQueue operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EventQueueError {
    /// Attempted to enqueue an event at a time that cannot be ordered
    #[error("Event time {time} cannot be ordered")]
    InvalidTime { time: LogicalTime },
}

/// Buffer of external events ordered by logical time
///
/// Events with equal times leave in the order they arrived. Not synchronized: only the
/// driving thread touches it.
pub struct EventQueue<T> {
    list: Vec<(LogicalTime, T)>,
    last: LogicalTime,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self {
            list: Vec::new(),
            last: LogicalTime::INFINITY,
        }
    }

    /// Inserts an event, scanning from the back so that equal times keep arrival order.
    /// Returns an error for NaN times.
    pub fn try_enqueue(&mut self, item: T, time: LogicalTime) -> Result<(), EventQueueError> {
        if time.is_nan() {
            return Err(EventQueueError::InvalidTime { time });
        }

        let mut index = self.list.len();
        while index > 0 && self.list[index - 1].0 > time {
            index -= 1;
        }
        self.list.insert(index, (time, item));
        Ok(())
    }

    /// Inserts an event in time order.
    ///
    /// # Panics
    ///
    /// Panics if `time` is NaN.
    pub fn enqueue(&mut self, item: T, time: LogicalTime) {
        self.try_enqueue(item, time)
            .expect("event times must be ordered numbers")
    }

    /// Pops the earliest event and remembers its time
    pub fn next(&mut self) -> Option<(LogicalTime, T)> {
        if self.list.is_empty() {
            return None;
        }
        let (time, item) = self.list.remove(0);
        self.last = time;
        Some((time, item))
    }

    pub fn peek_time(&self) -> Option<LogicalTime> {
        self.list.first().map(|(time, _)| *time)
    }

    /// Time of the most recently popped event, infinite until the first pop
    pub fn find_last(&self) -> LogicalTime {
        self.last
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
