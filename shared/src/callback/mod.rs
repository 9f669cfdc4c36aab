pub mod callback;
pub mod callback_buffer;
pub mod error;
pub mod time_channel;
