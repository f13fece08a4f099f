//! Notification publishing strategies.

mod concurrent;
mod sequential;

pub use concurrent::ConcurrentPublisher;
pub use sequential::SequentialPublisher;
