//! Standard behaviors.
//!
//! The processor runners and [`ExceptionBehavior`] are composed by the
//! dispatcher for every request that has processors or exception handlers
//! bound. [`LoggingBehavior`] and `TimeoutBehavior` are opt-in, added through
//! [`MediatorConfigBuilder::with_behavior`](crate::config::MediatorConfigBuilder::with_behavior).

mod exception;
mod logging;
mod processors;
#[cfg(feature = "timeout")]
mod timeout;

pub use exception::ExceptionBehavior;
pub use logging::LoggingBehavior;
pub use processors::{PostProcessorBehavior, PreProcessorBehavior};
#[cfg(feature = "timeout")]
pub use timeout::{TimeoutBehavior, TimeoutError};
