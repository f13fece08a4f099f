//! # herald-std
//!
//! Standard implementations for the Herald in-process mediator.
//!
//! This crate provides:
//! - **Resolution**: [`Registry`](registry::Registry) and its builder
//! - **Dispatch**: [`Dispatcher`](dispatch::Dispatcher), the default mediator
//! - **Configuration**: [`MediatorConfig`](config::MediatorConfig)
//! - **Standard behaviors**: Processors, exception interception, logging, timeout
//! - **Publishing strategies**: Sequential, concurrent
//! - **Auto-binding**: handlers submitted through `inventory` (feature `inventory`)

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use herald_core;

// Modules
pub mod behaviors;
pub mod config;
pub mod dispatch;
pub mod publishers;
pub mod registry;
pub mod testing;

#[cfg(feature = "inventory")]
pub use inventory;
