//! Execution controller and port I/O manager for processor emulators.
//!
//! The [`orchestrator::ExecutionController`] owns one engine session and its
//! run/step/stop state machine; [`io::IoManager`] keeps per-port output logs
//! and input queues and notifies subscribers on every change. Engines plug in
//! through [`engine::CoreEngine`].

pub mod cli;
pub mod engine;
pub mod error;
pub mod io;
pub mod logging;
pub mod model;
pub mod orchestrator;
pub mod selection;
pub mod text_summary;
