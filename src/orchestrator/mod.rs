//! Execution orchestration.
//!
//! This module owns the processor session lifecycle (create/upload/reset),
//! the run/step/stop state machine and the cooperative run-loop that drives it,
//! plus post-run report building. UI/CLI layers call into this module and
//! observe it through the event channel and the shared I/O manager.

mod bridge;
mod controller;
mod post_process;
mod run_loop;
mod session;

pub use controller::{ExecutionController, RunTick, RunTicket};
pub use post_process::build_report;
pub use run_loop::{run_controller, Command, ControllerHandle};
pub use session::{LastExecutable, SessionId};
