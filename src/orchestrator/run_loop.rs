//! Cooperative run-loop driver.
//!
//! Owns the controller on a single task and interleaves control commands with
//! chunk execution. Commands are only looked at between chunks, and exactly one
//! chunk is in flight at a time.

use super::controller::{ExecutionController, RunTick, RunTicket};
use crate::model::{Architecture, ExecutionStatus, InfoEvent, MemoryKind};
use bytes::Bytes;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Commands emitted by UI layers to drive the controller.
#[derive(Debug, Clone)]
pub enum Command {
    Upload {
        image: Bytes,
        architecture: Architecture,
    },
    Reset,
    SetArchitecture(Architecture),
    Step,
    Run,
    Stop,
    SetByte {
        kind: MemoryKind,
        address: usize,
        value: u8,
    },
    Quit,
}

/// Handle for a spawned controller task.
pub struct ControllerHandle {
    cmd_tx: UnboundedSender<Command>,
    handle: JoinHandle<ExecutionController>,
}

impl ControllerHandle {
    /// Spawn the run-loop for `controller` on the current runtime.
    pub fn spawn(controller: ExecutionController) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<Command>();
        let handle = tokio::spawn(run_controller(controller, cmd_rx));
        Self { cmd_tx, handle }
    }

    /// Queue a command. Returns false once the loop has exited.
    pub fn send(&self, cmd: Command) -> bool {
        self.cmd_tx.send(cmd).is_ok()
    }

    /// Ask the loop to quit and hand the controller back.
    pub async fn shutdown(self) -> Result<ExecutionController, tokio::task::JoinError> {
        let _ = self.cmd_tx.send(Command::Quit);
        self.handle.await
    }
}

/// Drive `controller` until `Quit` or until every command sender is gone.
pub async fn run_controller(
    mut controller: ExecutionController,
    mut cmd_rx: UnboundedReceiver<Command>,
) -> ExecutionController {
    let chunk_pause = controller.config().chunk_pause;
    let max_chunks = controller.config().max_chunks;
    let mut ticket: Option<RunTicket> = None;
    let mut chunks_this_run = 0u64;

    loop {
        tokio::select! {
            // Pending commands always win over the next chunk.
            biased;

            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else { break };
                match cmd {
                    Command::Quit => break,
                    Command::Run => {
                        // The chunk cap counts from every (re)start, not per ticket.
                        let resuming = controller.status() != ExecutionStatus::Running;
                        if let Ok(t) = controller.start_running() {
                            if resuming {
                                chunks_this_run = 0;
                            }
                            ticket = Some(t);
                        }
                    }
                    Command::Stop => {
                        controller.stop_running();
                    }
                    Command::Step => {
                        let _ = controller.step();
                    }
                    Command::Upload { image, architecture } => {
                        let _ = controller.upload(image, architecture);
                    }
                    Command::Reset => {
                        let _ = controller.reset();
                    }
                    Command::SetArchitecture(architecture) => {
                        let _ = controller.set_architecture(architecture);
                    }
                    Command::SetByte { kind, address, value } => {
                        controller.set_byte(kind, address, value);
                    }
                }
            }
            // Do not run a chunk before yielding; the yield is what lets
            // commands and other tasks in between chunks.
            _ = next_chunk(ticket.is_some(), chunk_pause) => {
                let Some(t) = ticket.as_ref() else { continue };
                match controller.advance(t) {
                    RunTick::Continue => {
                        chunks_this_run += 1;
                        if max_chunks.is_some_and(|m| chunks_this_run >= m) {
                            controller.stop_running();
                            controller.notify(InfoEvent::Message(format!(
                                "Paused after {chunks_this_run} chunks"
                            )));
                            ticket = None;
                        }
                    }
                    RunTick::Finished(status) => {
                        tracing::debug!(%status, chunks = chunks_this_run, "run-loop finished");
                        ticket = None;
                    }
                    RunTick::Superseded => {
                        ticket = None;
                    }
                }
            }
        }
    }

    controller
}

async fn next_chunk(active: bool, pause: Duration) {
    if !active {
        return futures::future::pending().await;
    }
    if pause.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(pause).await;
    }
}
