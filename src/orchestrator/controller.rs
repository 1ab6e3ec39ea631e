//! Execution controller.
//!
//! Owns the current processor session and the run/step/stop state machine.
//! Everything here is synchronous; the async driver in `run_loop` schedules
//! chunks and feeds commands in between them.

use super::bridge::PortBridge;
use super::session::{LastExecutable, ProcessorSession, SessionId};
use crate::engine::EngineFactory;
use crate::error::{ControlError, SessionError};
use crate::io::IoManager;
use crate::model::{
    Architecture, ChunkOutcome, ControllerEvent, ExecutionStatus, FailureContext, InfoEvent,
    MemoryKind, RunConfig, RunStats, Snapshot,
};
use crate::selection::SelectedAddress;
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Permission to run chunks for one session, handed out by `start_running`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTicket {
    session: SessionId,
}

impl RunTicket {
    pub fn session(&self) -> SessionId {
        self.session
    }
}

/// What the run-loop should do after one `advance` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTick {
    /// The engine wants another chunk; yield and call `advance` again.
    Continue,
    /// The loop is over; status is no longer `Running`.
    Finished(ExecutionStatus),
    /// The ticket's session was replaced. Status belongs to the new session.
    Superseded,
}

pub struct ExecutionController {
    factory: Arc<dyn EngineFactory>,
    io: IoManager,
    selection: SelectedAddress,
    event_tx: UnboundedSender<ControllerEvent>,
    config: RunConfig,
    session: Option<ProcessorSession>,
    architecture: Architecture,
    status: ExecutionStatus,
    error: Option<String>,
    last_executable: Option<LastExecutable>,
    snapshot: Snapshot,
    next_session: u64,
}

impl ExecutionController {
    pub fn new(
        factory: Arc<dyn EngineFactory>,
        io: IoManager,
        selection: SelectedAddress,
        config: RunConfig,
        event_tx: UnboundedSender<ControllerEvent>,
    ) -> Self {
        Self {
            factory,
            io,
            selection,
            event_tx,
            architecture: config.architecture,
            config,
            session: None,
            status: ExecutionStatus::Ready,
            error: None,
            last_executable: None,
            snapshot: Snapshot::default(),
            next_session: 0,
        }
    }

    /// Replace the session with a fresh engine for `architecture`.
    pub fn create_session(&mut self, architecture: Architecture) -> Result<(), SessionError> {
        self.replace_session(architecture, None, FailureContext::Init)
    }

    /// Create a session and load `image` into it. Retained for `reset` on success.
    pub fn upload(&mut self, image: Bytes, architecture: Architecture) -> Result<(), SessionError> {
        self.replace_session(architecture, Some(&image), FailureContext::Upload)?;
        self.last_executable = Some(LastExecutable {
            image,
            architecture,
        });
        Ok(())
    }

    /// Reload the last uploaded program. No-op when nothing was uploaded.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        let Some(last) = self.last_executable.clone() else {
            tracing::debug!("reset requested with no retained program");
            return Ok(());
        };
        self.replace_session(last.architecture, Some(&last.image), FailureContext::Reset)
    }

    /// Switch architecture, reloading the retained program under it if there is one.
    pub fn set_architecture(&mut self, architecture: Architecture) -> Result<(), SessionError> {
        match self.last_executable.clone() {
            Some(last) => {
                self.replace_session(
                    architecture,
                    Some(&last.image),
                    FailureContext::ArchitectureChange,
                )?;
                self.last_executable = Some(LastExecutable {
                    image: last.image,
                    architecture,
                });
                Ok(())
            }
            None => self.replace_session(architecture, None, FailureContext::ArchitectureChange),
        }
    }

    /// Execute exactly one instruction. Returns the resulting status.
    pub fn step(&mut self) -> Result<ExecutionStatus, ControlError> {
        self.check_can_advance("step")?;
        let outcome = self.dispatch(1);
        if let Some(session) = self.session.as_mut() {
            session.stats.steps += 1;
        }
        self.classify(outcome);
        Ok(self.status)
    }

    /// Enter `Running` and hand back the ticket the run-loop must present.
    pub fn start_running(&mut self) -> Result<RunTicket, ControlError> {
        if self.status == ExecutionStatus::Running {
            if let Some(session) = &self.session {
                return Ok(RunTicket {
                    session: session.id,
                });
            }
        }
        let session = self.check_can_advance("run")?;
        self.set_status(ExecutionStatus::Running);
        Ok(RunTicket { session })
    }

    /// `Running -> Paused`. Returns false when nothing was running.
    pub fn stop_running(&mut self) -> bool {
        if self.status != ExecutionStatus::Running {
            return false;
        }
        self.set_status(ExecutionStatus::Paused);
        true
    }

    /// Run one chunk for the ticket's session, if it is still current and running.
    pub fn advance(&mut self, ticket: &RunTicket) -> RunTick {
        if !self.is_current(ticket.session) {
            tracing::debug!(session = %ticket.session, "dropping run-loop of replaced session");
            return RunTick::Superseded;
        }
        if self.status != ExecutionStatus::Running {
            return RunTick::Finished(self.status);
        }
        let outcome = self.dispatch(self.config.chunk_size.max(1));
        if let Some(session) = self.session.as_mut() {
            session.stats.chunks += 1;
        }
        match outcome {
            ChunkOutcome::Continue => RunTick::Continue,
            _ => {
                self.classify(outcome);
                RunTick::Finished(self.status)
            }
        }
    }

    /// Write one memory cell. The engine's answer is authoritative.
    pub fn set_byte(&mut self, kind: MemoryKind, address: usize, value: u8) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let written = session.engine.write_memory_cell(kind, address, value);
        if written {
            self.refresh_snapshot();
        } else {
            tracing::debug!(?kind, address, value, "memory write rejected");
        }
        written
    }

    pub fn peek_stack(&self, offset_from_top: usize) -> Option<u64> {
        self.session
            .as_ref()
            .and_then(|s| s.engine.peek_stack(offset_from_top).ok())
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    /// Message of the last failure while `Errored`.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn architecture(&self) -> Architecture {
        self.architecture
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn stats(&self) -> RunStats {
        self.session.as_ref().map(|s| s.stats).unwrap_or_default()
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn io(&self) -> &IoManager {
        &self.io
    }

    pub fn last_executable(&self) -> Option<&LastExecutable> {
        self.last_executable.as_ref()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    pub fn is_current(&self, id: SessionId) -> bool {
        self.session_id() == Some(id)
    }

    /// Publish an info message on the notification channel.
    pub fn notify(&self, info: InfoEvent) {
        let _ = self.event_tx.send(ControllerEvent::Info(info));
    }

    fn replace_session(
        &mut self,
        architecture: Architecture,
        image: Option<&Bytes>,
        context: FailureContext,
    ) -> Result<(), SessionError> {
        // The old session is gone before the new one is built; a failed build
        // leaves no session rather than the stale one.
        self.session = None;
        self.next_session += 1;
        let id = SessionId(self.next_session);
        self.architecture = architecture;
        self.error = None;
        self.snapshot = Snapshot::default();
        self.selection.clear();
        self.io.clear();

        let mut engine = match self.factory.create(architecture, None) {
            Ok(engine) => engine,
            Err(fault) => {
                return Err(self.fail(
                    context,
                    SessionError::EngineInit {
                        architecture,
                        message: fault.message,
                    },
                ))
            }
        };
        if let Some(image) = image {
            if let Err(fault) = engine.load_program(image) {
                return Err(self.fail(
                    context,
                    SessionError::ProgramLoad {
                        message: fault.message,
                    },
                ));
            }
        }

        self.session = Some(ProcessorSession {
            id,
            architecture,
            engine,
            stats: RunStats::default(),
        });
        self.refresh_snapshot();
        self.set_status(ExecutionStatus::Ready);
        tracing::info!(%id, %architecture, "processor session created");
        self.notify(InfoEvent::SessionCreated { architecture });
        if let Some(image) = image {
            self.notify(InfoEvent::ProgramLoaded {
                architecture,
                bytes: image.len(),
            });
        }
        Ok(())
    }

    fn check_can_advance(&self, operation: &'static str) -> Result<SessionId, ControlError> {
        if !self.status.can_advance() {
            tracing::warn!(operation, status = %self.status, "control request refused");
            self.notify(InfoEvent::Refused {
                operation: operation.to_string(),
                status: self.status,
            });
            return Err(ControlError::Refused {
                operation,
                status: self.status,
            });
        }
        self.session_id().ok_or(ControlError::NoSession)
    }

    /// Run up to `budget` instructions. Engine faults become `ChunkOutcome::Error`
    /// with the message parked in `self.error` for `classify`.
    fn dispatch(&mut self, budget: u32) -> ChunkOutcome {
        let Some(session) = self.session.as_mut() else {
            return ChunkOutcome::Error;
        };
        tracing::trace!(
            session = %session.id,
            architecture = %session.architecture,
            budget,
            "dispatching"
        );
        let mut bridge = PortBridge::new(&self.io);
        let outcome = match session.engine.run_chunk(&mut bridge, budget) {
            Ok(ChunkOutcome::Error) => {
                self.error = Some(
                    session
                        .engine
                        .error_message()
                        .unwrap_or_else(|| "execution error".to_string()),
                );
                ChunkOutcome::Error
            }
            Ok(outcome) => outcome,
            Err(fault) => {
                self.error = Some(fault.message);
                ChunkOutcome::Error
            }
        };
        tracing::trace!(budget, ?outcome, "chunk finished");
        self.refresh_snapshot();
        outcome
    }

    fn classify(&mut self, outcome: ChunkOutcome) {
        match outcome {
            ChunkOutcome::Continue => self.set_status(ExecutionStatus::Paused),
            ChunkOutcome::Halt => {
                tracing::info!("program halted");
                self.set_status(ExecutionStatus::Halted);
            }
            ChunkOutcome::Error => {
                let message = self
                    .error
                    .take()
                    .unwrap_or_else(|| "execution error".to_string());
                self.fail(FailureContext::Execution, SessionError::Execution { message });
            }
        }
    }

    fn fail(&mut self, context: FailureContext, err: SessionError) -> SessionError {
        tracing::error!(?context, "{err}");
        self.error = Some(err.message().to_string());
        self.set_status(ExecutionStatus::Errored);
        self.notify(InfoEvent::Failure {
            context,
            message: err.message().to_string(),
        });
        err
    }

    fn refresh_snapshot(&mut self) {
        if let Some(session) = &self.session {
            self.snapshot = Snapshot {
                memory: session.engine.memory_snapshot(),
                registers: session.engine.register_snapshot(),
            };
        }
    }

    fn set_status(&mut self, status: ExecutionStatus) {
        if self.status == status {
            return;
        }
        tracing::debug!(from = %self.status, to = %status, "status change");
        self.status = status;
        let _ = self.event_tx.send(ControllerEvent::StatusChanged { status });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ScriptOp, ScriptProgram, ScriptedFactory};
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn controller_with(
        factory: ScriptedFactory,
    ) -> (ExecutionController, UnboundedReceiver<ControllerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let config = RunConfig {
            architecture: Architecture::Stack,
            chunk_size: 4,
            ..RunConfig::default()
        };
        let ctl = ExecutionController::new(
            Arc::new(factory),
            IoManager::new(),
            SelectedAddress::new(),
            config,
            tx,
        );
        (ctl, rx)
    }

    fn controller() -> (ExecutionController, UnboundedReceiver<ControllerEvent>) {
        controller_with(ScriptedFactory::new())
    }

    fn image(arch: Architecture, ops: Vec<ScriptOp>) -> Bytes {
        Bytes::from(ScriptProgram::new(arch, ops).to_image().unwrap())
    }

    fn stack_image(ops: Vec<ScriptOp>) -> Bytes {
        image(Architecture::Stack, ops)
    }

    fn drain(rx: &mut UnboundedReceiver<ControllerEvent>) -> Vec<ControllerEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    fn executed(ctl: &ExecutionController) -> u64 {
        ctl.snapshot()
            .registers
            .iter()
            .find(|r| r.name == "executed")
            .map(|r| r.value)
            .unwrap()
    }

    #[test]
    fn step_continue_then_halt_then_refuse() {
        let (mut ctl, mut rx) = controller();
        ctl.upload(stack_image(vec![ScriptOp::Nop]), Architecture::Stack)
            .unwrap();
        assert_eq!(ctl.status(), ExecutionStatus::Ready);

        assert_eq!(ctl.step().unwrap(), ExecutionStatus::Paused);
        assert_eq!(ctl.step().unwrap(), ExecutionStatus::Halted);
        let before = executed(&ctl);
        drain(&mut rx);

        let err = ctl.step().unwrap_err();
        assert_eq!(
            err,
            ControlError::Refused {
                operation: "step",
                status: ExecutionStatus::Halted
            }
        );
        assert_eq!(ctl.status(), ExecutionStatus::Halted);
        assert_eq!(executed(&ctl), before);
        assert_eq!(ctl.stats().steps, 2);
        assert!(drain(&mut rx)
            .iter()
            .any(|e| matches!(e, ControllerEvent::Info(InfoEvent::Refused { .. }))));
    }

    #[test]
    fn transitions_follow_chunk_outcome() {
        let continue_ops = vec![ScriptOp::Nop, ScriptOp::Nop, ScriptOp::Nop];
        let halt_ops = vec![ScriptOp::Nop, ScriptOp::Halt];
        let error_ops = vec![ScriptOp::Nop, ScriptOp::Fail { message: "bad".into() }];
        let cases = [
            (continue_ops, ExecutionStatus::Paused),
            (halt_ops, ExecutionStatus::Halted),
            (error_ops, ExecutionStatus::Errored),
        ];
        for (ops, expected) in cases {
            // from Paused
            let (mut ctl, _rx) = controller();
            ctl.upload(stack_image(ops.clone()), Architecture::Stack)
                .unwrap();
            assert_eq!(ctl.step().unwrap(), ExecutionStatus::Paused);
            assert_eq!(ctl.step().unwrap(), expected);

            // from Ready, via the run-loop
            let (mut ctl, _rx) = controller();
            let ops = ops[1..].to_vec();
            ctl.upload(stack_image(ops), Architecture::Stack).unwrap();
            let ticket = ctl.start_running().unwrap();
            let mut tick = ctl.advance(&ticket);
            while tick == RunTick::Continue {
                assert_eq!(ctl.status(), ExecutionStatus::Running);
                tick = ctl.advance(&ticket);
            }
            let terminal = match expected {
                ExecutionStatus::Paused => ExecutionStatus::Halted,
                other => other,
            };
            assert_eq!(tick, RunTick::Finished(terminal));
        }
    }

    #[test]
    fn run_loop_emits_outputs_in_order() {
        let (mut ctl, _rx) = controller();
        let ops = (1..=10)
            .map(|v| ScriptOp::Out { port: 1, value: v })
            .collect();
        ctl.upload(stack_image(ops), Architecture::Stack).unwrap();
        let ticket = ctl.start_running().unwrap();
        let mut chunks = 0;
        while ctl.advance(&ticket) == RunTick::Continue {
            chunks += 1;
        }
        assert_eq!(chunks, 2);
        assert_eq!(ctl.status(), ExecutionStatus::Halted);
        assert_eq!(ctl.io().outputs(1), (1..=10).collect::<Vec<u16>>());
        assert_eq!(ctl.stats().chunks, 3);
    }

    #[test]
    fn stop_pauses_before_next_chunk() {
        let (mut ctl, _rx) = controller();
        let looping = vec![ScriptOp::Out { port: 0, value: 1 }, ScriptOp::Jump { target: 0 }];
        ctl.upload(stack_image(looping), Architecture::Stack).unwrap();
        let ticket = ctl.start_running().unwrap();
        assert_eq!(ctl.advance(&ticket), RunTick::Continue);
        let emitted = ctl.io().outputs(0).len();

        assert!(ctl.stop_running());
        assert_eq!(ctl.advance(&ticket), RunTick::Finished(ExecutionStatus::Paused));
        assert_eq!(ctl.io().outputs(0).len(), emitted);
        assert!(!ctl.stop_running());

        // resumable
        let ticket = ctl.start_running().unwrap();
        assert_eq!(ctl.advance(&ticket), RunTick::Continue);
        assert!(ctl.io().outputs(0).len() > emitted);
    }

    #[test]
    fn start_running_twice_is_a_no_op() {
        let (mut ctl, mut rx) = controller();
        ctl.create_session(Architecture::Stack).unwrap();
        let first = ctl.start_running().unwrap();
        drain(&mut rx);
        let second = ctl.start_running().unwrap();
        assert_eq!(first, second);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn upload_mid_run_supersedes_old_loop() {
        let (mut ctl, _rx) = controller();
        let looping = vec![ScriptOp::Out { port: 0, value: 0xA }, ScriptOp::Jump { target: 0 }];
        ctl.upload(stack_image(looping), Architecture::Stack).unwrap();
        let old = ctl.start_running().unwrap();
        assert_eq!(ctl.advance(&old), RunTick::Continue);
        assert!(!ctl.io().outputs(0).is_empty());

        let risc = image(Architecture::Risc, vec![ScriptOp::Out { port: 0, value: 0xB }]);
        ctl.upload(risc, Architecture::Risc).unwrap();
        assert_eq!(ctl.status(), ExecutionStatus::Ready);
        assert!(ctl.io().used_ports().is_empty());

        assert_eq!(ctl.advance(&old), RunTick::Superseded);
        assert_eq!(ctl.status(), ExecutionStatus::Ready);
        assert!(ctl.io().outputs(0).is_empty());

        // a fresh run on the new session also refuses the stale ticket
        let new = ctl.start_running().unwrap();
        assert_ne!(new.session(), old.session());
        assert_eq!(ctl.advance(&old), RunTick::Superseded);
        assert_eq!(ctl.status(), ExecutionStatus::Running);
        assert_eq!(ctl.advance(&new), RunTick::Finished(ExecutionStatus::Halted));
        assert_eq!(ctl.io().outputs(0), vec![0xB]);
    }

    #[test]
    fn bad_program_errors_and_drops_session() {
        let (mut ctl, mut rx) = controller();
        ctl.upload(stack_image(vec![]), Architecture::Stack).unwrap();
        drain(&mut rx);

        let err = ctl
            .upload(Bytes::from_static(b"not a program"), Architecture::Stack)
            .unwrap_err();
        assert!(matches!(err, SessionError::ProgramLoad { .. }));
        assert_eq!(ctl.status(), ExecutionStatus::Errored);
        assert!(ctl.error().unwrap().contains("malformed"));
        assert_eq!(ctl.session_id(), None);
        assert!(drain(&mut rx).iter().any(|e| matches!(
            e,
            ControllerEvent::Info(InfoEvent::Failure {
                context: FailureContext::Upload,
                ..
            })
        )));
        assert!(ctl.step().is_err());
        assert!(ctl.start_running().is_err());

        // the previous good program is still the reset target
        ctl.reset().unwrap();
        assert_eq!(ctl.status(), ExecutionStatus::Ready);
        assert_eq!(ctl.error(), None);
    }

    #[test]
    fn oversized_image_is_a_load_error_not_a_crash() {
        let (mut ctl, mut rx) = controller_with(ScriptedFactory::new());
        let image = Bytes::from_static(
            br#"{"architecture":"stack","data_size":18446744073709551615,"ops":[]}"#,
        );
        let err = ctl.upload(image, Architecture::Stack).unwrap_err();
        assert!(matches!(err, SessionError::ProgramLoad { .. }));
        assert_eq!(ctl.status(), ExecutionStatus::Errored);
        assert!(ctl.error().unwrap().contains("data_size"));
        assert!(ctl.last_executable().is_none());
        assert!(drain(&mut rx).iter().any(|e| matches!(
            e,
            ControllerEvent::Info(InfoEvent::Failure {
                context: FailureContext::Upload,
                ..
            })
        )));
    }

    #[test]
    fn engine_init_failure_is_errored() {
        let (mut ctl, mut rx) =
            controller_with(ScriptedFactory::with_architectures(&[Architecture::Stack]));
        let err = ctl.create_session(Architecture::Cisc).unwrap_err();
        assert!(matches!(err, SessionError::EngineInit { .. }));
        assert_eq!(ctl.status(), ExecutionStatus::Errored);
        assert_eq!(ctl.architecture(), Architecture::Cisc);
        assert!(drain(&mut rx).iter().any(|e| matches!(
            e,
            ControllerEvent::Info(InfoEvent::Failure {
                context: FailureContext::Init,
                ..
            })
        )));
        ctl.create_session(Architecture::Stack).unwrap();
        assert_eq!(ctl.status(), ExecutionStatus::Ready);
        assert_eq!(ctl.error(), None);
    }

    #[test]
    fn execution_fault_keeps_message() {
        let (mut ctl, _rx) = controller();
        ctl.upload(stack_image(vec![ScriptOp::Pop]), Architecture::Stack)
            .unwrap();
        assert_eq!(ctl.step().unwrap(), ExecutionStatus::Errored);
        assert_eq!(ctl.error(), Some("stack underflow"));
    }

    #[test]
    fn reset_reloads_and_clears_io() {
        let (mut ctl, _rx) = controller();
        ctl.reset().unwrap();
        assert_eq!(ctl.session_id(), None);

        ctl.upload(
            stack_image(vec![ScriptOp::Out { port: 2, value: 5 }]),
            Architecture::Stack,
        )
        .unwrap();
        ctl.io().queue_input(4, 9);
        ctl.step().unwrap();
        assert_eq!(ctl.io().outputs(2), vec![5]);
        let before = ctl.session_id();

        ctl.reset().unwrap();
        assert_ne!(ctl.session_id(), before);
        assert_eq!(ctl.status(), ExecutionStatus::Ready);
        assert!(ctl.io().used_ports().is_empty());
        assert_eq!(ctl.stats(), RunStats::default());
        assert_eq!(ctl.step().unwrap(), ExecutionStatus::Paused);
        assert_eq!(ctl.io().outputs(2), vec![5]);
    }

    #[test]
    fn architecture_change_reloads_retained_program() {
        let (mut ctl, _rx) = controller();
        ctl.set_architecture(Architecture::Risc).unwrap();
        assert_eq!(ctl.architecture(), Architecture::Risc);
        assert!(ctl.last_executable().is_none());

        ctl.upload(stack_image(vec![]), Architecture::Stack).unwrap();
        let err = ctl.set_architecture(Architecture::Cisc).unwrap_err();
        assert!(matches!(err, SessionError::ProgramLoad { .. }));
        assert_eq!(ctl.status(), ExecutionStatus::Errored);
        assert_eq!(
            ctl.last_executable().unwrap().architecture,
            Architecture::Stack
        );
    }

    #[test]
    fn session_replacement_clears_selection() {
        let selection = SelectedAddress::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut ctl = ExecutionController::new(
            Arc::new(ScriptedFactory::new()),
            IoManager::new(),
            selection.clone(),
            RunConfig::default(),
            tx,
        );
        ctl.create_session(Architecture::Risc).unwrap();
        selection.select(MemoryKind::Data, 12);
        ctl.create_session(Architecture::Risc).unwrap();
        assert_eq!(selection.get(), None);
    }

    #[test]
    fn memory_writes_and_stack_peek() {
        let (mut ctl, _rx) = controller();
        assert!(!ctl.set_byte(MemoryKind::Data, 0, 1));
        assert_eq!(ctl.peek_stack(0), None);

        ctl.upload(stack_image(vec![ScriptOp::Push { value: 42 }]), Architecture::Stack)
            .unwrap();
        assert!(ctl.set_byte(MemoryKind::Data, 1, 0x7f));
        let data = ctl
            .snapshot()
            .memory
            .iter()
            .find(|b| b.kind == MemoryKind::Data)
            .unwrap();
        assert_eq!(data.values[1], 0x7f);
        assert!(!ctl.set_byte(MemoryKind::Data, 1 << 20, 1));
        assert_eq!(ctl.status(), ExecutionStatus::Ready);

        ctl.step().unwrap();
        assert_eq!(ctl.peek_stack(0), Some(42));
        assert_eq!(ctl.peek_stack(1), None);
    }
}
