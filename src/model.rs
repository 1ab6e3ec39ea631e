use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Processor architectures a session can be constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    Stack,
    Accumulator,
    #[default]
    Risc,
    Cisc,
}

impl Architecture {
    pub const ALL: [Architecture; 4] = [
        Architecture::Stack,
        Architecture::Accumulator,
        Architecture::Risc,
        Architecture::Cisc,
    ];

    /// Human-readable name for selectors and summaries.
    pub fn display_name(self) -> &'static str {
        match self {
            Architecture::Stack => "Stack",
            Architecture::Accumulator => "Accumulator",
            Architecture::Risc => "RISC",
            Architecture::Cisc => "CISC",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl clap::ValueEnum for Architecture {
    fn value_variants<'a>() -> &'a [Self] {
        &Self::ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Architecture::Stack => clap::builder::PossibleValue::new("stack"),
            Architecture::Accumulator => {
                clap::builder::PossibleValue::new("accumulator").alias("acc")
            }
            Architecture::Risc => clap::builder::PossibleValue::new("risc"),
            Architecture::Cisc => clap::builder::PossibleValue::new("cisc"),
        })
    }
}

/// Lifecycle status of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Engine exists, nothing executed since the last load or reset.
    #[default]
    Ready,
    /// The chunked run-loop is scheduled.
    Running,
    /// Interrupted; resumable with step or run.
    Paused,
    /// The program terminated on its own.
    Halted,
    /// The engine raised a failure; see the retained error message.
    Errored,
}

impl ExecutionStatus {
    /// Whether `step`/`startRunning` may be issued from this status.
    pub fn can_advance(self) -> bool {
        matches!(self, ExecutionStatus::Ready | ExecutionStatus::Paused)
    }

    /// Halted and Errored sessions need a new session before they run again.
    pub fn is_terminal(self) -> bool {
        matches!(self, ExecutionStatus::Halted | ExecutionStatus::Errored)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionStatus::Ready => "ready",
            ExecutionStatus::Running => "running",
            ExecutionStatus::Paused => "paused",
            ExecutionStatus::Halted => "halted",
            ExecutionStatus::Errored => "errored",
        };
        f.write_str(s)
    }
}

/// Per-chunk result reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChunkOutcome {
    Continue,
    Halt,
    Error,
}

/// Addressable memory regions exposed by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    Program,
    Data,
    Stack,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryBlock {
    pub kind: MemoryKind,
    pub values: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    pub name: String,
    pub value: u64,
}

/// Read-only view of engine state, refreshed after every mutating operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub memory: Vec<MemoryBlock>,
    pub registers: Vec<Register>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub architecture: Architecture,
    /// Instructions per run-loop chunk.
    pub chunk_size: u32,
    /// Extra pause between chunks on top of the scheduler yield.
    #[serde(with = "humantime_serde")]
    pub chunk_pause: Duration,
    /// Stop the run-loop after this many chunks in one run.
    #[serde(default)]
    pub max_chunks: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            architecture: Architecture::default(),
            chunk_size: 1000,
            chunk_pause: Duration::ZERO,
            max_chunks: None,
        }
    }
}

/// Counters for the current session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub chunks: u64,
    pub steps: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ControllerEvent {
    StatusChanged { status: ExecutionStatus },
    Info(InfoEvent),
}

/// Where a failure surfaced, for notification text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureContext {
    Init,
    Upload,
    Reset,
    ArchitectureChange,
    Execution,
}

impl FailureContext {
    fn title(self) -> &'static str {
        match self {
            FailureContext::Init => "Engine init error",
            FailureContext::Upload => "Upload error",
            FailureContext::Reset => "Reset error",
            FailureContext::ArchitectureChange => "Processor type change error",
            FailureContext::Execution => "Execution error",
        }
    }
}

/// Structured info events emitted by the controller and consumed by UI/CLI layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InfoEvent {
    Message(String),
    SessionCreated { architecture: Architecture },
    ProgramLoaded { architecture: Architecture, bytes: usize },
    Failure { context: FailureContext, message: String },
    Refused { operation: String, status: ExecutionStatus },
}

impl InfoEvent {
    /// Render a human-readable message for UI/CLI layers.
    pub fn to_message(&self) -> String {
        match self {
            InfoEvent::Message(msg) => msg.clone(),
            InfoEvent::SessionCreated { architecture } => {
                format!("New {} session", architecture)
            }
            InfoEvent::ProgramLoaded {
                architecture,
                bytes,
            } => format!("Loaded {} byte program for {}", bytes, architecture),
            InfoEvent::Failure { context, message } => {
                format!("{}: {}", context.title(), message)
            }
            InfoEvent::Refused { operation, status } => {
                format!("Cannot {} while {}", operation, status)
            }
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, InfoEvent::Failure { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortReport {
    pub port: u16,
    pub outputs: Vec<u16>,
    #[serde(default)]
    pub pending_input: Vec<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    #[serde(default)]
    pub timestamp_utc: String,
    pub architecture: Architecture,
    pub status: ExecutionStatus,
    #[serde(default)]
    pub error: Option<String>,
    pub stats: RunStats,
    pub ports: Vec<PortReport>,
    pub registers: Vec<Register>,
}
