//! Core engine contract.
//!
//! The controller only talks to processors through these traits; instruction
//! semantics, memory layout and the register set stay behind them.

mod scripted;

pub use scripted::{ScriptOp, ScriptProgram, ScriptedEngine, ScriptedFactory, MAX_DATA_SIZE};

use crate::error::EngineFault;
use crate::model::{Architecture, ChunkOutcome, MemoryBlock, MemoryKind, Register};

/// Port callbacks threaded into the engine's run primitives.
pub trait PortIo {
    /// A value emitted on `port`.
    fn output(&mut self, port: u16, value: u16);
    /// Next value for `port`; absence of input is `0`.
    fn input(&mut self, port: u16) -> u16;
}

pub trait CoreEngine: Send {
    fn load_program(&mut self, image: &[u8]) -> Result<(), EngineFault>;

    /// Execute exactly one instruction.
    fn step(&mut self, io: &mut dyn PortIo) -> Result<(), EngineFault>;

    /// Execute up to `max_instructions`, stopping early on halt or error.
    fn run_chunk(
        &mut self,
        io: &mut dyn PortIo,
        max_instructions: u32,
    ) -> Result<ChunkOutcome, EngineFault>;

    fn memory_snapshot(&self) -> Vec<MemoryBlock>;

    /// Returns false when the write is rejected (e.g. out of range).
    fn write_memory_cell(&mut self, kind: MemoryKind, address: usize, value: u8) -> bool;

    fn register_snapshot(&self) -> Vec<Register>;

    fn peek_stack(&self, offset_from_top: usize) -> Result<u64, EngineFault>;

    /// Detail for the last `ChunkOutcome::Error`, if the engine keeps one.
    fn error_message(&self) -> Option<String> {
        None
    }
}

/// Builds engine instances for a session.
pub trait EngineFactory: Send + Sync {
    fn create(
        &self,
        architecture: Architecture,
        boot_image: Option<&[u8]>,
    ) -> Result<Box<dyn CoreEngine>, EngineFault>;

    fn supports(&self, architecture: Architecture) -> bool;
}

/// Architectures the factory can construct, in selector order.
pub fn available_architectures(factory: &dyn EngineFactory) -> Vec<Architecture> {
    Architecture::ALL
        .into_iter()
        .filter(|a| factory.supports(*a))
        .collect()
}
