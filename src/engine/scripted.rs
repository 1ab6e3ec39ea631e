//! Scripted reference engine.
//!
//! Programs are JSON documents listing high-level operations. The engine is a
//! stand-in for a real processor core: it drives the same port callbacks and
//! exposes the same memory/register/stack views, which is all the controller
//! needs.

use super::{CoreEngine, EngineFactory, PortIo};
use crate::error::EngineFault;
use crate::model::{Architecture, ChunkOutcome, MemoryBlock, MemoryKind, Register};
use serde::{Deserialize, Serialize};

const DEFAULT_DATA_SIZE: usize = 256;
/// Largest data segment a program image may request (64 KiB).
pub const MAX_DATA_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptOp {
    Nop,
    Out { port: u16, value: u16 },
    /// Read one value from `from` into the accumulator and emit it on `to`.
    Echo { from: u16, to: u16 },
    Push { value: u16 },
    Pop,
    Store { address: usize, value: u8 },
    Jump { target: usize },
    Halt,
    /// Program-signalled failure, reported as `ChunkOutcome::Error`.
    Fail { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptProgram {
    pub architecture: Architecture,
    #[serde(default = "default_data_size")]
    pub data_size: usize,
    pub ops: Vec<ScriptOp>,
}

fn default_data_size() -> usize {
    DEFAULT_DATA_SIZE
}

impl ScriptProgram {
    pub fn new(architecture: Architecture, ops: Vec<ScriptOp>) -> Self {
        Self {
            architecture,
            data_size: DEFAULT_DATA_SIZE,
            ops,
        }
    }

    /// Encode as a loadable program image.
    pub fn to_image(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

enum Flow {
    Next,
    Halt,
    Fail(String),
}

pub struct ScriptedEngine {
    architecture: Architecture,
    image: Vec<u8>,
    ops: Vec<ScriptOp>,
    data: Vec<u8>,
    stack: Vec<u16>,
    pc: usize,
    acc: u16,
    executed: u64,
    halted: bool,
    last_error: Option<String>,
}

impl ScriptedEngine {
    pub fn new(architecture: Architecture) -> Self {
        Self {
            architecture,
            image: Vec::new(),
            ops: Vec::new(),
            data: vec![0; DEFAULT_DATA_SIZE],
            stack: Vec::new(),
            pc: 0,
            acc: 0,
            executed: 0,
            halted: false,
            last_error: None,
        }
    }

    fn exec_one(&mut self, io: &mut dyn PortIo) -> Result<Flow, EngineFault> {
        let Some(op) = self.ops.get(self.pc).cloned() else {
            self.halted = true;
            return Ok(Flow::Halt);
        };
        self.executed += 1;
        self.pc += 1;
        match op {
            ScriptOp::Nop => {}
            ScriptOp::Out { port, value } => io.output(port, value),
            ScriptOp::Echo { from, to } => {
                self.acc = io.input(from);
                io.output(to, self.acc);
            }
            ScriptOp::Push { value } => self.stack.push(value),
            ScriptOp::Pop => {
                self.acc = self
                    .stack
                    .pop()
                    .ok_or_else(|| EngineFault::new("stack underflow"))?;
            }
            ScriptOp::Store { address, value } => {
                let cell = self.data.get_mut(address).ok_or_else(|| {
                    EngineFault::new(format!("store to 0x{address:04x} out of range"))
                })?;
                *cell = value;
            }
            ScriptOp::Jump { target } => {
                if target > self.ops.len() {
                    return Err(EngineFault::new(format!(
                        "jump target {target} outside program"
                    )));
                }
                self.pc = target;
            }
            ScriptOp::Halt => {
                self.halted = true;
                return Ok(Flow::Halt);
            }
            ScriptOp::Fail { message } => return Ok(Flow::Fail(message)),
        }
        Ok(Flow::Next)
    }
}

impl CoreEngine for ScriptedEngine {
    fn load_program(&mut self, image: &[u8]) -> Result<(), EngineFault> {
        let program: ScriptProgram = serde_json::from_slice(image)
            .map_err(|e| EngineFault::new(format!("malformed program: {e}")))?;
        if program.architecture != self.architecture {
            return Err(EngineFault::new(format!(
                "program targets {}, engine is {}",
                program.architecture, self.architecture
            )));
        }
        if program.data_size > MAX_DATA_SIZE {
            return Err(EngineFault::new(format!(
                "data_size {} exceeds the {MAX_DATA_SIZE} byte limit",
                program.data_size
            )));
        }
        *self = Self {
            image: image.to_vec(),
            ops: program.ops,
            data: vec![0; program.data_size],
            ..Self::new(self.architecture)
        };
        Ok(())
    }

    fn step(&mut self, io: &mut dyn PortIo) -> Result<(), EngineFault> {
        if self.halted {
            return Ok(());
        }
        match self.exec_one(io)? {
            Flow::Next | Flow::Halt => Ok(()),
            Flow::Fail(message) => {
                self.last_error = Some(message.clone());
                Err(EngineFault::new(message))
            }
        }
    }

    fn run_chunk(
        &mut self,
        io: &mut dyn PortIo,
        max_instructions: u32,
    ) -> Result<ChunkOutcome, EngineFault> {
        if self.halted {
            return Ok(ChunkOutcome::Halt);
        }
        for _ in 0..max_instructions {
            match self.exec_one(io)? {
                Flow::Next => {}
                Flow::Halt => return Ok(ChunkOutcome::Halt),
                Flow::Fail(message) => {
                    self.last_error = Some(message);
                    return Ok(ChunkOutcome::Error);
                }
            }
        }
        Ok(ChunkOutcome::Continue)
    }

    fn memory_snapshot(&self) -> Vec<MemoryBlock> {
        vec![
            MemoryBlock {
                kind: MemoryKind::Program,
                values: self.image.clone(),
            },
            MemoryBlock {
                kind: MemoryKind::Data,
                values: self.data.clone(),
            },
            MemoryBlock {
                kind: MemoryKind::Stack,
                values: self.stack.iter().flat_map(|w| w.to_le_bytes()).collect(),
            },
        ]
    }

    fn write_memory_cell(&mut self, kind: MemoryKind, address: usize, value: u8) -> bool {
        if kind != MemoryKind::Data {
            return false;
        }
        match self.data.get_mut(address) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    fn register_snapshot(&self) -> Vec<Register> {
        vec![
            Register {
                name: "pc".into(),
                value: self.pc as u64,
            },
            Register {
                name: "acc".into(),
                value: u64::from(self.acc),
            },
            Register {
                name: "sp".into(),
                value: self.stack.len() as u64,
            },
            Register {
                name: "executed".into(),
                value: self.executed,
            },
        ]
    }

    fn peek_stack(&self, offset_from_top: usize) -> Result<u64, EngineFault> {
        offset_from_top
            .checked_add(1)
            .and_then(|depth| self.stack.len().checked_sub(depth))
            .and_then(|i| self.stack.get(i))
            .map(|v| u64::from(*v))
            .ok_or_else(|| EngineFault::new("stack offset out of range"))
    }

    fn error_message(&self) -> Option<String> {
        self.last_error.clone()
    }
}

/// Factory for scripted engines, optionally limited to some architectures.
#[derive(Debug, Clone)]
pub struct ScriptedFactory {
    supported: Vec<Architecture>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self {
            supported: Architecture::ALL.to_vec(),
        }
    }

    pub fn with_architectures(supported: &[Architecture]) -> Self {
        Self {
            supported: supported.to_vec(),
        }
    }
}

impl Default for ScriptedFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineFactory for ScriptedFactory {
    fn create(
        &self,
        architecture: Architecture,
        boot_image: Option<&[u8]>,
    ) -> Result<Box<dyn CoreEngine>, EngineFault> {
        if !self.supports(architecture) {
            return Err(EngineFault::new(format!(
                "{architecture} processor is not available"
            )));
        }
        let mut engine = ScriptedEngine::new(architecture);
        if let Some(image) = boot_image {
            engine.load_program(image)?;
        }
        Ok(Box::new(engine))
    }

    fn supports(&self, architecture: Architecture) -> bool {
        self.supported.contains(&architecture)
    }
}
