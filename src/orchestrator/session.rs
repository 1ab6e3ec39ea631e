use crate::engine::CoreEngine;
use crate::model::{Architecture, RunStats};
use bytes::Bytes;
use std::fmt;

/// Identity of one processor session; never reused within a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub(crate) u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// The last successfully uploaded program, kept for reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastExecutable {
    pub image: Bytes,
    pub architecture: Architecture,
}

/// One live engine instance. Replaced wholesale, never reloaded in place.
pub(crate) struct ProcessorSession {
    pub id: SessionId,
    pub architecture: Architecture,
    pub engine: Box<dyn CoreEngine>,
    pub stats: RunStats,
}
