use crate::model::MemoryKind;
use parking_lot::Mutex;
use std::sync::Arc;

/// A selected memory cell in a memory view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedCell {
    pub kind: MemoryKind,
    pub address: usize,
}

/// Shared cursor for the memory cell a viewer has selected.
///
/// Owned by the UI layer; the controller clears it whenever a session is
/// replaced, since addresses from the old program mean nothing afterwards.
#[derive(Debug, Clone, Default)]
pub struct SelectedAddress {
    inner: Arc<Mutex<Option<SelectedCell>>>,
}

impl SelectedAddress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&self, kind: MemoryKind, address: usize) {
        *self.inner.lock() = Some(SelectedCell { kind, address });
    }

    pub fn get(&self) -> Option<SelectedCell> {
        *self.inner.lock()
    }

    pub fn clear(&self) {
        *self.inner.lock() = None;
    }
}
