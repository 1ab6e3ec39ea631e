//! Port state store: per-port output logs and input queues.
//!
//! Pure data. Scheduling and change notification live in [`super::IoManager`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// The implicit console port; its input entry is never pruned.
pub const CONSOLE_PORT: u16 = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortInput {
    pub queue: VecDeque<u16>,
    /// True when the most recent consume took a value from this port.
    pub last_fetched: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortStore {
    outputs: BTreeMap<u16, Vec<u16>>,
    inputs: BTreeMap<u16, PortInput>,
    used: BTreeSet<u16>,
    // Survives pruning of the fetched port's entry.
    last_fetched: Option<u16>,
}

impl PortStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit_output(&mut self, port: u16, value: u16) {
        self.outputs.entry(port).or_default().push(value);
        self.used.insert(port);
    }

    pub fn queue_input(&mut self, port: u16, value: u16) {
        let input = self.inputs.entry(port).or_default();
        input.queue.push_back(value);
        input.last_fetched = false;
        if self.last_fetched == Some(port) {
            self.last_fetched = None;
        }
        self.used.insert(port);
    }

    /// Pop the next value for `port`, or `0` when nothing is queued.
    pub fn consume_input(&mut self, port: u16) -> u16 {
        for input in self.inputs.values_mut() {
            input.last_fetched = false;
        }
        self.last_fetched = None;
        let Some(input) = self.inputs.get_mut(&port) else {
            return 0;
        };
        let value = match input.queue.pop_front() {
            Some(v) => {
                input.last_fetched = true;
                self.last_fetched = Some(port);
                v
            }
            None => 0,
        };
        if input.queue.is_empty() && port != CONSOLE_PORT {
            self.inputs.remove(&port);
        }
        value
    }

    pub fn initialize_port(&mut self, port: u16) {
        self.inputs.entry(port).or_default();
        self.used.insert(port);
    }

    pub fn clear(&mut self) {
        self.outputs.clear();
        self.inputs.clear();
        self.used.clear();
        self.last_fetched = None;
    }

    pub fn outputs(&self, port: u16) -> &[u16] {
        self.outputs.get(&port).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn input(&self, port: u16) -> Option<&PortInput> {
        self.inputs.get(&port)
    }

    /// Used ports in ascending order.
    pub fn used_ports(&self) -> impl Iterator<Item = u16> + '_ {
        self.used.iter().copied()
    }

    pub fn is_used(&self, port: u16) -> bool {
        self.used.contains(&port)
    }

    /// Port the most recent consume took a value from.
    pub fn last_fetched_port(&self) -> Option<u16> {
        self.last_fetched
    }

    pub fn is_last_fetched(&self, port: u16) -> bool {
        self.last_fetched == Some(port)
    }
}
