//! Port-addressed I/O manager.
//!
//! Wraps a [`PortStore`] behind a cloneable handle and notifies subscribers
//! after every mutation. Listeners run after the store lock is released, so a
//! listener may read the manager but never sees a half-applied change.

pub mod format;
mod store;

pub use store::{PortInput, PortStore, CONSOLE_PORT};

use crate::model::PortReport;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

type Listener = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

#[derive(Default)]
struct Shared {
    store: Mutex<PortStore>,
    listeners: Mutex<Listeners>,
}

#[derive(Clone, Default)]
pub struct IoManager {
    shared: Arc<Shared>,
}

impl IoManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit_output(&self, port: u16, value: u16) {
        self.mutate(|s| s.emit_output(port, value));
    }

    pub fn queue_input(&self, port: u16, value: u16) {
        self.mutate(|s| s.queue_input(port, value));
    }

    /// Queue several values in order, notifying once.
    pub fn queue_inputs(&self, port: u16, values: &[u16]) {
        self.mutate(|s| {
            for v in values {
                s.queue_input(port, *v);
            }
        });
    }

    pub fn consume_input(&self, port: u16) -> u16 {
        self.mutate(|s| s.consume_input(port))
    }

    pub fn initialize_port(&self, port: u16) {
        self.mutate(|s| s.initialize_port(port));
    }

    pub fn clear(&self) {
        self.mutate(PortStore::clear);
    }

    /// Register a listener called after every mutation.
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// dropped or [`Subscription::unsubscribe`] is called.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut listeners = self.shared.listeners.lock();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));
        Subscription {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }

    pub fn outputs(&self, port: u16) -> Vec<u16> {
        self.shared.store.lock().outputs(port).to_vec()
    }

    pub fn input(&self, port: u16) -> Option<PortInput> {
        self.shared.store.lock().input(port).cloned()
    }

    pub fn used_ports(&self) -> Vec<u16> {
        self.shared.store.lock().used_ports().collect()
    }

    pub fn last_fetched_port(&self) -> Option<u16> {
        self.shared.store.lock().last_fetched_port()
    }

    pub fn is_last_fetched(&self, port: u16) -> bool {
        self.shared.store.lock().is_last_fetched(port)
    }

    /// Copy of the whole store for rendering.
    pub fn snapshot(&self) -> PortStore {
        self.shared.store.lock().clone()
    }

    /// Per-port outputs and pending input for used ports.
    pub fn port_reports(&self) -> Vec<PortReport> {
        let store = self.shared.store.lock();
        store
            .used_ports()
            .map(|port| PortReport {
                port,
                outputs: store.outputs(port).to_vec(),
                pending_input: store
                    .input(port)
                    .map(|i| i.queue.iter().copied().collect())
                    .unwrap_or_default(),
            })
            .collect()
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut PortStore) -> R) -> R {
        let result = {
            let mut store = self.shared.store.lock();
            f(&mut store)
        };
        self.notify();
        result
    }

    fn notify(&self) {
        let listeners: Vec<Listener> = self
            .shared
            .listeners
            .lock()
            .entries
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener();
        }
    }
}

/// Handle returned by [`IoManager::subscribe`].
pub struct Subscription {
    id: u64,
    shared: Weak<Shared>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.listeners.lock().entries.retain(|(id, _)| *id != self.id);
        }
    }
}
