use crate::engine::PortIo;
use crate::io::IoManager;

/// Routes engine port callbacks into the I/O manager.
pub(crate) struct PortBridge<'a> {
    io: &'a IoManager,
}

impl<'a> PortBridge<'a> {
    pub fn new(io: &'a IoManager) -> Self {
        Self { io }
    }
}

impl PortIo for PortBridge<'_> {
    fn output(&mut self, port: u16, value: u16) {
        tracing::trace!(port, value, "port output");
        self.io.emit_output(port, value);
    }

    fn input(&mut self, port: u16) -> u16 {
        let value = self.io.consume_input(port);
        tracing::trace!(port, value, "port input");
        value
    }
}
