//! Text summary builder for CLI output.
//!
//! Formats a run report into human-readable lines for text mode.

use crate::io::format::{render_values, DisplayFormat};
use crate::model::RunReport;

/// Pre-formatted lines for text output.
pub struct TextSummary {
    pub lines: Vec<String>,
}

/// Build a text summary from a run report, rendering port output in `format`.
pub fn build_text_summary(report: &RunReport, format: DisplayFormat) -> TextSummary {
    let mut lines = Vec::new();

    lines.push(format!(
        "Processor: {} / status {}",
        report.architecture, report.status
    ));
    if let Some(err) = report.error.as_deref() {
        lines.push(format!("Error: {err}"));
    }
    lines.push(format!(
        "Executed: {} chunk(s), {} single step(s)",
        report.stats.chunks, report.stats.steps
    ));

    for port in &report.ports {
        if !port.outputs.is_empty() {
            lines.push(format!("Port {} output ({} values):", port.port, port.outputs.len()));
            for line in render_values(&port.outputs, format) {
                lines.push(format!("  {line}"));
            }
        }
        if !port.pending_input.is_empty() {
            lines.push(format!(
                "Port {} unread input: {}",
                port.port,
                port.pending_input.len()
            ));
        }
    }

    if !report.registers.is_empty() {
        let regs = report
            .registers
            .iter()
            .map(|r| format!("{}={:#x}", r.name, r.value))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(format!("Registers: {regs}"));
    }

    TextSummary { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Architecture, ExecutionStatus, PortReport, Register, RunStats};

    #[test]
    fn summary_lists_ports_and_error() {
        let report = RunReport {
            timestamp_utc: String::new(),
            architecture: Architecture::Stack,
            status: ExecutionStatus::Errored,
            error: Some("stack underflow".into()),
            stats: RunStats { chunks: 2, steps: 0 },
            ports: vec![
                PortReport {
                    port: 0,
                    outputs: vec![],
                    pending_input: vec![1, 2],
                },
                PortReport {
                    port: 1,
                    outputs: "ok\n".bytes().map(u16::from).collect(),
                    pending_input: vec![],
                },
            ],
            registers: vec![Register {
                name: "pc".into(),
                value: 16,
            }],
        };
        let lines = build_text_summary(&report, DisplayFormat::Ascii).lines;
        assert_eq!(lines[0], "Processor: Stack / status errored");
        assert_eq!(lines[1], "Error: stack underflow");
        assert!(lines.contains(&"Port 0 unread input: 2".to_string()));
        assert!(lines.contains(&"  ok.".to_string()));
        assert_eq!(lines.last().unwrap(), "Registers: pc=0x10");
    }
}
