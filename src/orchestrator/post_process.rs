//! Post-run processing: turn the controller's final state into a report.

use super::controller::ExecutionController;
use crate::model::RunReport;

/// Build a report for the current session, ready for presentation layers.
pub fn build_report(controller: &ExecutionController) -> RunReport {
    RunReport {
        timestamp_utc: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "now".into()),
        architecture: controller.architecture(),
        status: controller.status(),
        error: controller.error().map(str::to_string),
        stats: controller.stats(),
        ports: controller.io().port_reports(),
        registers: controller.snapshot().registers.clone(),
    }
}
