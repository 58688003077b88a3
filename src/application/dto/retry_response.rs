// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::workers::retry_worker::RetryCycleReport;
use serde::Serialize;

/// 手动触发重试的响应
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryTriggerResponse {
    pub success: bool,
    pub message: String,
    pub report: RetryCycleReport,
}

impl From<RetryCycleReport> for RetryTriggerResponse {
    fn from(report: RetryCycleReport) -> Self {
        let message = match &report.reconcile_error {
            Some(e) => format!("Retry cycle ran without reconciliation: {}", e),
            None => format!(
                "Retry cycle completed: {} succeeded, {} failed, {} remaining",
                report.succeeded, report.failed, report.remaining
            ),
        };
        Self {
            success: report.reconcile_error.is_none(),
            message,
            report,
        }
    }
}
