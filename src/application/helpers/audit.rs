use std::sync::Arc;

use crate::application::ports::ledger::{AuditStatus, LedgerGateway};

/// Marker prepended to every audit line written in sandbox mode.
const SANDBOX_PREFIX: &str = "[SANDBOX] ";

/// Writes gateway audit log lines through the ledger, applying the
/// configured gateway name and the sandbox marker.
///
/// Write failures are downgraded to warnings; payment processing never
/// fails on a broken log sink.
#[derive(Clone)]
pub struct AuditLog {
    ledger: Arc<dyn LedgerGateway>,
    gateway: String,
    sandbox: bool,
}

impl AuditLog {
    pub fn new(ledger: Arc<dyn LedgerGateway>, gateway: impl Into<String>, sandbox: bool) -> Self {
        AuditLog {
            ledger,
            gateway: gateway.into(),
            sandbox,
        }
    }

    pub async fn write(&self, description: &str, status: AuditStatus) {
        let line = if self.sandbox {
            format!("{SANDBOX_PREFIX}{description}")
        } else {
            description.to_string()
        };
        if let Err(e) = self
            .ledger
            .write_audit_log(&self.gateway, &line, status)
            .await
        {
            tracing::warn!(error = %e, description, "failed to write gateway audit log line");
        }
    }
}
