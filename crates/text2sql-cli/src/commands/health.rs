//! Backend health check.

use anyhow::Result;
use colored::Colorize;
use text2sql_client::{ApiClients, HealthStatus};

use crate::output::Output;

pub async fn execute(clients: &ApiClients, output: Output) -> Result<()> {
    let status = clients.health().await?;
    output.emit(&status, |status| {
        let label = if is_healthy(status) {
            status.status.green().bold()
        } else {
            status.status.yellow().bold()
        };
        println!("{}: {}", "Backend".bold(), label);
    })
}

/// The backend answers `{"status": "ok"}` when it is up.
fn is_healthy(status: &HealthStatus) -> bool {
    status.status == "ok"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_status_is_healthy() {
        let ok = HealthStatus { status: "ok".to_string() };
        let degraded = HealthStatus { status: "degraded".to_string() };
        assert!(is_healthy(&ok));
        assert!(!is_healthy(&degraded));
    }
}
