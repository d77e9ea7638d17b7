//! JSONL audit trail logging.
//!
//! Each rebalancer run appends events to an audit.jsonl file,
//! one JSON object per line.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use driftbook::{Allocation, Portfolio};
use serde::Serialize;

use crate::error::Result;

/// An audit event written to the JSONL trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event: &'static str,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub data: serde_json::Value,
}

/// Append-only audit logger. A disabled log accepts events and drops them.
pub struct AuditLog {
    writer: Option<BufWriter<fs::File>>,
}

impl AuditLog {
    /// Open (or create) the audit log file for appending.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
        })
    }

    /// A log that writes nothing.
    pub fn disabled() -> Self {
        Self { writer: None }
    }

    /// Log an event with arbitrary JSON data.
    pub fn log(&mut self, event: &'static str, data: serde_json::Value) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        let entry = AuditEvent {
            event,
            ts: Utc::now(),
            data,
        };
        let json = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{json}")?;
        writer.flush()?;
        Ok(())
    }
}

/// Log a run start event.
pub fn log_run_started(audit: &mut AuditLog, command: &str, source: &str) -> Result<()> {
    audit.log(
        "run_started",
        serde_json::json!({
            "command": command,
            "source": source,
        }),
    )
}

/// Log the portfolio the run starts from.
pub fn log_portfolio(audit: &mut AuditLog, portfolio: &Portfolio) -> Result<()> {
    let pos_data: Vec<_> = portfolio
        .positions()
        .map(|p| {
            serde_json::json!({
                "symbol": p.symbol().as_str(),
                "qty": p.quantity(),
                "price": p.price().dollars(),
                "target": p.target_allocation(),
            })
        })
        .collect();

    audit.log(
        "portfolio_loaded",
        serde_json::json!({
            "positions": pos_data,
            "cash": portfolio.cash_available().dollars(),
        }),
    )
}

/// Log the computed purchase plan.
pub fn log_plan(audit: &mut AuditLog, allocation: &Allocation) -> Result<()> {
    let buys: Vec<_> = allocation
        .ledger
        .iter()
        .map(|(symbol, units)| serde_json::json!({ "symbol": symbol.as_str(), "units": units }))
        .collect();

    audit.log(
        "plan_computed",
        serde_json::json!({
            "buys": buys,
            "remaining": allocation.remaining.dollars(),
        }),
    )
}

/// Log run completion.
pub fn log_run_completed(audit: &mut AuditLog, units: u64) -> Result<()> {
    audit.log("run_completed", serde_json::json!({ "units": units }))
}

/// Log a run that stopped with an error.
pub fn log_run_failed(audit: &mut AuditLog, error: &str) -> Result<()> {
    audit.log("run_failed", serde_json::json!({ "error": error }))
}
