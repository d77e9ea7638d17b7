//! Workflows behind the CLI commands: load → allocate → report.
//!
//! Each run is bracketed by audit events. Reports are fully built before
//! anything is written, so a failing run prints no partial plan.

use std::io::Write;
use std::path::{Path, PathBuf};

use driftbook::{BuyReport, DriftReport, Portfolio, Price, rebalance};
use driftbook_broker::Broker;
use log::{info, warn};

use crate::audit::{self, AuditLog};
use crate::brokerage;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::portfolio_csv;
use crate::prices::{BrokerQuotes, PriceFile};
use crate::prompt::Prompter;
use crate::target;

/// Inputs of the standalone calculator.
pub struct CalcOptions {
    pub portfolio: PathBuf,
    /// Dollars to invest, as typed
    pub sum: String,
}

/// Where the calculator gets unit prices.
pub enum Quotes<'a> {
    /// JSON object of ticker → dollars
    File(&'a Path),
    /// Live quotes; the brokerage is connected only for the lookups
    Broker(&'a mut dyn Broker),
}

/// Inputs of the brokerage-backed rebalance.
pub struct RebalanceOptions {
    pub targets: PathBuf,
    /// Account id; prompt when absent and several exist
    pub account: Option<String>,
}

/// Inputs of the drift table.
pub struct DriftOptions {
    pub portfolio: PathBuf,
    pub prices: PathBuf,
}

/// Parse a dollar amount such as `100`, `250.75` or `$1,000`.
pub fn parse_amount(raw: &str) -> Result<Price> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(Price::from_dollars(v)),
        _ => Err(Error::InvalidAmount(raw.to_string())),
    }
}

fn open_audit(config: &Config) -> Result<AuditLog> {
    if config.logging.enabled {
        AuditLog::open(&config.audit_path())
    } else {
        Ok(AuditLog::disabled())
    }
}

/// Run `body` between `run_started` and `run_completed`/`run_failed`.
fn audited<T>(
    config: &Config,
    command: &str,
    source: &str,
    body: impl FnOnce(&mut AuditLog) -> Result<T>,
) -> Result<T> {
    let mut audit = open_audit(config)?;
    audit::log_run_started(&mut audit, command, source)?;
    match body(&mut audit) {
        Ok(v) => Ok(v),
        Err(e) => {
            if let Err(audit_err) = audit::log_run_failed(&mut audit, &e.to_string()) {
                warn!("could not record failure in audit log: {audit_err}");
            }
            Err(e)
        }
    }
}

/// Spend the portfolio's cash, record the plan and build the report.
fn plan(audit: &mut AuditLog, portfolio: &mut Portfolio) -> Result<BuyReport> {
    audit::log_portfolio(audit, portfolio)?;
    let allocation = rebalance::allocate_available(portfolio);
    info!(
        "Plan: {} units across {} tickers, {} left",
        allocation.ledger.total_units(),
        allocation.ledger.len(),
        allocation.remaining
    );
    audit::log_plan(audit, &allocation)?;
    let report = BuyReport::new(portfolio, &allocation)?;
    audit::log_run_completed(audit, allocation.ledger.total_units())?;
    Ok(report)
}

/// Standalone calculator: portfolio CSV + unit prices + sum to invest.
///
/// The sum and the CSV are validated before any brokerage login.
pub fn run_calc(
    config: &Config,
    opts: &CalcOptions,
    quotes: Quotes<'_>,
    out: &mut dyn Write,
) -> Result<BuyReport> {
    let source = opts.portfolio.display().to_string();
    let report = audited(config, "calc", &source, |audit| {
        let sum = parse_amount(&opts.sum)?;
        let holdings = portfolio_csv::read(&opts.portfolio)?;
        let mut portfolio = match quotes {
            Quotes::File(path) => portfolio_csv::build(&holdings, &PriceFile::load(path)?)?,
            Quotes::Broker(broker) => {
                broker.connect()?;
                let built = portfolio_csv::build(&holdings, &BrokerQuotes::new(&*broker));
                broker.disconnect()?;
                built?
            }
        };
        info!("Loaded {} positions from {source}", portfolio.len());
        portfolio.set_cash_available(sum);
        plan(audit, &mut portfolio)
    })?;
    write!(out, "{report}").map_err(Error::Output)?;
    Ok(report)
}

/// Brokerage-backed rebalance: targets CSV merged into a live account.
///
/// Connects `broker`, reads the chosen account and disconnects before
/// returning. No orders are placed.
pub fn run_rebalance(
    config: &Config,
    broker: &mut dyn Broker,
    opts: &RebalanceOptions,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> Result<BuyReport> {
    let source = opts.targets.display().to_string();
    let report = audited(config, "rebalance", &source, |audit| {
        let targets = target::load(&opts.targets)?;
        broker.connect()?;
        let loaded = read_account(&*broker, opts, &targets, prompter);
        broker.disconnect()?;
        let mut portfolio = loaded?;
        plan(audit, &mut portfolio)
    })?;
    write!(out, "{report}").map_err(Error::Output)?;
    Ok(report)
}

fn read_account(
    broker: &dyn Broker,
    opts: &RebalanceOptions,
    targets: &[target::TargetRow],
    prompter: &mut dyn Prompter,
) -> Result<Portfolio> {
    let account = brokerage::choose_account(broker, opts.account.as_deref(), prompter)?;
    brokerage::load_portfolio(broker, &account, targets, prompter)
}

/// Current allocation and drift per position, without buying.
pub fn run_drift(config: &Config, opts: &DriftOptions, out: &mut dyn Write) -> Result<DriftReport> {
    let source = opts.portfolio.display().to_string();
    let report = audited(config, "drift", &source, |audit| {
        let prices = PriceFile::load(&opts.prices)?;
        let portfolio = portfolio_csv::load(&opts.portfolio, &prices)?;
        audit::log_portfolio(audit, &portfolio)?;
        let report = DriftReport::new(&portfolio);
        match report.most_underweight() {
            Some(row) => info!("Most underweight: {} at {:.2}%", row.symbol, row.drift_pct),
            None => info!("No position is below target"),
        }
        audit::log_run_completed(audit, 0)?;
        Ok(report)
    })?;
    write!(out, "{report}").map_err(Error::Output)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts() {
        assert_eq!(parse_amount("100").unwrap(), Price(100_00));
        assert_eq!(parse_amount("250.75").unwrap(), Price(250_75));
        assert_eq!(parse_amount(" $1,000 ").unwrap(), Price(1000_00));
        assert_eq!(parse_amount("0").unwrap(), Price::ZERO);
        for bad in ["-5", "abc", "", "NaN"] {
            assert!(matches!(parse_amount(bad), Err(Error::InvalidAmount(_))));
        }
    }
}
