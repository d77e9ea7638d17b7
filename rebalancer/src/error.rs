//! Error types for the rebalancer.

use std::path::PathBuf;

use driftbook::PortfolioError;
use driftbook_broker::BrokerError;

/// All errors that can occur during rebalancer operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row} malformed - expecting row in this format: {expected}")]
    MalformedRow { row: usize, expected: &'static str },

    #[error("row {row} - {field} is not a number")]
    InvalidNumber { row: usize, field: &'static str },

    #[error("row {row} - shares owned is too large")]
    QuantityTooLarge { row: usize },

    #[error("row {row} - value of {ticker} is too large to track")]
    ValueTooLarge { row: usize, ticker: String },

    #[error("row {row} - target allocation {value} is outside (0, 100]")]
    InvalidTarget { row: usize, value: f64 },

    #[error("duplicate entry of ticker '{ticker}' on row {row}")]
    DuplicateTicker { row: usize, ticker: String },

    #[error("total combined allocation percentage ({0}) of all rows is not 100%")]
    AllocationSumInvalid(f64),

    #[error("ticker {0} does not have a target allocation")]
    MissingTargetAllocation(String),

    #[error("row {row} - ticker '{ticker}' cannot be found")]
    TickerNotFound { row: usize, ticker: String },

    #[error("row {row} - ticker '{ticker}' matches {matches} securities; run interactively to choose")]
    TickerAmbiguous {
        row: usize,
        ticker: String,
        matches: usize,
    },

    #[error("row {row} - rename ticker '{from}' to '{to}'")]
    TickerRename { row: usize, from: String, to: String },

    #[error("no price for {0}")]
    PriceNotFound(String),

    #[error("price for {ticker} must be positive")]
    InvalidPrice { ticker: String },

    #[error("failed to parse price file: {0}")]
    PriceParse(#[from] serde_json::Error),

    #[error("invalid amount to invest: {0}")]
    InvalidAmount(String),

    #[error("account {0} not found")]
    AccountNotFound(String),

    #[error("{0} accounts available; pass --account or run interactively")]
    AccountAmbiguous(usize),

    #[error("no accounts available for this login")]
    NoAccounts,

    #[error("broker error: {0}")]
    Broker(#[from] BrokerError),

    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error("failed to write output: {0}")]
    Output(std::io::Error),

    #[error("audit log error: {0}")]
    Audit(#[from] std::io::Error),

    #[error(transparent)]
    Portfolio(#[from] PortfolioError),
}

pub type Result<T> = std::result::Result<T, Error>;
