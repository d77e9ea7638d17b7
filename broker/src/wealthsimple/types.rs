//! Wealthsimple Trade API response types.

use serde::Deserialize;

/// A monetary amount. The API sends these as decimal strings on some
/// endpoints and as JSON numbers on others.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Text(String),
    Number(f64),
}

impl Amount {
    /// Convert to integer cents, rounding to the nearest cent.
    pub fn to_cents(&self) -> Option<i64> {
        let value = match self {
            Amount::Text(s) => s.trim().parse::<f64>().ok()?,
            Amount::Number(n) => *n,
        };
        value.is_finite().then(|| (value * 100.0).round() as i64)
    }
}

/// `{ "amount": ..., "currency": ... }`
#[derive(Debug, Clone, Deserialize)]
pub struct Money {
    pub amount: Amount,
    #[serde(default)]
    pub currency: String,
}

/// Envelope used by every list endpoint.
#[derive(Debug, Deserialize)]
pub struct ResultList<T> {
    pub results: Vec<T>,
}

/// Entry of `GET /account/list`.
#[derive(Debug, Deserialize)]
pub struct AccountInfo {
    pub id: String,
    #[serde(default)]
    pub account_type: String,
    pub buying_power: Money,
    #[serde(default)]
    pub base_currency: Option<String>,
}

/// The `stock` object nested in positions and securities.
#[derive(Debug, Clone, Deserialize)]
pub struct StockInfo {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub primary_exchange: String,
}

/// Entry of `GET /account/positions`.
#[derive(Debug, Deserialize)]
pub struct PositionInfo {
    pub id: String,
    pub stock: StockInfo,
    pub quantity: Amount,
    pub quote: Money,
}

/// Entry of `GET /securities?query=` and body of `GET /securities/{id}`.
#[derive(Debug, Deserialize)]
pub struct SecurityInfo {
    pub id: String,
    pub stock: StockInfo,
    #[serde(default)]
    pub quote: Option<Money>,
}

/// Body of `POST /auth/login`.
#[derive(Debug, serde::Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<&'a str>,
}
