//! Wealthsimple Trade broker implementation.

pub mod client;
pub mod types;

use std::time::Duration;

use driftbook::Symbol;
use log::{debug, info};
use zeroize::Zeroizing;

use crate::Broker;
use crate::error::BrokerError;
use crate::types::*;
use client::{Login, WealthsimpleClient};
use types::{AccountInfo, PositionInfo, SecurityInfo};

/// Supplies a one-time password when the server asks for one.
pub type OtpProvider = Box<dyn FnMut() -> Result<String, BrokerError>>;

/// Wealthsimple Trade broker implementing the generic Broker trait.
///
/// Blocking (sync) via reqwest::blocking. Read-only: accounts, positions
/// and the security catalog.
pub struct WealthsimpleBroker {
    email: String,
    password: Zeroizing<String>,
    otp: Option<Zeroizing<String>>,
    otp_provider: Option<OtpProvider>,
    base_url: String,
    timeout: Duration,
    client: Option<WealthsimpleClient>,
}

impl WealthsimpleBroker {
    /// Create a new broker handle (not yet connected).
    pub fn new(email: &str, password: Zeroizing<String>) -> Self {
        Self {
            email: email.to_string(),
            password,
            otp: None,
            otp_provider: None,
            base_url: client::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            client: None,
        }
    }

    /// Override the API root (default production).
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send this one-time password with the first login attempt.
    pub fn with_otp(mut self, code: Zeroizing<String>) -> Self {
        self.otp = Some(code);
        self
    }

    /// Called when the server challenges a login without a one-time password.
    pub fn with_otp_provider(mut self, provider: OtpProvider) -> Self {
        self.otp_provider = Some(provider);
        self
    }

    fn require_client(&self) -> Result<&WealthsimpleClient, BrokerError> {
        self.client.as_ref().ok_or(BrokerError::NotConnected)
    }

    fn login(&self, otp: Option<&str>) -> Result<Login, BrokerError> {
        WealthsimpleClient::login(
            &self.base_url,
            self.timeout,
            &self.email,
            &self.password,
            otp,
        )
    }
}

impl Broker for WealthsimpleBroker {
    fn connect(&mut self) -> Result<(), BrokerError> {
        let first = self.login(self.otp.as_ref().map(|c| c.as_str()))?;
        let session = match first {
            Login::Session(client) => client,
            Login::OtpRequired => {
                let provider = self
                    .otp_provider
                    .as_mut()
                    .ok_or(BrokerError::TwoFactorRequired)?;
                let code = Zeroizing::new(provider()?);
                match self.login(Some(code.as_str()))? {
                    Login::Session(client) => client,
                    Login::OtpRequired => return Err(BrokerError::TwoFactorRequired),
                }
            }
        };
        info!("Connected to Wealthsimple Trade as {}", self.email);
        self.client = Some(session);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), BrokerError> {
        self.client = None;
        self.otp = None;
        Ok(())
    }

    fn accounts(&self) -> Result<Vec<Account>, BrokerError> {
        let client = self.require_client()?;
        client.accounts()?.into_iter().map(to_account).collect()
    }

    fn positions(&self, account: &AccountId) -> Result<Vec<Position>, BrokerError> {
        let client = self.require_client()?;
        let raw = client.positions(&account.0)?;
        debug!("{} positions in account {account}", raw.len());
        raw.into_iter().map(to_position).collect()
    }

    fn search_securities(&self, query: &str) -> Result<Vec<Security>, BrokerError> {
        let client = self.require_client()?;
        client.search(query)?.into_iter().map(to_security).collect()
    }

    fn security(&self, id: &SecurityId) -> Result<Security, BrokerError> {
        let client = self.require_client()?;
        to_security(client.security(&id.0)?)
    }
}

fn parse_symbol(raw: &str) -> Result<Symbol, BrokerError> {
    Symbol::try_new(raw).ok_or_else(|| BrokerError::InvalidSymbol(raw.to_string()))
}

/// Convert an `/account/list` entry.
pub fn to_account(info: AccountInfo) -> Result<Account, BrokerError> {
    let buying_power_cents = info.buying_power.amount.to_cents().ok_or_else(|| {
        BrokerError::Parse(format!("bad buying power for account {}", info.id))
    })?;
    let currency = if info.buying_power.currency.is_empty() {
        info.base_currency.unwrap_or_default()
    } else {
        info.buying_power.currency
    };
    Ok(Account {
        id: AccountId(info.id),
        kind: info.account_type,
        buying_power_cents,
        currency,
    })
}

/// Convert an `/account/positions` entry. Fractional holdings are rejected
/// since allocation works in whole units.
pub fn to_position(info: PositionInfo) -> Result<Position, BrokerError> {
    let symbol = parse_symbol(&info.stock.symbol)?;
    let quantity = info
        .quantity
        .to_cents()
        .filter(|c| *c >= 0 && c % 100 == 0)
        .map(|c| (c / 100) as u64)
        .ok_or_else(|| BrokerError::Parse(format!("non-whole quantity for {symbol}")))?;
    let price_cents = info
        .quote
        .amount
        .to_cents()
        .ok_or_else(|| BrokerError::Parse(format!("bad quote for {symbol}")))?;
    Ok(Position {
        symbol,
        security_id: SecurityId(info.id),
        quantity,
        price_cents,
    })
}

/// Convert a `/securities` entry.
pub fn to_security(info: SecurityInfo) -> Result<Security, BrokerError> {
    let symbol = parse_symbol(&info.stock.symbol)?;
    let price_cents = match info.quote {
        Some(q) => Some(
            q.amount
                .to_cents()
                .ok_or_else(|| BrokerError::Parse(format!("bad quote for {symbol}")))?,
        ),
        None => None,
    };
    Ok(Security {
        id: SecurityId(info.id),
        symbol,
        name: info.stock.name,
        exchange: info.stock.primary_exchange,
        price_cents,
    })
}
