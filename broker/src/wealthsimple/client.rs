//! Wealthsimple Trade REST API client.

use std::time::Duration;

use log::debug;
use reqwest::blocking::{Client, Response};
use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use zeroize::Zeroizing;

use super::types::{AccountInfo, LoginRequest, PositionInfo, ResultList, SecurityInfo};
use crate::error::BrokerError;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://trade-service.wealthsimple.com";

/// Header set on a login response when a one-time password is needed.
const OTP_HEADER: &str = "x-wealthsimple-otp";

/// Result of a login attempt.
pub enum Login {
    Session(WealthsimpleClient),
    OtpRequired,
}

/// Blocking Wealthsimple Trade client holding an authenticated session.
pub struct WealthsimpleClient {
    client: Client,
    base_url: Url,
    access_token: Zeroizing<String>,
}

impl WealthsimpleClient {
    /// Log in (POST /auth/login).
    ///
    /// Returns `Login::OtpRequired` when the server asks for a one-time
    /// password that was not supplied.
    pub fn login(
        base_url: &str,
        timeout: Duration,
        email: &str,
        password: &str,
        otp: Option<&str>,
    ) -> Result<Login, BrokerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BrokerError::Connection(format!("failed to build HTTP client: {e}")))?;
        let base_url = Url::parse(base_url)
            .map_err(|e| BrokerError::Connection(format!("invalid base URL {base_url}: {e}")))?;
        let url = endpoint(&base_url, &["auth", "login"])?;

        debug!("POST {url} (otp supplied: {})", otp.is_some());

        let resp = client
            .post(url)
            .json(&LoginRequest {
                email,
                password,
                otp,
            })
            .send()
            .map_err(|e| BrokerError::Connection(format!("login request failed: {e}")))?;

        let status = resp.status();
        if otp_required(resp.headers()) && !status.is_success() {
            return if otp.is_some() {
                Err(BrokerError::Auth("one-time password rejected".into()))
            } else {
                Ok(Login::OtpRequired)
            };
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(BrokerError::Auth("invalid email or password".into()));
        }
        let resp = check_status(resp, "login")?;

        let access_token = access_token(resp.headers())?;
        Ok(Login::Session(Self {
            client,
            base_url,
            access_token,
        }))
    }

    /// List accounts (GET /account/list).
    pub fn accounts(&self) -> Result<Vec<AccountInfo>, BrokerError> {
        let list: ResultList<AccountInfo> = self.get(&["account", "list"], &[], "account list")?;
        Ok(list.results)
    }

    /// Positions of one account (GET /account/positions?account_id=).
    pub fn positions(&self, account_id: &str) -> Result<Vec<PositionInfo>, BrokerError> {
        let list: ResultList<PositionInfo> = self.get(
            &["account", "positions"],
            &[("account_id", account_id)],
            "positions",
        )?;
        Ok(list.results)
    }

    /// Search securities (GET /securities?query=).
    pub fn search(&self, query: &str) -> Result<Vec<SecurityInfo>, BrokerError> {
        let list: ResultList<SecurityInfo> =
            self.get(&["securities"], &[("query", query)], "security search")?;
        Ok(list.results)
    }

    /// One security with its quote (GET /securities/{id}).
    pub fn security(&self, id: &str) -> Result<SecurityInfo, BrokerError> {
        self.get(&["securities", id], &[], "security")
    }

    fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
        what: &str,
    ) -> Result<T, BrokerError> {
        let url = endpoint(&self.base_url, segments)?;
        debug!("GET {url}");

        let resp = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(self.access_token.as_str())
            .send()
            .map_err(|e| BrokerError::Connection(format!("{what} request failed: {e}")))?;

        let resp = check_status(resp, what)?;
        resp.json::<T>()
            .map_err(|e| BrokerError::Parse(format!("failed to parse {what}: {e}")))
    }
}

/// `base` with `segments` appended as percent-encoded path segments.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, BrokerError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| BrokerError::Connection(format!("base URL {base} cannot take a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn check_status(resp: Response, what: &str) -> Result<Response, BrokerError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(BrokerError::RateLimit);
    }
    let body = resp.text().unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(BrokerError::Auth(format!("{what} returned {status}: {body}")));
    }
    Err(BrokerError::Connection(format!(
        "{what} returned {status}: {body}"
    )))
}

/// Whether a login response is an OTP challenge.
pub fn otp_required(headers: &HeaderMap) -> bool {
    headers
        .get(OTP_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().contains("required"))
}

/// Pull the access token out of a successful login response.
pub fn access_token(headers: &HeaderMap) -> Result<Zeroizing<String>, BrokerError> {
    headers
        .get("x-access-token")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|v| Zeroizing::new(v.to_string()))
        .ok_or_else(|| BrokerError::Auth("login response missing x-access-token".into()))
}
