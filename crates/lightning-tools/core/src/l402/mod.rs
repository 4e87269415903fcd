//! L402 (formerly LSAT) paywalled requests.
//!
//! A server answers an unauthenticated request with a `www-authenticate`
//! challenge carrying a token and an invoice. Paying the invoice yields the
//! preimage, and `{token}:{preimage}` then authorizes the request.

use std::{collections::HashMap, sync::LazyLock};

use platform_utils::{HttpClient, HttpError, HttpResponse};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::wallet::{Wallet, WalletError};

mod storage;

pub use storage::{L402Storage, MemoryStorage, NoStorage};

pub const DEFAULT_HEADER_KEY: &str = "L402";

static CHALLENGE_PARAM_REGEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"(\w+)=("([^"]*)"|'([^']*)'|([^,]*))"#).ok());

pub type L402Result<T, E = L402Error> = Result<T, E>;

#[derive(Debug, Error, Clone)]
pub enum L402Error {
    #[error("challenge is missing the {0} parameter")]
    MissingParameter(&'static str),
    #[error("cached credentials are unreadable: {0}")]
    InvalidCredentials(String),
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Splits an L402 or LSAT challenge into its `key=value` parameters.
///
/// Values may be double-quoted, single-quoted or bare.
pub fn parse_l402(header: &str) -> HashMap<String, String> {
    let input = header.replacen("L402", "", 1).replacen("LSAT", "", 1);
    let Some(regex) = CHALLENGE_PARAM_REGEX.as_ref() else {
        return HashMap::new();
    };

    regex
        .captures_iter(input.trim())
        .filter_map(|caps| {
            let key = caps.get(1)?.as_str().to_string();
            let value = [3, 4, 5]
                .into_iter()
                .filter_map(|i| caps.get(i))
                .map(|m| m.as_str())
                .find(|v| !v.is_empty())
                .unwrap_or_default()
                .to_string();
            Some((key, value))
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct L402Challenge {
    pub token: String,
    pub invoice: String,
}

impl L402Challenge {
    /// Reads a `www-authenticate` value. Older servers send `macaroon`
    /// instead of `token`.
    pub fn from_header(header: &str) -> L402Result<Self> {
        let mut params = parse_l402(header);
        let token = params
            .remove("token")
            .or_else(|| params.remove("macaroon"))
            .ok_or(L402Error::MissingParameter("token"))?;
        let invoice = params
            .remove("invoice")
            .ok_or(L402Error::MissingParameter("invoice"))?;
        Ok(Self { token, invoice })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct L402Credentials {
    token: String,
    preimage: String,
}

impl L402Credentials {
    fn authorization(&self, header_key: &str) -> String {
        format!("{header_key} {}:{}", self.token, self.preimage)
    }
}

#[derive(Clone, Debug)]
pub struct L402Options {
    /// Scheme word sent in `Accept-Authenticate` and `Authorization`.
    pub header_key: String,
}

impl Default for L402Options {
    fn default() -> Self {
        Self {
            header_key: DEFAULT_HEADER_KEY.to_string(),
        }
    }
}

/// GETs `url`, paying an L402 challenge through `wallet` when one is returned.
///
/// Credentials are cached in `storage` under the URL and reused on later
/// calls without contacting the wallet.
pub async fn fetch_with_l402(
    http_client: &dyn HttpClient,
    wallet: &dyn Wallet,
    storage: &dyn L402Storage,
    url: &str,
    options: &L402Options,
) -> L402Result<HttpResponse> {
    let header_key = options.header_key.as_str();

    if let Some(cached) = storage.get(url) {
        let credentials: L402Credentials = serde_json::from_str(&cached)
            .map_err(|e| L402Error::InvalidCredentials(e.to_string()))?;
        debug!("Using cached L402 credentials for {url}");
        let headers = HashMap::from([(
            "Authorization".to_string(),
            credentials.authorization(header_key),
        )]);
        return Ok(http_client.get(url.to_string(), Some(headers)).await?);
    }

    let mut headers = HashMap::from([(
        "Accept-Authenticate".to_string(),
        header_key.to_string(),
    )]);
    let response = http_client
        .get(url.to_string(), Some(headers.clone()))
        .await?;
    let Some(challenge) = response.header("www-authenticate") else {
        return Ok(response);
    };

    let challenge = L402Challenge::from_header(challenge)?;
    info!("Paying L402 challenge for {url}");
    wallet.enable().await?;
    let payment = wallet.send_payment(&challenge.invoice).await?;

    let credentials = L402Credentials {
        token: challenge.token,
        preimage: payment.preimage,
    };
    match serde_json::to_string(&credentials) {
        Ok(serialized) => storage.put(url, serialized),
        Err(e) => debug!("Not caching L402 credentials: {e}"),
    }

    headers.insert(
        "Authorization".to_string(),
        credentials.authorization(header_key),
    );
    Ok(http_client.get(url.to_string(), Some(headers)).await?)
}
