use std::{collections::HashMap, sync::Arc};

use platform_utils::{HttpClient, HttpError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::Config;

const SATS_IN_BTC: f64 = 100_000_000.0;

pub type FiatResult<T, E = FiatError> = Result<T, E>;

#[derive(Debug, Error, Clone)]
pub enum FiatError {
    #[error("failed to fetch rates: {0}")]
    ServiceConnectivity(#[from] HttpError),
    #[error("no usable rate for {0}")]
    InvalidRate(String),
}

/// A currency listed by the rates service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FiatCurrency {
    pub code: String,
    pub name: String,
    pub symbol: Option<String>,
    pub priority: i64,
}

#[derive(Deserialize)]
struct RawCurrency {
    name: String,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    priority: i64,
}

#[derive(Deserialize)]
struct RawRate {
    rate_float: f64,
}

/// Fiat conversion backed by a rates endpoint such as
/// `https://getalby.com/api/rates`.
pub struct FiatRates {
    http_client: Arc<dyn HttpClient>,
    rates_url: String,
}

impl FiatRates {
    pub fn new(http_client: Arc<dyn HttpClient>, rates_url: &str) -> Self {
        Self {
            http_client,
            rates_url: rates_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(http_client: Arc<dyn HttpClient>, config: &Config) -> Self {
        Self::new(http_client, &config.rates_url)
    }

    /// Supported currencies without BTC, ordered by priority then name.
    pub async fn fiat_currencies(&self) -> FiatResult<Vec<FiatCurrency>> {
        debug!("Fetching fiat currencies from {}", self.rates_url);
        let response = self.http_client.get(self.rates_url.clone(), None).await?;
        let raw: HashMap<String, RawCurrency> = response.error_for_status()?.json()?;

        let mut currencies: Vec<FiatCurrency> = raw
            .into_iter()
            .map(|(code, details)| FiatCurrency {
                code: code.to_uppercase(),
                name: details.name,
                symbol: details.symbol,
                priority: details.priority,
            })
            .filter(|currency| currency.code != "BTC")
            .collect();
        currencies.sort_by(|a, b| (a.priority, &a.name).cmp(&(b.priority, &b.name)));
        Ok(currencies)
    }

    /// Value of one satoshi in `currency`.
    pub async fn fiat_btc_rate(&self, currency: &str) -> FiatResult<f64> {
        let url = format!("{}/{}.json", self.rates_url, currency.to_lowercase());
        debug!("Fetching fiat rate from {url}");
        let response = self.http_client.get(url, None).await?;
        let raw: RawRate = response.error_for_status()?.json()?;
        Ok(raw.rate_float / SATS_IN_BTC)
    }

    pub async fn fiat_value(&self, satoshi: u64, currency: &str) -> FiatResult<f64> {
        #[allow(clippy::cast_precision_loss)]
        let satoshi = satoshi as f64;
        Ok(satoshi * self.fiat_btc_rate(currency).await?)
    }

    /// Satoshi worth `amount` of `currency`, rounded down.
    pub async fn satoshi_value(&self, amount: f64, currency: &str) -> FiatResult<u64> {
        let rate = self.fiat_btc_rate(currency).await?;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(FiatError::InvalidRate(currency.to_string()));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let satoshi = (amount / rate).floor().max(0.0) as u64;
        Ok(satoshi)
    }
}

/// An amount given either in satoshi or in a fiat currency.
#[derive(Clone, Debug, PartialEq)]
pub enum Amount {
    Sats(u64),
    Fiat { amount: f64, currency: String },
}

impl Amount {
    pub fn usd(amount: f64) -> Self {
        Self::Fiat {
            amount,
            currency: "USD".to_string(),
        }
    }

    pub fn eur(amount: f64) -> Self {
        Self::Fiat {
            amount,
            currency: "EUR".to_string(),
        }
    }

    /// Satoshi value, converting fiat amounts at the current rate.
    pub async fn to_satoshi(&self, rates: &FiatRates) -> FiatResult<u64> {
        match self {
            Self::Sats(satoshi) => Ok(*satoshi),
            Self::Fiat { amount, currency } => rates.satoshi_value(*amount, currency).await,
        }
    }
}
