//! The decoded payment request and the checks that tell whether it was paid.

pub mod bolt11;

use chrono::{DateTime, Utc};
use lnurl_models::VerifyResponse;
use platform_utils::HttpClient;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{RetryPolicy, ensure_sdk, utils::sha256_hex};

pub use bolt11::{DecodedInvoice, decode_invoice};

pub type InvoiceResult<T, E = InvoiceError> = Result<T, E>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvoiceError {
    #[error("invalid payment request")]
    InvalidInput,
    #[error("failed to decode payment request")]
    DecodeFailure,
    #[error("could not verify payment: no preimage and no verify url")]
    NoVerificationMethod,
}

/// LUD-09 success action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "camelCase")]
pub enum SuccessAction {
    Message {
        message: String,
    },
    Url {
        #[serde(default)]
        description: String,
        url: String,
    },
}

impl SuccessAction {
    /// Reads a success action off a callback response, ignoring unknown tags.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct InvoiceArgs {
    pub pr: String,
    pub verify: Option<String>,
    pub preimage: Option<String>,
    pub success_action: Option<SuccessAction>,
}

/// A decoded payment request.
///
/// Everything but the preimage is fixed at construction, so the fields are
/// only readable through accessors.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    payment_request: String,
    payment_hash: String,
    satoshi: u64,
    timestamp: u64,
    expiry: Option<u64>,
    created_date: DateTime<Utc>,
    expiry_date: Option<DateTime<Utc>>,
    description: Option<String>,
    verify: Option<String>,
    success_action: Option<SuccessAction>,
    preimage: Option<String>,
}

impl Invoice {
    pub fn new(args: InvoiceArgs) -> InvoiceResult<Self> {
        ensure_sdk!(!args.pr.is_empty(), InvoiceError::InvalidInput);
        let decoded = decode_invoice(&args.pr).ok_or(InvoiceError::DecodeFailure)?;

        let timestamp = i64::try_from(decoded.timestamp).map_err(|_| InvoiceError::DecodeFailure)?;
        let created_date =
            DateTime::from_timestamp(timestamp, 0).ok_or(InvoiceError::DecodeFailure)?;
        let expiry_date = decoded
            .expiry
            .and_then(|expiry| i64::try_from(expiry).ok())
            .and_then(|expiry| timestamp.checked_add(expiry))
            .and_then(|at| DateTime::from_timestamp(at, 0));

        Ok(Invoice {
            payment_request: args.pr,
            payment_hash: decoded.payment_hash,
            satoshi: decoded.amount_msat.unwrap_or_default() / 1000,
            timestamp: decoded.timestamp,
            expiry: decoded.expiry,
            created_date,
            expiry_date,
            description: decoded.description,
            verify: args.verify,
            success_action: args.success_action,
            preimage: args.preimage,
        })
    }

    pub fn payment_request(&self) -> &str {
        &self.payment_request
    }

    pub fn payment_hash(&self) -> &str {
        &self.payment_hash
    }

    pub fn satoshi(&self) -> u64 {
        self.satoshi
    }

    /// Unix seconds.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Seconds after [`Invoice::timestamp`].
    pub fn expiry(&self) -> Option<u64> {
        self.expiry
    }

    pub fn created_date(&self) -> DateTime<Utc> {
        self.created_date
    }

    pub fn expiry_date(&self) -> Option<DateTime<Utc>> {
        self.expiry_date
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn verify(&self) -> Option<&str> {
        self.verify.as_deref()
    }

    pub fn success_action(&self) -> Option<&SuccessAction> {
        self.success_action.as_ref()
    }

    /// Set once a verify response reveals it.
    pub fn preimage(&self) -> Option<&str> {
        self.preimage.as_deref()
    }

    /// Checks the preimage when one is known, otherwise polls the LNURL-verify
    /// url.
    pub async fn is_paid(
        &mut self,
        http_client: &dyn HttpClient,
        retry: &RetryPolicy,
    ) -> InvoiceResult<bool> {
        if let Some(preimage) = &self.preimage {
            return Ok(self.validate_preimage(preimage));
        }
        ensure_sdk!(self.verify.is_some(), InvoiceError::NoVerificationMethod);
        Ok(self.verify_payment(http_client, retry).await)
    }

    /// True iff the hex `preimage` hashes to this invoice's payment hash.
    /// Malformed hex is simply not a match.
    pub fn validate_preimage(&self, preimage: &str) -> bool {
        let Ok(bytes) = hex::decode(preimage) else {
            return false;
        };
        if preimage.is_empty() {
            return false;
        }
        sha256_hex(bytes).eq_ignore_ascii_case(&self.payment_hash)
    }

    /// Polls the verify url, retrying failed requests per `retry`. Never
    /// errors: an unreachable endpoint reads as unpaid.
    pub async fn verify_payment(
        &mut self,
        http_client: &dyn HttpClient,
        retry: &RetryPolicy,
    ) -> bool {
        let Some(verify) = self.verify.clone() else {
            warn!("LNURL verify not available for {}", self.payment_hash);
            return false;
        };

        let attempts = retry.max_attempts.max(1);
        for attempt in 1..=attempts {
            debug!("Checking LNURL-verify {verify} (attempt {attempt}/{attempts})");
            match Self::fetch_verify(http_client, &verify).await {
                Ok(response) => {
                    if let Some(preimage) = response.preimage.filter(|p| !p.is_empty()) {
                        self.preimage = Some(preimage);
                    }
                    return response.settled;
                }
                Err(e) => warn!("Failed to check LNURL-verify: {e}"),
            }
            if attempt < attempts {
                tokio::time::sleep(retry.delay()).await;
            }
        }
        false
    }

    async fn fetch_verify(
        http_client: &dyn HttpClient,
        verify: &str,
    ) -> Result<VerifyResponse, platform_utils::HttpError> {
        let response = http_client.get(verify.to_string(), None).await?;
        debug!("LNURL-verify responded with status {}", response.status);
        response.error_for_status()?.json()
    }

    /// An invoice without an expiry tag never expires.
    pub fn has_expired(&self) -> bool {
        self.expiry_date
            .is_some_and(|expiry_date| expiry_date < Utc::now())
    }
}
