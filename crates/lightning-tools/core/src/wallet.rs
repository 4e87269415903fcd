//! The payment capability a host application plugs into this crate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type WalletResult<T, E = WalletError> = Result<T, E>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("wallet could not be enabled: {0}")]
    NotEnabled(String),
    #[error("payment failed: {0}")]
    PaymentFailed(String),
    #[error("wallet does not support keysend")]
    KeysendUnsupported,
    #[error("wallet error: {0}")]
    Generic(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendPaymentResponse {
    pub preimage: String,
}

/// A spontaneous payment to a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeysendRequest {
    pub destination: String,
    /// Amount in satoshi.
    pub amount: u64,
    /// TLV records keyed by their decimal record type.
    pub custom_records: BTreeMap<String, String>,
}

#[async_trait::async_trait]
pub trait Wallet: Send + Sync {
    /// Asks the wallet for permission to make payments.
    async fn enable(&self) -> WalletResult<()>;

    async fn send_payment(&self, payment_request: &str) -> WalletResult<SendPaymentResponse>;

    async fn keysend(&self, _request: KeysendRequest) -> WalletResult<SendPaymentResponse> {
        Err(WalletError::KeysendUnsupported)
    }
}
