use lnurl_models::DiscoveryResource;
use platform_utils::HttpError;
use thiserror::Error;

use crate::{
    invoice::InvoiceError, lnurl::error::LnurlError, wallet::WalletError, zap::NostrError,
};

pub type LightningAddressResult<T, E = LightningAddressError> = Result<T, E>;

#[derive(Debug, Error, Clone)]
pub enum LightningAddressError {
    #[error("invalid lightning address: {address}")]
    InvalidAddress { address: String },

    #[error("invalid amount: {amount_msat} msat is outside [{min}, {max}]")]
    InvalidAmount {
        amount_msat: u64,
        min: u64,
        max: u64,
    },

    #[error("the comment length must be {max} characters or fewer, got {length}")]
    CommentTooLong { length: usize, max: u32 },

    #[error("no {resource} data available, call fetch() first")]
    NotFetched { resource: DiscoveryResource },

    #[error("nostr pubkey is missing")]
    MissingNostrPubkey,

    #[error("the provider does not support zaps")]
    ZapsUnsupported,

    #[error("no wallet available")]
    NoWallet,

    #[error("the wallet does not support keysend")]
    KeysendUnsupported,

    #[error("invalid pay service invoice")]
    InvalidInvoiceResponse,

    #[error("http error: {0}")]
    Http(#[from] HttpError),

    #[error(transparent)]
    Lnurl(#[from] LnurlError),

    #[error(transparent)]
    Invoice(#[from] InvoiceError),

    #[error(transparent)]
    Nostr(#[from] NostrError),

    #[error(transparent)]
    Wallet(WalletError),
}

impl From<WalletError> for LightningAddressError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::KeysendUnsupported => Self::KeysendUnsupported,
            other => Self::Wallet(other),
        }
    }
}
