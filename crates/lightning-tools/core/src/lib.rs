//! Client-side tools for Lightning payment workflows.
//!
//! The centre of the crate is [`LightningAddress`], which resolves a
//! `user@domain` address through LNURL-pay discovery, requests invoices
//! (optionally carrying a NIP-57 zap request) and hands them to an injected
//! [`Wallet`]. Around it sit the validators for the discovery documents, the
//! [`Invoice`] model with preimage / LNURL-verify checks, the zap event
//! builder, L402 helpers and fiat conversion.

pub mod boost;
pub mod config;
pub mod error;
pub mod fiat;
pub mod invoice;
pub mod l402;
pub mod lightning_address;
pub mod lnurl;
pub mod logger;
pub mod utils;
pub mod wallet;
pub mod zap;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{Config, KeysendValidation, RetryPolicy};
pub use error::{LightningAddressError, LightningAddressResult};
pub use fiat::{Amount, FiatCurrency, FiatRates};
pub use invoice::{Invoice, InvoiceArgs, SuccessAction};
pub use l402::{L402Options, L402Storage, MemoryStorage, NoStorage, fetch_with_l402};
pub use lightning_address::{
    DiscoveryStatus, LightningAddress, RequestInvoiceArgs, ZapArgs, ZapOptions,
};
pub use lnurl::{keysend::KeysendResponse, pay::LnurlPayResponse};
pub use lnurl_models::{DiscoveryResource, PayerData};
pub use logger::{LogEntry, Logger, init_logging};
pub use platform_utils::{HttpClient, HttpError, HttpResponse};
pub use wallet::{KeysendRequest, SendPaymentResponse, Wallet, WalletError};
pub use zap::{KeysSigner, NostrSigner, UnsignedZapEvent, ZapEvent, ZapRequest};
