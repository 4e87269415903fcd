//! Podcasting 2.0 boostagrams sent over keysend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::wallet::{KeysendRequest, SendPaymentResponse, Wallet, WalletError, WalletResult};

/// TLV record type carrying the boostagram JSON.
pub const BOOSTAGRAM_RECORD: &str = "7629169";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Boost {
    pub action: String,
    pub value_msat: u64,
    pub value_msat_total: u64,
    pub app_name: String,
    pub app_version: String,
    #[serde(rename = "feedId")]
    pub feed_id: String,
    pub podcast: String,
    pub episode: String,
    pub ts: u64,
    pub name: String,
    pub sender_name: String,
}

#[derive(Clone, Debug, Default)]
pub struct BoostArgs {
    pub destination: String,
    pub custom_key: Option<String>,
    pub custom_value: Option<String>,
    /// Satoshi. Zero or `None` falls back to `boost.value_msat / 1000`.
    pub amount: Option<u64>,
    pub boost: Boost,
}

pub fn keysend_request(args: &BoostArgs) -> WalletResult<KeysendRequest> {
    let amount = args
        .amount
        .filter(|amount| *amount > 0)
        .unwrap_or(args.boost.value_msat / 1000);
    let boost =
        serde_json::to_string(&args.boost).map_err(|e| WalletError::Generic(e.to_string()))?;

    let mut custom_records = BTreeMap::from([(BOOSTAGRAM_RECORD.to_string(), boost)]);
    if let (Some(key), Some(value)) = (&args.custom_key, &args.custom_value) {
        custom_records.insert(key.clone(), value.clone());
    }
    Ok(KeysendRequest {
        destination: args.destination.clone(),
        amount,
        custom_records,
    })
}

pub async fn send_boostagram(
    wallet: &dyn Wallet,
    args: &BoostArgs,
) -> WalletResult<SendPaymentResponse> {
    let request = keysend_request(args)?;
    debug!(
        "Sending boostagram of {} sat to {}",
        request.amount, request.destination
    );
    wallet.enable().await?;
    wallet.keysend(request).await
}
