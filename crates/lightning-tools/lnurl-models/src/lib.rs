//! Wire documents exchanged with LNURL services and lightning address proxies.
//!
//! These types mirror what servers actually send, so nearly every field is
//! optional and numeric fields accept both JSON numbers and numeric strings.
//! They are validated into strict types by `lightning-tools` and should not
//! be used past that boundary.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_with::{DefaultOnError, DisplayFromStr, PickFirst, serde_as};

pub mod nostr;

pub use nostr::NostrDirectory;

/// Which discovery document a value belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryResource {
    Lnurlp,
    Keysend,
    Nostr,
}

impl std::fmt::Display for DiscoveryResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Lnurlp => "lnurlp",
            Self::Keysend => "keysend",
            Self::Nostr => "nostr",
        };
        f.write_str(name)
    }
}

/// A raw discovery document, tagged by the endpoint it came from.
#[derive(Clone, Debug)]
pub enum RawDocument {
    Lnurlp(RawLnurlPay),
    Keysend(RawKeysend),
    Nostr(NostrDirectory),
}

impl RawDocument {
    pub fn resource(&self) -> DiscoveryResource {
        match self {
            Self::Lnurlp(_) => DiscoveryResource::Lnurlp,
            Self::Keysend(_) => DiscoveryResource::Keysend,
            Self::Nostr(_) => DiscoveryResource::Nostr,
        }
    }
}

/// LUD-06 pay request, as served on `/.well-known/lnurlp/{username}`.
#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLnurlPay {
    pub tag: Option<String>,
    pub callback: Option<String>,
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    #[serde(default)]
    pub min_sendable: Option<f64>,
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    #[serde(default)]
    pub max_sendable: Option<f64>,
    /// JSON-encoded metadata array, kept verbatim for hashing.
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub metadata: Option<String>,
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    #[serde(default)]
    pub comment_allowed: Option<u32>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub allows_nostr: Option<bool>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub nostr_pubkey: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub payer_data: Option<PayerDataRequirements>,
}

/// LUD-18 description of the payer data a service asks for.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PayerDataRequirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<PayerDataField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pubkey: Option<PayerDataField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<PayerDataField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<PayerDataField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<PayerDataAuthField>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PayerDataField {
    #[serde(default)]
    pub mandatory: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PayerDataAuthField {
    #[serde(default)]
    pub mandatory: bool,
    pub k1: String,
}

/// LUD-18 payer data sent along with an invoice request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PayerData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pubkey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<PayerDataAuth>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PayerDataAuth {
    pub key: String,
    pub sig: String,
}

/// Keysend capability document, as served on `/.well-known/keysend/{username}`.
#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawKeysend {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub tag: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub status: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub pubkey: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub custom_data: Option<Vec<RawCustomData>>,
}

/// A keysend TLV record. Record types are often sent as JSON numbers.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCustomData {
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub custom_key: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub custom_value: Option<String>,
}

/// Anything other than a string or a number reads as absent.
fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = Deserialize::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(num) => Some(num.to_string()),
        _ => None,
    })
}

/// Composite document returned by a lightning address proxy.
///
/// A `null` member means the recipient does not offer that resource. A member
/// that does not have the expected shape is dropped on its own.
#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ProxyDetailsResponse {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub lnurlp: Option<RawLnurlPay>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub keysend: Option<RawKeysend>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub nostr: Option<NostrDirectory>,
}

/// Response of the LNURL-pay callback (LUD-06), also used by the proxy's
/// `generate-invoice` endpoint inside an `invoice` envelope.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCallbackResponse {
    pub pr: Option<String>,
    pub verify: Option<String>,
    /// Kept untyped here: unknown success action tags are ignored, not fatal.
    pub success_action: Option<serde_json::Value>,
    pub status: Option<String>,
    pub reason: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ProxyInvoiceResponse {
    pub invoice: Option<RawCallbackResponse>,
}

/// LUD-21 verify response.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub settled: bool,
    pub preimage: Option<String>,
    pub pr: Option<String>,
    pub status: Option<String>,
}

/// Directory maps for NIP-05, keyed by username and pubkey respectively.
pub type NamesMap = HashMap<String, String>;
pub type RelaysMap = HashMap<String, Vec<String>>;
