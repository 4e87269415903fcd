use lnurl_models::{PayerDataRequirements, RawLnurlPay};
use serde::Serialize;

use crate::{
    ensure_sdk,
    lnurl::{
        error::{LnurlError, LnurlResult},
        is_url,
    },
    utils::sha256_hex,
};

const TAG_PAY_REQUEST: &str = "payRequest";

/// A validated LUD-06 pay request.
///
/// Only [`parse_lnurl_pay_response`] builds one, so the bounds always satisfy
/// `0 < min <= max`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LnurlPayResponse {
    callback: String,
    min: u64,
    max: u64,
    fixed: bool,
    comment_allowed: u32,
    allows_nostr: bool,
    nostr_pubkey: Option<String>,
    metadata: Vec<(String, String)>,
    metadata_hash: String,
    identifier: Option<String>,
    email: Option<String>,
    description: Option<String>,
    image: Option<String>,
    domain: Option<String>,
    payer_data: Option<PayerDataRequirements>,
}

impl LnurlPayResponse {
    pub fn callback(&self) -> &str {
        &self.callback
    }

    /// The minimum amount, in millisats, that this LNURL-pay endpoint accepts
    pub fn min(&self) -> u64 {
        self.min
    }

    /// The maximum amount, in millisats, that this LNURL-pay endpoint accepts
    pub fn max(&self) -> u64 {
        self.max
    }

    /// Set when `min == max`.
    pub fn fixed(&self) -> bool {
        self.fixed
    }

    /// The comment length accepted by this endpoint, 0 when not declared.
    ///
    /// See <https://github.com/lnurl/luds/blob/luds/12.md>
    pub fn comment_allowed(&self) -> u32 {
        self.comment_allowed
    }

    /// Value indicating whether the recipient supports Nostr Zaps through NIP-57.
    pub fn allows_nostr(&self) -> bool {
        self.allows_nostr
    }

    /// The lnurl provider's NIP-57 pubkey, used to sign zap receipts.
    pub fn nostr_pubkey(&self) -> Option<&str> {
        self.nostr_pubkey.as_deref()
    }

    /// Parsed `metadata` entries, in the order the service sent them.
    pub fn metadata(&self) -> &[(String, String)] {
        &self.metadata
    }

    /// Hex SHA-256 of the raw `metadata` string, as required by LUD-06 for
    /// description hash verification.
    pub fn metadata_hash(&self) -> &str {
        &self.metadata_hash
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Image as a `data:` URI.
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Hostname of the callback.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// LUD-18 payer data the service asks for.
    pub fn payer_data(&self) -> Option<&PayerDataRequirements> {
        self.payer_data.as_ref()
    }
}

/// Validates a raw pay request.
///
/// `minSendable`/`maxSendable` are taken as millisatoshi, the unit LUD-06
/// specifies. Metadata that is not a JSON array of string pairs parses to an
/// empty list, it is never an error.
pub fn parse_lnurl_pay_response(data: &RawLnurlPay) -> LnurlResult<LnurlPayResponse> {
    ensure_sdk!(
        data.tag.as_deref() == Some(TAG_PAY_REQUEST),
        LnurlError::InvalidServiceType {
            tag: data.tag.clone()
        }
    );

    let callback = data.callback.as_deref().unwrap_or_default().trim();
    ensure_sdk!(
        is_url(callback),
        LnurlError::InvalidCallback {
            callback: callback.to_string()
        }
    );

    #[allow(clippy::cast_possible_truncation)]
    let min = data.min_sendable.unwrap_or(0.0).ceil() as i128;
    #[allow(clippy::cast_possible_truncation)]
    let max = data.max_sendable.unwrap_or(0.0).floor() as i128;
    let (Ok(min_msat), Ok(max_msat)) = (u64::try_from(min), u64::try_from(max)) else {
        return Err(LnurlError::InvalidBounds { min, max });
    };
    ensure_sdk!(
        min_msat > 0 && max_msat > 0 && min_msat <= max_msat,
        LnurlError::InvalidBounds { min, max }
    );

    let raw_metadata = data.metadata.as_deref().unwrap_or_default();
    let metadata = parse_metadata(raw_metadata);
    let metadata_hash = sha256_hex(raw_metadata);

    let mut identifier = None;
    let mut email = None;
    let mut description = None;
    let mut image = None;
    for (key, value) in &metadata {
        match key.as_str() {
            "text/plain" => description = Some(value.clone()),
            "text/identifier" => identifier = Some(value.clone()),
            "text/email" => email = Some(value.clone()),
            "image/png;base64" | "image/jpeg;base64" => image = Some(format!("data:{key},{value}")),
            _ => {}
        }
    }

    let domain = url::Url::parse(callback)
        .ok()
        .and_then(|url| url.host_str().map(ToString::to_string));

    Ok(LnurlPayResponse {
        callback: callback.to_string(),
        min: min_msat,
        max: max_msat,
        fixed: min_msat == max_msat,
        comment_allowed: data.comment_allowed.unwrap_or_default(),
        allows_nostr: data.allows_nostr.unwrap_or_default(),
        nostr_pubkey: data.nostr_pubkey.clone(),
        metadata,
        metadata_hash,
        identifier,
        email,
        description,
        image,
        domain,
        payer_data: data.payer_data.clone(),
    })
}

/// Parses the LUD-06 metadata string. Entries that are not at least a pair
/// of strings are skipped.
fn parse_metadata(raw: &str) -> Vec<(String, String)> {
    let Ok(entries) = serde_json::from_str::<Vec<Vec<serde_json::Value>>>(raw) else {
        return Vec::new();
    };
    entries
        .into_iter()
        .filter_map(|entry| match entry.as_slice() {
            [serde_json::Value::String(k), serde_json::Value::String(v), ..] => {
                Some((k.clone(), v.clone()))
            }
            _ => None,
        })
        .collect()
}

/// Appends invoice generation parameters to the callback, keeping any query
/// the service put there.
pub fn build_callback_url(callback: &str, params: &[(&str, String)]) -> LnurlResult<String> {
    let mut url = url::Url::parse(callback).map_err(|_| LnurlError::InvalidCallback {
        callback: callback.to_string(),
    })?;
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in params {
            query.append_pair(key, value);
        }
    }
    Ok(url.to_string())
}
