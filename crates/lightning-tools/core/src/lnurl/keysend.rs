use lnurl_models::RawKeysend;
use serde::{Deserialize, Serialize};

use crate::{
    KeysendValidation, ensure_sdk,
    lnurl::error::{LnurlError, LnurlResult},
};

const TAG_KEYSEND: &str = "keysend";
const STATUS_OK: &str = "OK";
/// Custom record key Podcasting 2.0 wallets expect on the first entry.
pub const PODCASTING2_CUSTOM_KEY: &str = "696969";

/// Validated keysend capability of a lightning address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeysendResponse {
    pub destination: String,
    pub custom_key: Option<String>,
    pub custom_value: Option<String>,
}

pub fn parse_keysend_response(
    data: &RawKeysend,
    validation: KeysendValidation,
) -> LnurlResult<KeysendResponse> {
    ensure_sdk!(
        data.tag.as_deref() == Some(TAG_KEYSEND),
        LnurlError::InvalidTag {
            tag: data.tag.clone()
        }
    );
    ensure_sdk!(
        data.status.as_deref() == Some(STATUS_OK),
        LnurlError::NotOk {
            status: data.status.clone()
        }
    );
    let destination = match data.pubkey.as_deref() {
        Some(pubkey) if !pubkey.is_empty() => pubkey.to_string(),
        _ => return Err(LnurlError::MissingDestination),
    };

    let first = data.custom_data.iter().flatten().next();
    let custom_key = first.and_then(|record| record.custom_key.clone());
    let custom_value = first.and_then(|record| record.custom_value.clone());

    if validation == KeysendValidation::Podcasting2 {
        ensure_sdk!(
            custom_key.as_deref() == Some(PODCASTING2_CUSTOM_KEY) && custom_value.is_some(),
            LnurlError::MissingCustomRecord {
                expected_key: PODCASTING2_CUSTOM_KEY.to_string()
            }
        );
    }

    Ok(KeysendResponse {
        destination,
        custom_key,
        custom_value,
    })
}
