use platform_utils::HttpError;
use thiserror::Error;

pub type LnurlResult<T, E = LnurlError> = Result<T, E>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LnurlError {
    #[error("invalid pay service params: expected tag payRequest, got {tag:?}")]
    InvalidServiceType { tag: Option<String> },
    #[error("callback must be a valid url: {callback:?}")]
    InvalidCallback { callback: String },
    #[error("invalid pay service bounds: min {min} msat, max {max} msat")]
    InvalidBounds { min: i128, max: i128 },
    #[error("invalid keysend params: expected tag keysend, got {tag:?}")]
    InvalidTag { tag: Option<String> },
    #[error("keysend status not OK: {status:?}")]
    NotOk { status: Option<String> },
    #[error("keysend pubkey does not exist")]
    MissingDestination,
    #[error("unable to find keysend custom record {expected_key}")]
    MissingCustomRecord { expected_key: String },
    #[error("error calling lnurl endpoint: {0}")]
    ServiceConnectivity(String),
    #[error("endpoint error: {0}")]
    EndpointError(String),
    #[error("lnurl has invalid response: {0}")]
    InvalidResponse(String),
}

impl From<HttpError> for LnurlError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Json(msg) => Self::InvalidResponse(msg),
            other => Self::ServiceConnectivity(other.to_string()),
        }
    }
}
