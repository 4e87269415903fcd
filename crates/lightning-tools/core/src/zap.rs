//! NIP-57 zap requests.
//!
//! The event is assembled and hashed here, signing is left to a
//! [`NostrSigner`] supplied by the caller.

use nostr::{Keys, UnsignedEvent, util::JsonUtil};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::utils::{now, sha256_hex};

pub const ZAP_REQUEST_KIND: u16 = 9734;

pub type NostrResult<T, E = NostrError> = Result<T, E>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NostrError {
    #[error("no nostr signer available")]
    NostrUnavailable,
    #[error("invalid nostr key: {0}")]
    InvalidKey(String),
    #[error("failed to sign event: {0}")]
    Signing(String),
    #[error("failed to serialize event: {0}")]
    Serialization(String),
}

/// A zap request with its id computed but not yet signed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedZapEvent {
    pub id: String,
    pub pubkey: String,
    pub created_at: u64,
    pub kind: u16,
    pub tags: Vec<Vec<String>>,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZapEvent {
    pub id: String,
    pub pubkey: String,
    pub created_at: u64,
    pub kind: u16,
    pub tags: Vec<Vec<String>>,
    pub content: String,
    pub sig: String,
}

impl ZapEvent {
    pub fn to_json(&self) -> NostrResult<String> {
        serde_json::to_string(self).map_err(|e| NostrError::Serialization(e.to_string()))
    }
}

/// What the zap request says about the payment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ZapRequest {
    pub amount_msat: u64,
    pub comment: Option<String>,
    /// Recipient pubkey (`p` tag).
    pub p: Option<String>,
    /// Zapped note id (`e` tag).
    pub e: Option<String>,
    pub relays: Vec<String>,
}

#[async_trait::async_trait]
pub trait NostrSigner: Send + Sync {
    /// Hex encoded x-only public key.
    async fn get_public_key(&self) -> NostrResult<String>;

    async fn sign_event(&self, event: UnsignedZapEvent) -> NostrResult<ZapEvent>;
}

/// NIP-01 serialization used for the event id.
pub fn serialize_event(
    pubkey: &str,
    created_at: u64,
    kind: u16,
    tags: &[Vec<String>],
    content: &str,
) -> NostrResult<String> {
    serde_json::to_string(&(0, pubkey, created_at, kind, tags, content))
        .map_err(|e| NostrError::Serialization(e.to_string()))
}

pub fn event_hash(
    pubkey: &str,
    created_at: u64,
    kind: u16,
    tags: &[Vec<String>],
    content: &str,
) -> NostrResult<String> {
    Ok(sha256_hex(serialize_event(
        pubkey, created_at, kind, tags, content,
    )?))
}

/// Tags in the order relays expect: relays, amount, then p and e if set.
pub fn zap_tags(request: &ZapRequest) -> Vec<Vec<String>> {
    let mut relays = Vec::with_capacity(request.relays.len().saturating_add(1));
    relays.push("relays".to_string());
    relays.extend(request.relays.iter().cloned());

    let mut tags = vec![
        relays,
        vec!["amount".to_string(), request.amount_msat.to_string()],
    ];
    if let Some(p) = &request.p {
        tags.push(vec!["p".to_string(), p.clone()]);
    }
    if let Some(e) = &request.e {
        tags.push(vec!["e".to_string(), e.clone()]);
    }
    tags
}

pub fn unsigned_zap_event(
    request: &ZapRequest,
    pubkey: String,
    created_at: u64,
) -> NostrResult<UnsignedZapEvent> {
    let tags = zap_tags(request);
    let content = request.comment.clone().unwrap_or_default();
    let id = event_hash(&pubkey, created_at, ZAP_REQUEST_KIND, &tags, &content)?;
    Ok(UnsignedZapEvent {
        id,
        pubkey,
        created_at,
        kind: ZAP_REQUEST_KIND,
        tags,
        content,
    })
}

/// Builds the zap request for `request` stamped with the current time and
/// has `signer` sign it. The signature is not checked.
pub async fn build_zap_event(
    request: &ZapRequest,
    signer: &dyn NostrSigner,
) -> NostrResult<ZapEvent> {
    let pubkey = signer.get_public_key().await?;
    let event = unsigned_zap_event(request, pubkey, now())?;
    debug!("Signing zap request {}", event.id);
    signer.sign_event(event).await
}

/// Signs with a local key pair.
pub struct KeysSigner {
    keys: Keys,
}

impl KeysSigner {
    pub fn new(keys: Keys) -> Self {
        Self { keys }
    }

    /// Accepts a hex or bech32 (`nsec`) secret key.
    pub fn parse(secret_key: &str) -> NostrResult<Self> {
        let keys = Keys::parse(secret_key).map_err(|e| NostrError::InvalidKey(e.to_string()))?;
        Ok(Self::new(keys))
    }

    pub fn generate() -> Self {
        Self::new(Keys::generate())
    }
}

#[async_trait::async_trait]
impl NostrSigner for KeysSigner {
    async fn get_public_key(&self) -> NostrResult<String> {
        Ok(self.keys.public_key().to_hex())
    }

    async fn sign_event(&self, event: UnsignedZapEvent) -> NostrResult<ZapEvent> {
        let json =
            serde_json::to_string(&event).map_err(|e| NostrError::Serialization(e.to_string()))?;
        let unsigned =
            UnsignedEvent::from_json(json).map_err(|e| NostrError::Signing(e.to_string()))?;
        let signed = unsigned
            .sign_with_keys(&self.keys)
            .map_err(|e| NostrError::Signing(e.to_string()))?;

        Ok(ZapEvent {
            id: signed.id.to_hex(),
            pubkey: event.pubkey,
            created_at: event.created_at,
            kind: event.kind,
            tags: event.tags,
            content: event.content,
            sig: signed.sig.to_string(),
        })
    }
}
