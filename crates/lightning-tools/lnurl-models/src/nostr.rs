use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnError, serde_as};

use crate::{NamesMap, RelaysMap};

/// NIP-05 directory, as served on `/.well-known/nostr.json?name={username}`.
///
/// A missing, `null` or malformed map reads as empty.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct NostrDirectory {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub names: NamesMap,
    /// Relays are keyed by pubkey, not by username.
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub relays: RelaysMap,
}

impl NostrDirectory {
    /// Resolves `username` to its pubkey and the relays published for it.
    pub fn lookup(&self, username: &str) -> (Option<String>, Option<Vec<String>>) {
        let pubkey = self.names.get(username).cloned();
        let relays = pubkey
            .as_ref()
            .and_then(|pubkey| self.relays.get(pubkey).cloned());
        (pubkey, relays)
    }
}
