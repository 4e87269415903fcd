//! Validators for the documents served during lightning address discovery.
//!
//! Each validator is a pure transform from a raw wire document (see
//! `lnurl-models`) into a strict type, or an [`error::LnurlError`].

pub mod error;
pub mod keysend;
pub mod pay;

use std::sync::LazyLock;

use regex::Regex;

static URL_REGEX: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"((([A-Za-z]{3,9}:(?://)?)(?:[-;:&=+$,\w]+@)?[A-Za-z0-9.-]+|(?:www.|[-;:&=+$,\w]+@)[A-Za-z0-9.-]+)((?:/[-+~%/.\w_]*)?\??(?:[-+=&;%@.\w_]*)#?(?:[\w]*))?)",
    )
    .ok()
});

/// Best-effort URL syntax check.
///
/// Accepts the usual `https://host/path?query` forms and rejects bech32
/// encoded lnurls and protocol-relative `//host` strings.
pub fn is_url(url: &str) -> bool {
    !url.is_empty() && URL_REGEX.as_ref().is_some_and(|re| re.is_match(url))
}

/// True iff `amount > 0` and `min <= amount <= max`, all in millisatoshi.
pub fn is_valid_amount(amount: u64, min: u64, max: u64) -> bool {
    amount > 0 && amount >= min && amount <= max
}
