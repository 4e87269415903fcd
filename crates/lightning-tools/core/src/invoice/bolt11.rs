use std::str::FromStr;

use lightning_invoice::{Bolt11Invoice, Bolt11InvoiceDescriptionRef, TaggedField};
use tracing::debug;

/// The fields of a BOLT11 payment request this crate cares about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedInvoice {
    pub payment_hash: String,
    pub amount_msat: Option<u64>,
    /// Unix seconds.
    pub timestamp: u64,
    /// Only set when the invoice carries an explicit `x` tag.
    pub expiry: Option<u64>,
    /// Absent for description-hash invoices.
    pub description: Option<String>,
}

/// Decodes `payment_request`, returning `None` when it is not a valid BOLT11
/// invoice.
pub fn decode_invoice(payment_request: &str) -> Option<DecodedInvoice> {
    if payment_request.is_empty() {
        return None;
    }
    let invoice = match Bolt11Invoice::from_str(payment_request) {
        Ok(invoice) => invoice,
        Err(e) => {
            debug!("Failed to decode bolt11 invoice: {e}");
            return None;
        }
    };

    let expiry = invoice.tagged_fields().find_map(|field| match field {
        TaggedField::ExpiryTime(expiry) => Some(expiry.as_seconds()),
        _ => None,
    });
    let description = match invoice.description() {
        Bolt11InvoiceDescriptionRef::Direct(description) => Some(description.to_string()),
        Bolt11InvoiceDescriptionRef::Hash(_) => None,
    };

    Some(DecodedInvoice {
        payment_hash: invoice.payment_hash().to_string(),
        amount_msat: invoice.amount_milli_satoshis(),
        timestamp: invoice.duration_since_epoch().as_secs(),
        expiry,
        description,
    })
}
