//! Lightning address resolution and payment.
//!
//! A [`LightningAddress`] moves through [`DiscoveryStatus`]: it is parsed on
//! construction and fetched on demand, either through a trusted proxy or
//! straight from the recipient's `/.well-known` endpoints.

use std::sync::{Arc, LazyLock};

use lnurl_models::{
    DiscoveryResource, NostrDirectory, PayerData, ProxyDetailsResponse, ProxyInvoiceResponse,
    RawCallbackResponse, RawDocument, RawKeysend, RawLnurlPay,
};
use platform_utils::{HttpClient, HttpResponse};
use regex::Regex;
use serde::de::DeserializeOwned;
use tracing::{debug, info, trace, warn};

use crate::{
    Config,
    boost::{Boost, BoostArgs, send_boostagram},
    ensure_sdk,
    error::{LightningAddressError, LightningAddressResult},
    invoice::{Invoice, InvoiceArgs, SuccessAction},
    lnurl::{
        error::LnurlError,
        is_url, is_valid_amount,
        keysend::{KeysendResponse, parse_keysend_response},
        pay::{LnurlPayResponse, build_callback_url, parse_lnurl_pay_response},
    },
    wallet::{SendPaymentResponse, Wallet},
    zap::{NostrError, NostrSigner, ZapRequest, build_zap_event},
};

#[cfg(test)]
mod tests;

static LN_ADDRESS_REGEX: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r#"^((?:[^<>()\[\]\\.,;:\s@"]+(?:\.[^<>()\[\]\\.,;:\s@"]+)*)|(?:".+"))@((?:\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(?:(?:[a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .ok()
});

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscoveryStatus {
    /// The address is not `user@domain`.
    Unparsed,
    Parsed,
    /// A fetch completed. Individual documents may still be absent.
    Fetched,
}

#[derive(Clone, Debug, Default)]
pub struct RequestInvoiceArgs {
    pub satoshi: u64,
    pub comment: Option<String>,
    pub payer_data: Option<PayerData>,
}

#[derive(Clone, Debug, Default)]
pub struct ZapArgs {
    pub satoshi: u64,
    pub comment: Option<String>,
    pub relays: Vec<String>,
    /// Note being zapped.
    pub e: Option<String>,
}

#[derive(Clone, Default)]
pub struct ZapOptions {
    /// Overrides the signer the address was built with.
    pub signer: Option<Arc<dyn NostrSigner>>,
}

pub struct LightningAddress {
    address: String,
    username: Option<String>,
    domain: Option<String>,
    config: Config,
    http_client: Arc<dyn HttpClient>,
    wallet: Option<Arc<dyn Wallet>>,
    signer: Option<Arc<dyn NostrSigner>>,
    fetched: bool,
    lnurlp_data: Option<LnurlPayResponse>,
    keysend_data: Option<KeysendResponse>,
    nostr_data: Option<NostrDirectory>,
    nostr_pubkey: Option<String>,
    nostr_relays: Option<Vec<String>>,
}

impl LightningAddress {
    /// Never fails: a malformed address simply stays
    /// [`DiscoveryStatus::Unparsed`].
    pub fn new(address: &str, config: Config, http_client: Arc<dyn HttpClient>) -> Self {
        let (username, domain) = parse_address(address).unzip();
        if username.is_none() {
            debug!("Could not parse lightning address {address}");
        }
        LightningAddress {
            address: address.to_string(),
            username,
            domain,
            config,
            http_client,
            wallet: None,
            signer: None,
            fetched: false,
            lnurlp_data: None,
            keysend_data: None,
            nostr_data: None,
            nostr_pubkey: None,
            nostr_relays: None,
        }
    }

    #[must_use]
    pub fn with_wallet(mut self, wallet: Arc<dyn Wallet>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    #[must_use]
    pub fn with_signer(mut self, signer: Arc<dyn NostrSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn lnurlp_data(&self) -> Option<&LnurlPayResponse> {
        self.lnurlp_data.as_ref()
    }

    pub fn keysend_data(&self) -> Option<&KeysendResponse> {
        self.keysend_data.as_ref()
    }

    pub fn nostr_data(&self) -> Option<&NostrDirectory> {
        self.nostr_data.as_ref()
    }

    pub fn nostr_pubkey(&self) -> Option<&str> {
        self.nostr_pubkey.as_deref()
    }

    pub fn nostr_relays(&self) -> Option<&[String]> {
        self.nostr_relays.as_deref()
    }

    pub fn status(&self) -> DiscoveryStatus {
        if self.username.is_none() {
            DiscoveryStatus::Unparsed
        } else if self.fetched {
            DiscoveryStatus::Fetched
        } else {
            DiscoveryStatus::Parsed
        }
    }

    pub fn lnurlp_url(&self) -> Option<String> {
        let (username, domain) = self.parts()?;
        Some(format!("https://{domain}/.well-known/lnurlp/{username}"))
    }

    pub fn keysend_url(&self) -> Option<String> {
        let (username, domain) = self.parts()?;
        Some(format!("https://{domain}/.well-known/keysend/{username}"))
    }

    pub fn nostr_url(&self) -> Option<String> {
        let (username, domain) = self.parts()?;
        Some(format!(
            "https://{domain}/.well-known/nostr.json?name={username}"
        ))
    }

    fn parts(&self) -> Option<(&str, &str)> {
        Some((self.username.as_deref()?, self.domain.as_deref()?))
    }

    /// Fetches the lnurlp, keysend and nostr documents, replacing whatever a
    /// previous fetch stored.
    ///
    /// In direct mode an endpoint that cannot be reached is skipped. A document
    /// that arrives but fails validation is reported after the others have
    /// been stored.
    pub async fn fetch(&mut self) -> LightningAddressResult<()> {
        self.lnurlp_data = None;
        self.keysend_data = None;
        self.nostr_data = None;
        self.nostr_pubkey = None;
        self.nostr_relays = None;

        let documents = match self.config.proxy_endpoint() {
            Some(proxy) => self.fetch_with_proxy(proxy).await?,
            None => self.fetch_without_proxy().await?,
        };
        self.fetched = true;
        let result = self.apply_documents(documents);
        info!(
            "Fetched lightning address {}: lnurlp={} keysend={} nostr={}",
            self.address,
            self.lnurlp_data.is_some(),
            self.keysend_data.is_some(),
            self.nostr_pubkey.is_some()
        );
        result
    }

    async fn fetch_with_proxy(&self, proxy: &str) -> LightningAddressResult<Vec<RawDocument>> {
        let url = format!(
            "{proxy}/lightning-address-details?{}",
            encode_query(&[("ln", self.address.as_str())])
        );
        debug!("Fetching lightning address details from {url}");
        let response = self.http_client.get(url, None).await?;
        debug!("Proxy responded with status {}", response.status);
        trace!("Proxy response body: {}", response.body);
        let details: ProxyDetailsResponse = response.error_for_status()?.json()?;

        let mut documents = Vec::new();
        if let Some(lnurlp) = details.lnurlp {
            documents.push(RawDocument::Lnurlp(lnurlp));
        }
        if let Some(keysend) = details.keysend {
            documents.push(RawDocument::Keysend(keysend));
        }
        if let Some(nostr) = details.nostr {
            documents.push(RawDocument::Nostr(nostr));
        }
        Ok(documents)
    }

    async fn fetch_without_proxy(&self) -> LightningAddressResult<Vec<RawDocument>> {
        let (Some(lnurlp_url), Some(keysend_url), Some(nostr_url)) =
            (self.lnurlp_url(), self.keysend_url(), self.nostr_url())
        else {
            return Err(LightningAddressError::InvalidAddress {
                address: self.address.clone(),
            });
        };

        let (lnurlp, keysend, nostr) = tokio::join!(
            self.fetch_document::<RawLnurlPay>(lnurlp_url, DiscoveryResource::Lnurlp),
            self.fetch_document::<RawKeysend>(keysend_url, DiscoveryResource::Keysend),
            self.fetch_document::<NostrDirectory>(nostr_url, DiscoveryResource::Nostr),
        );

        Ok([
            lnurlp.map(RawDocument::Lnurlp),
            keysend.map(RawDocument::Keysend),
            nostr.map(RawDocument::Nostr),
        ]
        .into_iter()
        .flatten()
        .collect())
    }

    /// GETs one well-known document. Any failure is logged and yields `None`.
    async fn fetch_document<T: DeserializeOwned>(
        &self,
        url: String,
        resource: DiscoveryResource,
    ) -> Option<T> {
        debug!("Fetching {resource} document from {url}");
        let response = match self.http_client.get(url, None).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to fetch {resource} document: {e}");
                return None;
            }
        };
        if !response.is_success() {
            warn!(
                "Failed to fetch {resource} document: status {}",
                response.status
            );
            return None;
        }
        trace!("{resource} document: {}", response.body);
        match response.json() {
            Ok(document) => Some(document),
            Err(e) => {
                warn!("Failed to parse {resource} document: {e}");
                None
            }
        }
    }

    fn apply_documents(&mut self, documents: Vec<RawDocument>) -> LightningAddressResult<()> {
        let mut first_error = None;
        for document in documents {
            let resource = document.resource();
            let applied = match document {
                RawDocument::Lnurlp(raw) => parse_lnurl_pay_response(&raw)
                    .map(|data| self.lnurlp_data = Some(data)),
                RawDocument::Keysend(raw) => {
                    parse_keysend_response(&raw, self.config.keysend_validation)
                        .map(|data| self.keysend_data = Some(data))
                }
                RawDocument::Nostr(directory) => {
                    self.apply_nostr(directory);
                    Ok(())
                }
            };
            if let Err(e) = applied {
                warn!("Invalid {resource} document for {}: {e}", self.address);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    fn apply_nostr(&mut self, directory: NostrDirectory) {
        let (pubkey, relays) = match &self.username {
            Some(username) => directory.lookup(username),
            None => (None, None),
        };
        self.nostr_pubkey = pubkey;
        self.nostr_relays = relays;
        self.nostr_data = Some(directory);
    }

    fn require_lnurlp(&self) -> LightningAddressResult<&LnurlPayResponse> {
        self.lnurlp_data
            .as_ref()
            .ok_or(LightningAddressError::NotFetched {
                resource: DiscoveryResource::Lnurlp,
            })
    }

    fn require_wallet(&self) -> LightningAddressResult<&Arc<dyn Wallet>> {
        self.wallet.as_ref().ok_or(LightningAddressError::NoWallet)
    }

    /// Requests an invoice for `args.satoshi` from the recipient's LNURL-pay
    /// service.
    pub async fn request_invoice(
        &self,
        args: &RequestInvoiceArgs,
    ) -> LightningAddressResult<Invoice> {
        let lnurlp = self.require_lnurlp()?;
        let amount_msat = validate_amount(args.satoshi, lnurlp)?;

        let comment = args.comment.as_deref().filter(|c| !c.is_empty());
        if let Some(comment) = comment {
            let length = comment.chars().count();
            let max = lnurlp.comment_allowed();
            ensure_sdk!(
                max == 0 || length <= max as usize,
                LightningAddressError::CommentTooLong { length, max }
            );
        }

        let mut params = vec![("amount", amount_msat.to_string())];
        if let Some(comment) = comment {
            params.push(("comment", comment.to_string()));
        }
        if let Some(payer_data) = &args.payer_data {
            let payer_data = serde_json::to_string(payer_data)
                .map_err(|e| LnurlError::InvalidResponse(e.to_string()))?;
            params.push(("payerdata", payer_data));
        }

        self.generate_invoice(&params).await
    }

    /// Sends a boostagram to the keysend destination. `amount` is in satoshi.
    pub async fn boost(
        &self,
        boost: Boost,
        amount: Option<u64>,
    ) -> LightningAddressResult<SendPaymentResponse> {
        let keysend = self
            .keysend_data
            .as_ref()
            .ok_or(LightningAddressError::NotFetched {
                resource: DiscoveryResource::Keysend,
            })?;
        let wallet = self.require_wallet()?;

        let args = BoostArgs {
            destination: keysend.destination.clone(),
            custom_key: keysend.custom_key.clone(),
            custom_value: keysend.custom_value.clone(),
            amount,
            boost,
        };
        Ok(send_boostagram(wallet.as_ref(), &args).await?)
    }

    /// Requests an invoice carrying a signed NIP-57 zap request.
    pub async fn zap_invoice(
        &self,
        args: &ZapArgs,
        options: &ZapOptions,
    ) -> LightningAddressResult<Invoice> {
        let lnurlp = self.require_lnurlp()?;
        let recipient = self
            .nostr_pubkey
            .clone()
            .ok_or(LightningAddressError::MissingNostrPubkey)?;
        let amount_msat = validate_amount(args.satoshi, lnurlp)?;
        ensure_sdk!(
            lnurlp.allows_nostr(),
            LightningAddressError::ZapsUnsupported
        );

        let signer = options
            .signer
            .as_ref()
            .or(self.signer.as_ref())
            .ok_or(NostrError::NostrUnavailable)?;
        let request = ZapRequest {
            amount_msat,
            comment: args.comment.clone(),
            p: Some(recipient),
            e: args.e.clone(),
            relays: args.relays.clone(),
        };
        let event = build_zap_event(&request, signer.as_ref()).await?;
        info!(
            "Requesting zap invoice for {} with event {}",
            self.address, event.id
        );

        let params = [
            ("amount", amount_msat.to_string()),
            ("nostr", event.to_json()?),
        ];
        self.generate_invoice(&params).await
    }

    /// Zaps the recipient and pays the invoice with the configured wallet.
    pub async fn zap(
        &self,
        args: &ZapArgs,
        options: &ZapOptions,
    ) -> LightningAddressResult<SendPaymentResponse> {
        let wallet = self.require_wallet()?;
        let invoice = self.zap_invoice(args, options).await?;
        wallet.enable().await?;
        Ok(wallet.send_payment(invoice.payment_request()).await?)
    }

    /// Checks `invoice` with the configured verify retry policy.
    pub async fn is_invoice_paid(&self, invoice: &mut Invoice) -> LightningAddressResult<bool> {
        Ok(invoice
            .is_paid(self.http_client.as_ref(), &self.config.verify_retry)
            .await?)
    }

    async fn generate_invoice(&self, params: &[(&str, String)]) -> LightningAddressResult<Invoice> {
        let data: RawCallbackResponse = match self.config.proxy_endpoint() {
            Some(proxy) => {
                let mut query = vec![("ln", self.address.as_str())];
                query.extend(params.iter().map(|(k, v)| (*k, v.as_str())));
                let url = format!("{proxy}/generate-invoice?{}", encode_query(&query));
                let envelope: ProxyInvoiceResponse = self.get_json(url).await?;
                envelope
                    .invoice
                    .ok_or(LightningAddressError::InvalidInvoiceResponse)?
            }
            None => {
                let callback = self.require_lnurlp()?.callback();
                ensure_sdk!(
                    is_url(callback),
                    LnurlError::InvalidCallback {
                        callback: callback.to_string()
                    }
                    .into()
                );
                let url = build_callback_url(callback, params)?;
                self.get_json(url).await?
            }
        };

        if data.status.as_deref() == Some("ERROR") {
            let reason = data.reason.unwrap_or_default();
            return Err(LnurlError::EndpointError(reason).into());
        }
        let pr = data
            .pr
            .filter(|pr| !pr.is_empty())
            .ok_or(LightningAddressError::InvalidInvoiceResponse)?;
        let invoice = Invoice::new(InvoiceArgs {
            pr,
            verify: data.verify,
            preimage: None,
            success_action: data
                .success_action
                .as_ref()
                .and_then(SuccessAction::from_value),
        })?;
        info!(
            "Generated invoice {} for {} sat",
            invoice.payment_hash(),
            invoice.satoshi()
        );
        Ok(invoice)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> LightningAddressResult<T> {
        debug!("Requesting invoice from {url}");
        let response: HttpResponse = self.http_client.get(url, None).await?;
        debug!("Invoice endpoint responded with status {}", response.status);
        trace!("Invoice endpoint body: {}", response.body);
        Ok(response.error_for_status()?.json()?)
    }
}

fn parse_address(address: &str) -> Option<(String, String)> {
    let lowercase = address.to_lowercase();
    let captures = LN_ADDRESS_REGEX.as_ref()?.captures(&lowercase)?;
    Some((
        captures.get(1)?.as_str().to_string(),
        captures.get(2)?.as_str().to_string(),
    ))
}

fn validate_amount(satoshi: u64, lnurlp: &LnurlPayResponse) -> LightningAddressResult<u64> {
    let amount_msat = satoshi.saturating_mul(1000);
    ensure_sdk!(
        is_valid_amount(amount_msat, lnurlp.min(), lnurlp.max()),
        LightningAddressError::InvalidAmount {
            amount_msat,
            min: lnurlp.min(),
            max: lnurlp.max(),
        }
    );
    Ok(amount_msat)
}

fn encode_query(pairs: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}
