use std::sync::Arc;

use lnurl_models::{DiscoveryResource, PayerData};
use nostr::util::JsonUtil;
use platform_utils::HttpError;
use serde_json::{Value, json};

use super::*;
use crate::{
    KeysendValidation, RetryPolicy,
    boost::Boost,
    lnurl::error::LnurlError,
    test_utils::{MockHttpClient, MockResponse, MockWallet},
    zap::KeysSigner,
};

const PROXY: &str = "https://api.getalby.com/lnurl";
const DETAILS_URL: &str = "https://api.getalby.com/lnurl/lightning-address-details";
const GENERATE_URL: &str = "https://api.getalby.com/lnurl/generate-invoice";
const LNURLP_URL: &str = "https://getalby.com/.well-known/lnurlp/hello";
const KEYSEND_URL: &str = "https://getalby.com/.well-known/keysend/hello";
const NOSTR_URL: &str = "https://getalby.com/.well-known/nostr.json?name=hello";
const CALLBACK_URL: &str = "https://getalby.com/lnurlp/hello/callback";

const NODE_PUBKEY: &str = "030a58b8653d32b99200a2334cfe913e51dc7d155aa0116c176657a4f1722677a3";
const NOSTR_PUBKEY: &str = "4657dfe8965be8980a93072bcfb5e59a65124406db0f819215ee78ba47934b3e";
const PROVIDER_NOSTR_PUBKEY: &str =
    "79f00d3f5a19ec806189fcab03c1be4ff81d18ee4f653c88fac41fe03570f432";
const NOTE_ID: &str = "44e1827635450ebb3c5a7d12c1f8e7b2b514439ac10a67eef3d9fd9c5c68e245";

/// 1000 sat.
const PROXY_PR: &str =
    "lnbc10u1pjk6mhgpp5zj5mn43uz96y94vevla98990gtkm0fa5jysvfl2wx6q2lllkyd9shp56x0knvgt833500x88k786uqc7nqpa563vgzt5e9c7srg4h8vqf2qcqzzsxqyz5vqsp5h8crvhl0etrgc3jfwwqypmckvp5szw8a8mhnzw0xk6ru5anyak6q9qyyssq0dcsf56fhdwjd4adwlljetpkhdanckgxgwx49fu49h9hxjj0haq9tg867x6acudjraxvwuuq033004jy8fwx98hd69c9z3az2qhv3wsq6wwe8p";
/// 1 sat.
const DIRECT_PR: &str =
    "lnbc10n1pjk6m6spp57n44qespk3z2hjfc6wxmyqjy8aprdz5k6jflu9q5gw6wqm3y0ssqhp50kncf9zk35xg4lxewt4974ry6mudygsztsz8qn3ar8pn3mtpe50scqzzsxqyz5vqsp5creygvh0cmhjnqsvq7c9k5w9fpe4yy0sw025msv7ut09krp9g5ds9qyyssqlpl0539nx0rhmtltzzaeznnt967msvnuqe7k9mhld8xvs032ysy5697hsene3xat2ujxahfe63c6ces82jd2hcv2dmuynkf2p7cttuqpm6qdfm";

fn lnurlp_json() -> Value {
    json!({
        "status": "OK",
        "tag": "payRequest",
        "commentAllowed": 255,
        "callback": CALLBACK_URL,
        "metadata": "[[\"text/identifier\",\"hello@getalby.com\"],[\"text/plain\",\"Sats for Alby\"]]",
        "minSendable": 1000,
        "maxSendable": 11_000_000_000_u64,
        "payerData": {
            "name": {"mandatory": false},
            "email": {"mandatory": false}
        },
        "nostrPubkey": PROVIDER_NOSTR_PUBKEY,
        "allowsNostr": true
    })
}

fn keysend_json() -> Value {
    json!({
        "status": "OK",
        "tag": "keysend",
        "pubkey": NODE_PUBKEY,
        "customData": [{"customKey": "696969", "customValue": "017rsl75kNnSke4mMHYE"}]
    })
}

fn nostr_json() -> Value {
    json!({
        "names": {"hello": NOSTR_PUBKEY},
        "relays": {NOSTR_PUBKEY: ["wss://relay.getalby.com/v1"]}
    })
}

fn direct_config() -> Config {
    Config {
        verify_retry: RetryPolicy {
            max_attempts: 3,
            delay_ms: 0,
        },
        ..Config::direct()
    }
}

fn address(addr: &str, config: Config, http: &Arc<MockHttpClient>) -> LightningAddress {
    LightningAddress::new(addr, config, http.clone())
}

fn mock_direct_discovery(http: &MockHttpClient) {
    http.add_route(LNURLP_URL, MockResponse::json(200, &lnurlp_json()))
        .add_route(KEYSEND_URL, MockResponse::json(200, &keysend_json()))
        .add_route(NOSTR_URL, MockResponse::json(200, &nostr_json()));
}

fn query_param(url: &str, name: &str) -> Option<String> {
    url::Url::parse(url)
        .unwrap()
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

fn boost() -> Boost {
    Boost {
        action: "boost".into(),
        value_msat: 21_000,
        value_msat_total: 21_000,
        app_name: "Alby".into(),
        app_version: "1.0".into(),
        feed_id: "999999".into(),
        podcast: "Satoshis Stream".into(),
        episode: "Episode 1".into(),
        ts: 2121,
        name: "Satoshi".into(),
        sender_name: "Hal".into(),
    }
}

#[test]
fn test_parse_addresses() {
    let http = Arc::new(MockHttpClient::new());

    let ln = address("Hello@GetAlby.com", Config::default(), &http);
    assert_eq!(ln.username(), Some("hello"));
    assert_eq!(ln.domain(), Some("getalby.com"));
    assert_eq!(ln.address(), "Hello@GetAlby.com");
    assert_eq!(ln.status(), DiscoveryStatus::Parsed);
    assert_eq!(ln.lnurlp_url().as_deref(), Some(LNURLP_URL));
    assert_eq!(ln.keysend_url().as_deref(), Some(KEYSEND_URL));
    assert_eq!(ln.nostr_url().as_deref(), Some(NOSTR_URL));

    let ln = address("first.last@[192.168.0.1]", Config::default(), &http);
    assert_eq!(ln.username(), Some("first.last"));
    assert_eq!(ln.domain(), Some("[192.168.0.1]"));

    for invalid in ["hello", "hello@", "@getalby.com", "hello@localhost", "a b@getalby.com", ""] {
        let ln = address(invalid, Config::default(), &http);
        assert_eq!(ln.status(), DiscoveryStatus::Unparsed, "{invalid}");
        assert_eq!(ln.username(), None);
        assert_eq!(ln.lnurlp_url(), None);
    }
}

#[test_log::test(tokio::test)]
async fn test_fetch_with_proxy() {
    let http = Arc::new(MockHttpClient::new());
    http.add_route(
        DETAILS_URL,
        MockResponse::json(
            200,
            &json!({"lnurlp": lnurlp_json(), "keysend": keysend_json(), "nostr": nostr_json()}),
        ),
    );
    let mut ln = address("hello@getalby.com", Config::default(), &http);
    ln.fetch().await.unwrap();

    assert_eq!(ln.status(), DiscoveryStatus::Fetched);
    assert_eq!(
        http.requested_urls(),
        vec![format!("{PROXY}/lightning-address-details?ln=hello%40getalby.com")]
    );

    let lnurlp = ln.lnurlp_data().unwrap();
    assert_eq!(lnurlp.callback(), CALLBACK_URL);
    assert_eq!(lnurlp.min(), 1000);
    assert_eq!(lnurlp.max(), 11_000_000_000);
    assert_eq!(lnurlp.comment_allowed(), 255);
    assert!(lnurlp.allows_nostr());
    assert_eq!(lnurlp.description(), Some("Sats for Alby"));
    assert_eq!(lnurlp.identifier(), Some("hello@getalby.com"));
    assert_eq!(lnurlp.nostr_pubkey(), Some(PROVIDER_NOSTR_PUBKEY));
    assert!(lnurlp.payer_data().unwrap().name.is_some());

    let keysend = ln.keysend_data().unwrap();
    assert_eq!(keysend.destination, NODE_PUBKEY);
    assert_eq!(keysend.custom_key.as_deref(), Some("696969"));
    assert_eq!(
        keysend.custom_value.as_deref(),
        Some("017rsl75kNnSke4mMHYE")
    );

    assert_eq!(ln.nostr_pubkey(), Some(NOSTR_PUBKEY));
    assert_eq!(
        ln.nostr_relays(),
        Some(["wss://relay.getalby.com/v1".to_string()].as_slice())
    );
    assert!(ln.nostr_data().is_some());
}

#[tokio::test]
async fn test_proxy_null_members_are_absent() {
    let http = Arc::new(MockHttpClient::new());
    http.add_route(
        DETAILS_URL,
        MockResponse::json(
            200,
            &json!({"lnurlp": lnurlp_json(), "keysend": null, "nostr": null}),
        ),
    );
    let mut ln = address("hello@getalby.com", Config::default(), &http);
    ln.fetch().await.unwrap();
    assert!(ln.lnurlp_data().is_some());
    assert!(ln.keysend_data().is_none());
    assert!(ln.nostr_data().is_none());
    assert_eq!(ln.nostr_pubkey(), None);
}

#[tokio::test]
async fn test_proxy_malformed_members_keep_lnurlp() {
    let http = Arc::new(MockHttpClient::new());
    http.add_route(
        DETAILS_URL,
        MockResponse::json(
            200,
            &json!({
                "lnurlp": lnurlp_json(),
                "keysend": {
                    "status": "OK",
                    "tag": "keysend",
                    "pubkey": NODE_PUBKEY,
                    "customData": [{"customKey": 696969, "customValue": "017rsl75kNnSke4mMHYE"}]
                },
                "nostr": {"names": {"hello": NOSTR_PUBKEY}, "relays": null}
            }),
        ),
    );
    let mut ln = address("hello@getalby.com", Config::default(), &http);
    ln.fetch().await.unwrap();

    assert_eq!(ln.status(), DiscoveryStatus::Fetched);
    assert_eq!(ln.lnurlp_data().unwrap().callback(), CALLBACK_URL);

    let keysend = ln.keysend_data().unwrap();
    assert_eq!(keysend.destination, NODE_PUBKEY);
    assert_eq!(keysend.custom_key.as_deref(), Some("696969"));

    assert_eq!(ln.nostr_pubkey(), Some(NOSTR_PUBKEY));
    assert_eq!(ln.nostr_relays(), None);
}

#[tokio::test]
async fn test_proxy_unreadable_member_is_dropped() {
    let http = Arc::new(MockHttpClient::new());
    http.add_route(
        DETAILS_URL,
        MockResponse::json(
            200,
            &json!({"lnurlp": lnurlp_json(), "keysend": [1, 2], "nostr": "none"}),
        ),
    );
    let mut ln = address("hello@getalby.com", Config::default(), &http);
    ln.fetch().await.unwrap();

    assert_eq!(ln.lnurlp_data().unwrap().min(), 1000);
    assert!(ln.keysend_data().is_none());
    assert!(ln.nostr_data().is_none());
}

#[tokio::test]
async fn test_direct_null_relays_keep_pubkey() {
    let http = Arc::new(MockHttpClient::new());
    http.add_route(LNURLP_URL, MockResponse::json(200, &lnurlp_json()))
        .add_route(KEYSEND_URL, MockResponse::json(200, &keysend_json()))
        .add_route(
            NOSTR_URL,
            MockResponse::json(
                200,
                &json!({"names": {"hello": NOSTR_PUBKEY}, "relays": null}),
            ),
        );
    let mut ln = address("hello@getalby.com", direct_config(), &http);
    ln.fetch().await.unwrap();

    assert!(ln.lnurlp_data().is_some());
    assert!(ln.keysend_data().is_some());
    assert_eq!(ln.nostr_pubkey(), Some(NOSTR_PUBKEY));
    assert_eq!(ln.nostr_relays(), None);
}

#[tokio::test]
async fn test_proxy_failure_is_surfaced() {
    let http = Arc::new(MockHttpClient::new());
    http.add_route(DETAILS_URL, MockResponse::new(500, "down".to_string()));
    let mut ln = address("hello@getalby.com", Config::default(), &http);
    let err = ln.fetch().await.unwrap_err();
    assert!(matches!(
        err,
        LightningAddressError::Http(HttpError::Status { status: 500, .. })
    ));
    assert_eq!(ln.status(), DiscoveryStatus::Parsed);
}

#[test_log::test(tokio::test)]
async fn test_end_to_end_request_invoice_via_proxy() {
    let http = Arc::new(MockHttpClient::new());
    http.add_route(
        DETAILS_URL,
        MockResponse::json(
            200,
            &json!({"lnurlp": lnurlp_json(), "keysend": null, "nostr": null}),
        ),
    )
    .add_route(
        GENERATE_URL,
        MockResponse::json(200, &json!({"invoice": {"pr": PROXY_PR}})),
    );

    let mut ln = address("hello@example.com", Config::default(), &http);
    ln.fetch().await.unwrap();
    let invoice = ln
        .request_invoice(&RequestInvoiceArgs {
            satoshi: 1,
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(invoice.payment_request().starts_with("ln"));
    assert_eq!(invoice.payment_request(), PROXY_PR);
    assert_eq!(
        http.requested_urls()[1],
        format!("{PROXY}/generate-invoice?ln=hello%40example.com&amount=1000")
    );
}

#[test_log::test(tokio::test)]
async fn test_direct_fetch_tolerates_partial_failure() {
    let http = Arc::new(MockHttpClient::new());
    http.add_route(LNURLP_URL, MockResponse::json(200, &lnurlp_json()))
        .add_route(KEYSEND_URL, MockResponse::new(404, "not found".to_string()))
        .add_route(NOSTR_URL, MockResponse::network_error());

    let mut ln = address("hello@getalby.com", direct_config(), &http);
    ln.fetch().await.unwrap();

    assert_eq!(ln.status(), DiscoveryStatus::Fetched);
    assert!(ln.lnurlp_data().is_some());
    assert!(ln.keysend_data().is_none());
    assert!(ln.nostr_data().is_none());
    assert_eq!(ln.nostr_pubkey(), None);

    let mut urls = http.requested_urls();
    urls.sort();
    assert_eq!(urls, vec![KEYSEND_URL, LNURLP_URL, NOSTR_URL]);
}

#[tokio::test]
async fn test_direct_fetch_skips_malformed_json() {
    let http = Arc::new(MockHttpClient::new());
    http.add_route(LNURLP_URL, MockResponse::new(200, "<html>".to_string()))
        .add_route(KEYSEND_URL, MockResponse::json(200, &keysend_json()))
        .add_route(NOSTR_URL, MockResponse::json(200, &nostr_json()));

    let mut ln = address("hello@getalby.com", direct_config(), &http);
    ln.fetch().await.unwrap();
    assert!(ln.lnurlp_data().is_none());
    assert!(ln.keysend_data().is_some());
    assert_eq!(ln.nostr_pubkey(), Some(NOSTR_PUBKEY));
}

#[tokio::test]
async fn test_direct_fetch_reports_invalid_document_but_keeps_others() {
    let http = Arc::new(MockHttpClient::new());
    let mut lnurlp = lnurlp_json();
    lnurlp["minSendable"] = json!(5000);
    lnurlp["maxSendable"] = json!(1000);
    http.add_route(LNURLP_URL, MockResponse::json(200, &lnurlp))
        .add_route(KEYSEND_URL, MockResponse::json(200, &keysend_json()))
        .add_route(NOSTR_URL, MockResponse::json(200, &nostr_json()));

    let mut ln = address("hello@getalby.com", direct_config(), &http);
    let err = ln.fetch().await.unwrap_err();
    assert!(matches!(
        err,
        LightningAddressError::Lnurl(LnurlError::InvalidBounds {
            min: 5000,
            max: 1000
        })
    ));
    assert!(ln.lnurlp_data().is_none());
    assert!(ln.keysend_data().is_some());
    assert_eq!(ln.nostr_pubkey(), Some(NOSTR_PUBKEY));
}

#[tokio::test]
async fn test_direct_fetch_podcasting2_keysend() {
    let http = Arc::new(MockHttpClient::new());
    let mut keysend = keysend_json();
    keysend["customData"] = json!([]);
    http.add_route(LNURLP_URL, MockResponse::json(200, &lnurlp_json()))
        .add_route(KEYSEND_URL, MockResponse::json(200, &keysend))
        .add_route(NOSTR_URL, MockResponse::new(404, String::new()));

    let config = Config {
        keysend_validation: KeysendValidation::Podcasting2,
        ..direct_config()
    };
    let mut ln = address("hello@getalby.com", config, &http);
    assert!(matches!(
        ln.fetch().await.unwrap_err(),
        LightningAddressError::Lnurl(LnurlError::MissingCustomRecord { .. })
    ));
    assert!(ln.keysend_data().is_none());
    assert!(ln.lnurlp_data().is_some());
}

#[tokio::test]
async fn test_direct_fetch_requires_parsed_address() {
    let http = Arc::new(MockHttpClient::new());
    let mut ln = address("not-an-address", direct_config(), &http);
    assert!(matches!(
        ln.fetch().await.unwrap_err(),
        LightningAddressError::InvalidAddress { .. }
    ));
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn test_operations_before_fetch() {
    let http = Arc::new(MockHttpClient::new());
    let ln = address("hello@getalby.com", direct_config(), &http)
        .with_wallet(Arc::new(MockWallet::new("00")));

    assert!(matches!(
        ln.request_invoice(&RequestInvoiceArgs {
            satoshi: 1,
            ..Default::default()
        })
        .await
        .unwrap_err(),
        LightningAddressError::NotFetched {
            resource: DiscoveryResource::Lnurlp
        }
    ));
    assert!(matches!(
        ln.boost(boost(), None).await.unwrap_err(),
        LightningAddressError::NotFetched {
            resource: DiscoveryResource::Keysend
        }
    ));
    assert!(matches!(
        ln.zap(&ZapArgs::default(), &ZapOptions::default())
            .await
            .unwrap_err(),
        LightningAddressError::NotFetched {
            resource: DiscoveryResource::Lnurlp
        }
    ));
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn test_request_invoice_validation() {
    let http = Arc::new(MockHttpClient::new());
    let mut lnurlp = lnurlp_json();
    lnurlp["commentAllowed"] = json!(5);
    http.add_route(LNURLP_URL, MockResponse::json(200, &lnurlp))
        .add_route(KEYSEND_URL, MockResponse::json(200, &keysend_json()))
        .add_route(NOSTR_URL, MockResponse::json(200, &nostr_json()));

    let mut ln = address("hello@getalby.com", direct_config(), &http);
    ln.fetch().await.unwrap();

    let err = ln
        .request_invoice(&RequestInvoiceArgs {
            satoshi: 0,
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LightningAddressError::InvalidAmount {
            amount_msat: 0,
            min: 1000,
            max: 11_000_000_000
        }
    ));

    let err = ln
        .request_invoice(&RequestInvoiceArgs {
            satoshi: 11_000_001,
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LightningAddressError::InvalidAmount { .. }));

    let err = ln
        .request_invoice(&RequestInvoiceArgs {
            satoshi: 1,
            comment: Some("twelve chars".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LightningAddressError::CommentTooLong { length: 12, max: 5 }
    ));

    // Only the discovery requests went out.
    assert_eq!(http.requests().len(), 3);
}

#[test_log::test(tokio::test)]
async fn test_request_invoice_direct() {
    let http = Arc::new(MockHttpClient::new());
    mock_direct_discovery(&http);
    http.add_route(
        CALLBACK_URL,
        MockResponse::json(
            200,
            &json!({
                "status": "OK",
                "pr": DIRECT_PR,
                "verify": "https://getalby.com/lnurlp/hello/verify/abc",
                "successAction": {"tag": "message", "message": "Thanks, sats received!"},
                "routes": []
            }),
        ),
    );

    let mut ln = address("hello@getalby.com", direct_config(), &http);
    ln.fetch().await.unwrap();
    let invoice = ln
        .request_invoice(&RequestInvoiceArgs {
            satoshi: 1,
            comment: Some("Thanks ⚡".into()),
            payer_data: Some(PayerData {
                name: Some("Satoshi".into()),
                ..Default::default()
            }),
        })
        .await
        .unwrap();

    assert_eq!(invoice.payment_request(), DIRECT_PR);
    assert_eq!(invoice.satoshi(), 1);
    assert_eq!(
        invoice.verify(),
        Some("https://getalby.com/lnurlp/hello/verify/abc")
    );
    assert_eq!(
        invoice.success_action(),
        Some(&SuccessAction::Message {
            message: "Thanks, sats received!".into()
        })
    );

    let callback = http.requested_urls().pop().unwrap();
    assert!(callback.starts_with(CALLBACK_URL));
    assert_eq!(query_param(&callback, "amount").as_deref(), Some("1000"));
    assert_eq!(
        query_param(&callback, "comment").as_deref(),
        Some("Thanks ⚡")
    );
    assert_eq!(
        query_param(&callback, "payerdata").as_deref(),
        Some(r#"{"name":"Satoshi"}"#)
    );
    assert_eq!(query_param(&callback, "nostr"), None);
}

#[tokio::test]
async fn test_request_invoice_without_pr() {
    let http = Arc::new(MockHttpClient::new());
    mock_direct_discovery(&http);
    http.add_route(
        CALLBACK_URL,
        MockResponse::json(200, &json!({"status": "OK", "routes": []})),
    )
    .add_route(
        CALLBACK_URL,
        MockResponse::json(200, &json!({"status": "ERROR", "reason": "amount too low"})),
    );

    let mut ln = address("hello@getalby.com", direct_config(), &http);
    ln.fetch().await.unwrap();
    let args = RequestInvoiceArgs {
        satoshi: 1,
        ..Default::default()
    };
    assert!(matches!(
        ln.request_invoice(&args).await.unwrap_err(),
        LightningAddressError::InvalidInvoiceResponse
    ));
    match ln.request_invoice(&args).await.unwrap_err() {
        LightningAddressError::Lnurl(LnurlError::EndpointError(reason)) => {
            assert_eq!(reason, "amount too low");
        }
        err => panic!("unexpected error: {err:?}"),
    }
}

#[test_log::test(tokio::test)]
async fn test_zap_invoice_direct() {
    let http = Arc::new(MockHttpClient::new());
    mock_direct_discovery(&http);
    http.add_route(
        CALLBACK_URL,
        MockResponse::json(200, &json!({"pr": DIRECT_PR})),
    );
    let signer = Arc::new(KeysSigner::generate());

    let mut ln = address("hello@getalby.com", direct_config(), &http);
    ln.fetch().await.unwrap();
    let invoice = ln
        .zap_invoice(
            &ZapArgs {
                satoshi: 1,
                comment: Some("Awesome post".into()),
                relays: vec!["wss://relay.damus.io".into()],
                e: Some(NOTE_ID.into()),
            },
            &ZapOptions {
                signer: Some(signer.clone()),
            },
        )
        .await
        .unwrap();
    assert_eq!(invoice.payment_request(), DIRECT_PR);

    let callback = http.requested_urls().pop().unwrap();
    assert_eq!(query_param(&callback, "amount").as_deref(), Some("1000"));
    assert_eq!(query_param(&callback, "comment"), None);

    let event = nostr::Event::from_json(query_param(&callback, "nostr").unwrap()).unwrap();
    assert!(event.verify().is_ok());
    assert_eq!(event.kind.as_u16(), 9734);
    assert_eq!(event.content, "Awesome post");
    assert_eq!(
        event.pubkey.to_hex(),
        signer.get_public_key().await.unwrap()
    );
    let tags: Vec<Vec<String>> = event.tags.iter().map(|t| t.clone().to_vec()).collect();
    assert_eq!(tags[0], vec!["relays", "wss://relay.damus.io"]);
    assert_eq!(tags[1], vec!["amount", "1000"]);
    assert_eq!(tags[2], vec!["p", NOSTR_PUBKEY]);
    assert_eq!(tags[3][0], "e");
}

#[tokio::test]
async fn test_zap_invoice_preconditions() {
    let http = Arc::new(MockHttpClient::new());
    http.add_route(LNURLP_URL, MockResponse::json(200, &lnurlp_json()))
        .add_route(KEYSEND_URL, MockResponse::json(200, &keysend_json()))
        .add_route(NOSTR_URL, MockResponse::json(200, &json!({"names": {}})));
    let mut ln = address("hello@getalby.com", direct_config(), &http);
    ln.fetch().await.unwrap();
    let args = ZapArgs {
        satoshi: 1,
        ..Default::default()
    };
    let options = ZapOptions::default();
    assert!(matches!(
        ln.zap_invoice(&args, &options).await.unwrap_err(),
        LightningAddressError::MissingNostrPubkey
    ));

    let mut lnurlp = lnurlp_json();
    lnurlp["allowsNostr"] = json!(false);
    http.add_route(LNURLP_URL, MockResponse::json(200, &lnurlp))
        .add_route(KEYSEND_URL, MockResponse::json(200, &keysend_json()))
        .add_route(NOSTR_URL, MockResponse::json(200, &nostr_json()));
    ln.fetch().await.unwrap();
    assert!(matches!(
        ln.zap_invoice(&args, &options).await.unwrap_err(),
        LightningAddressError::ZapsUnsupported
    ));

    mock_direct_discovery(&http);
    ln.fetch().await.unwrap();
    assert!(matches!(
        ln.zap_invoice(&args, &options).await.unwrap_err(),
        LightningAddressError::Nostr(NostrError::NostrUnavailable)
    ));
}

#[tokio::test]
async fn test_zap_pays_with_wallet() {
    let http = Arc::new(MockHttpClient::new());
    mock_direct_discovery(&http);
    http.add_route(
        CALLBACK_URL,
        MockResponse::json(200, &json!({"pr": DIRECT_PR})),
    );
    let wallet = Arc::new(MockWallet::new("ab"));
    let mut ln = address("hello@getalby.com", direct_config(), &http)
        .with_signer(Arc::new(KeysSigner::generate()))
        .with_wallet(wallet.clone());
    ln.fetch().await.unwrap();

    let response = ln
        .zap(
            &ZapArgs {
                satoshi: 1,
                relays: vec!["wss://relay.damus.io".into()],
                ..Default::default()
            },
            &ZapOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(response.preimage, "ab");
    assert_eq!(*wallet.enabled.lock().unwrap(), 1);
    assert_eq!(
        *wallet.payments.lock().unwrap(),
        vec![DIRECT_PR.to_string()]
    );
}

#[tokio::test]
async fn test_zap_without_wallet() {
    let http = Arc::new(MockHttpClient::new());
    mock_direct_discovery(&http);
    let mut ln = address("hello@getalby.com", direct_config(), &http)
        .with_signer(Arc::new(KeysSigner::generate()));
    ln.fetch().await.unwrap();

    let args = ZapArgs {
        satoshi: 1,
        ..Default::default()
    };
    assert!(matches!(
        ln.zap(&args, &ZapOptions::default()).await.unwrap_err(),
        LightningAddressError::NoWallet
    ));
    // No invoice was requested.
    assert_eq!(http.requests().len(), 3);
}

#[tokio::test]
async fn test_boost() {
    let http = Arc::new(MockHttpClient::new());
    mock_direct_discovery(&http);
    let wallet = Arc::new(MockWallet::new("cd"));
    let mut ln = address("hello@getalby.com", direct_config(), &http).with_wallet(wallet.clone());
    ln.fetch().await.unwrap();

    let response = ln.boost(boost(), None).await.unwrap();
    assert_eq!(response.preimage, "cd");

    let keysends = wallet.keysends.lock().unwrap();
    assert_eq!(keysends[0].destination, NODE_PUBKEY);
    assert_eq!(keysends[0].amount, 21);
    assert_eq!(keysends[0].custom_records["696969"], "017rsl75kNnSke4mMHYE");
    assert!(keysends[0].custom_records.contains_key("7629169"));
}

#[tokio::test]
async fn test_boost_wallet_errors() {
    let http = Arc::new(MockHttpClient::new());
    mock_direct_discovery(&http);
    mock_direct_discovery(&http);

    let mut ln = address("hello@getalby.com", direct_config(), &http);
    ln.fetch().await.unwrap();
    assert!(matches!(
        ln.boost(boost(), Some(10)).await.unwrap_err(),
        LightningAddressError::NoWallet
    ));

    let mut ln = address("hello@getalby.com", direct_config(), &http)
        .with_wallet(Arc::new(MockWallet::new("00").without_keysend()));
    ln.fetch().await.unwrap();
    assert!(matches!(
        ln.boost(boost(), Some(10)).await.unwrap_err(),
        LightningAddressError::KeysendUnsupported
    ));
}

#[tokio::test]
async fn test_is_invoice_paid_uses_verify() {
    let http = Arc::new(MockHttpClient::new());
    mock_direct_discovery(&http);
    let verify = "https://getalby.com/lnurlp/hello/verify/abc";
    http.add_route(
        CALLBACK_URL,
        MockResponse::json(200, &json!({"pr": DIRECT_PR, "verify": verify})),
    )
    .add_route(verify, MockResponse::new(503, String::new()))
    .add_route(
        verify,
        MockResponse::json(
            200,
            &json!({"status": "OK", "settled": true, "preimage": null}),
        ),
    );

    let mut ln = address("hello@getalby.com", direct_config(), &http);
    ln.fetch().await.unwrap();
    let mut invoice = ln
        .request_invoice(&RequestInvoiceArgs {
            satoshi: 1,
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(ln.is_invoice_paid(&mut invoice).await.unwrap());
}

#[tokio::test]
async fn test_refetch_replaces_data() {
    let http = Arc::new(MockHttpClient::new());
    mock_direct_discovery(&http);
    http.add_route(LNURLP_URL, MockResponse::json(200, &lnurlp_json()))
        .add_route(KEYSEND_URL, MockResponse::new(404, String::new()))
        .add_route(NOSTR_URL, MockResponse::new(404, String::new()));

    let mut ln = address("hello@getalby.com", direct_config(), &http);
    ln.fetch().await.unwrap();
    assert!(ln.keysend_data().is_some());
    ln.fetch().await.unwrap();
    assert!(ln.lnurlp_data().is_some());
    assert!(ln.keysend_data().is_none());
    assert_eq!(ln.nostr_pubkey(), None);
}
