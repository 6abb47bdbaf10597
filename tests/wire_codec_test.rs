//! End-to-end tests: schema store built from a mock registry feeding the wire codec

use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use avrowire::registry::{
    CachedRegistryClient, ClientError, RegistryClient, SchemaRef, SchemaStore, SchemaVersion,
};
use avrowire::wire::{schema_id, WireCodec, WireError};

const ORDER_SCHEMA: &str =
    r#"{"type":"record","name":"Order","fields":[{"name":"amount","type":"int"}]}"#;
const LEDGER_SCHEMA: &str = r#"{
    "type": "record",
    "name": "Ledger",
    "fields": [
        {"name": "count", "type": "int"},
        {"name": "total", "type": "long"},
        {"name": "ratio", "type": "float"},
        {"name": "rate", "type": "double"},
        {"name": "open", "type": "boolean"},
        {"name": "digest", "type": "bytes"},
        {"name": "state", "type": {"type": "enum", "name": "State", "symbols": ["OPEN", "CLOSED"]}},
        {"name": "lines", "type": {"type": "array", "items": "int"}},
        {"name": "totals", "type": {"type": "map", "values": "long"}},
        {"name": "memo", "type": ["null", "string"], "default": null}
    ]
}"#;
const REFUND_SCHEMA: &str = r#"{"type":"record","name":"Refund","fields":[{"name":"order","type":"string"},{"name":"reason","type":["null","string"],"default":null}]}"#;

async fn mount_version(server: &MockServer, subject: &str, version: &str, id: u32, schema: &str) {
    let number: u32 = version.parse().unwrap_or(1);
    Mock::given(method("GET"))
        .and(path(format!("/subjects/{}/versions/{}", subject, version)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "subject": subject,
            "version": number,
            "id": id,
            "schema": schema
        })))
        .mount(server)
        .await;
}

async fn build_store(server: &MockServer, refs: &[SchemaRef]) -> Result<SchemaStore, ClientError> {
    let registry = CachedRegistryClient::new(RegistryClient::with_urls(&[server.uri()], 0)?);
    SchemaStore::build(&registry, refs).await
}

#[tokio::test]
async fn test_orders_envelope_bytes() {
    let server = MockServer::start().await;
    mount_version(&server, "orders", "latest", 7, ORDER_SCHEMA).await;

    let store = build_store(&server, &[SchemaRef::new("orders", SchemaVersion::Latest)])
        .await
        .unwrap();
    let wire = WireCodec::new(Arc::new(store));

    let envelope = wire.encode("orders", &json!({ "amount": 10 })).unwrap();
    assert_eq!(envelope, vec![0x00, 0x00, 0x00, 0x00, 0x07, 0x14]);
    assert_eq!(schema_id(&envelope).unwrap(), 7);

    let decoded = wire.decode(&envelope).unwrap();
    assert_eq!(decoded, json!({ "amount": 10 }));
    assert_eq!(wire.decode_to_string(&envelope).unwrap(), r#"{"amount":10}"#);
}

#[derive(Serialize)]
struct Refund {
    order: String,
    reason: Option<String>,
}

#[tokio::test]
async fn test_multiple_subjects_round_trip() {
    let server = MockServer::start().await;
    mount_version(&server, "orders", "latest", 7, ORDER_SCHEMA).await;
    mount_version(&server, "refunds", "2", 11, REFUND_SCHEMA).await;

    let refs = [
        SchemaRef::new("orders", SchemaVersion::Latest),
        SchemaRef::new("refunds", SchemaVersion::Number(2)),
    ];
    let store = build_store(&server, &refs).await.unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.subjects(), vec!["orders", "refunds"]);

    let wire = WireCodec::new(Arc::new(store));
    let refund = Refund {
        order: "o-1".to_string(),
        reason: None,
    };
    let envelope = wire.encode_value("refunds", &refund).unwrap();
    assert_eq!(&envelope[..5], &[0, 0, 0, 0, 11]);

    let decoded = wire.decode(&envelope).unwrap();
    assert_eq!(decoded, json!({ "order": "o-1", "reason": null }));

    let order = wire.encode("orders", &json!({ "amount": -3 })).unwrap();
    assert_eq!(wire.decode(&order).unwrap(), json!({ "amount": -3 }));
}

#[tokio::test]
async fn test_round_trip_covers_avro_types() {
    let server = MockServer::start().await;
    mount_version(&server, "ledger", "latest", 21, LEDGER_SCHEMA).await;

    let store = build_store(&server, &[SchemaRef::new("ledger", SchemaVersion::Latest)])
        .await
        .unwrap();
    let wire = WireCodec::new(Arc::new(store));

    let cases = vec![
        json!({
            "count": 0, "total": 0, "ratio": 0.0, "rate": 0.0, "open": false,
            "digest": [], "state": "OPEN", "lines": [], "totals": {}, "memo": null
        }),
        json!({
            "count": i32::MIN, "total": i64::MIN, "ratio": -1.5, "rate": -2.25, "open": true,
            "digest": [0, 1, 255], "state": "CLOSED", "lines": [-1, 1],
            "totals": { "eur": -4_294_967_306i64 }, "memo": "first"
        }),
        json!({
            "count": i32::MAX, "total": i64::MAX, "ratio": 1.5, "rate": 2.25, "open": true,
            "digest": [7], "state": "OPEN", "lines": [i32::MAX, i32::MIN, 0],
            "totals": { "eur": 1, "usd": i64::MAX }, "memo": ""
        }),
    ];

    for value in cases {
        let envelope = wire.encode("ledger", &value).unwrap();
        assert_eq!(schema_id(&envelope).unwrap(), 21);
        assert_eq!(wire.decode(&envelope).unwrap(), value);
    }
}

#[tokio::test]
async fn test_out_of_range_int_is_codec_error() {
    let server = MockServer::start().await;
    mount_version(&server, "orders", "latest", 7, ORDER_SCHEMA).await;

    let store = build_store(&server, &[SchemaRef::new("orders", SchemaVersion::Latest)])
        .await
        .unwrap();
    let wire = WireCodec::new(Arc::new(store));

    for amount in [2_147_483_648i64, 4_294_967_306] {
        let result = wire.encode("orders", &json!({ "amount": amount }));
        assert!(matches!(result, Err(WireError::Codec(_))), "{}", amount);
    }
}

#[tokio::test]
async fn test_store_is_all_or_nothing() {
    let server = MockServer::start().await;
    mount_version(&server, "orders", "latest", 7, ORDER_SCHEMA).await;
    Mock::given(method("GET"))
        .and(path("/subjects/missing/versions/latest"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error_code": 40401,
            "message": "Subject not found."
        })))
        .mount(&server)
        .await;

    let refs = [
        SchemaRef::new("orders", SchemaVersion::Latest),
        SchemaRef::new("missing", SchemaVersion::Latest),
    ];
    match build_store(&server, &refs).await {
        Err(ClientError::Registry(e)) => assert_eq!(e.code, 40401),
        other => panic!("expected registry error, got {:?}", other.map(|s| s.len())),
    }
}

#[tokio::test]
async fn test_undeclared_subject_and_id_are_not_fetched() {
    let server = MockServer::start().await;
    mount_version(&server, "orders", "latest", 7, ORDER_SCHEMA).await;

    let store = build_store(&server, &[SchemaRef::new("orders", SchemaVersion::Latest)])
        .await
        .unwrap();
    let requests_after_build = server.received_requests().await.unwrap().len();
    let wire = WireCodec::new(Arc::new(store));

    let err = wire.encode("refunds", &json!({})).unwrap_err();
    assert_eq!(err.to_string(), "Schema lookup error: Not found: schema refunds was not added");

    let err = wire.decode(&[0, 0, 0, 0, 9, 0x14]).unwrap_err();
    assert!(matches!(err, WireError::Schema(ref e) if e.is_not_found()));
    assert!(err.to_string().contains("schema id 9 was not added"));

    assert_eq!(server.received_requests().await.unwrap().len(), requests_after_build);
}

#[tokio::test]
async fn test_short_and_invalid_messages() {
    let server = MockServer::start().await;
    mount_version(&server, "orders", "latest", 7, ORDER_SCHEMA).await;

    let store = build_store(&server, &[SchemaRef::new("orders", SchemaVersion::Latest)])
        .await
        .unwrap();
    let wire = WireCodec::new(Arc::new(store));

    assert!(matches!(
        wire.decode(&[0, 0, 0]),
        Err(WireError::MessageTooShort(3))
    ));
    assert!(matches!(
        wire.encode("orders", &json!({ "amount": "ten" })),
        Err(WireError::Codec(_))
    ));
}
