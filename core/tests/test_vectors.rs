//! Verify request signing and body decoding against JSON test vectors stored
//! in `test-vectors/`.
//!
//! Vectors are plain data so the same cases can be checked against any
//! implementation of the API contract.

use comics_core::{
    auth, ApiError, ClientConfiguration, EmptyState, Fault, GetComicsResponse, HttpStatusCode, Response,
    ResponseItem,
};

// ---------------------------------------------------------------------------
// Signing
// ---------------------------------------------------------------------------

#[test]
fn auth_test_vectors() {
    let raw = include_str!("../../test-vectors/auth.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let ts = case["ts"].as_str().unwrap();
        let private_key = case["private_key"].as_str().unwrap();
        let public_key = case["public_key"].as_str().unwrap();
        let expected = case["hash"].as_str().unwrap();

        assert_eq!(auth::request_hash(ts, private_key, public_key), expected, "{name}");

        let configuration = ClientConfiguration::builder()
            .api_key_public(public_key)
            .api_key_private(private_key)
            .create()
            .unwrap();
        let params = auth::query_parameters(&configuration, ts);
        assert_eq!(params.len(), 3, "{name}");
        assert_eq!(params[auth::TIMESTAMP], ts, "{name}");
        assert_eq!(params[auth::API_KEY_PUBLIC], public_key, "{name}");
        assert_eq!(params[auth::HASH], expected, "{name}");
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

#[test]
fn decode_test_vectors() {
    let raw = include_str!("../../test-vectors/decode.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected = &case["expected"];
        let item = ResponseItem::StringResponse {
            status: HttpStatusCode::OK,
            body: case["body"].as_str().unwrap().to_string(),
        };

        let response = Response::<GetComicsResponse>::decode(item, Some("GetComics".to_string()));
        assert_eq!(response.identifier(), Some("GetComics"), "{name}");

        if !expected["ok"].as_bool().unwrap() {
            let err = response.into_result().unwrap_err();
            assert!(matches!(err, ApiError::Fault(Fault::Decode(_))), "{name}: {err:?}");
            continue;
        }

        let decoded = response.into_result().unwrap();
        assert_eq!(decoded.code, expected["code"].as_i64(), "{name}");
        let ids: Vec<i64> = decoded.comics().iter().filter_map(|comic| comic.id).collect();
        let expected_ids: Vec<i64> = serde_json::from_value(expected["ids"].clone()).unwrap();
        assert_eq!(ids, expected_ids, "{name}");
        assert_eq!(decoded.is_empty(), expected["empty"].as_bool().unwrap(), "{name}");
    }
}
