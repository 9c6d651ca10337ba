//! Request signing for the comics API.
//!
//! Every call carries `ts`, `apikey` and `hash`, where `hash` is the MD5 hex
//! digest of `ts + private_key + public_key`. For a public key of `1234`, a
//! private key of `abcd` and `ts=1`, the hash is the digest of `1abcd1234`.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use md5::{Digest, Md5};

use crate::config::ClientConfiguration;

pub const TIMESTAMP: &str = "ts";
pub const API_KEY_PUBLIC: &str = "apikey";
pub const HASH: &str = "hash";

/// Lowercase hex MD5 digest of `input`, always 32 characters.
pub fn md5_hex(input: &str) -> String {
    hex::encode(Md5::digest(input.as_bytes()))
}

pub fn request_hash(timestamp: &str, private_key: &str, public_key: &str) -> String {
    md5_hex(&format!("{timestamp}{private_key}{public_key}"))
}

/// Milliseconds since the Unix epoch as a decimal string.
pub fn current_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
        .to_string()
}

/// The `ts`, `apikey` and `hash` query parameters for one request.
pub fn query_parameters(configuration: &ClientConfiguration, timestamp: &str) -> BTreeMap<String, String> {
    let public_key = configuration.api_key_public();
    let private_key = configuration.api_key_private();

    BTreeMap::from([
        (TIMESTAMP.to_string(), timestamp.to_string()),
        (API_KEY_PUBLIC.to_string(), public_key.to_string()),
        (HASH.to_string(), request_hash(timestamp, private_key, public_key)),
    ])
}
