//! Approval tokens: `prefix || hex(HMAC_SHA256(key, requestId ":" contentHash
//! ":" timestamp ":" verdict))`. Carries no additional claims; the caller
//! verifies against freshness (TTL) and the exact inputs it expects.
//!
//! Verification uses a timing-safe comparison so a forged token's mismatch
//! position can't be inferred from response latency.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

const TOKEN_PREFIX: &str = "wdt_";

type HmacSha256 = Hmac<Sha256>;

fn signing_input(request_id: Uuid, content_hash: &str, timestamp: i64, verdict: &str) -> String {
    format!("{request_id}:{content_hash}:{timestamp}:{verdict}")
}

/// Generates an approval token for `verdict` ("CLEAN") over the given
/// request id, content hash, and timestamp (unix seconds).
pub fn generate(key: &[u8], request_id: Uuid, content_hash: &str, timestamp: i64, verdict: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(signing_input(request_id, content_hash, timestamp, verdict).as_bytes());
    let bytes = mac.finalize().into_bytes();
    format!("{TOKEN_PREFIX}{}", encode_hex(&bytes))
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

/// Verifies `token` was produced by [`generate`] over the same inputs and
/// that `timestamp` is still within `ttl_secs` of `now`. Both checks run
/// in constant time with respect to the token's contents.
pub fn verify(
    key: &[u8],
    token: &str,
    request_id: Uuid,
    content_hash: &str,
    timestamp: i64,
    verdict: &str,
    ttl_secs: u64,
    now: chrono::DateTime<Utc>,
) -> bool {
    let Some(hex_part) = token.strip_prefix(TOKEN_PREFIX) else {
        return false;
    };
    let Some(provided_bytes) = decode_hex(hex_part) else {
        return false;
    };

    let expected = generate(key, request_id, content_hash, timestamp, verdict);
    let Some(expected_hex) = expected.strip_prefix(TOKEN_PREFIX) else {
        return false;
    };
    let Some(expected_bytes) = decode_hex(expected_hex) else {
        return false;
    };

    let bytes_match = provided_bytes.ct_eq(&expected_bytes).into();
    let age = now.timestamp() - timestamp;
    let fresh = age >= 0 && (age as u64) <= ttl_secs;

    bytes_match && fresh
}

/// Backs the paired token-cache hook contract: when the host can't use a
/// gating call's return value directly, a clean scan deposits its token
/// here keyed by `(sessionKey, toolCallId)`, and the transport checks the
/// cache before sending. Evicts the oldest entry on insert once full so
/// the cache can't grow unbounded if a host never drains it.
const TOKEN_CACHE_CAPACITY: usize = 10_000;

pub struct TokenCache {
    tokens: std::collections::HashMap<(String, String), String>,
    insert_order: Vec<(String, String)>,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCache {
    pub fn new() -> Self {
        TokenCache {
            tokens: std::collections::HashMap::new(),
            insert_order: Vec::new(),
        }
    }

    pub fn deposit(&mut self, session_key: impl Into<String>, tool_call_id: impl Into<String>, token: String) {
        let key = (session_key.into(), tool_call_id.into());
        if !self.tokens.contains_key(&key) && self.insert_order.len() >= TOKEN_CACHE_CAPACITY {
            let evicted = self.insert_order.remove(0);
            self.tokens.remove(&evicted);
        }
        if !self.tokens.contains_key(&key) {
            self.insert_order.push(key.clone());
        }
        self.tokens.insert(key, token);
    }

    /// Removes and returns the cached token, if any. One-shot by
    /// convention: the transport consumes it rather than peeking.
    pub fn take(&mut self, session_key: &str, tool_call_id: &str) -> Option<String> {
        let key = (session_key.to_string(), tool_call_id.to_string());
        let token = self.tokens.remove(&key);
        if token.is_some() {
            self.insert_order.retain(|k| k != &key);
        }
        token
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
