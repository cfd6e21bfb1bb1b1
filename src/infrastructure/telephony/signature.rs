//! Webhook signature validation
//!
//! The provider signs every webhook with HMAC-SHA1 over the full request
//! URL followed by the form parameters sorted by name, base64-encoded in
//! the `X-Twilio-Signature` header.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::collections::HashMap;

type HmacSha1 = Hmac<Sha1>;

/// Compute the expected signature for a webhook request
pub fn compute(auth_token: &str, url: &str, params: &HashMap<String, String>) -> String {
    let mut keys: Vec<&String> = params.keys().collect();
    keys.sort();

    let mut payload = String::from(url);
    for key in keys {
        payload.push_str(key);
        payload.push_str(&params[key]);
    }

    // HMAC accepts keys of any length
    let mut mac = HmacSha1::new_from_slice(auth_token.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(payload.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Validate a signature header against the request contents
pub fn validate(
    auth_token: &str,
    url: &str,
    params: &HashMap<String, String>,
    signature: &str,
) -> bool {
    compute(auth_token, url, params) == signature
}
