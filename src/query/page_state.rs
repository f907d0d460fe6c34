//! Opaque page-state tokens

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

use crate::errors::{DocsError, DocsResult};

/// Encode the last returned key as a URL-safe token
pub fn encode_page_state(last_key: &str) -> String {
    URL_SAFE_NO_PAD.encode(last_key.as_bytes())
}

/// Decode a token produced by [`encode_page_state`]
pub fn decode_page_state(token: &str) -> DocsResult<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token.trim_end_matches('='))
        .map_err(|e| DocsError::invalid_filter(format!("malformed page state: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|_| DocsError::invalid_filter("malformed page state: not UTF-8"))
}
