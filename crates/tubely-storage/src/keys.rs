//! Object key generation shared by every backend.
//!
//! Key format: `{prefix}/{random_id}.{extension}`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;

/// Bytes of entropy behind each random object id (256 bits).
pub const OBJECT_ID_BYTES: usize = 32;

/// A fresh random identifier, URL-safe base64 without padding.
///
/// Every call fills a new buffer from the thread-local CSPRNG.
pub fn random_object_id() -> String {
    let mut buf = [0u8; OBJECT_ID_BYTES];
    rand::rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

/// Build an object key. An empty prefix yields a bare file name.
pub fn object_key(prefix: &str, id: &str, extension: &str) -> String {
    if prefix.is_empty() {
        format!("{}.{}", id, extension)
    } else {
        format!("{}/{}.{}", prefix, id, extension)
    }
}
