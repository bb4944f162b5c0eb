//! PayFast request signatures.
//!
//! The signature is the lowercase hex MD5 digest of the url-encoded field set, in the order the fields are sent,
//! followed by `&passphrase=<passphrase>` when a passphrase is configured on the merchant account. The gateway
//! recomputes it byte-for-byte, so the digest and encoding must not change.
use md5::{Digest, Md5};

use crate::FieldSet;

/// The name of the field that carries the signature on both requests and notifications.
pub const SIGNATURE_FIELD: &str = "signature";

/// The string that gets hashed: the encoded fields plus the optional passphrase.
pub fn signature_payload(fields: &FieldSet, passphrase: &str) -> String {
    let mut payload = fields.to_urlencoded();
    if !passphrase.is_empty() {
        let encoded = FieldSet::new().with("passphrase", passphrase).to_urlencoded();
        payload.push('&');
        payload.push_str(&encoded);
    }
    payload
}

pub fn sign(fields: &FieldSet, passphrase: &str) -> String {
    let digest = Md5::digest(signature_payload(fields, passphrase).as_bytes());
    hex::encode(digest)
}

/// Recomputes the signature over `fields` and compares it with `signature`. Hex case is ignored.
pub fn verify(fields: &FieldSet, signature: &str, passphrase: &str) -> bool {
    sign(fields, passphrase).eq_ignore_ascii_case(signature.trim())
}
