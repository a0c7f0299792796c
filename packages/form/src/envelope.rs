//! Signed envelopes: `hex(HMAC-SHA256(secret, payload)) | payload`

use crate::error::{FormError, FormResult};
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const DIGEST_SIZE: usize = 32;
const SEPARATOR: char = '|';

fn keyed(secret: &str, payload: &str) -> FormResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| FormError::InvalidKey)?;
    mac.update(payload.as_bytes());
    Ok(mac)
}

/// Sign a serialized payload
pub fn sign(payload: &str, secret: &str) -> FormResult<String> {
    let signature = keyed(secret, payload)?.finalize().into_bytes();
    Ok(format!("{}{}{}", hex::encode(signature), SEPARATOR, payload))
}

/// Verify an envelope and return its payload
pub fn unsign<'a>(envelope: &'a str, secret: &str) -> FormResult<&'a str> {
    let (signature, payload) = envelope
        .split_once(SEPARATOR)
        .ok_or_else(|| FormError::malformed("missing signature separator"))?;

    let signature = hex::decode(signature)
        .map_err(|e| FormError::malformed(format!("signature is not hex: {}", e)))?;
    if signature.len() != DIGEST_SIZE {
        return Err(FormError::malformed(format!(
            "signature has {} bytes, expected {}",
            signature.len(),
            DIGEST_SIZE
        )));
    }

    keyed(secret, payload)?
        .verify_slice(&signature)
        .map_err(|_| FormError::SignatureMismatch)?;
    Ok(payload)
}

/// Serialize a value with serde_json and sign it
pub fn sign_value<T: Serialize + ?Sized>(value: &T, secret: &str) -> FormResult<String> {
    let payload = serde_json::to_string(value)?;
    sign(&payload, secret)
}

/// Verify an envelope and deserialize its payload
pub fn unsign_value<T: DeserializeOwned>(envelope: &str, secret: &str) -> FormResult<T> {
    let payload = unsign(envelope, secret)?;
    Ok(serde_json::from_str(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "s3cret";

    #[test]
    fn test_hmac_known_vector() {
        // RFC 4231 test case 2
        let envelope = sign("what do ya want for nothing?", "Jefe").unwrap();
        assert_eq!(
            envelope,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843|what do ya want for nothing?"
        );
    }

    #[test]
    fn test_sign_and_unsign() {
        let envelope = sign("[\"0\",\"2\"]", SECRET).unwrap();
        assert_eq!(unsign(&envelope, SECRET).unwrap(), "[\"0\",\"2\"]");
        assert!(matches!(
            unsign(&envelope, "other"),
            Err(FormError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_payload_may_contain_separator() {
        let envelope = sign("a|b|c", SECRET).unwrap();
        assert_eq!(unsign(&envelope, SECRET).unwrap(), "a|b|c");
    }

    #[test]
    fn test_flipping_any_byte_fails() {
        let envelope = sign_value(&vec!["0", "2"], SECRET).unwrap();
        let bytes = envelope.as_bytes();

        for i in 0..bytes.len() {
            let mut tampered = bytes.to_vec();
            tampered[i] ^= 0x01;
            let Ok(tampered) = String::from_utf8(tampered) else {
                continue;
            };
            assert!(
                unsign_value::<Vec<String>>(&tampered, SECRET).is_err(),
                "tampering at byte {} was not detected: {}",
                i,
                tampered
            );
        }
    }

    #[test]
    fn test_malformed_envelopes() {
        assert!(matches!(
            unsign("no separator", SECRET),
            Err(FormError::MalformedEnvelope { .. })
        ));
        assert!(matches!(
            unsign("zz|payload", SECRET),
            Err(FormError::MalformedEnvelope { .. })
        ));
        assert!(matches!(
            unsign("abcd|payload", SECRET),
            Err(FormError::MalformedEnvelope { .. })
        ));
    }
}
