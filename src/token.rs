use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value as JsonValue;
use time::OffsetDateTime;

/// Reads the `exp` claim of a JWT without verifying its signature.
///
/// The client never trusts this value for authorization; it is only used to
/// drop a persisted session whose token has obviously expired. Returns `None`
/// for opaque (non-JWT) tokens or tokens without `exp`.
#[must_use]
pub fn jwt_expiry(token: &str) -> Option<OffsetDateTime> {
    let claims = extract_untrusted_claims(token)?;
    let exp = claims.get("exp")?.as_i64()?;
    OffsetDateTime::from_unix_timestamp(exp).ok()
}

/// `true` only when the token is a JWT whose `exp` is at or before `now`.
#[must_use]
pub fn is_expired_at(token: &str, now: OffsetDateTime) -> bool {
    jwt_expiry(token).is_some_and(|exp| exp <= now)
}

/// Decodes the payload segment of a `header.payload.signature` token.
fn extract_untrusted_claims(token: &str) -> Option<JsonValue> {
    let mut parts = token.split('.');
    let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    // Some issuers keep the `=` padding
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
pub(crate) fn test_jwt(claims: &JsonValue) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}
