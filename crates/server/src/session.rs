use axum::http::header::{HeaderMap, COOKIE};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use sha2::Sha256;
use tracing::debug;

use asha_core::config::SessionConfig;
use asha_core::session::SessionContext;

type HmacSha256 = Hmac<Sha256>;

pub const COOKIE_NAME: &str = "asha_session";

/// Encodes the session context into a signed cookie value
/// (`base64(json).base64(hmac-sha256)`) and verifies it on the way back in.
/// Any decode or verification failure yields a fresh session rather than an
/// error; the cookie is advisory state, not an authentication token.
pub struct SessionCodec {
    key: Vec<u8>,
    ttl_secs: u64,
}

impl SessionCodec {
    pub fn new(config: &SessionConfig) -> Self {
        Self { key: config.signing_key.expose_secret().as_bytes().to_vec(), ttl_secs: config.ttl_secs }
    }

    pub fn issue(&self) -> SessionContext {
        SessionContext::new(self.ttl_secs)
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn encode(&self, ctx: &SessionContext) -> Result<String, serde_json::Error> {
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(ctx)?);
        let signature = URL_SAFE_NO_PAD.encode(self.sign(payload.as_bytes()));
        Ok(format!("{payload}.{signature}"))
    }

    pub fn decode(&self, cookie_value: &str) -> Option<SessionContext> {
        let (payload, signature) = cookie_value.split_once('.')?;

        let signature_bytes = URL_SAFE_NO_PAD.decode(signature).ok()?;
        let mut mac = HmacSha256::new_from_slice(&self.key).ok()?;
        mac.update(payload.as_bytes());
        if mac.verify_slice(&signature_bytes).is_err() {
            debug!("session cookie failed signature verification");
            return None;
        }

        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let ctx: SessionContext = serde_json::from_slice(&json).ok()?;

        if ctx.is_expired(Utc::now()) {
            debug!(session_id = %ctx.id, "session cookie expired");
            return None;
        }

        Some(ctx)
    }

    /// The session from the request cookie, or a fresh one.
    pub fn from_headers(&self, headers: &HeaderMap) -> SessionContext {
        cookie_value(headers, COOKIE_NAME)
            .and_then(|value| self.decode(&value))
            .unwrap_or_else(|| self.issue())
    }

    pub fn set_cookie_header(&self, ctx: &SessionContext) -> Result<String, serde_json::Error> {
        let value = self.encode(ctx)?;
        Ok(format!(
            "{COOKIE_NAME}={value}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            self.ttl_secs
        ))
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        // HMAC-SHA256 accepts keys of any length; construction cannot fail.
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("hmac accepts any key length");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(COOKIE)?.to_str().ok()?;
    raw.split(';').map(str::trim).find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use axum::http::header::{HeaderMap, HeaderValue, COOKIE};
    use chrono::{Duration, Utc};

    use asha_core::config::SessionConfig;
    use asha_core::session::Role;

    use super::{SessionCodec, COOKIE_NAME};

    fn codec() -> SessionCodec {
        SessionCodec::new(&SessionConfig {
            signing_key: "a-test-signing-key-of-real-length".to_string().into(),
            ttl_secs: 3600,
            history_turns: 10,
            entity_values: 5,
        })
    }

    #[test]
    fn encode_decode_round_trip() {
        let codec = codec();
        let mut ctx = codec.issue();
        ctx.push_turn(Role::User, "any jobs in pune?", 10);

        let cookie = codec.encode(&ctx).expect("encode");
        let decoded = codec.decode(&cookie).expect("decode");

        assert_eq!(decoded, ctx);
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let codec = codec();
        let cookie = codec.encode(&codec.issue()).expect("encode");

        let (payload, signature) = cookie.split_once('.').expect("two parts");
        let mut tampered_payload = payload.to_string();
        tampered_payload.push('x');
        let tampered = format!("{tampered_payload}.{signature}");

        assert!(codec.decode(&tampered).is_none());
    }

    #[test]
    fn foreign_key_signature_is_rejected() {
        let codec = codec();
        let other = SessionCodec::new(&SessionConfig {
            signing_key: "a-different-signing-key-entirely".to_string().into(),
            ttl_secs: 3600,
            history_turns: 10,
            entity_values: 5,
        });

        let cookie = other.encode(&other.issue()).expect("encode");
        assert!(codec.decode(&cookie).is_none());
    }

    #[test]
    fn expired_session_yields_none() {
        let codec = codec();
        let mut ctx = codec.issue();
        ctx.expires_at = Utc::now() - Duration::seconds(10);

        let cookie = codec.encode(&ctx).expect("encode");
        assert!(codec.decode(&cookie).is_none());
    }

    #[test]
    fn missing_or_garbage_cookie_mints_a_fresh_session() {
        let codec = codec();

        let empty = HeaderMap::new();
        let fresh = codec.from_headers(&empty);
        assert!(fresh.history.is_empty());

        let mut garbage = HeaderMap::new();
        garbage.insert(COOKIE, HeaderValue::from_static("asha_session=not.valid"));
        let replaced = codec.from_headers(&garbage);
        assert!(replaced.history.is_empty());
        assert_ne!(replaced.id, fresh.id, "each minted session gets its own id");
    }

    #[test]
    fn set_cookie_header_carries_attributes() {
        let codec = codec();
        let header = codec.set_cookie_header(&codec.issue()).expect("header");

        assert!(header.starts_with(&format!("{COOKIE_NAME}=")));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("Max-Age=3600"));
        assert!(header.contains("SameSite=Lax"));
    }
}
