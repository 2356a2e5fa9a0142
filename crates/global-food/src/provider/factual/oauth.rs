//! Two-legged OAuth 1.0a request signing (HMAC-SHA1), as Factual requires.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 percent-encoding: everything but `A-Z a-z 0-9 - _ . ~`.
pub(crate) fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Consumer key/secret pair with nothing else; Factual has no token step.
pub(crate) struct OAuthSigner {
    consumer_key: String,
    consumer_secret: String,
}

/// Per-request values that must be fresh on every call.
pub(crate) struct Freshness {
    pub nonce: String,
    pub timestamp: i64,
}

impl Freshness {
    pub fn now() -> Self {
        let nonce = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        Self {
            nonce,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl OAuthSigner {
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        }
    }

    fn oauth_params(&self, fresh: &Freshness) -> Vec<(String, String)> {
        vec![
            ("oauth_consumer_key".to_string(), self.consumer_key.clone()),
            ("oauth_nonce".to_string(), fresh.nonce.clone()),
            ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
            ("oauth_timestamp".to_string(), fresh.timestamp.to_string()),
            ("oauth_version".to_string(), "1.0".to_string()),
        ]
    }

    /// `Authorization` header value for a request.
    pub fn authorization(
        &self,
        method: &str,
        base_url: &str,
        params: &[(String, String)],
        fresh: &Freshness,
    ) -> String {
        let oauth = self.oauth_params(fresh);
        let mut all: Vec<(String, String)> = params.to_vec();
        all.extend(oauth.iter().cloned());

        let base = signature_base_string(method, base_url, &all);
        let signature = self.sign(&base);

        let mut fields: Vec<String> = oauth
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect();
        fields.push(format!("oauth_signature=\"{}\"", encode(&signature)));
        format!("OAuth {}", fields.join(", "))
    }

    fn sign(&self, base: &str) -> String {
        // Empty token secret in two-legged mode.
        let key = format!("{}&", encode(&self.consumer_secret));
        // HMAC accepts keys of any length.
        let mut mac = match HmacSha1::new_from_slice(key.as_bytes()) {
            Ok(mac) => mac,
            Err(_) => return String::new(),
        };
        mac.update(base.as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }
}

/// `METHOD&url&sorted-params`, each part percent-encoded.
pub(crate) fn signature_base_string(
    method: &str,
    base_url: &str,
    params: &[(String, String)],
) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(base_url),
        encode(&param_string)
    )
}

/// `k=v&k=v` with the same encoding used for signing.
pub(crate) fn query_string(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed() -> Freshness {
        Freshness {
            nonce: "abc123".to_string(),
            timestamp: 1_500_000_000,
        }
    }

    fn params() -> Vec<(String, String)> {
        vec![
            ("q".to_string(), "joe's pizza".to_string()),
            ("limit".to_string(), "10".to_string()),
        ]
    }

    #[test]
    fn test_encode_is_rfc3986() {
        assert_eq!(encode("a b&c=d~e.f_g-h"), "a%20b%26c%3Dd~e.f_g-h");
        assert_eq!(encode("{\"$circle\"}"), "%7B%22%24circle%22%7D");
    }

    #[test]
    fn test_base_string_sorts_and_encodes() {
        let base = signature_base_string(
            "get",
            "https://api.v3.factual.com/t/restaurants-us",
            &params(),
        );
        assert_eq!(
            base,
            "GET&https%3A%2F%2Fapi.v3.factual.com%2Ft%2Frestaurants-us&limit%3D10%26q%3Djoe%2527s%2520pizza"
        );
    }

    #[test]
    fn test_authorization_header_fields() {
        let signer = OAuthSigner::new("key", "secret");
        let header = signer.authorization(
            "GET",
            "https://api.v3.factual.com/t/restaurants-us",
            &params(),
            &fixed(),
        );

        assert!(header.starts_with("OAuth "));
        for field in [
            "oauth_consumer_key=\"key\"",
            "oauth_nonce=\"abc123\"",
            "oauth_signature_method=\"HMAC-SHA1\"",
            "oauth_timestamp=\"1500000000\"",
            "oauth_version=\"1.0\"",
            "oauth_signature=\"",
        ] {
            assert!(header.contains(field), "missing {} in {}", field, header);
        }
    }

    #[test]
    fn test_signature_depends_on_secret() {
        let url = "https://api.v3.factual.com/t/restaurants-us";
        let a = OAuthSigner::new("key", "secret-a").authorization("GET", url, &params(), &fixed());
        let b = OAuthSigner::new("key", "secret-b").authorization("GET", url, &params(), &fixed());
        let again =
            OAuthSigner::new("key", "secret-a").authorization("GET", url, &params(), &fixed());
        assert_ne!(a, b);
        assert_eq!(a, again);
    }

    #[test]
    fn test_query_string_matches_signing_encoding() {
        assert_eq!(query_string(&params()), "q=joe%27s%20pizza&limit=10");
    }

    #[test]
    fn test_fresh_nonce_is_random() {
        assert_ne!(Freshness::now().nonce, Freshness::now().nonce);
    }
}
