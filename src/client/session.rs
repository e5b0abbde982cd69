//! The persistent HTTP session shared by every request of one client.

use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, ORIGIN};
use reqwest::redirect::Policy;

use crate::error::{Error, Result};

/// Default headers of a client: bearer auth when a token is present, the
/// origin when known, then debug headers that do not collide with either.
pub(crate) fn default_headers(
    token: Option<&str>,
    origin_url: Option<&str>,
    debug_headers: &[(String, String)],
) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        let mut value = header_value(&format!("Bearer {token}"), "authorization token")?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    if let Some(origin) = origin_url.filter(|o| !o.is_empty()) {
        headers.insert(ORIGIN, header_value(origin, "origin url")?);
    }
    for (key, value) in debug_headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| Error::configuration(format!("Invalid debug header name: {key}")))?;
        if headers.contains_key(&name) {
            tracing::warn!(
                "Ignoring debug header {key}: it would replace the client's own {name} header"
            );
            continue;
        }
        headers.insert(name, header_value(value, "debug header value")?);
    }
    Ok(headers)
}

/// Blocking session: keeps connections alive, never follows redirects and
/// leaves timeouts to each request.
pub(crate) fn build(headers: HeaderMap) -> Result<HttpClient> {
    let http = HttpClient::builder()
        .default_headers(headers)
        .redirect(Policy::none())
        .timeout(None::<Duration>)
        .build()?;
    Ok(http)
}

fn header_value(raw: &str, what: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(raw)
        .map_err(|_| Error::configuration(format!("Invalid {what}: contains illegal characters")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_header_only_with_token() {
        let headers = default_headers(Some("tok"), None, &[]).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer tok");

        let headers = default_headers(Some(""), None, &[]).unwrap();
        assert!(!headers.contains_key(AUTHORIZATION));
    }

    /// Shared buffer the test subscriber writes formatted events into.
    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<parking_lot::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_colliding_debug_header_is_warned_about() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let debug = vec![("Authorization".to_string(), "Bearer other".to_string())];
        let headers = tracing::subscriber::with_default(subscriber, || {
            default_headers(Some("tok"), None, &debug).unwrap()
        });

        assert_eq!(headers[AUTHORIZATION], "Bearer tok");
        let logged = String::from_utf8_lossy(&captured.0.lock()).to_string();
        assert!(logged.contains("WARN"), "{logged}");
        assert!(logged.contains("Ignoring debug header Authorization"), "{logged}");
    }

    #[test]
    fn test_debug_headers_do_not_replace_auth() {
        let debug = vec![
            ("authorization".to_string(), "Bearer other".to_string()),
            ("x-lepton-debug".to_string(), "1".to_string()),
        ];
        let headers = default_headers(Some("tok"), Some("https://o"), &debug).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer tok");
        assert_eq!(headers[ORIGIN], "https://o");
        assert_eq!(headers["x-lepton-debug"], "1");
    }

    #[test]
    fn test_invalid_debug_header_is_configuration_error() {
        let debug = vec![("bad header".to_string(), "1".to_string())];
        assert!(matches!(
            default_headers(None, None, &debug),
            Err(Error::WorkspaceConfiguration { .. })
        ));
    }
}
