//! Load target resolution
//!
//! What "load this URI" means for the shell:
//! 1. `about:blank` → empty page
//! 2. `ftp:` → handed to an external program
//! 3. `javascript:` → run in the current page
//! 4. known web schemes → engine load
//! 5. anything else → treated as a bare address, `http://` is prepended

use url::Url;

use wren_privacy::netloc;

use crate::error::NavigationError;
use crate::Result;

/// Schemes the engine loads directly
pub const WEB_SCHEMES: &[&str] = &["http", "https", "file", "populars", "accept"];

const ACCEPT_SCHEME: &str = "accept";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadTarget {
    Blank,
    External(String),
    Script(String),
    Web(String),
}

impl LoadTarget {
    pub fn resolve(uri: &str) -> Self {
        let uri = uri.trim();

        if uri == "about:blank" {
            return LoadTarget::Blank;
        }

        let scheme = Url::parse(uri).ok().map(|u| u.scheme().to_string());

        match scheme.as_deref() {
            Some("ftp") => LoadTarget::External(uri.to_string()),
            Some("javascript") => {
                let decoded = percent::decode(uri);
                let code = decoded
                    .strip_prefix("javascript:")
                    .unwrap_or(&decoded)
                    .to_string();
                LoadTarget::Script(code)
            }
            Some(s) if WEB_SCHEMES.contains(&s) => LoadTarget::Web(uri.to_string()),
            _ => LoadTarget::Web(format!("http://{}", uri)),
        }
    }

    /// URI handed to the engine, if any
    pub fn uri(&self) -> Option<&str> {
        match self {
            LoadTarget::Web(uri) | LoadTarget::External(uri) => Some(uri.as_str()),
            LoadTarget::Blank => Some("about:blank"),
            LoadTarget::Script(_) => None,
        }
    }
}

/// Whether a URI uses the trust-override scheme
pub fn is_accept_uri(uri: &str) -> bool {
    Url::parse(uri).is_ok_and(|u| u.scheme() == ACCEPT_SCHEME)
}

/// Rewrite `https://host/path` into the trust-override form `accept://host/path`.
pub fn accept_uri_for(uri: &str) -> String {
    match uri.strip_prefix("https://") {
        Some(rest) => format!("{}://{}", ACCEPT_SCHEME, rest),
        None => uri.to_string(),
    }
}

/// Split an `accept://host/path` URI into the host to trust and the
/// `https://host/path` URI to reload.
pub fn resolve_accept_uri(uri: &str) -> Result<(String, String)> {
    let url = Url::parse(uri).map_err(|_| NavigationError::InvalidUrl(uri.to_string()))?;
    if url.scheme() != ACCEPT_SCHEME {
        return Err(NavigationError::NotAcceptUri(uri.to_string()));
    }

    let host = netloc(&url);
    if host.is_empty() {
        return Err(NavigationError::InvalidUrl(uri.to_string()));
    }

    let https = format!("https://{}{}", host, url.path());
    Ok((host, https))
}

// Minimal percent-decoding for javascript: URIs
mod percent {
    pub fn decode(input: &str) -> String {
        let bytes = input.as_bytes();
        let mut out = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'%' && i + 2 < bytes.len() {
                if let (Some(hi), Some(lo)) = (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                    out.push(hi << 4 | lo);
                    i += 3;
                    continue;
                }
            }
            out.push(bytes[i]);
            i += 1;
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    fn hex(byte: u8) -> Option<u8> {
        match byte {
            b'0'..=b'9' => Some(byte - b'0'),
            b'a'..=b'f' => Some(byte - b'a' + 10),
            b'A'..=b'F' => Some(byte - b'A' + 10),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_web() {
        assert_eq!(
            LoadTarget::resolve("https://example.com"),
            LoadTarget::Web("https://example.com".to_string())
        );
        assert_eq!(
            LoadTarget::resolve("file:///tmp/page.html"),
            LoadTarget::Web("file:///tmp/page.html".to_string())
        );
        assert_eq!(
            LoadTarget::resolve("accept://self-signed.example/"),
            LoadTarget::Web("accept://self-signed.example/".to_string())
        );
    }

    #[test]
    fn test_resolve_bare_addresses() {
        assert_eq!(
            LoadTarget::resolve("example.com"),
            LoadTarget::Web("http://example.com".to_string())
        );
        assert_eq!(
            LoadTarget::resolve("localhost:8080"),
            LoadTarget::Web("http://localhost:8080".to_string())
        );
    }

    #[test]
    fn test_resolve_special() {
        assert_eq!(LoadTarget::resolve("about:blank"), LoadTarget::Blank);
        assert_eq!(
            LoadTarget::resolve("ftp://mirror.example/pub"),
            LoadTarget::External("ftp://mirror.example/pub".to_string())
        );
        assert_eq!(
            LoadTarget::resolve("javascript:alert(%22hi%22)"),
            LoadTarget::Script("alert(\"hi\")".to_string())
        );
        assert_eq!(LoadTarget::resolve("javascript:void(0)").uri(), None);
    }

    #[test]
    fn test_percent_decode_keeps_invalid_sequences() {
        assert_eq!(percent::decode("a%2"), "a%2");
        assert_eq!(percent::decode("100%zz"), "100%zz");
        assert_eq!(percent::decode("%41%42"), "AB");
    }

    #[test]
    fn test_accept_uris() {
        let accept = accept_uri_for("https://self-signed.example/login");
        assert_eq!(accept, "accept://self-signed.example/login");
        assert!(is_accept_uri(&accept));
        assert!(!is_accept_uri("https://self-signed.example/login"));

        let (host, https) = resolve_accept_uri(&accept).unwrap();
        assert_eq!(host, "self-signed.example");
        assert_eq!(https, "https://self-signed.example/login");

        let (host, https) = resolve_accept_uri("accept://internal.example:8443/").unwrap();
        assert_eq!(host, "internal.example:8443");
        assert_eq!(https, "https://internal.example:8443/");

        assert!(resolve_accept_uri("https://example.com/").is_err());
        assert!(resolve_accept_uri("nonsense").is_err());
    }
}
