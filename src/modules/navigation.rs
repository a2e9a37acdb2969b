// Location input resolution: decides whether typed text is a url or a
// search query. Purely local string heuristics, no DNS resolution, no
// prefetching, no autocomplete traffic. The only network request happens
// when the user commits navigation and the engine loads the result.

use url::Url;

use crate::settings::Settings;

const WEB_SCHEMES: [&str; 5] = ["http", "https", "file", "about", "data"];

/// Resolve location-bar input into a navigable url.
pub fn resolve_input(input: &str, settings: &Settings) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return "about:blank".to_string();
    }

    // Implicit localhost and bare IPs get http, not a search.
    if is_local_destination(trimmed) && !trimmed.contains("://") {
        if let Ok(parsed) = Url::parse(&format!("http://{}", trimmed)) {
            return parsed.to_string();
        }
    }

    // Already a url with a known scheme. The scheme allowlist keeps
    // "google.com" from parsing as scheme "google".
    if let Ok(parsed) = Url::parse(trimmed) {
        if WEB_SCHEMES.contains(&parsed.scheme()) {
            return parsed.to_string();
        }
    }

    // A dotted token without spaces reads as a domain.
    if !trimmed.contains(' ') && trimmed.contains('.') && !trimmed.ends_with('.') {
        let scheme = if settings.https_only { "https" } else { "http" };
        if let Ok(parsed) = Url::parse(&format!("{}://{}", scheme, trimmed)) {
            if parsed.host().is_some() {
                return parsed.to_string();
            }
        }
    }

    settings.search_engine.query_url(trimmed)
}

/// Whether the input names a loopback or private-style destination that
/// should never fall through to search.
fn is_local_destination(input: &str) -> bool {
    if input.starts_with("localhost") || input.starts_with("127.0.0.1") {
        return true;
    }
    input.parse::<std::net::IpAddr>().is_ok()
}

/// Host component of a url, used to key per-site state.
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .host_str()
        .map(|host| host.to_string())
}
