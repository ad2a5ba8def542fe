//! User-Agent string for playlist and segment requests.

/// Project URL for User-Agent identification (RFC 9308 good citizenship).
const PROJECT_UA_URL: &str = "https://github.com/fierce/segstitch";

/// Default User-Agent for all requests (identifies the tool and version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("segstitch/{version} (stream-recorder; +{PROJECT_UA_URL})")
}
