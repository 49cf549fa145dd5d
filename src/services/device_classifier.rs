use serde::{Deserialize, Serialize};
use std::fmt;

use super::enrichment::UNKNOWN;

/// Normalized client descriptor derived from a User-Agent header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub family: String,
    pub os_family: String,
}

impl DeviceDescriptor {
    pub fn unknown() -> Self {
        Self {
            family: UNKNOWN.to_string(),
            os_family: UNKNOWN.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.family == UNKNOWN && self.os_family == UNKNOWN
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            write!(f, "{}", UNKNOWN)
        } else {
            write!(f, "{} ({})", self.family, self.os_family)
        }
    }
}

/// Classifies a raw User-Agent. Anything absent or unrecognised maps to the
/// unknown descriptor.
pub fn classify(user_agent: Option<&str>) -> DeviceDescriptor {
    let Some(ua) = user_agent.map(str::trim).filter(|s| !s.is_empty()) else {
        return DeviceDescriptor::unknown();
    };

    let family = client_family(ua);
    let os_family = os_family(ua);

    match (family, os_family) {
        (None, None) => DeviceDescriptor::unknown(),
        (family, os) => DeviceDescriptor {
            family: family.unwrap_or(UNKNOWN).to_string(),
            os_family: os.unwrap_or(UNKNOWN).to_string(),
        },
    }
}

fn client_family(ua: &str) -> Option<&'static str> {
    let normalized = ua.to_ascii_lowercase();
    let has = |needle: &str| normalized.contains(needle);
    let mobile = has("mobile");

    // Order matters: most browsers also advertise "chrome/" or "safari/"
    if has("googlebot") {
        Some("Googlebot")
    } else if has("bingbot") {
        Some("Bingbot")
    } else if is_bot(&normalized) {
        Some("Bot")
    } else if has("curl/") {
        Some("curl")
    } else if has("python-requests") {
        Some("Python Requests")
    } else if has("instagram") {
        Some("Instagram")
    } else if has("fban") || has("fbav") {
        Some("Facebook")
    } else if has("edg/") || has("edga/") || has("edgios/") || has("edge/") {
        Some(if mobile { "Edge Mobile" } else { "Edge" })
    } else if has("opr/") || has("opera") {
        Some(if mobile { "Opera Mobile" } else { "Opera" })
    } else if has("samsungbrowser/") {
        Some("Samsung Internet")
    } else if has("crios/") {
        Some("Chrome Mobile iOS")
    } else if has("fxios/") {
        Some("Firefox iOS")
    } else if has("firefox/") {
        Some(if mobile { "Firefox Mobile" } else { "Firefox" })
    } else if has("chrome/") || has("chromium/") {
        Some(if mobile { "Chrome Mobile" } else { "Chrome" })
    } else if has("safari/") && has("version/") {
        Some(if mobile { "Mobile Safari" } else { "Safari" })
    } else {
        None
    }
}

/// Crawlers name themselves with a versioned `...bot/` token or inside a
/// `compatible;` comment. A bare "bot" substring also appears in device
/// models such as Cubot phones.
fn is_bot(normalized: &str) -> bool {
    if normalized.contains("spider") || normalized.contains("crawler") {
        return true;
    }

    let compatible = normalized.contains("compatible;");
    normalized.match_indices("bot").any(|(idx, _)| {
        match normalized[idx + 3..].chars().next() {
            Some('/') => true,
            Some(';') | Some(')') | Some(' ') | None => compatible,
            _ => false,
        }
    })
}

fn os_family(ua: &str) -> Option<&'static str> {
    let normalized = ua.to_ascii_lowercase();
    let has = |needle: &str| normalized.contains(needle);

    // iOS user agents say "like Mac OS X", Android ones say "Linux"
    if has("iphone") || has("ipad") || has("ipod") {
        Some("iOS")
    } else if has("android") {
        Some("Android")
    } else if has("windows") {
        Some("Windows")
    } else if has("cros ") {
        Some("Chrome OS")
    } else if has("mac os x") || has("macintosh") {
        Some("Mac OS X")
    } else if has("linux") {
        Some("Linux")
    } else {
        None
    }
}
