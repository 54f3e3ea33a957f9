use std::fmt;

use axum::http::HeaderMap;
use serde::Serialize;

use crate::errors::AppError;

/// Header carrying the caller's declared subscription tier.
pub const TIER_HEADER: &str = "x-tier";

/// Caller-declared subscription level. Not authenticated; it only gates
/// which endpoints a client is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Pro,
    Enterprise,
}

impl Tier {
    /// Missing or unrecognized headers fall back to `Free`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(TIER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| match v.trim().to_lowercase().as_str() {
                "pro" => Tier::Pro,
                "enterprise" => Tier::Enterprise,
                _ => Tier::Free,
            })
            .unwrap_or(Tier::Free)
    }

    pub fn is_pro(self) -> bool {
        matches!(self, Tier::Pro | Tier::Enterprise)
    }

    /// Errors with 403 unless the tier includes pro features.
    pub fn require_pro(self) -> Result<Self, AppError> {
        if self.is_pro() {
            Ok(self)
        } else {
            Err(AppError::Forbidden(format!(
                "This endpoint requires a pro tier (send '{TIER_HEADER}: pro')"
            )))
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Free => "free",
            Tier::Pro => "pro",
            Tier::Enterprise => "enterprise",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(TIER_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_missing_header_is_free() {
        assert_eq!(Tier::from_headers(&HeaderMap::new()), Tier::Free);
    }

    #[test]
    fn test_header_is_case_insensitive() {
        assert_eq!(Tier::from_headers(&headers_with(" PRO ")), Tier::Pro);
        assert_eq!(
            Tier::from_headers(&headers_with("Enterprise")),
            Tier::Enterprise
        );
    }

    #[test]
    fn test_unknown_tier_is_free() {
        assert_eq!(Tier::from_headers(&headers_with("platinum")), Tier::Free);
    }

    #[test]
    fn test_require_pro() {
        assert!(Tier::Free.require_pro().is_err());
        assert_eq!(Tier::Pro.require_pro().unwrap(), Tier::Pro);
        assert_eq!(Tier::Enterprise.require_pro().unwrap(), Tier::Enterprise);
    }
}
