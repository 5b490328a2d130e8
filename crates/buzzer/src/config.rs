//! Client configuration.

use buzzer_route::RouteConfig;
use buzzer_session::SessionConfig;
use serde::{Deserialize, Serialize};

use crate::BuzzerError;

/// All Buzzer settings in one document.
///
/// ```json
/// {
///   "route": { "public_routes": ["/", "/sign-in", "/sign-up", "/about"] },
///   "session": { "refresh_on_same_identity": false }
/// }
/// ```
///
/// Missing sections and fields take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub route: RouteConfig,
    pub session: SessionConfig,
}

impl ClientConfig {
    /// Parses a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self, BuzzerError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_str_fills_defaults() {
        let cfg = ClientConfig::from_json_str(
            r#"{ "route": { "public_routes": ["/", "/about"] } }"#,
        )
        .unwrap();
        assert_eq!(cfg.route.public_routes, vec!["/", "/about"]);
        assert_eq!(cfg.route.sign_in_route, "/sign-in");
        assert!(!cfg.session.refresh_on_same_identity);
    }

    #[test]
    fn test_from_json_str_rejects_malformed() {
        let err = ClientConfig::from_json_str("{ route: ").unwrap_err();
        assert!(matches!(err, BuzzerError::Config(_)));
    }
}
