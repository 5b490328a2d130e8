//! Route configuration and classification.

use buzzer_identity::UserId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RouteConfig
// ---------------------------------------------------------------------------

/// Where the public pages and the per-user pages live.
///
/// Every field has a default, so a config file only needs the fields it
/// changes:
///
/// ```rust
/// use buzzer_route::RouteConfig;
///
/// let cfg: RouteConfig = serde_json::from_str(r#"{ "sign_in_route": "/login" }"#).unwrap();
/// assert_eq!(cfg.sign_in_route, "/login");
/// assert_eq!(cfg.users_prefix, "/users");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Paths anyone may see, signed in or not. Exact matches only.
    pub public_routes: Vec<String>,

    /// Where signed-out viewers are sent.
    pub sign_in_route: String,

    /// Where signed-in viewers without a player record are sent.
    pub sign_up_route: String,

    /// Prefix of user-owned pages: `{users_prefix}/{id}/...`.
    pub users_prefix: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            public_routes: vec!["/".into(), "/sign-in".into(), "/sign-up".into()],
            sign_in_route: "/sign-in".into(),
            sign_up_route: "/sign-up".into(),
            users_prefix: "/users".into(),
        }
    }
}

impl RouteConfig {
    /// Classifies a path.
    pub fn classify<'p>(&self, path: &'p str) -> RouteClass<'p> {
        let path = normalize_path(path);

        if self
            .public_routes
            .iter()
            .any(|route| normalize_path(route) == path)
        {
            return RouteClass::Public;
        }

        let prefix = normalize_path(&self.users_prefix);
        if let Some(rest) = path.strip_prefix(prefix) {
            if let Some(rest) = rest.strip_prefix('/') {
                let owner = rest.split('/').next().unwrap_or_default();
                if !owner.is_empty() {
                    return RouteClass::UserOwned { owner };
                }
            }
        }

        RouteClass::Protected
    }

    /// `true` if anyone may see `path`.
    pub fn is_public(&self, path: &str) -> bool {
        matches!(self.classify(path), RouteClass::Public)
    }

    /// The canonical page for a user: `{users_prefix}/{id}`.
    pub fn user_route(&self, id: UserId) -> String {
        format!("{}/{}", normalize_path(&self.users_prefix), id)
    }
}

// ---------------------------------------------------------------------------
// RouteClass
// ---------------------------------------------------------------------------

/// What kind of page a path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass<'p> {
    /// On the allowlist.
    Public,
    /// Requires a signed-in viewer.
    Protected,
    /// Belongs to one user. `owner` is the raw `:id` segment, which may not
    /// even be numeric.
    UserOwned { owner: &'p str },
}

impl RouteClass<'_> {
    /// `true` for user-owned routes whose owner segment names `id`.
    ///
    /// Only the canonical spelling matches: `/users/042` and `/users/+42`
    /// belong to nobody, so the guard sends user 42 on to `/users/42`.
    pub fn is_owned_by(&self, id: UserId) -> bool {
        match self {
            Self::UserOwned { owner } => *owner == id.to_string(),
            _ => false,
        }
    }
}

/// Strips query string, fragment and trailing slashes.
///
/// `"/users/7/?tab=boards"` → `"/users/7"`; `""` and `"/"` → `"/"`.
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}
