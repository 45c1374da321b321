//! Static-token authentication.
//!
//! Callers present a secret either as a `?token=` query parameter or an
//! `Authorization: Bearer` header. The secret is compared by equality
//! against the configured admin and viewer tokens; the admin token also
//! grants viewer access.

use axum::http::HeaderMap;
use sp_common::Role;
use sp_config::AuthTokens;

/// Resolve the caller's role from a presented secret.
///
/// Empty configured tokens never match, so a deployment that leaves a
/// token unset does not accidentally accept empty-string callers.
pub fn resolve_role(tokens: &AuthTokens, presented: Option<&str>) -> Option<Role> {
    let presented = presented?;
    if presented.is_empty() {
        return None;
    }
    if !tokens.admin_token.is_empty() && presented == tokens.admin_token {
        return Some(Role::Admin);
    }
    if !tokens.viewer_token.is_empty() && presented == tokens.viewer_token {
        return Some(Role::Viewer);
    }
    None
}

/// Extract the bearer token from request headers, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Pick the presented secret: query parameter wins, header is the fallback.
pub fn presented_token<'a>(query_token: Option<&'a str>, headers: &'a HeaderMap) -> Option<&'a str> {
    query_token.or_else(|| bearer_token(headers))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::AUTHORIZATION;

    fn tokens() -> AuthTokens {
        AuthTokens {
            admin_token: "admin-secret".to_string(),
            viewer_token: "viewer-secret".to_string(),
        }
    }

    #[test]
    fn admin_token_resolves_to_admin() {
        assert_eq!(resolve_role(&tokens(), Some("admin-secret")), Some(Role::Admin));
    }

    #[test]
    fn viewer_token_resolves_to_viewer() {
        assert_eq!(resolve_role(&tokens(), Some("viewer-secret")), Some(Role::Viewer));
    }

    #[test]
    fn wrong_token_is_rejected() {
        assert_eq!(resolve_role(&tokens(), Some("nope")), None);
        assert_eq!(resolve_role(&tokens(), None), None);
    }

    #[test]
    fn empty_configured_token_never_matches() {
        let tokens = AuthTokens {
            admin_token: String::new(),
            viewer_token: String::new(),
        };
        assert_eq!(resolve_role(&tokens, Some("")), None);
    }

    #[test]
    fn bearer_header_is_a_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer viewer-secret".parse().unwrap());
        assert_eq!(presented_token(None, &headers), Some("viewer-secret"));
        assert_eq!(presented_token(Some("admin-secret"), &headers), Some("admin-secret"));
    }
}
