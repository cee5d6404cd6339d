//! Ownership gating. A single hardcoded owner identifier, compared through
//! one shared `AuthorizationContext` so every mutation path is gated by the
//! same check instead of per-call-site comparisons.

use async_trait::async_trait;
use axum::http::HeaderMap;
use uuid::Uuid;

/// The single designated visitor permitted to mutate portfolio content.
pub const OWNER_ID: &str = "6b9a2e6e-0f62-4f1a-9d6a-3f5b8f2e4c71";

pub fn owner_id() -> Uuid {
    Uuid::parse_str(OWNER_ID).expect("OWNER_ID is a valid UUID")
}

/// The current viewer as resolved by the identity capability.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub id: Option<Uuid>,
    /// Whether the viewer holds an authenticated remote session. An owner
    /// without one can still edit, but mutations persist locally only.
    pub authenticated: bool,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self {
            id: None,
            authenticated: false,
        }
    }

    pub fn owner() -> Self {
        Self {
            id: Some(owner_id()),
            authenticated: true,
        }
    }

    pub fn local_owner() -> Self {
        Self {
            id: Some(owner_id()),
            authenticated: false,
        }
    }
}

/// Per-request authorization context derived once from the viewer identity.
#[derive(Debug, Clone)]
pub struct AuthorizationContext {
    viewer: Viewer,
}

impl AuthorizationContext {
    pub fn for_viewer(viewer: Viewer) -> Self {
        Self { viewer }
    }

    /// True only for the designated owner. All mutation entry points check
    /// this before touching any store.
    pub fn can_edit(&self) -> bool {
        self.viewer.id.map_or(false, |id| id == owner_id())
    }

    /// True when the viewer holds an authenticated remote session, i.e.
    /// mutations may write through to the record store.
    pub fn has_remote_session(&self) -> bool {
        self.viewer.authenticated
    }
}

/// Resolves a bearer token to the current viewer.
/// Stand-in seam for the hosted auth service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_viewer(&self, bearer: Option<&str>) -> Viewer;
}

/// Token-based identity: the owner token grants a full remote session, the
/// optional draft-edit token grants owner editing without one. Everything
/// else is an anonymous visitor.
pub struct StaticTokenIdentity {
    owner_token: String,
    draft_edit_token: Option<String>,
}

impl StaticTokenIdentity {
    pub fn new(owner_token: String, draft_edit_token: Option<String>) -> Self {
        Self {
            owner_token,
            draft_edit_token,
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticTokenIdentity {
    async fn current_viewer(&self, bearer: Option<&str>) -> Viewer {
        let Some(token) = bearer else {
            return Viewer::anonymous();
        };
        if !self.owner_token.is_empty() && token == self.owner_token {
            return Viewer::owner();
        }
        if self.draft_edit_token.as_deref() == Some(token) {
            return Viewer::local_owner();
        }
        Viewer::anonymous()
    }
}

/// Extracts the bearer token from an Authorization header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_can_edit() {
        let ctx = AuthorizationContext::for_viewer(Viewer::owner());
        assert!(ctx.can_edit());
        assert!(ctx.has_remote_session());
    }

    #[test]
    fn test_local_owner_edits_without_session() {
        let ctx = AuthorizationContext::for_viewer(Viewer::local_owner());
        assert!(ctx.can_edit());
        assert!(!ctx.has_remote_session());
    }

    #[test]
    fn test_anonymous_cannot_edit() {
        let ctx = AuthorizationContext::for_viewer(Viewer::anonymous());
        assert!(!ctx.can_edit());
        assert!(!ctx.has_remote_session());
    }

    #[test]
    fn test_non_owner_viewer_cannot_edit() {
        let ctx = AuthorizationContext::for_viewer(Viewer {
            id: Some(Uuid::new_v4()),
            authenticated: true,
        });
        assert!(!ctx.can_edit());
    }

    #[tokio::test]
    async fn test_static_token_identity() {
        let identity = StaticTokenIdentity::new("owner-token".into(), Some("draft-token".into()));
        assert!(identity.current_viewer(Some("owner-token")).await.authenticated);
        let local = identity.current_viewer(Some("draft-token")).await;
        assert_eq!(local.id, Some(owner_id()));
        assert!(!local.authenticated);
        assert!(identity.current_viewer(Some("wrong")).await.id.is_none());
        assert!(identity.current_viewer(None).await.id.is_none());
    }
}
