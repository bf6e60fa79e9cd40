use async_trait::async_trait;

/// The interface the broker consumes from an external credential/session
/// service: the broker's sole observable use is an existence check before
/// serving mutating endpoints. Real token issuance, JWT validation, and
/// password hashing live entirely outside this crate; this trait is the seam
/// a deployment wires a real token cache into.
#[async_trait]
pub trait TokenCache: Send + Sync {
    async fn exists(&self, token: &str) -> bool;
}

/// Stand-in used when no external token cache is wired up: treats presence
/// of a non-empty bearer token as sufficient, since the core never issues or
/// validates tokens itself.
pub struct PassthroughTokenCache;

#[async_trait]
impl TokenCache for PassthroughTokenCache {
    async fn exists(&self, token: &str) -> bool {
        !token.is_empty()
    }
}

pub fn extract_bearer(header_value: Option<&axum::http::HeaderValue>) -> Option<&str> {
    header_value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}
