//! Access-token sources for the HTTP client.

use async_trait::async_trait;

use drivepath_core::error::AppError;
use drivepath_core::result::AppResult;

/// Supplies a bearer token for each request.
///
/// Token acquisition and refresh live outside this crate; implementors hand
/// back whatever token is currently valid.
#[async_trait]
pub trait TokenProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Current access token, or `NotAuthenticated` when none is available.
    async fn access_token(&self) -> AppResult<String>;
}

/// A fixed token, typically read from configuration.
#[derive(Clone)]
pub struct StaticToken {
    token: Option<String>,
}

impl StaticToken {
    /// Wrap a token; `None` means every request fails with `NotAuthenticated`.
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToken")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> AppResult<String> {
        self.token
            .clone()
            .ok_or_else(|| AppError::not_authenticated("No access token configured"))
    }
}

#[cfg(test)]
mod tests {
    use drivepath_core::ErrorKind;

    use super::*;

    #[tokio::test]
    async fn test_missing_or_blank_token_is_not_authenticated() {
        for token in [None, Some("  ".to_string())] {
            let err = StaticToken::new(token).access_token().await.unwrap_err();
            assert!(err.is(ErrorKind::NotAuthenticated));
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", StaticToken::new(Some("secret".into())));
        assert!(!rendered.contains("secret"));
    }
}
