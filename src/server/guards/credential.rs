use crate::error::ApiError;
use crate::server::router::AppState;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Rejects every agent route while the provider credential is missing or a placeholder,
/// before the body is read or any handler runs.
#[derive(Debug, Clone, Copy)]
pub struct RequireProviderCredential;

impl FromRequestParts<AppState> for RequireProviderCredential {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if state.credential_configured {
            Ok(RequireProviderCredential)
        } else {
            Err(ApiError::ProviderNotConfigured)
        }
    }
}
