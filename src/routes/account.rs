use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;

/// Header carrying the authenticated account identity.
pub const ACCOUNT_ID_HEADER: &str = "x-account-id";

/// Opaque, already-authenticated account identity.
///
/// The upstream gateway authenticates the caller and injects the identity as
/// a header; this service performs no authentication of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountId(pub Uuid);

impl<S> FromRequestParts<S> for AccountId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts.headers.get(ACCOUNT_ID_HEADER).ok_or_else(|| {
            AppError::Unauthorized(format!("missing `{ACCOUNT_ID_HEADER}` header"))
        })?;

        let value = value.to_str().map_err(|_| {
            AppError::Unauthorized(format!("malformed `{ACCOUNT_ID_HEADER}` header"))
        })?;

        let id = Uuid::parse_str(value).map_err(|_| {
            AppError::Unauthorized(format!(
                "`{ACCOUNT_ID_HEADER}` header is not a valid UUID"
            ))
        })?;

        Ok(AccountId(id))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(request: Request<()>) -> Result<AccountId, AppError> {
        let (mut parts, _body) = request.into_parts();
        AccountId::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn valid_header_is_accepted() {
        let id = Uuid::from_u128(42);
        let request = Request::builder()
            .header(ACCOUNT_ID_HEADER, id.to_string())
            .body(())
            .unwrap();

        assert_eq!(extract(request).await.unwrap(), AccountId(id));
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let request = Request::builder().body(()).unwrap();
        assert!(matches!(
            extract(request).await.unwrap_err(),
            AppError::Unauthorized(_)
        ));
    }

    #[tokio::test]
    async fn non_uuid_header_is_unauthorized() {
        let request = Request::builder()
            .header(ACCOUNT_ID_HEADER, "not-a-uuid")
            .body(())
            .unwrap();
        assert!(matches!(
            extract(request).await.unwrap_err(),
            AppError::Unauthorized(_)
        ));
    }
}
