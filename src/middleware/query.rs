use axum::extract::{FromRequestParts, Path, Query};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::error::HomeMatchError;

/// `Query<T>` that rejects with the API error body instead of plain text.
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = HomeMatchError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(|rejection| HomeMatchError::Validation(rejection.body_text()))
    }
}

/// `Path<T>` with the same error body as [`ApiQuery`].
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = HomeMatchError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| Self(value))
            .map_err(|rejection| HomeMatchError::Validation(rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Page {
        limit: Option<u32>,
    }

    async fn extract(uri: &str) -> Result<ApiQuery<Page>, HomeMatchError> {
        let (mut parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        ApiQuery::<Page>::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn malformed_numbers_become_validation_errors() {
        let ApiQuery(page) = extract("/x?limit=20").await.unwrap();
        assert_eq!(page.limit, Some(20));

        let err = extract("/x?limit=abc").await.err().unwrap();
        assert!(matches!(err, HomeMatchError::Validation(msg) if msg.contains("limit")));
    }
}
