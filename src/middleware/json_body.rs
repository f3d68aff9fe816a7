use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, OptionalFromRequest, Request};
use axum::Json;
use axum::http::{StatusCode, header};
use serde::de::DeserializeOwned;

use crate::error::HomeMatchError;

/// `Json<T>` whose rejections use the API error body and map to 400.
///
/// Plain `Json` answers 415/422 with a text body, which callers would have to
/// special-case.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = HomeMatchError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match <Json<T> as FromRequest<S>>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                Err(HomeMatchError::PayloadTooLarge)
            }
            Err(rejection) => Err(HomeMatchError::Validation(describe(&rejection))),
        }
    }
}

/// `Option<ApiJson<T>>` is `None` for a request without a body or content type.
impl<S, T> OptionalFromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = HomeMatchError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let no_content_type = !req.headers().contains_key(header::CONTENT_TYPE);
        let no_body = req
            .headers()
            .get(header::CONTENT_LENGTH)
            .is_none_or(|len| len.as_bytes() == b"0");
        if no_content_type && no_body {
            return Ok(None);
        }
        <Self as FromRequest<S>>::from_request(req, state)
            .await
            .map(Some)
    }
}

fn describe(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "expected `Content-Type: application/json`".to_string()
        }
        other => other.body_text(),
    }
}
