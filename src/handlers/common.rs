use crate::{
    errors::{ApiError, ServiceError},
    ApiResponse,
};
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

/// Standard success response
pub fn success_response<T: Serialize>(message: &str, data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(message, data))).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(message: &str, data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::success(message, data))).into_response()
}

/// Success envelope without a `data` member
pub fn message_response(message: &str) -> Response {
    (StatusCode::OK, Json(ApiResponse::message(message))).into_response()
}

/// Parses a path identifier, answering 400 when it is not a UUID.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ServiceError::invalid_field("Invalid ID format", "id", "uuid").into())
}

/// JSON body extractor whose rejection is rendered as the error envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::post, Router};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Quantity {
        quantity: i32,
    }

    async fn echo(JsonBody(body): JsonBody<Quantity>) -> Response {
        success_response("ok", body.quantity)
    }

    async fn send(body: &str) -> (StatusCode, serde_json::Value) {
        let app = Router::new().route("/", post(echo));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn well_typed_body_passes_through() {
        let (status, body) = send(r#"{"quantity": 3}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], 3);
    }

    #[tokio::test]
    async fn fractional_quantity_becomes_error_envelope() {
        let (status, body) = send(r#"{"quantity": 1.5}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "Error");
        assert_eq!(body["message"], "Invalid input data");
        assert!(body["error"]["body"].is_string());
    }

    #[test]
    fn parse_id_rejects_garbage() {
        assert!(parse_id("42").is_err());
        assert!(parse_id(&Uuid::new_v4().to_string()).is_ok());
    }
}
