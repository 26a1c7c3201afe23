//! Request extractors.
//!
//! Every extractor here rejects with [`ApiError`], so malformed paths, query
//! strings and bodies get the same `{error, code}` body as handler errors.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Multipart, Path, Query, Request},
};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use validator::{Validate, ValidationErrors};

use crate::error::ApiError;

/// `Json<T>` with JSON error bodies.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Path<T>` with JSON error bodies.
#[derive(Debug, Clone, Copy, FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// `Query<T>` with JSON error bodies.
#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// `Multipart` with JSON error bodies.
#[derive(Debug)]
pub struct ApiMultipart(pub Multipart);

impl<S> FromRequest<S> for ApiMultipart
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(Multipart::from_request(req, state).await?))
    }
}

/// JSON body that has passed `validator` rules.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let ApiJson(value) = ApiJson::<T>::from_request(req, state).await?;

        value
            .validate()
            .map_err(|errors| ApiError::validation(describe(&errors)))?;

        Ok(Self(value))
    }
}

/// One line per failing field, sorted by field name.
fn describe(errors: &ValidationErrors) -> String {
    let mut lines: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let reasons: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map_or_else(|| e.code.to_string(), ToString::to_string)
                })
                .collect();
            format!("{field}: {}", reasons.join(", "))
        })
        .collect();
    lines.sort();
    lines.join("; ")
}

/// Distinguishes an absent PATCH field (`None`) from an explicit `null`
/// (`Some(None)`). Use with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Signup {
        #[validate(email(message = "must be a valid email"))]
        email: String,
        #[validate(length(min = 8))]
        password: String,
    }

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        website: Option<Option<String>>,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_validated_json_rejects_rule_violations() {
        let req = json_request(r#"{"email":"nope","password":"short"}"#);
        let err = ValidatedJson::<Signup>::from_request(req, &()).await.unwrap_err();

        let msg = err.kind().public_message();
        assert!(msg.contains("email: must be a valid email"), "{msg}");
        assert!(msg.contains("password: length"), "{msg}");
    }

    #[tokio::test]
    async fn test_validated_json_rejects_malformed_body() {
        let req = json_request("{not json");
        let err = ValidatedJson::<Signup>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.kind().error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_api_json_missing_content_type_is_400() {
        let req = Request::builder()
            .body(Body::from(r#"{"email":"rep@dealdesk.io"}"#))
            .unwrap();
        let err = ApiJson::<Signup>::from_request(req, &()).await.unwrap_err();

        assert_eq!(err.kind().status_code(), 400);
        assert_eq!(
            err.kind().public_message(),
            "Expected a JSON body with Content-Type: application/json"
        );
    }

    #[tokio::test]
    async fn test_api_json_wrong_shape_is_400() {
        let req = json_request(r#"{"email":42}"#);
        let err = ApiJson::<Signup>::from_request(req, &()).await.unwrap_err();

        assert_eq!(err.kind().status_code(), 400);
        assert_eq!(err.kind().error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_validated_json_accepts_valid_body() {
        let req = json_request(r#"{"email":"rep@dealdesk.io","password":"longenough"}"#);
        let ValidatedJson(signup) = ValidatedJson::<Signup>::from_request(req, &())
            .await
            .unwrap();
        assert_eq!(signup.email, "rep@dealdesk.io");
        assert_eq!(signup.password.len(), 10);
    }

    #[test]
    fn test_double_option() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"website":null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"website":"https://acme.example"}"#).unwrap();

        assert_eq!(absent.website, None);
        assert_eq!(null.website, Some(None));
        assert_eq!(set.website, Some(Some("https://acme.example".to_string())));
    }
}
