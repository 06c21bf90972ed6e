use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;

/// JSON extractor whose rejections use the standard error body
///
/// Deserialization failures (missing fields, unknown enum variants, wrong
/// types) become `{error:{code,message,category}}` with status 400 instead
/// of axum's plain-text rejection.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ValidationJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidatedJson(value)),
            Err(rejection) => Err(ValidationJsonRejection(rejection)),
        }
    }
}

pub struct ValidationJsonRejection(JsonRejection);

/// Pull the serde message out of axum's rejection text, dropping the position suffix
fn detail(error_message: &str) -> String {
    let tail = error_message
        .split_once(": ")
        .map(|(_, rest)| rest)
        .unwrap_or(error_message);
    tail.split(" at line").next().unwrap_or(tail).trim().to_string()
}

fn classify(rejection: &JsonRejection) -> (StatusCode, &'static str, String) {
    let error_message = rejection.body_text();

    match rejection {
        JsonRejection::MissingJsonContentType(_) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "VALIDATION_CONTENT_TYPE",
            "Expected request with `Content-Type: application/json`".to_string(),
        ),
        _ if error_message.contains("missing field") => {
            let field = error_message
                .split("missing field `")
                .nth(1)
                .and_then(|s| s.split('`').next())
                .unwrap_or("unknown");
            (
                StatusCode::BAD_REQUEST,
                "VALIDATION_MISSING_FIELD",
                format!("Missing required field: {}", field),
            )
        }
        _ if error_message.contains("Failed to deserialize") => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_INVALID_INPUT",
            format!("Invalid request body: {}", detail(&error_message)),
        ),
        _ => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_INVALID_INPUT",
            "Invalid request body: failed to parse JSON".to_string(),
        ),
    }
}

impl IntoResponse for ValidationJsonRejection {
    fn into_response(self) -> Response {
        let (status, code, message) = classify(&self.0);

        tracing::warn!(
            error_code = code,
            error_message = %message,
            original_error = %self.0.body_text(),
            "Request validation failed during JSON deserialization"
        );

        metrics::counter!("errors_total", "category" => "Validation", "code" => code).increment(1);

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "category": "Validation",
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_strips_prefix_and_position() {
        let raw = "Failed to deserialize the JSON body into the target type: unknown variant `mana`, expected one of `points`, `exp`, `drop` at line 1 column 22";
        assert_eq!(
            detail(raw),
            "unknown variant `mana`, expected one of `points`, `exp`, `drop`"
        );
    }
}
