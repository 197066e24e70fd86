use serde_json::json;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Missing fields")]
    MissingFields,

    #[error("Field too long")]
    FieldTooLong,

    #[error("Too many requests, try later")]
    TooManyRequests,

    #[error("Invalid submission body")]
    MalformedInput,

    #[error("Submission too large")]
    PayloadTooLarge,
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::MissingFields => StatusCode::BAD_REQUEST,
            Error::FieldTooLong => StatusCode::BAD_REQUEST,
            Error::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Error::MalformedInput => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "success": false,
                "message": msg,
                "type": "unknown",
            }),
            Error::MissingFields => json!({
                "success": false,
                "message": "Missing fields",
                "type": "missing-fields",
            }),
            Error::FieldTooLong => json!({
                "success": false,
                "message": "Field too long",
                "type": "field-too-long",
            }),
            Error::TooManyRequests => json!({
                "success": false,
                "message": "Too many requests, try later",
                "type": "rate-limited",
            }),
            Error::MalformedInput => json!({
                "success": false,
                "message": "Invalid submission body",
                "type": "malformed-input",
            }),
            Error::PayloadTooLarge => json!({
                "success": false,
                "message": "Submission too large",
                "type": "payload-too-large",
            }),
        })
        .expect("serializing error response")
    }
}
