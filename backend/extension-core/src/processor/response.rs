use crate::catalog::ErrorCode;

use common::HttpStatusCode;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;

/// Outbound envelope handed back to the platform.
///
/// Success serializes as `{"statusCode": ..., "body": [...]}`, failure as
/// `{"statusCode": ..., "errorCode": ..., "detail": "..."}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status_code: HttpStatusCode,
    pub body: Vec<Value>,
    pub error: Option<ResponseError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseError {
    pub error_code: ErrorCode,
    pub detail: String,
}

impl Response {
    pub fn success(status_code: HttpStatusCode, body: Vec<Value>) -> Self {
        Self {
            status_code,
            body,
            error: None,
        }
    }

    pub fn failure(
        status_code: HttpStatusCode,
        error_code: ErrorCode,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            status_code,
            body: Vec::new(),
            error: Some(ResponseError {
                error_code,
                detail: detail.into(),
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error.as_ref().map(|error| error.error_code)
    }

    pub fn detail(&self) -> Option<&str> {
        self.error.as_ref().map(|error| error.detail.as_str())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Response", 3)?;
        state.serialize_field("statusCode", &self.status_code)?;
        match &self.error {
            None => state.serialize_field("body", &self.body)?,
            Some(error) => {
                state.serialize_field("errorCode", &error.error_code)?;
                state.serialize_field("detail", &error.detail)?;
            }
        }
        state.end()
    }
}
