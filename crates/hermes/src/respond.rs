//! Handler return-value rendering.

use hermes_core::{HermesResult, Response};
use http::StatusCode;
use serde::Serialize;

/// Converts a handler's return value into a [`Response`].
///
/// Handlers return whatever is convenient (a serializable value wrapped in
/// [`Json`], a bare status, a prebuilt response) and the dispatcher renders
/// it uniformly. Serialization failure propagates as an internal error.
pub trait IntoResponse {
    /// Renders the value as a response.
    ///
    /// # Errors
    ///
    /// Returns an internal error when the value cannot be serialized.
    fn into_response(self) -> HermesResult<Response>;
}

/// A value serialized as a JSON body with status 200, or the paired status
/// when used in a `(StatusCode, Json<T>)` tuple.
#[derive(Debug, Clone, Copy)]
pub struct Json<T>(pub T);

impl IntoResponse for Response {
    fn into_response(self) -> HermesResult<Response> {
        Ok(self)
    }
}

impl IntoResponse for StatusCode {
    fn into_response(self) -> HermesResult<Response> {
        Ok(Response::new(self))
    }
}

impl IntoResponse for serde_json::Value {
    fn into_response(self) -> HermesResult<Response> {
        Ok(Response::json_value(StatusCode::OK, &self))
    }
}

impl IntoResponse for (StatusCode, serde_json::Value) {
    fn into_response(self) -> HermesResult<Response> {
        Ok(Response::json_value(self.0, &self.1))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> HermesResult<Response> {
        Response::json(StatusCode::OK, &self.0)
    }
}

impl<T: Serialize> IntoResponse for (StatusCode, Json<T>) {
    fn into_response(self) -> HermesResult<Response> {
        Response::json(self.0, &self.1 .0)
    }
}

impl IntoResponse for String {
    fn into_response(self) -> HermesResult<Response> {
        Ok(Response::text(StatusCode::OK, self))
    }
}
