//! Request execution shared by every storage call.
//!
//! A request fails on a transport error, then on a non-2xx status, then on a
//! service `error` envelope in the decoded body. Anything else is returned.

use hyper::ext::ReasonPhrase;
use reqwest::{RequestBuilder, Response};
use serde_json::Value;

use crate::{Error, Result, TRACING_TARGET_REQUEST};

/// Sends the request and rejects statuses outside `200..=299`.
///
/// The body of a failed response is left unread.
pub(crate) async fn send(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await?;
    let status = response.status();

    tracing::debug!(
        target: TRACING_TARGET_REQUEST,
        url = %response.url(),
        status = status.as_u16(),
        "Response received"
    );

    if !status.is_success() {
        return Err(Error::status_with_reason(status, reason_phrase(&response)));
    }

    Ok(response)
}

/// Returns the status text sent by the server when it differs from the
/// canonical one.
fn reason_phrase(response: &Response) -> Option<String> {
    let reason = response.extensions().get::<ReasonPhrase>()?;
    std::str::from_utf8(reason.as_bytes()).ok().map(str::to_owned)
}

/// Reads the response body as JSON and checks it for an `error` envelope.
pub(crate) async fn json_body(response: Response) -> Result<Value> {
    let bytes = response.bytes().await?;
    let body = decode_body(&bytes);
    check_envelope(&body)?;
    Ok(body)
}

/// Decodes a response body.
///
/// Empty bodies become `Null`, non-JSON bodies are kept as text.
pub(crate) fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }

    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// Fails if the body is an object carrying an `error` field.
pub(crate) fn check_envelope(body: &Value) -> Result<()> {
    let error = match body.get("error") {
        None | Some(Value::Null | Value::Bool(false)) => return Ok(()),
        Some(error) => error,
    };

    let message = match error.get("message") {
        Some(Value::String(message)) => message.clone(),
        Some(other) => other.to_string(),
        None => match error {
            Value::String(message) => message.clone(),
            other => other.to_string(),
        },
    };

    Err(Error::Service(message))
}
