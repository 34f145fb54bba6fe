use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::core::models::InboundMessage;
use crate::errors::RelayError;

/// The request body of an API Gateway proxy event, after base64 decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Text(String),
    Json(Value),
}

pub fn get_header_value<'a>(headers: &'a Value, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(name).and_then(|s| s.as_str()) {
        return Some(v);
    }
    headers.as_object().and_then(|map| {
        map.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                v.as_str()
            } else {
                None
            }
        })
    })
}

/// Pulls the body out of a proxy event, honouring `isBase64Encoded`.
///
/// Events without a `body` key are direct invocations; when they carry
/// webhook fields at the top level the event itself is the body.
pub fn extract_body(payload: &Value) -> Result<RequestBody, RelayError> {
    let is_base64 = payload
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    match payload.get("body") {
        None if payload.get("From").is_some() || payload.get("Body").is_some() => {
            Ok(RequestBody::Json(payload.clone()))
        }
        None | Some(Value::Null) => Ok(RequestBody::Empty),
        Some(Value::String(s)) if is_base64 => {
            let bytes = STANDARD
                .decode(s.trim())
                .map_err(|e| RelayError::ParseError(format!("Invalid base64 body: {e}")))?;
            let text = String::from_utf8(bytes)
                .map_err(|e| RelayError::ParseError(format!("Body is not UTF-8: {e}")))?;
            Ok(RequestBody::Text(text))
        }
        Some(Value::String(s)) => Ok(RequestBody::Text(s.clone())),
        Some(other) => Ok(RequestBody::Json(other.clone())),
    }
}

/// Reads `From` and `Body` from a form-encoded or JSON body. Missing fields
/// become empty strings.
#[must_use]
pub fn parse_inbound(body: &RequestBody) -> InboundMessage {
    match body {
        RequestBody::Empty => InboundMessage::new("", ""),
        RequestBody::Json(v) => inbound_from_json(v),
        RequestBody::Text(text) if text.trim_start().starts_with('{') => {
            serde_json::from_str::<Value>(text)
                .map(|v| inbound_from_json(&v))
                .unwrap_or_else(|_| InboundMessage::new("", ""))
        }
        RequestBody::Text(text) => parse_form(text),
    }
}

fn inbound_from_json(v: &Value) -> InboundMessage {
    let field = |name: &str| v.get(name).and_then(Value::as_str).unwrap_or("").to_string();
    InboundMessage::new(field("From"), field("Body"))
}

fn parse_form(form_data: &str) -> InboundMessage {
    let mut from = String::new();
    let mut body = String::new();

    for (key, value) in url::form_urlencoded::parse(form_data.as_bytes()) {
        match key.as_ref() {
            "From" => from = value.into_owned(),
            "Body" => body = value.into_owned(),
            _ => {}
        }
    }

    InboundMessage::new(from, body)
}

/// Parses the Escalate Lambda's JSON body. An absent body is an empty object.
pub fn parse_json_body(body: &RequestBody) -> Result<Value, RelayError> {
    match body {
        RequestBody::Empty => Ok(Value::Object(serde_json::Map::new())),
        RequestBody::Json(v) => Ok(v.clone()),
        RequestBody::Text(text) => serde_json::from_str(text)
            .map_err(|e| RelayError::ParseError(format!("Invalid JSON body: {e}"))),
    }
}
