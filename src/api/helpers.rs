//! Response builders for API Gateway proxy responses.
//!
//! Every Lambda response is `{statusCode, headers, body}` with `body` already
//! serialized, which is what API Gateway passes back to the caller.

use chrono::Utc;
use serde_json::{Value, json};

use crate::core::config::ResponseFormat;
use crate::messaging::twiml;

const JSON_CONTENT_TYPE: &str = "application/json";
const XML_CONTENT_TYPE: &str = "application/xml";

/// Returns a JSON response with the given status code and body.
#[must_use]
pub fn json_response(status_code: u16, body: &Value) -> Value {
    json!({
        "statusCode": status_code,
        "headers": { "Content-Type": JSON_CONTENT_TYPE },
        "body": body.to_string()
    })
}

/// Returns a TwiML response with the given status code.
#[must_use]
pub fn xml_response(status_code: u16, xml: String) -> Value {
    json!({
        "statusCode": status_code,
        "headers": { "Content-Type": XML_CONTENT_TYPE },
        "body": xml
    })
}

/// Returns a 200 OK response with `{"message": ...}`.
#[must_use]
pub fn ok_message(message: &str) -> Value {
    json_response(200, &json!({ "message": message }))
}

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status_code: u16, message: &str) -> Value {
    json_response(status_code, &json!({ "error": message }))
}

/// Like [`ok_message`], stamped with the current time.
#[must_use]
pub fn ok_message_at(message: &str) -> Value {
    json_response(
        200,
        &json!({ "message": message, "timestamp": Utc::now().to_rfc3339() }),
    )
}

/// Like [`err_response`], stamped with the current time.
#[must_use]
pub fn err_response_at(status_code: u16, message: &str) -> Value {
    json_response(
        status_code,
        &json!({ "error": message, "timestamp": Utc::now().to_rfc3339() }),
    )
}

/// Acknowledgment for the SMS provider.
///
/// `reply` is texted back to the sender in TwiML mode; `None` sends nothing.
/// `log_message` is the JSON body when no reply is due.
#[must_use]
pub fn ack(format: ResponseFormat, reply: Option<&str>, log_message: &str) -> Value {
    match format {
        ResponseFormat::Twiml => xml_response(
            200,
            reply.map_or_else(twiml::empty_response, twiml::message_response),
        ),
        ResponseFormat::Json => ok_message(reply.unwrap_or(log_message)),
    }
}

/// Failure acknowledgment carrying the apology text.
#[must_use]
pub fn failure(format: ResponseFormat, apology: &str) -> Value {
    match format {
        ResponseFormat::Twiml => xml_response(500, twiml::message_response(apology)),
        ResponseFormat::Json => err_response(500, apology),
    }
}
