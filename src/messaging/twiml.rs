//! TwiML reply markup.

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Escapes text for use inside an XML element.
#[must_use]
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// A `<Response>` that replies to the sender with one message.
#[must_use]
pub fn message_response(message: &str) -> String {
    format!(
        "{XML_DECLARATION}<Response><Message>{}</Message></Response>",
        escape_xml(message)
    )
}

/// A `<Response>` that sends nothing back.
#[must_use]
pub fn empty_response() -> String {
    format!("{XML_DECLARATION}<Response></Response>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_xml(r#"Tom & Jerry's <b>"hours"</b>"#),
            "Tom &amp; Jerry&apos;s &lt;b&gt;&quot;hours&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(escape_xml("Open 8-11 daily"), "Open 8-11 daily");
    }

    #[test]
    fn message_response_wraps_escaped_text() {
        let xml = message_response("A & B");
        assert!(xml.starts_with("<?xml"));
        assert!(xml.ends_with("<Response><Message>A &amp; B</Message></Response>"));
    }

    #[test]
    fn empty_response_has_no_message() {
        assert!(!empty_response().contains("<Message>"));
    }
}
