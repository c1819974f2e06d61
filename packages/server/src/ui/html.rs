//! HTML fragments returned to the htmx front end.

use std::fmt::Write;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::domain::ChatMessage;

/// Escape text for use in element content and single/double quoted attributes.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// URL path segment: everything except RFC 3986 unreserved characters is encoded.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// `<li>` per tag, each with an htmx delete button.
pub fn tag_list(tags: &[String]) -> String {
    let mut html = String::new();
    for tag in tags {
        let _ = write!(
            html,
            "<li>{}\n\
             <button class='btn-del' hx-delete='/tags/{}' hx-target='closest li' \
             hx-swap='outerHTML' hx-confirm='Вы действительно хотите удалить тэг?'>\
             Удалить</button>\n\
             </li>\n",
            escape(tag),
            escape(&utf8_percent_encode(tag, PATH_SEGMENT).to_string())
        );
    }
    html
}

/// Search hits as message cards.
pub fn message_list(messages: &[ChatMessage]) -> String {
    let mut html = String::new();
    for message in messages {
        let _ = write!(
            html,
            "<div class=\"message\">\n\
             <div class=\"messageTag\">{}</div>\n\
             <div class=\"messageText\">{}</div>\n\
             </div>\n",
            escape(message.tag.as_str()),
            escape(&message.content)
        );
    }
    html
}
