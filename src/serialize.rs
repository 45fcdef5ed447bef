//! Root tag serialization.

use crate::root_tag::RootTag;

/// Serialize a root start tag.
pub fn serialize_tag(tag: &RootTag) -> String {
    let mut out = String::new();
    out.push('<');
    out.push_str(&tag.name);

    for attr in &tag.attributes {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        push_escaped_attr(&mut out, &attr.value);
        out.push('"');
    }

    if tag.self_closing {
        out.push_str("/>");
    } else {
        out.push('>');
    }
    out
}

/// Replace the tag's span in `markup` with its serialized form.
pub fn splice_tag(markup: &str, tag: &RootTag) -> String {
    let serialized = serialize_tag(tag);
    let mut out = String::with_capacity(markup.len() + serialized.len());
    out.push_str(&markup[..tag.span.start]);
    out.push_str(&serialized);
    out.push_str(&markup[tag.span.end..]);
    out
}

// Values are stored as written, so entity references are already escaped.
// Only a double quote from a single-quoted value needs escaping.
fn push_escaped_attr(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
