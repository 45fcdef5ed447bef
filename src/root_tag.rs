//! Locating and tokenizing the root `<svg>` start tag.
//!
//! Only the start tag is ever read; the rest of the document is skipped over
//! lexically, so half-typed markup after the root tag does not matter.

use std::ops::Range;

use quick_xml::events::BytesStart;

use crate::error::SvgpadError;

/// An attribute of the root tag, with its value exactly as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAttribute {
    pub name: String,
    pub value: String,
}

/// The root start tag as a small editable record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootTag {
    /// Byte range of the tag (`<` through `>`) in the markup it was read from
    pub span: Range<usize>,
    /// Element name with optional prefix (e.g., "svg", "svg:svg")
    pub name: String,
    pub attributes: Vec<TagAttribute>,
    pub self_closing: bool,
}

impl RootTag {
    /// Find and tokenize the first `svg` start tag in `markup`.
    ///
    /// `Ok(None)` means there is no complete `svg` start tag.
    pub fn locate(markup: &str) -> Result<Option<Self>, SvgpadError> {
        let mut scanner = TagScanner::new(markup);
        match scanner.find_svg() {
            Some(span) => Self::parse(markup, span).map(Some),
            None => Ok(None),
        }
    }

    fn parse(markup: &str, span: Range<usize>) -> Result<Self, SvgpadError> {
        let mut content = &markup[span.start + 1..span.end - 1];
        let mut self_closing = false;
        if let Some(stripped) = content.trim_end().strip_suffix('/') {
            content = stripped;
            self_closing = true;
        }

        let name = tag_name(content).to_string();
        let start = BytesStart::from_content(content, name.len());

        let mut attributes = Vec::new();
        let mut iter = start.html_attributes();
        iter.with_checks(false);
        for attr in iter {
            let attr = attr?;
            attributes.push(TagAttribute {
                name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                value: String::from_utf8_lossy(&attr.value).into_owned(),
            });
        }

        Ok(Self {
            span,
            name,
            attributes,
            self_closing,
        })
    }

    /// Get an attribute value by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing the first one with the same name in place.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(name))
        {
            Some(attr) => {
                attr.name = name.to_string();
                attr.value = value;
            }
            None => self.attributes.push(TagAttribute {
                name: name.to_string(),
                value,
            }),
        }
    }

    /// Remove every attribute with this name, ignoring ASCII case.
    pub fn remove(&mut self, name: &str) {
        self.attributes.retain(|a| !a.name.eq_ignore_ascii_case(name));
    }
}

fn tag_name(content: &str) -> &str {
    let end = content
        .find(|c: char| c.is_ascii_whitespace() || c == '/' || c == '>')
        .unwrap_or(content.len());
    &content[..end]
}

fn is_svg(name: &str) -> bool {
    let local = name.rsplit(':').next().unwrap_or(name);
    local.eq_ignore_ascii_case("svg")
}

struct TagScanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TagScanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Byte range of the first `svg` start tag, skipping comments, CDATA,
    /// processing instructions, declarations and end tags.
    fn find_svg(&mut self) -> Option<Range<usize>> {
        while let Some(offset) = self.input[self.pos..].find('<') {
            let start = self.pos + offset;
            let rest = &self.input[start..];

            if rest.starts_with("<!--") {
                self.skip_past(start, "-->")?;
            } else if rest.starts_with("<![CDATA[") {
                self.skip_past(start, "]]>")?;
            } else if rest.starts_with("<?") {
                self.skip_past(start, "?>")?;
            } else if rest.starts_with("<!") || rest.starts_with("</") {
                self.skip_past(start, ">")?;
            } else if rest[1..].starts_with(|c: char| c.is_alphabetic() || c == '_' || c == ':') {
                let end = self.tag_end(start + 1)?;
                if is_svg(tag_name(&self.input[start + 1..end])) {
                    return Some(start..end);
                }
                self.pos = end;
            } else {
                // A stray `<` in text
                self.pos = start + 1;
            }
        }
        None
    }

    fn skip_past(&mut self, from: usize, terminator: &str) -> Option<()> {
        let found = self.input[from..].find(terminator)?;
        self.pos = from + found + terminator.len();
        Some(())
    }

    /// Position just past the `>` that closes a tag; quoted values may contain `>`.
    fn tag_end(&self, from: usize) -> Option<usize> {
        let mut quote = None;
        for (i, c) in self.input[from..].char_indices() {
            match quote {
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None if c == '"' || c == '\'' => quote = Some(c),
                None if c == '>' => return Some(from + i + 1),
                None => {}
            }
        }
        None
    }
}
