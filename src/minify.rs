//! Text-level minification passes.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::Options;
use crate::error::SvgpadError;
use crate::number::{self, MAX_FRACTION_DIGITS};
use crate::vault::PlaceholderVault;

/// Protection patterns compiled from one set of [`Options`].
#[derive(Debug, Clone)]
pub struct Minifier {
    attribute_values: Option<Regex>,
    opaque_blocks: Vec<Regex>,
}

impl Minifier {
    pub fn new(options: &Options) -> Result<Self, SvgpadError> {
        let attribute_values = if options.protected_attributes.is_empty() {
            None
        } else {
            let names = options
                .protected_attributes
                .iter()
                .map(|name| regex::escape(name))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(
                r#"(?i)\s(?:{names})\s*=\s*(?P<value>"[^"]*"|'[^']*')"#
            ))?)
        };

        let opaque_blocks = options
            .opaque_elements
            .iter()
            .map(|name| {
                let name = regex::escape(name);
                Regex::new(&format!(r"(?is)<{name}\b.*?</{name}\s*>"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            attribute_values,
            opaque_blocks,
        })
    }

    /// Minify `svg`, rounding decimal literals to `precision` digits if given.
    ///
    /// Never fails: a rounding problem only skips the rounding pass.
    pub fn minify(&self, svg: &str, precision: Option<u32>) -> String {
        let text = remove_comments(svg);

        let mut vault = PlaceholderVault::for_text(&text);

        // Protected attribute values keep their exact bytes through every pass.
        let text = match &self.attribute_values {
            Some(pattern) => vault.protect_group(&text, pattern, "value"),
            None => text,
        };

        let text = remove_line_breaks(&text);
        let text = collapse_between_tags(&text);
        let mut text = collapse_spaces(&text);

        for pattern in &self.opaque_blocks {
            text = vault.protect(&text, pattern);
        }

        if let Some(digits) = precision {
            match round_decimals(&text, digits) {
                Ok(rounded) => text = rounded,
                Err(e) => warn!(%e, "skipping decimal rounding"),
            }
        }

        let protected = vault.len();
        let text = vault.restore(&text);
        let out = text.trim().to_string();

        debug!(
            input = svg.len(),
            output = out.len(),
            protected,
            "minified svg"
        );
        out
    }
}

/// Remove `<!-- ... -->` comments, including multi-line ones.
fn remove_comments(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
    re.replace_all(text, "").into_owned()
}

/// Drop every line break outright.
fn remove_line_breaks(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"[\r\n]+").expect("valid regex"));
    re.replace_all(text, "").into_owned()
}

/// Remove whitespace between a closing `>` and the next `<`.
fn collapse_between_tags(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r">\s+<").expect("valid regex"));
    re.replace_all(text, "><").into_owned()
}

/// Tabs become spaces, then runs of spaces become one.
fn collapse_spaces(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r" {2,}").expect("valid regex"));
    re.replace_all(&text.replace('\t', " "), " ").into_owned()
}

/// Round every decimal literal that is not the mantissa of an exponent form.
fn round_decimals(text: &str, digits: u32) -> Result<String, SvgpadError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"[-+]?[0-9]+\.[0-9]+").expect("valid regex"));

    if digits > MAX_FRACTION_DIGITS {
        return Err(SvgpadError::FractionDigits(digits));
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for m in re.find_iter(text) {
        out.push_str(&text[last..m.start()]);
        let literal = m.as_str();

        if matches!(text[m.end()..].chars().next(), Some('e' | 'E')) {
            out.push_str(literal);
        } else {
            match round_literal(literal, digits) {
                Some(rounded) => out.push_str(&rounded),
                None => out.push_str(literal),
            }
        }
        last = m.end();
    }

    out.push_str(&text[last..]);
    Ok(out)
}

fn round_literal(literal: &str, digits: u32) -> Option<String> {
    let value: f64 = literal.parse().ok()?;
    let rounded: f64 = number::fixed(value, digits as usize).parse().ok()?;
    Some(number::shortest(rounded))
}
