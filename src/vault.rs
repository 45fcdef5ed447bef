//! Placeholder protection for lexical rewriting.
//!
//! A vault masks substrings with unique tokens before a global rewrite and
//! puts them back afterwards. Tokens are built from a sentinel that does not
//! occur in the text being rewritten, so a token can never be confused with
//! real content.

use std::borrow::Cow;

use regex::{Captures, Regex};

/// A substring taken out of the text by [`PlaceholderVault::protect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedRegion {
    pub index: usize,
    pub original: String,
}

#[derive(Debug)]
pub struct PlaceholderVault {
    sentinel: String,
    tokens: Regex,
    regions: Vec<ProtectedRegion>,
}

impl PlaceholderVault {
    /// Create a vault whose tokens cannot collide with anything in `text`.
    ///
    /// The sentinel is the first free character among the C0 controls (they
    /// are not legal in XML) and then the private use area. If every one of
    /// them occurs, it is a run of U+0001 longer than any run in `text`.
    pub fn for_text(text: &str) -> Self {
        let sentinel = (0x01..=0x08)
            .chain(0x0e..=0x1f)
            .chain(0xe000..=0xf8ff)
            .filter_map(char::from_u32)
            .find(|c| !text.contains(*c))
            .map(String::from)
            .unwrap_or_else(|| "\u{1}".repeat(longest_run(text, '\u{1}') + 1));

        let escaped = regex::escape(&sentinel);
        let tokens = Regex::new(&format!("{escaped}([0-9]+){escaped}"))
            .expect("escaped sentinel is a valid regex");

        Self {
            sentinel,
            tokens,
            regions: Vec::new(),
        }
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    pub fn regions(&self) -> &[ProtectedRegion] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// The token standing in for region `index`.
    pub fn token(&self, index: usize) -> String {
        token(&self.sentinel, index)
    }

    /// Replace every match of `pattern` with a fresh token.
    pub fn protect(&mut self, text: &str, pattern: &Regex) -> String {
        let sentinel = self.sentinel.as_str();
        let regions = &mut self.regions;

        pattern
            .replace_all(text, |caps: &Captures<'_>| {
                let index = regions.len();
                regions.push(ProtectedRegion {
                    index,
                    original: caps[0].to_string(),
                });
                token(sentinel, index)
            })
            .into_owned()
    }

    /// Like [`protect`](Self::protect), but only the named capture `group` is
    /// replaced; the rest of each match stays in the text.
    pub fn protect_group(&mut self, text: &str, pattern: &Regex, group: &str) -> String {
        let sentinel = self.sentinel.as_str();
        let regions = &mut self.regions;

        pattern
            .replace_all(text, |caps: &Captures<'_>| {
                let matched = &caps[0];
                let (Some(whole), Some(inner)) = (caps.get(0), caps.name(group)) else {
                    return matched.to_string();
                };

                let index = regions.len();
                regions.push(ProtectedRegion {
                    index,
                    original: inner.as_str().to_string(),
                });

                let start = inner.start() - whole.start();
                let end = inner.end() - whole.start();
                format!("{}{}{}", &matched[..start], token(sentinel, index), &matched[end..])
            })
            .into_owned()
    }

    /// Put every protected region back.
    ///
    /// A region's original may hold tokens of earlier regions. Those are
    /// resolved first, so the text is scanned once and every token is
    /// replaced exactly once.
    pub fn restore(self, text: &str) -> String {
        let mut expanded: Vec<String> = Vec::with_capacity(self.regions.len());
        for region in &self.regions {
            let original = self.resolve(&region.original, &expanded).into_owned();
            expanded.push(original);
        }

        let restored = self.resolve(text, &expanded).into_owned();
        debug_assert!(!restored.contains(self.sentinel.as_str()));
        restored
    }

    fn resolve<'t>(&self, text: &'t str, expanded: &[String]) -> Cow<'t, str> {
        self.tokens.replace_all(text, |caps: &Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| expanded.get(index))
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
    }
}

fn token(sentinel: &str, index: usize) -> String {
    format!("{sentinel}{index}{sentinel}")
}

fn longest_run(text: &str, c: char) -> usize {
    let mut longest = 0;
    let mut run = 0;
    for ch in text.chars() {
        run = if ch == c { run + 1 } else { 0 };
        longest = longest.max(run);
    }
    longest
}
