use thiserror::Error;

use crate::number::MAX_FRACTION_DIGITS;

#[derive(Debug, Error)]
pub enum SvgpadError {
    #[error("fraction digits out of range: {0} (max {MAX_FRACTION_DIGITS})")]
    FractionDigits(u32),

    #[error("malformed attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
