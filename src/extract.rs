//! Pulls structured data out of model replies.
//!
//! Models often wrap JSON in a markdown code fence. The fence is stripped when
//! present and the remainder is decoded strictly: no repair, no defaults.

use serde::de::DeserializeOwned;

use crate::error::{Result, ValuesFinderError};
use crate::models::{OptionList, RankedValues};

const FENCE_OPENERS: [&str; 3] = ["```json", "```JSON", "```"];
const FENCE: &str = "```";

/// Remove surrounding whitespace and an optional code fence
pub fn strip_fences(input: &str) -> &str {
    let mut s = input.trim();
    if let Some(opener) = FENCE_OPENERS.iter().find(|o| s.starts_with(**o)) {
        s = &s[opener.len()..];
    }
    if let Some(stripped) = s.strip_suffix(FENCE) {
        s = stripped;
    }
    s.trim()
}

/// Decode a (possibly fenced) reply into `T`
pub fn decode<T: DeserializeOwned>(input: &str) -> Result<T> {
    serde_json::from_str(strip_fences(input))
        .map_err(|e| ValuesFinderError::response_format(e.to_string(), input))
}

/// Parse the `{"options": [...]}` shape
pub fn parse_options(input: &str) -> Result<Vec<String>> {
    let opts: OptionList = decode(input)?;
    if opts.options.is_empty() {
        return Err(ValuesFinderError::response_format(
            "reply contains no options",
            input,
        ));
    }
    Ok(opts.options)
}

/// Parse the `[{"name": .., "description": ..}]` shape
pub fn parse_ranked_values(input: &str) -> Result<RankedValues> {
    let values: RankedValues = decode(input)?;
    if values.is_empty() {
        return Err(ValuesFinderError::response_format(
            "reply contains no ranked values",
            input,
        ));
    }
    Ok(values)
}
