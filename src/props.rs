use std::collections::HashMap;

use winnow::prelude::*;
use winnow::ascii::space0;
use winnow::combinator::{opt, preceded, separated};
use winnow::token::take_while;

/// Parse a bracketed `key: value` list, delimiters included.
///
/// Blank input or input that fails to parse yields an empty map. Unknown
/// keys pass through untouched; a segment without a colon maps its key to
/// an empty value.
pub fn parse_properties(raw: &str) -> HashMap<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return HashMap::new();
    }
    property_block.parse(trimmed).unwrap_or_default()
}

pub(crate) fn property_block(input: &mut &str) -> winnow::Result<HashMap<String, String>> {
    "[".parse_next(input)?;
    let pairs: Vec<(String, String)> =
        separated(0.., property_pair, (",", space0)).parse_next(input)?;
    "]".parse_next(input)?;
    Ok(pairs.into_iter().collect())
}

fn property_pair(input: &mut &str) -> winnow::Result<(String, String)> {
    let key = take_while(1.., |c: char| c != ':' && c != ',' && c != ']').parse_next(input)?;
    // Only the first colon separates key from value; later colons belong to
    // the value.
    let value =
        opt(preceded(":", take_while(0.., |c: char| c != ',' && c != ']'))).parse_next(input)?;
    Ok((
        key.trim().to_string(),
        value.unwrap_or("").trim().to_string(),
    ))
}
