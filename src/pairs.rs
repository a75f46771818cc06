//! Split raw flag text into typed key/value pairs, and render them back.
//!
//! `one=true, two=false` becomes `[("one", true), ("two", false)]` with the
//! default separators. Splitting always happens on the *first* key/value
//! separator, so values may contain it.

use std::collections::HashMap;
use std::marker::PhantomData;

use crate::element::MapElement;
use crate::error::FlagError;
use crate::types::MapOptions;

/// Lazily parsed pairs of one flag occurrence.
///
/// Yields pairs in input order and stops being useful at the first error;
/// callers that apply pairs as they go keep whatever was applied before it.
pub struct Pairs<'a, V> {
    segments: std::vec::IntoIter<&'a str>,
    key_value_sep: &'a str,
    _marker: PhantomData<fn() -> V>,
}

/// Parse `raw` with already-resolved `options`.
///
/// Empty input yields no pairs. With `disable_comma_separated_pairs` the
/// whole input is a single pair and is not trimmed; otherwise each segment
/// between pair separators is trimmed of surrounding whitespace, and
/// segments left empty are skipped.
pub fn parse_pairs<'a, V: MapElement>(raw: &'a str, options: &'a MapOptions) -> Pairs<'a, V> {
    debug_assert!(!options.pair_sep.is_empty() && !options.key_value_sep.is_empty());

    let segments: Vec<&str> = if raw.is_empty() {
        Vec::new()
    } else if options.disable_comma_separated_pairs {
        vec![raw]
    } else {
        raw.split(options.pair_sep.as_str())
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .collect()
    };

    Pairs {
        segments: segments.into_iter(),
        key_value_sep: &options.key_value_sep,
        _marker: PhantomData,
    }
}

impl<V: MapElement> Iterator for Pairs<'_, V> {
    type Item = Result<(String, V), FlagError>;

    fn next(&mut self) -> Option<Self::Item> {
        let segment = self.segments.next()?;
        Some(parse_pair(segment, self.key_value_sep))
    }
}

fn parse_pair<V: MapElement>(segment: &str, key_value_sep: &str) -> Result<(String, V), FlagError> {
    let (key, raw) = segment
        .split_once(key_value_sep)
        .ok_or(FlagError::MalformedPair {
            value_type: V::TYPE_NAME,
        })?;
    let value = V::parse_element(raw).map_err(|cause| FlagError::InvalidValue {
        key: key.to_string(),
        raw: raw.to_string(),
        cause,
    })?;
    Ok((key.to_string(), value))
}

/// Render `map` as `k1=v1,k2=v2` using `options`' separators.
///
/// Keys come out sorted so the text is stable between runs.
pub fn render_pairs<V: MapElement>(map: &HashMap<String, V>, options: &MapOptions) -> String {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    keys.iter()
        .map(|key| format!("{key}{}{}", options.key_value_sep, map[*key].render()))
        .collect::<Vec<_>>()
        .join(&options.pair_sep)
}
