//! Query string override merging.
//!
//! Untouched parameters keep their original encoding byte-for-byte; only the
//! parameters named by an override are (re-)encoded, as
//! `application/x-www-form-urlencoded`. When any override applies, the pairs
//! are ordered by decoded key.

use std::borrow::Cow;
use std::collections::BTreeMap;
use url::form_urlencoded;

/// Merge `overrides` into `raw`, returning the new query (without `?`).
///
/// `None` means the target carries no query at all.
pub fn apply_query_overrides(
    raw: Option<&str>,
    overrides: &BTreeMap<String, String>,
) -> Option<String> {
    if overrides.is_empty() {
        return raw.map(str::to_string);
    }

    let mut pairs: Vec<(Cow<'_, str>, String)> = raw
        .unwrap_or_default()
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| (decoded_key(segment), segment.to_string()))
        .filter(|(key, _)| !overrides.contains_key(&**key))
        .collect();

    for (key, value) in overrides {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .append_pair(key, value)
            .finish();
        pairs.push((Cow::Borrowed(key.as_str()), encoded));
    }

    // Stable: repeated untouched keys keep their relative order.
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let query = pairs
        .into_iter()
        .map(|(_, segment)| segment)
        .collect::<Vec<_>>()
        .join("&");
    Some(query)
}

/// Decode the key of one `key=value` segment.
fn decoded_key(segment: &str) -> Cow<'_, str> {
    let key = segment.split_once('=').map_or(segment, |(key, _)| key);
    form_urlencoded::parse(key.as_bytes())
        .next()
        .map(|(key, _)| Cow::Owned(key.into_owned()))
        .unwrap_or(Cow::Borrowed(key))
}
