//! Location codec: `Location` ⇄ `/seg/seg?key=value&list[]=a`.

use std::collections::BTreeMap;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::{Location, SearchValue};

/// Everything except RFC 3986 unreserved characters gets encoded.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const LIST_SUFFIX: &str = "[]";

/// Serializes `new` on top of `previous`.
///
/// Query parameters are the union of both locations with `new` winning;
/// keys whose merged value is `None` are dropped. The pathname comes from
/// `new` alone.
pub fn serialize(new: &Location, previous: &Location) -> String {
    let mut merged: BTreeMap<&str, &Option<SearchValue>> = previous
        .search
        .iter()
        .map(|(key, value)| (key.as_str(), value))
        .collect();
    for (key, value) in &new.search {
        merged.insert(key.as_str(), value);
    }

    let mut out = String::from("/");
    let segments: Vec<String> = new
        .pathname
        .iter()
        .filter(|segment| !segment.is_empty())
        .map(|segment| encode(segment))
        .collect();
    out.push_str(&segments.join("/"));

    let mut pairs = Vec::new();
    for (key, value) in merged {
        let Some(value) = value else {
            continue;
        };
        match value {
            SearchValue::List(items) => {
                for item in items {
                    pairs.push(format!("{}{}={}", encode(key), LIST_SUFFIX, encode(item)));
                }
            }
            scalar => {
                if let Some(text) = scalar.as_text() {
                    pairs.push(format!("{}={}", encode(key), encode(&text)));
                }
            }
        }
    }

    if !pairs.is_empty() {
        out.push('?');
        out.push_str(&pairs.join("&"));
    }
    out
}

/// Parses a serialized location.
///
/// Never fails: malformed escapes are decoded best-effort. Every search
/// value comes back as text (or a list of text); a key without `=` reads
/// as an empty string.
pub fn deserialize(serialized: &str) -> Location {
    let without_fragment = serialized.split('#').next().unwrap_or_default();
    let (path, query) = match without_fragment.split_once('?') {
        Some((path, query)) => (path, query),
        None => (without_fragment, ""),
    };

    let pathname = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(decode)
        .filter(|segment| !segment.is_empty())
        .collect();

    let mut search: BTreeMap<String, Option<SearchValue>> = BTreeMap::new();
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        // Only a literal suffix marks a list; an encoded one is part of the key.
        let (raw_key, is_list) = match raw_key.strip_suffix(LIST_SUFFIX) {
            Some(list_key) => (list_key, true),
            None => (raw_key, false),
        };
        let key = decode(&raw_key.replace('+', " "));
        let value = decode(&raw_value.replace('+', " "));

        if is_list {
            let entry = search
                .entry(key)
                .or_insert_with(|| Some(SearchValue::List(Vec::new())));
            match entry {
                Some(SearchValue::List(items)) => items.push(value),
                other => *other = Some(SearchValue::List(vec![value])),
            }
        } else {
            search.insert(key, Some(SearchValue::Text(value)));
        }
    }

    Location {
        pathname,
        search,
        options: Default::default(),
    }
}

fn encode(raw: &str) -> String {
    utf8_percent_encode(raw, COMPONENT).to_string()
}

fn decode(raw: &str) -> String {
    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => {
            tracing::warn!(component = %raw, "Percent-decoding failed, decoding in chunks");
            decode_chunked(raw)
        }
    }
}

/// Decodes each run of consecutive escapes on its own, keeping runs that
/// are not valid UTF-8 verbatim.
fn decode_chunked(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let run_len = escape_run_len(tail);
        if run_len == 0 {
            out.push('%');
            rest = &tail[1..];
            continue;
        }

        let run = &tail[..run_len];
        match percent_decode_str(run).decode_utf8() {
            Ok(decoded) => out.push_str(&decoded),
            Err(_) => out.push_str(run),
        }
        rest = &tail[run_len..];
    }

    out.push_str(rest);
    out
}

/// Length of the `%XX%XX...` prefix of `s`.
fn escape_run_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut len = 0;
    while bytes.get(len) == Some(&b'%')
        && bytes.get(len + 1).is_some_and(u8::is_ascii_hexdigit)
        && bytes.get(len + 2).is_some_and(u8::is_ascii_hexdigit)
    {
        len += 3;
    }
    len
}
