//! Field lookup by dot / bracket path, e.g. `stats.height` or `points[0].x`.

use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq)]
enum Segment<'a> {
    Key(&'a str),
    Index(&'a str),
}

fn segments(path: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = path;
    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix('[') {
            let Some(end) = tail.find(']') else {
                out.push(Segment::Key(rest));
                break;
            };
            let inner = tail[..end].trim();
            let unquoted = inner
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .or_else(|| inner.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')));
            out.push(match unquoted {
                Some(key) => Segment::Key(key),
                None => Segment::Index(inner),
            });
            rest = &tail[end + 1..];
        } else if let Some(tail) = rest.strip_prefix('.') {
            rest = tail;
        } else {
            let end = rest.find(['.', '[']).unwrap_or(rest.len());
            out.push(Segment::Key(&rest[..end]));
            rest = &rest[end..];
        }
    }
    out
}

fn step<'v>(value: &'v JsonValue, segment: &Segment<'_>) -> Option<&'v JsonValue> {
    match (value, segment) {
        (JsonValue::Object(map), Segment::Key(key) | Segment::Index(key)) => map.get(*key),
        (JsonValue::Array(items), Segment::Key(index) | Segment::Index(index)) => {
            items.get(index.parse::<usize>().ok()?)
        }
        _ => None,
    }
}

/// Looks up `path` in `record`. A key containing dots that exists verbatim
/// takes precedence over the nested lookup; anything absent yields `None`.
pub fn get_path<'v>(record: &'v JsonValue, path: &str) -> Option<&'v JsonValue> {
    if let Some(value) = record.as_object().and_then(|map| map.get(path)) {
        return Some(value);
    }
    segments(path)
        .iter()
        .try_fold(record, |value, segment| step(value, segment))
}
