//! Dot-notation field paths and their expansion into JSON pointers.

use serde_json::Value;

/// One step of a field path, as walked by [`resolve_pointers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PathSegment {
    /// Object property.
    Key(String),
    /// Fan out over every array element.
    ArrayItem,
}

/// Split a field path on `.`; each trailing `[]` on a part adds one level of
/// array fan-out, so `"matrix[][]"` walks into nested arrays.
pub(crate) fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    for part in path.split('.') {
        let key = part.trim_end_matches("[]");
        segments.push(PathSegment::Key(key.to_owned()));
        let depth = (part.len() - key.len()) / 2;
        segments.extend(std::iter::repeat(PathSegment::ArrayItem).take(depth));
    }
    segments
}

/// Follow `segments` through `value` and return an RFC 6901 JSON pointer for
/// every non-null value found at the end of the path.
///
/// Missing properties and type mismatches along the way yield no pointer.
pub(crate) fn resolve_pointers(value: &Value, segments: &[PathSegment]) -> Vec<String> {
    let mut out = Vec::new();
    collect(value, segments, String::new(), &mut out);
    out
}

fn collect(value: &Value, segments: &[PathSegment], pointer: String, out: &mut Vec<String>) {
    let Some((head, rest)) = segments.split_first() else {
        if !value.is_null() {
            out.push(pointer);
        }
        return;
    };

    match head {
        PathSegment::Key(key) => {
            if let Value::Object(map) = value {
                if let Some(child) = map.get(key) {
                    collect(child, rest, format!("{pointer}/{}", escape_token(key)), out);
                }
            }
        }
        PathSegment::ArrayItem => {
            if let Value::Array(items) = value {
                for (i, item) in items.iter().enumerate() {
                    collect(item, rest, format!("{pointer}/{i}"), out);
                }
            }
        }
    }
}

fn escape_token(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}
