// Path-addressed traversal and rewriting over `serde_json::Value` trees.
//
// Every operation here takes the root it is allowed to touch. Scoped callers
// (schema cleaning, envelope stamping) hand in the smallest subtree they own,
// so nothing outside it can be visited, renamed or removed.

use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{}", k),
            PathSegment::Index(i) => write!(f, "{}", i),
        }
    }
}

/// Location of a node relative to the root handed to the walker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_keys(keys: &[&str]) -> Self {
        Self {
            segments: keys
                .iter()
                .map(|k| PathSegment::Key((*k).to_string()))
                .collect(),
        }
    }

    /// Parses a dot path such as `tools.0.functionDeclarations.1`. Purely
    /// numeric segments are treated as array indices.
    pub fn parse(path: &str) -> Self {
        if path.is_empty() {
            return Self::root();
        }
        let segments = path
            .split('.')
            .map(|seg| match seg.parse::<usize>() {
                Ok(i) => PathSegment::Index(i),
                Err(_) => PathSegment::Key(seg.to_string()),
            })
            .collect();
        Self { segments }
    }

    pub fn key(mut self, key: &str) -> Self {
        self.segments.push(PathSegment::Key(key.to_string()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(PathSegment::Index(index));
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last_key(&self) -> Option<&str> {
        match self.segments.last() {
            Some(PathSegment::Key(k)) => Some(k.as_str()),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<JsonPath> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn starts_with(&self, prefix: &JsonPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Same location with the final key replaced.
    pub fn with_last_key(&self, new_key: &str) -> Option<JsonPath> {
        let mut out = self.parent()?;
        out.segments.push(PathSegment::Key(new_key.to_string()));
        Some(out)
    }

    fn push(&mut self, seg: PathSegment) {
        self.segments.push(seg);
    }

    fn pop(&mut self) {
        self.segments.pop();
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

/// Every path under `root` whose final key is `key`, in document order.
/// Subtrees rooted at any of `opaque` are not descended into.
pub fn walk(root: &Value, key: &str, opaque: &[JsonPath]) -> Vec<JsonPath> {
    walk_matching(root, |k| k == key, opaque)
}

/// Single-pass variant of [`walk`] for a set of keys chosen by predicate.
pub fn walk_matching<F>(root: &Value, matches: F, opaque: &[JsonPath]) -> Vec<JsonPath>
where
    F: Fn(&str) -> bool,
{
    let mut found = Vec::new();
    let mut cursor = JsonPath::root();
    let opaque_depth = opaque.iter().map(JsonPath::len).max().unwrap_or(0);
    visit(root, &mut cursor, &matches, opaque, opaque_depth, &mut found);
    found
}

fn visit<F>(
    node: &Value,
    cursor: &mut JsonPath,
    matches: &F,
    opaque: &[JsonPath],
    opaque_depth: usize,
    found: &mut Vec<JsonPath>,
) where
    F: Fn(&str) -> bool,
{
    if cursor.len() <= opaque_depth && opaque.iter().any(|p| p == cursor) {
        return;
    }
    match node {
        Value::Object(map) => {
            for (k, child) in map {
                cursor.push(PathSegment::Key(k.clone()));
                if matches(k) {
                    found.push(cursor.clone());
                }
                visit(child, cursor, matches, opaque, opaque_depth, found);
                cursor.pop();
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                cursor.push(PathSegment::Index(i));
                visit(child, cursor, matches, opaque, opaque_depth, found);
                cursor.pop();
            }
        }
        _ => {}
    }
}

pub fn get<'a>(root: &'a Value, path: &JsonPath) -> Option<&'a Value> {
    let mut node = root;
    for seg in path.segments() {
        node = match seg {
            PathSegment::Key(k) => node.as_object()?.get(k)?,
            PathSegment::Index(i) => node.as_array()?.get(*i)?,
        };
    }
    Some(node)
}

pub fn get_mut<'a>(root: &'a mut Value, path: &JsonPath) -> Option<&'a mut Value> {
    let mut node = root;
    for seg in path.segments() {
        node = match seg {
            PathSegment::Key(k) => node.as_object_mut()?.get_mut(k)?,
            PathSegment::Index(i) => node.as_array_mut()?.get_mut(*i)?,
        };
    }
    Some(node)
}

/// Moves the value at `path` to the sibling key `new_name`. Returns `false`
/// without touching anything when the source is missing, the path does not
/// end in an object key, or `new_name` is already taken.
pub fn rename_key_at(root: &mut Value, path: &JsonPath, new_name: &str) -> bool {
    let Some(old_name) = path.last_key() else {
        return false;
    };
    if old_name == new_name {
        return false;
    }
    let Some(parent) = path.parent() else {
        return false;
    };
    let Some(obj) = get_mut(root, &parent).and_then(Value::as_object_mut) else {
        return false;
    };
    if obj.contains_key(new_name) {
        tracing::debug!(
            "[Json-Tree] Rename {} -> {} skipped: target already present",
            path,
            new_name
        );
        return false;
    }
    match obj.remove(old_name) {
        Some(value) => {
            obj.insert(new_name.to_string(), value);
            true
        }
        None => false,
    }
}

/// Removes the object key at `path`, returning the removed value.
pub fn delete_at(root: &mut Value, path: &JsonPath) -> Option<Value> {
    let key = path.last_key()?;
    let parent = path.parent()?;
    get_mut(root, &parent)?.as_object_mut()?.remove(key)
}

/// Inserts `value` at `path`. The parent must already exist and be an object.
pub fn set_at(root: &mut Value, path: &JsonPath, value: Value) -> bool {
    let (Some(key), Some(parent)) = (path.last_key(), path.parent()) else {
        return false;
    };
    match get_mut(root, &parent).and_then(Value::as_object_mut) {
        Some(obj) => {
            obj.insert(key.to_string(), value);
            true
        }
        None => false,
    }
}
