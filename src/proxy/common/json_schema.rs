use super::json_tree::{self, JsonPath, PathSegment};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Keywords the Gemini function-declaration schema does not understand.
const GEMINI_STRIP_KEYS: &[&str] = &[
    "$schema",
    "$id",
    "$ref",
    "$defs",
    "$comment",
    "definitions",
    "additionalProperties",
    "patternProperties",
    "propertyNames",
    "dependencies",
    "format",
    "pattern",
    "default",
    "examples",
    "deprecated",
    "readOnly",
    "writeOnly",
];

// Extra keywords rejected by the Antigravity bridge (Claude and gemini-3-pro-high).
const ANTIGRAVITY_EXTRA_STRIP_KEYS: &[&str] = &[
    "title",
    "const",
    "minLength",
    "maxLength",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    "minItems",
    "maxItems",
    "uniqueItems",
    "minProperties",
    "maxProperties",
    "contentEncoding",
    "contentMediaType",
    "if",
    "then",
    "else",
    "not",
];

// Keywords whose object value maps user-chosen names to sub-schemas.
const NAMED_SCHEMA_MAPS: &[&str] = &["properties", "patternProperties", "definitions", "$defs"];

// Keywords whose value is literal instance data, never a schema.
const LITERAL_VALUE_KEYS: &[&str] = &["enum", "const", "default", "examples", "required"];

pub const VENDOR_SCHEMA_KEY: &str = "parametersJsonSchema";
pub const SCHEMA_KEY: &str = "parameters";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaProfile {
    Gemini,
    Antigravity,
}

impl SchemaProfile {
    pub fn strips(self, key: &str) -> bool {
        GEMINI_STRIP_KEYS.contains(&key)
            || (self == SchemaProfile::Antigravity && ANTIGRAVITY_EXTRA_STRIP_KEYS.contains(&key))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaProfile::Gemini => "gemini",
            SchemaProfile::Antigravity => "antigravity",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub renamed: usize,
    pub stripped: usize,
}

/// Cleans a `tools` array (Gemini `functionDeclarations` layout). Must be
/// called with the tools subtree only; conversation payloads never reach here.
pub fn clean_tools(tools: &mut Value, profile: SchemaProfile) -> CleanStats {
    let renamed = rename_vendor_schema_keys(tools);
    let mut stripped = 0;

    if let Some(tools_arr) = tools.as_array_mut() {
        for tool in tools_arr {
            let Some(decls) = tool
                .get_mut("functionDeclarations")
                .and_then(Value::as_array_mut)
            else {
                continue;
            };
            for decl in decls {
                if let Some(params) = decl.get_mut(SCHEMA_KEY) {
                    stripped += clean_json_schema(params, profile);
                }
            }
        }
    }

    if renamed > 0 || stripped > 0 {
        tracing::debug!(
            "[Schema-Clean] profile={} renamed={} stripped={}",
            profile.as_str(),
            renamed,
            stripped
        );
    }
    CleanStats { renamed, stripped }
}

/// Renames every `parametersJsonSchema` key under `tools` to `parameters`,
/// leaving property names alone. Deepest paths go first so an outer rename
/// never invalidates an inner path.
pub fn rename_vendor_schema_keys(tools: &mut Value) -> usize {
    let mut paths: Vec<JsonPath> = json_tree::walk(tools, VENDOR_SCHEMA_KEY, &[])
        .into_iter()
        .filter(is_keyword_position)
        .collect();
    paths.sort_by_key(|p| std::cmp::Reverse(p.len()));

    paths
        .iter()
        .filter(|p| json_tree::rename_key_at(tools, p, SCHEMA_KEY))
        .count()
}

/// Strips the profile's unsupported keywords from one parameter schema.
/// Returns the number of keys removed.
pub fn clean_json_schema(schema: &mut Value, profile: SchemaProfile) -> usize {
    if profile == SchemaProfile::Antigravity {
        lift_const_to_enum(schema);
        flatten_nullable_types(schema);
    }

    let mut paths: Vec<JsonPath> = json_tree::walk_matching(schema, |k| profile.strips(k), &[])
        .into_iter()
        .filter(is_keyword_position)
        .collect();
    paths.sort_by_key(|p| std::cmp::Reverse(p.len()));

    paths
        .iter()
        .filter(|p| json_tree::delete_at(schema, p).is_some())
        .count()
}

// A key is a schema keyword unless it sits directly inside a named-schema map
// such as `properties`, where keys are caller-chosen names, or anywhere below
// a literal value such as an `enum` member.
fn is_keyword_position(path: &JsonPath) -> bool {
    let segments = path.segments();
    let Some((_, ancestors)) = segments.split_last() else {
        return false;
    };
    let mut name_slot = false;
    for seg in ancestors {
        name_slot = match seg {
            PathSegment::Key(k) if !name_slot => {
                if LITERAL_VALUE_KEYS.contains(&k.as_str()) {
                    return false;
                }
                NAMED_SCHEMA_MAPS.contains(&k.as_str())
            }
            _ => false,
        };
    }
    !name_slot
}

fn lift_const_to_enum(schema: &mut Value) {
    let paths: Vec<JsonPath> = json_tree::walk(schema, "const", &[])
        .into_iter()
        .filter(is_keyword_position)
        .collect();
    for path in paths {
        let Some(parent) = path.parent() else {
            continue;
        };
        let Some(obj) = json_tree::get_mut(schema, &parent).and_then(Value::as_object_mut) else {
            continue;
        };
        if obj.contains_key("enum") {
            continue;
        }
        if let Some(value) = obj.get("const").cloned() {
            obj.insert("enum".to_string(), Value::Array(vec![value]));
        }
    }
}

// `"type": ["string", "null"]` becomes `"type": "string"`.
fn flatten_nullable_types(schema: &mut Value) {
    let paths: Vec<JsonPath> = json_tree::walk(schema, "type", &[])
        .into_iter()
        .filter(is_keyword_position)
        .collect();
    for path in paths {
        let Some(node) = json_tree::get_mut(schema, &path) else {
            continue;
        };
        let Some(types) = node.as_array() else {
            continue;
        };
        let chosen = types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null")
            .unwrap_or("string")
            .to_string();
        *node = Value::String(chosen);
    }
}
