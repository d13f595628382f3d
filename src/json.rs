//! Template objects as JSON: field names `tag`, `attributes` (also
//! accepted as `attrs` or `properties`), `body` (also accepted as
//! `children`), `comment`, and `template` + `params` for template
//! references. No envelope.

use kstring::KString;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value as Json};

use crate::{error::TemplateError,
            node::{Attributes, Body, ElementNode, TemplateNode, TemplateRef},
            value::Value};

/// Keys that make an object an element (or fragment).
const ELEMENT_FIELDS: &[&str] = &[
    "tag", "body", "children", "attributes", "attrs", "properties", "comment",
];

const ATTRIBUTES_KEYS: &[&str] = &["attributes", "properties", "attrs"];
const BODY_KEYS: &[&str] = &["body", "children"];

type JResult<T> = std::result::Result<T, TemplateError>;

fn json_type_name(v: &Json) -> &'static str {
    match v {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

/// Append `key` to a JSON pointer path.
fn subpath(path: &str, key: &str) -> String {
    format!("{path}/{}", key.replace('~', "~0").replace('/', "~1"))
}

fn first_present<'m>(map: &'m Map<String, Json>, keys: &[&'static str])
                     -> Option<(&'static str, &'m Json)> {
    keys.iter().find_map(|k| map.get(*k).map(|v| (*k, v)))
}

fn string_field(map: &Map<String, Json>, key: &str, path: &str) -> JResult<Option<KString>> {
    match map.get(key) {
        None => Ok(None),
        Some(Json::String(s)) => Ok(Some(KString::from_ref(s))),
        Some(other) => Err(TemplateError::invalid(
            &subpath(path, key),
            format!("expected a string, got {}", json_type_name(other)))),
    }
}

fn attributes_from_json(v: &Json, path: &str) -> JResult<Attributes> {
    let map = match v {
        Json::Object(map) => map,
        other => return Err(TemplateError::invalid(
            path, format!("expected an object, got {}", json_type_name(other)))),
    };
    let mut atts = Attributes::new();
    for (key, val) in map {
        let val = match val {
            Json::String(s) => KString::from_ref(s),
            Json::Number(n) => KString::from_string(n.to_string()),
            Json::Bool(b) => KString::from_string(b.to_string()),
            other => return Err(TemplateError::invalid(
                &subpath(path, key),
                format!("attribute values must be strings, numbers or booleans, got {}",
                        json_type_name(other)))),
        };
        atts.set(KString::from_ref(key), Value::Literal(val));
    }
    Ok(atts)
}

fn body_from_json(v: &Json, path: &str) -> JResult<Body> {
    match v {
        Json::String(s) => Ok(Body::Text(KString::from_ref(s))),
        Json::Array(items) => Ok(Body::Nodes(
            items.iter().enumerate()
                .map(|(i, item)| node_from_json(item, &subpath(path, &i.to_string())))
                .collect::<JResult<Vec<_>>>()?)),
        other => Err(TemplateError::invalid(
            path, format!("expected a string or an array, got {}", json_type_name(other)))),
    }
}

fn element_from_json(map: &Map<String, Json>, path: &str) -> JResult<ElementNode> {
    let tag = string_field(map, "tag", path)?;
    let comment = string_field(map, "comment", path)?;
    let attributes = match first_present(map, ATTRIBUTES_KEYS) {
        Some((key, v)) => Some(attributes_from_json(v, &subpath(path, key))?),
        None => None,
    };
    let body = match first_present(map, BODY_KEYS) {
        Some((key, v)) => Some(body_from_json(v, &subpath(path, key))?),
        None => None,
    };
    Ok(ElementNode {
        tag: tag.map(Value::Literal),
        attributes: attributes.map(Value::Literal),
        body: body.map(Value::Literal),
        comment: comment.map(Value::Literal),
    })
}

fn template_ref_from_json(map: &Map<String, Json>, path: &str) -> JResult<TemplateRef> {
    let (name, params) = match (map.get("template"), map.get("params")) {
        (Some(name), Some(params)) => (name, params),
        (Some(_), None) => return Err(TemplateError::invalid(
            path, "`template` given without `params`")),
        (None, _) => return Err(TemplateError::invalid(
            path, "`params` given without `template`")),
    };
    if let Some(field) = ELEMENT_FIELDS.iter().find(|f| map.contains_key(**f)) {
        return Err(TemplateError::invalid(
            path, format!("a template reference can't also have `{field}`")));
    }
    match name {
        Json::String(name) => Ok(TemplateRef {
            name: KString::from_ref(name),
            params: params.clone(),
        }),
        other => Err(TemplateError::invalid(
            &subpath(path, "template"),
            format!("expected a string, got {}", json_type_name(other)))),
    }
}

fn node_from_json(v: &Json, path: &str) -> JResult<TemplateNode> {
    match v {
        Json::String(s) => Ok(TemplateNode::Text(KString::from_ref(s))),
        Json::Object(map) =>
            if map.contains_key("template") || map.contains_key("params") {
                Ok(TemplateNode::TemplateRef(template_ref_from_json(map, path)?))
            } else {
                Ok(TemplateNode::Element(element_from_json(map, path)?))
            },
        other => Err(TemplateError::invalid(
            path, format!("expected a string or an object, got {}", json_type_name(other)))),
    }
}

fn literal_or_err<'v, T>(v: &'v Value<T>, path: &str, key: &str) -> JResult<&'v T> {
    v.as_literal().ok_or_else(|| TemplateError::deferred(&subpath(path, key)))
}

fn node_to_json(node: &TemplateNode, path: &str) -> JResult<Json> {
    match node {
        TemplateNode::Text(s) => Ok(Json::String(s.to_string())),
        TemplateNode::TemplateRef(TemplateRef { name, params }) => {
            let mut map = Map::new();
            map.insert("template".into(), Json::String(name.to_string()));
            map.insert("params".into(), params.clone());
            Ok(Json::Object(map))
        }
        TemplateNode::Element(ElementNode { tag, attributes, body, comment }) => {
            let mut map = Map::new();
            if let Some(tag) = tag {
                let tag = literal_or_err(tag, path, "tag")?;
                map.insert("tag".into(), Json::String(tag.to_string()));
            }
            if let Some(atts) = attributes {
                let atts_path = subpath(path, "attributes");
                let mut attmap = Map::new();
                for (key, val) in literal_or_err(atts, path, "attributes")?.iter() {
                    let val = literal_or_err(val, &atts_path, key)?;
                    attmap.insert(key.to_string(), Json::String(val.to_string()));
                }
                map.insert("attributes".into(), Json::Object(attmap));
            }
            if let Some(body) = body {
                let body_path = subpath(path, "body");
                let body = match literal_or_err(body, path, "body")? {
                    Body::Text(s) => Json::String(s.to_string()),
                    Body::Nodes(nodes) => Json::Array(
                        nodes.iter().enumerate()
                            .map(|(i, n)| node_to_json(n, &subpath(&body_path, &i.to_string())))
                            .collect::<JResult<Vec<_>>>()?),
                };
                map.insert("body".into(), body);
            }
            if let Some(comment) = comment {
                let comment = literal_or_err(comment, path, "comment")?;
                map.insert("comment".into(), Json::String(comment.to_string()));
            }
            Ok(Json::Object(map))
        }
    }
}

impl TemplateNode {
    /// Build a node from its JSON form, rejecting shapes that are not
    /// exactly one of text, template reference or element.
    pub fn from_json(v: &Json) -> JResult<TemplateNode> {
        node_from_json(v, "")
    }

    pub fn from_json_str(s: &str) -> anyhow::Result<TemplateNode> {
        let v: Json = serde_json::from_str(s)?;
        Ok(TemplateNode::from_json(&v)?)
    }

    /// The canonical JSON form. Fails if the tree still contains
    /// deferred values.
    pub fn to_json(&self) -> JResult<Json> {
        node_to_json(self, "")
    }
}

impl Serialize for TemplateNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().map_err(serde::ser::Error::custom)?.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TemplateNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = Json::deserialize(deserializer)?;
        TemplateNode::from_json(&v).map_err(serde::de::Error::custom)
    }
}
