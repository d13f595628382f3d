//! Turning parsed HTML back into template objects: the inverse of
//! `compile`.

use anyhow::Result;
use kstring::KString;

use crate::{dom::{NodeKind, ParsedNode, ParseOptions, parse_html},
            node::{Attributes, Body, ElementNode, TemplateNode},
            value::Value};

fn literal(s: &str) -> Option<Value<KString>> {
    Some(Value::Literal(KString::from_ref(s)))
}

/// Body of an element with the given children. A single text child
/// becomes a string body rather than a one element list.
pub fn decode_body<N: ParsedNode>(children: &[N]) -> Body {
    match children {
        [] => Body::empty(),
        [only] if only.kind() == NodeKind::Text => Body::Text(KString::from_ref(only.text())),
        _ => Body::Nodes(children.iter().map(decode).collect()),
    }
}

pub fn decode<N: ParsedNode>(node: &N) -> TemplateNode {
    match node.kind() {
        NodeKind::Comment => ElementNode {
            comment: literal(node.text()),
            ..Default::default()
        }.into(),
        NodeKind::Text => ElementNode {
            body: Some(Value::Literal(Body::Text(KString::from_ref(node.text())))),
            ..Default::default()
        }.into(),
        NodeKind::Element => {
            let atts = node.attributes();
            ElementNode {
                tag: literal(node.name()),
                attributes: if atts.is_empty() {
                    None
                } else {
                    Some(Value::Literal(atts.iter().cloned().collect::<Attributes>()))
                },
                body: Some(Value::Literal(decode_body(node.children()))),
                comment: None,
            }.into()
        }
        // Only meaningful at the start of a document, where
        // `decode_root` strips it; elsewhere there is nothing to
        // represent it with.
        NodeKind::Doctype => TemplateNode::empty(),
    }
}

/// Decode the top level nodes of a document or fragment. Leading
/// doctypes are dropped (`compile` puts one before every `html`
/// element anyway). Several remaining nodes are wrapped in a
/// fragment, a single one is returned as is, none gives the empty
/// text node.
pub fn decode_root<N: ParsedNode>(children: &[N]) -> TemplateNode {
    let start = children.iter()
        .position(|n| n.kind() != NodeKind::Doctype)
        .unwrap_or(children.len());
    match &children[start..] {
        [] => TemplateNode::empty(),
        [only] => decode(only),
        rest => ElementNode::fragment()
            .children(rest.iter().map(decode).collect())
            .into(),
    }
}

/// Parse and decode HTML text in one go.
pub fn parse(text: &str, options: &ParseOptions) -> Result<TemplateNode> {
    let document = parse_html(text, options)?;
    Ok(decode_root(&document.children))
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{compile::compile, registry::TemplateRegistry};
    use super::*;

    fn parse_json(html: &str) -> serde_json::Value {
        parse(html, &ParseOptions::default()).unwrap().to_json().unwrap()
    }

    fn round_trip(html: &str) -> String {
        let node = parse(html, &ParseOptions::default()).unwrap();
        compile(node, &TemplateRegistry::new()).unwrap()
    }

    #[test]
    fn t_single_text_child_collapses() {
        assert_eq!(parse_json("<p>hello</p>"), json!({"tag": "p", "body": "hello"}));
    }

    #[test]
    fn t_structure() {
        assert_eq!(
            parse_json("<div class=\"x\"><div>a</div><br/><!--c--><div>b</div></div>"),
            json!({
                "tag": "div",
                "attributes": {"class": "x"},
                "body": [
                    {"tag": "div", "body": "a"},
                    {"tag": "br", "body": ""},
                    {"comment": "c"},
                    {"tag": "div", "body": "b"},
                ]
            }));
    }

    #[test]
    fn t_mixed_children() {
        assert_eq!(parse_json("<p>a<b>b</b></p>"),
                   json!({"tag": "p", "body": [{"body": "a"}, {"tag": "b", "body": "b"}]}));
    }

    #[test]
    fn t_top_level() {
        assert_eq!(parse_json(""), json!(""));
        assert_eq!(parse_json("<!DOCTYPE html><html></html>"),
                   json!({"tag": "html", "body": ""}));
        assert_eq!(parse_json("<p>a</p><p>b</p>"),
                   json!({"body": [{"tag": "p", "body": "a"}, {"tag": "p", "body": "b"}]}));
        assert_eq!(parse_json("just text"), json!({"body": "just text"}));
    }

    #[test]
    fn t_round_trip() {
        for html in [
            "<div class=\"x\"><div>a</div><br/><div>b</div></div>",
            "<!DOCTYPE html><html><head><title>T</title></head><body><p>x</p></body></html>",
            "<ul><li>one</li><li>two <em>2</em></li></ul>\n<p>after</p>",
            "<!--note--><section id=\"s\"></section>",
            "<p>a<img alt=\"i\" src=\"i.png\"/>b</p>",
        ] {
            assert_eq!(round_trip(html), html);
        }
    }

    #[test]
    fn t_raw_text_round_trip() {
        for html in [
            "<script>if (a<b) { x() }</script>",
            "<style>a<b{}</style>",
            "<!DOCTYPE html><html><head><script>x = \"<p>\";</script></head><body></body></html>",
        ] {
            assert_eq!(round_trip(html), html);
        }
        assert_eq!(parse_json("<script>if (a<b) { x() }</script>"),
                   json!({"tag": "script", "body": "if (a<b) { x() }"}));
    }

    #[test]
    fn t_deep_nesting_fails_cleanly() {
        let deep = "<div>".repeat(20000) + &"</div>".repeat(20000);
        let err = parse(&deep, &ParseOptions::default()).err().unwrap();
        assert!(matches!(err.downcast_ref::<crate::error::TemplateError>(),
                         Some(crate::error::TemplateError::DepthExceeded { .. })));
        let fine = "<div>".repeat(100) + &"</div>".repeat(100);
        assert_eq!(round_trip(&fine), fine);
    }

    #[test]
    fn t_round_trip_normalizes() {
        assert_eq!(round_trip("<BR>"), "<br/>");
        assert_eq!(round_trip("<p>open"), "<p>open</p>");
    }
}
