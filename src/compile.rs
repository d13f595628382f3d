//! Rendering template nodes to HTML text.
//!
//! Output is a plain concatenation: text, attribute values and
//! comments are inserted verbatim, without any escaping.

use std::{collections::HashSet, io::Write};

use anyhow::Result;
use kstring::KString;
use lazy_static::lazy_static;

use crate::{error::TemplateError,
            node::{Body, TemplateNode},
            registry::TemplateRegistry,
            resolve::{Resolved, ResolvedElement, resolve}};

pub const DOCTYPE: &str = "<!DOCTYPE html>";

lazy_static!{
    /// Elements rendered as `<tag/>`, without body or closing tag.
    pub static ref SELF_CLOSING_TAGS: HashSet<&'static str> = [
        "area", "base", "br", "col", "command", "embed", "hr", "img",
        "input", "link", "meta", "param", "source",
    ].into_iter().collect();
}

pub fn is_self_closing(tag: &str) -> bool {
    SELF_CLOSING_TAGS.contains(tag)
}

#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// How deep element nesting plus template expansion may go before
    /// giving up with `TemplateError::DepthExceeded`.
    pub max_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_depth: 512,
        }
    }
}

pub struct Compiler<'r> {
    registry: &'r TemplateRegistry,
    options: CompileOptions,
}

impl<'r> Compiler<'r> {
    pub fn new(registry: &'r TemplateRegistry) -> Self {
        Self::with_options(registry, Default::default())
    }

    pub fn with_options(registry: &'r TemplateRegistry, options: CompileOptions) -> Self {
        Compiler { registry, options }
    }

    /// Compile `node` (consuming it, deferred values are run on the
    /// way) to an HTML string. On error nothing is returned.
    pub fn compile(&self, node: TemplateNode) -> Result<String> {
        let mut out = String::new();
        self.print_node(node, 0, &mut out)?;
        Ok(out)
    }

    /// Like `compile`, but writes the result to `out`. Nothing is
    /// written if compilation fails.
    pub fn compile_to(&self, node: TemplateNode, out: &mut impl Write) -> Result<()> {
        let s = self.compile(node)?;
        out.write_all(s.as_bytes())?;
        Ok(())
    }

    fn print_node(&self, node: TemplateNode, depth: usize, out: &mut String) -> Result<()> {
        let max_depth = self.options.max_depth;
        if depth > max_depth {
            return Err(TemplateError::DepthExceeded { max_depth }.into());
        }
        match resolve(node, self.registry, max_depth)? {
            Resolved::Text(s) => out.push_str(&s),
            Resolved::Element(elt) => self.print_element(elt, depth, out)?,
        }
        Ok(())
    }

    fn print_body(&self, body: Body, depth: usize, out: &mut String) -> Result<()> {
        match body {
            Body::Text(s) => out.push_str(&s),
            Body::Nodes(nodes) => {
                for node in nodes {
                    self.print_node(node, depth + 1, out)?;
                }
            }
        }
        Ok(())
    }

    fn print_element(&self, elt: ResolvedElement, depth: usize, out: &mut String) -> Result<()> {
        let ResolvedElement { tag, attributes, body, comment } = elt;
        let tag = match tag {
            None => {
                if let Some(comment) = &comment {
                    print_comment(comment, out);
                }
                return self.print_body(body, depth, out);
            }
            Some(tag) => tag,
        };
        if tag.as_str() == "html" {
            out.push_str(DOCTYPE);
        }
        if let Some(comment) = &comment {
            print_comment(comment, out);
        }
        out.push('<');
        out.push_str(&tag);
        print_attributes(&attributes, out);
        if is_self_closing(&tag) {
            // body is dropped
            out.push_str("/>");
        } else {
            out.push('>');
            self.print_body(body, depth, out)?;
            out.push_str("</");
            out.push_str(&tag);
            out.push('>');
        }
        Ok(())
    }
}

fn print_comment(comment: &str, out: &mut String) {
    out.push_str("<!--");
    out.push_str(comment);
    out.push_str("-->");
}

fn print_attributes(attributes: &[(KString, KString)], out: &mut String) {
    for (key, val) in attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(val);
        out.push('"');
    }
}

/// Compile with default options.
pub fn compile(node: TemplateNode, registry: &TemplateRegistry) -> Result<String> {
    Compiler::new(registry).compile(node)
}


#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use serde_json::json;

    use crate::node::{Attributes, ElementNode};
    use super::*;

    fn c(node: impl Into<TemplateNode>) -> String {
        compile(node.into(), &TemplateRegistry::new()).unwrap()
    }

    #[test]
    fn t_self_closing() {
        for tag in SELF_CLOSING_TAGS.iter() {
            assert_eq!(c(ElementNode::new(*tag)), format!("<{tag}/>"));
            assert_eq!(c(ElementNode::new(*tag).text("ignored")), format!("<{tag}/>"));
        }
        assert_eq!(c(ElementNode::new("img").attr("src", "a.png")
                     .children(vec!["x".into()])),
                   "<img src=\"a.png\"/>");
    }

    #[test]
    fn t_closing_tags() {
        for tag in ["div", "p", "span", "a", "ul", "li", "title", "script", "wbr"] {
            assert_eq!(c(ElementNode::new(tag).text("x")), format!("<{tag}>x</{tag}>"));
        }
        assert_eq!(c(ElementNode::new("div")), "<div></div>");
    }

    #[test]
    fn t_doctype() {
        assert_eq!(c(ElementNode::new("html")), "<!DOCTYPE html><html></html>");
        assert_eq!(c(ElementNode::new("HTML").comment("c")),
                   "<!DOCTYPE html><!--c--><html></html>");
    }

    #[test]
    fn t_comments() {
        assert_eq!(c(ElementNode::new("div").comment("c").text("b")),
                   "<!--c--><div>b</div>");
        assert_eq!(c(ElementNode::fragment().comment("c").text("b")), "<!--c-->b");
        assert_eq!(c(ElementNode::new("").comment("c")), "<!--c-->");
        assert_eq!(c(ElementNode::new("br").comment("c")), "<!--c--><br/>");
    }

    #[test]
    fn t_attribute_order() {
        assert_eq!(c(ElementNode::new("div").attr("a", "1").attr("b", "2")),
                   "<div a=\"1\" b=\"2\"></div>");
        assert_eq!(c(ElementNode::new("div").attr("b", "2").attr("a", "1")),
                   "<div b=\"2\" a=\"1\"></div>");
    }

    #[test]
    fn t_no_escaping() {
        assert_eq!(c(ElementNode::new("p").attr("title", "a\"b").text("<&>")),
                   "<p title=\"a\"b\"><&></p>");
    }

    #[test]
    fn t_fragment_and_nesting() {
        assert_eq!(
            c(ElementNode::fragment().children(vec![
                ElementNode::new("ul").children(vec![
                    ElementNode::new("li").text("one").into(),
                    ElementNode::new("li").children(vec![
                        "two ".into(),
                        ElementNode::new("b").text("bold").into(),
                    ]).into(),
                ]).into(),
                "tail".into(),
            ])),
            "<ul><li>one</li><li>two <b>bold</b></li></ul>tail");
        assert_eq!(c(TemplateNode::text("plain")), "plain");
    }

    #[test]
    fn t_deferred_values_compile_like_literals() {
        let literal = c(ElementNode::new("a")
                        .attr("href", "/x").attr("class", "link")
                        .text("go"));
        let deferred = c(ElementNode::fragment()
                         .tag_deferred(|| Ok(KString::from_static("A")))
                         .attributes_deferred(|| Ok(Attributes::new().with("href", "/x")))
                         .attr_deferred("class", || Ok(KString::from_static("link")))
                         .body_deferred(|| Ok(Body::from("go"))));
        assert_eq!(literal, "<a href=\"/x\" class=\"link\">go</a>");
        assert_eq!(deferred, literal);
    }

    #[test]
    fn t_deferred_failure_gives_no_output() {
        let node = ElementNode::new("div").children(vec![
            ElementNode::new("p").text("fine").into(),
            ElementNode::new("p")
                .attr_deferred("id", || Err(anyhow!("id not available")))
                .into(),
        ]);
        let mut out = Vec::new();
        let err = Compiler::new(&TemplateRegistry::new())
            .compile_to(node.into(), &mut out)
            .err().unwrap();
        assert_eq!(err.to_string(), "id not available");
        assert!(out.is_empty());
    }

    #[test]
    fn t_templates() -> Result<()> {
        let mut reg = TemplateRegistry::new();
        reg.register("t", |params| Ok(ElementNode::new("em")
                                      .text(params["x"].as_str().unwrap_or("-").to_string())
                                      .into()));
        reg.register("t", |_| Ok(TemplateNode::text("second")));
        let node = ElementNode::new("p").children(vec![
            TemplateNode::template("t", json!({"x": "1"})),
            TemplateNode::template("missing", json!({})),
            TemplateNode::template("t", json!({})),
        ]);
        assert_eq!(compile(node.into(), &reg)?, "<p><em>1</em><em>-</em></p>");
        assert_eq!(compile(TemplateNode::template("missing", json!({})), &reg)?, "");
        Ok(())
    }

    #[test]
    fn t_recursive_template_hits_depth_limit() {
        let mut reg = TemplateRegistry::new();
        reg.register("nest", |_| Ok(ElementNode::new("div").children(vec![
            TemplateNode::template("nest", json!({})),
        ]).into()));
        let compiler = Compiler::with_options(&reg, CompileOptions { max_depth: 20 });
        let err = compiler.compile(TemplateNode::template("nest", json!({}))).err().unwrap();
        assert!(matches!(err.downcast_ref::<TemplateError>(),
                         Some(TemplateError::DepthExceeded { max_depth: 20 })));
    }
}
