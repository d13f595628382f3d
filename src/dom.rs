//! Parsing HTML text into a plain node tree.
//!
//! The tokenizer is html5gum; this module adds the (small) tree
//! building part: a stack of open elements, void elements that never
//! get a frame, end tags closing the innermost matching element.
//! The contents of `script`, `style`, `title`, `textarea` and the like
//! come out as plain text, the tokenizer switching states after their
//! start tags.

use std::collections::HashSet;

use anyhow::{Result, bail};
use html5gum::{DefaultEmitter, HtmlString, Token, Tokenizer};
use kstring::KString;
use lazy_static::lazy_static;

use crate::{error::TemplateError, info, warn};

lazy_static!{
    /// Elements that never have a closing tag in HTML.
    pub static ref VOID_ELEMENTS: HashSet<&'static str> = [
        "area", "base", "br", "col", "command", "embed", "hr", "img",
        "input", "keygen", "link", "meta", "param", "source", "track",
        "wbr",
    ].into_iter().collect();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
    Doctype,
}

/// What the decoder needs to know about a parsed node.
pub trait ParsedNode: Sized {
    fn kind(&self) -> NodeKind;

    /// Tag name for elements, the doctype name for doctypes, empty
    /// otherwise.
    fn name(&self) -> &str;

    /// Attributes, sorted by name (html5gum keeps them in a
    /// `BTreeMap`).
    fn attributes(&self) -> &[(KString, KString)];

    fn children(&self) -> &[Self];

    /// Text of text nodes, content of comments, empty otherwise.
    fn text(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DomNode {
    Element {
        name: KString,
        attributes: Vec<(KString, KString)>,
        children: Vec<DomNode>,
    },
    Text(KString),
    Comment(KString),
    Doctype(KString),
}

impl ParsedNode for DomNode {
    fn kind(&self) -> NodeKind {
        match self {
            DomNode::Element { .. } => NodeKind::Element,
            DomNode::Text(_) => NodeKind::Text,
            DomNode::Comment(_) => NodeKind::Comment,
            DomNode::Doctype(_) => NodeKind::Doctype,
        }
    }

    fn name(&self) -> &str {
        match self {
            DomNode::Element { name, .. } => name,
            DomNode::Doctype(name) => name,
            _ => "",
        }
    }

    fn attributes(&self) -> &[(KString, KString)] {
        match self {
            DomNode::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    fn children(&self) -> &[Self] {
        match self {
            DomNode::Element { children, .. } => children,
            _ => &[],
        }
    }

    fn text(&self) -> &str {
        match self {
            DomNode::Text(s) | DomNode::Comment(s) => s,
            _ => "",
        }
    }
}

/// The top level nodes of a document or fragment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub children: Vec<DomNode>,
}

#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Fail on the first tokenizer error instead of warning about it
    /// and going on with what the tokenizer recovered.
    pub strict: bool,
    /// How many elements may be open at once before giving up with
    /// `TemplateError::DepthExceeded`.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            strict: false,
            max_depth: 512,
        }
    }
}

/// This can't be replaced with `ks` or the MyFrom trait, because it
/// can fail.
fn kstring(s: HtmlString) -> Result<KString> {
    Ok(KString::from_string(String::from_utf8(s.0)?))
}

struct Frame {
    name: KString,
    attributes: Vec<(KString, KString)>,
    children: Vec<DomNode>,
}

struct TreeBuilder {
    open: Vec<Frame>,
    top: Vec<DomNode>,
    max_depth: usize,
}

impl TreeBuilder {
    fn new(max_depth: usize) -> Self {
        TreeBuilder { open: Vec::new(), top: Vec::new(), max_depth }
    }

    fn current(&mut self) -> &mut Vec<DomNode> {
        match self.open.last_mut() {
            Some(frame) => &mut frame.children,
            None => &mut self.top,
        }
    }

    fn push(&mut self, node: DomNode) {
        self.current().push(node)
    }

    fn push_text(&mut self, s: KString) {
        let current = self.current();
        if let Some(DomNode::Text(prev)) = current.last_mut() {
            let mut joined = String::with_capacity(prev.len() + s.len());
            joined.push_str(prev);
            joined.push_str(&s);
            *prev = KString::from_string(joined);
        } else {
            current.push(DomNode::Text(s));
        }
    }

    fn start(
        &mut self,
        name: KString,
        attributes: Vec<(KString, KString)>,
        self_closing: bool
    ) -> Result<()> {
        if self_closing || VOID_ELEMENTS.contains(name.as_str()) {
            self.push(DomNode::Element { name, attributes, children: Vec::new() });
        } else {
            if self.open.len() >= self.max_depth {
                let max_depth = self.max_depth;
                return Err(TemplateError::DepthExceeded { max_depth }.into());
            }
            self.open.push(Frame { name, attributes, children: Vec::new() });
        }
        Ok(())
    }

    fn close_innermost(&mut self) {
        if let Some(Frame { name, attributes, children }) = self.open.pop() {
            self.push(DomNode::Element { name, attributes, children });
        }
    }

    fn end(&mut self, name: &str) {
        if let Some(i) = self.open.iter().rposition(|frame| frame.name.as_str() == name) {
            while self.open.len() > i {
                self.close_innermost();
            }
        } else if ! VOID_ELEMENTS.contains(name) {
            warn!("ignoring end tag </{name}> without matching start tag");
        }
    }

    fn finish(mut self) -> Vec<DomNode> {
        if ! self.open.is_empty() {
            info!("closing {} element(s) left open at the end of input",
                  self.open.len());
        }
        while ! self.open.is_empty() {
            self.close_innermost();
        }
        self.top
    }
}

/// Parse `text` (a full document or a fragment) into its top level
/// nodes.
pub fn parse_html(text: &str, options: &ParseOptions) -> Result<Document> {
    let mut builder = TreeBuilder::new(options.max_depth);
    let mut emitter = DefaultEmitter::default();
    emitter.switch_states(true);
    for token in Tokenizer::new_with_emitter(text, emitter).infallible() {
        match token {
            Token::StartTag(starttag) => {
                let mut attributes = Vec::with_capacity(starttag.attributes.len());
                for (k, v) in starttag.attributes {
                    attributes.push((kstring(k)?, kstring(v)?));
                }
                builder.start(kstring(starttag.name)?, attributes, starttag.self_closing)?;
            }
            Token::EndTag(endtag) => {
                let name = kstring(endtag.name)?;
                builder.end(&name);
            }
            Token::String(s) => builder.push_text(kstring(s)?),
            Token::Comment(s) => builder.push(DomNode::Comment(kstring(s)?)),
            Token::Doctype(doctype) => builder.push(DomNode::Doctype(kstring(doctype.name)?)),
            Token::Error(e) =>
                if options.strict {
                    bail!("HTML5 parsing error: {e}")
                } else {
                    warn!("HTML5 parsing error (ignored): {e}")
                }
        }
    }
    Ok(Document { children: builder.finish() })
}


#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Vec<DomNode> {
        parse_html(s, &ParseOptions::default()).unwrap().children
    }

    fn elt(name: &str, attributes: &[(&str, &str)], children: Vec<DomNode>) -> DomNode {
        DomNode::Element {
            name: KString::from_ref(name),
            attributes: attributes.iter().map(
                |(k, v)| (KString::from_ref(k), KString::from_ref(v))).collect(),
            children,
        }
    }

    fn text(s: &str) -> DomNode {
        DomNode::Text(KString::from_ref(s))
    }

    #[test]
    fn t_nesting() {
        assert_eq!(p("<div class=\"x\"><p>a</p>b</div>"),
                   vec![elt("div", &[("class", "x")],
                            vec![elt("p", &[], vec![text("a")]), text("b")])]);
    }

    #[test]
    fn t_void_and_self_closing() {
        assert_eq!(p("<p>a<br>b<img src=\"i.png\"/><span/>c</p>"),
                   vec![elt("p", &[], vec![
                       text("a"),
                       elt("br", &[], vec![]),
                       text("b"),
                       elt("img", &[("src", "i.png")], vec![]),
                       elt("span", &[], vec![]),
                       text("c"),
                   ])]);
    }

    #[test]
    fn t_comment_and_doctype() {
        let nodes = p("<!DOCTYPE html><!-- hi --><html></html>");
        assert_eq!(nodes, vec![
            DomNode::Doctype(KString::from_static("html")),
            DomNode::Comment(KString::from_static(" hi ")),
            elt("html", &[], vec![]),
        ]);
        assert_eq!(nodes[1].kind(), NodeKind::Comment);
        assert_eq!(nodes[1].text(), " hi ");
        assert_eq!(nodes[0].name(), "html");
    }

    #[test]
    fn t_lower_cased_names() {
        assert_eq!(p("<DIV ID=\"a\"></DIV>"),
                   vec![elt("div", &[("id", "a")], vec![])]);
    }

    #[test]
    fn t_unclosed_and_stray() {
        assert_eq!(p("<div><p>a</span>b"),
                   vec![elt("div", &[], vec![elt("p", &[], vec![text("ab")])])]);
        // closing the outer element closes the inner one, too
        assert_eq!(p("<div><p>a</div>c"),
                   vec![elt("div", &[], vec![elt("p", &[], vec![text("a")])]),
                        text("c")]);
    }

    #[test]
    fn t_several_top_level_nodes() {
        assert_eq!(p("a<b>c</b>\n"),
                   vec![text("a"), elt("b", &[], vec![text("c")]), text("\n")]);
        assert_eq!(p(""), Vec::<DomNode>::new());
    }

    #[test]
    fn t_strict() {
        let strict = ParseOptions { strict: true, ..Default::default() };
        assert!(parse_html("<div>ok</div>", &strict).is_ok());
        assert!(parse_html("<p>a</>b</p>", &strict).is_err());
        assert!(parse_html("<p>a</>b</p>", &ParseOptions::default()).is_ok());
    }

    #[test]
    fn t_raw_text_elements() {
        assert_eq!(p("<script>if (a<b) { x() }</script>"),
                   vec![elt("script", &[], vec![text("if (a<b) { x() }")])]);
        assert_eq!(p("<style>a<b{}</style><p>x</p>"),
                   vec![elt("style", &[], vec![text("a<b{}")]),
                        elt("p", &[], vec![text("x")])]);
        assert_eq!(p("<title>a <b>c</b></title>"),
                   vec![elt("title", &[], vec![text("a <b>c</b>")])]);
    }

    #[test]
    fn t_depth_limit() {
        let shallow = ParseOptions { max_depth: 3, ..Default::default() };
        assert!(parse_html("<a><b><c>x<br></c></b></a>", &shallow).is_ok());
        let err = parse_html("<a><b><c><d>x</d></c></b></a>", &shallow).err().unwrap();
        assert!(matches!(err.downcast_ref::<TemplateError>(),
                         Some(TemplateError::DepthExceeded { max_depth: 3 })));

        let deep = "<div>".repeat(20000) + &"</div>".repeat(20000);
        let err = parse_html(&deep, &ParseOptions::default()).err().unwrap();
        assert!(matches!(err.downcast_ref::<TemplateError>(),
                         Some(TemplateError::DepthExceeded { max_depth: 512 })));
    }
}
