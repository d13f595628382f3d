//! Turning template nodes into their final, literal form right before
//! they are compiled: expanding template references and running
//! deferred values.

use anyhow::Result;
use kstring::KString;

use crate::{error::TemplateError,
            node::{Body, ElementNode, TemplateNode},
            registry::TemplateRegistry};

/// An element (or fragment) with all its own fields literal. The
/// nodes in `body` are still raw; they are resolved one by one as
/// they are compiled.
#[derive(Debug)]
pub struct ResolvedElement {
    /// Lower case; `None` for fragments (also when the tag was the
    /// empty string).
    pub tag: Option<KString>,
    pub attributes: Vec<(KString, KString)>,
    pub body: Body,
    pub comment: Option<KString>,
}

#[derive(Debug)]
pub enum Resolved {
    Text(KString),
    Element(ResolvedElement),
}

fn normalize_tag(tag: KString) -> Option<KString> {
    if tag.is_empty() {
        None
    } else if tag.chars().any(|c| c.is_uppercase()) {
        Some(KString::from_string(tag.to_lowercase()))
    } else {
        Some(tag)
    }
}

/// Resolve the fields of an element in the fixed order tag, body,
/// attributes (the mapping first, then each value in mapping order),
/// comment. Every deferred value is run exactly once; the first
/// failure is returned as is.
pub fn resolve_element(elt: ElementNode) -> Result<ResolvedElement> {
    let ElementNode { tag, attributes, body, comment } = elt;
    let tag = match tag {
        Some(tag) => normalize_tag(tag.force()?),
        None => None,
    };
    let body = match body {
        Some(body) => body.force()?,
        None => Body::empty(),
    };
    let attributes = match attributes {
        Some(atts) => atts.force()?
            .into_iter()
            .map(|(key, val)| Ok((key, val.force()?)))
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };
    let comment = comment.map(|c| c.force()).transpose()?;
    Ok(ResolvedElement { tag, attributes, body, comment })
}

/// Resolve `node`. Template references are replaced by what the
/// registry returns for them (repeatedly, if a template returns
/// another reference, up to `max_depth` times).
pub fn resolve(
    node: TemplateNode,
    registry: &TemplateRegistry,
    max_depth: usize,
) -> Result<Resolved> {
    let mut node = node;
    let mut expansions = 0;
    loop {
        match node {
            TemplateNode::Text(s) => return Ok(Resolved::Text(s)),
            TemplateNode::Element(elt) => return Ok(Resolved::Element(resolve_element(elt)?)),
            TemplateNode::TemplateRef(r) => {
                expansions += 1;
                if expansions > max_depth {
                    return Err(TemplateError::DepthExceeded { max_depth }.into());
                }
                node = registry.lookup(&r.name, &r.params)?;
            }
        }
    }
}
