//! Named templates that `TemplateNode::TemplateRef` nodes refer to.

use std::collections::HashMap;

use anyhow::Result;
use kstring::KString;

use crate::{myfrom::{MyFrom, ks},
            node::TemplateNode};

pub type TemplateFn = Box<dyn Fn(&serde_json::Value) -> Result<TemplateNode>>;

/// Owned by the caller and passed to the compiler; there is no
/// global instance.
#[derive(Default)]
pub struct TemplateRegistry {
    templates: HashMap<KString, TemplateFn>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds `f` under `name` unless that name is taken already, in
    /// which case the earlier registration stays. Returns whether `f`
    /// was stored.
    pub fn register<N, F>(&mut self, name: N, f: F) -> bool
    where KString: MyFrom<N>,
          F: Fn(&serde_json::Value) -> Result<TemplateNode> + 'static
    {
        let name = ks(name);
        if self.templates.contains_key(&name) {
            false
        } else {
            self.templates.insert(name, Box::new(f));
            true
        }
    }

    /// Call the template `name` with `params`. Unknown names give the
    /// empty text node, not an error.
    pub fn lookup(&self, name: &str, params: &serde_json::Value) -> Result<TemplateNode> {
        match self.templates.get(name) {
            Some(f) => f(params),
            None => Ok(TemplateNode::empty()),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(|k| k.as_str()).collect();
        names.sort();
        names
    }
}
