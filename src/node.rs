//! The template object model: a tree description of HTML that both
//! the compiler and the decoder operate on.

use kstring::KString;

use crate::{myfrom::{MyFrom, ks},
            value::{Value, deferred}};

/// Ordered attribute mapping. Output order is insertion order; setting
/// a key that is already present replaces its value in place.
#[derive(Debug, Default)]
pub struct Attributes(Vec<(KString, Value<KString>)>);

impl Attributes {
    pub fn new() -> Self {
        Attributes(Vec::new())
    }

    pub fn set(&mut self, key: KString, val: Value<KString>) {
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = val;
        } else {
            self.0.push((key, val));
        }
    }

    /// Builder variant of `set` for literal values.
    pub fn with<K, V>(mut self, key: K, val: V) -> Self
    where KString: MyFrom<K> + MyFrom<V>
    {
        self.set(ks(key), Value::Literal(ks(val)));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value<KString>> {
        self.0.iter().find(|(k, _)| k.as_str() == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(KString, Value<KString>)> {
        self.0.iter()
    }
}

impl IntoIterator for Attributes {
    type Item = (KString, Value<KString>);
    type IntoIter = std::vec::IntoIter<(KString, Value<KString>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(KString, KString)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (KString, KString)>>(iter: I) -> Self {
        let mut atts = Attributes::new();
        for (k, v) in iter {
            atts.set(k, Value::Literal(v));
        }
        atts
    }
}

/// Content of an element: a single string, or child nodes.
#[derive(Debug)]
pub enum Body {
    Text(KString),
    Nodes(Vec<TemplateNode>),
}

impl Body {
    pub fn empty() -> Self {
        Body::Text(KString::from_static(""))
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Body::Text(ks(s))
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Text(ks(s))
    }
}

impl From<Vec<TemplateNode>> for Body {
    fn from(nodes: Vec<TemplateNode>) -> Self {
        Body::Nodes(nodes)
    }
}

/// An element, or a fragment when `tag` is absent or empty.
#[derive(Debug, Default)]
pub struct ElementNode {
    pub tag: Option<Value<KString>>,
    pub attributes: Option<Value<Attributes>>,
    pub body: Option<Value<Body>>,
    pub comment: Option<Value<KString>>,
}

impl ElementNode {
    pub fn new<T>(tag: T) -> Self
    where KString: MyFrom<T>
    {
        ElementNode {
            tag: Some(Value::Literal(ks(tag))),
            ..Default::default()
        }
    }

    pub fn fragment() -> Self {
        Default::default()
    }

    pub fn tag_deferred(mut self, f: impl FnOnce() -> anyhow::Result<KString> + 'static) -> Self {
        self.tag = Some(deferred(f));
        self
    }

    fn add_attribute(&mut self, key: KString, val: Value<KString>) {
        self.attributes = Some(match self.attributes.take() {
            None => {
                let mut atts = Attributes::new();
                atts.set(key, val);
                Value::Literal(atts)
            }
            Some(Value::Literal(mut atts)) => {
                atts.set(key, val);
                Value::Literal(atts)
            }
            Some(Value::Deferred(f)) => deferred(move || {
                let mut atts = f()?;
                atts.set(key, val);
                Ok(atts)
            }),
        });
    }

    pub fn attr<K, V>(mut self, key: K, val: V) -> Self
    where KString: MyFrom<K> + MyFrom<V>
    {
        self.add_attribute(ks(key), Value::Literal(ks(val)));
        self
    }

    pub fn attr_deferred<K>(
        mut self,
        key: K,
        f: impl FnOnce() -> anyhow::Result<KString> + 'static
    ) -> Self
    where KString: MyFrom<K>
    {
        self.add_attribute(ks(key), deferred(f));
        self
    }

    /// Replaces all attributes.
    pub fn attributes(mut self, atts: Attributes) -> Self {
        self.attributes = Some(Value::Literal(atts));
        self
    }

    pub fn attributes_deferred(
        mut self,
        f: impl FnOnce() -> anyhow::Result<Attributes> + 'static
    ) -> Self {
        self.attributes = Some(deferred(f));
        self
    }

    /// Set a text body.
    pub fn text<T>(mut self, s: T) -> Self
    where KString: MyFrom<T>
    {
        self.body = Some(Value::Literal(Body::Text(ks(s))));
        self
    }

    pub fn children(mut self, nodes: Vec<TemplateNode>) -> Self {
        self.body = Some(Value::Literal(Body::Nodes(nodes)));
        self
    }

    pub fn body_deferred(
        mut self,
        f: impl FnOnce() -> anyhow::Result<Body> + 'static
    ) -> Self {
        self.body = Some(deferred(f));
        self
    }

    pub fn comment<T>(mut self, s: T) -> Self
    where KString: MyFrom<T>
    {
        self.comment = Some(Value::Literal(ks(s)));
        self
    }

    pub fn comment_deferred(
        mut self,
        f: impl FnOnce() -> anyhow::Result<KString> + 'static
    ) -> Self {
        self.comment = Some(deferred(f));
        self
    }
}

/// Reference to a template in a `TemplateRegistry`, with the
/// parameters to call it with.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateRef {
    pub name: KString,
    pub params: serde_json::Value,
}

#[derive(Debug)]
pub enum TemplateNode {
    Text(KString),
    Element(ElementNode),
    TemplateRef(TemplateRef),
}

impl TemplateNode {
    pub fn text<T>(s: T) -> Self
    where KString: MyFrom<T>
    {
        TemplateNode::Text(ks(s))
    }

    pub fn empty() -> Self {
        TemplateNode::Text(KString::from_static(""))
    }

    pub fn template<T>(name: T, params: serde_json::Value) -> Self
    where KString: MyFrom<T>
    {
        TemplateNode::TemplateRef(TemplateRef { name: ks(name), params })
    }

    /// Visit the template references in this tree (only those not
    /// hidden behind deferred values).
    pub fn for_each_template_ref(&self, f: &mut impl FnMut(&TemplateRef)) {
        match self {
            TemplateNode::Text(_) => (),
            TemplateNode::TemplateRef(r) => f(r),
            TemplateNode::Element(elt) => {
                if let Some(Value::Literal(Body::Nodes(nodes))) = &elt.body {
                    for node in nodes {
                        node.for_each_template_ref(f);
                    }
                }
            }
        }
    }
}

impl From<ElementNode> for TemplateNode {
    fn from(elt: ElementNode) -> Self {
        TemplateNode::Element(elt)
    }
}

impl From<TemplateRef> for TemplateNode {
    fn from(r: TemplateRef) -> Self {
        TemplateNode::TemplateRef(r)
    }
}

impl From<&str> for TemplateNode {
    fn from(s: &str) -> Self {
        TemplateNode::text(s)
    }
}

impl From<String> for TemplateNode {
    fn from(s: String) -> Self {
        TemplateNode::text(s)
    }
}
