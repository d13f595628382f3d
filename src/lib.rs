//! Compile tree descriptions of HTML ("template objects") to markup,
//! and parse markup back into template objects.

pub mod warn;
pub mod myfrom;
pub mod error;
pub mod value;
pub mod node;
pub mod json;
pub mod registry;
pub mod resolve;
pub mod compile;
pub mod dom;
pub mod decode;
pub mod easy_fs;

pub use compile::{Compiler, CompileOptions, compile};
pub use decode::{decode, decode_root, parse};
pub use dom::{DomNode, Document, NodeKind, ParsedNode, ParseOptions, parse_html};
pub use error::TemplateError;
pub use node::{Attributes, Body, ElementNode, TemplateNode, TemplateRef};
pub use registry::TemplateRegistry;
pub use value::{Value, deferred};
