//! Error kinds that callers may want to match on. They travel inside
//! `anyhow::Error` and can be recovered with `downcast_ref`.

use kstring::KString;

#[derive(thiserror::Error, Debug)]
pub enum TemplateError {
    #[error("invalid template node at {path}: {reason}")]
    InvalidTemplateNode {
        path: String,
        reason: KString,
    },

    #[error("can't serialize the deferred value at {path}")]
    DeferredValue {
        path: String,
    },

    #[error("template nesting deeper than {max_depth} levels")]
    DepthExceeded {
        max_depth: usize,
    },
}

impl TemplateError {
    pub fn invalid(path: &str, reason: impl Into<KString>) -> Self {
        TemplateError::InvalidTemplateNode {
            path: path_or_root(path),
            reason: reason.into(),
        }
    }

    pub fn deferred(path: &str) -> Self {
        TemplateError::DeferredValue { path: path_or_root(path) }
    }
}

fn path_or_root(path: &str) -> String {
    if path.is_empty() {
        "/".into()
    } else {
        path.into()
    }
}
