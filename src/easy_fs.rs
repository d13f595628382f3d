use std::{fs,
          path::{Path, PathBuf}};

use anyhow::{Result, Context, anyhow};

use crate::node::TemplateNode;


pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
    fs::read_to_string(&path).with_context(
        || anyhow!("opening path for reading: {:?}", path.as_ref()))
}

/// Read a template object stored as JSON.
pub fn load_template<P: AsRef<Path>>(path: P) -> Result<TemplateNode> {
    let s = read_to_string(&path)?;
    TemplateNode::from_json_str(&s).with_context(
        || anyhow!("loading template from {:?}", path.as_ref()))
}

/// Write `s` to `path`, creating missing parent directories.
pub fn write_string<P: AsRef<Path>>(path: P, s: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if ! parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(
                || anyhow!("creating directory {:?}", parent))?;
        }
    }
    fs::write(path, s).with_context(
        || anyhow!("writing to {:?}", path))
}

/// Paths of the plain files directly in `dir` whose extension is
/// `extension`, sorted.
pub fn filepaths_in_dir<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(
        || anyhow!("can't open directory for reading: {:?}", dir.to_string_lossy()))?
    {
        let entry = entry.with_context(
            || anyhow!("reading directory: {:?}", dir.to_string_lossy()))?;
        let path = entry.path();
        if entry.file_type()?.is_file()
            && path.extension().map_or(false, |e| e == extension)
        {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
