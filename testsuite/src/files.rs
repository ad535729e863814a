use anyhow::{Context, Result};
use oxrdf::Graph;
use std::fs;
use std::path::{Path, PathBuf};

/// The root shape document of a profile: `<root>/validation/<profile>.ttl`.
pub fn shapes_path(root: &Path, profile: &str) -> PathBuf {
    root.join("validation").join(format!("{profile}.ttl"))
}

/// The fixture directory of a profile: `<root>/test/<profile>/`.
pub fn fixtures_dir(root: &Path, profile: &str) -> PathBuf {
    root.join("test").join(profile)
}

/// Every `*.ttl` file directly inside `dir`, sorted by file name.
pub fn fixture_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?
    {
        let path = entry
            .with_context(|| format!("Failed to read {}", dir.display()))?
            .path();
        if path.is_file() && path.extension().is_some_and(|e| e == "ttl") {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Loads a single Turtle document without following its imports.
pub fn load_graph(path: &Path) -> Result<Graph> {
    let triples = cubeshapes::parse_document(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    Ok(triples.iter().collect())
}

/// The file name of `path` as displayed in reports.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
