use crate::document::{canonicalize, parse_canonical};
use crate::error::ImportError;
use crate::vocab::code;
use oxrdf::{Graph, NamedNodeRef, Term, Triple};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use url::Url;

/// Loads the shape document at `path` together with everything it transitively imports.
///
/// Missing imported documents are skipped.
pub fn load_shapes(path: impl AsRef<Path>) -> Result<Graph, ImportError> {
    ShapesLoader::new().load(path)
}

/// Loads the shape document at `path` and its imports, skipping every document already in `visited`.
///
/// Every loaded document is added to `visited`.
/// Loading a document already in `visited` returns an empty graph.
pub fn resolve(
    path: impl AsRef<Path>,
    visited: &mut HashSet<PathBuf>,
) -> Result<Graph, ImportError> {
    ShapesLoader::new().resolve(path, visited)
}

/// Whether `predicate` is a loader directive that never belongs in the merged shapes.
pub fn is_directive(predicate: NamedNodeRef<'_>) -> bool {
    predicate == code::IMPORTS || predicate == code::EXTENSION
}

/// Computes the file targeted by an import `reference` written in a document located in `base_dir`.
///
/// A leading `./` is ignored and the `.ttl` extension is added when missing.
/// Returns [`None`] if the reference is empty.
///
/// ```
/// use cubeshapes::import_target;
/// use std::path::Path;
///
/// assert_eq!(
///     import_target(Path::new("/shapes"), "./base"),
///     Some(Path::new("/shapes/base.ttl").to_owned())
/// );
/// assert_eq!(
///     import_target(Path::new("/shapes"), "lib/cube.ttl"),
///     Some(Path::new("/shapes/lib/cube.ttl").to_owned())
/// );
/// ```
pub fn import_target(base_dir: &Path, reference: &str) -> Option<PathBuf> {
    let relative = reference.strip_prefix("./").unwrap_or(reference);
    if relative.is_empty() {
        return None;
    }
    Some(if relative.ends_with(".ttl") {
        base_dir.join(relative)
    } else {
        base_dir.join(format!("{relative}.ttl"))
    })
}

/// Shape document loader following `code:imports` directives.
///
/// ```no_run
/// use cubeshapes::ShapesLoader;
///
/// let shapes = ShapesLoader::new().strict().load("validation/profile-visualize.ttl")?;
/// println!("{} triples", shapes.len());
/// # Result::<_, cubeshapes::ImportError>::Ok(())
/// ```
#[derive(Default, Clone, Copy, Debug)]
#[must_use]
pub struct ShapesLoader {
    strict: bool,
}

impl ShapesLoader {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with [`ImportError::MissingImport`] when an imported document does not exist
    /// instead of skipping it.
    #[inline]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Loads the document at `path` and everything it transitively imports.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Graph, ImportError> {
        self.resolve(path, &mut HashSet::new())
    }

    /// Same as [`load`](Self::load) but shares `visited` with the caller.
    pub fn resolve(
        &self,
        path: impl AsRef<Path>,
        visited: &mut HashSet<PathBuf>,
    ) -> Result<Graph, ImportError> {
        let path = canonicalize(path.as_ref())?;
        let mut graph = Graph::new();
        self.resolve_into(path, visited, &mut graph)?;
        Ok(graph)
    }

    fn resolve_into(
        &self,
        path: PathBuf,
        visited: &mut HashSet<PathBuf>,
        graph: &mut Graph,
    ) -> Result<(), ImportError> {
        if !visited.insert(path.clone()) {
            trace!("{} already loaded", path.display());
            return Ok(());
        }
        let triples = parse_canonical(&path)?;
        debug!("Loaded {} triples from {}", triples.len(), path.display());
        let base_dir = path.parent().unwrap_or(Path::new("/"));

        let mut imports = Vec::new();
        for triple in triples {
            if triple.predicate.as_ref() == code::IMPORTS {
                if let Some(target) = self.import_of(&path, base_dir, &triple)? {
                    imports.push(target);
                }
            } else if !is_directive(triple.predicate.as_ref()) {
                graph.insert(&triple);
            }
        }
        for target in imports {
            self.resolve_into(target, visited, graph)?;
        }
        Ok(())
    }

    /// Returns the canonical path targeted by an import directive, if it exists.
    fn import_of(
        &self,
        importer: &Path,
        base_dir: &Path,
        directive: &Triple,
    ) -> Result<Option<PathBuf>, ImportError> {
        let Some(target) = reference(&directive.object).and_then(|r| import_target(base_dir, &r))
        else {
            debug!(
                "Ignoring import of {} in {}: not a local document",
                directive.object,
                importer.display()
            );
            return Ok(None);
        };
        trace!("{} imports {}", importer.display(), target.display());
        match canonicalize(&target) {
            Ok(target) => Ok(Some(target)),
            Err(ImportError::NotFound { .. }) if !self.strict => {
                debug!(
                    "Skipping missing import {} of {}",
                    target.display(),
                    importer.display()
                );
                Ok(None)
            }
            Err(ImportError::NotFound { .. }) => Err(ImportError::MissingImport {
                importer: importer.to_owned(),
                target,
            }),
            Err(e) => Err(e),
        }
    }
}

/// The path written in an import directive object.
///
/// IRIs have already been resolved against the document `file:` URL, literals are used as is.
fn reference(object: &Term) -> Option<String> {
    match object {
        Term::Literal(literal) => Some(literal.value().to_owned()),
        Term::NamedNode(node) => {
            let path = Url::parse(node.as_str()).ok()?.to_file_path().ok()?;
            Some(path.to_str()?.to_owned())
        }
        _ => None,
    }
}
