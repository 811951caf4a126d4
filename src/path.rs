//! Defines [`ContentPath`], the path of a content file relative to the content
//! root, modeled as an ordered list of segments. Every route-facing field of a
//! document (its slug, its route parameters, its collection root) is a pure
//! function of this type.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// File extensions recognized as content documents.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["mdx", "md"];

/// The path of a content file relative to the content root. For a source file
/// `{content_root}/tutorials/intro/modules/setup.mdx` the segments are
/// `["tutorials", "intro", "modules", "setup"]` and the extension is `mdx`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentPath {
    segments: Vec<String>,
    extension: String,
}

impl ContentPath {
    /// Builds a [`ContentPath`] from a path relative to the content root. The
    /// path must be made of normal, UTF-8 components and end in one of the
    /// [`MARKDOWN_EXTENSIONS`].
    pub fn parse(relative: &Path) -> Result<ContentPath, PathError> {
        let extension = match relative.extension().and_then(|e| e.to_str()) {
            Some(ext) if is_markdown_extension(ext) => ext.to_owned(),
            _ => return Err(PathError::NotMarkdown(relative.to_owned())),
        };

        let mut segments = Vec::new();
        for component in relative.with_extension("").components() {
            match component {
                Component::Normal(segment) => match segment.to_str() {
                    Some(s) if !s.is_empty() => segments.push(s.to_owned()),
                    _ => return Err(PathError::InvalidSegment(relative.to_owned())),
                },
                Component::CurDir => {}
                _ => return Err(PathError::InvalidSegment(relative.to_owned())),
            }
        }

        if segments.is_empty() {
            return Err(PathError::InvalidSegment(relative.to_owned()));
        }

        Ok(ContentPath {
            segments,
            extension,
        })
    }

    /// The segments of the path with the extension stripped from the last
    /// one.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The first segment, which names the collection directory (`posts`,
    /// `pages`, `tutorials`).
    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    /// The segments after the collection root. These are the route
    /// parameters of the document.
    pub fn param_segments(&self) -> &[String] {
        &self.segments[1..]
    }

    /// The source path as it appears on disk, relative to the content root,
    /// always `/`-separated.
    pub fn raw_path(&self) -> String {
        format!("{}.{}", self.flattened(), self.extension)
    }

    /// The path with its extension stripped, e.g. `posts/hello`.
    pub fn flattened(&self) -> String {
        self.segments.join("/")
    }

    /// The absolute route path of the document, e.g. `/posts/hello`.
    pub fn slug(&self) -> String {
        format!("/{}", self.flattened())
    }

    /// The path with its first segment removed and its extension stripped,
    /// e.g. `intro/modules/setup` for `tutorials/intro/modules/setup.mdx`.
    pub fn slug_as_params(&self) -> String {
        self.param_segments().join("/")
    }
}

impl fmt::Display for ContentPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.raw_path())
    }
}

/// Reports whether `path` carries one of the [`MARKDOWN_EXTENSIONS`].
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, is_markdown_extension)
}

fn is_markdown_extension(ext: &str) -> bool {
    MARKDOWN_EXTENSIONS.contains(&ext)
}

/// Returned when a relative path cannot be modeled as a [`ContentPath`].
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// The path does not end in a markdown extension.
    #[error("not a markdown file: {0:?}")]
    NotMarkdown(PathBuf),

    /// The path has a non-UTF-8, empty, parent or absolute component.
    #[error("invalid content path: {0:?}")]
    InvalidSegment(PathBuf),
}
