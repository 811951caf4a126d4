//! Defines the [`Store`], the immutable snapshot of every document in a
//! content tree, and the logic for loading it from the file system. See
//! [`Store::load`] for the expected layout of source files.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use log::{debug, info};
use rayon::prelude::*;
use url::Url;
use walkdir::WalkDir;

use crate::{
    document::{Body, CollectionType, Document, Frontmatter, RawDocument, ValidationError},
    markdown,
    path::{is_markdown, ContentPath},
};

/// Options which control how documents are parsed and resolved.
#[derive(Clone, Debug)]
pub struct LoadOptions {
    /// The URL of the content root, used to resolve links between documents.
    pub site_root: Url,

    /// The reading speed for [`crate::document::ReadingTime`] estimates.
    pub words_per_minute: usize,

    /// The number of worker threads used for parsing. `0` lets the thread
    /// pool pick.
    pub threads: usize,
}

/// An immutable collection of resolved documents. Documents are ordered by
/// collection type, then by date (most recent first), then by raw path.
#[derive(Clone, Debug, Default)]
pub struct Store {
    documents: Vec<Document>,
}

impl Store {
    /// Builds a store directly from resolved documents, enforcing the same
    /// uniqueness and ordering rules as [`Store::load`]. Documents are unique
    /// by id, so `posts/a.md` and `posts/a.mdx` collide.
    pub fn from_documents(mut documents: Vec<Document>) -> Result<Store> {
        let mut seen = HashSet::new();
        for document in &documents {
            if !seen.insert(document.id.as_str()) {
                return Err(Error::Validation {
                    path: document.path.raw_path(),
                    err: ValidationError::Duplicate {
                        collection: document.collection(),
                        raw_path: document.path.raw_path(),
                    },
                });
            }
        }
        documents.sort_by(|a, b| {
            a.collection()
                .cmp(&b.collection())
                .then_with(|| b.date().cmp(&a.date()))
                .then_with(|| a.path.cmp(&b.path))
        });
        Ok(Store { documents })
    }

    /// Loads every document under `content_root`. Files are classified by
    /// their path (see [`CollectionType::classify`]); files outside the
    /// collection roots or without a markdown extension are skipped. Each
    /// document must be structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter matching its collection's schema
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Markdown body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// title: Hello, world!
    /// date: 2024-01-01
    /// draft: false
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    ///
    /// The first invalid document fails the whole load.
    pub fn load(content_root: &Path, options: &LoadOptions) -> Result<Store> {
        let mut sources = Vec::new();
        for result in WalkDir::new(content_root).sort_by_file_name() {
            let entry = result?;
            if !entry.file_type().is_file() {
                continue;
            }
            // strip_prefix() should never fail since `content_root` is an
            // ancestor of every entry
            let relative = entry
                .path()
                .strip_prefix(content_root)
                .unwrap_or_else(|_| entry.path());
            if !is_markdown(relative) {
                debug!("skipping non-markdown file `{}`", relative.display());
                continue;
            }
            let path = ContentPath::parse(relative).map_err(|e| Error::Validation {
                path: relative.display().to_string(),
                err: ValidationError::Path(e),
            })?;
            let collection =
                CollectionType::classify(&path).map_err(|err| Error::Validation {
                    path: path.raw_path(),
                    err,
                })?;
            match collection {
                Some(collection) => sources.push((collection, path, entry.into_path())),
                None => debug!("skipping `{}`: not in a collection", path),
            }
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.threads)
            .build()?;
        let documents = pool.install(|| {
            sources
                .into_par_iter()
                .map(|(collection, path, full_path)| {
                    let raw = parse_document(collection, path, &full_path, options)?;
                    Ok(raw.resolve(options.words_per_minute))
                })
                .collect::<Result<Vec<Document>>>()
        })?;

        let store = Store::from_documents(documents)?;
        info!(
            "loaded {} documents from `{}` ({} pages, {} posts, {} tutorials, {} modules)",
            store.len(),
            content_root.display(),
            store.count(CollectionType::Page),
            store.count(CollectionType::Post),
            store.count(CollectionType::Tutorial),
            store.count(CollectionType::Module),
        );
        Ok(store)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn count(&self, collection: CollectionType) -> usize {
        self.documents
            .iter()
            .filter(|d| d.collection() == collection)
            .count()
    }
}

/// Splits a source file into its YAML frontmatter and its body. Returns the
/// frontmatter text and the body text.
pub fn split_frontmatter(input: &str) -> std::result::Result<(&str, &str), ParseError> {
    const FENCE: &str = "---";
    if !input.starts_with(FENCE) {
        return Err(ParseError::FrontmatterMissingStartFence);
    }
    match input[FENCE.len()..].find("\n---") {
        None => Err(ParseError::FrontmatterMissingEndFence),
        Some(offset) => {
            let yaml_stop = FENCE.len() + offset;
            let body_start = yaml_stop + 1 + FENCE.len();
            let body = &input[body_start..];
            // drop the remainder of the closing fence line
            let body = match body.find('\n') {
                Some(i) if body[..i].trim().is_empty() => &body[i + 1..],
                _ if body.trim().is_empty() => "",
                _ => body,
            };
            Ok((&input[FENCE.len()..yaml_stop], body))
        }
    }
}

/// Parses a single document from the file at `full_path`.
pub fn parse_document(
    collection: CollectionType,
    path: ContentPath,
    full_path: &Path,
    options: &LoadOptions,
) -> Result<RawDocument> {
    let bytes = std::fs::read(full_path).map_err(|err| Error::Io {
        path: full_path.to_owned(),
        err,
    })?;
    parse_source(collection, path, bytes, options)
}

/// Parses a single document from the contents of its source file.
pub fn parse_source(
    collection: CollectionType,
    path: ContentPath,
    bytes: Vec<u8>,
    options: &LoadOptions,
) -> Result<RawDocument> {
    let parse_error = |err: ParseError| Error::Parse {
        path: path.raw_path(),
        err,
    };

    let contents = String::from_utf8(bytes).map_err(|e| parse_error(ParseError::Utf8(e)))?;
    let (yaml, body) = split_frontmatter(&contents).map_err(parse_error)?;

    let value: serde_yaml::Value = match yaml.trim().is_empty() {
        true => serde_yaml::Value::Mapping(serde_yaml::Mapping::new()),
        false => serde_yaml::from_str(yaml).map_err(|e| parse_error(ParseError::Yaml(e)))?,
    };
    let frontmatter =
        Frontmatter::from_yaml(collection, value).map_err(|err| Error::Validation {
            path: path.raw_path(),
            err,
        })?;

    let slug = path.slug();
    let mut html = String::new();
    markdown::to_html(
        &mut html,
        &options.site_root,
        &path.raw_path(),
        body,
        &slug,
    )
    .map_err(|e| parse_error(ParseError::Markup(e)))?;

    Ok(RawDocument {
        path,
        frontmatter,
        body: Body {
            raw: body.to_owned(),
            html,
        },
    })
}

/// Represents the result of a [`Store`] operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a source file that cannot be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Returned when a source file is missing its starting frontmatter
    /// fence (`---`).
    #[error("document must begin with `---`")]
    FrontmatterMissingStartFence,

    /// Returned when a source file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    #[error("missing closing `---`")]
    FrontmatterMissingEndFence,

    /// Returned when the frontmatter is not syntactically valid YAML.
    #[error("frontmatter is not valid YAML: {0}")]
    Yaml(serde_yaml::Error),

    /// Returned when a source file isn't valid UTF-8.
    #[error("document is not valid UTF-8: {0}")]
    Utf8(std::string::FromUtf8Error),

    /// Returned when the body cannot be compiled.
    #[error("body: {0}")]
    Markup(markdown::Error),
}

/// Represents an error loading a [`Store`]. Every variant aborts the load.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A document failed its collection's schema.
    #[error("validating `{path}`: {err}")]
    Validation {
        path: String,
        #[source]
        err: ValidationError,
    },

    /// A document could not be parsed.
    #[error("parsing `{path}`: {err}")]
    Parse {
        path: String,
        #[source]
        err: ParseError,
    },

    /// Returned for I/O errors reading a source file.
    #[error("reading {path:?}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned for WalkDir I/O errors.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Returned when the parsing thread pool cannot be started.
    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse { .. })
    }
}

/// Builds a resolved document from its raw path and source text. Panics on
/// invalid input.
#[cfg(test)]
pub(crate) fn test_document(raw_path: &str, source: &str) -> Document {
    let path = ContentPath::parse(Path::new(raw_path)).unwrap();
    let collection = CollectionType::classify(&path).unwrap().unwrap();
    let options = LoadOptions {
        site_root: Url::parse("https://example.org/").unwrap(),
        words_per_minute: crate::document::DEFAULT_WORDS_PER_MINUTE,
        threads: 1,
    };
    parse_source(collection, path, source.as_bytes().to_vec(), &options)
        .unwrap()
        .resolve(options.words_per_minute)
}
