//! Defines the [`Document`] type and its per-collection front matter schemas.
//! A [`RawDocument`] is what the store parses out of a source file; resolving
//! it attaches the derived fields (see [`RawDocument::resolve`]).

use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::{de::Error as _, Deserialize, Deserializer};

use crate::path::{ContentPath, PathError};

/// The default reading speed used for [`ReadingTime`] estimates.
pub const DEFAULT_WORDS_PER_MINUTE: usize = 200;

/// The category of a document. The collection type decides both which front
/// matter schema applies and under which route the document is served.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionType {
    Page,
    Post,
    Tutorial,
    Module,
}

impl CollectionType {
    /// All collection types, in store order.
    pub const ALL: [CollectionType; 4] = [
        CollectionType::Page,
        CollectionType::Post,
        CollectionType::Tutorial,
        CollectionType::Module,
    ];

    /// Decides the collection type of a document from the shape of its path.
    /// Returns `Ok(None)` for paths outside every collection root, which the
    /// store skips.
    ///
    /// * `pages/**` is a [`CollectionType::Page`]
    /// * `posts/**` is a [`CollectionType::Post`]
    /// * `tutorials/{tutorial}` is a [`CollectionType::Tutorial`]
    /// * `tutorials/{tutorial}/modules/{module}` is a
    ///   [`CollectionType::Module`]
    pub fn classify(path: &ContentPath) -> Result<Option<CollectionType>, ValidationError> {
        if path.segments().len() < 2 {
            return Ok(None);
        }
        match path.root() {
            "pages" => Ok(Some(CollectionType::Page)),
            "posts" => Ok(Some(CollectionType::Post)),
            "tutorials" => match path.param_segments() {
                [_] => Ok(Some(CollectionType::Tutorial)),
                [_, modules, _] if modules == MODULES_SEGMENT => Ok(Some(CollectionType::Module)),
                _ => Err(ValidationError::InvalidModulePath(path.raw_path())),
            },
            _ => Ok(None),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CollectionType::Page => "Page",
            CollectionType::Post => "Post",
            CollectionType::Tutorial => "Tutorial",
            CollectionType::Module => "Module",
        }
    }
}

impl fmt::Display for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The literal segment separating a tutorial from its modules.
pub const MODULES_SEGMENT: &str = "modules";

/// Front matter for [`CollectionType::Page`] documents.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PageFields {
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// Front matter for [`CollectionType::Post`] and [`CollectionType::Tutorial`]
/// documents, which must carry a date.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DatedFields {
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub draft: bool,

    #[serde(deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
}

/// Front matter for [`CollectionType::Module`] documents. The date is
/// optional.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ModuleFields {
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub draft: bool,

    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub date: Option<NaiveDate>,
}

/// The validated front matter of a document, tagged by collection type.
#[derive(Clone, Debug, PartialEq)]
pub enum Frontmatter {
    Page(PageFields),
    Post(DatedFields),
    Tutorial(DatedFields),
    Module(ModuleFields),
}

impl Frontmatter {
    /// Validates a parsed YAML mapping against the schema of `collection`.
    /// Missing or wrongly typed fields, malformed dates and empty titles are
    /// all reported as [`ValidationError`]s.
    pub fn from_yaml(
        collection: CollectionType,
        value: serde_yaml::Value,
    ) -> Result<Frontmatter, ValidationError> {
        let frontmatter = match collection {
            CollectionType::Page => Frontmatter::Page(serde_yaml::from_value(value)?),
            CollectionType::Post => Frontmatter::Post(serde_yaml::from_value(value)?),
            CollectionType::Tutorial => Frontmatter::Tutorial(serde_yaml::from_value(value)?),
            CollectionType::Module => Frontmatter::Module(serde_yaml::from_value(value)?),
        };
        if frontmatter.title().trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(frontmatter)
    }

    pub fn collection(&self) -> CollectionType {
        match self {
            Frontmatter::Page(_) => CollectionType::Page,
            Frontmatter::Post(_) => CollectionType::Post,
            Frontmatter::Tutorial(_) => CollectionType::Tutorial,
            Frontmatter::Module(_) => CollectionType::Module,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Frontmatter::Page(f) => &f.title,
            Frontmatter::Post(f) | Frontmatter::Tutorial(f) => &f.title,
            Frontmatter::Module(f) => &f.title,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Frontmatter::Page(f) => f.description.as_deref(),
            Frontmatter::Post(f) | Frontmatter::Tutorial(f) => f.description.as_deref(),
            Frontmatter::Module(f) => f.description.as_deref(),
        }
    }

    /// Pages have no draft flag and are never drafts.
    pub fn draft(&self) -> bool {
        match self {
            Frontmatter::Page(_) => false,
            Frontmatter::Post(f) | Frontmatter::Tutorial(f) => f.draft,
            Frontmatter::Module(f) => f.draft,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Frontmatter::Page(_) => None,
            Frontmatter::Post(f) | Frontmatter::Tutorial(f) => Some(f.date),
            Frontmatter::Module(f) => f.date,
        }
    }
}

/// Parses either a calendar date (`2024-01-01`) or an RFC 3339 timestamp, in
/// which case only the date part is kept.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_date(&s).ok_or_else(|| D::Error::custom(format!("malformed date `{}`", s)))
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) => parse_date(&s)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("malformed date `{}`", s))),
    }
}

/// The body of a document: the raw markdown and the HTML produced by the
/// markup compiler ([`crate::markdown`]).
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub raw: String,
    pub html: String,
}

/// An estimate of how long a body takes to read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReadingTime {
    /// The number of whitespace-separated words in the body.
    pub words: usize,

    /// `words / words_per_minute`, rounded up.
    pub minutes: usize,
}

impl ReadingTime {
    /// Estimates the reading time of `text`. An empty body reads in zero
    /// minutes. A `words_per_minute` of zero is treated as one.
    pub fn estimate(text: &str, words_per_minute: usize) -> ReadingTime {
        let words = text.split_whitespace().count();
        ReadingTime {
            words,
            minutes: words.div_ceil(words_per_minute.max(1)),
        }
    }
}

impl fmt::Display for ReadingTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} min read", self.minutes)
    }
}

/// A parsed but not yet resolved document.
#[derive(Clone, Debug)]
pub struct RawDocument {
    pub path: ContentPath,
    pub frontmatter: Frontmatter,
    pub body: Body,
}

impl RawDocument {
    /// Attaches the derived fields. This never fails for a document that
    /// parsed.
    pub fn resolve(self, words_per_minute: usize) -> Document {
        let reading_time = ReadingTime::estimate(&self.body.raw, words_per_minute);
        Document {
            id: self.path.flattened(),
            path: self.path,
            frontmatter: self.frontmatter,
            body: self.body,
            reading_time,
        }
    }
}

/// A resolved content document. Documents are immutable once the store has
/// been built. The slug fields are derived from `path` on demand rather than
/// stored.
#[derive(Clone, Debug)]
pub struct Document {
    /// Unique within a store: the raw path without its extension.
    pub id: String,
    pub path: ContentPath,
    pub frontmatter: Frontmatter,
    pub body: Body,
    pub reading_time: ReadingTime,
}

impl Document {
    pub fn collection(&self) -> CollectionType {
        self.frontmatter.collection()
    }

    pub fn title(&self) -> &str {
        self.frontmatter.title()
    }

    pub fn description(&self) -> Option<&str> {
        self.frontmatter.description()
    }

    pub fn draft(&self) -> bool {
        self.frontmatter.draft()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.frontmatter.date()
    }

    /// See [`ContentPath::slug`].
    pub fn slug(&self) -> String {
        self.path.slug()
    }

    /// See [`ContentPath::slug_as_params`].
    pub fn slug_as_params(&self) -> String {
        self.path.slug_as_params()
    }
}

/// Represents a document that fails its collection's schema. Documents with a
/// validation error never enter the store.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A required field is missing, or a field has the wrong type or a
    /// malformed value.
    #[error("invalid front matter: {0}")]
    Schema(#[from] serde_yaml::Error),

    /// The title is present but blank.
    #[error("`title` must not be empty")]
    EmptyTitle,

    /// A file under `tutorials/` is neither `tutorials/{tutorial}` nor
    /// `tutorials/{tutorial}/modules/{module}`.
    #[error("`{0}` is not a tutorial or a module path")]
    InvalidModulePath(String),

    /// The source path cannot be modeled as a [`ContentPath`].
    #[error(transparent)]
    Path(#[from] PathError),

    /// Two documents of one collection share a raw path.
    #[error("duplicate {collection} document `{raw_path}`")]
    Duplicate {
        collection: CollectionType,
        raw_path: String,
    },
}
