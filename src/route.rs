//! Maps documents to the concrete routes that get pre-rendered. Every
//! document in the store gets a route, drafts included: whether a draft shows
//! up in a listing is decided by the listing's query, not here.

use std::fmt;

use crate::document::{CollectionType, Document, MODULES_SEGMENT};
use crate::store::Store;

/// The dynamic parameters of a detail route. Hierarchical collections carry
/// one field per level, in order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteParams {
    /// `/pages/{slug..}`
    Page { slug: Vec<String> },

    /// `/posts/{slug..}`
    Post { slug: Vec<String> },

    /// `/tutorials/{tutorial-name}`
    Tutorial { tutorial_name: String },

    /// `/tutorials/{tutorial-name}/modules/{module}`
    Module {
        tutorial_name: String,
        module: String,
    },
}

impl RouteParams {
    /// Derives the route parameters of a document from its `slugAsParams`
    /// segments.
    pub fn from_document(document: &Document) -> Result<RouteParams, RouteError> {
        let segments = document.path.param_segments();
        Ok(match document.collection() {
            CollectionType::Page => RouteParams::Page {
                slug: segments.to_vec(),
            },
            CollectionType::Post => RouteParams::Post {
                slug: segments.to_vec(),
            },
            CollectionType::Tutorial => match segments {
                [tutorial_name] => RouteParams::Tutorial {
                    tutorial_name: tutorial_name.clone(),
                },
                _ => return Err(RouteError::Shape(document.path.raw_path())),
            },
            CollectionType::Module => match segments {
                [tutorial_name, modules, module] if modules == MODULES_SEGMENT => {
                    RouteParams::Module {
                        tutorial_name: tutorial_name.clone(),
                        module: module.clone(),
                    }
                }
                _ => return Err(RouteError::Shape(document.path.raw_path())),
            },
        })
    }

    pub fn collection(&self) -> CollectionType {
        match self {
            RouteParams::Page { .. } => CollectionType::Page,
            RouteParams::Post { .. } => CollectionType::Post,
            RouteParams::Tutorial { .. } => CollectionType::Tutorial,
            RouteParams::Module { .. } => CollectionType::Module,
        }
    }

    /// Rebuilds the `slugAsParams` string the route was derived from. This is
    /// the key detail pages look their document up by.
    pub fn slug_as_params(&self) -> String {
        match self {
            RouteParams::Page { slug } | RouteParams::Post { slug } => slug.join("/"),
            RouteParams::Tutorial { tutorial_name } => tutorial_name.clone(),
            RouteParams::Module {
                tutorial_name,
                module,
            } => format!("{}/{}/{}", tutorial_name, MODULES_SEGMENT, module),
        }
    }

    /// The named parameters of the route, in order, e.g.
    /// `[("tutorial-name", "intro"), ("module", "setup")]`.
    pub fn named(&self) -> Vec<(&'static str, String)> {
        match self {
            RouteParams::Page { slug } | RouteParams::Post { slug } => {
                vec![("slug", slug.join("/"))]
            }
            RouteParams::Tutorial { tutorial_name } => {
                vec![("tutorial-name", tutorial_name.clone())]
            }
            RouteParams::Module {
                tutorial_name,
                module,
            } => vec![
                ("tutorial-name", tutorial_name.clone()),
                ("module", module.clone()),
            ],
        }
    }

    /// The URL path of the route. This always equals the slug of the
    /// document the route was derived from.
    pub fn path(&self) -> String {
        let root = match self.collection() {
            CollectionType::Page => "pages",
            CollectionType::Post => "posts",
            CollectionType::Tutorial | CollectionType::Module => "tutorials",
        };
        format!("/{}/{}", root, self.slug_as_params())
    }
}

impl fmt::Display for RouteParams {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Enumerates one route per document in the store, drafts included, in store
/// order.
pub fn enumerate_routes(store: &Store) -> Result<Vec<RouteParams>, RouteError> {
    store
        .documents()
        .iter()
        .map(RouteParams::from_document)
        .collect()
}

/// Enumerates the listing pages, which are rendered alongside the detail
/// routes.
pub fn listing_routes() -> [Listing; 3] {
    Listing::ALL
}

/// The listing pages of the site. Each one renders a filtered, draft-free
/// selection of documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Listing {
    /// `/`: every published post and module.
    Home,

    /// `/blog`: every published post.
    Blog,

    /// `/tutorials`: every published tutorial.
    Tutorials,
}

impl Listing {
    pub const ALL: [Listing; 3] = [Listing::Home, Listing::Blog, Listing::Tutorials];

    pub fn path(self) -> &'static str {
        match self {
            Listing::Home => "/",
            Listing::Blog => "/blog",
            Listing::Tutorials => "/tutorials",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Listing::Home => "All the stuff",
            Listing::Blog => "Posts",
            Listing::Tutorials => "Tutorials",
        }
    }

    pub fn description(self) -> Option<&'static str> {
        match self {
            Listing::Home => Some("Everything I've written"),
            Listing::Blog | Listing::Tutorials => None,
        }
    }
}

/// Returned when a document's path cannot be turned into route parameters.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("`{0}` does not have the path shape its collection requires")]
    Shape(String),
}
