//! The library code for the `folio` static site generator. The architecture
//! can be generally broken down into two distinct steps:
//!
//! 1. Loading documents from source files on disk into an immutable
//!    [`store::Store`]
//! 2. Converting the store into output files on disk ([`crate::write`])
//!
//! Loading walks the content directory, classifies each file into a
//! collection (pages, posts, tutorials and their modules) by its path,
//! validates its front matter against that collection's schema, compiles its
//! body ([`crate::markdown`]) and attaches the derived fields: slug, route
//! parameters and reading time. Any invalid document fails the build before
//! anything is written.
//!
//! Writing is itself composed of three sub-steps:
//!
//! 1. Enumerating one route per document ([`crate::route`])
//! 2. Rendering each route, plus the listing pages, from queries over the
//!    store ([`crate::query`], [`crate::render`])
//! 3. Applying the page or index template and writing the result to disk
//!
//! Drafts get a route and a page like any other document; they are only
//! left out of listings.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod document;
pub mod htmlrenderer;
pub mod markdown;
pub mod path;
pub mod query;
pub mod render;
pub mod route;
pub mod store;
pub mod url;
mod util;
mod value;
pub mod write;
