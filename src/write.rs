use crate::render::{not_found_page, render_listing, render_route, ListingPage, Page};
use crate::route::{enumerate_routes, listing_routes, RouteError, RouteParams};
use crate::store::Store;
use gtmpl::{Template, Value};
use log::{debug, warn};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

/// Responsible for templating and writing HTML pages to disk from a
/// [`Store`].
pub struct Writer<'a> {
    /// The template for detail pages (and the not-found page).
    pub page_template: &'a Template,

    /// The template for listing pages.
    pub index_template: &'a Template,

    /// The directory in which the HTML files will be written. A route
    /// `/posts/hello` is written to `{output_directory}/posts/hello/index.html`.
    pub output_directory: &'a Path,

    /// The site title, made available to every template as `site_title`.
    pub site_title: &'a str,

    /// The URL for the site's home page. This is made available to both page
    /// and index templates, typically as the destination for the site-header
    /// link.
    pub home_page: &'a Url,

    /// The URL for the static assets. This is made available to both page
    /// and index templates, typically for the theme's stylesheet.
    pub static_url: &'a Url,
}

/// Counts of what a [`Writer::write_site`] call produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Detail and listing pages written.
    pub written: usize,

    /// Routes skipped because no document backs them.
    pub missing: usize,
}

impl Writer<'_> {
    /// Takes a single template value, templates it, and writes it to
    /// `file_path`.
    fn write_value(&self, template: &Template, item: Value, file_path: &Path) -> Result<()> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("item".to_owned(), item);
        m.insert(
            "site_title".to_owned(),
            Value::String(self.site_title.to_owned()),
        );
        m.insert(
            "home_page".to_owned(),
            Value::String(self.home_page.to_string()),
        );
        m.insert(
            "static_url".to_owned(),
            Value::String(self.static_url.to_string()),
        );

        if let Some(dir) = file_path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let context = gtmpl::Context::from(Value::Object(m))?;
        template.execute(&mut std::fs::File::create(file_path)?, &context)?;
        debug!("wrote `{}`", file_path.display());
        Ok(())
    }

    /// Templates a detail [`Page`] and writes it under its slug.
    pub fn write_page(&self, page: &Page) -> Result<()> {
        self.write_value(
            self.page_template,
            Value::from(page),
            &output_path(self.output_directory, &page.slug),
        )
    }

    /// Templates a [`ListingPage`] and writes it under its listing path.
    pub fn write_listing(&self, listing: &ListingPage) -> Result<()> {
        self.write_value(
            self.index_template,
            Value::from(listing),
            &output_path(self.output_directory, listing.listing.path()),
        )
    }

    /// Writes `{output_directory}/404.html`.
    pub fn write_not_found(&self) -> Result<()> {
        self.write_value(
            self.page_template,
            Value::from(&not_found_page()),
            &self.output_directory.join("404.html"),
        )
    }

    /// Renders and writes every given route. A route without a backing
    /// document is logged and skipped; it does not stop the other routes
    /// from being written.
    pub fn write_routes(&self, store: &Store, routes: &[RouteParams]) -> Result<WriteReport> {
        let mut report = WriteReport::default();
        for params in routes {
            match render_route(store, params) {
                Ok(page) => {
                    self.write_page(&page)?;
                    report.written += 1;
                }
                Err(err) => {
                    warn!("{}; skipping", err);
                    report.missing += 1;
                }
            }
        }
        Ok(report)
    }

    /// Writes every detail page, every listing page and the not-found page
    /// for `store`.
    pub fn write_site(&self, store: &Store) -> Result<WriteReport> {
        let routes = enumerate_routes(store)?;
        let mut report = self.write_routes(store, &routes)?;
        for listing in listing_routes() {
            self.write_listing(&render_listing(store, listing))?;
            report.written += 1;
        }
        self.write_not_found()?;
        Ok(report)
    }
}

/// Maps a route path onto the file it is written to: `/` becomes
/// `index.html` and `/blog` becomes `blog/index.html`.
pub fn output_path(output_directory: &Path, route_path: &str) -> PathBuf {
    route_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(output_directory.to_owned(), |dir, segment| dir.join(segment))
        .join("index.html")
}

/// The result of a fallible page-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error during templating.
    #[error("templating: {0}")]
    Template(String),

    /// A document whose route parameters cannot be derived.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// An error writing the output files.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::test_document;

    #[test]
    fn test_output_path() {
        let out = Path::new("/out");
        assert_eq!(PathBuf::from("/out/index.html"), output_path(out, "/"));
        assert_eq!(PathBuf::from("/out/blog/index.html"), output_path(out, "/blog"));
        assert_eq!(
            PathBuf::from("/out/tutorials/intro/modules/setup/index.html"),
            output_path(out, "/tutorials/intro/modules/setup")
        );
    }

    fn template(text: &str) -> Template {
        let mut template = Template::default();
        template.parse(text).unwrap();
        template
    }

    #[test]
    fn test_missing_routes_do_not_abort() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = Store::from_documents(vec![test_document(
            "posts/hello.mdx",
            "---\ntitle: Hello\ndate: 2024-01-01\n---\nBody\n",
        )])
        .unwrap();
        let page_template = template("<h1>{{.item.title}}</h1>{{.item.body}}");
        let index_template = template("{{range .item.entries}}{{.title}};{{end}}");
        let home_page = Url::parse("https://example.org/").unwrap();
        let static_url = home_page.join("static/").unwrap();
        let writer = Writer {
            page_template: &page_template,
            index_template: &index_template,
            output_directory: dir.path(),
            site_title: "Example",
            home_page: &home_page,
            static_url: &static_url,
        };

        let routes = vec![
            RouteParams::Post {
                slug: vec!["missing".to_owned()],
            },
            RouteParams::Post {
                slug: vec!["hello".to_owned()],
            },
        ];
        let report = writer.write_routes(&store, &routes)?;
        assert_eq!(WriteReport { written: 1, missing: 1 }, report);

        let html = std::fs::read_to_string(dir.path().join("posts/hello/index.html"))?;
        assert!(html.starts_with("<h1>Hello</h1>"));
        assert!(!dir.path().join("posts/missing").exists());
        Ok(())
    }
}
