//! Turns resolved documents into [`Page`] artifacts and listing selections
//! into [`ListingPage`]s. Nothing here touches templates or the file system;
//! see [`crate::write`] for that.

use chrono::NaiveDate;

use crate::document::{CollectionType, Document, ReadingTime};
use crate::route::{Listing, RouteParams};
use crate::store::Store;

/// A rendered detail page.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub title: String,
    pub description: Option<String>,

    /// The compiled body HTML.
    pub body: String,
    pub slug: String,
    pub date: Option<NaiveDate>,
    pub reading_time: ReadingTime,

    /// Documents listed below the body. Only tutorial pages have any: the
    /// tutorial's published modules.
    pub children: Vec<Summary>,
}

/// The listing-facing view of a document.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub id: String,
    pub collection: CollectionType,
    pub title: String,
    pub description: Option<String>,
    pub slug: String,
    pub date: Option<NaiveDate>,
    pub reading_time: ReadingTime,
}

impl From<&Document> for Summary {
    fn from(document: &Document) -> Summary {
        Summary {
            id: document.id.clone(),
            collection: document.collection(),
            title: document.title().to_owned(),
            description: document.description().map(str::to_owned),
            slug: document.slug(),
            date: document.date(),
            reading_time: document.reading_time,
        }
    }
}

/// A rendered listing page.
#[derive(Clone, Debug, PartialEq)]
pub struct ListingPage {
    pub listing: Listing,
    pub title: String,
    pub description: Option<String>,
    pub entries: Vec<Summary>,
}

/// Renders a single document.
pub fn render(document: &Document) -> Page {
    Page {
        title: document.title().to_owned(),
        description: document.description().map(str::to_owned),
        body: document.body.html.clone(),
        slug: document.slug(),
        date: document.date(),
        reading_time: document.reading_time,
        children: Vec::new(),
    }
}

/// Looks up the document behind `params` and renders it. Drafts resolve like
/// any other document.
pub fn render_route(store: &Store, params: &RouteParams) -> Result<Page, NotFoundError> {
    let document = store
        .query()
        .filter_by_type(params.collection())
        .find_by_slug_params(&params.slug_as_params())
        .ok_or_else(|| NotFoundError {
            path: params.path(),
        })?;

    let mut page = render(document);
    if let RouteParams::Tutorial { tutorial_name } = params {
        page.children = store
            .query()
            .modules_of(tutorial_name)
            .exclude_drafts()
            .iter()
            .map(Summary::from)
            .collect();
    }
    Ok(page)
}

/// Renders one of the site's listing pages.
pub fn render_listing(store: &Store, listing: Listing) -> ListingPage {
    let published = |collection| {
        store
            .query()
            .filter_by_type(collection)
            .exclude_drafts()
            .newest_first()
    };
    let entries: Vec<Summary> = match listing {
        Listing::Home => published(CollectionType::Post)
            .into_iter()
            .chain(published(CollectionType::Module))
            .map(Summary::from)
            .collect(),
        Listing::Blog => published(CollectionType::Post)
            .into_iter()
            .map(Summary::from)
            .collect(),
        Listing::Tutorials => published(CollectionType::Tutorial)
            .into_iter()
            .map(Summary::from)
            .collect(),
    };
    ListingPage {
        listing,
        title: listing.title().to_owned(),
        description: listing.description().map(str::to_owned),
        entries,
    }
}

/// The page rendered in place of any route without a backing document.
pub fn not_found_page() -> Page {
    Page {
        title: String::from("Not found"),
        description: Some(String::from("This page could not be found.")),
        body: String::new(),
        slug: String::from("/404"),
        date: None,
        reading_time: ReadingTime::default(),
        children: Vec::new(),
    }
}

/// Returned when a route has no backing document. This is an expected
/// outcome and only affects the one route.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no document for route `{path}`")]
pub struct NotFoundError {
    pub path: String,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::test_document;

    fn store() -> Store {
        Store::from_documents(vec![
            test_document(
                "posts/hello.mdx",
                "---\ntitle: Hello\ndescription: Greetings\ndate: 2024-01-01\n---\n# Hi\n",
            ),
            test_document(
                "posts/wip.mdx",
                "---\ntitle: WIP\ndate: 2024-03-01\ndraft: true\n---\n",
            ),
            test_document("tutorials/intro.mdx", "---\ntitle: Intro\ndate: 2024-02-01\n---\n"),
            test_document(
                "tutorials/intro/modules/setup.mdx",
                "---\ntitle: Setup\ndate: 2024-02-03\n---\n",
            ),
            test_document(
                "tutorials/intro/modules/later.mdx",
                "---\ntitle: Later\ndraft: true\n---\n",
            ),
            test_document(
                "tutorials/other/modules/elsewhere.mdx",
                "---\ntitle: Elsewhere\n---\n",
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_render() {
        let store = store();
        let page = render_route(
            &store,
            &RouteParams::Post {
                slug: vec!["hello".to_owned()],
            },
        )
        .unwrap();
        assert_eq!("Hello", page.title);
        assert_eq!(Some("Greetings".to_owned()), page.description);
        assert_eq!("/posts/hello", page.slug);
        assert!(page.body.contains("Hi</h1>"));
    }

    #[test]
    fn test_drafts_render() {
        let store = store();
        let page = render_route(
            &store,
            &RouteParams::Post {
                slug: vec!["wip".to_owned()],
            },
        )
        .unwrap();
        assert_eq!("WIP", page.title);
    }

    #[test]
    fn test_not_found() {
        let store = store();
        let err = render_route(
            &store,
            &RouteParams::Module {
                tutorial_name: "intro".to_owned(),
                module: "missing".to_owned(),
            },
        )
        .unwrap_err();
        assert_eq!("/tutorials/intro/modules/missing", err.path);
    }

    #[test]
    fn test_wrong_collection_is_not_found() {
        let store = store();
        assert!(render_route(
            &store,
            &RouteParams::Page {
                slug: vec!["hello".to_owned()]
            }
        )
        .is_err());
    }

    #[test]
    fn test_tutorial_lists_its_published_modules() {
        let store = store();
        let page = render_route(
            &store,
            &RouteParams::Tutorial {
                tutorial_name: "intro".to_owned(),
            },
        )
        .unwrap();
        let titles: Vec<&str> = page.children.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(vec!["Setup"], titles);
    }

    #[test]
    fn test_listings() {
        let store = store();
        let titles = |listing| -> Vec<String> {
            render_listing(&store, listing)
                .entries
                .into_iter()
                .map(|s| s.title)
                .collect()
        };
        assert_eq!(vec!["Hello"], titles(Listing::Blog));
        assert_eq!(vec!["Intro"], titles(Listing::Tutorials));
        assert_eq!(vec!["Hello", "Setup", "Elsewhere"], titles(Listing::Home));
    }
}
