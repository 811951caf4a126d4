//! Read-only queries over a [`Store`]. A [`Query`] is a selection of
//! documents which can be narrowed step by step; every step is pure and
//! leaves the store untouched.

use crate::document::{CollectionType, Document, MODULES_SEGMENT};
use crate::store::Store;

/// A selection of documents from a [`Store`], kept in store order unless
/// reordered with [`Query::newest_first`].
#[derive(Clone, Debug)]
pub struct Query<'a> {
    documents: Vec<&'a Document>,
}

impl Store {
    /// Starts a query selecting every document in the store.
    pub fn query(&self) -> Query<'_> {
        Query {
            documents: self.documents().iter().collect(),
        }
    }
}

impl<'a> Query<'a> {
    /// Keeps only the documents of one collection type.
    pub fn filter_by_type(mut self, collection: CollectionType) -> Self {
        self.documents.retain(|d| d.collection() == collection);
        self
    }

    /// Drops every document flagged as a draft. Drafts are still reachable
    /// through [`Query::find_by_slug_params`] on an unfiltered query.
    pub fn exclude_drafts(mut self) -> Self {
        self.documents.retain(|d| !d.draft());
        self
    }

    /// Keeps only the modules nested under the tutorial named
    /// `tutorial_name`.
    pub fn modules_of(mut self, tutorial_name: &str) -> Self {
        self.documents.retain(|d| {
            d.collection() == CollectionType::Module
                && matches!(
                    d.path.param_segments(),
                    [tutorial, modules, _] if tutorial == tutorial_name && modules == MODULES_SEGMENT
                )
        });
        self
    }

    /// Orders the selection by date, most recent first. Undated documents
    /// go last; ties keep their current order.
    pub fn newest_first(mut self) -> Self {
        self.documents.sort_by(|a, b| b.date().cmp(&a.date()));
        self
    }

    /// Finds the document whose `slugAsParams` is exactly `params`. Returns
    /// `None` when nothing matches; when several match (which only happens
    /// across collection types) the first in the selection wins.
    pub fn find_by_slug_params(&self, params: &str) -> Option<&'a Document> {
        self.documents
            .iter()
            .copied()
            .find(|d| d.slug_as_params() == params)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Document> + '_ {
        self.documents.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl<'a> IntoIterator for Query<'a> {
    type Item = &'a Document;
    type IntoIter = std::vec::IntoIter<&'a Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::test_document;

    fn store() -> Store {
        Store::from_documents(vec![
            test_document("posts/hello.mdx", "---\ntitle: Hello\ndate: 2024-01-01\n---\n"),
            test_document(
                "posts/wip.mdx",
                "---\ntitle: WIP\ndate: 2024-03-01\ndraft: true\n---\n",
            ),
            test_document("posts/older.mdx", "---\ntitle: Older\ndate: 2023-06-01\n---\n"),
            test_document("pages/hello.md", "---\ntitle: Hello page\n---\n"),
            test_document("tutorials/intro.mdx", "---\ntitle: Intro\ndate: 2024-02-01\n---\n"),
            test_document("tutorials/rust.mdx", "---\ntitle: Rust\ndate: 2024-02-02\n---\n"),
            test_document(
                "tutorials/intro/modules/setup.mdx",
                "---\ntitle: Setup\n---\n",
            ),
            test_document(
                "tutorials/intro/modules/next.mdx",
                "---\ntitle: Next\ndraft: true\n---\n",
            ),
            test_document(
                "tutorials/rust/modules/ownership.mdx",
                "---\ntitle: Ownership\n---\n",
            ),
        ])
        .unwrap()
    }

    fn titles(query: &Query) -> Vec<String> {
        query.iter().map(|d| d.title().to_owned()).collect()
    }

    #[test]
    fn test_filter_by_type() {
        let store = store();
        let posts = store.query().filter_by_type(CollectionType::Post);
        assert_eq!(vec!["WIP", "Hello", "Older"], titles(&posts));
        assert!(posts.iter().all(|d| d.collection() == CollectionType::Post));
    }

    #[test]
    fn test_exclude_drafts_is_idempotent_subset() {
        let store = store();
        let once = store.query().exclude_drafts();
        let twice = once.clone().exclude_drafts();
        assert!(once.iter().all(|d| !d.draft()));
        assert!(once.len() < store.len());
        assert_eq!(titles(&once), titles(&twice));
    }

    #[test]
    fn test_find_by_slug_params() {
        let store = store();
        let posts = store.query().filter_by_type(CollectionType::Post);
        assert_eq!("Hello", posts.find_by_slug_params("hello").unwrap().title());
        assert!(posts.find_by_slug_params("missing").is_none());
        assert!(posts.find_by_slug_params("").is_none());

        // drafts stay individually resolvable
        assert_eq!("WIP", posts.find_by_slug_params("wip").unwrap().title());

        let modules = store.query().filter_by_type(CollectionType::Module);
        assert_eq!(
            "Setup",
            modules
                .find_by_slug_params("intro/modules/setup")
                .unwrap()
                .title()
        );
    }

    #[test]
    fn test_modules_of() {
        let store = store();
        let modules = store.query().modules_of("intro");
        assert_eq!(2, modules.len());
        assert_eq!(vec!["Setup"], titles(&modules.exclude_drafts()));
        assert!(store.query().modules_of("missing").is_empty());
    }

    #[test]
    fn test_newest_first() {
        let store = store();
        let tutorials = store
            .query()
            .filter_by_type(CollectionType::Tutorial)
            .newest_first();
        assert_eq!(vec!["Rust", "Intro"], titles(&tutorials));
    }
}
