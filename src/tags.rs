//! Tag index.
//!
//! Derived once from the sorted document list. Tag order is first-seen
//! order across that list; within a tag, documents keep list order. Nothing
//! is sorted independently, so the home listing, tag listings and the
//! navigation all agree on one ordering.
//!
//! Tags are compared exactly: `Go` and `go` are different tags.

use crate::types::Document;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct TagIndex<'a> {
    tags: Vec<&'a str>,
    posts_by_tag: HashMap<&'a str, Vec<&'a Document>>,
}

impl<'a> TagIndex<'a> {
    pub fn build(documents: &'a [Document]) -> Self {
        let mut index = TagIndex::default();
        for doc in documents {
            for tag in &doc.tags {
                let tag = tag.as_str();
                index
                    .posts_by_tag
                    .entry(tag)
                    .or_insert_with(|| {
                        index.tags.push(tag);
                        Vec::new()
                    })
                    .push(doc);
            }
        }
        index
    }

    /// Distinct tags in first-seen order.
    pub fn tags(&self) -> &[&'a str] {
        &self.tags
    }

    /// Documents carrying `tag`, in document list order.
    pub fn posts(&self, tag: &str) -> &[&'a Document] {
        self.posts_by_tag.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tags with their documents, in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &[&'a Document])> + '_ {
        self.tags.iter().map(|&tag| (tag, self.posts(tag)))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
