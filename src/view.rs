// src/view.rs
//
// View projection: (contacts, active view, search term, tag filter) -> the
// ordered list to display. Pure, recomputed on every input change.
//
// Stages run in a fixed order and only ever narrow: scope, search, tag.
// Input order is preserved.

use serde::{Deserialize, Serialize};

use crate::models::Contact;

/// Tag labels offered by the add form and the tag filter.
pub const KNOWN_TAGS: [&str; 5] = ["family", "work", "friends", "college", "others"];

const ALL_TAGS: &str = "all";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveView {
    #[default]
    All,
    Favorites,
    Groups,
    Archives,
}

impl ActiveView {
    pub const EVERY: [ActiveView; 4] = [
        ActiveView::All,
        ActiveView::Favorites,
        ActiveView::Groups,
        ActiveView::Archives,
    ];

    /// Stage 1: does `contact` belong to this scope?
    pub fn admits(self, contact: &Contact) -> bool {
        match self {
            ActiveView::All => !contact.is_archived,
            ActiveView::Favorites => contact.is_favorite,
            ActiveView::Groups => contact.group_id.is_some(),
            ActiveView::Archives => contact.is_archived,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActiveView::All => "all",
            ActiveView::Favorites => "favorites",
            ActiveView::Groups => "groups",
            ActiveView::Archives => "archives",
        }
    }
}

impl std::fmt::Display for ActiveView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActiveView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(ActiveView::All),
            "favorites" => Ok(ActiveView::Favorites),
            "groups" => Ok(ActiveView::Groups),
            "archives" => Ok(ActiveView::Archives),
            other => Err(format!("unknown view '{other}'")),
        }
    }
}

/// Tag filter; `All` is the "all tags" sentinel and disables stage 3.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TagFilter {
    #[default]
    All,
    Tag(String),
}

impl From<String> for TagFilter {
    fn from(s: String) -> Self {
        if s.is_empty() || s == ALL_TAGS {
            TagFilter::All
        } else {
            TagFilter::Tag(s)
        }
    }
}

impl From<&str> for TagFilter {
    fn from(s: &str) -> Self {
        TagFilter::from(s.to_string())
    }
}

impl From<TagFilter> for String {
    fn from(t: TagFilter) -> Self {
        match t {
            TagFilter::All => ALL_TAGS.to_string(),
            TagFilter::Tag(tag) => tag,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewQuery {
    pub view: ActiveView,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub tag: TagFilter,
}

impl ViewQuery {
    pub fn new(view: ActiveView) -> Self {
        Self { view, ..Self::default() }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<TagFilter>) -> Self {
        self.tag = tag.into();
        self
    }
}

/// Stage 2: case-insensitive on name and email, verbatim on phone.
pub fn matches_search(contact: &Contact, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    contact.name.to_lowercase().contains(&needle)
        || contact.email.to_lowercase().contains(&needle)
        || contact.phone.contains(term)
}

/// Stage 3.
pub fn matches_tag(contact: &Contact, tag: &TagFilter) -> bool {
    match tag {
        TagFilter::All => true,
        TagFilter::Tag(t) => contact.has_tag(t),
    }
}

pub fn project<'a>(contacts: &'a [Contact], query: &ViewQuery) -> Vec<&'a Contact> {
    contacts
        .iter()
        .filter(|c| query.view.admits(c))
        .filter(|c| matches_search(c, &query.search))
        .filter(|c| matches_tag(c, &query.tag))
        .collect()
}

/// Badge counts per scope. Stage 1 only; search and tag do not apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewCounts {
    pub all: usize,
    pub favorites: usize,
    pub groups: usize,
    pub archives: usize,
}

impl ViewCounts {
    pub fn get(&self, view: ActiveView) -> usize {
        match view {
            ActiveView::All => self.all,
            ActiveView::Favorites => self.favorites,
            ActiveView::Groups => self.groups,
            ActiveView::Archives => self.archives,
        }
    }
}

pub fn view_counts(contacts: &[Contact]) -> ViewCounts {
    let count = |view: ActiveView| contacts.iter().filter(|c| view.admits(c)).count();
    ViewCounts {
        all: count(ActiveView::All),
        favorites: count(ActiveView::Favorites),
        groups: count(ActiveView::Groups),
        archives: count(ActiveView::Archives),
    }
}
