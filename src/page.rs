//! Pages as the host hands them to the composer.
//!
//! The composer never creates or mutates pages; it reads the title, picks a
//! layout from the page type, and passes the page on to partials.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Declared page type. Each variant maps to exactly one layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageType {
    Home,
    BasicPage,
    Listing,
    Article,
}

impl PageType {
    pub const ALL: [PageType; 4] = [
        PageType::Home,
        PageType::BasicPage,
        PageType::Listing,
        PageType::Article,
    ];

    /// Tag used in URLs, file names and the CLI.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::BasicPage => "basic-page",
            Self::Listing => "listing",
            Self::Article => "article",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for PageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.tag() == s)
            .ok_or_else(|| {
                let tags: Vec<&str> = Self::ALL.iter().map(|t| t.tag()).collect();
                format!("unknown page type '{s}' (expected one of: {})", tags.join(", "))
            })
    }
}

/// A requested page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub title: String,
    pub page_type: PageType,
    /// Site path, `/` for the home page.
    pub path: String,
}

impl Page {
    pub fn new(title: impl Into<String>, page_type: PageType, path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            page_type,
            path: path.into(),
        }
    }

    pub fn is_home(&self) -> bool {
        self.path == "/"
    }
}

/// Page lookup provided by the host CMS.
pub trait PageSource {
    fn page_at(&self, path: &str) -> Option<Page>;
}

/// A source that knows no pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPages;

impl PageSource for NoPages {
    fn page_at(&self, _path: &str) -> Option<Page> {
        None
    }
}

impl PageSource for Vec<Page> {
    fn page_at(&self, path: &str) -> Option<Page> {
        self.iter().find(|p| p.path == path).cloned()
    }
}
