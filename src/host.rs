//! File-backed partials for rendering outside a CMS.
//!
//! Reads partials from the templates directory:
//!
//! ```text
//! templates/
//! ├── layouts/
//! │   ├── home.html              # one per page type tag
//! │   ├── basic-page.md          # markdown works too
//! │   └── ...
//! └── sections/includes/
//!     ├── header.html
//!     ├── footer.html
//!     └── metadata.html          # optional
//! ```
//!
//! For each partial the `.html` file wins over the `.md` file. HTML is
//! inserted verbatim; markdown is converted with pulldown-cmark.

use crate::config::SiteConfig;
use crate::page::PageType;
use crate::partials::{LayoutTable, PartialError, Partials, RenderContext, Rendered, Renderer};
use pulldown_cmark::{Parser, html as md_html};
use std::fs;
use std::path::{Path, PathBuf};

pub const HEADER_PARTIAL: &str = "sections/includes/header";
pub const FOOTER_PARTIAL: &str = "sections/includes/footer";
pub const METADATA_PARTIAL: &str = "sections/includes/metadata";
pub const LAYOUTS_DIR: &str = "layouts";

/// A partial read from disk on every render.
#[derive(Debug, Clone)]
pub struct FilePartial {
    /// Path without extension.
    base: PathBuf,
    optional: bool,
}

impl FilePartial {
    pub fn required(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            optional: false,
        }
    }

    /// A missing file renders as empty markup instead of failing.
    pub fn optional(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            optional: true,
        }
    }

    /// The file that would be rendered, if any exists.
    pub fn source(&self) -> Option<PathBuf> {
        ["html", "md"]
            .iter()
            .map(|ext| self.base.with_extension(ext))
            .find(|p| p.is_file())
    }
}

impl Renderer for FilePartial {
    fn render(&self, _ctx: &RenderContext<'_>) -> Result<Rendered, PartialError> {
        let Some(path) = self.source() else {
            if self.optional {
                return Ok(Rendered::default());
            }
            return Err(PartialError::NotFound(self.base.with_extension("html")));
        };
        let content = fs::read_to_string(&path)?;
        if path.extension().is_some_and(|e| e == "md") {
            let mut html = String::new();
            md_html::push_html(&mut html, Parser::new(&content));
            Ok(Rendered::new(html))
        } else {
            Ok(Rendered::new(content))
        }
    }
}

/// Where one named partial comes from, for `check` summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialStatus {
    pub name: String,
    /// The file that would be rendered, `None` when missing.
    pub source: Option<PathBuf>,
    pub optional: bool,
}

impl PartialStatus {
    /// Missing and not optional.
    pub fn is_broken(&self) -> bool {
        self.source.is_none() && !self.optional
    }
}

/// Partials for every page type, read from a templates directory.
#[derive(Debug, Clone)]
pub struct FileHost {
    templates_dir: PathBuf,
}

impl FileHost {
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
        }
    }

    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    pub fn header(&self) -> FilePartial {
        FilePartial::required(self.templates_dir.join(HEADER_PARTIAL))
    }

    pub fn footer(&self) -> FilePartial {
        FilePartial::required(self.templates_dir.join(FOOTER_PARTIAL))
    }

    pub fn metadata(&self) -> FilePartial {
        FilePartial::optional(self.templates_dir.join(METADATA_PARTIAL))
    }

    pub fn layout(&self, page_type: PageType) -> FilePartial {
        FilePartial::required(self.templates_dir.join(LAYOUTS_DIR).join(page_type.tag()))
    }

    /// Configured hook files that do not exist in the templates directory.
    ///
    /// An empty name means no hook and is never reported.
    pub fn missing_hook_files<'a>(&self, config: &'a SiteConfig) -> Vec<&'a str> {
        [&config.prepend_hook_file, &config.append_hook_file]
            .into_iter()
            .map(String::as_str)
            .filter(|name| !name.is_empty() && !self.templates_dir.join(name).is_file())
            .collect()
    }

    /// Every partial [`FileHost::partials`] would read, metadata first.
    pub fn inventory(&self) -> Vec<PartialStatus> {
        let status = |name: String, partial: FilePartial| PartialStatus {
            name,
            source: partial.source(),
            optional: partial.optional,
        };
        let mut out = vec![
            status("metadata".into(), self.metadata()),
            status("header".into(), self.header()),
        ];
        for page_type in PageType::ALL {
            out.push(status(format!("layout {page_type}"), self.layout(page_type)));
        }
        out.push(status("footer".into(), self.footer()));
        out
    }

    pub fn partials(&self) -> Partials {
        let mut layouts = LayoutTable::new();
        for page_type in PageType::ALL {
            layouts.insert(page_type, self.layout(page_type));
        }
        Partials::new(self.header(), layouts, self.footer()).with_metadata(self.metadata())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;
    use crate::test_helpers::setup_fixtures;
    use tempfile::TempDir;

    fn render(partial: &FilePartial) -> Result<Rendered, PartialError> {
        let config = SiteConfig::default();
        let page = Page::new("Home", PageType::Home, "/");
        partial.render(&RenderContext {
            page: &page,
            home: None,
            config: &config,
        })
    }

    #[test]
    fn html_partial_is_verbatim() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("header.html"), "<header>Site</header>\n").unwrap();
        let out = render(&FilePartial::required(tmp.path().join("header"))).unwrap();
        assert_eq!(out.html, "<header>Site</header>\n");
    }

    #[test]
    fn markdown_partial_is_converted() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("page.md"), "# Title\n\nSome **bold** text.").unwrap();
        let out = render(&FilePartial::required(tmp.path().join("page"))).unwrap();
        assert!(out.html.contains("<h1>Title</h1>"));
        assert!(out.html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn html_wins_over_markdown() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("x.html"), "<p>html</p>").unwrap();
        fs::write(tmp.path().join("x.md"), "markdown").unwrap();
        let out = render(&FilePartial::required(tmp.path().join("x"))).unwrap();
        assert_eq!(out.html, "<p>html</p>");
    }

    #[test]
    fn missing_required_partial_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = render(&FilePartial::required(tmp.path().join("nope"))).unwrap_err();
        assert!(matches!(err, PartialError::NotFound(p) if p.ends_with("nope.html")));
    }

    #[test]
    fn missing_optional_partial_is_empty() {
        let tmp = TempDir::new().unwrap();
        let out = render(&FilePartial::optional(tmp.path().join("nope"))).unwrap();
        assert!(out.html.is_empty());
    }

    #[test]
    fn fixture_host_has_home_layout() {
        let tmp = setup_fixtures();
        let host = FileHost::new(tmp.path().join("templates"));
        assert!(host.layout(PageType::Home).source().is_some());
        assert!(host.header().source().is_some());
        assert!(host.footer().source().is_some());
    }

    #[test]
    fn fixture_inventory_reports_missing_layouts() {
        let tmp = setup_fixtures();
        let host = FileHost::new(tmp.path().join("templates"));
        let inventory = host.inventory();

        let names: Vec<_> = inventory.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"metadata"));
        assert_eq!(names.last(), Some(&"footer"));

        let broken: Vec<_> = inventory
            .iter()
            .filter(|s| s.is_broken())
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(broken, vec!["layout listing", "layout article"]);
    }

    #[test]
    fn markdown_layout_is_picked_up() {
        let tmp = setup_fixtures();
        let host = FileHost::new(tmp.path().join("templates"));
        let source = host.layout(PageType::BasicPage).source().unwrap();
        assert!(source.ends_with("layouts/basic-page.md"));
    }

    #[test]
    fn missing_hook_files_are_reported() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("_init.html"), "").unwrap();
        let host = FileHost::new(tmp.path());
        assert_eq!(host.missing_hook_files(&SiteConfig::default()), vec!["_main.html"]);
    }

    #[test]
    fn empty_hook_file_name_is_not_missing() {
        let tmp = TempDir::new().unwrap();
        let config = SiteConfig {
            prepend_hook_file: String::new(),
            ..SiteConfig::default()
        };
        let host = FileHost::new(tmp.path());
        assert_eq!(host.missing_hook_files(&config), vec!["_main.html"]);
    }

    #[test]
    fn missing_metadata_is_not_broken() {
        let tmp = TempDir::new().unwrap();
        let host = FileHost::new(tmp.path());
        let metadata = &host.inventory()[0];
        assert_eq!(metadata.name, "metadata");
        assert!(metadata.source.is_none());
        assert!(!metadata.is_broken());
    }
}
