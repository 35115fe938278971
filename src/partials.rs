//! Partials: the markup fragments the host renders for the composer.
//!
//! The header, footer and metadata are single renderers. Layouts are chosen
//! by page type through a [`LayoutTable`], a finite map from [`PageType`] to
//! renderer that is resolved once per request. A page type without a layout
//! is a layout-stage failure, never a silent fallback.
//!
//! Renderers return [`Rendered`]: the markup plus any region [`Edit`]s the
//! partial wants applied to the main document.

use crate::assets::AssetError;
use crate::config::SiteConfig;
use crate::page::{NoPages, Page, PageSource, PageType};
use crate::regions::Edit;
use maud::Markup;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PartialError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Partial not found: {0}")]
    NotFound(PathBuf),
    #[error("No layout registered for page type '{0}'")]
    NoLayout(PageType),
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),
    #[error("{0}")]
    Failed(String),
}

/// What a renderer gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub page: &'a Page,
    /// The site root page, if the host knows it.
    pub home: Option<&'a Page>,
    pub config: &'a SiteConfig,
}

/// Output of one partial.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    /// Markup, inserted verbatim.
    pub html: String,
    /// Region edits, applied after all partials have rendered.
    pub edits: Vec<Edit>,
}

impl Rendered {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            edits: Vec::new(),
        }
    }

    pub fn with_edit(mut self, edit: Edit) -> Self {
        self.edits.push(edit);
        self
    }
}

impl From<&str> for Rendered {
    fn from(html: &str) -> Self {
        Self::new(html)
    }
}

impl From<String> for Rendered {
    fn from(html: String) -> Self {
        Self::new(html)
    }
}

impl From<Markup> for Rendered {
    fn from(markup: Markup) -> Self {
        Self::new(markup.into_string())
    }
}

pub trait Renderer {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<Rendered, PartialError>;
}

/// Markup rendered ahead of time by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Literal(pub Rendered);

impl Literal {
    pub fn new(html: impl Into<String>) -> Self {
        Self(Rendered::new(html))
    }

    pub fn with_edit(self, edit: Edit) -> Self {
        Self(self.0.with_edit(edit))
    }
}

impl Renderer for Literal {
    fn render(&self, _ctx: &RenderContext<'_>) -> Result<Rendered, PartialError> {
        Ok(self.0.clone())
    }
}

/// A renderer backed by a function.
pub struct FnRenderer<F>(F);

impl<F> Renderer for FnRenderer<F>
where
    F: Fn(&RenderContext<'_>) -> Result<Rendered, PartialError>,
{
    fn render(&self, ctx: &RenderContext<'_>) -> Result<Rendered, PartialError> {
        (self.0)(ctx)
    }
}

/// Wrap a closure as a [`Renderer`].
pub fn from_fn<F>(f: F) -> FnRenderer<F>
where
    F: Fn(&RenderContext<'_>) -> Result<Rendered, PartialError>,
{
    FnRenderer(f)
}

/// Page type → layout renderer.
#[derive(Default)]
pub struct LayoutTable {
    layouts: BTreeMap<PageType, Box<dyn Renderer>>,
}

impl LayoutTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, page_type: PageType, layout: impl Renderer + 'static) -> Self {
        self.insert(page_type, layout);
        self
    }

    pub fn insert(&mut self, page_type: PageType, layout: impl Renderer + 'static) {
        self.layouts.insert(page_type, Box::new(layout));
    }

    pub fn resolve(&self, page_type: PageType) -> Result<&dyn Renderer, PartialError> {
        self.layouts
            .get(&page_type)
            .map(|layout| &**layout)
            .ok_or(PartialError::NoLayout(page_type))
    }
}

/// Everything the composer delegates to the host.
pub struct Partials {
    pub header: Box<dyn Renderer>,
    pub layouts: LayoutTable,
    pub footer: Box<dyn Renderer>,
    pub metadata: Box<dyn Renderer>,
    pub pages: Box<dyn PageSource>,
}

impl Partials {
    /// Empty metadata and no page lookup; see [`Partials::with_metadata`]
    /// and [`Partials::with_pages`].
    pub fn new(
        header: impl Renderer + 'static,
        layouts: LayoutTable,
        footer: impl Renderer + 'static,
    ) -> Self {
        Self {
            header: Box::new(header),
            layouts,
            footer: Box::new(footer),
            metadata: Box::new(Literal::default()),
            pages: Box::new(NoPages),
        }
    }

    pub fn with_metadata(mut self, metadata: impl Renderer + 'static) -> Self {
        self.metadata = Box::new(metadata);
        self
    }

    pub fn with_pages(mut self, pages: impl PageSource + 'static) -> Self {
        self.pages = Box::new(pages);
        self
    }
}
