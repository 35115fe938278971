//! Main document composition.
//!
//! [`compose`] turns one requested page into one complete HTML document. It
//! runs once per request, in a fixed order, with no retries:
//!
//! 1. Check the frozen assets (a missing required asset fails here).
//! 2. Resolve the home page (`/`) from the host. Not cached.
//! 3. Render the metadata, header, layout and footer partials. The layout is
//!    picked from the page type through the [`LayoutTable`](crate::partials::LayoutTable).
//! 4. Build the document tree and apply region edits registered by the
//!    partials (when `useMarkupRegions` is on).
//! 5. Serialize.
//!
//! ## Document Shape
//!
//! ```text
//! <!DOCTYPE html>
//! <html lang="en">
//!   <head id="html-head">
//!     <style>html{visibility:hidden;opacity:0;}</style>     hide
//!     <noscript><style>...visible...</style></noscript>    no-script fallback
//!     meta, title, font preconnects, favicons
//!     metadata partial (verbatim)
//!     registered stylesheets
//!   </head>
//!   <body id="html-body">
//!     <script>dark-mode bootstrap</script>
//!     header partial, layout, footer partial
//!     <style>html{visibility:visible;opacity:1;}</style>   reveal
//!     registered scripts, deferred onload.js
//!   </body>
//! </html>
//! ```
//!
//! The hide style keeps unstyled and unthemed content off screen until the
//! reveal style at the end of the body is parsed. The dark-mode script runs
//! before anything visible is painted.
//!
//! ## Failure
//!
//! Composition is all-or-nothing: any stage failure returns a [`RenderError`]
//! naming the stage and no markup at all.

use crate::assets::Assets;
use crate::config::SiteConfig;
use crate::page::Page;
use crate::partials::{PartialError, Partials, RenderContext, Rendered, Renderer};
use crate::regions::{Node, Region, RegionElement, Tree};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fmt;
use thiserror::Error;

const HIDE_STYLE: &str = "html{visibility:hidden;opacity:0;}";
const REVEAL_STYLE: &str = "html{visibility:visible;opacity:1;}";
const DARK_MODE_JS: &str = include_str!("../static/dark-mode.js");

/// Version baked into generated HTML as `<meta name="generator">`.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Region ids the main document exposes to edits.
pub const HEAD_REGION: &str = "html-head";
pub const BODY_REGION: &str = "html-body";
pub const HEADER_REGION: &str = "header";
pub const MAIN_REGION: &str = "main";
pub const FOOTER_REGION: &str = "footer";

/// Pipeline stage, reported when composition fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Assets,
    Metadata,
    Header,
    Layout,
    Footer,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Assets => "assets",
            Self::Metadata => "metadata",
            Self::Header => "header",
            Self::Layout => "layout",
            Self::Footer => "footer",
        })
    }
}

#[derive(Error, Debug)]
#[error("render failed at {stage} stage: {source}")]
pub struct RenderError {
    pub stage: Stage,
    pub source: PartialError,
}

impl RenderError {
    fn at(stage: Stage) -> impl FnOnce(PartialError) -> Self {
        move |source| Self { stage, source }
    }
}

/// A complete HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document(String);

impl Document {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compose the main document for `page`.
pub fn compose(
    page: &Page,
    config: &SiteConfig,
    assets: &Assets,
    partials: &Partials,
) -> Result<Document, RenderError> {
    assets
        .check()
        .map_err(|e| RenderError::at(Stage::Assets)(e.into()))?;

    let home = partials.pages.page_at("/");
    let ctx = RenderContext {
        page,
        home: home.as_ref(),
        config,
    };

    let metadata = render_stage(Stage::Metadata, &*partials.metadata, &ctx)?;
    let header = render_stage(Stage::Header, &*partials.header, &ctx)?;
    let layout = partials
        .layouts
        .resolve(page.page_type)
        .and_then(|layout| layout.render(&ctx))
        .map_err(RenderError::at(Stage::Layout))?;
    let footer = render_stage(Stage::Footer, &*partials.footer, &ctx)?;

    let mut tree = document_tree(page, config, assets, &metadata, &header, &layout, &footer);

    // Inclusion order: metadata lives in the head, then the body partials.
    let edits: Vec<_> = [&metadata, &header, &layout, &footer]
        .into_iter()
        .flat_map(|r| r.edits.iter())
        .collect();
    if config.use_markup_regions {
        let applied = tree.apply_all(edits.iter().copied());
        log::debug!("applied {applied} of {} region edits", edits.len());
    } else if !edits.is_empty() {
        log::debug!("markup regions disabled, ignoring {} edits", edits.len());
    }

    let markup = html! {
        (DOCTYPE)
        html lang=(config.lang) {
            (tree)
        }
    };
    log::debug!("composed {} ({})", page.path, page.page_type);
    Ok(Document(markup.into_string()))
}

fn render_stage(
    stage: Stage,
    renderer: &dyn Renderer,
    ctx: &RenderContext<'_>,
) -> Result<Rendered, RenderError> {
    renderer.render(ctx).map_err(RenderError::at(stage))
}

fn document_tree(
    page: &Page,
    config: &SiteConfig,
    assets: &Assets,
    metadata: &Rendered,
    header: &Rendered,
    layout: &Rendered,
    footer: &Rendered,
) -> Tree {
    let head = Region::new(
        HEAD_REGION,
        RegionElement::Head,
        vec![
            Node::pinned(html! { style { (PreEscaped(HIDE_STYLE)) } }),
            Node::pinned(html! { noscript { style { (PreEscaped(REVEAL_STYLE)) } } }),
            head_meta(page, config).into(),
            Node::markup(metadata.html.as_str()),
            assets.render_styles().into(),
        ],
    );

    let body = Region::new(
        BODY_REGION,
        RegionElement::Body,
        vec![
            Node::pinned(html! { script { (PreEscaped(DARK_MODE_JS)) } }),
            Region::new(
                HEADER_REGION,
                RegionElement::Virtual,
                vec![Node::markup(header.html.as_str())],
            )
            .into(),
            Region::new(
                MAIN_REGION,
                RegionElement::Virtual,
                vec![Node::markup(layout.html.as_str())],
            )
            .into(),
            Region::new(
                FOOTER_REGION,
                RegionElement::Virtual,
                vec![Node::markup(footer.html.as_str())],
            )
            .into(),
            Node::pinned(html! { style { (PreEscaped(REVEAL_STYLE)) } }),
            Node::pinned(body_scripts(config, assets)),
        ],
    );

    Tree::new(vec![head.into(), body.into()])
}

/// Meta tags, title, font preconnects and the favicon set.
fn head_meta(page: &Page, config: &SiteConfig) -> Markup {
    let favicon = |file: &str| format!("{}favicon/{}", config.assets_url, file);
    html! {
        meta charset="utf-8";
        meta name="viewport" content="width=device-width, initial-scale=1.0";
        title { (page.title) }
        meta name="generator" content=(format!("site-shell v{}", VERSION));
        link rel="preconnect" href="https://fonts.googleapis.com";
        link rel="preconnect" href="https://fonts.gstatic.com" crossorigin;
        link rel="apple-touch-icon" sizes="180x180" href=(favicon("apple-touch-icon.png"));
        link rel="icon" type="image/png" sizes="32x32" href=(favicon("favicon-32x32.png"));
        link rel="icon" type="image/png" sizes="16x16" href=(favicon("favicon-16x16.png"));
        link rel="manifest" href=(favicon("site.webmanifest"));
        link rel="mask-icon" href=(favicon("safari-pinned-tab.svg")) color="#5bbad5";
        meta name="msapplication-TileColor" content="#da532c";
        meta name="theme-color" content="#ffffff";
    }
}

/// Registered scripts, then the deferred onload script and live-reload client.
fn body_scripts(config: &SiteConfig, assets: &Assets) -> Markup {
    html! {
        (assets.render_scripts())
        script src=(format!("{}scripts/onload.js", config.templates_url)) defer {}
        @if config.live_reload() {
            script src=(format!("{}scripts/livereload.js", config.templates_url)) defer {}
        }
    }
}
