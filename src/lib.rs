//! # Site Shell
//!
//! The site-level configuration and main-document layer of a CMS site.
//! Every page shares one HTML shell: head metadata, a flash-of-unstyled-content
//! guard, a dark-mode bootstrap, registered stylesheets and scripts, and a
//! body assembled from header, layout and footer partials.
//!
//! # Architecture: Configure, Register, Compose
//!
//! ```text
//! 1. Configure   config.toml  →  SiteConfig   (once, immutable afterwards)
//! 2. Register    AssetRegistrar  →  Assets    (ordered, frozen before render)
//! 3. Compose     Page + Partials  →  Document (once per request, all-or-nothing)
//! ```
//!
//! The host CMS owns page routing, the page model and template rendering. This
//! crate sees the host only through the [`partials::Renderer`] and
//! [`page::PageSource`] traits; [`host::FileHost`] is a file-backed stand-in
//! used by the CLI.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Literal config entries, layered `config.toml` loading, validation |
//! | [`assets`] | Ordered stylesheet/script registration and default-folder discovery |
//! | [`page`] | The requested page and its type |
//! | [`partials`] | Renderer trait, layout table keyed by page type |
//! | [`regions`] | Named document regions and the edits partials apply to them |
//! | [`compose`] | Builds the main HTML document |
//! | [`host`] | Partials read from a templates directory |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Maud For The Shell
//!
//! The shell is generated with [Maud](https://maud.lambda.xyz/). Partial output
//! comes from the host and is inserted verbatim, but everything this crate
//! emits itself (titles, URLs, language) is escaped by construction.
//!
//! ## Immutable After Startup
//!
//! [`config::SiteConfig`] is built once and only read afterwards. The asset
//! registrar is consumed by [`assets::AssetRegistrar::freeze`], so nothing can
//! register an asset while a page renders.
//!
//! ## Closed Layout Table
//!
//! Layouts are looked up by [`page::PageType`] in a finite table. A page type
//! without a layout is an error at the layout stage rather than a fallback to
//! some other layout.
//!
//! ## Region Edits Instead Of Output Buffers
//!
//! Partials that need to touch markup outside their own output (add a script
//! to the head, replace the footer) return [`regions::Edit`]s. The composer
//! applies them in inclusion order to a tree of named regions, and refuses
//! edits that would move the hide/reveal styles or the dark-mode script.

pub mod assets;
pub mod compose;
pub mod config;
pub mod host;
pub mod output;
pub mod page;
pub mod partials;
pub mod regions;

#[cfg(test)]
pub(crate) mod test_helpers;
