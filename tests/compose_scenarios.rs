//! End-to-end composition through the public API: config store, asset
//! registrar, partials, and the file-backed host.

use site_shell::assets::{AssetRegistrar, LoadMode};
use site_shell::compose::{RenderError, Stage, compose};
use site_shell::config::{ConfigStore, load_config};
use site_shell::host::FileHost;
use site_shell::page::{Page, PageType};
use site_shell::partials::{LayoutTable, Literal, PartialError, Partials, from_fn};
use site_shell::regions::Edit;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn hlf() -> Partials {
    Partials::new(
        Literal::new("<H>"),
        LayoutTable::new().with(PageType::Home, Literal::new("<L>")),
        Literal::new("<F>"),
    )
}

fn position(doc: &str, needle: &str) -> usize {
    doc.find(needle)
        .unwrap_or_else(|| panic!("'{needle}' not in document:\n{doc}"))
}

#[test]
fn home_page_with_registered_assets() {
    let mut store = ConfigStore::new();
    store.set("debugMode", true);
    store.set("defaultAdminThemeName", "AdminThemeUikit");
    let config = store.build().unwrap();

    let mut registrar = AssetRegistrar::for_site(&config, "/nonexistent");
    registrar
        .add_style("/a.css")
        .add_script("/b.js", LoadMode::Deferred);
    let assets = registrar.freeze();

    let page = Page::new("Home", PageType::Home, "/");
    let doc = compose(&page, &config, &assets, &hlf()).unwrap().into_string();

    let title = position(&doc, "<title>Home</title>");
    let style = position(&doc, r#"<link rel="stylesheet" href="/a.css">"#);
    let body = position(&doc, "<H><L><F>");
    let script = position(&doc, r#"<script src="/b.js" defer></script>"#);
    assert!(title < style);
    assert!(style < body);
    assert!(body < script);

    assert_eq!(doc.matches(r#"rel="stylesheet""#).count(), 1);
    let script_srcs: Vec<_> = doc
        .match_indices("<script src=\"")
        .map(|(i, m)| {
            let rest = &doc[i + m.len()..];
            &rest[..rest.find('"').unwrap()]
        })
        .collect();
    assert_eq!(script_srcs, vec!["/b.js", "/site/templates/scripts/onload.js"]);
}

#[test]
fn missing_default_folders_leave_assets_unchanged() {
    let tmp = TempDir::new().unwrap();
    let mut registrar = AssetRegistrar::new(tmp.path().join("nope"), "/site/templates/");
    registrar.add_style("/a.css");
    registrar.add_default_folders();
    let assets = registrar.freeze();

    assert_eq!(assets.styles().len(), 1);
    assert!(assets.scripts().is_empty());
    assert!(assets.check().is_ok());
}

#[test]
fn failing_layout_yields_layout_error_and_no_document() {
    let config = ConfigStore::new().build().unwrap();
    let partials = Partials::new(
        Literal::new("<H>"),
        LayoutTable::new().with(
            PageType::Home,
            from_fn(|_| Err(PartialError::Failed("template exploded".into()))),
        ),
        Literal::new("<F>"),
    );
    let page = Page::new("Home", PageType::Home, "/");

    let result = compose(
        &page,
        &config,
        &AssetRegistrar::new("/nonexistent", "/t/").freeze(),
        &partials,
    );
    let err: RenderError = result.unwrap_err();
    assert_eq!(err.stage, Stage::Layout);
    assert!(err.to_string().contains("layout"));
}

#[test]
fn region_edits_from_partials_reach_the_document() {
    let config = ConfigStore::new().build().unwrap();
    let partials = Partials::new(
        Literal::new("<H>"),
        LayoutTable::new().with(
            PageType::Home,
            Literal::new("<L>")
                .with_edit(Edit::replace("footer", "<custom-footer>"))
                .with_edit(Edit::append("html-head", r#"<meta name="x" content="y">"#)),
        ),
        Literal::new("<F>"),
    );
    let page = Page::new("Home", PageType::Home, "/");
    let doc = compose(&page, &config, &Default::default(), &partials)
        .unwrap()
        .into_string();

    assert!(doc.contains("<H><L><custom-footer>"));
    assert!(!doc.contains("<F>"));
    assert!(position(&doc, r#"<meta name="x" content="y">"#) < position(&doc, "</head>"));
}

#[test]
fn file_host_renders_fixture_site() {
    let site = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    let config = load_config(&site).unwrap();
    assert!(config.debug_mode);

    let templates = site.join("templates");
    let mut registrar = AssetRegistrar::for_site(&config, &templates);
    registrar.add_default_folders();
    let assets = registrar.freeze();
    assert!(assets.check().is_ok());

    let styles: Vec<_> = assets.styles().iter().map(|s| s.path.as_str()).collect();
    assert_eq!(styles.len(), 3);
    assert!(styles[0].starts_with("/site/templates/layouts/layout.css?v="));
    assert!(styles[1].starts_with("/site/templates/sections/header.css?v="));
    assert!(styles[2].starts_with("/site/templates/partials/card.css?v="));

    let partials = FileHost::new(&templates).partials();
    let page = Page::new("Welcome", PageType::Home, "/");
    let doc = compose(&page, &config, &assets, &partials)
        .unwrap()
        .into_string();

    let header = position(&doc, r#"<header class="site-header">"#);
    let main = position(&doc, "<h1>Welcome</h1>");
    let footer = position(&doc, r#"<footer class="site-footer">"#);
    assert!(header < main && main < footer);
    assert!(position(&doc, r#"<meta name="description""#) < position(&doc, "</head>"));
    assert!(!doc.contains("fixture-salt-value"));
}

#[test]
fn file_host_missing_layout_fails_at_layout_stage() {
    let tmp = TempDir::new().unwrap();
    let includes = tmp.path().join("sections/includes");
    fs::create_dir_all(&includes).unwrap();
    fs::write(includes.join("header.html"), "<header></header>").unwrap();
    fs::write(includes.join("footer.html"), "<footer></footer>").unwrap();

    let config = ConfigStore::new().build().unwrap();
    let partials = FileHost::new(tmp.path()).partials();
    let page = Page::new("News", PageType::Listing, "/news/");

    let err = compose(&page, &config, &Default::default(), &partials).unwrap_err();
    assert_eq!(err.stage, Stage::Layout);
    assert!(matches!(err.source, PartialError::NotFound(_)));
}

#[test]
fn site_manifest_assets_load_before_default_folders() {
    let site = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    let config = load_config(&site).unwrap();
    let mut registrar = AssetRegistrar::for_site(&config, site.join("templates"));
    registrar.add_manifest().add_default_folders();
    let assets = registrar.freeze();
    assert!(assets.check().is_ok());

    let styles: Vec<_> = assets.styles().iter().map(|s| s.path.as_str()).collect();
    assert_eq!(styles[0], "/site/templates/styles/main.css");
    assert!(styles[1].starts_with("/site/templates/layouts/layout.css?v="));
    assert_eq!(styles.len(), 4);

    let scripts: Vec<_> = assets
        .scripts()
        .iter()
        .map(|s| (s.path.as_str(), s.load_mode))
        .collect();
    assert_eq!(scripts[0], ("/site/templates/scripts/vendor.js", LoadMode::Normal));
    assert_eq!(scripts[1], ("/site/templates/scripts/main.js", LoadMode::Deferred));
    assert!(scripts[2].0.starts_with("/site/templates/sections/menu.js?v="));
    assert_eq!(scripts.len(), 3);

    let page = Page::new("Welcome", PageType::Home, "/");
    let doc = compose(&page, &config, &assets, &FileHost::new(site.join("templates")).partials())
        .unwrap()
        .into_string();
    assert!(
        position(&doc, r#"href="/site/templates/styles/main.css""#)
            < position(&doc, "/site/templates/layouts/layout.css?v=")
    );
    assert!(
        position(&doc, r#"<script src="/site/templates/scripts/main.js" defer></script>"#)
            < position(&doc, "/site/templates/sections/menu.js?v=")
    );
}
