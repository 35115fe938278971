//! CLI output formatting for the `render`, `check` and `assets` commands.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Config
//!     debugMode: true
//!     tableSaltValue: ********
//!     prependHookFile: _init.html (missing)
//!     ...
//!
//! Partials
//!     metadata → sections/includes/metadata.html
//!     header → sections/includes/header.html
//!     layout home → layouts/home.html
//!     layout listing: MISSING
//!     footer → sections/includes/footer.html
//!
//! Styles
//! 001 /site/templates/layouts/layout.css?v=1a2b3c4d
//!
//! Scripts
//! 001 /site/templates/sections/menu.js?v=5e6f7a8b
//! ```
//!
//! ## Render
//!
//! ```text
//! Home (home) → dist/index.html (1834 bytes)
//! ```
//!
//! # Architecture
//!
//! Each section has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects. Anything that needs the
//! filesystem is resolved by the caller and passed in.

use crate::assets::{AssetRef, Assets, LoadMode};
use crate::config::SiteConfig;
use crate::host::PartialStatus;
use crate::page::Page;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `path` relative to `root` when possible, for display.
fn display_rel(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

// ============================================================================
// Config
// ============================================================================

/// Format the resolved config, one `key: value` line per setting.
///
/// Secret keys are redacted. Hook files named in `missing_hooks` get a
/// `(missing)` marker; the host would skip them.
pub fn format_config_output(config: &SiteConfig, missing_hooks: &[&str]) -> Vec<String> {
    let hook = |name: &str| {
        if missing_hooks.contains(&name) {
            format!("{name} (missing)")
        } else {
            name.to_string()
        }
    };
    let salt = if config.table_salt_value.is_empty() {
        "(unset)".to_string()
    } else {
        config.table_salt_value.to_string()
    };

    let entries = [
        ("debugMode", config.debug_mode.to_string()),
        ("useFunctionsApiStyle", config.use_functions_api_style.to_string()),
        ("usePageSubclassing", config.use_page_subclassing.to_string()),
        ("useMarkupRegions", config.use_markup_regions.to_string()),
        ("prependHookFile", hook(&config.prepend_hook_file)),
        ("appendHookFile", hook(&config.append_hook_file)),
        ("compileTemplates", config.compile_templates.to_string()),
        ("tableSaltValue", salt),
        ("defaultAdminThemeName", config.default_admin_theme_name.clone()),
        ("liveReloadEnabled", config.live_reload_enabled.to_string()),
        ("assetsUrl", config.assets_url.clone()),
        ("templatesUrl", config.templates_url.clone()),
        ("lang", config.lang.clone()),
    ];

    let mut lines = vec!["Config".to_string()];
    for (key, value) in entries {
        lines.push(format!("{}{}: {}", indent(1), key, value));
    }
    if config.live_reload_enabled && !config.debug_mode {
        lines.push(format!(
            "{}note: liveReloadEnabled has no effect without debugMode",
            indent(1)
        ));
    }
    lines
}

pub fn print_config_output(config: &SiteConfig, missing_hooks: &[&str]) {
    for line in format_config_output(config, missing_hooks) {
        println!("{}", line);
    }
}

// ============================================================================
// Partials
// ============================================================================

/// Format the partial inventory, sources shown relative to `templates_dir`.
///
/// ```text
/// Partials
///     header → sections/includes/header.html
///     metadata: none
///     layout listing: MISSING
/// ```
pub fn format_partials_output(inventory: &[PartialStatus], templates_dir: &Path) -> Vec<String> {
    let mut lines = vec!["Partials".to_string()];
    for status in inventory {
        let line = match &status.source {
            Some(path) => format!(
                "{}{} \u{2192} {}",
                indent(1),
                status.name,
                display_rel(path, templates_dir)
            ),
            None if status.optional => format!("{}{}: none", indent(1), status.name),
            None => format!("{}{}: MISSING", indent(1), status.name),
        };
        lines.push(line);
    }
    lines
}

pub fn print_partials_output(inventory: &[PartialStatus], templates_dir: &Path) {
    for line in format_partials_output(inventory, templates_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Assets
// ============================================================================

fn asset_line(index: usize, asset: &AssetRef) -> String {
    match asset.load_mode {
        LoadMode::Normal => format!("{} {}", format_index(index), asset.path),
        LoadMode::Deferred => format!("{} {} (deferred)", format_index(index), asset.path),
    }
}

/// Format registered styles and scripts in registration order.
pub fn format_assets_output(assets: &Assets) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Styles".to_string());
    if assets.styles().is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (idx, style) in assets.styles().iter().enumerate() {
        lines.push(asset_line(idx + 1, style));
    }

    lines.push(String::new());
    lines.push("Scripts".to_string());
    if assets.scripts().is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (idx, script) in assets.scripts().iter().enumerate() {
        lines.push(asset_line(idx + 1, script));
    }

    if let Err(e) = assets.check() {
        lines.push(String::new());
        lines.push(format!("Error: {e}"));
    }
    lines
}

pub fn print_assets_output(assets: &Assets) {
    for line in format_assets_output(assets) {
        println!("{}", line);
    }
}

// ============================================================================
// Render
// ============================================================================

/// One-line summary of a composed page.
///
/// `output` is `None` when the document went to stdout.
pub fn format_render_output(page: &Page, output: Option<&Path>, bytes: usize) -> Vec<String> {
    let target = match output {
        Some(path) => path.display().to_string(),
        None => "stdout".to_string(),
    };
    vec![format!(
        "{} ({}) \u{2192} {} ({} bytes)",
        page.title, page.page_type, target, bytes
    )]
}

/// Written to stderr so it never mixes with a document on stdout.
pub fn print_render_output(page: &Page, output: Option<&Path>, bytes: usize) {
    for line in format_render_output(page, output, bytes) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetRegistrar;
    use crate::config::Secret;
    use crate::page::PageType;
    use std::path::PathBuf;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn display_rel_strips_root() {
        let root = Path::new("/site/templates");
        assert_eq!(
            display_rel(Path::new("/site/templates/layouts/home.html"), root),
            "layouts/home.html"
        );
        assert_eq!(display_rel(Path::new("/elsewhere/x.html"), root), "/elsewhere/x.html");
    }

    // =========================================================================
    // Config
    // =========================================================================

    #[test]
    fn config_output_redacts_salt() {
        let config = SiteConfig {
            table_salt_value: Secret::new("hunter2"),
            ..SiteConfig::default()
        };
        let lines = format_config_output(&config, &[]);
        let all = lines.join("\n");
        assert!(all.contains("tableSaltValue: ********"));
        assert!(!all.contains("hunter2"));
    }

    #[test]
    fn config_output_unset_salt() {
        let lines = format_config_output(&SiteConfig::default(), &[]);
        assert!(lines.contains(&"    tableSaltValue: (unset)".to_string()));
    }

    #[test]
    fn config_output_marks_missing_hooks() {
        let lines = format_config_output(&SiteConfig::default(), &["_main.html"]);
        assert!(lines.contains(&"    prependHookFile: _init.html".to_string()));
        assert!(lines.contains(&"    appendHookFile: _main.html (missing)".to_string()));
    }

    #[test]
    fn config_output_notes_inert_live_reload() {
        let config = SiteConfig {
            live_reload_enabled: true,
            ..SiteConfig::default()
        };
        let lines = format_config_output(&config, &[]);
        assert!(lines.last().unwrap().contains("no effect without debugMode"));
    }

    // =========================================================================
    // Partials
    // =========================================================================

    #[test]
    fn partials_output_shows_sources_and_gaps() {
        let root = PathBuf::from("/t");
        let inventory = vec![
            PartialStatus {
                name: "metadata".into(),
                source: None,
                optional: true,
            },
            PartialStatus {
                name: "header".into(),
                source: Some(root.join("sections/includes/header.html")),
                optional: false,
            },
            PartialStatus {
                name: "layout article".into(),
                source: None,
                optional: false,
            },
        ];
        let lines = format_partials_output(&inventory, &root);
        assert_eq!(
            lines,
            vec![
                "Partials",
                "    metadata: none",
                "    header \u{2192} sections/includes/header.html",
                "    layout article: MISSING",
            ]
        );
    }

    // =========================================================================
    // Assets
    // =========================================================================

    #[test]
    fn assets_output_in_registration_order() {
        let mut registrar = AssetRegistrar::new("/nonexistent", "/t/");
        registrar
            .add_style("/a.css")
            .add_style("/c.css")
            .add_script("/b.js", LoadMode::Deferred)
            .add_script("/d.js", LoadMode::Normal);
        let lines = format_assets_output(&registrar.freeze());
        assert_eq!(
            lines,
            vec![
                "Styles",
                "001 /a.css",
                "002 /c.css",
                "",
                "Scripts",
                "001 /b.js (deferred)",
                "002 /d.js",
            ]
        );
    }

    #[test]
    fn assets_output_empty() {
        let lines = format_assets_output(&Assets::default());
        assert_eq!(lines, vec!["Styles", "    (none)", "", "Scripts", "    (none)"]);
    }

    #[test]
    fn assets_output_reports_failure() {
        let mut registrar = AssetRegistrar::new("/nonexistent", "/t/");
        registrar.require_style("missing.css");
        let lines = format_assets_output(&registrar.freeze());
        assert!(lines.last().unwrap().starts_with("Error: Required asset not found"));
    }

    // =========================================================================
    // Render
    // =========================================================================

    #[test]
    fn render_output_to_file() {
        let page = Page::new("Home", PageType::Home, "/");
        let lines = format_render_output(&page, Some(Path::new("dist/index.html")), 120);
        assert_eq!(lines, vec!["Home (home) \u{2192} dist/index.html (120 bytes)"]);
    }

    #[test]
    fn render_output_to_stdout() {
        let page = Page::new("About", PageType::BasicPage, "/about/");
        let lines = format_render_output(&page, None, 7);
        assert_eq!(lines, vec!["About (basic-page) \u{2192} stdout (7 bytes)"]);
    }
}
