//! Stylesheet and script registration.
//!
//! The registrar is an ordered builder: every `add_*` call appends to the end
//! of its class (styles or scripts), and insertion order is render order.
//! Nothing is deduplicated and there is no dependency resolution, so
//! registering the same file twice emits it twice.
//!
//! ## Default Folders
//!
//! [`AssetRegistrar::add_default_folders`] walks a fixed convention under the
//! templates directory:
//!
//! ```text
//! templates/
//! ├── layouts/      # visited first
//! ├── sections/     # then this
//! └── partials/     # then this
//! ```
//!
//! Within each folder the walk is depth-first with entries sorted by file
//! name at each level, so `sections/a.css` comes before `sections/b/a.css`
//! which comes before `sections/c.css`. A directory sorts by its own name:
//! `sections/a/x.css` comes before `sections/a.css`. Hidden files and
//! everything under hidden directories are skipped. Symlinks are followed. `.css` files become styles and `.js` files become
//! normal (non-deferred) scripts. Load order decides CSS specificity ties and
//! script execution order, so rename files to reorder them.
//!
//! A missing folder contributes nothing: sites are allowed to omit any of
//! them. Discovered files get a `?v=` cache-busting suffix derived from their
//! contents.
//!
//! ## Site Manifest
//!
//! [`AssetRegistrar::add_manifest`] reads explicit assets from
//! `templates/assets.toml`. Every entry must exist on disk:
//!
//! ```toml
//! styles = ["styles/main.css"]
//!
//! [[scripts]]
//! path = "scripts/main.js"
//! defer = true
//! ```
//!
//! ## Lifecycle
//!
//! The registrar is populated, then consumed by [`AssetRegistrar::freeze`].
//! The resulting [`Assets`] is immutable, so sharing it between requests
//! cannot race with registration.

use crate::config::SiteConfig;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Folders searched by [`AssetRegistrar::add_default_folders`], in order.
pub const DEFAULT_FOLDERS: &[&str] = &["layouts", "sections", "partials"];

const STYLE_EXTENSIONS: &[&str] = &["css"];
const SCRIPT_EXTENSIONS: &[&str] = &["js"];

/// Explicit asset list under the templates directory.
pub const MANIFEST_FILE: &str = "assets.toml";

/// Length of the content hash appended to discovered asset URLs.
const VERSION_HASH_LEN: usize = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("Required asset not found: {0}")]
    Missing(PathBuf),
    #[error("Default folder not found: {0}")]
    FolderMissing(PathBuf),
    #[error("Cannot read asset {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
    #[error("Invalid asset manifest {path}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    #[default]
    Normal,
    Deferred,
}

/// A registered stylesheet or script URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRef {
    pub path: String,
    pub load_mode: LoadMode,
}

impl AssetRef {
    pub fn new(path: impl Into<String>, load_mode: LoadMode) -> Self {
        Self {
            path: path.into(),
            load_mode,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct AssetManifest {
    styles: Vec<String>,
    scripts: Vec<ManifestScript>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestScript {
    path: String,
    #[serde(default)]
    defer: bool,
}

/// Ordered builder for page assets.
#[derive(Debug)]
pub struct AssetRegistrar {
    templates_dir: PathBuf,
    templates_url: String,
    styles: Vec<AssetRef>,
    scripts: Vec<AssetRef>,
    failures: Vec<AssetError>,
}

impl AssetRegistrar {
    /// `templates_dir` is where files live on disk, `templates_url` is the
    /// URL prefix they are served under (ending with `/`).
    pub fn new(templates_dir: impl Into<PathBuf>, templates_url: impl Into<String>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
            templates_url: templates_url.into(),
            styles: Vec::new(),
            scripts: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn for_site(config: &SiteConfig, templates_dir: impl Into<PathBuf>) -> Self {
        Self::new(templates_dir, config.templates_url.clone())
    }

    /// Append a stylesheet URL as given.
    pub fn add_style(&mut self, path: impl Into<String>) -> &mut Self {
        self.styles.push(AssetRef::new(path, LoadMode::Normal));
        self
    }

    /// Append a script URL as given.
    pub fn add_script(&mut self, path: impl Into<String>, load_mode: LoadMode) -> &mut Self {
        self.scripts.push(AssetRef::new(path, load_mode));
        self
    }

    /// Append a stylesheet that must exist under the templates directory.
    ///
    /// A missing file is recorded and fails composition at the assets stage.
    pub fn require_style(&mut self, rel_path: &str) -> &mut Self {
        if let Some(url) = self.resolve_required(rel_path) {
            self.add_style(url);
        }
        self
    }

    /// Append a script that must exist under the templates directory.
    pub fn require_script(&mut self, rel_path: &str, load_mode: LoadMode) -> &mut Self {
        if let Some(url) = self.resolve_required(rel_path) {
            self.add_script(url, load_mode);
        }
        self
    }

    /// Require every asset listed in [`MANIFEST_FILE`], in file order.
    ///
    /// A missing manifest contributes nothing. An unreadable or malformed
    /// one is recorded and fails composition at the assets stage.
    pub fn add_manifest(&mut self) -> &mut Self {
        let path = self.templates_dir.join(MANIFEST_FILE);
        if !path.is_file() {
            log::debug!("no asset manifest at {}", path.display());
            return self;
        }
        let manifest = std::fs::read_to_string(&path)
            .map_err(|e| AssetError::Unreadable {
                path: path.clone(),
                reason: e.to_string(),
            })
            .and_then(|content| {
                toml::from_str::<AssetManifest>(&content).map_err(|e| {
                    AssetError::InvalidManifest {
                        path: path.clone(),
                        reason: e.to_string(),
                    }
                })
            });
        match manifest {
            Ok(manifest) => {
                for style in &manifest.styles {
                    self.require_style(style);
                }
                for script in &manifest.scripts {
                    let mode = if script.defer {
                        LoadMode::Deferred
                    } else {
                        LoadMode::Normal
                    };
                    self.require_script(&script.path, mode);
                }
            }
            Err(e) => self.failures.push(e),
        }
        self
    }

    /// Append every style and script found in [`DEFAULT_FOLDERS`].
    pub fn add_default_folders(&mut self) -> &mut Self {
        for folder in DEFAULT_FOLDERS {
            let dir = self.templates_dir.join(folder);
            match discover(&dir) {
                Ok(files) => {
                    for file in files {
                        self.add_discovered(&file);
                    }
                }
                Err(AssetError::FolderMissing(path)) => {
                    log::debug!("skipping missing asset folder {}", path.display());
                }
                Err(e) => self.failures.push(e),
            }
        }
        self
    }

    pub fn styles(&self) -> &[AssetRef] {
        &self.styles
    }

    pub fn scripts(&self) -> &[AssetRef] {
        &self.scripts
    }

    /// Stop registering and hand out the immutable asset set.
    pub fn freeze(self) -> Assets {
        Assets {
            styles: self.styles,
            scripts: self.scripts,
            failures: self.failures,
        }
    }

    fn resolve_required(&mut self, rel_path: &str) -> Option<String> {
        let rel = rel_path.trim_start_matches('/');
        let path = self.templates_dir.join(rel);
        if path.is_file() {
            Some(format!("{}{}", self.templates_url, rel))
        } else {
            self.failures.push(AssetError::Missing(path));
            None
        }
    }

    fn add_discovered(&mut self, file: &Path) {
        let Some(ext) = file.extension().map(|e| e.to_string_lossy().to_lowercase()) else {
            return;
        };
        let is_style = STYLE_EXTENSIONS.contains(&ext.as_str());
        let is_script = SCRIPT_EXTENSIONS.contains(&ext.as_str());
        if !is_style && !is_script {
            return;
        }

        let url = match self.versioned_url(file) {
            Ok(url) => url,
            Err(e) => {
                self.failures.push(e);
                return;
            }
        };
        if is_style {
            self.add_style(url);
        } else {
            self.add_script(url, LoadMode::Normal);
        }
    }

    fn versioned_url(&self, file: &Path) -> Result<String, AssetError> {
        let rel = file
            .strip_prefix(&self.templates_dir)
            .unwrap_or(file)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let hash = hash_file(file)?;
        Ok(format!(
            "{}{}?v={}",
            self.templates_url,
            rel,
            &hash[..VERSION_HASH_LEN]
        ))
    }
}

/// Files under `dir`, depth-first, sorted by file name at each level.
///
/// Hidden entries are pruned at any depth; symlinks are followed.
fn discover(dir: &Path) -> Result<Vec<PathBuf>, AssetError> {
    if !dir.is_dir() {
        return Err(AssetError::FolderMissing(dir.to_path_buf()));
    }
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
    for entry in walker {
        let entry = entry.map_err(|e| AssetError::Unreadable {
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf()),
            reason: e.to_string(),
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// SHA-256 hash of a file's contents, returned as a hex string.
fn hash_file(path: &Path) -> Result<String, AssetError> {
    let bytes = std::fs::read(path).map_err(|e| AssetError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// Frozen, immutable asset set consumed by the composer.
#[derive(Debug, Clone, Default)]
pub struct Assets {
    styles: Vec<AssetRef>,
    scripts: Vec<AssetRef>,
    failures: Vec<AssetError>,
}

impl Assets {
    pub fn styles(&self) -> &[AssetRef] {
        &self.styles
    }

    pub fn scripts(&self) -> &[AssetRef] {
        &self.scripts
    }

    /// First fatal problem recorded during registration, if any.
    pub fn check(&self) -> Result<(), AssetError> {
        match self.failures.first() {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    /// `<link rel="stylesheet">` tags in registration order.
    pub fn render_styles(&self) -> Markup {
        html! {
            @for style in &self.styles {
                link rel="stylesheet" href=(style.path);
            }
        }
    }

    /// `<script>` tags in registration order.
    pub fn render_scripts(&self) -> Markup {
        html! {
            @for script in &self.scripts {
                script src=(script.path) defer[script.load_mode == LoadMode::Deferred] {}
            }
        }
    }
}
