use clap::{Parser, Subcommand};
use env_logger::Env;
use site_shell::assets::{AssetRegistrar, Assets};
use site_shell::compose::compose;
use site_shell::config::{self, SiteConfig};
use site_shell::host::FileHost;
use site_shell::output;
use site_shell::page::{Page, PageType};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "site-shell")]
#[command(about = "Render the shared HTML shell of a CMS site")]
#[command(long_about = "\
Render the shared HTML shell of a CMS site

Every page gets the same document: head metadata, registered stylesheets and
scripts, a dark-mode bootstrap, and a body built from header, layout and
footer partials.

Site structure:

  site/
  ├── config.toml                      # Site config (optional)
  └── templates/
      ├── assets.toml                  # Explicit styles and scripts (optional)
      ├── layouts/
      │   ├── home.html                # Layout per page type (.html or .md)
      │   ├── basic-page.md
      │   └── layout.css               # Discovered assets (*.css, *.js)
      ├── sections/
      │   ├── includes/
      │   │   ├── header.html
      │   │   ├── footer.html
      │   │   └── metadata.html        # Optional, rendered into <head>
      │   └── menu.js
      └── partials/
          └── card.css

Assets listed in assets.toml load first. Then assets are discovered in
layouts/, sections/ and partials/, in that order, sorted by file name, and
served under templatesUrl with a content hash.

Run 'site-shell gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Site directory
    #[arg(long, default_value = "site", global = true)]
    site: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compose one page and write the document
    Render {
        /// Page title
        #[arg(long)]
        title: String,
        /// Page type: home, basic-page, listing or article
        #[arg(long = "type")]
        page_type: PageType,
        /// Site path of the page
        #[arg(long, default_value = "/")]
        path: String,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate config, partials and assets
    Check,
    /// List the assets every page would load
    Assets {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(&cli.site)?;
    init_logging(&config);
    match config::config_file(&cli.site) {
        Some(path) => log::debug!("loaded {}", path.display()),
        None => log::debug!("no config.toml in {}, using defaults", cli.site.display()),
    }

    let templates_dir = cli.site.join("templates");
    let host = FileHost::new(&templates_dir);
    let assets = register_assets(&config, &templates_dir);

    match cli.command {
        Command::Render {
            title,
            page_type,
            path,
            output: out_file,
        } => {
            let page = Page::new(title, page_type, path);
            // Without a content source the only page known is the one requested.
            let pages = if page.is_home() {
                vec![page.clone()]
            } else {
                Vec::new()
            };
            let partials = host.partials().with_pages(pages);
            let document = compose(&page, &config, &assets, &partials)?;
            match &out_file {
                Some(file) => {
                    if let Some(parent) = file.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(file, document.as_str())?;
                }
                None => println!("{}", document),
            }
            output::print_render_output(&page, out_file.as_deref(), document.as_str().len());
        }
        Command::Check => {
            println!("==> Checking {}", cli.site.display());
            let missing_hooks = host.missing_hook_files(&config);
            output::print_config_output(&config, &missing_hooks);
            println!();
            let inventory = host.inventory();
            output::print_partials_output(&inventory, &templates_dir);
            println!();
            output::print_assets_output(&assets);

            assets.check()?;
            let broken: Vec<_> = inventory
                .iter()
                .filter(|s| s.is_broken())
                .map(|s| s.name.as_str())
                .collect();
            if !broken.is_empty() {
                return Err(format!("missing partials: {}", broken.join(", ")).into());
            }
            println!("==> Site is valid");
        }
        Command::Assets { json } => {
            if json {
                let listing = serde_json::json!({
                    "styles": assets.styles(),
                    "scripts": assets.scripts(),
                });
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                output::print_assets_output(&assets);
            }
            assets.check()?;
        }
        Command::GenConfig => unreachable!("handled before config load"),
    }

    Ok(())
}

/// `debug` in debug mode, `info` otherwise. `RUST_LOG` wins over both.
fn init_logging(config: &SiteConfig) {
    let default = if config.debug_mode { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn register_assets(config: &SiteConfig, templates_dir: &Path) -> Assets {
    let mut registrar = AssetRegistrar::for_site(config, templates_dir);
    registrar.add_manifest().add_default_folders();
    registrar.freeze()
}
