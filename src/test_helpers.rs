//! Shared test utilities for the site-shell test suite.
//!
//! Provides a fixture site, stock partials, and ordering assertions for
//! composed documents.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let doc = compose(&page, &config, &assets, &hlf_partials()).unwrap();
//! assert_in_order(doc.as_str(), &["<title>Home</title>", "<H><L><F>"]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::page::PageType;
use crate::partials::{LayoutTable, Literal, Partials};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Partials
// =========================================================================

/// Header `<H>`, home layout `<L>`, footer `<F>`.
pub fn hlf_partials() -> Partials {
    Partials::new(
        Literal::new("<H>"),
        LayoutTable::new().with(PageType::Home, Literal::new("<L>")),
        Literal::new("<F>"),
    )
}

// =========================================================================
// Assertions
// =========================================================================

/// Assert that every needle occurs in `haystack`, each after the previous one.
pub fn assert_in_order(haystack: &str, needles: &[&str]) {
    let mut from = 0;
    for needle in needles {
        match haystack[from..].find(needle) {
            Some(pos) => from += pos + needle.len(),
            None => panic!(
                "'{needle}' not found after byte {from}. Expected order: {needles:?}\n{haystack}"
            ),
        }
    }
}
