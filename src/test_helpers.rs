//! Shared test utilities.
//!
//! Fixture setup plus small lookups and markup checks used across module
//! tests.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let posts = load_posts(&tmp.path().join("posts")).unwrap();
//! let post = find_post(&posts, "stirile-zilei");
//! assert_eq!(count_markers(&post.content), 0);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::posts::Post;
use crate::site::copy_dir;
use crate::types::MODE_ATTR;

/// Copy `fixtures/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate freely.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
    copy_dir(&fixtures, tmp.path()).unwrap();
    tmp
}

/// Find a post by slug. Panics if not found.
pub fn find_post<'a>(posts: &'a [Post], slug: &str) -> &'a Post {
    posts.iter().find(|p| p.slug == slug).unwrap_or_else(|| {
        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        panic!("post '{slug}' not found. Available: {slugs:?}")
    })
}

/// Number of gallery mode markers in a chunk of markup.
pub fn count_markers(html: &str) -> usize {
    html.matches(&format!("{MODE_ATTR}=")).count()
}
