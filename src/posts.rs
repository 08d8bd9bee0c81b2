//! Post source for the static host.
//!
//! A posts directory holds one `.html` file per post body, optionally paired
//! with a `.toml` sidecar of the same stem:
//!
//! ```text
//! posts/
//! ├── 010-hello-world.html     # body only, no <html>/<body> wrapper
//! ├── 020-stirile-zilei.html
//! ├── 020-stirile-zilei.toml   # title, categories, post_type
//! └── draft-notes.html         # no number: sorts after numbered posts
//! ```
//!
//! File stems follow the `NNN-slug` convention: the number orders posts, the
//! rest is the URL slug, and dashes become spaces for the fallback title.
//!
//! Sidecar keys (all optional, unknown keys rejected):
//!
//! ```toml
//! title = "Știrile zilei"
//! categories = ["stirile-zilei"]
//! post_type = "post"      # anything else is rendered but never singular-post
//! ```

use crate::types::CategoryContext;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PostError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid sidecar {path}: {source}")]
    Sidecar {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Duplicate post slug '{0}'")]
    DuplicateSlug(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub slug: String,
    pub title: String,
    /// Raw body HTML as written.
    pub content: String,
    pub categories: Vec<String>,
    pub post_type: String,
    /// Number prefix; `None` sorts last.
    pub sort_key: Option<u32>,
    pub source: PathBuf,
}

impl Post {
    pub fn in_category(&self, slug: &str) -> bool {
        self.categories.iter().any(|c| c == slug)
    }

    pub fn category_context(&self, target: &str) -> CategoryContext {
        CategoryContext::new(self.in_category(target))
    }

    /// Whether the post's own page counts as a single-post view.
    pub fn is_post(&self) -> bool {
        self.post_type == "post"
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PostMeta {
    title: Option<String>,
    categories: Vec<String>,
    post_type: Option<String>,
}

/// Split a file stem into `(number, slug)`.
///
/// - `"010-hello-world"` → `(Some(10), "hello-world")`
/// - `"draft-notes"` → `(None, "draft-notes")`
/// - `"007"` → `(Some(7), "007")` (number-only stems keep the digits as slug)
pub fn parse_post_stem(stem: &str) -> (Option<u32>, String) {
    match stem.split_once('-') {
        Some((prefix, rest)) if !rest.is_empty() => match prefix.parse::<u32>() {
            Ok(n) => (Some(n), rest.to_string()),
            Err(_) => (None, stem.to_string()),
        },
        _ => (stem.parse::<u32>().ok(), stem.to_string()),
    }
}

/// Load every post in `dir`, ordered by number then slug.
pub fn load_posts(dir: &Path) -> Result<Vec<Post>, PostError> {
    let mut posts = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|e| e != "html") {
            continue;
        }
        posts.push(load_post(path)?);
    }

    let mut seen = HashSet::new();
    for post in &posts {
        if !seen.insert(post.slug.as_str()) {
            return Err(PostError::DuplicateSlug(post.slug.clone()));
        }
    }

    posts.sort_by(|a, b| {
        (a.sort_key.is_none(), a.sort_key, &a.slug).cmp(&(b.sort_key.is_none(), b.sort_key, &b.slug))
    });
    debug!(count = posts.len(), dir = %dir.display(), "loaded posts");
    Ok(posts)
}

fn load_post(path: &Path) -> Result<Post, PostError> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (sort_key, slug) = parse_post_stem(&stem);
    let content = fs::read_to_string(path)?;

    let sidecar = path.with_extension("toml");
    let meta = if sidecar.exists() {
        let raw = fs::read_to_string(&sidecar)?;
        toml::from_str::<PostMeta>(&raw).map_err(|source| PostError::Sidecar {
            path: sidecar.clone(),
            source,
        })?
    } else {
        PostMeta::default()
    };

    Ok(Post {
        title: meta
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| slug.replace('-', " ")),
        slug,
        content,
        categories: meta.categories,
        post_type: meta.post_type.unwrap_or_else(|| "post".to_string()),
        sort_key,
        source: path.to_path_buf(),
    })
}

#[cfg(test)]
impl Post {
    pub(crate) fn for_test(slug: &str, content: &str, categories: &[&str]) -> Self {
        Self {
            slug: slug.to_string(),
            title: slug.replace('-', " "),
            content: content.to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            post_type: "post".to_string(),
            sort_key: None,
            source: PathBuf::from(format!("{slug}.html")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{find_post, setup_fixtures};
    use tempfile::TempDir;

    #[test]
    fn stem_with_number() {
        assert_eq!(parse_post_stem("010-hello-world"), (Some(10), "hello-world".into()));
        assert_eq!(parse_post_stem("000-first"), (Some(0), "first".into()));
    }

    #[test]
    fn stem_without_number() {
        assert_eq!(parse_post_stem("draft-notes"), (None, "draft-notes".into()));
        assert_eq!(parse_post_stem("notes"), (None, "notes".into()));
    }

    #[test]
    fn stem_number_only() {
        assert_eq!(parse_post_stem("007"), (Some(7), "007".into()));
        assert_eq!(parse_post_stem("007-"), (None, "007-".into()));
    }

    #[test]
    fn fixtures_load_in_order() {
        let tmp = setup_fixtures();
        let posts = load_posts(&tmp.path().join("posts")).unwrap();
        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(
            slugs,
            vec!["plain-text", "vacation-photos", "stirile-zilei", "about", "draft-notes"]
        );
    }

    #[test]
    fn sidecar_sets_title_and_categories() {
        let tmp = setup_fixtures();
        let posts = load_posts(&tmp.path().join("posts")).unwrap();
        let post = find_post(&posts, "stirile-zilei");
        assert_eq!(post.title, "Știrile zilei");
        assert!(post.in_category("stirile-zilei"));
        assert!(post.category_context("stirile-zilei").in_target_category);
        assert!(!post.category_context("other").in_target_category);
    }

    #[test]
    fn title_falls_back_to_slug() {
        let tmp = setup_fixtures();
        let posts = load_posts(&tmp.path().join("posts")).unwrap();
        let post = find_post(&posts, "vacation-photos");
        assert_eq!(post.title, "vacation photos");
        assert!(post.categories.is_empty());
        assert!(post.is_post());
    }

    #[test]
    fn sidecar_post_type_marks_pages() {
        let tmp = setup_fixtures();
        let posts = load_posts(&tmp.path().join("posts")).unwrap();
        assert!(!find_post(&posts, "about").is_post());
    }

    #[test]
    fn invalid_sidecar_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("010-x.html"), "<p>x</p>").unwrap();
        fs::write(tmp.path().join("010-x.toml"), "tags = [\"typo\"]").unwrap();
        assert!(matches!(
            load_posts(tmp.path()),
            Err(PostError::Sidecar { .. })
        ));
    }

    #[test]
    fn duplicate_slug_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("010-same.html"), "<p>a</p>").unwrap();
        fs::write(tmp.path().join("020-same.html"), "<p>b</p>").unwrap();
        assert!(matches!(
            load_posts(tmp.path()),
            Err(PostError::DuplicateSlug(slug)) if slug == "same"
        ));
    }

    #[test]
    fn non_html_files_are_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("010-a.html"), "<p>a</p>").unwrap();
        fs::write(tmp.path().join("notes.md"), "# no").unwrap();
        fs::create_dir(tmp.path().join("nested.html")).unwrap();
        let posts = load_posts(tmp.path()).unwrap();
        assert_eq!(posts.len(), 1);
    }
}
