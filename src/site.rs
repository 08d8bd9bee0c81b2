//! Static host: renders posts the way a blog front end would.
//!
//! Each post gets its own single-post page, which is the only view where the
//! gallery feature is live:
//!
//! 1. the content filter annotates the post body ([`annotate`]),
//! 2. asset delivery recomputes the decision from the raw body
//!    ([`requirements_for`]) and enqueues the resulting plan.
//!
//! The two stages re-derive the same decision from the same inputs instead of
//! sharing state. The index page lists every post in archive context, so its
//! bodies are left as written and it loads no gallery assets.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                      # Archive of all posts
//! ├── hello-world/index.html          # One page per post
//! ├── stirile-zilei/index.html
//! └── wp-content/plugins/wp-lightgallery/   # Asset dir, copied under base_url
//! ```

use crate::annotate::annotate;
use crate::assets::{self, AssetPlan, FileMtimeVersions, VersionSource};
use crate::bootstrap::BootstrapError;
use crate::classify::requirements_for;
use crate::config::PluginConfig;
use crate::delivery::AssetRegistry;
use crate::posts::{self, Post, PostError};
use crate::types::{Decision, ViewContext};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Post error: {0}")]
    Post(#[from] PostError),
    #[error("Bootstrap error: {0}")]
    Bootstrap(#[from] BootstrapError),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// What the host produced for one post page.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedPost {
    pub slug: String,
    pub title: String,
    pub decision: Decision,
    pub plan: AssetPlan,
    pub html: String,
}

/// Summary of a full site build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    pub posts: Vec<PostSummary>,
    pub assets_copied: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub path: String,
    pub decision: Decision,
    pub asset_count: usize,
}

/// Render one post as its own single-post page.
pub fn render_post_page(
    post: &Post,
    config: &PluginConfig,
    versions: &dyn VersionSource,
) -> Result<RenderedPost, SiteError> {
    let view = ViewContext {
        singular_post: post.is_post(),
        main_query: true,
    };

    // content filter stage
    let body = annotate(
        &post.content,
        &view,
        &post.category_context(&config.target_category),
    );

    // asset delivery stage
    let decision = requirements_for(&view, Some(post), &config.target_category);
    let plan = assets::build_plan(&decision, &config.assets.base_url, versions);
    let mut registry = AssetRegistry::new();
    registry.enqueue_plan(&plan, &config.style)?;

    let content = html! {
        (site_header(config))
        main.single-post {
            article.post {
                h1.post-title { (post.title) }
                div.post-content { (PreEscaped(body)) }
            }
        }
    };
    let page = base_document(
        &format!("{} – {}", post.title, config.site.title),
        &config.site.lang,
        registry.render_head(),
        content,
        registry.render_footer(),
    );

    debug!(slug = %post.slug, assets = plan.assets.len(), "rendered post page");
    Ok(RenderedPost {
        slug: post.slug.clone(),
        title: post.title.clone(),
        decision,
        plan,
        html: page.into_string(),
    })
}

/// Render the archive page listing every post with its body.
pub fn render_index(posts: &[Post], config: &PluginConfig) -> Markup {
    let view = ViewContext::archive();
    let content = html! {
        (site_header(config))
        main.archive {
            @for post in posts {
                @let category = post.category_context(&config.target_category);
                article.post {
                    h2.post-title {
                        a href={ "/" (post.slug) "/" } { (post.title) }
                    }
                    div.post-content {
                        (PreEscaped(annotate(&post.content, &view, &category)))
                    }
                }
            }
        }
    };
    base_document(
        &config.site.title,
        &config.site.lang,
        html! {},
        content,
        html! {},
    )
}

/// Render every post in `posts_dir` into `output_dir`.
///
/// Pages are independent, so they render in parallel. The asset directory
/// (`config.assets.dir`, resolved against `config_dir`) is copied to the path
/// of `assets.base_url` under the output when it exists and the base URL is
/// root-relative. Assets served from another origin are left to the caller.
pub fn build(
    posts_dir: &Path,
    config_dir: &Path,
    output_dir: &Path,
    config: &PluginConfig,
) -> Result<BuildReport, SiteError> {
    let posts = posts::load_posts(posts_dir)?;
    let asset_dir = config_dir.join(&config.assets.dir);
    let versions = FileMtimeVersions::new(&asset_dir, config.assets.fallback_version.clone());

    fs::create_dir_all(output_dir)?;
    fs::write(
        output_dir.join("index.html"),
        render_index(&posts, config).into_string(),
    )?;

    let rendered: Vec<RenderedPost> = posts
        .par_iter()
        .map(|post| render_post_page(post, config, &versions))
        .collect::<Result<_, _>>()?;

    let mut summaries = Vec::with_capacity(rendered.len());
    for page in rendered {
        let page_dir = output_dir.join(&page.slug);
        fs::create_dir_all(&page_dir)?;
        fs::write(page_dir.join("index.html"), &page.html)?;
        summaries.push(PostSummary {
            path: format!("{}/index.html", page.slug),
            asset_count: page.plan.assets.len(),
            slug: page.slug,
            title: page.title,
            decision: page.decision,
        });
    }

    let mut assets_copied = false;
    if asset_dir.is_dir() {
        match local_asset_path(&config.assets.base_url) {
            Some(prefix) => {
                copy_dir(&asset_dir, &output_dir.join(prefix))?;
                assets_copied = true;
            }
            None => warn!(
                base_url = %config.assets.base_url,
                "assets.base_url is not a local path, skipping asset copy"
            ),
        }
    }

    info!(posts = summaries.len(), output = %output_dir.display(), "site built");
    Ok(BuildReport {
        output_dir: output_dir.to_path_buf(),
        posts: summaries,
        assets_copied,
    })
}

/// Output-relative directory for a root-relative `base_url`, e.g.
/// `/wp-content/plugins/lg/` → `wp-content/plugins/lg`.
///
/// `None` for absolute and protocol-relative URLs, and for paths that would
/// climb out of the output directory.
fn local_asset_path(base_url: &str) -> Option<&str> {
    if !base_url.starts_with('/') || base_url.starts_with("//") {
        return None;
    }
    let path = base_url.trim_matches('/');
    if path.split('/').any(|segment| segment == ".." || segment.contains(':')) {
        return None;
    }
    Some(path)
}

/// Copy the contents of `src` into `dst`, creating directories as needed.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<(), SiteError> {
    for entry in walkdir::WalkDir::new(src).min_depth(1) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

// ============================================================================
// HTML Components
// ============================================================================

fn base_document(
    title: &str,
    lang: &str,
    styles: Markup,
    content: Markup,
    scripts: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                (styles)
            }
            body {
                (content)
                (scripts)
            }
        }
    }
}

fn site_header(config: &PluginConfig) -> Markup {
    html! {
        header.site-header {
            a.site-title href="/" { (config.site.title) }
        }
    }
}
