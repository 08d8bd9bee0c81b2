//! Markup annotation: tag gallery anchors so the client bootstrap can find them.
//!
//! The post body is parsed once into an owned tree, a fixed sequence of
//! rewrite passes stamps attributes onto qualifying anchors, and the top-level
//! nodes are serialized back out.
//!
//! ## Passes
//!
//! | Pass | Selects | Writes |
//! |------|---------|--------|
//! | [`Pass::PostGallery`] | `<a>` with an `<img>` descendant | `data-lightgallery="post-gallery"` unless a marker is already present |
//! | [`Pass::StirileZilei`] | `<a href*="drscdn.500px.org/photo">` (target category only) | `data-lightgallery="stirile-zilei"`, `data-exthumbimage`, `data-sub-html` |
//!
//! The stirile-zilei pass runs second and always overwrites the marker, so an
//! anchor that qualifies for both ends up in the stirile-zilei gallery.
//!
//! Running the annotator over its own output produces the same markup.

use crate::classify::wraps_image;
use crate::dom::{self, Fragment};
use crate::types::{
    CategoryContext, GalleryMode, MODE_ATTR, PHOTO_HOST, SUB_HTML_ATTR, THUMB_ATTR, ViewContext,
};
use maud::html;
use tracing::debug;

/// A single attribute-rewrite step over the parsed fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    PostGallery,
    StirileZilei,
}

impl Pass {
    /// The passes that apply to a post, in the order they must run.
    pub fn for_category(category: &CategoryContext) -> Vec<Pass> {
        let mut passes = vec![Pass::PostGallery];
        if category.in_target_category {
            passes.push(Pass::StirileZilei);
        }
        passes
    }

    /// Apply the pass, returning how many anchors it wrote to.
    pub fn apply(self, fragment: &Fragment) -> usize {
        match self {
            Pass::PostGallery => tag_post_gallery(fragment),
            Pass::StirileZilei => tag_stirile_zilei(fragment),
        }
    }
}

/// Annotate the main content of a single-post view.
///
/// Any other view gets `content` back untouched.
pub fn annotate(content: &str, view: &ViewContext, category: &CategoryContext) -> String {
    if !view.is_main_single_view() {
        return content.to_string();
    }

    let fragment = Fragment::parse(content);
    for pass in Pass::for_category(category) {
        let written = pass.apply(&fragment);
        debug!(?pass, anchors = written, "annotation pass");
    }
    fragment.to_html()
}

fn tag_post_gallery(fragment: &Fragment) -> usize {
    let mut written = 0;
    for anchor in fragment.elements("a") {
        if wraps_image(&anchor) && !dom::has_attr(&anchor, MODE_ATTR) {
            dom::set_attr(&anchor, MODE_ATTR, GalleryMode::PostGallery.marker());
            written += 1;
        }
    }
    written
}

fn tag_stirile_zilei(fragment: &Fragment) -> usize {
    let needle = format!("{PHOTO_HOST}/photo");
    let mut written = 0;
    for anchor in fragment.elements("a") {
        let Some(href) = dom::attr(&anchor, "href") else {
            continue;
        };
        if !href.contains(&needle) {
            continue;
        }

        dom::set_attr(&anchor, MODE_ATTR, GalleryMode::StirileZilei.marker());

        let thumb = sanitize_url(&href);
        if !thumb.is_empty() {
            dom::set_attr(&anchor, THUMB_ATTR, &thumb);
        }

        let caption = collapse_whitespace(&dom::text_content(&anchor));
        if !caption.is_empty() {
            dom::set_attr(&anchor, SUB_HTML_ATTR, &caption_snippet(&caption));
        }
        written += 1;
    }
    written
}

/// Caption markup lightGallery renders under the slide. `text` is escaped.
pub fn caption_snippet(text: &str) -> String {
    html! {
        div.lg-sub-html {
            h4 { (text) }
        }
    }
    .into_string()
}

/// Drop every character that has no business in a URL.
///
/// Keeps ASCII alphanumerics, the URL punctuation set, and non-ASCII text
/// (IRIs). Quotes, angle brackets, whitespace, and control characters go.
/// A URL with any scheme other than `http` or `https` comes back empty;
/// relative and protocol-relative URLs are kept.
pub fn sanitize_url(url: &str) -> String {
    let cleaned: String = url
        .trim()
        .chars()
        .filter(|&c| {
            c.is_ascii_alphanumeric()
                || "-~+_.?#=!&;,/:%@$|*'()[]".contains(c)
                || (!c.is_ascii() && !c.is_control() && !c.is_whitespace())
        })
        .collect();
    match url_scheme(&cleaned) {
        Some(scheme) if !ALLOWED_SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme)) => {
            String::new()
        }
        _ => cleaned,
    }
}

const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];

/// The part before the first `:`, if that colon comes before any `/`, `?`
/// or `#`.
fn url_scheme(url: &str) -> Option<&str> {
    let end = url.find([':', '/', '?', '#'])?;
    url[end..].starts_with(':').then(|| &url[..end])
}

/// Collapse runs of ASCII whitespace to one space and trim the ends.
///
/// Non-breaking spaces are text, not separators, and are kept.
fn collapse_whitespace(text: &str) -> String {
    text.split(|c: char| matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
