//! Content classification: does this post need a gallery, and which kind?
//!
//! Two independent rules run over the same parsed content:
//!
//! - **post-gallery**: some `<a>` has an `<img>` anywhere below it.
//! - **stirile-zilei**: the post is in the target category *and* some `<a href>`
//!   points at `http(s)://drscdn.500px.org/photo/…`.
//!
//! Both can be true at once. Classification is pure and cheap enough to be
//! recomputed by every pipeline stage that needs it, so nothing threads a
//! decision from the content filter to asset delivery.

use crate::dom::{self, Fragment};
use crate::posts::Post;
use crate::types::{CategoryContext, Decision, PHOTO_HOST, PHOTO_PATH_PREFIX, ViewContext};
use tracing::debug;

/// Classify a post body. `None` is treated as empty content.
pub fn classify(content: Option<&str>, category: &CategoryContext) -> Decision {
    let Some(content) = content.filter(|c| !c.trim().is_empty()) else {
        return Decision::inactive();
    };
    let fragment = Fragment::parse(content);
    let anchors = fragment.elements("a");

    let post_gallery = anchors.iter().any(wraps_image);
    let stirile_zilei = category.in_target_category
        && anchors
            .iter()
            .filter_map(|a| dom::attr(a, "href"))
            .any(|href| is_photo_url(&href));

    Decision::new(post_gallery, stirile_zilei)
}

/// Decide what the current request needs, given the host's view and post.
///
/// Anything other than a single-post view is "feature inactive", as is a
/// missing post.
pub fn requirements_for(view: &ViewContext, post: Option<&Post>, target_category: &str) -> Decision {
    if !view.singular_post {
        return Decision::inactive();
    }
    let Some(post) = post else {
        return Decision::inactive();
    };
    let decision = classify(Some(&post.content), &post.category_context(target_category));
    debug!(
        slug = %post.slug,
        post_gallery = decision.post_gallery(),
        stirile_zilei = decision.stirile_zilei(),
        "classified post"
    );
    decision
}

/// True if `anchor` has an `<img>` element among its descendants.
pub(crate) fn wraps_image(anchor: &markup5ever_rcdom::Handle) -> bool {
    dom::descendants(anchor)
        .iter()
        .any(|node| dom::is_element(node, "img"))
}

/// `http://` or `https://`, exact host `drscdn.500px.org`, path starting `/photo/`.
///
/// Scheme and host compare case-insensitively; the path does too, matching the
/// loose check the content has always been held to.
pub fn is_photo_url(href: &str) -> bool {
    let href = href.trim();
    let rest = strip_prefix_ignore_case(href, "https://")
        .or_else(|| strip_prefix_ignore_case(href, "http://"));
    rest.and_then(|r| strip_prefix_ignore_case(r, PHOTO_HOST))
        .and_then(|r| strip_prefix_ignore_case(r, PHOTO_PATH_PREFIX))
        .is_some()
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}
