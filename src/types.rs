//! Shared types passed between the classifier, annotator, and asset planner.
//!
//! Everything here is request-scoped: a decision is recomputed for every page
//! render and never stored.

use serde::{Deserialize, Serialize};

/// Attribute carrying the gallery mode marker on an anchor.
pub const MODE_ATTR: &str = "data-lightgallery";
/// Attribute carrying the external thumbnail source (stirile-zilei only).
pub const THUMB_ATTR: &str = "data-exthumbimage";
/// Attribute lightGallery reads captions from.
pub const SUB_HTML_ATTR: &str = "data-sub-html";

/// Host and path of the external photo CDN that stirile-zilei links point to.
pub const PHOTO_HOST: &str = "drscdn.500px.org";
pub const PHOTO_PATH_PREFIX: &str = "/photo/";

/// The two mutually-exclusive gallery modes an anchor can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GalleryMode {
    /// Any anchor wrapping an image.
    PostGallery,
    /// Category-gated anchors linking to the photo CDN.
    StirileZilei,
}

impl GalleryMode {
    /// Value written into [`MODE_ATTR`].
    pub fn marker(self) -> &'static str {
        match self {
            GalleryMode::PostGallery => "post-gallery",
            GalleryMode::StirileZilei => "stirile-zilei",
        }
    }

    pub fn from_marker(value: &str) -> Option<Self> {
        match value {
            "post-gallery" => Some(GalleryMode::PostGallery),
            "stirile-zilei" => Some(GalleryMode::StirileZilei),
            _ => None,
        }
    }

    /// CSS selector matching anchors tagged with this mode.
    pub fn selector(self) -> String {
        format!(r#"a[{}="{}"]"#, MODE_ATTR, self.marker())
    }
}

/// Whether the post being rendered belongs to the gated category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryContext {
    pub in_target_category: bool,
}

impl CategoryContext {
    pub fn new(in_target_category: bool) -> Self {
        Self { in_target_category }
    }
}

/// What the host is rendering right now.
///
/// Annotation only applies to the main query of a single-post view; list and
/// archive renders leave content untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewContext {
    /// The request is a single post page (not an archive, feed, or page).
    pub singular_post: bool,
    /// The content belongs to the page's main query, not a widget or sidebar loop.
    pub main_query: bool,
}

impl ViewContext {
    /// The main content of a single-post page.
    pub fn single_post() -> Self {
        Self {
            singular_post: true,
            main_query: true,
        }
    }

    /// An archive or index listing.
    pub fn archive() -> Self {
        Self {
            singular_post: false,
            main_query: true,
        }
    }

    pub fn is_main_single_view(&self) -> bool {
        self.singular_post && self.main_query
    }
}

/// Classification of one post's content.
///
/// `needs_assets` is always `post_gallery || stirile_zilei`; the only way to
/// build a decision is through [`Decision::new`] so the two can't drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Decision {
    needs_assets: bool,
    post_gallery: bool,
    stirile_zilei: bool,
}

impl Decision {
    pub fn new(post_gallery: bool, stirile_zilei: bool) -> Self {
        Self {
            needs_assets: post_gallery || stirile_zilei,
            post_gallery,
            stirile_zilei,
        }
    }

    /// Feature off: no modes, no assets.
    pub fn inactive() -> Self {
        Self::default()
    }

    pub fn needs_assets(&self) -> bool {
        self.needs_assets
    }

    pub fn post_gallery(&self) -> bool {
        self.post_gallery
    }

    pub fn stirile_zilei(&self) -> bool {
        self.stirile_zilei
    }

    pub fn is_active(&self, mode: GalleryMode) -> bool {
        match mode {
            GalleryMode::PostGallery => self.post_gallery,
            GalleryMode::StirileZilei => self.stirile_zilei,
        }
    }
}
