//! Client bootstrap: the inline payloads attached to the init asset.
//!
//! Two scripts cross the server/client boundary, both produced from typed
//! values with `serde_json`:
//!
//! - [`config_script`]: `window.WPLG = {"enablePostGallery":…,"enableStirileZilei":…};`,
//!   emitted *before* the init node.
//! - [`emit_init`]: the `DOMContentLoaded` handler from `static/init.js`, with
//!   each mode's [`GallerySetup`] spliced in as a JSON literal, emitted
//!   *after* the init node.
//!
//! The handler never assumes a plugin is present: each setup lists plugin
//! globals by name (`lgZoom`, `lgPager`, …) and the client drops any that are
//! undefined when the gallery starts.

use crate::assets::{Capability, CapabilityFlags};
use crate::types::{Decision, GalleryMode, THUMB_ATTR};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const INIT_TEMPLATE: &str = include_str!("../static/init.js");

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which galleries the client should start. Serialized as `window.WPLG`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryConfig {
    pub enable_post_gallery: bool,
    pub enable_stirile_zilei: bool,
}

impl GalleryConfig {
    pub fn from_decision(decision: &Decision) -> Self {
        Self {
            enable_post_gallery: decision.post_gallery(),
            enable_stirile_zilei: decision.stirile_zilei(),
        }
    }

    fn capabilities(&self) -> CapabilityFlags {
        CapabilityFlags::from_decision(&Decision::new(
            self.enable_post_gallery,
            self.enable_stirile_zilei,
        ))
    }
}

/// `galleryId` is numeric for the post gallery and a name for stirile-zilei.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GalleryId {
    Index(u32),
    Name(String),
}

/// lightGallery options, minus `plugins` (resolved on the client).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryOptions {
    pub selector: String,
    pub gallery_id: GalleryId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom_from_origin: Option<bool>,
    pub pager: bool,
    pub thumbnail: bool,
    pub hash: bool,
    pub hide_scrollbar: bool,
    pub show_zoom_in_out_icons: bool,
    pub allow_media_overlap: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ex_thumb_image: Option<String>,
}

/// Everything the client needs to start one gallery mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GallerySetup {
    /// Plugin globals, in the order they are handed to lightGallery.
    pub plugins: Vec<&'static str>,
    pub options: GalleryOptions,
}

impl GallerySetup {
    /// Setup for `mode`, listing only plugins the plan loads.
    pub fn for_mode(mode: GalleryMode, loaded: &CapabilityFlags) -> Self {
        let (wanted, options) = match mode {
            GalleryMode::PostGallery => (
                [
                    Capability::Zoom,
                    Capability::Hash,
                    Capability::Rotate,
                    Capability::Pager,
                ],
                GalleryOptions {
                    selector: mode.selector(),
                    gallery_id: GalleryId::Index(0),
                    zoom_from_origin: Some(true),
                    pager: true,
                    thumbnail: false,
                    hash: true,
                    hide_scrollbar: true,
                    show_zoom_in_out_icons: true,
                    allow_media_overlap: true,
                    ex_thumb_image: None,
                },
            ),
            GalleryMode::StirileZilei => (
                [
                    Capability::Thumbnail,
                    Capability::Zoom,
                    Capability::Hash,
                    Capability::Rotate,
                ],
                GalleryOptions {
                    selector: mode.selector(),
                    gallery_id: GalleryId::Name(mode.marker().to_string()),
                    zoom_from_origin: None,
                    pager: false,
                    thumbnail: true,
                    hash: true,
                    hide_scrollbar: true,
                    show_zoom_in_out_icons: true,
                    allow_media_overlap: true,
                    ex_thumb_image: Some(THUMB_ATTR.to_string()),
                },
            ),
        };
        Self {
            plugins: wanted
                .into_iter()
                .filter(|c| loaded.contains(*c))
                .map(Capability::global_name)
                .collect(),
            options,
        }
    }
}

/// Serialize to JSON that is safe to embed inside a `<script>` element.
fn script_json<T: Serialize>(value: &T) -> Result<String, BootstrapError> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// `window.WPLG = …;`, run before the init logic.
pub fn config_script(config: &GalleryConfig) -> Result<String, BootstrapError> {
    Ok(format!("window.WPLG = {};", script_json(config)?))
}

/// The init logic for the galleries `config` enables.
pub fn emit_init(config: &GalleryConfig) -> Result<String, BootstrapError> {
    let loaded = config.capabilities();
    let post_gallery = GallerySetup::for_mode(GalleryMode::PostGallery, &loaded);
    let stirile_zilei = GallerySetup::for_mode(GalleryMode::StirileZilei, &loaded);
    Ok(INIT_TEMPLATE
        .replace("__POST_GALLERY__", &script_json(&post_gallery)?)
        .replace("__STIRILE_ZILEI__", &script_json(&stirile_zilei)?))
}
