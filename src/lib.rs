//! # lightgallery-imagebox
//!
//! Decides, per rendered post, whether a page needs a lightGallery lightbox,
//! tags the links that should open in it, and emits the assets and the
//! bootstrap script that wire it up in the browser.
//!
//! Two independent gallery modes exist:
//!
//! - **post-gallery**: every link that wraps an image, on any post.
//! - **stirile-zilei**: links to `https://drscdn.500px.org/photo/...` on posts
//!   in the configured category, captioned with the link text and shown with
//!   a thumbnail strip.
//!
//! # Request Flow
//!
//! The host calls into the crate twice while rendering one single-post page.
//! Both calls derive the same [`types::Decision`] from the same inputs; no
//! state is carried between them.
//!
//! ```text
//! content filter   body HTML  →  annotate   →  body HTML with data-* markers
//! asset delivery   post       →  classify   →  Decision
//!                  Decision   →  assets     →  AssetPlan (graph + config)
//!                  AssetPlan  →  delivery   →  <link>/<script> tags
//! ```
//!
//! Archive pages, secondary queries and non-post content are left untouched
//! and load nothing.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Markers, modes, view/category context and the `Decision` |
//! | [`dom`] | HTML fragment parsing, attribute access and serialization |
//! | [`classify`] | Content classifier: which modes a post needs |
//! | [`annotate`] | Content filter: writes mode markers, thumbnails and captions |
//! | [`assets`] | Asset dependency graph and cache-busting versions |
//! | [`bootstrap`] | `window.WPLG` config and the client init script |
//! | [`delivery`] | Per-page asset registry and tag rendering |
//! | [`config`] | `lightgallery.toml` loading, merging and validation |
//! | [`posts`] | Post files and sidecars for the bundled static host |
//! | [`site`] | Static host: single-post pages and the archive index |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Real HTML Parsing
//!
//! Post bodies are parsed with html5ever as a body fragment rather than
//! scanned with regular expressions. Attribute values come back decoded,
//! nested markup inside links is handled, and serialization re-escapes
//! whatever the filter writes into attributes.
//!
//! ## Maud for Markup
//!
//! Page templates, asset tags and the caption snippet are built with
//! [Maud](https://maud.lambda.xyz/), so interpolated text is escaped by
//! default and malformed templates fail at compile time.
//!
//! ## Typed Client Config
//!
//! The object the browser reads as `window.WPLG` is a serde struct, not a
//! hand-built string. Field names are fixed by `#[serde(rename_all)]` and the
//! serialized JSON is made safe for a `<script>` element before it is
//! emitted.

pub mod annotate;
pub mod assets;
pub mod bootstrap;
pub mod classify;
pub mod config;
pub mod delivery;
pub mod dom;
pub mod output;
pub mod posts;
pub mod site;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
