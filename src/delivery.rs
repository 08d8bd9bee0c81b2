//! Asset registry: turns asset plans into `<link>` and `<script>` tags.
//!
//! A page owns one registry. Plans are enqueued into it, duplicates are
//! ignored by `(kind, name)`, and rendering emits each asset once, after
//! everything it depends on. Inline payloads ride on a registered asset and
//! are printed immediately before or after its tag.
//!
//! A script whose dependency never got registered is left out of the page
//! (with a warning) rather than loaded in the wrong order.

use crate::assets::{AssetKind, AssetNode, AssetPlan, INIT_HANDLE, STYLE_HANDLE};
use crate::bootstrap::{self, BootstrapError};
use crate::config::{self, StyleConfig};
use maud::{Markup, PreEscaped, html};
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlinePosition {
    Before,
    After,
}

#[derive(Debug, Clone)]
pub struct RegisteredAsset {
    pub node: AssetNode,
    pub inline_before: Vec<String>,
    pub inline_after: Vec<String>,
}

impl RegisteredAsset {
    /// `url?ver=version`, or `None` for inline-only assets.
    pub fn versioned_url(&self) -> Option<String> {
        self.node.url.as_ref().map(|url| {
            let sep = if url.contains('?') { '&' } else { '?' };
            format!("{url}{sep}ver={}", self.node.version)
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    assets: Vec<RegisteredAsset>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Emitted,
    Dropped,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn get(&self, kind: AssetKind, name: &str) -> Option<&RegisteredAsset> {
        self.assets
            .iter()
            .find(|a| a.node.kind == kind && a.node.name == name)
    }

    fn get_mut(&mut self, kind: AssetKind, name: &str) -> Option<&mut RegisteredAsset> {
        self.assets
            .iter_mut()
            .find(|a| a.node.kind == kind && a.node.name == name)
    }

    /// Register a node. Returns `false` if it was already registered.
    pub fn enqueue(&mut self, node: AssetNode) -> bool {
        if self.get(node.kind, &node.name).is_some() {
            return false;
        }
        self.assets.push(RegisteredAsset {
            node,
            inline_before: Vec::new(),
            inline_after: Vec::new(),
        });
        true
    }

    /// Attach inline code to a registered asset. Returns `false` if the asset
    /// is not registered.
    pub fn add_inline(
        &mut self,
        kind: AssetKind,
        name: &str,
        position: InlinePosition,
        code: String,
    ) -> bool {
        let Some(asset) = self.get_mut(kind, name) else {
            return false;
        };
        match position {
            InlinePosition::Before => asset.inline_before.push(code),
            InlinePosition::After => asset.inline_after.push(code),
        }
        true
    }

    /// Register a plan with its inline payloads: the cosmetic style after the
    /// stylesheet, `window.WPLG` before the init node, and the bootstrap
    /// after it. An empty plan registers nothing.
    pub fn enqueue_plan(&mut self, plan: &AssetPlan, style: &StyleConfig) -> Result<(), BootstrapError> {
        let Some(gallery_config) = plan.config.as_ref() else {
            return Ok(());
        };
        let mut fresh_init = false;
        for node in &plan.assets {
            let is_init = node.kind == AssetKind::Script && node.name == INIT_HANDLE;
            if self.enqueue(node.clone()) {
                fresh_init |= is_init;
                if node.kind == AssetKind::Style && node.name == STYLE_HANDLE {
                    self.add_inline(
                        AssetKind::Style,
                        STYLE_HANDLE,
                        InlinePosition::After,
                        config::inline_style(style),
                    );
                }
            }
        }
        if fresh_init {
            self.add_inline(
                AssetKind::Script,
                INIT_HANDLE,
                InlinePosition::Before,
                bootstrap::config_script(gallery_config)?,
            );
            self.add_inline(
                AssetKind::Script,
                INIT_HANDLE,
                InlinePosition::After,
                bootstrap::emit_init(gallery_config)?,
            );
        }
        Ok(())
    }

    /// Assets of one kind, each after its dependencies, otherwise in
    /// registration order.
    pub fn ordered(&self, kind: AssetKind) -> Vec<&RegisteredAsset> {
        let by_name: HashMap<&str, &RegisteredAsset> = self
            .assets
            .iter()
            .filter(|a| a.node.kind == kind)
            .map(|a| (a.node.name.as_str(), a))
            .collect();
        let mut state: HashMap<&str, Visit> = HashMap::new();
        let mut out = Vec::new();
        for asset in self.assets.iter().filter(|a| a.node.kind == kind) {
            visit(asset.node.name.as_str(), &by_name, &mut state, &mut out);
        }
        out
    }

    /// Stylesheets and inline styles for `<head>`.
    pub fn render_head(&self) -> Markup {
        html! {
            @for asset in self.ordered(AssetKind::Style) {
                @if let Some(href) = asset.versioned_url() {
                    link rel="stylesheet" id={ (asset.node.name) "-css" } href=(href) media="all";
                }
                @for code in &asset.inline_after {
                    style id={ (asset.node.name) "-inline-css" } { (PreEscaped(code)) }
                }
            }
        }
    }

    /// Scripts and inline payloads for the end of `<body>`.
    pub fn render_footer(&self) -> Markup {
        html! {
            @for asset in self.ordered(AssetKind::Script) {
                @for code in &asset.inline_before {
                    script id={ (asset.node.name) "-js-before" } { (PreEscaped(code)) }
                }
                @if let Some(src) = asset.versioned_url() {
                    script id={ (asset.node.name) "-js" } src=(src) {}
                }
                @for code in &asset.inline_after {
                    script id={ (asset.node.name) "-js-after" } { (PreEscaped(code)) }
                }
            }
        }
    }
}

/// Depth-first emit; returns whether `name` made it into `out`.
fn visit<'a>(
    name: &'a str,
    by_name: &HashMap<&'a str, &'a RegisteredAsset>,
    state: &mut HashMap<&'a str, Visit>,
    out: &mut Vec<&'a RegisteredAsset>,
) -> bool {
    match state.get(name) {
        Some(Visit::Emitted) => return true,
        Some(Visit::Dropped) => return false,
        Some(Visit::InProgress) => {
            warn!(asset = name, "dependency cycle, dropping asset");
            return false;
        }
        None => {}
    }
    let Some(asset) = by_name.get(name).copied() else {
        return false;
    };

    state.insert(name, Visit::InProgress);
    for dep in &asset.node.depends_on {
        if !visit(dep.as_str(), by_name, state, out) {
            warn!(asset = name, dependency = %dep, "missing dependency, dropping asset");
            state.insert(name, Visit::Dropped);
            return false;
        }
    }
    state.insert(name, Visit::Emitted);
    out.push(asset);
    true
}
