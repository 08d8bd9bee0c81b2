//! Asset planning: which stylesheets and scripts a page must load.
//!
//! A plan is a small dependency graph built from a [`Decision`]:
//!
//! ```text
//! lightgallery-css                       (style, no deps)
//! lightgallery                           (core script, no deps)
//! lightgallery-{zoom,hash,rotate,...}    (one per capability, → core)
//! lightgallery-init                      (no URL, → core + every capability)
//! ```
//!
//! The init node carries no file of its own; it exists so the bootstrap
//! attached to it runs after the core and every plugin it may reference.
//!
//! ## Versioning
//!
//! Each node's `?ver=` token comes from a [`VersionSource`]. The builder only
//! threads tokens through; [`FileMtimeVersions`] is the default policy
//! (file modification time, constant fallback when the file is missing).

use crate::bootstrap::GalleryConfig;
use crate::types::Decision;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

pub const STYLE_HANDLE: &str = "lightgallery-css";
pub const CORE_HANDLE: &str = "lightgallery";
pub const INIT_HANDLE: &str = "lightgallery-init";

const STYLE_FILE: &str = "css/lightgallery-bundle.min.css";
const CORE_FILE: &str = "lightgallery.min.js";

/// Optional lightGallery plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Zoom,
    Hash,
    Rotate,
    Pager,
    Thumbnail,
}

impl Capability {
    /// Load order within a plan.
    pub const ALL: [Capability; 5] = [
        Capability::Zoom,
        Capability::Hash,
        Capability::Rotate,
        Capability::Pager,
        Capability::Thumbnail,
    ];

    fn slug(self) -> &'static str {
        match self {
            Capability::Zoom => "zoom",
            Capability::Hash => "hash",
            Capability::Rotate => "rotate",
            Capability::Pager => "pager",
            Capability::Thumbnail => "thumbnail",
        }
    }

    /// Asset handle, e.g. `lightgallery-zoom`.
    pub fn handle(self) -> String {
        format!("{CORE_HANDLE}-{}", self.slug())
    }

    /// Path of the plugin script relative to the asset root.
    pub fn file(self) -> String {
        format!("plugins/{0}/lg-{0}.min.js", self.slug())
    }

    /// Global the plugin's UMD build defines on `window`.
    pub fn global_name(self) -> &'static str {
        match self {
            Capability::Zoom => "lgZoom",
            Capability::Hash => "lgHash",
            Capability::Rotate => "lgRotate",
            Capability::Pager => "lgPager",
            Capability::Thumbnail => "lgThumbnail",
        }
    }
}

/// Which plugins the active modes need.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilityFlags {
    pub zoom: bool,
    pub hash: bool,
    pub rotate: bool,
    pub pager: bool,
    pub thumbnail: bool,
}

impl CapabilityFlags {
    /// zoom/hash/rotate serve both galleries; pager is post-gallery only and
    /// thumbnails are stirile-zilei only.
    pub fn from_decision(decision: &Decision) -> Self {
        let any = decision.post_gallery() || decision.stirile_zilei();
        Self {
            zoom: any,
            hash: any,
            rotate: any,
            pager: decision.post_gallery(),
            thumbnail: decision.stirile_zilei(),
        }
    }

    pub fn contains(&self, capability: Capability) -> bool {
        match capability {
            Capability::Zoom => self.zoom,
            Capability::Hash => self.hash,
            Capability::Rotate => self.rotate,
            Capability::Pager => self.pager,
            Capability::Thumbnail => self.thumbnail,
        }
    }

    /// Enabled capabilities in load order.
    pub fn enabled(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.contains(*c))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Style,
    Script,
}

/// One entry in the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetNode {
    pub name: String,
    pub kind: AssetKind,
    /// `None` for the synthetic init node.
    pub url: Option<String>,
    pub depends_on: BTreeSet<String>,
    pub version: String,
}

/// Assets to load plus the client configuration, or nothing at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssetPlan {
    pub assets: Vec<AssetNode>,
    pub config: Option<GalleryConfig>,
}

impl AssetPlan {
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&AssetNode> {
        self.assets.iter().find(|a| a.name == name)
    }

    /// Every node `name` depends on, directly or transitively.
    pub fn dependency_closure(&self, name: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut pending: Vec<&str> = vec![name];
        while let Some(current) = pending.pop() {
            let Some(node) = self.get(current) else {
                continue;
            };
            for dep in &node.depends_on {
                if seen.insert(dep.clone()) {
                    pending.push(dep.as_str());
                }
            }
        }
        seen
    }

    /// Capabilities included in this plan.
    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.get(&c.handle()).is_some())
            .collect()
    }
}

/// Maps an asset handle to a cache-busting token.
pub trait VersionSource {
    fn version_of(&self, name: &str) -> String;
}

impl<F> VersionSource for F
where
    F: Fn(&str) -> String,
{
    fn version_of(&self, name: &str) -> String {
        self(name)
    }
}

/// Versions from file modification times under an asset directory.
#[derive(Debug, Clone)]
pub struct FileMtimeVersions {
    asset_dir: PathBuf,
    fallback: String,
}

impl FileMtimeVersions {
    pub fn new(asset_dir: impl Into<PathBuf>, fallback: impl Into<String>) -> Self {
        Self {
            asset_dir: asset_dir.into(),
            fallback: fallback.into(),
        }
    }

    pub fn asset_dir(&self) -> &Path {
        &self.asset_dir
    }
}

impl VersionSource for FileMtimeVersions {
    fn version_of(&self, name: &str) -> String {
        let Some(file) = asset_file(name) else {
            return self.fallback.clone();
        };
        std::fs::metadata(self.asset_dir.join(file))
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs().to_string())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// File backing a handle, relative to the asset root. The init node is
/// versioned with the core script it follows.
pub fn asset_file(name: &str) -> Option<String> {
    match name {
        STYLE_HANDLE => Some(STYLE_FILE.to_string()),
        CORE_HANDLE | INIT_HANDLE => Some(CORE_FILE.to_string()),
        _ => Capability::ALL
            .into_iter()
            .find(|c| c.handle() == name)
            .map(Capability::file),
    }
}

/// Build the asset plan for a decision.
///
/// `base_url` is the public URL of the asset root and should end with `/`.
pub fn build_plan(decision: &Decision, base_url: &str, versions: &dyn VersionSource) -> AssetPlan {
    if !decision.needs_assets() {
        return AssetPlan::default();
    }

    let url = |file: &str| Some(format!("{base_url}{file}"));
    let core_only: BTreeSet<String> = [CORE_HANDLE.to_string()].into();

    let mut assets = vec![
        AssetNode {
            name: STYLE_HANDLE.to_string(),
            kind: AssetKind::Style,
            url: url(STYLE_FILE),
            depends_on: BTreeSet::new(),
            version: versions.version_of(STYLE_HANDLE),
        },
        AssetNode {
            name: CORE_HANDLE.to_string(),
            kind: AssetKind::Script,
            url: url(CORE_FILE),
            depends_on: BTreeSet::new(),
            version: versions.version_of(CORE_HANDLE),
        },
    ];

    let mut init_deps = core_only.clone();
    for capability in CapabilityFlags::from_decision(decision).enabled() {
        let name = capability.handle();
        init_deps.insert(name.clone());
        assets.push(AssetNode {
            version: versions.version_of(&name),
            name,
            kind: AssetKind::Script,
            url: url(&capability.file()),
            depends_on: core_only.clone(),
        });
    }

    assets.push(AssetNode {
        name: INIT_HANDLE.to_string(),
        kind: AssetKind::Script,
        url: None,
        depends_on: init_deps,
        version: versions.version_of(INIT_HANDLE),
    });

    AssetPlan {
        assets,
        config: Some(GalleryConfig::from_decision(decision)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const BASE: &str = "/plugins/lg/";

    fn fixed(_: &str) -> String {
        "42".to_string()
    }

    fn names(plan: &AssetPlan) -> Vec<&str> {
        plan.assets.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn inactive_decision_gives_empty_plan() {
        let plan = build_plan(&Decision::inactive(), BASE, &fixed);
        assert!(plan.is_empty());
        assert!(plan.config.is_none());
    }

    #[test]
    fn post_gallery_plan_has_seven_nodes() {
        let plan = build_plan(&Decision::new(true, false), BASE, &fixed);
        assert_eq!(
            names(&plan),
            vec![
                "lightgallery-css",
                "lightgallery",
                "lightgallery-zoom",
                "lightgallery-hash",
                "lightgallery-rotate",
                "lightgallery-pager",
                "lightgallery-init",
            ]
        );
    }

    #[test]
    fn stirile_plan_uses_thumbnail_not_pager() {
        let plan = build_plan(&Decision::new(false, true), BASE, &fixed);
        assert_eq!(
            plan.capabilities(),
            vec![
                Capability::Zoom,
                Capability::Hash,
                Capability::Rotate,
                Capability::Thumbnail
            ]
        );
    }

    #[test]
    fn both_modes_load_every_capability() {
        let plan = build_plan(&Decision::new(true, true), BASE, &fixed);
        assert_eq!(plan.capabilities(), Capability::ALL.to_vec());
        assert_eq!(plan.assets.len(), 8);
    }

    #[test]
    fn init_runs_after_core_and_every_capability() {
        for decision in [
            Decision::new(true, false),
            Decision::new(false, true),
            Decision::new(true, true),
        ] {
            let plan = build_plan(&decision, BASE, &fixed);
            let closure = plan.dependency_closure(INIT_HANDLE);
            assert!(closure.contains(CORE_HANDLE));
            for capability in plan.capabilities() {
                assert!(closure.contains(&capability.handle()), "{capability:?}");
            }
            assert!(!closure.contains(STYLE_HANDLE));
            assert_eq!(plan.assets.last().unwrap().name, INIT_HANDLE);
        }
    }

    #[test]
    fn capabilities_depend_on_core_only() {
        let plan = build_plan(&Decision::new(true, true), BASE, &fixed);
        for capability in plan.capabilities() {
            let node = plan.get(&capability.handle()).unwrap();
            assert_eq!(node.kind, AssetKind::Script);
            assert_eq!(node.depends_on, [CORE_HANDLE.to_string()].into());
        }
    }

    #[test]
    fn urls_are_joined_to_base() {
        let plan = build_plan(&Decision::new(true, false), BASE, &fixed);
        assert_eq!(
            plan.get(STYLE_HANDLE).unwrap().url.as_deref(),
            Some("/plugins/lg/css/lightgallery-bundle.min.css")
        );
        assert_eq!(
            plan.get("lightgallery-pager").unwrap().url.as_deref(),
            Some("/plugins/lg/plugins/pager/lg-pager.min.js")
        );
        assert_eq!(plan.get(INIT_HANDLE).unwrap().url, None);
    }

    #[test]
    fn versions_come_from_source() {
        let versions = |name: &str| format!("v-{name}");
        let plan = build_plan(&Decision::new(false, true), BASE, &versions);
        for node in &plan.assets {
            assert_eq!(node.version, format!("v-{}", node.name));
        }
    }

    #[test]
    fn config_mirrors_decision() {
        let plan = build_plan(&Decision::new(false, true), BASE, &fixed);
        let config = plan.config.unwrap();
        assert!(!config.enable_post_gallery);
        assert!(config.enable_stirile_zilei);
    }

    #[test]
    fn capability_flags_per_mode() {
        let a = CapabilityFlags::from_decision(&Decision::new(true, false));
        assert!(a.zoom && a.hash && a.rotate && a.pager && !a.thumbnail);
        let b = CapabilityFlags::from_decision(&Decision::new(false, true));
        assert!(b.zoom && b.hash && b.rotate && !b.pager && b.thumbnail);
        let none = CapabilityFlags::from_decision(&Decision::inactive());
        assert!(none.enabled().is_empty());
    }

    #[test]
    fn mtime_versions_fall_back_when_missing() {
        let tmp = TempDir::new().unwrap();
        let versions = FileMtimeVersions::new(tmp.path(), "1");
        assert_eq!(versions.version_of(CORE_HANDLE), "1");
        assert_eq!(versions.version_of("not-an-asset"), "1");
    }

    #[test]
    fn mtime_versions_read_file_time() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("lightgallery.min.js"), "/* core */").unwrap();
        let versions = FileMtimeVersions::new(tmp.path(), "1");
        let token = versions.version_of(CORE_HANDLE);
        assert_ne!(token, "1");
        assert!(token.parse::<u64>().is_ok());
        // init follows the core script
        assert_eq!(versions.version_of(INIT_HANDLE), token);
        // the stylesheet is still missing
        assert_eq!(versions.version_of(STYLE_HANDLE), "1");
    }

    #[test]
    fn asset_files_for_plugins() {
        assert_eq!(
            asset_file("lightgallery-thumbnail").as_deref(),
            Some("plugins/thumbnail/lg-thumbnail.min.js")
        );
        assert_eq!(asset_file("unknown"), None);
    }
}
