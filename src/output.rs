//! CLI output formatting.
//!
//! Each command has a `format_*` function returning lines (pure, testable)
//! and a `print_*` wrapper that writes them to stdout.
//!
//! ## Inspect
//!
//! ```text
//! Decision
//!     post-gallery: yes
//!     stirile-zilei: no
//! Assets (7)
//!     001 lightgallery-css [style] /lg/css/lightgallery-bundle.min.css?ver=1
//!     002 lightgallery [script] /lg/lightgallery.min.js?ver=1
//!     003 lightgallery-zoom [script] /lg/plugins/zoom/lg-zoom.min.js?ver=1
//!         after: lightgallery
//!     ...
//!     007 lightgallery-init [script] (inline)
//!         after: lightgallery, lightgallery-hash, lightgallery-pager, ...
//! Config
//!     window.WPLG = {"enablePostGallery":true,"enableStirileZilei":false};
//! ```
//!
//! ## Build
//!
//! ```text
//! Home → index.html
//! 001 Hello world → hello-world/index.html
//! 002 Vacation photos → vacation-photos/index.html
//!     gallery: post-gallery (7 assets)
//!
//! Generated 2 post pages, 1 with galleries
//! ```

use crate::assets::AssetPlan;
use crate::bootstrap;
use crate::site::BuildReport;
use crate::types::{Decision, GalleryMode};

fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// Active mode markers, e.g. `post-gallery, stirile-zilei`.
fn mode_list(decision: &Decision) -> String {
    [GalleryMode::PostGallery, GalleryMode::StirileZilei]
        .into_iter()
        .filter(|m| decision.is_active(*m))
        .map(GalleryMode::marker)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format the decision and plan for one piece of content.
pub fn format_inspect_output(decision: &Decision, plan: &AssetPlan) -> Vec<String> {
    let mut lines = vec![
        "Decision".to_string(),
        format!("    post-gallery: {}", yes_no(decision.post_gallery())),
        format!("    stirile-zilei: {}", yes_no(decision.stirile_zilei())),
    ];

    if plan.is_empty() {
        lines.push("Assets: none".to_string());
        return lines;
    }

    lines.push(format!("Assets ({})", plan.assets.len()));
    for (i, node) in plan.assets.iter().enumerate() {
        let kind = match node.kind {
            crate::assets::AssetKind::Style => "style",
            crate::assets::AssetKind::Script => "script",
        };
        let location = match &node.url {
            Some(url) => format!("{url}?ver={}", node.version),
            None => "(inline)".to_string(),
        };
        lines.push(format!(
            "    {} {} [{}] {}",
            format_index(i + 1),
            node.name,
            kind,
            location
        ));
        if !node.depends_on.is_empty() {
            let deps: Vec<&str> = node.depends_on.iter().map(String::as_str).collect();
            lines.push(format!("        after: {}", deps.join(", ")));
        }
    }

    if let Some(config) = &plan.config {
        lines.push("Config".to_string());
        match bootstrap::config_script(config) {
            Ok(script) => lines.push(format!("    {script}")),
            Err(err) => lines.push(format!("    (unavailable: {err})")),
        }
    }
    lines
}

pub fn print_inspect_output(decision: &Decision, plan: &AssetPlan) {
    for line in format_inspect_output(decision, plan) {
        println!("{}", line);
    }
}

/// Format the pages written by a site build.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = vec!["Home → index.html".to_string()];
    let mut with_gallery = 0;

    for (i, post) in report.posts.iter().enumerate() {
        lines.push(format!(
            "{} {} → {}",
            format_index(i + 1),
            post.title,
            post.path
        ));
        if post.decision.needs_assets() {
            with_gallery += 1;
            lines.push(format!(
                "    gallery: {} ({} assets)",
                mode_list(&post.decision),
                post.asset_count
            ));
        }
    }

    if report.assets_copied {
        lines.push("Assets copied".to_string());
    }
    lines.push(String::new());
    lines.push(format!(
        "Generated {} post {}, {} with galleries",
        report.posts.len(),
        if report.posts.len() == 1 { "page" } else { "pages" },
        with_gallery
    ));
    lines
}

pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::build_plan;
    use crate::site::PostSummary;
    use std::path::PathBuf;

    fn v(_: &str) -> String {
        "1".to_string()
    }

    #[test]
    fn inspect_inactive() {
        let lines = format_inspect_output(&Decision::inactive(), &AssetPlan::default());
        assert_eq!(
            lines,
            vec![
                "Decision",
                "    post-gallery: no",
                "    stirile-zilei: no",
                "Assets: none"
            ]
        );
    }

    #[test]
    fn inspect_lists_assets_in_order() {
        let decision = Decision::new(true, false);
        let plan = build_plan(&decision, "/lg/", &v);
        let lines = format_inspect_output(&decision, &plan);
        assert_eq!(lines[3], "Assets (7)");
        assert_eq!(
            lines[4],
            "    001 lightgallery-css [style] /lg/css/lightgallery-bundle.min.css?ver=1"
        );
        assert!(lines.contains(&"    007 lightgallery-init [script] (inline)".to_string()));
        assert!(lines.contains(
            &"    window.WPLG = {\"enablePostGallery\":true,\"enableStirileZilei\":false};"
                .to_string()
        ));
    }

    #[test]
    fn init_dependencies_are_listed() {
        let decision = Decision::new(false, true);
        let plan = build_plan(&decision, "/lg/", &v);
        let lines = format_inspect_output(&decision, &plan);
        let init = lines
            .iter()
            .position(|l| l.contains("lightgallery-init"))
            .unwrap();
        assert_eq!(
            lines[init + 1],
            "        after: lightgallery, lightgallery-hash, lightgallery-rotate, lightgallery-thumbnail, lightgallery-zoom"
        );
    }

    #[test]
    fn build_summary() {
        let report = BuildReport {
            output_dir: PathBuf::from("dist"),
            assets_copied: false,
            posts: vec![
                PostSummary {
                    slug: "plain".into(),
                    title: "Plain".into(),
                    path: "plain/index.html".into(),
                    decision: Decision::inactive(),
                    asset_count: 0,
                },
                PostSummary {
                    slug: "both".into(),
                    title: "Both".into(),
                    path: "both/index.html".into(),
                    decision: Decision::new(true, true),
                    asset_count: 8,
                },
            ],
        };
        let lines = format_build_output(&report);
        assert_eq!(
            lines,
            vec![
                "Home → index.html",
                "001 Plain → plain/index.html",
                "002 Both → both/index.html",
                "    gallery: post-gallery, stirile-zilei (8 assets)",
                "",
                "Generated 2 post pages, 1 with galleries",
            ]
        );
    }
}
