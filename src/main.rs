use clap::{Parser, Subcommand};
use lightgallery_imagebox::classify::classify;
use lightgallery_imagebox::types::{CategoryContext, ViewContext};
use lightgallery_imagebox::{annotate, assets, config, output, site};
use std::path::{Path, PathBuf};
use tracing::{Level, debug};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

/// Flags for commands that operate on a single body file.
#[derive(clap::Args, Clone)]
struct ContentArgs {
    /// HTML body of one post
    file: PathBuf,

    /// Treat the post as belonging to the target category
    #[arg(long)]
    category: bool,
}

#[derive(Parser)]
#[command(name = "lightgallery-imagebox")]
#[command(about = "Content-conditional lightGallery wiring for blog posts")]
#[command(long_about = "\
Content-conditional lightGallery wiring for blog posts

Post bodies are classified into two gallery modes:

  post-gallery    any <a> that wraps an <img>
  stirile-zilei   links to https://drscdn.500px.org/photo/... in posts of the
                  target category (captioned, with a thumbnail strip)

Only single-post pages are enhanced. A page that needs a gallery gets the
lightGallery stylesheet, the core script, the plugins its modes use, the
window.WPLG config and the bootstrap script; every other page gets nothing.

Posts layout for `build`:

  posts/
  ├── 010-hello-world.html       # body only
  ├── 020-stirile-zilei.html
  ├── 020-stirile-zilei.toml     # title, categories, post_type
  └── draft-notes.html           # unnumbered: listed last

Run 'lightgallery-imagebox gen-config' to generate a documented lightgallery.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory holding lightgallery.toml and the asset dir
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the gallery decision and asset plan for a post body
    Inspect(ContentArgs),
    /// Print a post body as the content filter would rewrite it
    Annotate(ContentArgs),
    /// Render a posts directory into a static site
    Build {
        /// Directory of post bodies and sidecars
        #[arg(long, default_value = "posts")]
        posts: PathBuf,

        /// Output directory
        #[arg(long, default_value = "dist")]
        output: PathBuf,
    },
    /// Print a stock lightgallery.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Inspect(args) => {
            let config = config::load_config(&cli.config_dir)?;
            let content = std::fs::read_to_string(&args.file)?;
            let category = CategoryContext::new(args.category);
            let decision = classify(Some(&content), &category);
            let versions = asset_versions(&cli.config_dir, &config);
            let plan = assets::build_plan(&decision, &config.assets.base_url, &versions);
            output::print_inspect_output(&decision, &plan);
        }
        Command::Annotate(args) => {
            let content = std::fs::read_to_string(&args.file)?;
            let category = CategoryContext::new(args.category);
            print!(
                "{}",
                annotate::annotate(&content, &ViewContext::single_post(), &category)
            );
        }
        Command::Build { posts, output: out } => {
            let config = config::load_config(&cli.config_dir)?;
            debug!(target_category = %config.target_category, "loaded config");
            println!("==> Building {} → {}", posts.display(), out.display());
            let report = site::build(&posts, &cli.config_dir, &out, &config)?;
            output::print_build_output(&report);
            println!("==> Build complete: {}", report.output_dir.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Logs go to stderr so command output stays pipeable.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn asset_versions(config_dir: &Path, config: &config::PluginConfig) -> assets::FileMtimeVersions {
    assets::FileMtimeVersions::new(
        config_dir.join(&config.assets.dir),
        config.assets.fallback_version.clone(),
    )
}
