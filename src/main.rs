use clap::{Parser, Subcommand};
use folio::{config, output, pipeline};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

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

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Static build pipeline for portfolio sites")]
#[command(long_about = "\
Static build pipeline for portfolio sites

Category directories hold project directories. Each project has an index.md
(YAML front-matter + markdown body) and any number of images and videos.

Content structure:

  src/
  ├── featured.yaml                # Ordered list of featured projects
  └── projects/
      ├── works/                   # Category
      │   └── demo/                # Project → id \"works/demo\"
      │       ├── index.md         # Metadata document (required)
      │       ├── photo.jpg        # → photo_thumbnail.jpeg, photo_full.jpeg
      │       └── clip.mov         # → clip_thumbnail.jpeg, clip.mp4
      └── talks/                   # Empty categories are listed too

Existing derivatives are never re-encoded. Use --reprocess to redo videos.
Videos require ffmpeg on PATH (or [video] ffmpeg in the config).

Run 'folio gen-config' to generate a documented folio.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file; relative paths inside it resolve against its directory
    #[arg(long, default_value = "folio.toml", global = true)]
    config: PathBuf,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only warnings and errors; hides per-project progress
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate derivatives and write the index page
    Build {
        /// Re-encode video derivatives even if they exist
        #[arg(long)]
        reprocess: bool,
        /// Delete derivatives no project references anymore
        #[arg(long)]
        prune: bool,
    },
    /// Validate projects, metadata and featured ids without writing anything
    Check,
    /// Print a stock folio.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(log_level(cli.verbose, cli.quiet));

    match cli.command {
        Command::Build { reprocess, prune } => {
            let config = config::load_config(&cli.config)?;
            init_thread_pool(&config.processing);
            println!("==> Building {}", config.paths.projects.display());
            let report = pipeline::build(&config, pipeline::BuildOptions { reprocess, prune })?;
            output::print_build_output(&report);
            println!("==> Build complete: {}", config.paths.output.display());
        }
        Command::Check => {
            let config = config::load_config(&cli.config)?;
            init_thread_pool(&config.processing);
            println!("==> Checking {}", config.paths.projects.display());
            let report = pipeline::check(&config)?;
            output::print_check_output(&report);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Progress (`info`) by default, `-q` drops to warnings, `-v` adds detail.
fn log_level(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

/// Install the fmt subscriber. `RUST_LOG` wins over the flags.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
