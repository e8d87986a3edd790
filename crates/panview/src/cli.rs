use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use panview_core::Instant;
use panview_web::PageDescription;

use crate::config::{FlagOverrides, ShellConfig};
use crate::error::{Result, ShellError};
use crate::logging::{self, LogFormat};
use crate::shell::Shell;
use crate::store::{BookmarkStore, HistoryStore, UrlEntry};
use crate::trace::{parse_trace, replay};

#[derive(Debug, Parser)]
#[command(
    name = "panview",
    about = "Touch browser shell: gesture, kinetic panning and zoom core with trace replay",
    version
)]
pub struct Cli {
    /// Configuration file (TOML, or JSON by extension).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Start in fullscreen.
    #[arg(long, global = true)]
    pub fullscreen: bool,

    /// Hide the toolbar.
    #[arg(long, global = true)]
    pub no_toolbar: bool,

    /// Ask the host for GL compositing.
    #[arg(long, global = true)]
    pub gl: bool,

    /// Keep engine tile creation disabled.
    #[arg(long, global = true)]
    pub no_tile_cache: bool,

    /// Draw the frame-rate overlay.
    #[arg(long, global = true)]
    pub show_fps: bool,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    #[must_use]
    pub fn flag_overrides(&self) -> FlagOverrides {
        FlagOverrides {
            fullscreen: self.fullscreen,
            no_toolbar: self.no_toolbar,
            gl: self.gl,
            no_tile_cache: self.no_tile_cache,
            show_fps: self.show_fps,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a JSON-lines input trace against a static page.
    Replay(ReplayArgs),

    /// Print the effective configuration as TOML.
    Config,

    /// Print the stored history, most recent first, as JSON lines.
    History,

    /// Print the stored bookmarks as JSON lines.
    Bookmarks,
}

#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    /// Page description (JSON).
    #[arg(long)]
    pub page: PathBuf,

    /// Input trace (JSON lines).
    pub trace: PathBuf,

    /// Override the window width.
    #[arg(long)]
    pub width: Option<f64>,

    /// Override the window height.
    #[arg(long)]
    pub height: Option<f64>,

    /// Write events here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    logging::init(format);

    let config = effective_config(&cli)?;
    match cli.command {
        Commands::Replay(args) => run_replay(config, &args),
        Commands::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
        Commands::History => {
            let history = config.stores.history_path.as_ref().map_or_else(
                || HistoryStore::new(config.stores.history_capacity),
                |p| HistoryStore::load(p, config.stores.history_capacity),
            );
            print_entries(history.entries())
        }
        Commands::Bookmarks => {
            let bookmarks = config
                .stores
                .bookmarks_path
                .as_ref()
                .map_or_else(BookmarkStore::default, BookmarkStore::load);
            print_entries(bookmarks.entries())
        }
    }
}

/// File values (or defaults) with command-line flags on top, validated.
pub fn effective_config(cli: &Cli) -> Result<ShellConfig> {
    let mut config = match &cli.config {
        Some(path) => ShellConfig::load(path)?,
        None => ShellConfig::default(),
    };
    config.apply_flags(&cli.flag_overrides());
    if let Cli {
        command: Commands::Replay(args),
        ..
    } = cli
    {
        if let Some(width) = args.width {
            config.window.width = width;
        }
        if let Some(height) = args.height {
            config.window.height = height;
        }
    }
    config.validated()
}

fn print_entries(entries: &[UrlEntry]) -> Result<()> {
    let mut out = std::io::stdout().lock();
    for entry in entries {
        serde_json::to_writer(&mut out, entry)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

fn require(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ShellError::MissingPath {
            path: path.to_path_buf(),
        })
    }
}

fn run_replay(config: ShellConfig, args: &ReplayArgs) -> Result<()> {
    require(&args.page)?;
    require(&args.trace)?;
    let page: PageDescription = serde_json::from_str(&std::fs::read_to_string(&args.page)?)?;
    let records = parse_trace(&std::fs::read_to_string(&args.trace)?)?;
    tracing::info!(
        target: "panview.shell",
        page = %args.page.display(),
        trace = %args.trace.display(),
        records = records.len(),
        "replaying"
    );

    let mut shell = Shell::from_config(config);
    let start = Instant::now();
    let summary = match &args.output {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            replay(&mut shell, &page, &records, start, BufWriter::new(file))?
        }
        None => {
            let stdout = std::io::stdout().lock();
            replay(&mut shell, &page, &records, start, BufWriter::new(stdout))?
        }
    };
    shell.save_stores()?;
    tracing::info!(
        target: "panview.shell",
        inputs = summary.inputs,
        frames = summary.frames,
        events = summary.events,
        end_ms = summary.end_ms,
        "replay finished"
    );
    Ok(())
}
