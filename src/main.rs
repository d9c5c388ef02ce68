//! templayer - render themed html templates from the command line.

use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use templayer::{Context, DirSource, Engine, EngineConfig, RenderEnv, Result};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "templayer")]
#[command(version, about = "Render themed html templates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a page to stdout
    Render {
        /// Logical path of the template, e.g. user/read.html
        path: String,

        #[command(flatten)]
        roots: Roots,

        /// Json file with the render context
        #[arg(short, long)]
        context: Option<PathBuf>,

        /// Json file with the request scoped globals, reached as g.*
        #[arg(short, long)]
        globals: Option<PathBuf>,

        /// Print the entity tag of the result to stderr
        #[arg(long)]
        etag: bool,
    },
    /// Show which template a logical path resolves to
    Resolve {
        path: String,

        #[command(flatten)]
        roots: Roots,

        /// Show the whole inheritance chain
        #[arg(long)]
        chain: bool,
    },
}

#[derive(Args)]
struct Roots {
    /// Toml config naming the template roots
    #[arg(long, conflicts_with_all = ["root", "theme_root"])]
    config: Option<PathBuf>,

    /// Directory of the default templates
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// A theme directory (NAME=DIR)
    #[arg(long, value_parser = parse_theme_root)]
    theme_root: Vec<(String, PathBuf)>,

    /// Theme to render with
    #[arg(short, long)]
    theme: Option<String>,
}

fn parse_theme_root(arg: &str) -> std::result::Result<(String, PathBuf), String> {
    match arg.split_once('=') {
        Some((name, dir)) if !name.is_empty() && !dir.is_empty() => {
            Ok((name.to_string(), PathBuf::from(dir)))
        }
        _ => Err(format!("expected NAME=DIR, got {arg:?}")),
    }
}

impl Roots {
    /// The engine and the theme to use.
    fn engine(&self) -> Result<(Engine, Option<String>)> {
        if let Some(config) = &self.config {
            let config = EngineConfig::load(config)?;
            let theme = self.theme.clone().or_else(|| config.default_theme.clone());
            return Ok((config.build()?, theme));
        }
        let root = self.root.clone().unwrap_or_else(|| PathBuf::from("templates"));
        let engine = self
            .theme_root
            .iter()
            .try_fold(Engine::new(DirSource::new(root)), |engine, (name, dir)| {
                engine.with_theme(name, DirSource::new(dir))
            })?;
        Ok((engine, self.theme.clone()))
    }
}

fn read_json(path: Option<&Path>) -> Result<Context> {
    match path {
        Some(path) => {
            debug!(file = %path.display(), "reading json");
            Context::from_json(&fs::read_to_string(path)?)
        }
        None => Ok(Context::new()),
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Render {
            path,
            roots,
            context,
            globals,
            etag,
        } => {
            let (engine, theme) = roots.engine()?;
            let context = read_json(context.as_deref())?;
            let env = RenderEnv::new()
                .maybe_theme(theme)
                .globals(read_json(globals.as_deref())?);
            let page = engine.render_page(&path, &context, &env)?;
            io::stdout().write_all(page.html.as_bytes())?;
            if etag {
                eprintln!("{}", page.etag);
            }
        }
        Commands::Resolve { path, roots, chain } => {
            let (engine, theme) = roots.engine()?;
            let mut out = io::stdout().lock();
            if chain {
                for origin in engine.build_chain(&path, theme.as_deref())?.origins() {
                    writeln!(out, "{origin}")?;
                }
            } else {
                writeln!(out, "{}", engine.resolve(&path, theme.as_deref())?.origin)?;
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "templayer=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
