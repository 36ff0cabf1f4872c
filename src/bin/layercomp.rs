use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use layercomp::{
    BatchJob, CompositionConfig, FontCache, FontDirResolver, FsRasterLoader, FsRasterSink,
    JobRunner, SystemFontDirs,
};

#[derive(Parser, Debug)]
#[command(name = "layercomp", version)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose a single configuration.
    Render(RenderArgs),
    /// Compose every `*.json` configuration in a directory.
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct Roots {
    /// Directory asset paths in the configuration are relative to.
    #[arg(long, default_value = "src")]
    src_dir: PathBuf,

    /// Directory outputs are written to (created if missing).
    #[arg(long, default_value = "dst")]
    out_dir: PathBuf,

    /// Directory holding `<font>.ttf` files; defaults to the platform font directory.
    #[arg(long)]
    font_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Configuration JSON.
    #[arg(long)]
    conf: PathBuf,

    #[command(flatten)]
    roots: Roots,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Directory of configuration JSON files.
    #[arg(long)]
    dir: PathBuf,

    /// Worker threads; defaults to the number of CPUs.
    #[arg(long)]
    jobs: Option<usize>,

    #[command(flatten)]
    roots: Roots,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Batch(args) => cmd_batch(args),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn make_runner(roots: &Roots) -> JobRunner {
    let fonts = match &roots.font_dir {
        Some(dir) => FontCache::new(FontDirResolver::new(dir)),
        None => FontCache::new(SystemFontDirs::default()),
    };
    JobRunner::new(
        Arc::new(FsRasterLoader::new(&roots.src_dir)),
        Arc::new(fonts),
        Arc::new(FsRasterSink::new(&roots.out_dir)),
    )
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = CompositionConfig::load(&args.conf)
        .with_context(|| format!("load configuration '{}'", args.conf.display()))?;
    let runner = make_runner(&args.roots);
    let default_name = layercomp::output_name_for(&config, &args.conf);

    match runner.run(&config, &default_name) {
        Ok(path) => {
            eprintln!("wrote {}", path.display());
            Ok(())
        }
        Err(e) => {
            if e.is_font_error() && args.roots.font_dir.is_none() {
                eprintln!("hint: pass --font-dir to use fonts from a specific directory");
            }
            Err(e).with_context(|| format!("compose '{}'", args.conf.display()))
        }
    }
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let paths = layercomp::discover_configs(&args.dir)
        .with_context(|| format!("scan '{}'", args.dir.display()))?;
    if paths.is_empty() {
        tracing::warn!(dir = %args.dir.display(), "no configurations found");
        return Ok(());
    }

    let jobs: Vec<BatchJob> = paths.into_iter().map(BatchJob::load).collect();
    let runner = make_runner(&args.roots);
    let report = layercomp::run_batch(&runner, jobs, args.jobs)?;

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(path) => eprintln!("ok   {} -> {}", outcome.source.display(), path.display()),
            Err(e) => eprintln!("FAIL {}: {e}", outcome.source.display()),
        }
    }
    eprintln!("{} succeeded, {} failed", report.succeeded(), report.failed());

    if !report.all_succeeded() {
        anyhow::bail!("{} of {} jobs failed", report.failed(), report.outcomes.len());
    }
    Ok(())
}
