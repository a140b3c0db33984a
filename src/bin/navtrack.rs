use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "navtrack", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a scene's connectivity and store the region in the cache.
    Analyze(AnalyzeArgs),
    /// Generate one or more motion tracks as JSON.
    Generate(GenerateArgs),
    /// Delete cached regions.
    ClearCache(ClearCacheArgs),
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
    /// Grid scene JSON.
    #[arg(long)]
    scene: PathBuf,

    /// Region cache directory.
    #[arg(long)]
    cache_dir: PathBuf,

    /// Track config JSON (only the analyzer section and seed are used).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ignore any cached entry and analyze again.
    #[arg(long)]
    recompute: bool,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Grid scene JSON.
    #[arg(long)]
    scene: PathBuf,

    /// Track config JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output JSON path (an array of tracks).
    #[arg(long)]
    out: PathBuf,

    /// Number of tracks; track `i` uses seed `seed + i`.
    #[arg(long, default_value_t = 1)]
    count: usize,

    /// Override the config seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Override the config duration, in seconds.
    #[arg(long)]
    duration: Option<f64>,

    /// Region cache directory; an in-memory cache is used when omitted.
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ClearCacheArgs {
    /// Region cache directory.
    #[arg(long)]
    cache_dir: PathBuf,

    /// Cache key (scene name) to delete; every entry when omitted.
    #[arg(long)]
    key: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Analyze(args) => cmd_analyze(args),
        Command::Generate(args) => cmd_generate(args),
        Command::ClearCache(args) => cmd_clear_cache(args),
    }
}

fn read_config(path: Option<&Path>) -> anyhow::Result<navtrack::TrackConfig> {
    Ok(match path {
        Some(p) => navtrack::TrackConfig::load(p)?,
        None => navtrack::TrackConfig::default(),
    })
}

fn cmd_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let mesh = navtrack::GridNavMesh::load(&args.scene)?;
    let config = read_config(args.config.as_deref())?;
    let mut cache = navtrack::JsonFileRegionCache::new(&args.cache_dir);

    if args.recompute {
        cache.clear(Some(navtrack::cache_key_for_scene(mesh.name())))?;
    }
    let region =
        navtrack::generate_connectivity_region(&mesh, mesh.name(), &mut cache, &config)?;

    eprintln!(
        "region for '{}': {} points, cached at {}",
        mesh.name(),
        region.len(),
        cache
            .entry_path(navtrack::cache_key_for_scene(mesh.name()))
            .display()
    );
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    if args.count == 0 {
        anyhow::bail!("--count must be at least 1");
    }
    let mesh = navtrack::GridNavMesh::load(&args.scene)?;
    let mut config = read_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(duration) = args.duration {
        config.duration_secs = duration;
    }

    let tracks = match &args.cache_dir {
        Some(dir) => {
            let mut cache = navtrack::JsonFileRegionCache::new(dir);
            navtrack::generate_batch(&mesh, mesh.name(), &mut cache, &config, args.count)?
        }
        None => {
            let mut cache = navtrack::MemoryRegionCache::new();
            navtrack::generate_batch(&mesh, mesh.name(), &mut cache, &config, args.count)?
        }
    };

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let json = serde_json::to_vec_pretty(&tracks).context("serialize tracks")?;
    std::fs::write(&args.out, json)
        .with_context(|| format!("write tracks '{}'", args.out.display()))?;

    for t in &tracks {
        eprintln!(
            "seed {}: {} keyframes, {:.1}s, {} behaviors{}",
            t.seed,
            t.keyframes.len(),
            t.duration_secs(),
            t.behavior_count,
            if t.is_partial() { " (partial)" } else { "" }
        );
    }
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_clear_cache(args: ClearCacheArgs) -> anyhow::Result<()> {
    let cache = navtrack::JsonFileRegionCache::new(&args.cache_dir);
    let removed = cache.clear(args.key.as_deref())?;
    eprintln!("removed {removed} cache entries from {}", args.cache_dir.display());
    Ok(())
}
