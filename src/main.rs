use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use curio::config;
use curio::dumper::{self, Value};
use curio::library::{self, ExportOptions};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "curio")]
#[command(about = "Audiobook library exporter, nested value dumper and AS peering extractor")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a saved audiobook library page into a static HTML page
    Library(LibraryArgs),
    /// Summarize AS peers per origin from a routing table snapshot
    AsnPeers(AsnPeersArgs),
    /// Pretty-print a JSON document as an indented tree
    Dump(DumpArgs),
}

#[derive(Args)]
struct LibraryArgs {
    /// Saved library page
    #[arg(long, default_value = config::DEFAULT_LIBRARY_HTML)]
    html: PathBuf,

    /// Page template (Jinja syntax, receives `data`)
    #[arg(short, long, default_value = config::DEFAULT_TEMPLATE)]
    template: PathBuf,

    /// Rendered page path
    #[arg(short, long, default_value = config::DEFAULT_PAGE_OUTPUT)]
    output: PathBuf,

    /// Directory cover images are copied into
    #[arg(long, default_value = config::DEFAULT_IMAGE_DIR)]
    images: PathBuf,
}

#[derive(Args)]
struct AsnPeersArgs {
    /// Snapshot URL
    #[arg(long, default_value = config::DEFAULT_SNAPSHOT_URL)]
    url: String,

    /// Local path of the compressed snapshot
    #[arg(short, long, default_value = config::DEFAULT_SNAPSHOT_FILE)]
    snapshot: PathBuf,

    /// CSV output path
    #[arg(short, long, default_value = config::DEFAULT_PEERS_CSV)]
    output: PathBuf,

    /// Parse the existing local snapshot instead of downloading
    #[arg(long)]
    skip_download: bool,
}

#[derive(Args)]
struct DumpArgs {
    /// JSON file to print
    #[arg(short, long)]
    input: PathBuf,
}

fn run_library(args: LibraryArgs) -> Result<()> {
    let options = ExportOptions {
        html_path: args.html,
        template_path: args.template,
        output_path: args.output,
        image_dir: args.images,
    };

    let summary = library::run_export(&options)?;

    println!();
    println!("=== Summary ===");
    println!("Books exported:     {}", summary.books);
    println!("Title links:        {}", summary.links);
    println!("Images copied:      {}", summary.images_copied);
    println!("Page written to:    {}", options.output_path.display());

    Ok(())
}

fn run_asn_peers(args: AsnPeersArgs) -> Result<()> {
    let start = Instant::now();

    if args.skip_download {
        info!(path = %args.snapshot.display(), "Download skipped, using local snapshot");
    } else {
        curio::download::download_snapshot(&args.url, &args.snapshot)?;
    }

    let summary = curio::routes::run_peers(&args.snapshot, &args.output)?;
    let stats = &summary.stats;

    println!();
    println!("=== Summary ===");
    println!("Total time:         {:.2}s", start.elapsed().as_secs_f64());
    println!("Lines read:         {}", stats.lines_read);
    println!("Route lines:        {}", stats.route_lines);
    println!("AS set lines:       {}", stats.as_set_lines);
    println!("Paths recorded:     {}", stats.paths_recorded);
    println!("Short paths:        {}", stats.short_paths());
    println!("Origin ASes:        {}", summary.origins);
    println!("Results written to: {}", args.output.display());

    Ok(())
}

fn run_dump(args: DumpArgs) -> Result<()> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let json: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Invalid JSON in {}", args.input.display()))?;

    dumper::dump(&Value::from(json)).context("Failed to write to stdout")
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let result = match cli.command {
        Commands::Library(args) => run_library(args),
        Commands::AsnPeers(args) => run_asn_peers(args),
        Commands::Dump(args) => run_dump(args),
    };

    match result {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
