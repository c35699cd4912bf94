//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use bandsite_core::cache::FragmentCache;
use bandsite_core::pipeline::{
    self, BuildResult, KnowledgeOptions, ProgressReporter, SiteConfig,
};
use bandsite_knowledge::{CreativeKnowledge, Knowledge, OpsKnowledge, PublicKnowledge};
use bandsite_llm::{OpenAiClient, OpenAiConfig};
use bandsite_shared::timestamp::format_iso;
use bandsite_shared::{AppConfig, RawMessage, Variant, init_config, load_config};
use bandsite_transcript::{load_messages_json, parse_export_file, write_messages_json};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// bandsite: turn a band's group chat into a static website.
#[derive(Parser)]
#[command(
    name = "bandsite",
    version,
    about = "Turn an exported band chat into an operational, creative or public static site.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Transcript source: exactly one of the two.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub(crate) struct InputArgs {
    /// JSON array of {id?, ts, author, text}.
    #[arg(long)]
    pub messages: Option<PathBuf>,

    /// Raw chat export text file.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Build a site from a transcript.
    Build {
        /// Site variant: ops, creative, or public.
        variant: Variant,

        #[command(flatten)]
        input: InputArgs,

        /// Output directory (defaults to site_ops, site_creative or site_public).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Site title shown in the header.
        #[arg(short, long)]
        title: Option<String>,

        /// Model override (otherwise OPENAI_MODEL, then config).
        #[arg(short, long)]
        model: Option<String>,

        /// Always call the extractor, ignoring cached fragments.
        #[arg(long)]
        no_cache: bool,

        /// Extraction calls in flight at once.
        #[arg(long)]
        concurrency: Option<usize>,

        /// Character budget per chunk.
        #[arg(long)]
        max_chars: Option<usize>,
    },

    /// Parse a chat export into a messages JSON file.
    ParseExport {
        /// Chat export text file.
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout when omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show how a transcript would be chunked, without calling any model.
    Chunks {
        /// Site variant: ops, creative, or public.
        variant: Variant,

        #[command(flatten)]
        input: InputArgs,

        /// Character budget per chunk.
        #[arg(long)]
        max_chars: Option<usize>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "bandsite=info",
        1 => "bandsite=debug",
        _ => "bandsite=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build {
            variant,
            input,
            out,
            title,
            model,
            no_cache,
            concurrency,
            max_chars,
        } => {
            let request = BuildRequest {
                input,
                out,
                title,
                model,
                no_cache,
                concurrency,
                max_chars,
            };
            match variant {
                Variant::Operational => cmd_build::<OpsKnowledge>(request).await,
                Variant::Creative => cmd_build::<CreativeKnowledge>(request).await,
                Variant::Public => cmd_build::<PublicKnowledge>(request).await,
            }
        }
        Command::ParseExport { input, output } => cmd_parse_export(&input, output.as_deref()),
        Command::Chunks {
            variant,
            input,
            max_chars,
        } => match variant {
            Variant::Operational => cmd_chunks::<OpsKnowledge>(&input, max_chars),
            Variant::Creative => cmd_chunks::<CreativeKnowledge>(&input, max_chars),
            Variant::Public => cmd_chunks::<PublicKnowledge>(&input, max_chars),
        },
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

struct BuildRequest {
    input: InputArgs,
    out: Option<PathBuf>,
    title: Option<String>,
    model: Option<String>,
    no_cache: bool,
    concurrency: Option<usize>,
    max_chars: Option<usize>,
}

fn load_input(input: &InputArgs) -> Result<Vec<RawMessage>> {
    match (&input.messages, &input.export) {
        (Some(path), _) => Ok(load_messages_json(path)?),
        (None, Some(path)) => Ok(parse_export_file(path)?),
        (None, None) => Err(eyre!("one of --messages or --export is required")),
    }
}

fn knowledge_options(
    config: &AppConfig,
    model: String,
    max_chars: Option<usize>,
    concurrency: Option<usize>,
) -> Result<KnowledgeOptions> {
    let options = KnowledgeOptions {
        max_chars: max_chars.unwrap_or(config.pipeline.max_chars),
        concurrency: concurrency.unwrap_or(config.pipeline.extraction_concurrency),
        model,
    };
    if options.max_chars == 0 {
        return Err(eyre!("--max-chars must be positive"));
    }
    if options.concurrency == 0 {
        return Err(eyre!("--concurrency must be at least 1"));
    }
    Ok(options)
}

async fn cmd_build<K: Knowledge>(request: BuildRequest) -> Result<()> {
    let variant = K::VARIANT;
    let config = load_config()?;
    let messages = load_input(&request.input)?;

    let model = config.resolve_model(request.model.as_deref());
    let client = OpenAiClient::new(OpenAiConfig::from_app_config(&config, model.clone())?)?;

    let cache = if config.cache.enabled && !request.no_cache {
        Some(FragmentCache::new(config.cache_dir()?))
    } else {
        None
    };

    let site_config = SiteConfig {
        out_dir: request
            .out
            .unwrap_or_else(|| PathBuf::from(variant.default_out_dir())),
        title: request
            .title
            .unwrap_or_else(|| variant.default_title().to_string()),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        knowledge: knowledge_options(&config, model, request.max_chars, request.concurrency)?,
    };

    info!(
        %variant,
        messages = messages.len(),
        model = %site_config.knowledge.model,
        cache = cache.is_some(),
        "building site"
    );

    let reporter = CliProgress::new();
    let result = pipeline::build_site::<K>(
        &site_config,
        messages,
        &client,
        &client,
        cache.as_ref(),
        &reporter,
    )
    .await;
    if result.is_err() {
        reporter.spinner.finish_and_clear();
    }
    let result = result?;

    println!();
    println!("  Site built successfully!");
    println!("  Variant:  {}", result.variant);
    println!("  Messages: {}", result.message_count);
    println!(
        "  Chunks:   {} ({} from cache)",
        result.chunk_count, result.cache_hits
    );
    println!("  Records:  {}", result.record_count);
    println!("  Pages:    {}", result.page_count);
    println!("  Path:     {}", result.out_dir.display());
    println!("  Time:     {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_parse_export(input: &Path, output: Option<&Path>) -> Result<()> {
    let messages = parse_export_file(input)?;
    match output {
        Some(path) => {
            write_messages_json(path, &messages)?;
            println!("Wrote {} messages to {}", messages.len(), path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&messages)?),
    }
    Ok(())
}

fn cmd_chunks<K: Knowledge>(input: &InputArgs, max_chars: Option<usize>) -> Result<()> {
    let config = load_config()?;
    let messages = load_input(input)?;
    let options = knowledge_options(&config, String::new(), max_chars, None)?;
    let chunk_options = pipeline::chunk_options::<K>(&options);
    let chunks = pipeline::prepare_chunks::<K>(messages, &options);

    println!(
        "{} chunk(s) for {} (max_chars = {}, min_gap = {} min)",
        chunks.len(),
        K::VARIANT,
        chunk_options.max_chars,
        chunk_options.min_gap_minutes
    );
    for chunk in &chunks {
        let (Some(first), Some(last)) = (chunk.messages.first(), chunk.messages.last()) else {
            continue;
        };
        let oversized = if chunk.char_len > chunk_options.max_chars {
            "  (single oversized message)"
        } else {
            ""
        };
        println!(
            "  #{:<3} ids {}..={}  {} → {}  {} msgs  {} chars{oversized}",
            chunk.index,
            first.id,
            last.id,
            format_iso(&first.ts),
            format_iso(&last.ts),
            chunk.messages.len(),
            chunk.char_len,
        );
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn chunk_merged(&self, current: usize, total: usize, cached: bool) {
        let source = if cached { " (cached)" } else { "" };
        self.spinner
            .set_message(format!("Extracting [{current}/{total}]{source}"));
    }

    fn page_rendered(&self, slug: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Writing pages [{current}/{total}] {slug}"));
    }

    fn done(&self, _result: &BuildResult) {
        self.spinner.finish_and_clear();
    }
}
