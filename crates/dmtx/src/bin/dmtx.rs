//! dmtx CLI: find and decode Data Matrix symbols in bitmaps, render new ones.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use dmtx::{
    DataMatrixEngine, DecodeEngine, DecodeRequest, EncodeScheme, EngineConfig, Payload,
    PayloadKind, SizeRequest, TagResult,
};
use std::path::PathBuf;
use std::process::ExitCode;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "dmtx")]
#[command(about = "Detect, decode and generate Data Matrix (ECC 200) symbols")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode the symbols found in an image.
    Decode(CliDecodeArgs),

    /// Render a payload as a symbol image.
    Encode(CliEncodeArgs),
}

#[derive(Debug, Clone, Args)]
struct CliDecodeArgs {
    /// Path to the input image.
    #[arg(long)]
    image: PathBuf,

    /// Maximum number of tags to return.
    #[arg(long, default_value_t = DecodeRequest::DEFAULT_MAX_TAGS)]
    max_tags: usize,

    /// Search time limit in milliseconds (0 = unlimited).
    #[arg(long, default_value_t = 0)]
    timeout_ms: u64,

    /// Read payloads as numeric identifiers; other symbols are skipped.
    #[arg(long)]
    numeric: bool,

    /// Also look for light symbols on a dark background.
    #[arg(long)]
    inverted: bool,

    /// Integer downsampling factor applied before the search.
    #[arg(long)]
    shrink: Option<usize>,

    /// Engine configuration (JSON `EngineConfig`); flags override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print tags as a JSON array.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Args)]
struct CliEncodeArgs {
    /// Text to encode (a decimal identifier with --numeric).
    #[arg(long)]
    payload: String,

    /// Output image path; the format follows the extension.
    #[arg(long)]
    out: PathBuf,

    /// Encode the payload as a numeric identifier.
    #[arg(long)]
    numeric: bool,

    /// Encodation scheme.
    #[arg(long, value_enum, default_value_t = SchemeArg::Ascii)]
    scheme: SchemeArg,

    /// Use the smallest rectangular symbol instead of a square one.
    #[arg(long)]
    rectangle: bool,

    /// Module side in pixels.
    #[arg(long, default_value_t = 5)]
    module_px: usize,

    /// Quiet zone around the symbol in pixels.
    #[arg(long, default_value_t = 10)]
    margin_px: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SchemeArg {
    Ascii,
    C40,
    Text,
    X12,
    Edifact,
    Base256,
    /// Shortest of all schemes.
    Auto,
}

impl SchemeArg {
    fn to_codec(self) -> EncodeScheme {
        match self {
            SchemeArg::Ascii => EncodeScheme::Ascii,
            SchemeArg::C40 => EncodeScheme::C40,
            SchemeArg::Text => EncodeScheme::Text,
            SchemeArg::X12 => EncodeScheme::X12,
            SchemeArg::Edifact => EncodeScheme::Edifact,
            SchemeArg::Base256 => EncodeScheme::Base256,
            SchemeArg::Auto => EncodeScheme::AutoBest,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    init_logging(cli.verbose)?;
    match cli.command {
        Commands::Decode(args) => run_decode(args),
        Commands::Encode(args) => run_encode(args),
    }
}

fn log_level(verbose: u8) -> log::LevelFilter {
    match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn init_logging(verbose: u8) -> CliResult<()> {
    #[cfg(feature = "tracing")]
    dmtx::init_tracing_with_level(false, log_level(verbose));
    #[cfg(not(feature = "tracing"))]
    dmtx::core::init_with_level(log_level(verbose))?;
    Ok(())
}

fn run_decode(args: CliDecodeArgs) -> CliResult<()> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
            serde_json::from_str::<EngineConfig>(&text)
                .map_err(|e| format!("invalid config {}: {e}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if args.numeric {
        config.payload_kind = PayloadKind::Numeric;
    }
    if args.inverted {
        config.detect.detect_inverted = true;
    }
    if let Some(shrink) = args.shrink {
        config.detect.shrink = shrink;
    }

    let engine = DataMatrixEngine::new(config)?;
    let request = DecodeRequest::new(args.max_tags, args.timeout_ms)?;
    let image = dmtx::bitmap::load(&args.image)?;
    let report = engine.decode_report(&image, &request)?;
    log::info!(
        "{}: {} tag(s), {} candidate(s), {:.1} ms{}",
        args.image.display(),
        report.tags.len(),
        report.candidates,
        report.elapsed.as_secs_f64() * 1e3,
        if report.timed_out { ", timed out" } else { "" }
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.tags)?);
    } else if report.tags.is_empty() {
        println!("No tag found");
    } else {
        for tag in &report.tags {
            println!("{}", format_tag(tag));
        }
    }
    Ok(())
}

fn run_encode(args: CliEncodeArgs) -> CliResult<()> {
    let payload = if args.numeric {
        let id = args
            .payload
            .parse::<u64>()
            .map_err(|e| format!("numeric payload {:?}: {e}", args.payload))?;
        Payload::Numeric(id)
    } else {
        Payload::Text(args.payload.clone())
    };

    let mut config = EngineConfig {
        payload_kind: payload.kind(),
        ..EngineConfig::default()
    };
    config.render.scheme = args.scheme.to_codec();
    config.render.module_px = args.module_px;
    config.render.margin_px = args.margin_px;
    if args.rectangle {
        config.render.size = SizeRequest::AutoRectangle;
    }

    let engine = DataMatrixEngine::new(config)?;
    let image = engine.generate_tag(&payload)?;
    dmtx::bitmap::save(&image, &args.out)?;
    println!(
        "wrote {}x{} tag to {}",
        image.width(),
        image.height(),
        args.out.display()
    );
    Ok(())
}

fn format_tag(tag: &TagResult) -> String {
    let corners: Vec<String> = tag
        .corners()
        .iter()
        .map(|p| format!("({},{})", p.x, p.y))
        .collect();
    format!("{}\t{}", tag.payload(), corners.join(" "))
}
