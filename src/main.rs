use std::io::Read;
use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use serde_json::Value;
use tracing::Level;

use derived_context_extraction::envelope::{decode_base64, EnrichedEvent};
use derived_context_extraction::group::Diagnostic;
use derived_context_extraction::options::ExtractOptions;
use derived_context_extraction::{ExtractError, Extractor, Path};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    /// Derived-contexts JSON (bare array or contexts wrapper)
    Json,
    /// One enriched-event TSV line
    Tsv,
    /// Base64-encoded enriched-event TSV line
    Base64,
}

/// Query derived contexts of an analytics event.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input text, or `-` to read stdin.
    input: String,
    /// How INPUT is encoded
    #[arg(long, value_enum, default_value_t = InputFormat::Json)]
    input_format: InputFormat,
    /// Family key, e.g. contexts_com_dbip_isp_1
    #[arg(long, required_unless_present = "list")]
    family: Option<String>,
    /// Path inside the family, e.g. '$.traits.connection_type' or '$[3].value'
    #[arg(long, default_value = "$")]
    path: String,
    /// Decode the family up front instead of navigating lazily
    #[arg(long)]
    eager: bool,
    /// List family keys with their occurrence counts
    #[arg(long)]
    list: bool,
    /// Require a bare fragment array; reject the contexts wrapper
    #[arg(long)]
    no_envelope: bool,
    /// JSON file with extraction options
    #[arg(long)]
    config: Option<PathBuf>,
    /// Raise log verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
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

fn read_input(arg: &str) -> Result<String, ExtractError> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| ExtractError::InvalidInput(format!("reading stdin: {e}")))?;
    Ok(buf)
}

fn report(diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        tracing::warn!(index = d.index, error = %d.error, "skipped fragment");
    }
}

fn load_options(args: &Args) -> Result<ExtractOptions, ExtractError> {
    let mut options = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                ExtractError::InvalidInput(format!("reading {}: {e}", path.display()))
            })?;
            serde_json::from_str(&text)
                .map_err(|e| ExtractError::InvalidInput(format!("config: {e}")))?
        }
        None => ExtractOptions::default(),
    };
    if args.no_envelope {
        options.unwrap_contexts_envelope = false;
    }
    Ok(options)
}

fn run(args: &Args) -> Result<(), ExtractError> {
    let options = load_options(args)?;
    let input = read_input(&args.input)?;

    let decoded: String;
    let raw = match args.input_format {
        InputFormat::Json => Some(input.as_str()),
        InputFormat::Tsv | InputFormat::Base64 => {
            let line = if args.input_format == InputFormat::Base64 {
                decoded = decode_base64(&input)?;
                decoded.as_str()
            } else {
                input.as_str()
            };
            let event = EnrichedEvent::from_tsv(line)?;
            tracing::info!(
                event_id = event.field("event_id").unwrap_or("-"),
                "decoded enriched event"
            );
            event.field(&options.derived_contexts_field)
        }
    };
    let Some(raw) = raw else {
        tracing::info!("event carries no derived contexts");
        println!("null");
        return Ok(());
    };

    let extractor = Extractor::new(options);

    if args.list {
        let contexts = extractor.lazy_all(raw)?;
        report(contexts.diagnostics());
        for key in contexts.keys() {
            println!("{key}\t{}", contexts.family(key).len());
        }
        return Ok(());
    }

    let family = args
        .family
        .as_deref()
        .ok_or_else(|| ExtractError::InvalidInput("--family is required".into()))?;
    let path = Path::parse(&args.path)?;

    let out = if args.eager {
        let contexts = extractor.eager(family, raw)?;
        report(contexts.diagnostics());
        contexts.family(family).path(&path).value().cloned()
    } else {
        let contexts = extractor.lazy(family, raw)?;
        report(contexts.diagnostics());
        contexts.family(family).path(&path).decode().transpose()?
    };

    let out = out.unwrap_or(Value::Null);
    let text = serde_json::to_string_pretty(&out)
        .map_err(|e| ExtractError::InvalidInput(e.to_string()))?;
    println!("{text}");
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
