use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{debug, info};

use lsp_highlight::config::{parse_class_prefix, HighlightConfig};
use lsp_highlight::language::Language;
use lsp_highlight::lexical::{JsonTokenFileProvider, ProviderRegistry};
use lsp_highlight::logging::init_logger;
use lsp_highlight::metrics::metrics;
use lsp_highlight::payload::SemanticTokensPayload;
use lsp_highlight::{HighlightRequest, Highlighter, TextPositionEncoding};

#[derive(Parser, Debug)]
#[command(name = "lsp-highlight", version)]
#[command(about = "Render a source file as highlighted HTML from language-server and compiler tokens")]
struct Cli {
    /// Source file to highlight
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// JSON file with the semantic tokens response (`data`, optional `legend` and `positionEncoding`)
    #[arg(long, value_name = "JSON")]
    semantic_tokens: PathBuf,

    /// JSON file with compiler-frontend tokens
    #[arg(long, value_name = "JSON")]
    compiler_tokens: Option<PathBuf>,

    /// LSP language identifier; detected from the file extension when omitted
    #[arg(long, value_name = "ID")]
    language: Option<String>,

    /// Position encoding of the semantic tokens (utf-8, utf-16, utf-32)
    #[arg(long, value_name = "ENC", value_parser = parse_encoding)]
    position_encoding: Option<TextPositionEncoding>,

    /// Stem for generated class names (`<prefix>-type-*`, `<prefix>-modifier-*`)
    #[arg(long, value_name = "PREFIX")]
    class_prefix: Option<String>,

    /// Write the HTML fragment here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Log level for stderr output (overrides RUST_LOG)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Disable ANSI colors in log output
    #[arg(long)]
    no_color: bool,

    /// Also write a debug-level session log to the user cache directory
    #[arg(long)]
    log_file: bool,
}

fn parse_encoding(value: &str) -> Result<TextPositionEncoding, String> {
    TextPositionEncoding::parse(value).ok_or_else(|| format!("unknown position encoding '{}'", value))
}

fn build_config(cli: &Cli) -> anyhow::Result<HighlightConfig> {
    let mut config = HighlightConfig::from_env_or_default();
    if let Some(encoding) = cli.position_encoding {
        config.position_encoding_override = Some(encoding);
    }
    if let Some(prefix) = &cli.class_prefix {
        match parse_class_prefix(prefix) {
            Some(prefix) => config.class_prefix = prefix,
            None => bail!("Invalid class prefix '{}'", prefix),
        }
    }
    Ok(config)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = build_config(cli)?;
    debug!("Configuration: {:?}", config);

    let text = fs::read_to_string(&cli.file)
        .with_context(|| format!("Failed to read source file {}", cli.file.display()))?;
    let payload = SemanticTokensPayload::load(&cli.semantic_tokens)?;
    let legend = payload.token_legend();

    let language = match &cli.language {
        Some(id) => Some(Language::from_id(id)),
        None => Language::from_path(&cli.file),
    };
    info!(
        "Highlighting {} ({})",
        cli.file.display(),
        language.as_ref().map_or("unknown language", |l| l.id())
    );

    let mut registry = ProviderRegistry::new();
    if let (Some(path), Some(language)) = (&cli.compiler_tokens, &language) {
        if language.has_lexical_frontend() {
            registry.register(language.clone(), Box::new(JsonTokenFileProvider::new(path)));
        } else {
            info!("Ignoring compiler tokens: {} has no lexical frontend", language);
        }
    }
    let compiler_tokens = match &language {
        Some(language) => registry.tokens_for(language, &text)?,
        None => Vec::new(),
    };

    let request = HighlightRequest::new(&text, &payload.data, &legend)
        .with_position_encoding(payload.position_encoding)
        .with_compiler_tokens(&compiler_tokens)
        .with_language(language.clone());

    let html = Highlighter::new(config)
        .highlight(&request)
        .with_context(|| format!("Failed to highlight {}", cli.file.display()))?;

    match &cli.output {
        Some(path) => fs::write(path, &html).with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", html),
    }

    let metrics = metrics();
    debug!("Metrics: {:?}", metrics.summary());
    for stage in metrics.stages() {
        if let Some(stats) = metrics.stage_stats(&stage) {
            debug!("Stage {}: {:?}", stage, stats);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_logger(cli.no_color, cli.log_level.as_deref(), cli.log_file) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
