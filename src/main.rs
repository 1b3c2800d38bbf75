use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use rgenai_studio::{
    logger::{self, LogLevel, LoggerConfig},
    AspectRatio, GenerationOverride, GenerationRequest, ModelTier, OutputFormat, SavePicker,
    Studio, StudioConfig, StudioError, StylePreset,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "rgenai-studio", version, about = "Batch image generation with quality review and export")]
struct Cli {
    #[arg(long, global = true, env = "STUDIO_LOG_LEVEL", default_value = "info")]
    log_level: LogLevel,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a batch of images
    Generate(GenerateArgs),
    /// Print the JSON override matching the given options
    Template(RequestArgs),
    /// List the style presets
    Styles,
    /// List the supported aspect ratios
    Ratios,
}

#[derive(Args)]
struct RequestArgs {
    /// What to draw
    prompt: Option<String>,

    /// Style preset id
    #[arg(long, default_value = "realistic")]
    style: StylePreset,

    /// Free-form style text, replaces the preset
    #[arg(long, conflicts_with = "no_style")]
    style_text: Option<String>,

    /// Send no style; a realistic baseline is used instead
    #[arg(long)]
    no_style: bool,

    #[arg(long, default_value = "fast")]
    tier: ModelTier,

    #[arg(long, default_value = "1:1")]
    ratio: AspectRatio,

    /// Number of images, clamped to 1-4
    #[arg(long, default_value_t = 1)]
    count: u32,
}

#[derive(Args)]
struct GenerateArgs {
    #[command(flatten)]
    request: RequestArgs,

    /// JSON override, inline or `@path/to/file.json`
    #[arg(long)]
    json: Option<String>,

    /// Save the results after review
    #[arg(long)]
    export: bool,

    /// Export only this result (1-based)
    #[arg(long, requires = "export")]
    select: Option<usize>,

    #[arg(long)]
    format: Option<OutputFormat>,

    /// Target file size in MB for formats with a quality setting
    #[arg(long)]
    target_mb: Option<f64>,

    /// Ask for a save location for every file
    #[arg(long)]
    ask_location: bool,

    #[arg(long)]
    output_dir: Option<PathBuf>,
}

impl RequestArgs {
    fn to_request(&self) -> GenerationRequest {
        let base = GenerationRequest::new(self.prompt.clone().unwrap_or_default())
            .with_style_preset(self.style)
            .with_tier(self.tier)
            .with_aspect_ratio(self.ratio)
            .with_count(self.count);

        match (&self.style_text, self.no_style) {
            (Some(text), _) => base.with_style(text.clone()),
            (None, true) => base.with_style(""),
            (None, false) => base,
        }
    }
}

/// Reads a destination path from the terminal. Blank keeps the suggested
/// name, `q` or end of input cancels.
struct TerminalPicker;

#[async_trait]
impl SavePicker for TerminalPicker {
    async fn pick(
        &self,
        suggested_name: &str,
        mime_type: &str,
        extension: &str,
    ) -> rgenai_studio::Result<Option<PathBuf>> {
        eprint!(
            "Save {} image (.{}) as [{}], q to cancel: ",
            mime_type, extension, suggested_name
        );
        let mut line = String::new();
        let read = BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .map_err(|e| StudioError::ExportError(e.to_string()))?;

        let answer = line.trim();
        if read == 0 || answer.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        if answer.is_empty() {
            return Ok(Some(PathBuf::from(suggested_name)));
        }
        Ok(Some(PathBuf::from(answer)))
    }
}

async fn read_override(raw: &str) -> Result<String, Box<dyn std::error::Error>> {
    match raw.strip_prefix('@') {
        Some(path) => Ok(tokio::fs::read_to_string(path).await?),
        None => Ok(raw.to_string()),
    }
}

async fn run_generate(args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = StudioConfig::from_env();
    if let Some(format) = args.format {
        config.export = config.export.with_format(format);
    }
    if let Some(target_mb) = args.target_mb {
        config.export = config.export.with_target_mb(target_mb);
    }
    if let Some(dir) = &args.output_dir {
        config.export = config.export.with_output_dir(dir);
    }
    if args.ask_location {
        config.export = config.export.with_ask_location(true);
    }
    logger::log_config_info(&config);

    let mut studio = Studio::new(config)?;
    if studio.config().export.ask_location {
        studio = studio.with_picker(Arc::new(TerminalPicker));
    }

    let json = match &args.json {
        Some(raw) => Some(read_override(raw).await?),
        None => None,
    };
    let request = studio.resolve_request(args.request.to_request(), json.as_deref())?;

    let outcome = studio.generate(request).await?;
    for (index, image) in outcome.images.iter().enumerate() {
        match &image.metadata {
            Some(meta) => println!(
                "{}. {}x{} {:.1}MB {} {}",
                index + 1,
                meta.width,
                meta.height,
                meta.size_bytes as f64 / 1024.0 / 1024.0,
                if meta.passed_quality_check { "✅" } else { "⚠️" },
                meta.check_reason
            ),
            None => println!("{}. (not reviewed)", index + 1),
        }
    }
    for (index, failure) in &outcome.failures {
        println!("{}. failed: {:?}", index + 1, failure);
    }

    if !args.export {
        return Ok(());
    }

    let options = studio.export_options();
    let chosen: Vec<_> = match args.select {
        Some(n) => outcome
            .images
            .get(n.saturating_sub(1))
            .into_iter()
            .collect(),
        None => outcome.images.iter().collect(),
    };
    if chosen.is_empty() {
        log::warn!("Nothing to export");
    }
    for image in chosen {
        match studio.export(image, &options).await {
            Ok(Some(file)) => println!("saved {} ({} bytes)", file.path.display(), file.size_bytes),
            Ok(None) => println!("skipped {}", image.id),
            Err(e) => log::error!("❌ Failed to download image: {}", e),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let cli = Cli::parse();

    logger::init_with_config(
        LoggerConfig::new()
            .with_level(cli.log_level)
            .with_json_output(cli.json_logs),
    )?;
    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    if !dotenv_loaded {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    match cli.command {
        Command::Generate(args) => run_generate(args).await,
        Command::Template(args) => {
            println!(
                "{}",
                GenerationOverride::from_request(&args.to_request()).to_json_pretty()?
            );
            Ok(())
        }
        Command::Styles => {
            for preset in StylePreset::ALL {
                println!("{:<12} {:<15} {}", preset.id(), preset.label(), preset.descriptor());
            }
            Ok(())
        }
        Command::Ratios => {
            for ratio in AspectRatio::ALL {
                let sent = ratio.remap();
                if sent == ratio {
                    println!("{:<6} {}", ratio, ratio.label());
                } else {
                    println!("{:<6} {} (sent as {})", ratio, ratio.label(), sent);
                }
            }
            Ok(())
        }
    }
}
