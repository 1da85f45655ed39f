use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, error, info};

use cashsight::{
    BuiltinTable, CashsightConfig, ClassificationResult, CurrencyClassifier,
    CurrencyClassifierBuilder, Frame, ScanTally, SeededJitter, TemplateTable,
};

#[derive(Parser, Debug)]
#[command(name = "cashsight")]
#[command(about = "Heuristic banknote and coin recognizer for still images")]
#[command(version)]
#[command(long_about = "Recognizes banknotes and coins in still images using dominant colors \
and coarse shape cues, matched against a reference table of denominations. Results are \
heuristic: treat them as hints, not verdicts.")]
struct Args {
    /// Images to classify
    #[arg(value_name = "IMAGE", required_unless_present_any = ["print_config", "validate_config"])]
    images: Vec<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, default_value = "cashsight.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration and template table, then exit")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Built-in reference table
    #[arg(long, value_enum, help = "Built-in template table to match against")]
    table: Option<BuiltinTable>,

    /// Custom template table
    #[arg(long, value_name = "PATH", help = "TOML template table; overrides --table")]
    templates: Option<String>,

    /// Seed for confidence jitter
    #[arg(long, help = "Seed the confidence jitter for reproducible noisy runs")]
    seed: Option<u64>,

    /// Emit JSON instead of text
    #[arg(long, help = "Print results as JSON")]
    json: bool,

    /// Print tally announcements
    #[arg(long, help = "Keep a running total and print an announcement per item")]
    announce: bool,
}

/// Classification outcome for one input image
#[derive(Debug, Serialize)]
struct ImageReport {
    path: String,
    results: Vec<ClassificationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    announcements: Vec<String>,
}

/// JSON document printed with `--json --announce`
#[derive(Debug, Serialize)]
struct AnnouncedReport<'a> {
    images: &'a [ImageReport],
    summary: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print_default_config()?;
        return Ok(());
    }

    init_logging(&args)?;

    info!("Starting cashsight v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    let mut config = match CashsightConfig::load_from_file(&args.config) {
        Ok(config) => {
            info!("Configuration loaded successfully from: {}", args.config);
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(table) = args.table {
        config.currency.table = table;
    }
    if let Some(path) = &args.templates {
        config.currency.templates_path = Some(path.clone());
    }

    if args.validate_config {
        let checked = config
            .validate()
            .map_err(anyhow::Error::from)
            .and_then(|_| TemplateTable::from_config(&config.currency).map_err(Into::into));
        match checked {
            Ok(table) => {
                info!("Configuration validation successful");
                println!(
                    "✓ Configuration is valid ({} table, {} templates)",
                    table.currency(),
                    table.len()
                );
                return Ok(());
            }
            Err(e) => {
                error!("Configuration validation failed: {}", e);
                eprintln!("✗ Configuration validation failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    if args.images.is_empty() {
        bail!("no images given");
    }

    let classifier = CurrencyClassifierBuilder::new()
        .config(config.clone())
        .build()
        .map_err(|e| {
            error!("Failed to create classifier: {}", e);
            e
        })?;
    let classifier = Arc::new(classifier);

    let mut reports = classify_all(&classifier, &args.images, args.seed, config.matcher.seeded_jitter_max).await?;
    let failures = reports.iter().filter(|r| r.error.is_some()).count();

    let mut tally = ScanTally::new();
    if args.announce {
        for report in &mut reports {
            for result in &report.results {
                let line = tally.record(result.clone(), Some(report.path.clone()));
                report.announcements.push(line);
            }
        }
    }

    if args.json {
        let rendered = if args.announce {
            serde_json::to_string_pretty(&AnnouncedReport {
                images: &reports,
                summary: tally.summary(),
            })?
        } else {
            serde_json::to_string_pretty(&reports)?
        };
        println!("{}", rendered);
    } else {
        for report in &reports {
            print_report(report);
            for line in &report.announcements {
                println!("{}", line);
            }
        }
        if args.announce {
            println!("{}", tally.summary());
        }
    }

    if failures > 0 {
        error!("{} of {} images could not be classified", failures, reports.len());
        std::process::exit(1);
    }

    Ok(())
}

/// Classify every image on the blocking pool, keeping argument order
async fn classify_all(
    classifier: &Arc<CurrencyClassifier>,
    images: &[PathBuf],
    seed: Option<u64>,
    jitter_max: f64,
) -> Result<Vec<ImageReport>> {
    let handles: Vec<_> = images
        .iter()
        .enumerate()
        .map(|(index, path)| {
            let classifier = Arc::clone(classifier);
            let path = path.clone();
            let seed = seed.map(|s| s.wrapping_add(index as u64));
            tokio::task::spawn_blocking(move || {
                classify_image(&classifier, index as u64, &path, seed, jitter_max)
            })
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for (path, handle) in images.iter().zip(handles) {
        let outcome = handle
            .await
            .with_context(|| format!("classification task for {} failed", path.display()))?;

        let path = path.display().to_string();
        match outcome {
            Ok(results) => reports.push(ImageReport {
                path,
                results,
                error: None,
                announcements: Vec::new(),
            }),
            Err(e) => {
                error!("Failed to classify {}: {}", path, e);
                reports.push(ImageReport {
                    path,
                    results: Vec::new(),
                    error: Some(e.to_string()),
                    announcements: Vec::new(),
                });
            }
        }
    }

    Ok(reports)
}

fn classify_image(
    classifier: &CurrencyClassifier,
    id: u64,
    path: &Path,
    seed: Option<u64>,
    jitter_max: f64,
) -> cashsight::Result<Vec<ClassificationResult>> {
    let frame = Frame::load(id, path)?;
    debug!("Loaded {} as frame {} ({}x{})", path.display(), id, frame.width, frame.height);

    let results = match seed {
        Some(seed) => classifier.classify_with_noise(&frame, &mut SeededJitter::new(seed, jitter_max)),
        None => classifier.classify(&frame),
    };
    Ok(results)
}

fn print_report(report: &ImageReport) {
    if let Some(error) = &report.error {
        println!("{}: error: {}", report.path, error);
        return;
    }
    if report.results.is_empty() {
        println!("{}: no currency recognized", report.path);
        return;
    }

    for result in &report.results {
        let region = result
            .bounding_box
            .map(|b| format!(" at {},{} {}x{}", b.x, b.y, b.width, b.height))
            .unwrap_or_default();
        println!(
            "{}: {} {} {} ({}% confidence){}",
            report.path, result.kind, result.denomination, result.currency, result.confidence, region
        );
    }
}

fn init_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cashsight={}", log_level)));

    // Results own stdout; logs go to stderr
    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(args.debug)
                .with_file(args.debug)
                .with_line_number(args.debug)
                .boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();

    Ok(())
}

/// Print default configuration in TOML format
fn print_default_config() -> cashsight::Result<()> {
    println!("# cashsight configuration file");
    println!("# Every key may also be set as CASHSIGHT_<SECTION>__<KEY>, e.g. CASHSIGHT_MATCHER__JITTER=2.5");
    println!("# Set currency.templates_path to load a custom TOML template table");
    println!();

    let rendered = CashsightConfig::default().to_toml()?;
    println!("{}", rendered);
    Ok(())
}
