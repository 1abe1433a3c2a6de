//! # Step Tree CLI
//!

use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;
use step_tree::logging::{self, codes};
use step_tree::{log_error, log_info, ConversionConfig, Language};
use step_tree_cli::report::ConversionSummary;
use step_tree_cli::{convert_path, ReportError, ReportOutput};

/// Default output file when `--output` is not given
const DEFAULT_OUTPUT: &str = "steptree_result.json";

#[derive(Parser, Debug)]
#[command(
    name = "steptree",
    version,
    about = "Rebuild classified test-step trees from report exports",
    after_help = "Examples:\n  steptree report.json\n  steptree reports/ --config steptree.toml --output trees.json --pretty"
)]
struct Args {
    /// Report export (JSON) or directory searched recursively for exports
    #[arg(value_name = "PATH")]
    input: PathBuf,

    /// TOML conversion settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Where to write the converted trees
    #[arg(long, short, value_name = "FILE", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Expand sub-cases inline for these verdicts, e.g. "FAILED; ERROR"
    #[arg(long, value_name = "VERDICTS")]
    capture_on_verdict: Option<String>,

    /// Report language (de, en)
    #[arg(long, value_name = "LANG")]
    language: Option<String>,

    /// Levels of discovered sub-cases converted as cases of their own
    #[arg(long, value_name = "N")]
    max_sub_level: Option<usize>,

    /// Emit engine events as JSON lines
    #[arg(long)]
    structured_logs: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = build_config(&args)?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    logging::init_global_logging(&config.logging)?;
    log_info!(
        "Step tree conversion starting",
        "input" => args.input.display(),
        "language" => config.language.as_str()
    );

    let start = Instant::now();
    let outputs = convert_path(&args.input, &config).map_err(|e| {
        log_error!(e.error_code(), "Conversion aborted", "error" => e);
        e
    })?;

    print_summary(&outputs);
    write_output(&args.output, &outputs, args.pretty)?;
    println!(
        "\n[OK] Results saved to: {} ({:.2}s)",
        args.output.display(),
        start.elapsed().as_secs_f64()
    );

    if outputs.iter().any(|output| output.summary.has_failures()) {
        std::process::exit(1);
    }
    Ok(())
}

fn build_config(args: &Args) -> Result<ConversionConfig, ReportError> {
    let mut config = match &args.config {
        Some(path) => ConversionConfig::from_file(path)?,
        None => ConversionConfig::default(),
    };

    if let Some(verdicts) = &args.capture_on_verdict {
        config = config.with_sub_case_verdict_list(verdicts)?;
    }
    if let Some(language) = &args.language {
        config = config.with_language(Language::parse(language)?);
    }
    if let Some(level) = args.max_sub_level {
        config = config.with_max_sub_case_level(level);
    }
    if args.structured_logs {
        config.logging.use_structured_logging = true;
    }

    Ok(config)
}

fn print_summary(outputs: &[ReportOutput]) {
    println!("\n=== Conversion Summary ===");
    let mut total = ConversionSummary::default();
    for output in outputs {
        total.merge(&output.summary);
        println!("{}", output.summary_line());
        for case in output.cases.iter().filter(|case| case.error.is_some()) {
            println!(
                "  ✗ {}: {}",
                case.ref_path,
                case.error.as_deref().unwrap_or_default()
            );
        }
    }
    println!(
        "Total: {} reports, {} cases, {} converted, {} empty, {} failed, {} steps",
        outputs.len(),
        total.cases,
        total.converted,
        total.empty,
        total.failed,
        total.steps
    );
}

fn write_output(
    path: &Path,
    outputs: &[ReportOutput],
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = if pretty {
        serde_json::to_string_pretty(outputs)?
    } else {
        serde_json::to_string(outputs)?
    };
    std::fs::write(path, json).map_err(|e| {
        logging::safe_log_error(codes::system::INTERNAL_ERROR, &e.to_string());
        e
    })?;
    Ok(())
}
