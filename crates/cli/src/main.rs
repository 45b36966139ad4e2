//! batchcls - classify image files concurrently
//!
//! Paths come from the command line, or one per line from stdin when it is
//! piped. Results go to stdout, per-image errors and logs to stderr.

mod logging;

use anyhow::{Context, Result};
use batchcls_core::application::{ItemSource, Pipeline, PipelineConfig};
use batchcls_core::port::{ItemFilter, LineWriterSink, StderrReporter};
use batchcls_infra_vision::classifier::DEFAULT_TOP_K;
use batchcls_infra_vision::{
    load_model, parse_byte_size, ClassNames, ClassifierConfig, ClassifyProcessor,
    SupportedImageFilter,
};
use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};
use logging::LogFormat;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::info;

const PROGRAM: &str = "batchcls";

#[derive(Parser, Debug)]
#[command(name = "batchcls")]
#[command(about = "Classify images with an ONNX model, many at a time", long_about = None)]
#[command(version, disable_version_flag = true)]
#[command(after_help = "Examples:\n  \
    batchcls -m ./yolo11x-cls.onnx -c ./imagenet.names ./fox.png\n  \
    find . | batchcls -m ./yolo11x-cls.onnx -c ./imagenet.names")]
struct Cli {
    /// Path to the ONNX model file
    #[arg(short, long, env = "BATCHCLS_MODEL", required_unless_present = "about")]
    model: Option<PathBuf>,

    /// Path to the class names file (one name per line)
    #[arg(short, long, env = "BATCHCLS_CLASSES", required_unless_present = "about")]
    classes: Option<PathBuf>,

    /// Number of top results to show
    #[arg(short = 'k', long, env = "BATCHCLS_TOP_K", default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Worker threads [default: number of hardware threads]
    #[arg(short, long, env = "BATCHCLS_THREADS")]
    threads: Option<usize>,

    /// Maximum image file size (e.g. 100mb, 2g)
    #[arg(
        short = 'F',
        long = "max-filesize",
        env = "BATCHCLS_MAX_FILESIZE",
        default_value = "100mb",
        value_parser = parse_byte_size
    )]
    max_filesize: u64,

    /// Print processing time for each image
    #[arg(short = 'T', long)]
    timing: bool,

    /// Apply softmax to the output scores
    #[arg(short = 'S', long)]
    softmax: bool,

    /// Accept piped paths regardless of their file extension
    #[arg(short = 'D', long = "no-extension-check")]
    no_extension_check: bool,

    /// Print version information and exit
    #[arg(short = 'v', long, action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,

    /// Print about information and exit
    #[arg(short, long)]
    about: bool,

    /// Image files (ignored when paths are piped on stdin)
    paths: Vec<String>,
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        match self.threads {
            Some(threads) => PipelineConfig::with_workers(threads),
            None => PipelineConfig::default(),
        }
    }

    fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            top_k: self.top_k,
            softmax: self.softmax,
            timing: self.timing,
            max_file_size: self.max_filesize,
        }
    }
}

/// Pick the producer mode and the line filter
///
/// A terminal on stdin means paths come from the arguments and are taken as
/// given. Otherwise stdin is read line by line, filtered by extension unless
/// `no_extension_check` is set.
fn item_source<R>(
    stdin_is_tty: bool,
    paths: Vec<String>,
    no_extension_check: bool,
    reader: R,
) -> (ItemSource, Option<Arc<dyn ItemFilter>>)
where
    R: AsyncBufRead + Send + Unpin + 'static,
{
    if stdin_is_tty {
        return (ItemSource::items(paths), None);
    }

    let filter: Option<Arc<dyn ItemFilter>> = if no_extension_check {
        None
    } else {
        Some(Arc::new(SupportedImageFilter))
    };
    (ItemSource::lines(reader), filter)
}

/// Help and version requests are not failures
fn is_informational(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
}

/// One-line diagnostic for a rejected command line
fn usage_error(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    let first = rendered.lines().next().unwrap_or_default();
    let message = first.strip_prefix("error: ").unwrap_or(first);
    format!("{PROGRAM}: {message}, use --help for usage")
}

fn about() -> String {
    format!(
        "{PROGRAM}: {}\nVersion: {}\nAuthors: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_AUTHORS"),
    )
}

#[tokio::main]
async fn main() -> ExitCode {
    // Bare invocation is a request for usage, not an error
    if std::env::args_os().len() <= 1 {
        let _ = Cli::command().print_help();
        println!();
        return ExitCode::SUCCESS;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if is_informational(e.kind()) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{}", usage_error(&e));
            return ExitCode::FAILURE;
        }
    };
    if cli.about {
        println!("{}", about());
        return ExitCode::SUCCESS;
    }

    logging::init(LogFormat::from_env());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{PROGRAM}: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let pipeline_config = cli.pipeline_config();
    let classifier_config = cli.classifier_config();
    let model_path = cli.model.context("missing required option --model")?;
    let classes_path = cli.classes.context("missing required option --classes")?;

    // Setup failures abort before any worker is started
    let model = load_model(&model_path).context("could not load model")?;
    let classes = ClassNames::load(&classes_path).context("could not load class names")?;
    info!(
        model = %model_path.display(),
        classes = classes.len(),
        workers = pipeline_config.workers,
        top_k = classifier_config.top_k,
        max_file_size = classifier_config.max_file_size,
        "Classifier ready"
    );

    let processor = Arc::new(ClassifyProcessor::new(model, classes, classifier_config));
    let mut pipeline = Pipeline::new(
        pipeline_config,
        processor,
        LineWriterSink::new(std::io::stdout()),
    )
    .with_reporter(Arc::new(StderrReporter::new(PROGRAM)));

    let (source, filter) = item_source(
        std::io::stdin().is_terminal(),
        cli.paths,
        cli.no_extension_check,
        BufReader::new(tokio::io::stdin()),
    );
    if let Some(filter) = filter {
        pipeline = pipeline.with_filter(filter);
    }

    let report = pipeline.run(source).await?;
    info!(
        submitted = report.submitted,
        succeeded = report.succeeded,
        failed = report.failed,
        final_state = %report.final_state,
        "Run complete"
    );

    Ok(())
}
