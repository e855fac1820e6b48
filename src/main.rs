//! Dataset processors - CLI entry point
//!
//! Runs one processor on local files. Each processor gets a subcommand;
//! option values come from a JSON parameter file and/or `--set key=value`
//! pairs, with defaults from operator.json.
//!
//! Processing itself is synchronous. It runs on a blocking task so that
//! Ctrl-C can set the interruption flag while it works.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dataset_processors::pipeline::{run_processor, ProcessorRequest};
use dataset_processors::platform::operator_properties::registry;
use dataset_processors::platform::{
    DatasetInfo, DatasetLogger, LocalContext, ParameterSet, ProcessorKind, CATALOGUE,
};
use dataset_processors::{config::NeologismPresetConfig, pipeline, presets};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "jemalloc")]
use tikv_jemallocator::Jemalloc;

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

/// Exit code of a run stopped by Ctrl-C
const EXIT_INTERRUPTED: u8 = 130;

/// dataset-processors - isometric graphs, audio extraction, neologism preset
#[derive(Parser, Debug)]
#[command(name = "dataset-processors")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render side-by-side area graphs on an isometric plane (CSV -> SVG)
    Render(RunArgs),

    /// Extract the audio of every video in a zip archive (zip -> zip of WAV files)
    ExtractAudio(RunArgs),

    /// Print (or write) the processor pipeline of the Finnish neologism preset
    PresetNeologisms(PresetArgs),

    /// List the processors and their options
    List,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Parent dataset's result file
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Result file to write
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    #[command(flatten)]
    options: OptionArgs,
}

#[derive(Args, Debug)]
struct PresetArgs {
    /// Write the pipeline here instead of printing it
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    #[command(flatten)]
    options: OptionArgs,
}

#[derive(Args, Debug)]
struct OptionArgs {
    /// JSON file with option values
    #[arg(long, value_name = "FILE")]
    params: Option<PathBuf>,

    /// Option value, overrides --params (can be repeated)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    /// JSON description of the parent dataset, checked for compatibility
    #[arg(long, value_name = "FILE")]
    parent: Option<PathBuf>,

    /// Also append dataset log messages to this file
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,
}

impl OptionArgs {
    fn parameters(&self) -> anyhow::Result<ParameterSet> {
        let from_file = match &self.params {
            Some(path) => ParameterSet::from_json_file(path)
                .with_context(|| format!("Could not read parameters from {}", path.display()))?,
            None => ParameterSet::new(),
        };
        let from_cli = ParameterSet::from_pairs(self.set.as_slice()).context("Invalid --set value")?;
        Ok(from_file.merge(from_cli))
    }

    fn parent(&self) -> anyhow::Result<Option<DatasetInfo>> {
        self.parent
            .as_ref()
            .map(|path| {
                DatasetInfo::from_json_file(path).with_context(|| {
                    format!("Could not read dataset description {}", path.display())
                })
            })
            .transpose()
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = if cli.quiet { "error" } else { filter };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Render(args) => {
            run_job(
                ProcessorKind::IsometricGraphs,
                Some(args.input),
                args.output,
                &args.options,
            )
            .await
        }
        Commands::ExtractAudio(args) => {
            run_job(
                ProcessorKind::AudioExtractor,
                Some(args.input),
                args.output,
                &args.options,
            )
            .await
        }
        Commands::PresetNeologisms(args) => match args.output {
            Some(output) => {
                run_job(ProcessorKind::NeologismPreset, None, output, &args.options).await
            }
            None => print_preset_pipeline(&args.options),
        },
        Commands::List => {
            print_catalogue();
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_job(
    kind: ProcessorKind,
    input: Option<PathBuf>,
    output: PathBuf,
    options: &OptionArgs,
) -> anyhow::Result<ExitCode> {
    let mut request = ProcessorRequest::new(input, output);
    request.params = options.parameters()?;
    request.parent = options.parent()?;

    let logger = match &options.log {
        Some(path) => DatasetLogger::with_file(path),
        None => DatasetLogger::tracing_only(),
    };
    let interrupted = Arc::new(AtomicBool::new(false));
    let ctx = LocalContext::new(interrupted.clone(), logger);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping");
            interrupted.store(true, Ordering::Relaxed);
        }
    });

    let result = tokio::task::spawn_blocking(move || run_processor(kind, &ctx, &request))
        .await
        .context("Processor task failed")?;

    match result {
        Ok(outcome) => {
            match &outcome.output {
                Some(path) => println!("{} item(s) written to {}", outcome.items, path.display()),
                None => println!("Nothing to write (0 items)"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_interrupted() => {
            eprintln!("{}; no result was written", e);
            Ok(ExitCode::from(EXIT_INTERRUPTED))
        }
        Err(e) => Err(e).with_context(|| format!("{} failed", kind.type_id())),
    }
}

fn print_preset_pipeline(options: &OptionArgs) -> anyhow::Result<ExitCode> {
    let params = options.parameters()?;
    if let Some(parent) = options.parent()? {
        if !pipeline::is_compatible(ProcessorKind::NeologismPreset, &parent, &params) {
            anyhow::bail!(
                "{} is not compatible with dataset type '{}'",
                ProcessorKind::NeologismPreset.type_id(),
                parent.dataset_type
            );
        }
    }

    let config = NeologismPresetConfig::from_properties(&params);
    let steps = presets::get_processor_pipeline(&config);
    println!("{}", serde_json::to_string_pretty(&steps)?);
    Ok(ExitCode::SUCCESS)
}

fn print_catalogue() {
    for info in CATALOGUE.iter() {
        println!("{} ({}, .{})", info.processor_type, info.category, info.extension);
        println!("  {}", info.title);
        if !info.accepts.is_empty() {
            println!("  accepts: {}", info.accepts.join(", "));
        }
        for prop in registry().properties_for(&info.processor_type) {
            let default = if prop.default_value.is_empty() {
                "(none)"
            } else {
                prop.default_value.as_str()
            };
            println!(
                "  --set {}=<value>  default {}  {}",
                prop.name, default, prop.description
            );
        }
        println!();
    }
}
