use clap::{Parser, Subcommand};
use quickthumb::batch;
use quickthumb::config::{self, ThumbConfig};
use quickthumb::imaging::{JpegBackend, ResizeRequest, create_thumbnail};
use quickthumb::output;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quickthumb")]
#[command(about = "Fast nearest-neighbor JPEG thumbnails")]
#[command(long_about = "\
Fast nearest-neighbor JPEG thumbnails

Two policies:

  resize   Aspect-preserving. The longer side becomes SIZE.
           800x600 at 200 → 200x150
  square   Exactly SIZE x SIZE. The shorter side is scaled to SIZE and the
           longer side is center-cropped.
           800x600 at 200 → 200x200

Large sources are decoded at 1/2, 1/4 or 1/8 scale when the thumbnail is
small enough, which is where most of the speed comes from.

Settings are read from ./quickthumb.toml when present, or from --config.
Run 'quickthumb gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./quickthumb.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace). RUST_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Aspect-preserving thumbnail; the longer side becomes SIZE
    Resize {
        size: u32,
        input: PathBuf,
        output: PathBuf,
    },
    /// SIZE x SIZE thumbnail, center-cropped
    Square {
        size: u32,
        input: PathBuf,
        output: PathBuf,
    },
    /// Thumbnail many inputs in parallel into OUTPUT_DIR
    Batch {
        size: u32,
        output_dir: PathBuf,
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Use the square policy
        #[arg(long)]
        square: bool,
    },
    /// Print a stock quickthumb.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Resize {
            size,
            input,
            output,
        } => {
            let config = config::load_config(cli.config.as_deref())?;
            run_single(&config, ResizeRequest::fit(size), input, output)?;
        }
        Command::Square {
            size,
            input,
            output,
        } => {
            let config = config::load_config(cli.config.as_deref())?;
            run_single(&config, ResizeRequest::square(size), input, output)?;
        }
        Command::Batch {
            size,
            output_dir,
            inputs,
            square,
        } => {
            let config = config::load_config(cli.config.as_deref())?;
            init_thread_pool(&config.processing);
            std::fs::create_dir_all(&output_dir)?;
            let request = if square {
                ResizeRequest::square(size)
            } else {
                ResizeRequest::fit(size)
            };
            let items = batch::plan_batch(&inputs, &output_dir, request);
            let report = batch::run_batch(
                &JpegBackend::new(),
                request,
                items,
                &config.codec_settings(),
            );
            output::print_batch_report(&report);
            if report.failed() > 0 {
                return Err(format!("{} of {} inputs failed", report.failed(), inputs.len()).into());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn run_single(
    config: &ThumbConfig,
    request: ResizeRequest,
    input: PathBuf,
    output: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    match create_thumbnail(
        &JpegBackend::new(),
        request,
        &input,
        &output,
        &config.codec_settings(),
    ) {
        Ok(thumb) => {
            println!("{}", output::format_thumbnail(&input, &output, &thumb));
            Ok(())
        }
        Err(e) => {
            tracing::error!(stage = %e.stage(), "{e}");
            Err(e.into())
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the config can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
