use clap::Parser;
use getlogs::config::Config;
use getlogs::error::Error;
use getlogs::exitcode::{FATAL_ERROR, RUN_COMPLETED};
use getlogs::job::{Job, RunReport};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::fmt::writer::MakeWriterExt;

#[derive(Parser)]
#[command(name = "getlogs")]
#[command(about = "Collect log files and run task pipelines on remote hosts over SSH")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct GetLogsCli {
    /// Configuration document (YAML or JSON)
    #[arg(short, long, default_value = "getLogs.yml")]
    config: PathBuf,

    /// Directory under which the timestamped run directory is created
    #[arg(short, long, default_value = ".")]
    output_root: PathBuf,

    /// Log file, appended to on every run
    #[arg(short, long, default_value = "getLogs.log")]
    log_file: PathBuf,

    /// Enable debug output
    #[arg(short, long)]
    verbose: bool,

    /// Print the run report as JSON on stdout once done
    #[arg(long)]
    json_summary: bool,
}

fn main() {
    let cli = GetLogsCli::parse();

    if let Err(error_detail) = init_logging(&cli) {
        eprintln!("unable to open log file {} : {}", cli.log_file.display(), error_detail);
        std::process::exit(FATAL_ERROR);
    }

    info!("version:{}", env!("CARGO_PKG_VERSION"));
    info!("start...");

    let exit_code = match run(&cli) {
        Ok(run_report) => {
            if cli.json_summary {
                match serde_json::to_string_pretty(&run_report) {
                    Ok(json) => println!("{}", json),
                    Err(error_detail) => error!("unable to serialize run report : {}", error_detail),
                }
            }
            RUN_COMPLETED
        }
        Err(error_detail) => {
            error!("{}", error_detail);
            FATAL_ERROR
        }
    };

    info!("...end");
    std::process::exit(exit_code);
}

fn run(cli: &GetLogsCli) -> Result<RunReport, Error> {
    let config = Config::from_file(&cli.config)?;
    Job::new(config, &cli.output_root).run()
}

// Everything goes both to stdout and to the log file
fn init_logging(cli: &GetLogsCli) -> std::io::Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cli.log_file)?;

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(std::io::stdout.and(Mutex::new(log_file)))
        .init();

    Ok(())
}
