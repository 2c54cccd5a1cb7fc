use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use kurswache::config::{Config, TelegramConfig};
use kurswache::notify::TelegramNotifier;
use kurswache::store::JsonFileStore;
use kurswache::{CatalogClient, Watcher};

#[derive(Parser)]
#[command(name = "kurswache")]
#[command(about = "Watches the Berlin VHS course catalog for newly listed courses", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every configured search once and notify subscribers about new courses
    Run {
        #[arg(
            short = 'c',
            long = "config",
            default_value = "kurswache.json",
            help = "Path to the watch configuration file"
        )]
        config: PathBuf,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
    /// Parse a locally saved catalog PDF export and list the detected courses
    Parse {
        #[arg(help = "Path to the PDF file")]
        file: PathBuf,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    match cli.command {
        Commands::Run { config, format } => run(&config, format).await,
        Commands::Parse { file, format } => parse(&file, format),
    }
}

async fn run(config_path: &Path, format: OutputFormat) {
    let config = Config::load(config_path).unwrap_or_else(|e| {
        log::error!("Invalid configuration: {}", e);
        process::exit(1);
    });
    let telegram = TelegramConfig::from_env().unwrap_or_else(|e| {
        log::error!("Invalid configuration: {}", e);
        process::exit(1);
    });

    let source = CatalogClient::new().unwrap_or_else(|e| {
        log::error!("Error creating catalog client: {}", e);
        process::exit(1);
    });
    let notifier =
        TelegramNotifier::new(telegram.bot_token, telegram.chat_ids).unwrap_or_else(|e| {
            log::error!("Error creating notifier: {}", e);
            process::exit(1);
        });
    let store = JsonFileStore::new(&config.state_dir);

    let watcher = Watcher::new(source, store, notifier);
    let report = watcher.run(&config.watches).await.unwrap_or_else(|e| {
        log::error!("Run failed: {}", e);
        process::exit(1);
    });

    match format {
        OutputFormat::Json => serialize_json(&report),
        OutputFormat::Text => print!("{}", report),
    }

    write_github_output(report.has_new());
}

fn parse(file: &Path, format: OutputFormat) {
    let bytes = fs::read(file).unwrap_or_else(|e| {
        log::error!("Error reading {}: {}", file.display(), e);
        process::exit(1);
    });
    let text = kurswache::pdf::extract_text(&bytes).unwrap_or_else(|e| {
        log::error!("Error extracting text: {}", e);
        process::exit(1);
    });

    let courses = kurswache::extract::parse_course_list(&text);

    match format {
        OutputFormat::Json => serialize_json(&courses),
        OutputFormat::Text => {
            if courses.is_empty() {
                println!("No courses detected.");
            } else {
                let mut ids: Vec<&String> = courses.keys().collect();
                ids.sort();
                for id in ids {
                    println!("{}", courses[id]);
                }
                println!("\n{} course(s) total", courses.len());
            }
        }
    }
}

/// Run-level signal for the invoking scheduler: appends `has_new=...` to the
/// GitHub Actions output file when running under Actions. Best-effort, a
/// failure here must not fail an otherwise successful run.
fn write_github_output(has_new: bool) {
    let Ok(path) = std::env::var("GITHUB_OUTPUT") else {
        return;
    };
    let result = fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(&path)
        .and_then(|mut file| writeln!(file, "has_new={}", has_new));
    if let Err(e) = result {
        log::warn!("could not write GITHUB_OUTPUT: {}", e);
    }
}
