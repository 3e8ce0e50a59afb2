use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use devotional::Config;
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "devotional")]
#[command(
    about = "Scrape the joncourson.com daily devotional into a JSON archive",
    long_about = "Scrape the joncourson.com daily devotional into a JSON archive.\n\n\
                  Writes <data-dir>/devotionals.json and <data-dir>/latest.json. \
                  Only one run may use a data directory at a time."
)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[arg(
        long,
        env = "DEBUG",
        action = clap::ArgAction::SetTrue,
        value_parser = clap::builder::FalseyValueParser::new(),
        help = "Enable debug logging (overrides --log-level)"
    )]
    debug: bool,

    #[arg(
        long,
        value_name = "PATH",
        default_value = "data",
        help = "Directory holding devotionals.json and latest.json"
    )]
    data_dir: PathBuf,

    #[arg(long, help = "Page to scrape instead of the joncourson.com home page")]
    url: Option<String>,

    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        help = "Also print the scraped devotional"
    )]
    format: Option<OutputFormat>,
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

impl Cli {
    fn level_filter(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::Debug.max(self.log_level.clone().into())
        } else {
            self.log_level.clone().into()
        }
    }

    fn config(&self) -> Config {
        let mut config = Config {
            data_dir: self.data_dir.clone(),
            ..Config::default()
        };
        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        config
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.level_filter())
        .init();

    let config = cli.config();

    let devotional = devotional::run(&config).await.unwrap_or_else(|e| {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    });

    println!("✅ Successfully scraped devotional: {}", devotional.title);

    match cli.format {
        Some(OutputFormat::Json) => match serde_json::to_string_pretty(&devotional) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                log::error!("Error serializing to JSON: {}", e);
                process::exit(1);
            }
        },
        Some(OutputFormat::Text) => println!("{}", devotional),
        None => {}
    }
}
