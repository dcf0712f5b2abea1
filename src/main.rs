use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use collector_config::{LogConfig, LogLevel, OutputFormat, TopologyConfig, DEFAULT_ENV_FILE};
use collector_domain::{parse_payload, CrawlJobSpec, Platform, TaskType, DEFAULT_TIME_RANGE_DAYS};
use collector_errors::{CollectorError, CollectorResult};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;

use app::PublishOptions;

/// Publish one crawl request to the collector.inbound exchange
#[derive(Parser, Debug)]
#[command(name = "publish-crawl-request")]
#[command(version)]
#[command(about = "Publish one crawl request to the collector inbound exchange")]
struct Cli {
    /// KEY=VALUE file consulted for RABBITMQ_* settings missing from the environment
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// Target crawler platform
    #[arg(long, default_value = "youtube")]
    platform: Platform,

    /// Task type
    #[arg(long, default_value = "research_keyword")]
    task_type: TaskType,

    /// Task payload (JSON object)
    #[arg(long, default_value = r#"{"keyword":"python"}"#)]
    payload: String,

    /// Time range in days
    #[arg(long, default_value_t = DEFAULT_TIME_RANGE_DAYS)]
    time_range: i64,

    /// Do not send a time range
    #[arg(long, conflicts_with = "time_range")]
    no_time_range: bool,

    /// Override the crawler.<platform>.<task_type> routing key
    #[arg(long)]
    routing_key: Option<String>,

    #[arg(long)]
    attempt: Option<u32>,

    #[arg(long)]
    max_attempts: Option<u32>,

    /// Require connection settings from the environment or env file
    #[arg(long)]
    no_default_connection: bool,

    /// Log level (RUST_LOG takes precedence)
    #[arg(short, long, default_value = "warn")]
    log_level: LogLevel,

    /// Log format: text, json or pretty
    #[arg(long, default_value = "text")]
    log_format: OutputFormat,
}

impl Cli {
    fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level,
            format: self.log_format,
        }
    }

    fn into_options(self) -> CollectorResult<PublishOptions> {
        let job = CrawlJobSpec {
            platform: self.platform,
            task_type: self.task_type,
            payload: parse_payload(&self.payload)?,
            time_range: (!self.no_time_range).then_some(self.time_range),
            routing_key: self.routing_key,
            attempt: self.attempt,
            max_attempts: self.max_attempts,
        };

        Ok(PublishOptions {
            env_file: self.env_file,
            use_default_connection: !self.no_default_connection,
            job,
            topology: TopologyConfig::default(),
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_config()) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    let options = match cli.into_options() {
        Ok(options) => options,
        Err(e) => return fail(e),
    };
    debug!("Publish options: {:?}", options);

    match app::run(options).await {
        Ok(receipt) => {
            println!("{receipt}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn fail(e: CollectorError) -> ExitCode {
    eprintln!("Error: {e}");
    ExitCode::from(e.exit_code())
}

/// Set up tracing on stderr so stdout only carries the confirmation line
fn init_logging(config: &LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.format {
        OutputFormat::Json => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialise JSON logging")?;
        }
        OutputFormat::Pretty => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialise pretty logging")?;
        }
        OutputFormat::Text => {
            registry
                .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialise text logging")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["publish-crawl-request"]).unwrap();
        let options = cli.into_options().unwrap();

        assert_eq!(options.env_file, PathBuf::from(".env"));
        assert!(options.use_default_connection);
        assert_eq!(options.job, CrawlJobSpec::default());
    }

    #[test]
    fn test_cli_custom_job() {
        let cli = Cli::try_parse_from([
            "publish-crawl-request",
            "--platform",
            "tiktok",
            "--task-type",
            "crawl_links",
            "--payload",
            r#"{"video_urls":["https://example.com/v/1"]}"#,
            "--no-time-range",
            "--max-attempts",
            "3",
            "--no-default-connection",
        ])
        .unwrap();
        let options = cli.into_options().unwrap();

        assert!(!options.use_default_connection);
        assert_eq!(options.job.platform, Platform::Tiktok);
        assert_eq!(options.job.task_type, TaskType::CrawlLinks);
        assert_eq!(options.job.time_range, None);
        assert_eq!(options.job.max_attempts, Some(3));
        assert_eq!(options.job.routing_key(), "crawler.tiktok.crawl_links");
    }

    #[test]
    fn test_cli_rejects_bad_values() {
        assert!(Cli::try_parse_from(["publish-crawl-request", "--platform", "vimeo"]).is_err());
        assert!(
            Cli::try_parse_from(["publish-crawl-request", "--log-format", "xml"]).is_err()
        );
        assert!(Cli::try_parse_from([
            "publish-crawl-request",
            "--time-range",
            "3",
            "--no-time-range"
        ])
        .is_err());

        let cli = Cli::try_parse_from(["publish-crawl-request", "--payload", "[1]"]).unwrap();
        assert!(matches!(
            cli.into_options(),
            Err(CollectorError::InvalidTaskParams(_))
        ));
    }
}
