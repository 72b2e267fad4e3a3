use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tubescribe_core::{
    API_KEY_ENV, Acquirer, CaptionClient, ChannelError, Config, DataApiClient, TranscriptOutcome,
    VideoRecord, config::validate_api_key, enumerate, format_records_readable, render_records,
};

#[derive(Parser)]
#[command(name = "tubescribe")]
#[command(about = "List a YouTube channel's uploads and fetch their transcripts")]
struct Cli {
    /// YouTube channel ID (e.g. UC1234567890abcdef)
    channel_id: String,

    /// Max videos to process
    #[arg(short = 'n', long, default_value_t = 20, value_parser = clap::value_parser!(u16).range(1..=100))]
    max_videos: u16,

    /// YouTube Data API v3 key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// Preferred transcript languages, in order (e.g. -l en -l de)
    #[arg(short, long = "lang", default_value = "en")]
    languages: Vec<String>,

    /// Number of transcripts fetched at once
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=16))]
    jobs: u8,

    /// Print records as JSON instead of readable text
    #[arg(long)]
    json: bool,
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn record_status_line(record: &VideoRecord) -> String {
    match &record.transcript {
        TranscriptOutcome::Text { .. } => format!(
            "{} Transcript fetched: {}",
            style("✓").green().bold(),
            record.video_id
        ),
        TranscriptOutcome::Unavailable { reason } => format!(
            "{} No transcript: {} {}",
            style("!").yellow().bold(),
            record.video_id,
            style(format!("({})", reason)).dim()
        ),
        TranscriptOutcome::Failed { message, .. } => format!(
            "{} Failed: {} {}",
            style("✗").red().bold(),
            record.video_id,
            style(format!("({})", message)).dim()
        ),
    }
}

fn channel_error_hint(err: &ChannelError) -> Option<String> {
    match err {
        ChannelError::Upstream(_) => Some(format!(
            "Please check your {} and ensure the YouTube Data API v3 is enabled for your project.",
            API_KEY_ENV
        )),
        _ => None,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tubescribe=warn".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    // Validate API key early
    let api_key = match validate_api_key(cli.api_key) {
        Ok(key) => key,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    let config = Config::new(api_key)
        .with_languages(cli.languages)
        .with_concurrency(cli.jobs as usize);
    let max_videos = cli.max_videos as usize;
    debug!(
        max_videos,
        languages = ?config.languages,
        concurrency = config.concurrency,
        "configuration loaded"
    );

    eprintln!(
        "\n{}  {}\n",
        style("tubescribe").cyan().bold(),
        style("Channel Transcripts").dim()
    );

    let total_start = Instant::now();

    // Step 1: Enumerate uploads
    let step_start = Instant::now();
    let uploads = DataApiClient::new(&config)?;
    let spinner = create_spinner(&format!(
        "Fetching up to {} video IDs for {}...",
        max_videos, cli.channel_id
    ));
    let video_ids = match enumerate(&uploads, &cli.channel_id, max_videos).await {
        Ok(ids) => ids,
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = channel_error_hint(&e) {
                eprintln!("{}", style(hint).dim());
            }
            std::process::exit(1);
        }
    };

    if video_ids.is_empty() {
        spinner.finish_with_message(format!(
            "{} No videos found for {}",
            style("!").yellow().bold(),
            cli.channel_id
        ));
        return Ok(());
    }

    spinner.finish_with_message(format!(
        "{} Found {} videos {}",
        style("✓").green().bold(),
        video_ids.len(),
        style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
    ));

    // Step 2: Acquire transcripts
    let step_start = Instant::now();
    let acquirer = Acquirer::new(CaptionClient::new(config.languages.clone())?)
        .with_concurrency(config.concurrency);
    let progress = create_progress_bar(video_ids.len());
    progress.set_message("Acquiring transcripts...");
    let records = acquirer
        .acquire_with_progress(&video_ids, |_, _, record| {
            progress.println(record_status_line(record));
            progress.inc(1);
        })
        .await;

    let fetched = records.iter().filter(|r| r.transcript.is_text()).count();
    progress.finish_and_clear();
    eprintln!(
        "{} Transcripts: {}/{} {}",
        style("✓").green().bold(),
        fetched,
        records.len(),
        style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
    );

    eprintln!(
        "\n{} {}\n",
        style("Total time:").dim(),
        style(format_duration(total_start.elapsed())).cyan().bold()
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&render_records(&records))?);
    } else {
        eprintln!("{}", style("─".repeat(60)).dim());
        println!("{}", format_records_readable(&records));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use tubescribe_core::UpstreamError;

    use super::*;

    #[test]
    fn max_videos_is_bounded() {
        let cli = Cli::try_parse_from(["tubescribe", "UC_valid"]).unwrap();
        assert_eq!(cli.max_videos, 20);
        assert_eq!(cli.jobs, 1);
        assert_eq!(cli.languages, vec!["en".to_string()]);

        assert!(Cli::try_parse_from(["tubescribe", "UC_valid", "-n", "0"]).is_err());
        assert!(Cli::try_parse_from(["tubescribe", "UC_valid", "-n", "101"]).is_err());
        assert!(Cli::try_parse_from(["tubescribe", "UC_valid", "-n", "100"]).is_ok());
    }

    #[test]
    fn languages_keep_order() {
        let cli =
            Cli::try_parse_from(["tubescribe", "UC_valid", "-l", "de", "--lang", "en"]).unwrap();
        assert_eq!(cli.languages, vec!["de".to_string(), "en".to_string()]);
    }

    #[test]
    fn upstream_failures_get_a_key_hint() {
        let upstream = ChannelError::Upstream(UpstreamError::new(Some(403), "quotaExceeded"));
        let hint = channel_error_hint(&upstream).unwrap();
        assert!(hint.contains("YOUTUBE_API_KEY"));
        assert!(hint.contains("YouTube Data API v3"));

        let missing = ChannelError::ChannelNotFound {
            channel_id: "UC_nope".into(),
        };
        assert!(channel_error_hint(&missing).is_none());
    }

    #[test]
    fn durations_are_compact() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }
}
