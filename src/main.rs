use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use eyre::{Result, WrapErr, bail};
use log::{debug, info};

mod cli;

use cli::{Cli, OutputFormat};
use ytc::generate::{ModelConfig, ModelHandle};
use ytc::youtube::Lookup;
use ytc::{GenerationRequest, Sentiment};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytc.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytc")
        .join("logs")
}

fn build_after_help() -> String {
    let key_line = if std::env::var("YT_TOKEN").is_ok() {
        "  \x1b[32m✅\x1b[0m YT_TOKEN   (YouTube Data API key)".to_string()
    } else {
        "  \x1b[31m❌\x1b[0m YT_TOKEN   (not set — required for metadata lookup)".to_string()
    };

    let log_path = log_dir().join("ytc.log");

    format!(
        "\nCREDENTIALS:\n{key_line}\n\nLogs are written to: {}",
        log_path.display()
    )
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = ytc::config::Config::load().unwrap_or_default();

    // Apply config defaults (CLI flags take priority)
    let sentiment = cli
        .sentiment
        .or_else(|| {
            config
                .default_sentiment
                .as_deref()
                .and_then(|s| <Sentiment as clap::ValueEnum>::from_str(s, true).ok())
        })
        .unwrap_or(Sentiment::Positive);

    let defaults = ModelConfig::default();
    let model_config = ModelConfig {
        model_repo: cli
            .model_repo
            .clone()
            .or(config.default_model_repo)
            .unwrap_or(defaults.model_repo),
        model_file: cli
            .model_file
            .clone()
            .or(config.default_model_file)
            .unwrap_or(defaults.model_file),
        tokenizer_repo: cli
            .tokenizer_repo
            .clone()
            .or(config.default_tokenizer_repo)
            .unwrap_or(defaults.tokenizer_repo),
    };

    if cli.verbose {
        let config_path = ytc::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
        debug!("Model: {} ({})", model_config.model_repo, model_config.model_file);
    }

    let api_key = ytc::youtube::api_key()?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    // Collect URLs: from arg or stdin
    let urls = if let Some(ref url) = cli.url {
        vec![url.clone()]
    } else {
        let stdin = io::stdin();
        stdin.lock().lines().collect::<Result<Vec<_>, _>>()?
    };

    let urls: Vec<String> = urls
        .iter()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .collect();

    if urls.is_empty() {
        bail!("no video URL provided\n\nUsage: ytc <URL>\n       echo <URL> | ytc");
    }

    // Load once, reuse for every URL. Blocking candle work runs via
    // block_in_place so the runtime's core threads stay free.
    let mut handle = tokio::task::block_in_place(|| ModelHandle::load(&model_config))
        .wrap_err("model load failed")?;

    if cli.verbose {
        eprintln!("Device: {:?}", handle.device());
    }

    for url_input in &urls {
        let request = GenerationRequest {
            video_url: url_input.clone(),
            sentiment,
            temperature: cli.temperature,
            word_count: cli.word_count,
        };

        let video_id = ytc::extract_video_id(&request.video_url)
            .ok_or_else(|| eyre::eyre!("could not extract video ID from: {url_input}\n\nSupported formats:\n  https://www.youtube.com/watch?v=ID\n  https://youtu.be/ID\n  https://www.youtube.com/embed/ID\n  https://www.youtube.com/shorts/ID\n  <11-character video ID>"))?;

        let metadata = match ytc::youtube::fetch_metadata(&client, &video_id, &api_key)
            .await
            .wrap_err("metadata lookup failed")?
        {
            Lookup::Found(metadata) => metadata,
            Lookup::NotFound => {
                eprintln!("video not found: {video_id}");
                continue;
            }
        };

        if cli.verbose {
            eprintln!(
                "Video: {} ({})\nChannel: {}\nTags: {}",
                metadata.title,
                video_id,
                metadata.channel_title,
                metadata.tags.as_ref().map_or(0, |t| t.len()),
            );
        }

        let prompt = ytc::prompt::build_prompt(request.sentiment, &metadata);
        debug!("Prompt:\n{prompt}");

        let seed = cli.seed.unwrap_or_else(clock_seed);
        let raw = tokio::task::block_in_place(|| handle.generate(&prompt, request.temperature, seed))
            .wrap_err("comment generation failed")?;

        let comment = ytc::output::trim_to_words(&raw, request.word_count);
        if comment.is_empty() {
            eprintln!("model produced no text for {video_id}, try again or raise the temperature");
            continue;
        }

        let rendered = match cli.format {
            OutputFormat::Text => comment.clone(),
            OutputFormat::Json => ytc::output::render_json(&video_id, &metadata, request.sentiment, &comment)?,
        };

        if let Some(ref path) = cli.output {
            std::fs::write(path, &rendered)?;
            if cli.verbose {
                eprintln!("Output written to: {}", path.display());
            }
        } else {
            println!("{rendered}");
        }
    }

    Ok(())
}
