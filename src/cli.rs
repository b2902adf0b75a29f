use clap::Parser;
use std::path::PathBuf;

use ytc::Sentiment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn parse_temperature(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("invalid temperature: {s}"))?;
    if (0.1..=1.5).contains(&value) {
        Ok(value)
    } else {
        Err(format!("temperature must be between 0.1 and 1.5, got {value}"))
    }
}

fn parse_word_count(s: &str) -> Result<usize, String> {
    let value: usize = s.parse().map_err(|_| format!("invalid word count: {s}"))?;
    if (10..=200).contains(&value) {
        Ok(value)
    } else {
        Err(format!("word count must be between 10 and 200, got {value}"))
    }
}

#[derive(Parser)]
#[command(
    name = "ytc",
    about = "YouTube comment generator driven by a local language model",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// YouTube video URL or video ID (reads from stdin if omitted)
    pub url: Option<String>,

    /// Tone of the generated comment
    #[arg(short, long, value_enum)]
    pub sentiment: Option<Sentiment>,

    /// Sampling temperature, 0.1 to 1.5
    #[arg(short, long, default_value = "0.7", value_parser = parse_temperature)]
    pub temperature: f64,

    /// Maximum words in the generated comment, 10 to 200
    #[arg(short, long, default_value = "50", value_parser = parse_word_count)]
    pub word_count: usize,

    /// Fix the sampling seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Hugging Face repo holding the GGUF weights
    #[arg(long)]
    pub model_repo: Option<String>,

    /// GGUF file name within the model repo
    #[arg(long)]
    pub model_file: Option<String>,

    /// Hugging Face repo holding tokenizer.json
    #[arg(long)]
    pub tokenizer_repo: Option<String>,

    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Show fetch and generation metadata
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_bounds() {
        assert!(parse_temperature("0.1").is_ok());
        assert!(parse_temperature("0.7").is_ok());
        assert!(parse_temperature("1.5").is_ok());
        assert!(parse_temperature("0.05").is_err());
        assert!(parse_temperature("1.6").is_err());
        assert!(parse_temperature("warm").is_err());
    }

    #[test]
    fn test_word_count_bounds() {
        assert!(parse_word_count("10").is_ok());
        assert!(parse_word_count("200").is_ok());
        assert!(parse_word_count("9").is_err());
        assert!(parse_word_count("201").is_err());
        assert!(parse_word_count("many").is_err());
    }
}
