use eyre::Result;
use serde::Serialize;

use crate::{Sentiment, VideoMetadata};

/// Keep the first `word_count` whitespace-delimited words and flatten any
/// embedded newlines into single spaces.
pub fn trim_to_words(text: &str, word_count: usize) -> String {
    text.split_whitespace().take(word_count).collect::<Vec<_>>().join(" ")
}

#[derive(Serialize)]
struct CommentRecord<'a> {
    video_id: &'a str,
    title: &'a str,
    channel: &'a str,
    tags: &'a [String],
    sentiment: String,
    comment: &'a str,
}

/// Render the generated comment with its video context as pretty JSON.
pub fn render_json(
    video_id: &str,
    metadata: &VideoMetadata,
    sentiment: Sentiment,
    comment: &str,
) -> Result<String> {
    let record = CommentRecord {
        video_id,
        title: &metadata.title,
        channel: &metadata.channel_title,
        tags: metadata.tags.as_deref().unwrap_or(&[]),
        sentiment: sentiment.to_string(),
        comment,
    };
    Ok(serde_json::to_string_pretty(&record)?)
}
