use crate::{Sentiment, VideoMetadata};

/// Word cap for the description segment of the prompt.
pub const MAX_DESCRIPTION_WORDS: usize = 100;

const ELLIPSIS: &str = "...";

/// Bound a string to `max_words` whitespace-delimited words.
///
/// Missing input yields an empty string. Truncated output carries the ellipsis
/// marker as its own token, so truncating at the same limit twice is a no-op.
pub fn truncate_words(text: Option<&str>, max_words: usize) -> String {
    let Some(text) = text else {
        return String::new();
    };

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > max_words {
        format!("{} {ELLIPSIS}", words[..max_words].join(" "))
    } else {
        text.to_string()
    }
}

/// Assemble the generation prompt from sentiment and video metadata.
///
/// Absent tags render as an empty list and an absent description as an empty
/// string; the prompt always ends with the bare `comment:` cue.
pub fn build_prompt(sentiment: Sentiment, metadata: &VideoMetadata) -> String {
    let tags = metadata.tags.as_deref().unwrap_or(&[]).join(", ");
    let description = truncate_words(metadata.description.as_deref(), MAX_DESCRIPTION_WORDS);

    format!(
        "sentiment: {sentiment}\nvideo: {title}\nchannel: {channel}\ntags: {tags}\ndescription: {description}\ncomment:",
        title = metadata.title,
        channel = metadata.channel_title,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metadata() -> VideoMetadata {
        VideoMetadata {
            title: "Test".to_string(),
            channel_title: "Chan".to_string(),
            tags: Some(vec!["a".to_string(), "b".to_string()]),
            description: Some("short desc".to_string()),
        }
    }

    #[test]
    fn test_truncate_short_input_unchanged() {
        assert_eq!(truncate_words(Some("one two three"), 5), "one two three");
    }

    #[test]
    fn test_truncate_at_limit_unchanged() {
        assert_eq!(truncate_words(Some("one two three"), 3), "one two three");
    }

    #[test]
    fn test_truncate_over_limit() {
        assert_eq!(truncate_words(Some("one two three four"), 2), "one two ...");
    }

    #[test]
    fn test_truncate_missing_input() {
        assert_eq!(truncate_words(None, 100), "");
    }

    #[test]
    fn test_truncate_word_count() {
        let text = (1..=150).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let out = truncate_words(Some(&text), 100);
        let tokens: Vec<&str> = out.split_whitespace().collect();
        assert_eq!(tokens.len(), 101);
        assert_eq!(tokens[99], "w100");
        assert_eq!(tokens[100], "...");
    }

    #[test]
    fn test_truncate_is_idempotent() {
        let text = (1..=150).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let once = truncate_words(Some(&text), 100);
        let twice = truncate_words(Some(&once), 100);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_prompt_template() {
        let prompt = build_prompt(Sentiment::Positive, &sample_metadata());
        assert!(prompt.contains("sentiment: POSITIVE"));
        assert!(prompt.contains("video: Test"));
        assert!(prompt.contains("channel: Chan"));
        assert!(prompt.contains("tags: a, b"));
        assert!(prompt.contains("description: short desc"));
        assert!(prompt.ends_with("comment:"));
    }

    #[test]
    fn test_prompt_negative_sentiment() {
        let prompt = build_prompt(Sentiment::Negative, &sample_metadata());
        assert!(prompt.contains("sentiment: NEGATIVE"));
    }

    #[test]
    fn test_prompt_without_tags_or_description() {
        let metadata = VideoMetadata {
            title: "Bare".to_string(),
            channel_title: "Chan".to_string(),
            tags: None,
            description: None,
        };
        let prompt = build_prompt(Sentiment::Positive, &metadata);
        assert!(prompt.contains("tags: \n"));
        assert!(prompt.contains("description: \n"));
        assert!(prompt.ends_with("comment:"));
    }

    #[test]
    fn test_prompt_truncates_long_description() {
        let description = (1..=150).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let metadata = VideoMetadata {
            description: Some(description),
            ..sample_metadata()
        };
        let prompt = build_prompt(Sentiment::Positive, &metadata);
        let line = prompt
            .lines()
            .find(|l| l.starts_with("description: "))
            .unwrap();
        // label token plus 100 words plus the ellipsis marker
        assert_eq!(line.split_whitespace().count(), 102);
        assert!(line.ends_with("..."));
    }
}
