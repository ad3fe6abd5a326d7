//! Document splitting
//!
//! Breaks raw text into sentence-sized units before annotation.

use regex::Regex;

use oer_core::{DocumentConfig, OerError, Result};

/// Splits text on sentence delimiters and newlines
#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    boundary: Regex,
    min_chars: usize,
}

impl SentenceSplitter {
    pub fn new(config: &DocumentConfig) -> Result<Self> {
        let pattern = if config.sentence_delimiters.is_empty() {
            r"\n".to_string()
        } else {
            format!(r"[{}]|\n", regex::escape(&config.sentence_delimiters))
        };
        let boundary = Regex::new(&pattern)
            .map_err(|e| OerError::ConfigError(format!("sentence delimiters: {}", e)))?;

        Ok(Self {
            boundary,
            min_chars: config.min_sentence_chars,
        })
    }

    /// Trimmed sentences in document order; fragments shorter than the
    /// configured minimum are dropped.
    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.boundary
            .split(text)
            .map(str::trim)
            .filter(|s| s.chars().count() >= self.min_chars && !s.is_empty())
            .collect()
    }
}

/// One-shot split with a freshly built splitter
pub fn split_sentences<'a>(text: &'a str, config: &DocumentConfig) -> Result<Vec<&'a str>> {
    Ok(SentenceSplitter::new(config)?.split(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_delimiters() {
        let splitter = SentenceSplitter::new(&DocumentConfig::default()).unwrap();
        let text = "高克访问中国，并在同济大学发表演讲。奥巴马毕业于哈佛大学！好的。\n习近平视察中国福建厦门";

        let sentences = splitter.split(text);

        assert_eq!(
            sentences,
            vec![
                "高克访问中国，并在同济大学发表演讲",
                "奥巴马毕业于哈佛大学",
                "习近平视察中国福建厦门",
            ]
        );
    }

    #[test]
    fn test_min_chars_counts_characters() {
        let config = DocumentConfig {
            min_sentence_chars: 3,
            ..DocumentConfig::default()
        };
        let splitter = SentenceSplitter::new(&config).unwrap();
        assert_eq!(splitter.split("中国好；美国"), vec!["中国好"]);
    }

    #[test]
    fn test_newline_only() {
        let config = DocumentConfig {
            sentence_delimiters: String::new(),
            min_sentence_chars: 1,
        };
        let splitter = SentenceSplitter::new(&config).unwrap();
        assert_eq!(splitter.split("a。b\nc"), vec!["a。b", "c"]);
    }

    #[test]
    fn test_split_sentences_default_minimum() {
        let sentences =
            split_sentences("太短。奥巴马毕业于哈佛大学", &DocumentConfig::default()).unwrap();
        assert_eq!(sentences, vec!["奥巴马毕业于哈佛大学"]);
    }
}
