//! Sentence extraction from free-text report descriptions

use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

use super::lookup;

/// Split on sentence terminators, trimming each piece
pub(crate) fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Exclusive length bounds of a potential sentence, in characters
pub(crate) const POTENTIAL_MIN: usize = 20;
pub(crate) const POTENTIAL_MAX: usize = 150;

/// Pick the potential sentence from the first description field that has
/// any sentence strictly between 20 and 150 characters
///
/// A sentence matching `relevant` beats the first qualifying one.
pub(crate) fn pick_potential(report: &Value, paths: &[&str], relevant: &Regex) -> Option<String> {
    paths.iter().find_map(|path| {
        let text = lookup(report, path)?.as_str()?;
        let qualifying: Vec<&str> = split_sentences(text)
            .filter(|s| {
                let len = char_len(s);
                len > POTENTIAL_MIN && len < POTENTIAL_MAX
            })
            .collect();
        qualifying
            .iter()
            .find(|s| relevant.is_match(s))
            .or_else(|| qualifying.first())
            .map(|s| s.to_string())
    })
}

/// Sentences gathered from every description field of a report
///
/// Each sentence can be handed out once, so two insights never show the
/// same text.
#[derive(Debug, Default)]
pub(crate) struct SentencePool {
    sentences: Vec<String>,
    used: Vec<bool>,
}

impl SentencePool {
    pub(crate) const MIN_LEN: usize = 15;
    pub(crate) const MAX_LEN: usize = 120;

    pub(crate) fn collect(report: &Value, paths: &[&str]) -> Self {
        let mut seen_sources: HashSet<&str> = HashSet::new();
        let mut seen_sentences: HashSet<&str> = HashSet::new();
        let mut sentences = Vec::new();

        for path in paths {
            let Some(text) = lookup(report, path).and_then(Value::as_str) else {
                continue;
            };
            // The same description is often echoed under several keys
            if !seen_sources.insert(text.trim()) {
                continue;
            }
            for sentence in split_sentences(text) {
                let len = char_len(sentence);
                if (Self::MIN_LEN..=Self::MAX_LEN).contains(&len) && seen_sentences.insert(sentence) {
                    sentences.push(sentence.to_string());
                }
            }
        }

        let used = vec![false; sentences.len()];
        Self { sentences, used }
    }

    /// Hand out the first unused sentence matching `topic`
    pub(crate) fn take_matching(&mut self, topic: &Regex) -> Option<String> {
        let index = self
            .sentences
            .iter()
            .enumerate()
            .position(|(i, s)| !self.used[i] && topic.is_match(s))?;
        self.used[index] = true;
        Some(self.sentences[index].clone())
    }

    /// Mark a sentence already shown elsewhere as used
    pub(crate) fn mark_used(&mut self, text: &str) {
        for (i, s) in self.sentences.iter().enumerate() {
            if s == text {
                self.used[i] = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_on_terminators() {
        let parts: Vec<&str> = split_sentences("One. Two! Three? ").collect();
        assert_eq!(parts, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn test_potential_prefers_relevant_sentence() {
        let report = json!({
            "description": "This first sentence is long enough to qualify. \
                            Your harmonie grows stronger every single year."
        });
        let re = Regex::new("(?i)harmonie").unwrap();
        let picked = pick_potential(&report, &["description"], &re).unwrap();
        assert_eq!(picked, "Your harmonie grows stronger every single year");
    }

    #[test]
    fn test_potential_length_bounds_are_strict() {
        // exactly 20 characters, then exactly 21
        let report = json!({"description": "abcdefghijklmnopqrst. abcdefghijklmnopqrstu."});
        let re = Regex::new("zzz").unwrap();
        let picked = pick_potential(&report, &["description"], &re).unwrap();
        assert_eq!(picked, "abcdefghijklmnopqrstu");
    }

    #[test]
    fn test_pool_deduplicates_sources_and_hands_out_once() {
        let text = "A calm dialogue keeps you close together. Short.";
        let report = json!({"description": text, "analysis": {"description": text}});
        let mut pool = SentencePool::collect(&report, &["description", "analysis.description"]);

        // "Short" is under the minimum, the echoed copy is skipped
        let any = Regex::new(".").unwrap();
        assert_eq!(
            pool.take_matching(&any).as_deref(),
            Some("A calm dialogue keeps you close together")
        );
        assert!(pool.take_matching(&any).is_none());
    }
}
