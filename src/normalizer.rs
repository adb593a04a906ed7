//! Query Normalization
//!
//! Cleans voice transcripts and typed queries before matching: applies
//! configured correction pairs, strips conversational filler, and parses
//! spoken selection numbers.

use std::collections::HashMap;

/// Normalizes transcripts to fix common recognition errors
pub struct QueryNormalizer {
    /// Manual corrections from config
    corrections: HashMap<String, String>,
    /// Number word mappings
    number_words: HashMap<&'static str, u32>,
}

impl QueryNormalizer {
    pub fn new(corrections: HashMap<String, String>) -> Self {
        let mut number_words = HashMap::new();

        for (word, num) in [
            ("one", 1),
            ("two", 2),
            ("three", 3),
            ("four", 4),
            ("five", 5),
            ("six", 6),
            ("seven", 7),
            ("eight", 8),
            ("nine", 9),
            ("ten", 10),
            ("eleven", 11),
            ("twelve", 12),
            ("thirteen", 13),
            ("fourteen", 14),
            ("fifteen", 15),
            ("sixteen", 16),
            ("seventeen", 17),
            ("eighteen", 18),
            ("nineteen", 19),
            ("twenty", 20),
        ] {
            number_words.insert(word, num);
        }

        Self {
            corrections,
            number_words,
        }
    }

    /// Normalize a transcript with corrections and common fixes
    pub fn normalize(&self, text: &str) -> String {
        let mut result = text.to_lowercase();

        // Apply manual corrections
        for (from, to) in &self.corrections {
            result = result.replace(&from.to_lowercase(), to);
        }

        // Recognition slips seen for the two most common query verbs
        let mishearings = [("wear is ", "where is "), ("fine me ", "find me ")];
        for (from, to) in mishearings {
            result = result.replace(from, to);
        }

        let result_trim = result.trim();

        // Strip conversational prefixes and articles recursively
        let prefixes = [
            "yes ",
            "ok ",
            "okay ",
            "hey ",
            "um ",
            "uh ",
            "please ",
            "can you ",
            "could you ",
            "the ",
            "a ",
            "an ",
        ];
        let mut final_text = result_trim.to_string();

        loop {
            let mut changed = false;
            for prefix in prefixes {
                if final_text.starts_with(prefix) {
                    final_text = final_text[prefix.len()..].trim().to_string();
                    changed = true;
                    break;
                }
            }
            if !changed {
                break;
            }
        }

        // Remove redundant articles from the middle of the phrase
        let middle_junk = [" the ", " a ", " an ", " please "];
        for junk in middle_junk {
            final_text = final_text.replace(junk, " ");
        }

        // Final cleanup of double spaces
        final_text.replace("  ", " ").trim().to_string()
    }

    /// Parse a spoken number (1-99) from text
    pub fn parse_number(&self, text: &str) -> Option<u32> {
        let text_lower = text.to_lowercase();

        if let Ok(num) = text_lower.parse::<u32>() {
            if num > 0 && num <= 99 {
                return Some(num);
            }
        }

        if let Some(&num) = self.number_words.get(text_lower.as_str()) {
            return Some(num);
        }

        None
    }
}
