//! Prescription Scanning
//!
//! Sends a prescription photo to the third-party OCR HTTP API, then runs
//! heuristic extraction over the returned text: boilerplate lines are
//! dropped, dosage tokens stripped, and the remaining candidate tokens
//! fuzzy-matched against the medicine catalog.

use crate::config::Config;
use crate::error::{GuideError, GuideResult};
use crate::matcher;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Minimum fuzzy score for a token to count as a medicine hit
const MATCH_FLOOR: f64 = 0.55;

/// Tokens shorter than this are never considered medicine candidates
const MIN_TOKEN_LEN: usize = 4;

/// A medicine recognized in a prescription
#[derive(Debug, Clone)]
pub struct PrescriptionMatch {
    pub medicine: String,
    pub score: f64,
    pub source_token: String,
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    #[serde(rename = "ParsedResults", default)]
    parsed_results: Vec<ParsedResult>,
    #[serde(rename = "IsErroredOnProcessing", default)]
    is_errored: bool,
    #[serde(rename = "ErrorMessage", default)]
    error_message: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ParsedResult {
    #[serde(rename = "ParsedText", default)]
    parsed_text: String,
}

/// Client for the image-to-text HTTP API
#[derive(Clone)]
pub struct OcrClient {
    url: String,
    api_key: String,
    language: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OcrClient {
    pub fn new(config: &Config) -> Self {
        Self {
            url: config.ocr_url.clone(),
            api_key: config.ocr_api_key.clone(),
            language: config.ocr_language.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs.max(1)),
            client: reqwest::Client::new(),
        }
    }

    /// OCR an image, returning the raw recognized text
    pub async fn parse_image(&self, image: &[u8]) -> GuideResult<String> {
        let encoded = format!("data:image/jpeg;base64,{}", STANDARD.encode(image));

        let response = self
            .client
            .post(&self.url)
            .form(&[
                ("apikey", self.api_key.as_str()),
                ("language", self.language.as_str()),
                ("base64Image", encoded.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!("OCR API error ({}): {}", status, body);
            return Err(GuideError::Ocr(format!("OCR API returned {}", status)));
        }

        let parsed: OcrResponse = serde_json::from_str(&body)
            .map_err(|e| GuideError::Ocr(format!("unreadable OCR response: {}", e)))?;

        if parsed.is_errored {
            let message = parsed
                .error_message
                .map(|m| m.to_string())
                .unwrap_or_else(|| "unspecified OCR failure".to_string());
            return Err(GuideError::Ocr(message));
        }

        let text = parsed
            .parsed_results
            .iter()
            .map(|r| r.parsed_text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        debug!("OCR returned {} characters", text.len());
        Ok(text)
    }

    /// OCR an image file from disk
    pub async fn parse_file(&self, path: &Path) -> GuideResult<String> {
        let bytes = std::fs::read(path)?;
        self.parse_image(&bytes).await
    }
}

lazy_static! {
    /// Lines that are prescription boilerplate, never medicine names
    static ref BOILERPLATE_LINE: Regex = Regex::new(
        r"(?i)^\s*(patient|name|age|sex|date|address|tel|phone|doctor|dr\.?\s|signature|hospital|clinic|folio|refill)\b"
    )
    .expect("static regex");

    /// Leading prescription markers stripped before tokenizing
    static ref RX_MARKER: Regex = Regex::new(r"(?i)^\s*(rx|℞)[:.\s]*").expect("static regex");

    /// Dosage amounts: 500mg, 2.5 ml, 1000 IU, x2
    static ref DOSAGE_TOKEN: Regex =
        Regex::new(r"(?i)^(\d+(\.\d+)?(mg|ml|mcg|g|iu)?|x\d+|\d+/\d+)$").expect("static regex");

    /// Administration shorthand: b.i.d., t.d.s., q4h
    static ref FREQUENCY_TOKEN: Regex =
        Regex::new(r"(?i)^([a-z]\.){1,3}[a-z]\.?$|^q\d+h$").expect("static regex");
}

/// Dosage-form and instruction words that never name a medicine
const FORM_WORDS: &[&str] = &[
    "tablet", "tablets", "tabs", "capsule", "capsules", "caps", "syrup", "suspension",
    "injection", "cream", "ointment", "drops", "inhaler", "daily", "twice", "thrice",
    "morning", "night", "evening", "before", "after", "meals", "food", "take", "apply",
    "days", "weeks", "hours", "every", "oral", "dose", "doses",
];

/// Pull candidate medicine-name tokens out of OCR'd prescription text.
///
/// Returns single tokens plus each cleaned line (multi-word names like
/// "Oral Rehydration Salts" only match at line granularity).
pub fn extract_candidate_tokens(text: &str) -> Vec<String> {
    let mut candidates = Vec::new();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || BOILERPLATE_LINE.is_match(line) {
            continue;
        }
        let line = RX_MARKER.replace(line, "");

        let mut kept_tokens: Vec<String> = Vec::new();
        for raw_token in line.split(|c: char| !c.is_alphanumeric() && c != '.' && c != '/') {
            let token = raw_token.trim_matches('.');
            if token.len() < MIN_TOKEN_LEN
                || DOSAGE_TOKEN.is_match(token)
                || FREQUENCY_TOKEN.is_match(raw_token)
                || FORM_WORDS.contains(&token.to_lowercase().as_str())
            {
                continue;
            }
            kept_tokens.push(token.to_string());
        }

        if kept_tokens.is_empty() {
            continue;
        }
        let cleaned_line = kept_tokens.join(" ");
        for token in kept_tokens {
            if !candidates.contains(&token) {
                candidates.push(token);
            }
        }
        if !candidates.contains(&cleaned_line) {
            candidates.push(cleaned_line);
        }
    }

    candidates
}

/// Match extracted tokens against the medicine catalog.
///
/// A medicine is reported once, at its best score, and only when some
/// token reaches [`MATCH_FLOOR`]. Results are ranked by score.
pub fn match_medicines(text: &str, medicine_names: &[String]) -> Vec<PrescriptionMatch> {
    let mut hits: Vec<PrescriptionMatch> = Vec::new();

    for token in extract_candidate_tokens(text) {
        let ranked = matcher::best_matches(&token, medicine_names);
        let top = match ranked.into_iter().next() {
            Some(top) if top.score >= MATCH_FLOOR => top,
            _ => continue,
        };

        match hits.iter().position(|h| h.medicine == top.value) {
            Some(i) => {
                if top.score > hits[i].score {
                    hits[i].score = top.score;
                    hits[i].source_token = token;
                }
            }
            None => hits.push(PrescriptionMatch {
                medicine: top.value,
                score: top.score,
                source_token: token,
            }),
        }
    }

    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESCRIPTION: &str = "\
City Clinic Accra
Patient: Ama Mensah   Age: 21
Date: 12/03/2025

Rx: Paracetam0l 500mg tablets x2 daily
Amoxicilin 250mg caps t.d.s. after meals
Oral Rehydration Salts
Dr. K. Owusu  Signature";

    fn catalog() -> Vec<String> {
        vec![
            "Paracetamol".to_string(),
            "Amoxicillin".to_string(),
            "Oral Rehydration Salts".to_string(),
            "Ibuprofen".to_string(),
        ]
    }

    #[test]
    fn test_extract_skips_boilerplate_and_dosage() {
        let tokens = extract_candidate_tokens(PRESCRIPTION);
        assert!(tokens.iter().any(|t| t == "Paracetam0l"));
        assert!(tokens.iter().any(|t| t == "Amoxicilin"));
        assert!(!tokens.iter().any(|t| t == "500mg"));
        assert!(!tokens.iter().any(|t| t == "tablets"));
        assert!(!tokens.iter().any(|t| t.contains("Mensah")));
        assert!(!tokens.iter().any(|t| t.contains("Owusu")));
    }

    #[test]
    fn test_match_tolerates_ocr_misreads() {
        let hits = match_medicines(PRESCRIPTION, &catalog());
        let names: Vec<&str> = hits.iter().map(|h| h.medicine.as_str()).collect();
        assert!(names.contains(&"Paracetamol"));
        assert!(names.contains(&"Amoxicillin"));
        assert!(!names.contains(&"Ibuprofen"));
    }

    #[test]
    fn test_match_finds_multiword_names() {
        let hits = match_medicines("Oral Rehydration Salts", &catalog());
        assert!(hits.iter().any(|h| h.medicine == "Oral Rehydration Salts"));
    }

    #[test]
    fn test_match_dedupes_per_medicine() {
        let text = "Paracetamol\nParacetam0l 500mg";
        let hits = match_medicines(text, &catalog());
        assert_eq!(
            hits.iter().filter(|h| h.medicine == "Paracetamol").count(),
            1
        );
        assert_eq!(hits[0].score, 1.0);
    }

    #[test]
    fn test_match_unrelated_text_is_empty() {
        let hits = match_medicines("see you tomorrow at the stadium", &catalog());
        assert!(hits.is_empty());
    }

    #[test]
    fn test_results_ranked_by_score() {
        let hits = match_medicines(PRESCRIPTION, &catalog());
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}
