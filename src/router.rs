//! Query Router
//!
//! Routes normalized transcripts and typed queries to the right handler:
//! campus-location lookups, medicine availability, or control phrases.
//! Delegates multi-hit outcomes to the selection handler.

use crate::catalog::Catalog;
use crate::i18n;
use crate::matcher;
use crate::selection::{SelectionHandler, SelectionResult};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Hits below this score are never surfaced
const MIN_HIT_SCORE: f64 = 0.3;

/// Answer directly when the top hit clears this score...
const AUTO_SELECT_SCORE: f64 = 0.9;

/// ...and leads the runner-up by more than this margin
const AUTO_SELECT_GAP: f64 = 0.15;

/// Keywords that indicate a navigation query
const LOCATION_KEYWORDS: &[&str] = &[
    "where", "navigate", "direction", "locate", "take", "go", "building", "library", "hall",
    "campus", "hospital", "market", "cafeteria",
];

/// Keywords that indicate a medicine query
const MEDICINE_KEYWORDS: &[&str] = &[
    "medicine", "drug", "pharmacy", "stock", "tablet", "capsule", "syrup", "prescription",
    "available", "sell", "have",
];

/// Kind of entry a search hit refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Location,
    Medicine,
    Pharmacy,
}

/// One ranked search hit offered to the user
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub display: String,
    pub value: String,
    pub kind: HitKind,
    pub score: f64,
}

/// Result of routing one query
#[derive(Debug)]
pub enum RouteResult {
    /// Direct answer text for the user
    Answer(String),
    /// Several plausible hits; a selection list was opened
    Results(Vec<SearchHit>),
    /// User requested quit
    Quit,
    /// Query not recognized
    NotRecognized,
}

pub struct Router {
    catalog: Arc<Catalog>,
    language: String,
}

impl Router {
    pub fn new(catalog: Arc<Catalog>, language: &str) -> Self {
        Self {
            catalog,
            language: language.to_string(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Route one normalized query.
    ///
    /// An active selection list gets first claim on the input; anything it
    /// does not recognize falls through to normal routing.
    pub fn process(&mut self, text: &str, selection: &mut SelectionHandler) -> RouteResult {
        let text_lower = text.to_lowercase();
        let text_lower = text_lower.trim();

        debug!("Routing query: '{}'", text_lower);

        if selection.is_active() {
            match selection.handle_command(text_lower) {
                SelectionResult::Selected(hit, _) => return self.describe_hit(&hit),
                SelectionResult::NextPage
                | SelectionResult::PreviousPage
                | SelectionResult::RepeatOptions => {
                    return RouteResult::Answer(selection.options_text())
                }
                SelectionResult::Cancelled => {
                    return RouteResult::Answer("Okay, cancelled.".to_string())
                }
                SelectionResult::NotRecognized => {} // fall through to routing
            }
        }

        if Self::is_quit_command(text_lower) {
            return RouteResult::Quit;
        }

        if text_lower == "help" || text_lower == "list commands" {
            return RouteResult::Answer(
                "Ask 'where is ...' for a campus place, or 'do you have ...' \
                 for a medicine. Say quit to leave."
                    .to_string(),
            );
        }

        if let Some(language) = Self::parse_language_switch(text_lower) {
            self.language = language.to_string();
            return RouteResult::Answer(format!("Language switched to {}.", language));
        }

        if Self::quick_medicine_check(text_lower) {
            if let Some(result) = self.handle_medicine_query(text_lower, selection) {
                return result;
            }
            // "where is the pharmacy" carries medicine wording but names a place
            if let Some(result) = self.handle_location_query(text_lower, selection) {
                return result;
            }
            warn!("Medicine query not matched: {}", text_lower);
            return RouteResult::NotRecognized;
        }

        if Self::quick_location_check(text_lower) {
            if let Some(result) = self.handle_location_query(text_lower, selection) {
                return result;
            }
        }

        // Bare queries ("balme", "panadol") still deserve a try
        self.handle_location_query(text_lower, selection)
            .or_else(|| self.handle_medicine_query(text_lower, selection))
            .unwrap_or(RouteResult::NotRecognized)
    }

    /// Fast heuristic to detect medicine queries
    fn quick_medicine_check(text: &str) -> bool {
        MEDICINE_KEYWORDS
            .iter()
            .any(|kw| text.split_whitespace().any(|w| w.contains(kw)))
    }

    /// Fast heuristic to detect navigation queries
    fn quick_location_check(text: &str) -> bool {
        let words: Vec<&str> = text.split_whitespace().take(2).collect();
        LOCATION_KEYWORDS
            .iter()
            .any(|kw| words.iter().any(|w| w.contains(kw)))
    }

    /// Check for quit commands
    fn is_quit_command(text: &str) -> bool {
        ["quit", "exit", "goodbye", "good bye", "stop listening"]
            .iter()
            .any(|w| text.contains(w))
    }

    fn parse_language_switch(text: &str) -> Option<&'static str> {
        let rest = text
            .strip_prefix("switch to ")
            .or_else(|| text.strip_prefix("speak "))?;
        match rest.trim() {
            "english" => Some("en-US"),
            "french" => Some("fr-FR"),
            "twi" => Some("tw-GH"),
            _ => None,
        }
    }

    /// Strip intent phrasing, leaving the search term
    fn extract_query(text: &str, prefixes: &[&str], suffixes: &[&str]) -> String {
        let mut query = text.to_string();
        for prefix in prefixes {
            if let Some(rest) = query.strip_prefix(prefix) {
                query = rest.to_string();
                break;
            }
        }
        for suffix in suffixes {
            if let Some(rest) = query.strip_suffix(suffix) {
                query = rest.to_string();
                break;
            }
        }
        query.trim().to_string()
    }

    fn handle_location_query(
        &self,
        text: &str,
        selection: &mut SelectionHandler,
    ) -> Option<RouteResult> {
        let query = Self::extract_query(
            text,
            &[
                "where is ",
                "where's ",
                "take me to ",
                "navigate to ",
                "directions to ",
                "direction to ",
                "go to ",
                "locate ",
                "find ",
                "show me ",
            ],
            &[" building", " please"],
        );
        if query.is_empty() {
            return None;
        }

        // Alias tables first: they know what students call these places
        if let Some(canonical) =
            matcher::find_matching_entity(&query, i18n::campus_translations(), &self.language)
        {
            info!("🎯 Resolved '{}' to location '{}'", query, canonical);
            return Some(self.describe_location(canonical));
        }

        // Fall back to fuzzy search over the cached catalog names
        let names = match self.catalog.location_names() {
            Ok(names) if !names.is_empty() => names,
            Ok(_) => return None,
            Err(e) => {
                warn!("Catalog lookup failed: {}", e);
                return None;
            }
        };

        let hits: Vec<SearchHit> = matcher::best_matches(&query, &names)
            .into_iter()
            .filter(|m| m.score > MIN_HIT_SCORE)
            .map(|m| SearchHit {
                display: m.value.clone(),
                value: m.value,
                kind: HitKind::Location,
                score: m.score,
            })
            .collect();

        match hits.len() {
            0 => None,
            1 => Some(self.describe_location(&hits[0].value)),
            _ if hits[0].score > AUTO_SELECT_SCORE
                && hits[0].score - hits[1].score > AUTO_SELECT_GAP =>
            {
                Some(self.describe_location(&hits[0].value))
            }
            _ => {
                selection.set_items(hits.clone());
                Some(RouteResult::Results(hits))
            }
        }
    }

    fn handle_medicine_query(
        &self,
        text: &str,
        selection: &mut SelectionHandler,
    ) -> Option<RouteResult> {
        let query = Self::extract_query(
            text,
            &[
                "do you have ",
                "do we have ",
                "is there ",
                "find medicine ",
                "search medicine ",
                "medicine ",
                "any ",
            ],
            &[
                " in stock",
                " available",
                " medicine",
                " tablets",
                " tablet",
                " syrup",
            ],
        );
        if query.is_empty() {
            return None;
        }

        // Brand/localized names resolve through the alias tables
        let canonical =
            matcher::find_matching_entity(&query, i18n::medicine_translations(), &self.language);
        if let Some(canonical) = canonical {
            if let Ok(Some(medicine)) = self.catalog.get_medicine(canonical) {
                info!("🎯 Resolved '{}' to medicine '{}'", query, medicine.name);
                return Some(RouteResult::Answer(self.stock_report(medicine.id)));
            }
        }

        let names = match self.catalog.medicine_names() {
            Ok(names) if !names.is_empty() => names,
            _ => return None,
        };

        let hits: Vec<SearchHit> = matcher::best_matches(&query, &names)
            .into_iter()
            .filter(|m| m.score > MIN_HIT_SCORE)
            .map(|m| SearchHit {
                display: m.value.clone(),
                value: m.value,
                kind: HitKind::Medicine,
                score: m.score,
            })
            .collect();

        match hits.len() {
            0 => None,
            1 => Some(self.describe_medicine(&hits[0].value)),
            _ if hits[0].score > AUTO_SELECT_SCORE
                && hits[0].score - hits[1].score > AUTO_SELECT_GAP =>
            {
                Some(self.describe_medicine(&hits[0].value))
            }
            _ => {
                selection.set_items(hits.clone());
                Some(RouteResult::Results(hits))
            }
        }
    }

    fn describe_hit(&self, hit: &SearchHit) -> RouteResult {
        match hit.kind {
            HitKind::Location => self.describe_location(&hit.value),
            HitKind::Medicine => match self.describe_medicine(&hit.value) {
                RouteResult::NotRecognized => {
                    RouteResult::Answer(format!("No details for {}.", hit.value))
                }
                other => other,
            },
            HitKind::Pharmacy => RouteResult::Answer(hit.display.clone()),
        }
    }

    fn describe_location(&self, name: &str) -> RouteResult {
        match self.catalog.get_location(name) {
            Ok(Some(location)) => RouteResult::Answer(format!(
                "{} ({}): {}. Coordinates {:.4}, {:.4}.",
                location.name,
                location.category,
                location.description,
                location.latitude,
                location.longitude
            )),
            Ok(None) => RouteResult::Answer(format!(
                "I know {}, but the catalog has no details yet. Run a sync.",
                name
            )),
            Err(e) => {
                warn!("Catalog lookup failed: {}", e);
                RouteResult::Answer(format!("I couldn't look up {} right now.", name))
            }
        }
    }

    fn describe_medicine(&self, name: &str) -> RouteResult {
        match self.catalog.get_medicine(name) {
            Ok(Some(medicine)) => RouteResult::Answer(self.stock_report(medicine.id)),
            _ => RouteResult::NotRecognized,
        }
    }

    /// Which pharmacies stock the medicine, with a prescription note
    fn stock_report(&self, medicine_id: i64) -> String {
        let medicine = match self.catalog.get_medicine_by_id(medicine_id) {
            Ok(Some(m)) => m,
            _ => return "That medicine is not in the catalog.".to_string(),
        };

        let stock = match self.catalog.pharmacies_with_medicine(medicine_id) {
            Ok(stock) => stock,
            Err(e) => {
                warn!("Inventory lookup failed: {}", e);
                return format!("I couldn't check stock for {} right now.", medicine.name);
            }
        };

        if stock.is_empty() {
            return format!(
                "{} is not in stock at any campus pharmacy right now.",
                medicine.name
            );
        }

        let lines: Vec<String> = stock
            .iter()
            .map(|s| {
                format!(
                    "{} ({} in stock, GHS {:.2})",
                    s.pharmacy_name, s.quantity, s.price
                )
            })
            .collect();

        let mut report = format!("{} is available at: {}.", medicine.name, lines.join(", "));
        if medicine.requires_prescription {
            report.push_str(" A prescription is required.");
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{sample_snapshot, Catalog};
    use tempfile::TempDir;

    fn router() -> (TempDir, Router, SelectionHandler) {
        let dir = TempDir::new().expect("temp dir");
        let catalog = Catalog::new(dir.path().join("catalog.db")).expect("catalog");
        catalog
            .replace_snapshot(&sample_snapshot())
            .expect("snapshot");
        let router = Router::new(Arc::new(catalog), "en-US");
        (dir, router, SelectionHandler::new())
    }

    #[test]
    fn test_location_query_direct_answer() {
        let (_dir, mut router, mut selection) = router();
        match router.process("where is balme library", &mut selection) {
            RouteResult::Answer(text) => assert!(text.contains("Balme Library")),
            other => panic!("Expected Answer, got {:?}", other),
        }
    }

    #[test]
    fn test_location_alias_resolves() {
        let (_dir, mut router, mut selection) = router();
        match router.process("where is the main library", &mut selection) {
            RouteResult::Answer(text) => assert!(text.contains("Balme Library")),
            other => panic!("Expected Answer, got {:?}", other),
        }
    }

    #[test]
    fn test_medicine_query_reports_stock() {
        let (_dir, mut router, mut selection) = router();
        match router.process("do you have panadol", &mut selection) {
            RouteResult::Answer(text) => {
                assert!(text.contains("Panadol"));
                assert!(text.contains("Legon Pharmacy"));
            }
            other => panic!("Expected Answer, got {:?}", other),
        }
    }

    #[test]
    fn test_medicine_out_of_stock() {
        let (_dir, mut router, mut selection) = router();
        match router.process("do you have amoxil", &mut selection) {
            RouteResult::Answer(text) => {
                assert!(text.contains("not in stock"));
            }
            other => panic!("Expected Answer, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_not_recognized() {
        let (_dir, mut router, mut selection) = router();
        for garbage in ["xyzxyz", "!!! @@@ ###", "1234567890"] {
            let result = router.process(garbage, &mut selection);
            assert!(
                matches!(result, RouteResult::NotRecognized),
                "'{}' -> {:?}",
                garbage,
                result
            );
        }
    }

    #[test]
    fn test_quit_command() {
        let (_dir, mut router, mut selection) = router();
        assert!(matches!(
            router.process("goodbye", &mut selection),
            RouteResult::Quit
        ));
    }

    #[test]
    fn test_language_switch() {
        let (_dir, mut router, mut selection) = router();
        match router.process("switch to french", &mut selection) {
            RouteResult::Answer(text) => assert!(text.contains("fr-FR")),
            other => panic!("Expected Answer, got {:?}", other),
        }
        assert_eq!(router.language(), "fr-FR");

        match router.process("where is the bibliotheque", &mut selection) {
            RouteResult::Answer(text) => assert!(text.contains("Balme Library")),
            other => panic!("Expected Answer, got {:?}", other),
        }
    }

    #[test]
    fn test_selection_claims_input_first() {
        let (_dir, mut router, mut selection) = router();
        selection.set_items(vec![
            SearchHit {
                display: "Balme Library".to_string(),
                value: "Balme Library".to_string(),
                kind: HitKind::Location,
                score: 0.6,
            },
            SearchHit {
                display: "Night Market".to_string(),
                value: "Night Market".to_string(),
                kind: HitKind::Location,
                score: 0.5,
            },
        ]);

        match router.process("two", &mut selection) {
            RouteResult::Answer(text) => assert!(text.contains("Night Market")),
            other => panic!("Expected Answer, got {:?}", other),
        }
        assert!(!selection.is_active());
    }
}
