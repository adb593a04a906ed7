//! Language Tables
//!
//! Per-language alias dictionaries mapping canonical catalog names to the
//! phrases students actually say or type. Tables are static configuration
//! data, built once at process start and never mutated afterwards.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// Language every table set ultimately falls back to
pub const BASE_LANGUAGE: &str = "en-US";

/// A canonical entity name with its ordered alias phrases
#[derive(Debug, Clone)]
pub struct EntityAliases {
    pub canonical: String,
    pub aliases: Vec<String>,
}

/// Ordered alias entries for one language.
///
/// Entries keep declaration order so score ties resolve deterministically.
#[derive(Debug, Clone, Default)]
pub struct LanguageTable {
    entries: Vec<EntityAliases>,
}

impl LanguageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity with its alias phrases
    pub fn push(&mut self, canonical: &str, aliases: &[&str]) {
        self.entries.push(EntityAliases {
            canonical: canonical.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        });
    }

    pub fn entries(&self) -> &[EntityAliases] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Alias tables for a set of languages with fallback resolution
#[derive(Debug, Clone)]
pub struct Translations {
    tables: HashMap<String, LanguageTable>,
    default_language: String,
}

impl Translations {
    pub fn new(default_language: &str) -> Self {
        Self {
            tables: HashMap::new(),
            default_language: default_language.to_string(),
        }
    }

    pub fn insert(&mut self, language: &str, table: LanguageTable) {
        self.tables.insert(language.to_string(), table);
    }

    /// Resolve the table for a language code.
    ///
    /// Falls back to the configured default language, then to
    /// [`BASE_LANGUAGE`], when the requested code has no table.
    pub fn resolve(&self, language: &str) -> Option<&LanguageTable> {
        self.tables
            .get(language)
            .or_else(|| self.tables.get(&self.default_language))
            .or_else(|| self.tables.get(BASE_LANGUAGE))
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn supports(&self, language: &str) -> bool {
        self.tables.contains_key(language)
    }
}

/// Campus location tables shipped with the crate
pub fn campus_translations() -> &'static Translations {
    &CAMPUS_TRANSLATIONS
}

/// Medicine-name tables shipped with the crate
pub fn medicine_translations() -> &'static Translations {
    &MEDICINE_TRANSLATIONS
}

lazy_static! {
    static ref CAMPUS_TRANSLATIONS: Translations = build_campus_tables();
    static ref MEDICINE_TRANSLATIONS: Translations = build_medicine_tables();
}

fn build_campus_tables() -> Translations {
    let mut en = LanguageTable::new();
    en.push(
        "Legon Campus",
        &["legon", "main campus", "university of ghana legon"],
    );
    en.push(
        "Korle Bu Campus",
        &["korle bu", "medical campus", "korle bu teaching hospital"],
    );
    en.push("Balme Library", &["balme", "main library", "library"]);
    en.push("Great Hall", &["great hall", "ceremonial hall"]);
    en.push("Night Market", &["night market", "market"]);
    en.push(
        "Legon Hospital",
        &["university hospital", "health centre", "clinic"],
    );
    en.push("Akuafo Hall", &["akuafo"]);
    en.push("Commonwealth Hall", &["commonwealth", "vandal city"]);
    en.push("Volta Hall", &["volta"]);
    en.push(
        "Department of Computer Science",
        &["computer science", "cs department"],
    );
    en.push(
        "University of Ghana Business School",
        &["business school", "ugbs"],
    );
    en.push(
        "Central Cafeteria",
        &["cafeteria", "dining hall", "bush canteen"],
    );
    en.push("Campus Pharmacy", &["pharmacy", "drug store", "chemist"]);

    let mut fr = LanguageTable::new();
    fr.push("Legon Campus", &["legon", "campus principal"]);
    fr.push("Korle Bu Campus", &["korle bu", "campus medical"]);
    fr.push(
        "Balme Library",
        &["bibliotheque", "bibliothèque", "bibliothèque balme"],
    );
    fr.push("Great Hall", &["grande salle"]);
    fr.push("Night Market", &["marche de nuit", "marché de nuit"]);
    fr.push("Legon Hospital", &["hopital", "hôpital universitaire"]);
    fr.push("Central Cafeteria", &["cantine", "cafétéria"]);
    fr.push("Campus Pharmacy", &["pharmacie"]);

    // Twi aliases cover the handful of places students name in Twi
    let mut tw = LanguageTable::new();
    tw.push("Balme Library", &["nwomakorabea"]);
    tw.push("Night Market", &["anadwo gua", "gua"]);
    tw.push("Legon Hospital", &["ayaresabea"]);
    tw.push("Campus Pharmacy", &["aduro dan", "aduro"]);

    let mut translations = Translations::new(BASE_LANGUAGE);
    translations.insert("en-US", en);
    translations.insert("fr-FR", fr);
    translations.insert("tw-GH", tw);
    translations
}

fn build_medicine_tables() -> Translations {
    let mut en = LanguageTable::new();
    en.push("Paracetamol", &["panadol", "acetaminophen", "tylenol"]);
    en.push("Ibuprofen", &["advil", "brufen"]);
    en.push("Amoxicillin", &["amoxil"]);
    en.push(
        "Artemether Lumefantrine",
        &["coartem", "lonart", "malaria tablets"],
    );
    en.push("Cetirizine", &["zyrtec", "allergy tablets"]);
    en.push("Omeprazole", &["losec"]);
    en.push("Oral Rehydration Salts", &["ors", "rehydration salts"]);
    en.push("Vitamin C", &["ascorbic acid"]);

    let mut fr = LanguageTable::new();
    fr.push("Paracetamol", &["paracétamol", "doliprane"]);
    fr.push("Ibuprofen", &["ibuprofène", "advil"]);
    fr.push("Vitamin C", &["vitamine c"]);

    let mut translations = Translations::new(BASE_LANGUAGE);
    translations.insert("en-US", en);
    translations.insert("fr-FR", fr);
    translations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_exact_language() {
        let translations = campus_translations();
        let table = translations.resolve("fr-FR").expect("fr-FR table");
        assert!(table
            .entries()
            .iter()
            .any(|e| e.aliases.iter().any(|a| a == "bibliotheque")));
    }

    #[test]
    fn test_resolve_falls_back_to_base() {
        let translations = campus_translations();
        let table = translations.resolve("de-DE").expect("fallback table");
        assert!(table.entries().iter().any(|e| e.canonical == "Legon Campus"));
    }

    #[test]
    fn test_resolve_prefers_default_over_base() {
        let mut translations = Translations::new("fr-FR");
        let mut en = LanguageTable::new();
        en.push("Balme Library", &["library"]);
        let mut fr = LanguageTable::new();
        fr.push("Balme Library", &["bibliotheque"]);
        translations.insert("en-US", en);
        translations.insert("fr-FR", fr);

        let table = translations.resolve("es-ES").expect("default table");
        assert_eq!(table.entries()[0].aliases[0], "bibliotheque");
    }

    #[test]
    fn test_resolve_empty_translations() {
        let translations = Translations::new(BASE_LANGUAGE);
        assert!(translations.resolve("en-US").is_none());
    }

    #[test]
    fn test_tables_are_nonempty() {
        assert!(!campus_translations()
            .resolve(BASE_LANGUAGE)
            .expect("base table")
            .is_empty());
        assert!(!medicine_translations()
            .resolve(BASE_LANGUAGE)
            .expect("base table")
            .is_empty());
    }
}
