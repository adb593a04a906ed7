//! Catalog Cache
//!
//! Local snapshot of the backend's catalog tables so search keeps working
//! between syncs and off-network. The backend owns the data; this store
//! only ever holds a full replaceable copy.

use crate::error::GuideResult;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medicine {
    pub id: i64,
    pub name: String,
    pub generic_name: String,
    pub category: String,
    pub requires_prescription: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pharmacy {
    pub id: i64,
    pub name: String,
    pub location_id: i64,
    pub phone: String,
    pub opening_hours: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub pharmacy_id: i64,
    pub medicine_id: i64,
    pub quantity: i64,
    pub price: f64,
    pub updated_at: String,
}

/// Full catalog state as fetched from the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub locations: Vec<Location>,
    pub medicines: Vec<Medicine>,
    pub pharmacies: Vec<Pharmacy>,
    pub inventory: Vec<InventoryEntry>,
}

/// One pharmacy's stock line for a medicine
#[derive(Debug, Clone)]
pub struct StockEntry {
    pub pharmacy_name: String,
    pub quantity: i64,
    pub price: f64,
    pub updated_at: String,
}

pub struct Catalog {
    db_path: PathBuf,
}

impl Catalog {
    pub fn new(db_path: PathBuf) -> GuideResult<Self> {
        let catalog = Self { db_path };
        catalog.init_db()?;
        Ok(catalog)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn init_db(&self) -> GuideResult<()> {
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS locations (
                id INTEGER PRIMARY KEY,
                name TEXT UNIQUE,
                category TEXT,
                description TEXT,
                latitude REAL,
                longitude REAL
            )",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS medicines (
                id INTEGER PRIMARY KEY,
                name TEXT UNIQUE,
                generic_name TEXT,
                category TEXT,
                requires_prescription INTEGER
            )",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS pharmacies (
                id INTEGER PRIMARY KEY,
                name TEXT UNIQUE,
                location_id INTEGER,
                phone TEXT,
                opening_hours TEXT
            )",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS inventory (
                pharmacy_id INTEGER,
                medicine_id INTEGER,
                quantity INTEGER,
                price REAL,
                updated_at TEXT,
                PRIMARY KEY (pharmacy_id, medicine_id)
            )",
            [],
        )?;
        Ok(())
    }

    /// Replace the whole cache with a fresh backend snapshot
    pub fn replace_snapshot(&self, snapshot: &CatalogSnapshot) -> GuideResult<()> {
        let mut conn = Connection::open(&self.db_path)?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM locations", [])?;
        tx.execute("DELETE FROM medicines", [])?;
        tx.execute("DELETE FROM pharmacies", [])?;
        tx.execute("DELETE FROM inventory", [])?;

        for loc in &snapshot.locations {
            tx.execute(
                "INSERT OR REPLACE INTO locations (id, name, category, description, latitude, longitude)
                 VALUES (?, ?, ?, ?, ?, ?)",
                (
                    loc.id,
                    &loc.name,
                    &loc.category,
                    &loc.description,
                    loc.latitude,
                    loc.longitude,
                ),
            )?;
        }
        for med in &snapshot.medicines {
            tx.execute(
                "INSERT OR REPLACE INTO medicines (id, name, generic_name, category, requires_prescription)
                 VALUES (?, ?, ?, ?, ?)",
                (
                    med.id,
                    &med.name,
                    &med.generic_name,
                    &med.category,
                    med.requires_prescription as i64,
                ),
            )?;
        }
        for pharmacy in &snapshot.pharmacies {
            tx.execute(
                "INSERT OR REPLACE INTO pharmacies (id, name, location_id, phone, opening_hours)
                 VALUES (?, ?, ?, ?, ?)",
                (
                    pharmacy.id,
                    &pharmacy.name,
                    pharmacy.location_id,
                    &pharmacy.phone,
                    &pharmacy.opening_hours,
                ),
            )?;
        }
        for entry in &snapshot.inventory {
            tx.execute(
                "INSERT OR REPLACE INTO inventory (pharmacy_id, medicine_id, quantity, price, updated_at)
                 VALUES (?, ?, ?, ?, ?)",
                (
                    entry.pharmacy_id,
                    entry.medicine_id,
                    entry.quantity,
                    entry.price,
                    &entry.updated_at,
                ),
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// All location names, for the fuzzy matcher's candidate list
    pub fn location_names(&self) -> GuideResult<Vec<String>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare("SELECT name FROM locations ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }
        Ok(names)
    }

    /// All medicine names plus generic names, for the fuzzy matcher
    pub fn medicine_names(&self) -> GuideResult<Vec<String>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt =
            conn.prepare("SELECT name, generic_name FROM medicines ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut names = Vec::new();
        for row in rows {
            let (name, generic) = row?;
            names.push(name);
            if !generic.is_empty() && !names.contains(&generic) {
                names.push(generic);
            }
        }
        Ok(names)
    }

    pub fn search_locations(&self, query: &str) -> GuideResult<Vec<Location>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT id, name, category, description, latitude, longitude
             FROM locations
             WHERE name LIKE ? OR description LIKE ? OR category LIKE ?",
        )?;
        let q = format!("%{}%", query);
        let rows = stmt.query_map([&q, &q, &q], |row| {
            Ok(Location {
                id: row.get(0)?,
                name: row.get(1)?,
                category: row.get(2)?,
                description: row.get(3)?,
                latitude: row.get(4)?,
                longitude: row.get(5)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn search_medicines(&self, query: &str) -> GuideResult<Vec<Medicine>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT id, name, generic_name, category, requires_prescription
             FROM medicines
             WHERE name LIKE ? OR generic_name LIKE ? OR category LIKE ?",
        )?;
        let q = format!("%{}%", query);
        let rows = stmt.query_map([&q, &q, &q], |row| {
            Ok(Medicine {
                id: row.get(0)?,
                name: row.get(1)?,
                generic_name: row.get(2)?,
                category: row.get(3)?,
                requires_prescription: row.get::<_, i64>(4)? != 0,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn get_location(&self, name: &str) -> GuideResult<Option<Location>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT id, name, category, description, latitude, longitude
             FROM locations WHERE name = ? LIMIT 1",
        )?;
        let mut rows = stmt.query_map([name], |row| {
            Ok(Location {
                id: row.get(0)?,
                name: row.get(1)?,
                category: row.get(2)?,
                description: row.get(3)?,
                latitude: row.get(4)?,
                longitude: row.get(5)?,
            })
        })?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Look up a medicine by its brand or generic name (case-insensitive)
    pub fn get_medicine(&self, name: &str) -> GuideResult<Option<Medicine>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT id, name, generic_name, category, requires_prescription
             FROM medicines
             WHERE name = ? COLLATE NOCASE OR generic_name = ? COLLATE NOCASE
             LIMIT 1",
        )?;
        let mut rows = stmt.query_map([name, name], |row| {
            Ok(Medicine {
                id: row.get(0)?,
                name: row.get(1)?,
                generic_name: row.get(2)?,
                category: row.get(3)?,
                requires_prescription: row.get::<_, i64>(4)? != 0,
            })
        })?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn get_medicine_by_id(&self, id: i64) -> GuideResult<Option<Medicine>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT id, name, generic_name, category, requires_prescription
             FROM medicines WHERE id = ? LIMIT 1",
        )?;
        let mut rows = stmt.query_map([id], |row| {
            Ok(Medicine {
                id: row.get(0)?,
                name: row.get(1)?,
                generic_name: row.get(2)?,
                category: row.get(3)?,
                requires_prescription: row.get::<_, i64>(4)? != 0,
            })
        })?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Which pharmacies stock a medicine, with quantity and freshness
    pub fn pharmacies_with_medicine(&self, medicine_id: i64) -> GuideResult<Vec<StockEntry>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT p.name, i.quantity, i.price, i.updated_at
             FROM inventory i
             JOIN pharmacies p ON p.id = i.pharmacy_id
             WHERE i.medicine_id = ? AND i.quantity > 0
             ORDER BY i.quantity DESC",
        )?;
        let rows = stmt.query_map([medicine_id], |row| {
            Ok(StockEntry {
                pharmacy_name: row.get(0)?,
                quantity: row.get(1)?,
                price: row.get(2)?,
                updated_at: row.get(3)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn location_exists(&self, name: &str) -> bool {
        if let Ok(conn) = Connection::open(&self.db_path) {
            let stmt = conn
                .prepare("SELECT 1 FROM locations WHERE name = ? LIMIT 1")
                .ok();
            stmt.map(|mut s| s.exists([name]).unwrap_or(false))
                .unwrap_or(false)
        } else {
            false
        }
    }

    pub fn medicine_exists(&self, name: &str) -> bool {
        if let Ok(conn) = Connection::open(&self.db_path) {
            let stmt = conn
                .prepare(
                    "SELECT 1 FROM medicines
                     WHERE name = ? COLLATE NOCASE OR generic_name = ? COLLATE NOCASE
                     LIMIT 1",
                )
                .ok();
            stmt.map(|mut s| s.exists([name, name]).unwrap_or(false))
                .unwrap_or(false)
        } else {
            false
        }
    }

    /// Row counts per table, logged after a sync
    pub fn counts(&self) -> GuideResult<(usize, usize, usize, usize)> {
        let conn = Connection::open(&self.db_path)?;
        let count = |table: &str| -> rusqlite::Result<usize> {
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get::<_, i64>(0).map(|n| n as usize)
            })
        };
        Ok((
            count("locations")?,
            count("medicines")?,
            count("pharmacies")?,
            count("inventory")?,
        ))
    }
}

/// Small fixture snapshot shared by unit tests across the crate
#[cfg(test)]
pub(crate) fn sample_snapshot() -> CatalogSnapshot {
    CatalogSnapshot {
        locations: vec![
            Location {
                id: 1,
                name: "Balme Library".to_string(),
                category: "library".to_string(),
                description: "Main university library".to_string(),
                latitude: 5.6505,
                longitude: -0.1962,
            },
            Location {
                id: 2,
                name: "Night Market".to_string(),
                category: "dining".to_string(),
                description: "Evening food stalls".to_string(),
                latitude: 5.6477,
                longitude: -0.1874,
            },
        ],
        medicines: vec![
            Medicine {
                id: 1,
                name: "Panadol".to_string(),
                generic_name: "Paracetamol".to_string(),
                category: "analgesic".to_string(),
                requires_prescription: false,
            },
            Medicine {
                id: 2,
                name: "Amoxil".to_string(),
                generic_name: "Amoxicillin".to_string(),
                category: "antibiotic".to_string(),
                requires_prescription: true,
            },
        ],
        pharmacies: vec![Pharmacy {
            id: 1,
            name: "Legon Pharmacy".to_string(),
            location_id: 1,
            phone: "+233200000000".to_string(),
            opening_hours: "08:00-20:00".to_string(),
        }],
        inventory: vec![InventoryEntry {
            pharmacy_id: 1,
            medicine_id: 1,
            quantity: 40,
            price: 12.5,
            updated_at: "2025-11-02T09:00:00Z".to_string(),
        }],
    }
}
