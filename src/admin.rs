//! Operator Back Office
//!
//! Mutations pharmacy operators and campus admins perform against the
//! hosted backend: catalog upserts and inventory updates. Every mutation
//! is audited; audit failures never abort the mutation itself.

use crate::audit;
use crate::backend::BackendClient;
use crate::catalog::{InventoryEntry, Location, Medicine};
use crate::error::GuideResult;
use tracing::{info, warn};

pub struct AdminOps {
    backend: BackendClient,
    operator: String,
}

impl AdminOps {
    pub fn new(backend: BackendClient, operator: &str) -> Self {
        Self {
            backend,
            operator: operator.to_string(),
        }
    }

    fn audit(&self, action: &str) {
        if let Err(e) = audit::log_operator_action(&self.operator, action) {
            warn!("Audit log write failed: {}", e);
        }
    }

    pub async fn upsert_location(&self, location: &Location) -> GuideResult<()> {
        self.backend.upsert_location(location).await?;
        info!("📝 Location upserted: {}", location.name);
        self.audit(&format!("upsert location '{}'", location.name));
        Ok(())
    }

    pub async fn upsert_medicine(&self, medicine: &Medicine) -> GuideResult<()> {
        self.backend.upsert_medicine(medicine).await?;
        info!("📝 Medicine upserted: {}", medicine.name);
        self.audit(&format!("upsert medicine '{}'", medicine.name));
        Ok(())
    }

    /// Set a pharmacy's stock line for one medicine
    pub async fn set_inventory(&self, entry: &InventoryEntry) -> GuideResult<()> {
        self.backend.set_inventory(entry).await?;
        info!(
            "📝 Inventory set: pharmacy {} medicine {} -> {}",
            entry.pharmacy_id, entry.medicine_id, entry.quantity
        );
        self.audit(&format!(
            "set inventory pharmacy={} medicine={} quantity={} price={:.2}",
            entry.pharmacy_id, entry.medicine_id, entry.quantity, entry.price
        ));
        Ok(())
    }

    /// Mark a medicine out of stock everywhere it is carried
    pub async fn clear_stock(&self, pharmacy_id: i64, medicine_id: i64) -> GuideResult<()> {
        let entry = InventoryEntry {
            pharmacy_id,
            medicine_id,
            quantity: 0,
            price: 0.0,
            updated_at: chrono::Utc::now().to_rfc3339(),
        };
        self.set_inventory(&entry).await
    }
}
