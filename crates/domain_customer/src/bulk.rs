//! Bulk import/export engine
//!
//! Drives spreadsheet rows through the `CustomerStore` port in fixed-size
//! batches. Import tolerates row-level failures (logged and skipped);
//! update is all-or-nothing; the template export is a header row plus one
//! lossy row per existing customer.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::customer::Customer;
use crate::error::CustomerError;
use crate::ports::CustomerStore;
use crate::workbook;

/// Rows processed per batch to bound memory on large files
pub const IMPORT_BATCH_SIZE: usize = 1000;

/// Spreadsheet-driven bulk operations over a customer store
pub struct BulkTransferService {
    store: Arc<dyn CustomerStore>,
}

impl BulkTransferService {
    pub fn new(store: Arc<dyn CustomerStore>) -> Self {
        Self { store }
    }

    /// Imports customers from an xlsx workbook
    ///
    /// Rows are processed in batches of [`IMPORT_BATCH_SIZE`]. A row that
    /// fails validation or hits a uniqueness conflict is logged and
    /// skipped; a row whose NIC already exists is silently skipped. Only
    /// storage-level failures abort the import.
    pub async fn import(&self, data: &[u8]) -> Result<Vec<Customer>, CustomerError> {
        let rows = workbook::parse_import_rows(data)?;
        let total = rows.len();
        let mut created = Vec::new();
        let mut skipped = 0usize;

        for batch in rows.chunks(IMPORT_BATCH_SIZE) {
            for parsed in batch {
                let row = match &parsed.result {
                    Ok(row) => row,
                    Err(error) => {
                        warn!(row = parsed.number, %error, "skipping unparseable row");
                        skipped += 1;
                        continue;
                    }
                };

                if self.store.nic_exists(&row.nic_number).await? {
                    debug!(
                        row = parsed.number,
                        nic = %row.nic_number,
                        "NIC already exists, skipping row"
                    );
                    skipped += 1;
                    continue;
                }

                match self.store.create(row.clone().into_request()).await {
                    Ok(customer) => created.push(customer),
                    Err(error) if error.is_row_level() => {
                        warn!(row = parsed.number, %error, "skipping rejected row");
                        skipped += 1;
                    }
                    Err(error) => return Err(error),
                }
            }
        }

        info!(total, created = created.len(), skipped, "bulk import finished");
        Ok(created)
    }

    /// Applies name/date-of-birth updates from an xlsx workbook
    ///
    /// Every row must match an existing customer by NIC (column 2); the
    /// first unmatched row fails the whole operation. No other fields are
    /// touched.
    pub async fn update(&self, data: &[u8]) -> Result<Vec<Customer>, CustomerError> {
        let updates = workbook::parse_identity_rows(data)?;
        info!(rows = updates.len(), "applying bulk update");
        self.store.update_identities(&updates).await
    }

    /// Generates the template workbook pre-populated from existing customers
    pub async fn template(&self) -> Result<Vec<u8>, CustomerError> {
        let customers = self.store.list_all().await?;
        workbook::write_template(&customers)
    }
}
