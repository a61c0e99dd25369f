//! Record source interface: where alert rows come from

use crate::error::FetchError;
use crate::models::RawRecord;

/// Shape of the record collection, as seen on the first row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceOverview {
    pub row_count: usize,
    pub property_names: Vec<String>,
}

#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch every current row of the alert collection
    async fn fetch_rows(&self) -> Result<Vec<RawRecord>, FetchError>;

    /// Row count plus the property names of the first row, for startup logs
    async fn describe(&self) -> Result<SourceOverview, FetchError> {
        let rows = self.fetch_rows().await?;
        let property_names = rows
            .first()
            .map(|row| row.properties.keys().cloned().collect())
            .unwrap_or_default();
        Ok(SourceOverview {
            row_count: rows.len(),
            property_names,
        })
    }
}
