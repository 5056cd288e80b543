use crate::errors::RecallResult;
use crate::models::Record;

/// Materializes full records after ranking.
pub trait IRecordStore: Send + Sync {
    fn get(&self, id: &str) -> RecallResult<Option<Record>>;

    /// Fetch many records. Missing ids are omitted; order is unspecified.
    fn get_bulk(&self, ids: &[String]) -> RecallResult<Vec<Record>> {
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(record) = self.get(id)? {
                records.push(record);
            }
        }
        Ok(records)
    }
}
