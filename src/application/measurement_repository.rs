// Repository trait for measurement table access
use crate::domain::measurement::MeasurementTable;
use async_trait::async_trait;

#[async_trait]
pub trait MeasurementRepository: Send + Sync {
    /// Load the full measurement table.
    /// Sources that cannot be read produce an empty table rather than an error.
    async fn load_table(&self) -> MeasurementTable;
}
