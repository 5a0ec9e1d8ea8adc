//! Backend trait and implementations for the three dashboard services.

pub mod http;
pub mod mock;

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

use crate::{CoreError, CorrectionDataset, Service, TitleNumber, TitleRecord};

/// Boxed future returned by every [`DashboardBackend`] call.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CoreError>> + Send + 'a>>;

/// Remote services behind the dashboard.
pub trait DashboardBackend: Send + Sync {
    /// Fetch the title registry.
    fn list_titles(&self) -> BackendFuture<'_, Vec<TitleRecord>>;

    /// Ask the acquisition service to produce data for a title.
    fn acquire(&self, number: TitleNumber) -> BackendFuture<'_, ()>;

    /// Fetch the correction dataset of a title.
    fn corrections(&self, number: TitleNumber) -> BackendFuture<'_, CorrectionDataset>;
}

#[derive(Debug, Deserialize)]
struct TitlesPayload {
    titles: Vec<TitleRecord>,
}

/// Decode a registry payload. Duplicate title numbers are rejected.
pub fn decode_titles(body: &[u8]) -> Result<Vec<TitleRecord>, CoreError> {
    let payload: TitlesPayload = serde_json::from_slice(body)
        .map_err(|e| CoreError::schema(Service::Registry, e.to_string()))?;

    let mut seen = HashSet::with_capacity(payload.titles.len());
    for title in &payload.titles {
        if !seen.insert(title.number) {
            return Err(CoreError::schema(
                Service::Registry,
                format!("duplicate title number {}", title.number),
            ));
        }
    }
    Ok(payload.titles)
}
