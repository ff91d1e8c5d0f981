use applyflow::config::{StorageBackend, StorageConfig};
use applyflow::error::AppError;
use applyflow::workflows::catalog::CatalogImporter;
use applyflow::workflows::journey::{
    InMemoryCatalog, InMemoryJourneyStore, JourneyService, SystemClock,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type MemoryJourneyService = JourneyService<InMemoryJourneyStore, InMemoryCatalog>;

/// Wire the journey service to the configured store and catalogue.
pub(crate) fn build_journey_service(
    storage: &StorageConfig,
) -> Result<Arc<MemoryJourneyService>, AppError> {
    let catalog = CatalogImporter::load_catalog(storage.catalog_csv.as_deref())?;
    let source = storage
        .catalog_csv
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "bundled seed".to_string());
    info!(universities = catalog.len(), %source, "university catalogue loaded");

    let store = match storage.backend {
        StorageBackend::Memory => Arc::new(InMemoryJourneyStore::new()),
    };

    Ok(Arc::new(JourneyService::new(
        store,
        Arc::new(catalog),
        Arc::new(SystemClock),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use applyflow::workflows::journey::{UniversityCatalog, UniversityId};

    #[test]
    fn seed_catalogue_backs_the_default_service() {
        let storage = StorageConfig {
            backend: StorageBackend::Memory,
            catalog_csv: None,
        };
        let service = build_journey_service(&storage).expect("service builds");
        let university = service
            .catalog()
            .fetch(UniversityId(1))
            .expect("catalogue readable")
            .expect("seeded university");
        assert_eq!(university.name, "Massachusetts Institute of Technology");
    }

    #[test]
    fn missing_catalogue_file_is_reported() {
        let storage = StorageConfig {
            backend: StorageBackend::Memory,
            catalog_csv: Some("./no-such-catalogue.csv".into()),
        };
        match build_journey_service(&storage) {
            Err(AppError::Catalog(_)) => {}
            Err(other) => panic!("expected catalogue error, got {other}"),
            Ok(_) => panic!("expected catalogue error"),
        }
    }
}
