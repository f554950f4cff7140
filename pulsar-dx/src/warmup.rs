//! Process-wide handles initialized once, in the background or on first use
//!
//! Startup spawns [`spawn_warm_up`] and starts serving immediately. A request
//! that arrives first simply performs the initialization itself; the
//! once-cells guarantee only one initializer runs and every other caller
//! waits for its result.

use pulsar_common::{DiagnosisStore, Result};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Instant;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::engine::DiagnosisEngine;

/// Names of the simulated ensemble members, in breakdown order
pub const ENSEMBLE_ROSTER: [&str; 3] = ["ResNet50", "DenseNet121", "VGG16"];

/// Lazily opened diagnosis database
///
/// A failed open leaves the cell empty, so the next caller retries.
#[derive(Debug)]
pub struct StoreHandle {
    db_path: PathBuf,
    store: OnceCell<DiagnosisStore>,
}

impl StoreHandle {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path,
            store: OnceCell::new(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// The store, opening and initializing it on first call
    pub async fn get(&self) -> Result<&DiagnosisStore> {
        self.store
            .get_or_try_init(|| async {
                info!("Initializing diagnosis store: {}", self.db_path.display());
                DiagnosisStore::open(&self.db_path).await
            })
            .await
    }

    #[cfg(test)]
    fn is_initialized(&self) -> bool {
        self.store.initialized()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSlot {
    pub name: &'static str,
    /// Trained weights file. No weights are shipped, so this is always
    /// `None` and member outputs are derived from the fingerprint.
    pub weights: Option<PathBuf>,
}

/// Loaded ensemble members
#[derive(Debug, Clone)]
pub struct EnsembleModels {
    slots: Vec<ModelSlot>,
}

impl EnsembleModels {
    fn load() -> Self {
        let slots = ENSEMBLE_ROSTER
            .iter()
            .map(|&name| ModelSlot {
                name,
                weights: None,
            })
            .collect();
        Self { slots }
    }

    #[cfg(test)]
    fn slots(&self) -> &[ModelSlot] {
        &self.slots
    }

    /// Member names in breakdown order
    pub fn roster(&self) -> Vec<&'static str> {
        self.slots.iter().map(|slot| slot.name).collect()
    }
}

/// Model handles, loaded at most once per process
#[derive(Debug, Default)]
pub struct ModelCache {
    models: OnceLock<EnsembleModels>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> &EnsembleModels {
        self.models.get_or_init(|| {
            let models = EnsembleModels::load();
            info!("Ensemble ready: {:?}", models.roster());
            models
        })
    }

    #[cfg(test)]
    fn is_loaded(&self) -> bool {
        self.models.get().is_some()
    }
}

/// Prime the model cache and the store without blocking startup
///
/// Errors are logged only; the next request retries the store.
pub fn spawn_warm_up(engine: DiagnosisEngine) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Background warm-up: loading ensemble and knowledge base");
        let started = Instant::now();

        engine.models().get();

        match engine.store().get().await {
            Ok(store) => match store.knowledge_count().await {
                Ok(count) => info!(
                    "Background warm-up complete in {:?} ({} knowledge records)",
                    started.elapsed(),
                    count
                ),
                Err(e) => error!("Background warm-up: knowledge base unreadable: {}", e),
            },
            Err(e) => error!(
                "Background warm-up failed to open {}: {}",
                engine.store().db_path().display(),
                e
            ),
        }
    })
}
