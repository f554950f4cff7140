//! Prediction and history operations behind the HTTP handlers

use chrono::Local;
use pulsar_common::db::DiagnosisHistoryEntry;
use pulsar_common::{Error, Result};
use std::sync::Arc;
use tracing::{info, warn};

use crate::analysis::{self, Prediction};
use crate::warmup::{ModelCache, StoreHandle};

/// Shared handles for the analysis pipeline; cheap to clone
#[derive(Debug, Clone)]
pub struct DiagnosisEngine {
    store: Arc<StoreHandle>,
    models: Arc<ModelCache>,
}

impl DiagnosisEngine {
    pub fn new(store: Arc<StoreHandle>, models: Arc<ModelCache>) -> Self {
        Self { store, models }
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    pub fn models(&self) -> &ModelCache {
        &self.models
    }

    /// Run the full pipeline and record the result
    ///
    /// Undecodable bytes yield [`Prediction::degraded`], which is recorded
    /// too. Only storage faults (or a panicked analysis task) are errors.
    pub async fn predict(&self, bytes: Vec<u8>, filename: Option<&str>) -> Result<Prediction> {
        let roster = self.models.get().roster();

        let analyzed = tokio::task::spawn_blocking(move || analysis::analyze(&bytes, &roster))
            .await
            .map_err(|e| Error::Internal(format!("Analysis task failed: {}", e)))?;

        let store = self.store.get().await?;

        let prediction = match analyzed {
            Ok(analysis) => {
                let knowledge = store.lookup_knowledge(analysis.condition()).await?;
                if knowledge.is_none() {
                    info!(condition = analysis.condition(), "No knowledge record; using fallback report");
                }

                let fingerprint = analysis.fingerprint.to_hex();
                info!(
                    modality = %analysis.modality,
                    condition = analysis.condition(),
                    confidence = analysis.assessment.confidence(),
                    fingerprint = &fingerprint[..12],
                    "Analysis complete"
                );
                Prediction::from_analysis(&analysis, knowledge.as_ref(), Local::now())
            }
            Err(e) => {
                warn!(filename = filename.unwrap_or("<unnamed>"), "Returning degraded result: {}", e);
                Prediction::degraded()
            }
        };

        let id = store.record_diagnosis(&prediction.to_history_entry(filename)).await?;
        info!(id, "Diagnosis recorded");

        Ok(prediction)
    }

    /// Most recent history entries, newest first
    pub async fn history(&self, limit: i64) -> Result<Vec<DiagnosisHistoryEntry>> {
        self.store.get().await?.recent_history(limit).await
    }
}
