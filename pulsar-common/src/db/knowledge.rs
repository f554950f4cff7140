//! Clinical knowledge base: seed content and lookups

use crate::db::{DiagnosisStore, KnowledgeRecord};
use crate::Result;
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Seed rows: (condition, base observations, patient explanation, recommendation)
pub const SEED_KNOWLEDGE: [(&str, &str, &str, &str); 7] = [
    (
        "Normal",
        "No focal consolidation, pneumothorax, or pleural effusion. Cardiac silhouette is within normal limits. Symmetrical patterns observed.",
        "The scan shows no signs of disease or injury. Everything appears healthy and functioning normally.",
        "Follow-up as per standard clinical screening guidelines.",
    ),
    (
        "Pneumonia",
        "Increased opacification/consolidation identified. Patchy infiltrates suggestive of inflammatory process.",
        "There are signs of an infection in the lungs, which may cause difficulty breathing or coughing.",
        "Correlation with clinical symptoms (fever, cough). Antibiotic therapy as indicated. Follow-up imaging in 4-6 weeks.",
    ),
    (
        "Tumor",
        "Well-defined focal mass lesion with signal intensity variation. Mass effect on adjacent structures noted.",
        "A persistent growth or mass has been detected that requires further investigation to determine its nature.",
        "Contrast-enhanced MRI for characterization. Biopsy/Neurological consultation required.",
    ),
    (
        "Fracture",
        "Disruption of cortical continuity and trabecular misalignment. Associated soft tissue swelling.",
        "A break or crack has been detected in the bone structure, likely due to recent injury.",
        "Immobilization/Splinting. Orthopedic consultation. Surgical evaluation if displaced.",
    ),
    (
        "Stroke",
        "Area of restricted diffusion/ischemic change. Cytotoxic edema observed in the vascular territory.",
        "Areas of the brain are showing reduced blood flow, which requires immediate medical attention.",
        "Emergency neurological management. Assessment for thrombolytic eligibility. Stroke unit admission.",
    ),
    (
        "Cardiomegaly",
        "Transverse diameter of the heart exceeds 50% of the internal thoracic diameter. Prominent cardiac silhouette.",
        "The heart appears larger than normal, which can sometimes be a sign of underlying heart conditions.",
        "Clinical correlation for congestive heart failure. Echocardiography recommended.",
    ),
    (
        "Pneumothorax",
        "Visible visceral pleural line with absence of peripheral lung markings. Hyperlucent area.",
        "There is air trapped outside the lung, causing it to partially collapse.",
        "Urgent clinical assessment. Consideration for chest tube insertion if significant or symptomatic.",
    ),
];

/// Seed the knowledge base when it is empty
///
/// A non-empty table is left untouched, even if it holds other rows.
pub async fn seed_knowledge_base(pool: &SqlitePool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clinical_knowledge")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        debug!("Clinical knowledge base already holds {} records", count);
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for (condition, observations, explanation, recommendation) in SEED_KNOWLEDGE {
        // OR IGNORE: a concurrent initializer may have seeded in between
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO clinical_knowledge
                (condition, base_observations, patient_explanation, standard_recommendation)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(condition)
        .bind(observations)
        .bind(explanation)
        .bind(recommendation)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    info!("Seeded clinical knowledge base with {} conditions", SEED_KNOWLEDGE.len());
    Ok(())
}

impl DiagnosisStore {
    /// Look up the knowledge record for a condition
    ///
    /// `Ok(None)` is the normal answer for conditions outside the seeded set.
    pub async fn lookup_knowledge(&self, condition: &str) -> Result<Option<KnowledgeRecord>> {
        let record = sqlx::query_as::<_, KnowledgeRecord>(
            r#"
            SELECT condition, base_observations, patient_explanation, standard_recommendation
            FROM clinical_knowledge
            WHERE condition = ?
            "#,
        )
        .bind(condition)
        .fetch_optional(self.pool())
        .await?;

        Ok(record)
    }

    /// Number of records in the knowledge base
    pub async fn knowledge_count(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM clinical_knowledge")
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }
}
