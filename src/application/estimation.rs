//! EstimationAggregator - concurrent fan-out to estimator personas.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::stage_runner::CompletionSettings;
use crate::domain::estimation::{EstimateRecord, EstimationUnit, TeamEstimation};
use crate::domain::extraction::ResponseExtractor;
use crate::domain::persona::PersonaProfile;
use crate::domain::story::Story;
use crate::ports::CompletionClient;

/// Default cap on simultaneous estimator calls.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Collects estimates from a team and folds them into a consensus.
#[derive(Clone)]
pub struct EstimationAggregator {
    client: Arc<dyn CompletionClient>,
    extractor: Arc<ResponseExtractor>,
    settings: CompletionSettings,
    max_concurrency: usize,
}

impl EstimationAggregator {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        extractor: Arc<ResponseExtractor>,
        settings: CompletionSettings,
        max_concurrency: usize,
    ) -> Self {
        Self {
            client,
            extractor,
            settings,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Asks every persona for an estimate and waits for all of them.
    ///
    /// Calls run concurrently, at most `min(personas, max_concurrency)` at a
    /// time. A failed or unparseable answer becomes a record without an
    /// estimate and never affects the other personas. Records come back in
    /// completion order. The unit and scale are taken from the first persona.
    pub async fn estimate(&self, story: &Story, personas: &[PersonaProfile]) -> TeamEstimation {
        let (unit, scale) = personas
            .first()
            .and_then(PersonaProfile::estimation)
            .unwrap_or((EstimationUnit::PersonDays, None));
        let concurrency = personas.len().clamp(1, self.max_concurrency);

        debug!(
            %unit,
            personas = personas.len(),
            concurrency,
            "Dispatching estimation round"
        );

        // Collected first: a borrowing closure inside the stream loses `Send`.
        let pending: Vec<_> = personas
            .iter()
            .map(|persona| self.estimate_one(story, persona))
            .collect();
        let records: Vec<EstimateRecord> = stream::iter(pending)
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let estimation = TeamEstimation::new(unit, records, scale);
        info!(
            %unit,
            mean = estimation.consensus.mean,
            snapped = ?estimation.consensus.snapped_value,
            contributors = estimation.consensus.contributor_count,
            personas = personas.len(),
            "Team estimation complete"
        );
        estimation
    }

    async fn estimate_one(&self, story: &Story, persona: &PersonaProfile) -> EstimateRecord {
        let (unit, scale) = persona
            .estimation()
            .unwrap_or((EstimationUnit::PersonDays, None));
        let request = self.settings.request_for(persona, story);

        let (raw_estimate, confidence, justification_text) =
            match self.client.complete(request).await {
                Ok(response) => {
                    let estimate = self.extractor.extract_numeric_field(
                        &response.text,
                        unit.field_label(),
                        scale.map(|s| s.values()),
                    );
                    if estimate.is_none() {
                        debug!(persona = %persona.name, "No usable estimate in answer");
                    }
                    let confidence = self.extractor.extract_confidence(&response.text);
                    (estimate, confidence, response.text)
                }
                Err(err) => {
                    warn!(persona = %persona.name, error = %err, "Estimate request failed");
                    (None, None, format!("Estimate request failed: {}", err))
                }
            };

        EstimateRecord {
            persona_name: persona.name.clone(),
            role_title: persona.role_title.clone(),
            experience_years: persona.experience_years,
            raw_estimate,
            confidence,
            justification_text,
        }
    }
}
