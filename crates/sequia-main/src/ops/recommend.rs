// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Sequia.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! RecommendActions: build the context, evaluate the full rule bank,
//! parameterize the surviving action codes and persist the instances.

use super::{Ops, OpsError};
use sequia_adapters::OpenAiClient;
use sequia_core::catalog::ActionCatalog;
use sequia_core::context::{ContextBuilder, ExternalSignals};
use sequia_core::heuristics::HeuristicRegistry;
use sequia_core::parameterize::{CompletionProvider, Parameterizer};
use sequia_store::NewActionInstance;
use sequia_types::{ActionInstance, Context, Profile};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const OP: &str = "RecommendActions";

/// Overall wall-clock budget for the LLM portion of one request; past it
/// the remaining actions are parameterized by fallback.
const PARAMETERIZE_DEADLINE: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Serialize)]
pub struct ActivatedRule {
    pub rule_id: String,
    pub tag: String,
    pub priority: f64,
    pub actions_count: usize,
}

#[derive(Debug)]
pub struct Recommendation {
    pub context: Context,
    pub activated_rules: Vec<ActivatedRule>,
    pub actions: Vec<ActionInstance>,
}

pub async fn recommend_actions(
    ops: &Ops,
    zone_slug: &str,
    profile: Profile,
) -> Result<Recommendation, OpsError> {
    let zone = ops.require_zone(OP, zone_slug)?;
    let daily = ops.load_precipitation(OP, &zone)?;

    let context = ContextBuilder::new(&zone.slug, profile)
        .with_magnitude_cache(Arc::clone(&ops.magnitude_cache))
        .build(&daily, &ExternalSignals::default());

    let registry = HeuristicRegistry::new();
    let activations = registry.evaluate_all(&context);
    let recommended = registry.recommended_actions(&activations);
    if recommended.is_empty() {
        info!(zone = %zone.slug, "no heuristic activated");
        return Ok(Recommendation {
            context,
            activated_rules: Vec::new(),
            actions: Vec::new(),
        });
    }

    let catalog = ActionCatalog::global();
    let mut requests = Vec::with_capacity(recommended.len());
    let mut metadata = Vec::with_capacity(recommended.len());
    for rec in &recommended {
        let Some(archetype) = catalog.get(rec.action_code) else {
            warn!(code = rec.action_code, "recommended action missing from catalog");
            continue;
        };
        requests.push((archetype, rec.default_parameters.clone()));
        metadata.push(rec);
    }

    let completion: Option<Arc<dyn CompletionProvider>> = OpenAiClient::from_config(&ops.config)
        .map(|c| Arc::new(c) as Arc<dyn CompletionProvider>);
    let parameterizer = Parameterizer::new(completion);
    let parameterized = parameterizer
        .parameterize_batch(
            &context,
            &requests,
            Some(Instant::now() + PARAMETERIZE_DEADLINE),
        )
        .await;

    let new_instances: Vec<NewActionInstance> = parameterized
        .iter()
        .zip(&metadata)
        .map(|(p, rec)| NewActionInstance {
            archetype_code: p.action_code.clone(),
            parameters: p.parameters.clone(),
            justification: if p.justification.is_empty() {
                rec.justification.clone()
            } else {
                p.justification.clone()
            },
            expected_effect: p.expected_effect.clone(),
            priority_score: rec.priority,
            method: p.method,
        })
        .collect();

    let ids = sequia_store::with_retry("insert_action_instances", || {
        ops.db
            .insert_action_instances(zone.id, profile, &new_instances)
    })
    .map_err(|e| OpsError::storage(OP, &e))?;
    let actions = ops
        .db
        .get_action_instances(&ids)
        .map_err(|e| OpsError::storage(OP, &e))?;

    info!(
        zone = %zone.slug,
        rules = activations.len(),
        actions = actions.len(),
        "recommendations persisted"
    );

    Ok(Recommendation {
        context,
        activated_rules: activations
            .iter()
            .map(|a| ActivatedRule {
                rule_id: a.rule_id.to_owned(),
                tag: a.tag.to_owned(),
                priority: a.priority,
                actions_count: a.action_codes.len(),
            })
            .collect(),
        actions,
    })
}
