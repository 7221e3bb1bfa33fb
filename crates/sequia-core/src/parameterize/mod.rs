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

//! Action parameterization.
//!
//! Each recommended action gets concrete parameters either from an LLM
//! (validated and clamped to the archetype schema) or from the
//! deterministic trend-percentile fallback. The completion backend is an
//! injected trait so tests run with a fixed responder.

mod fallback;
mod prompt;
mod validate;

pub use fallback::FallbackHandler;
pub use prompt::{SYSTEM_PROMPT, format_action_prompt};
pub use validate::validate_parameters;

use async_trait::async_trait;
use sequia_types::{
    ActionArchetype, Confidence, Context, ExpectedEffect, Method, ParamMap,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion backend unreachable: {0}")]
    Unreachable(String),

    #[error("completion rate limited: {0}")]
    RateLimited(String),

    #[error("completion timed out")]
    Timeout,

    #[error("completion failed: {0}")]
    Other(String),
}

/// Chat-style completion seam. Implementations handle their own retry
/// budget and per-attempt timeout.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, CompletionError>;
}

/// Expected JSON shape of a completion response.
#[derive(Debug, Deserialize)]
struct AiPayload {
    #[serde(default)]
    parameters: ParamMap,
    #[serde(default)]
    justification: String,
    expected_effect: Option<AiEffect>,
}

#[derive(Debug, Deserialize)]
struct AiEffect {
    #[serde(default)]
    days_gained: f64,
    #[serde(default)]
    confidence: String,
}

/// A concrete, validated parameterization for one action.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterizedAction {
    pub action_code: String,
    pub parameters: ParamMap,
    pub justification: String,
    pub expected_effect: ExpectedEffect,
    pub method: Method,
}

pub struct Parameterizer {
    completion: Option<Arc<dyn CompletionProvider>>,
    fallback: FallbackHandler,
}

impl std::fmt::Debug for Parameterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parameterizer")
            .field("ai_enabled", &self.completion.is_some())
            .finish()
    }
}

impl Parameterizer {
    pub fn new(completion: Option<Arc<dyn CompletionProvider>>) -> Self {
        Self {
            completion,
            fallback: FallbackHandler,
        }
    }

    /// Parameterize one action. Any AI failure degrades silently to the
    /// deterministic fallback; the result records which path produced it.
    pub async fn parameterize(
        &self,
        ctx: &Context,
        archetype: &ActionArchetype,
        defaults: &ParamMap,
    ) -> ParameterizedAction {
        if let Some(completion) = &self.completion {
            match self.try_ai(completion.as_ref(), ctx, archetype, defaults).await {
                Ok(action) => return action,
                Err(e) => {
                    warn!(code = %archetype.code, error = %e, "AI parameterization failed, using fallback");
                }
            }
        }
        self.fallback_action(ctx, archetype, defaults)
    }

    /// Parameterize a batch. Once `deadline` passes, the remaining actions
    /// skip the LLM and take the fallback path.
    pub async fn parameterize_batch(
        &self,
        ctx: &Context,
        requests: &[(&ActionArchetype, ParamMap)],
        deadline: Option<Instant>,
    ) -> Vec<ParameterizedAction> {
        let mut out = Vec::with_capacity(requests.len());
        for (archetype, defaults) in requests {
            let expired = deadline.is_some_and(|d| Instant::now() >= d);
            if expired {
                debug!(code = %archetype.code, "deadline reached, remaining actions fall back");
                out.push(self.fallback_action(ctx, archetype, defaults));
            } else {
                out.push(self.parameterize(ctx, archetype, defaults).await);
            }
        }
        out
    }

    async fn try_ai(
        &self,
        completion: &dyn CompletionProvider,
        ctx: &Context,
        archetype: &ActionArchetype,
        defaults: &ParamMap,
    ) -> Result<ParameterizedAction, CompletionError> {
        let user_prompt = format_action_prompt(ctx, archetype, defaults);
        let content = completion.complete(SYSTEM_PROMPT, &user_prompt).await?;
        let payload = parse_json_response(&content)
            .ok_or_else(|| CompletionError::Other("unparseable JSON response".to_owned()))?;

        let parameters = validate_parameters(&payload.parameters, &archetype.schema);
        let effect = payload.expected_effect.map_or(
            ExpectedEffect {
                days_gained: 0.0,
                confidence: Confidence::Low,
            },
            |e| ExpectedEffect {
                days_gained: e.days_gained,
                confidence: e.confidence.parse().unwrap_or(Confidence::Low),
            },
        );

        Ok(ParameterizedAction {
            action_code: archetype.code.clone(),
            parameters,
            justification: payload.justification,
            expected_effect: effect,
            method: Method::Ai,
        })
    }

    fn fallback_action(
        &self,
        ctx: &Context,
        archetype: &ActionArchetype,
        defaults: &ParamMap,
    ) -> ParameterizedAction {
        let parameters = self
            .fallback
            .generate(&archetype.schema, ctx.trend, defaults);
        ParameterizedAction {
            action_code: archetype.code.clone(),
            parameters,
            justification: self.fallback.justification(ctx),
            expected_effect: self.fallback.estimate_effect(&archetype.impact_formula),
            method: Method::Fallback,
        }
    }
}

/// Parse a JSON object from completion output, tolerating triple-backtick
/// code fences with or without a `json` language tag.
fn parse_json_response(content: &str) -> Option<AiPayload> {
    let mut text = content.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        text = stripped;
    } else if let Some(stripped) = text.strip_prefix("```") {
        text = stripped;
    }
    if let Some(stripped) = text.strip_suffix("```") {
        text = stripped;
    }
    serde_json::from_str(text.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sequia_types::{ParamSchema, ParamSpec, ParamValue, Trend};

    struct FixedCompletion(String);

    #[async_trait]
    impl CompletionProvider for FixedCompletion {
        async fn complete(&self, _: &str, _: &str) -> Result<String, CompletionError> {
            Ok(self.0.clone())
        }
    }

    struct FailingCompletion;

    #[async_trait]
    impl CompletionProvider for FailingCompletion {
        async fn complete(&self, _: &str, _: &str) -> Result<String, CompletionError> {
            Err(CompletionError::Unreachable("boom".to_owned()))
        }
    }

    fn archetype() -> ActionArchetype {
        let mut schema = ParamSchema::new();
        schema.insert(
            "pressure_reduction_pct".to_owned(),
            ParamSpec::numeric(5.0, 30.0, 10.0),
        );
        schema.insert(
            "scope".to_owned(),
            ParamSpec::choice(&["public_only", "commercial_only", "all"], "all"),
        );
        ActionArchetype {
            code: "H2_PRESSURE_REDUCTION".to_owned(),
            title: "Network Pressure Reduction".to_owned(),
            description: String::new(),
            heuristic_tag: "H2".to_owned(),
            spi_min: -1.8,
            spi_max: -1.2,
            impact_formula: "10% pressure = +4 days".to_owned(),
            base_cost_usd: 30_000.0,
            default_urgency_days: 14,
            schema,
        }
    }

    fn ctx(trend: Trend) -> Context {
        Context {
            trend,
            spi_6: Some(-1.6),
            days_to_critical: Some(24),
            ..Context::default()
        }
    }

    #[tokio::test]
    async fn ai_response_is_validated_and_clamped() {
        let response = r#"```json
{"parameters": {"pressure_reduction_pct": 55, "scope": "everywhere"},
 "justification": "aggressive cut",
 "expected_effect": {"days_gained": 6, "confidence": "medium"}}
```"#;
        let p = Parameterizer::new(Some(Arc::new(FixedCompletion(response.to_owned()))));
        let a = archetype();
        let result = p.parameterize(&ctx(Trend::Worsening), &a, &ParamMap::new()).await;
        assert_eq!(result.method, Method::Ai);
        // 55 clamped into [5, 30] and coerced to the integer bounds.
        assert_eq!(
            result.parameters.get("pressure_reduction_pct"),
            Some(&ParamValue::Int(30))
        );
        // Unknown option falls back to the schema default.
        assert_eq!(
            result.parameters.get("scope"),
            Some(&ParamValue::Text("all".to_owned()))
        );
        assert_eq!(result.expected_effect.days_gained, 6.0);
        assert_eq!(result.expected_effect.confidence, Confidence::Medium);
    }

    #[tokio::test]
    async fn unreachable_backend_falls_back_silently() {
        let p = Parameterizer::new(Some(Arc::new(FailingCompletion)));
        let a = archetype();
        let result = p.parameterize(&ctx(Trend::Worsening), &a, &ParamMap::new()).await;
        assert_eq!(result.method, Method::Fallback);
        // 75th percentile of [5, 30] = 23.75 -> 24 with integer bounds.
        assert_eq!(
            result.parameters.get("pressure_reduction_pct"),
            Some(&ParamValue::Int(24))
        );
    }

    #[tokio::test]
    async fn garbage_json_falls_back() {
        let p = Parameterizer::new(Some(Arc::new(FixedCompletion("not json at all".to_owned()))));
        let a = archetype();
        let result = p.parameterize(&ctx(Trend::Stable), &a, &ParamMap::new()).await;
        assert_eq!(result.method, Method::Fallback);
        assert_eq!(result.expected_effect.confidence, Confidence::Low);
        assert_eq!(result.expected_effect.days_gained, 4.0);
    }

    #[tokio::test]
    async fn no_backend_means_fallback() {
        let p = Parameterizer::new(None);
        let a = archetype();
        let result = p.parameterize(&ctx(Trend::Improving), &a, &ParamMap::new()).await;
        assert_eq!(result.method, Method::Fallback);
        // 25th percentile of [5, 30] = 11.25 -> 11.
        assert_eq!(
            result.parameters.get("pressure_reduction_pct"),
            Some(&ParamValue::Int(11))
        );
    }

    #[tokio::test]
    async fn expired_deadline_forces_fallback() {
        let response =
            r#"{"parameters": {}, "justification": "x", "expected_effect": {"days_gained": 1, "confidence": "high"}}"#;
        let p = Parameterizer::new(Some(Arc::new(FixedCompletion(response.to_owned()))));
        let a = archetype();
        let requests = vec![(&a, ParamMap::new()), (&a, ParamMap::new())];
        let past = Instant::now() - std::time::Duration::from_secs(1);
        let results = p
            .parameterize_batch(&ctx(Trend::Worsening), &requests, Some(past))
            .await;
        assert!(results.iter().all(|r| r.method == Method::Fallback));
    }

    #[tokio::test]
    async fn fallback_runs_are_reproducible() {
        let p = Parameterizer::new(None);
        let a = archetype();
        let c = ctx(Trend::Worsening);
        let first = p.parameterize(&c, &a, &ParamMap::new()).await;
        let second = p.parameterize(&c, &a, &ParamMap::new()).await;
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first.parameters).unwrap(),
            serde_json::to_string(&second.parameters).unwrap()
        );
    }

    #[test]
    fn fence_stripping_variants() {
        assert!(parse_json_response("{\"parameters\": {}}").is_some());
        assert!(parse_json_response("```json\n{\"parameters\": {}}\n```").is_some());
        assert!(parse_json_response("```\n{\"parameters\": {}}\n```").is_some());
        assert!(parse_json_response("```json\n{broken\n```").is_none());
    }
}
