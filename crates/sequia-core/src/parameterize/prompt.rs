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

//! Prompt construction for the parameterization call.

use sequia_types::{ActionArchetype, Context, ParamMap};

pub const SYSTEM_PROMPT: &str = "You are a water resource management expert AI assistant. \
Your role is to help parameterize drought response actions based on current conditions.

IMPORTANT RULES:
1. Only adjust parameters within the allowed ranges specified
2. Provide numeric values, not descriptive terms
3. Be conservative - err on the side of caution for public health
4. Consider the user profile (government vs industry) when making recommendations
5. Always return valid JSON

You will receive the current risk context, an action to parameterize with its allowed \
parameter ranges, and the user profile. You must return a JSON object with optimized \
parameters and a brief justification.";

/// Structured user prompt: context summary, archetype metadata, explicit
/// schema ranges and the heuristic defaults.
pub fn format_action_prompt(
    ctx: &Context,
    archetype: &ActionArchetype,
    defaults: &ParamMap,
) -> String {
    let schema_json =
        serde_json::to_string_pretty(&archetype.schema).unwrap_or_else(|_| "{}".to_owned());
    let defaults_json = serde_json::to_string_pretty(defaults).unwrap_or_else(|_| "{}".to_owned());
    let days_str = ctx
        .days_to_critical
        .map_or_else(|| "not projected".to_owned(), |d| d.to_string());

    format!(
        "Current Risk Context:\n\
         - Zone: {zone}\n\
         - SPI-6: {spi:.2} ({risk})\n\
         - Trend: {trend}\n\
         - Days to Critical: {days}\n\
         - Profile: {profile}\n\
         \n\
         Action to Parameterize:\n\
         - Code: {code}\n\
         - Title: {title}\n\
         - Description: {description}\n\
         - Impact Formula: {impact}\n\
         - Default Urgency: {urgency} days\n\
         \n\
         Allowed Parameter Ranges:\n{schema}\n\
         \n\
         Default Parameters (from heuristics):\n{defaults}\n\
         \n\
         Optimize the parameters for the current situation, considering the drought \
         severity, the trend direction, the time available and the user profile.\n\
         \n\
         Return a JSON object with this exact structure:\n\
         {{\n\
         \x20   \"parameters\": {{ ... }},\n\
         \x20   \"justification\": \"Brief explanation of parameter choices\",\n\
         \x20   \"expected_effect\": {{\n\
         \x20       \"days_gained\": <number>,\n\
         \x20       \"confidence\": \"high|medium|low\"\n\
         \x20   }}\n\
         }}",
        zone = ctx.zone_slug,
        spi = ctx.spi(),
        risk = ctx.risk_level,
        trend = ctx.trend,
        days = days_str,
        profile = ctx.profile,
        code = archetype.code,
        title = archetype.title,
        description = archetype.description,
        impact = archetype.impact_formula,
        urgency = archetype.default_urgency_days,
        schema = schema_json,
        defaults = defaults_json,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sequia_types::{ParamSchema, ParamSpec, Trend};

    #[test]
    fn prompt_carries_schema_and_context() {
        let mut schema = ParamSchema::new();
        schema.insert(
            "pressure_reduction_pct".to_owned(),
            ParamSpec::numeric(5.0, 20.0, 10.0),
        );
        let archetype = ActionArchetype {
            code: "H2_PRESSURE_REDUCTION".to_owned(),
            title: "Network Pressure Reduction".to_owned(),
            description: "Reduce pressure off-peak".to_owned(),
            heuristic_tag: "H2".to_owned(),
            spi_min: -1.8,
            spi_max: -1.2,
            impact_formula: "10% pressure = +4 days".to_owned(),
            base_cost_usd: 30_000.0,
            default_urgency_days: 14,
            schema,
        };
        let ctx = Context {
            zone_slug: "cdmx".to_owned(),
            trend: Trend::Worsening,
            spi_6: Some(-1.72),
            days_to_critical: Some(24),
            ..Context::default()
        };
        let prompt = format_action_prompt(&ctx, &archetype, &ParamMap::new());
        assert!(prompt.contains("cdmx"));
        assert!(prompt.contains("-1.72"));
        assert!(prompt.contains("WORSENING"));
        assert!(prompt.contains("H2_PRESSURE_REDUCTION"));
        assert!(prompt.contains("pressure_reduction_pct"));
        assert!(prompt.contains("days_gained"));
    }
}
