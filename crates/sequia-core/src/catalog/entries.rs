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

//! Canonical archetype list. Classical entries carry the quantified impact
//! formulas the fallback parser reads ("+N days"); the extended set keeps
//! the original Spanish catalog wording.

use sequia_types::{ActionArchetype, ParamSchema, ParamSpec};

#[allow(clippy::too_many_arguments)]
fn archetype(
    code: &str,
    title: &str,
    description: &str,
    tag: &str,
    spi_min: f64,
    spi_max: f64,
    impact_formula: &str,
    base_cost_usd: f64,
    default_urgency_days: u32,
    schema: Vec<(&str, ParamSpec)>,
) -> ActionArchetype {
    let mut map = ParamSchema::new();
    for (name, spec) in schema {
        map.insert(name.to_owned(), spec);
    }
    ActionArchetype {
        code: code.to_owned(),
        title: title.to_owned(),
        description: description.to_owned(),
        heuristic_tag: tag.to_owned(),
        spi_min,
        spi_max,
        impact_formula: impact_formula.to_owned(),
        base_cost_usd,
        default_urgency_days,
        schema: map,
    }
}

const NEG: f64 = f64::NEG_INFINITY;
const POS: f64 = f64::INFINITY;

pub fn all() -> Vec<ActionArchetype> {
    let mut v = classical();
    v.extend(extended());
    v
}

fn classical() -> Vec<ActionArchetype> {
    vec![
        archetype(
            "H1_INDUSTRIAL_AUDIT",
            "Industrial Water Audit Program",
            "Mandatory water efficiency audits for industrial facilities consuming >10,000 m3/month",
            "H1",
            -1.5,
            -1.0,
            "5% reduction = +3 days",
            50_000.0,
            30,
            vec![
                ("reduction_target_pct", ParamSpec::numeric(3.0, 15.0, 5.0)),
                (
                    "facility_threshold_m3",
                    ParamSpec::numeric(5000.0, 20000.0, 10000.0),
                ),
            ],
        ),
        archetype(
            "H1_RECYCLING_MANDATE",
            "Industrial Water Recycling Mandate",
            "Require industrial water recycling systems for high-consumption sectors",
            "H1",
            -1.5,
            -1.0,
            "10% recycling = +5 days",
            200_000.0,
            45,
            vec![
                ("recycling_rate_pct", ParamSpec::numeric(5.0, 30.0, 10.0)),
                (
                    "sectors_affected",
                    ParamSpec::choice(
                        &["manufacturing", "food_processing", "chemicals"],
                        "manufacturing",
                    ),
                ),
            ],
        ),
        archetype(
            "H2_PRESSURE_REDUCTION",
            "Network Pressure Reduction",
            "Reduce water distribution pressure during off-peak hours to minimize losses",
            "H2",
            -1.8,
            -1.2,
            "10% pressure = +4 days",
            30_000.0,
            14,
            vec![
                ("pressure_reduction_pct", ParamSpec::numeric(5.0, 20.0, 10.0)),
                ("hours_start", ParamSpec::numeric(22.0, 23.0, 23.0)),
                ("hours_end", ParamSpec::numeric(5.0, 7.0, 6.0)),
            ],
        ),
        archetype(
            "H2_LEAK_DETECTION",
            "Accelerated Leak Detection Program",
            "Deploy acoustic sensors and prioritize repair of major leaks",
            "H2",
            -1.8,
            -1.2,
            "1% leak reduction = +2 days",
            100_000.0,
            21,
            vec![
                ("coverage_pct", ParamSpec::numeric(50.0, 100.0, 75.0)),
                (
                    "repair_priority_threshold_lps",
                    ParamSpec::numeric(0.5, 2.0, 1.0),
                ),
            ],
        ),
        archetype(
            "H3_AWARENESS_CAMPAIGN",
            "Public Awareness Campaign",
            "Multi-channel communication campaign on water conservation",
            "H3",
            -2.0,
            -1.0,
            "3% reduction = +2 days",
            25_000.0,
            7,
            vec![
                (
                    "channels",
                    ParamSpec::choice(
                        &["tv", "radio", "social_media", "billboards"],
                        "social_media",
                    ),
                ),
                (
                    "intensity_level",
                    ParamSpec::choice(&["moderate", "high", "emergency"], "moderate"),
                ),
            ],
        ),
        archetype(
            "H3_SCHOOL_PROGRAM",
            "School Water Education Program",
            "Accelerated water conservation education in schools",
            "H3",
            -2.0,
            -1.0,
            "1% reduction = +0.7 days",
            15_000.0,
            14,
            vec![
                ("schools_pct", ParamSpec::numeric(30.0, 100.0, 50.0)),
                (
                    "grade_levels",
                    ParamSpec::choice(&["primary", "secondary", "both"], "both"),
                ),
            ],
        ),
        archetype(
            "H3_HOTLINE_LAUNCH",
            "Water Waste Reporting Hotline",
            "Launch public hotline for reporting water waste and leaks",
            "H3",
            -2.0,
            -1.0,
            "0.5% reduction = +0.3 days",
            10_000.0,
            7,
            vec![
                ("response_time_hours", ParamSpec::numeric(2.0, 24.0, 12.0)),
                ("reward_program", ParamSpec::flag(false)),
            ],
        ),
        archetype(
            "H4_LAWN_BAN",
            "Lawn Irrigation Restriction",
            "Restrict lawn and garden irrigation to specific hours/days",
            "H4",
            NEG,
            -1.8,
            "1% removed = +1.3 days",
            5_000.0,
            3,
            vec![
                ("hours_allowed_per_day", ParamSpec::numeric(0.0, 4.0, 2.0)),
                ("days_per_week", ParamSpec::numeric(1.0, 3.0, 2.0)),
                ("compliance_target_pct", ParamSpec::numeric(60.0, 95.0, 80.0)),
            ],
        ),
        archetype(
            "H4_CARWASH_RESTRICTION",
            "Car Wash Water Restriction",
            "Limit commercial car wash operations and ban home car washing",
            "H4",
            NEG,
            -1.8,
            "0.5% removed = +0.65 days",
            3_000.0,
            3,
            vec![
                ("commercial_days_allowed", ParamSpec::numeric(2.0, 5.0, 3.0)),
                ("home_wash_ban", ParamSpec::flag(true)),
            ],
        ),
        archetype(
            "H4_POOL_RESTRICTION",
            "Swimming Pool Filling Ban",
            "Prohibit filling of private swimming pools",
            "H4",
            NEG,
            -1.8,
            "0.3% removed = +0.4 days",
            2_000.0,
            3,
            vec![
                (
                    "pool_types_affected",
                    ParamSpec::choice(&["private", "commercial", "all"], "private"),
                ),
                ("exception_for_public", ParamSpec::flag(true)),
            ],
        ),
        archetype(
            "H4_FOUNTAIN_SHUTDOWN",
            "Ornamental Fountain Shutdown",
            "Shut down decorative fountains in public and commercial spaces",
            "H4",
            NEG,
            -1.8,
            "0.2% removed = +0.26 days",
            1_000.0,
            1,
            vec![(
                "scope",
                ParamSpec::choice(&["public_only", "commercial_only", "all"], "all"),
            )],
        ),
        archetype(
            "H5_EMERGENCY_WELLS",
            "Emergency Well Activation",
            "Activate backup groundwater wells for emergency supply",
            "H5",
            NEG,
            -2.0,
            "5% increase = +5 days",
            150_000.0,
            7,
            vec![
                ("wells_to_activate", ParamSpec::numeric(1.0, 10.0, 3.0)),
                (
                    "extraction_rate_pct_of_max",
                    ParamSpec::numeric(50.0, 100.0, 75.0),
                ),
            ],
        ),
        archetype(
            "H5_TANKER_DEPLOYMENT",
            "Water Tanker Deployment",
            "Deploy water tankers to critical areas with supply shortages",
            "H5",
            NEG,
            -2.0,
            "2% increase = +2 days",
            80_000.0,
            3,
            vec![
                ("tankers_count", ParamSpec::numeric(10.0, 100.0, 30.0)),
                (
                    "priority_areas",
                    ParamSpec::choice(&["hospitals", "schools", "residential", "all"], "hospitals"),
                ),
            ],
        ),
        archetype(
            "H5_INTERBASIN_TRANSFER",
            "Inter-Basin Water Transfer",
            "Negotiate emergency water transfer from neighboring basins",
            "H5",
            NEG,
            -2.0,
            "10% increase = +10 days",
            500_000.0,
            14,
            vec![
                ("volume_mld", ParamSpec::numeric(50.0, 500.0, 100.0)),
                (
                    "source_basin",
                    ParamSpec::choice(&["lerma", "cutzamala", "other"], "cutzamala"),
                ),
            ],
        ),
        archetype(
            "H6_EMERGENCY_DECLARATION",
            "Water Emergency Declaration",
            "Formal declaration of water emergency enabling special powers",
            "H6",
            NEG,
            POS,
            "combined effects * 0.8",
            0.0,
            1,
            vec![
                (
                    "emergency_level",
                    ParamSpec::choice(&["level_1", "level_2", "level_3"], "level_1"),
                ),
                ("duration_days", ParamSpec::numeric(7.0, 90.0, 30.0)),
            ],
        ),
    ]
}

fn extended() -> Vec<ActionArchetype> {
    vec![
        archetype(
            "H1_MONITORING_INTENSIFICATION",
            "Intensificación de Monitoreo",
            "Incrementar frecuencia de monitoreo SPI de mensual a semanal para detectar deterioro temprano.",
            "H1",
            NEG,
            POS,
            "Detección temprana, +7 days de anticipación",
            5_000.0,
            7,
            vec![
                (
                    "monitoring_frequency",
                    ParamSpec::choice(&["daily", "weekly"], "weekly"),
                ),
                (
                    "alert_sectors",
                    ParamSpec::choice(&["agricultural", "industrial", "municipal", "all"], "all"),
                ),
            ],
        ),
        archetype(
            "H1_STAKEHOLDER_ALERT",
            "Alerta a Partes Interesadas",
            "Notificación formal a sectores clave sobre inicio de sequía.",
            "H1",
            NEG,
            POS,
            "Preparación adelantada, +5 days efectivos",
            2_000.0,
            3,
            vec![(
                "sectors",
                ParamSpec::choice(&["agricultural", "industrial", "municipal", "all"], "all"),
            )],
        ),
        archetype(
            "H1_RESOURCE_PREPOSITION",
            "Preposicionamiento de Recursos",
            "Movilizar y preposicionar recursos de respuesta antes de que sean necesarios.",
            "H1",
            NEG,
            POS,
            "Reducción tiempo de respuesta 50%",
            15_000.0,
            14,
            vec![(
                "resource_level",
                ParamSpec::choice(&["moderate", "high"], "moderate"),
            )],
        ),
        archetype(
            "H2_FLASH_DROUGHT_ALERT",
            "Alerta de Sequía Relámpago",
            "Emisión de alerta urgente por deterioro acelerado de condiciones hídricas.",
            "H2",
            NEG,
            POS,
            "Respuesta acelerada, -3 days tiempo de reacción",
            3_000.0,
            1,
            vec![(
                "alert_level",
                ParamSpec::choice(&["warning", "urgent", "critical"], "urgent"),
            )],
        ),
        archetype(
            "H2_RAPID_RESPONSE_ACTIVATION",
            "Activación de Respuesta Rápida",
            "Movilizar equipos de respuesta rápida y recursos pre-posicionados.",
            "H2",
            NEG,
            POS,
            "Reducción tiempo implementación 50%",
            25_000.0,
            2,
            vec![("response_teams", ParamSpec::numeric(2.0, 10.0, 5.0))],
        ),
        archetype(
            "H2_EMERGENCY_COMMUNICATION",
            "Comunicación de Emergencia",
            "Campaña de comunicación urgente a sector agrícola sobre flash drought.",
            "H2",
            NEG,
            POS,
            "Alcance 80% productores en 24h",
            8_000.0,
            1,
            vec![(
                "channels",
                ParamSpec::choice(&["sms", "radio", "social_media"], "sms"),
            )],
        ),
        archetype(
            "H3_VALIDATED_MONITORING",
            "Monitoreo con Validación Estacional",
            "Monitoreo que considera contexto estacional para evitar falsas alarmas.",
            "H3",
            NEG,
            POS,
            "Reduce falsas alarmas 80%",
            3_000.0,
            7,
            vec![],
        ),
        archetype(
            "H3_SEASONAL_ADVISORY",
            "Aviso Estacional Contextualizado",
            "Comunicación pública que explica condiciones en contexto estacional.",
            "H3",
            NEG,
            POS,
            "Mejora comprensión pública",
            2_000.0,
            7,
            vec![],
        ),
        archetype(
            "H4_AGRICULTURAL_ALERT",
            "Alerta Agrícola por Estrés Fenológico",
            "Alerta a productores sobre riesgo de pérdida de cultivos en etapa crítica.",
            "H4",
            NEG,
            -1.5,
            "Mitigación potencial 20% pérdida",
            5_000.0,
            3,
            vec![(
                "crops",
                ParamSpec::choice(&["maiz", "frijol", "trigo", "sorgo"], "maiz"),
            )],
        ),
        archetype(
            "H4_IRRIGATION_PRIORITY",
            "Priorización de Riego Agrícola",
            "Reasignar agua disponible a cultivos en etapa fenológica crítica.",
            "H4",
            NEG,
            -1.5,
            "Reducción pérdida cosecha 30%",
            50_000.0,
            7,
            vec![("allocation_pct", ParamSpec::numeric(10.0, 50.0, 25.0))],
        ),
        archetype(
            "H4_CROP_INSURANCE_ACTIVATION",
            "Activación de Seguros de Cosecha",
            "Iniciar proceso de activación de seguros agrícolas por sequía.",
            "H4",
            NEG,
            -1.5,
            "Cobertura financiera para productores",
            1_000.0,
            14,
            vec![],
        ),
        archetype(
            "H5_TREND_ALERT",
            "Alerta de Tendencia Negativa",
            "Comunicar tendencia estadísticamente significativa de degradación.",
            "H5",
            NEG,
            POS,
            "Anticipación de 4-8 semanas",
            2_000.0,
            7,
            vec![],
        ),
        archetype(
            "H5_SCENARIO_PROJECTION",
            "Proyección de Escenarios",
            "Generar proyecciones de SPI para los próximos 3-6 meses.",
            "H5",
            NEG,
            POS,
            "Mejora planificación de recursos",
            5_000.0,
            14,
            vec![("projection_months", ParamSpec::numeric(3.0, 12.0, 6.0))],
        ),
        archetype(
            "H5_PREEMPTIVE_RESTRICTIONS",
            "Restricciones Preventivas por Tendencia",
            "Implementar restricciones leves antes de deterioro proyectado.",
            "H5",
            NEG,
            POS,
            "Evitar 15% de impacto futuro",
            10_000.0,
            14,
            vec![(
                "restriction_level",
                ParamSpec::choice(&["voluntary", "recommended", "mandatory"], "recommended"),
            )],
        ),
        archetype(
            "H6_SUSTAINED_RESTRICTIONS",
            "Restricciones Sostenidas (Cerrojo Estacional)",
            "Mantener restricciones hasta próxima temporada húmeda exitosa.",
            "H6",
            NEG,
            POS,
            "Prevenir agotamiento de reservas",
            0.0,
            30,
            vec![("review_period_days", ParamSpec::numeric(30.0, 180.0, 90.0))],
        ),
        archetype(
            "H6_LONG_TERM_PLANNING",
            "Planificación de Largo Plazo",
            "Activar planes de contingencia para déficit estructural.",
            "H6",
            NEG,
            POS,
            "Preparación para 12+ meses de déficit",
            5_000.0,
            30,
            vec![],
        ),
        archetype(
            "H6_RESERVE_MANAGEMENT",
            "Gestión de Reservas Estratégicas",
            "Implementar protocolo de gestión de reservas para temporada seca extendida.",
            "H6",
            NEG,
            POS,
            "Extender reservas 20%",
            15_000.0,
            14,
            vec![],
        ),
        archetype(
            "H7_RESTRICTION_HOLD",
            "Mantener Restricciones (Inercia Hidrológica)",
            "No relajar restricciones hasta validación de almacenamiento físico.",
            "H7",
            NEG,
            POS,
            "Evitar recaída prematura",
            0.0,
            30,
            vec![(
                "reservoir_threshold_pct",
                ParamSpec::numeric(50.0, 80.0, 60.0),
            )],
        ),
        archetype(
            "H7_RESERVOIR_VALIDATION",
            "Validación de Niveles de Embalse",
            "Verificar físicamente niveles de embalse antes de relajar medidas.",
            "H7",
            NEG,
            POS,
            "Decisiones basadas en datos reales",
            3_000.0,
            7,
            vec![],
        ),
        archetype(
            "H7_PHASED_RELAXATION",
            "Relajación Escalonada",
            "Protocolo de relajación gradual de restricciones.",
            "H7",
            NEG,
            POS,
            "Transición controlada",
            2_000.0,
            30,
            vec![],
        ),
        archetype(
            "H8_PUMPING_RESTRICTION",
            "Restricción de Bombeo Subterráneo",
            "Limitar extracción de agua subterránea para proteger acuíferos.",
            "H8",
            NEG,
            -1.5,
            "Reducir extracción 20%",
            15_000.0,
            14,
            vec![("reduction_pct", ParamSpec::numeric(10.0, 40.0, 20.0))],
        ),
        archetype(
            "H8_AQUIFER_MONITORING",
            "Monitoreo Intensivo de Acuíferos",
            "Incrementar frecuencia de medición de niveles freáticos.",
            "H8",
            NEG,
            -1.5,
            "Detección temprana de agotamiento",
            8_000.0,
            14,
            vec![(
                "monitoring_frequency",
                ParamSpec::choice(&["weekly", "biweekly", "monthly"], "biweekly"),
            )],
        ),
        archetype(
            "H8_ALTERNATIVE_SOURCES",
            "Activación de Fuentes Alternativas",
            "Buscar y activar fuentes alternativas de agua.",
            "H8",
            NEG,
            -1.5,
            "Diversificación de suministro",
            50_000.0,
            30,
            vec![],
        ),
        archetype(
            "H9_FALSE_RECOVERY_ALERT",
            "Alerta de Falsa Recuperación",
            "Comunicar que lluvia reciente no significa fin de sequía.",
            "H9",
            NEG,
            POS,
            "Evitar relajación prematura pública",
            5_000.0,
            7,
            vec![(
                "channels",
                ParamSpec::choice(&["media", "social_media", "official"], "official"),
            )],
        ),
        archetype(
            "H9_SUSTAINED_MONITORING",
            "Monitoreo Sostenido",
            "Mantener vigilancia intensiva a pesar de mejoras aparentes.",
            "H9",
            NEG,
            POS,
            "Prevenir sorpresas",
            3_000.0,
            14,
            vec![],
        ),
        archetype(
            "H9_PUBLIC_COMMUNICATION",
            "Comunicación Pública sobre Sequía Verde",
            "Campaña explicando que paisaje verde no significa fin de crisis hídrica.",
            "H9",
            NEG,
            POS,
            "Mantener comportamiento de conservación",
            10_000.0,
            7,
            vec![],
        ),
        archetype(
            "H10_MAGNITUDE_BASED_RESPONSE",
            "Respuesta Basada en Magnitud Histórica",
            "Escalar intensidad de respuesta según percentil histórico.",
            "H10",
            NEG,
            POS,
            "Respuesta proporcional a severidad",
            20_000.0,
            7,
            vec![(
                "response_tier",
                ParamSpec::choice(&["tier_1", "tier_2", "tier_3"], "tier_2"),
            )],
        ),
        archetype(
            "H10_HISTORICAL_COMPARISON",
            "Comparación Histórica",
            "Generar informe comparando evento actual con sequías históricas.",
            "H10",
            NEG,
            POS,
            "Contexto para decisiones",
            3_000.0,
            14,
            vec![],
        ),
        archetype(
            "H10_ESCALATED_MEASURES",
            "Medidas Escaladas",
            "Activar medidas de nivel superior según magnitud acumulada.",
            "H10",
            NEG,
            POS,
            "Respuesta proporcional",
            30_000.0,
            7,
            vec![],
        ),
        archetype(
            "H11_PREEMPTIVE_ACTIVATION",
            "Activación Preventiva por Probabilidad",
            "Activar medidas antes de transición probable a estado severo.",
            "H11",
            NEG,
            POS,
            "Adelantar respuesta 2-4 semanas",
            15_000.0,
            14,
            vec![("probability_threshold", ParamSpec::numeric(0.5, 0.9, 0.6))],
        ),
        archetype(
            "H11_PROBABILITY_ALERT",
            "Alerta Basada en Probabilidad",
            "Comunicar probabilidad de deterioro a tomadores de decisión.",
            "H11",
            NEG,
            POS,
            "Decisiones informadas",
            2_000.0,
            7,
            vec![],
        ),
        archetype(
            "H11_CONTINGENCY_PREPARATION",
            "Preparación de Contingencia",
            "Preparar planes de contingencia basados en escenarios probabilísticos.",
            "H11",
            NEG,
            POS,
            "Preparación anticipada",
            8_000.0,
            14,
            vec![],
        ),
        archetype(
            "H12_MAXIMUM_CONSERVATION",
            "Conservación Máxima (Post-Volatilidad)",
            "Medidas de conservación intensivas tras transición rápida húmedo-seco.",
            "H12",
            NEG,
            POS,
            "Reducir consumo 15%",
            25_000.0,
            7,
            vec![(
                "conservation_target_pct",
                ParamSpec::numeric(10.0, 25.0, 15.0),
            )],
        ),
        archetype(
            "H12_INFRASTRUCTURE_PROTECTION",
            "Protección de Infraestructura",
            "Evaluar y proteger infraestructura estresada por cambios rápidos.",
            "H12",
            NEG,
            POS,
            "Prevenir fallas de infraestructura",
            20_000.0,
            14,
            vec![],
        ),
        archetype(
            "H12_VOLATILITY_MANAGEMENT",
            "Gestión de Volatilidad en Embalses",
            "Ajustar reglas de operación de embalses para clima volátil.",
            "H12",
            NEG,
            POS,
            "Retención conservadora de agua",
            10_000.0,
            14,
            vec![],
        ),
        archetype(
            "H13_COC_MANDATE",
            "Mandato de Ciclos de Concentración",
            "Requerir CoC >= 5 en torres de enfriamiento industriales.",
            "H13",
            NEG,
            -1.5,
            "Reducción consumo industrial 25%",
            10_000.0,
            30,
            vec![("minimum_coc", ParamSpec::numeric(4.0, 8.0, 5.0))],
        ),
        archetype(
            "H13_INDUSTRIAL_AUDIT",
            "Auditoría Industrial de Agua",
            "Auditoría obligatoria de eficiencia hídrica para grandes consumidores.",
            "H13",
            NEG,
            -1.5,
            "Identificar ahorros potenciales",
            15_000.0,
            30,
            vec![],
        ),
        archetype(
            "H13_WATER_TREATMENT_UPGRADE",
            "Apoyo para Tratamiento de Agua",
            "Asistencia técnica y financiera para mejorar tratamiento de agua de proceso.",
            "H13",
            NEG,
            -1.5,
            "Habilitación de mayor CoC",
            50_000.0,
            60,
            vec![],
        ),
        archetype(
            "H14_NIGHT_PRESSURE_REDUCTION",
            "Reducción de Presión Nocturna",
            "Reducir presión en red 23:00-06:00 para minimizar pérdidas.",
            "H14",
            NEG,
            -2.0,
            "Reducir pérdidas 15%",
            20_000.0,
            7,
            vec![(
                "pressure_reduction_pct",
                ParamSpec::numeric(10.0, 30.0, 20.0),
            )],
        ),
        archetype(
            "H14_DEMAND_MANAGEMENT",
            "Gestión de Demanda con Tarifas",
            "Implementar tarifas escalonadas punitivas para alto consumo.",
            "H14",
            NEG,
            -2.0,
            "Reducir demanda pico 20%",
            5_000.0,
            14,
            vec![],
        ),
        archetype(
            "H14_INFRASTRUCTURE_PROTECTION",
            "Protección de Infraestructura Crítica",
            "Medidas para proteger infraestructura bajo estrés prolongado.",
            "H14",
            NEG,
            -2.0,
            "Prevenir fallas sistémicas",
            30_000.0,
            14,
            vec![],
        ),
        archetype(
            "H15_PHASED_RELAXATION",
            "Relajación Escalonada de Restricciones",
            "Eliminar restricciones gradualmente: recreativo, riego, industrial.",
            "H15",
            0.0,
            POS,
            "Normalización controlada",
            5_000.0,
            30,
            vec![("phase_duration_days", ParamSpec::numeric(14.0, 60.0, 30.0))],
        ),
        archetype(
            "H15_RECOVERY_MONITORING",
            "Monitoreo de Recuperación",
            "Vigilancia intensiva durante fase de recuperación.",
            "H15",
            0.0,
            POS,
            "Detección de recaída",
            3_000.0,
            30,
            vec![],
        ),
        archetype(
            "H15_PUBLIC_ANNOUNCEMENT",
            "Anuncio Público de Recuperación",
            "Comunicación oficial del inicio de fase de recuperación.",
            "H15",
            0.0,
            POS,
            "Información al público",
            2_000.0,
            7,
            vec![],
        ),
    ]
}
