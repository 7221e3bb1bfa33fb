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

//! IngestZone: incremental or full fetch from the configured sources.
//!
//! Per (zone, source): find the last stored date, fetch the missing window
//! (or the full configured history), normalize to zone-local calendar days
//! with gaps zero-filled, and upsert. A failing source yields an error
//! report without aborting the batch.

use super::{Ops, OpsError};
use chrono::{Datelike, Duration, NaiveDate, Utc};
use sequia_adapters::{NoaaClient, OpenMeteoClient, PrecipitationSource};
use sequia_types::{DailyPrecipitation, IngestReport, IngestStatus, Zone};
use tracing::{info, warn};

const OP: &str = "IngestZone";

pub async fn ingest_zone(
    ops: &Ops,
    zone_slug: &str,
    sources: &[String],
    force_full: bool,
) -> Result<Vec<IngestReport>, OpsError> {
    let zone = ops.require_zone(OP, zone_slug)?;
    if sources.is_empty() {
        return Err(OpsError::input(OP, "at least one source is required"));
    }

    let mut reports = Vec::with_capacity(sources.len());
    for source in sources {
        let report = match source.as_str() {
            "openmeteo" => {
                match OpenMeteoClient::new().map(|c| {
                    c.with_timezone(zone.timezone.as_deref().unwrap_or("UTC"))
                }) {
                    Ok(client) => ingest_source(ops, &zone, &client, force_full).await,
                    Err(e) => error_report(&zone, source, e.to_string()),
                }
            }
            "noaa" => match NoaaClient::new(None) {
                Ok(client) => ingest_source(ops, &zone, &client, force_full).await,
                Err(e) => error_report(&zone, source, e.to_string()),
            },
            other => {
                return Err(OpsError::input(OP, format!("unknown source {other:?}")));
            }
        };
        reports.push(report);
    }
    Ok(reports)
}

async fn ingest_source(
    ops: &Ops,
    zone: &Zone,
    source: &dyn PrecipitationSource,
    force_full: bool,
) -> IngestReport {
    let yesterday = local_yesterday(zone);

    let last = match ops.db.last_precipitation_date(zone.id, source.name()) {
        Ok(last) => last,
        Err(e) => return error_report(zone, source.name(), format!("{e:#}")),
    };

    let start = if force_full || last.is_none() {
        let years = ops.config.ingestion_history_years as i32;
        NaiveDate::from_ymd_opt(yesterday.year() - years, 1, 1).unwrap_or(yesterday)
    } else {
        // Incremental: resume the day after the newest stored record.
        match last.and_then(|d| d.succ_opt()) {
            Some(next) => next,
            None => yesterday,
        }
    };

    if start > yesterday {
        return IngestReport {
            zone: zone.slug.clone(),
            source: source.name().to_owned(),
            records_added: 0,
            date_range: None,
            status: IngestStatus::UpToDate,
            detail: None,
        };
    }

    info!(zone = %zone.slug, source = source.name(), %start, %yesterday, "ingesting");
    let fetched = match source
        .fetch_daily(zone.latitude, zone.longitude, start, yesterday)
        .await
    {
        Ok(fetched) => fetched,
        Err(e) => {
            warn!(zone = %zone.slug, source = source.name(), "fetch failed: {e}");
            return error_report(zone, source.name(), e.to_string());
        }
    };

    if fetched.is_empty() {
        return IngestReport {
            zone: zone.slug.clone(),
            source: source.name().to_owned(),
            records_added: 0,
            date_range: None,
            status: IngestStatus::NoData,
            detail: None,
        };
    }

    let normalized = normalize(fetched);
    let range = (
        normalized.first().map(|r| r.date),
        normalized.last().map(|r| r.date),
    );
    match sequia_store::with_retry("upsert_precipitation", || {
        ops.db
            .upsert_precipitation(zone.id, source.name(), &normalized)
    }) {
        Ok(added) => IngestReport {
            zone: zone.slug.clone(),
            source: source.name().to_owned(),
            records_added: added,
            date_range: match range {
                (Some(from), Some(to)) => Some((from, to)),
                _ => None,
            },
            status: IngestStatus::Success,
            detail: None,
        },
        Err(e) => error_report(zone, source.name(), format!("{e:#}")),
    }
}

/// Clip negatives, deduplicate, and zero-fill every missing day inside the
/// fetched window.
fn normalize(mut records: Vec<DailyPrecipitation>) -> Vec<DailyPrecipitation> {
    records.sort_by_key(|r| r.date);
    records.dedup_by_key(|r| r.date);
    for r in &mut records {
        r.value_mm = r.value_mm.max(0.0);
    }

    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return records;
    };
    let (first, last) = (first.date, last.date);

    let mut filled = Vec::with_capacity((last - first).num_days() as usize + 1);
    let mut existing = records.iter().peekable();
    let mut day = first;
    while day <= last {
        let value = match existing.peek() {
            Some(r) if r.date == day => {
                let v = r.value_mm;
                existing.next();
                v
            }
            _ => 0.0,
        };
        filled.push(DailyPrecipitation {
            date: day,
            value_mm: value,
        });
        let Some(next) = day.succ_opt() else { break };
        day = next;
    }
    filled
}

fn local_yesterday(zone: &Zone) -> NaiveDate {
    let today = zone
        .timezone
        .as_deref()
        .and_then(|tz| tz.parse::<chrono_tz::Tz>().ok())
        .map_or_else(
            || Utc::now().date_naive(),
            |tz| Utc::now().with_timezone(&tz).date_naive(),
        );
    today - Duration::days(1)
}

fn error_report(zone: &Zone, source: &str, detail: String) -> IngestReport {
    IngestReport {
        zone: zone.slug.clone(),
        source: source.to_owned(),
        records_added: 0,
        date_range: None,
        status: IngestStatus::Error,
        detail: Some(detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn normalize_fills_gaps_with_zero() {
        let records = vec![
            DailyPrecipitation { date: date(2024, 1, 1), value_mm: 2.0 },
            DailyPrecipitation { date: date(2024, 1, 4), value_mm: 3.0 },
        ];
        let filled = normalize(records);
        assert_eq!(filled.len(), 4);
        assert_eq!(filled[1].value_mm, 0.0);
        assert_eq!(filled[2].value_mm, 0.0);
        assert_eq!(filled[3].value_mm, 3.0);
    }

    #[test]
    fn normalize_clips_negatives_and_dedups() {
        let records = vec![
            DailyPrecipitation { date: date(2024, 1, 2), value_mm: -0.4 },
            DailyPrecipitation { date: date(2024, 1, 1), value_mm: 1.0 },
            DailyPrecipitation { date: date(2024, 1, 1), value_mm: 9.0 },
        ];
        let filled = normalize(records);
        assert_eq!(filled.len(), 2);
        assert_eq!(filled[0].date, date(2024, 1, 1));
        assert_eq!(filled[1].value_mm, 0.0);
    }

    #[test]
    fn normalize_empty_is_empty() {
        assert!(normalize(Vec::new()).is_empty());
    }
}
