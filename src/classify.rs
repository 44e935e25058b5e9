//! Grouping of affected lines by active alert type.
//!
//! An alert counts for a line at time `at` when one of its active periods
//! contains `at`, one of its informed entities belongs to the target agency,
//! and that entity names a line from the valid universe. The same test drives
//! both the per-type groups and the non-active set, so the two never overlap.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::Serialize;

use crate::model::{FeedDocument, LineId};

/// Lookup key for the lines without any active alert.
pub const NON_ACTIVE_ALERTS: &str = "Non Active Alerts";

/// Alert type to the lines it currently affects. Never holds an empty set.
pub type AlertGroups = BTreeMap<String, BTreeSet<LineId>>;

pub fn active_by_type<Z: TimeZone>(
    document: &FeedDocument,
    valid_lines: &BTreeSet<LineId>,
    target_agency: &str,
    at: &DateTime<Z>,
) -> AlertGroups {
    let mut groups = AlertGroups::new();
    let pairs = active_pairs(document, valid_lines, target_agency, at.with_timezone(&Utc));
    for (alert_type, line) in pairs {
        groups
            .entry(alert_type.to_string())
            .or_default()
            .insert(line.clone());
    }
    groups
}

pub fn non_active_lines<Z: TimeZone>(
    document: &FeedDocument,
    valid_lines: &BTreeSet<LineId>,
    target_agency: &str,
    at: &DateTime<Z>,
) -> BTreeSet<LineId> {
    let mut lines = valid_lines.clone();
    let pairs = active_pairs(document, valid_lines, target_agency, at.with_timezone(&Utc));
    for (_, line) in pairs {
        lines.remove(line);
    }
    lines
}

fn active_pairs<'a>(
    document: &'a FeedDocument,
    valid_lines: &'a BTreeSet<LineId>,
    target_agency: &'a str,
    at: DateTime<Utc>,
) -> impl Iterator<Item = (&'a str, &'a LineId)> {
    document
        .entities
        .iter()
        .filter(move |alert| alert.is_active_at(at))
        .flat_map(move |alert| {
            alert
                .informed_entities
                .iter()
                .filter(move |informed| informed.agency_id == target_agency)
                .filter_map(|informed| informed.route_id.as_ref())
                .filter(move |line| valid_lines.contains(*line))
                .map(move |line| (alert.alert_type.as_str(), line))
        })
}

/// Both groupings of one document, evaluated at a single instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    evaluated_at: DateTime<FixedOffset>,
    active: AlertGroups,
    non_active: BTreeSet<LineId>,
}

impl Classification {
    pub fn evaluate<Z: TimeZone>(
        document: &FeedDocument,
        valid_lines: &BTreeSet<LineId>,
        target_agency: &str,
        at: &DateTime<Z>,
    ) -> Self {
        Self {
            evaluated_at: at.fixed_offset(),
            active: active_by_type(document, valid_lines, target_agency, at),
            non_active: non_active_lines(document, valid_lines, target_agency, at),
        }
    }

    pub fn evaluated_at(&self) -> DateTime<FixedOffset> {
        self.evaluated_at
    }

    pub fn active(&self) -> &AlertGroups {
        &self.active
    }

    pub fn non_active(&self) -> &BTreeSet<LineId> {
        &self.non_active
    }

    /// Lines for one alert type, or the non-active set for [`NON_ACTIVE_ALERTS`].
    /// The sentinel wins over a feed alert type of the same name.
    pub fn get(&self, key: &str) -> Option<&BTreeSet<LineId>> {
        if key == NON_ACTIVE_ALERTS {
            Some(&self.non_active)
        } else {
            self.active.get(key)
        }
    }

    /// `(alert type, lines)` pairs ordered by alert type. With
    /// `include_non_active` the non-active entry is sorted in under its key.
    pub fn items(
        &self,
        include_non_active: bool,
    ) -> impl Iterator<Item = (&str, &BTreeSet<LineId>)> {
        let mut items: Vec<_> = self
            .active
            .iter()
            .map(|(alert_type, lines)| (alert_type.as_str(), lines))
            .collect();
        if include_non_active {
            let at = items.partition_point(|(alert_type, _)| *alert_type < NON_ACTIVE_ALERTS);
            items.insert(at, (NON_ACTIVE_ALERTS, &self.non_active));
        }
        items.into_iter()
    }
}
