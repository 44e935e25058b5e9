//! Alert feed data model and its JSON decoding.
//!
//! The feed is GTFS-realtime rendered as JSON, with the MTA "mercury"
//! extension carrying the human-readable alert type. Decoding is strict about
//! the top-level `entity` array and forgiving below it: a record that does not
//! have the shape we need is dropped on its own and the rest of the feed is kept.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Route code of a transit line, e.g. `"N"` or `"SI"`.
pub type LineId = String;

/// `[start, end)` window; no `end` means open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePeriod {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl ActivePeriod {
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && self.end.is_none_or(|end| end > at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InformedEntity {
    pub agency_id: String,
    pub route_id: Option<LineId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEntity {
    pub id: Option<String>,
    pub alert_type: String,
    pub informed_entities: Vec<InformedEntity>,
    pub active_periods: Vec<ActivePeriod>,
}

impl AlertEntity {
    /// An alert with no active periods is never active.
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.active_periods.iter().any(|p| p.is_active_at(at))
    }
}

/// One fetch worth of alerts, in feed order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedDocument {
    pub entities: Vec<AlertEntity>,
}

impl FeedDocument {
    pub fn new(entities: Vec<AlertEntity>) -> Self {
        Self { entities }
    }

    /// Decode a feed body. Fails only if the body is not JSON or has no
    /// `entity` array; malformed entities inside it are skipped.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let feed: WireFeed = serde_json::from_slice(body)?;
        let total = feed.entity.len();

        let entities: Vec<AlertEntity> = feed
            .entity
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| decode_entity(index, value))
            .collect();

        if entities.len() < total {
            debug!(
                total,
                kept = entities.len(),
                "dropped feed entities without a usable alert"
            );
        }
        Ok(Self { entities })
    }
}

#[derive(Deserialize)]
struct WireFeed {
    entity: Vec<Value>,
}

#[derive(Deserialize)]
struct WireEntity {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    alert: Option<WireAlert>,
}

#[derive(Deserialize)]
struct WireAlert {
    #[serde(default)]
    informed_entity: Vec<Value>,
    #[serde(default)]
    active_period: Vec<Value>,
    #[serde(rename = "transit_realtime.mercury_alert", default)]
    mercury: Option<WireMercuryAlert>,
}

#[derive(Deserialize)]
struct WireMercuryAlert {
    #[serde(default)]
    alert_type: Option<String>,
}

#[derive(Deserialize)]
struct WireInformedEntity {
    #[serde(default)]
    agency_id: Option<String>,
    #[serde(default)]
    route_id: Option<String>,
}

#[derive(Deserialize)]
struct WirePeriod {
    #[serde(default)]
    start: Option<EpochSeconds>,
    #[serde(default)]
    end: Option<EpochSeconds>,
}

/// protobuf-JSON renders uint64 as a string, other encoders as a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum EpochSeconds {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl EpochSeconds {
    fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            EpochSeconds::Integer(secs) => DateTime::from_timestamp(*secs, 0),
            EpochSeconds::Float(secs) => fractional_instant(*secs),
            EpochSeconds::Text(text) => {
                let text = text.trim();
                match text.parse::<i64>() {
                    Ok(secs) => DateTime::from_timestamp(secs, 0),
                    Err(_) => fractional_instant(text.parse().ok()?),
                }
            }
        }
    }
}

/// Keeps the sub-second part so bounds compare exactly against the evaluation instant.
fn fractional_instant(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round() as u32;
    let (whole, nanos) = if nanos >= 1_000_000_000 {
        (whole + 1.0, 0)
    } else {
        (whole, nanos)
    };
    DateTime::from_timestamp(whole as i64, nanos)
}

fn decode_entity(index: usize, value: Value) -> Option<AlertEntity> {
    let entity: WireEntity = match serde_json::from_value(value) {
        Ok(entity) => entity,
        Err(e) => {
            debug!(index, error = %e, "skipping malformed feed entity");
            return None;
        }
    };
    let alert = entity.alert?;

    let Some(alert_type) = alert.mercury.and_then(|m| m.alert_type) else {
        debug!(index, id = ?entity.id, "skipping alert without an alert type");
        return None;
    };

    let informed_entities = alert
        .informed_entity
        .into_iter()
        .filter_map(|value| {
            let informed: WireInformedEntity = serde_json::from_value(value).ok()?;
            Some(InformedEntity {
                agency_id: informed.agency_id?,
                route_id: informed.route_id,
            })
        })
        .collect();

    let active_periods = alert
        .active_period
        .into_iter()
        .filter_map(|value| {
            let period: WirePeriod = serde_json::from_value(value).ok()?;
            Some(ActivePeriod {
                start: period.start.as_ref().and_then(EpochSeconds::instant)?,
                end: period.end.as_ref().and_then(EpochSeconds::instant),
            })
        })
        .collect();

    Some(AlertEntity {
        id: entity.id,
        alert_type,
        informed_entities,
        active_periods,
    })
}
