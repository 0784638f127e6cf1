use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::models::TrafficSample;
use crate::store::TrafficStore;

/// Filters applied to the traffic log when building a series for charting.
///
/// `start` and `end` are both inclusive. Counter flags default to on.
#[derive(Debug, Clone)]
pub struct TrafficQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub show_in: bool,
    pub show_out: bool,
}

impl Default for TrafficQuery {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            show_in: true,
            show_out: true,
        }
    }
}

/// One aligned point in a queried series.
///
/// Counter presence is independent per point: a sample whose inbound read
/// failed still contributes its timestamp and outbound value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficPoint {
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_octets: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_octets: Option<u64>,
}

/// Parallel-list projection consumed by the chart renderer.
///
/// Each counter list keeps only the values that were present, filtered
/// independently of the timestamp axis, so the lists can be shorter than
/// `timestamps`. A counter whose `show_*` flag was off is omitted entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrafficSeries {
    pub timestamps: Vec<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_octets: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_octets: Option<Vec<u64>>,
}

/// Read side of the traffic log: pure filter and projection, no aggregation,
/// downsampling or interpolation. Every query re-reads the backing store.
pub struct TrafficQueryEngine {
    store: Arc<dyn TrafficStore>,
}

impl TrafficQueryEngine {
    pub fn new(store: Arc<dyn TrafficStore>) -> Self {
        Self { store }
    }

    /// Returns the matching samples for one device as aligned points,
    /// in append order.
    pub async fn query(
        &self,
        equipment_id: i32,
        query: &TrafficQuery,
    ) -> Result<Vec<TrafficPoint>, AppError> {
        let samples = self.store.load_all().await?;
        Ok(filter_points(samples, equipment_id, query))
    }

    /// Returns the chart-renderer projection for one device.
    pub async fn query_series(
        &self,
        equipment_id: i32,
        query: &TrafficQuery,
    ) -> Result<TrafficSeries, AppError> {
        let points = self.query(equipment_id, query).await?;
        Ok(project_series(&points, query))
    }
}

fn filter_points(
    samples: Vec<TrafficSample>,
    equipment_id: i32,
    query: &TrafficQuery,
) -> Vec<TrafficPoint> {
    samples
        .into_iter()
        .filter(|s| s.equipment_id == equipment_id)
        .filter(|s| query.start.map_or(true, |start| s.timestamp >= start))
        .filter(|s| query.end.map_or(true, |end| s.timestamp <= end))
        .map(|s| TrafficPoint {
            timestamp: s.timestamp,
            in_octets: if query.show_in { s.in_octets } else { None },
            out_octets: if query.show_out { s.out_octets } else { None },
        })
        .collect()
}

fn project_series(points: &[TrafficPoint], query: &TrafficQuery) -> TrafficSeries {
    TrafficSeries {
        timestamps: points.iter().map(|p| p.timestamp).collect(),
        in_octets: query
            .show_in
            .then(|| points.iter().filter_map(|p| p.in_octets).collect()),
        out_octets: query
            .show_out
            .then(|| points.iter().filter_map(|p| p.out_octets).collect()),
    }
}
