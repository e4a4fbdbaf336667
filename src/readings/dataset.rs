//! Caller-owned accumulation of parsed readings and read-only queries over it

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use utoipa::ToSchema;

use super::models::{DatasetResult, IotDataPoint, ParseError};

/// Criteria for selecting points; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PointFilter {
    pub plant: Option<String>,
    pub sensor: Option<String>,
    /// Inclusive lower bound on the reading date
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the reading date
    pub to: Option<DateTime<Utc>>,
}

impl PointFilter {
    pub fn matches(&self, point: &IotDataPoint) -> bool {
        self.plant
            .as_deref()
            .is_none_or(|plant| point.plant == plant.trim())
            && self
                .sensor
                .as_deref()
                .is_none_or(|sensor| point.sensor_name == sensor.trim())
            && self.from.is_none_or(|from| point.date >= from)
            && self.to.is_none_or(|to| point.date <= to)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConsumptionSummary {
    pub readings: usize,
    pub total_kw: f64,
    pub first_reading: Option<DateTime<Utc>>,
    pub last_reading: Option<DateTime<Utc>>,
    pub by_plant: BTreeMap<String, f64>,
    pub by_sensor: BTreeMap<String, f64>,
    pub by_day: BTreeMap<NaiveDate, f64>,
    pub row_errors: usize,
}

/// Readings gathered from one or more parsed worksheets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    points: Vec<IotDataPoint>,
    errors: Vec<ParseError>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_result(result: DatasetResult) -> Self {
        let mut dataset = Self::new();
        dataset.append(result);
        dataset
    }

    /// Add another parse result after the existing points and errors
    pub fn append(&mut self, result: DatasetResult) {
        self.points.extend(result.points);
        self.errors.extend(result.errors);
    }

    pub fn plants(&self) -> Vec<&str> {
        let plants: BTreeSet<&str> = self.points.iter().map(|p| p.plant.as_str()).collect();
        plants.into_iter().collect()
    }

    /// Distinct sensors, optionally restricted to one plant
    pub fn sensors(&self, plant: Option<&str>) -> Vec<&str> {
        let sensors: BTreeSet<&str> = self
            .points
            .iter()
            .filter(|p| plant.is_none_or(|plant| p.plant == plant))
            .map(|p| p.sensor_name.as_str())
            .collect();
        sensors.into_iter().collect()
    }

    pub fn filter<'a>(
        &'a self,
        filter: &'a PointFilter,
    ) -> impl Iterator<Item = &'a IotDataPoint> + 'a {
        self.points.iter().filter(move |p| filter.matches(p))
    }

    pub fn total_consumption(&self, filter: &PointFilter) -> f64 {
        self.filter(filter).map(|p| p.consumed_kw).sum()
    }

    pub fn consumption_by_plant(&self, filter: &PointFilter) -> BTreeMap<String, f64> {
        self.sum_by(filter, |p| p.plant.clone())
    }

    pub fn consumption_by_sensor(&self, filter: &PointFilter) -> BTreeMap<String, f64> {
        self.sum_by(filter, |p| p.sensor_name.clone())
    }

    pub fn consumption_by_day(&self, filter: &PointFilter) -> BTreeMap<NaiveDate, f64> {
        self.sum_by(filter, |p| p.date.date_naive())
    }

    /// Earliest and latest reading among the filtered points
    pub fn date_span(&self, filter: &PointFilter) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.filter(filter).fold(None, |span, p| match span {
            None => Some((p.date, p.date)),
            Some((first, last)) => Some((first.min(p.date), last.max(p.date))),
        })
    }

    pub fn summarize(&self, filter: &PointFilter) -> ConsumptionSummary {
        let span = self.date_span(filter);
        ConsumptionSummary {
            readings: self.filter(filter).count(),
            total_kw: self.total_consumption(filter),
            first_reading: span.map(|(first, _)| first),
            last_reading: span.map(|(_, last)| last),
            by_plant: self.consumption_by_plant(filter),
            by_sensor: self.consumption_by_sensor(filter),
            by_day: self.consumption_by_day(filter),
            row_errors: self.errors.len(),
        }
    }

    fn sum_by<K: Ord>(
        &self,
        filter: &PointFilter,
        key: impl Fn(&IotDataPoint) -> K,
    ) -> BTreeMap<K, f64> {
        let mut totals = BTreeMap::new();
        for point in self.filter(filter) {
            *totals.entry(key(point)).or_insert(0.0) += point.consumed_kw;
        }
        totals
    }
}
