//! Analytics summary and chart data types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary object returned by the analytics endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    #[serde(default)]
    pub total_prescriptions: u64,
    #[serde(default)]
    pub today_prescriptions: u64,
    #[serde(default)]
    pub this_week_prescriptions: u64,
    /// Count per `YYYY-MM-DD` day over the trailing window
    #[serde(default)]
    pub daily_breakdown: BTreeMap<NaiveDate, u64>,
}

/// One labelled bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatEntry {
    pub label: String,
    pub value: u64,
}

impl StatEntry {
    pub fn new(label: impl Into<String>, value: u64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Label/count series handed to a chart renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub title: String,
    pub entries: Vec<StatEntry>,
}

impl ChartData {
    pub fn new(title: impl Into<String>, entries: Vec<StatEntry>) -> Self {
        Self {
            title: title.into(),
            entries,
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    pub fn values(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.value).collect()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.value).sum()
    }
}

/// Where an analytics report's numbers came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSource {
    ServerSummary,
    ClientAggregation,
}

/// Everything the charts view renders
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub source: ReportSource,
    pub summary: AnalyticsSummary,
    pub daily: ChartData,
    /// Only available when individual records were fetched
    pub gender: Option<ChartData>,
    pub age: Option<ChartData>,
    pub monthly: Option<ChartData>,
}
