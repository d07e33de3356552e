//! Chart bucketing over prescription records.
//!
//! Everything here is a pure function of its input and an explicit `today`,
//! so the same records and the same day always produce the same buckets.

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;

use crate::models::{
    dates::{day_label, month_label},
    AnalyticsSummary, ChartData, Gender, Prescription, StatEntry,
};

/// Fixed, inclusive age bands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBand {
    Child,
    YoungAdult,
    Adult,
    Senior,
    Elderly,
}

impl AgeBand {
    pub const ALL: [AgeBand; 5] = [
        AgeBand::Child,
        AgeBand::YoungAdult,
        AgeBand::Adult,
        AgeBand::Senior,
        AgeBand::Elderly,
    ];

    pub fn of(age: i32) -> Self {
        match age {
            i32::MIN..=18 => AgeBand::Child,
            19..=35 => AgeBand::YoungAdult,
            36..=50 => AgeBand::Adult,
            51..=65 => AgeBand::Senior,
            _ => AgeBand::Elderly,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBand::Child => "0-18",
            AgeBand::YoungAdult => "19-35",
            AgeBand::Adult => "36-50",
            AgeBand::Senior => "51-65",
            AgeBand::Elderly => "66+",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Count of records for one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub count: u64,
}

/// The `window` days ending with `today`, oldest first.
///
/// Days before the start of the calendar are skipped.
pub fn trailing_days(today: NaiveDate, window: u32) -> Vec<NaiveDate> {
    (0..window)
        .rev()
        .filter_map(|offset| today.checked_sub_signed(Duration::days(i64::from(offset))))
        .collect()
}

/// The `window` calendar months ending with the month of `today`, oldest first
pub fn trailing_months(today: NaiveDate, window: u32) -> Vec<(i32, u32)> {
    let current = i64::from(today.year()) * 12 + i64::from(today.month0());
    (0..i64::from(window))
        .rev()
        .filter_map(|offset| {
            let index = current - offset;
            let year = i32::try_from(index.div_euclid(12)).ok()?;
            Some((year, index.rem_euclid(12) as u32 + 1))
        })
        .collect()
}

/// Male, Female, Other in that order; unknown codes are already folded into Other
pub fn gender_distribution(records: &[Prescription]) -> ChartData {
    let mut counts = [0u64; 3];
    for record in records {
        let slot = match record.patient_gender {
            Gender::Male => 0,
            Gender::Female => 1,
            Gender::Other => 2,
        };
        counts[slot] += 1;
    }

    let entries = Gender::ALL
        .iter()
        .zip(counts)
        .map(|(gender, count)| StatEntry::new(gender.to_string(), count))
        .collect();
    ChartData::new("Prescriptions by Gender", entries)
}

pub fn age_distribution(records: &[Prescription]) -> ChartData {
    let mut counts = [0u64; 5];
    for record in records {
        counts[AgeBand::of(record.patient_age).index()] += 1;
    }

    let entries = AgeBand::ALL
        .iter()
        .zip(counts)
        .map(|(band, count)| StatEntry::new(band.label(), count))
        .collect();
    ChartData::new("Prescriptions by Age Group", entries)
}

/// Per-day counts over the trailing window; records outside it are ignored
pub fn daily_buckets(records: &[Prescription], today: NaiveDate, window: u32) -> Vec<DailyBucket> {
    let mut buckets: Vec<DailyBucket> = trailing_days(today, window)
        .into_iter()
        .map(|date| DailyBucket { date, count: 0 })
        .collect();

    let Some(first) = buckets.first().map(|b| b.date) else {
        return buckets;
    };
    for record in records {
        let offset = (record.prescription_date - first).num_days();
        if offset >= 0 && (offset as usize) < buckets.len() {
            buckets[offset as usize].count += 1;
        }
    }
    buckets
}

/// Per-day counts looked up in a server summary, zero-filled for missing days
pub fn daily_buckets_from_summary(
    summary: &AnalyticsSummary,
    today: NaiveDate,
    window: u32,
) -> Vec<DailyBucket> {
    trailing_days(today, window)
        .into_iter()
        .map(|date| DailyBucket {
            date,
            count: summary.daily_breakdown.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

pub fn daily_chart(buckets: &[DailyBucket]) -> ChartData {
    let entries = buckets
        .iter()
        .map(|b| StatEntry::new(day_label(b.date), b.count))
        .collect();
    ChartData::new(
        format!("Daily Prescriptions (Last {} Days)", buckets.len()),
        entries,
    )
}

pub fn daily_distribution(records: &[Prescription], today: NaiveDate, window: u32) -> ChartData {
    daily_chart(&daily_buckets(records, today, window))
}

pub fn monthly_distribution(records: &[Prescription], today: NaiveDate, window: u32) -> ChartData {
    let months = trailing_months(today, window);
    let mut counts: BTreeMap<(i32, u32), u64> = months.iter().map(|m| (*m, 0)).collect();

    for record in records {
        let key = (record.prescription_date.year(), record.prescription_date.month());
        if let Some(count) = counts.get_mut(&key) {
            *count += 1;
        }
    }

    let entries = months
        .iter()
        .map(|(year, month)| {
            StatEntry::new(month_label(*year, *month), counts.get(&(*year, *month)).copied().unwrap_or(0))
        })
        .collect();
    ChartData::new(
        format!("Monthly Prescriptions (Last {} Months)", window),
        entries,
    )
}

/// Summary numbers computed locally when the server does not provide them.
///
/// "This week" covers the seven days before today plus today itself.
pub fn summarize(records: &[Prescription], today: NaiveDate, window: u32) -> AnalyticsSummary {
    let week_start = today - Duration::days(7);
    let today_count = records
        .iter()
        .filter(|r| r.prescription_date == today)
        .count() as u64;
    let week_count = records
        .iter()
        .filter(|r| r.prescription_date >= week_start && r.prescription_date <= today)
        .count() as u64;

    AnalyticsSummary {
        total_prescriptions: records.len() as u64,
        today_prescriptions: today_count,
        this_week_prescriptions: week_count,
        daily_breakdown: daily_buckets(records, today, window)
            .into_iter()
            .map(|b| (b.date, b.count))
            .collect(),
    }
}
