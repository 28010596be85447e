//! Day-bucketing of the flat 3-hour forecast list.

use std::collections::HashMap;

use chrono::{DateTime, Local, Locale, Utc};
use chrono_tz::Tz;

use crate::model::ForecastSample;

/// Time zone used to turn timestamps into day and time labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    /// Whatever zone the host is configured with.
    #[default]
    Local,
    Named(Tz),
}

/// How timestamps are rendered into labels.
#[derive(Debug, Clone, Copy)]
pub struct LabelPolicy {
    pub zone: DisplayZone,
    pub locale: Locale,
}

impl Default for LabelPolicy {
    fn default() -> Self {
        Self { zone: DisplayZone::Local, locale: Locale::en_US }
    }
}

impl LabelPolicy {
    pub fn new(zone: DisplayZone, locale: Locale) -> Self {
        Self { zone, locale }
    }

    /// Short weekday name, e.g. "Mon".
    pub fn day_label(&self, timestamp: i64) -> String {
        self.format(timestamp, "%a")
    }

    /// 12-hour clock without leading zero, e.g. "3 PM".
    pub fn time_label(&self, timestamp: i64) -> String {
        self.format(timestamp, "%-I %p")
    }

    fn format(&self, timestamp: i64, fmt: &str) -> String {
        let utc: DateTime<Utc> = DateTime::from_timestamp(timestamp, 0).unwrap_or_else(|| {
            tracing::warn!(timestamp, "forecast timestamp out of range, labelling as epoch");
            DateTime::default()
        });
        match self.zone {
            DisplayZone::Local => {
                utc.with_timezone(&Local).format_localized(fmt, self.locale).to_string()
            }
            DisplayZone::Named(tz) => {
                utc.with_timezone(&tz).format_localized(fmt, self.locale).to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    pub label: String,
    pub samples: Vec<ForecastSample>,
}

/// Buckets in the order their day label first appeared.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastGroups {
    buckets: Vec<DayBucket>,
}

impl ForecastGroups {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.buckets.iter().map(|b| b.label.as_str()).collect()
    }

    pub fn get(&self, label: &str) -> Option<&[ForecastSample]> {
        self.buckets.iter().find(|b| b.label == label).map(|b| b.samples.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &DayBucket> {
        self.buckets.iter()
    }

    pub fn total_samples(&self) -> usize {
        self.buckets.iter().map(|b| b.samples.len()).sum()
    }
}

impl<'a> IntoIterator for &'a ForecastGroups {
    type Item = &'a DayBucket;
    type IntoIter = std::slice::Iter<'a, DayBucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}

/// Group samples by day label, keeping input order inside each bucket.
///
/// Input is not re-sorted; the API already delivers it chronologically.
pub fn group(samples: &[ForecastSample], policy: &LabelPolicy) -> ForecastGroups {
    let mut buckets: Vec<DayBucket> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for sample in samples {
        let label = policy.day_label(sample.timestamp);
        let slot = *index.entry(label.clone()).or_insert_with(|| {
            buckets.push(DayBucket { label, samples: Vec::new() });
            buckets.len() - 1
        });
        buckets[slot].samples.push(sample.clone());
    }

    ForecastGroups { buckets }
}
