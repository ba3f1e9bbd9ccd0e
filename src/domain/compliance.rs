// Goal-tracker compliance scoring over an hourly bin
use super::district::Metric;
use super::hourly::{HOURS_PER_DAY, HourlyBin};
use serde::{Deserialize, Serialize};

/// Which preset a threshold comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Standard {
    Who,
    Th,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComplianceThreshold {
    pub metric: Metric,
    pub standard: Standard,
    pub value: f64,
}

impl ComplianceThreshold {
    pub fn new(metric: Metric, standard: Standard, value: f64) -> Self {
        Self {
            metric,
            standard,
            value,
        }
    }

    /// Classify one hourly value against this threshold.
    ///
    /// Lower-is-better metrics allow a 50% margin before turning unhealthy;
    /// temperature allows 5 degrees above a strict limit.
    pub fn classify(&self, value: f64) -> HourClass {
        let limit = self.value;
        let (within, near) = if self.metric.lower_is_better() {
            (value <= limit, value <= limit * 1.5)
        } else {
            (value < limit, value < limit + 5.0)
        };

        if within {
            HourClass::Good
        } else if near {
            HourClass::Moderate
        } else {
            HourClass::Unhealthy
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HourClass {
    Good,
    Moderate,
    Unhealthy,
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceResult {
    pub hours: [HourClass; HOURS_PER_DAY],
    pub within_hours: u32,
    pub exceed_hours: u32,
    pub longest_streak: u32,
}

/// Score each hour of `bin` and summarise.
///
/// Empty hours count toward neither total and break a good streak. Streaks
/// run from hour 0 to hour 23 and do not wrap.
pub fn score(bin: &HourlyBin, threshold: &ComplianceThreshold) -> ComplianceResult {
    let mut result = ComplianceResult {
        hours: [HourClass::NoData; HOURS_PER_DAY],
        within_hours: 0,
        exceed_hours: 0,
        longest_streak: 0,
    };
    let mut streak = 0;

    for (hour, slot) in bin.slots.iter().enumerate() {
        let class = slot.map_or(HourClass::NoData, |v| threshold.classify(v));
        result.hours[hour] = class;

        match class {
            HourClass::Good => {
                result.within_hours += 1;
                streak += 1;
                result.longest_streak = result.longest_streak.max(streak);
            }
            HourClass::Moderate | HourClass::Unhealthy => {
                result.exceed_hours += 1;
                streak = 0;
            }
            HourClass::NoData => streak = 0,
        }
    }

    result
}
