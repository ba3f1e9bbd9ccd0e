// District and metric domain models
use super::aqi::{AqiCategory, aqi_from_pm25, status_word};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum District {
    Klong,
    Thon,
    Bang,
}

impl District {
    pub const ALL: [District; 3] = [District::Klong, District::Thon, District::Bang];

    pub fn id(&self) -> &'static str {
        match self {
            District::Klong => "klong",
            District::Thon => "thon",
            District::Bang => "bang",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            District::Klong => "Klong San",
            District::Thon => "Thon Buri",
            District::Bang => "Bang Rak",
        }
    }
}

impl fmt::Display for District {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A metric read straight from an upstream field. Also names a dashboard
/// section, each with its own viewing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorMetric {
    Pm25,
    Temp,
}

impl SensorMetric {
    pub const ALL: [SensorMetric; 2] = [SensorMetric::Pm25, SensorMetric::Temp];
}

impl fmt::Display for SensorMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorMetric::Pm25 => f.write_str("pm25"),
            SensorMetric::Temp => f.write_str("temp"),
        }
    }
}

/// Any metric the goal tracker can score, including derived AQI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Pm25,
    Aqi,
    Temp,
}

impl Metric {
    /// The upstream metric the values come from. AQI derives from PM2.5.
    pub fn sensor(&self) -> SensorMetric {
        match self {
            Metric::Pm25 | Metric::Aqi => SensorMetric::Pm25,
            Metric::Temp => SensorMetric::Temp,
        }
    }

    /// Whether larger readings are worse. Only temperature scores the other way.
    pub fn lower_is_better(&self) -> bool {
        !matches!(self, Metric::Temp)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Pm25 => f.write_str("pm25"),
            Metric::Aqi => f.write_str("aqi"),
            Metric::Temp => f.write_str("temp"),
        }
    }
}

/// Raw readings held for one district. AQI is always computed from `pm25`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistrictReading {
    pub pm25: f64,
    pub temp: f64,
}

impl DistrictReading {
    pub fn new(pm25: f64, temp: f64) -> Self {
        Self { pm25, temp }
    }

    /// Demo values shown until the first successful fetch.
    pub fn seed(district: District) -> Self {
        match district {
            District::Klong => Self::new(12.0, 29.4),
            District::Thon => Self::new(18.0, 30.2),
            District::Bang => Self::new(25.0, 31.1),
        }
    }

    pub fn aqi(&self) -> u16 {
        aqi_from_pm25(self.pm25)
    }

    pub fn get(&self, metric: SensorMetric) -> f64 {
        match metric {
            SensorMetric::Pm25 => self.pm25,
            SensorMetric::Temp => self.temp,
        }
    }

    pub fn set(&mut self, metric: SensorMetric, value: f64) {
        match metric {
            SensorMetric::Pm25 => self.pm25 = value,
            SensorMetric::Temp => self.temp = value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictSnapshot {
    pub district: District,
    pub name: &'static str,
    pub pm25: f64,
    pub temp: f64,
    pub aqi: u16,
    pub status: &'static str,
}

impl DistrictSnapshot {
    pub fn new(district: District, reading: &DistrictReading) -> Self {
        let aqi = reading.aqi();
        Self {
            district,
            name: district.display_name(),
            pm25: reading.pm25,
            temp: reading.temp,
            aqi,
            status: status_word(aqi),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedDistrict {
    pub district: District,
    pub aqi: u16,
}

/// Summary across districts for the insights card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub overall_aqi: u16,
    pub best: RankedDistrict,
    pub worst: RankedDistrict,
    pub category: AqiCategory,
    pub badge: &'static str,
    pub class_name: &'static str,
    pub advice: &'static str,
}

impl Insights {
    /// Overall is the worst AQI. Ties resolve to the earliest district.
    pub fn from_snapshots(snapshots: &[DistrictSnapshot]) -> Option<Self> {
        let first = snapshots.first()?;
        let mut best = first;
        let mut worst = first;
        for snapshot in &snapshots[1..] {
            if snapshot.aqi < best.aqi {
                best = snapshot;
            }
            if snapshot.aqi > worst.aqi {
                worst = snapshot;
            }
        }

        let category = AqiCategory::from_aqi(worst.aqi);
        Some(Self {
            overall_aqi: worst.aqi,
            best: RankedDistrict {
                district: best.district,
                aqi: best.aqi,
            },
            worst: RankedDistrict {
                district: worst.district,
                aqi: worst.aqi,
            },
            category,
            badge: category.badge(),
            class_name: category.class_name(),
            advice: category.advice(),
        })
    }
}
