// US EPA PM2.5 air quality index
use serde::Serialize;

/// PM2.5 breakpoints: (PM low, PM high, AQI low, AQI high), ascending by PM high.
const PM25_BREAKPOINTS: [(f64, f64, f64, f64); 7] = [
    (0.0, 12.0, 0.0, 50.0),
    (12.1, 35.4, 51.0, 100.0),
    (35.5, 55.4, 101.0, 150.0),
    (55.5, 150.4, 151.0, 200.0),
    (150.5, 250.4, 201.0, 300.0),
    (250.5, 350.4, 301.0, 400.0),
    (350.5, 500.4, 401.0, 500.0),
];

pub const AQI_CEILING: u16 = 500;

/// Convert a PM2.5 concentration (µg/m³) into an AQI score in `0..=500`.
///
/// The first breakpoint row whose upper bound is not below `pm` is
/// interpolated linearly. Concentrations past the table (and NaN, which
/// matches no row) report the hazardous ceiling. Negative concentrations land
/// in the first row and are clamped to 0.
pub fn aqi_from_pm25(pm: f64) -> u16 {
    for (pm_low, pm_high, aqi_low, aqi_high) in PM25_BREAKPOINTS {
        if pm <= pm_high {
            let aqi = ((aqi_high - aqi_low) / (pm_high - pm_low)) * (pm - pm_low) + aqi_low;
            return aqi.round().clamp(0.0, f64::from(AQI_CEILING)) as u16;
        }
    }

    AQI_CEILING
}

/// Qualitative label for an AQI score.
pub fn status_word(aqi: u16) -> &'static str {
    AqiCategory::from_aqi(aqi).status_word()
}

/// EPA AQI band, each inclusive of its upper boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub fn from_aqi(aqi: u16) -> Self {
        match aqi {
            0..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Moderate,
            101..=150 => AqiCategory::UnhealthySensitive,
            151..=200 => AqiCategory::Unhealthy,
            201..=300 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }

    pub fn status_word(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthySensitive => "Unhealthy(SG)",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    /// Short label for the insights badge.
    pub fn badge(&self) -> &'static str {
        match self {
            AqiCategory::UnhealthySensitive => "USG",
            other => other.status_word(),
        }
    }

    /// Style key the render layer maps to badge colors.
    pub fn class_name(&self) -> &'static str {
        match self {
            AqiCategory::Good => "good",
            AqiCategory::Moderate => "moderate",
            AqiCategory::UnhealthySensitive => "usg",
            AqiCategory::Unhealthy => "unhealthy",
            AqiCategory::VeryUnhealthy => "vu",
            AqiCategory::Hazardous => "haz",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Air quality is good; outdoor activity is safe.",
            AqiCategory::Moderate => {
                "Unusually sensitive people should take care and wear a mask if irritated."
            }
            AqiCategory::UnhealthySensitive => {
                "Sensitive groups should limit time outdoors and wear a mask when going out."
            }
            AqiCategory::Unhealthy => "Avoid outdoor activity and wear a high-grade mask.",
            AqiCategory::VeryUnhealthy => "Avoid outdoor activity as much as possible.",
            AqiCategory::Hazardous => "Stay indoors and run an air purifier.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakpoint_edges() {
        assert_eq!(aqi_from_pm25(0.0), 0);
        assert_eq!(aqi_from_pm25(12.0), 50);
        assert_eq!(aqi_from_pm25(12.1), 51);
        assert_eq!(aqi_from_pm25(35.4), 100);
        assert_eq!(aqi_from_pm25(35.5), 101);
        assert_eq!(aqi_from_pm25(55.5), 151);
        assert_eq!(aqi_from_pm25(150.5), 201);
        assert_eq!(aqi_from_pm25(350.5), 401);
        assert_eq!(aqi_from_pm25(500.4), 500);
    }

    #[test]
    fn test_interpolation_midpoints() {
        assert_eq!(aqi_from_pm25(6.0), 25);
        assert_eq!(aqi_from_pm25(18.0), 63);
        assert_eq!(aqi_from_pm25(25.0), 78);
        assert_eq!(aqi_from_pm25(100.0), 174);
    }

    #[test]
    fn test_values_stay_inside_their_band() {
        for (pm_low, pm_high, aqi_low, aqi_high) in PM25_BREAKPOINTS {
            let low_tenths = (pm_low * 10.0).round() as i64;
            let high_tenths = (pm_high * 10.0).round() as i64;
            for tenths in low_tenths..=high_tenths {
                let pm = tenths as f64 / 10.0;
                let aqi = f64::from(aqi_from_pm25(pm));
                assert!(
                    aqi >= aqi_low && aqi <= aqi_high,
                    "pm {pm} gave {aqi}, expected within {aqi_low}..={aqi_high}"
                );
            }
        }
    }

    #[test]
    fn test_ceiling_and_out_of_range() {
        assert_eq!(aqi_from_pm25(600.0), 500);
        assert_eq!(aqi_from_pm25(f64::INFINITY), 500);
        assert_eq!(aqi_from_pm25(f64::NAN), 500);
        assert_eq!(aqi_from_pm25(-5.0), 0);
    }

    #[test]
    fn test_status_word_bands() {
        assert_eq!(status_word(0), "Good");
        assert_eq!(status_word(50), "Good");
        assert_eq!(status_word(51), "Moderate");
        assert_eq!(status_word(100), "Moderate");
        assert_eq!(status_word(150), "Unhealthy(SG)");
        assert_eq!(status_word(200), "Unhealthy");
        assert_eq!(status_word(300), "Very Unhealthy");
        assert_eq!(status_word(301), "Hazardous");
        assert_eq!(status_word(500), "Hazardous");
    }

    #[test]
    fn test_category_badges() {
        assert_eq!(AqiCategory::from_aqi(120).badge(), "USG");
        assert_eq!(AqiCategory::from_aqi(120).class_name(), "usg");
        assert_eq!(AqiCategory::from_aqi(250).badge(), "Very Unhealthy");
        assert_eq!(AqiCategory::from_aqi(420).class_name(), "haz");
    }
}
