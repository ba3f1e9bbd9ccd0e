use crate::domain::compliance::{ComplianceThreshold, Standard};
use crate::domain::district::{District, Metric, SensorMetric};
use crate::domain::telemetry::SensorFieldRef;
use anyhow::{Context, bail};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub thingspeak: ThingSpeakSettings,
    #[serde(default)]
    pub polling: PollingSettings,
    pub districts: DistrictsConfig,
    #[serde(default)]
    pub goals: GoalPresets,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ThingSpeakSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// IANA zone used for query windows and hourly binning. Resolved from the
    /// host when absent.
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ThingSpeakSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timezone: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PollingSettings {
    #[serde(default = "default_live_interval_secs")]
    pub live_interval_secs: u64,
    #[serde(default = "default_trend_refresh_secs")]
    pub trend_refresh_secs: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            live_interval_secs: default_live_interval_secs(),
            trend_refresh_secs: default_trend_refresh_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DistrictFields {
    pub pm25: SensorFieldRef,
    pub temp: SensorFieldRef,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DistrictsConfig {
    pub klong: DistrictFields,
    pub thon: DistrictFields,
    pub bang: DistrictFields,
}

impl DistrictsConfig {
    pub fn fields(&self, district: District) -> &DistrictFields {
        match district {
            District::Klong => &self.klong,
            District::Thon => &self.thon,
            District::Bang => &self.bang,
        }
    }

    pub fn field(&self, district: District, metric: SensorMetric) -> &SensorFieldRef {
        let fields = self.fields(district);
        match metric {
            SensorMetric::Pm25 => &fields.pm25,
            SensorMetric::Temp => &fields.temp,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct PresetPair {
    pub who: f64,
    pub th: f64,
}

/// Named goal-tracker thresholds per metric.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GoalPresets {
    #[serde(default = "default_pm25_presets")]
    pub pm25: PresetPair,
    #[serde(default = "default_aqi_presets")]
    pub aqi: PresetPair,
    #[serde(default = "default_temp_presets")]
    pub temp: PresetPair,
}

impl Default for GoalPresets {
    fn default() -> Self {
        Self {
            pm25: default_pm25_presets(),
            aqi: default_aqi_presets(),
            temp: default_temp_presets(),
        }
    }
}

impl GoalPresets {
    /// Resolve a threshold. `custom` is only consulted for
    /// [`Standard::Custom`], which requires a finite value.
    pub fn threshold(
        &self,
        metric: Metric,
        standard: Standard,
        custom: Option<f64>,
    ) -> Option<ComplianceThreshold> {
        let pair = match metric {
            Metric::Pm25 => self.pm25,
            Metric::Aqi => self.aqi,
            Metric::Temp => self.temp,
        };
        let value = match standard {
            Standard::Who => pair.who,
            Standard::Th => pair.th,
            Standard::Custom => custom.filter(|v| v.is_finite())?,
        };
        Some(ComplianceThreshold::new(metric, standard, value))
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_base_url() -> String {
    "https://api.thingspeak.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_live_interval_secs() -> u64 {
    15
}

fn default_trend_refresh_secs() -> u64 {
    5 * 60
}

fn default_pm25_presets() -> PresetPair {
    PresetPair { who: 15.0, th: 37.5 }
}

fn default_aqi_presets() -> PresetPair {
    PresetPair { who: 50.0, th: 100.0 }
}

fn default_temp_presets() -> PresetPair {
    PresetPair { who: 32.0, th: 35.0 }
}

impl DashboardConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.polling.live_interval_secs == 0 || self.polling.trend_refresh_secs == 0 {
            bail!("polling intervals must be greater than zero");
        }
        for district in District::ALL {
            for metric in SensorMetric::ALL {
                let field = self.districts.field(district, metric);
                if field.field_index == 0 {
                    bail!("districts.{}.{} field_index must be 1 or greater", district, metric);
                }
            }
        }
        Ok(())
    }
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard"))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()
        .context("failed to read dashboard configuration")?;

    let config: DashboardConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [thingspeak]
        timezone = "Asia/Bangkok"

        [polling]
        live_interval_secs = 30

        [districts.klong]
        pm25 = { channel_id = "3027679", access_key = "READKEY", field_index = 1 }
        temp = { channel_id = "3027679", field_index = 4 }

        [districts.thon]
        pm25 = { channel_id = "3027679", field_index = 2 }
        temp = { channel_id = "3027679", field_index = 4 }

        [districts.bang]
        pm25 = { channel_id = "3027679", field_index = 3 }
        temp = { channel_id = "YOUR_CHANNEL_ID", field_index = 4 }

        [goals.pm25]
        who = 12.0
        th = 37.5
    "#;

    fn parse(toml: &str) -> anyhow::Result<DashboardConfig> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    #[test]
    fn test_parse_with_defaults() {
        let config = parse(SAMPLE).unwrap();
        config.validate().unwrap();

        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.thingspeak.base_url, "https://api.thingspeak.com");
        assert_eq!(config.thingspeak.timezone.as_deref(), Some("Asia/Bangkok"));
        assert_eq!(config.polling.live_interval_secs, 30);
        assert_eq!(config.polling.trend_refresh_secs, 300);

        let klong_pm = config.districts.field(District::Klong, SensorMetric::Pm25);
        assert_eq!(klong_pm.access_key(), Some("READKEY"));
        assert_eq!(config.districts.field(District::Bang, SensorMetric::Pm25).field_index, 3);
        assert!(!config.districts.field(District::Bang, SensorMetric::Temp).is_configured());

        assert_eq!(config.goals.pm25, PresetPair { who: 12.0, th: 37.5 });
        assert_eq!(config.goals.temp, PresetPair { who: 32.0, th: 35.0 });
    }

    #[test]
    fn test_rejects_zero_field_index() {
        let broken = SAMPLE.replace("field_index = 2", "field_index = 0");
        let config = parse(&broken).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("districts.thon.pm25"));
    }

    #[test]
    fn test_threshold_resolution() {
        let presets = GoalPresets::default();

        let who = presets.threshold(Metric::Pm25, Standard::Who, Some(99.0)).unwrap();
        assert_eq!(who.value, 15.0);

        let th = presets.threshold(Metric::Aqi, Standard::Th, None).unwrap();
        assert_eq!(th.value, 100.0);

        let custom = presets.threshold(Metric::Temp, Standard::Custom, Some(31.0)).unwrap();
        assert_eq!(custom.value, 31.0);

        assert!(presets.threshold(Metric::Temp, Standard::Custom, None).is_none());
        assert!(presets.threshold(Metric::Pm25, Standard::Custom, Some(f64::NAN)).is_none());
    }
}
