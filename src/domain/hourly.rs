// Hourly reduction of a day's samples for the goal tracker
use super::aqi::aqi_from_pm25;
use super::district::Metric;
use super::telemetry::Sample;
use chrono::Timelike;
use chrono_tz::Tz;
use serde::Serialize;

pub const HOURS_PER_DAY: usize = 24;

/// Mean value per local hour, `None` where no sample fell in that hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyBin {
    pub slots: [Option<f64>; HOURS_PER_DAY],
    pub counts: [u32; HOURS_PER_DAY],
}

impl HourlyBin {
    pub fn empty() -> Self {
        Self {
            slots: [None; HOURS_PER_DAY],
            counts: [0; HOURS_PER_DAY],
        }
    }

    #[cfg(test)]
    pub fn from_slots(slots: [Option<f64>; HOURS_PER_DAY]) -> Self {
        let mut counts = [0; HOURS_PER_DAY];
        for (count, slot) in counts.iter_mut().zip(slots.iter()) {
            *count = u32::from(slot.is_some());
        }
        Self { slots, counts }
    }

    pub fn filled_hours(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

/// Bucket samples by their local hour in `tz` and average each bucket.
///
/// For [`Metric::Aqi`] the series holds PM2.5 and each hourly mean is
/// converted afterwards, so the AQI is of the average rather than an average
/// of AQIs.
pub fn bin_hourly(series: &[Sample], metric: Metric, tz: &Tz) -> HourlyBin {
    let mut sums = [0.0_f64; HOURS_PER_DAY];
    let mut bin = HourlyBin::empty();

    for sample in series {
        let hour = sample.timestamp.with_timezone(tz).hour() as usize;
        sums[hour] += sample.value;
        bin.counts[hour] += 1;
    }

    for hour in 0..HOURS_PER_DAY {
        let count = bin.counts[hour];
        if count == 0 {
            continue;
        }
        let mean = sums[hour] / f64::from(count);
        bin.slots[hour] = Some(match metric {
            Metric::Aqi => f64::from(aqi_from_pm25(mean)),
            Metric::Pm25 | Metric::Temp => mean,
        });
    }

    bin
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use chrono_tz::Asia::Bangkok;

    fn local_sample(hour: u32, minute: u32, value: f64) -> Sample {
        let local = Bangkok.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap();
        Sample::new(local.with_timezone(&Utc), value)
    }

    #[test]
    fn test_two_samples_in_one_hour() {
        let series = vec![local_sample(5, 10, 10.0), local_sample(5, 50, 20.0)];
        let bin = bin_hourly(&series, Metric::Pm25, &Bangkok);

        assert_eq!(bin.slots[5], Some(15.0));
        assert_eq!(bin.counts[5], 2);
        assert_eq!(bin.filled_hours(), 1);
        for (hour, slot) in bin.slots.iter().enumerate() {
            if hour != 5 {
                assert_eq!(*slot, None, "hour {hour} should be empty");
            }
        }
    }

    #[test]
    fn test_local_hour_not_utc_hour() {
        // 23:30 UTC is 06:30 in Bangkok
        let sample = Sample::new(Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap(), 7.0);
        let bin = bin_hourly(&[sample], Metric::Temp, &Bangkok);
        assert_eq!(bin.slots[6], Some(7.0));
        assert_eq!(bin.slots[23], None);
    }

    #[test]
    fn test_aqi_averages_before_transform() {
        // mean PM 12.0 gives AQI 50; averaging the AQIs 0 and 76 would give 38
        let series = vec![local_sample(8, 0, 0.0), local_sample(8, 30, 24.0)];
        let bin = bin_hourly(&series, Metric::Aqi, &Bangkok);
        assert_eq!(bin.slots[8], Some(50.0));
    }

    #[test]
    fn test_order_independent() {
        let a = vec![
            local_sample(1, 0, 4.0),
            local_sample(9, 0, 8.0),
            local_sample(1, 30, 6.0),
        ];
        let mut b = a.clone();
        b.reverse();
        assert_eq!(
            bin_hourly(&a, Metric::Pm25, &Bangkok),
            bin_hourly(&b, Metric::Pm25, &Bangkok)
        );
    }

    #[test]
    fn test_empty_series() {
        let bin = bin_hourly(&[], Metric::Pm25, &Bangkok);
        assert_eq!(bin, HourlyBin::empty());
    }
}
