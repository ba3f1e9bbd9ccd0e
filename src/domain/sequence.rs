// Per-key request tickets so only the newest completion is applied
use super::district::SensorMetric;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKey {
    /// Live and historical reading polls of one section share a key, so a
    /// newer request of either kind supersedes an older one.
    Readings(SensorMetric),
    Trend(SensorMetric),
    Goal,
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: HashMap<RequestKey, u64>,
}

impl RequestSequencer {
    /// Issue a new ticket for `key`, superseding every earlier one.
    pub fn issue(&mut self, key: RequestKey) -> u64 {
        let latest = self.latest.entry(key).or_insert(0);
        *latest += 1;
        *latest
    }

    pub fn is_current(&self, key: RequestKey, ticket: u64) -> bool {
        self.latest.get(&key) == Some(&ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_ticket_supersedes_older() {
        let mut sequencer = RequestSequencer::default();
        let key = RequestKey::Readings(SensorMetric::Pm25);

        let first = sequencer.issue(key);
        let second = sequencer.issue(key);

        assert!(!sequencer.is_current(key, first));
        assert!(sequencer.is_current(key, second));
    }

    #[test]
    fn test_keys_are_independent() {
        let mut sequencer = RequestSequencer::default();
        let pm = sequencer.issue(RequestKey::Trend(SensorMetric::Pm25));
        sequencer.issue(RequestKey::Trend(SensorMetric::Temp));
        sequencer.issue(RequestKey::Goal);

        assert!(sequencer.is_current(RequestKey::Trend(SensorMetric::Pm25), pm));
        assert!(!sequencer.is_current(RequestKey::Readings(SensorMetric::Pm25), pm));
    }
}
