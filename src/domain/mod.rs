// Domain layer - Pure models and derived-metric rules
pub mod aqi;
pub mod compliance;
pub mod dashboard;
pub mod district;
pub mod hourly;
pub mod numeric;
pub mod sequence;
pub mod telemetry;
pub mod window;
