// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod fallback;
pub mod http_transport;
pub mod sse;
pub mod thingspeak_repository;
pub mod timezone;
