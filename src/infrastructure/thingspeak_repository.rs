// ThingSpeak repository implementation
use crate::application::telemetry_repository::{TelemetryError, TelemetryRepository};
use crate::domain::numeric::{coerce, coerce_str};
use crate::domain::telemetry::{Sample, SensorFieldRef, Series, sort_series};
use crate::domain::window::{TimeWindow, format_local, parse_local};
use crate::infrastructure::fallback::{Attempt, first_success};
use crate::infrastructure::http_transport::HttpTransport;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use futures::FutureExt;
use serde_json::{Map, Value};
use std::sync::Arc;

type FeedRecord = Map<String, Value>;

pub struct ThingSpeakRepository {
    base_url: String,
    timezone: Tz,
    transport: Arc<dyn HttpTransport>,
}

impl ThingSpeakRepository {
    pub fn new(base_url: String, timezone: Tz, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timezone,
            transport,
        }
    }

    fn build_url(&self, field: &SensorFieldRef, path: &str, params: &[(&str, String)]) -> String {
        let mut query: Vec<String> = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect();
        if let Some(key) = field.access_key() {
            query.push(format!("api_key={}", urlencoding::encode(key)));
        }

        let mut url = format!(
            "{}/channels/{}/{}",
            self.base_url,
            urlencoding::encode(field.channel_id.trim()),
            path
        );
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }
        url
    }

    /// GET `url` and return the body of a 2xx reply.
    async fn get_body(&self, url: &str) -> Result<String, TelemetryError> {
        let reply = self.transport.get(url).await?;
        if !reply.is_success() {
            return Err(TelemetryError::Status {
                url: url.to_string(),
                status: reply.status,
            });
        }
        Ok(reply.body)
    }

    /// Every record of the feed listing inside `window`, uncapped.
    async fn fetch_feed_window(
        &self,
        field: &SensorFieldRef,
        window: TimeWindow,
    ) -> Result<Vec<FeedRecord>, TelemetryError> {
        let url = self.build_url(
            field,
            "feeds.json",
            &[
                ("start", format_local(window.start, &self.timezone)),
                ("end", format_local(window.end, &self.timezone)),
                ("timezone", self.timezone.name().to_string()),
            ],
        );

        tracing::debug!(
            "Fetching feed window for channel {} field {} ({} .. {})",
            field.channel_id,
            field.field_index,
            window.start,
            window.end
        );

        let body = self.get_body(&url).await?;
        let doc = parse_json(&url, &body)?;
        Ok(feed_records(doc))
    }

    fn parse_created_at(&self, raw: Option<&Value>) -> Option<DateTime<Utc>> {
        let raw = raw?.as_str()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .ok()
            .or_else(|| parse_local(raw, &self.timezone))
    }

    /// Stage 1: the single newest record of the channel feed.
    async fn latest_feed_value(&self, field: &SensorFieldRef) -> Result<f64, TelemetryError> {
        let url = self.build_url(field, "feeds.json", &[("results", "1".to_string())]);
        let body = self.get_body(&url).await?;
        let doc = parse_json(&url, &body)?;

        feed_records(doc)
            .first()
            .and_then(|record| record.get(&field.field_key()))
            .and_then(coerce)
            .ok_or_else(|| no_value(&url, field))
    }

    /// Stage 2: `last.json`, which deployments answer with `{"field": ..}`,
    /// `{"fieldN": ..}`, `{"value": ..}`, a bare scalar, or plain text.
    async fn last_json_value(&self, field: &SensorFieldRef) -> Result<f64, TelemetryError> {
        let path = format!("fields/{}/last.json", field.field_index);
        let url = self.build_url(field, &path, &[]);
        let body = self.get_body(&url).await?;

        let value = match serde_json::from_str::<Value>(&body) {
            Ok(doc) => coerce(last_json_candidate(&doc, &field.field_key())),
            Err(_) => coerce_str(&body),
        };
        value.ok_or_else(|| no_value(&url, field))
    }

    /// Stage 3: `last.txt`, a plain-text number.
    async fn last_text_value(&self, field: &SensorFieldRef) -> Result<f64, TelemetryError> {
        let path = format!("fields/{}/last.txt", field.field_index);
        let url = self.build_url(field, &path, &[]);
        let body = self.get_body(&url).await?;

        coerce_str(&body).ok_or_else(|| no_value(&url, field))
    }
}

fn parse_json(url: &str, body: &str) -> Result<Value, TelemetryError> {
    serde_json::from_str(body).map_err(|e| TelemetryError::Parse {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Object records of the `feeds` array; anything else counts as no records.
fn feed_records(doc: Value) -> Vec<FeedRecord> {
    let Value::Object(mut root) = doc else {
        return Vec::new();
    };
    match root.remove("feeds") {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(record) => Some(record),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// First non-null of `field`, `fieldN`, `value`; otherwise the document itself.
fn last_json_candidate<'a>(doc: &'a Value, field_key: &str) -> &'a Value {
    ["field", field_key, "value"]
        .into_iter()
        .filter_map(|key| doc.get(key))
        .find(|v| !v.is_null())
        .unwrap_or(doc)
}

fn no_value(url: &str, field: &SensorFieldRef) -> TelemetryError {
    TelemetryError::Parse {
        url: url.to_string(),
        message: format!("no numeric value for {}", field.field_key()),
    }
}

#[async_trait]
impl TelemetryRepository for ThingSpeakRepository {
    async fn fetch_series(
        &self,
        field: &SensorFieldRef,
        window: TimeWindow,
    ) -> Result<Series, TelemetryError> {
        let records = self.fetch_feed_window(field, window).await?;
        let field_key = field.field_key();
        let total = records.len();

        let mut series: Series = records
            .iter()
            .filter_map(|record| {
                let timestamp = self.parse_created_at(record.get("created_at"))?;
                let value = record.get(&field_key).and_then(coerce)?;
                Some(Sample::new(timestamp, value))
            })
            .collect();
        sort_series(&mut series);

        if series.len() < total {
            tracing::debug!(
                "Skipped {} of {} records for channel {} {}",
                total - series.len(),
                total,
                field.channel_id,
                field_key
            );
        }

        Ok(series)
    }

    async fn fetch_last_field(&self, field: &SensorFieldRef) -> Result<f64, TelemetryError> {
        let attempts = vec![
            Attempt::new("feeds.json", self.latest_feed_value(field).boxed()),
            Attempt::new("last.json", self.last_json_value(field).boxed()),
            Attempt::new("last.txt", self.last_text_value(field).boxed()),
        ];

        first_success(attempts).await.map_err(|failures| {
            for (stage, e) in &failures {
                tracing::debug!(
                    "{} lookup failed for channel {} field {}: {}",
                    stage,
                    field.channel_id,
                    field.field_index,
                    e
                );
            }
            TelemetryError::UnresolvedField {
                field: field.field_index,
            }
        })
    }

    async fn fetch_daily_average(
        &self,
        field: &SensorFieldRef,
        date: NaiveDate,
    ) -> Result<Option<f64>, TelemetryError> {
        let window = TimeWindow::for_date(date, &self.timezone);
        let records = self.fetch_feed_window(field, window).await?;
        let field_key = field.field_key();

        let (sum, count) = records
            .iter()
            .filter_map(|record| record.get(&field_key).and_then(coerce))
            .fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));

        if count == 0 {
            return Ok(None);
        }
        Ok(Some(sum / f64::from(count)))
    }
}
