// Viewing scheduler - Live polling timers and historical views per section
use crate::application::SharedState;
use crate::application::district_service::DistrictService;
use crate::application::trend_service::TrendService;
use crate::domain::dashboard::{DashboardEvent, ViewingMode};
use crate::domain::district::SensorMetric;
use crate::domain::window::TimeWindow;
use crate::infrastructure::config::PollingSettings;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

/// Switches dashboard sections between live and historical viewing.
///
/// A live section owns two timers: latest readings every
/// `live_interval_secs` and the trailing 24h chart every
/// `trend_refresh_secs`. Going historical cancels both.
#[derive(Clone)]
pub struct ViewingScheduler {
    districts: DistrictService,
    trends: TrendService,
    polling: PollingSettings,
    timezone: Tz,
    state: SharedState,
    events: broadcast::Sender<DashboardEvent>,
    timers: Arc<Mutex<HashMap<SensorMetric, Vec<JoinHandle<()>>>>>,
}

impl ViewingScheduler {
    pub fn new(
        districts: DistrictService,
        trends: TrendService,
        polling: PollingSettings,
        timezone: Tz,
        state: SharedState,
        events: broadcast::Sender<DashboardEvent>,
    ) -> Self {
        Self {
            districts,
            trends,
            polling,
            timezone,
            state,
            events,
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Put every section into live mode.
    pub async fn start(&self) {
        for metric in SensorMetric::ALL {
            self.set_live(metric).await;
        }
    }

    pub async fn set_live(&self, metric: SensorMetric) {
        self.set_mode(metric, ViewingMode::Live).await;

        let poll_timer = {
            let districts = self.districts.clone();
            spawn_timer(self.polling.live_interval_secs, move || {
                let districts = districts.clone();
                async move { districts.poll_live(metric).await }
            })
        };
        let trend_timer = {
            let trends = self.trends.clone();
            spawn_timer(self.polling.trend_refresh_secs, move || {
                let trends = trends.clone();
                async move {
                    trends
                        .load_trend(metric, TimeWindow::last_24h(Utc::now()))
                        .await
                }
            })
        };
        self.replace_timers(metric, vec![poll_timer, trend_timer])
            .await;

        tokio::join!(
            self.districts.poll_live(metric),
            self.trends
                .load_trend(metric, TimeWindow::last_24h(Utc::now()))
        );
    }

    pub async fn set_historical(&self, metric: SensorMetric, date: NaiveDate) {
        self.set_mode(metric, ViewingMode::Historical { date }).await;
        self.replace_timers(metric, Vec::new()).await;

        tokio::join!(
            self.districts.poll_historical(metric, date),
            self.trends
                .load_trend(metric, TimeWindow::for_date(date, &self.timezone))
        );
    }

    pub async fn stop(&self) {
        let mut timers = self.timers.lock().await;
        for (_, handles) in timers.drain() {
            handles.iter().for_each(JoinHandle::abort);
        }
    }

    async fn set_mode(&self, metric: SensorMetric, mode: ViewingMode) {
        let previous = {
            let mut state = self.state.write().await;
            let previous = state.mode(metric);
            state.set_mode(metric, mode);
            previous
        };
        tracing::info!("Section {} switched from {:?} to {:?}", metric, previous, mode);
        let _ = self.events.send(DashboardEvent::ModeChanged { metric, mode });
    }

    async fn replace_timers(&self, metric: SensorMetric, handles: Vec<JoinHandle<()>>) {
        let mut timers = self.timers.lock().await;
        if let Some(previous) = timers.insert(metric, handles) {
            previous.iter().for_each(JoinHandle::abort);
        }
    }

    #[cfg(test)]
    async fn active_timers(&self, metric: SensorMetric) -> usize {
        self.timers
            .lock()
            .await
            .get(&metric)
            .map_or(0, |handles| handles.iter().filter(|h| !h.is_finished()).count())
    }
}

/// Run `tick` every `period_secs`, first firing one period from now. Each
/// tick runs in its own task so a slow upstream never delays the schedule.
fn spawn_timer<F, Fut>(period_secs: u64, tick: F) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let period = Duration::from_secs(period_secs.max(1));
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            tokio::spawn(tick());
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fake_repository::{FakeRepository, test_districts};
    use crate::domain::dashboard::DashboardState;
    use crate::domain::district::District;
    use crate::domain::telemetry::SensorFieldRef;
    use chrono_tz::Asia::Bangkok;
    use tokio::sync::RwLock;

    fn field(district: District) -> SensorFieldRef {
        test_districts().field(district, SensorMetric::Pm25).clone()
    }

    fn scheduler(
        repository: FakeRepository,
        polling: PollingSettings,
    ) -> (ViewingScheduler, Arc<FakeRepository>, broadcast::Receiver<DashboardEvent>) {
        let repository = Arc::new(repository);
        let (events, rx) = broadcast::channel(64);
        let state = Arc::new(RwLock::new(DashboardState::seeded()));
        let districts = DistrictService::new(
            repository.clone(),
            test_districts(),
            state.clone(),
            events.clone(),
        );
        let trends = TrendService::new(
            repository.clone(),
            test_districts(),
            state.clone(),
            events.clone(),
        );
        let scheduler = ViewingScheduler::new(districts, trends, polling, Bangkok, state, events);
        (scheduler, repository, rx)
    }

    fn live_repository() -> FakeRepository {
        FakeRepository::default()
            .with_last(&field(District::Klong), 10.0)
            .with_last(&field(District::Thon), 20.0)
            .with_last(&field(District::Bang), 30.0)
            .with_daily(&field(District::Klong), Some(60.0))
            .with_daily(&field(District::Thon), None)
            .with_daily(&field(District::Bang), Some(70.0))
    }

    #[tokio::test]
    async fn test_set_live_polls_immediately_and_arms_timers() {
        let (scheduler, _, mut rx) = scheduler(live_repository(), PollingSettings::default());

        scheduler.set_live(SensorMetric::Pm25).await;

        let snapshot = scheduler.districts.snapshot().await;
        assert_eq!(snapshot.districts[0].pm25, 10.0);
        assert_eq!(snapshot.modes[&SensorMetric::Pm25], ViewingMode::Live);
        assert_eq!(scheduler.active_timers(SensorMetric::Pm25).await, 2);
        assert_eq!(scheduler.active_timers(SensorMetric::Temp).await, 0);
        assert_eq!(
            rx.try_recv().unwrap(),
            DashboardEvent::ModeChanged {
                metric: SensorMetric::Pm25,
                mode: ViewingMode::Live
            }
        );
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn test_set_historical_cancels_timers() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let (scheduler, _, _rx) = scheduler(live_repository(), PollingSettings::default());

        scheduler.set_live(SensorMetric::Pm25).await;
        scheduler.set_historical(SensorMetric::Pm25, date).await;

        assert_eq!(scheduler.active_timers(SensorMetric::Pm25).await, 0);
        let snapshot = scheduler.districts.snapshot().await;
        assert_eq!(
            snapshot.modes[&SensorMetric::Pm25],
            ViewingMode::Historical { date }
        );
        assert_eq!(snapshot.districts[0].pm25, 60.0);
        assert_eq!(snapshot.districts[1].pm25, 20.0);
        assert_eq!(snapshot.districts[2].pm25, 70.0);

        let trend = scheduler.trends.trend(SensorMetric::Pm25).await;
        assert_eq!(trend.window, Some(TimeWindow::for_date(date, &Bangkok)));
    }

    async fn run_pending_tasks() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_timer_keeps_polling() {
        let polling = PollingSettings {
            live_interval_secs: 1,
            trend_refresh_secs: 3600,
        };
        let (scheduler, repo, _rx) = scheduler(live_repository(), polling);

        scheduler.set_live(SensorMetric::Pm25).await;
        let after_start = repo.calls().len();

        tokio::time::advance(Duration::from_millis(900)).await;
        run_pending_tasks().await;
        assert_eq!(repo.calls().len(), after_start);

        // One live round of three districts per period; the hourly trend timer stays idle
        tokio::time::advance(Duration::from_millis(200)).await;
        run_pending_tasks().await;
        assert_eq!(repo.calls().len(), after_start + 3);

        tokio::time::advance(Duration::from_secs(1)).await;
        run_pending_tasks().await;
        assert_eq!(repo.calls().len(), after_start + 6);
        scheduler.stop().await;
        assert_eq!(scheduler.active_timers(SensorMetric::Pm25).await, 0);
    }
}
