// Application state for HTTP handlers
use crate::application::district_service::DistrictService;
use crate::application::goal_service::GoalService;
use crate::application::scheduler::ViewingScheduler;
use crate::application::trend_service::TrendService;
use crate::domain::dashboard::DashboardEvent;
use chrono_tz::Tz;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AppState {
    pub district_service: DistrictService,
    pub trend_service: TrendService,
    pub goal_service: GoalService,
    pub scheduler: ViewingScheduler,
    pub events: broadcast::Sender<DashboardEvent>,
    pub timezone: Tz,
}
