use chrono::{DateTime, Utc};
use formrelay_shared_contracts::time::TimeService;

#[derive(Debug, Clone, Copy, Default)]
pub struct TimeServiceImpl;

impl TimeService for TimeServiceImpl {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
