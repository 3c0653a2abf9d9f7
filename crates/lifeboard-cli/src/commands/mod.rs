use chrono::NaiveDate;
use chrono_tz::Tz;
use lifeboard_core::models::UserId;
use lifeboard_core::timezone::today_in;

pub mod habit;
pub mod serve;
pub mod task;

/// Who is running the command and which calendar they live in.
#[derive(Debug, Clone)]
pub struct Context {
    pub owner: UserId,
    pub timezone: Tz,
}

impl Context {
    pub fn today(&self) -> NaiveDate {
        today_in(self.timezone)
    }
}
