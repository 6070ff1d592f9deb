//! Calendar intervals in UTC used to floor, step and nice temporal domains.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc, Weekday};

pub trait TimeInterval: Send + Sync + std::fmt::Debug {
    /// Start of the interval containing `date`
    fn floor(&self, date: &DateTime<Utc>) -> Option<DateTime<Utc>>;

    /// `date` moved by `step` intervals; `date` is assumed to be floored
    fn offset(&self, date: DateTime<Utc>, step: i64) -> Option<DateTime<Utc>>;

    fn ceil(&self, date: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        let floored = self.floor(date)?;
        if &floored == date {
            Some(floored)
        } else {
            self.offset(floored, 1)
        }
    }
}

fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

#[derive(Debug, Clone)]
pub struct MillisecondInterval;
#[derive(Debug, Clone)]
pub struct SecondInterval;
#[derive(Debug, Clone)]
pub struct MinuteInterval;
#[derive(Debug, Clone)]
pub struct HourInterval;
#[derive(Debug, Clone)]
pub struct DayInterval;
#[derive(Debug, Clone)]
pub struct WeekInterval {
    weekday: Weekday,
}
#[derive(Debug, Clone)]
pub struct MonthInterval;
#[derive(Debug, Clone)]
pub struct YearInterval;

impl WeekInterval {
    pub fn new(weekday: Weekday) -> Self {
        Self { weekday }
    }
}

impl TimeInterval for MillisecondInterval {
    fn floor(&self, date: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(date.timestamp_millis())
    }

    fn offset(&self, date: DateTime<Utc>, step: i64) -> Option<DateTime<Utc>> {
        date.checked_add_signed(Duration::milliseconds(step))
    }
}

impl TimeInterval for SecondInterval {
    fn floor(&self, date: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        date.with_nanosecond(0)
    }

    fn offset(&self, date: DateTime<Utc>, step: i64) -> Option<DateTime<Utc>> {
        date.checked_add_signed(Duration::seconds(step))
    }
}

impl TimeInterval for MinuteInterval {
    fn floor(&self, date: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        date.with_second(0)?.with_nanosecond(0)
    }

    fn offset(&self, date: DateTime<Utc>, step: i64) -> Option<DateTime<Utc>> {
        date.checked_add_signed(Duration::minutes(step))
    }
}

impl TimeInterval for HourInterval {
    fn floor(&self, date: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        date.with_minute(0)?.with_second(0)?.with_nanosecond(0)
    }

    fn offset(&self, date: DateTime<Utc>, step: i64) -> Option<DateTime<Utc>> {
        date.checked_add_signed(Duration::hours(step))
    }
}

impl TimeInterval for DayInterval {
    fn floor(&self, date: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        midnight(date.date_naive())
    }

    fn offset(&self, date: DateTime<Utc>, step: i64) -> Option<DateTime<Utc>> {
        date.checked_add_signed(Duration::days(step))
    }
}

impl TimeInterval for WeekInterval {
    fn floor(&self, date: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        let days_from_sunday = date.weekday().num_days_from_sunday();
        let target_from_sunday = self.weekday.num_days_from_sunday();
        let days_back = (days_from_sunday + 7 - target_from_sunday) % 7;
        midnight(date.date_naive())?.checked_sub_signed(Duration::days(days_back as i64))
    }

    fn offset(&self, date: DateTime<Utc>, step: i64) -> Option<DateTime<Utc>> {
        date.checked_add_signed(Duration::weeks(step))
    }
}

impl TimeInterval for MonthInterval {
    fn floor(&self, date: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        midnight(date.date_naive().with_day(1)?)
    }

    fn offset(&self, date: DateTime<Utc>, step: i64) -> Option<DateTime<Utc>> {
        let total_months = date.year() as i64 * 12 + date.month0() as i64 + step;
        let year = i32::try_from(total_months.div_euclid(12)).ok()?;
        let month = total_months.rem_euclid(12) as u32 + 1;
        midnight(NaiveDate::from_ymd_opt(year, month, 1)?)
    }
}

impl TimeInterval for YearInterval {
    fn floor(&self, date: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        midnight(NaiveDate::from_ymd_opt(date.year(), 1, 1)?)
    }

    fn offset(&self, date: DateTime<Utc>, step: i64) -> Option<DateTime<Utc>> {
        let year = i32::try_from(date.year() as i64 + step).ok()?;
        midnight(NaiveDate::from_ymd_opt(year, 1, 1)?)
    }
}

pub fn millisecond() -> Box<dyn TimeInterval> {
    Box::new(MillisecondInterval)
}

pub fn second() -> Box<dyn TimeInterval> {
    Box::new(SecondInterval)
}

pub fn minute() -> Box<dyn TimeInterval> {
    Box::new(MinuteInterval)
}

pub fn hour() -> Box<dyn TimeInterval> {
    Box::new(HourInterval)
}

pub fn day() -> Box<dyn TimeInterval> {
    Box::new(DayInterval)
}

pub fn week(weekday: Weekday) -> Box<dyn TimeInterval> {
    Box::new(WeekInterval::new(weekday))
}

/// Weeks starting on Sunday
pub fn week_sunday() -> Box<dyn TimeInterval> {
    week(Weekday::Sun)
}

pub fn month() -> Box<dyn TimeInterval> {
    Box::new(MonthInterval)
}

pub fn year() -> Box<dyn TimeInterval> {
    Box::new(YearInterval)
}
