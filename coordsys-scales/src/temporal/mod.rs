pub mod interval;

use chrono::{DateTime, Datelike, Utc};

use crate::array;
use crate::numeric::{interpolate, ContinuousScale};
use interval::TimeInterval;

const SECOND_MS: f64 = 1_000.0;
const MINUTE_MS: f64 = 60.0 * SECOND_MS;
const HOUR_MS: f64 = 60.0 * MINUTE_MS;
const DAY_MS: f64 = 24.0 * HOUR_MS;
const WEEK_MS: f64 = 7.0 * DAY_MS;
const MONTH_MS: f64 = 30.0 * DAY_MS;
const YEAR_MS: f64 = 365.0 * DAY_MS;

// Upper bound on generated ticks, guards against a tiny step over a huge span
const MAX_TICKS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq)]
enum TickUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TickUnit {
    fn interval(&self) -> Box<dyn TimeInterval> {
        match self {
            TickUnit::Second => interval::second(),
            TickUnit::Minute => interval::minute(),
            TickUnit::Hour => interval::hour(),
            TickUnit::Day => interval::day(),
            TickUnit::Week => interval::week_sunday(),
            TickUnit::Month => interval::month(),
            TickUnit::Year => interval::year(),
        }
    }

    /// Units of constant length that can be aligned with epoch arithmetic
    fn is_fixed(&self) -> bool {
        matches!(self, TickUnit::Second | TickUnit::Minute | TickUnit::Hour)
    }
}

const TICK_INTERVALS: [(TickUnit, i64, f64); 17] = [
    (TickUnit::Second, 1, SECOND_MS),
    (TickUnit::Second, 5, 5.0 * SECOND_MS),
    (TickUnit::Second, 15, 15.0 * SECOND_MS),
    (TickUnit::Second, 30, 30.0 * SECOND_MS),
    (TickUnit::Minute, 1, MINUTE_MS),
    (TickUnit::Minute, 5, 5.0 * MINUTE_MS),
    (TickUnit::Minute, 15, 15.0 * MINUTE_MS),
    (TickUnit::Minute, 30, 30.0 * MINUTE_MS),
    (TickUnit::Hour, 1, HOUR_MS),
    (TickUnit::Hour, 3, 3.0 * HOUR_MS),
    (TickUnit::Hour, 6, 6.0 * HOUR_MS),
    (TickUnit::Hour, 12, 12.0 * HOUR_MS),
    (TickUnit::Day, 1, DAY_MS),
    (TickUnit::Day, 2, 2.0 * DAY_MS),
    (TickUnit::Week, 1, WEEK_MS),
    (TickUnit::Month, 1, MONTH_MS),
    (TickUnit::Month, 3, 3.0 * MONTH_MS),
];

/// Milliseconds since the Unix epoch
pub fn to_millis(date: &DateTime<Utc>) -> f64 {
    date.timestamp_millis() as f64
}

pub fn from_millis(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(ms.round() as i64)
}

#[derive(Debug, Clone)]
pub struct TimeScaleConfig {
    /// Domain in epoch milliseconds
    pub domain: (f64, f64),
    pub range: (f64, f64),
    pub clamp: bool,
    pub nice: bool,
}

impl Default for TimeScaleConfig {
    fn default() -> Self {
        Self {
            domain: (0.0, DAY_MS),
            range: (0.0, 1.0),
            clamp: false,
            nice: false,
        }
    }
}

/// A linear scale over UTC instants, represented as epoch milliseconds, with
/// calendar-aware ticks and nicing.
#[derive(Clone, Debug)]
pub struct TimeScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
    clamp: bool,
}

impl TimeScale {
    pub fn new(config: &TimeScaleConfig) -> Self {
        let this = Self {
            domain_start: config.domain.0,
            domain_end: config.domain.1,
            range_start: config.range.0,
            range_end: config.range.1,
            clamp: config.clamp,
        };
        if config.nice {
            this.nice(None)
        } else {
            this
        }
    }

    pub fn from_datetimes(domain: (DateTime<Utc>, DateTime<Utc>), range: (f64, f64)) -> Self {
        Self::new(&TimeScaleConfig {
            domain: (to_millis(&domain.0), to_millis(&domain.1)),
            range,
            ..Default::default()
        })
    }

    pub fn with_domain(mut self, domain: (f64, f64)) -> Self {
        self.domain_start = domain.0;
        self.domain_end = domain.1;
        self
    }

    pub fn with_range(mut self, range: (f64, f64)) -> Self {
        self.range_start = range.0;
        self.range_end = range.1;
        self
    }

    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    /// Extends the domain outward to interval boundaries. Without an explicit
    /// interval one is chosen from the span of the domain.
    pub fn nice(mut self, interval: Option<Box<dyn TimeInterval>>) -> Self {
        let (lo, hi) = self.ordered_domain();
        let (Some(start), Some(end)) = (from_millis(lo), from_millis(hi)) else {
            return self;
        };
        if start == end {
            return self;
        }

        let interval = interval.unwrap_or_else(|| {
            let span = hi - lo;
            if span < SECOND_MS {
                interval::millisecond()
            } else if span < MINUTE_MS {
                interval::second()
            } else if span < HOUR_MS {
                interval::minute()
            } else if span < DAY_MS {
                interval::hour()
            } else if span < MONTH_MS {
                interval::day()
            } else if span < YEAR_MS {
                interval::month()
            } else {
                interval::year()
            }
        });

        if let (Some(nice_start), Some(nice_end)) = (interval.floor(&start), interval.ceil(&end)) {
            let (nice_lo, nice_hi) = (to_millis(&nice_start), to_millis(&nice_end));
            if self.domain_start <= self.domain_end {
                self.domain_start = nice_lo;
                self.domain_end = nice_hi;
            } else {
                self.domain_start = nice_hi;
                self.domain_end = nice_lo;
            }
        }
        self
    }

    fn ordered_domain(&self) -> (f64, f64) {
        if self.domain_start <= self.domain_end {
            (self.domain_start, self.domain_end)
        } else {
            (self.domain_end, self.domain_start)
        }
    }

    pub fn scale_datetime(&self, date: &DateTime<Utc>) -> f64 {
        self.scale_value(to_millis(date))
    }

    /// Tick instants within the domain, in domain order
    pub fn tick_datetimes(&self, count: Option<usize>) -> Vec<DateTime<Utc>> {
        self.ticks(count)
            .into_iter()
            .filter_map(from_millis)
            .collect()
    }

    fn calendar_ticks(&self, lo: f64, hi: f64, count: usize) -> Vec<f64> {
        let span = hi - lo;
        let target = span / count.max(1) as f64;

        if target < SECOND_MS {
            return array::ticks(lo, hi, count);
        }

        let (unit, step, step_ms) = TICK_INTERVALS
            .iter()
            .copied()
            .find(|(_, _, step_ms)| *step_ms >= target)
            .unwrap_or_else(|| {
                let years = array::tick_step(lo / YEAR_MS, hi / YEAR_MS, count).ceil().max(1.0);
                (TickUnit::Year, years as i64, years * YEAR_MS)
            });

        if unit.is_fixed() {
            let first = (lo / step_ms).ceil() * step_ms;
            return (0..)
                .map(|i| first + i as f64 * step_ms)
                .take_while(|t| *t <= hi)
                .take(MAX_TICKS)
                .collect();
        }

        let interval = unit.interval();
        let (Some(start), Some(end)) = (from_millis(lo), from_millis(hi)) else {
            return vec![];
        };
        let Some(mut tick) = interval.ceil(&start) else {
            return vec![];
        };

        // align multi-unit steps to calendar boundaries (quarters, decades)
        let aligned = |t: &DateTime<Utc>| match unit {
            TickUnit::Month => t.month0() as i64 % step == 0,
            TickUnit::Year => (t.year() as i64).rem_euclid(step) == 0,
            _ => true,
        };
        while !aligned(&tick) {
            match interval.offset(tick, 1) {
                Some(next) => tick = next,
                None => return vec![],
            }
        }

        let mut ticks = Vec::new();
        while tick <= end && ticks.len() < MAX_TICKS {
            ticks.push(to_millis(&tick));
            match interval.offset(tick, step) {
                Some(next) => tick = next,
                None => break,
            }
        }
        ticks
    }
}

impl ContinuousScale for TimeScale {
    fn domain(&self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    fn range(&self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    fn clamp(&self) -> bool {
        self.clamp
    }

    fn scale_value(&self, value: f64) -> f64 {
        interpolate(value, self.domain(), self.range(), self.clamp, false)
    }

    fn ticks(&self, count: Option<usize>) -> Vec<f64> {
        let count = count.unwrap_or(10);
        let (lo, hi) = self.ordered_domain();
        if !lo.is_finite() || !hi.is_finite() {
            return vec![];
        }
        if lo == hi {
            return vec![lo];
        }
        let mut ticks = self.calendar_ticks(lo, hi, count);
        if self.domain_start > self.domain_end {
            ticks.reverse();
        }
        ticks
    }
}
