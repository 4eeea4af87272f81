use std::fmt::{Display, Formatter};

use crate::error::GoesCdnError;
use chrono::{
    naive::{NaiveDate, NaiveDateTime},
    Datelike, Duration, Timelike,
};

/// A span of time to walk one minute at a time. Both ends are kept at minute precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeRange {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, GoesCdnError> {
        let start = to_the_minute(start);
        let end = to_the_minute(end);

        if end < start {
            log::error!("End before start: start - {} end - {}", start, end);
            return Err(GoesCdnError::InvalidTimeRange { start, end });
        }

        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Every minute from `start` until the running time reaches `end`.
    ///
    /// The walk goes day by day, hour by hour, minute by minute. Only the first day starts at
    /// the start hour; every later day starts again at 00:00. Each call returns a fresh iterator.
    pub fn minutes(&self) -> MinuteSteps {
        MinuteSteps {
            date: self.start.date(),
            hour: self.start.hour(),
            minute: self.start.minute(),
            end: self.end,
            done: false,
        }
    }
}

fn to_the_minute(time: NaiveDateTime) -> NaiveDateTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

/// One whole minute, displayed in the CDN's `YYYYJJJHHMM` encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl From<NaiveDateTime> for Timestamp {
    fn from(time: NaiveDateTime) -> Self {
        Timestamp(to_the_minute(time))
    }
}

impl Timestamp {
    pub fn time(&self) -> NaiveDateTime {
        self.0
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        let t = self.0;
        write!(
            f,
            "{:04}{:03}{:02}{:02}",
            t.year(),
            t.ordinal(),
            t.hour(),
            t.minute()
        )
    }
}

/// Iterator returned by [`TimeRange::minutes`].
#[derive(Clone, Debug)]
pub struct MinuteSteps {
    date: NaiveDate,
    hour: u32,
    minute: u32,
    end: NaiveDateTime,
    done: bool,
}

impl Iterator for MinuteSteps {
    type Item = Timestamp;

    fn next(&mut self) -> Option<Timestamp> {
        if self.done {
            return None;
        }

        let emitted = match self.date.and_hms_opt(self.hour, self.minute, 0) {
            Some(time) => time,
            None => {
                self.done = true;
                return None;
            }
        };

        // Termination is checked against the running time after every minute.
        let running = emitted + Duration::minutes(1);
        if running >= self.end {
            self.done = true;
            return Some(Timestamp(emitted));
        }

        self.minute += 1;
        if self.minute == 60 {
            self.minute = 0;
            self.hour += 1;

            if self.hour == 24 {
                self.hour = 0;
                match self.date.succ_opt() {
                    Some(next_day) => self.date = next_day,
                    None => self.done = true,
                }
            }
        }

        Some(Timestamp(emitted))
    }
}

impl std::iter::FusedIterator for MinuteSteps {}
