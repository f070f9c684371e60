// libs/appointment-cell/src/services/schedule.rs
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::models::{Appointment, AppointmentError, ClinicHours};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

pub fn parse_date(value: &str) -> Result<NaiveDate, AppointmentError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| AppointmentError::InvalidTime(format!("'{}' is not a YYYY-MM-DD date", value)))
}

/// Accepts `HH:MM:SS`, `HH:MM:SS.ffffff` and `HH:MM`.
pub fn parse_time(value: &str) -> Result<NaiveTime, AppointmentError> {
    let value = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
        .ok_or_else(|| AppointmentError::InvalidTime(format!("'{}' is not a HH:MM:SS time", value)))
}

pub fn format_hms(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

pub fn format_hm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Time of day reached `minutes` after `time` on `date`. Wraps past midnight.
/// `None` when the sum leaves chrono's representable range.
pub fn end_time_after(date: NaiveDate, time: NaiveTime, minutes: i64) -> Option<NaiveTime> {
    let duration = TimeDelta::try_minutes(minutes)?;
    date.and_time(time)
        .checked_add_signed(duration)
        .map(|end| end.time())
}

/// Half-open `[start, end)` interval of one appointment on its date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn on(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            start: date.and_time(start),
            end: date.and_time(end),
        }
    }

    /// `None` unless date, start and end are all filled in.
    pub fn of(appointment: &Appointment) -> Option<Self> {
        match (appointment.appointment_date, appointment.appointment_time, appointment.estimated_end_time) {
            (Some(date), Some(start), Some(end)) => Some(Self::on(date, start, end)),
            _ => None,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Inclusive of the opening and closing instants.
    pub fn fits_within(&self, hours: &ClinicHours) -> bool {
        let date = self.date();
        self.start >= date.and_time(hours.open) && self.end <= date.and_time(hours.close)
    }
}
