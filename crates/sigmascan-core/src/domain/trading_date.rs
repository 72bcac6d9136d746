use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::ValidationError;

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Calendar trading day, serialized as ISO `YYYY-MM-DD`.
///
/// Daily observations are keyed by this type; gaps between consecutive days
/// (weekends, holidays, provider omissions) are expected and carry no meaning
/// beyond "no observation".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TradingDate(Date);

impl TradingDate {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        Date::parse(input.trim(), ISO_DATE)
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate {
                value: input.to_owned(),
            })
    }

    /// Calendar day of the given unix timestamp, interpreted as UTC.
    pub fn from_unix_timestamp(timestamp: i64) -> Result<Self, ValidationError> {
        OffsetDateTime::from_unix_timestamp(timestamp)
            .map(|moment| Self(moment.date()))
            .map_err(|_| ValidationError::InvalidDate {
                value: timestamp.to_string(),
            })
    }

    pub fn from_date(date: Date) -> Self {
        Self(date)
    }

    pub fn today_utc() -> Self {
        Self(OffsetDateTime::now_utc().date())
    }

    pub fn into_inner(self) -> Date {
        self.0
    }

    pub fn format_iso(self) -> String {
        self.0
            .format(ISO_DATE)
            .expect("calendar date must be ISO formattable")
    }

    /// Midnight UTC at the start of this day, as a unix timestamp.
    pub fn unix_midnight(self) -> i64 {
        self.0.midnight().assume_utc().unix_timestamp()
    }
}

impl Display for TradingDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_iso())
    }
}

impl Serialize for TradingDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_iso())
    }
}

impl<'de> Deserialize<'de> for TradingDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

/// Inclusive calendar window selected for one recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: TradingDate,
    end: TradingDate,
}

impl DateRange {
    pub fn new(start: TradingDate, end: TradingDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvalidDateRange {
                start: start.format_iso(),
                end: end.format_iso(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> TradingDate {
        self.start
    }

    pub fn end(&self) -> TradingDate {
        self.end
    }

    pub fn contains(&self, date: TradingDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, inclusive of both ends.
    pub fn calendar_days(&self) -> i64 {
        (self.end.into_inner() - self.start.into_inner()).whole_days() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_date() {
        let date = TradingDate::parse("2024-03-08").expect("must parse");
        assert_eq!(date.format_iso(), "2024-03-08");
    }

    #[test]
    fn rejects_non_iso_date() {
        let err = TradingDate::parse("03/08/2024").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidDate { .. }));
    }

    #[test]
    fn unix_round_trip_lands_on_same_day() {
        let date = TradingDate::parse("2024-03-08").expect("must parse");
        let back = TradingDate::from_unix_timestamp(date.unix_midnight()).expect("valid");
        assert_eq!(date, back);
    }

    #[test]
    fn rejects_inverted_range() {
        let start = TradingDate::parse("2024-03-08").expect("valid");
        let end = TradingDate::parse("2024-03-01").expect("valid");
        let err = DateRange::new(start, end).expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidDateRange { .. }));
    }

    #[test]
    fn counts_inclusive_calendar_days() {
        let start = TradingDate::parse("2024-03-01").expect("valid");
        let end = TradingDate::parse("2024-03-08").expect("valid");
        let range = DateRange::new(start, end).expect("valid");
        assert_eq!(range.calendar_days(), 8);
        assert!(range.contains(TradingDate::parse("2024-03-05").expect("valid")));
    }
}
