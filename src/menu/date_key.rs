use std::fmt::{self, Display, Formatter};

use chrono::{Datelike, NaiveDate};

/// A menu date. Serializes as an unpadded `m/d/yyyy` string, which is also
/// the format the menu site expects in its `dtdate` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    #[cfg(test)]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    #[cfg(test)]
    pub const fn date(self) -> NaiveDate {
        self.0
    }

    /// `count` consecutive days starting at `start`, inclusive.
    pub fn week_from(start: NaiveDate, count: u32) -> impl Iterator<Item = Self> {
        start.iter_days().take(count as usize).map(Self)
    }

    /// Today (local time) and the `count - 1` days after it.
    pub fn upcoming(count: u32) -> Vec<Self> {
        Self::week_from(chrono::Local::now().date_naive(), count).collect()
    }

    pub fn parse(s: &str) -> Option<Self> {
        NaiveDate::parse_from_str(s.trim(), "%m/%d/%Y").ok().map(Self)
    }
}

impl Display for DateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // formatted by hand: `%-m` is platform dependent in other strftime implementations
        write!(f, "{}/{}/{}", self.0.month(), self.0.day(), self.0.year())
    }
}

impl serde::Serialize for DateKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for DateKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid menu date {s:?}")))
    }
}
