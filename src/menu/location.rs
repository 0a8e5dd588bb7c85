use std::fmt::{self, Display, Formatter};

/// The dining halls whose menus are scraped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Location {
    SouthCampus,
    Yahentamitsi,
    North251,
}

impl Location {
    pub const ALL: [Self; 3] = [Self::SouthCampus, Self::Yahentamitsi, Self::North251];

    #[must_use]
    pub const fn id(self) -> u32 {
        match self {
            Self::SouthCampus => 16,
            Self::Yahentamitsi => 19,
            Self::North251 => 51,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SouthCampus => "South Campus",
            Self::Yahentamitsi => "Yahentamitsi Dining Hall",
            Self::North251 => "251 North",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.name() == name)
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl serde::Serialize for Location {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.name().serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Location {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown location {name:?}")))
    }
}
