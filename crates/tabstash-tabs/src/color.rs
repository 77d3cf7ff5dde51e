//! Tab group colors
//!
//! Browsers offer a fixed palette. Anything outside it (including a missing
//! value) is read back as grey, the palette's default.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum GroupColor {
    #[default]
    Grey,
    Blue,
    Red,
    Yellow,
    Green,
    Pink,
    Purple,
    Cyan,
    Orange,
}

impl GroupColor {
    pub const ALL: [GroupColor; 9] = [
        GroupColor::Grey,
        GroupColor::Blue,
        GroupColor::Red,
        GroupColor::Yellow,
        GroupColor::Green,
        GroupColor::Pink,
        GroupColor::Purple,
        GroupColor::Cyan,
        GroupColor::Orange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupColor::Grey => "grey",
            GroupColor::Blue => "blue",
            GroupColor::Red => "red",
            GroupColor::Yellow => "yellow",
            GroupColor::Green => "green",
            GroupColor::Pink => "pink",
            GroupColor::Purple => "purple",
            GroupColor::Cyan => "cyan",
            GroupColor::Orange => "orange",
        }
    }
}

impl std::fmt::Display for GroupColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GroupColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "gray" => Ok(GroupColor::Grey),
            other => GroupColor::ALL
                .into_iter()
                .find(|c| c.as_str() == other)
                .ok_or_else(|| format!("Unknown group color: {}", s)),
        }
    }
}

impl From<String> for GroupColor {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl From<GroupColor> for &'static str {
    fn from(color: GroupColor) -> Self {
        color.as_str()
    }
}
