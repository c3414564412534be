//! Fixed vocabularies carried by the protocol.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// A command the phone can queue for the Mac.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Command {
    /// Arm the alarm
    Arm,
    /// Disarm the alarm
    Disarm,
}

impl Command {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arm => "ARM",
            Self::Disarm => "DISARM",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ARM" => Ok(Self::Arm),
            "DISARM" => Ok(Self::Disarm),
            other => Err(TypesError::InvalidCommand(other.to_string())),
        }
    }
}

/// Usage events reported by the Mac app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageEventKind {
    /// The alarm was armed
    Armed,
    /// The alarm was disarmed
    Disarmed,
    /// The alarm went off
    AlarmFired,
}

impl UsageEventKind {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Armed => "armed",
            Self::Disarmed => "disarmed",
            Self::AlarmFired => "alarm_fired",
        }
    }
}

impl fmt::Display for UsageEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UsageEventKind {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "armed" => Ok(Self::Armed),
            "disarmed" => Ok(Self::Disarmed),
            "alarm_fired" => Ok(Self::AlarmFired),
            other => Err(TypesError::InvalidEventKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_parses_exact_uppercase() {
        assert_eq!("ARM".parse::<Command>().unwrap(), Command::Arm);
        assert_eq!("DISARM".parse::<Command>().unwrap(), Command::Disarm);
        assert!("arm".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
    }

    #[test]
    fn command_serde_matches_display() {
        for cmd in [Command::Arm, Command::Disarm] {
            let json = serde_json::to_string(&cmd).unwrap();
            assert_eq!(json, format!("\"{}\"", cmd));
        }
    }

    #[test]
    fn unknown_command_rejected_by_serde() {
        assert!(serde_json::from_str::<Command>("\"SELF_DESTRUCT\"").is_err());
    }

    #[test]
    fn event_kind_snake_case() {
        let json = serde_json::to_string(&UsageEventKind::AlarmFired).unwrap();
        assert_eq!(json, "\"alarm_fired\"");
        assert_eq!(
            "disarmed".parse::<UsageEventKind>().unwrap(),
            UsageEventKind::Disarmed
        );
        assert!("exploded".parse::<UsageEventKind>().is_err());
    }
}
