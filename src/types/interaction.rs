use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HomeMatchError;

/// A recorded user action on a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum InteractionType {
    Like,
    Dislike,
    Skip,
    View,
}

impl InteractionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
            Self::Skip => "skip",
            Self::View => "view",
        }
    }

    /// Like, dislike and skip express an opinion; a view does not.
    pub fn is_decision(self) -> bool {
        !matches!(self, Self::View)
    }

    pub fn is_negative(self) -> bool {
        matches!(self, Self::Dislike | Self::Skip)
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = HomeMatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            "skip" => Ok(Self::Skip),
            "view" => Ok(Self::View),
            other => Err(HomeMatchError::validation(format!(
                "unknown interaction type `{other}`; expected like, dislike, skip or view"
            ))),
        }
    }
}

/// A household's recorded outcome for a disputed property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Resolution {
    Saved,
    Passed,
    ScheduledViewing,
    DiscussionNeeded,
}

impl FromStr for Resolution {
    type Err = HomeMatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "saved" => Ok(Self::Saved),
            "passed" => Ok(Self::Passed),
            "scheduled_viewing" => Ok(Self::ScheduledViewing),
            "discussion_needed" => Ok(Self::DiscussionNeeded),
            other => Err(HomeMatchError::validation(format!(
                "unknown resolution `{other}`"
            ))),
        }
    }
}
