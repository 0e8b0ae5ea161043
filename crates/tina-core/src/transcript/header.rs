//! First-page header metadata.

use std::fmt::Display;
use std::sync::LazyLock;

use chrono::{DateTime, TimeZone};
use regex::Regex;

use crate::config::ExportConfig;
use crate::core::conversation::{Role, Turn};

static RECOMMENDATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"I recommend \*\*(.*?)\*\*").expect("recommendation pattern is valid")
});

const DATE_FORMAT: &str = "%-d %B %Y at %-I:%M:%S %P";

/// Header block drawn above the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptHeader {
    pub title: String,
    pub session_id: String,
    pub consultant: String,
    pub recommended_policy: String,
    pub generated_at: String,
}

impl TranscriptHeader {
    pub fn build<Tz: TimeZone>(
        config: &ExportConfig,
        session_id: &str,
        turns: &[Turn],
        now: &DateTime<Tz>,
    ) -> Self
    where
        Tz::Offset: Display,
    {
        Self {
            title: config.title.clone(),
            session_id: session_id.to_string(),
            consultant: config.consultant.clone(),
            recommended_policy: recommended_policy(turns)
                .unwrap_or_else(|| config.policy_placeholder.clone()),
            generated_at: now.format(DATE_FORMAT).to_string(),
        }
    }

    /// Detail lines under the title, in drawing order.
    pub fn detail_lines(&self) -> [String; 4] {
        [
            format!("Tracking ID: {}", self.session_id),
            format!("Consultant: {}", self.consultant),
            format!("Recommended Policy: {}", self.recommended_policy),
            format!("Date & Time: {}", self.generated_at),
        ]
    }
}

/// Finds the latest `I recommend **<name>**` in the assistant's turns.
pub fn recommended_policy(turns: &[Turn]) -> Option<String> {
    turns
        .iter()
        .rev()
        .filter(|turn| turn.role == Role::Assistant)
        .find_map(|turn| {
            RECOMMENDATION
                .captures(&turn.text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|name| !name.is_empty())
        })
}
