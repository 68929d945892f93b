use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Parses RFC 3339, or a naive ISO-8601 timestamp taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn deserialize_timestamp_flexible<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid timestamp: {}", s))),
    }
}

/// `Jan 5, 2024, 3:07 PM`
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.format("%b %-d, %Y, %-I:%M %p").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreatedBucket {
    Today,
    Yesterday,
    TwoDaysAgo,
    ThreeDaysAgo,
    ThisWeek,
    LastMonth,
    Older,
}

impl CreatedBucket {
    pub const ALL: [CreatedBucket; 7] = [
        CreatedBucket::Today,
        CreatedBucket::Yesterday,
        CreatedBucket::TwoDaysAgo,
        CreatedBucket::ThreeDaysAgo,
        CreatedBucket::ThisWeek,
        CreatedBucket::LastMonth,
        CreatedBucket::Older,
    ];

    pub fn classify(created_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        match (now - created_at).num_days() {
            i64::MIN..=0 => CreatedBucket::Today,
            1 => CreatedBucket::Yesterday,
            2 => CreatedBucket::TwoDaysAgo,
            3 => CreatedBucket::ThreeDaysAgo,
            4..=7 => CreatedBucket::ThisWeek,
            8..=30 => CreatedBucket::LastMonth,
            _ => CreatedBucket::Older,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CreatedBucket::Today => "Today",
            CreatedBucket::Yesterday => "Yesterday",
            CreatedBucket::TwoDaysAgo => "2 Days Ago",
            CreatedBucket::ThreeDaysAgo => "3 Days Ago",
            CreatedBucket::ThisWeek => "This Week",
            CreatedBucket::LastMonth => "Last Month",
            CreatedBucket::Older => "Older",
        }
    }
}
