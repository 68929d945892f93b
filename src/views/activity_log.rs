use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use crate::models::activity::JobActivity;
use crate::utils::time::format_timestamp;

pub const EMPTY_TIMELINE_MESSAGE: &str = "No audit logs recorded.";

#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub field: String,
    pub old: JsonValue,
    pub new: JsonValue,
}

/// Audit record decoded by `action_type`.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityAction {
    Created { title: Option<String> },
    Updated { changes: Vec<FieldChange> },
    ClonedFrom { source_job_id: Option<String> },
    Archived,
    PipelineUpdated,
    Other {
        action_type: String,
        details: Option<JsonValue>,
    },
}

impl ActivityAction {
    pub fn from_record(record: &JobActivity) -> Self {
        let details = record.details.as_ref();
        let str_field = |name: &str| {
            details
                .and_then(|d| d.get(name))
                .and_then(JsonValue::as_str)
                .map(str::to_string)
        };

        match record.action_type.as_str() {
            "CREATED" => ActivityAction::Created {
                title: str_field("title"),
            },
            "UPDATED" => ActivityAction::Updated {
                changes: field_changes(details),
            },
            "CLONED_FROM" => ActivityAction::ClonedFrom {
                source_job_id: str_field("source_job_id"),
            },
            "ARCHIVED" => ActivityAction::Archived,
            "PIPELINE_UPDATED" => ActivityAction::PipelineUpdated,
            other => ActivityAction::Other {
                action_type: other.to_string(),
                details: record.details.clone(),
            },
        }
    }

    pub fn headline(&self) -> String {
        match self {
            ActivityAction::Created { title: Some(title) } => {
                format!("Job created with title \"{}\"", title)
            }
            ActivityAction::Created { title: None } => "Job created".to_string(),
            ActivityAction::Updated { changes } if changes.is_empty() => {
                "Job details updated".to_string()
            }
            ActivityAction::Updated { changes } => changes
                .iter()
                .map(|change| {
                    if change.field == "status" {
                        format!(
                            "changed status from {} to {}",
                            render_value(&change.old),
                            render_value(&change.new)
                        )
                    } else {
                        format!("updated {}", field_label(&change.field))
                    }
                })
                .collect::<Vec<_>>()
                .join(", "),
            ActivityAction::ClonedFrom { .. } => "Job cloned from another requisition".to_string(),
            ActivityAction::Archived => "Job archived".to_string(),
            ActivityAction::PipelineUpdated => "Hiring pipeline configuration updated".to_string(),
            ActivityAction::Other { action_type, .. } => action_type.clone(),
        }
    }
}

/// `{"field": {"old": .., "new": ..}}`; a bare value is taken as the new value.
fn field_changes(details: Option<&JsonValue>) -> Vec<FieldChange> {
    let Some(JsonValue::Object(map)) = details else {
        return Vec::new();
    };
    map.iter()
        .map(|(field, value)| {
            let (old, new) = match value {
                JsonValue::Object(pair) if pair.contains_key("old") || pair.contains_key("new") => (
                    pair.get("old").cloned().unwrap_or(JsonValue::Null),
                    pair.get("new").cloned().unwrap_or(JsonValue::Null),
                ),
                other => (JsonValue::Null, other.clone()),
            };
            FieldChange {
                field: field.clone(),
                old,
                new,
            }
        })
        .collect()
}

/// `salary_max` -> `Salary Max`
pub fn field_label(field: &str) -> String {
    field
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn render_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(items) => items.iter().map(render_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiffRow {
    pub label: String,
    pub old: String,
    pub new: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub id: String,
    pub action: ActivityAction,
    pub headline: String,
    /// Only populated for `Updated` records.
    pub diff: Vec<DiffRow>,
    pub timestamp: Option<DateTime<Utc>>,
    pub timestamp_label: Option<String>,
}

/// Newest first. Equal timestamps keep input order; undated records go last.
pub fn build_timeline(records: &[JobActivity]) -> Vec<TimelineEntry> {
    let mut sorted: Vec<&JobActivity> = records.iter().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    sorted
        .into_iter()
        .map(|record| {
            let action = ActivityAction::from_record(record);
            let diff = match &action {
                ActivityAction::Updated { changes } => changes
                    .iter()
                    .map(|c| DiffRow {
                        label: field_label(&c.field),
                        old: render_value(&c.old),
                        new: render_value(&c.new),
                    })
                    .collect(),
                _ => Vec::new(),
            };
            TimelineEntry {
                id: record.id.clone(),
                headline: action.headline(),
                action,
                diff,
                timestamp: record.timestamp,
                timestamp_label: record.timestamp.map(format_timestamp),
            }
        })
        .collect()
}
