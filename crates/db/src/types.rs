use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Five-level ordinal priority, lowest to highest.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskPriority {
    Lowest,
    Low,
    #[default]
    Medium,
    High,
    Highest,
}

impl TaskPriority {
    /// Resolves free text against the canonical vocabulary plus a closed alias
    /// table covering legacy and localized values. Unrecognized input falls
    /// back to `Medium`.
    pub fn normalize(raw: &str) -> Self {
        let value = raw.trim().to_lowercase();
        if let Ok(parsed) = value.parse::<Self>() {
            return parsed;
        }
        match value.as_str() {
            "trivial" | "muy baja" | "none" => Self::Lowest,
            "minor" | "baja" => Self::Low,
            "normal" | "media" | "med" => Self::Medium,
            "major" | "alta" | "important" => Self::High,
            "critical" | "urgent" | "blocker" | "muy alta" => Self::Highest,
            _ => Self::Medium,
        }
    }
}

/// Task classification, normalized from free text.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskType {
    #[default]
    Task,
    Bug,
    Story,
    Epic,
}

impl TaskType {
    pub fn normalize(raw: &str) -> Self {
        let value = raw.trim().to_lowercase();
        if let Ok(parsed) = value.parse::<Self>() {
            return parsed;
        }
        match value.as_str() {
            "chore" | "tarea" | "todo" => Self::Task,
            "defect" | "error" | "fix" => Self::Bug,
            "feature" | "historia" | "user story" => Self::Story,
            "epica" | "épica" | "initiative" => Self::Epic,
            _ => Self::Task,
        }
    }
}

/// Semantic bucket of a column, used by the auto-dating rule.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, Default,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ColumnCategory {
    Todo,
    InProgress,
    Done,
    #[default]
    Other,
}

impl ColumnCategory {
    pub fn normalize(raw: &str) -> Self {
        let value = raw.trim().to_lowercase();
        if let Ok(parsed) = value.parse::<Self>() {
            return parsed;
        }
        match value.as_str() {
            "backlog" | "to do" | "todo" => Self::Todo,
            "inprogress" | "in progress" | "doing" | "wip" => Self::InProgress,
            "complete" | "completed" | "finished" => Self::Done,
            _ => Self::Other,
        }
    }
}

/// Fixed palette columns draw their colors from, in round-robin order.
pub const COLUMN_PALETTE: [&str; 8] = [
    "#6366f1", "#0ea5e9", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#ec4899", "#64748b",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_parses_canonical_values() {
        assert_eq!(TaskPriority::normalize("highest"), TaskPriority::Highest);
        assert_eq!(TaskPriority::normalize("  Low "), TaskPriority::Low);
    }

    #[test]
    fn priority_resolves_localized_aliases() {
        assert_eq!(TaskPriority::normalize("alta"), TaskPriority::High);
        assert_eq!(TaskPriority::normalize("muy alta"), TaskPriority::Highest);
        assert_eq!(TaskPriority::normalize("baja"), TaskPriority::Low);
    }

    #[test]
    fn priority_defaults_to_medium_on_unknown() {
        assert_eq!(TaskPriority::normalize("???"), TaskPriority::Medium);
        assert_eq!(TaskPriority::normalize(""), TaskPriority::Medium);
    }

    #[test]
    fn task_type_aliases_and_default() {
        assert_eq!(TaskType::normalize("defect"), TaskType::Bug);
        assert_eq!(TaskType::normalize("historia"), TaskType::Story);
        assert_eq!(TaskType::normalize("unknown kind"), TaskType::Task);
    }

    #[test]
    fn category_aliases_and_default() {
        assert_eq!(ColumnCategory::normalize("WIP"), ColumnCategory::InProgress);
        assert_eq!(ColumnCategory::normalize("in-progress"), ColumnCategory::InProgress);
        assert_eq!(ColumnCategory::normalize("archived"), ColumnCategory::Other);
    }

    #[test]
    fn priority_ordinal_is_lowest_to_highest() {
        assert!(TaskPriority::Lowest < TaskPriority::Highest);
        assert!(TaskPriority::Medium < TaskPriority::High);
    }
}
