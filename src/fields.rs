//! Enumerations and field types for missions.
//!
//! This module defines the structured values used to categorise and organise
//! missions: priorities, categories, recurrence frequencies, account types,
//! notification kinds, the derived lifecycle status and the Focus filter.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Priority of a mission. Display emphasis only, it never reorders anything.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Urgent,
    Haute,
    #[default]
    Moyenne,
    Basse,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Urgent,
        Priority::Haute,
        Priority::Moyenne,
        Priority::Basse,
    ];

    /// Upper-case token used in storage and in AI responses.
    pub fn token(self) -> &'static str {
        match self {
            Priority::Urgent => "URGENT",
            Priority::Haute => "HAUTE",
            Priority::Moyenne => "MOYENNE",
            Priority::Basse => "BASSE",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Urgent => "Urgent",
            Priority::Haute => "Haute",
            Priority::Moyenne => "Moyenne",
            Priority::Basse => "Basse",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Priority::Urgent => "🔥",
            Priority::Haute => "⚡",
            Priority::Moyenne => "🔵",
            Priority::Basse => "⚪",
        }
    }
}

/// Mission category. `Projet` carries sub-tasks, `Recurrente` carries a recurrence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    #[default]
    Tache,
    Suivi,
    Recurrente,
    Projet,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Tache,
        Category::Suivi,
        Category::Recurrente,
        Category::Projet,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Category::Tache => "TACHE",
            Category::Suivi => "SUIVI",
            Category::Recurrente => "RECURRENTE",
            Category::Projet => "PROJET",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Tache => "Tâche",
            Category::Suivi => "Suivi",
            Category::Recurrente => "Récurrente",
            Category::Projet => "Projet",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::Tache => "📝",
            Category::Suivi => "📊",
            Category::Recurrente => "🔄",
            Category::Projet => "🚀",
        }
    }

    fn from_token(s: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.token() == s)
    }
}

/// How often a recurring mission comes back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

/// Personal or work space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    #[default]
    Personal,
    Work,
}

/// Notification record kind: relative to the due date, or an absolute instant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Offset,
    Custom,
}

/// Lifecycle state derived from the three status flags of a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Active,
    Completed,
    Cancelled,
    Postponed,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Active => "En cours",
            TaskStatus::Completed => "Terminée",
            TaskStatus::Cancelled => "Annulée",
            TaskStatus::Postponed => "Reportée",
        }
    }
}

/// Filter applied to the Focus list.
///
/// The textual form (`ALL`, `TEAM`, `CAT_PROJET`, `EMP_ME`, `EMP_<id>`) is the
/// one accepted on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActiveFilter {
    #[default]
    All,
    Team,
    Category(Category),
    Me,
    Employee(String),
}

impl fmt::Display for ActiveFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveFilter::All => write!(f, "ALL"),
            ActiveFilter::Team => write!(f, "TEAM"),
            ActiveFilter::Category(c) => write!(f, "CAT_{}", c.token()),
            ActiveFilter::Me => write!(f, "EMP_ME"),
            ActiveFilter::Employee(id) => write!(f, "EMP_{id}"),
        }
    }
}

impl FromStr for ActiveFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "ALL" | "all" => return Ok(ActiveFilter::All),
            "TEAM" | "team" => return Ok(ActiveFilter::Team),
            "EMP_ME" | "me" => return Ok(ActiveFilter::Me),
            _ => {}
        }
        if let Some(cat) = s.strip_prefix("CAT_") {
            return Category::from_token(&cat.to_uppercase())
                .map(ActiveFilter::Category)
                .ok_or_else(|| format!("unknown category '{cat}'"));
        }
        if let Some(id) = s.strip_prefix("EMP_") {
            if id.is_empty() {
                return Err("missing employee id after EMP_".into());
            }
            return Ok(ActiveFilter::Employee(id.to_string()));
        }
        Err(format!(
            "unknown filter '{s}' (expected ALL, TEAM, CAT_<category>, EMP_ME or EMP_<id>)"
        ))
    }
}
