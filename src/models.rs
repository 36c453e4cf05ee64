use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ticket category assigned by the classifier at submission time. Students
/// cannot edit it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Infrastructure,
    Academic,
    MentalHealth,
    Hostel,
    Food,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Infrastructure,
        Category::Academic,
        Category::MentalHealth,
        Category::Hostel,
        Category::Food,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Infrastructure => "infrastructure",
            Category::Academic => "academic",
            Category::MentalHealth => "mental-health",
            Category::Hostel => "hostel",
            Category::Food => "food",
            Category::Other => "other",
        }
    }

    /// Badge color used by list/show output. One arm per variant so a new
    /// category cannot ship without one.
    pub fn color(self) -> &'static str {
        match self {
            Category::Infrastructure => "red",
            Category::Academic => "blue",
            Category::MentalHealth => "purple",
            Category::Hostel => "yellow",
            Category::Food => "orange",
            Category::Other => "gray",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "infrastructure" => Ok(Category::Infrastructure),
            "academic" => Ok(Category::Academic),
            "mental-health" => Ok(Category::MentalHealth),
            "hostel" => Ok(Category::Hostel),
            "food" => Ok(Category::Food),
            "other" => Ok(Category::Other),
            _ => Err(format!(
                "Invalid category '{}'. Must be one of: infrastructure, academic, mental-health, hostel, food, other",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(format!(
                "Invalid priority '{}'. Must be one of: low, medium, high, critical",
                s
            )),
        }
    }
}

/// Resolution pipeline stage. The order here is the display order of the
/// progress tracker; `change_stage` itself accepts any jump between stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Committed,
    Reviewing,
    Patching,
    Resolved,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Committed,
        Stage::Reviewing,
        Stage::Patching,
        Stage::Resolved,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Committed => "committed",
            Stage::Reviewing => "reviewing",
            Stage::Patching => "patching",
            Stage::Resolved => "resolved",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Committed => "Committed",
            Stage::Reviewing => "Reviewing",
            Stage::Patching => "Patching",
            Stage::Resolved => "Resolved",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Stage::Committed => "✓",
            Stage::Reviewing => "👁",
            Stage::Patching => "🔧",
            Stage::Resolved => "🔀",
        }
    }

    /// Position in the pipeline, 0..=3.
    pub fn index(self) -> usize {
        match self {
            Stage::Committed => 0,
            Stage::Reviewing => 1,
            Stage::Patching => 2,
            Stage::Resolved => 3,
        }
    }

    /// Fraction of the pipeline completed, for the progress tracker.
    pub fn progress(self) -> f64 {
        self.index() as f64 / (Stage::ALL.len() - 1) as f64
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "committed" => Ok(Stage::Committed),
            "reviewing" => Ok(Stage::Reviewing),
            "patching" => Ok(Stage::Patching),
            "resolved" => Ok(Stage::Resolved),
            _ => Err(format!(
                "Invalid stage '{}'. Must be one of: committed, reviewing, patching, resolved",
                s
            )),
        }
    }
}

/// Self-reported emotional state attached to a submission. Panicking bumps
/// the classified priority to critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Frustrated,
    Panicking,
    Neutral,
    Sick,
}

impl Mood {
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Frustrated => "frustrated",
            Mood::Panicking => "panicking",
            Mood::Neutral => "neutral",
            Mood::Sick => "sick",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Frustrated => "😤",
            Mood::Panicking => "😰",
            Mood::Neutral => "😐",
            Mood::Sick => "🤒",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "frustrated" => Ok(Mood::Frustrated),
            "panicking" => Ok(Mood::Panicking),
            "neutral" => Ok(Mood::Neutral),
            "sick" => Ok(Mood::Sick),
            _ => Err(format!(
                "Invalid mood '{}'. Must be one of: frustrated, panicking, neutral, sick",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role '{}'. Must be student or admin", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub display_id: String,
    pub title: String,
    pub category: Category,
    pub priority: Priority,
    pub stage: Stage,
    pub upvotes: i64,
    pub mood: Option<Mood>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub attachment_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub email: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub contact_number: Option<String>,
    pub avatar_ref: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// An authenticated identity, resolved once at the boundary (CLI `--as` or
/// HTTP bearer token) and passed explicitly into every lifecycle and policy
/// call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub role: Role,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_and_progress() {
        assert_eq!(Stage::Committed.index(), 0);
        assert_eq!(Stage::Resolved.index(), 3);
        assert_eq!(Stage::Committed.progress(), 0.0);
        assert_eq!(Stage::Resolved.progress(), 1.0);
        assert!((Stage::Patching.progress() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_stage_roundtrip() {
        for stage in Stage::ALL {
            assert_eq!(stage.as_str().parse::<Stage>().unwrap(), stage);
        }
    }

    #[test]
    fn test_category_roundtrip() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!("urgent".parse::<Priority>().is_err());
        assert!("merged".parse::<Stage>().is_err());
        assert!("happy".parse::<Mood>().is_err());
        assert!("staff".parse::<Role>().is_err());
    }

    #[test]
    fn test_kebab_case_category() {
        assert_eq!(Category::MentalHealth.as_str(), "mental-health");
        assert_eq!(
            "mental-health".parse::<Category>().unwrap(),
            Category::MentalHealth
        );
    }
}
