use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::group::GroupId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleId(pub String);

impl RuleId {
    pub fn new(id: impl Into<String>) -> Self {
        RuleId(id.into())
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A keyword-matching policy that auto-assigns transactions to a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub name: String,
    /// Comma-separated keyword substrings, e.g. "UBER, LYFT".
    pub contains: String,
    /// Must reference an existing group at creation time.
    pub group_id: GroupId,
    /// Inactive rules are kept but excluded from matching.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Rule {
    /// Create an active rule with a freshly generated id.
    pub fn new(name: &str, contains: &str, group_id: GroupId) -> Self {
        Rule {
            id: RuleId(uuid::Uuid::new_v4().to_string()),
            name: name.to_string(),
            contains: contains.to_string(),
            group_id,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Non-blank keyword entries in declaration order.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.contains
            .split(',')
            .map(str::trim)
            .filter(|kw| !kw.is_empty())
    }
}

/// Seed rules used when no durable snapshot exists. Ids are the historical
/// literal ones so existing snapshots keep referencing them.
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            id: RuleId::new("Petrol"),
            name: "Petrol".to_string(),
            contains: "CHILLOUT, MOTAHEDA, CHILL OUT, MISR PETROLEUM ".to_string(),
            group_id: GroupId::new("3"),
            is_active: true,
            created_at: Utc::now(),
        },
        Rule {
            id: RuleId::new("food"),
            name: "Food".to_string(),
            contains: "CAIZO, talabat, STACK, CHICKIN WOR, SECOND CU, NOLA, CIRCL, AGHA, Wimp, \
                       BAZOOKA, ELABD, Suez Pastry SUE, COASTA, TSEPPAS, CREPE WAFFLE TAGMOA, \
                       HOLMES BURGER"
                .to_string(),
            group_id: GroupId::new("1"),
            is_active: true,
            created_at: Utc::now(),
        },
    ]
}
