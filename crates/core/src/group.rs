use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        GroupId(id.into())
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user-defined spending category with a display color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    /// Display name. Uniqueness is not enforced.
    pub name: String,
    /// Display token, e.g. "#ff0000".
    pub color: String,
}

impl Group {
    /// Create a group with a freshly generated id.
    pub fn new(name: &str, color: &str) -> Self {
        Group {
            id: GroupId(uuid::Uuid::new_v4().to_string()),
            name: name.to_string(),
            color: color.to_string(),
        }
    }
}

pub const DEFAULT_GROUPS: &[(&str, &str, &str)] = &[
    ("1", "Food", "#ff0000"),
    ("2", "Transport", "#00ff00"),
    ("3", "Petrol", "#0000ff"),
];

/// Seed groups used when no durable snapshot exists.
pub fn default_groups() -> Vec<Group> {
    DEFAULT_GROUPS
        .iter()
        .map(|(id, name, color)| Group {
            id: GroupId::new(*id),
            name: (*name).to_string(),
            color: (*color).to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_groups_get_distinct_ids() {
        let a = Group::new("Rent", "#123456");
        let b = Group::new("Rent", "#123456");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn default_groups_are_seeded() {
        let groups = default_groups();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].name, "Food");
        assert_eq!(groups[1].id, GroupId::new("2"));
    }
}
