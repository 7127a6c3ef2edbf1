use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::group::GroupId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub String);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One imported transaction row. A record either exists with all fields set
/// or does not exist; there is no partially-constructed state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// Source-format date string, carried through unvalidated.
    pub date: String,
    pub description: String,
    /// Amount exactly as it appeared in the export.
    pub amount_raw: String,
    /// Lenient numeric reading of `amount_raw`; `None` when unparseable.
    pub amount_numeric: Option<Decimal>,
    pub file_name: String,
    /// Group memberships in insertion order, duplicates forbidden.
    pub group_ids: Vec<GroupId>,
}

impl Transaction {
    /// Idempotent membership add: an already-present id leaves the
    /// sequence unchanged.
    pub fn assign_group(&mut self, group_id: GroupId) {
        if !self.group_ids.contains(&group_id) {
            self.group_ids.push(group_id);
        }
    }

    /// Idempotent membership removal: an absent id is a no-op.
    pub fn unassign_group(&mut self, group_id: &GroupId) {
        self.group_ids.retain(|g| g != group_id);
    }

    pub fn is_in_group(&self, group_id: &GroupId) -> bool {
        self.group_ids.contains(group_id)
    }
}
