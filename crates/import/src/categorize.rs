use tally_core::{Rule, Transaction};

use crate::matcher::{matching_groups, MatchPolicy};

/// Populate group memberships on a freshly-ingested batch.
///
/// Only the given transactions are touched; memberships they already carry
/// are kept and rule matches are added on top (idempotently). Pre-existing
/// transactions elsewhere are never affected; the caller commits the
/// returned batch atomically.
pub fn apply_incremental(
    new_transactions: Vec<Transaction>,
    rules: &[Rule],
    policy: MatchPolicy,
) -> Vec<Transaction> {
    new_transactions
        .into_iter()
        .map(|mut tx| {
            for group_id in matching_groups(&tx.description, rules, policy) {
                tx.assign_group(group_id);
            }
            tx
        })
        .collect()
}

/// Reset every transaction's memberships and recompute them from the
/// current rule set.
///
/// Invoked whenever a rule is added, edited, deleted or toggled. Manual
/// assignments are discarded wholesale; membership after this call
/// reflects the rules alone. That overwrite is deliberate, documented
/// behavior; resolving it would need assignment provenance tracking.
pub fn reapply_all(
    all_transactions: Vec<Transaction>,
    rules: &[Rule],
    policy: MatchPolicy,
) -> Vec<Transaction> {
    all_transactions
        .into_iter()
        .map(|mut tx| {
            tx.group_ids = matching_groups(&tx.description, rules, policy);
            tx
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{GroupId, TransactionId};

    fn tx(id: &str, description: &str) -> Transaction {
        Transaction {
            id: TransactionId(id.to_string()),
            date: "2025-07-02".to_string(),
            description: description.to_string(),
            amount_raw: "-10".to_string(),
            amount_numeric: None,
            file_name: "f.csv".to_string(),
            group_ids: Vec::new(),
        }
    }

    fn rule(contains: &str, group: &str) -> Rule {
        Rule::new(contains, contains, GroupId::new(group))
    }

    #[test]
    fn incremental_populates_matches() {
        let rules = vec![rule("UBER", "2")];
        let out = apply_incremental(
            vec![tx("a", "UBER TRIP"), tx("b", "CAIZO CAFE")],
            &rules,
            MatchPolicy::default(),
        );
        assert_eq!(out[0].group_ids, vec![GroupId::new("2")]);
        assert!(out[1].group_ids.is_empty());
    }

    #[test]
    fn incremental_keeps_existing_memberships() {
        let rules = vec![rule("UBER", "2")];
        let mut seeded = tx("a", "UBER TRIP");
        seeded.assign_group(GroupId::new("9"));
        let out = apply_incremental(vec![seeded], &rules, MatchPolicy::default());
        assert_eq!(out[0].group_ids, vec![GroupId::new("9"), GroupId::new("2")]);
    }

    #[test]
    fn reapply_discards_manual_assignments() {
        let rules = vec![rule("UBER", "2")];
        let mut seeded = tx("a", "UBER TRIP");
        seeded.assign_group(GroupId::new("9"));
        let out = reapply_all(vec![seeded], &rules, MatchPolicy::default());
        assert_eq!(out[0].group_ids, vec![GroupId::new("2")]);
    }

    #[test]
    fn reapply_with_no_rules_empties_memberships() {
        let mut seeded = tx("a", "UBER TRIP");
        seeded.assign_group(GroupId::new("2"));
        let out = reapply_all(vec![seeded], &[], MatchPolicy::default());
        assert!(out[0].group_ids.is_empty());
    }

    #[test]
    fn reapply_is_idempotent() {
        let rules = vec![rule("UBER", "2"), rule("TRIP", "7")];
        let batch = vec![tx("a", "UBER TRIP"), tx("b", "CAIZO CAFE")];
        let once = reapply_all(batch, &rules, MatchPolicy::default());
        let twice = reapply_all(once.clone(), &rules, MatchPolicy::default());
        assert_eq!(once, twice);
    }

    #[test]
    fn output_order_follows_input_order() {
        let rules = vec![rule("A", "1")];
        let out = reapply_all(
            vec![tx("x", "A"), tx("y", "B"), tx("z", "A")],
            &rules,
            MatchPolicy::default(),
        );
        let ids: Vec<&str> = out.iter().map(|t| t.id.0.as_str()).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
    }
}
