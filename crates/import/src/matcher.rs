use tally_core::{GroupId, Rule};

/// Case handling for keyword matching. The default folds case, since bank
/// exports shout in uppercase while rules are typed by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPolicy {
    pub case_insensitive: bool,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        MatchPolicy {
            case_insensitive: true,
        }
    }
}

/// Collect the groups whose rule matches `description`.
///
/// A rule matches when ANY of its keywords is a literal substring of the
/// description. Matching is a union across all active rules (there is no
/// first-match priority) but the returned sequence follows the rule
/// collection's order, first seen wins, so output ordering is stable.
/// Inactive rules are excluded before matching begins.
pub fn matching_groups(description: &str, rules: &[Rule], policy: MatchPolicy) -> Vec<GroupId> {
    let haystack = if policy.case_insensitive {
        description.to_lowercase()
    } else {
        description.to_string()
    };

    let mut groups: Vec<GroupId> = Vec::new();
    for rule in rules.iter().filter(|r| r.is_active) {
        if groups.contains(&rule.group_id) {
            continue;
        }
        let hit = rule.keywords().any(|kw| {
            if policy.case_insensitive {
                haystack.contains(&kw.to_lowercase())
            } else {
                haystack.contains(kw)
            }
        });
        if hit {
            groups.push(rule.group_id.clone());
        }
    }
    groups
}
