use thiserror::Error;

use tally_core::{
    default_groups, default_rules, FileStatus, FileUploadProgress, Group, GroupId, Rule, RuleId,
    Transaction, TransactionId,
};
use tally_import::{apply_incremental, reapply_all, MatchPolicy};

use crate::persist::{configured_tier, Collection, SnapshotStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown group: {0}")]
    UnknownGroup(GroupId),
}

/// Whether deleting a group leaves its id on transactions for "unknown"
/// rendering instead of stripping it. Undecided product behavior; this is
/// the single switch point for flipping it.
fn prune_dangling_membership() -> bool {
    false
}

/// The three related entity collections plus per-file upload progress.
///
/// Owned and passed by reference, never a process-wide singleton. All
/// mutations are synchronous relative to the single-task execution model;
/// callers always see whole, consistent collections. Every mutation ends by
/// mirroring the touched, persistence-configured collections to durable
/// storage (fire-and-forget).
pub struct EntityStore {
    groups: Vec<Group>,
    rules: Vec<Rule>,
    transactions: Vec<Transaction>,
    files: Vec<FileUploadProgress>,
    policy: MatchPolicy,
    snapshots: SnapshotStore,
}

impl EntityStore {
    /// Hydrate from durable snapshots. Collections without a configured
    /// tier, or whose snapshot is missing or corrupt, start from their seed
    /// defaults; hydration never fails startup.
    pub async fn init(snapshots: SnapshotStore) -> Self {
        let groups = match configured_tier(Collection::Groups) {
            Some(_) => snapshots
                .read(Collection::Groups)
                .await
                .unwrap_or_else(default_groups),
            None => default_groups(),
        };
        let rules = match configured_tier(Collection::Rules) {
            Some(_) => snapshots
                .read(Collection::Rules)
                .await
                .unwrap_or_else(default_rules),
            None => default_rules(),
        };
        let transactions = match configured_tier(Collection::Transactions) {
            Some(_) => snapshots
                .read(Collection::Transactions)
                .await
                .unwrap_or_default(),
            None => Vec::new(),
        };
        let files = match configured_tier(Collection::Files) {
            Some(_) => snapshots.read(Collection::Files).await.unwrap_or_default(),
            None => Vec::new(),
        };

        EntityStore {
            groups,
            rules,
            transactions,
            files,
            policy: MatchPolicy::default(),
            snapshots,
        }
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Close the durable backend. State is already mirrored mutation by
    /// mutation; this only releases the connection.
    pub async fn dispose(self) {
        self.snapshots.close().await;
    }

    // ── Read-only snapshots ───────────────────────────────────────────────

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn files(&self) -> &[FileUploadProgress] {
        &self.files
    }

    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| &g.id == id)
    }

    // ── Groups ────────────────────────────────────────────────────────────

    pub async fn add_group(&mut self, group: Group) {
        self.groups.push(group);
        self.mirror(Collection::Groups).await;
    }

    /// Replace the group with the same id. Unknown ids are a silent no-op.
    pub async fn update_group(&mut self, group: Group) {
        if let Some(existing) = self.groups.iter_mut().find(|g| g.id == group.id) {
            *existing = group;
            self.mirror(Collection::Groups).await;
        }
    }

    pub async fn set_groups(&mut self, groups: Vec<Group>) {
        self.groups = groups;
        self.mirror(Collection::Groups).await;
    }

    /// Delete a group, cascading to every rule that references it. When the
    /// cascade removed rules, a full reapply follows so memberships reflect
    /// the surviving rule set. Transactions keep any now-dangling reference
    /// to the deleted id (see [`prune_dangling_membership`]); collaborators
    /// render those as "unknown".
    pub async fn delete_group(&mut self, id: &GroupId) {
        let groups_before = self.groups.len();
        self.groups.retain(|g| &g.id != id);
        if self.groups.len() == groups_before {
            return;
        }

        let rules_before = self.rules.len();
        self.rules.retain(|r| &r.group_id != id);
        let cascaded = self.rules.len() != rules_before;

        if prune_dangling_membership() {
            for tx in &mut self.transactions {
                tx.unassign_group(id);
            }
            self.mirror(Collection::Transactions).await;
        }

        if cascaded {
            tracing::debug!(
                group = %id,
                removed = rules_before - self.rules.len(),
                "cascade-deleted rules for group"
            );
            self.reapply().await;
            self.mirror(Collection::Rules).await;
        }
        self.mirror(Collection::Groups).await;
    }

    // ── Rules ─────────────────────────────────────────────────────────────

    /// Add a rule. The referenced group must exist at creation time; the
    /// reference is not revalidated later (group deletion cascades instead).
    pub async fn add_rule(&mut self, rule: Rule) -> Result<(), StoreError> {
        if self.group(&rule.group_id).is_none() {
            return Err(StoreError::UnknownGroup(rule.group_id.clone()));
        }
        self.rules.push(rule);
        self.reapply().await;
        self.mirror(Collection::Rules).await;
        Ok(())
    }

    /// Replace the rule with the same id. Unknown ids are a silent no-op.
    pub async fn update_rule(&mut self, rule: Rule) {
        if let Some(existing) = self.rules.iter_mut().find(|r| r.id == rule.id) {
            *existing = rule;
            self.reapply().await;
            self.mirror(Collection::Rules).await;
        }
    }

    pub async fn delete_rule(&mut self, id: &RuleId) {
        let before = self.rules.len();
        self.rules.retain(|r| &r.id != id);
        if self.rules.len() != before {
            self.reapply().await;
            self.mirror(Collection::Rules).await;
        }
    }

    pub async fn toggle_rule_active(&mut self, id: &RuleId) {
        if let Some(rule) = self.rules.iter_mut().find(|r| &r.id == id) {
            rule.is_active = !rule.is_active;
            self.reapply().await;
            self.mirror(Collection::Rules).await;
        }
    }

    /// Bulk-replace the rule set (e.g. loading a rules file). Every entry
    /// must reference an existing group.
    pub async fn set_rules(&mut self, rules: Vec<Rule>) -> Result<(), StoreError> {
        if let Some(bad) = rules.iter().find(|r| self.group(&r.group_id).is_none()) {
            return Err(StoreError::UnknownGroup(bad.group_id.clone()));
        }
        self.rules = rules;
        self.reapply().await;
        self.mirror(Collection::Rules).await;
        Ok(())
    }

    // ── Transactions ──────────────────────────────────────────────────────

    /// Full-replace bulk commit from ingest. The incoming batch is
    /// categorized against the current rules before it becomes visible, so
    /// no observer ever sees a half-categorized collection. Each ingest
    /// pass represents the full corpus currently known to the system.
    pub async fn add_transactions(&mut self, batch: Vec<Transaction>) {
        self.transactions = apply_incremental(batch, &self.rules, self.policy);
        self.mirror(Collection::Transactions).await;
    }

    /// Manual membership add. Bypasses the categorization engine entirely;
    /// idempotent. Unknown transaction ids are a silent no-op.
    pub async fn add_group_to_transaction(&mut self, tx_id: &TransactionId, group_id: GroupId) {
        if let Some(tx) = self.transactions.iter_mut().find(|t| &t.id == tx_id) {
            tx.assign_group(group_id);
            self.mirror(Collection::Transactions).await;
        }
    }

    /// Manual membership removal, the counterpart of
    /// [`add_group_to_transaction`].
    pub async fn remove_group_from_transaction(
        &mut self,
        tx_id: &TransactionId,
        group_id: &GroupId,
    ) {
        if let Some(tx) = self.transactions.iter_mut().find(|t| &t.id == tx_id) {
            tx.unassign_group(group_id);
            self.mirror(Collection::Transactions).await;
        }
    }

    // ── File upload progress ──────────────────────────────────────────────

    pub async fn set_file_progresses(&mut self, files: Vec<FileUploadProgress>) {
        self.files = files;
        self.mirror(Collection::Files).await;
    }

    /// Update one file's progress by name. Unknown names are a no-op.
    pub async fn set_file_progress(&mut self, name: &str, progress: u8, status: FileStatus) {
        if let Some(file) = self.files.iter_mut().find(|f| f.name == name) {
            file.progress = progress;
            file.status = status;
            self.mirror(Collection::Files).await;
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Full reset-and-recompute of every transaction's memberships from the
    /// current rule set, committed as one whole collection.
    async fn reapply(&mut self) {
        let transactions = std::mem::take(&mut self.transactions);
        self.transactions = reapply_all(transactions, &self.rules, self.policy);
        self.mirror(Collection::Transactions).await;
    }

    /// Mirror one collection to durable storage if it is configured for
    /// persistence. Failures are logged and swallowed; mutation and mirror
    /// are not transactional, and a crash in between may leave durable
    /// storage one mutation behind.
    async fn mirror(&self, collection: Collection) {
        if configured_tier(collection).is_none() {
            return;
        }
        let result = match collection {
            Collection::Groups => self.snapshots.write(collection, &self.groups).await,
            Collection::Transactions => self.snapshots.write(collection, &self.transactions).await,
            Collection::Rules => self.snapshots.write(collection, &self.rules).await,
            Collection::Files => self.snapshots.write(collection, &self.files).await,
        };
        if let Err(e) = result {
            tracing::warn!(
                "failed to mirror {} to durable storage: {e}",
                collection.key()
            );
        }
    }
}
