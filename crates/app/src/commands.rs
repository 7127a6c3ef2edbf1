use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use tally_core::{Group, GroupId, Rule, RuleId, Transaction};
use tally_ingest::FileUpload;
use tally_store::EntityStore;

pub async fn ingest(store: &mut EntityStore, files: Vec<PathBuf>) -> Result<()> {
    let uploads: Vec<FileUpload> = files.into_iter().map(FileUpload::from_path).collect();
    tally_ingest::ingest(store, &uploads)
        .await
        .context("ingest failed")?;

    for file in store.files() {
        println!("{:>3}%  {:<9}  {}", file.progress, file.status, file.name);
    }
    println!(
        "{} transactions in store ({} ungrouped)",
        store.transactions().len(),
        store
            .transactions()
            .iter()
            .filter(|t| t.group_ids.is_empty())
            .count()
    );
    Ok(())
}

fn group_label(store: &EntityStore, id: &GroupId) -> String {
    match store.group(id) {
        Some(group) => group.name.clone(),
        // Dangling reference to a deleted group.
        None => "unknown".to_string(),
    }
}

fn membership_labels(store: &EntityStore, tx: &Transaction) -> String {
    if tx.group_ids.is_empty() {
        return "ungrouped".to_string();
    }
    tx.group_ids
        .iter()
        .map(|id| group_label(store, id))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn list_transactions(store: &EntityStore) {
    for tx in store.transactions() {
        println!(
            "{:<16}  {:<40}  {:>12}  [{}]",
            tx.date,
            tx.description,
            tx.amount_raw,
            membership_labels(store, tx)
        );
    }
    println!("{} transactions", store.transactions().len());
}

pub fn list_groups(store: &EntityStore) {
    for group in store.groups() {
        let count = store
            .transactions()
            .iter()
            .filter(|t| t.is_in_group(&group.id))
            .count();
        println!(
            "{:<12}  {:<16}  {:<8}  {} transactions",
            group.id, group.name, group.color, count
        );
    }
}

pub async fn add_group(store: &mut EntityStore, name: &str, color: &str) {
    let group = Group::new(name, color);
    println!("created group {} ({})", group.name, group.id);
    store.add_group(group).await;
}

pub async fn delete_group(store: &mut EntityStore, id: &str) {
    store.delete_group(&GroupId::new(id)).await;
    println!("deleted group {id} and its rules");
}

pub fn list_rules(store: &EntityStore) {
    for rule in store.rules() {
        let state = if rule.is_active { "active" } else { "inactive" };
        println!(
            "{:<12}  {:<16}  {:<8}  group {}  [{}]",
            rule.id, rule.name, state, rule.group_id, rule.contains
        );
    }
}

pub async fn add_rule(
    store: &mut EntityStore,
    name: &str,
    contains: &str,
    group: &str,
) -> Result<()> {
    let rule = Rule::new(name, contains, GroupId::new(group));
    let id = rule.id.clone();
    store.add_rule(rule).await?;
    println!("created rule {id}");
    Ok(())
}

pub async fn delete_rule(store: &mut EntityStore, id: &str) {
    store.delete_rule(&RuleId::new(id)).await;
    println!("deleted rule {id}");
}

pub async fn toggle_rule(store: &mut EntityStore, id: &str) {
    store.toggle_rule_active(&RuleId::new(id)).await;
    if let Some(rule) = store.rules().iter().find(|r| r.id.0 == id) {
        println!(
            "rule {id} is now {}",
            if rule.is_active { "active" } else { "inactive" }
        );
    }
}

// ── Rules files ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RulesFile {
    #[serde(default)]
    rules: Vec<RuleEntry>,
}

#[derive(Debug, Deserialize)]
struct RuleEntry {
    name: String,
    contains: String,
    group: String,
}

/// Replace the rule set from a `[[rules]]` TOML file and recategorize.
pub async fn import_rules(store: &mut EntityStore, path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    let file: RulesFile =
        toml::from_str(&text).with_context(|| format!("could not parse {}", path.display()))?;

    let rules: Vec<Rule> = file
        .rules
        .iter()
        .map(|entry| Rule::new(&entry.name, &entry.contains, GroupId::new(entry.group.as_str())))
        .collect();
    let count = rules.len();
    store.set_rules(rules).await?;
    println!("loaded {count} rules from {}", path.display());
    Ok(())
}
