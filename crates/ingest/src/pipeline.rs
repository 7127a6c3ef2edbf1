use std::path::PathBuf;
use thiserror::Error;

use tally_core::{FileStatus, FileUploadProgress, Transaction};
use tally_store::EntityStore;

pub const CSV_CONTENT_TYPE: &str = "text/csv";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("no CSV files uploaded")]
    NoCsvFiles,
}

/// One uploaded file: display name, declared MIME type, and where its
/// content comes from.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub name: String,
    pub content_type: String,
    pub source: FileSource,
}

#[derive(Debug, Clone)]
pub enum FileSource {
    /// Read from disk at ingest time; the read is the suspend point.
    Path(PathBuf),
    /// Content already in memory (drop payloads, tests).
    Text(String),
}

impl FileUpload {
    /// Build an upload from a filesystem path, inferring the display name
    /// and declared type from the path itself.
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let content_type = if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        {
            CSV_CONTENT_TYPE
        } else {
            "application/octet-stream"
        };
        FileUpload {
            name,
            content_type: content_type.to_string(),
            source: FileSource::Path(path),
        }
    }

    pub fn from_text(name: &str, content: &str) -> Self {
        FileUpload {
            name: name.to_string(),
            content_type: CSV_CONTENT_TYPE.to_string(),
            source: FileSource::Text(content.to_string()),
        }
    }

    async fn read(&self) -> std::io::Result<String> {
        match &self.source {
            FileSource::Path(path) => tokio::fs::read_to_string(path).await,
            FileSource::Text(text) => Ok(text.clone()),
        }
    }
}

/// Run one ingestion batch to completion.
///
/// A batch with zero CSV-typed files fails up front, before any per-file
/// state exists. Otherwise every submitted file gets a progress row, the
/// files are processed strictly sequentially as an ordered task list (one
/// read ever in flight), a failed read marks only that file as errored, and
/// all successfully parsed records land in the store through a single bulk
/// commit which also categorizes them against the active rules. There is no
/// cancellation once a batch starts; a future cancellation token would be
/// threaded through the per-file loop.
pub async fn ingest(store: &mut EntityStore, uploads: &[FileUpload]) -> Result<(), IngestError> {
    if !uploads.iter().any(|u| u.content_type == CSV_CONTENT_TYPE) {
        return Err(IngestError::NoCsvFiles);
    }

    store
        .set_file_progresses(
            uploads
                .iter()
                .map(|u| FileUploadProgress::started(&u.name))
                .collect(),
        )
        .await;

    let mut batch: Vec<Transaction> = Vec::new();

    for upload in uploads {
        match upload.read().await {
            Ok(content) => {
                let records = tally_import::parse(&content, &upload.name);
                store
                    .set_file_progress(&upload.name, 50, FileStatus::Uploading)
                    .await;
                tracing::debug!(file = %upload.name, rows = records.len(), "parsed upload");
                batch.extend(records);
                store
                    .set_file_progress(&upload.name, 100, FileStatus::Completed)
                    .await;
            }
            Err(e) => {
                tracing::warn!(file = %upload.name, "failed to read upload: {e}");
                store
                    .set_file_progress(&upload.name, 0, FileStatus::Error)
                    .await;
            }
        }
    }

    store.add_transactions(batch).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{GroupId, Rule};
    use tally_store::SnapshotStore;

    async fn fresh_store() -> EntityStore {
        EntityStore::init(SnapshotStore::in_memory().await.unwrap()).await
    }

    const AUG_CSV: &str = "date,description,amount\n\
                           Wed Jul 02 2025,UBER TRIP,--40 EGP\n\
                           Wed Jul 03 2025,CAIZO CAFE,--15 EGP\n";

    #[tokio::test]
    async fn zero_csv_files_fails_before_any_state() {
        let mut store = fresh_store().await;
        let uploads = vec![FileUpload {
            name: "notes.txt".to_string(),
            content_type: "text/plain".to_string(),
            source: FileSource::Text("hello".to_string()),
        }];

        let err = ingest(&mut store, &uploads).await.unwrap_err();
        assert!(matches!(err, IngestError::NoCsvFiles));
        assert!(store.files().is_empty());
        assert!(store.transactions().is_empty());
    }

    #[tokio::test]
    async fn end_to_end_rule_categorization() {
        let mut store = fresh_store().await;
        store
            .set_rules(vec![Rule::new("ride", "Uber", GroupId::new("2"))])
            .await
            .unwrap();

        ingest(&mut store, &[FileUpload::from_text("aug.csv", AUG_CSV)])
            .await
            .unwrap();

        let txs = store.transactions();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].id.0, "aug.csv-1");
        assert_eq!(txs[0].group_ids, vec![GroupId::new("2")]);
        assert!(txs[1].group_ids.is_empty());

        let files = store.files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].progress, 100);
        assert_eq!(files[0].status, FileStatus::Completed);
    }

    #[tokio::test]
    async fn failed_read_is_isolated_to_its_file() {
        let mut store = fresh_store().await;
        store.set_rules(Vec::new()).await.unwrap();

        let missing = PathBuf::from("/nonexistent/tally-tests/gone.csv");
        let uploads = vec![
            FileUpload::from_text("a.csv", AUG_CSV),
            FileUpload {
                name: "b.csv".to_string(),
                content_type: CSV_CONTENT_TYPE.to_string(),
                source: FileSource::Path(missing),
            },
        ];

        ingest(&mut store, &uploads).await.unwrap();

        let files = store.files();
        assert_eq!(files[0].status, FileStatus::Completed);
        assert_eq!(files[0].progress, 100);
        assert_eq!(files[1].status, FileStatus::Error);
        assert_eq!(files[1].progress, 0);

        // Only file A's rows were committed.
        assert_eq!(store.transactions().len(), 2);
        assert!(store.transactions().iter().all(|t| t.file_name == "a.csv"));
    }

    #[tokio::test]
    async fn every_submitted_file_gets_a_progress_row() {
        let mut store = fresh_store().await;
        store.set_rules(Vec::new()).await.unwrap();

        let uploads = vec![
            FileUpload::from_text("a.csv", AUG_CSV),
            FileUpload {
                name: "notes.txt".to_string(),
                content_type: "text/plain".to_string(),
                source: FileSource::Text(String::new()),
            },
        ];

        ingest(&mut store, &uploads).await.unwrap();

        // The non-CSV file is tracked too; its empty content parses to
        // nothing.
        assert_eq!(store.files().len(), 2);
        assert_eq!(store.transactions().len(), 2);
    }

    #[tokio::test]
    async fn ingest_replaces_prior_corpus() {
        let mut store = fresh_store().await;
        store.set_rules(Vec::new()).await.unwrap();

        ingest(&mut store, &[FileUpload::from_text("a.csv", AUG_CSV)])
            .await
            .unwrap();
        assert_eq!(store.transactions().len(), 2);

        let other = "date,description,amount\n2025-08-01,ONE ROW,-1\n";
        ingest(&mut store, &[FileUpload::from_text("b.csv", other)])
            .await
            .unwrap();

        assert_eq!(store.transactions().len(), 1);
        assert_eq!(store.transactions()[0].file_name, "b.csv");
    }

    #[test]
    fn from_path_infers_csv_type() {
        let upload = FileUpload::from_path(PathBuf::from("/tmp/Statement.CSV"));
        assert_eq!(upload.name, "Statement.CSV");
        assert_eq!(upload.content_type, CSV_CONTENT_TYPE);

        let other = FileUpload::from_path(PathBuf::from("/tmp/readme.md"));
        assert_eq!(other.content_type, "application/octet-stream");
    }
}
