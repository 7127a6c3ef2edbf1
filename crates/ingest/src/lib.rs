pub mod pipeline;

pub use pipeline::{ingest, FileSource, FileUpload, IngestError, CSV_CONTENT_TYPE};
