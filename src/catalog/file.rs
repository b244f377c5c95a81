//! JSON snapshot catalogs: one loaded from disk, one held in memory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::CatalogProvider;
use super::model::{CourseRecord, snapshot_text};
use crate::error::CatalogError;

#[derive(Debug, Default)]
struct Snapshot {
    records: Vec<CourseRecord>,
    text: String,
}

impl Snapshot {
    fn new(records: Vec<CourseRecord>) -> Self {
        let text = snapshot_text(&records);
        Self { records, text }
    }
}

/// Catalog backed by a JSON array of course records on disk.
///
/// A failed load leaves the catalog unloaded rather than erroring, so the
/// advisor reports itself unavailable until a `reload` succeeds.
pub struct JsonFileCatalog {
    path: PathBuf,
    limit: usize,
    snapshot: RwLock<Snapshot>,
}

impl JsonFileCatalog {
    /// Create the catalog and attempt an initial load.
    pub async fn open(path: impl Into<PathBuf>, limit: usize) -> Self {
        let catalog = Self {
            path: path.into(),
            limit,
            snapshot: RwLock::new(Snapshot::default()),
        };
        if let Err(e) = catalog.reload().await {
            warn!(path = %catalog.path.display(), error = %e, "Course catalog not loaded");
        }
        catalog
    }

    /// Re-read the file. On failure the previous snapshot is cleared.
    pub async fn reload(&self) -> Result<usize, CatalogError> {
        match read_records(&self.path, self.limit).await {
            Ok(records) => {
                let count = records.len();
                *self.snapshot.write().await = Snapshot::new(records);
                info!(path = %self.path.display(), courses = count, "Loaded course catalog");
                Ok(count)
            }
            Err(e) => {
                *self.snapshot.write().await = Snapshot::default();
                Err(e)
            }
        }
    }
}

async fn read_records(path: &Path, limit: usize) -> Result<Vec<CourseRecord>, CatalogError> {
    let shown = path.display().to_string();
    let raw = fs::read_to_string(path)
        .await
        .map_err(|e| CatalogError::Read {
            path: shown.clone(),
            reason: e.to_string(),
        })?;
    let values: Vec<serde_json::Value> =
        serde_json::from_str(&raw).map_err(|e| CatalogError::Parse {
            path: shown.clone(),
            reason: e.to_string(),
        })?;

    let mut skipped = 0usize;
    let records: Vec<CourseRecord> = values
        .into_iter()
        .take(limit)
        .filter_map(|value| match serde_json::from_value::<CourseRecord>(value) {
            Ok(record) if record.is_valid() => Some(record),
            _ => {
                skipped += 1;
                None
            }
        })
        .collect();

    if skipped > 0 {
        warn!(path = %shown, skipped = skipped, "Skipped invalid course records");
    }
    if records.is_empty() {
        return Err(CatalogError::Empty { path: shown });
    }
    Ok(records)
}

#[async_trait]
impl CatalogProvider for JsonFileCatalog {
    async fn catalog_text(&self) -> String {
        self.snapshot.read().await.text.clone()
    }

    async fn is_loaded(&self) -> bool {
        !self.snapshot.read().await.records.is_empty()
    }

    async fn courses(&self) -> Vec<CourseRecord> {
        self.snapshot.read().await.records.clone()
    }
}

/// Fixed in-memory catalog.
pub struct StaticCatalog {
    snapshot: Snapshot,
    loaded: bool,
}

impl StaticCatalog {
    pub fn new(records: Vec<CourseRecord>) -> Self {
        Self {
            snapshot: Snapshot::new(records),
            loaded: true,
        }
    }

    /// A catalog that reports itself as not loaded.
    pub fn unloaded() -> Self {
        Self {
            snapshot: Snapshot::default(),
            loaded: false,
        }
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalog {
    async fn catalog_text(&self) -> String {
        self.snapshot.text.clone()
    }

    async fn is_loaded(&self) -> bool {
        self.loaded
    }

    async fn courses(&self) -> Vec<CourseRecord> {
        self.snapshot.records.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_catalog(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const TWO_COURSES: &str = r#"[
        {"COURSE": "CS 100", "TITLE": "Roadmap to Computing", "CRN": 11111},
        {"COURSE": "CS 435", "TITLE": "Advanced Data Structures", "CRN": 22222}
    ]"#;

    #[tokio::test]
    async fn loads_records_from_file() {
        let file = write_catalog(TWO_COURSES);
        let catalog = JsonFileCatalog::open(file.path(), 200).await;
        assert!(catalog.is_loaded().await);
        assert_eq!(catalog.courses().await.len(), 2);
        let text = catalog.catalog_text().await;
        assert!(text.starts_with("Course CS 100, titled Roadmap to Computing."));
        assert!(text.contains("\n---\nCourse CS 435"));
    }

    #[tokio::test]
    async fn respects_record_limit() {
        let file = write_catalog(TWO_COURSES);
        let catalog = JsonFileCatalog::open(file.path(), 1).await;
        let courses = catalog.courses().await;
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].course_code, "CS 100");
    }

    #[tokio::test]
    async fn skips_invalid_records() {
        let file = write_catalog(
            r#"[{"COURSE": "CS 100"}, {"COURSE": "CS 288", "TITLE": "Linux"}, 42]"#,
        );
        let catalog = JsonFileCatalog::open(file.path(), 200).await;
        let courses = catalog.courses().await;
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].course_code, "CS 288");
    }

    #[tokio::test]
    async fn missing_file_is_not_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = JsonFileCatalog::open(dir.path().join("absent.json"), 200).await;
        assert!(!catalog.is_loaded().await);
        assert_eq!(catalog.catalog_text().await, "");
        assert!(matches!(catalog.reload().await, Err(CatalogError::Read { .. })));
    }

    #[tokio::test]
    async fn empty_or_malformed_files_are_not_loaded() {
        let empty = write_catalog("[]");
        let catalog = JsonFileCatalog::open(empty.path(), 200).await;
        assert!(!catalog.is_loaded().await);
        let expected = empty.path().display().to_string();
        assert!(matches!(catalog.reload().await, Err(CatalogError::Empty { path }) if path == expected));

        let malformed = write_catalog("{not json");
        let catalog = JsonFileCatalog::open(malformed.path(), 200).await;
        assert!(matches!(catalog.reload().await, Err(CatalogError::Parse { .. })));
    }

    #[tokio::test]
    async fn reload_picks_up_new_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courses.json");
        let catalog = JsonFileCatalog::open(&path, 200).await;
        assert!(!catalog.is_loaded().await);

        std::fs::write(&path, TWO_COURSES).unwrap();
        assert_eq!(catalog.reload().await.unwrap(), 2);
        assert!(catalog.is_loaded().await);

        std::fs::write(&path, "[]").unwrap();
        assert!(catalog.reload().await.is_err());
        assert!(!catalog.is_loaded().await);
    }

    #[tokio::test]
    async fn static_catalog() {
        let record = CourseRecord {
            course_code: "CS 351".into(),
            title: "Introduction to Cybersecurity".into(),
            ..Default::default()
        };
        let catalog = StaticCatalog::new(vec![record]);
        assert!(catalog.is_loaded().await);
        assert!(catalog.catalog_text().await.contains("CS 351"));
        assert!(!StaticCatalog::unloaded().is_loaded().await);
    }
}
