//! Course catalog snapshots offered to the advisor.
//!
//! The advisor never queries courses directly; it hands the rendered
//! snapshot text to the model and refuses turns while no snapshot is loaded.

mod file;
pub mod model;

pub use file::{JsonFileCatalog, StaticCatalog};
pub use model::CourseRecord;

use async_trait::async_trait;

/// Source of the current course snapshot.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Rendered snapshot for prompts. Empty when nothing is loaded.
    async fn catalog_text(&self) -> String;

    async fn is_loaded(&self) -> bool;

    async fn courses(&self) -> Vec<CourseRecord>;
}
