//! Storage layer for Labelforge
//!
//! The relational store (users, projects, categories, annotations) lives
//! outside the asset pipeline. This crate pins down the narrow contract the
//! pipeline needs from it:
//!
//! - reading a flattened [`ExportSnapshot`](labelforge_core::ExportSnapshot) per project
//! - persisting uploaded image records keyed by project id
//! - category-name uniqueness per project
//! - cascading deletes of annotations when an image or category goes away
//!
//! [`InMemoryProjectRepository`] implements the contract for tests, local
//! development and the bundled server.
//!
//! # Example
//!
//! ```rust,no_run
//! use labelforge_db::{InMemoryProjectRepository, ProjectRepository};
//! use labelforge_core::ProjectRecord;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = InMemoryProjectRepository::new();
//! let project = repo.create_project(ProjectRecord::new("demo")?).await?;
//! let snapshot = repo.export_snapshot(&project.id).await?;
//! # Ok(())
//! # }
//! ```

// Re-export core domain types for convenience
pub use labelforge_core;

pub mod error;
pub mod memory;
pub mod repository;

pub use error::{DbError, DbResult};
pub use memory::InMemoryProjectRepository;
pub use repository::ProjectRepository;

/// Storage layer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
