//! Business logic services.

pub mod materializer;
pub mod resolver;
pub mod storage;
pub mod store;

pub use materializer::{ExecutionMaterializer, MaterializeRequest};
pub use resolver::{ResolvedVersion, VersionResolver};
pub use storage::{AttachmentStorage, StoredFile};
pub use store::{ExecutionStore, SuiteStore};
