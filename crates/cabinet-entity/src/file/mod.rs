//! File record entities.

pub mod kind;
pub mod model;
pub mod parent;

pub use kind::FileKind;
pub use model::{FileRecord, NewFileRecord};
pub use parent::ParentRef;
