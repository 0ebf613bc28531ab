pub mod audit;
pub mod forms;
pub mod guard;
pub mod hierarchy;
pub mod validation;

pub use audit::Audit;
pub use forms::{NodeChanges, NodeDraft, ProductChanges, ProductDraft, WriteMode};
pub use hierarchy::{HierarchyError, SupplierLinks, SupplierLookup};
pub use validation::FieldErrors;
