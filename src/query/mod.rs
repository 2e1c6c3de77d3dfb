pub mod model;
pub mod request;

pub use model::{ConstraintKind, LabelRef, Query, QueryWord, WordConstraint, WordFilter};
pub use request::{QueryRequest, RawWord};
