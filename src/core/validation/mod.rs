//! Validation and sanitization engine
//!
//! Every operation declares a [`Schema`]: an ordered set of [`FieldRules`]
//! built from the reusable [`filters`] and [`validators`], plus optional
//! store-backed [`Lookup`]s. Handlers extract a [`RequestInput`], run the
//! schema against it, and only then touch a store.

pub mod extractor;
pub mod filters;
pub mod lookup;
pub mod schema;
pub mod validators;

pub use extractor::RequestInput;
pub use lookup::{Lookup, MustBeUnique, MustExist};
pub use schema::{FieldRules, Schema};
