//! Runtime object model shared by the evaluator.
//!
//! Values live behind [`object::ObjectHolder`] handles; user classes and
//! instances are defined in [`class`]; comparison dispatch in [`compare`];
//! the host output seam in [`context`].
pub mod class;
pub mod compare;
pub mod context;
pub mod error;
pub mod object;

pub use context::{Context, SimpleContext};
pub use error::{RuntimeError, RuntimeResult};
pub use object::{Closure, Object, ObjectHolder};
