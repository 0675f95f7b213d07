pub mod context;
pub mod error;
pub mod translate;

pub use error::{CompileError, ErrorClass};
pub use translate::translate;
