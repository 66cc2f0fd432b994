//! Compiles the actions of a grounded planning problem into procedures:
//! applicability tests and effects callable on a state and a parameter binding.

pub mod compilation;
pub mod description;
pub mod error;
pub mod model;

pub use compilation::{compile_action, compile_actions, ActionCompiler};
pub use description::ProblemDescription;
pub use error::{CompileError, ErrorKind, Result};
