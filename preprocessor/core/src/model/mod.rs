pub mod action;
pub mod builtin;
pub mod domain;
pub mod expression;
pub mod index;
pub mod instance;
pub mod procedure;
pub mod state;
pub mod variable;

/// Global index of an object, or value of an int typed term.
pub type ObjectIdx = i64;
