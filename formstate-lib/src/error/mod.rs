//! Error types

mod form;
mod validator;

pub use form::*;
pub use validator::*;
