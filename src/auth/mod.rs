//! # Authorization Contract
//!
//! The engine never authenticates tokens itself. Front ends resolve a token
//! into a [`Subject`] and the engine asks an injected [`Authorizer`] before
//! touching the row store. A rejection aborts the operation with no partial
//! effect.

mod authorizer;
mod errors;

pub use authorizer::{AllowAll, Authorizer, Scope, Subject};
pub use errors::{AuthError, AuthResult};
