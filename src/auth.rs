//! Credential model, Hasura claims, and the token decoder.

pub mod claims;
pub mod credential;
pub mod decode;
pub mod secret;

pub use claims::*;
pub use credential::*;
pub use decode::*;
pub use secret::*;
