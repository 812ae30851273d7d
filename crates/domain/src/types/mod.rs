//! Domain types and models
//!
//! Everything a caller of the request layer sees: the verb set, the uniform
//! response envelope, the normalized failure taxonomy and the credential.

pub mod credential;
pub mod envelope;
pub mod failure;
pub mod method;

pub use credential::Credential;
pub use envelope::ResponseEnvelope;
pub use failure::{ErrorCode, NormalizedError};
pub use method::HttpMethod;
