pub mod credentials;
pub mod gcal;
pub mod gmail;
pub mod oauth;

pub use credentials::{Credential, CredentialManager};
