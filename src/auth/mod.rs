//! Authentication system
//!
//! Handles credential validation and the per-tier command gate.

pub mod credentials;
pub mod gate;
pub mod validator;

pub use credentials::{CredentialStore, is_anonymous_name};
pub use gate::{AuthDenial, AuthGate, AuthTier};
pub use validator::{validate_password, validate_user};
