//! # rowscan-client
//!
//! The external collaborator boundary: password-grant authentication against
//! the backend's auth endpoint and a scoped PostgREST query client bound to
//! one authenticated session. Everything the backend returns is decoded into
//! typed values here; nothing downstream touches raw responses.
//!
//! This crate only invokes the backend's black-box API; it implements no
//! authentication, query execution, or policy enforcement of its own.

pub mod auth;
pub mod error;
pub mod postgrest;
pub mod record;

pub use auth::AuthClient;
pub use error::{AuthError, ClientError};
pub use postgrest::{QueryApi, ScopedClient};
pub use record::{ApiRejection, QueryReply, Record};
