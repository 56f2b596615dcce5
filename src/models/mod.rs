//! Row shapes written to the remote tables.
//!
//! Reads stay as raw [`Row`](crate::store::Row)s: the routes return them
//! verbatim, so only the inserts and patches are typed.

pub mod comment;
pub mod project;
pub mod user;

pub use comment::NewComment;
pub use project::NewProject;
pub use user::{NewUser, Role, UserPatch};

/// Remote table names
pub mod tables {
    pub const USERS: &str = "users";
    pub const COMPANIES: &str = "companies";
    pub const PROJECTS: &str = "projects";
    pub const COMMENTS: &str = "comments";
}
