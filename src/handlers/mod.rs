// handlers/mod.rs - route handlers grouped by resource
//
// auth        demo account sign-in
// users       profile lookup, management and company-scoped creation
// directory   company and project listings
// membership  user to project assignment
// comments    project comments

pub mod auth;
pub mod comments;
pub mod directory;
pub mod membership;
pub mod users;
pub mod utils;
