// handlers/auth/mod.rs - Demo account sign-in
//
// The portal signs in with one of two configured identities: the admin
// demo account or the client demo account. Submitted credentials are not
// used.

pub mod login;

pub use login::{login_admin, login_client};
