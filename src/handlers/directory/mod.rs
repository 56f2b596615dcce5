pub mod companies;
pub mod projects;

pub use companies::{get_all_companies, get_companies, get_user_companies};
pub use projects::{create_project, get_all_projects, get_clients_projects};
