pub mod company;
pub mod lookup;
pub mod manage;

pub use company::{add_user_to_company, create_user, get_users_by_company};
pub use lookup::{get_staff, get_user, get_user_name_by_id, is_admin};
pub use manage::{add_user, delete_user, update_user};
