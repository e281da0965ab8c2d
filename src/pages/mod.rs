mod admin;
mod note;

pub use admin::{AdminLoginPage, AdminPanelPage};
pub use note::{NotePage, RootPage};
