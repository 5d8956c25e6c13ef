//! Database rows and their conversion into domain records.

mod note;
mod user;

pub use note::NoteRow;
pub use user::User;
