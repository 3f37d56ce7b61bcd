pub mod admin;
pub mod crud;
pub mod form;
pub mod messages;
pub mod state;
pub mod student;
pub mod teacher;
pub mod update;
pub mod view;

pub use messages::Message;
pub use state::{App, Screen};
