pub mod admin;
pub mod form;
pub mod home;
pub mod login;
pub mod nav_menu;
pub mod settings;
pub mod student;
pub mod table;
pub mod teacher;

pub use admin::admin_screen;
pub use home::home_screen;
pub use login::login_screen;
pub use nav_menu::nav_menu;
pub use settings::settings_screen;
pub use student::student_screen;
pub use teacher::teacher_screen;
