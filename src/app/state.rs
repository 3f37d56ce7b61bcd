use std::path::PathBuf;

use iced::{Task, Theme};

use crate::api::ApiClient;
use crate::app::admin::AdminDashboard;
use crate::app::student::StudentDashboard;
use crate::app::teacher::TeacherDashboard;
use crate::config::{AppConfig, CONFIG_FILE};
use crate::models::Role;
use crate::session::Session;

use super::Message;

/// What fills the window. Dashboards own their data, so leaving one drops
/// everything it loaded.
#[derive(Debug)]
pub enum Screen {
    Home,
    Login(Role),
    Admin(AdminDashboard),
    Teacher(TeacherDashboard),
    Student(StudentDashboard),
}

pub struct App {
    pub config: AppConfig,
    pub config_path: PathBuf,
    pub theme: Theme,
    pub client: ApiClient,
    pub session: Session,
    pub screen: Screen,
    //
    pub login_id: String,
    pub login_password: String,
    pub login_error: Option<String>,
    //
    pub show_settings: bool,
}

impl App {
    pub fn new(config: AppConfig, endpoint: String) -> (Self, Task<Message>) {
        let app = Self {
            theme: config.theme(),
            config,
            config_path: PathBuf::from(CONFIG_FILE),
            client: ApiClient::new(endpoint),
            session: Session::default(),
            screen: Screen::Home,
            login_id: String::new(),
            login_password: String::new(),
            login_error: None,
            show_settings: false,
        };
        (app, Task::none())
    }

    pub fn title(&self) -> String {
        match self.session.user() {
            Some(user) => format!("{} - {} ({})", self.config.school_name, user.name, user.role),
            None => self.config.school_name.clone(),
        }
    }

    pub(crate) fn clear_login_form(&mut self) {
        self.login_id.clear();
        self.login_password.clear();
        self.login_error = None;
    }
}
