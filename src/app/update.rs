use iced::Task;
use tracing::{debug, info, warn};

use crate::app::admin::{AdminDashboard, AdminMessage};
use crate::app::student::{StudentDashboard, StudentMessage};
use crate::app::teacher::{TeacherDashboard, TeacherMessage};
use crate::models::Role;
use crate::session::UserProfile;

use super::{App, Message, Screen};

impl App {
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::RoleChosen(role) => {
                self.clear_login_form();
                self.screen = Screen::Login(role);
                Task::none()
            }
            Message::BackToHome => {
                // A login still in flight is abandoned; its reply is ignored.
                self.session.logout();
                self.clear_login_form();
                self.screen = Screen::Home;
                Task::none()
            }
            Message::LoginIdChanged(id) => {
                self.login_id = id;
                Task::none()
            }
            Message::LoginPasswordChanged(password) => {
                self.login_password = password;
                Task::none()
            }
            Message::LoginPressed => {
                let &Screen::Login(role) = &self.screen else {
                    return Task::none();
                };
                if self.session.is_authenticating() {
                    return Task::none();
                }
                self.login_error = None;
                let login_id = self.login_id.trim().to_string();
                let (attempt, request) = self.session.begin_login(role, &login_id, &self.login_password);
                let client = self.client.clone();
                Task::perform(async move { client.send(request).await }, move |response| {
                    Message::LoggedIn { attempt, response }
                })
            }
            Message::LoggedIn { attempt, response } => {
                // Replies from abandoned or superseded attempts come back as None.
                let Some(outcome) = self.session.complete_login(attempt, response) else {
                    return Task::none();
                };
                match outcome {
                    Ok(profile) => {
                        self.clear_login_form();
                        self.mount_dashboard(profile)
                    }
                    Err(message) => {
                        self.login_password.clear();
                        self.login_error = Some(message);
                        Task::none()
                    }
                }
            }
            Message::Logout => {
                self.session.logout();
                self.clear_login_form();
                self.show_settings = false;
                self.screen = Screen::Home;
                Task::none()
            }
            Message::ToggleSettings => {
                self.show_settings = !self.show_settings;
                Task::none()
            }
            Message::ThemeSelected(theme) => {
                self.config.set_theme(&theme);
                self.theme = theme;
                match self.config.save(&self.config_path) {
                    Ok(()) => info!(theme = %self.config.theme_name, "theme saved"),
                    Err(err) => warn!("could not save theme: {err:#}"),
                }
                Task::none()
            }
            Message::Admin(message) => {
                if matches!(message, AdminMessage::TabSelected(_)) {
                    self.show_settings = false;
                }
                match &mut self.screen {
                    Screen::Admin(dashboard) => dashboard.update(message, &self.client).map(Message::Admin),
                    _ => unmounted("admin"),
                }
            }
            Message::Teacher(message) => {
                if matches!(message, TeacherMessage::TabSelected(_)) {
                    self.show_settings = false;
                }
                match &mut self.screen {
                    Screen::Teacher(dashboard) => dashboard.update(message, &self.client).map(Message::Teacher),
                    _ => unmounted("teacher"),
                }
            }
            Message::Student(message) => {
                if matches!(message, StudentMessage::TabSelected(_)) {
                    self.show_settings = false;
                }
                match &mut self.screen {
                    Screen::Student(dashboard) => dashboard.update(message, &self.client).map(Message::Student),
                    _ => unmounted("student"),
                }
            }
        }
    }

    fn mount_dashboard(&mut self, profile: UserProfile) -> Task<Message> {
        self.show_settings = false;
        match profile.role {
            Role::Admin => {
                let (dashboard, task) = AdminDashboard::new(&self.client);
                self.screen = Screen::Admin(dashboard);
                task.map(Message::Admin)
            }
            Role::Teacher => {
                let (dashboard, task) = TeacherDashboard::new(profile, &self.client);
                self.screen = Screen::Teacher(dashboard);
                task.map(Message::Teacher)
            }
            Role::Student => {
                let settings = self.config.report_settings();
                let (dashboard, task) = StudentDashboard::new(profile, settings, &self.client);
                self.screen = Screen::Student(dashboard);
                task.map(Message::Student)
            }
        }
    }
}

fn unmounted(dashboard: &str) -> Task<Message> {
    debug!(dashboard, "dropping message for a dashboard that is no longer shown");
    Task::none()
}
