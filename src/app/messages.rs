use iced::Theme;

use crate::api::ApiResponse;
use crate::app::admin::AdminMessage;
use crate::app::student::StudentMessage;
use crate::app::teacher::TeacherMessage;
use crate::models::Role;

#[derive(Debug, Clone)]
pub enum Message {
    RoleChosen(Role),
    BackToHome,
    //
    LoginIdChanged(String),
    LoginPasswordChanged(String),
    LoginPressed,
    LoggedIn {
        attempt: u64,
        response: ApiResponse,
    },
    Logout,
    //
    ToggleSettings,
    ThemeSelected(Theme),
    //
    Admin(AdminMessage),
    Teacher(TeacherMessage),
    Student(StudentMessage),
}
