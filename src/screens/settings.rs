use iced::widget::{Container, column, pick_list, text};
use iced::{Center, Length, Theme};

use crate::app::{App, Message};

pub fn settings_screen(app: &App) -> Container<Message> {
    let endpoint = app.client.endpoint().to_string();
    let reports = app.config.reports_dir.display().to_string();

    let content = column![
        text("Settings").size(30),
        text("Theme").size(18),
        pick_list(Theme::ALL, Some(&app.theme), Message::ThemeSelected).placeholder("Choose a theme"),
        text(format!("Backend: {endpoint}")).size(14),
        text(format!("Reports folder: {reports}")).size(14),
    ]
    .spacing(15)
    .align_x(Center);

    Container::new(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(40)
}
