use iced::widget::{Container, button, column, text, text_input, vertical_space};
use iced::{Center, Length};

use crate::app::{App, Message};
use crate::models::Role;

fn id_placeholder(role: Role) -> &'static str {
    match role {
        Role::Admin => "Admin ID",
        Role::Teacher => "Teacher ID",
        Role::Student => "Student ID",
    }
}

pub fn login_screen(app: &App, role: Role) -> Container<Message> {
    let busy = app.session.is_authenticating();

    let login = if busy {
        button("Logging in...").padding(10)
    } else {
        button("Login").on_press(Message::LoginPressed).padding(10)
    };

    let error = app.login_error.as_deref().unwrap_or_default();

    let content = column![
        vertical_space(),
        text(format!("{role} Login")).size(30),
        text_input(id_placeholder(role), &app.login_id)
            .on_input(Message::LoginIdChanged)
            .padding(10)
            .size(18)
            .width(Length::Fixed(350.0)),
        text_input("Password", &app.login_password)
            .secure(true)
            .on_input(Message::LoginPasswordChanged)
            .on_submit(Message::LoginPressed)
            .padding(10)
            .size(18)
            .width(Length::Fixed(350.0)),
        login,
        text(error).size(18).style(text::danger),
        vertical_space(),
        button("Back").style(button::secondary).on_press(Message::BackToHome).padding(10),
    ]
    .spacing(15)
    .width(Length::Fill)
    .align_x(Center);

    Container::new(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(40)
}
