use iced::widget::container::bordered_box;
use iced::widget::{Column, Container, Row, button, column, text, vertical_space};
use iced::{Alignment, Center, Length};
use iced_font_awesome::fa_icon_solid;

use crate::app::{App, Message};
use crate::models::Role;

fn role_icon(role: Role) -> &'static str {
    match role {
        Role::Admin => "user-shield",
        Role::Teacher => "person-chalkboard",
        Role::Student => "user-graduate",
    }
}

fn role_blurb(role: Role) -> &'static str {
    match role {
        Role::Admin => "Manage students, staff, classes and fees",
        Role::Teacher => "Record marks and attendance for your classes",
        Role::Student => "View your marks, attendance, fees and report card",
    }
}

pub fn home_screen(app: &App) -> Container<Message> {
    let cards = Role::ALL.iter().fold(Row::new().spacing(30), |row, &role| {
        let card = Column::new()
            .spacing(12)
            .align_x(Alignment::Center)
            .push(fa_icon_solid(role_icon(role)).size(48.0).style(move |_| text::base(&app.theme)))
            .push(text(role.to_string()).size(24))
            .push(text(role_blurb(role)).size(14).align_x(Center))
            .push(
                button(text(format!("Login as {role}")))
                    .on_press(Message::RoleChosen(role))
                    .padding(10),
            );
        row.push(
            Container::new(card)
                .style(bordered_box)
                .padding(25)
                .width(Length::Fixed(260.0)),
        )
    });

    let content = column![
        vertical_space(),
        text(app.config.school_name.as_str()).size(34),
        text("Choose how you want to sign in").size(18),
        cards,
        vertical_space(),
    ]
    .spacing(25)
    .align_x(Center);

    Container::new(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .padding(40)
}
