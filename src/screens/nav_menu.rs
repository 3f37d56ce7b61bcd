use iced::widget::{Column, Container, Row, button, text, vertical_space};
use iced::{Alignment, Element, Length, Renderer, Theme};
use iced_font_awesome::fa_icon_solid;

use crate::app::admin::AdminMessage;
use crate::app::student::{StudentMessage, StudentTab};
use crate::app::teacher::{TeacherMessage, TeacherTab};
use crate::app::{App, Message, Screen};
use crate::models::RecordKind;

fn icon_button_content<'a>(
    icon_element: impl Into<Element<'a, Message, Theme, Renderer>>,
    label: String,
) -> Row<'a, Message> {
    Row::new()
        .align_y(Alignment::Center)
        .spacing(5)
        .push(icon_element)
        .push(text(label))
}

fn nav_button<'a>(app: &'a App, icon: &'a str, label: String, active: bool, message: Message) -> Element<'a, Message> {
    let style = if active { button::primary } else { button::secondary };
    button(icon_button_content(
        fa_icon_solid(icon).style(move |_| text::base(&app.theme)),
        label,
    ))
    .style(style)
    .on_press(message)
    .width(Length::Fill)
    .into()
}

pub fn nav_menu(app: &App) -> Container<Message> {
    let mut content = Column::new().spacing(10);

    if let Some(user) = app.session.user() {
        content = content
            .push(text(user.name.clone()).size(20))
            .push(text(format!("{} · {}", user.role, user.id)).size(14))
            .push(vertical_space().height(Length::Fixed(10.0)));
    }

    let on_tab = !app.show_settings;
    match &app.screen {
        Screen::Admin(dashboard) => {
            for kind in RecordKind::ALL {
                content = content.push(nav_button(
                    app,
                    kind.icon(),
                    kind.title().to_string(),
                    on_tab && dashboard.active_tab == kind,
                    Message::Admin(AdminMessage::TabSelected(kind)),
                ));
            }
        }
        Screen::Teacher(dashboard) => {
            for tab in TeacherTab::ALL {
                content = content.push(nav_button(
                    app,
                    tab.icon(),
                    tab.to_string(),
                    on_tab && dashboard.active_tab == tab,
                    Message::Teacher(TeacherMessage::TabSelected(tab)),
                ));
            }
        }
        Screen::Student(dashboard) => {
            for tab in StudentTab::ALL {
                content = content.push(nav_button(
                    app,
                    tab.kind().icon(),
                    tab.to_string(),
                    on_tab && dashboard.active_tab == tab,
                    Message::Student(StudentMessage::TabSelected(tab)),
                ));
            }
        }
        Screen::Home | Screen::Login(_) => {}
    }

    content = content
        .push(vertical_space())
        .push(nav_button(
            app,
            "gear",
            "Settings".to_string(),
            app.show_settings,
            Message::ToggleSettings,
        ))
        .push(nav_button(
            app,
            "arrow-right-from-bracket",
            "Logout".to_string(),
            false,
            Message::Logout,
        ));

    Container::new(content).width(Length::Fill).height(Length::Fill)
}
