use iced::widget::{Container, Row};
use iced::{Element, Length};

use crate::screens::{admin_screen, home_screen, login_screen, nav_menu, settings_screen, student_screen, teacher_screen};

use super::{App, Message, Screen};

impl App {
    pub fn view(&self) -> Element<'_, Message> {
        let content: Element<'_, Message> = match &self.screen {
            Screen::Home => return home_screen(self).into(),
            Screen::Login(role) => return login_screen(self, *role).into(),
            _ if self.show_settings => settings_screen(self).into(),
            Screen::Admin(dashboard) => admin_screen(dashboard).map(Message::Admin),
            Screen::Teacher(dashboard) => teacher_screen(dashboard).map(Message::Teacher),
            Screen::Student(dashboard) => student_screen(dashboard).map(Message::Student),
        };

        Row::new()
            .spacing(20)
            .push(
                // Sidebar
                Container::new(nav_menu(self))
                    .width(Length::Fixed(220.0))
                    .height(Length::Fill)
                    .padding(10),
            )
            .push(Container::new(content).width(Length::Fill).height(Length::Fill).padding(20))
            .into()
    }
}
