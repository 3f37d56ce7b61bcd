use iced::widget::{Column, Row, button, horizontal_space, text};
use iced::{Alignment, Element};

use crate::app::admin::{AdminDashboard, AdminMessage};
use crate::app::crud::{CrudMessage, Phase};
use crate::app::form::FormMessage;
use crate::screens::form::form_view;
use crate::screens::table::{TableModel, table_view};

pub fn admin_screen(dashboard: &AdminDashboard) -> Element<'_, AdminMessage> {
    let descriptor = dashboard.active_tab.descriptor();

    let header = Row::new()
        .spacing(10)
        .align_y(Alignment::Center)
        .push(text(dashboard.active_tab.title()).size(28))
        .push(horizontal_space())
        .push(button("Refresh").style(button::secondary).on_press(AdminMessage::Refresh))
        .push(button(text(format!("Add {}", descriptor.label))).on_press(AdminMessage::NewRecord));

    let view = &dashboard.view;
    let mut content = Column::new().spacing(15).push(header);

    if let Some(notice) = &view.notice {
        content = content.push(text(notice.as_str()).style(text::danger));
    }

    if let Some(form) = &view.form {
        content = content.push(form_view(form, &view.collections).map(form_message));
    }

    if view.phase == Phase::Loading {
        return content.push(text("Loading...")).into();
    }

    let model = TableModel::build(descriptor.columns, dashboard.records(), Some(descriptor.key_field), true);
    content
        .push(table_view(model, Some(AdminMessage::Edit), Some(delete_requested)))
        .into()
}

fn form_message(message: FormMessage) -> AdminMessage {
    AdminMessage::Crud(CrudMessage::Form(message))
}

fn delete_requested(key: String) -> AdminMessage {
    AdminMessage::Crud(CrudMessage::DeleteRequested(key))
}
