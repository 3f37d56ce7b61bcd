use iced::widget::{Column, Row, button, horizontal_space, pick_list, text};
use iced::{Alignment, Element};

use crate::app::crud::Phase;
use crate::app::student::{SemesterFilter, StudentDashboard, StudentMessage, StudentTab};
use crate::screens::table::{TableModel, table_view};

pub fn student_screen(dashboard: &StudentDashboard) -> Element<'_, StudentMessage> {
    let tab = dashboard.active_tab;

    let report = if dashboard.generating {
        button("Generating...")
    } else {
        button("Report Card").on_press(StudentMessage::GenerateReport)
    };

    let mut header = Row::new()
        .spacing(10)
        .align_y(Alignment::Center)
        .push(text(tab.to_string()).size(28))
        .push(horizontal_space());
    if tab == StudentTab::Marks {
        header = header.push(pick_list(
            SemesterFilter::ALL,
            Some(dashboard.semester),
            StudentMessage::SemesterSelected,
        ));
    }
    header = header
        .push(button("Refresh").style(button::secondary).on_press(StudentMessage::Refresh))
        .push(report);

    let mut content = Column::new().spacing(15).push(header);

    if let Some(notice) = &dashboard.view.notice {
        content = content.push(text(notice.as_str()));
    }

    if dashboard.view.phase == Phase::Loading {
        return content.push(text("Loading...")).into();
    }

    let model = TableModel::build(tab.kind().descriptor().columns, &dashboard.visible_records(), None, false);
    content.push(table_view(model, None, None)).into()
}
