use iced::widget::container::bordered_box;
use iced::widget::{Column, Container, Row, Scrollable, button, horizontal_space, pick_list, text, text_input};
use iced::{Alignment, Element, Length};

use crate::app::crud::{CrudMessage, Phase};
use crate::app::form::FormMessage;
use crate::app::teacher::{MarkSheet, SheetMessage, TeacherDashboard, TeacherMessage};
use crate::lookups::Collections;
use crate::models::{Record, RecordKind, SEMESTERS};
use crate::screens::form::form_view;
use crate::screens::table::{TableModel, table_view};

pub fn teacher_screen(dashboard: &TeacherDashboard) -> Element<'_, TeacherMessage> {
    let tab = dashboard.active_tab;

    let mut header = Row::new()
        .spacing(10)
        .align_y(Alignment::Center)
        .push(text(tab.to_string()).size(28))
        .push(horizontal_space())
        .push(button("Refresh").style(button::secondary).on_press(TeacherMessage::Refresh));
    if tab.editable() {
        header = header.push(button("Add").on_press(TeacherMessage::NewRecord));
    }

    let view = &dashboard.view;
    let mut content = Column::new().spacing(15).push(header);

    if let Some(notice) = &view.notice {
        content = content.push(text(notice.as_str()));
    }

    if let Some(form) = &view.form {
        content = content.push(form_view(form, &view.collections).map(form_message));
    }

    if view.phase == Phase::Loading {
        return content.push(text("Loading...")).into();
    }

    let body = match tab.kind() {
        Some(kind) => records_table(view.collections.get(kind), kind, tab.editable()),
        None => mark_sheet(&dashboard.sheet, &view.collections).map(TeacherMessage::Sheet),
    };
    content.push(body).into()
}

fn records_table(records: &[Record], kind: RecordKind, editable: bool) -> Element<'_, TeacherMessage> {
    let descriptor = kind.descriptor();
    let model = TableModel::build(descriptor.columns, records, Some(descriptor.key_field), editable);
    if editable {
        table_view(model, Some(TeacherMessage::Edit), Some(delete_requested))
    } else {
        table_view(model, None, None)
    }
}

fn form_message(message: FormMessage) -> TeacherMessage {
    TeacherMessage::Crud(CrudMessage::Form(message))
}

fn delete_requested(key: String) -> TeacherMessage {
    TeacherMessage::Crud(CrudMessage::DeleteRequested(key))
}

fn mark_sheet<'a>(sheet: &'a MarkSheet, collections: &'a Collections) -> Element<'a, SheetMessage> {
    let selectors = Row::new()
        .spacing(10)
        .align_y(Alignment::Center)
        .push(
            pick_list(
                collections.options(RecordKind::Subject),
                sheet.subject.clone(),
                SheetMessage::SubjectSelected,
            )
            .placeholder("Subject"),
        )
        .push(
            pick_list(
                sheet.class_options(collections),
                sheet.class.clone(),
                SheetMessage::ClassSelected,
            )
            .placeholder("Class"),
        )
        .push(
            text_input("Term", &sheet.term)
                .on_input(SheetMessage::TermChanged)
                .width(Length::Fixed(120.0)),
        )
        .push(pick_list(SEMESTERS, Some(sheet.semester), SheetMessage::SemesterSelected).placeholder("Semester"));

    let students = sheet.students(collections);
    let mut rows = Column::new().spacing(6);
    if sheet.class.is_none() {
        rows = rows.push(text("Choose a subject and class to enter scores"));
    } else if students.is_empty() {
        rows = rows.push(text("No students in this class"));
    }
    for student in students {
        let id = student.key(RecordKind::Student);
        let row = Row::new()
            .spacing(10)
            .align_y(Alignment::Center)
            .push(text(student.text("name")).width(Length::FillPortion(2)))
            .push(text(id.clone()).width(Length::FillPortion(1)))
            .push(
                text_input("Score", sheet.score(&id))
                    .on_input(move |score| SheetMessage::ScoreChanged(id.clone(), score))
                    .width(Length::FillPortion(1)),
            );
        rows = rows.push(Container::new(row).padding(5).style(bordered_box));
    }

    let submit = if sheet.submitting {
        button("Saving...")
    } else {
        button("Save Marks").on_press(SheetMessage::Submit)
    };

    Column::new()
        .spacing(15)
        .push(selectors)
        .push(Scrollable::new(rows).height(Length::Fill))
        .push(Row::new().push(horizontal_space()).push(submit))
        .into()
}
