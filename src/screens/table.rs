use iced::widget::container::bordered_box;
use iced::widget::{Column, Container, Row, Scrollable, button, text};
use iced::{Alignment, Element, Length};

use crate::models::Record;

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub key: Option<String>,
    pub record: Record,
    pub cells: Vec<String>,
}

/// Rows and headers ready to lay out, independent of any widget.
#[derive(Debug, Clone, PartialEq)]
pub struct TableModel {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
    pub has_actions: bool,
}

impl TableModel {
    pub fn build(
        columns: &[&str],
        records: &[Record],
        key_field: Option<&str>,
        has_actions: bool,
    ) -> Self {
        let mut headers: Vec<String> = columns.iter().map(|c| humanize(c)).collect();
        if has_actions {
            headers.push("Actions".to_string());
        }

        let rows = records
            .iter()
            .map(|record| TableRow {
                key: key_field.map(|k| record.text(k)),
                record: record.clone(),
                cells: columns.iter().map(|c| record.text(c)).collect(),
            })
            .collect();

        Self {
            headers,
            rows,
            has_actions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

/// `student_id` -> `Student Id`.
pub fn humanize(identifier: &str) -> String {
    identifier
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn table_view<'a, M: Clone + 'a>(
    model: TableModel,
    on_edit: Option<fn(Record) -> M>,
    on_delete: Option<fn(String) -> M>,
) -> Element<'a, M> {
    let header = model.headers.iter().fold(Row::new().spacing(10), |row, h| {
        row.push(text(h.clone()).size(16).width(Length::FillPortion(1)))
    });

    let mut body = Column::new().spacing(6);

    if model.is_empty() {
        body = body.push(
            Container::new(text("No data"))
                .width(Length::Fill)
                .center_x(Length::Fill)
                .padding(10),
        );
    }

    for table_row in model.rows {
        let mut row = table_row
            .cells
            .into_iter()
            .fold(Row::new().spacing(10).align_y(Alignment::Center), |row, cell| {
                row.push(text(cell).width(Length::FillPortion(1)))
            });

        if model.has_actions {
            let mut actions = Row::new().spacing(5).width(Length::FillPortion(1));
            if let Some(on_edit) = on_edit {
                actions = actions.push(button("Edit").on_press(on_edit(table_row.record.clone())));
            }
            if let (Some(on_delete), Some(key)) = (on_delete, table_row.key.clone()) {
                actions = actions.push(button("Delete").style(button::danger).on_press(on_delete(key)));
            }
            row = row.push(actions);
        }

        body = body.push(Container::new(row).padding(5).style(bordered_box));
    }

    Column::new()
        .spacing(10)
        .push(Container::new(header).padding(5))
        .push(Scrollable::new(body).height(Length::Fill))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::record;
    use serde_json::json;

    #[test]
    fn cells_follow_column_order_and_blank_missing_fields() {
        let records = vec![
            record(json!({ "teacher_id": "T1", "name": "Kofi", "email": "kofi@school.test" })),
            record(json!({ "teacher_id": 2, "name": "Abena" })),
        ];
        let columns = ["teacher_id", "name", "email"];
        let model = TableModel::build(&columns, &records, Some("teacher_id"), false);

        assert_eq!(model.headers, ["Teacher Id", "Name", "Email"]);
        assert_eq!(model.rows.len(), records.len());
        for (i, row) in model.rows.iter().enumerate() {
            for (j, column) in columns.iter().enumerate() {
                assert_eq!(row.cells[j], records[i].text(column));
            }
        }
        assert_eq!(model.rows[1].cells[2], "");
        assert_eq!(model.rows[1].key.as_deref(), Some("2"));
    }

    #[test]
    fn actions_column_is_added_only_when_requested() {
        let records = vec![record(json!({ "course_id": "CR1", "course_name": "Science" }))];
        let with = TableModel::build(&["course_id", "course_name"], &records, Some("course_id"), true);
        assert_eq!(with.headers.last().map(String::as_str), Some("Actions"));
        assert_eq!(with.column_count(), 3);

        let without = TableModel::build(&["course_id", "course_name"], &records, None, false);
        assert_eq!(without.column_count(), 2);
        assert_eq!(without.rows[0].key, None);
    }

    #[test]
    fn empty_input_yields_placeholder_model() {
        let model = TableModel::build(&["mark_id", "score"], &[], Some("mark_id"), true);
        assert!(model.is_empty());
        assert_eq!(model.column_count(), 3);
    }

    #[test]
    fn humanize_handles_plain_and_snake_case() {
        assert_eq!(humanize("student_id"), "Student Id");
        assert_eq!(humanize("score"), "Score");
        assert_eq!(humanize("due__date"), "Due Date");
    }
}
