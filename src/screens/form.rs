use iced::widget::container::bordered_box;
use iced::widget::{Column, Container, Row, button, horizontal_space, pick_list, text, text_input};
use iced::{Alignment, Element, Length};
use iced_aw::date_picker;

use crate::app::form::{FormMessage, FormState};
use crate::lookups::Collections;
use crate::models::FieldKind;

pub fn form_view<'a>(form: &'a FormState, collections: &'a Collections) -> Element<'a, FormMessage> {
    let descriptor = form.kind.descriptor();
    let title = if form.is_edit() {
        format!("Edit {}", descriptor.label)
    } else {
        format!("New {}", descriptor.label)
    };

    let mut content = Column::new().spacing(10).push(text(title).size(24));

    for field in form.visible_fields() {
        let name = field.name;
        let value = form.value(name);

        let control: Element<'a, FormMessage> = if form.is_edit() && name == descriptor.key_field {
            text(value.to_string()).into()
        } else {
            match field.kind {
                FieldKind::Reference(kind) => {
                    let options = collections.options(kind);
                    let selected = options.iter().find(|o| o.key == value).cloned();
                    pick_list(options, selected, move |o| FormMessage::FieldChanged(name, o.key))
                        .placeholder(format!("Select {}", kind.descriptor().label))
                        .width(Length::Fill)
                        .into()
                }
                FieldKind::Choice(choices) => {
                    let selected = choices.iter().copied().find(|c| *c == value);
                    pick_list(choices, selected, move |c: &'static str| {
                        FormMessage::FieldChanged(name, c.to_string())
                    })
                    .placeholder(field.label)
                    .width(Length::Fill)
                    .into()
                }
                FieldKind::Date => {
                    let input = text_input("YYYY-MM-DD", value)
                        .on_input(move |v| FormMessage::FieldChanged(name, v))
                        .width(Length::Fill);
                    let picker = date_picker(
                        form.date_picker == Some(name),
                        form.picker_date(name),
                        button("Pick").on_press(FormMessage::OpenDatePicker(name)),
                        FormMessage::CancelDatePicker,
                        FormMessage::DatePicked,
                    );
                    Row::new()
                        .spacing(10)
                        .align_y(Alignment::Center)
                        .push(input)
                        .push(picker)
                        .into()
                }
                FieldKind::Password => {
                    let placeholder = if form.is_edit() {
                        "Leave blank to keep current password"
                    } else {
                        "Password"
                    };
                    text_input(placeholder, value)
                        .secure(true)
                        .on_input(move |v| FormMessage::FieldChanged(name, v))
                        .into()
                }
                FieldKind::Number | FieldKind::Text => text_input(field.label, value)
                    .on_input(move |v| FormMessage::FieldChanged(name, v))
                    .into(),
            }
        };

        content = content.push(
            Row::new()
                .spacing(10)
                .align_y(Alignment::Center)
                .push(text(field.label).width(Length::Fixed(120.0)))
                .push(control),
        );
    }

    if let Some(error) = &form.error {
        content = content.push(text(error.as_str()).style(text::danger));
    }

    let save = if form.submitting {
        button("Saving...")
    } else {
        button("Save").on_press(FormMessage::Submit)
    };

    content = content.push(
        Row::new()
            .spacing(10)
            .push(horizontal_space())
            .push(button("Cancel").style(button::secondary).on_press(FormMessage::Cancel))
            .push(save),
    );

    Container::new(content)
        .style(bordered_box)
        .padding(20)
        .width(Length::Fill)
        .into()
}
