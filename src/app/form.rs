use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use iced_aw::date_picker::Date;
use serde_json::{Map, Value, json};

use crate::api::{ApiRequest, ApiResponse};
use crate::models::{FieldKind, FieldSpec, Record, RecordKind};

#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Create,
    Edit { key: String },
}

#[derive(Debug, Clone)]
pub enum FormMessage {
    FieldChanged(&'static str, String),
    OpenDatePicker(&'static str),
    DatePicked(Date),
    CancelDatePicker,
    Submit,
    Cancel,
}

/// Editable copy of one record. Values are kept as typed text and only
/// turned into JSON when the form is submitted.
#[derive(Debug, Clone)]
pub struct FormState {
    pub kind: RecordKind,
    pub mode: FormMode,
    pub values: BTreeMap<&'static str, String>,
    pub error: Option<String>,
    pub submitting: bool,
    pub date_picker: Option<&'static str>,
}

impl FormState {
    pub fn create(kind: RecordKind) -> Self {
        Self {
            kind,
            mode: FormMode::Create,
            values: BTreeMap::new(),
            error: None,
            submitting: false,
            date_picker: None,
        }
    }

    /// Prefills from `record`; passwords are write-only and start blank.
    pub fn edit(kind: RecordKind, record: &Record) -> Self {
        let values = kind
            .descriptor()
            .fields
            .iter()
            .filter(|f| f.kind != FieldKind::Password)
            .map(|f| (f.name, record.text(f.name)))
            .collect();
        Self {
            kind,
            mode: FormMode::Edit {
                key: record.key(kind),
            },
            values,
            error: None,
            submitting: false,
            date_picker: None,
        }
    }

    /// Presets a value, e.g. the signed-in teacher's own id.
    pub fn with_value(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(field, value.into());
        self
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or_default()
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit { .. })
    }

    /// Fields the form shows, in descriptor order.
    pub fn visible_fields(&self) -> impl Iterator<Item = &'static FieldSpec> + '_ {
        let descriptor = self.kind.descriptor();
        descriptor.fields.iter().filter(move |f| {
            f.name != descriptor.key_field || descriptor.user_assigned_key || self.is_edit()
        })
    }

    pub fn update(&mut self, message: FormMessage) {
        match message {
            FormMessage::FieldChanged(field, value) => {
                self.values.insert(field, value);
            }
            FormMessage::OpenDatePicker(field) => self.date_picker = Some(field),
            FormMessage::DatePicked(date) => {
                if let Some(field) = self.date_picker.take() {
                    self.values.insert(
                        field,
                        format!("{:04}-{:02}-{:02}", date.year, date.month, date.day),
                    );
                }
            }
            FormMessage::CancelDatePicker => self.date_picker = None,
            // Submit and Cancel are the dashboard's business.
            FormMessage::Submit | FormMessage::Cancel => {}
        }
    }

    /// Current value of a date field as a picker date, today if unparsable.
    pub fn picker_date(&self, field: &str) -> Date {
        match NaiveDate::parse_from_str(self.value(field), "%Y-%m-%d") {
            Ok(date) => Date::from_ymd(date.year(), date.month(), date.day()),
            Err(_) => Date::today(),
        }
    }

    pub fn payload(&self) -> Value {
        let descriptor = self.kind.descriptor();
        let mut payload = Map::new();

        for field in descriptor.fields {
            let raw = self.value(field.name).trim();
            if field.name == descriptor.key_field {
                match &self.mode {
                    FormMode::Edit { key } => {
                        payload.insert(field.name.to_string(), json!(key));
                    }
                    FormMode::Create if descriptor.user_assigned_key => {
                        payload.insert(field.name.to_string(), json!(raw));
                    }
                    FormMode::Create => {}
                }
                continue;
            }
            if field.kind == FieldKind::Password && raw.is_empty() && self.is_edit() {
                continue;
            }
            let value = match field.kind {
                FieldKind::Number => number_or_text(raw),
                _ => json!(raw),
            };
            payload.insert(field.name.to_string(), value);
        }

        // Presets outside the descriptor (e.g. teacher_id on marks) ride along.
        for (field, value) in &self.values {
            if descriptor.field(field).is_none() {
                payload.insert(field.to_string(), json!(value));
            }
        }
        Value::Object(payload)
    }

    pub fn request(&self) -> ApiRequest {
        let descriptor = self.kind.descriptor();
        let action = match self.mode {
            FormMode::Create => descriptor.add_action,
            FormMode::Edit { .. } => descriptor.update_action,
        };
        ApiRequest::new(action, self.payload())
    }

    /// Marks the form busy and hands back the request to send, unless a
    /// submission is already in flight.
    pub fn submit(&mut self) -> Option<ApiRequest> {
        if self.submitting {
            return None;
        }
        self.submitting = true;
        self.error = None;
        Some(self.request())
    }

    /// Records a failed submission; entered values stay untouched.
    pub fn fail(&mut self, response: &ApiResponse) {
        self.submitting = false;
        self.error = Some(response.error_message());
    }
}

/// Numbers go over the wire as JSON numbers when they parse; anything else
/// is sent as typed and left to the store to judge.
pub fn number_or_text(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        return json!(i);
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() => json!(f),
        _ => json!(raw),
    }
}
