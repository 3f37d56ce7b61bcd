//! In-memory stand-in for the remote store, answering the same action
//! vocabulary so dashboard state machines can be driven without a network.

use std::collections::{HashMap, HashSet};

use serde_json::{Value, json};

use crate::api::{ApiRequest, ApiResponse};
use crate::models::{Record, RecordKind, value_text};

pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => Record(map),
        other => panic!("not an object: {other}"),
    }
}

#[derive(Debug, Default)]
pub struct FakeStore {
    tables: HashMap<RecordKind, Vec<Record>>,
    next_id: u32,
    pub calls: Vec<ApiRequest>,
}

impl FakeStore {
    pub fn seeded() -> Self {
        let mut store = FakeStore::default();
        store.tables.insert(
            RecordKind::Student,
            vec![
                record(json!({ "student_id": "S001", "name": "Ama Mensah", "password": "pw1", "course_id": "CR1", "class_id": "C1" })),
                record(json!({ "student_id": "S002", "name": "Yaw Owusu", "password": "pw2", "course_id": "CR1", "class_id": "C1" })),
                record(json!({ "student_id": "S003", "name": "Esi Asante", "password": "pw3", "course_id": "CR1", "class_id": "C2" })),
            ],
        );
        store.tables.insert(
            RecordKind::Teacher,
            vec![
                record(json!({ "teacher_id": "T1", "name": "Kofi Boateng", "password": "tpw1", "email": "kofi@school.test" })),
                record(json!({ "teacher_id": "T2", "name": "Abena Darko", "password": "tpw2", "email": "abena@school.test" })),
            ],
        );
        store.tables.insert(
            RecordKind::Course,
            vec![record(json!({ "course_id": "CR1", "course_name": "General Science" }))],
        );
        store.tables.insert(
            RecordKind::Class,
            vec![
                record(json!({ "class_id": "C1", "class_name": "Form 1A", "course_id": "CR1", "teacher_id": "T1" })),
                record(json!({ "class_id": "C2", "class_name": "Form 1B", "course_id": "CR1", "teacher_id": "T2" })),
            ],
        );
        store.tables.insert(
            RecordKind::Subject,
            vec![
                record(json!({ "subject_id": "MATH", "subject_name": "Mathematics", "teacher_id": "T1", "class_id": "C1" })),
                record(json!({ "subject_id": "ENG", "subject_name": "English", "teacher_id": "T2", "class_id": "C2" })),
            ],
        );
        store.tables.insert(
            RecordKind::Mark,
            vec![record(json!({ "mark_id": "M1", "student_id": "S001", "subject_id": "MATH", "term": "T1", "score": 88, "semester": 1, "teacher_id": "T1" }))],
        );
        store.tables.insert(
            RecordKind::Attendance,
            vec![record(json!({ "attendance_id": "A1", "student_id": "S001", "class_id": "C1", "date": "2025-01-13", "status": "Present" }))],
        );
        store.tables.insert(
            RecordKind::Fee,
            vec![record(json!({ "fees_id": "F1", "student_id": "S001", "amount": 350, "status": "Pending", "due_date": "2025-02-01" }))],
        );
        store
    }

    pub fn table(&self, kind: RecordKind) -> &[Record] {
        self.tables.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn calls_to(&self, action: &str) -> Vec<&ApiRequest> {
        self.calls.iter().filter(|c| c.action == action).collect()
    }

    pub fn handle(&mut self, request: &ApiRequest) -> ApiResponse {
        self.calls.push(request.clone());
        let payload = &request.payload;
        let action = request.action.as_str();

        match action {
            "login" => return self.login(payload),
            "addMultipleMarks" => {
                let marks = payload["marks"].as_array().cloned().unwrap_or_default();
                for mark in marks {
                    let reply = self.insert(RecordKind::Mark, record(mark));
                    if !reply.success {
                        return reply;
                    }
                }
                return ApiResponse::ok(Value::Null);
            }
            "getTeacherData" => return self.teacher_data(&text(payload, "teacher_id")),
            "getTeacherMarks" => {
                let subjects = self.teacher_subjects(&text(payload, "teacher_id"));
                let teacher = text(payload, "teacher_id");
                let rows: Vec<&Record> = self
                    .table(RecordKind::Mark)
                    .iter()
                    .filter(|m| m.text("teacher_id") == teacher || subjects.contains(&m.text("subject_id")))
                    .collect();
                return ApiResponse::ok(json!(rows));
            }
            "getTeacherAttendance" => {
                let classes = self.teacher_classes(&text(payload, "teacher_id"));
                let rows: Vec<&Record> = self
                    .table(RecordKind::Attendance)
                    .iter()
                    .filter(|a| classes.contains(&a.text("class_id")))
                    .collect();
                return ApiResponse::ok(json!(rows));
            }
            "getReportCardData" => return self.report_card(&text(payload, "student_id")),
            _ => {}
        }

        for kind in RecordKind::ALL {
            let d = kind.descriptor();
            if action == d.list_action {
                return self.list(kind, payload);
            }
            if action == d.add_action {
                return self.insert(kind, record(payload.clone()));
            }
            if action == d.update_action {
                return self.update(kind, record(payload.clone()));
            }
            if action == d.delete_action {
                return self.delete(kind, &text(payload, d.key_field));
            }
        }
        ApiResponse::rejected(format!("Unknown action: {action}"))
    }

    fn login(&self, payload: &Value) -> ApiResponse {
        let id = text(payload, "id");
        let password = text(payload, "password");
        let user = match text(payload, "role").as_str() {
            "admin" if id == "admin" && password == "admin123" => {
                Some(json!({ "id": "admin", "name": "Administrator" }))
            }
            "teacher" => self.credentials(RecordKind::Teacher, &id, &password),
            "student" => self.credentials(RecordKind::Student, &id, &password),
            _ => None,
        };
        match user {
            Some(user) => ApiResponse {
                success: true,
                user: Some(user),
                ..Default::default()
            },
            None => ApiResponse::rejected("Invalid ID or password"),
        }
    }

    fn credentials(&self, kind: RecordKind, id: &str, password: &str) -> Option<Value> {
        self.table(kind)
            .iter()
            .find(|r| r.key(kind) == id && r.text("password") == password)
            .map(|r| {
                let mut user = r.clone();
                user.0.remove("password");
                json!(user)
            })
    }

    fn list(&self, kind: RecordKind, payload: &Value) -> ApiResponse {
        let student = text(payload, "student_id");
        let rows: Vec<Record> = self
            .table(kind)
            .iter()
            .filter(|r| student.is_empty() || r.text("student_id") == student)
            .map(|r| {
                let mut r = r.clone();
                r.0.remove("password");
                r
            })
            .collect();
        ApiResponse::ok(json!(rows))
    }

    fn insert(&mut self, kind: RecordKind, mut row: Record) -> ApiResponse {
        let key_field = kind.descriptor().key_field;
        let mut key = row.text(key_field);
        if key.is_empty() {
            self.next_id += 1;
            key = format!("{}{}", &key_field[..1].to_uppercase(), 100 + self.next_id);
            row.insert(key_field, json!(key));
        }
        let rows = self.tables.entry(kind).or_default();
        if rows.iter().any(|r| r.key(kind) == key) {
            return ApiResponse::rejected(format!("{kind} {key} already exists"));
        }
        rows.push(row);
        let mut created = serde_json::Map::new();
        created.insert(key_field.to_string(), json!(key));
        ApiResponse::ok(Value::Object(created))
    }

    fn update(&mut self, kind: RecordKind, row: Record) -> ApiResponse {
        let key = row.key(kind);
        let Some(existing) = self
            .tables
            .entry(kind)
            .or_default()
            .iter_mut()
            .find(|r| r.key(kind) == key)
        else {
            return ApiResponse::rejected(format!("{kind} {key} not found"));
        };
        for (field, value) in row.0 {
            existing.0.insert(field, value);
        }
        ApiResponse::ok(Value::Null)
    }

    fn delete(&mut self, kind: RecordKind, key: &str) -> ApiResponse {
        let rows = self.tables.entry(kind).or_default();
        let before = rows.len();
        rows.retain(|r| r.key(kind) != key);
        if rows.len() == before {
            return ApiResponse::rejected(format!("{kind} {key} not found"));
        }
        ApiResponse::ok(Value::Null)
    }

    fn teacher_subjects(&self, teacher: &str) -> HashSet<String> {
        self.table(RecordKind::Subject)
            .iter()
            .filter(|s| s.text("teacher_id") == teacher)
            .map(|s| s.key(RecordKind::Subject))
            .collect()
    }

    fn teacher_classes(&self, teacher: &str) -> HashSet<String> {
        let mut classes: HashSet<String> = self
            .table(RecordKind::Subject)
            .iter()
            .filter(|s| s.text("teacher_id") == teacher)
            .map(|s| s.text("class_id"))
            .collect();
        classes.extend(
            self.table(RecordKind::Class)
                .iter()
                .filter(|c| c.text("teacher_id") == teacher)
                .map(|c| c.key(RecordKind::Class)),
        );
        classes
    }

    fn teacher_data(&self, teacher: &str) -> ApiResponse {
        let classes = self.teacher_classes(teacher);
        let strip = |r: &Record| {
            let mut r = r.clone();
            r.0.remove("password");
            r
        };
        let students: Vec<Record> = self
            .table(RecordKind::Student)
            .iter()
            .filter(|s| classes.contains(&s.text("class_id")))
            .map(strip)
            .collect();
        let class_rows: Vec<&Record> = self
            .table(RecordKind::Class)
            .iter()
            .filter(|c| classes.contains(&c.key(RecordKind::Class)))
            .collect();
        let subjects: Vec<&Record> = self
            .table(RecordKind::Subject)
            .iter()
            .filter(|s| s.text("teacher_id") == teacher)
            .collect();
        ApiResponse::ok(json!({ "students": students, "classes": class_rows, "subjects": subjects }))
    }

    fn report_card(&self, student_id: &str) -> ApiResponse {
        let Some(student) = self
            .table(RecordKind::Student)
            .iter()
            .find(|s| s.key(RecordKind::Student) == student_id)
        else {
            return ApiResponse::rejected("Student not found");
        };
        let mut student = student.clone();
        student.0.remove("password");

        let marks: Vec<Value> = self
            .table(RecordKind::Mark)
            .iter()
            .filter(|m| m.text("student_id") == student_id)
            .map(|m| {
                let subject = m.text("subject_id");
                let name = self
                    .table(RecordKind::Subject)
                    .iter()
                    .find(|s| s.key(RecordKind::Subject) == subject)
                    .map(|s| s.text("subject_name"))
                    .unwrap_or(subject);
                let score = m.get("score").and_then(Value::as_f64).unwrap_or_default();
                let (grade, remarks) = if score >= 80.0 { ("A", "Excellent") } else { ("C", "Credit") };
                json!({
                    "subject_name": name,
                    "total": score,
                    "grade": grade,
                    "remarks": remarks,
                    "semester": m.get("semester").cloned().unwrap_or(Value::Null),
                })
            })
            .collect();
        ApiResponse::ok(json!({ "student": student, "marks": marks }))
    }
}

fn text(payload: &Value, field: &str) -> String {
    payload.get(field).map(value_text).unwrap_or_default()
}
