use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Student, Role::Teacher];

    /// Wire name used in the `login` payload.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }

    /// Field of the login `user` object that carries the role's key.
    pub fn id_field(self) -> &'static str {
        match self {
            Role::Admin => "id",
            Role::Teacher => "teacher_id",
            Role::Student => "student_id",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Role::Admin => "Admin",
                Role::Teacher => "Teacher",
                Role::Student => "Student",
            }
        )
    }
}

/// A remote row as an untyped JSON object.
///
/// Spreadsheet backends hand back ids and numbers either as strings or as
/// numbers, so views read fields through [`Record::text`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub Map<String, Value>);

impl Record {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn text(&self, field: &str) -> String {
        self.0.get(field).map(value_text).unwrap_or_default()
    }

    pub fn key(&self, kind: RecordKind) -> String {
        self.text(kind.descriptor().key_field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Record(map)
    }
}

/// Display text of a JSON value: strings verbatim, integral numbers without
/// a fraction, null as empty.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{}", f as i64)
                } else {
                    f.to_string()
                }
            } else {
                n.to_string()
            }
        }
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Student,
    Teacher,
    Course,
    Class,
    Subject,
    Mark,
    Attendance,
    Fee,
}

impl RecordKind {
    pub const ALL: [RecordKind; 8] = [
        RecordKind::Student,
        RecordKind::Teacher,
        RecordKind::Course,
        RecordKind::Class,
        RecordKind::Subject,
        RecordKind::Mark,
        RecordKind::Attendance,
        RecordKind::Fee,
    ];

    pub fn descriptor(self) -> &'static Descriptor {
        match self {
            RecordKind::Student => &STUDENT,
            RecordKind::Teacher => &TEACHER,
            RecordKind::Course => &COURSE,
            RecordKind::Class => &CLASS,
            RecordKind::Subject => &SUBJECT,
            RecordKind::Mark => &MARK,
            RecordKind::Attendance => &ATTENDANCE,
            RecordKind::Fee => &FEE,
        }
    }

    /// Plural title used for tabs and headings.
    pub fn title(self) -> &'static str {
        match self {
            RecordKind::Student => "Students",
            RecordKind::Teacher => "Teachers",
            RecordKind::Course => "Courses",
            RecordKind::Class => "Classes",
            RecordKind::Subject => "Subjects",
            RecordKind::Mark => "Marks",
            RecordKind::Attendance => "Attendance",
            RecordKind::Fee => "Fees",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            RecordKind::Student => "user-graduate",
            RecordKind::Teacher => "person-chalkboard",
            RecordKind::Course => "graduation-cap",
            RecordKind::Class => "school",
            RecordKind::Subject => "book",
            RecordKind::Mark => "star",
            RecordKind::Attendance => "calendar-check",
            RecordKind::Fee => "file-invoice-dollar",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.descriptor().label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Date,
    Password,
    Reference(RecordKind),
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, label, kind }
}

/// Everything the generic table, form and CRUD code needs to know about a
/// record type. The key field is always the first entry of `fields`.
#[derive(Debug)]
pub struct Descriptor {
    pub kind: RecordKind,
    pub label: &'static str,
    pub key_field: &'static str,
    /// Students and teachers log in with their key, so it is typed in by
    /// the admin; every other key is assigned by the store.
    pub user_assigned_key: bool,
    pub display_field: &'static str,
    pub fields: &'static [FieldSpec],
    pub columns: &'static [&'static str],
    pub list_action: &'static str,
    pub add_action: &'static str,
    pub update_action: &'static str,
    pub delete_action: &'static str,
}

impl Descriptor {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

pub const SEMESTERS: &[&str] = &["1", "2"];
pub const ATTENDANCE_STATUSES: &[&str] = &["Present", "Absent"];
pub const FEE_STATUSES: &[&str] = &["Paid", "Pending", "Partial"];

static STUDENT: Descriptor = Descriptor {
    kind: RecordKind::Student,
    label: "Student",
    key_field: "student_id",
    user_assigned_key: true,
    display_field: "name",
    fields: &[
        field("student_id", "Student ID", FieldKind::Text),
        field("name", "Name", FieldKind::Text),
        field("password", "Password", FieldKind::Password),
        field("course_id", "Course", FieldKind::Reference(RecordKind::Course)),
        field("class_id", "Class", FieldKind::Reference(RecordKind::Class)),
    ],
    columns: &["student_id", "name", "course_id", "class_id"],
    list_action: "getStudents",
    add_action: "addStudent",
    update_action: "updateStudent",
    delete_action: "deleteStudent",
};

static TEACHER: Descriptor = Descriptor {
    kind: RecordKind::Teacher,
    label: "Teacher",
    key_field: "teacher_id",
    user_assigned_key: true,
    display_field: "name",
    fields: &[
        field("teacher_id", "Teacher ID", FieldKind::Text),
        field("name", "Name", FieldKind::Text),
        field("password", "Password", FieldKind::Password),
        field("email", "Email", FieldKind::Text),
    ],
    columns: &["teacher_id", "name", "email"],
    list_action: "getTeachers",
    add_action: "addTeacher",
    update_action: "updateTeacher",
    delete_action: "deleteTeacher",
};

static COURSE: Descriptor = Descriptor {
    kind: RecordKind::Course,
    label: "Course",
    key_field: "course_id",
    user_assigned_key: false,
    display_field: "course_name",
    fields: &[
        field("course_id", "Course ID", FieldKind::Text),
        field("course_name", "Course Name", FieldKind::Text),
    ],
    columns: &["course_id", "course_name"],
    list_action: "getCourses",
    add_action: "addCourse",
    update_action: "updateCourse",
    delete_action: "deleteCourse",
};

static CLASS: Descriptor = Descriptor {
    kind: RecordKind::Class,
    label: "Class",
    key_field: "class_id",
    user_assigned_key: false,
    display_field: "class_name",
    fields: &[
        field("class_id", "Class ID", FieldKind::Text),
        field("class_name", "Class Name", FieldKind::Text),
        field("course_id", "Course", FieldKind::Reference(RecordKind::Course)),
        field("teacher_id", "Teacher", FieldKind::Reference(RecordKind::Teacher)),
    ],
    columns: &["class_id", "class_name", "course_id", "teacher_id"],
    list_action: "getClasses",
    add_action: "addClass",
    update_action: "updateClass",
    delete_action: "deleteClass",
};

static SUBJECT: Descriptor = Descriptor {
    kind: RecordKind::Subject,
    label: "Subject",
    key_field: "subject_id",
    user_assigned_key: false,
    display_field: "subject_name",
    fields: &[
        field("subject_id", "Subject ID", FieldKind::Text),
        field("subject_name", "Subject Name", FieldKind::Text),
        field("teacher_id", "Teacher", FieldKind::Reference(RecordKind::Teacher)),
        field("class_id", "Class", FieldKind::Reference(RecordKind::Class)),
    ],
    columns: &["subject_id", "subject_name", "teacher_id", "class_id"],
    list_action: "getSubjects",
    add_action: "addSubject",
    update_action: "updateSubject",
    delete_action: "deleteSubject",
};

static MARK: Descriptor = Descriptor {
    kind: RecordKind::Mark,
    label: "Mark",
    key_field: "mark_id",
    user_assigned_key: false,
    display_field: "mark_id",
    fields: &[
        field("mark_id", "Mark ID", FieldKind::Text),
        field("student_id", "Student", FieldKind::Reference(RecordKind::Student)),
        field("subject_id", "Subject", FieldKind::Reference(RecordKind::Subject)),
        field("term", "Term", FieldKind::Text),
        field("score", "Score", FieldKind::Number),
        field("semester", "Semester", FieldKind::Choice(SEMESTERS)),
    ],
    columns: &["mark_id", "student_id", "subject_id", "term", "score", "semester"],
    list_action: "getStudentMarks",
    add_action: "addMark",
    update_action: "updateMark",
    delete_action: "deleteMark",
};

static ATTENDANCE: Descriptor = Descriptor {
    kind: RecordKind::Attendance,
    label: "Attendance",
    key_field: "attendance_id",
    user_assigned_key: false,
    display_field: "attendance_id",
    fields: &[
        field("attendance_id", "Attendance ID", FieldKind::Text),
        field("student_id", "Student", FieldKind::Reference(RecordKind::Student)),
        field("class_id", "Class", FieldKind::Reference(RecordKind::Class)),
        field("date", "Date", FieldKind::Date),
        field("status", "Status", FieldKind::Choice(ATTENDANCE_STATUSES)),
    ],
    columns: &["attendance_id", "student_id", "class_id", "date", "status"],
    list_action: "getStudentAttendance",
    add_action: "addAttendance",
    update_action: "updateAttendance",
    delete_action: "deleteAttendance",
};

static FEE: Descriptor = Descriptor {
    kind: RecordKind::Fee,
    label: "Fee",
    key_field: "fees_id",
    user_assigned_key: false,
    display_field: "fees_id",
    fields: &[
        field("fees_id", "Fee ID", FieldKind::Text),
        field("student_id", "Student", FieldKind::Reference(RecordKind::Student)),
        field("amount", "Amount", FieldKind::Number),
        field("status", "Status", FieldKind::Choice(FEE_STATUSES)),
        field("due_date", "Due Date", FieldKind::Date),
    ],
    columns: &["fees_id", "student_id", "amount", "status", "due_date"],
    list_action: "getStudentFees",
    add_action: "addFees",
    update_action: "updateFees",
    delete_action: "deleteFees",
};

/// Consolidated data behind one printed report card.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportCard {
    pub student: Record,
    #[serde(default)]
    pub marks: Vec<ReportEntry>,
}

/// One subject line of a report card. Grade and remarks come precomputed
/// from the store.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReportEntry {
    #[serde(default, deserialize_with = "lenient_text")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub subject_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub subject_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub total: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub score: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub grade: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub remarks: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub semester: Option<String>,
}

impl ReportEntry {
    pub fn subject(&self) -> &str {
        self.subject
            .as_deref()
            .or(self.subject_name.as_deref())
            .or(self.subject_id.as_deref())
            .unwrap_or_default()
    }

    pub fn total(&self) -> &str {
        self.total.as_deref().or(self.score.as_deref()).unwrap_or_default()
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(|v| value_text(&v)).filter(|s| !s.is_empty()))
}
