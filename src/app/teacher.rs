use std::collections::BTreeMap;
use std::fmt;

use chrono::Local;
use iced::Task;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::api::{ApiClient, ApiError, ApiRequest, ApiResponse};
use crate::app::crud::{self, CrudMessage, CrudStep, CrudView, LoadTarget};
use crate::app::form::{FormState, number_or_text};
use crate::lookups::{Collections, RefOption};
use crate::models::{Record, RecordKind, SEMESTERS};
use crate::session::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeacherTab {
    Students,
    Marks,
    Attendance,
    EnterMarks,
}

impl TeacherTab {
    pub const ALL: [TeacherTab; 4] = [
        TeacherTab::Students,
        TeacherTab::Marks,
        TeacherTab::Attendance,
        TeacherTab::EnterMarks,
    ];

    /// Record type listed on the tab; the bulk entry sheet has none.
    pub fn kind(self) -> Option<RecordKind> {
        match self {
            TeacherTab::Students => Some(RecordKind::Student),
            TeacherTab::Marks => Some(RecordKind::Mark),
            TeacherTab::Attendance => Some(RecordKind::Attendance),
            TeacherTab::EnterMarks => None,
        }
    }

    pub fn icon(self) -> &'static str {
        match self.kind() {
            Some(kind) => kind.icon(),
            None => "pen-to-square",
        }
    }

    pub fn editable(self) -> bool {
        matches!(self, TeacherTab::Marks | TeacherTab::Attendance)
    }
}

impl fmt::Display for TeacherTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TeacherTab::Students => "My Students",
            TeacherTab::Marks => "Marks",
            TeacherTab::Attendance => "Attendance",
            TeacherTab::EnterMarks => "Enter Marks",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSlot {
    Roster,
    Marks,
    Attendance,
}

impl LoadTarget for LoadSlot {
    fn title(self) -> &'static str {
        match self {
            LoadSlot::Roster => "Class roster",
            LoadSlot::Marks => "Marks",
            LoadSlot::Attendance => "Attendance",
        }
    }

    fn absorb(self, collections: &mut Collections, response: ApiResponse) -> Result<(), ApiError> {
        match self {
            LoadSlot::Roster => {
                let roster = response.decode::<Option<Roster>>()?.unwrap_or_default();
                collections.set(RecordKind::Student, roster.students);
                collections.set(RecordKind::Class, roster.classes);
                collections.set(RecordKind::Subject, roster.subjects);
                Ok(())
            }
            LoadSlot::Marks => collections.absorb(RecordKind::Mark, response),
            LoadSlot::Attendance => collections.absorb(RecordKind::Attendance, response),
        }
    }
}

/// Payload of `getTeacherData`.
#[derive(Debug, Default, Deserialize)]
struct Roster {
    #[serde(default)]
    students: Vec<Record>,
    #[serde(default)]
    classes: Vec<Record>,
    #[serde(default)]
    subjects: Vec<Record>,
}

#[derive(Debug, Clone)]
pub enum SheetMessage {
    SubjectSelected(RefOption),
    ClassSelected(RefOption),
    TermChanged(String),
    SemesterSelected(&'static str),
    ScoreChanged(String, String),
    Submit,
}

/// Bulk entry of one subject's scores for a whole class.
#[derive(Debug, Clone)]
pub struct MarkSheet {
    pub subject: Option<RefOption>,
    pub class: Option<RefOption>,
    pub term: String,
    pub semester: &'static str,
    pub scores: BTreeMap<String, String>,
    pub submitting: bool,
}

impl Default for MarkSheet {
    fn default() -> Self {
        Self {
            subject: None,
            class: None,
            term: String::new(),
            semester: SEMESTERS[0],
            scores: BTreeMap::new(),
            submitting: false,
        }
    }
}

impl MarkSheet {
    pub fn update(&mut self, message: SheetMessage) {
        match message {
            SheetMessage::SubjectSelected(subject) => {
                self.subject = Some(subject);
                self.class = None;
                self.scores.clear();
            }
            SheetMessage::ClassSelected(class) => {
                self.class = Some(class);
                self.scores.clear();
            }
            SheetMessage::TermChanged(term) => self.term = term,
            SheetMessage::SemesterSelected(semester) => self.semester = semester,
            SheetMessage::ScoreChanged(student, score) => {
                self.scores.insert(student, score);
            }
            SheetMessage::Submit => {}
        }
    }

    pub fn score(&self, student: &str) -> &str {
        self.scores.get(student).map(String::as_str).unwrap_or_default()
    }

    /// Classes the selected subject is taught in. A subject row may list
    /// several classes separated by commas.
    pub fn class_options(&self, collections: &Collections) -> Vec<RefOption> {
        let Some(subject) = &self.subject else {
            return Vec::new();
        };
        let mut options: Vec<RefOption> = Vec::new();
        for row in collections.get(RecordKind::Subject) {
            if row.key(RecordKind::Subject) != subject.key {
                continue;
            }
            for class in row.text("class_id").split(',').map(str::trim) {
                if class.is_empty() || options.iter().any(|o| o.key == class) {
                    continue;
                }
                options.push(RefOption {
                    key: class.to_string(),
                    label: collections
                        .label(RecordKind::Class, class)
                        .unwrap_or_default(),
                });
            }
        }
        options
    }

    /// Students enrolled in the selected class.
    pub fn students<'a>(&self, collections: &'a Collections) -> Vec<&'a Record> {
        let Some(class) = &self.class else {
            return Vec::new();
        };
        collections
            .get(RecordKind::Student)
            .iter()
            .filter(|s| s.text("class_id") == class.key)
            .collect()
    }

    /// One `addMultipleMarks` request covering every student with a score.
    /// Blank scores are skipped.
    pub fn request(&self, collections: &Collections, teacher_id: &str) -> Result<ApiRequest, String> {
        let (Some(subject), Some(class)) = (&self.subject, &self.class) else {
            return Err("Select a subject and a class first".to_string());
        };

        let marks: Vec<Value> = self
            .students(collections)
            .into_iter()
            .filter_map(|student| {
                let student_id = student.key(RecordKind::Student);
                let score = self.score(&student_id).trim();
                (!score.is_empty()).then(|| {
                    json!({
                        "student_id": student_id,
                        "subject_id": subject.key,
                        "class_id": class.key,
                        "term": self.term.trim(),
                        "semester": number_or_text(self.semester),
                        "score": number_or_text(score),
                        "teacher_id": teacher_id,
                    })
                })
            })
            .collect();

        if marks.is_empty() {
            return Err("Enter at least one score".to_string());
        }
        Ok(ApiRequest::new("addMultipleMarks", json!({ "marks": marks })))
    }
}

#[derive(Debug, Clone)]
pub enum TeacherMessage {
    TabSelected(TeacherTab),
    Refresh,
    Loaded {
        epoch: u64,
        results: Vec<(LoadSlot, ApiResponse)>,
    },
    NewRecord,
    Edit(Record),
    Crud(CrudMessage),
    Sheet(SheetMessage),
    SheetSaved(ApiResponse),
}

/// A teacher's own roster, marks and attendance, plus bulk mark entry.
#[derive(Debug)]
pub struct TeacherDashboard {
    pub profile: UserProfile,
    pub active_tab: TeacherTab,
    pub view: CrudView,
    pub sheet: MarkSheet,
}

impl TeacherDashboard {
    pub fn new(profile: UserProfile, client: &ApiClient) -> (Self, Task<TeacherMessage>) {
        let mut dashboard = Self::idle(profile);
        let task = dashboard.reload(client);
        (dashboard, task)
    }

    fn idle(profile: UserProfile) -> Self {
        Self {
            profile,
            active_tab: TeacherTab::Students,
            view: CrudView::default(),
            sheet: MarkSheet::default(),
        }
    }

    pub fn load_requests(&mut self) -> (u64, Vec<(LoadSlot, ApiRequest)>) {
        let epoch = self.view.begin_load();
        let payload = json!({ "teacher_id": self.profile.id });
        let requests = vec![
            (LoadSlot::Roster, ApiRequest::new("getTeacherData", payload.clone())),
            (LoadSlot::Marks, ApiRequest::new("getTeacherMarks", payload.clone())),
            (LoadSlot::Attendance, ApiRequest::new("getTeacherAttendance", payload)),
        ];
        (epoch, requests)
    }

    /// Form for a new record on the active tab, prefilled where the teacher
    /// context already knows the answer.
    pub fn new_form(&self) -> Option<FormState> {
        match self.active_tab {
            TeacherTab::Marks => {
                Some(FormState::create(RecordKind::Mark).with_value("teacher_id", self.profile.id.clone()))
            }
            TeacherTab::Attendance => Some(
                FormState::create(RecordKind::Attendance)
                    .with_value("date", Local::now().format("%Y-%m-%d").to_string()),
            ),
            TeacherTab::Students | TeacherTab::EnterMarks => None,
        }
    }

    pub fn edit_form(&self, record: &Record) -> Option<FormState> {
        match self.active_tab {
            TeacherTab::Marks => Some(
                FormState::edit(RecordKind::Mark, record).with_value("teacher_id", self.profile.id.clone()),
            ),
            TeacherTab::Attendance => Some(FormState::edit(RecordKind::Attendance, record)),
            TeacherTab::Students | TeacherTab::EnterMarks => None,
        }
    }

    /// Builds the bulk request, or records why nothing can be sent.
    pub fn submit_sheet(&mut self) -> Option<ApiRequest> {
        if self.sheet.submitting {
            return None;
        }
        match self.sheet.request(&self.view.collections, &self.profile.id) {
            Ok(request) => {
                self.sheet.submitting = true;
                self.view.notice = None;
                Some(request)
            }
            Err(message) => {
                self.view.notice = Some(message);
                None
            }
        }
    }

    pub fn finish_sheet(&mut self, response: ApiResponse) -> bool {
        self.sheet.submitting = false;
        if response.success {
            info!(teacher = %self.profile.id, "bulk marks saved");
            self.sheet.scores.clear();
            self.view.notice = Some("Marks saved".to_string());
            return true;
        }
        self.view.notice = Some(response.error_message());
        false
    }

    fn reload(&mut self, client: &ApiClient) -> Task<TeacherMessage> {
        let (epoch, requests) = self.load_requests();
        crud::send_all(client, requests, move |results| TeacherMessage::Loaded { epoch, results })
    }

    pub fn update(&mut self, message: TeacherMessage, client: &ApiClient) -> Task<TeacherMessage> {
        match message {
            TeacherMessage::TabSelected(tab) => {
                self.active_tab = tab;
                self.view.form = None;
                Task::none()
            }
            TeacherMessage::Refresh => self.reload(client),
            TeacherMessage::Loaded { epoch, results } => {
                self.view.finish_load(epoch, results);
                Task::none()
            }
            TeacherMessage::NewRecord => {
                self.view.form = self.new_form();
                Task::none()
            }
            TeacherMessage::Edit(record) => {
                self.view.form = self.edit_form(&record);
                Task::none()
            }
            TeacherMessage::Crud(message) => {
                let deletable = self.active_tab.kind().filter(|_| self.active_tab.editable());
                match self.view.update(message, deletable, client) {
                    CrudStep::Done => Task::none(),
                    CrudStep::Run(task) => task.map(TeacherMessage::Crud),
                    CrudStep::Reload => self.reload(client),
                }
            }
            TeacherMessage::Sheet(SheetMessage::Submit) => match self.submit_sheet() {
                Some(request) => crud::send(client, request, TeacherMessage::SheetSaved),
                None => Task::none(),
            },
            TeacherMessage::Sheet(message) => {
                self.sheet.update(message);
                Task::none()
            }
            TeacherMessage::SheetSaved(response) => {
                if self.finish_sheet(response) {
                    self.reload(client)
                } else {
                    Task::none()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::crud::Phase;
    use crate::app::form::FormMessage;
    use crate::testing::{FakeStore, record};

    fn profile(id: &str) -> UserProfile {
        UserProfile {
            role: crate::models::Role::Teacher,
            id: id.to_string(),
            name: "Kofi Boateng".to_string(),
            fields: Record::default(),
        }
    }

    fn loaded(store: &mut FakeStore) -> TeacherDashboard {
        let mut dashboard = TeacherDashboard::idle(profile("T1"));
        load(&mut dashboard, store);
        dashboard
    }

    fn load(dashboard: &mut TeacherDashboard, store: &mut FakeStore) {
        let (epoch, requests) = dashboard.load_requests();
        let results = requests
            .into_iter()
            .map(|(slot, request)| (slot, store.handle(&request)))
            .collect();
        assert!(dashboard.view.finish_load(epoch, results));
    }

    fn option(key: &str) -> RefOption {
        RefOption {
            key: key.to_string(),
            label: String::new(),
        }
    }

    #[test]
    fn load_is_scoped_to_the_signed_in_teacher() {
        let mut store = FakeStore::seeded();
        let dashboard = loaded(&mut store);

        for action in ["getTeacherData", "getTeacherMarks", "getTeacherAttendance"] {
            let calls = store.calls_to(action);
            assert_eq!(calls.len(), 1, "{action}");
            assert_eq!(calls[0].payload, json!({ "teacher_id": "T1" }));
        }

        let students: Vec<_> = dashboard
            .view.collections
            .get(RecordKind::Student)
            .iter()
            .map(|s| s.key(RecordKind::Student))
            .collect();
        assert_eq!(students, ["S001", "S002"]);
        assert_eq!(dashboard.view.collections.get(RecordKind::Mark).len(), 1);
        assert_eq!(dashboard.view.phase, Phase::Idle);
        assert!(dashboard.view.notice.is_none());
    }

    #[test]
    fn failed_roster_keeps_previous_collections() {
        let mut store = FakeStore::seeded();
        let mut dashboard = loaded(&mut store);

        let (epoch, _) = dashboard.load_requests();
        dashboard.view.finish_load(
            epoch,
            vec![(LoadSlot::Roster, ApiResponse::transport("Failed to connect to the backend."))],
        );
        assert_eq!(dashboard.view.collections.get(RecordKind::Student).len(), 2);
        assert_eq!(
            dashboard.view.notice.as_deref(),
            Some("Some data could not be loaded. Class roster: Failed to connect to the backend.")
        );
    }

    #[test]
    fn stale_teacher_load_is_ignored() {
        let mut dashboard = TeacherDashboard::idle(profile("T1"));
        let (old, _) = dashboard.load_requests();
        let (_, _) = dashboard.load_requests();
        assert!(!dashboard.view.finish_load(old, vec![(LoadSlot::Marks, ApiResponse::ok(json!([{ "mark_id": "X" }])))]));
        assert!(dashboard.view.collections.get(RecordKind::Mark).is_empty());
    }

    #[test]
    fn sheet_lists_classes_of_subject_and_students_of_class() {
        let mut store = FakeStore::seeded();
        let mut dashboard = loaded(&mut store);

        dashboard.sheet.update(SheetMessage::SubjectSelected(option("MATH")));
        let classes = dashboard.sheet.class_options(&dashboard.view.collections);
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].to_string(), "Form 1A (C1)");

        dashboard.sheet.update(SheetMessage::ClassSelected(classes[0].clone()));
        let students: Vec<_> = dashboard
            .sheet
            .students(&dashboard.view.collections)
            .iter()
            .map(|s| s.key(RecordKind::Student))
            .collect();
        assert_eq!(students, ["S001", "S002"]);
    }

    #[test]
    fn subject_lists_every_comma_separated_class() {
        let mut collections = Collections::default();
        collections.set(
            RecordKind::Subject,
            vec![record(json!({ "subject_id": "SCI", "class_id": "C1, C2" }))],
        );
        let sheet = MarkSheet {
            subject: Some(option("SCI")),
            ..MarkSheet::default()
        };
        let keys: Vec<_> = sheet.class_options(&collections).into_iter().map(|o| o.key).collect();
        assert_eq!(keys, ["C1", "C2"]);
    }

    #[test]
    fn bulk_entry_sends_one_request_with_entered_scores_only() {
        let mut store = FakeStore::seeded();
        let mut dashboard = loaded(&mut store);

        dashboard.sheet.update(SheetMessage::SubjectSelected(option("MATH")));
        dashboard.sheet.update(SheetMessage::ClassSelected(option("C1")));
        dashboard.sheet.update(SheetMessage::TermChanged("T2".into()));
        dashboard.sheet.update(SheetMessage::ScoreChanged("S001".into(), "75".into()));
        dashboard.sheet.update(SheetMessage::ScoreChanged("S002".into(), "64".into()));

        let request = dashboard.submit_sheet().unwrap();
        assert!(dashboard.sheet.submitting);
        assert!(dashboard.submit_sheet().is_none());

        let response = store.handle(&request);
        assert!(dashboard.finish_sheet(response));

        let calls = store.calls_to("addMultipleMarks");
        assert_eq!(calls.len(), 1);
        let marks = calls[0].payload["marks"].as_array().unwrap();
        assert_eq!(marks.len(), 2);
        for mark in marks {
            assert_eq!(mark["subject_id"], "MATH");
            assert_eq!(mark["class_id"], "C1");
            assert_eq!(mark["teacher_id"], "T1");
            assert_eq!(mark["semester"], json!(1));
        }
        assert_eq!(marks[0]["score"], json!(75));

        load(&mut dashboard, &mut store);
        assert_eq!(dashboard.view.collections.get(RecordKind::Mark).len(), 3);
        assert!(dashboard.sheet.scores.is_empty());
    }

    #[test]
    fn blank_scores_are_skipped_and_empty_sheet_is_not_sent() {
        let mut store = FakeStore::seeded();
        let mut dashboard = loaded(&mut store);

        dashboard.sheet.update(SheetMessage::SubjectSelected(option("MATH")));
        dashboard.sheet.update(SheetMessage::ClassSelected(option("C1")));
        dashboard.sheet.update(SheetMessage::ScoreChanged("S001".into(), "  ".into()));

        assert!(dashboard.submit_sheet().is_none());
        assert_eq!(dashboard.view.notice.as_deref(), Some("Enter at least one score"));
        assert!(!dashboard.sheet.submitting);
        assert!(store.calls_to("addMultipleMarks").is_empty());

        dashboard.sheet.update(SheetMessage::ScoreChanged("S002".into(), "50".into()));
        let request = dashboard.submit_sheet().unwrap();
        assert_eq!(request.payload["marks"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn changing_subject_resets_class_and_scores() {
        let mut sheet = MarkSheet::default();
        sheet.update(SheetMessage::SubjectSelected(option("MATH")));
        sheet.update(SheetMessage::ClassSelected(option("C1")));
        sheet.update(SheetMessage::ScoreChanged("S001".into(), "10".into()));
        sheet.update(SheetMessage::SubjectSelected(option("ENG")));
        assert!(sheet.class.is_none());
        assert!(sheet.scores.is_empty());
    }

    #[test]
    fn new_mark_form_carries_teacher_and_attendance_defaults_to_today() {
        let mut dashboard = TeacherDashboard::idle(profile("T1"));

        dashboard.active_tab = TeacherTab::Marks;
        let form = dashboard.new_form().unwrap();
        assert_eq!(form.payload()["teacher_id"], "T1");

        dashboard.active_tab = TeacherTab::Attendance;
        let form = dashboard.new_form().unwrap();
        assert_eq!(form.value("date"), Local::now().format("%Y-%m-%d").to_string());

        dashboard.active_tab = TeacherTab::Students;
        assert!(dashboard.new_form().is_none());
    }

    #[test]
    fn attendance_add_then_refetch_shows_it_once() {
        let mut store = FakeStore::seeded();
        let mut dashboard = loaded(&mut store);
        dashboard.active_tab = TeacherTab::Attendance;

        let mut form = dashboard.new_form().unwrap();
        form.update(FormMessage::FieldChanged("student_id", "S002".into()));
        form.update(FormMessage::FieldChanged("class_id", "C1".into()));
        form.update(FormMessage::FieldChanged("status", "Absent".into()));
        dashboard.view.form = Some(form);

        let request = dashboard.view.form.as_mut().and_then(FormState::submit).unwrap();
        let response = store.handle(&request);
        let created = response.data.clone().unwrap()["attendance_id"].clone();
        assert!(dashboard.view.finish_save(response));
        load(&mut dashboard, &mut store);

        let matching = dashboard
            .view.collections
            .get(RecordKind::Attendance)
            .iter()
            .filter(|a| a.get("attendance_id") == Some(&created))
            .count();
        assert_eq!(matching, 1);
    }
}
