use std::fmt;
use std::path::{Path, PathBuf};

use iced::Task;
use serde_json::json;
use tokio::task::spawn_blocking;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiRequest, ApiResponse};
use crate::app::crud::{self, CrudView};
use crate::config::ReportSettings;
use crate::doc_gen;
use crate::models::{Record, RecordKind, ReportCard};
use crate::session::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentTab {
    Marks,
    Attendance,
    Fees,
}

impl StudentTab {
    pub const ALL: [StudentTab; 3] = [StudentTab::Marks, StudentTab::Attendance, StudentTab::Fees];

    pub fn kind(self) -> RecordKind {
        match self {
            StudentTab::Marks => RecordKind::Mark,
            StudentTab::Attendance => RecordKind::Attendance,
            StudentTab::Fees => RecordKind::Fee,
        }
    }
}

impl fmt::Display for StudentTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind().title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SemesterFilter {
    #[default]
    All,
    First,
    Second,
}

impl SemesterFilter {
    pub const ALL: [SemesterFilter; 3] = [SemesterFilter::All, SemesterFilter::First, SemesterFilter::Second];

    /// Semester value compared against marks; empty means no filtering.
    pub fn value(self) -> &'static str {
        match self {
            SemesterFilter::All => "",
            SemesterFilter::First => "1",
            SemesterFilter::Second => "2",
        }
    }
}

impl fmt::Display for SemesterFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemesterFilter::All => f.write_str("All semesters"),
            other => write!(f, "Semester {}", other.value()),
        }
    }
}

/// Marks of the given semester, or all of them for an empty semester.
pub fn filter_marks(marks: &[Record], semester: &str) -> Vec<Record> {
    let semester = semester.trim();
    marks
        .iter()
        .filter(|m| semester.is_empty() || m.text("semester").trim() == semester)
        .cloned()
        .collect()
}

#[derive(Debug, Clone)]
pub enum StudentMessage {
    TabSelected(StudentTab),
    Refresh,
    Loaded {
        epoch: u64,
        results: Vec<(RecordKind, ApiResponse)>,
    },
    SemesterSelected(SemesterFilter),
    GenerateReport,
    ReportDataLoaded(ApiResponse),
    ReportGenerated(Result<PathBuf, String>),
}

/// Read-only view of a student's own marks, attendance and fees.
#[derive(Debug)]
pub struct StudentDashboard {
    pub profile: UserProfile,
    pub active_tab: StudentTab,
    pub view: CrudView,
    pub semester: SemesterFilter,
    pub generating: bool,
    report_settings: ReportSettings,
}

impl StudentDashboard {
    pub fn new(
        profile: UserProfile,
        report_settings: ReportSettings,
        client: &ApiClient,
    ) -> (Self, Task<StudentMessage>) {
        let mut dashboard = Self::idle(profile, report_settings);
        let task = dashboard.reload(client);
        (dashboard, task)
    }

    fn idle(profile: UserProfile, report_settings: ReportSettings) -> Self {
        Self {
            profile,
            active_tab: StudentTab::Marks,
            view: CrudView::default(),
            semester: SemesterFilter::All,
            generating: false,
            report_settings,
        }
    }

    /// Rows for the active tab, with the semester filter applied to marks.
    pub fn visible_records(&self) -> Vec<Record> {
        let records = self.view.collections.get(self.active_tab.kind());
        match self.active_tab {
            StudentTab::Marks => filter_marks(records, self.semester.value()),
            _ => records.to_vec(),
        }
    }

    pub fn load_requests(&mut self) -> (u64, Vec<(RecordKind, ApiRequest)>) {
        let epoch = self.view.begin_load();
        let payload = json!({ "student_id": self.profile.id });
        let requests = StudentTab::ALL
            .iter()
            .map(|tab| {
                let kind = tab.kind();
                (kind, ApiRequest::new(kind.descriptor().list_action, payload.clone()))
            })
            .collect();
        (epoch, requests)
    }

    pub fn report_request(&mut self) -> Option<ApiRequest> {
        if self.generating {
            return None;
        }
        self.generating = true;
        self.view.notice = None;
        Some(ApiRequest::new(
            "getReportCardData",
            json!({ "student_id": self.profile.id }),
        ))
    }

    /// Turns the report data response into a card ready to print, or
    /// records why it cannot be printed.
    pub fn accept_report_data(&mut self, response: ApiResponse) -> Option<ReportCard> {
        match response.decode::<ReportCard>() {
            Ok(card) => Some(card),
            Err(err) => {
                warn!(student = %self.profile.id, "report data unavailable: {err}");
                self.generating = false;
                self.view.notice = Some(format!("Could not generate report card: {err}"));
                None
            }
        }
    }

    pub fn finish_report(&mut self, result: Result<PathBuf, String>) {
        self.generating = false;
        self.view.notice = Some(match result {
            Ok(path) => format!("Report card saved to {}", path.display()),
            Err(err) => format!("Could not generate report card: {err}"),
        });
    }

    fn reload(&mut self, client: &ApiClient) -> Task<StudentMessage> {
        let (epoch, requests) = self.load_requests();
        crud::send_all(client, requests, move |results| StudentMessage::Loaded { epoch, results })
    }

    pub fn update(&mut self, message: StudentMessage, client: &ApiClient) -> Task<StudentMessage> {
        match message {
            StudentMessage::TabSelected(tab) => {
                self.active_tab = tab;
                Task::none()
            }
            StudentMessage::Refresh => self.reload(client),
            StudentMessage::Loaded { epoch, results } => {
                self.view.finish_load(epoch, results);
                Task::none()
            }
            StudentMessage::SemesterSelected(semester) => {
                self.semester = semester;
                Task::none()
            }
            StudentMessage::GenerateReport => match self.report_request() {
                Some(request) => crud::send(client, request, StudentMessage::ReportDataLoaded),
                None => Task::none(),
            },
            StudentMessage::ReportDataLoaded(response) => match self.accept_report_data(response) {
                Some(card) => Task::perform(
                    render_report(card, self.report_settings.clone()),
                    StudentMessage::ReportGenerated,
                ),
                None => Task::none(),
            },
            StudentMessage::ReportGenerated(result) => {
                self.finish_report(result);
                Task::none()
            }
        }
    }
}

async fn render_report(card: ReportCard, settings: ReportSettings) -> Result<PathBuf, String> {
    render_and_open(card, settings, doc_gen::generate_pdf_from_html, open_report).await
}

/// Prints the card and hands it to the viewer, both on the blocking pool.
async fn render_and_open<P, O>(card: ReportCard, settings: ReportSettings, print: P, open: O) -> Result<PathBuf, String>
where
    P: FnOnce(&Path, &Path) -> anyhow::Result<()> + Send + 'static,
    O: FnOnce(&Path) + Send + 'static,
{
    info!(student = %card.student.text("student_id"), "generating report card");
    let job = spawn_blocking(move || {
        let path = doc_gen::generate_report_card_with(&card, &settings, print)?;
        open(&path);
        anyhow::Ok(path)
    });
    match job.await {
        Ok(Ok(path)) => Ok(path),
        Ok(Err(err)) => Err(format!("{err:#}")),
        Err(err) => Err(err.to_string()),
    }
}

fn open_report(path: &Path) {
    if let Err(err) = open::that(path) {
        warn!(path = %path.display(), "could not open report card: {err}");
    }
}
