use iced::Task;
use serde_json::json;

use crate::api::{ApiClient, ApiRequest, ApiResponse};
use crate::app::crud::{self, CrudMessage, CrudStep, CrudView};
use crate::app::form::FormState;
use crate::models::{Record, RecordKind};

#[derive(Debug, Clone)]
pub enum AdminMessage {
    TabSelected(RecordKind),
    Refresh,
    Loaded {
        epoch: u64,
        results: Vec<(RecordKind, ApiResponse)>,
    },
    NewRecord,
    Edit(Record),
    Crud(CrudMessage),
}

/// Every record type in one tabbed CRUD view. All collections are fetched
/// together, so switching tabs never waits on the network.
#[derive(Debug)]
pub struct AdminDashboard {
    pub active_tab: RecordKind,
    pub view: CrudView,
}

impl AdminDashboard {
    pub fn new(client: &ApiClient) -> (Self, Task<AdminMessage>) {
        let mut dashboard = Self {
            active_tab: RecordKind::Student,
            view: CrudView::default(),
        };
        let task = dashboard.reload(client);
        (dashboard, task)
    }

    pub fn records(&self) -> &[Record] {
        self.view.collections.get(self.active_tab)
    }

    /// Starts a new load generation and returns the list calls for it.
    pub fn load_requests(&mut self) -> (u64, Vec<(RecordKind, ApiRequest)>) {
        let epoch = self.view.begin_load();
        let requests = RecordKind::ALL
            .iter()
            .map(|kind| (*kind, ApiRequest::new(kind.descriptor().list_action, json!({}))))
            .collect();
        (epoch, requests)
    }

    fn reload(&mut self, client: &ApiClient) -> Task<AdminMessage> {
        let (epoch, requests) = self.load_requests();
        crud::send_all(client, requests, move |results| AdminMessage::Loaded { epoch, results })
    }

    pub fn update(&mut self, message: AdminMessage, client: &ApiClient) -> Task<AdminMessage> {
        match message {
            AdminMessage::TabSelected(kind) => {
                self.active_tab = kind;
                self.view.form = None;
                Task::none()
            }
            AdminMessage::Refresh => self.reload(client),
            AdminMessage::Loaded { epoch, results } => {
                self.view.finish_load(epoch, results);
                Task::none()
            }
            AdminMessage::NewRecord => {
                self.view.form = Some(FormState::create(self.active_tab));
                Task::none()
            }
            AdminMessage::Edit(record) => {
                self.view.form = Some(FormState::edit(self.active_tab, &record));
                Task::none()
            }
            AdminMessage::Crud(message) => match self.view.update(message, Some(self.active_tab), client) {
                CrudStep::Done => Task::none(),
                CrudStep::Run(task) => task.map(AdminMessage::Crud),
                CrudStep::Reload => self.reload(client),
            },
        }
    }
}
