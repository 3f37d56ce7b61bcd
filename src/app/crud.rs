//! Plumbing shared by the role dashboards: the load/save/delete state
//! machine, remote calls as iced tasks and the delete confirmation.

use iced::Task;
use rfd::{AsyncMessageDialog, MessageButtons, MessageDialogResult, MessageLevel};
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use crate::api::{ApiClient, ApiError, ApiRequest, ApiResponse};
use crate::app::form::{FormMessage, FormState};
use crate::lookups::Collections;
use crate::models::RecordKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Loading,
    Idle,
}

/// Tag of one list call in a dashboard load: says where the rows go and
/// what to call them when they fail.
pub trait LoadTarget: Copy {
    fn title(self) -> &'static str;

    fn absorb(self, collections: &mut Collections, response: ApiResponse) -> Result<(), ApiError>;
}

impl LoadTarget for RecordKind {
    fn title(self) -> &'static str {
        RecordKind::title(self)
    }

    fn absorb(self, collections: &mut Collections, response: ApiResponse) -> Result<(), ApiError> {
        collections.absorb(self, response)
    }
}

#[derive(Debug, Clone)]
pub enum CrudMessage {
    Form(FormMessage),
    Saved(ApiResponse),
    DeleteRequested(String),
    DeleteAnswered {
        kind: RecordKind,
        key: String,
        confirmed: bool,
    },
    Deleted(ApiResponse),
}

/// What the owning dashboard does after a [`CrudMessage`].
pub enum CrudStep {
    Done,
    Run(Task<CrudMessage>),
    /// A save or delete went through; the dashboard refetches its lists.
    Reload,
}

/// Fetched rows, the open form and the notice line of one dashboard.
///
/// Every load gets a new epoch. Results tagged with an older one are
/// dropped, so the last load started is the one shown.
#[derive(Debug, Default)]
pub struct CrudView {
    pub phase: Phase,
    pub collections: Collections,
    pub form: Option<FormState>,
    pub notice: Option<String>,
    epoch: u64,
}

impl CrudView {
    /// Starts a new load generation and returns its epoch.
    pub fn begin_load(&mut self) -> u64 {
        self.epoch += 1;
        self.phase = Phase::Loading;
        self.epoch
    }

    /// Applies one load generation. Results of a superseded load are
    /// dropped and `false` is returned. A failed list keeps its previous
    /// rows and is named in the notice.
    pub fn finish_load<K: LoadTarget>(&mut self, epoch: u64, results: Vec<(K, ApiResponse)>) -> bool {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "dropping stale load");
            return false;
        }

        let mut failures = Vec::new();
        for (target, response) in results {
            if let Err(err) = target.absorb(&mut self.collections, response) {
                failures.push(format!("{}: {err}", target.title()));
            }
        }
        failures.sort();
        self.notice = (!failures.is_empty())
            .then(|| format!("Some data could not be loaded. {}", failures.join("; ")));
        self.phase = Phase::Idle;
        true
    }

    /// Closes the form on success; keeps it open with the message otherwise.
    /// Returns whether a refetch is due.
    pub fn finish_save(&mut self, response: ApiResponse) -> bool {
        if response.success {
            self.form = None;
            return true;
        }
        match self.form.as_mut() {
            Some(form) => form.fail(&response),
            None => self.notice = Some(response.error_message()),
        }
        false
    }

    pub fn answer_delete(&self, kind: RecordKind, key: &str, confirmed: bool) -> Option<ApiRequest> {
        if !confirmed {
            debug!(kind = %kind, key, "delete cancelled");
            return None;
        }
        info!(kind = %kind, key, "deleting record");
        Some(delete_request(kind, key))
    }

    pub fn finish_delete(&mut self, response: ApiResponse) -> bool {
        if response.success {
            self.notice = None;
            return true;
        }
        self.notice = Some(response.error_message());
        false
    }

    /// `deletable` is the record type the delete buttons currently act on,
    /// if any.
    pub fn update(&mut self, message: CrudMessage, deletable: Option<RecordKind>, client: &ApiClient) -> CrudStep {
        match message {
            CrudMessage::Form(FormMessage::Cancel) => {
                self.form = None;
                CrudStep::Done
            }
            CrudMessage::Form(FormMessage::Submit) => match self.form.as_mut().and_then(FormState::submit) {
                Some(request) => CrudStep::Run(send(client, request, CrudMessage::Saved)),
                None => CrudStep::Done,
            },
            CrudMessage::Form(message) => {
                if let Some(form) = self.form.as_mut() {
                    form.update(message);
                }
                CrudStep::Done
            }
            CrudMessage::Saved(response) => {
                if self.finish_save(response) {
                    CrudStep::Reload
                } else {
                    CrudStep::Done
                }
            }
            CrudMessage::DeleteRequested(key) => {
                let Some(kind) = deletable else {
                    return CrudStep::Done;
                };
                CrudStep::Run(Task::perform(confirm_delete(kind, key), move |(key, confirmed)| {
                    CrudMessage::DeleteAnswered {
                        kind,
                        key,
                        confirmed,
                    }
                }))
            }
            CrudMessage::DeleteAnswered {
                kind,
                key,
                confirmed,
            } => match self.answer_delete(kind, &key, confirmed) {
                Some(request) => CrudStep::Run(send(client, request, CrudMessage::Deleted)),
                None => CrudStep::Done,
            },
            CrudMessage::Deleted(response) => {
                if self.finish_delete(response) {
                    CrudStep::Reload
                } else {
                    CrudStep::Done
                }
            }
        }
    }
}

pub fn send<M>(client: &ApiClient, request: ApiRequest, to_message: fn(ApiResponse) -> M) -> Task<M>
where
    M: Send + 'static,
{
    let client = client.clone();
    Task::perform(async move { client.send(request).await }, to_message)
}

/// Fans out every request and produces one message once all have settled.
pub fn send_all<K, M>(
    client: &ApiClient,
    requests: Vec<(K, ApiRequest)>,
    to_message: impl Fn(Vec<(K, ApiResponse)>) -> M + Send + 'static,
) -> Task<M>
where
    K: Send + 'static,
    M: Send + 'static,
{
    let client = client.clone();
    Task::perform(async move { client.send_all(requests).await }, to_message)
}

pub fn delete_request(kind: RecordKind, key: &str) -> ApiRequest {
    let descriptor = kind.descriptor();
    let mut payload = Map::new();
    payload.insert(descriptor.key_field.to_string(), json!(key));
    ApiRequest::new(descriptor.delete_action, Value::Object(payload))
}

/// Blocking yes/no prompt before anything is deleted.
pub async fn confirm_delete(kind: RecordKind, key: String) -> (String, bool) {
    let answer = AsyncMessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title(format!("Delete {kind}"))
        .set_description(format!("Delete {kind} {key}? This cannot be undone."))
        .set_buttons(MessageButtons::YesNo)
        .show()
        .await;
    (key, matches!(answer, MessageDialogResult::Yes))
}
