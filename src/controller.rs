use crate::{
    auth::{
        Principal,
        gateway::{SessionGateway, SignInCallback},
    },
    data::student::{Student, StudentDraft, StudentId},
    directory::{DirectoryBackend, DirectoryClient},
    error::{RosterError, StudentNotFoundSnafu},
};
use std::sync::Arc;
use url::Url;

/// Which screen the single page is on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewState {
    LoggedOut,
    /// list shown, form hidden
    Viewing,
    /// form shown for a brand new student
    Composing,
    /// form shown for an existing student
    Editing { target: Student },
}

/// Owns every bit of UI state and is the only thing that changes it.
///
/// All user intents come in through the methods here. Remote failures are
/// logged and kept as a [`ViewController::notice`]; they never escape.
pub struct ViewController {
    gateway: SessionGateway,
    directory: DirectoryClient,
    state: ViewState,
    students: Vec<Student>,
    draft: StudentDraft,
    notice: Option<String>,
    clear_on_sign_out: bool,
}

impl ViewController {
    pub fn new(
        gateway: SessionGateway,
        backend: Arc<dyn DirectoryBackend>,
        clear_on_sign_out: bool,
    ) -> Self {
        let directory = DirectoryClient::new(backend, gateway.caller_slot());
        Self {
            gateway,
            directory,
            state: ViewState::LoggedOut,
            students: Vec::new(),
            draft: StudentDraft::default(),
            notice: None,
            clear_on_sign_out,
        }
    }

    #[cfg(test)]
    pub const fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn principal(&self) -> Option<Principal> {
        self.gateway.principal()
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub const fn draft(&self) -> &StudentDraft {
        &self.draft
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.gateway.is_authenticated()
    }

    pub const fn is_form_shown(&self) -> bool {
        matches!(self.state, ViewState::Composing | ViewState::Editing { .. })
    }

    pub const fn editing_target(&self) -> Option<&Student> {
        match &self.state {
            ViewState::Editing { target } => Some(target),
            _ => None,
        }
    }

    /// Startup only. Lands on an empty, not yet fetched list if a session exists.
    pub async fn restore_session(&mut self) {
        if let Some(principal) = self.gateway.restore_session().await {
            self.signed_in(&principal);
        }
    }

    /// Returns where to send the browser, or `None` if we're already signed in.
    pub fn begin_sign_in(&mut self, callback: &Url) -> Option<Url> {
        if self.is_signed_in() {
            debug!("Sign in requested while already signed in");
            return None;
        }
        Some(self.gateway.begin_sign_in(callback))
    }

    pub async fn complete_sign_in(&mut self, callback: SignInCallback) {
        if let Some(principal) = self.gateway.complete_sign_in(callback).await {
            self.signed_in(&principal);
        }
    }

    fn signed_in(&mut self, principal: &Principal) {
        debug!(%principal, "Showing the student list");
        self.state = ViewState::Viewing;
        self.notice = None;
    }

    pub async fn sign_out(&mut self) {
        if let Err(e) = self.gateway.sign_out().await {
            warn!(?e, "Provider did not cleanly end the session");
        }

        self.state = ViewState::LoggedOut;
        self.notice = None;
        if self.clear_on_sign_out {
            self.students.clear();
            self.draft = StudentDraft::default();
        }
    }

    pub fn request_add(&mut self) {
        if !self.ensure_signed_in("add") {
            return;
        }
        self.draft = StudentDraft::default();
        self.state = ViewState::Composing;
    }

    pub fn request_edit(&mut self, id: StudentId) {
        if !self.ensure_signed_in("edit") {
            return;
        }
        let Some(target) = self.students.iter().find(|s| s.id == id).cloned() else {
            self.failed("find student to edit", StudentNotFoundSnafu { id }.build());
            return;
        };

        self.draft = StudentDraft::from(&target);
        self.state = ViewState::Editing { target };
    }

    /// Sends the form. Updates when editing, creates otherwise; on failure the
    /// form stays open holding what was submitted.
    pub async fn submit(&mut self, draft: StudentDraft) {
        if !self.ensure_signed_in("submit") {
            return;
        }
        if !self.is_form_shown() {
            warn!("Form submitted while no form was open, ignoring");
            return;
        }

        self.draft = draft;
        if let Err(e) = self.draft.ensure_complete() {
            self.failed("submit student", e);
            return;
        }

        let result = match &self.state {
            ViewState::Editing { target } => {
                info!(id = target.id, "Updating student");
                self.directory.update(target.id, &self.draft).await
            }
            _ => {
                info!("Adding student");
                self.directory.create(&self.draft).await
            }
        };

        match result {
            Ok(()) => {
                self.draft = StudentDraft::default();
                self.state = ViewState::Viewing;
                self.notice = None;
                self.refresh().await;
            }
            Err(e) => self.failed("save student", e),
        }
    }

    pub async fn delete(&mut self, id: StudentId) {
        if !self.ensure_signed_in("delete") {
            return;
        }

        match self.directory.delete(id).await {
            Ok(()) => {
                info!(id, "Deleted student");
                if self.editing_target().is_some_and(|target| target.id == id) {
                    self.draft = StudentDraft::default();
                    self.state = ViewState::Viewing;
                }
                self.notice = None;
                self.refresh().await;
            }
            Err(e) => self.failed("delete student", e),
        }
    }

    /// Re-fetches and closes the form, so it doubles as cancel.
    pub async fn view_students(&mut self) {
        if !self.ensure_signed_in("view") {
            return;
        }
        self.draft = StudentDraft::default();
        self.state = ViewState::Viewing;
        self.notice = None;
        self.refresh().await;
    }

    async fn refresh(&mut self) {
        match self.directory.list().await {
            Ok(students) => {
                debug!(count = students.len(), "Fetched students");
                self.students = students;
            }
            Err(e) => self.failed("fetch students", e),
        }
    }

    fn ensure_signed_in(&self, action: &'static str) -> bool {
        if self.is_signed_in() {
            true
        } else {
            warn!(action, "Ignoring action while signed out");
            false
        }
    }

    fn failed(&mut self, action: &'static str, e: RosterError) {
        error!(?e, action, "Failed");
        self.notice = Some(format!("Failed to {action}: {e}"));
    }
}
