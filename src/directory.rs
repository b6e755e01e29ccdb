use crate::{
    auth::Identity,
    data::student::{Student, StudentDraft, StudentId},
    error::{RosterResult, UnauthenticatedSnafu},
};
use async_trait::async_trait;
use snafu::OptionExt;
use std::sync::Arc;
use tokio::sync::watch;

pub mod http;
pub mod memory;

/// The remote student directory. Every call is made on behalf of `caller`.
#[async_trait]
pub trait DirectoryBackend: Send + Sync {
    async fn get_students(&self, caller: &Identity) -> RosterResult<Vec<Student>>;
    async fn add_student(&self, caller: &Identity, draft: &StudentDraft) -> RosterResult<()>;
    async fn update_student(
        &self,
        caller: &Identity,
        id: StudentId,
        draft: &StudentDraft,
    ) -> RosterResult<()>;
    async fn delete_student(&self, caller: &Identity, id: StudentId) -> RosterResult<()>;
}

/// Binds a [`DirectoryBackend`] to whoever is currently signed in.
///
/// The caller slot is fed by the session gateway, so there is nothing to
/// rebind by hand. With nobody signed in every call fails with
/// [`crate::error::RosterError::Unauthenticated`].
#[derive(Clone)]
pub struct DirectoryClient {
    backend: Arc<dyn DirectoryBackend>,
    caller: watch::Receiver<Option<Identity>>,
}

impl DirectoryClient {
    pub fn new(
        backend: Arc<dyn DirectoryBackend>,
        caller: watch::Receiver<Option<Identity>>,
    ) -> Self {
        Self { backend, caller }
    }

    fn current_caller(&self) -> RosterResult<Identity> {
        self.caller.borrow().clone().context(UnauthenticatedSnafu)
    }

    pub async fn list(&self) -> RosterResult<Vec<Student>> {
        let caller = self.current_caller()?;
        self.backend.get_students(&caller).await
    }

    pub async fn create(&self, draft: &StudentDraft) -> RosterResult<()> {
        let caller = self.current_caller()?;
        self.backend.add_student(&caller, draft).await
    }

    pub async fn update(&self, id: StudentId, draft: &StudentDraft) -> RosterResult<()> {
        let caller = self.current_caller()?;
        self.backend.update_student(&caller, id, draft).await
    }

    pub async fn delete(&self, id: StudentId) -> RosterResult<()> {
        let caller = self.current_caller()?;
        self.backend.delete_student(&caller, id).await
    }
}
