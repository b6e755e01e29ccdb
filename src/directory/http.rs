use crate::{
    auth::Identity,
    data::student::{Student, StudentDraft, StudentId},
    directory::DirectoryBackend,
    error::{
        DirectoryRequestSnafu, DirectoryStatusSnafu, ParseUrlSnafu, RosterResult,
        StudentNotFoundSnafu,
    },
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use snafu::ResultExt;
use url::Url;

pub const CALLER_PRINCIPAL_HEADER: &str = "X-Caller-Principal";

/// Talks JSON to a remote directory rooted at `base`:
/// `GET/POST {base}/students`, `PUT/DELETE {base}/students/{id}`.
#[derive(Clone, Debug)]
pub struct HttpDirectory {
    http: Client,
    base: Url,
}

impl HttpDirectory {
    pub fn new(base: &Url) -> Self {
        let mut base = base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Self {
            http: Client::new(),
            base,
        }
    }

    fn students_url(&self, id: Option<StudentId>) -> RosterResult<Url> {
        let relative = match id {
            Some(id) => format!("students/{id}"),
            None => "students".to_string(),
        };
        self.base.join(&relative).context(ParseUrlSnafu {
            original: relative,
        })
    }

    async fn send(caller: &Identity, request: RequestBuilder) -> RosterResult<Response> {
        request
            .bearer_auth(caller.delegation.expose_secret())
            .header(CALLER_PRINCIPAL_HEADER, caller.principal.as_str())
            .send()
            .await
            .context(DirectoryRequestSnafu)
    }

    fn check_status(response: &Response, id: Option<StudentId>) -> RosterResult<()> {
        let status = response.status();
        match (status, id) {
            (s, _) if s.is_success() => Ok(()),
            (StatusCode::NOT_FOUND, Some(id)) => StudentNotFoundSnafu { id }.fail(),
            _ => DirectoryStatusSnafu { status }.fail(),
        }
    }
}

#[async_trait]
impl DirectoryBackend for HttpDirectory {
    async fn get_students(&self, caller: &Identity) -> RosterResult<Vec<Student>> {
        let url = self.students_url(None)?;
        let response = Self::send(caller, self.http.get(url)).await?;
        Self::check_status(&response, None)?;
        response.json().await.context(DirectoryRequestSnafu)
    }

    async fn add_student(&self, caller: &Identity, draft: &StudentDraft) -> RosterResult<()> {
        let url = self.students_url(None)?;
        let response = Self::send(caller, self.http.post(url).json(draft)).await?;
        Self::check_status(&response, None)
    }

    async fn update_student(
        &self,
        caller: &Identity,
        id: StudentId,
        draft: &StudentDraft,
    ) -> RosterResult<()> {
        let url = self.students_url(Some(id))?;
        let response = Self::send(caller, self.http.put(url).json(draft)).await?;
        Self::check_status(&response, Some(id))
    }

    async fn delete_student(&self, caller: &Identity, id: StudentId) -> RosterResult<()> {
        let url = self.students_url(Some(id))?;
        let response = Self::send(caller, self.http.delete(url)).await?;
        Self::check_status(&response, Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::gateway::tests::live_identity,
        data::student::School,
        directory::memory::MemoryDirectory,
        error::RosterError,
    };
    use axum::{
        Json, Router,
        extract::{Path, State},
        http::{HeaderMap, StatusCode as AxumStatus, header::AUTHORIZATION},
        routing::{get, put},
    };
    use secrecy::SecretString;
    use std::sync::Arc;
    use tokio::net::TcpListener;

    type Shared = State<Arc<MemoryDirectory>>;

    fn caller_from(headers: &HeaderMap) -> Result<Identity, AxumStatus> {
        let principal = headers
            .get(CALLER_PRINCIPAL_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AxumStatus::UNAUTHORIZED)?;
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AxumStatus::UNAUTHORIZED)?;

        let mut identity = live_identity(principal);
        identity.delegation = SecretString::from(token);
        Ok(identity)
    }

    fn status_of(e: &RosterError) -> AxumStatus {
        match e {
            RosterError::StudentNotFound { .. } => AxumStatus::NOT_FOUND,
            _ => AxumStatus::INTERNAL_SERVER_ERROR,
        }
    }

    async fn list(
        State(dir): Shared,
        headers: HeaderMap,
    ) -> Result<Json<Vec<Student>>, AxumStatus> {
        let caller = caller_from(&headers)?;
        dir.get_students(&caller)
            .await
            .map(Json)
            .map_err(|e| status_of(&e))
    }

    async fn add(
        State(dir): Shared,
        headers: HeaderMap,
        Json(draft): Json<StudentDraft>,
    ) -> Result<(), AxumStatus> {
        let caller = caller_from(&headers)?;
        dir.add_student(&caller, &draft).await.map_err(|e| status_of(&e))
    }

    async fn update(
        State(dir): Shared,
        headers: HeaderMap,
        Path(id): Path<StudentId>,
        Json(draft): Json<StudentDraft>,
    ) -> Result<(), AxumStatus> {
        let caller = caller_from(&headers)?;
        dir.update_student(&caller, id, &draft)
            .await
            .map_err(|e| status_of(&e))
    }

    async fn remove(
        State(dir): Shared,
        headers: HeaderMap,
        Path(id): Path<StudentId>,
    ) -> Result<(), AxumStatus> {
        let caller = caller_from(&headers)?;
        dir.delete_student(&caller, id)
            .await
            .map_err(|e| status_of(&e))
    }

    async fn serve(directory: Arc<MemoryDirectory>) -> Url {
        let app = Router::new()
            .route("/api/students", get(list).post(add))
            .route("/api/students/{id}", put(update).delete(remove))
            .with_state(directory);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Url::parse(&format!("http://{addr}/api")).unwrap()
    }

    fn draft(first: &str, school: School) -> StudentDraft {
        StudentDraft {
            first_name: first.into(),
            last_name: "Uwase".into(),
            school,
        }
    }

    #[test]
    fn base_without_trailing_slash_still_nests() {
        let directory = HttpDirectory::new(&Url::parse("http://dir.test/api/v1").unwrap());
        assert_eq!(
            directory.students_url(Some(7)).unwrap().as_str(),
            "http://dir.test/api/v1/students/7"
        );
        assert_eq!(
            directory.students_url(None).unwrap().as_str(),
            "http://dir.test/api/v1/students"
        );
    }

    #[tokio::test]
    async fn crud_over_http() {
        let backing = Arc::new(MemoryDirectory::default());
        let base = serve(backing.clone()).await;
        let directory = HttpDirectory::new(&base);
        let caller = live_identity("2vxsx-fae");

        directory
            .add_student(&caller, &draft("Alice", School::Tumba))
            .await
            .unwrap();
        let students = directory.get_students(&caller).await.unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].first_name, "Alice");
        assert_eq!(students[0].school, School::Tumba);

        let id = students[0].id;
        directory
            .update_student(&caller, id, &draft("Alice", School::Musanze))
            .await
            .unwrap();
        assert_eq!(backing.snapshot().await[0].school, School::Musanze);

        directory.delete_student(&caller, id).await.unwrap();
        assert!(directory.get_students(&caller).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_ids_come_back_as_not_found() {
        let base = serve(Arc::new(MemoryDirectory::default())).await;
        let directory = HttpDirectory::new(&base);
        let caller = live_identity("2vxsx-fae");

        assert!(matches!(
            directory.delete_student(&caller, 42).await,
            Err(RosterError::StudentNotFound { id: 42 })
        ));
        assert!(matches!(
            directory
                .update_student(&caller, 42, &draft("X", School::Ngoma))
                .await,
            Err(RosterError::StudentNotFound { id: 42 })
        ));
    }

    #[tokio::test]
    async fn unreachable_directory_is_a_request_error() {
        // bind then drop, so nothing is listening there any more
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let directory = HttpDirectory::new(&Url::parse(&format!("http://{addr}/")).unwrap());
        assert!(matches!(
            directory.get_students(&live_identity("2vxsx-fae")).await,
            Err(RosterError::DirectoryRequest { .. })
        ));
    }
}
