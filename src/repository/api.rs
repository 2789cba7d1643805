//! Backend REST client.
//!
//! Calls are blocking and must run off the async workers (`web::block`).

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::domain::comment::{Comment, NewComment};
use crate::domain::expert::Expert;
use crate::domain::labels::{Labeled, ReportStatus, UserStatus};
use crate::domain::post::Post;
use crate::domain::report::Report;
use crate::domain::types::{PostId, ReportId, TypeConstraintError, UserId};
use crate::domain::user::User;
use crate::listing::mutation::{Acknowledgement, LikeState};
use crate::listing::pagination::Page;
use crate::models::comment::{CommentRecord, NewCommentBody};
use crate::models::expert::ExpertRecord;
use crate::models::like::LikeResponse;
use crate::models::page::PageEnvelope;
use crate::models::post::PostRecord;
use crate::models::report::ReportRecord;
use crate::models::user::{StatusChangeBody, UserRecord};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    ExpertReader, PostReader, PostWriter, ReportReader, ReportWriter, UserListQuery, UserReader,
    UserWriter,
};

impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RepositoryError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            RepositoryError::Status {
                code: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            RepositoryError::Transport(err.to_string())
        }
    }
}

/// Repository backed by the platform's REST API.
///
/// Cloning is cheap; [`ApiRepository::with_token`] derives a per-request
/// copy that forwards the signed-in user's bearer token.
#[derive(Clone, Debug)]
pub struct ApiRepository {
    client: Client,
    base_url: Arc<str>,
    token: Option<Arc<str>>,
}

impl ApiRepository {
    /// Builds the HTTP client. Must not be called from an async context.
    pub fn new(base_url: &str, timeout: Duration) -> RepositoryResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            RepositoryError::Unexpected(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            token: None,
        })
    }

    pub fn with_token(&self, token: &str) -> Self {
        Self {
            token: Some(Arc::from(token)),
            ..self.clone()
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request_id = Uuid::new_v4();
        log::debug!("{method} {path} [{request_id}]");

        let builder = self
            .client
            .request(method, self.url(path))
            .header("X-Request-Id", request_id.to_string());

        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn send(&self, builder: RequestBuilder) -> RepositoryResult<Response> {
        let response = builder.send()?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(RepositoryError::NotFound);
        }
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(RepositoryError::Status {
                code: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    fn fetch_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> RepositoryResult<T> {
        self.send(builder)?
            .json::<T>()
            .map_err(|e| RepositoryError::Decode(e.to_string()))
    }
}

/// Turns a 404 into `None`.
fn optional<T>(result: RepositoryResult<T>) -> RepositoryResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(RepositoryError::NotFound) => Ok(None),
        Err(err) => Err(err),
    }
}

fn convert_all<R, T>(records: Vec<R>) -> RepositoryResult<Vec<T>>
where
    T: TryFrom<R, Error = TypeConstraintError>,
{
    records
        .into_iter()
        .map(|record| T::try_from(record).map_err(RepositoryError::from))
        .collect()
}

impl UserReader for ApiRepository {
    fn list_users(&self, query: &UserListQuery) -> RepositoryResult<Page<User>> {
        let mut params: Vec<(&str, String)> = vec![
            ("page", (query.pagination.page - 1).to_string()),
            ("size", query.pagination.per_page.to_string()),
        ];
        if let Some(role) = query.role {
            params.push(("userRole", role.backend_key().to_string()));
        }
        if let Some(status) = query.status {
            params.push(("userStatus", status.backend_key().to_string()));
        }
        if let Some(search) = &query.search {
            params.push(("search", search.clone()));
        }

        let envelope: PageEnvelope<UserRecord> =
            self.fetch_json(self.request(Method::GET, "users").query(&params))?;

        envelope.try_into_page(|record| User::try_from(record).map_err(RepositoryError::from))
    }

    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        let record: Option<UserRecord> =
            optional(self.fetch_json(self.request(Method::GET, &format!("users/{id}"))))?;
        record
            .map(|record| User::try_from(record).map_err(RepositoryError::from))
            .transpose()
    }
}

impl UserWriter for ApiRepository {
    fn delete_user(&self, id: UserId) -> RepositoryResult<()> {
        self.send(self.request(Method::DELETE, &format!("users/{id}")))?;
        Ok(())
    }

    fn update_user_status(&self, id: UserId, status: UserStatus) -> RepositoryResult<User> {
        let record: UserRecord = self.fetch_json(
            self.request(Method::PATCH, &format!("users/{id}/status"))
                .json(&StatusChangeBody { status }),
        )?;
        Ok(User::try_from(record)?)
    }
}

impl ReportReader for ApiRepository {
    fn list_reports(&self) -> RepositoryResult<Vec<Report>> {
        let records: Vec<ReportRecord> = self.fetch_json(self.request(Method::GET, "reports"))?;
        convert_all(records)
    }

    fn get_report_by_id(&self, id: ReportId) -> RepositoryResult<Option<Report>> {
        let record: Option<ReportRecord> =
            optional(self.fetch_json(self.request(Method::GET, &format!("reports/{id}"))))?;
        record
            .map(|record| Report::try_from(record).map_err(RepositoryError::from))
            .transpose()
    }
}

impl ReportWriter for ApiRepository {
    fn update_report_status(&self, id: ReportId, status: ReportStatus) -> RepositoryResult<Report> {
        let record: ReportRecord = self.fetch_json(
            self.request(Method::PATCH, &format!("reports/{id}/status"))
                .json(&StatusChangeBody { status }),
        )?;
        Ok(Report::try_from(record)?)
    }

    fn delete_report(&self, id: ReportId) -> RepositoryResult<()> {
        self.send(self.request(Method::DELETE, &format!("reports/{id}")))?;
        Ok(())
    }
}

impl ExpertReader for ApiRepository {
    fn list_experts(&self) -> RepositoryResult<Vec<Expert>> {
        let records: Vec<ExpertRecord> = self.fetch_json(self.request(Method::GET, "experts"))?;
        convert_all(records)
    }
}

impl PostReader for ApiRepository {
    fn list_posts(&self, viewer: UserId) -> RepositoryResult<Vec<Post>> {
        let records: Vec<PostRecord> = self.fetch_json(
            self.request(Method::GET, "posts")
                .query(&[("userId", viewer.get())]),
        )?;
        convert_all(records)
    }

    fn get_post_by_id(&self, id: PostId, viewer: UserId) -> RepositoryResult<Option<Post>> {
        let record: Option<PostRecord> = optional(self.fetch_json(
            self.request(Method::GET, &format!("posts/{id}"))
                .query(&[("userId", viewer.get())]),
        ))?;
        record
            .map(|record| Post::try_from(record).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_comments(&self, post_id: PostId) -> RepositoryResult<Vec<Comment>> {
        let records: Vec<CommentRecord> =
            self.fetch_json(self.request(Method::GET, &format!("posts/{post_id}/comments")))?;
        convert_all(records)
    }
}

impl PostWriter for ApiRepository {
    /// A success status with an unreadable body is reported as ambiguous,
    /// not as a failure: the toggle did happen server-side.
    fn toggle_like(
        &self,
        post_id: PostId,
        user_id: UserId,
    ) -> RepositoryResult<Acknowledgement<LikeState>> {
        let response = self.send(
            self.request(Method::POST, &format!("posts/{post_id}/like"))
                .query(&[("userId", user_id.get())]),
        )?;
        let body = response.text().unwrap_or_default();

        match serde_json::from_str::<LikeResponse>(&body) {
            Ok(answer) => Ok(answer.into_acknowledgement()),
            Err(err) => {
                log::warn!("Unreadable like acknowledgement for post {post_id}: {err}");
                Ok(Acknowledgement::Ambiguous)
            }
        }
    }

    fn delete_post(&self, id: PostId) -> RepositoryResult<()> {
        self.send(self.request(Method::DELETE, &format!("posts/{id}")))?;
        Ok(())
    }

    fn create_comment(&self, comment: &NewComment) -> RepositoryResult<Comment> {
        let record: CommentRecord = self.fetch_json(
            self.request(Method::POST, &format!("posts/{}/comments", comment.post_id))
                .json(&NewCommentBody::from(comment)),
        )?;
        Ok(Comment::try_from(record)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use super::*;
    use crate::domain::labels::UserRole;

    /// Serves one canned HTTP response and hands back the request line.
    fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}/api", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                if header == "\r\n" || header.is_empty() {
                    break;
                }
            }
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            request_line
        });

        (base_url, handle)
    }

    fn repository(base_url: &str) -> ApiRepository {
        ApiRepository::new(base_url, Duration::from_secs(5))
            .unwrap()
            .with_token("token")
    }

    #[test]
    fn list_users_sends_backend_filters_and_reads_envelope() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"content":[{"id":3,"fullName":"John Doe","email":"john@example.com",
                "role":"PROJECT_MEMBER","status":"ACTIVE","createdAt":"2024-01-05T08:00:00"}],
                "totalPages":2,"totalElements":11,"numberOfElements":1,
                "pageable":{"pageNumber":1,"pageSize":10}}"#,
        );

        let query = UserListQuery::new(10)
            .search("john")
            .role(UserRole::Member)
            .paginate(2, 10);
        let page = repository(&base_url).list_users(&query).unwrap();

        let request_line = server.join().unwrap();
        assert!(request_line.starts_with("GET /api/users?"));
        assert!(request_line.contains("page=1"));
        assert!(request_line.contains("size=10"));
        assert!(request_line.contains("userRole=PROJECT_MEMBER"));
        assert!(request_line.contains("search=john"));
        assert!(!request_line.contains("userStatus"));

        assert_eq!(page.page_number, 1);
        assert_eq!(page.total_items, 11);
        assert_eq!(page.items[0].full_name.as_str(), "John Doe");
    }

    #[test]
    fn missing_user_is_none() {
        let (base_url, server) = serve_once("404 Not Found", "");
        let user = repository(&base_url)
            .get_user_by_id(UserId::new(9).unwrap())
            .unwrap();
        server.join().unwrap();
        assert!(user.is_none());
    }

    #[test]
    fn error_status_is_reported_with_code() {
        let (base_url, server) = serve_once("403 Forbidden", "denied");
        let err = repository(&base_url)
            .delete_user(UserId::new(9).unwrap())
            .unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, RepositoryError::Status { code: 403, .. }));
        assert!(err.is_authorization());
    }

    #[test]
    fn malformed_like_answer_is_ambiguous() {
        let (base_url, server) = serve_once("200 OK", "ok");
        let ack = repository(&base_url)
            .toggle_like(PostId::new(4).unwrap(), UserId::new(2).unwrap())
            .unwrap();
        let request_line = server.join().unwrap();
        assert!(request_line.starts_with("POST /api/posts/4/like?userId=2"));
        assert_eq!(ack, Acknowledgement::Ambiguous);
    }

    #[test]
    fn unreachable_backend_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = repository(&base_url).list_experts().unwrap_err();
        assert!(matches!(err, RepositoryError::Transport(_)));
    }
}
