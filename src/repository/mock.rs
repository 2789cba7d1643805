//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::comment::{Comment, NewComment};
use crate::domain::expert::Expert;
use crate::domain::labels::{ReportStatus, UserStatus};
use crate::domain::post::Post;
use crate::domain::report::Report;
use crate::domain::types::{PostId, ReportId, UserId};
use crate::domain::user::User;
use crate::listing::mutation::{Acknowledgement, LikeState};
use crate::listing::pagination::Page;
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    ExpertReader, PostReader, PostWriter, ReportReader, ReportWriter, UserListQuery, UserReader,
    UserWriter,
};

mock! {
    pub Repository {}

    impl UserReader for Repository {
        fn list_users(&self, query: &UserListQuery) -> RepositoryResult<Page<User>>;
        fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
    }

    impl UserWriter for Repository {
        fn delete_user(&self, id: UserId) -> RepositoryResult<()>;
        fn update_user_status(&self, id: UserId, status: UserStatus) -> RepositoryResult<User>;
    }

    impl ReportReader for Repository {
        fn list_reports(&self) -> RepositoryResult<Vec<Report>>;
        fn get_report_by_id(&self, id: ReportId) -> RepositoryResult<Option<Report>>;
    }

    impl ReportWriter for Repository {
        fn update_report_status(
            &self,
            id: ReportId,
            status: ReportStatus,
        ) -> RepositoryResult<Report>;
        fn delete_report(&self, id: ReportId) -> RepositoryResult<()>;
    }

    impl ExpertReader for Repository {
        fn list_experts(&self) -> RepositoryResult<Vec<Expert>>;
    }

    impl PostReader for Repository {
        fn list_posts(&self, viewer: UserId) -> RepositoryResult<Vec<Post>>;
        fn get_post_by_id(&self, id: PostId, viewer: UserId) -> RepositoryResult<Option<Post>>;
        fn list_comments(&self, post_id: PostId) -> RepositoryResult<Vec<Comment>>;
    }

    impl PostWriter for Repository {
        fn toggle_like(
            &self,
            post_id: PostId,
            user_id: UserId,
        ) -> RepositoryResult<Acknowledgement<LikeState>>;
        fn delete_post(&self, id: PostId) -> RepositoryResult<()>;
        fn create_comment(&self, comment: &NewComment) -> RepositoryResult<Comment>;
    }
}
