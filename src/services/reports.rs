//! Services behind the moderation report queue.

use crate::domain::labels::ReportStatus;
use crate::domain::report::Report;
use crate::domain::types::ReportId;
use crate::dto::ListingData;
use crate::forms::listing::ReportListForm;
use crate::forms::moderation::{ConfirmForm, StatusForm, StatusPayload};
use crate::listing::mutation::PendingMutations;
use crate::listing::refine::refine_page;
use crate::models::auth::AuthenticatedUser;
use crate::repository::{ReportReader, ReportWriter};
use crate::services::{
    RowAction, ServiceError, ServiceResult, claim_row, ensure_any_role, ensure_confirmed, ensure_role,
    load_listing,
};
use crate::{ADMIN_ROLE, MODERATOR_ROLE};

const STAFF_ROLES: [&str; 2] = [ADMIN_ROLE, MODERATOR_ROLE];

/// Fetches every report and refines it locally.
pub fn list_reports<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: ReportListForm,
    page_size: usize,
) -> ServiceResult<ListingData<Report>>
where
    R: ReportReader + ?Sized,
{
    ensure_any_role(user, &STAFF_ROLES)?;

    let query = form.into_query(page_size)?;

    let reports = repo.list_reports().map_err(|err| {
        log::error!("Failed to list reports: {err}");
        err
    })?;

    load_listing(query, |query| Ok(refine_page(&reports, query)))
}

/// Moves an open report to a new status. Closed reports answer with a
/// conflict.
pub fn update_report_status<R>(
    repo: &R,
    user: &AuthenticatedUser,
    pending: &PendingMutations<RowAction>,
    report_id: i64,
    form: StatusForm,
) -> ServiceResult<Report>
where
    R: ReportReader + ReportWriter + ?Sized,
{
    ensure_any_role(user, &STAFF_ROLES)?;

    let id = ReportId::new(report_id)?;
    let payload = StatusPayload::<ReportStatus>::try_from(form)?;

    let _guard = claim_row(pending, RowAction::ReportStatus(id))?;

    let current = repo.get_report_by_id(id)?.ok_or(ServiceError::NotFound)?;
    if current.is_closed() {
        return Err(ServiceError::Conflict(format!(
            "Report {id} is already {}",
            current.status
        )));
    }

    let report = repo.update_report_status(id, payload.status).map_err(|err| {
        log::error!("Failed to update report {id}: {err}");
        err
    })?;

    Ok(report)
}

/// Deletes a report after explicit confirmation.
pub fn delete_report<R>(
    repo: &R,
    user: &AuthenticatedUser,
    pending: &PendingMutations<RowAction>,
    report_id: i64,
    form: ConfirmForm,
) -> ServiceResult<()>
where
    R: ReportWriter + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let id = ReportId::new(report_id)?;

    ensure_confirmed(&form)?;

    let _guard = claim_row(pending, RowAction::DeleteReport(id))?;

    repo.delete_report(id).map_err(|err| {
        log::error!("Failed to delete report {id}: {err}");
        err
    })?;

    Ok(())
}
