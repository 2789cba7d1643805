//! Expert directory search.

use crate::domain::expert::Expert;
use crate::dto::ListingData;
use crate::forms::listing::ExpertListForm;
use crate::listing::refine::refine_page;
use crate::repository::ExpertReader;
use crate::services::{ServiceResult, load_listing};

/// The directory is fetched whole and refined locally.
pub fn list_experts<R>(
    repo: &R,
    form: ExpertListForm,
    page_size: usize,
) -> ServiceResult<ListingData<Expert>>
where
    R: ExpertReader + ?Sized,
{
    let query = form.into_query(page_size)?;

    let experts = repo.list_experts().map_err(|err| {
        log::error!("Failed to list experts: {err}");
        err
    })?;

    load_listing(query, |query| Ok(refine_page(&experts, query)))
}
