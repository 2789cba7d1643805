//! Stateful list view: owns the query, the displayed rows and the
//! loading/error flags, and reconciles fetch responses and row mutations.

use std::collections::HashSet;
use std::fmt::Display;

use serde::Serialize;

use crate::listing::Identified;
use crate::listing::mutation::{
    Acknowledgement, LikeState, Likeable, MutationError, Optimistic,
};
use crate::listing::pagination::{self, Page, Paginated, Resync, page_window, resync};
use crate::listing::query::{FilterValue, ListQuery, SortKey};

/// Anything able to answer a [`ListQuery`] with one page of rows.
pub trait ListSource<T> {
    type Error: Display;

    fn fetch(&self, query: &ListQuery) -> Result<Page<T>, Self::Error>;
}

impl<T, E, F> ListSource<T> for F
where
    F: Fn(&ListQuery) -> Result<Page<T>, E>,
    E: Display,
{
    type Error = E;

    fn fetch(&self, query: &ListQuery) -> Result<Page<T>, E> {
        self(query)
    }
}

/// Lifecycle of a list view. `Idle` only before the first fetch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Errored(String),
}

/// Handle for one issued fetch. Only the most recent ticket is honoured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    query: ListQuery,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Snapshot of the query the fetch was issued for.
    pub fn query(&self) -> &ListQuery {
        &self.query
    }
}

/// What completing a fetch did to the view.
#[derive(Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Rows replaced with the response.
    Applied,
    /// Rows replaced and the UI page moved to the page the backend answered.
    Resynced { from: usize, to: usize },
    /// The requested page was past the end; a fetch of the last page is due.
    Refetch(FetchTicket),
    /// A newer fetch was issued meanwhile; the response was dropped.
    Stale,
    /// The fetch failed; previous rows are still shown.
    Failed(String),
}

/// Pending optimistic like toggle.
#[derive(Debug)]
pub struct LikeTicket<Id> {
    id: Id,
    update: Optimistic<LikeState>,
}

impl<Id: Copy> LikeTicket<Id> {
    pub fn id(&self) -> Id {
        self.id
    }

    /// Value the row showed before the optimistic flip.
    pub fn pre_image(&self) -> LikeState {
        *self.update.pre_image()
    }
}

/// How a finished like toggle was reconciled.
#[derive(Debug, PartialEq, Eq)]
pub enum LikeResolution<Id> {
    Confirmed(LikeState),
    /// Server accepted the call but its answer was unusable; refetch this row.
    NeedsRefresh(Id),
}

/// Pending confirmed delete.
#[derive(Debug)]
pub struct DeleteTicket<Id> {
    id: Id,
}

impl<Id: Copy> DeleteTicket<Id> {
    pub fn id(&self) -> Id {
        self.id
    }
}

/// List state of a single page component.
#[derive(Debug)]
pub struct ListView<T: Identified> {
    query: ListQuery,
    rows: Vec<T>,
    total_items: usize,
    total_pages: usize,
    state: LoadState,
    generation: u64,
    in_flight: HashSet<T::Id>,
}

impl<T: Identified> ListView<T> {
    pub fn new(query: ListQuery) -> Self {
        Self {
            query,
            rows: Vec::new(),
            total_items: 0,
            total_pages: 0,
            state: LoadState::Idle,
            generation: 0,
            in_flight: HashSet::new(),
        }
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn row(&self, id: T::Id) -> Option<&T> {
        self.rows.iter().find(|row| row.id() == id)
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Errored(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_pending(&self, id: T::Id) -> bool {
        self.in_flight.contains(&id)
    }

    /// Page numbers to render as paginator buttons.
    pub fn page_window(&self) -> Vec<usize> {
        page_window(self.query.page(), self.total_pages)
    }

    pub fn has_previous(&self) -> bool {
        pagination::has_previous(self.query.page())
    }

    pub fn has_next(&self) -> bool {
        pagination::has_next(self.query.page(), self.total_pages)
    }

    /// Starts a fetch for the current query, superseding any fetch in flight.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.state = LoadState::Loading;
        log::debug!(
            "list fetch #{} for page {}",
            self.generation,
            self.query.page()
        );
        FetchTicket {
            generation: self.generation,
            query: self.query.clone(),
        }
    }

    /// Applies `change` to the query and starts a fetch when it changed.
    pub fn update_query(&mut self, change: impl FnOnce(&mut ListQuery) -> bool) -> Option<FetchTicket> {
        if change(&mut self.query) {
            Some(self.begin_fetch())
        } else {
            None
        }
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) -> Option<FetchTicket> {
        self.update_query(|query| query.set_search_term(term))
    }

    pub fn set_filter(&mut self, key: &str, value: FilterValue) -> Option<FetchTicket> {
        self.update_query(|query| query.set_filter(key, value))
    }

    pub fn set_sort_key(&mut self, sort_key: SortKey) -> Option<FetchTicket> {
        self.update_query(|query| query.set_sort_key(sort_key))
    }

    /// Moves to `page`, clamped into `[1, total_pages]`.
    pub fn go_to_page(&mut self, page: usize) -> Option<FetchTicket> {
        let page = page.clamp(1, self.total_pages.max(1));
        self.update_query(|query| query.set_page(page))
    }

    pub fn next_page(&mut self) -> Option<FetchTicket> {
        let page = pagination::next_page(self.query.page(), self.total_pages);
        self.go_to_page(page)
    }

    pub fn previous_page(&mut self) -> Option<FetchTicket> {
        let page = pagination::previous_page(self.query.page());
        self.go_to_page(page)
    }

    /// Re-issues the current query after a failure.
    pub fn retry(&mut self) -> Option<FetchTicket> {
        match self.state {
            LoadState::Errored(_) => Some(self.begin_fetch()),
            _ => None,
        }
    }

    /// Reconciles the response of `ticket` with the view.
    pub fn complete<E: Display>(
        &mut self,
        ticket: FetchTicket,
        result: Result<Page<T>, E>,
    ) -> FetchOutcome {
        if ticket.generation != self.generation {
            log::debug!(
                "dropping stale list response #{} (latest #{})",
                ticket.generation,
                self.generation
            );
            return FetchOutcome::Stale;
        }

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                let message = err.to_string();
                log::error!("Failed to load list: {message}");
                self.state = LoadState::Errored(message.clone());
                return FetchOutcome::Failed(message);
            }
        };

        let requested = ticket.query.page();
        match resync(requested, &page) {
            Resync::Clamp(last) => {
                self.query.set_page(last);
                FetchOutcome::Refetch(self.begin_fetch())
            }
            Resync::Adopt(answered) => {
                self.query.set_page(answered);
                self.apply_page(page);
                FetchOutcome::Resynced {
                    from: requested,
                    to: answered,
                }
            }
            Resync::InSync => {
                self.apply_page(page);
                FetchOutcome::Applied
            }
        }
    }

    fn apply_page(&mut self, page: Page<T>) {
        self.rows = page.items;
        self.total_items = page.total_items;
        self.total_pages = page.total_pages;
        self.state = LoadState::Loaded;
    }

    /// Fetches the current query from `source` and applies the answer.
    ///
    /// Follows at most one clamp to the last page.
    pub fn load<S: ListSource<T>>(&mut self, source: &S) -> FetchOutcome {
        let ticket = self.begin_fetch();
        let result = source.fetch(ticket.query());
        match self.complete(ticket, result) {
            FetchOutcome::Refetch(ticket) => {
                let result = source.fetch(ticket.query());
                self.complete(ticket, result)
            }
            outcome => outcome,
        }
    }

    /// Consumes the view into a renderable page.
    pub fn into_paginated(self) -> Paginated<T> {
        Paginated::new(self.rows, self.query.page(), self.total_pages, self.total_items)
    }

    /// Swaps in a freshly fetched copy of a single row.
    pub fn replace_row(&mut self, row: T) -> bool {
        match self.rows.iter_mut().find(|existing| existing.id() == row.id()) {
            Some(existing) => {
                *existing = row;
                true
            }
            None => false,
        }
    }

    /// Appends a row created locally, for flat collections.
    pub fn append_row(&mut self, row: T) {
        self.rows.push(row);
        self.total_items += 1;
        self.total_pages = pagination::total_pages(self.total_items, self.query.page_size());
    }

    fn mark_in_flight(&mut self, id: T::Id) -> Result<(), MutationError> {
        if self.row(id).is_none() {
            return Err(MutationError::UnknownRow);
        }
        if !self.in_flight.insert(id) {
            return Err(MutationError::InFlight);
        }
        Ok(())
    }

    /// Validates a delete before any request is issued.
    pub fn begin_delete(
        &mut self,
        id: T::Id,
        confirmed: bool,
    ) -> Result<DeleteTicket<T::Id>, MutationError> {
        if !confirmed {
            return Err(MutationError::NotConfirmed);
        }
        self.mark_in_flight(id)?;
        Ok(DeleteTicket { id })
    }

    /// Removes the row once the backend accepted the delete.
    pub fn finish_delete<E: Display>(
        &mut self,
        ticket: DeleteTicket<T::Id>,
        result: Result<(), E>,
    ) -> Result<Option<T>, MutationError> {
        self.in_flight.remove(&ticket.id);
        if let Err(err) = result {
            log::error!("Failed to delete row: {err}");
            return Err(MutationError::Remote(err.to_string()));
        }

        let Some(index) = self.rows.iter().position(|row| row.id() == ticket.id) else {
            return Ok(None);
        };
        let removed = self.rows.remove(index);
        self.total_items = self.total_items.saturating_sub(1);
        self.total_pages = pagination::total_pages(self.total_items, self.query.page_size());
        Ok(Some(removed))
    }

    /// Confirmed delete through `remote`, removing the row on success.
    pub fn delete_row<E: Display>(
        &mut self,
        id: T::Id,
        confirmed: bool,
        remote: impl FnOnce(T::Id) -> Result<(), E>,
    ) -> Result<Option<T>, MutationError> {
        let ticket = self.begin_delete(id, confirmed)?;
        let result = remote(id);
        self.finish_delete(ticket, result)
    }
}

impl<T: Identified + Likeable> ListView<T> {
    /// Flips the like state of a row before the request is sent.
    pub fn begin_toggle_like(&mut self, id: T::Id) -> Result<LikeTicket<T::Id>, MutationError> {
        self.mark_in_flight(id)?;
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.id() == id)
            .ok_or(MutationError::UnknownRow)?;

        let mut state = row.like_state();
        let update = Optimistic::apply(&mut state, |current| current.toggled());
        row.set_like_state(state);

        Ok(LikeTicket { id, update })
    }

    /// Reconciles the optimistic toggle with the server's answer.
    pub fn finish_toggle_like<E: Display>(
        &mut self,
        ticket: LikeTicket<T::Id>,
        result: Result<Acknowledgement<LikeState>, E>,
    ) -> Result<LikeResolution<T::Id>, MutationError> {
        self.in_flight.remove(&ticket.id);
        let row = self.rows.iter_mut().find(|row| row.id() == ticket.id);

        match result {
            Ok(Acknowledgement::Confirmed(authoritative)) => {
                if let Some(row) = row {
                    let mut state = row.like_state();
                    ticket.update.confirm(&mut state, authoritative);
                    row.set_like_state(state);
                }
                Ok(LikeResolution::Confirmed(authoritative))
            }
            Ok(Acknowledgement::Ambiguous) => Ok(LikeResolution::NeedsRefresh(ticket.id)),
            Err(err) => {
                if let Some(row) = row {
                    let mut state = row.like_state();
                    ticket.update.roll_back(&mut state);
                    row.set_like_state(state);
                }
                log::error!("Failed to toggle like: {err}");
                Err(MutationError::Remote(err.to_string()))
            }
        }
    }

    /// Optimistic like toggle through `remote`.
    pub fn toggle_like<E: Display>(
        &mut self,
        id: T::Id,
        remote: impl FnOnce(T::Id) -> Result<Acknowledgement<LikeState>, E>,
    ) -> Result<LikeResolution<T::Id>, MutationError> {
        let ticket = self.begin_toggle_like(id)?;
        let result = remote(id);
        self.finish_toggle_like(ticket, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Item {
        id: u32,
        liked: bool,
        likes: u64,
    }

    impl Identified for Item {
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }
    }

    impl Likeable for Item {
        fn like_state(&self) -> LikeState {
            LikeState::new(self.liked, self.likes)
        }

        fn set_like_state(&mut self, state: LikeState) {
            self.liked = state.is_liked;
            self.likes = state.likes;
        }
    }

    fn item(id: u32) -> Item {
        Item {
            id,
            liked: false,
            likes: 10,
        }
    }

    fn page(ids: &[u32], total_items: usize, page_number: usize) -> Page<Item> {
        let total_pages = pagination::total_pages(total_items, 10);
        Page::new(ids.iter().map(|id| item(*id)).collect(), total_items, total_pages, page_number)
    }

    fn loaded_view(ids: &[u32]) -> ListView<Item> {
        let mut view = ListView::new(ListQuery::default());
        let ticket = view.begin_fetch();
        let outcome = view.complete::<String>(ticket, Ok(page(ids, ids.len(), 0)));
        assert_eq!(outcome, FetchOutcome::Applied);
        view
    }

    #[test]
    fn starts_idle_and_loads() {
        let mut view: ListView<Item> = ListView::new(ListQuery::default());
        assert_eq!(view.state(), &LoadState::Idle);

        let ticket = view.begin_fetch();
        assert!(view.is_loading());

        view.complete::<String>(ticket, Ok(page(&[1, 2], 2, 0)));
        assert_eq!(view.state(), &LoadState::Loaded);
        assert_eq!(view.rows().len(), 2);
    }

    #[test]
    fn stale_response_does_not_overwrite_newer_one() {
        let mut view = ListView::new(ListQuery::default());
        let first = view.begin_fetch();
        let second = view.set_search_term("jo").expect("query changed");

        assert_eq!(
            view.complete::<String>(second, Ok(page(&[2], 1, 0))),
            FetchOutcome::Applied
        );
        assert_eq!(
            view.complete::<String>(first, Ok(page(&[1, 3, 4], 3, 0))),
            FetchOutcome::Stale
        );
        assert_eq!(view.rows(), &[item(2)]);
    }

    #[test]
    fn failure_keeps_previous_rows() {
        let mut view = loaded_view(&[1, 2]);
        let ticket = view.set_search_term("x").expect("query changed");
        let outcome = view.complete(ticket, Err("network down"));

        assert_eq!(outcome, FetchOutcome::Failed("network down".to_string()));
        assert_eq!(view.error(), Some("network down"));
        assert_eq!(view.rows().len(), 2);

        let retry = view.retry().expect("retry allowed after failure");
        view.complete::<String>(retry, Ok(page(&[5], 1, 0)));
        assert_eq!(view.state(), &LoadState::Loaded);
        assert!(view.retry().is_none());
    }

    #[test]
    fn backend_page_is_adopted_once() {
        let mut view = ListView::new(ListQuery::default().with_page(3));
        let fetches = std::cell::Cell::new(0);
        let source = |query: &ListQuery| -> Result<Page<Item>, String> {
            fetches.set(fetches.get() + 1);
            assert_eq!(query.backend_page_index(), 2);
            Ok(page(&[11, 12], 15, 1))
        };

        let outcome = view.load(&source);

        assert_eq!(outcome, FetchOutcome::Resynced { from: 3, to: 2 });
        assert_eq!(view.query().page(), 2);
        assert_eq!(fetches.get(), 1);
        assert_eq!(view.state(), &LoadState::Loaded);
    }

    #[test]
    fn page_past_the_end_clamps_and_refetches() {
        let mut view = ListView::new(ListQuery::default().with_page(5));
        let source = |query: &ListQuery| -> Result<Page<Item>, String> {
            if query.page() == 5 {
                Ok(Page::new(vec![], 15, 2, 4))
            } else {
                Ok(page(&[11], 15, query.backend_page_index()))
            }
        };

        assert_eq!(view.load(&source), FetchOutcome::Applied);
        assert_eq!(view.query().page(), 2);
        assert_eq!(view.rows().len(), 1);
    }

    #[test]
    fn unchanged_query_does_not_fetch() {
        let mut view = loaded_view(&[1]);
        assert!(view.set_filter("role", FilterValue::All).is_none());
        assert!(view.go_to_page(1).is_none());
        assert!(view.next_page().is_none());
    }

    #[test]
    fn optimistic_like_then_failure_rolls_back() {
        let mut view = loaded_view(&[1, 2]);

        let ticket = view.begin_toggle_like(1).expect("toggle starts");
        assert_eq!(view.row(1).map(Likeable::like_state), Some(LikeState::new(true, 11)));
        assert!(view.is_pending(1));
        assert_eq!(view.begin_toggle_like(1).unwrap_err(), MutationError::InFlight);

        let result = view.finish_toggle_like(ticket, Err("server error"));
        assert_eq!(result, Err(MutationError::Remote("server error".to_string())));
        assert_eq!(view.row(1).map(Likeable::like_state), Some(LikeState::new(false, 10)));
        assert!(!view.is_pending(1));
    }

    #[test]
    fn like_confirmation_uses_server_count() {
        let mut view = loaded_view(&[1]);
        let result = view.toggle_like(1, |_| {
            Ok::<_, String>(Acknowledgement::Confirmed(LikeState::new(true, 15)))
        });

        assert_eq!(result, Ok(LikeResolution::Confirmed(LikeState::new(true, 15))));
        assert_eq!(view.row(1).map(Likeable::like_state), Some(LikeState::new(true, 15)));
    }

    #[test]
    fn ambiguous_like_requests_row_refresh() {
        let mut view = loaded_view(&[1]);
        let result = view.toggle_like(1, |_| Ok::<_, String>(Acknowledgement::Ambiguous));
        assert_eq!(result, Ok(LikeResolution::NeedsRefresh(1)));

        let mut fresh = item(1);
        fresh.likes = 42;
        assert!(view.replace_row(fresh));
        assert_eq!(view.row(1).map(|row| row.likes), Some(42));
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut view = loaded_view(&[1, 2]);
        let called = std::cell::Cell::new(false);
        let result = view.delete_row(1, false, |_| {
            called.set(true);
            Ok::<_, String>(())
        });
        assert_eq!(result, Err(MutationError::NotConfirmed));
        assert!(!called.get());
        assert_eq!(view.rows().len(), 2);
    }

    #[test]
    fn confirmed_delete_removes_row_and_decrements_total() {
        let mut view = loaded_view(&[1, 2, 3]);
        let removed = view.delete_row(2, true, |_| Ok::<_, String>(()));

        assert_eq!(removed, Ok(Some(item(2))));
        assert!(view.row(2).is_none());
        assert_eq!(view.total_items(), 2);
    }

    #[test]
    fn failed_delete_keeps_row() {
        let mut view = loaded_view(&[1, 2, 3]);
        let result = view.delete_row(2, true, |_| Err("forbidden"));

        assert_eq!(result, Err(MutationError::Remote("forbidden".to_string())));
        assert!(view.row(2).is_some());
        assert_eq!(view.total_items(), 3);
        assert!(!view.is_pending(2));
    }

    #[test]
    fn appended_rows_grow_the_total() {
        let mut view = loaded_view(&[1]);
        view.append_row(item(9));
        assert_eq!(view.total_items(), 2);
        assert_eq!(view.rows().last(), Some(&item(9)));
    }
}
