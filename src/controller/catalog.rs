use std::sync::Arc;

use tracing::{debug, info};

use crate::api::dto::{Envelope, ListCoursesResponse, SearchCoursesResponse, SearchParams};
use crate::api::{LIST_COURSES, SEARCH_COURSES, Transport};
use crate::controller::query::{Mode, PageSize, QueryState, SortSpec};
use crate::executor::{Dispatch, RequestExecutor, RequestLifecycle, Settlement, Status};
use crate::models::Course;

pub const LIST_FAILED: &str = "Failed to load courses. Please try again.";
pub const SEARCH_FAILED: &str = "Search failed. Please try again.";

const NO_RECORDS: &[Course] = &[];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    ChangePage(u32),
    ChangeSize(PageSize),
    ChangeSort(SortSpec),
    EditSearch(String),
    SubmitSearch,
    ClearSearch,
    Refresh,
}

/// A call issued by the controller that the caller must await and hand back.
pub enum PendingCall {
    List(Dispatch<ListCoursesResponse>),
    Search(Dispatch<SearchCoursesResponse>),
}

impl PendingCall {
    pub async fn finish(self) -> Completion {
        match self {
            PendingCall::List(dispatch) => Completion::List(dispatch.finish().await),
            PendingCall::Search(dispatch) => Completion::Search(dispatch.finish().await),
        }
    }
}

pub enum Completion {
    List(Settlement<ListCoursesResponse>),
    Search(Settlement<SearchCoursesResponse>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    NoSearchMatches,
    EmptyCatalog,
}

impl EmptyState {
    pub fn message(self) -> &'static str {
        match self {
            EmptyState::NoSearchMatches => {
                "Try adjusting your search terms or clear the search to see all courses."
            }
            EmptyState::EmptyCatalog => {
                "There are no courses available yet. Be the first to create one!"
            }
        }
    }

    pub fn recovery(self) -> Option<Intent> {
        match self {
            EmptyState::NoSearchMatches => Some(Intent::ClearSearch),
            EmptyState::EmptyCatalog => None,
        }
    }
}

/// What the view shows right now, derived from the mode and both lifecycles.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedResult<'a> {
    pub records: &'a [Course],
    pub total: u64,
    pub loading: bool,
    pub error: Option<String>,
    pub empty_state: Option<EmptyState>,
}

trait CourseListing: Envelope {
    fn records(&self) -> &[Course];
    fn total(&self) -> u64;
}

impl CourseListing for ListCoursesResponse {
    fn records(&self) -> &[Course] {
        &self.courses
    }

    fn total(&self) -> u64 {
        self.total.unwrap_or(self.courses.len() as u64)
    }
}

impl CourseListing for SearchCoursesResponse {
    fn records(&self) -> &[Course] {
        &self.results
    }

    fn total(&self) -> u64 {
        self.results.len() as u64
    }
}

pub struct CatalogController {
    state: QueryState,
    list: RequestExecutor<ListCoursesResponse>,
    search: RequestExecutor<SearchCoursesResponse>,
}

impl CatalogController {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_state(transport, QueryState::default())
    }

    pub fn with_state(transport: Arc<dyn Transport>, state: QueryState) -> Self {
        Self {
            list: RequestExecutor::new(LIST_COURSES, Arc::clone(&transport)),
            search: RequestExecutor::new(SEARCH_COURSES, transport),
            state,
        }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn list_lifecycle(&self) -> &RequestLifecycle<ListCoursesResponse> {
        self.list.lifecycle()
    }

    pub fn search_lifecycle(&self) -> &RequestLifecycle<SearchCoursesResponse> {
        self.search.lifecycle()
    }

    pub fn start(&mut self) -> PendingCall {
        match self.state.mode.clone() {
            Mode::Browse => self.browse(),
            Mode::Search { query } => self.run_search(query),
        }
    }

    pub fn apply(&mut self, intent: Intent) -> Option<PendingCall> {
        match intent {
            Intent::ChangePage(page) => self.change_list_params(|state| state.page = page),
            Intent::ChangeSize(size) => self.change_list_params(|state| {
                state.size = size;
                state.page = 0;
            }),
            Intent::ChangeSort(sort) => self.change_list_params(|state| state.sort = sort),
            Intent::EditSearch(text) => {
                self.state.search_text = text;
                None
            }
            Intent::SubmitSearch => {
                if self.state.search_text.trim().is_empty() {
                    self.state.mode = Mode::Browse;
                    Some(self.browse())
                } else {
                    let query = self.state.search_text.clone();
                    info!("searching courses for {:?}", query);
                    self.state.mode = Mode::Search {
                        query: query.clone(),
                    };
                    Some(self.run_search(query))
                }
            }
            Intent::ClearSearch => {
                if self.state.mode.is_search() {
                    info!("search cleared, back to browsing");
                }
                self.state.search_text.clear();
                self.state.mode = Mode::Browse;
                Some(self.browse())
            }
            Intent::Refresh => Some(self.start()),
        }
    }

    /// Feeds a finished call back. Returns false when it was discarded as stale.
    pub fn complete(&mut self, completion: Completion) -> bool {
        match completion {
            Completion::List(settlement) => self.list.settle(settlement),
            Completion::Search(settlement) => self.search.settle(settlement),
        }
    }

    /// Page, size and sort only apply to browsing; they are disabled while searching.
    pub fn controls_enabled(&self) -> bool {
        !self.state.mode.is_search()
    }

    pub fn is_loading(&self) -> bool {
        match self.state.mode {
            Mode::Browse => self.list.is_pending(),
            Mode::Search { .. } => self.search.is_pending(),
        }
    }

    pub fn display(&self) -> DisplayedResult<'_> {
        let (mut result, empty_state) = match self.state.mode {
            Mode::Browse => (
                project(self.list.lifecycle(), LIST_FAILED),
                EmptyState::EmptyCatalog,
            ),
            Mode::Search { .. } => (
                project(self.search.lifecycle(), SEARCH_FAILED),
                EmptyState::NoSearchMatches,
            ),
        };

        let settled = match self.state.mode {
            Mode::Browse => self.list.lifecycle().status() == Status::Settled,
            Mode::Search { .. } => self.search.lifecycle().status() == Status::Settled,
        };
        if settled && result.error.is_none() && result.records.is_empty() {
            result.empty_state = Some(empty_state);
        }
        result
    }

    /// Pages in the catalog at the current size, when the backend reported a total.
    pub fn page_count(&self) -> Option<u32> {
        let total = self
            .list
            .lifecycle()
            .data()
            .filter(|response| response.succeeded())
            .and_then(|response| response.total)?;
        let size = u64::from(self.state.size.get());
        Some(u32::try_from(total.div_ceil(size)).unwrap_or(u32::MAX))
    }

    fn change_list_params(&mut self, update: impl FnOnce(&mut QueryState)) -> Option<PendingCall> {
        if self.state.mode.is_search() {
            debug!("pagination controls are disabled while searching");
            return None;
        }

        let before = self.state.list_params();
        update(&mut self.state);
        if self.state.list_params() == before {
            return None;
        }
        Some(self.browse())
    }

    fn browse(&mut self) -> PendingCall {
        let params = self.state.list_params();
        debug!(page = params.page, size = params.size, sort = %params.sort, "loading courses");
        PendingCall::List(self.list.dispatch_query(params))
    }

    fn run_search(&mut self, query: String) -> PendingCall {
        PendingCall::Search(self.search.dispatch_query(SearchParams { query }))
    }
}

fn project<'a, R: CourseListing>(
    lifecycle: &'a RequestLifecycle<R>,
    transport_failed: &str,
) -> DisplayedResult<'a> {
    let loading = lifecycle.is_pending();
    let (records, total, domain_error) = match lifecycle.data() {
        Some(envelope) if envelope.succeeded() => (envelope.records(), envelope.total(), None),
        Some(envelope) => (
            NO_RECORDS,
            0,
            Some(envelope.failure_message(transport_failed)),
        ),
        None => (NO_RECORDS, 0, None),
    };

    let error = if lifecycle.has_failed() {
        Some(transport_failed.to_string())
    } else if loading {
        None
    } else {
        domain_error
    };

    DisplayedResult {
        records,
        total,
        loading,
        error,
        empty_state: None,
    }
}
