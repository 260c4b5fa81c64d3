use crate::pagination::{ListFilter, PageFetcher, PageRequest, PagedQuery, PagedUpdate};
use crate::steps::StepStatus;

/// List-selection step: a paginated query over candidate items plus the one
/// the user picked. Valid exactly when something is selected; the fetch
/// state never gates validity, so a selection made from a previous page
/// survives a failed refresh.
pub struct SelectionStep<T> {
    step_name: &'static str,
    query: PagedQuery<T, ListFilter>,
    selected: Option<T>,
    status: StepStatus,
}

impl<T: Clone> SelectionStep<T> {
    pub fn new(step_name: &'static str, selected: Option<T>) -> Self {
        let status = if selected.is_some() {
            StepStatus::Valid
        } else {
            StepStatus::Typing
        };
        Self {
            step_name,
            query: PagedQuery::new(),
            selected,
            status,
        }
    }

    pub fn step_name(&self) -> &'static str {
        self.step_name
    }

    pub fn status(&self) -> StepStatus {
        self.status
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.as_ref()
    }

    pub fn items(&self) -> &[T] {
        self.query
            .response()
            .map(|response| response.items.as_slice())
            .unwrap_or_default()
    }

    pub fn fetch_error(&self) -> Option<&str> {
        self.query.error()
    }

    pub fn is_loading(&self) -> bool {
        self.query.is_loading()
    }

    fn verify(&mut self) -> StepStatus {
        self.status = if self.selected.is_some() {
            StepStatus::Valid
        } else {
            StepStatus::Typing
        };
        self.status
    }

    pub fn select(&mut self, item: T) -> StepStatus {
        self.selected = Some(item);
        self.verify()
    }

    pub fn deselect(&mut self) -> StepStatus {
        self.selected = None;
        self.verify()
    }

    /// No-op while nothing is selected; otherwise terminal, yielding the
    /// selection for the parent to merge.
    pub fn confirm(&mut self) -> Option<T> {
        let selection = self.selected.clone()?;
        self.status = StepStatus::Done;
        Some(selection)
    }

    pub fn query(
        &mut self,
        request: PageRequest<ListFilter>,
        fetcher: &mut dyn PageFetcher<T, ListFilter>,
    ) -> PagedUpdate<T> {
        self.query.query(request, fetcher)
    }

    pub fn next_page(
        &mut self,
        fetcher: &mut dyn PageFetcher<T, ListFilter>,
    ) -> Option<PagedUpdate<T>> {
        self.query.next_page(fetcher)
    }

    pub fn prev_page(
        &mut self,
        fetcher: &mut dyn PageFetcher<T, ListFilter>,
    ) -> Option<PagedUpdate<T>> {
        self.query.prev_page(fetcher)
    }

    pub fn refresh(
        &mut self,
        fetcher: &mut dyn PageFetcher<T, ListFilter>,
    ) -> Option<PagedUpdate<T>> {
        self.query.refresh(fetcher)
    }

    pub fn pump(&mut self) -> Vec<PagedUpdate<T>> {
        self.query.pump()
    }

    pub fn shutdown(&mut self) {
        self.query.shutdown();
    }
}
