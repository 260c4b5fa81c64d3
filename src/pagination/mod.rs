pub mod actor;
pub mod request;

pub use actor::{PageCompletion, PagedQuery, PagedStatus, PagedUpdate};
pub use request::{ListFilter, PageRequest, PageResponse};

/// Advisory cancellation handle returned by a fetch collaborator. The
/// underlying transport may ignore it; the actor's sequence guard makes a
/// late completion harmless either way.
pub type CancelFn = Box<dyn FnOnce()>;

/// Abstract paginated data source for list-selection steps. Implementations
/// must invoke exactly one of `completion.succeed` / `completion.fail` per
/// logical attempt, unless cancelled first.
pub trait PageFetcher<T, F> {
    fn fetch(&mut self, request: &PageRequest<F>, completion: PageCompletion<T>) -> CancelFn;
}
