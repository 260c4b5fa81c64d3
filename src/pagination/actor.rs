use crate::pagination::request::{PageRequest, PageResponse};
use crate::pagination::{CancelFn, PageFetcher};
use std::sync::mpsc::{channel, Receiver, Sender};

enum Delivery<T> {
    Success {
        seq: u64,
        items: Vec<T>,
        total: u32,
    },
    Failure {
        seq: u64,
        message: String,
    },
}

/// One-shot completion handed to a fetch collaborator. Consuming `succeed`
/// or `fail` enforces the exactly-one-outcome contract; the embedded
/// sequence number lets the actor drop completions for superseded requests.
pub struct PageCompletion<T> {
    seq: u64,
    tx: Sender<Delivery<T>>,
}

impl<T> PageCompletion<T> {
    pub fn succeed(self, items: Vec<T>, total: u32) {
        let _ = self.tx.send(Delivery::Success {
            seq: self.seq,
            items,
            total,
        });
    }

    pub fn fail(self, message: &str) {
        let _ = self.tx.send(Delivery::Failure {
            seq: self.seq,
            message: message.to_string(),
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagedStatus {
    Idle,
    Loading,
}

/// Notification surfaced to the owning actor so it can aggregate children
/// (spinner while any child is loading, error affordances, fresh items).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagedUpdate<T> {
    Loading,
    Success { items: Vec<T>, total: u32 },
    Error { message: String },
}

/// Cancellable paginated-fetch engine. Exactly one request is in flight at a
/// time; each dispatch bumps a monotonic sequence number, and only the
/// completion matching the current sequence is ever applied, so a stale
/// response can never overwrite a newer request's result even when the
/// advisory cancellation is ignored by the transport.
pub struct PagedQuery<T, F> {
    request: Option<PageRequest<F>>,
    response: Option<PageResponse<T>>,
    error: Option<String>,
    status: PagedStatus,
    seq: u64,
    cancel: Option<CancelFn>,
    tx: Sender<Delivery<T>>,
    rx: Receiver<Delivery<T>>,
}

impl<T, F> Default for PagedQuery<T, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, F> PagedQuery<T, F> {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self {
            request: None,
            response: None,
            error: None,
            status: PagedStatus::Idle,
            seq: 0,
            cancel: None,
            tx,
            rx,
        }
    }

    pub fn status(&self) -> PagedStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == PagedStatus::Loading
    }

    pub fn request(&self) -> Option<&PageRequest<F>> {
        self.request.as_ref()
    }

    pub fn response(&self) -> Option<&PageResponse<T>> {
        self.response.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn cancel_in_flight(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Tears down any outstanding fetch. Also runs on drop, so a step actor
    /// destroyed mid-load cannot leak a dangling completion into a context
    /// that no longer exists.
    pub fn shutdown(&mut self) {
        self.cancel_in_flight();
    }
}

impl<T: Clone, F: Clone> PagedQuery<T, F> {
    fn dispatch(
        &mut self,
        request: PageRequest<F>,
        fetcher: &mut dyn PageFetcher<T, F>,
    ) -> PagedUpdate<T> {
        self.seq += 1;
        let completion = PageCompletion {
            seq: self.seq,
            tx: self.tx.clone(),
        };
        let cancel = fetcher.fetch(&request, completion);
        self.cancel = Some(cancel);
        self.request = Some(request);
        self.status = PagedStatus::Loading;
        PagedUpdate::Loading
    }

    /// Replaces the current request, cancelling any in-flight fetch first.
    pub fn query(
        &mut self,
        request: PageRequest<F>,
        fetcher: &mut dyn PageFetcher<T, F>,
    ) -> PagedUpdate<T> {
        self.cancel_in_flight();
        self.dispatch(request, fetcher)
    }

    /// Guarded: requires a known total and a further page. Returns `None`
    /// when the guard fails, leaving the actor untouched.
    pub fn next_page(&mut self, fetcher: &mut dyn PageFetcher<T, F>) -> Option<PagedUpdate<T>> {
        let request = self.request.clone()?;
        let total = self.response.as_ref().map(|response| response.total)?;
        if u64::from(request.page) * u64::from(request.size) >= u64::from(total) {
            return None;
        }
        self.cancel_in_flight();
        Some(self.dispatch(
            PageRequest {
                page: request.page + 1,
                ..request
            },
            fetcher,
        ))
    }

    pub fn prev_page(&mut self, fetcher: &mut dyn PageFetcher<T, F>) -> Option<PagedUpdate<T>> {
        let request = self.request.clone()?;
        self.response.as_ref()?;
        if request.page <= 1 {
            return None;
        }
        self.cancel_in_flight();
        Some(self.dispatch(
            PageRequest {
                page: request.page - 1,
                ..request
            },
            fetcher,
        ))
    }

    /// Re-issues the current request without cancelling: refresh is assumed
    /// idempotent and infrequent, and the new sequence number supersedes the
    /// older completion anyway.
    pub fn refresh(&mut self, fetcher: &mut dyn PageFetcher<T, F>) -> Option<PagedUpdate<T>> {
        let request = self.request.clone()?;
        Some(self.dispatch(request, fetcher))
    }

    /// Drains delivered completions in send order, applying only the one
    /// matching the current request sequence. A success clears the error;
    /// a failure keeps the previous items and total so the list does not
    /// flicker empty.
    pub fn pump(&mut self) -> Vec<PagedUpdate<T>> {
        let mut updates = Vec::new();
        while let Ok(delivery) = self.rx.try_recv() {
            match delivery {
                Delivery::Success { seq, items, total } if seq == self.seq => {
                    self.cancel = None;
                    self.status = PagedStatus::Idle;
                    self.error = None;
                    if let Some(request) = self.request.as_ref() {
                        self.response = Some(PageResponse {
                            items: items.clone(),
                            total,
                            page: request.page,
                            size: request.size,
                        });
                    }
                    updates.push(PagedUpdate::Success { items, total });
                }
                Delivery::Failure { seq, message } if seq == self.seq => {
                    self.cancel = None;
                    self.status = PagedStatus::Idle;
                    self.error = Some(message.clone());
                    updates.push(PagedUpdate::Error { message });
                }
                // Superseded request; the result is stale by definition.
                Delivery::Success { .. } | Delivery::Failure { .. } => {}
            }
        }
        updates
    }
}

impl<T, F> Drop for PagedQuery<T, F> {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}
