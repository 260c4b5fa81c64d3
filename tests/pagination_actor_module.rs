use patchbay::pagination::{
    CancelFn, ListFilter, PageCompletion, PageFetcher, PageRequest, PagedQuery, PagedStatus,
    PagedUpdate,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct CatalogLog {
    pending: Vec<(PageRequest<ListFilter>, PageCompletion<String>)>,
    cancelled: usize,
}

struct CatalogFetcher(Rc<RefCell<CatalogLog>>);

impl PageFetcher<String, ListFilter> for CatalogFetcher {
    fn fetch(
        &mut self,
        request: &PageRequest<ListFilter>,
        completion: PageCompletion<String>,
    ) -> CancelFn {
        self.0
            .borrow_mut()
            .pending
            .push((request.clone(), completion));
        let log = Rc::clone(&self.0);
        Box::new(move || log.borrow_mut().cancelled += 1)
    }
}

fn harness() -> (PagedQuery<String, ListFilter>, CatalogFetcher, Rc<RefCell<CatalogLog>>) {
    let log = Rc::new(RefCell::new(CatalogLog::default()));
    (PagedQuery::new(), CatalogFetcher(Rc::clone(&log)), log)
}

fn items(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn settle(
    query: &mut PagedQuery<String, ListFilter>,
    log: &Rc<RefCell<CatalogLog>>,
    page_items: &[&str],
    total: u32,
) {
    let (_, completion) = log.borrow_mut().pending.remove(0);
    completion.succeed(items(page_items), total);
    query.pump();
}

#[test]
fn pagination_actor_module_walks_pages_and_recovers_from_a_failed_page() {
    let (mut query, mut fetcher, log) = harness();

    query.query(PageRequest::first(3, ListFilter::default()), &mut fetcher);
    assert_eq!(query.status(), PagedStatus::Loading);
    settle(&mut query, &log, &["a", "b", "c"], 100);
    assert_eq!(query.response().map(|r| r.page), Some(1));
    assert_eq!(query.response().map(|r| r.total), Some(100));

    assert!(query.next_page(&mut fetcher).is_some());
    let (request, completion) = log.borrow_mut().pending.remove(0);
    assert_eq!(request.page, 2);
    completion.succeed(items(&["d", "e", "f"]), 100);
    query.pump();
    assert_eq!(query.response().map(|r| r.page), Some(2));

    // The third page fails: the error surfaces but items and total stay.
    assert!(query.next_page(&mut fetcher).is_some());
    let (_, completion) = log.borrow_mut().pending.remove(0);
    completion.fail("gateway timeout");
    let updates = query.pump();
    assert_eq!(
        updates,
        vec![PagedUpdate::Error {
            message: "gateway timeout".to_string()
        }]
    );
    assert_eq!(query.error(), Some("gateway timeout"));
    assert_eq!(query.response().map(|r| r.total), Some(100));
    assert_eq!(
        query.response().map(|r| r.items.clone()),
        Some(items(&["d", "e", "f"]))
    );

    // Going back re-fetches and a success clears the error.
    assert!(query.prev_page(&mut fetcher).is_some());
    settle(&mut query, &log, &["d", "e", "f"], 100);
    assert!(query.error().is_none());
    assert_eq!(query.response().map(|r| r.page), Some(2));
}

#[test]
fn pagination_actor_module_supersede_cancels_and_ignores_the_stale_result() {
    let (mut query, mut fetcher, log) = harness();

    query.query(PageRequest::first(10, ListFilter::search("sink")), &mut fetcher);
    query.query(PageRequest::first(10, ListFilter::search("source")), &mut fetcher);
    assert_eq!(log.borrow().cancelled, 1);

    // The superseded fetch completes anyway; nothing must change.
    let (_, stale) = log.borrow_mut().pending.remove(0);
    stale.succeed(items(&["aws-s3-sink"]), 1);
    assert!(query.pump().is_empty());
    assert!(query.response().is_none());
    assert!(query.is_loading());

    let (request, fresh) = log.borrow_mut().pending.remove(0);
    assert_eq!(request.filter, ListFilter::search("source"));
    fresh.succeed(items(&["debezium-source"]), 1);
    query.pump();
    assert_eq!(
        query.response().map(|r| r.items.clone()),
        Some(items(&["debezium-source"]))
    );
}

#[test]
fn pagination_actor_module_failure_then_retry_same_page() {
    let (mut query, mut fetcher, log) = harness();

    query.query(PageRequest::first(5, ListFilter::default()), &mut fetcher);
    let (_, completion) = log.borrow_mut().pending.remove(0);
    completion.fail("offline");
    query.pump();
    assert_eq!(query.error(), Some("offline"));
    assert!(query.response().is_none());

    assert!(query.refresh(&mut fetcher).is_some());
    settle(&mut query, &log, &["a"], 1);
    assert!(query.error().is_none());
    assert_eq!(query.response().map(|r| r.total), Some(1));
}
