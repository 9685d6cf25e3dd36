//! The client shell runtime against a live console: lifecycle events,
//! busy class, and error logging end to end.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use wire_console::shell::event::{EVENT_BEFORE_REQUEST, EVENT_RESPONSE_ERROR};
use wire_console::shell::indicator::DEFAULT_BUSY_CLASS;
use wire_console::shell::{BusyIndicator, Shell};

mod common;

#[tokio::test]
async fn test_request_lifecycle_toggles_busy_class() {
    let addr: SocketAddr = "127.0.0.1:28581".parse().unwrap();
    let (shutdown, _state) = common::start_console(addr, common::test_config(&[])).await;

    let shell = Shell::connect(&format!("http://{}", addr)).unwrap();
    let hooks = BusyIndicator::new().install(&shell).expect("runtime present");

    // Probe listener registered after the indicator, so it observes the
    // root element after the busy hook has run.
    let seen_busy = Arc::new(Mutex::new(Vec::new()));
    let probe = {
        let seen = seen_busy.clone();
        let root = Arc::clone(shell.root());
        shell.target().subscribe(EVENT_BEFORE_REQUEST, move |_| {
            seen.lock().unwrap().push(root.has_class(DEFAULT_BUSY_CLASS));
        })
    };

    let runtime = shell.runtime().cloned().unwrap();
    let response = runtime.get("/healthz").await.unwrap();
    assert!(response.is_success());
    assert!(response.body.contains("ok"));

    // The class was present while the request was in flight and is gone
    // now that it completed.
    assert_eq!(*seen_busy.lock().unwrap(), vec![true]);
    assert!(!shell.root().has_class(DEFAULT_BUSY_CLASS));
    assert_eq!(hooks.in_flight(), 0);

    drop(probe);
    shutdown.trigger();
}

#[tokio::test]
async fn test_error_response_settles_and_carries_status() {
    let addr: SocketAddr = "127.0.0.1:28582".parse().unwrap();
    let (shutdown, _state) = common::start_console(addr, common::test_config(&[])).await;

    let shell = Shell::connect(&format!("http://{}", addr)).unwrap();
    let hooks = BusyIndicator::new().install(&shell).expect("runtime present");

    // Capture what the error event actually carried.
    let statuses = Arc::new(Mutex::new(Vec::new()));
    let _probe = {
        let statuses = statuses.clone();
        shell.target().subscribe(EVENT_RESPONSE_ERROR, move |event| {
            statuses.lock().unwrap().push(event.status());
        })
    };

    // Unauthenticated members fetch: a 401 error response.
    let runtime = shell.runtime().cloned().unwrap();
    let response = runtime.get("/orgs/1/members").await.unwrap();
    assert_eq!(response.status.as_u16(), 401);

    assert_eq!(*statuses.lock().unwrap(), vec![Some(401)]);
    assert!(!shell.root().has_class(DEFAULT_BUSY_CLASS));
    assert_eq!(hooks.in_flight(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_transport_failure_dispatches_error_without_handle() {
    // Nothing listens here; the request fails without a response.
    let shell = Shell::connect("http://127.0.0.1:28599").unwrap();
    let hooks = BusyIndicator::new().install(&shell).expect("runtime present");

    let details = Arc::new(Mutex::new(Vec::new()));
    let _probe = {
        let details = details.clone();
        shell.target().subscribe(EVENT_RESPONSE_ERROR, move |event| {
            details
                .lock()
                .unwrap()
                .push((event.status(), event.detail().and_then(|d| d.xhr.clone())));
        })
    };

    let runtime = shell.runtime().cloned().unwrap();
    let result = runtime.get("/healthz").await;
    assert!(result.is_err());

    let seen = details.lock().unwrap();
    assert_eq!(seen.len(), 1);
    // No response, no transport handle, no status.
    assert_eq!(seen[0].0, None);
    assert!(seen[0].1.is_none());
    drop(seen);

    assert!(!shell.root().has_class(DEFAULT_BUSY_CLASS));
    assert_eq!(hooks.in_flight(), 0);
}
