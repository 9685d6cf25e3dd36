//! Wire runtime: the HTML-over-the-wire transport.
//!
//! # Responsibilities
//! - Issue HTTP requests against the console with the `HX-Request` header
//! - Dispatch lifecycle events on the shell's event target around each
//!   request: before send, after load, on response error
//!
//! # Design Decisions
//! - Error responses dispatch `htmx:responseError` with the status in the
//!   detail; transport failures dispatch it with no transport handle
//! - `htmx:afterOnLoad` fires only once a successful response body has
//!   been read, mirroring "response loaded into the DOM"
//! - The runtime keeps a cookie store so a logged-in session carries
//!   across requests

use std::sync::Arc;

use reqwest::{Client, Method, StatusCode};
use thiserror::Error;
use url::Url;

use crate::shell::event::{
    EventDetail, TransportHandle, WireEvent, EVENT_AFTER_ON_LOAD, EVENT_BEFORE_REQUEST,
    EVENT_RESPONSE_ERROR,
};
use crate::shell::target::EventTarget;

/// Error type for wire operations.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("invalid console URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A response loaded over the wire.
#[derive(Debug)]
pub struct WireResponse {
    pub status: StatusCode,
    pub body: String,
}

impl WireResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Transport handle issuing requests and feeding the event target.
pub struct WireRuntime {
    client: Client,
    base: Url,
    target: EventTarget,
}

impl WireRuntime {
    /// Create a runtime for the console at `base_url`.
    pub fn new(base_url: &str, target: EventTarget) -> Result<Self, WireError> {
        let base = Url::parse(base_url)?;
        let client = Client::builder()
            .cookie_provider(Arc::new(reqwest::cookie::Jar::default()))
            .build()?;
        Ok(Self {
            client,
            base,
            target,
        })
    }

    /// The event target this runtime dispatches lifecycle events on.
    pub fn target(&self) -> &EventTarget {
        &self.target
    }

    /// GET a fragment or document.
    pub async fn get(&self, path: &str) -> Result<WireResponse, WireError> {
        self.issue(Method::GET, path, None).await
    }

    /// POST a form, the way the wire library submits elements.
    pub async fn post_form(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<WireResponse, WireError> {
        self.issue(Method::POST, path, Some(form)).await
    }

    async fn issue(
        &self,
        method: Method,
        path: &str,
        form: Option<&[(&str, &str)]>,
    ) -> Result<WireResponse, WireError> {
        let url = self.base.join(path)?;

        self.target.dispatch(&WireEvent::with_detail(
            EVENT_BEFORE_REQUEST,
            EventDetail {
                xhr: None,
                path: Some(path.to_string()),
            },
        ));

        let mut request = self
            .client
            .request(method, url)
            .header("HX-Request", "true");
        if let Some(fields) = form {
            request = request.form(fields);
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_client_error() || status.is_server_error() {
                    self.target.dispatch(&WireEvent::with_detail(
                        EVENT_RESPONSE_ERROR,
                        EventDetail {
                            xhr: Some(TransportHandle {
                                status: Some(status.as_u16()),
                            }),
                            path: Some(path.to_string()),
                        },
                    ));
                    let body = response.text().await.unwrap_or_default();
                    return Ok(WireResponse { status, body });
                }

                let body = match response.text().await {
                    Ok(body) => body,
                    Err(e) => {
                        // Body read failed mid-flight; settle the request
                        // as an error so the indicator is not left stuck.
                        self.target.dispatch(&WireEvent::with_detail(
                            EVENT_RESPONSE_ERROR,
                            EventDetail {
                                xhr: Some(TransportHandle {
                                    status: Some(status.as_u16()),
                                }),
                                path: Some(path.to_string()),
                            },
                        ));
                        return Err(e.into());
                    }
                };
                self.target.dispatch(&WireEvent::with_detail(
                    EVENT_AFTER_ON_LOAD,
                    EventDetail {
                        xhr: Some(TransportHandle {
                            status: Some(status.as_u16()),
                        }),
                        path: Some(path.to_string()),
                    },
                ));
                Ok(WireResponse { status, body })
            }
            Err(e) => {
                // No response at all: the error event carries no
                // transport handle.
                self.target.dispatch(&WireEvent::with_detail(
                    EVENT_RESPONSE_ERROR,
                    EventDetail {
                        xhr: None,
                        path: Some(path.to_string()),
                    },
                ));
                Err(e.into())
            }
        }
    }
}
