//! Offset-based pagination with Stream API
//!
//! [`Pages`] counts the matching items once, then walks them in `$top`-sized pages by
//! advancing `$skip` on the borrowed [`ResourceQuery`]. Requests are issued only when
//! the stream is polled.
//!
//! ```rust,ignore
//! use futures_util::StreamExt;
//!
//! let mut students = service.resource("students")?;
//! students.filter("Age", Operator::Gt, 18).top(100)?;
//!
//! let mut items = students.items();
//! while let Some(student) = items.next().await {
//!     println!("{}", student?["LastName"]);
//! }
//! ```

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use futures_core::Stream;
use odata_query::UrlPath;
use serde_json::Value;

use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::ClientError;
use crate::query::{ResourceQuery, parse_count};
use crate::transport::{Transport, TransportResponse};

type PendingRequest = Pin<Box<dyn Future<Output = Result<TransportResponse, ClientError>> + Send>>;

fn request(transport: Arc<dyn Transport>, path: UrlPath) -> PendingRequest {
    Box::pin(async move { transport.get_path(&path).await })
}

/// Stream of page payloads for a [`ResourceQuery`].
///
/// Yields one `Ok` per page. The first error is yielded once and ends the stream.
pub struct Pages<'a> {
    query: &'a mut ResourceQuery,
    current_fetch: Option<PendingRequest>,
    /// Items still expected; `None` until the count has resolved.
    remaining: Option<u64>,
    page: u64,
    page_size: u64,
    done: bool,
}

impl<'a> Pages<'a> {
    pub(crate) fn new(query: &'a mut ResourceQuery) -> Self {
        Self {
            query,
            current_fetch: None,
            remaining: None,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            done: false,
        }
    }

    /// Number of pages yielded so far.
    #[must_use]
    pub fn pages_fetched(&self) -> u64 {
        self.page
    }

    fn start(&mut self, total: u64) {
        self.page_size = self.query.top_value().unwrap_or(DEFAULT_PAGE_SIZE);
        self.query.set_page(self.page_size, 0);
        self.remaining = Some(total);
        tracing::debug!(total, page_size = self.page_size, "starting OData pagination");
        if total == 0 {
            self.done = true;
        }
    }

    fn next_request(&mut self) -> PendingRequest {
        let path = if self.remaining.is_some() {
            self.query
                .set_page(self.page_size, self.page.saturating_mul(self.page_size));
            self.query.build()
        } else {
            self.query.count_path()
        };
        tracing::trace!(path = %path, page = self.page, "requesting OData page");
        request(self.query.transport(), path)
    }
}

impl Stream for Pages<'_> {
    type Item = Result<Value, ClientError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if this.done {
                return Poll::Ready(None);
            }

            if let Some(fut) = this.current_fetch.as_mut() {
                let result = ready!(fut.as_mut().poll(cx));
                this.current_fetch = None;

                let response = match result {
                    Ok(response) => response,
                    Err(e) => {
                        this.done = true;
                        return Poll::Ready(Some(Err(e)));
                    }
                };

                let Some(remaining) = this.remaining else {
                    match parse_count(&response.data) {
                        Ok(total) => {
                            this.start(total);
                            continue;
                        }
                        Err(e) => {
                            this.done = true;
                            return Poll::Ready(Some(Err(e)));
                        }
                    }
                };

                this.page += 1;
                let remaining = remaining.saturating_sub(this.page_size);
                this.remaining = Some(remaining);
                if remaining == 0 {
                    this.done = true;
                }
                tracing::debug!(page = this.page, remaining, "fetched OData page");
                return Poll::Ready(Some(Ok(response.data)));
            }

            this.current_fetch = Some(this.next_request());
        }
    }
}

impl std::fmt::Debug for Pages<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pages")
            .field("page", &self.page)
            .field("page_size", &self.page_size)
            .field("remaining", &self.remaining)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

/// Stream of individual items, flattening each page array.
///
/// A page that is not an array (a single entity) is yielded as one item.
#[derive(Debug)]
pub struct Items<'a> {
    pages: Pages<'a>,
    buffer: VecDeque<Value>,
}

impl<'a> Items<'a> {
    pub(crate) fn new(pages: Pages<'a>) -> Self {
        Self {
            pages,
            buffer: VecDeque::new(),
        }
    }
}

impl Stream for Items<'_> {
    type Item = Result<Value, ClientError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(item) = this.buffer.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }

            match ready!(Pin::new(&mut this.pages).poll_next(cx)) {
                Some(Ok(Value::Array(items))) => this.buffer.extend(items),
                other => return Poll::Ready(other),
            }
        }
    }
}
