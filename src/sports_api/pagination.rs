use crate::sports_api::client::{QueryParams, SportsCloudClient};
use crate::sports_api::types::{ApiError, SportsCloudError};
use reqwest::Method;
use serde_json::Value;

/// How a list endpoint tells the client where the next page starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paging {
    /// Opaque cursor returned in the body and echoed back as a query parameter
    Cursor {
        /// Body field holding the records
        items_field: String,
        /// Body field holding the next cursor; empty or absent means last page
        cursor_field: String,
        /// Query parameter carrying the cursor on the next request
        cursor_param: String,
    },
    /// `{"more": bool, "<items>": [...]}` bodies, continued with `offset=<records so far>`
    ///
    /// This is what the Sports Cloud list endpoints (athletes, teams,
    /// measurements) use.
    Offset {
        items_field: String,
        more_field: String,
        offset_param: String,
    },
}

impl Default for Paging {
    fn default() -> Self {
        Self::Cursor {
            items_field: "items".to_string(),
            cursor_field: "nextCursor".to_string(),
            cursor_param: "cursor".to_string(),
        }
    }
}

impl Paging {
    /// Offset paging over the given items field (`more` / `offset`)
    pub fn offset(items_field: impl Into<String>) -> Self {
        Self::Offset {
            items_field: items_field.into(),
            more_field: "more".to_string(),
            offset_param: "offset".to_string(),
        }
    }

    pub fn items_field(&self) -> &str {
        match self {
            Paging::Cursor { items_field, .. } | Paging::Offset { items_field, .. } => items_field,
        }
    }

    /// Query parameter that carries the cursor on follow-up requests
    pub fn cursor_param(&self) -> &str {
        match self {
            Paging::Cursor { cursor_param, .. } => cursor_param,
            Paging::Offset { offset_param, .. } => offset_param,
        }
    }
}

/// One page of a list endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Records in the order the server returned them
    pub items: Vec<Value>,
    /// Cursor for the next page; `None` when the server signalled the end
    pub next_cursor: Option<String>,
}

impl Page {
    /// Decode a page from a response body
    ///
    /// `records_before` is the number of records already received in this
    /// walk; offset paging derives the next cursor from it.
    pub fn from_body(mut body: Value, paging: &Paging, records_before: usize) -> Result<Self, SportsCloudError> {
        let items = match body.get_mut(paging.items_field()).map(Value::take) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None if body.is_object() => Vec::new(),
            _ => {
                return Err(SportsCloudError::Fatal(ApiError::Parse(format!(
                    "Expected '{}' to be a list in page response",
                    paging.items_field()
                ))))
            }
        };

        let next_cursor = match paging {
            Paging::Cursor { cursor_field, .. } => match body.get(cursor_field) {
                Some(Value::String(cursor)) if !cursor.is_empty() => Some(cursor.clone()),
                Some(Value::Number(cursor)) => Some(cursor.to_string()),
                _ => None,
            },
            Paging::Offset { more_field, .. } => match body.get(more_field) {
                Some(Value::Bool(true)) => Some((records_before + items.len()).to_string()),
                _ => None,
            },
        };

        Ok(Self { items, next_cursor })
    }

    /// Whether another page should be requested after this one
    pub fn has_more(&self) -> bool {
        !self.items.is_empty() && self.next_cursor.is_some()
    }
}

/// Lazy record iterator over a paginated list endpoint
///
/// Pages are fetched one at a time through
/// [`SportsCloudClient::request_with_retry`] and only the current page is
/// held. The walk ends on an empty cursor or an empty page. If a page fetch
/// fails after retries, the error is yielded once and the iterator is done;
/// records yielded before that are unaffected.
///
/// The iterator borrows the client mutably so only one request is in flight
/// per walk. Calling `paginate` again starts over from the first page.
pub struct Paginator<'a> {
    client: &'a mut SportsCloudClient,
    path: String,
    params: QueryParams,
    paging: Paging,
    buffer: std::vec::IntoIter<Value>,
    cursor: Option<String>,
    records_seen: usize,
    pages_fetched: usize,
    finished: bool,
}

impl<'a> Paginator<'a> {
    pub(crate) fn new(
        client: &'a mut SportsCloudClient,
        path: String,
        params: QueryParams,
        paging: Paging,
    ) -> Self {
        Self {
            client,
            path,
            params,
            paging,
            buffer: Vec::new().into_iter(),
            cursor: None,
            records_seen: 0,
            pages_fetched: 0,
            finished: false,
        }
    }

    /// Number of pages requested so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    fn fetch_page(&mut self) -> Result<Page, SportsCloudError> {
        let mut params = self.params.clone();
        if let Some(cursor) = &self.cursor {
            let name = self.paging.cursor_param().to_string();
            params.retain(|(key, _)| *key != name);
            params.push((name, cursor.clone()));
        }

        tracing::debug!(
            "Fetching page {} of {} (cursor: {:?})",
            self.pages_fetched + 1,
            self.path,
            self.cursor
        );

        let response = self
            .client
            .request_with_retry(Method::GET, &self.path, &params)?;
        self.pages_fetched += 1;

        Page::from_body(response.body, &self.paging, self.records_seen)
    }
}

impl Iterator for Paginator<'_> {
    type Item = Result<Value, SportsCloudError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.buffer.next() {
                return Some(Ok(record));
            }
            if self.finished {
                return None;
            }

            match self.fetch_page() {
                Ok(page) => {
                    if !page.has_more() {
                        self.finished = true;
                    }
                    self.records_seen += page.items.len();
                    self.cursor = page.next_cursor;
                    self.buffer = page.items.into_iter();
                }
                Err(err) => {
                    tracing::error!(
                        "Pagination of {} stopped after {} records: {}",
                        self.path,
                        self.records_seen,
                        err
                    );
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
    }
}
