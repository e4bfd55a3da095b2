//! Pagination of listing operations.
//!
//! A [`PageRequest`] is normalized on construction, so list operations can
//! trust its bounds. Sorting keys are validated by each listing against its
//! own allow-list.

use sea_orm::{
    ConnectionTrait, EntityTrait, FromQueryResult, ItemsAndPagesNumber, Order, PaginatorTrait,
    QueryOrder, Select,
};
use serde::Serialize;

use crate::{EngineError, ResultEngine};

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;
/// Fixed page size of date-range listings.
pub const RANGE_LIMIT: u64 = 2000;

/// A sort key: `field` sorts ascending, `-field` descending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub descending: bool,
}

impl Sort {
    /// Parses `field` / `-field`. Returns `None` for a blank key.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (field, descending) = match raw.strip_prefix('-') {
            Some(field) => (field, true),
            None => (raw, false),
        };
        if field.is_empty() {
            return None;
        }
        Some(Self {
            field: field.to_string(),
            descending,
        })
    }

    fn order(&self) -> Order {
        if self.descending {
            Order::Desc
        } else {
            Order::Asc
        }
    }

    /// Applies this key to `select`, resolving the field through `column`.
    pub(crate) fn apply<E, F>(&self, select: Select<E>, column: F) -> ResultEngine<Select<E>>
    where
        E: EntityTrait,
        F: Fn(&str) -> Option<E::Column>,
    {
        let col = column(&self.field).ok_or_else(|| {
            EngineError::InvalidInput(format!("unknown sort key: {}", self.field))
        })?;
        Ok(select.order_by(col, self.order()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
    pub sort: Option<Sort>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
            sort: None,
        }
    }
}

impl PageRequest {
    /// Normalizes raw query parameters: `page >= 1`, `limit` in
    /// `1..=MAX_LIMIT` (default `DEFAULT_LIMIT`).
    pub fn new(page: Option<u64>, limit: Option<u64>, sort: Option<&str>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            sort: sort.and_then(Sort::parse),
        }
    }

    /// A date-range page: same as [`PageRequest::new`] with a fixed limit.
    pub fn range(page: Option<u64>, sort: Option<&str>) -> Self {
        Self {
            limit: RANGE_LIMIT,
            ..Self::new(page, None, sort)
        }
    }
}

/// One page of a listing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn prev_page(&self) -> Option<u64> {
        self.has_prev().then(|| self.page - 1)
    }

    pub fn next_page(&self) -> Option<u64> {
        self.has_next().then(|| self.page + 1)
    }

    pub(crate) fn try_map<U>(
        self,
        convert: impl FnOnce(Vec<T>) -> ResultEngine<Vec<U>>,
    ) -> ResultEngine<Page<U>> {
        Ok(Page {
            items: convert(self.items)?,
            total_items: self.total_items,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        })
    }
}

/// Runs `select` as one page of `request`.
///
/// A page past the last one is answered empty without querying rows.
pub(crate) async fn fetch_page<C, E, M>(
    conn: &C,
    select: Select<E>,
    request: &PageRequest,
) -> ResultEngine<Page<M>>
where
    C: ConnectionTrait,
    E: EntityTrait<Model = M>,
    M: FromQueryResult + Sized + Send + Sync + 'static,
{
    let paginator = select.paginate(conn, request.limit);
    let ItemsAndPagesNumber {
        number_of_items,
        number_of_pages,
    } = paginator.num_items_and_pages().await?;
    let items = if request.page > number_of_pages {
        Vec::new()
    } else {
        paginator.fetch_page(request.page - 1).await?
    };
    Ok(Page {
        items,
        total_items: number_of_items,
        page: request.page,
        limit: request.limit,
        total_pages: number_of_pages,
    })
}
