//! Page requests, page results and the concurrent row/count pagination helper.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

/// A validated request for one page of a result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
    sort: Option<Sort>,
}

impl PageRequest {
    /// Build a request, rejecting a zero size or one above `max_size`.
    pub fn new(page: u32, size: u32, max_size: u32) -> CatalogResult<Self> {
        if size == 0 {
            return Err(CatalogError::validation("page size must be greater than zero"));
        }
        if size > max_size {
            return Err(CatalogError::validation(format!(
                "page size {size} exceeds the maximum of {max_size}"
            )));
        }
        Ok(Self {
            page,
            size,
            sort: None,
        })
    }

    pub fn first(size: u32) -> CatalogResult<Self> {
        Self::new(0, size, MAX_PAGE_SIZE)
    }

    pub fn with_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(Sort {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> Option<&Sort> {
        self.sort.as_ref()
    }

    /// Reject sort fields the entity does not expose.
    pub fn check_sort(&self, sortable: &[&str]) -> CatalogResult<()> {
        match &self.sort {
            Some(sort) if !sortable.contains(&sort.field.as_str()) => {
                Err(CatalogError::validation(format!(
                    "cannot sort by '{}'; expected one of: {}",
                    sort.field,
                    sortable.join(", ")
                )))
            }
            _ => Ok(()),
        }
    }

    pub fn spec(&self) -> PageSpec {
        PageSpec {
            offset: u64::from(self.page) * u64::from(self.size),
            limit: u64::from(self.size),
            sort: self.sort.clone(),
        }
    }
}

/// Offset/limit window handed to a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSpec {
    pub offset: u64,
    pub limit: u64,
    pub sort: Option<Sort>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub page: u32,
    pub size: u32,
    pub first: bool,
    pub last: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, total_elements: u64, request: &PageRequest) -> Self {
        let size = u64::from(request.size());
        let total_pages = total_elements.div_ceil(size);
        let page = request.page();
        Self {
            content,
            total_elements,
            total_pages,
            page,
            size: request.size(),
            first: page == 0,
            last: u64::from(page) + 1 >= total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            page: self.page,
            size: self.size,
            first: self.first,
            last: self.last,
        }
    }
}

/// Fetch one page and the total count concurrently, then map rows in fetch order.
///
/// Either fetcher failing fails the whole call; no partial page is returned.
pub async fn paginate<E, D, RowsFut, CountFut>(
    request: &PageRequest,
    fetch_rows: impl FnOnce(PageSpec) -> RowsFut,
    fetch_count: impl FnOnce() -> CountFut,
    map: impl FnMut(E) -> D,
) -> anyhow::Result<Page<D>>
where
    RowsFut: Future<Output = anyhow::Result<Vec<E>>>,
    CountFut: Future<Output = anyhow::Result<u64>>,
{
    let (rows, total) = tokio::try_join!(fetch_rows(request.spec()), fetch_count())?;
    let content = rows.into_iter().map(map).collect();
    Ok(Page::new(content, total, request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn window(items: &[u32], spec: &PageSpec) -> Vec<u32> {
        items
            .iter()
            .copied()
            .skip(spec.offset as usize)
            .take(spec.limit as usize)
            .collect()
    }

    #[tokio::test]
    async fn test_paginate_assembles_metadata() {
        let items: Vec<u32> = (0..25).collect();
        let request = PageRequest::first(10).unwrap();

        let page = paginate(
            &request,
            |spec| {
                let rows = window(&items, &spec);
                async move { Ok(rows) }
            },
            || async { Ok(25) },
            |n| n * 2,
        )
        .await
        .unwrap();

        assert_eq!(page.content, (0..10).map(|n| n * 2).collect::<Vec<_>>());
        assert_eq!(page.total_elements, 25);
        assert_eq!(page.total_pages, 3);
        assert!(page.first);
        assert!(!page.last);
    }

    #[tokio::test]
    async fn test_last_partial_page() {
        let items: Vec<u32> = (0..25).collect();
        let request = PageRequest::new(2, 10, MAX_PAGE_SIZE).unwrap();

        let page = paginate(
            &request,
            |spec| {
                let rows = window(&items, &spec);
                async move { Ok(rows) }
            },
            || async { Ok(25) },
            |n| n,
        )
        .await
        .unwrap();

        assert_eq!(page.content, vec![20, 21, 22, 23, 24]);
        assert!(!page.first);
        assert!(page.last);
    }

    #[tokio::test]
    async fn test_empty_and_out_of_range_pages_are_not_errors() {
        let empty = paginate(
            &PageRequest::first(10).unwrap(),
            |_| async { Ok(Vec::<u32>::new()) },
            || async { Ok(0) },
            |n| n,
        )
        .await
        .unwrap();
        assert!(empty.content.is_empty());
        assert_eq!(empty.total_elements, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(empty.last);

        let beyond = paginate(
            &PageRequest::new(7, 10, MAX_PAGE_SIZE).unwrap(),
            |spec| {
                let rows = window(&[1, 2, 3], &spec);
                async move { Ok(rows) }
            },
            || async { Ok(3) },
            |n| n,
        )
        .await
        .unwrap();
        assert!(beyond.content.is_empty());
        assert_eq!(beyond.total_pages, 1);
    }

    #[tokio::test]
    async fn test_fetcher_failure_fails_the_page() {
        let rows_failed = paginate(
            &PageRequest::first(5).unwrap(),
            |_| async { Err::<Vec<u32>, _>(anyhow::anyhow!("rows unavailable")) },
            || async { Ok(3) },
            |n| n,
        )
        .await;
        assert_eq!(rows_failed.unwrap_err().to_string(), "rows unavailable");

        let count_failed = paginate(
            &PageRequest::first(5).unwrap(),
            |_| async { Ok(vec![1u32]) },
            || async { Err(anyhow::anyhow!("count unavailable")) },
            |n| n,
        )
        .await;
        assert_eq!(count_failed.unwrap_err().to_string(), "count unavailable");
    }

    #[tokio::test]
    async fn test_row_and_count_fetch_overlap() {
        // The count future only resolves once the row future has started,
        // which deadlocks if the two were awaited one after the other.
        let rows_started = Arc::new(AtomicBool::new(false));
        let flag = rows_started.clone();

        let page = paginate(
            &PageRequest::first(5).unwrap(),
            move |_| async move {
                flag.store(true, Ordering::SeqCst);
                Ok(vec![1u32, 2])
            },
            || {
                let started = rows_started.clone();
                async move {
                    while !started.load(Ordering::SeqCst) {
                        tokio::task::yield_now().await;
                    }
                    Ok(2)
                }
            },
            |n| n,
        )
        .await
        .unwrap();

        assert_eq!(page.total_elements, 2);
    }

    #[test]
    fn test_page_request_validation() {
        assert_eq!(
            PageRequest::new(0, 0, MAX_PAGE_SIZE).unwrap_err().kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            PageRequest::new(0, MAX_PAGE_SIZE + 1, MAX_PAGE_SIZE)
                .unwrap_err()
                .kind(),
            ErrorKind::Validation
        );

        let spec = PageRequest::new(3, 15, MAX_PAGE_SIZE).unwrap().spec();
        assert_eq!(spec.offset, 45);
        assert_eq!(spec.limit, 15);
    }

    #[test]
    fn test_unknown_sort_field_is_rejected() {
        let request = PageRequest::first(10)
            .unwrap()
            .with_sort("password", SortDirection::Desc);
        let err = request.check_sort(&["name", "created_at"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let ok = PageRequest::first(10).unwrap().with_sort("name", SortDirection::Asc);
        assert!(ok.check_sort(&["name", "created_at"]).is_ok());
    }
}
