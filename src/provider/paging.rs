use crate::Result;
use std::future::Future;
use tracing::debug;

/// Position reported by an API that returns a total page count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub current: u32,
    pub total: u32,
}

impl PageCursor {
    pub const fn new(current: u32, total: u32) -> Self {
        Self { current, total }
    }

    pub const fn is_last(&self) -> bool {
        self.current >= self.total
    }
}

/// Fetch the remaining pages after `first` sequentially, appending items in page order.
///
/// `fetch` receives the next page number. Stops when the cursor reaches the
/// total or when a page does not advance the cursor.
pub async fn collect_pages<T, F, Fut>(first: (Vec<T>, PageCursor), mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, PageCursor)>>,
{
    let (mut items, mut cursor) = first;

    while !cursor.is_last() {
        let (page, next) = fetch(cursor.current + 1).await?;
        items.extend(page);

        if next.current <= cursor.current {
            debug!("Page cursor did not advance past {}, stopping", cursor.current);
            break;
        }
        cursor = next;
    }

    Ok(items)
}

/// Probe-pagination end detection: whether page N+1 is worth requesting
#[must_use]
pub fn has_more(received: usize, page_size: Option<usize>) -> bool {
    match page_size {
        Some(size) => received >= size && received > 0,
        None => received > 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collect_pages_in_order() {
        let items = collect_pages((vec![1, 2], PageCursor::new(1, 3)), |page| async move {
            Ok((vec![page * 10], PageCursor::new(page, 3)))
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 20, 30]);
    }

    #[tokio::test]
    async fn test_collect_pages_single_page() {
        let items = collect_pages((vec!["a"], PageCursor::new(1, 1)), |_| async {
            Err(crate::Error::NotFound("no further page expected".to_string()))
        })
        .await
        .unwrap();

        assert_eq!(items, vec!["a"]);
    }

    #[tokio::test]
    async fn test_collect_pages_current_past_total() {
        let items = collect_pages((vec![1], PageCursor::new(4, 2)), |_| async {
            Err(crate::Error::NotFound("no further page expected".to_string()))
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1]);
    }

    #[test]
    fn test_has_more() {
        assert!(has_more(20, Some(20)));
        assert!(!has_more(7, Some(20)));
        assert!(!has_more(0, None));
        assert!(has_more(3, None));
    }
}
