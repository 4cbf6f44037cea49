use crate::model::PaginationInfo;

/// Pages shown on each side of the current one.
const WINDOW: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// Page buttons for `current` out of `total`: first, last and a window around the
/// current page. A gap of a single page is filled in, larger gaps collapse to an ellipsis.
pub fn page_numbers(current: u32, total: u32) -> Vec<PageItem> {
    let current = current as i64;
    let total = total as i64;
    let mut visible: Vec<i64> = [1, total]
        .into_iter()
        .chain(current - WINDOW..=current + WINDOW)
        .filter(|&i| (1..=total).contains(&i))
        .collect();
    visible.sort_unstable();
    visible.dedup();

    let mut items = Vec::new();
    let mut last: Option<i64> = None;
    for i in visible {
        if let Some(l) = last {
            if i - l == 2 {
                items.push(PageItem::Page((l + 1) as u32));
            } else if i - l != 1 {
                items.push(PageItem::Ellipsis);
            }
        }
        items.push(PageItem::Page(i as u32));
        last = Some(i);
    }
    items
}

/// Index of the first and last item on `current`, both 1-based.
pub fn item_range(current: u32, info: &PaginationInfo) -> (i64, i64) {
    let current = current as i64;
    let start = (current - 1)
        .saturating_mul(info.items_per_page)
        .saturating_add(1);
    let end = current
        .saturating_mul(info.items_per_page)
        .min(info.total_items);
    (start, end)
}

/// `Showing 10 to 18 of 25 posts`
pub fn range_label(current: u32, info: &PaginationInfo) -> String {
    let (start, end) = item_range(current, info);
    format!("Showing {} to {} of {} posts", start, end, info.total_items)
}

/// Pagination controls are only drawn when there is more than one page.
pub fn is_paginated(info: &PaginationInfo) -> bool {
    info.total_pages > 1
}
