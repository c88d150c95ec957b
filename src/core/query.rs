//! Read-only helpers for browsing cleaned records in a table.
//!
//! The caller owns the current filter and page; these functions only take
//! them as arguments.

use crate::core::normalizer::{parse_naive_date, strip_accents};
use crate::domain::model::SalesRecord;
use std::cmp::Ordering;
use std::collections::BTreeSet;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Distinct categories, in display order.
pub fn categories(records: &[SalesRecord]) -> Vec<String> {
    let mut distinct: Vec<String> = records
        .iter()
        .map(|r| r.category.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    distinct.sort_by(|a, b| category_order(a, b));
    distinct
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Exact category match; `None` means every category.
    pub category: Option<String>,
    /// Case-insensitive substring over product name, transaction id and country.
    pub search: Option<String>,
}

impl RecordFilter {
    pub fn matches(&self, record: &SalesRecord) -> bool {
        if let Some(category) = &self.category {
            if &record.category != category {
                return false;
            }
        }

        match self.search.as_deref().map(str::to_lowercase) {
            Some(term) if !term.is_empty() => [
                &record.product_name,
                &record.transaction_id,
                &record.country,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&term)),
            _ => true,
        }
    }

    pub fn apply<'a>(&self, records: &'a [SalesRecord]) -> Vec<&'a SalesRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// 類別排序忽略重音與大小寫 (Álimentos 排在 Bebidas 前)，相同時再比原字串
fn category_order(a: &str, b: &str) -> Ordering {
    let key = |s: &str| strip_accents(s).to_lowercase();
    key(a).cmp(&key(b)).then_with(|| a.cmp(b))
}

/// Category ascending, then newest date first. Unreadable dates go last
/// within their category.
pub fn sort_for_display(records: &mut [&SalesRecord]) {
    records.sort_by(|a, b| {
        category_order(&a.category, &b.category).then_with(|| {
            match (parse_naive_date(&a.date), parse_naive_date(&b.date)) {
                (Some(da), Some(db)) => db.cmp(&da),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        })
    });
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Slice out page `page` (1-based). Out-of-range pages come back empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);
    let page = page.max(1);

    let start = (page - 1).saturating_mul(per_page);
    let page_items = if start < total_items {
        items[start..(start + per_page).min(total_items)].to_vec()
    } else {
        Vec::new()
    };

    Page {
        items: page_items,
        page,
        total_pages,
        total_items,
    }
}
