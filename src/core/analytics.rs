//! Aggregates over already-validated sales records.
//!
//! Every function here is pure: it reads its input slice and returns a fresh
//! value. Grouping goes through a `BTreeMap`, so when two groups tie on the
//! sort key they keep ascending key order under the stable sort.

use crate::core::normalizer::parse_naive_date;
use crate::domain::model::{
    CountrySales, DashboardSummary, MonthlySales, PaymentMethodShare, ProductSales, SalesRecord,
};
use chrono::Datelike;
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub const DEFAULT_TOP_PRODUCTS: usize = 5;

/// Bucket key for records whose date cannot be read.
pub const UNKNOWN_MONTH: &str = "unknown";

pub fn total_sales(records: &[SalesRecord]) -> f64 {
    records.iter().map(|r| r.total_amount).sum()
}

pub fn total_transactions(records: &[SalesRecord]) -> usize {
    records.len()
}

pub fn average_ticket(records: &[SalesRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    total_sales(records) / records.len() as f64
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

pub fn top_products(records: &[SalesRecord], limit: usize) -> Vec<ProductSales> {
    let mut by_name: BTreeMap<&str, ProductSales> = BTreeMap::new();

    for record in records {
        let entry = by_name
            .entry(record.product_name.as_str())
            .or_insert_with(|| ProductSales {
                name: record.product_name.clone(),
                total: 0.0,
                quantity: 0.0,
            });
        entry.total += record.total_amount;
        entry.quantity += record.quantity;
    }

    let mut products: Vec<ProductSales> = by_name.into_values().collect();
    products.sort_by(|a, b| descending(a.total, b.total));
    products.truncate(limit);
    products
}

/// `YYYY-MM` for a record date, or [`UNKNOWN_MONTH`].
pub fn month_key(date: &str) -> String {
    match parse_naive_date(date) {
        Some(d) => format!("{:04}-{:02}", d.year(), d.month()),
        None => UNKNOWN_MONTH.to_string(),
    }
}

pub fn sales_by_month(records: &[SalesRecord]) -> Vec<MonthlySales> {
    let mut by_month: BTreeMap<String, f64> = BTreeMap::new();

    for record in records {
        *by_month.entry(month_key(&record.date)).or_insert(0.0) += record.total_amount;
    }

    // BTreeMap 已依字串遞增排序
    by_month
        .into_iter()
        .map(|(month, total)| MonthlySales { month, total })
        .collect()
}

pub fn payment_method_distribution(records: &[SalesRecord]) -> Vec<PaymentMethodShare> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.payment_method.as_str()).or_insert(0) += 1;
    }

    let total = records.len();
    let mut shares: Vec<PaymentMethodShare> = counts
        .into_iter()
        .map(|(method, count)| PaymentMethodShare {
            method: method.to_string(),
            count,
            percentage: count as f64 / total as f64 * 100.0,
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}

pub fn sales_by_country(records: &[SalesRecord]) -> Vec<CountrySales> {
    let mut by_country: BTreeMap<&str, CountrySales> = BTreeMap::new();

    for record in records {
        let entry = by_country
            .entry(record.country.as_str())
            .or_insert_with(|| CountrySales {
                country: record.country.clone(),
                total: 0.0,
                transactions: 0,
            });
        entry.total += record.total_amount;
        entry.transactions += 1;
    }

    let mut countries: Vec<CountrySales> = by_country.into_values().collect();
    countries.sort_by(|a, b| descending(a.total, b.total));
    countries
}

/// Records whose date falls in calendar `month` (1-12) of any year.
pub fn filter_by_month(records: &[SalesRecord], month: u32) -> Vec<SalesRecord> {
    records
        .iter()
        .filter(|r| parse_naive_date(&r.date).is_some_and(|d| d.month() == month))
        .cloned()
        .collect()
}

impl DashboardSummary {
    /// With a month filter every figure except `sales_by_month` is computed
    /// over that month only; the monthly trend always spans all records.
    pub fn build(records: &[SalesRecord], month_filter: Option<u32>, top_limit: usize) -> Self {
        let filtered;
        let scoped: &[SalesRecord] = match month_filter {
            Some(month) => {
                filtered = filter_by_month(records, month);
                &filtered
            }
            None => records,
        };

        Self {
            month_filter,
            total_sales: total_sales(scoped),
            total_transactions: total_transactions(scoped),
            average_ticket: average_ticket(scoped),
            top_products: top_products(scoped, top_limit),
            sales_by_month: sales_by_month(records),
            payment_methods: payment_method_distribution(scoped),
            sales_by_country: sales_by_country(scoped),
        }
    }
}
