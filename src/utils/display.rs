use crate::core::etl::EtlOutput;
use crate::core::query::{paginate, sort_for_display, Page, RecordFilter, DEFAULT_PAGE_SIZE};
use crate::domain::model::{CleaningSummary, DashboardSummary, SalesRecord};

pub const PREVIEW_ROWS: usize = 5;

pub fn render_cleaning(summary: &CleaningSummary) -> String {
    format!(
        "🧹 Cleaning: {} rows, {} valid, {} invalid ({:.1}% valid)",
        summary.total, summary.valid, summary.invalid, summary.validity_rate
    )
}

pub fn render_dashboard(dashboard: &DashboardSummary) -> String {
    let mut lines = Vec::new();
    match dashboard.month_filter {
        Some(month) => lines.push(format!("📊 Dashboard (month {:02})", month)),
        None => lines.push("📊 Dashboard".to_string()),
    }
    lines.push(format!("  Total sales: ${:.2}", dashboard.total_sales));
    lines.push(format!("  Transactions: {}", dashboard.total_transactions));
    lines.push(format!("  Average ticket: ${:.2}", dashboard.average_ticket));

    lines.push("  Top products:".to_string());
    for (rank, product) in dashboard.top_products.iter().enumerate() {
        lines.push(format!(
            "    {}. {} - ${:.2} ({} units)",
            rank + 1,
            product.name,
            product.total,
            product.quantity
        ));
    }

    lines.push("  Sales by month:".to_string());
    for month in &dashboard.sales_by_month {
        lines.push(format!("    {}: ${:.2}", month.month, month.total));
    }

    lines.push("  Payment methods:".to_string());
    for share in &dashboard.payment_methods {
        lines.push(format!(
            "    {}: {} ({:.1}%)",
            share.method, share.count, share.percentage
        ));
    }

    lines.push("  Sales by country:".to_string());
    for country in &dashboard.sales_by_country {
        lines.push(format!(
            "    {}: ${:.2} in {} transactions",
            country.country, country.total, country.transactions
        ));
    }

    lines.join("\n")
}

/// One page of the filtered, display-ordered record listing.
pub fn record_page<'a>(
    records: &'a [SalesRecord],
    filter: &RecordFilter,
    page: usize,
) -> Page<&'a SalesRecord> {
    let mut matched = filter.apply(records);
    sort_for_display(&mut matched);
    paginate(&matched, page, DEFAULT_PAGE_SIZE)
}

pub fn render_page(page: &Page<&SalesRecord>) -> String {
    let mut lines = vec![format!(
        "📋 Showing {} of {} records (page {}/{})",
        page.items.len(),
        page.total_items,
        page.page,
        page.total_pages
    )];
    for record in &page.items {
        lines.push(format!(
            "  {} | {} | {} | {} | {} x ${:.2} = ${:.2} | {} | {}",
            record.transaction_id,
            record.date,
            record.category,
            record.product_name,
            record.quantity,
            record.unit_price,
            record.total_amount,
            record.country,
            record.payment_method
        ));
    }
    lines.join("\n")
}

/// Summary, preview and (when there is anything valid) the dashboard.
pub fn print_run_report(output: &EtlOutput) {
    let result = &output.result;
    println!("{}", render_cleaning(&result.summary));

    println!("🔍 Preview:");
    for (record, verdict) in result.preview(PREVIEW_ROWS) {
        let mark = if verdict.is_valid { "✓" } else { "✗" };
        println!(
            "  {} {} | {} | {} | ${}",
            mark, record.transaction_id, record.date, record.product_name, record.total_amount
        );
    }
    if result.records.len() > PREVIEW_ROWS {
        println!("  ... and {} more records", result.records.len() - PREVIEW_ROWS);
    }

    if result.summary.invalid > 0 {
        println!(
            "⚠️  {} records had problems and were excluded from the analysis",
            result.summary.invalid
        );
    }

    if result.valid_records.is_empty() {
        println!("No valid records to analyze.");
        return;
    }
    println!("{}", render_dashboard(&result.dashboard));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cleaning::clean_rows;
    use crate::core::record_builder::BuilderOptions;

    fn records() -> Vec<SalesRecord> {
        let rows: Vec<Vec<String>> = (1..=12)
            .map(|i| {
                let category = if i % 2 == 0 { "Books" } else { "Tools" };
                vec![
                    format!("T{}", i),
                    format!("2024-01-{:02}", i),
                    "P1".to_string(),
                    "Widget".to_string(),
                    category.to_string(),
                    "1".to_string(),
                    "10".to_string(),
                    "10".to_string(),
                    "Mexico".to_string(),
                    "Card".to_string(),
                ]
            })
            .collect();
        clean_rows(&rows, BuilderOptions::default()).valid_records
    }

    #[test]
    fn test_record_page_orders_and_paginates() {
        let records = records();
        let page = record_page(&records, &RecordFilter::default(), 1);
        assert_eq!(page.total_items, 12);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items[0].transaction_id, "T12");
        assert_eq!(page.items[0].category, "Books");

        let tools = RecordFilter {
            category: Some("Tools".to_string()),
            search: None,
        };
        let page = record_page(&records, &tools, 1);
        assert_eq!(page.total_items, 6);
        assert_eq!(page.items[0].transaction_id, "T11");
        assert!(render_page(&page).contains("page 1/1"));
    }

    #[test]
    fn test_render_dashboard() {
        let records = records();
        let dashboard = DashboardSummary::build(&records, Some(1), 5);
        let text = render_dashboard(&dashboard);
        assert!(text.contains("month 01"));
        assert!(text.contains("Total sales: $120.00"));
        assert!(text.contains("1. Widget - $120.00 (12 units)"));
        assert!(text.contains("Card: 12 (100.0%)"));
    }

    #[test]
    fn test_render_cleaning() {
        let summary = CleaningSummary {
            total: 4,
            valid: 3,
            invalid: 1,
            cleaned: 4,
            validity_rate: 75.0,
        };
        assert_eq!(
            render_cleaning(&summary),
            "🧹 Cleaning: 4 rows, 3 valid, 1 invalid (75.0% valid)"
        );
    }
}
