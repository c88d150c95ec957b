use crate::core::normalizer::parse_date;
use crate::domain::model::{SalesRecord, ValidationVerdict, Violation};

/// Checks every rule and collects all violations in column order.
///
/// Quantity, unit price and total are checked independently; they are not
/// reconciled against each other.
pub fn validate_record(record: &SalesRecord) -> ValidationVerdict {
    let mut violations = Vec::new();

    if record.transaction_id.is_empty() {
        violations.push(Violation::TransactionId);
    }
    // 已正規化的日期也重新驗證
    if parse_date(&record.date).is_none() {
        violations.push(Violation::Date);
    }
    if record.product_id.is_empty() {
        violations.push(Violation::ProductId);
    }
    if record.product_name.is_empty() {
        violations.push(Violation::ProductName);
    }
    if record.quantity <= 0.0 {
        violations.push(Violation::Quantity);
    }
    if record.unit_price <= 0.0 {
        violations.push(Violation::UnitPrice);
    }
    if record.total_amount <= 0.0 {
        violations.push(Violation::TotalAmount);
    }
    if record.country.is_empty() {
        violations.push(Violation::Country);
    }
    if record.payment_method.is_empty() {
        violations.push(Violation::PaymentMethod);
    }

    ValidationVerdict::from_violations(violations)
}

pub fn validate_records(records: &[SalesRecord]) -> Vec<ValidationVerdict> {
    records.iter().map(validate_record).collect()
}
