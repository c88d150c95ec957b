use serde::{Deserialize, Serialize};
use std::fmt;

/// 原始資料列：依欄位位置排列的字串儲存格，不含標題列
pub type RawRow = Vec<String>;

/// 預期的欄位順序 (與來源試算表相同)
pub const COLUMNS: [&str; 10] = [
    "id_transaccion",
    "fecha",
    "id_producto",
    "nombre_producto",
    "categoria",
    "cantidad",
    "precio_unitario",
    "total_venta",
    "pais",
    "metodo_pago",
];

/// How sales are laid out in the first sheet of a workbook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum WorkbookLayout {
    /// 每筆銷售擠在 B 欄的一個儲存格，以逗號分隔
    #[default]
    Packed,
    /// One field per column.
    Rows,
}

/// One normalized sales transaction line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    #[serde(rename = "id_transaccion")]
    pub transaction_id: String,
    #[serde(rename = "fecha")]
    pub date: String,
    #[serde(rename = "id_producto")]
    pub product_id: String,
    #[serde(rename = "nombre_producto")]
    pub product_name: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "cantidad")]
    pub quantity: f64,
    #[serde(rename = "precio_unitario")]
    pub unit_price: f64,
    #[serde(rename = "total_venta")]
    pub total_amount: f64,
    #[serde(rename = "pais")]
    pub country: String,
    #[serde(rename = "metodo_pago")]
    pub payment_method: String,
}

/// A single broken business rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Violation {
    TransactionId,
    Date,
    ProductId,
    ProductName,
    Quantity,
    UnitPrice,
    TotalAmount,
    Country,
    PaymentMethod,
}

impl Violation {
    /// Column the rule is checked against.
    pub fn column(&self) -> &'static str {
        match self {
            Violation::TransactionId => "id_transaccion",
            Violation::Date => "fecha",
            Violation::ProductId => "id_producto",
            Violation::ProductName => "nombre_producto",
            Violation::Quantity => "cantidad",
            Violation::UnitPrice => "precio_unitario",
            Violation::TotalAmount => "total_venta",
            Violation::Country => "pais",
            Violation::PaymentMethod => "metodo_pago",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Violation::TransactionId => "invalid transaction id",
            Violation::Date => "invalid date",
            Violation::ProductId => "invalid product id",
            Violation::ProductName => "invalid product name",
            Violation::Quantity => "quantity must be greater than 0",
            Violation::UnitPrice => "unit price must be greater than 0",
            Violation::TotalAmount => "total amount must be greater than 0",
            Violation::Country => "invalid country",
            Violation::PaymentMethod => "invalid payment method",
        };
        f.write_str(reason)
    }
}

/// Validity judgment attached to one record, paired by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub is_valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationVerdict {
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            is_valid: violations.is_empty(),
            violations,
        }
    }

    /// Human-readable reasons in rule order.
    pub fn reasons(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSales {
    pub name: String,
    pub total: f64,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySales {
    pub month: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethodShare {
    pub method: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountrySales {
    pub country: String,
    pub total: f64,
    pub transactions: usize,
}

/// 清理流程的統計數字
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub cleaned: usize,
    pub validity_rate: f64,
}

/// Every aggregate the dashboard shows, computed in one go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub month_filter: Option<u32>,
    pub total_sales: f64,
    pub total_transactions: usize,
    pub average_ticket: f64,
    pub top_products: Vec<ProductSales>,
    pub sales_by_month: Vec<MonthlySales>,
    pub payment_methods: Vec<PaymentMethodShare>,
    pub sales_by_country: Vec<CountrySales>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub records: Vec<SalesRecord>,
    pub verdicts: Vec<ValidationVerdict>,
    pub valid_records: Vec<SalesRecord>,
    pub summary: CleaningSummary,
    pub dashboard: DashboardSummary,
}

impl TransformResult {
    /// First `limit` cleaned records with their verdicts.
    pub fn preview(&self, limit: usize) -> impl Iterator<Item = (&SalesRecord, &ValidationVerdict)> {
        self.records.iter().zip(self.verdicts.iter()).take(limit)
    }

    /// Invalid records zipped with their verdicts, in input order.
    pub fn rejected(&self) -> impl Iterator<Item = (&SalesRecord, &ValidationVerdict)> {
        self.records
            .iter()
            .zip(self.verdicts.iter())
            .filter(|(_, verdict)| !verdict.is_valid)
    }
}
