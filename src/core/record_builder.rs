use crate::core::normalizer::{parse_date, parse_number, strip_accents, strip_special_characters};
use crate::domain::model::SalesRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuilderOptions {
    /// 文字欄位先去除重音再清理特殊字元
    pub fold_accents: bool,
}

/// Maps positional cells onto the fixed 10-column schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordBuilder {
    options: BuilderOptions,
}

impl RecordBuilder {
    pub fn new(options: BuilderOptions) -> Self {
        Self { options }
    }

    /// Always produces a record; short rows get `""` for text cells and
    /// `"0"` for numeric cells, and extra cells are ignored.
    pub fn build<S: AsRef<str>>(&self, row: &[S]) -> SalesRecord {
        let text = |index: usize| self.clean_text(cell(row, index, ""));
        let number = |index: usize| parse_number(cell(row, index, "0"));

        let raw_date = cell(row, 1, "");

        SalesRecord {
            transaction_id: text(0),
            date: parse_date(raw_date).unwrap_or_else(|| raw_date.trim().to_string()),
            product_id: text(2),
            product_name: text(3),
            category: text(4),
            quantity: number(5),
            unit_price: number(6),
            total_amount: number(7),
            country: text(8),
            payment_method: text(9),
        }
    }

    pub fn build_all<S: AsRef<str>>(&self, rows: &[Vec<S>]) -> Vec<SalesRecord> {
        rows.iter().map(|row| self.build(row)).collect()
    }

    fn clean_text(&self, value: &str) -> String {
        if self.options.fold_accents {
            strip_special_characters(&strip_accents(value))
        } else {
            strip_special_characters(value)
        }
    }
}

fn cell<'a, S: AsRef<str>>(row: &'a [S], index: usize, default: &'static str) -> &'a str {
    row.get(index).map(|c| c.as_ref()).unwrap_or(default)
}

/// Drops the header row. A table with fewer than two rows has no data.
pub fn split_header(mut table: Vec<Vec<String>>) -> Vec<Vec<String>> {
    if table.len() < 2 {
        return Vec::new();
    }
    table.remove(0);
    table
}
