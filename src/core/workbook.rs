//! Workbook input (`excel` feature). Only the first sheet is read.
//!
//! Two layouts are understood:
//! - [`WorkbookLayout::Packed`]: each sale sits in one column-B cell as
//!   comma-joined fields; rows whose B cell is empty are skipped.
//! - [`WorkbookLayout::Rows`]: one field per column; blank rows are skipped.
//!
//! Both produce the same raw table as [`decode_table`](crate::core::pipeline::decode_table),
//! header row included.

use crate::core::normalizer::CANONICAL_DATE_FORMAT;
use crate::domain::model::{RawRow, WorkbookLayout};
use crate::utils::error::{EtlError, Result};
use calamine::{open_workbook_auto_from_rs, Data, DataType, Range, Reader};
use std::io::Cursor;

/// 打包格式的資料都在 B 欄
pub const PACKED_COLUMN: u32 = 1;

pub fn decode_workbook(data: &[u8], layout: WorkbookLayout) -> Result<Vec<RawRow>> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(data.to_vec())).map_err(workbook_error)?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(workbook_error)?,
        None => {
            tracing::warn!("Workbook has no sheets");
            return Ok(Vec::new());
        }
    };
    tracing::debug!(
        "First sheet spans {:?} to {:?}",
        range.start(),
        range.end()
    );

    let table = match layout {
        WorkbookLayout::Packed => packed_rows(&range),
        WorkbookLayout::Rows => full_rows(&range),
    };
    Ok(table)
}

fn packed_rows(range: &Range<Data>) -> Vec<RawRow> {
    let (Some((first, _)), Some((last, _))) = (range.start(), range.end()) else {
        return Vec::new();
    };

    (first..=last)
        .filter_map(|row| range.get_value((row, PACKED_COLUMN)))
        .map(cell_text)
        .filter(|text| !text.is_empty())
        .map(|text| text.split(',').map(|part| part.trim().to_string()).collect())
        .collect()
}

fn full_rows(range: &Range<Data>) -> Vec<RawRow> {
    range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<RawRow>())
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .collect()
}

/// Cell as the text a delimited export would have held.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        Data::DateTime(_) => cell
            .as_date()
            .map(|date| date.format(CANONICAL_DATE_FORMAT).to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

fn workbook_error(err: calamine::Error) -> EtlError {
    EtlError::WorkbookError {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACKED: &[u8] = include_bytes!("../../tests/fixtures/ventas.xlsx");
    const ROWS: &[u8] = include_bytes!("../../tests/fixtures/ventas_filas.xlsx");

    #[test]
    fn test_packed_layout_splits_column_b() {
        let table = decode_workbook(PACKED, WorkbookLayout::Packed).unwrap();

        // 標題 + 三筆銷售，B 欄空白的那列被略過
        assert_eq!(table.len(), 4);
        assert_eq!(table[0][0], "id_transaccion");
        assert_eq!(table[0].len(), 10);
        assert_eq!(
            table[1],
            vec![
                "T1", "2024-03-15", "P1", "Café Molido", "Bebidas", "2", "10.00", "20.00",
                "México", "Tarjeta"
            ]
        );
        assert_eq!(table[2][0], "T2");
        assert_eq!(table[3][0], "T3");
    }

    #[test]
    fn test_rows_layout_reads_every_column() {
        let table = decode_workbook(ROWS, WorkbookLayout::Rows).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table[0][9], "metodo_pago");
        assert_eq!(table[1][5], "2");
        assert_eq!(table[1][6], "10.5");
        assert_eq!(table[1][7], "21");
        assert_eq!(table[2][1], "not-a-date");
    }

    #[test]
    fn test_rows_workbook_read_as_packed_yields_only_column_b() {
        let table = decode_workbook(ROWS, WorkbookLayout::Packed).unwrap();
        assert_eq!(table, vec![vec!["fecha"], vec!["2024-03-15"], vec!["not-a-date"]]);
    }

    #[test]
    fn test_garbage_bytes_are_workbook_error() {
        let err = decode_workbook(b"id,fecha\nT1,2024-01-01\n", WorkbookLayout::Packed).unwrap_err();
        assert!(matches!(err, EtlError::WorkbookError { .. }));
    }
}
