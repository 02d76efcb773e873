// src/services/position_import.rs
//
// Spreadsheet rows -> positions. Pure parsing; persistence lives in PositionService.

use std::{collections::HashMap, io::Cursor, str::FromStr};

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use rust_decimal::Decimal;

use crate::{common::error::AppError, models::position::NewPosition};

// Header spellings per field, tried in order; the first non-empty cell wins.
const NUMBER: &[&str] = &["number", "Number", "№"];
const NAME: &[&str] = &["name", "Name", "Наименование"];
const DESCRIPTION: &[&str] = &["description", "Description", "Описание"];
const UNIT: &[&str] = &["unit", "Unit", "Ед. изм."];
const QUANTITY: &[&str] = &["quantity", "Quantity", "Количество"];
const UNIT_PRICE: &[&str] = &["unit_price", "Unit Price", "Цена за ед."];
const TOTAL_PRICE: &[&str] = &["total_price", "Total Price", "Сумма"];
const NOTES: &[&str] = &["notes", "Notes", "Примечания"];

/// Reads the first sheet of an xlsx/xls/ods workbook.
pub fn parse_workbook(bytes: Vec<u8>) -> Result<Vec<NewPosition>, AppError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| AppError::BadRequest(format!("Unreadable spreadsheet: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::BadRequest("Spreadsheet has no sheets".into()))?
        .map_err(|e| AppError::BadRequest(format!("Unreadable spreadsheet: {}", e)))?;

    let rows: Vec<Vec<Data>> = range.rows().map(|row| row.to_vec()).collect();
    Ok(parse_rows(&rows))
}

/// First row is the header; blank rows are skipped.
pub fn parse_rows(rows: &[Vec<Data>]) -> Vec<NewPosition> {
    let Some((header, body)) = rows.split_first() else {
        return Vec::new();
    };

    let columns: HashMap<&str, usize> = header
        .iter()
        .enumerate()
        .filter_map(|(idx, cell)| match cell {
            Data::String(s) => Some((s.trim(), idx)),
            _ => None,
        })
        .collect();

    body.iter()
        .filter(|row| row.iter().any(|cell| cell_text(cell).is_some()))
        .enumerate()
        .map(|(idx, row)| {
            let field = |aliases| pick(row, &columns, aliases);

            let number = field(NUMBER)
                .and_then(cell_number)
                .and_then(|n| i32::try_from(n.trunc() as i64).ok())
                .filter(|n| *n > 0)
                .unwrap_or(idx as i32 + 1);

            NewPosition {
                number,
                name: field(NAME).and_then(cell_text).unwrap_or_default(),
                description: field(DESCRIPTION).and_then(cell_text),
                unit: field(UNIT).and_then(cell_text),
                quantity: Some(field(QUANTITY).and_then(cell_decimal).unwrap_or(Decimal::ZERO)),
                unit_price: Some(field(UNIT_PRICE).and_then(cell_decimal).unwrap_or(Decimal::ZERO)),
                total_price: Some(field(TOTAL_PRICE).and_then(cell_decimal).unwrap_or(Decimal::ZERO)),
                notes: field(NOTES).and_then(cell_text),
            }
        })
        .collect()
}

fn pick<'r>(row: &'r [Data], columns: &HashMap<&str, usize>, aliases: &[&str]) -> Option<&'r Data> {
    aliases
        .iter()
        .filter_map(|alias| columns.get(alias).and_then(|col| row.get(*col)))
        .find(|cell| cell_text(cell).is_some())
}

fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        _ => String::new(),
    };
    (!text.is_empty()).then_some(text)
}

fn cell_number(cell: &Data) -> Option<f64> {
    let number = match cell {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) => Some(*f),
        Data::String(s) => normalize_numeric(s).parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn cell_decimal(cell: &Data) -> Option<Decimal> {
    match cell {
        Data::Int(i) => Some(Decimal::from(*i)),
        Data::Float(f) => Decimal::try_from(*f).ok(),
        Data::String(s) => Decimal::from_str(&normalize_numeric(s)).ok(),
        _ => None,
    }
}

// "1 234,50" -> "1234.50"
fn normalize_numeric(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    fn dec(v: &str) -> Option<Decimal> {
        Some(Decimal::from_str(v).unwrap())
    }

    #[test]
    fn english_headers() {
        let rows = vec![
            vec![s("number"), s("name"), s("unit"), s("quantity"), s("unit_price")],
            vec![Data::Int(1), s("A4 paper"), s("pack"), Data::Float(100.0), Data::Float(4.5)],
            vec![Data::Int(2), s("A3 paper"), s("pack"), Data::Float(20.0), Data::Float(9.25)],
        ];

        let positions = parse_rows(&rows);
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].number, 1);
        assert_eq!(positions[0].name, "A4 paper");
        assert_eq!(positions[0].unit.as_deref(), Some("pack"));
        assert_eq!(positions[0].quantity, dec("100"));
        assert_eq!(positions[1].unit_price, dec("9.25"));
        assert_eq!(positions[1].total_price, Some(Decimal::ZERO));
    }

    #[test]
    fn russian_headers_and_decimal_comma() {
        let rows = vec![
            vec![s("№"), s("Наименование"), s("Ед. изм."), s("Количество"), s("Цена за ед."), s("Сумма")],
            vec![s("7"), s("Бумага"), s("пачка"), s("10"), s("1 250,50"), s("12505")],
        ];

        let positions = parse_rows(&rows);
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].number, 7);
        assert_eq!(positions[0].name, "Бумага");
        assert_eq!(positions[0].unit_price, dec("1250.50"));
        assert_eq!(positions[0].total_price, dec("12505"));
    }

    #[test]
    fn earlier_alias_wins_when_both_present() {
        let rows = vec![
            vec![s("Name"), s("name"), s("Наименование")],
            vec![s("second"), s("first"), s("third")],
            vec![s("second"), Data::Empty, s("third")],
        ];

        let positions = parse_rows(&rows);
        assert_eq!(positions[0].name, "first");
        // empty cell falls through to the next alias
        assert_eq!(positions[1].name, "second");
    }

    #[test]
    fn missing_fields_take_defaults_and_blank_rows_are_skipped() {
        let rows = vec![
            vec![s("name"), s("quantity")],
            vec![s("first"), Data::Empty],
            vec![Data::Empty, Data::Empty],
            vec![s("second"), s("not a number")],
        ];

        let positions = parse_rows(&rows);
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].number, 1);
        assert_eq!(positions[1].number, 2);
        assert_eq!(positions[0].quantity, Some(Decimal::ZERO));
        assert_eq!(positions[1].quantity, Some(Decimal::ZERO));
        assert_eq!(positions[0].unit_price, Some(Decimal::ZERO));
        assert_eq!(positions[0].unit, None);
    }

    #[test]
    fn non_positive_number_falls_back_to_row_index() {
        let rows = vec![
            vec![s("number"), s("name")],
            vec![Data::Int(0), s("zero")],
            vec![Data::Float(3.9), s("three")],
        ];

        let positions = parse_rows(&rows);
        assert_eq!(positions[0].number, 1);
        assert_eq!(positions[1].number, 3);
    }

    #[test]
    fn header_only_sheet_yields_nothing() {
        assert!(parse_rows(&[vec![s("name")]]).is_empty());
        assert!(parse_rows(&[]).is_empty());
    }

    #[test]
    fn reads_a_real_xlsx_file() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, title) in ["number", "name", "unit", "quantity", "unit_price"].iter().enumerate() {
            sheet.write_string(0, col as u16, *title).unwrap();
        }
        for row in 1..=3u32 {
            sheet.write_number(row, 0, row as f64).unwrap();
            sheet.write_string(row, 1, format!("Item {row}")).unwrap();
            sheet.write_string(row, 2, "pcs").unwrap();
            sheet.write_number(row, 3, 10.0 * row as f64).unwrap();
            sheet.write_number(row, 4, 2.5).unwrap();
        }
        let bytes = workbook.save_to_buffer().unwrap();

        let positions = parse_workbook(bytes).unwrap();
        assert_eq!(positions.len(), 3);
        assert_eq!(positions[2].name, "Item 3");
        assert_eq!(positions[2].quantity, dec("30"));
        assert_eq!(positions[0].unit_price, dec("2.5"));
    }

    #[test]
    fn garbage_bytes_are_a_bad_request() {
        let err = parse_workbook(b"definitely not a workbook".to_vec()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
