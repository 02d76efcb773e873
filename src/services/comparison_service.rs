// src/services/comparison_service.rs

use std::collections::HashMap;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{PositionRepository, QuoteRepository},
    models::{
        comparison::{
            ComparisonCell, ComparisonLot, ComparisonMatrix, ComparisonPosition, ComparisonQuote,
            ComparisonRow,
        },
        lot::Lot,
        position::Position,
        quote::QuotePosition,
    },
    services::labels::Lang,
};

#[derive(Clone)]
pub struct ComparisonService {
    position_repo: PositionRepository,
    quote_repo: QuoteRepository,
}

impl ComparisonService {
    pub fn new(position_repo: PositionRepository, quote_repo: QuoteRepository) -> Self {
        Self { position_repo, quote_repo }
    }

    pub async fn matrix(&self, lot: &Lot) -> Result<ComparisonMatrix, AppError> {
        let positions = self.position_repo.list_by_lot(lot.id).await?;
        let quotes = self.quote_repo.list_comparable(lot.id).await?;
        let line_items = self.quote_repo.list_comparable_line_items(lot.id).await?;

        Ok(build_matrix(lot, positions, quotes, &line_items))
    }
}

/// Rows follow the positions, columns follow the quotes.
///
/// Only Submitted/Evaluated/Accepted quotes become columns, cheapest total first
/// (quotes without a total go last). A position a supplier did not price gets an
/// empty cell; a cell without its own delivery time inherits the quote's.
pub fn build_matrix(
    lot: &Lot,
    mut positions: Vec<Position>,
    mut quotes: Vec<ComparisonQuote>,
    line_items: &[QuotePosition],
) -> ComparisonMatrix {
    positions.sort_by_key(|p| p.number);
    quotes.retain(|q| q.quote.status.is_comparable());
    // stable: equal totals keep the store's order
    quotes.sort_by(|a, b| match (a.quote.total_amount, b.quote.total_amount) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let by_pair: HashMap<(Uuid, Uuid), &QuotePosition> = line_items
        .iter()
        .map(|item| ((item.position_id, item.quote_id), item))
        .collect();

    let comparison = positions
        .iter()
        .map(|position| ComparisonRow {
            position: ComparisonPosition::from(position),
            quotes: quotes
                .iter()
                .map(|q| {
                    let item = by_pair.get(&(position.id, q.quote.id));
                    ComparisonCell {
                        quote_id: q.quote.id,
                        supplier_name: q.supplier_name.clone(),
                        supplier_inn: q.supplier_inn.clone(),
                        unit_price: item.map(|i| i.unit_price),
                        quantity: item.map(|i| i.quantity),
                        total_price: item.map(|i| i.total_price),
                        delivery_time_days: item
                            .and_then(|i| i.delivery_time_days)
                            .or(q.quote.delivery_time_days),
                        notes: item.and_then(|i| i.notes.clone()),
                    }
                })
                .collect(),
        })
        .collect();

    ComparisonMatrix {
        lot: ComparisonLot::from(lot),
        positions,
        quotes,
        comparison,
    }
}

// ---
// Spreadsheet export
// ---

const FIXED_COLUMNS: u16 = 4;

/// One header row (No., Name, Unit, Quantity, then price/delivery/total per quote)
/// followed by one row per position.
pub fn export_xlsx(matrix: &ComparisonMatrix, lang: Lang) -> Result<Vec<u8>, AppError> {
    render_workbook(matrix, lang).map_err(|e| anyhow::anyhow!("Failed to build spreadsheet: {}", e).into())
}

fn render_workbook(matrix: &ComparisonMatrix, lang: Lang) -> Result<Vec<u8>, XlsxError> {
    let labels = lang.labels();
    let bold = Format::new().set_bold();

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(labels.comparison_sheet)?;

    let fixed = [labels.number, labels.name, labels.unit, labels.quantity];
    for (col, title) in fixed.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &bold)?;
    }
    for (idx, quote) in matrix.quotes.iter().enumerate() {
        let col = FIXED_COLUMNS + 3 * idx as u16;
        let name = &quote.supplier_name;
        sheet.write_string_with_format(0, col, format!("{name} ({})", labels.price), &bold)?;
        sheet.write_string_with_format(0, col + 1, format!("{name} ({})", labels.delivery), &bold)?;
        sheet.write_string_with_format(0, col + 2, format!("{name} ({})", labels.total), &bold)?;
    }

    for (idx, row) in matrix.comparison.iter().enumerate() {
        let r = idx as u32 + 1;
        sheet.write_number(r, 0, row.position.number as f64)?;
        sheet.write_string(r, 1, &row.position.name)?;
        if let Some(unit) = &row.position.unit {
            sheet.write_string(r, 2, unit)?;
        }
        write_decimal(sheet, r, 3, row.position.quantity)?;

        for (q, cell) in row.quotes.iter().enumerate() {
            let col = FIXED_COLUMNS + 3 * q as u16;
            write_decimal(sheet, r, col, cell.unit_price)?;
            if let Some(days) = cell.delivery_time_days {
                sheet.write_number(r, col + 1, days as f64)?;
            }
            write_decimal(sheet, r, col + 2, cell.total_price)?;
        }
    }

    sheet.set_column_width(1, 40)?;
    workbook.save_to_buffer()
}

fn write_decimal(sheet: &mut Worksheet, row: u32, col: u16, value: Option<Decimal>) -> Result<(), XlsxError> {
    if let Some(number) = value.and_then(|v| v.to_f64()) {
        sheet.write_number(row, col, number)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quote::{Quote, QuoteStatus};
    use calamine::{Data, Reader, Xlsx};
    use chrono::Utc;
    use std::{io::Cursor, str::FromStr};

    fn lot() -> Lot {
        Lot {
            id: Uuid::new_v4(),
            tender_id: Uuid::new_v4(),
            number: 1,
            title: "Office paper".into(),
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn position(lot: &Lot, number: i32, name: &str) -> Position {
        Position {
            id: Uuid::new_v4(),
            lot_id: lot.id,
            number,
            name: name.into(),
            description: None,
            unit: Some("pack".into()),
            quantity: Some(Decimal::from(10)),
            unit_price: None,
            total_price: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn quote(lot: &Lot, supplier: &str, status: QuoteStatus, total: Option<i64>, delivery: Option<i32>) -> ComparisonQuote {
        ComparisonQuote {
            quote: Quote {
                id: Uuid::new_v4(),
                tender_id: lot.tender_id,
                lot_id: lot.id,
                supplier_id: Uuid::new_v4(),
                status,
                submitted_at: None,
                valid_until: None,
                total_amount: total.map(Decimal::from),
                delivery_time_days: delivery,
                payment_terms: None,
                warranty_period_months: None,
                notes: None,
                created_by: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            supplier_name: supplier.into(),
            supplier_inn: None,
        }
    }

    fn item(quote: &ComparisonQuote, position: &Position, price: &str, delivery: Option<i32>) -> QuotePosition {
        let unit_price = Decimal::from_str(price).unwrap();
        let quantity = Decimal::from(10);
        QuotePosition {
            id: Uuid::new_v4(),
            quote_id: quote.quote.id,
            position_id: position.id,
            unit_price,
            quantity,
            total_price: unit_price * quantity,
            delivery_time_days: delivery,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn columns_are_comparable_quotes_cheapest_first() {
        let lot = lot();
        let positions = vec![position(&lot, 2, "A3"), position(&lot, 1, "A4")];
        let quotes = vec![
            quote(&lot, "Dear", QuoteStatus::Submitted, Some(100), None),
            quote(&lot, "Drafty", QuoteStatus::Draft, Some(10), None),
            quote(&lot, "Nobody", QuoteStatus::Accepted, None, None),
            quote(&lot, "Cheap", QuoteStatus::Evaluated, Some(90), None),
            quote(&lot, "Refused", QuoteStatus::Rejected, Some(1), None),
        ];

        let matrix = build_matrix(&lot, positions, quotes, &[]);

        let suppliers: Vec<&str> = matrix.quotes.iter().map(|q| q.supplier_name.as_str()).collect();
        assert_eq!(suppliers, ["Cheap", "Dear", "Nobody"]);
        assert_eq!(matrix.comparison.len(), 2);
        assert_eq!(matrix.comparison[0].position.number, 1);
        for row in &matrix.comparison {
            assert_eq!(row.quotes.len(), 3);
            assert!(row.quotes.iter().all(|c| c.unit_price.is_none()));
        }
    }

    #[test]
    fn cells_match_by_position_and_quote_with_delivery_fallback() {
        let lot = lot();
        let a4 = position(&lot, 1, "A4");
        let a3 = position(&lot, 2, "A3");
        let fast = quote(&lot, "Fast", QuoteStatus::Submitted, Some(90), Some(5));
        let slow = quote(&lot, "Slow", QuoteStatus::Submitted, Some(100), None);
        let items = vec![
            item(&fast, &a4, "4.5", None),
            item(&fast, &a3, "4.5", Some(2)),
            item(&slow, &a4, "10", Some(30)),
        ];

        let matrix = build_matrix(&lot, vec![a4.clone(), a3.clone()], vec![slow, fast], &items);

        let a4_row = &matrix.comparison[0];
        assert_eq!(a4_row.quotes[0].supplier_name, "Fast");
        assert_eq!(a4_row.quotes[0].unit_price, Some(Decimal::from_str("4.5").unwrap()));
        assert_eq!(a4_row.quotes[0].total_price, Some(Decimal::from(45)));
        // inherited from the quote
        assert_eq!(a4_row.quotes[0].delivery_time_days, Some(5));
        assert_eq!(a4_row.quotes[1].delivery_time_days, Some(30));

        let a3_row = &matrix.comparison[1];
        assert_eq!(a3_row.quotes[0].delivery_time_days, Some(2));
        // Slow never priced A3
        assert_eq!(a3_row.quotes[1].unit_price, None);
        assert_eq!(a3_row.quotes[1].total_price, None);
        assert_eq!(a3_row.quotes[1].delivery_time_days, None);
    }

    #[test]
    fn matrix_serializes_with_camel_case_cells() {
        let lot = lot();
        let a4 = position(&lot, 1, "A4");
        let q = quote(&lot, "Paper Mill", QuoteStatus::Submitted, Some(45), None);
        let items = vec![item(&q, &a4, "4.5", Some(3))];
        let matrix = build_matrix(&lot, vec![a4], vec![q], &items);

        let json = serde_json::to_value(&matrix).unwrap();
        assert_eq!(json["lot"]["title"], "Office paper");
        assert_eq!(json["quotes"][0]["supplierName"], "Paper Mill");
        assert_eq!(json["quotes"][0]["status"], "Submitted");
        assert_eq!(json["comparison"][0]["quotes"][0]["deliveryTimeDays"], 3);
        assert!(json["comparison"][0]["quotes"][0]["quoteId"].is_string());
    }

    #[test]
    fn export_has_three_columns_per_supplier() {
        let lot = lot();
        let a4 = position(&lot, 1, "A4");
        let a3 = position(&lot, 2, "A3");
        let first = quote(&lot, "First", QuoteStatus::Submitted, Some(45), Some(7));
        let second = quote(&lot, "Second", QuoteStatus::Submitted, Some(50), None);
        let items = vec![item(&first, &a4, "4.5", None), item(&second, &a3, "5", Some(1))];
        let matrix = build_matrix(&lot, vec![a4, a3], vec![first, second], &items);

        let bytes = export_xlsx(&matrix, Lang::En).unwrap();
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range("Quote comparison").unwrap();

        assert_eq!(range.height(), 3);
        assert_eq!(range.width(), 4 + 3 * 2);
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("No.".into())));
        assert_eq!(range.get_value((0, 4)), Some(&Data::String("First (Price)".into())));
        assert_eq!(range.get_value((0, 8)), Some(&Data::String("Second (Delivery (days))".into())));
        assert_eq!(range.get_value((1, 4)), Some(&Data::Float(4.5)));
        assert_eq!(range.get_value((1, 5)), Some(&Data::Float(7.0)));
        assert_eq!(range.get_value((1, 6)), Some(&Data::Float(45.0)));
    }

    #[test]
    fn export_headers_follow_language() {
        let lot = lot();
        let matrix = build_matrix(&lot, vec![position(&lot, 1, "A4")], Vec::new(), &[]);

        let bytes = export_xlsx(&matrix, Lang::Ru).unwrap();
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range("Сравнение КП").unwrap();
        assert_eq!(range.get_value((0, 1)), Some(&Data::String("Наименование".into())));
    }
}
