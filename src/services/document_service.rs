// src/services/document_service.rs

use std::{io::Cursor, path::PathBuf};

use genpdf::{Element, elements, style};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LotRepository, PositionRepository, QuoteRepository, TenderRepository},
    models::{comparison::ComparisonQuote, lot::Lot, position::Position, tender::Tender},
    services::labels::{Labels, Lang},
};

// ---
// Document kinds and output formats
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Invitation,
    QuoteForm,
    Protocol,
}

impl DocumentKind {
    fn file_stem(self) -> &'static str {
        match self {
            DocumentKind::Invitation => "invitation",
            DocumentKind::QuoteForm => "quote_form",
            DocumentKind::Protocol => "protocol",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    #[default]
    Docx,
    Pdf,
}

impl DocumentFormat {
    /// `None` means docx; anything other than docx/pdf is rejected.
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        match raw.map(str::trim) {
            None | Some("") | Some("docx") => Ok(DocumentFormat::Docx),
            Some("pdf") => Ok(DocumentFormat::Pdf),
            Some(other) => Err(AppError::BadRequest(format!(
                "Unsupported document format '{}', expected docx or pdf",
                other
            ))),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Docx => "docx",
            DocumentFormat::Pdf => "pdf",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DocumentFormat::Pdf => "application/pdf",
        }
    }
}

pub struct GeneratedDocument {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Format-neutral content; rendered to docx or pdf at the end.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Heading(String),
    Text(String),
    Table { header: Vec<String>, rows: Vec<Vec<String>> },
}

pub struct LotSection {
    pub lot: Lot,
    pub positions: Vec<Position>,
    pub quotes: Vec<ComparisonQuote>,
}

#[derive(Clone)]
pub struct DocumentService {
    tender_repo: TenderRepository,
    lot_repo: LotRepository,
    position_repo: PositionRepository,
    quote_repo: QuoteRepository,
    fonts_dir: PathBuf,
    font_family: String,
}

impl DocumentService {
    pub fn new(
        tender_repo: TenderRepository,
        lot_repo: LotRepository,
        position_repo: PositionRepository,
        quote_repo: QuoteRepository,
        fonts_dir: PathBuf,
        font_family: String,
    ) -> Self {
        Self { tender_repo, lot_repo, position_repo, quote_repo, fonts_dir, font_family }
    }

    pub async fn generate(
        &self,
        kind: DocumentKind,
        tender_id: Uuid,
        format: DocumentFormat,
        lang: Lang,
    ) -> Result<GeneratedDocument, AppError> {
        let tender = self
            .tender_repo
            .find_by_id(tender_id)
            .await?
            .ok_or(AppError::ResourceNotFound("Tender"))?;

        let labels = lang.labels();
        let blocks = match kind {
            DocumentKind::Invitation => invitation_blocks(&tender, labels),
            DocumentKind::QuoteForm => quote_form_blocks(&tender, &self.load_sections(tender_id, kind).await?, labels),
            DocumentKind::Protocol => protocol_blocks(&tender, &self.load_sections(tender_id, kind).await?, labels),
        };

        let fonts_dir = self.fonts_dir.clone();
        let font_family = self.font_family.clone();
        let title = tender.title.clone();
        let bytes = tokio::task::spawn_blocking(move || match format {
            DocumentFormat::Docx => render_docx(&blocks),
            DocumentFormat::Pdf => render_pdf(&blocks, &title, &fonts_dir, &font_family),
        })
        .await
        .map_err(|e| anyhow::anyhow!("Document rendering task failed: {}", e))??;

        Ok(GeneratedDocument {
            filename: format!("{}_{}.{}", kind.file_stem(), tender.number, format.extension()),
            content_type: format.content_type(),
            bytes,
        })
    }

    async fn load_sections(&self, tender_id: Uuid, kind: DocumentKind) -> Result<Vec<LotSection>, AppError> {
        let lots = self.lot_repo.list_by_tender(tender_id).await?;
        let mut sections = Vec::with_capacity(lots.len());
        for lot in lots {
            let (positions, quotes) = match kind {
                DocumentKind::QuoteForm => (self.position_repo.list_by_lot(lot.id).await?, Vec::new()),
                _ => (Vec::new(), self.quote_repo.list_comparable(lot.id).await?),
            };
            sections.push(LotSection { lot, positions, quotes });
        }
        Ok(sections)
    }
}

// ---
// Content
// ---

pub fn invitation_blocks(tender: &Tender, labels: &Labels) -> Vec<Block> {
    let mut blocks = vec![
        Block::Title(labels.invitation_title.to_string()),
        Block::Heading(format!("{} {}", labels.tender, tender.number)),
        Block::Text(tender.title.clone()),
    ];
    if let Some(description) = &tender.description {
        blocks.push(Block::Text(description.clone()));
    }
    if let Some(deadline) = tender.submission_deadline {
        blocks.push(Block::Text(format!(
            "{}: {}",
            labels.submission_deadline,
            deadline.format(labels.date_format)
        )));
    }
    blocks.push(Block::Text(labels.invitation_text.to_string()));
    blocks
}

pub fn quote_form_blocks(tender: &Tender, sections: &[LotSection], labels: &Labels) -> Vec<Block> {
    let mut blocks = vec![
        Block::Title(labels.quote_form_title.to_string()),
        Block::Text(format!("{} {}: {}", labels.tender, tender.number, tender.title)),
    ];
    for section in sections {
        blocks.push(Block::Heading(format!(
            "{} {}: {}",
            labels.lot, section.lot.number, section.lot.title
        )));
        blocks.push(Block::Table {
            header: [labels.number, labels.name, labels.unit, labels.quantity, labels.unit_price, labels.total]
                .map(String::from)
                .to_vec(),
            // price columns stay blank for the supplier to fill in
            rows: section
                .positions
                .iter()
                .map(|p| {
                    vec![
                        p.number.to_string(),
                        p.name.clone(),
                        p.unit.clone().unwrap_or_default(),
                        p.quantity.map(|q| q.normalize().to_string()).unwrap_or_default(),
                        String::new(),
                        String::new(),
                    ]
                })
                .collect(),
        });
    }
    blocks
}

pub fn protocol_blocks(tender: &Tender, sections: &[LotSection], labels: &Labels) -> Vec<Block> {
    let mut blocks = vec![
        Block::Title(labels.protocol_title.to_string()),
        Block::Text(format!("{} {}: {}", labels.tender, tender.number, tender.title)),
    ];
    for section in sections {
        blocks.push(Block::Heading(format!(
            "{} {}: {}",
            labels.lot, section.lot.number, section.lot.title
        )));
        if section.quotes.is_empty() {
            blocks.push(Block::Text(labels.no_quotes.to_string()));
            continue;
        }
        blocks.push(Block::Table {
            header: [labels.supplier, labels.total, labels.delivery, labels.status]
                .map(String::from)
                .to_vec(),
            rows: section
                .quotes
                .iter()
                .map(|q| {
                    vec![
                        q.supplier_name.clone(),
                        q.quote.total_amount.map(money).unwrap_or_default(),
                        q.quote.delivery_time_days.map(|d| d.to_string()).unwrap_or_default(),
                        format!("{:?}", q.quote.status),
                    ]
                })
                .collect(),
        });
    }
    blocks
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value)
}

// ---
// Rendering
// ---

pub fn render_docx(blocks: &[Block]) -> Result<Vec<u8>, AppError> {
    use docx_rs::{AlignmentType, Docx, Paragraph, Run, Table, TableCell, TableRow};

    let text_cell = |text: &str, bold: bool| {
        let mut run = Run::new().add_text(text);
        if bold {
            run = run.bold();
        }
        TableCell::new().add_paragraph(Paragraph::new().add_run(run))
    };

    let mut docx = Docx::new();
    for block in blocks {
        docx = match block {
            Block::Title(text) => docx.add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text(text).bold().size(32))
                    .align(AlignmentType::Center),
            ),
            Block::Heading(text) => {
                docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(text).bold().size(24)))
            }
            Block::Text(text) => {
                docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(text).size(22)))
            }
            Block::Table { header, rows } => {
                let mut table_rows = vec![TableRow::new(header.iter().map(|h| text_cell(h, true)).collect())];
                table_rows.extend(
                    rows.iter()
                        .map(|row| TableRow::new(row.iter().map(|c| text_cell(c, false)).collect())),
                );
                docx.add_table(Table::new(table_rows))
            }
        };
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| anyhow::anyhow!("Failed to write docx: {}", e))?;
    Ok(buffer.into_inner())
}

pub fn render_pdf(
    blocks: &[Block],
    title: &str,
    fonts_dir: &std::path::Path,
    font_family: &str,
) -> Result<Vec<u8>, AppError> {
    let fonts = genpdf::fonts::from_files(fonts_dir, font_family, None).map_err(|_| {
        AppError::FontNotFound(format!("{} in {}", font_family, fonts_dir.display()))
    })?;

    let mut doc = genpdf::Document::new(fonts);
    doc.set_title(title);
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    let bold = style::Style::new().bold();
    for block in blocks {
        match block {
            Block::Title(text) => {
                let mut paragraph = elements::Paragraph::new(text.as_str());
                paragraph.set_alignment(genpdf::Alignment::Center);
                doc.push(paragraph.styled(bold.with_font_size(18)));
                doc.push(elements::Break::new(1.5));
            }
            Block::Heading(text) => {
                doc.push(elements::Break::new(1));
                doc.push(elements::Paragraph::new(text.as_str()).styled(bold.with_font_size(13)));
                doc.push(elements::Break::new(0.5));
            }
            Block::Text(text) => {
                doc.push(elements::Paragraph::new(text.as_str()));
                doc.push(elements::Break::new(0.5));
            }
            Block::Table { header, rows } => {
                let mut weights = vec![1; header.len()];
                if weights.len() > 1 {
                    weights[1] = 4;
                }
                let mut table = elements::TableLayout::new(weights);
                table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

                let mut header_row = table.row();
                for title in header {
                    header_row.push_element(elements::Paragraph::new(title.as_str()).styled(bold));
                }
                header_row.push().map_err(pdf_error)?;

                for row in rows {
                    let mut table_row = table.row();
                    for cell in row {
                        table_row.push_element(elements::Paragraph::new(cell.as_str()));
                    }
                    table_row.push().map_err(pdf_error)?;
                }
                doc.push(table);
            }
        }
    }

    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(pdf_error)?;
    Ok(buffer)
}

fn pdf_error(e: genpdf::error::Error) -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("Failed to render pdf: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        quote::{Quote, QuoteStatus},
        tender::TenderStatus,
    };
    use chrono::{TimeZone, Utc};

    fn tender() -> Tender {
        Tender {
            id: Uuid::new_v4(),
            number: "T-001".into(),
            title: "Paper supply".into(),
            description: Some("Annual office paper".into()),
            status: TenderStatus::CollectingQuotes,
            start_date: None,
            end_date: None,
            submission_deadline: Some(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()),
            decision_date: None,
            created_by: None,
            manager_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn section(quotes: Vec<ComparisonQuote>) -> LotSection {
        LotSection {
            lot: Lot {
                id: Uuid::new_v4(),
                tender_id: Uuid::new_v4(),
                number: 1,
                title: "Office paper".into(),
                description: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            positions: Vec::new(),
            quotes,
        }
    }

    #[test]
    fn format_defaults_to_docx_and_rejects_unknown() {
        assert_eq!(DocumentFormat::parse(None).unwrap(), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::parse(Some("pdf")).unwrap(), DocumentFormat::Pdf);
        assert!(matches!(DocumentFormat::parse(Some("odt")), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn invitation_is_localized() {
        let blocks = invitation_blocks(&tender(), Lang::Ru.labels());
        assert_eq!(blocks[0], Block::Title("ПРИГЛАШЕНИЕ К УЧАСТИЮ В ТЕНДЕРЕ".into()));
        assert!(blocks.contains(&Block::Text("Срок подачи заявок: 01.03.2025".into())));

        let blocks = invitation_blocks(&tender(), Lang::En.labels());
        assert_eq!(blocks[1], Block::Heading("Tender No. T-001".into()));
        assert!(blocks.contains(&Block::Text("Submission deadline: 2025-03-01".into())));
    }

    #[test]
    fn protocol_lists_quotes_in_given_order() {
        let tender = tender();
        let quote = |name: &str, total: i64| ComparisonQuote {
            quote: Quote {
                id: Uuid::new_v4(),
                tender_id: tender.id,
                lot_id: Uuid::new_v4(),
                supplier_id: Uuid::new_v4(),
                status: QuoteStatus::Submitted,
                submitted_at: None,
                valid_until: None,
                total_amount: Some(Decimal::from(total)),
                delivery_time_days: Some(10),
                payment_terms: None,
                warranty_period_months: None,
                notes: None,
                created_by: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            supplier_name: name.into(),
            supplier_inn: None,
        };
        let sections = vec![section(vec![quote("Cheap", 90), quote("Dear", 100)]), section(Vec::new())];

        let blocks = protocol_blocks(&tender, &sections, Lang::En.labels());
        let Block::Table { rows, .. } = &blocks[3] else {
            panic!("expected a table, got {:?}", blocks[3]);
        };
        assert_eq!(rows[0], ["Cheap", "90.00", "10", "Submitted"]);
        assert_eq!(rows[1][0], "Dear");
        assert_eq!(blocks.last(), Some(&Block::Text("No quotes received.".into())));
    }

    #[test]
    fn docx_output_is_a_zip_package() {
        let blocks = quote_form_blocks(&tender(), &[section(Vec::new())], Lang::En.labels());
        let bytes = render_docx(&blocks).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn pdf_without_fonts_is_reported() {
        let blocks = invitation_blocks(&tender(), Lang::En.labels());
        let err = render_pdf(&blocks, "x", std::path::Path::new("./no-such-fonts"), "Roboto").unwrap_err();
        assert!(matches!(err, AppError::FontNotFound(_)));
    }
}
