use crate::export::{describe_filter, display_date};
use crate::filter::Filter;
use crate::model::{Amount, Transaction};
use crate::stats::grand_total;
use crate::Result;
use anyhow::anyhow;
use chrono::DateTime;
use chrono_tz::Tz;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

const TITLE: &str = "Reporte de Ingresos Bibliotecarios";
const SUBTITLE: &str = "BiblioPay Systems";
const COLUMNS: [&str; 5] = ["Fecha", "Sede", "Categoría", "Descripción", "Monto (MXN)"];

// A4 portrait, in millimetres.
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 14.0;
const ROW_HEIGHT: f32 = 7.0;
const COLUMN_X: [f32; 5] = [14.0, 38.0, 82.0, 122.0, 176.0];
const COLUMN_CHARS: [usize; 5] = [12, 24, 22, 32, 14];

// The header block only appears on the first page.
const FIRST_PAGE_ROWS: usize = 30;
const PAGE_ROWS: usize = 36;

/// The content of the document report, independent of how it is drawn.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DocumentReport {
    pub generated: String,
    pub record_count: usize,
    pub filters: String,
    pub rows: Vec<[String; 5]>,
    pub total: Amount,
}

impl DocumentReport {
    pub fn new(records: &[Transaction], filter: &Filter, now: DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let rows = records
            .iter()
            .map(|t| {
                [
                    display_date(t.calendar_date(tz)),
                    t.branch.clone(),
                    t.category.to_string(),
                    t.description.clone(),
                    t.amount.plain(),
                ]
            })
            .collect();
        Self {
            generated: format!(
                "{}, {}",
                display_date(now.date_naive()),
                now.format("%H:%M:%S")
            ),
            record_count: records.len(),
            filters: describe_filter(filter),
            rows,
            total: grand_total(records),
        }
    }

    /// `$1,234.56 MXN`
    pub fn total_line(&self) -> String {
        format!("{} MXN", self.total)
    }

    /// The rows split into pages. There is always at least one page, possibly with no rows.
    pub fn pages(&self) -> Vec<&[[String; 5]]> {
        let split = self.rows.len().min(FIRST_PAGE_ROWS);
        let (first, rest) = self.rows.split_at(split);
        let mut pages = vec![first];
        pages.extend(rest.chunks(PAGE_ROWS));
        pages
    }

    /// Draws the report as a PDF.
    pub fn render(&self) -> Result<Vec<u8>> {
        let (doc, page, layer) =
            PdfDocument::new(TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("Unable to load the document font: {e:?}"))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("Unable to load the document font: {e:?}"))?;
        let fonts = Fonts { regular, bold };

        let pages = self.pages();
        let last = pages.len() - 1;
        let mut layer = doc.get_page(page).get_layer(layer);
        for (i, rows) in pages.into_iter().enumerate() {
            if i > 0 {
                let (page, new_layer) =
                    doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Layer {}", i + 1));
                layer = doc.get_page(page).get_layer(new_layer);
            }
            let mut y = PAGE_HEIGHT - MARGIN;
            if i == 0 {
                y = self.draw_header(&layer, &fonts, y);
            }
            y = draw_row(&layer, &fonts.bold, &COLUMNS.map(String::from), y);
            for row in rows {
                y = draw_row(&layer, &fonts.regular, row, y);
            }
            if i == last {
                y -= ROW_HEIGHT;
                layer.use_text("TOTAL RECAUDADO:", 12.0, Mm(122.0), Mm(y), &fonts.bold);
                layer.use_text(self.total_line(), 12.0, Mm(164.0), Mm(y), &fonts.bold);
            }
        }

        doc.save_to_bytes()
            .map_err(|e| anyhow!("Unable to serialize the document: {e:?}"))
    }

    fn draw_header(&self, layer: &PdfLayerReference, fonts: &Fonts, top: f32) -> f32 {
        let mut y = top - 4.0;
        layer.use_text(TITLE, 18.0, Mm(MARGIN), Mm(y), &fonts.bold);
        y -= 8.0;
        layer.use_text(SUBTITLE, 11.0, Mm(MARGIN), Mm(y), &fonts.regular);
        y -= 8.0;
        let lines = [
            format!("Fecha de generación: {}", self.generated),
            format!("Total registros: {}", self.record_count),
            format!("Filtros aplicados: {}", self.filters),
        ];
        for line in lines {
            layer.use_text(line, 10.0, Mm(MARGIN), Mm(y), &fonts.regular);
            y -= 6.0;
        }
        y - 4.0
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn draw_row(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    cells: &[String; 5],
    y: f32,
) -> f32 {
    for ((cell, x), max) in cells.iter().zip(COLUMN_X).zip(COLUMN_CHARS) {
        layer.use_text(truncate(cell, max), 9.0, Mm(x), Mm(y), font);
    }
    y - ROW_HEIGHT
}

/// Cuts `s` to at most `max` characters, marking the cut with `...`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
