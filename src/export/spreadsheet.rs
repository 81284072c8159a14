use crate::export::display_date;
use crate::model::Transaction;
use crate::Result;
use anyhow::Context;
use chrono_tz::Tz;
use rust_xlsxwriter::{Format, Workbook};

const SHEET_NAME: &str = "Ingresos Filtrados";
const HEADERS: [&str; 6] = [
    "Fecha",
    "Sede",
    "Categoría",
    "Descripción",
    "Referencia/Folio",
    "Monto",
];
const WIDTHS: [f64; 6] = [12.0, 26.0, 24.0, 44.0, 18.0, 12.0];
const NO_REFERENCE: &str = "N/A";

/// One spreadsheet row. The amount stays numeric so that the spreadsheet can sum it.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadsheetRow {
    pub date: String,
    pub branch: String,
    pub category: String,
    pub description: String,
    pub reference: String,
    pub amount: f64,
}

impl SpreadsheetRow {
    pub fn new(t: &Transaction, tz: Tz) -> Self {
        Self {
            date: display_date(t.calendar_date(tz)),
            branch: t.branch.clone(),
            category: t.category.to_string(),
            description: t.description.clone(),
            reference: t
                .reference_number
                .clone()
                .unwrap_or_else(|| NO_REFERENCE.to_string()),
            amount: t.amount.to_f64(),
        }
    }
}

pub(super) fn render(records: &[Transaction], tz: Tz) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let money = Format::new().set_num_format("#,##0.00");

    let sheet = workbook.add_worksheet();
    sheet
        .set_name(SHEET_NAME)
        .context("Unable to name the worksheet")?;
    for (col, (header, width)) in HEADERS.iter().zip(WIDTHS).enumerate() {
        let col = col as u16;
        sheet
            .write_string_with_format(0, col, *header, &bold)
            .context("Unable to write the spreadsheet header")?;
        sheet
            .set_column_width(col, width)
            .context("Unable to size the spreadsheet columns")?;
    }

    for (i, t) in records.iter().enumerate() {
        let row = SpreadsheetRow::new(t, tz);
        let r = i as u32 + 1;
        sheet.write_string(r, 0, &row.date)?;
        sheet.write_string(r, 1, &row.branch)?;
        sheet.write_string(r, 2, &row.category)?;
        sheet.write_string(r, 3, &row.description)?;
        sheet.write_string(r, 4, &row.reference)?;
        sheet.write_number_with_format(r, 5, row.amount, &money)?;
    }

    workbook
        .save_to_buffer()
        .context("Unable to serialize the spreadsheet")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::sample_snapshot;

    #[test]
    fn test_rows() {
        let snapshot = sample_snapshot();
        let first = SpreadsheetRow::new(&snapshot[0], chrono_tz::UTC);
        assert_eq!(first.date, "20/1/2025");
        assert_eq!(first.branch, "Central");
        assert_eq!(first.category, "Multas");
        assert_eq!(first.reference, "N/A");
        assert_eq!(first.amount, 15.5);

        let second = SpreadsheetRow::new(&snapshot[1], chrono_tz::UTC);
        assert_eq!(second.category, "Impresiones/Fotocopias");
        assert_eq!(second.reference, "REC-2024-001");
        assert_eq!(second.amount, 45.0);
    }

    #[test]
    fn test_render_is_a_zip_container() {
        let bytes = render(&sample_snapshot(), chrono_tz::UTC).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_render_empty_is_header_only() {
        let bytes = render(&[], chrono_tz::UTC).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
