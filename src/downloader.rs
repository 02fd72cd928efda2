use crate::error::DownloadError;
use crate::lookup::{PivotRow, header};

/// File name offered for the CSV download.
pub const CSV_FILENAME: &str = "journal_ratings_results.csv";
/// File name offered for the XLSX download.
pub const XLSX_FILENAME: &str = "journal_ratings_results.xlsx";

/// Convert rating rows to CSV format
///
/// This function exports the pivoted table as UTF-8 CSV bytes where:
/// - The header is `Journal,AJG,CNRS,CNU,VHB,ABDC`
/// - Each row is one journal; missing ratings are empty fields
/// - Special characters (commas, quotes, newlines) are properly escaped
///
/// # Arguments
/// * `rows` - The pivoted rows to convert
///
/// # Returns
/// * `Vec<u8>` - CSV content
///
/// # Examples
/// ```
/// use journal_ratings::downloader::to_csv;
/// use journal_ratings::lookup::PivotRow;
///
/// let csv = to_csv(&[PivotRow::empty("Journal of Testing")]);
/// assert_eq!(csv, b"Journal,AJG,CNRS,CNU,VHB,ABDC\nJournal of Testing,,,,,\n");
/// ```
pub fn to_csv(rows: &[PivotRow]) -> Vec<u8> {
    let mut csv_content = String::new();

    push_csv_line(&mut csv_content, &header());
    for row in rows {
        push_csv_line(&mut csv_content, &row.cells());
    }

    csv_content.into_bytes()
}

fn push_csv_line(out: &mut String, fields: &[&str]) {
    for (i, value) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        // Handle value - escape commas, quotes, newlines as needed
        if value.contains([',', '"', '\n', '\r']) {
            let escaped = value.replace('"', "\"\"");
            out.push('"');
            out.push_str(&escaped);
            out.push('"');
        } else {
            out.push_str(value);
        }
    }
    out.push('\n');
}

/// Convert rating rows to XLSX format
///
/// Writes the same table as [`to_csv`] to a single worksheet with a bold
/// header row, using the rust_xlsxwriter library.
///
/// # Arguments
/// * `rows` - The pivoted rows to convert
///
/// # Returns
/// * `Result<Vec<u8>, DownloadError>` - XLSX file content as bytes or an error
pub fn to_xlsx(rows: &[PivotRow]) -> Result<Vec<u8>, DownloadError> {
    use rust_xlsxwriter::{Format, Workbook, Worksheet};

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name("Ratings")?;

    let bold = Format::new().set_bold();
    for (c, title) in header().iter().enumerate() {
        worksheet.write_string_with_format(0, c as u16, *title, &bold)?;
    }

    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.cells().iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string((r + 1) as u32, c as u16, *value)?;
            }
        }
    }
    worksheet.set_column_width(0, 50.0)?;

    workbook.push_worksheet(worksheet);

    let buffer = workbook.save_to_buffer()?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_csv_row;
    use crate::lookup::{pivot, select};
    use crate::record::{RatingRecord, Source};

    fn rows() -> Vec<PivotRow> {
        let records = vec![
            RatingRecord::new("Journal of Testing", "AJG", "4"),
            RatingRecord::new("Journal of Testing", "CNU", "B"),
            RatingRecord::new("Review of \"Quoted\", Studies", "VHB", "A+"),
            RatingRecord::new("Review of \"Quoted\", Studies", "ABDC", "A*"),
        ];
        pivot(&select(
            &records,
            &["journal of testing", "review of \"quoted\", studies"],
        ))
    }

    #[test]
    fn csv_has_fixed_header_and_one_line_per_row() {
        let csv = String::from_utf8(to_csv(&rows())).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Journal,AJG,CNRS,CNU,VHB,ABDC");
        assert_eq!(lines[1], "Journal of Testing,4,,B,,");
        assert_eq!(lines[2], "\"Review of \"\"Quoted\"\", Studies\",,,,A+,A*");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn csv_parses_back_to_the_same_ratings() {
        let rows = rows();
        let csv = String::from_utf8(to_csv(&rows)).unwrap();
        let mut lines = csv.lines();
        assert_eq!(parse_csv_row(lines.next().unwrap()), header());

        for (line, row) in lines.zip(&rows) {
            let fields = parse_csv_row(line);
            assert_eq!(fields[0], row.journal);
            for source in Source::ALL {
                assert_eq!(fields[source.index() + 1], row.rating(source));
            }
        }
    }

    #[test]
    fn empty_table_is_just_the_header() {
        assert_eq!(to_csv(&[]), b"Journal,AJG,CNRS,CNU,VHB,ABDC\n");
    }

    #[test]
    fn xlsx_is_a_zip_container() {
        let bytes = to_xlsx(&rows()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
