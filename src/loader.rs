use crate::error::DataError;
use crate::record::RatingRecord;
use calamine::{Data, Reader, open_workbook_auto};
use log::{debug, warn};
use std::fs;
use std::path::Path;

/// Header of the journal title column.
pub const TITLE_COLUMN: &str = "Revista";
/// Header of the rating source column.
pub const SOURCE_COLUMN: &str = "Origen";
/// Header of the rating column.
pub const RATING_COLUMN: &str = "Rating";

/// Load rating records from a spreadsheet file
///
/// This function examines the file extension and reads the first worksheet of
/// an Excel/ODS workbook or the rows of a CSV file, then maps the `Revista`,
/// `Origen` and `Rating` columns to [`RatingRecord`]s in sheet order.
///
/// # Arguments
/// * `filepath` - Path to the spreadsheet
///
/// # Returns
/// * `Result<Vec<RatingRecord>, DataError>` - The records or the reason the list is unavailable
///
/// # Examples
/// ```no_run
/// use journal_ratings::loader::load_records;
///
/// match load_records("Journals.xlsx") {
///     Ok(records) => println!("Loaded {} ratings", records.len()),
///     Err(e) => eprintln!("Error loading journals: {}", e),
/// }
/// ```
pub fn load_records(filepath: impl AsRef<Path>) -> Result<Vec<RatingRecord>, DataError> {
    let path = filepath.as_ref();
    // Surface a missing file as an IO error rather than a workbook error
    fs::metadata(path)?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    let grid = match extension.as_deref() {
        Some("csv") => grid_from_csv(path)?,
        Some("xlsx") | Some("xlsm") | Some("xls") | Some("ods") => grid_from_workbook(path)?,
        Some(ext) => return Err(DataError::UnsupportedFormat(ext.to_string())),
        None => return Err(DataError::UnsupportedFormat(String::new())),
    };

    records_from_grid(grid)
}

/// Map a header row plus data rows to records.
///
/// Rows with a blank title are skipped. Short rows are padded with empty cells.
pub fn records_from_grid(grid: Vec<Vec<String>>) -> Result<Vec<RatingRecord>, DataError> {
    let mut rows = grid.into_iter();
    let header = rows.next().ok_or(DataError::EmptySheet)?;

    let title_idx = column_index(&header, TITLE_COLUMN)?;
    let source_idx = column_index(&header, SOURCE_COLUMN)?;
    let rating_idx = column_index(&header, RATING_COLUMN)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in rows {
        let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("");
        let title = cell(title_idx);
        if title.trim().is_empty() {
            skipped += 1;
            continue;
        }
        records.push(RatingRecord::new(
            title,
            cell(source_idx).trim(),
            cell(rating_idx).trim(),
        ));
    }

    if skipped > 0 {
        warn!("Skipped {} rows without a journal title", skipped);
    }
    debug!("Mapped {} rating records", records.len());
    Ok(records)
}

fn column_index(header: &[String], name: &'static str) -> Result<usize, DataError> {
    header
        .iter()
        .position(|h| h.trim() == name)
        .ok_or(DataError::MissingColumn(name))
}

fn grid_from_workbook(path: &Path) -> Result<Vec<Vec<String>>, DataError> {
    let mut workbook = open_workbook_auto(path)?;

    // Get the first worksheet
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(DataError::NoSheets)?;

    let range = workbook.worksheet_range(&sheet_name)?;
    if range.is_empty() {
        return Err(DataError::EmptySheet);
    }

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

/// Text of a workbook cell as it should appear in the rating table.
///
/// Integral numbers lose their fractional part so that an AJG grade stored as
/// the number `4` reads `"4"`, not `"4.0"`.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn grid_from_csv(path: &Path) -> Result<Vec<Vec<String>>, DataError> {
    let contents = fs::read_to_string(path)?;
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(&contents);

    let grid = parse_csv_records(contents);

    if grid.is_empty() {
        return Err(DataError::EmptySheet);
    }
    Ok(grid)
}

/// Split CSV text into rows of fields.
///
/// Line breaks inside a quoted field belong to the field. Blank lines are
/// dropped and `\r\n` endings are accepted.
pub fn parse_csv_records(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    current_field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => row.push(std::mem::take(&mut current_field)),
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                row.push(std::mem::take(&mut current_field));
                push_row(&mut rows, std::mem::take(&mut row));
            }
            _ => current_field.push(c),
        }
    }

    row.push(current_field);
    push_row(&mut rows, row);
    rows
}

fn push_row(rows: &mut Vec<Vec<String>>, row: Vec<String>) {
    if row.iter().any(|field| !field.trim().is_empty()) {
        rows.push(row);
    }
}

/// Parse a CSV row into a vector of fields
///
/// Quoted fields may contain commas; a doubled quote inside a quoted field
/// stands for one quote character.
pub fn parse_csv_row(line: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    // Double quote inside quoted field - add a single quote
                    current_field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                // End of field
                result.push(std::mem::take(&mut current_field));
            }
            _ => {
                current_field.push(c);
            }
        }
    }

    // Add the last field
    result.push(current_field);

    result
}
