use crate::lookup::{JOURNAL_HEADER, PivotRow};
use crate::record::Source;
use handlebars::html_escape;

/// Render rating rows as an HTML table
///
/// The header labels each source column with its rating scale, best grade
/// first. Every value is HTML-escaped.
///
/// # Arguments
/// * `rows` - The pivoted rows to display
///
/// # Returns
/// * `String` - A `<table>` element
///
/// # Examples
/// ```
/// use journal_ratings::lookup::PivotRow;
/// use journal_ratings::table::to_display_table;
///
/// let html = to_display_table(&[PivotRow::empty("R&D Management")]);
/// assert!(html.contains("<td>R&amp;D Management</td>"));
/// ```
pub fn to_display_table(rows: &[PivotRow]) -> String {
    let mut html = String::from("<table class=\"ratings\">\n<thead>\n<tr>");

    html.push_str(&format!("<th scope=\"col\">{}</th>", JOURNAL_HEADER));
    for source in Source::ALL {
        let legend = html_escape(&source.legend());
        html.push_str(&format!(
            "<th scope=\"col\" title=\"{code}: {legend}\">{code}<br><span class=\"legend\">{legend}</span></th>",
            code = source.code(),
            legend = legend,
        ));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for row in rows {
        html.push_str("<tr>");
        for cell in row.cells() {
            html.push_str("<td>");
            html.push_str(&html_escape(cell));
            html.push_str("</td>");
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n");
    html
}
