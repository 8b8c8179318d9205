use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::view::ViewOutput;

pub struct ExportReport {
    pub sheets: usize,
    pub metric_rows: usize,
    pub series_rows: usize,
}

/// Write the current view to an xlsx workbook: a summary sheet of metric
/// tiles plus one sheet per chart series.
pub fn export_view(path: &Path, output: &ViewOutput) -> Result<ExportReport> {
    let mut workbook = Workbook::new();
    let mut sheets = 0usize;
    let mut series_rows = 0usize;

    let mut summary_rows = vec![vec!["Metric".to_string(), "Value".to_string()]];
    summary_rows.push(vec!["View".to_string(), output.kind.label().to_string()]);
    for metric in &output.metrics {
        summary_rows.push(vec![metric.label.clone(), metric.value.clone()]);
    }
    let metric_rows = summary_rows.len() - 1;

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Summary").context("name summary sheet")?;
    write_rows(worksheet, &summary_rows)?;
    sheets += 1;

    for (idx, series) in output.chart.series.iter().enumerate() {
        let mut rows = vec![vec![
            label_or(&output.chart.x_label, "Label"),
            label_or(&output.chart.y_label, &series.name),
        ]];
        for point in &series.points {
            rows.push(vec![point.label.clone(), format_value(point.value)]);
        }
        series_rows += series.points.len();

        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(sheet_name(&series.name, idx))
            .with_context(|| format!("name series sheet {idx}"))?;
        write_rows(worksheet, &rows)?;
        sheets += 1;
    }

    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;

    Ok(ExportReport {
        sheets,
        metric_rows,
        series_rows,
    })
}

fn label_or(label: &str, fallback: &str) -> String {
    if label.is_empty() {
        fallback.to_string()
    } else {
        label.to_string()
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

/// Worksheet names cap at 31 chars and must be unique within the workbook.
fn sheet_name(series: &str, idx: usize) -> String {
    let suffix = format!(" ({})", idx + 1);
    let max_base = 31usize.saturating_sub(suffix.len());
    let mut base: String = series.chars().take(max_base).collect();
    if base.is_empty() {
        base = "Series".to_string();
    }
    format!("{base}{suffix}")
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{format_value, sheet_name};

    #[test]
    fn sheet_names_stay_within_xlsx_limits() {
        let name = sheet_name("A very long series name that would overflow the cap", 0);
        assert!(name.chars().count() <= 31);
        assert!(name.ends_with("(1)"));
        assert_eq!(sheet_name("", 2), "Series (3)");
    }

    #[test]
    fn format_value_drops_integral_fractions() {
        assert_eq!(format_value(7.0), "7");
        assert_eq!(format_value(7.25), "7.25");
    }
}
