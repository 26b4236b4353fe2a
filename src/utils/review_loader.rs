//! Review file loading
//!
//! This module reads the uploaded review table from a spreadsheet or CSV file,
//! selects the configured columns and applies the preprocessing rules: ratings
//! are parsed leniently and rows without any text are dropped.

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use log::{debug, info, warn};

use crate::config::{AnalyzerConfig, ColumnNames};
use crate::core::review::Review;

/// Failure to turn an input file into reviews
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported input format '{0}' (expected xlsx, xlsm, xlsb, xls, ods or csv)")]
    UnsupportedFormat(String),

    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Sheet '{sheet}' not found (available: {available})")]
    MissingSheet { sheet: String, available: String },

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Input has no header row")]
    MissingHeader,

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Kind of input detected from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Spreadsheet,
    Csv,
}

/// Detect the input format from the file extension.
pub fn detect_input_format(path: &Path) -> Result<InputFormat, LoadError> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(InputFormat::Spreadsheet),
        "csv" => Ok(InputFormat::Csv),
        _ => Err(LoadError::UnsupportedFormat(extension)),
    }
}

/// Read reviews from a spreadsheet or CSV file.
///
/// # Arguments
///
/// * `path` - Path to the uploaded file
/// * `config` - Sheet and column settings
///
/// # Returns
///
/// Reviews with non-blank text, in file order
pub fn load_reviews(path: &Path, config: &AnalyzerConfig) -> Result<Vec<Review>, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    info!("Loading reviews from {}", path.display());

    let (headers, rows) = match detect_input_format(path)? {
        InputFormat::Spreadsheet => read_spreadsheet(path, &config.sheet_name)?,
        InputFormat::Csv => read_csv(path)?,
    };

    reviews_from_table(&headers, rows, &config.columns)
}

/// Convert a raw table into reviews.
///
/// All required columns are checked before any row is processed, so a file
/// with the wrong shape never yields partial output.
pub fn reviews_from_table(
    headers: &[String],
    rows: Vec<Vec<String>>,
    columns: &ColumnNames,
) -> Result<Vec<Review>, LoadError> {
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);

    // Report every missing column at once
    let missing: Vec<String> = columns
        .required()
        .into_iter()
        .filter(|&name| position(name).is_none())
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }

    // Column indexes in model, stars, text, pros, cons order
    let [model, stars, text, pros, cons] = columns
        .required()
        .map(|name| position(name).unwrap_or_default());

    // Rows with blank text come back as None and are dropped
    let row_count = rows.len();
    let mut unparsed_ratings = 0;
    let reviews: Vec<Review> = rows
        .iter()
        .filter_map(|row| {
            let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or("");
            let rating = parse_stars(cell(stars));
            if rating.is_none() && !cell(stars).trim().is_empty() {
                unparsed_ratings += 1;
            }
            Review::from_fields(cell(model), rating, cell(text), cell(pros), cell(cons))
        })
        .collect();

    if unparsed_ratings > 0 {
        warn!("{} rows have a rating that is not a number", unparsed_ratings);
    }
    debug!("Dropped {} rows with blank text", row_count - reviews.len());
    info!("Loaded {} reviews", reviews.len());

    Ok(reviews)
}

/// Parse a star rating, returning `None` for anything that is not a finite number
pub fn parse_stars(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|stars| stars.is_finite())
}

fn read_spreadsheet(path: &Path, sheet: &str) -> Result<(Vec<String>, Vec<Vec<String>>), LoadError> {
    let mut workbook = open_workbook_auto(path)?;

    // Name the available sheets when the configured one is absent
    let sheet_names = workbook.sheet_names();
    if !sheet_names.iter().any(|name| name == sheet) {
        return Err(LoadError::MissingSheet {
            sheet: sheet.to_string(),
            available: sheet_names.join(", "),
        });
    }

    let range = workbook.worksheet_range(sheet)?;
    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<String>>());

    // First row is the header
    let headers = rows.next().ok_or(LoadError::MissingHeader)?;
    Ok((headers, rows.collect()))
}

fn read_csv(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(LoadError::MissingHeader);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(|field| field.to_string()).collect());
    }

    Ok((headers, rows))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(value) => value.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        ColumnNames::default()
            .required()
            .iter()
            .map(|h| h.to_string())
            .collect()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_parse_stars() {
        assert_eq!(parse_stars("3"), Some(3.0));
        assert_eq!(parse_stars(" 4.5 "), Some(4.5));
        assert_eq!(parse_stars(""), None);
        assert_eq!(parse_stars("пять"), None);
        assert_eq!(parse_stars("NaN"), None);
        assert_eq!(parse_stars("inf"), None);
    }

    #[test]
    fn test_detect_input_format() {
        assert_eq!(detect_input_format(Path::new("a.XLSX")).unwrap(), InputFormat::Spreadsheet);
        assert_eq!(detect_input_format(Path::new("a.csv")).unwrap(), InputFormat::Csv);
        assert!(matches!(
            detect_input_format(Path::new("a.txt")),
            Err(LoadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_reviews_from_table() {
        let rows = vec![
            row(&["X", "3", "тонкая", "", "плёнка"]),
            row(&["X", "оценка", "отлично", "", ""]),
            row(&["Y", "2", "", " ", ""]),
        ];

        let reviews = reviews_from_table(&headers(), rows, &ColumnNames::default()).unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].full_text, "тонкая  плёнка");
        assert_eq!(reviews[0].stars, Some(3.0));
        assert_eq!(reviews[1].stars, None);
    }

    #[test]
    fn test_columns_located_by_name() {
        let mut headers = headers();
        headers.reverse();
        headers.insert(0, "Дата".to_string());
        let rows = vec![row(&["2024-01-01", "минусы", "плюсы", "текст", "1", "M1"])];

        let reviews = reviews_from_table(&headers, rows, &ColumnNames::default()).unwrap();
        assert_eq!(reviews[0].model, "M1");
        assert_eq!(reviews[0].stars, Some(1.0));
        assert_eq!(reviews[0].full_text, "текст плюсы минусы");
    }

    #[test]
    fn test_short_rows_treated_as_empty_cells() {
        let rows = vec![row(&["X", "1", "коробка"])];
        let reviews = reviews_from_table(&headers(), rows, &ColumnNames::default()).unwrap();
        assert_eq!(reviews[0].full_text, "коробка");
    }

    #[test]
    fn test_missing_columns_reported() {
        let headers = vec!["Артикул продавца".to_string(), "Текст отзыва".to_string()];
        let err = reviews_from_table(&headers, Vec::new(), &ColumnNames::default()).unwrap_err();
        match err {
            LoadError::MissingColumns(missing) => {
                assert_eq!(missing, vec!["Количество звезд", "Достоинства", "Недостатки"]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = load_reviews(Path::new("no/such/reviews.xlsx"), &AnalyzerConfig::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }
}
