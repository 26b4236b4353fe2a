//! Output formatter for analysis reports
//!
//! This module handles formatting and exporting analysis reports in various
//! formats, including console tables, JSON, an HTML dashboard and one CSV file
//! per complaint category.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use handlebars::Handlebars;
use lazy_static::lazy_static;
use log::info;
use regex::Regex;
use serde_json::{json, Value};

use crate::core::aggregator::{AnalysisReport, CategoryDetail, ModelFilter};
use crate::core::review::Review;

lazy_static! {
    static ref UNSAFE_FILE_CHARS: Regex = Regex::new(r#"[\\/:*?"<>|\s]+"#).unwrap();
}

/// Render a star rating the way review listings show it
pub fn format_stars(stars: Option<f64>) -> String {
    match stars {
        Some(stars) => format!("{}", stars.trunc() as i64),
        None => "-".to_string(),
    }
}

/// Format an analysis report for console output
///
/// # Arguments
///
/// * `report` - Analysis report of one upload
/// * `use_markdown` - Whether to wrap output in markdown triple backticks
///
/// # Returns
///
/// Formatted string for console output
pub fn format_report(report: &AnalysisReport, use_markdown: &bool) -> String {
    let mut output = String::new();

    if *use_markdown {
        output.push_str("```\n");
    }

    output.push_str(&format!(
        "{}\n",
        format!("Топ-{} моделей по количеству негативных отзывов", report.top_n)
            .yellow()
            .bold()
    ));
    if report.top_models().is_empty() {
        output.push_str("  Нет данных\n");
    } else {
        output.push_str(&format!(
            "  {:<24} {:>10} {:>8} {:>13}  {}\n",
            "Модель", "Негативных", "Всего", "% Негативных", "Основная категория"
        ));
        for summary in report.top_models() {
            output.push_str(&format!(
                "  {:<24} {:>10} {:>8} {:>13.1}  {}\n",
                summary.model,
                summary.negative,
                summary.total,
                summary.negative_pct,
                summary.main_category
            ));
        }
    }
    output.push('\n');

    output.push_str(&format!(
        "{}\n",
        "На что жалуются клиенты больше всего".yellow().bold()
    ));
    if report.category_counts.is_empty() {
        output.push_str("  Негативных отзывов нет\n");
    }
    for summary in &report.category_counts {
        output.push_str(&format!(
            "  {:<32} {:>8}\n",
            summary.category, summary.count
        ));
    }
    output.push('\n');

    for detail in &report.category_details {
        output.push_str(&format!(
            "{}\n",
            format!("{} — {} отзывов", detail.category, detail.count)
                .cyan()
                .bold()
        ));
        for model_count in &detail.model_counts {
            output.push_str(&format!(
                "    - {}: {}\n",
                model_count.model, model_count.count
            ));
        }
        output.push('\n');
    }

    if *use_markdown {
        output.push_str("```\n");
    }

    output
}

/// Format the review listing of one category
///
/// # Arguments
///
/// * `detail` - Category to list
/// * `filter` - Model selection applied to the listing
///
/// # Returns
///
/// One `⭐ <stars> — <text>` entry per review, separated by rules
pub fn format_category_reviews(detail: &CategoryDetail, filter: &ModelFilter) -> String {
    let mut output = format!(
        "{}\n",
        format!("Отзывы по модели с проблемой «{}»: {}", detail.category, filter)
            .yellow()
            .bold()
    );

    let reviews = detail.reviews_for(filter);
    if reviews.is_empty() {
        output.push_str("Нет отзывов\n");
        return output;
    }

    for review in reviews {
        output.push_str(&format!(
            "{} — {}\n---\n",
            format!("⭐ {}", format_stars(review.stars)).bold(),
            review.full_text.trim()
        ));
    }

    output
}

/// List the model choices of a category, "all models" first
pub fn format_filter_options(detail: &CategoryDetail) -> String {
    let options: Vec<String> = detail
        .filter_options()
        .iter()
        .map(|option| option.to_string())
        .collect();

    format!("{} {}\n", "Выберите модель:".bold(), options.join(" | "))
}

/// Export a report to a JSON file
pub fn export_report_json(report: &AnalysisReport, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create JSON output file: {}", output_path.display()))?;

    serde_json::to_writer_pretty(file, report).context("Failed to write JSON data")?;

    info!("Wrote JSON report to {}", output_path.display());
    Ok(())
}

/// Write reviews as CSV with the columns `model,stars,full_text`
pub fn write_reviews_csv<'a, W, I>(reviews: I, writer: W) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Review>,
{
    let mut writer = csv::Writer::from_writer(writer);

    for review in reviews {
        writer.serialize(review).context("Failed to write CSV record")?;
    }

    writer.flush().context("Failed to flush CSV writer")?;
    Ok(())
}

/// CSV download of every review in a category
pub fn category_csv_bytes(detail: &CategoryDetail) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_reviews_csv(&detail.reviews, &mut buffer)?;
    Ok(buffer)
}

/// File name offered for a category's CSV download
pub fn category_csv_file_name(category: &str) -> String {
    let safe = UNSAFE_FILE_CHARS.replace_all(category.trim(), "_");
    format!("{}_все_отзывы.csv", safe)
}

/// Write one CSV file per category into a directory
///
/// # Returns
///
/// Paths of the written files, in category order
pub fn export_category_csvs(report: &AnalysisReport, output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .context(format!("Failed to create CSV directory: {}", output_dir.display()))?;

    let mut written = Vec::new();
    for detail in &report.category_details {
        let path = output_dir.join(category_csv_file_name(&detail.category));
        let file = File::create(&path)
            .context(format!("Failed to create CSV output file: {}", path.display()))?;
        write_reviews_csv(&detail.reviews, file)?;
        written.push(path);
    }

    info!("Wrote {} category CSV files to {}", written.len(), output_dir.display());
    Ok(written)
}

/// Create an HTML dashboard from an analysis report
///
/// # Arguments
///
/// * `report` - Analysis report of one upload
/// * `output_path` - Path where the HTML file will be written
pub fn create_html_report(report: &AnalysisReport, output_path: &Path) -> Result<()> {
    let mut handlebars = Handlebars::new();

    const HTML_TEMPLATE: &str = r#"
    <!DOCTYPE html>
    <html lang="ru">
    <head>
        <meta charset="UTF-8">
        <meta name="viewport" content="width=device-width, initial-scale=1.0">
        <title>Анализ отзывов на товары</title>
        <style>
            body {
                font-family: Arial, sans-serif;
                line-height: 1.6;
                color: #333;
                max-width: 1200px;
                margin: 0 auto;
                padding: 20px;
            }
            h1 {
                color: #2c3e50;
                border-bottom: 2px solid #3498db;
                padding-bottom: 10px;
            }
            h2 {
                color: #2980b9;
                margin-top: 30px;
            }
            table {
                border-collapse: collapse;
                width: 100%;
                margin-bottom: 20px;
            }
            th, td {
                text-align: left;
                padding: 6px 10px;
                border-bottom: 1px solid #eee;
            }
            th {
                background-color: #e8f4f8;
            }
            details {
                background-color: #f8f9fa;
                border-radius: 5px;
                padding: 15px;
                margin-bottom: 20px;
                box-shadow: 0 2px 5px rgba(0,0,0,0.1);
            }
            summary {
                cursor: pointer;
                font-weight: bold;
                color: #3498db;
            }
            .review {
                padding: 5px 0;
                border-bottom: 1px solid #eee;
            }
            .timestamp {
                color: #7f8c8d;
                font-size: 0.9em;
                margin-bottom: 30px;
            }
            .summary {
                background-color: #e8f4f8;
                padding: 15px;
                border-radius: 5px;
                margin-bottom: 30px;
            }
        </style>
    </head>
    <body>
        <h1>Анализ отзывов на товары</h1>
        <div class="timestamp">Сформировано: {{timestamp}}</div>

        <div class="summary">
            <p>Отзывов: {{total_reviews}}</p>
            <p>Негативных отзывов: {{negative_reviews}}</p>
        </div>

        <h2>Топ-{{top_n}} моделей по количеству негативных отзывов</h2>
        <table>
            <tr><th>Модель</th><th>Негативных</th><th>Всего</th><th>% Негативных</th><th>Основная категория</th></tr>
            {{#each top_models}}
            <tr><td>{{model}}</td><td>{{negative}}</td><td>{{total}}</td><td>{{negative_pct}}</td><td>{{main_category}}</td></tr>
            {{/each}}
        </table>

        <h2>На что жалуются клиенты больше всего</h2>
        <table>
            <tr><th>Категория</th><th>Количество</th></tr>
            {{#each category_counts}}
            <tr><td>{{category}}</td><td>{{count}}</td></tr>
            {{/each}}
        </table>

        <h2>Анализ по категориям</h2>
        {{#each categories}}
        <details>
            <summary>{{category}} — {{count}} отзывов</summary>
            <p>Файл: {{csv_file}}</p>
            <table>
                <tr><th>Модель</th><th>Количество отзывов</th></tr>
                {{#each model_counts}}
                <tr><td>{{model}}</td><td>{{count}}</td></tr>
                {{/each}}
            </table>
            {{#each reviews}}
            <div class="review"><strong>⭐ {{stars}}</strong> — {{text}}</div>
            {{/each}}
        </details>
        {{/each}}
    </body>
    </html>
    "#;

    handlebars
        .register_template_string("report", HTML_TEMPLATE)
        .context("Failed to register HTML template")?;

    let categories: Vec<Value> = report
        .category_details
        .iter()
        .map(|detail| {
            let reviews: Vec<Value> = detail
                .reviews
                .iter()
                .map(|r| json!({ "stars": format_stars(r.stars), "text": r.full_text.trim() }))
                .collect();

            json!({
                "category": detail.category,
                "count": detail.count,
                "csv_file": category_csv_file_name(&detail.category),
                "model_counts": detail.model_counts,
                "reviews": reviews,
            })
        })
        .collect();

    let template_data = json!({
        "timestamp": chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        "total_reviews": report.total_reviews,
        "negative_reviews": report.negative_reviews,
        "top_n": report.top_n,
        "top_models": report.top_models(),
        "category_counts": report.category_counts,
        "categories": categories,
    });

    let html = handlebars
        .render("report", &template_data)
        .context("Failed to render HTML template")?;

    let mut file = File::create(output_path)
        .context(format!("Failed to create HTML output file: {}", output_path.display()))?;

    file.write_all(html.as_bytes())
        .context("Failed to write HTML data")?;

    info!("Wrote HTML report to {}", output_path.display());
    Ok(())
}

/// Create a short summary of a report
pub fn create_summary(report: &AnalysisReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n\n", "Analysis Summary".yellow().bold()));
    output.push_str(&format!("Reviews analyzed: {}\n", report.total_reviews));
    output.push_str(&format!("Negative reviews: {}\n", report.negative_reviews));
    output.push_str(&format!("Models: {}\n\n", report.model_summaries.len()));

    if !report.category_counts.is_empty() {
        output.push_str(&format!("{}\n", "Top Complaint Categories".cyan().bold()));

        for (i, summary) in report.category_counts.iter().take(10).enumerate() {
            output.push_str(&format!("{}. {}: {}\n", i + 1, summary.category, summary.count));
        }
    }

    output
}
