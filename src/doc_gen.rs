use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use headless_chrome::{Browser, LaunchOptionsBuilder};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::ReportSettings;
use crate::models::{Record, ReportCard};

const REPORT_CSS: &str = r#"
@page { size: A4; margin: 18mm; }
body { font-family: 'Segoe UI', Arial, sans-serif; color: #222; margin: 0; }
.header { text-align: center; border-bottom: 2px solid #333; padding-bottom: 10px; margin-bottom: 18px; }
.header h1 { margin: 0; font-size: 24px; letter-spacing: 1px; }
.header p { margin: 4px 0 0; font-size: 13px; }
.title { text-align: center; font-size: 18px; font-weight: bold; margin: 12px 0; }
.student p { margin: 3px 0; font-size: 14px; }
table { width: 100%; border-collapse: collapse; margin-top: 16px; font-size: 13px; }
th, td { border: 1px solid #555; padding: 6px 8px; text-align: left; }
th { background: #eee; }
.empty { text-align: center; font-style: italic; }
"#;

/// `ReportCard_<name-or-id>.pdf` with anything unsafe in a file name
/// replaced by `_`.
pub fn report_file_name(card: &ReportCard) -> Result<String> {
    let student = &card.student;
    let mut stem = student.text("name");
    if stem.trim().is_empty() {
        stem = student.text("student_id");
    }
    if stem.trim().is_empty() {
        stem = "student".to_string();
    }
    let unsafe_chars = Regex::new(r"[^A-Za-z0-9_-]+")?;
    let stem = unsafe_chars.replace_all(stem.trim(), "_");
    Ok(format!("ReportCard_{stem}.pdf"))
}

fn first_text(record: &Record, fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| record.text(f))
        .find(|v| !v.is_empty())
        .unwrap_or_default()
}

pub fn report_card_html(card: &ReportCard, settings: &ReportSettings) -> Markup {
    let student = &card.student;
    let name = first_text(student, &["name", "student_name"]);
    let class = first_text(student, &["class_name", "class_id"]);
    let course = first_text(student, &["course_name", "course_id"]);

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                title { "Report Card" }
                style { (PreEscaped(REPORT_CSS)) }
            }
            body {
                div.header {
                    h1 { (settings.school_name) }
                    p { (settings.school_address) }
                }
                div.title { "Student Report Card" }
                div.student {
                    p { strong { "Name: " } (name) }
                    p { strong { "Student ID: " } (student.text("student_id")) }
                    p { strong { "Class: " } (class) }
                    p { strong { "Course: " } (course) }
                }
                table {
                    thead {
                        tr {
                            th { "Subject" }
                            th { "Class Score" }
                            th { "Exam Score" }
                            th { "Total" }
                            th { "Grade" }
                            th { "Remarks" }
                            th { "Semester" }
                        }
                    }
                    tbody {
                        @if card.marks.is_empty() {
                            tr { td.empty colspan="7" { "No marks recorded" } }
                        }
                        @for entry in &card.marks {
                            tr {
                                td { (entry.subject()) }
                                td {}
                                td {}
                                td { (entry.total()) }
                                td { (entry.grade.as_deref().unwrap_or_default()) }
                                td { (entry.remarks.as_deref().unwrap_or_default()) }
                                td { (entry.semester.as_deref().unwrap_or_default()) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn file_url(path: &Path) -> Result<String> {
    let absolute = fs::canonicalize(path)
        .with_context(|| format!("failed to resolve {}", path.display()))?;
    let path = absolute
        .to_str()
        .ok_or_else(|| anyhow!("path is not valid UTF-8: {}", absolute.display()))?;

    // Chrome wants file:///C:/... without the verbatim prefix.
    #[cfg(target_os = "windows")]
    let path = format!("/{}", path.strip_prefix(r"\\?\").unwrap_or(path).replace('\\', "/"));

    Ok(format!("file://{path}"))
}

pub fn generate_pdf_from_html(html_path: &Path, output_pdf: &Path) -> Result<()> {
    let options = LaunchOptionsBuilder::default()
        .headless(true)
        .build()
        .map_err(|e| anyhow!("invalid browser options: {e}"))?;
    let browser = Browser::new(options).context("failed to launch headless Chrome")?;
    let tab = browser.new_tab().context("failed to open a browser tab")?;

    let url = file_url(html_path)?;
    debug!(%url, "rendering report");
    tab.navigate_to(&url)
        .and_then(|tab| tab.wait_until_navigated())
        .with_context(|| format!("failed to load {url}"))?;

    let pdf = tab.print_to_pdf(None).context("failed to print PDF")?;
    fs::write(output_pdf, pdf).with_context(|| format!("failed to write {}", output_pdf.display()))?;
    Ok(())
}

/// Writes the HTML next to the target PDF, prints it and removes the HTML
/// again, whatever the outcome.
pub fn generate_report_card(card: &ReportCard, settings: &ReportSettings) -> Result<PathBuf> {
    generate_report_card_with(card, settings, generate_pdf_from_html)
}

/// [`generate_report_card`] with the HTML to PDF step supplied by the
/// caller. A failed print leaves neither the HTML nor a partial PDF behind.
pub fn generate_report_card_with(
    card: &ReportCard,
    settings: &ReportSettings,
    print: impl FnOnce(&Path, &Path) -> Result<()>,
) -> Result<PathBuf> {
    fs::create_dir_all(&settings.reports_dir)
        .with_context(|| format!("failed to create {}", settings.reports_dir.display()))?;

    let pdf_path = settings.reports_dir.join(report_file_name(card)?);
    let html_path = pdf_path.with_extension("html");

    fs::write(&html_path, report_card_html(card, settings).into_string())
        .with_context(|| format!("failed to write {}", html_path.display()))?;

    let printed = print(&html_path, &pdf_path);
    if let Err(err) = fs::remove_file(&html_path) {
        warn!(path = %html_path.display(), "could not remove intermediate HTML: {err}");
    }
    if let Err(err) = printed {
        if pdf_path.exists() {
            if let Err(remove_err) = fs::remove_file(&pdf_path) {
                warn!(path = %pdf_path.display(), "could not remove partial PDF: {remove_err}");
            }
        }
        return Err(err);
    }

    info!(path = %pdf_path.display(), "report card generated");
    Ok(pdf_path)
}
