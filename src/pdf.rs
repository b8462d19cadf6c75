use crate::error::{ReportError, Result};
use crate::schema::DateRange;
use log::debug;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::fs;
use std::path::{Path, PathBuf};

/// Generated narrative for one client and date range.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeReport {
    pub client_id: i64,
    pub range: DateRange,
    pub body: String,
}

impl NarrativeReport {
    pub fn title(&self) -> String {
        format!("Informe del Cliente {}", self.client_id)
    }

    pub fn range_line(&self) -> String {
        format!("Rango de fechas: {}", self.range)
    }
}

/// Persists a narrative report at `path` and returns the path written.
pub trait ReportWriter {
    fn write(&self, report: &NarrativeReport, path: &Path) -> Result<PathBuf>;
}

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const FONT_SIZE: i64 = 12;
const LINE_HEIGHT: i64 = 16;
// Average Helvetica glyph width at 12pt is roughly 6pt.
const CHAR_WIDTH: i64 = 6;

/// A4 PDF with a centered title, the date range line and the wrapped body.
#[derive(Debug, Clone, Default)]
pub struct PdfReportWriter;

struct PlacedLine {
    x: i64,
    text: String,
}

impl PdfReportWriter {
    fn max_chars() -> usize {
        ((PAGE_WIDTH - 2 * MARGIN) / CHAR_WIDTH) as usize
    }

    fn lines_per_page() -> usize {
        ((PAGE_HEIGHT - 2 * MARGIN) / LINE_HEIGHT) as usize
    }

    fn layout(report: &NarrativeReport) -> Vec<PlacedLine> {
        let title = report.title();
        let title_width = title.chars().count() as i64 * CHAR_WIDTH;
        let mut lines = vec![
            PlacedLine {
                x: ((PAGE_WIDTH - title_width) / 2).max(MARGIN),
                text: title,
            },
            PlacedLine {
                x: MARGIN,
                text: report.range_line(),
            },
        ];
        for line in wrap_text(&report.body, Self::max_chars()) {
            lines.push(PlacedLine {
                x: MARGIN,
                text: line,
            });
        }
        lines
    }

    /// Builds the in-memory document without touching the filesystem.
    pub fn build(&self, report: &NarrativeReport) -> Result<Document> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let lines = Self::layout(report);
        let mut kids: Vec<Object> = Vec::new();
        for chunk in lines.chunks(Self::lines_per_page()) {
            let page_id = add_page(&mut doc, pages_id, chunk)?;
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();
        Ok(doc)
    }
}

fn add_page(doc: &mut Document, pages_id: ObjectId, lines: &[PlacedLine]) -> Result<ObjectId> {
    let mut operations = Vec::with_capacity(lines.len() * 5);
    let mut y = PAGE_HEIGHT - MARGIN;
    for line in lines {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![Object::Name(b"F1".to_vec()), Object::Integer(FONT_SIZE)],
        ));
        operations.push(Operation::new(
            "Td",
            vec![Object::Integer(line.x), Object::Integer(y)],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(
                encode_win_ansi(&line.text),
                StringFormat::Literal,
            )],
        ));
        operations.push(Operation::new("ET", vec![]));
        y -= LINE_HEIGHT;
    }

    let content = Content { operations };
    let encoded = content
        .encode()
        .map_err(|e| ReportError::Pdf(format!("Failed to encode page content: {}", e)))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    }))
}

impl ReportWriter for PdfReportWriter {
    fn write(&self, report: &NarrativeReport, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut doc = self.build(report)?;
        doc.save(path)
            .map_err(|e| ReportError::Pdf(format!("{}: {}", path.display(), e)))?;
        debug!("Wrote report PDF to {}", path.display());
        Ok(path.to_path_buf())
    }
}

/// Characters WinAnsiEncoding places in 0x80..=0x9F. Latin-1 leaves that
/// block to C1 control codes.
const WIN_ANSI_HIGH: [(char, u8); 27] = [
    ('\u{20AC}', 0x80),
    ('\u{201A}', 0x82),
    ('\u{0192}', 0x83),
    ('\u{201E}', 0x84),
    ('\u{2026}', 0x85),
    ('\u{2020}', 0x86),
    ('\u{2021}', 0x87),
    ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89),
    ('\u{0160}', 0x8A),
    ('\u{2039}', 0x8B),
    ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('\u{2022}', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('\u{02DC}', 0x98),
    ('\u{2122}', 0x99),
    ('\u{0161}', 0x9A),
    ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C),
    ('\u{017E}', 0x9E),
    ('\u{0178}', 0x9F),
];

/// WinAnsi bytes for the standard fonts. Unmapped characters, C1 controls
/// included, become `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match u32::from(c) {
        0x80..=0x9F => b'?',
        code @ 0..=0xFF => code as u8,
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|(mapped, _)| *mapped == c)
            .map(|(_, byte)| *byte)
            .unwrap_or(b'?'),
    }
}

/// Greedy word wrap. Blank input lines are kept as paragraph breaks and words
/// longer than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0usize;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if current_len > 0 {
                    out.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                out.push(word.into_iter().collect());
                word = rest;
            }
            let needed = if current_len == 0 {
                word.len()
            } else {
                current_len + 1 + word.len()
            };
            if needed > width && current_len > 0 {
                out.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(word.iter());
            current_len += word.len();
        }
        if current_len > 0 || paragraph.trim().is_empty() {
            out.push(current);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn report(body: &str) -> NarrativeReport {
        NarrativeReport {
            client_id: 7,
            range: DateRange::new(
                NaiveDate::from_ymd_opt(2021, 5, 1).unwrap(),
                NaiveDate::from_ymd_opt(2021, 5, 31).unwrap(),
            ),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_header_lines() {
        let report = report("texto");
        assert_eq!(report.title(), "Informe del Cliente 7");
        assert_eq!(report.range_line(), "Rango de fechas: 2021-05-01 a 2021-05-31");
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("uno dos tres cuatro", 8);
        assert_eq!(lines, vec!["uno dos", "tres", "cuatro"]);

        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);

        let lines = wrap_text("primero\n\nsegundo", 20);
        assert_eq!(lines, vec!["primero", "", "segundo"]);
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Año"), vec![b'A', 0xF1, b'o']);
        assert_eq!(encode_win_ansi("\u{2603}"), vec![b'?']);
    }

    #[test]
    fn test_encode_win_ansi_punctuation() {
        assert_eq!(encode_win_ansi("\u{20AC}5"), vec![0x80, b'5']);
        assert_eq!(
            encode_win_ansi("\u{201C}ok\u{201D} l\u{2019}\u{2014}"),
            vec![0x93, b'o', b'k', 0x94, b' ', b'l', 0x92, 0x97]
        );
        assert_eq!(encode_win_ansi("\u{0085}\u{009F}"), vec![b'?', b'?']);
    }

    #[test]
    fn test_write_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.pdf");
        let written = PdfReportWriter.write(&report("Resumen breve."), &path).unwrap();
        assert_eq!(written, path);

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let loaded = Document::load(&path).unwrap();
        assert_eq!(loaded.get_pages().len(), 1);
    }

    #[test]
    fn test_long_body_spans_pages() {
        let body = "linea\n".repeat(120);
        let doc = PdfReportWriter.build(&report(&body)).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }
}
