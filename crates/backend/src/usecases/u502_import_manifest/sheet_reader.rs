use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read, Seek};

use crate::shared::xml_text::{push_entity, push_text};

#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("unsupported file type '{0}', expected .xlsx or .csv")]
    UnsupportedFormat(String),

    #[error("'{0}' is a legacy .xls workbook, save it as .xlsx or .csv")]
    LegacyWorkbook(String),

    #[error("cannot open workbook: {0}")]
    Archive(String),

    #[error("workbook has no worksheet")]
    NoWorksheet,

    #[error("malformed workbook XML in {part}: {message}")]
    Xml { part: String, message: String },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Rows of the first sheet as cell text, blank rows left out.
/// Cells are indexed by column (A = 0); gaps are empty strings.
pub type SheetRows = Vec<Vec<String>>;

pub fn read_sheet(file_name: &str, content: &[u8]) -> Result<SheetRows, SheetError> {
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".xlsx") {
        read_xlsx(content)
    } else if lower.ends_with(".csv") {
        read_csv(content)
    } else if lower.ends_with(".xls") {
        Err(SheetError::LegacyWorkbook(file_name.to_string()))
    } else {
        Err(SheetError::UnsupportedFormat(file_name.to_string()))
    }
}

pub fn read_csv(content: &[u8]) -> Result<SheetRows, SheetError> {
    let text = String::from_utf8_lossy(content);
    // Strip UTF-8 BOM if present
    let text = text.trim_start_matches('\u{FEFF}');

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<String> = record.iter().map(|v| v.to_string()).collect();
        if !is_blank(&row) {
            rows.push(row);
        }
    }
    Ok(rows)
}

pub fn read_xlsx(content: &[u8]) -> Result<SheetRows, SheetError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(content))
        .map_err(|e| SheetError::Archive(e.to_string()))?;

    let shared_strings = match read_part(&mut archive, "xl/sharedStrings.xml")? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };

    let sheet_name = first_worksheet(&archive).ok_or(SheetError::NoWorksheet)?;
    let sheet_xml = read_part(&mut archive, &sheet_name)?.ok_or(SheetError::NoWorksheet)?;
    parse_worksheet(&sheet_xml, &shared_strings)
}

fn read_part<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, SheetError> {
    let mut file = match archive.by_name(name) {
        Ok(f) => f,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(SheetError::Archive(e.to_string())),
    };
    let mut xml = String::new();
    file.read_to_string(&mut xml)
        .map_err(|e| SheetError::Archive(format!("{}: {}", name, e)))?;
    Ok(Some(xml))
}

/// `xl/worksheets/sheetN.xml` with the lowest N
fn first_worksheet<R: Read + Seek>(archive: &zip::ZipArchive<R>) -> Option<String> {
    archive
        .file_names()
        .filter_map(|name| {
            let n = name
                .strip_prefix("xl/worksheets/sheet")?
                .strip_suffix(".xml")?
                .parse::<u32>()
                .ok()?;
            Some((n, name.to_string()))
        })
        .min_by_key(|(n, _)| *n)
        .map(|(_, name)| name)
}

fn xml_error(part: &str, e: impl std::fmt::Display) -> SheetError {
    SheetError::Xml {
        part: part.to_string(),
        message: e.to_string(),
    }
}

/// Text of every `<si>`, rich-text runs concatenated
pub fn parse_shared_strings(xml: &str) -> Result<Vec<String>, SheetError> {
    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"t" => in_t = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"si" {
                    strings.push(String::new());
                }
            }
            Ok(Event::Text(e)) => {
                if in_si && in_t {
                    push_text(&mut current, &e).map_err(|err| xml_error("sharedStrings", err))?;
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if in_si && in_t {
                    push_entity(&mut current, &e).map_err(|err| xml_error("sharedStrings", err))?;
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_t = false,
                b"si" => {
                    in_si = false;
                    strings.push(std::mem::take(&mut current));
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error("sharedStrings", e)),
            _ => {}
        }
    }
    Ok(strings)
}

#[derive(Default)]
struct CellState {
    column: usize,
    cell_type: Option<String>,
    value: String,
}

pub fn parse_worksheet(xml: &str, shared_strings: &[String]) -> Result<SheetRows, SheetError> {
    let mut reader = Reader::from_str(xml);
    let mut rows: SheetRows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell: Option<CellState> = None;
    let mut next_column = 0usize;
    let mut in_value = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"row" => {
                    row.clear();
                    next_column = 0;
                }
                b"c" => {
                    let state = cell_state(e, next_column);
                    next_column = state.column + 1;
                    cell = Some(state);
                }
                b"v" | b"t" => in_value = cell.is_some(),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"c" {
                    next_column = cell_state(e, next_column).column + 1;
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(state) = cell.as_mut().filter(|_| in_value) {
                    push_text(&mut state.value, &e).map_err(|err| xml_error("worksheet", err))?;
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if let Some(state) = cell.as_mut().filter(|_| in_value) {
                    push_entity(&mut state.value, &e).map_err(|err| xml_error("worksheet", err))?;
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"c" => {
                    if let Some(state) = cell.take() {
                        let text = cell_text(&state, shared_strings);
                        if row.len() <= state.column {
                            row.resize(state.column + 1, String::new());
                        }
                        row[state.column] = text;
                    }
                }
                b"row" => {
                    if !is_blank(&row) {
                        rows.push(std::mem::take(&mut row));
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error("worksheet", e)),
            _ => {}
        }
    }
    Ok(rows)
}

fn cell_state(e: &BytesStart<'_>, fallback_column: usize) -> CellState {
    let mut state = CellState {
        column: fallback_column,
        ..Default::default()
    };
    for attr in e.attributes().flatten() {
        match attr.key.local_name().as_ref() {
            b"r" => {
                if let Some(col) = column_from_reference(&String::from_utf8_lossy(&attr.value)) {
                    state.column = col;
                }
            }
            b"t" => state.cell_type = Some(String::from_utf8_lossy(&attr.value).into_owned()),
            _ => {}
        }
    }
    state
}

fn cell_text(state: &CellState, shared_strings: &[String]) -> String {
    match state.cell_type.as_deref() {
        Some("s") => state
            .value
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|i| shared_strings.get(i).cloned())
            .unwrap_or_default(),
        Some("b") => match state.value.trim() {
            "1" => "TRUE".to_string(),
            _ => "FALSE".to_string(),
        },
        _ => state.value.clone(),
    }
}

/// Zero-based column of a cell reference ("C12" -> 2, "AA3" -> 26)
pub fn column_from_reference(reference: &str) -> Option<usize> {
    let letters: Vec<u8> = reference
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .map(|b| b.to_ascii_uppercase())
        .collect();
    if letters.is_empty() {
        return None;
    }
    let mut index = 0usize;
    for b in letters {
        index = index * 26 + (b - b'A' + 1) as usize;
    }
    Some(index - 1)
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}
