use contracts::domain::a002_member::MemberDraft;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;

use crate::shared::xml_text::{push_entity, push_text};

pub const ROOT_ELEMENT: &str = "VIRTEK_BUILDING_MATERIAL_MARKUP_LANGUAGE_FILE";
pub const UNKNOWN_JOB: &str = "Unknown";

const MM_PER_INCH: f64 = 25.4;
const CM_PER_INCH: f64 = 2.54;

#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("file is not valid UTF-8")]
    Encoding,

    #[error("document has no root element")]
    Empty,

    #[error("unexpected root element <{0}>, expected <VIRTEK_BUILDING_MATERIAL_MARKUP_LANGUAGE_FILE>")]
    UnexpectedRoot(String),

    #[error("malformed XML at byte {position}: {message}")]
    Xml { position: u64, message: String },
}

/// One STRUCTURE_DATA section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureInfo {
    pub structure_id: String,
    pub member_qty: Option<i64>,
    pub bundle_layer: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMarkup {
    pub job_number: String,
    pub bundle_name: String,
    pub structures: Vec<StructureInfo>,
    pub members: Vec<MemberDraft>,
}

impl ParsedMarkup {
    pub fn bundle_layer(&self) -> Option<String> {
        self.structures.iter().find_map(|s| s.bundle_layer.clone())
    }
}

#[derive(Default)]
struct Header {
    job_name: Option<String>,
    job_number: Option<String>,
    bundle_name: Option<String>,
}

/// Decodes uploaded bytes, dropping a UTF-8 BOM.
pub fn decode_upload(bytes: &[u8]) -> Result<&str, MarkupError> {
    let text = std::str::from_utf8(bytes).map_err(|_| MarkupError::Encoding)?;
    Ok(text.trim_start_matches('\u{FEFF}'))
}

/// Reads a building-materials markup document into a bundle description.
///
/// `file_name` supplies the bundle name when neither the header nor any
/// structure names one.
pub fn parse_markup(xml: &str, file_name: &str) -> Result<ParsedMarkup, MarkupError> {
    let mut reader = Reader::from_str(xml);

    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut unit: Option<String> = None;
    let mut saw_root = false;

    let mut header = Header::default();
    let mut structures: Vec<StructureInfo> = Vec::new();
    let mut members: Vec<MemberDraft> = Vec::new();
    let mut structure: Option<StructureInfo> = None;
    let mut member: Option<MemberDraft> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = element_name(e);
                if path.is_empty() {
                    check_root(&name)?;
                    saw_root = true;
                }
                match name.as_str() {
                    "STRUCTURE_DATA" => structure = Some(StructureInfo::default()),
                    "MEMBER_DATA" => {
                        member = Some(MemberDraft {
                            structure_id: structure
                                .as_ref()
                                .map(|s| s.structure_id.clone())
                                .filter(|id| !id.is_empty()),
                            ..Default::default()
                        })
                    }
                    _ => {}
                }
                unit = unit_attribute(e);
                text.clear();
                path.push(name);
            }
            Ok(Event::Empty(ref e)) => {
                if path.is_empty() {
                    check_root(&element_name(e))?;
                    saw_root = true;
                }
            }
            Ok(Event::Text(e)) => {
                push_text(&mut text, &e).map_err(|err| xml_failure(&reader, err))?;
            }
            Ok(Event::GeneralRef(e)) => {
                push_entity(&mut text, &e).map_err(|err| xml_failure(&reader, err))?;
            }
            Ok(Event::CData(e)) => {
                text.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::End(_)) => {
                let Some(name) = path.pop() else {
                    continue;
                };
                let parent = path.last().map(String::as_str).unwrap_or("");
                let value = text.trim();

                match (parent, name.as_str()) {
                    (_, "MEMBER_DATA") => {
                        if let Some(done) = member.take() {
                            members.push(done);
                        }
                    }
                    (_, "STRUCTURE_DATA") => {
                        if let Some(done) = structure.take() {
                            structures.push(done);
                        }
                    }
                    ("HEADER_DATA", field) => header.set(field, value),
                    ("MEMBER_DATA", field) => {
                        if let Some(m) = member.as_mut() {
                            set_member_field(m, field, value, unit.as_deref());
                        }
                    }
                    ("STRUCTURE_DATA", field) => {
                        if let Some(s) = structure.as_mut() {
                            set_structure_field(s, field, value);
                        }
                    }
                    _ => {}
                }
                text.clear();
                unit = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_failure(&reader, e)),
            _ => {}
        }
    }

    if !saw_root {
        return Err(MarkupError::Empty);
    }

    attribute_top_level_members(&mut members, &structures);

    let job_number = header
        .job_name
        .or(header.job_number)
        .unwrap_or_else(|| UNKNOWN_JOB.to_string());
    let bundle_name = header
        .bundle_name
        .or_else(|| {
            structures
                .iter()
                .map(|s| s.structure_id.clone())
                .find(|id| !id.is_empty())
        })
        .unwrap_or_else(|| file_stem(file_name));

    Ok(ParsedMarkup {
        job_number,
        bundle_name,
        structures,
        members,
    })
}

fn xml_failure(reader: &Reader<&[u8]>, err: impl std::fmt::Display) -> MarkupError {
    MarkupError::Xml {
        position: reader.error_position() as u64,
        message: err.to_string(),
    }
}

impl Header {
    fn set(&mut self, field: &str, value: &str) {
        let value = non_empty(value);
        match field {
            "JOB_NAME" => self.job_name = value,
            "JOB_NUMBER" => self.job_number = value,
            "BUNDLE_NAME" => self.bundle_name = value,
            _ => {}
        }
    }
}

fn check_root(name: &str) -> Result<(), MarkupError> {
    if name == ROOT_ELEMENT {
        Ok(())
    } else {
        Err(MarkupError::UnexpectedRoot(name.to_string()))
    }
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// `UNIT` or `unit` attribute of a measurement element
fn unit_attribute(e: &BytesStart<'_>) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        if attr.key.local_name().as_ref().eq_ignore_ascii_case(b"unit") {
            attr.unescape_value().ok().map(|v| v.trim().to_string())
        } else {
            None
        }
    })
}

fn set_member_field(m: &mut MemberDraft, field: &str, value: &str, unit: Option<&str>) {
    match field {
        "MEMBER_ID" => m.member_id = value.to_string(),
        "TYPE" => m.member_type = non_empty(value),
        "NAME" => m.name = non_empty(value),
        "DESCRIPTION" => m.description = non_empty(value),
        "UNIQUE_ID" => m.unique_id = non_empty(value),
        "CUT_MEMBER" => m.cut_member = parse_bool(value),
        "HEIGHT" => m.height = parse_measure(value, unit),
        "WIDTH" => m.width = parse_measure(value, unit),
        "ACTUAL_HEIGHT" => m.actual_height = parse_measure(value, unit),
        "ACTUAL_WIDTH" => m.actual_width = parse_measure(value, unit),
        "LENGTH" => m.length = parse_measure(value, unit),
        _ => {}
    }
}

fn set_structure_field(s: &mut StructureInfo, field: &str, value: &str) {
    match field {
        "STRUCTURE_ID" => s.structure_id = value.to_string(),
        "MEMBER_QTY" => s.member_qty = value.parse().ok(),
        "BUNDLE_LAYER" => s.bundle_layer = non_empty(value),
        _ => {}
    }
}

/// Members listed outside any structure belong to the structure whose id
/// prefixes their member id (longest match wins).
fn attribute_top_level_members(members: &mut [MemberDraft], structures: &[StructureInfo]) {
    for m in members.iter_mut().filter(|m| m.structure_id.is_none()) {
        m.structure_id = structures
            .iter()
            .filter(|s| !s.structure_id.is_empty() && m.member_id.starts_with(&s.structure_id))
            .max_by_key(|s| s.structure_id.len())
            .map(|s| s.structure_id.clone());
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "1" | "y"
    )
}

/// Numeric value in inches; `None` when missing or unparsable.
pub fn parse_measure(value: &str, unit: Option<&str>) -> Option<f64> {
    let number: f64 = value.trim().parse().ok().filter(|v: &f64| v.is_finite())?;
    let unit = unit.map(|u| u.trim().to_ascii_lowercase()).unwrap_or_default();
    let inches = match unit.as_str() {
        "" | "in" | "inch" | "inches" => number,
        "ft" | "foot" | "feet" => number * 12.0,
        "mm" => number / MM_PER_INCH,
        "cm" => number / CM_PER_INCH,
        other => {
            tracing::warn!("Unknown unit '{}', reading value as inches", other);
            number
        }
    };
    Some(inches)
}

fn file_stem(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| file_name.to_string())
}
