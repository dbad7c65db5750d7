//! Human-readable summaries of a bundle's members.
//!
//! A bundle lists every physical piece. The floor wants "12 x 2x6 @ 8-4-0"
//! instead, plus a one-line studs summary with a sill-seal flag.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::measure::{decimal_to_fraction, feet_inches_sixteenths};
use crate::domain::a002_member::{Member, MemberDraft};

/// Bucket for members whose markup carried no type
pub const UNTYPED_BUCKET: &str = "(no type)";

/// Studs shorter than this (inches) are cut pieces, not wall studs
pub const MIN_STUD_LENGTH: f64 = 70.0;

pub const SILL_SEAL_NOTE: &str = "(+ SILL SEAL)";

static DIMENSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(2x\d+|3-1/2X4|3\.5 x 11\.25)").expect("dimension pattern is valid")
});

/// Read access to the fields summaries are computed from.
pub trait MemberFields {
    fn member_type(&self) -> Option<&str>;
    fn description(&self) -> Option<&str>;
    fn length(&self) -> Option<f64>;
}

impl MemberFields for Member {
    fn member_type(&self) -> Option<&str> {
        self.member_type.as_deref()
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn length(&self) -> Option<f64> {
        self.length
    }
}

impl MemberFields for MemberDraft {
    fn member_type(&self) -> Option<&str> {
        self.member_type.as_deref()
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn length(&self) -> Option<f64> {
        self.length
    }
}

/// Identical (description, length) pieces of one type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberGroup {
    pub description: String,
    pub length: Option<f64>,
    pub count: usize,
    /// Feet-inches-sixteenths, empty when the length is unknown
    pub feet_inches: String,
    /// Whole inches plus fraction, empty when the length is unknown
    pub length_fraction: String,
    /// "12 x 2x6 @ 8-4-0"
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberTypeGroup {
    pub member_type: String,
    /// Pieces of this type
    pub total: usize,
    pub entries: Vec<MemberGroup>,
}

fn length_key(length: Option<f64>) -> String {
    match length {
        Some(l) => format!("{}", l),
        None => String::new(),
    }
}

/// Groups members by type, then merges identical (description, length).
///
/// Output order depends only on the grouped values: types alphabetically,
/// entries by description then longest first.
pub fn group_by_type_and_description<M: MemberFields>(members: &[M]) -> Vec<MemberTypeGroup> {
    let mut by_type: BTreeMap<String, BTreeMap<String, (String, Option<f64>, usize)>> =
        BTreeMap::new();

    for member in members {
        let member_type = member
            .member_type()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNTYPED_BUCKET)
            .to_string();
        let description = member.description().unwrap_or_default().trim().to_string();
        let length = member.length();
        let key = format!("{}|{}", description, length_key(length));

        by_type
            .entry(member_type)
            .or_default()
            .entry(key)
            .and_modify(|entry| entry.2 += 1)
            .or_insert((description, length, 1));
    }

    by_type
        .into_iter()
        .map(|(member_type, entries)| {
            let mut entries: Vec<MemberGroup> = entries
                .into_values()
                .map(|(description, length, count)| member_group(description, length, count))
                .collect();
            entries.sort_by(|a, b| {
                a.description.cmp(&b.description).then_with(|| {
                    b.length
                        .unwrap_or(0.0)
                        .total_cmp(&a.length.unwrap_or(0.0))
                })
            });
            MemberTypeGroup {
                total: entries.iter().map(|e| e.count).sum(),
                member_type,
                entries,
            }
        })
        .collect()
}

fn member_group(description: String, length: Option<f64>, count: usize) -> MemberGroup {
    let feet_inches = length.map(feet_inches_sixteenths).unwrap_or_default();
    let length_fraction = length.map(decimal_to_fraction).unwrap_or_default();
    let label = if feet_inches.is_empty() {
        format!("{} x {}", count, description)
    } else {
        format!("{} x {} @ {}", count, description, feet_inches)
    };
    MemberGroup {
        description,
        length,
        count,
        feet_inches,
        length_fraction,
        label,
    }
}

/// One distinct stud length/dimension pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudEntry {
    pub dimension: String,
    pub length_fraction: String,
    /// "96 1/2″ 2x6"
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudsSummary {
    pub entries: Vec<StudEntry>,
    pub has_sill_seal: bool,
}

impl StudsSummary {
    pub fn from_members<M: MemberFields>(members: &[M]) -> Self {
        // Keyed by dimension then length in sixteenths so 92 5/8 sorts before 104 5/8
        let mut entries: BTreeMap<(String, i64), StudEntry> = BTreeMap::new();
        let mut has_sill_seal = false;

        for member in members {
            let member_type = member.member_type().unwrap_or_default();
            if member_type.to_lowercase().contains("stud") {
                if let Some(length) = member.length().filter(|l| *l >= MIN_STUD_LENGTH) {
                    let description = member.description().unwrap_or_default();
                    let dimension = extract_dimension(description);
                    let length_fraction = decimal_to_fraction(length);
                    let label = format!("{}″ {}", length_fraction, dimension);
                    let key = (dimension.clone(), (length * 16.0).round() as i64);
                    entries.entry(key).or_insert(StudEntry {
                        dimension,
                        length_fraction,
                        label,
                    });
                }
            }
            if is_sill_seal(member) {
                has_sill_seal = true;
            }
        }

        Self {
            entries: entries.into_values().collect(),
            has_sill_seal,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && !self.has_sill_seal
    }
}

impl fmt::Display for StudsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.entries.iter().map(|e| e.label.as_str()).collect();
        write!(f, "{}", labels.join(", "))?;
        if self.has_sill_seal {
            if labels.is_empty() {
                write!(f, "{}", SILL_SEAL_NOTE)?;
            } else {
                write!(f, " {}", SILL_SEAL_NOTE)?;
            }
        }
        Ok(())
    }
}

/// First recognized lumber dimension in a description, or the description
/// itself when none is recognized.
pub fn extract_dimension(description: &str) -> String {
    DIMENSION_RE
        .find(description)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| description.trim().to_string())
}

/// Lowercase with spaces, hyphens and underscores removed
fn squash(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// A bottom-plate member whose description mentions sill seal.
pub fn is_sill_seal<M: MemberFields>(member: &M) -> bool {
    let member_type = squash(member.member_type().unwrap_or_default());
    let description = squash(member.description().unwrap_or_default());
    member_type.contains("bottomplate") && description.contains("sillseal")
}
