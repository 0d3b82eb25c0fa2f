//! Content Normalizer: turns any persisted resume shape into a `ResumeDocument`.
//!
//! Total: malformed or missing fields degrade to defaults, nothing here fails.
//! Accepted variations:
//! - camelCase and snake_case aliases for every field
//! - contact data flat on the record or nested under `contact` / `personalInfo`
//! - JSON-encoded strings wherever an object or list is expected
//! - categorized skill buckets or a flat skill list

use std::borrow::Cow;
use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::document::dates::TimePoint;
use crate::document::models::{Defaults, EduEntry, Identity, JobEntry, Links, ResumeDocument};

/// Fixed bucket order so the flattened skill list is reproducible.
const SKILL_BUCKETS: [&str; 6] = ["technical", "frameworks", "tools", "cloud", "databases", "soft"];

const MAX_COURSEWORK: usize = 4;
/// Longer "courses" are almost always a pasted paragraph.
const MAX_COURSE_CHARS: usize = 100;
/// Nesting limit for summaries wrapped in JSON strings or objects.
const MAX_SUMMARY_DEPTH: u8 = 3;

const CONTACT_KEYS: &[&str] = &[
    "contact",
    "contactInfo",
    "contact_info",
    "personalInfo",
    "personal_info",
    "personal",
];

// ────────────────────────────────────────────────────────────────────────────
// Entry points
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub fn normalize(raw: &Value) -> ResumeDocument {
    normalize_with_title(raw, None)
}

/// Total mapping from a raw record to a `ResumeDocument`. `title` is the
/// caller-supplied name fallback, tried ahead of any title on the record.
pub fn normalize_with_title(raw: &Value, title: Option<&str>) -> ResumeDocument {
    let decoded = decode_embedded(raw);
    let empty = Value::Null;
    let root: &Value = match decoded.as_ref() {
        record @ Value::Object(_) => record,
        Value::Null => &empty,
        other => {
            debug!(kind = value_kind(other), "resume record is not an object; using defaults");
            &empty
        }
    };

    ResumeDocument {
        identity: normalize_identity(root, title),
        summary: field(root, &["summary", "professionalSummary", "professional_summary", "about"])
            .map(|v| normalize_summary(v, 0))
            .unwrap_or_default(),
        experience: list_field(root, &["experience", "experiences", "workExperience", "work_experience", "jobs"])
            .iter()
            .filter(|v| v.is_object())
            .map(normalize_job)
            .collect(),
        education: list_field(root, &["education", "educations"])
            .iter()
            .filter(|v| v.is_object())
            .map(normalize_education)
            .collect(),
        skills: field(root, &["skills", "skillSet", "skill_set"])
            .map(normalize_skills)
            .unwrap_or_default(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

fn normalize_identity(root: &Value, title: Option<&str>) -> Identity {
    let nested = field(root, CONTACT_KEYS).map(decode_embedded);
    let contact: &Value = match nested.as_deref() {
        Some(v @ Value::Object(_)) => v,
        _ => root,
    };
    let lookup = |keys: &[&str]| text_field(contact, keys).or_else(|| text_field(root, keys));

    let combined = lookup(&["name", "fullName", "full_name"]);
    let first_last = {
        let first = lookup(&["firstName", "first_name"]).unwrap_or_default();
        let last = lookup(&["lastName", "last_name"]).unwrap_or_default();
        let joined = format!("{first} {last}");
        let joined = joined.trim();
        (!joined.is_empty()).then(|| joined.to_string())
    };
    let fallback_title = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| text_field(root, &["resumeTitle", "resume_title", "title"]));

    Identity {
        full_name: combined
            .or(first_last)
            .or(fallback_title)
            .unwrap_or_else(|| Defaults::FULL_NAME.to_string()),
        email: lookup(&["email", "emailAddress", "email_address"])
            .unwrap_or_else(|| Defaults::EMAIL.to_string()),
        phone: lookup(&["phone", "phoneNumber", "phone_number", "mobile"]).unwrap_or_default(),
        location: lookup(&["location", "address", "city"]).unwrap_or_default(),
        links: Links {
            linkedin: lookup(&["linkedin", "linkedIn", "linkedinUrl", "linkedin_url"]),
            website: lookup(&["website", "portfolio", "personalWebsite", "personal_website", "url"]),
            github: lookup(&["github", "gitHub", "githubUrl", "github_url"]),
        },
    }
}

fn normalize_summary(value: &Value, depth: u8) -> String {
    if depth > MAX_SUMMARY_DEPTH {
        return String::new();
    }
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if !looks_like_json(trimmed) {
                return trimmed.to_string();
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(inner) => normalize_summary(&inner, depth + 1),
                Err(err) => {
                    debug!(error = %err, "summary looked like JSON but did not parse; keeping literal");
                    trimmed.to_string()
                }
            }
        }
        Value::Object(_) => field(value, &["summary", "optimized", "text"])
            .map(|inner| normalize_summary(inner, depth + 1))
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn normalize_job(value: &Value) -> JobEntry {
    let current = field(value, &["current", "isCurrent", "is_current", "currentlyWorking"])
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let end_date = field(value, &["endDate", "end_date", "end", "to"])
        .and_then(TimePoint::from_value)
        .or_else(|| current.then_some(TimePoint::Present));

    JobEntry {
        title: text_field(value, &["title", "position", "role", "jobTitle", "job_title"])
            .unwrap_or_default(),
        company: text_field(value, &["company", "employer", "organization", "companyName", "company_name"])
            .unwrap_or_default(),
        location: text_field(value, &["location", "city"]),
        start_date: field(value, &["startDate", "start_date", "start", "from"])
            .and_then(TimePoint::from_value),
        end_date,
        description: text_field(value, &["description", "details", "summary"]).unwrap_or_default(),
        achievements: field(
            value,
            &["achievements", "bullets", "highlights", "accomplishments", "responsibilities"],
        )
        .map(|v| string_list(v, ListStyle::Lines))
        .unwrap_or_default(),
        technologies: dedup(
            field(value, &["technologies", "techStack", "tech_stack", "skills", "tools"])
                .map(|v| string_list(v, ListStyle::Commas))
                .unwrap_or_default(),
        ),
    }
}

fn normalize_education(value: &Value) -> EduEntry {
    let coursework = field(
        value,
        &["coursework", "courses", "relevantCoursework", "relevant_coursework"],
    )
    .map(|v| string_list(v, ListStyle::Lines))
    .unwrap_or_default()
    .into_iter()
    .filter(|course| course.chars().count() < MAX_COURSE_CHARS)
    .take(MAX_COURSEWORK)
    .collect();

    EduEntry {
        degree: text_field(value, &["degree", "qualification"]).unwrap_or_default(),
        field: text_field(value, &["field", "fieldOfStudy", "field_of_study", "major"])
            .unwrap_or_default(),
        institution: text_field(value, &["institution", "school", "university", "college"])
            .unwrap_or_default(),
        graduation: field(
            value,
            &[
                "graduationYear",
                "graduation_year",
                "graduationDate",
                "graduation_date",
                "year",
                "endDate",
                "end_date",
            ],
        )
        .and_then(TimePoint::from_value),
        coursework,
    }
}

fn normalize_skills(value: &Value) -> Vec<String> {
    let value = decode_embedded(value);
    match value.as_ref() {
        Value::Object(_) => {
            let mut flat = Vec::new();
            for bucket in SKILL_BUCKETS {
                let camel = format!("{bucket}Skills");
                let snake = format!("{bucket}_skills");
                if let Some(items) = field(&value, &[bucket, camel.as_str(), snake.as_str()]) {
                    flat.extend(string_list(items, ListStyle::Commas));
                }
            }
            dedup(flat)
        }
        other => dedup(string_list(other, ListStyle::Commas)),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Value helpers
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListStyle {
    /// Split on line breaks and bullet glyphs (prose items may contain commas).
    Lines,
    /// Additionally split on commas (tags and skills).
    Commas,
}

fn looks_like_json(s: &str) -> bool {
    s.starts_with('{') || s.starts_with('[') || s.starts_with('"')
}

/// Parses strings that carry JSON; every other value is borrowed as-is.
fn decode_embedded(value: &Value) -> Cow<'_, Value> {
    if let Value::String(s) = value {
        let trimmed = s.trim();
        if looks_like_json(trimmed) {
            match serde_json::from_str::<Value>(trimmed) {
                Ok(parsed) => return Cow::Owned(parsed),
                Err(err) => debug!(error = %err, "embedded JSON did not parse; keeping literal"),
            }
        }
    }
    Cow::Borrowed(value)
}

/// First present, non-null value among `keys`.
fn field<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|v| !v.is_null())
}

/// First non-blank scalar among `keys`, as a trimmed string.
fn text_field(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(scalar_text)
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Array under the first matching key, decoding a JSON-string array if needed.
fn list_field(obj: &Value, keys: &[&str]) -> Vec<Value> {
    match field(obj, keys).map(decode_embedded).as_deref() {
        Some(Value::Array(items)) => items.iter().map(|item| decode_embedded(item).into_owned()).collect(),
        Some(other) => {
            debug!(kind = value_kind(other), "expected a list; ignoring field");
            Vec::new()
        }
        None => Vec::new(),
    }
}

/// Flattens strings, arrays of strings, and arrays of `{name|text}` objects.
///
/// A single raw string is split into items. Array elements are already items:
/// in `Lines` style they are kept whole, in `Commas` style they may still hold
/// a comma-separated tag list.
fn string_list(value: &Value, style: ListStyle) -> Vec<String> {
    let decoded = decode_embedded(value);
    match decoded.as_ref() {
        Value::String(s) => split_items(s, style),
        Value::Array(items) => items
            .iter()
            .flat_map(|item| match item {
                Value::String(s) => list_element(s, style),
                Value::Object(_) => text_field(item, &["name", "text", "title", "value"])
                    .map(|s| list_element(&s, style))
                    .unwrap_or_default(),
                other => scalar_text(other).into_iter().collect(),
            })
            .collect(),
        object @ Value::Object(_) => text_field(object, &["name", "text"])
            .map(|s| split_items(&s, style))
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn list_element(s: &str, style: ListStyle) -> Vec<String> {
    match style {
        ListStyle::Lines => {
            let item = strip_bullet(s);
            if item.is_empty() {
                Vec::new()
            } else {
                vec![item.to_string()]
            }
        }
        ListStyle::Commas => split_items(s, style),
    }
}

fn split_items(s: &str, style: ListStyle) -> Vec<String> {
    s.split(|c: char| {
        matches!(c, '\n' | '\r' | '•' | '·' | '▪' | '●' | ';') || (style == ListStyle::Commas && c == ',')
    })
    .map(strip_bullet)
    .filter(|item| !item.is_empty())
    .map(str::to_string)
    .collect()
}

/// Trims whitespace and one leading list marker. A marker only counts when
/// followed by whitespace, so "-30% churn" keeps its sign.
fn strip_bullet(item: &str) -> &str {
    let item = item.trim();
    let mut chars = item.chars();
    match (chars.next(), chars.next()) {
        (Some('-' | '*' | '–' | '•' | '·' | '▪' | '●'), Some(next)) if next.is_whitespace() => {
            chars.as_str().trim()
        }
        _ => item,
    }
}

/// Case-insensitive dedup keeping the first spelling and order.
fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
