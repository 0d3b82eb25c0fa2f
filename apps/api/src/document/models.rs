use serde::{Deserialize, Serialize};

use crate::document::dates::{range_label, TimePoint};

/// Placeholder values used when the input carries nothing usable.
pub struct Defaults;

impl Defaults {
    pub const FULL_NAME: &'static str = "Your Name";
    pub const EMAIL: &'static str = "your.email@example.com";
    const GENERIC_BULLET: &'static str = "Contributed to team goals and day-to-day delivery.";

    /// Bullet synthesized for a job that has neither achievements nor a description.
    pub fn job_bullet(title: &str, company: &str) -> String {
        match (title.trim(), company.trim()) {
            ("", "") => Self::GENERIC_BULLET.to_string(),
            (title, "") => format!("Worked as {title}, contributing to team goals and delivery."),
            ("", company) => format!("Contributed to team goals and delivery at {company}."),
            (title, company) => {
                format!("Worked as {title} at {company}, contributing to team goals and delivery.")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub github: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Never empty; falls back to `Defaults::FULL_NAME`.
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub links: Links,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            full_name: Defaults::FULL_NAME.to_string(),
            email: Defaults::EMAIL.to_string(),
            phone: String::new(),
            location: String::new(),
            links: Links::default(),
        }
    }
}

impl Identity {
    /// Single contact line shown under the name: non-empty parts joined by ` | `.
    pub fn contact_line(&self) -> String {
        [
            Some(self.email.as_str()),
            Some(self.phone.as_str()),
            Some(self.location.as_str()),
            self.links.linkedin.as_deref(),
            self.links.website.as_deref(),
            self.links.github.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEntry {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub start_date: Option<TimePoint>,
    pub end_date: Option<TimePoint>,
    pub description: String,
    pub achievements: Vec<String>,
    /// Deduplicated, first spelling wins.
    pub technologies: Vec<String>,
}

impl JobEntry {
    pub fn date_range(&self) -> String {
        range_label(self.start_date.as_ref(), self.end_date.as_ref())
    }

    /// `Company · Location · Jan 2020 – Present`, skipping empty parts.
    pub fn meta_line(&self) -> String {
        let dates = self.date_range();
        [
            self.company.as_str(),
            self.location.as_deref().unwrap_or(""),
            dates.as_str(),
        ]
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" · ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EduEntry {
    pub degree: String,
    pub field: String,
    pub institution: String,
    pub graduation: Option<TimePoint>,
    /// At most four short entries.
    pub coursework: Vec<String>,
}

impl EduEntry {
    /// `Degree in Field`, or whichever half is present.
    pub fn headline(&self) -> String {
        match (self.degree.trim(), self.field.trim()) {
            ("", "") => String::new(),
            (degree, "") => degree.to_string(),
            ("", field) => field.to_string(),
            (degree, field) => format!("{degree} in {field}"),
        }
    }

    pub fn meta_line(&self) -> String {
        let year = self.graduation.as_ref().map(TimePoint::label);
        [self.institution.trim(), year.as_deref().unwrap_or("")]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" · ")
    }
}

/// Canonical resume content. Rebuilt from the raw record on every render and
/// never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub identity: Identity,
    pub summary: String,
    /// Caller order, never re-sorted.
    pub experience: Vec<JobEntry>,
    pub education: Vec<EduEntry>,
    pub skills: Vec<String>,
}
