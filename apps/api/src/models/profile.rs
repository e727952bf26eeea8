use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// One profile document per user. Stored whole as JSONB and sent to the
/// client in the same camelCase shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub skills: Vec<SkillCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
}

impl Profile {
    pub fn new(user_id: impl Into<String>) -> Self {
        Profile {
            user_id: user_id.into(),
            ..Default::default()
        }
    }
}

/// Profile fields holding the URL of an uploaded blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileFile {
    Resume,
    Image,
}

impl ProfileFile {
    pub fn slot(self, profile: &mut Profile) -> &mut Option<String> {
        match self {
            ProfileFile::Resume => &mut profile.resume_url,
            ProfileFile::Image => &mut profile.profile_image,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permanent: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub id: String,
    pub institute: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skill {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillCategory {
    pub id: String,
    pub name: String,
    pub skills: Vec<Skill>,
}

/// A labelled personal-info row as exchanged with the profile editor.
/// Extra keys the client sends (`required`, `type`) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfoItem {
    pub label: String,
    #[serde(default)]
    pub value: String,
}

impl PersonalInfoItem {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        PersonalInfoItem {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Sub-documents carrying a client-generated identifier.
pub trait ProfileEntry {
    fn entry_id(&self) -> &str;
    fn set_entry_id(&mut self, id: String);
}

macro_rules! impl_profile_entry {
    ($($ty:ty),*) => {
        $(impl ProfileEntry for $ty {
            fn entry_id(&self) -> &str {
                &self.id
            }
            fn set_entry_id(&mut self, id: String) {
                self.id = id;
            }
        })*
    };
}

impl_profile_entry!(Education, Experience, Skill, SkillCategory);

impl SkillCategory {
    pub fn new(id: impl Into<String>, name: &str) -> Result<Self, AppError> {
        Ok(SkillCategory {
            id: id.into(),
            name: non_empty(name, "Category name cannot be empty")?,
            skills: Vec::new(),
        })
    }

    /// Appends a skill; names are compared case-insensitively so the same
    /// skill is not listed twice in a category.
    pub fn add_skill(&mut self, id: impl Into<String>, name: &str) -> Result<&Skill, AppError> {
        let name = non_empty(name, "Skill name cannot be empty")?;
        if self
            .skills
            .iter()
            .any(|s| s.name.eq_ignore_ascii_case(&name))
        {
            return Err(AppError::Validation(format!(
                "Skill '{name}' already exists in category '{}'",
                self.name
            )));
        }
        self.skills.push(Skill {
            id: id.into(),
            name,
        });
        Ok(&self.skills[self.skills.len() - 1])
    }
}

fn non_empty(value: &str, message: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(message.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Parses a date of birth as sent by a date input (`YYYY-MM-DD`) or as a full
/// ISO timestamp, keeping only the calendar date.
pub fn parse_birth_date(raw: &str) -> Result<NaiveDate, AppError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.date_naive());
    }
    let invalid = || AppError::Validation(format!("Invalid date of birth '{raw}'"));
    // A bare date, or a date followed by a time part.
    let date_part = match raw.char_indices().nth(10) {
        None => raw,
        Some((idx, 'T' | ' ')) => &raw[..idx],
        Some(_) => return Err(invalid()),
    };
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| invalid())
}
