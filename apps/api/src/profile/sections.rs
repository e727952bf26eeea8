//! Profile editor sections. Each section owns one slice of the profile
//! document and is written through a patch that touches only that slice.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::profile::{
    Education, Experience, PersonalInfoItem, Profile, ProfileEntry, SkillCategory,
};
use crate::profile::patch::ProfilePatch;
use crate::profile::personal_info::{self, PersonalDetails};

static LAST_ENTRY_ID: AtomicI64 = AtomicI64::new(0);

/// Millisecond-timestamp id for a new sub-document. Strictly increasing
/// within the process, so two entries created in the same millisecond still
/// get distinct ids.
pub fn new_entry_id() -> String {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_ENTRY_ID.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_ENTRY_ID.compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
        {
            Ok(_) => return next.to_string(),
            Err(actual) => last = actual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileSection {
    PersonalInfo,
    Education,
    Experience,
    Skills,
    Resume,
}

impl ProfileSection {
    pub fn slug(self) -> &'static str {
        match self {
            ProfileSection::PersonalInfo => "personal-info",
            ProfileSection::Education => "education",
            ProfileSection::Experience => "experience",
            ProfileSection::Skills => "skills",
            ProfileSection::Resume => "resume",
        }
    }

    /// Current contents of this section, in the shape the editor submits.
    pub fn view(self, profile: &Profile) -> Value {
        match self {
            ProfileSection::PersonalInfo => json!({
                "personalInfo": personal_info::to_items(profile),
                "about": profile.summary.clone().unwrap_or_default(),
            }),
            ProfileSection::Education => json!(profile.education),
            ProfileSection::Experience => json!(profile.experience),
            ProfileSection::Skills => json!(profile.skills),
            ProfileSection::Resume => json!({ "resumeUrl": profile.resume_url }),
        }
    }
}

impl fmt::Display for ProfileSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ProfileSection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal-info" => Ok(ProfileSection::PersonalInfo),
            "education" => Ok(ProfileSection::Education),
            "experience" => Ok(ProfileSection::Experience),
            "skills" => Ok(ProfileSection::Skills),
            "resume" => Ok(ProfileSection::Resume),
            other => Err(AppError::NotFound(format!("Unknown profile section '{other}'"))),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonalInfoData {
    personal_info: Vec<PersonalInfoItem>,
    #[serde(default)]
    about: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResumeData {
    resume_url: Option<String>,
}

/// One section's payload, as submitted by that section's editor.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionUpdate {
    PersonalInfo {
        items: Vec<PersonalInfoItem>,
        about: Option<String>,
    },
    Education(Vec<Education>),
    Experience(Vec<Experience>),
    Skills(Vec<SkillCategory>),
    Resume(Option<String>),
}

impl SectionUpdate {
    pub fn parse(section: ProfileSection, data: Value) -> Result<Self, AppError> {
        let invalid = |e: serde_json::Error| {
            AppError::Validation(format!("Invalid {section} section data: {e}"))
        };
        Ok(match section {
            ProfileSection::PersonalInfo => {
                let data: PersonalInfoData = serde_json::from_value(data).map_err(invalid)?;
                SectionUpdate::PersonalInfo {
                    items: data.personal_info,
                    about: data.about,
                }
            }
            ProfileSection::Education => {
                SectionUpdate::Education(serde_json::from_value(data).map_err(invalid)?)
            }
            ProfileSection::Experience => {
                SectionUpdate::Experience(serde_json::from_value(data).map_err(invalid)?)
            }
            ProfileSection::Skills => {
                SectionUpdate::Skills(serde_json::from_value(data).map_err(invalid)?)
            }
            ProfileSection::Resume => {
                let data: ResumeData = serde_json::from_value(data).map_err(invalid)?;
                SectionUpdate::Resume(data.resume_url)
            }
        })
    }

    /// Builds a patch that writes this section and nothing else.
    pub fn into_patch(self) -> Result<ProfilePatch, AppError> {
        let mut patch = ProfilePatch::default();
        match self {
            SectionUpdate::PersonalInfo { items, about } => {
                let details = PersonalDetails::from_items(&items)?;
                details.require_mandatory()?;
                patch.personal = Some(details);
                patch.summary = about.map(|a| {
                    let a = a.trim().to_string();
                    (!a.is_empty()).then_some(a)
                });
            }
            SectionUpdate::Education(list) => patch.education = Some(list),
            SectionUpdate::Experience(list) => patch.experience = Some(list),
            SectionUpdate::Skills(list) => patch.skills = Some(list),
            SectionUpdate::Resume(url) => patch.resume_url = Some(url),
        }
        patch.normalize()?;
        Ok(patch)
    }
}

/// A single list entry belonging to one of the list-shaped sections.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionEntry {
    Education(Education),
    Experience(Experience),
    SkillCategory(SkillCategory),
}

impl SectionEntry {
    pub fn parse(section: ProfileSection, data: Value) -> Result<Self, AppError> {
        let invalid = |e: serde_json::Error| {
            AppError::Validation(format!("Invalid {section} entry: {e}"))
        };
        match section {
            ProfileSection::Education => Ok(SectionEntry::Education(
                serde_json::from_value(data).map_err(invalid)?,
            )),
            ProfileSection::Experience => Ok(SectionEntry::Experience(
                serde_json::from_value(data).map_err(invalid)?,
            )),
            ProfileSection::Skills => Ok(SectionEntry::SkillCategory(
                serde_json::from_value(data).map_err(invalid)?,
            )),
            other => Err(entryless(other)),
        }
    }
}

fn entryless(section: ProfileSection) -> AppError {
    AppError::Validation(format!("Section '{section}' has no list entries"))
}

/// Entry-level change applied inside a single read-modify-write.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryChange {
    Upsert(SectionEntry),
    Remove { section: ProfileSection, id: String },
}

impl EntryChange {
    pub fn apply_to(self, profile: &mut Profile) -> Result<(), AppError> {
        match self {
            EntryChange::Upsert(SectionEntry::Education(e)) => {
                upsert_entry(&mut profile.education, e);
            }
            EntryChange::Upsert(SectionEntry::Experience(e)) => {
                upsert_entry(&mut profile.experience, e);
            }
            EntryChange::Upsert(SectionEntry::SkillCategory(mut c)) => {
                let mut patch = ProfilePatch {
                    skills: Some(vec![c]),
                    ..Default::default()
                };
                // Same name and skill checks as a whole-list save.
                patch.normalize()?;
                c = patch.skills.and_then(|mut v| v.pop()).unwrap_or_default();
                upsert_entry(&mut profile.skills, c);
            }
            EntryChange::Remove { section, id } => {
                let removed = match section {
                    ProfileSection::Education => remove_entry(&mut profile.education, &id),
                    ProfileSection::Experience => remove_entry(&mut profile.experience, &id),
                    ProfileSection::Skills => remove_entry(&mut profile.skills, &id),
                    other => return Err(entryless(other)),
                };
                if !removed {
                    return Err(AppError::NotFound(format!(
                        "No {section} entry with id '{id}'"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Replaces the entry with the same id, or appends it (assigning a fresh id
/// when it has none). Returns the stored entry.
pub fn upsert_entry<T: ProfileEntry>(list: &mut Vec<T>, mut entry: T) -> &T {
    if entry.entry_id().trim().is_empty() {
        entry.set_entry_id(new_entry_id());
    }
    match list.iter().position(|e| e.entry_id() == entry.entry_id()) {
        Some(idx) => {
            list[idx] = entry;
            &list[idx]
        }
        None => {
            list.push(entry);
            &list[list.len() - 1]
        }
    }
}

pub fn remove_entry<T: ProfileEntry>(list: &mut Vec<T>, id: &str) -> bool {
    let before = list.len();
    list.retain(|e| e.entry_id() != id);
    list.len() != before
}
