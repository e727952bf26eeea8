//! Application board: drafts being prepared and applications already sent.
//! Held in memory and seeded with sample entries at startup.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Draft,
    Submitted,
    Interview,
    Rejected,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub job_title: String,
    pub company: String,
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_edited: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_on: Option<String>,
    pub job_url: String,
    pub cover_letter: String,
    pub resume_id: String,
    pub contact_info: ContactInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumeOption {
    pub id: &'static str,
    pub name: &'static str,
    pub url: &'static str,
}

pub const RESUME_OPTIONS: &[ResumeOption] = &[
    ResumeOption { id: "r1", name: "Full Stack Dev Resume v2.pdf", url: "#" },
    ResumeOption { id: "r2", name: "Frontend Focused Resume.pdf", url: "#" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardTab {
    #[default]
    Drafts,
    Submitted,
}

/// Editable draft fields; absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftUpdate {
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub job_url: Option<String>,
    pub cover_letter: Option<String>,
    pub resume_id: Option<String>,
    pub contact_info: Option<ContactInfo>,
}

#[derive(Debug, Default)]
struct BoardState {
    drafts: Vec<Application>,
    submitted: Vec<Application>,
}

#[derive(Debug, Default)]
pub struct ApplicationBoard {
    inner: RwLock<BoardState>,
}

impl ApplicationBoard {
    pub fn seeded() -> Self {
        ApplicationBoard {
            inner: RwLock::new(BoardState {
                drafts: seed_drafts(),
                submitted: seed_submitted(),
            }),
        }
    }

    pub async fn list(&self, tab: BoardTab) -> Vec<Application> {
        let state = self.inner.read().await;
        match tab {
            BoardTab::Drafts => state.drafts.clone(),
            BoardTab::Submitted => state.submitted.clone(),
        }
    }

    /// `(drafts, submitted)`
    pub async fn counts(&self) -> (usize, usize) {
        let state = self.inner.read().await;
        (state.drafts.len(), state.submitted.len())
    }

    pub async fn save_draft(&self, id: &str, update: DraftUpdate) -> Result<Application, AppError> {
        if update.resume_id.as_deref().is_some_and(|r| !is_known_resume(r)) {
            return Err(AppError::Validation("Unknown resume selected".to_string()));
        }
        let mut state = self.inner.write().await;
        let draft = state
            .drafts
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| draft_not_found(id))?;

        if let Some(v) = update.job_title {
            draft.job_title = v;
        }
        if let Some(v) = update.company {
            draft.company = v;
        }
        if let Some(v) = update.job_url {
            draft.job_url = v;
        }
        if let Some(v) = update.cover_letter {
            draft.cover_letter = v;
        }
        if let Some(v) = update.resume_id {
            draft.resume_id = v;
        }
        if let Some(v) = update.contact_info {
            draft.contact_info = v;
        }
        draft.last_edited = Some("Just now".to_string());
        Ok(draft.clone())
    }

    /// Moves a draft to the front of the submitted list, stamped with `today`.
    pub async fn submit(&self, id: &str, today: NaiveDate) -> Result<Application, AppError> {
        let mut state = self.inner.write().await;
        let idx = state
            .drafts
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| draft_not_found(id))?;

        let mut application = state.drafts.remove(idx);
        application.status = ApplicationStatus::Submitted;
        application.applied_on = Some(format_applied_on(today));
        application.last_edited = None;
        state.submitted.insert(0, application.clone());
        Ok(application)
    }

    pub async fn delete_draft(&self, id: &str) -> Result<(), AppError> {
        let mut state = self.inner.write().await;
        let before = state.drafts.len();
        state.drafts.retain(|d| d.id != id);
        if state.drafts.len() == before {
            return Err(draft_not_found(id));
        }
        Ok(())
    }
}

fn draft_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Draft {id} not found"))
}

fn is_known_resume(id: &str) -> bool {
    RESUME_OPTIONS.iter().any(|r| r.id == id)
}

/// `Nov 24, 2025`
pub fn format_applied_on(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

fn contact(phone: &str) -> ContactInfo {
    ContactInfo {
        name: "Alex Dev".to_string(),
        email: "alex@example.com".to_string(),
        phone: phone.to_string(),
    }
}

fn seed_drafts() -> Vec<Application> {
    vec![
        Application {
            id: "d1".to_string(),
            job_title: "Senior React Developer".to_string(),
            company: "TechFlow Inc.".to_string(),
            status: ApplicationStatus::Draft,
            last_edited: Some("2 mins ago".to_string()),
            applied_on: None,
            job_url: "https://example.com/job/1".to_string(),
            cover_letter: "Dear Hiring Manager,\n\nI am writing to express my interest...".to_string(),
            resume_id: "r1".to_string(),
            contact_info: contact("+91 98765 43210"),
        },
        Application {
            id: "d2".to_string(),
            job_title: "Frontend Engineer".to_string(),
            company: "Creativv Studios".to_string(),
            status: ApplicationStatus::Draft,
            last_edited: Some("2 days ago".to_string()),
            applied_on: None,
            job_url: "https://example.com/job/2".to_string(),
            cover_letter: "To the Creativv Team,\n\nI've been following your work...".to_string(),
            resume_id: "r2".to_string(),
            contact_info: contact("+91 98765 43210"),
        },
    ]
}

fn seed_submitted() -> Vec<Application> {
    vec![
        Application {
            id: "s1".to_string(),
            job_title: "Full Stack Engineer".to_string(),
            company: "Global Systems".to_string(),
            status: ApplicationStatus::Submitted,
            last_edited: None,
            applied_on: Some("Nov 24, 2025".to_string()),
            job_url: "https://example.com/job/3".to_string(),
            cover_letter: String::new(),
            resume_id: "r1".to_string(),
            contact_info: contact(""),
        },
        Application {
            id: "s2".to_string(),
            job_title: "Backend Developer (Node.js)".to_string(),
            company: "Serverless Co.".to_string(),
            status: ApplicationStatus::Interview,
            last_edited: None,
            applied_on: Some("Nov 20, 2025".to_string()),
            job_url: "https://example.com/job/4".to_string(),
            cover_letter: String::new(),
            resume_id: "r1".to_string(),
            contact_info: contact(""),
        },
    ]
}
