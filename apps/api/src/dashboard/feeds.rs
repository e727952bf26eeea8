//! Read-only dashboard feeds. The figures are fixed sample data until the
//! application tracker is backed by real records.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub name: &'static str,
    pub count: u32,
    /// Rounded share of all applications, in percent.
    pub share_percent: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub month: &'static str,
    pub applications: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: u32,
    pub action: &'static str,
    pub date: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total: u32,
    pub statuses: Vec<StatusCount>,
    pub trend: Vec<TrendPoint>,
    pub recent_activity: Vec<Activity>,
}

const STATUS_COUNTS: &[(&str, u32)] = &[
    ("Applied", 24),
    ("Interview", 8),
    ("Offer", 3),
    ("Rejected", 5),
];

const MONTHLY_APPLICATIONS: &[(&str, u32)] = &[
    ("Jan", 5),
    ("Feb", 8),
    ("Mar", 12),
    ("Apr", 15),
    ("May", 18),
    ("Jun", 24),
];

pub fn statistics() -> Statistics {
    let total: u32 = STATUS_COUNTS.iter().map(|(_, c)| c).sum();
    let statuses = STATUS_COUNTS
        .iter()
        .map(|&(name, count)| StatusCount {
            name,
            count,
            share_percent: percent(count, total),
        })
        .collect();
    let trend = MONTHLY_APPLICATIONS
        .iter()
        .map(|&(month, applications)| TrendPoint {
            month,
            applications,
        })
        .collect();

    Statistics {
        total,
        statuses,
        trend,
        recent_activity: vec![
            Activity { id: 1, action: "Application sent to Google", date: "2 hours ago", kind: "application" },
            Activity { id: 2, action: "Interview scheduled with Microsoft", date: "1 day ago", kind: "interview" },
            Activity { id: 3, action: "Application viewed by Amazon", date: "2 days ago", kind: "application" },
            Activity { id: 4, action: "Application sent to Netflix", date: "3 days ago", kind: "application" },
        ],
    }
}

fn percent(part: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: u32,
    pub title: &'static str,
    pub message: &'static str,
    pub time: &'static str,
    pub read: bool,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFeed {
    pub unread_count: usize,
    pub notifications: Vec<Notification>,
}

pub fn notifications() -> NotificationFeed {
    let notifications = vec![
        Notification {
            id: 1,
            title: "New job match",
            message: "Your profile matches a new job at TechCorp",
            time: "2 minutes ago",
            read: false,
            kind: "job_match",
        },
        Notification {
            id: 2,
            title: "Application viewed",
            message: "Your application for Senior Developer at InnovateX has been viewed",
            time: "1 hour ago",
            read: false,
            kind: "application",
        },
        Notification {
            id: 3,
            title: "Interview scheduled",
            message: "Interview scheduled with Google for Software Engineer position",
            time: "2 days ago",
            read: true,
            kind: "interview",
        },
        Notification {
            id: 4,
            title: "Profile update",
            message: "Your profile is 80% complete. Add more details to increase your visibility",
            time: "3 days ago",
            read: true,
            kind: "reminder",
        },
        Notification {
            id: 5,
            title: "New feature",
            message: "Check out our new interview preparation tools",
            time: "1 week ago",
            read: true,
            kind: "announcement",
        },
    ];
    NotificationFeed {
        unread_count: notifications.iter().filter(|n| !n.read).count(),
        notifications,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PrepCategory {
    pub name: &'static str,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpcomingInterview {
    pub id: u32,
    pub company: &'static str,
    pub role: &'static str,
    pub date: &'static str,
    pub time: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewPrep {
    pub categories: Vec<PrepCategory>,
    pub upcoming_interviews: Vec<UpcomingInterview>,
}

pub fn interview_prep() -> InterviewPrep {
    InterviewPrep {
        categories: vec![
            PrepCategory { name: "Technical Questions", count: 24 },
            PrepCategory { name: "Behavioral Questions", count: 18 },
            PrepCategory { name: "System Design", count: 12 },
            PrepCategory { name: "Coding Challenges", count: 30 },
        ],
        upcoming_interviews: vec![
            UpcomingInterview {
                id: 1,
                company: "TechCorp",
                role: "Senior Developer",
                date: "2023-06-15",
                time: "14:30",
                kind: "Technical",
            },
            UpcomingInterview {
                id: 2,
                company: "InnovateX",
                role: "Frontend Engineer",
                date: "2023-06-18",
                time: "10:00",
                kind: "Technical",
            },
        ],
    }
}
