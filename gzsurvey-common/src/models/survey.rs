// File: gzsurvey-common/src/models/survey.rs

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One answer in a survey payload. Objects, nulls and nested lists are not
/// representable and get dropped during sanitising.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

/// question-id -> answer, already restricted to the question whitelist.
pub type Answers = BTreeMap<String, AnswerValue>;

/// Staff-facing ticket status. Any value may move to any other value.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Voc,
    Inactive,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 5] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Voc,
        TicketStatus::Inactive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Voc => "voc",
            TicketStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TicketStatus::ALL
            .iter()
            .find(|st| st.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown ticket status: {}", s))
    }
}

/// Where a receipt's survey is in its lifecycle.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SessionState {
    None,
    Open,
    Completed,
}

/// One row per survey attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub id: Uuid,
    pub receipt: String,
    pub brand: Option<String>,
    pub branch: Option<String>,
    pub answers: Answers,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub reward_code: Option<String>,
    pub reward_generated_at: Option<DateTime<Utc>>,
    pub reward_claimed: bool,
    pub reward_claimed_at: Option<DateTime<Utc>>,
    pub reward_claimed_by: Option<String>,
    pub reward_claimed_branch: Option<String>,
    pub reward_claimed_brand: Option<String>,
    pub ticket_status: TicketStatus,
}

impl SurveyResponse {
    /// A fresh OPEN record for `receipt`.
    pub fn new_open(receipt: &str, brand: Option<String>, branch: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            receipt: receipt.to_string(),
            brand,
            branch,
            answers: Answers::new(),
            created_at: Utc::now(),
            completed_at: None,
            reward_code: None,
            reward_generated_at: None,
            reward_claimed: false,
            reward_claimed_at: None,
            reward_claimed_by: None,
            reward_claimed_branch: None,
            reward_claimed_brand: None,
            ticket_status: TicketStatus::Open,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.completed_at.is_some() && self.reward_code.is_some() {
            SessionState::Completed
        } else {
            SessionState::Open
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state() == SessionState::Completed
    }
}

/// Fields written together when a session is finalised.
#[derive(Debug, Clone)]
pub struct Completion {
    /// `None` keeps whatever answers are already stored.
    pub answers: Option<Answers>,
    pub reward_code: String,
    pub completed_at: DateTime<Utc>,
    /// Filled into the row only where the stored value is null.
    pub brand: Option<String>,
    pub branch: Option<String>,
}

/// Staff redemption stamp.
#[derive(Debug, Clone)]
pub struct Redemption {
    pub claimed_at: DateTime<Utc>,
    pub claimed_by: String,
    pub claimed_branch: String,
    pub claimed_brand: String,
}

/// Result of `Start`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StartOutcome {
    Created(Uuid),
    Resumed(Uuid),
}

impl StartOutcome {
    pub fn response_id(&self) -> Uuid {
        match self {
            StartOutcome::Created(id) | StartOutcome::Resumed(id) => *id,
        }
    }
}

/// Returned by a successful reward lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RewardDetails {
    pub reward_code: String,
    pub receipt: String,
}
