// File: gzsurvey-core/src/services/survey_session.rs

use std::sync::Arc;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;
use gzsurvey_common::models::{
    AdminIdentity, Answers, Completion, Redemption, RewardDetails, StartOutcome, SurveyResponse,
    TicketStatus,
};
use gzsurvey_common::traits::SurveyResponseRepository;

use crate::crypto::constant_time_eq;
use crate::services::answers::sanitize_answers;
use crate::services::receipt::validate_receipt;
use crate::services::reward_code::{generate_reward_code, is_well_formed};
use crate::Error;

/// Compared against when there is no stored code, so a miss costs the same
/// as a wrong guess.
const DUMMY_REWARD_CODE: &str = "GZ000000000000";

const UNKNOWN_SCOPE: &str = "Unknown";

/// Receipt -> survey -> reward code lifecycle.
///
/// The one-reward-per-receipt rule is enforced by the repository's unique
/// constraints. The lookups done here only pick the friendlier answer when
/// there is no race.
pub struct SurveySessionManager {
    repo: Arc<dyn SurveyResponseRepository>,
}

impl SurveySessionManager {
    pub fn new(repo: Arc<dyn SurveyResponseRepository>) -> Self {
        Self { repo }
    }

    /// Opens a survey for `receipt`, or hands back the one already open.
    ///
    /// The branch printed in the receipt prefix wins over any `brand` or
    /// `branch` the client sends.
    pub async fn start(
        &self,
        receipt: &str,
        brand: Option<&str>,
        branch: Option<&str>,
    ) -> Result<StartOutcome, Error> {
        let valid = validate_receipt(receipt)?;
        if brand.is_some_and(|b| b != valid.brand()) || branch.is_some_and(|b| b != valid.branch()) {
            debug!(
                "Client scope {:?}/{:?} ignored for receipt {}; prefix says {}/{}",
                brand, branch, valid.receipt, valid.brand(), valid.branch()
            );
        }

        if let Some(done) = self.repo.find_completed_by_receipt(&valid.receipt).await? {
            info!("Receipt {} already rewarded (response {})", valid.receipt, done.id);
            return Err(Error::AlreadyRewarded { response_id: Some(done.id) });
        }
        if let Some(open) = self.repo.find_open_by_receipt(&valid.receipt).await? {
            return Ok(StartOutcome::Resumed(open.id));
        }

        let record = SurveyResponse::new_open(
            &valid.receipt,
            Some(valid.brand().to_string()),
            Some(valid.branch().to_string()),
        );
        match self.repo.create_response(&record).await {
            Ok(()) => {
                info!("Survey {} opened for receipt {}", record.id, valid.receipt);
                Ok(StartOutcome::Created(record.id))
            }
            Err(Error::UniqueViolation(constraint)) => {
                warn!(
                    "Concurrent start for receipt {} ({}); re-reading",
                    valid.receipt, constraint
                );
                if let Some(open) = self.repo.find_open_by_receipt(&valid.receipt).await? {
                    return Ok(StartOutcome::Resumed(open.id));
                }
                if let Some(done) = self.repo.find_completed_by_receipt(&valid.receipt).await? {
                    return Err(Error::AlreadyRewarded { response_id: Some(done.id) });
                }
                Err(Error::Internal(format!(
                    "insert for receipt {} conflicted but no row was found",
                    valid.receipt
                )))
            }
            Err(e) => Err(e),
        }
    }

    /// Stores the answers and issues the reward code.
    ///
    /// A session that is already complete returns its existing code and
    /// nothing else happens.
    pub async fn submit(&self, response_id: &str, payload: &Value) -> Result<String, Error> {
        let record = self.load_session(response_id).await?;
        if let Some(code) = completed_code(&record) {
            debug!("Submit replayed for completed survey {}", record.id);
            return Ok(code);
        }

        if let Some(sent) = payload.get("receipt").and_then(Value::as_str) {
            if !sent.trim().eq_ignore_ascii_case(&record.receipt) {
                warn!("Submit for survey {} carried a different receipt; using the stored one", record.id);
            }
        }

        let answers = sanitize_answers(payload);
        self.finalise(record, Some(answers)).await
    }

    /// Issues the reward code for an open session without touching its answers.
    pub async fn generate_reward(&self, response_id: &str) -> Result<String, Error> {
        let record = self.load_session(response_id).await?;
        if let Some(code) = completed_code(&record) {
            return Ok(code);
        }
        self.finalise(record, None).await
    }

    /// Looks up a reward by session id and code.
    ///
    /// Every failure is the same `InvalidRewardCode`, and the comparison
    /// runs in constant time against a dummy when there is nothing stored.
    pub async fn fetch_reward_details(
        &self,
        response_id: &str,
        reward_code: &str,
    ) -> Result<RewardDetails, Error> {
        let supplied = reward_code.trim().to_ascii_uppercase();
        // A malformed id still costs one lookup; nil never matches a row.
        let id = Uuid::parse_str(response_id.trim()).unwrap_or(Uuid::nil());
        let record = self.repo.get_response(id).await?;

        let (stored, receipt) = match record {
            Some(r) if r.is_completed() => (r.reward_code.unwrap_or_default(), Some(r.receipt)),
            _ => (DUMMY_REWARD_CODE.to_string(), None),
        };

        let shape_ok = is_well_formed(&supplied);
        let code_ok = constant_time_eq(supplied.as_bytes(), stored.as_bytes());

        match receipt {
            Some(receipt) if shape_ok & code_ok => Ok(RewardDetails { reward_code: stored, receipt }),
            _ => Err(Error::InvalidRewardCode),
        }
    }

    /// Records that staff handed out the reward. One-way.
    pub async fn mark_redeemed(
        &self,
        response_id: &str,
        staff: &AdminIdentity,
    ) -> Result<Redemption, Error> {
        let id = parse_record_id(response_id)?;
        let redemption = Redemption {
            claimed_at: Utc::now(),
            claimed_by: staff.email.clone().unwrap_or_else(|| "admin".to_string()),
            claimed_branch: or_unknown(&staff.claims.branch),
            claimed_brand: or_unknown(&staff.claims.brand),
        };

        if self.repo.mark_redeemed(id, &redemption).await? {
            info!("Reward for survey {} redeemed by admin {}", id, staff.claims.admin_id);
            return Ok(redemption);
        }

        match self.repo.get_response(id).await? {
            None => Err(Error::InvalidInput("Survey response not found".into())),
            Some(r) if r.reward_claimed => Err(Error::AlreadyRedeemed),
            Some(_) => Err(Error::InvalidInput("Survey has no reward to redeem yet".into())),
        }
    }

    pub async fn update_status(&self, response_id: &str, status: &str) -> Result<TicketStatus, Error> {
        let id = parse_record_id(response_id)?;
        let status = status
            .parse::<TicketStatus>()
            .map_err(Error::InvalidInput)?;

        if !self.repo.update_ticket_status(id, status).await? {
            return Err(Error::InvalidInput("Survey response not found".into()));
        }
        Ok(status)
    }

    async fn load_session(&self, response_id: &str) -> Result<SurveyResponse, Error> {
        let id = Uuid::parse_str(response_id.trim()).map_err(|_| Error::UnknownSession)?;
        self.repo.get_response(id).await?.ok_or(Error::UnknownSession)
    }

    async fn finalise(&self, record: SurveyResponse, answers: Option<Answers>) -> Result<String, Error> {
        if let Some(done) = self.repo.find_completed_by_receipt(&record.receipt).await? {
            if done.id != record.id {
                info!(
                    "Survey {} lost to completed survey {} on receipt {}",
                    record.id, done.id, record.receipt
                );
                return Err(Error::AlreadyRewarded { response_id: Some(done.id) });
            }
        }

        let scope = validate_receipt(&record.receipt).ok();
        let completion = Completion {
            answers,
            reward_code: generate_reward_code()?,
            completed_at: Utc::now(),
            brand: scope.as_ref().map(|s| s.brand().to_string()),
            branch: scope.as_ref().map(|s| s.branch().to_string()),
        };

        match self.repo.complete_response(record.id, &completion).await {
            Ok(true) => {
                info!("Survey {} completed, reward issued", record.id);
                Ok(completion.reward_code)
            }
            Ok(false) => {
                // Someone else finished this same session first.
                match self.repo.get_response(record.id).await? {
                    Some(r) => completed_code(&r).ok_or_else(|| {
                        Error::Internal(format!("survey {} neither open nor completed", record.id))
                    }),
                    None => Err(Error::UnknownSession),
                }
            }
            Err(Error::UniqueViolation(constraint)) => {
                warn!(
                    "Concurrent completion on receipt {} ({}); survey {} refused",
                    record.receipt, constraint, record.id
                );
                let winner = self.repo.find_completed_by_receipt(&record.receipt).await?;
                Err(Error::AlreadyRewarded { response_id: winner.map(|r| r.id) })
            }
            Err(e) => Err(e),
        }
    }
}

fn completed_code(record: &SurveyResponse) -> Option<String> {
    if record.is_completed() {
        record.reward_code.clone()
    } else {
        None
    }
}

fn parse_record_id(raw: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::InvalidInput("Invalid survey response id".into()))
}

fn or_unknown(value: &str) -> String {
    if value.trim().is_empty() {
        UNKNOWN_SCOPE.to_string()
    } else {
        value.to_string()
    }
}
