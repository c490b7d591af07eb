//! Compatibility submission flow
//!
//! validate → compute upstream → auxiliary sinks (spawned) → history and
//! session slots (best-effort) → preview. Also the post-payment side:
//! unlocking premium access and rebuilding the PDF request from the
//! session slots.

use astromatch_common::filename::pdf_filename;
use astromatch_common::models::{FormSnapshot, HistoryEntry, LogEvent, PdfRequest, SavedReport};
use astromatch_common::report::{
    derive_insights, derive_intensities, overall_score, Insights, IntensityMap,
};
use astromatch_common::storage::{HistoryStore, SessionCache};
use astromatch_common::Locale;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::upstream::UpstreamClient;

/// Teaser data derived from a report for display
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub lang: Locale,
    pub overall_score: f64,
    pub insights: Insights,
    pub intensities: IntensityMap,
    pub share_text: String,
}

impl Preview {
    pub fn build(report: &Value, firstname1: &str, firstname2: &str, locale: Locale) -> Self {
        let score = overall_score(report);
        Self {
            lang: locale,
            overall_score: score,
            insights: derive_insights(report, locale),
            intensities: derive_intensities(report, locale),
            share_text: locale.share_text(firstname1, firstname2, score),
        }
    }
}

/// Result of a successful submission: the raw report and its preview
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub report: Value,
    pub preview: Preview,
}

/// Report slot contents as shown on the report page
#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    pub report: Value,
    pub firstname1: String,
    pub firstname2: String,
    pub premium: bool,
    pub preview: Preview,
}

/// Rendered PDF with its download name
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Clears the busy flag when the submission ends, however it ends
struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct CompatibilityFlow {
    upstream: UpstreamClient,
    history: HistoryStore,
    session: SessionCache,
    busy: Arc<AtomicBool>,
}

impl CompatibilityFlow {
    pub fn new(upstream: UpstreamClient, history: HistoryStore, session: SessionCache) -> Self {
        Self {
            upstream,
            history,
            session,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run one form submission
    ///
    /// Rejected with 400 before any network call when the form is invalid,
    /// and with 409 while another submission is in flight.
    pub async fn submit(&self, form: FormSnapshot) -> ApiResult<Submission> {
        form.validate()?;

        let _guard = BusyGuard::acquire(&self.busy)
            .ok_or_else(|| ApiError::Conflict("A computation is already in progress".to_string()))?;

        info!(
            person1 = %form.person1.firstname,
            person2 = %form.person2.firstname,
            "Computing compatibility"
        );
        let report = self.upstream.compatibility(&form).await?;

        self.spawn_auxiliary_calls(&form);
        self.persist(&form, &report).await;

        let locale = self.session.language().await;
        let preview = Preview::build(
            &report,
            &form.person1.firstname,
            &form.person2.firstname,
            locale,
        );
        debug!(score = preview.overall_score, "Compatibility computed");

        Ok(Submission { report, preview })
    }

    /// Email capture and analytics event; failures are only logged
    fn spawn_auxiliary_calls(&self, form: &FormSnapshot) {
        let upstream = self.upstream.clone();
        let event = LogEvent {
            person1_firstname: form.person1.firstname.clone(),
            person2_firstname: form.person2.firstname.clone(),
            email: form.email.clone(),
        };

        tokio::spawn(async move {
            if let Err(e) = upstream.save_email(&json!({ "email": event.email })).await {
                warn!("Failed to save email: {}", e);
            }
            if let Err(e) = upstream.log_event(&event).await {
                warn!("Failed to log event: {}", e);
            }
        });
    }

    /// History entry, report slot and form slot; each failure is only logged
    async fn persist(&self, form: &FormSnapshot, report: &Value) {
        let firstname1 = &form.person1.firstname;
        let firstname2 = &form.person2.firstname;

        let entry = HistoryEntry::new(report.clone(), firstname1, firstname2);
        if let Err(e) = self.history.append(entry).await {
            warn!("Failed to append history entry: {}", e);
        }
        if let Err(e) = self.session.save_report(report, firstname1, firstname2).await {
            warn!("Failed to save report slot: {}", e);
        }
        if let Err(e) = self.session.save_form(form).await {
            warn!("Failed to save form slot: {}", e);
        }
    }

    async fn view(&self, saved: SavedReport) -> ReportView {
        let locale = self.session.language().await;
        let premium = self.session.premium_session().await.is_some();
        let preview = Preview::build(&saved.report, &saved.firstname1, &saved.firstname2, locale);
        ReportView {
            report: saved.report,
            firstname1: saved.firstname1,
            firstname2: saved.firstname2,
            premium,
            preview,
        }
    }

    /// Report slot with its derived preview
    pub async fn current_report(&self) -> ApiResult<ReportView> {
        let saved = self
            .session
            .load_report()
            .await
            .ok_or_else(|| ApiError::NotFound("No report available".to_string()))?;
        Ok(self.view(saved).await)
    }

    /// Load a history entry into the report slot
    pub async fn view_history(&self, index: usize) -> ApiResult<ReportView> {
        let entry = self
            .history
            .get_at(index)
            .await
            .ok_or_else(|| ApiError::NotFound(format!("No history entry at index {}", index)))?;

        self.session
            .save_report(&entry.report, &entry.person1_firstname, &entry.person2_firstname)
            .await?;
        info!(index, "History entry loaded into report slot");

        Ok(self
            .view(SavedReport {
                report: entry.report,
                firstname1: entry.person1_firstname,
                firstname2: entry.person2_firstname,
            })
            .await)
    }

    /// Record a completed checkout session
    ///
    /// The upstream verification is informational; its failure does not
    /// block the unlock.
    pub async fn unlock(&self, session_id: &str) -> ApiResult<()> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(ApiError::BadRequest("session_id is required".to_string()));
        }

        if let Err(e) = self.upstream.verify_access(session_id).await {
            warn!(session_id, "Access verification failed: {}", e);
        }
        self.session.mark_premium(session_id).await?;
        info!(session_id, "Premium content unlocked");
        Ok(())
    }

    /// Render the PDF of the report slot
    pub async fn report_pdf(&self) -> ApiResult<PdfDocument> {
        let saved = self
            .session
            .load_report()
            .await
            .ok_or_else(|| ApiError::NotFound("No report available".to_string()))?;
        let form = self.session.load_form().await;

        let request = PdfRequest::rebuild(&saved, form.as_ref());
        let bytes = self.upstream.pdf(&request).await?;
        info!(size = bytes.len(), "PDF generated");

        Ok(PdfDocument {
            filename: pdf_filename(&saved.firstname1, &saved.firstname2),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_guard_is_exclusive_and_released() {
        let flag = Arc::new(AtomicBool::new(false));
        let guard = BusyGuard::acquire(&flag);
        assert!(guard.is_some());
        assert!(BusyGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(BusyGuard::acquire(&flag).is_some());
    }

    #[test]
    fn test_preview_from_sparse_report() {
        let preview = Preview::build(&json!({"overall_score": 82}), "Ana", "Léo", Locale::En);
        assert_eq!(preview.overall_score, 82.0);
        assert_eq!(
            preview.insights.potential.as_deref(),
            Some("Your relationship has strong potential for lasting growth and closeness.")
        );
        assert!(preview.share_text.starts_with("Compatibility between Ana & Léo : 82%"));
        assert_eq!(preview.intensities.len(), 2);
    }
}
