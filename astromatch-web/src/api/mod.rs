//! HTTP API handlers for astromatch-web

use crate::error::ApiResult;
use crate::AppState;

pub mod checkout;
pub mod health;
pub mod places;
pub mod proxy;
pub mod session;

pub use checkout::{create_checkout, verify_access};
pub use health::health_routes;
pub use places::search_places;
pub use proxy::{astromatch, log_event, match_multiple, pdf, save_email};
pub use session::{
    compute, current_report, current_report_pdf, get_history_entry, get_language, history,
    insights, toggle_language, view_history_entry,
};

/// Primary calls (compute, PDF, checkout) report transport failures in the
/// session language
pub(crate) async fn localize<T>(state: &AppState, result: ApiResult<T>) -> ApiResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => Err(err.localized(state.session.language().await)),
    }
}
