//! Remote high score leaderboard.
//!
//! Wire contract with the score service:
//! - `GET {url}?action=list` returns `{"success": true, "scores": [...]}`
//! - `POST {url}` with form body `action=submit&initials=ABC&score=123`
//!   returns `{"success": true}`
//!
//! Service failures surface as player-readable messages and never touch
//! game state. Initials are 1-3 alphanumeric characters, stored upper-case.

use serde::{Deserialize, Serialize};

/// Endpoint of the score service, relative to the page.
pub const HIGHSCORE_URL: &str = "archerHighScore.php";

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub initials: String,
    pub score: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse {
    pub success: bool,
    #[serde(default)]
    pub scores: Vec<ScoreEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
}

/// Normalize player initials for submission: trimmed, upper-cased, and
/// only accepted as 1-3 ASCII alphanumerics.
pub fn validate_initials(raw: &str) -> Option<String> {
    let up = raw.trim().to_ascii_uppercase();
    let count = up.chars().count();
    if (1..=3).contains(&count) && up.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(up)
    } else {
        None
    }
}

/// Form-encoded submission body. Initials must already be validated, so
/// no escaping is needed.
pub fn submit_body(initials: &str, score: u32) -> String {
    format!("action=submit&initials={initials}&score={score}")
}

/// Extract the score list from a service response body.
pub fn parse_list(body: &str) -> Option<Vec<ScoreEntry>> {
    let resp: ListResponse = serde_json::from_str(body).ok()?;
    if resp.success { Some(resp.scores) } else { None }
}

/// Whether a submission response reported success.
pub fn parse_submit(body: &str) -> bool {
    serde_json::from_str::<SubmitResponse>(body)
        .map(|r| r.success)
        .unwrap_or(false)
}

#[cfg(target_arch = "wasm32")]
mod remote {
    use super::*;
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, Response};

    async fn fetch_text(request: &Request) -> Result<String, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let resp: Response = JsFuture::from(window.fetch_with_request(request))
            .await?
            .dyn_into()?;
        let text = JsFuture::from(resp.text()?).await?;
        Ok(text.as_string().unwrap_or_default())
    }

    /// Fetch the current leaderboard, best first.
    pub async fn fetch_scores(url: &str) -> Result<Vec<ScoreEntry>, String> {
        let load_failed = |e: JsValue| {
            log::warn!("score list request failed: {e:?}");
            "Unable to load scores.".to_string()
        };

        let opts = RequestInit::new();
        opts.set_method("GET");
        let request =
            Request::new_with_str_and_init(&format!("{url}?action=list"), &opts).map_err(load_failed)?;
        request
            .headers()
            .set("Accept", "application/json")
            .map_err(load_failed)?;

        let body = fetch_text(&request).await.map_err(load_failed)?;
        parse_list(&body).ok_or_else(|| "No scores yet.".to_string())
    }

    /// Submit a validated score.
    pub async fn submit_score(url: &str, initials: &str, score: u32) -> Result<(), String> {
        let submit_failed = |e: JsValue| {
            log::warn!("score submit request failed: {e:?}");
            "Unable to submit score.".to_string()
        };

        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_body(&JsValue::from_str(&submit_body(initials, score)));
        let request = Request::new_with_str_and_init(url, &opts).map_err(submit_failed)?;
        request
            .headers()
            .set("Content-Type", "application/x-www-form-urlencoded")
            .map_err(submit_failed)?;
        request
            .headers()
            .set("Accept", "application/json")
            .map_err(submit_failed)?;

        let body = fetch_text(&request).await.map_err(submit_failed)?;
        if parse_submit(&body) {
            Ok(())
        } else {
            Err("Unable to submit score.".to_string())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use remote::{fetch_scores, submit_score};
