use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use reqwest::header::HeaderMap;
use tokio::sync::Mutex;
use tokio::time::sleep;

// Tracks the x-ratelimit budget reported by the upstream so the next call
// holds off until the window resets instead of burning requests into 403s.
pub struct RateBudget {
    state: Mutex<BudgetState>,
}

struct BudgetState {
    remaining: u32,
    reset_at: Option<Instant>,
}

impl RateBudget {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BudgetState {
                remaining: 5000,
                reset_at: None,
            }),
        }
    }

    /// Blocks until the budget allows another request.
    pub async fn acquire(&self) {
        let wait = {
            let state = self.state.lock().await;
            match (state.remaining, state.reset_at) {
                (0, Some(reset_at)) => reset_at.checked_duration_since(Instant::now()),
                _ => None,
            }
        };

        if let Some(wait) = wait {
            tracing::info!("Rate budget exhausted, waiting {:?}", wait);
            sleep(wait).await;
        }
    }

    pub async fn observe(&self, headers: &HeaderMap) {
        let Some(remaining) = header_number(headers, "x-ratelimit-remaining") else {
            return;
        };

        let mut state = self.state.lock().await;
        state.remaining = remaining as u32;

        if let Some(reset_epoch) = header_number(headers, "x-ratelimit-reset") {
            let now_epoch = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs();
            if reset_epoch > now_epoch {
                state.reset_at =
                    Some(Instant::now() + Duration::from_secs(reset_epoch - now_epoch));
            }
        }
    }
}

impl Default for RateBudget {
    fn default() -> Self {
        Self::new()
    }
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.parse().ok()
}
