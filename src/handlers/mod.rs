pub mod describe_image;
pub mod health;
pub mod image_songs;
pub mod question;

use crate::error::{AppError, AppResult};
use crate::services::rate_limiter::{CooldownLimiter, RateDecision};
use log::info;

/// Fixed localized strings returned to callers. The cooldown text names the
/// default 10 second window; clients match on the exact string.
pub const COOLDOWN_MESSAGE: &str =
    "10秒以内にリクエストが送信されました。しばらくお待ちください。";
pub const MISSING_FILE_MESSAGE: &str = "画像ファイルが見つかりません";
pub const MISSING_QUERY_MESSAGE: &str = "質問が入力されていません";

/// Gate shared by every endpoint. Runs before any body parsing or upstream
/// work; a rejection costs the caller nothing but the 429.
pub fn enforce_cooldown(limiter: &CooldownLimiter) -> AppResult<()> {
    match limiter.try_acquire()? {
        RateDecision::Accepted => Ok(()),
        RateDecision::Rejected { retry_after } => {
            info!(
                "request rejected by cooldown gate, {}ms remaining",
                retry_after.as_millis()
            );
            Err(AppError::TooManyRequests(COOLDOWN_MESSAGE.to_string()))
        }
    }
}
