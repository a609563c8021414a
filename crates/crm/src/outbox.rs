use super::*;
use booking_core::CRM_ATTEMPTS;
use booking_core::CRM_BACKOFF;
use booking_core::CRM_TIMEOUT;

/// Fire-and-forget sink for booking notices.
///
/// `dispatch` must return immediately; delivery happens off the request path
/// and its outcome never reaches the caller.
pub trait Outbox: Send + Sync {
    fn dispatch(&self, notice: Notice);
}

/// Delivers notices to the CRM over HTTP with a static bearer token.
/// At-least-once, best-effort: a bounded number of attempts, then a log line.
#[derive(Clone)]
pub struct Courier {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl Courier {
    pub fn new(base: &str, token: String) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(CRM_TIMEOUT).build()?,
            endpoint: format!("{}/api/notify", base.trim_end_matches('/')),
            token,
        })
    }
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
    /// One POST; any non-2xx status counts as failure.
    pub async fn deliver(&self, notice: &Notice) -> Result<(), reqwest::Error> {
        self.http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(notice)
            .send()
            .await?
            .error_for_status()
            .map(|_| ())
    }
    /// Retries with linear backoff. Returns whether the CRM acknowledged.
    pub async fn relay(&self, notice: &Notice) -> bool {
        for attempt in 1..=CRM_ATTEMPTS {
            match self.deliver(notice).await {
                Ok(()) => {
                    log::info!("[crm] booking {} delivered", notice.booking_id);
                    return true;
                }
                Err(e) => log::warn!(
                    "[crm] booking {} attempt {}/{} failed: {}",
                    notice.booking_id,
                    attempt,
                    CRM_ATTEMPTS,
                    e
                ),
            }
            if attempt < CRM_ATTEMPTS {
                tokio::time::sleep(CRM_BACKOFF * attempt as u32).await;
            }
        }
        log::error!("[crm] booking {} dropped", notice.booking_id);
        false
    }
}

impl Outbox for Courier {
    fn dispatch(&self, notice: Notice) {
        let courier = self.clone();
        tokio::spawn(async move { courier.relay(&notice).await });
    }
}

/// Outbox for deployments without a CRM: notices are logged and dropped.
pub struct Silent;

impl Outbox for Silent {
    fn dispatch(&self, notice: Notice) {
        log::debug!("[crm] not configured, booking {} not forwarded", notice.booking_id);
    }
}
