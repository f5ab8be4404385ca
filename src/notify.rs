//! Penalty notification transports
//!
//! The penalty signal is a bare `POST` to a configured endpoint. In the
//! browser it goes out through `fetch`; the response is ignored and any
//! failure is logged and dropped. Native builds only log it.

use crate::sim::PenaltyNotifier;

/// Posts the penalty signal over HTTP without waiting for it
#[derive(Debug, Clone)]
pub struct HttpPenaltyNotifier {
    endpoint: String,
}

impl HttpPenaltyNotifier {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The request this notifier issues, e.g. `POST http://192.168.4.1/lose`
    pub fn request_line(&self) -> String {
        format!("POST {}", self.endpoint)
    }
}

#[cfg(target_arch = "wasm32")]
impl PenaltyNotifier for HttpPenaltyNotifier {
    fn notify_penalty(&self) {
        let endpoint = self.endpoint.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match fetch_post(&endpoint).await {
                Ok(()) => log::info!("Penalty signal sent to {}", endpoint),
                Err(e) => log::warn!("Penalty signal dispatched quietly: {:?}", e),
            }
        });
    }
}

#[cfg(target_arch = "wasm32")]
async fn fetch_post(endpoint: &str) -> Result<(), wasm_bindgen::JsValue> {
    use wasm_bindgen::JsValue;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let init = web_sys::RequestInit::new();
    init.set_method("POST");
    let promise = window.fetch_with_str_and_init(endpoint, &init);
    wasm_bindgen_futures::JsFuture::from(promise).await?;
    Ok(())
}

/// Native builds have no browser `fetch`; the call is logged instead
#[cfg(not(target_arch = "wasm32"))]
impl PenaltyNotifier for HttpPenaltyNotifier {
    fn notify_penalty(&self) {
        log::warn!("Penalty: {} (not sent from native builds)", self.request_line());
    }
}

/// Logs the penalty instead of sending it; used for dry runs
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPenaltyNotifier;

impl PenaltyNotifier for LogPenaltyNotifier {
    fn notify_penalty(&self) {
        log::warn!("Penalty triggered (dry run, nothing sent)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Outcome, report};

    #[test]
    fn test_request_line() {
        let notifier = HttpPenaltyNotifier::new("http://192.168.4.1/lose");
        assert_eq!(notifier.endpoint(), "http://192.168.4.1/lose");
        assert_eq!(notifier.request_line(), "POST http://192.168.4.1/lose");
    }

    #[test]
    fn test_notifiers_return_without_side_effects() {
        let notifier = HttpPenaltyNotifier::new("http://invalid.invalid:9/lose");
        assert_eq!(report(&[5, 1, 3, 7], 2, &notifier), Outcome::NotQualified);
        assert_eq!(
            report(&[5, 1, 3, 7], 3, &LogPenaltyNotifier),
            Outcome::Qualified { rank: 3 }
        );
        LogPenaltyNotifier.notify_penalty();
    }
}
