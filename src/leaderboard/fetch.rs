//! Browser `fetch` transport with an abort timeout

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, AbortSignal, Headers, Request, RequestInit, RequestMode, Response};

use super::{
    FetchResponse, LeaderboardTransport, NetError, REQUEST_TIMEOUT_MS, ScoreSubmission,
    SubmitResponse,
};

fn js_err(e: JsValue) -> NetError {
    NetError::Network(format!("{e:?}"))
}

/// Fetch and read the whole body. Aborting the signal fails either stage.
async fn read_body(
    window: &web_sys::Window,
    request: &Request,
    signal: &AbortSignal,
) -> Result<String, NetError> {
    let aborted = |e: JsValue| {
        if signal.aborted() {
            NetError::Timeout
        } else {
            js_err(e)
        }
    };

    let response: Response = JsFuture::from(window.fetch_with_request(request))
        .await
        .map_err(aborted)?
        .dyn_into()
        .map_err(js_err)?;
    if !response.ok() {
        return Err(NetError::Status(response.status()));
    }

    let text = JsFuture::from(response.text().map_err(js_err)?)
        .await
        .map_err(aborted)?;
    text.as_string()
        .ok_or_else(|| NetError::Decode("response body is not text".to_string()))
}

/// Talks to `<base_url>/leaderboard`
#[derive(Debug, Clone)]
pub struct FetchTransport {
    base_url: String,
}

impl FetchTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self) -> String {
        format!("{}/leaderboard", self.base_url)
    }

    /// Run one request, aborting it after `REQUEST_TIMEOUT_MS`
    async fn send(&self, method: &str, body: Option<String>) -> Result<String, NetError> {
        let window = web_sys::window().ok_or(NetError::Offline)?;

        let controller = AbortController::new().map_err(js_err)?;
        let signal = controller.signal();

        let init = RequestInit::new();
        init.set_method(method);
        init.set_mode(RequestMode::Cors);
        init.set_signal(Some(&signal));
        if let Some(body) = body {
            let headers = Headers::new().map_err(js_err)?;
            headers
                .set("Content-Type", "application/json")
                .map_err(js_err)?;
            init.set_headers(&headers);
            init.set_body(&JsValue::from_str(&body));
        }
        let request = Request::new_with_str_and_init(&self.url(), &init).map_err(js_err)?;

        let abort = Closure::once(move || controller.abort());
        let timer = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                abort.as_ref().unchecked_ref(),
                REQUEST_TIMEOUT_MS,
            )
            .map_err(js_err)?;

        let result = read_body(&window, &request, &signal).await;
        window.clear_timeout_with_handle(timer);
        drop(abort);
        result
    }
}

impl LeaderboardTransport for FetchTransport {
    async fn post_score(&self, submission: &ScoreSubmission) -> Result<SubmitResponse, NetError> {
        let body =
            serde_json::to_string(submission).map_err(|e| NetError::Decode(e.to_string()))?;
        let text = self.send("POST", Some(body)).await?;
        serde_json::from_str(&text).map_err(|e| NetError::Decode(e.to_string()))
    }

    async fn fetch_leaderboard(&self) -> Result<FetchResponse, NetError> {
        let text = self.send("GET", None).await?;
        serde_json::from_str(&text).map_err(|e| NetError::Decode(e.to_string()))
    }
}
