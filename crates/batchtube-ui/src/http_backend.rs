//! HTTP bindings to the download backend.
//!
//! Requests go through the browser's `fetch`; push subscriptions use
//! `EventSource`. Downloaded files are handed to the browser through an
//! object URL and a synthetic link click.

use std::pin::Pin;
use std::task::{Context, Poll};

use batchtube_core::{
    Backend, DownloadOutcome, DownloadRequest, Endpoints, Error, EventStream, ExtractRequest,
    OutputFormat, Playlist, Result, SavedResponse, content_disposition_filename,
    fallback_filename,
};
use futures::channel::mpsc::{self, UnboundedReceiver};
use futures::{Stream, StreamExt};
use tracing::{debug, warn};
use url::Url;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, EventSource, HtmlAnchorElement, MessageEvent, Request, RequestInit, RequestMode,
    Response,
};

/// Message reported when the push subscription drops.
pub const CONNECTION_LOST: &str = "Connection to the server was lost";

/// [`Backend`] talking to the service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    endpoints: Endpoints,
}

impl HttpBackend {
    /// Create a backend rooted at `endpoints`.
    pub const fn new(endpoints: Endpoints) -> Self {
        Self { endpoints }
    }
}

impl Backend for HttpBackend {
    async fn extract(&self, url: &str) -> Result<Playlist> {
        let body = ExtractRequest {
            url: url.to_string(),
        };
        let response = fetch("POST", &self.endpoints.extract(), Some(&body)).await?;
        let text = response_text(&response).await?;
        Playlist::from_json(&text)
    }

    async fn download(&self, request: &DownloadRequest) -> Result<DownloadOutcome> {
        let response = fetch("POST", &self.endpoints.download(), Some(request)).await?;
        let headers = response.headers();

        let is_json = headers
            .get("content-type")
            .ok()
            .flatten()
            .is_some_and(|ct| ct.contains("application/json"));
        if is_json {
            let text = response_text(&response).await?;
            let saved: SavedResponse = serde_json::from_str(&text)?;
            return Ok(DownloadOutcome::Saved { path: saved.saved });
        }

        let filename = headers
            .get("content-disposition")
            .ok()
            .flatten()
            .and_then(|h| content_disposition_filename(&h))
            .unwrap_or_else(|| fallback_filename(&request.title, request.fmt));
        let blob: Blob = await_js(response.blob().map_err(js_error)?).await?;
        save_blob(&blob, &filename)?;
        Ok(DownloadOutcome::File { filename })
    }

    fn subscribe(
        &self,
        session_id: &str,
        video_ids: &[String],
        format: OutputFormat,
    ) -> Result<EventStream> {
        let url = self.endpoints.subscription(session_id, video_ids, format);
        debug!("Opening event stream {}", url);
        Ok(EventSourceStream::open(&url)?.boxed_local())
    }

    fn release_session(&self, session_id: &str) {
        let url = self.endpoints.session(session_id);
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = fetch::<()>("DELETE", &url, None).await {
                debug!("Session release failed (ignored): {}", e);
            }
        });
    }
}

// =============================================================================
// fetch
// =============================================================================

fn js_error(value: JsValue) -> Error {
    let message = value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| "Network request failed".to_string());
    Error::Transport(message)
}

async fn await_js<T: JsCast>(promise: js_sys::Promise) -> Result<T> {
    JsFuture::from(promise)
        .await
        .map_err(js_error)?
        .dyn_into::<T>()
        .map_err(|_| Error::Transport("Unexpected response type".to_string()))
}

/// Issue a request and fail on non-2xx statuses.
async fn fetch<B: serde::Serialize>(method: &str, url: &Url, body: Option<&B>) -> Result<Response> {
    let init = RequestInit::new();
    init.set_method(method);
    init.set_mode(RequestMode::Cors);
    if let Some(body) = body {
        let json = serde_json::to_string(body)?;
        init.set_body(&JsValue::from_str(&json));
    }

    let request = Request::new_with_str_and_init(url.as_str(), &init).map_err(js_error)?;
    if body.is_some() {
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(js_error)?;
    }

    let window = web_sys::window().ok_or_else(|| Error::Transport("no window".to_string()))?;
    debug!("{} {}", method, url);
    let response: Response = await_js(window.fetch_with_request(&request)).await?;

    if !response.ok() {
        let status = response.status();
        let text = response_text(&response).await.unwrap_or_default();
        warn!("{} {} failed with status {}", method, url, status);
        return Err(Error::from_response(status, &text));
    }
    Ok(response)
}

async fn response_text(response: &Response) -> Result<String> {
    let promise = response.text().map_err(js_error)?;
    JsFuture::from(promise)
        .await
        .map_err(js_error)?
        .as_string()
        .ok_or_else(|| Error::Transport("Response body is not text".to_string()))
}

/// Offer a blob to the user as a file download.
fn save_blob(blob: &Blob, filename: &str) -> Result<()> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| Error::Transport("no document".to_string()))?;
    let object_url = web_sys::Url::create_object_url_with_blob(blob).map_err(js_error)?;

    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(js_error)?
        .dyn_into()
        .map_err(|_| Error::Transport("could not create link".to_string()))?;
    anchor.set_href(&object_url);
    anchor.set_download(filename);
    anchor.click();

    web_sys::Url::revoke_object_url(&object_url).map_err(js_error)?;
    debug!("Saved {}", filename);
    Ok(())
}

// =============================================================================
// EventSource
// =============================================================================

/// `EventSource` exposed as a stream of `data:` payloads.
///
/// The first `error` event ends the stream with a transport error; the
/// browser's automatic reconnect is cut short by closing the source.
struct EventSourceStream {
    source: EventSource,
    receiver: UnboundedReceiver<Result<String>>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_error: Closure<dyn FnMut(web_sys::Event)>,
}

impl EventSourceStream {
    fn open(url: &Url) -> Result<Self> {
        let source = EventSource::new(url.as_str()).map_err(js_error)?;
        let (sender, receiver) = mpsc::unbounded();

        let message_sender = sender.clone();
        let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            if let Some(data) = event.data().as_string() {
                let _ = message_sender.unbounded_send(Ok(data));
            }
        });

        let error_source = source.clone();
        let on_error = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
            warn!("Event stream error (readyState {})", error_source.ready_state());
            error_source.close();
            let _ = sender.unbounded_send(Err(Error::Transport(CONNECTION_LOST.to_string())));
            sender.close_channel();
        });

        source.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        source.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        Ok(Self {
            source,
            receiver,
            _on_message: on_message,
            _on_error: on_error,
        })
    }
}

impl Stream for EventSourceStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_next_unpin(cx)
    }
}

impl Drop for EventSourceStream {
    fn drop(&mut self) {
        self.source.set_onmessage(None);
        self.source.set_onerror(None);
        self.source.close();
        debug!("Event stream closed");
    }
}
