//! End-to-end tests for the controller flows against an in-memory backend.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::cell::RefCell;

use batchtube_core::{
    Backend, ClientConfig, Controller, DownloadOutcome, DownloadRequest, EMPTY_PLAYLIST,
    Endpoints, Error, EventStream, Item, ItemStatus, OutputFormat, Phase, Playlist, Result,
    SessionState, SessionStore, TransferMode, project,
};
use futures::StreamExt;

// =============================================================================
// Fixtures
// =============================================================================

#[derive(Default)]
struct MockBackend {
    playlist: RefCell<Option<Playlist>>,
    extract_error: Option<Error>,
    failing: Vec<String>,
    events: RefCell<Vec<Result<String>>>,
    extract_calls: RefCell<usize>,
    downloads: RefCell<Vec<DownloadRequest>>,
    released: RefCell<Vec<String>>,
}

impl Backend for MockBackend {
    async fn extract(&self, _url: &str) -> Result<Playlist> {
        *self.extract_calls.borrow_mut() += 1;
        if let Some(e) = &self.extract_error {
            return Err(e.clone());
        }
        Ok(self.playlist.borrow().clone().unwrap_or_default())
    }

    async fn download(&self, request: &DownloadRequest) -> Result<DownloadOutcome> {
        self.downloads.borrow_mut().push(request.clone());
        if self.failing.contains(&request.url) {
            return Err(Error::Api {
                status: 500,
                message: "Video unavailable".to_string(),
            });
        }
        Ok(DownloadOutcome::File {
            filename: format!("{}.{}", request.title, request.fmt.as_str()),
        })
    }

    fn subscribe(
        &self,
        _session_id: &str,
        _video_ids: &[String],
        _format: OutputFormat,
    ) -> Result<EventStream> {
        let events = std::mem::take(&mut *self.events.borrow_mut());
        Ok(futures::stream::iter(events).boxed_local())
    }

    fn release_session(&self, session_id: &str) {
        self.released.borrow_mut().push(session_id.to_string());
    }
}

fn item(id: &str, title: &str) -> Item {
    Item {
        video_id: id.to_string(),
        title: title.to_string(),
        url: format!("https://www.youtube.com/watch?v={id}"),
        thumbnail: None,
        duration: Some(125),
        duration_str: None,
        uploader: Some("Uploader".to_string()),
    }
}

fn playlist(ids: &[&str], session: Option<&str>) -> Playlist {
    Playlist {
        session_id: session.map(str::to_string),
        playlist_id: Some("PL1".to_string()),
        title: "Road trip".to_string(),
        items: ids.iter().map(|id| item(id, &format!("Song {id}"))).collect(),
    }
}

type TestController = Controller<MockBackend, RefCell<SessionState>>;

fn controller(backend: MockBackend, mode: TransferMode) -> TestController {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    let config = ClientConfig {
        transfer_mode: mode,
        ..ClientConfig::default()
    };
    Controller::new(
        backend,
        RefCell::new(SessionState::new(config.default_format)),
        Endpoints::parse("http://localhost:8000/").unwrap(),
        &config,
    )
}

async fn loaded(ids: &[&str], session: Option<&str>, mode: TransferMode) -> TestController {
    let backend = MockBackend {
        playlist: RefCell::new(Some(playlist(ids, session))),
        ..MockBackend::default()
    };
    let ctl = controller(backend, mode);
    ctl.submit_url("https://www.youtube.com/playlist?list=PL1")
        .await
        .unwrap();
    ctl
}

const URL: &str = "https://www.youtube.com/playlist?list=PL1";

// =============================================================================
// Extraction
// =============================================================================

#[tokio::test]
async fn test_extraction_selects_every_item() {
    let ctl = loaded(&["a", "b", "c"], Some("s1"), TransferMode::EventStream).await;
    let view = ctl.view();

    assert_eq!(view.phase, Phase::Playlist);
    assert_eq!(view.cards.len(), 3);
    assert!(view.cards.iter().all(|c| c.selected));
    assert_eq!(view.controls.selected_count, 3);
    assert_eq!(view.controls.select_toggle_label, "Deselect All");
    assert_eq!(view.controls.download_label, "Download 3 selected");
    assert_eq!(view.cards[0].duration.as_deref(), Some("2:05"));
}

#[tokio::test]
async fn test_invalid_url_never_reaches_backend() {
    let ctl = controller(MockBackend::default(), TransferMode::EventStream);

    let result = ctl.submit_url("   ").await;
    assert!(matches!(result, Err(Error::InvalidUrl(_))));
    let result = ctl.submit_url("not a url").await;
    assert!(matches!(result, Err(Error::InvalidUrl(_))));

    assert_eq!(*ctl.backend().extract_calls.borrow(), 0);
    let view = ctl.view();
    assert_eq!(view.phase, Phase::Input);
    assert!(view.input_error.is_some());
}

#[tokio::test]
async fn test_extraction_failure_returns_to_input() {
    let backend = MockBackend {
        extract_error: Some(Error::from_response(
            400,
            r#"{"detail":"ERROR: [youtube:tab] This playlist does not exist"}"#,
        )),
        ..MockBackend::default()
    };
    let ctl = controller(backend, TransferMode::EventStream);

    let result = ctl.submit_url(URL).await;
    assert!(matches!(result, Err(Error::Api { status: 400, .. })));
    let view = ctl.view();
    assert_eq!(view.phase, Phase::Input);
    assert_eq!(
        view.input_error.as_deref(),
        Some("[youtube:tab] This playlist does not exist")
    );
}

#[tokio::test]
async fn test_empty_playlist_is_an_extraction_error() {
    let backend = MockBackend {
        playlist: RefCell::new(Some(playlist(&[], Some("s1")))),
        ..MockBackend::default()
    };
    let ctl = controller(backend, TransferMode::EventStream);

    let result = ctl.submit_url(URL).await;
    assert!(matches!(result, Err(Error::Extraction(_))));
    assert_eq!(ctl.view().input_error.as_deref(), Some(EMPTY_PLAYLIST));
}

// =============================================================================
// Selection
// =============================================================================

#[tokio::test]
async fn test_toggle_twice_restores_selection() {
    let ctl = loaded(&["a", "b"], None, TransferMode::Sequential).await;
    let before = ctl.store().read(SessionState::selected_ids);

    assert!(ctl.toggle("a"));
    assert_eq!(ctl.view().controls.select_toggle_label, "Select All");
    assert_eq!(ctl.view().controls.download_label, "Download 1 selected");
    assert!(ctl.toggle("a"));

    assert_eq!(ctl.store().read(SessionState::selected_ids), before);
    assert_eq!(ctl.view().controls.select_toggle_label, "Deselect All");
}

#[tokio::test]
async fn test_toggle_unknown_id_is_noop() {
    let ctl = loaded(&["a"], None, TransferMode::Sequential).await;
    assert!(!ctl.toggle("missing"));
    assert_eq!(ctl.store().read(SessionState::selected_count), 1);
}

#[tokio::test]
async fn test_toggle_all_and_empty_selection_disables_download() {
    let ctl = loaded(&["a", "b"], None, TransferMode::Sequential).await;

    assert!(ctl.toggle_all());
    let view = ctl.view();
    assert_eq!(view.controls.selected_count, 0);
    assert!(view.controls.download_disabled);
    assert_eq!(view.controls.select_toggle_label, "Select All");
    assert!(ctl.start_run().await.is_none());
    assert!(ctl.backend().downloads.borrow().is_empty());

    assert!(ctl.toggle_all());
    assert_eq!(ctl.view().controls.select_toggle_label, "Deselect All");
}

// =============================================================================
// Sequential runs
// =============================================================================

#[tokio::test]
async fn test_sequential_run_tallies_every_item() {
    let mut pl = playlist(&["a", "b", "c", "d"], None);
    pl.items[1].url = "https://bad/b".to_string();
    let backend = MockBackend {
        playlist: RefCell::new(Some(pl)),
        failing: vec!["https://bad/b".to_string()],
        ..MockBackend::default()
    };
    let ctl = controller(backend, TransferMode::Sequential);
    ctl.submit_url(URL).await.unwrap();
    assert!(ctl.set_format(OutputFormat::Mp4));

    let summary = ctl.start_run().await.expect("run");
    assert_eq!(summary.total, 4);
    assert_eq!(summary.completed, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.completed + summary.failed, summary.total);

    let view = ctl.view();
    let progress = view.progress.expect("progress");
    assert_eq!(progress.fraction, 1.0);
    assert_eq!(progress.label, "4 / 4");
    assert_eq!(
        view.status_message.as_deref(),
        Some("Done! 3 downloaded, 1 failed.")
    );
    assert!(!view.controls.download_disabled);
    assert!(view.zip_url.is_none());

    let failed = &view.cards[1];
    assert_eq!(failed.status, ItemStatus::Error);
    assert_eq!(failed.error_message.as_deref(), Some("Video unavailable"));
    assert_eq!(view.cards[0].note.as_deref(), Some("Song a.mp4"));

    let downloads = ctl.backend().downloads.borrow();
    assert_eq!(downloads.len(), 4);
    assert!(downloads.iter().all(|r| r.fmt == OutputFormat::Mp4));
}

#[tokio::test]
async fn test_completion_and_error_sets_stay_disjoint() {
    let mut pl = playlist(&["a", "b"], None);
    pl.items[0].url = "https://bad/a".to_string();
    let backend = MockBackend {
        playlist: RefCell::new(Some(pl)),
        failing: vec!["https://bad/a".to_string()],
        ..MockBackend::default()
    };
    let ctl = controller(backend, TransferMode::Sequential);
    ctl.submit_url(URL).await.unwrap();
    let _ = ctl.start_run().await;

    ctl.store().read(|s| {
        for id in ["a", "b"] {
            assert!(!(s.is_completed(id) && s.is_failed(id)), "{id}");
        }
        assert!(s.is_failed("a"));
        assert!(s.is_completed("b"));
    });
}

// =============================================================================
// Event-stream runs
// =============================================================================

fn events(lines: &[&str]) -> RefCell<Vec<Result<String>>> {
    RefCell::new(lines.iter().map(|l| Ok((*l).to_string())).collect())
}

#[tokio::test]
async fn test_push_stream_scenario() {
    let backend = MockBackend {
        playlist: RefCell::new(Some(playlist(&["A", "B"], Some("s1")))),
        events: events(&[
            r#"{"event_type":"downloading","video_id":"A","title":"Song A"}"#,
            r#"{"event_type":"progress","video_id":"A","percent":50,"speed":"1.0MiB/s"}"#,
            r#"{"event_type":"complete","video_id":"A"}"#,
            r#"{"event_type":"error","video_id":"B","message":"Private video"}"#,
            r#"{"event_type":"all_complete"}"#,
        ]),
        ..MockBackend::default()
    };
    let ctl = controller(backend, TransferMode::EventStream);
    ctl.submit_url(URL).await.unwrap();

    let summary = ctl.start_run().await.expect("run");
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.failed, 1);

    let view = ctl.view();
    assert_eq!(
        view.zip_url.as_deref(),
        Some("http://localhost:8000/api/zip/s1")
    );
    assert_eq!(
        view.cards[0].file_url.as_deref(),
        Some("http://localhost:8000/api/file/s1/A")
    );
    assert_eq!(view.cards[1].status, ItemStatus::Error);
    assert_eq!(
        ctl.file_url("A").map(String::from).as_deref(),
        Some("http://localhost:8000/api/file/s1/A")
    );
    assert!(ctl.file_url("B").is_none());
    assert!(ctl.zip_url().is_some());
}

#[tokio::test]
async fn test_push_stream_without_completions_hides_zip() {
    let backend = MockBackend {
        playlist: RefCell::new(Some(playlist(&["A"], Some("s1")))),
        events: events(&[
            r#"{"event_type":"error","video_id":"A"}"#,
            r#"{"event_type":"all_complete"}"#,
        ]),
        ..MockBackend::default()
    };
    let ctl = controller(backend, TransferMode::EventStream);
    ctl.submit_url(URL).await.unwrap();
    let _ = ctl.start_run().await;

    assert!(ctl.view().zip_url.is_none());
    assert!(ctl.zip_url().is_none());
}

#[tokio::test]
async fn test_connection_loss_interrupts_unresolved_items() {
    let backend = MockBackend {
        playlist: RefCell::new(Some(playlist(&["A", "B", "C"], Some("s1")))),
        events: RefCell::new(vec![
            Ok(r#"{"event_type":"complete","video_id":"A"}"#.to_string()),
            Ok(r#"{"event_type":"downloading","video_id":"B"}"#.to_string()),
            Err(Error::Transport("Connection lost".to_string())),
        ]),
        ..MockBackend::default()
    };
    let ctl = controller(backend, TransferMode::EventStream);
    ctl.submit_url(URL).await.unwrap();

    let summary = ctl.start_run().await.expect("run");
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.interrupted, 2);

    let view = ctl.view();
    assert_eq!(view.cards[1].status, ItemStatus::Interrupted);
    assert_eq!(view.cards[2].status, ItemStatus::Interrupted);
    assert!(!view.controls.download_disabled);
    assert!(
        view.status_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Connection lost"))
    );
}

#[tokio::test]
async fn test_event_stream_selection_stays_open_while_sequential_locks() {
    let ctl = loaded(&["a", "b"], Some("s1"), TransferMode::EventStream).await;
    ctl.store()
        .update(|s| s.begin_run(TransferMode::EventStream, None));
    assert!(ctl.toggle("a"));
    assert!(!ctl.set_format(OutputFormat::Mp4));

    let ctl = loaded(&["a", "b"], None, TransferMode::Sequential).await;
    ctl.store()
        .update(|s| s.begin_run(TransferMode::Sequential, None));
    assert!(!ctl.toggle("a"));
    assert!(!ctl.toggle_all());
    assert!(ctl.start_run().await.is_none());
}

// =============================================================================
// New playlist
// =============================================================================

#[tokio::test]
async fn test_new_playlist_clears_state_and_releases_once() {
    let backend = MockBackend {
        playlist: RefCell::new(Some(playlist(&["A"], Some("s1")))),
        events: events(&[
            r#"{"event_type":"complete","video_id":"A"}"#,
            r#"{"event_type":"all_complete"}"#,
        ]),
        ..MockBackend::default()
    };
    let ctl = controller(backend, TransferMode::EventStream);
    ctl.submit_url(URL).await.unwrap();
    let _ = ctl.start_run().await;

    assert!(ctl.start_new_playlist());
    assert_eq!(*ctl.backend().released.borrow(), vec!["s1".to_string()]);

    let view = ctl.view();
    assert_eq!(view.phase, Phase::Input);
    assert!(view.cards.is_empty());
    assert!(view.zip_url.is_none());
    ctl.store().read(|s| {
        assert_eq!(s.selected_count(), 0);
        assert_eq!(s.completed_count(), 0);
        assert_eq!(s.failed_count(), 0);
    });

    assert!(ctl.start_new_playlist());
    assert_eq!(ctl.backend().released.borrow().len(), 1);
}

#[tokio::test]
async fn test_replacing_playlist_releases_previous_session() {
    let ctl = loaded(&["a"], Some("s1"), TransferMode::EventStream).await;
    *ctl.backend().playlist.borrow_mut() = Some(playlist(&["b"], Some("s2")));

    ctl.submit_url(URL).await.unwrap();
    assert_eq!(*ctl.backend().released.borrow(), vec!["s1".to_string()]);
    assert_eq!(ctl.store().read(SessionState::selected_ids), vec!["b"]);
}

// =============================================================================
// Rendering
// =============================================================================

#[tokio::test]
async fn test_markup_in_titles_reaches_cards_as_plain_text() {
    let title = "<img src=x onerror=alert(1)> & \"friends\"";
    let mut pl = playlist(&["x"], Some("s1"));
    pl.items[0].title = title.to_string();
    pl.items[0].uploader = Some("<b>me</b>".to_string());
    let backend = MockBackend {
        playlist: RefCell::new(Some(pl)),
        ..MockBackend::default()
    };
    let ctl = controller(backend, TransferMode::EventStream);
    ctl.submit_url(URL).await.unwrap();

    // Cards carry the raw text; the view layer inserts it as text nodes.
    let card = &ctl.view().cards[0];
    assert_eq!(card.title, title);
    assert_eq!(card.uploader.as_deref(), Some("<b>me</b>"));
    assert!(!card.title.contains("&lt;"));
}

// =============================================================================
// Aggregate progress
// =============================================================================

/// Store that projects the page after every update and keeps the progress
/// fraction each time it changes.
struct RecordingStore {
    state: RefCell<SessionState>,
    endpoints: Endpoints,
    fractions: RefCell<Vec<f64>>,
}

impl SessionStore for RecordingStore {
    fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.state.borrow())
    }

    fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let result = f(&mut self.state.borrow_mut());
        let page = project(&self.state.borrow(), TransferMode::Sequential, &self.endpoints);
        if let Some(progress) = page.progress {
            let mut fractions = self.fractions.borrow_mut();
            if fractions.last() != Some(&progress.fraction) {
                fractions.push(progress.fraction);
            }
        }
        result
    }
}

#[tokio::test]
async fn test_sequential_progress_advances_one_item_at_a_time() {
    let backend = MockBackend {
        playlist: RefCell::new(Some(playlist(&["a", "b", "c", "d"], None))),
        failing: vec!["https://www.youtube.com/watch?v=b".to_string()],
        ..MockBackend::default()
    };
    let config = ClientConfig {
        transfer_mode: TransferMode::Sequential,
        ..ClientConfig::default()
    };
    let endpoints = Endpoints::parse("http://localhost:8000/").unwrap();
    let store = RecordingStore {
        state: RefCell::new(SessionState::new(config.default_format)),
        endpoints: endpoints.clone(),
        fractions: RefCell::new(Vec::new()),
    };
    let ctl = Controller::new(backend, store, endpoints, &config);
    ctl.submit_url(URL).await.unwrap();

    let summary = ctl.start_run().await.unwrap();
    assert_eq!((summary.completed, summary.failed), (3, 1));
    assert_eq!(
        *ctl.store().fractions.borrow(),
        vec![0.0, 0.25, 0.5, 0.75, 1.0]
    );
    assert_eq!(ctl.view().progress.unwrap().label, "4 / 4");
}
