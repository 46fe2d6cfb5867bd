//! Shared fixtures for unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use futures::StreamExt;

use crate::api::{DownloadOutcome, DownloadRequest};
use crate::backend::{Backend, EventStream};
use crate::config::OutputFormat;
use crate::error::{Error, Result};
use crate::playlist::{Item, Playlist};

/// A playlist with one item per id.
pub fn playlist(ids: &[&str], session_id: Option<&str>) -> Playlist {
    Playlist {
        session_id: session_id.map(str::to_string),
        playlist_id: Some("PL1".to_string()),
        title: "Test playlist".to_string(),
        items: ids
            .iter()
            .map(|id| Item {
                video_id: (*id).to_string(),
                title: format!("Title {id}"),
                url: format!("https://www.youtube.com/watch?v={id}"),
                thumbnail: None,
                duration: None,
                duration_str: None,
                uploader: None,
            })
            .collect(),
    }
}

/// Scripted backend.
#[derive(Default)]
pub struct FakeBackend {
    pub playlist: Option<Playlist>,
    pub failing_downloads: Vec<String>,
    pub events: RefCell<Option<Vec<Result<String>>>>,
    pub downloads: RefCell<Vec<DownloadRequest>>,
    pub subscriptions: RefCell<VecDeque<(String, Vec<String>, OutputFormat)>>,
    pub released: RefCell<Vec<String>>,
}

impl Backend for FakeBackend {
    async fn extract(&self, _url: &str) -> Result<Playlist> {
        self.playlist
            .clone()
            .ok_or_else(|| Error::Extraction("no playlist scripted".to_string()))
    }

    async fn download(&self, request: &DownloadRequest) -> Result<DownloadOutcome> {
        self.downloads.borrow_mut().push(request.clone());
        if self.failing_downloads.iter().any(|url| *url == request.url) {
            return Err(Error::from_response(
                500,
                r#"{"detail":"ERROR: Video unavailable"}"#,
            ));
        }
        Ok(DownloadOutcome::File {
            filename: format!("{}.{}", request.title, request.fmt.as_str()),
        })
    }

    fn subscribe(
        &self,
        session_id: &str,
        video_ids: &[String],
        format: OutputFormat,
    ) -> Result<EventStream> {
        self.subscriptions.borrow_mut().push_back((
            session_id.to_string(),
            video_ids.to_vec(),
            format,
        ));
        let events = self
            .events
            .borrow_mut()
            .take()
            .ok_or_else(|| Error::Transport("subscription refused".to_string()))?;
        Ok(futures::stream::iter(events).boxed_local())
    }

    fn release_session(&self, session_id: &str) {
        self.released.borrow_mut().push(session_id.to_string());
    }
}
