/// High-score persistence.
///
/// ## Two layers:
///
///   **ScoreStore**: the two-operation contract the game talks to:
///     submit a final score, fetch the leaderboard. Implementations
///     may be slow or fail; neither is allowed to stall the game.
///
///   **StoreLink**: owns a store on a worker thread. Requests are
///     queued without blocking; replies are picked up later with `poll()`.
///
/// ## File format (`FileScoreStore`):
///   ```
///   scores = [120, 40, 300]
///   ```
///   Every submitted score is kept, in submission order. The leaderboard
///   is the top N, highest first.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

// ══════════════════════════════════════════════════════════════
// Contract
// ══════════════════════════════════════════════════════════════

pub trait ScoreStore: Send {
    /// Record a finished session's score. Best effort.
    fn submit_score(&mut self, score: u32) -> Result<(), GameError>;

    /// Current leaderboard, in display order.
    fn fetch_leaderboard(&mut self) -> Result<Vec<u32>, GameError>;
}

// ══════════════════════════════════════════════════════════════
// File-backed store
// ══════════════════════════════════════════════════════════════

#[derive(Serialize, Deserialize, Debug, Default)]
struct ScoreFile {
    #[serde(default)]
    scores: Vec<u32>,
}

pub struct FileScoreStore {
    path: PathBuf,
    board_size: usize,
}

impl FileScoreStore {
    pub fn new(path: PathBuf, board_size: usize) -> Self {
        FileScoreStore { path, board_size }
    }

    fn read(&self) -> Result<ScoreFile, GameError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ScoreFile::default()),
            Err(e) => return Err(unavailable(&self.path, e)),
        };
        toml::from_str(&text).map_err(|e| unavailable(&self.path, e))
    }

    fn write(&self, file: &ScoreFile) -> Result<(), GameError> {
        let text = toml::to_string(file).map_err(|e| unavailable(&self.path, e))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| unavailable(parent, e))?;
            }
        }
        std::fs::write(&self.path, text).map_err(|e| unavailable(&self.path, e))
    }
}

fn unavailable(path: &std::path::Path, err: impl std::fmt::Display) -> GameError {
    GameError::StoreUnavailable(format!("{}: {err}", path.display()))
}

impl ScoreStore for FileScoreStore {
    fn submit_score(&mut self, score: u32) -> Result<(), GameError> {
        let mut file = self.read()?;
        file.scores.push(score);
        self.write(&file)
    }

    fn fetch_leaderboard(&mut self) -> Result<Vec<u32>, GameError> {
        let mut scores = self.read()?.scores;
        scores.sort_unstable_by(|a, b| b.cmp(a));
        scores.truncate(self.board_size);
        Ok(scores)
    }
}

// ══════════════════════════════════════════════════════════════
// Worker link
// ══════════════════════════════════════════════════════════════

enum StoreRequest {
    Submit(u32),
    FetchLeaderboard,
    /// Answered once everything queued before it has been handled.
    Settle(Sender<()>),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StoreOp {
    Submit,
    FetchLeaderboard,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreReply {
    Submitted(u32),
    Leaderboard(Vec<u32>),
    Failed(StoreOp, GameError),
}

pub struct StoreLink {
    requests: Sender<StoreRequest>,
    replies: Receiver<StoreReply>,
}

impl StoreLink {
    /// Move `store` onto its own thread. The thread exits when the link is dropped.
    pub fn spawn(mut store: Box<dyn ScoreStore>) -> Self {
        let (req_tx, req_rx) = mpsc::channel::<StoreRequest>();
        let (reply_tx, reply_rx) = mpsc::channel::<StoreReply>();

        thread::spawn(move || {
            for req in req_rx {
                let reply = match req {
                    StoreRequest::Submit(score) => match store.submit_score(score) {
                        Ok(()) => {
                            tracing::info!(score, "score submitted");
                            StoreReply::Submitted(score)
                        }
                        Err(e) => StoreReply::Failed(StoreOp::Submit, e),
                    },
                    StoreRequest::FetchLeaderboard => match store.fetch_leaderboard() {
                        Ok(board) => {
                            tracing::debug!(entries = board.len(), "leaderboard fetched");
                            StoreReply::Leaderboard(board)
                        }
                        Err(e) => StoreReply::Failed(StoreOp::FetchLeaderboard, e),
                    },
                    StoreRequest::Settle(ack) => {
                        let _ = ack.send(());
                        continue;
                    }
                };
                if reply_tx.send(reply).is_err() {
                    break; // link dropped
                }
            }
        });

        StoreLink { requests: req_tx, replies: reply_rx }
    }

    /// Queue a score submission. Never blocks.
    pub fn submit(&self, score: u32) {
        self.send(StoreRequest::Submit(score));
    }

    /// Queue a leaderboard fetch. Never blocks.
    pub fn request_leaderboard(&self) {
        self.send(StoreRequest::FetchLeaderboard);
    }

    /// Replies that have arrived so far.
    pub fn poll(&self) -> Vec<StoreReply> {
        self.replies.try_iter().collect()
    }

    /// Wait until every request queued so far has been handled.
    /// Returns false if the worker did not catch up within `timeout`.
    pub fn settle(&self, timeout: Duration) -> bool {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.requests.send(StoreRequest::Settle(ack_tx)).is_err() {
            return false;
        }
        match ack_rx.recv_timeout(timeout) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    fn send(&self, req: StoreRequest) {
        if self.requests.send(req).is_err() {
            tracing::warn!("score store worker is gone; request dropped");
        }
    }
}
