/// Lifecycle controller: the session state machine.
///
/// ## Phases
///
///   Idle ──start()──▶ Running ──lives hit 0──▶ GameOver ──reset──▶ Idle
///
/// `GameOver` is transient. It only exists inside `finish_session()`, which
/// walks the steps in order: halt, announce, report, reset, refresh, idle.
///
/// ## Frames
///
/// The controller never sleeps or reads a clock. It asks a `FrameScheduler`
/// for the next frame and the front end calls `poll_frame()` in its loop.
/// `tick()` re-arms only while the session is running, so the frame cycle
/// ends by itself once `running` goes false.
///
/// ## Score store
///
/// All store traffic goes through a `StoreLink`. Requests never block;
/// replies are applied by `pump_store()`.

use std::time::{Duration, Instant};

use crate::config::RulesConfig;
use crate::domain::entity::Direction;
use crate::domain::maze::Maze;
use super::event::GameEvent;
use super::scores::{StoreLink, StoreOp, StoreReply};
use super::state::GameState;
use super::step::{self, Resolution};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Idle,
    Running,
    GameOver,
}

// ══════════════════════════════════════════════════════════════
// Frame scheduling
// ══════════════════════════════════════════════════════════════

pub trait FrameScheduler {
    /// Ask for one more frame.
    fn schedule_next_frame(&mut self);

    /// True once per scheduled frame, when it is time to run it.
    fn frame_due(&mut self) -> bool;
}

/// Wall-clock scheduler: a frame is due `interval` after it was requested.
pub struct FrameClock {
    interval: Duration,
    next: Option<Instant>,
}

impl FrameClock {
    pub fn new(interval: Duration) -> Self {
        FrameClock { interval, next: None }
    }
}

impl FrameScheduler for FrameClock {
    fn schedule_next_frame(&mut self) {
        self.next = Some(Instant::now() + self.interval);
    }

    fn frame_due(&mut self) -> bool {
        match self.next {
            Some(at) if Instant::now() >= at => {
                self.next = None;
                true
            }
            _ => false,
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Controller
// ══════════════════════════════════════════════════════════════

pub struct Controller<S: FrameScheduler> {
    state: GameState,
    phase: Phase,
    scheduler: S,
    store: StoreLink,
    leaderboard: Vec<u32>,
    leaderboard_stale: bool,
    events: Vec<GameEvent>,
    frames: u64,
}

impl<S: FrameScheduler> Controller<S> {
    /// Idle controller. Asks the store for the leaderboard right away so the
    /// idle screen has something to show.
    pub fn new(maze: Maze, rules: RulesConfig, scheduler: S, store: StoreLink) -> Self {
        let mut state = GameState::new(maze, rules);
        state.running = false;
        store.request_leaderboard();
        Controller {
            state,
            phase: Phase::Idle,
            scheduler,
            store,
            leaderboard: vec![],
            leaderboard_stale: false,
            events: vec![],
            frames: 0,
        }
    }

    // ── Accessors ──

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Leaderboard exactly as the store last returned it.
    pub fn leaderboard(&self) -> &[u32] {
        &self.leaderboard
    }

    /// The last fetch failed; `leaderboard()` is older than it should be.
    pub fn leaderboard_stale(&self) -> bool {
        self.leaderboard_stale
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Hand everything that happened since the last call to presentation.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Transitions ──

    /// Idle → Running. Returns false (and does nothing) in any other phase.
    pub fn start(&mut self) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        self.state.reset();
        self.state.running = true;
        self.set_phase(Phase::Running);
        self.events.push(GameEvent::ScoreChanged(self.state.score));
        self.events.push(GameEvent::LivesChanged(self.state.lives));
        self.store.request_leaderboard();
        self.scheduler.schedule_next_frame();
        tracing::info!(lives = self.state.lives, "session started");
        true
    }

    /// One frame. Returns true when the caller should draw; false means the
    /// session is not running and no further frame was requested.
    pub fn tick(&mut self) -> bool {
        if !self.state.running {
            return false;
        }
        self.frames += 1;
        self.scheduler.schedule_next_frame();
        true
    }

    /// Run `tick()` if the scheduler says a frame is due.
    pub fn poll_frame(&mut self) -> bool {
        self.scheduler.frame_due() && self.tick()
    }

    /// Apply one directional input. Ignored unless a session is running.
    pub fn input(&mut self, dir: Direction) -> Option<Resolution> {
        if !self.state.running {
            tracing::trace!(?dir, "input ignored, no session running");
            return None;
        }
        let res = step::resolve_move(&mut self.state, dir, &mut self.events);
        tracing::debug!(?dir, outcome = ?res.outcome, lives = self.state.lives, score = self.state.score, "move");
        if res.session_over {
            self.finish_session();
        }
        Some(res)
    }

    /// Throw away the running session and begin a fresh one. Nothing is
    /// submitted for the abandoned session.
    pub fn restart(&mut self) -> bool {
        if !self.state.running {
            return false;
        }
        self.state.reset();
        self.events.push(GameEvent::ScoreChanged(self.state.score));
        self.events.push(GameEvent::LivesChanged(self.state.lives));
        tracing::info!("session restarted");
        true
    }

    // ── Game over ──

    /// The whole game-over sequence. Each step is its own function.
    fn finish_session(&mut self) {
        let score = self.state.score;
        self.halt();
        self.announce(score);
        self.report(score);
        self.reset_session();
        self.refresh_leaderboard();
        self.set_phase(Phase::Idle);
    }

    fn halt(&mut self) {
        self.state.running = false;
        self.set_phase(Phase::GameOver);
    }

    fn announce(&mut self, score: u32) {
        tracing::info!(score, "game over");
        self.events.push(GameEvent::GameOver { score });
    }

    fn report(&mut self, score: u32) {
        self.store.submit(score);
    }

    fn reset_session(&mut self) {
        self.state.reset();
        self.events.push(GameEvent::ScoreChanged(self.state.score));
        self.events.push(GameEvent::LivesChanged(self.state.lives));
    }

    fn refresh_leaderboard(&mut self) {
        self.store.request_leaderboard();
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            self.phase = phase;
            self.events.push(GameEvent::PhaseChanged(phase));
        }
    }

    // ── Store replies ──

    /// Apply whatever the store has answered so far. Never blocks.
    pub fn pump_store(&mut self) {
        for reply in self.store.poll() {
            match reply {
                StoreReply::Leaderboard(board) => {
                    self.leaderboard = board;
                    self.leaderboard_stale = false;
                    self.events.push(GameEvent::LeaderboardUpdated);
                }
                StoreReply::Submitted(score) => {
                    tracing::debug!(score, "store confirmed submission");
                }
                StoreReply::Failed(StoreOp::FetchLeaderboard, e) => {
                    tracing::warn!(error = %e, "leaderboard fetch failed");
                    self.leaderboard_stale = true;
                    self.events.push(GameEvent::LeaderboardUpdated);
                }
                StoreReply::Failed(StoreOp::Submit, e) => {
                    tracing::warn!(error = %e, "score submission failed");
                }
            }
        }
    }

    /// Wait (up to `timeout`) for the store to finish everything queued,
    /// then apply the replies.
    pub fn settle_store(&mut self, timeout: Duration) -> bool {
        let settled = self.store.settle(timeout);
        if !settled {
            tracing::warn!(?timeout, "score store did not settle in time");
        }
        self.pump_store();
        settled
    }
}
