/// Events emitted by the game core.
/// The presentation layer consumes these for the banner line and sound.

use crate::domain::entity::Pos;
use super::lifecycle::Phase;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PhaseChanged(Phase),
    PickupConsumed { at: Pos },
    WallBumped { at: Pos },
    ScoreChanged(u32),
    LivesChanged(u32),
    /// The session ended with this score.
    GameOver { score: u32 },
    LeaderboardUpdated,
}
