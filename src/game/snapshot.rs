
use chess::Color;

use super::{GameOutcome, Phase};
use crate::history::BannedMove;
use crate::position::Position;

/// A reversible delta of everything a proposal can touch.
///
/// Taken before an optimistic local prediction and restored atomically if the
/// authoritative event log later disagrees. Restoring truncates the ledger
/// back to the recorded length, discarding only the predicted entries.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub(crate) position: Position,
    pub(crate) phase: Phase,
    pub(crate) banned: Option<BannedMove>,
    pub(crate) outcome: GameOutcome,
    pub(crate) draw_offer: Option<Color>,
    pub(crate) ledger_len: usize,
}
