// Squad state: metadata, roster, and server-derived statistics.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::roster::{Player, RequestKey, Roster, Slot, SQUAD_SIZE};

/// Placeholder name for a squad the user hasn't renamed yet.
pub const DEFAULT_SQUAD_NAME: &str = "Untitled XI";

// ---------------------------------------------------------------------------
// Formation
// ---------------------------------------------------------------------------

/// Supported formations. A closed list today, but incoming strings are not
/// validated beyond "known string": unknown values fall back to the default
/// at the parse site rather than failing a whole load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Formation {
    #[default]
    F433,
    F4231,
    F442,
    F352,
    F532,
}

impl Formation {
    pub const ALL: [Formation; 5] = [
        Formation::F433,
        Formation::F4231,
        Formation::F442,
        Formation::F352,
        Formation::F532,
    ];

    /// The wire/display string, e.g. `"4-3-3"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Formation::F433 => "4-3-3",
            Formation::F4231 => "4-2-3-1",
            Formation::F442 => "4-4-2",
            Formation::F352 => "3-5-2",
            Formation::F532 => "5-3-2",
        }
    }

    /// Parse a formation string. Returns `None` for unknown values; callers
    /// decide the fallback.
    pub fn parse(s: &str) -> Option<Formation> {
        Formation::ALL.iter().copied().find(|f| f.as_str() == s)
    }

    /// Slot counts per pitch row, goalkeeper row first. Rows always sum to
    /// the squad size; slot indices run sequentially through the rows.
    pub fn rows(self) -> &'static [usize] {
        match self {
            Formation::F433 => &[1, 4, 3, 3],
            Formation::F4231 => &[1, 4, 2, 3, 1],
            Formation::F442 => &[1, 4, 4, 2],
            Formation::F352 => &[1, 3, 5, 2],
            Formation::F532 => &[1, 5, 3, 2],
        }
    }

    /// The next formation in the cycle, for keyboard toggling.
    pub fn next(self) -> Formation {
        let idx = Formation::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Formation::ALL[(idx + 1) % Formation::ALL.len()]
    }
}

impl std::fmt::Display for Formation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SquadMetadata / SquadStats
// ---------------------------------------------------------------------------

/// User-editable squad metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SquadMetadata {
    pub name: String,
    pub formation: Formation,
    /// Backend identifier. `None` means "never saved" (the next save
    /// creates); `Some` means "update in place on save".
    pub persisted_id: Option<String>,
}

impl Default for SquadMetadata {
    fn default() -> Self {
        SquadMetadata {
            name: DEFAULT_SQUAD_NAME.to_string(),
            formation: Formation::default(),
            persisted_id: None,
        }
    }
}

/// Derived squad statistics. Never computed locally: always sourced
/// wholesale from the enrichment collaborator, and stale (all-zero) until
/// the first sync completes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SquadStats {
    /// Occupied slot count, 0-11.
    pub players: u32,
    pub avg_rating: f64,
    /// Chemistry score, 0-33.
    pub chemistry: u32,
}

// ---------------------------------------------------------------------------
// SquadState
// ---------------------------------------------------------------------------

/// The squad under construction: metadata, the 11-slot roster, and the
/// last server-computed statistics.
///
/// The roster is private so every mutation goes through the operations
/// below; nothing else in the crate touches slots directly.
#[derive(Debug, Clone, Default)]
pub struct SquadState {
    pub metadata: SquadMetadata,
    roster: Roster,
    pub stats: SquadStats,
}

impl SquadState {
    pub fn new() -> Self {
        SquadState::default()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn place(&mut self, index: usize, player: Player) -> bool {
        self.roster.place(index, player)
    }

    pub fn place_first_empty(&mut self, player: Player) -> Option<usize> {
        self.roster.place_first_empty(player)
    }

    pub fn clear_slot(&mut self, index: usize) -> bool {
        self.roster.clear(index)
    }

    pub fn replace_all(&mut self, slots: Vec<Slot>) {
        self.roster.replace_all(slots);
    }

    pub fn request_key(&self) -> RequestKey {
        self.roster.request_key()
    }

    /// Reset to a fresh unsaved squad: default metadata, empty roster,
    /// zeroed stats.
    pub fn reset(&mut self) {
        *self = SquadState::default();
    }

    /// Apply a successful enrichment response.
    ///
    /// Stats replace wholesale. For the per-slot array: a non-null entry
    /// replaces the slot with the full record; a null or missing entry
    /// retains the local slot untouched — absence of data is not evidence
    /// the slot should be emptied (the array may be short, or individual
    /// lookups may have failed). Entries beyond the squad size are ignored.
    ///
    /// The whole merge happens in one call on the event loop, so no
    /// half-applied state is ever observable.
    pub fn merge_enrichment(&mut self, stats: SquadStats, players: Option<Vec<Option<Player>>>) {
        self.stats = stats;

        let Some(list) = players else {
            return;
        };
        if list.len() != SQUAD_SIZE {
            warn!(
                len = list.len(),
                "enrichment player array has wrong length; merging what is there"
            );
        }
        for (index, entry) in list.into_iter().take(SQUAD_SIZE).enumerate() {
            if let Some(player) = entry {
                if let Some(local_id) = self.roster.slots()[index].player_id() {
                    if local_id != player.id {
                        warn!(
                            index,
                            local_id,
                            response_id = %player.id,
                            "enrichment returned a different player for this slot"
                        );
                    }
                }
                self.roster.place(index, player);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
