// Roster: the 11 fixed squad slots and their occupancy.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Number of slots in a squad. Indices 0..SQUAD_SIZE are stable "where a
/// player sits" identifiers, independent of formation position labels.
pub const SQUAD_SIZE: usize = 11;

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A full player record as returned by the catalog or enrichment service.
///
/// Records are immutable once fetched: the roster only ever replaces whole
/// records, never individual fields. The `id` is an opaque identifier
/// round-tripped to the backend without interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub club: String,
    pub nation: String,
    pub position: String,
    pub rating: u32,
    /// Card image URL. Absent for players without artwork.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

/// One slot of the roster.
///
/// `Stub` holds an identifier-only reference pending enrichment (e.g. right
/// after loading a saved squad); the absence of full data is deliberately
/// distinct from `Empty` so that a missing enrichment entry is never misread
/// as "clear this slot".
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Slot {
    #[default]
    Empty,
    Stub {
        id: String,
    },
    Filled(Player),
}

impl Slot {
    /// The occupying player's identifier, whether stub or full.
    pub fn player_id(&self) -> Option<&str> {
        match self {
            Slot::Empty => None,
            Slot::Stub { id } => Some(id),
            Slot::Filled(player) => Some(&player.id),
        }
    }

    /// Whether the slot is unoccupied.
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    /// The full player record, if enrichment has resolved it.
    pub fn player(&self) -> Option<&Player> {
        match self {
            Slot::Filled(player) => Some(player),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// RequestKey
// ---------------------------------------------------------------------------

/// Identity-only fingerprint of a roster: the ordered sequence of 11
/// identifiers-or-none. Two rosters with equal keys are equivalent for
/// enrichment purposes even when stub-vs-full player data differs, so
/// re-fetching full records never spuriously retriggers a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestKey(Vec<Option<String>>);

impl RequestKey {
    /// The 11 identifier entries, in slot order.
    pub fn player_ids(&self) -> &[Option<String>] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// The ordered sequence of exactly 11 slots.
///
/// The slot vector is private so every mutation flows through the operations
/// below, which preserve the length-11 invariant unconditionally.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    slots: Vec<Slot>,
}

impl Default for Roster {
    fn default() -> Self {
        Roster::new()
    }
}

impl Roster {
    /// Create an all-empty roster.
    pub fn new() -> Self {
        Roster {
            slots: vec![Slot::Empty; SQUAD_SIZE],
        }
    }

    /// Overwrite the slot at `index` with `player`, last-write-wins.
    ///
    /// Overwriting an occupied slot is not an error. An out-of-range index
    /// is ignored (logged) and returns `false`.
    pub fn place(&mut self, index: usize, player: Player) -> bool {
        if index >= SQUAD_SIZE {
            warn!(index, "place ignored: slot index out of range");
            return false;
        }
        self.slots[index] = Slot::Filled(player);
        true
    }

    /// Place `player` into the first empty slot, scanning indices 0 through
    /// 10 in order. Returns the index used, or `None` (no mutation) when the
    /// roster is full.
    pub fn place_first_empty(&mut self, player: Player) -> Option<usize> {
        let index = self.slots.iter().position(Slot::is_empty)?;
        self.slots[index] = Slot::Filled(player);
        Some(index)
    }

    /// Set the slot at `index` to empty. Clearing an already-empty slot is a
    /// no-op. Returns whether the slot changed.
    pub fn clear(&mut self, index: usize) -> bool {
        if index >= SQUAD_SIZE {
            warn!(index, "clear ignored: slot index out of range");
            return false;
        }
        if self.slots[index].is_empty() {
            return false;
        }
        self.slots[index] = Slot::Empty;
        true
    }

    /// Wholesale slot replacement, used after a load or merge. Malformed
    /// input is repaired rather than rejected: short vectors are padded with
    /// empty slots and long ones truncated, so the length-11 invariant holds
    /// no matter what the source data looked like.
    pub fn replace_all(&mut self, mut slots: Vec<Slot>) {
        if slots.len() != SQUAD_SIZE {
            warn!(
                len = slots.len(),
                "replace_all with wrong slot count; padding/truncating to {SQUAD_SIZE}"
            );
            slots.resize(SQUAD_SIZE, Slot::Empty);
        }
        self.slots = slots;
    }

    /// Immutable copy for rendering and key derivation.
    pub fn snapshot(&self) -> Roster {
        self.clone()
    }

    /// The slots in order. Always exactly 11 entries.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Derive the identity-only request key from current occupancy.
    pub fn request_key(&self) -> RequestKey {
        RequestKey(
            self.slots
                .iter()
                .map(|slot| slot.player_id().map(str::to_string))
                .collect(),
        )
    }

    /// Number of occupied (stub or full) slots.
    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
