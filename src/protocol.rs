// Message types shared between the TUI, the orchestrator, and network tasks.
//
// Network task completions (`SyncEvent`, the search/save variants of
// `ApiEvent`) carry the generation counter they were issued under so the
// orchestrator can discard completions from superseded requests.

use crate::squad::persist::SquadDoc;
use crate::squad::roster::{Player, Slot};
use crate::squad::state::{Formation, SquadStats};

// ---------------------------------------------------------------------------
// TUI -> orchestrator
// ---------------------------------------------------------------------------

/// A user action forwarded from the TUI to the app orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// Drop a player onto a specific slot (overwrites).
    PlaceAt { slot: usize, player: Player },
    /// The search panel's "add": first empty slot wins.
    AddToFirstEmpty(Player),
    ClearSlot(usize),
    NewSquad,
    SetSquadName(String),
    SetFormation(Formation),
    SaveSquad,
    RefreshSquadList,
    /// Load a squad by its persisted identifier (from the picker).
    LoadSquad(String),
    /// Search text changed; empty text requests the browse set.
    SearchInput(String),
    SeedSamplePlayers,
    Quit,
}

// ---------------------------------------------------------------------------
// Enrichment task -> orchestrator
// ---------------------------------------------------------------------------

/// Completion of an enrichment (calc) request.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Completed {
        stats: SquadStats,
        players: Option<Vec<Option<Player>>>,
        generation: u64,
    },
    Failed {
        message: String,
        generation: u64,
    },
}

impl SyncEvent {
    pub fn generation(&self) -> u64 {
        match self {
            SyncEvent::Completed { generation, .. } => *generation,
            SyncEvent::Failed { generation, .. } => *generation,
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog / persistence tasks -> orchestrator
// ---------------------------------------------------------------------------

/// Completion of a catalog or persistence request.
#[derive(Debug, Clone)]
pub enum ApiEvent {
    SearchResults { players: Vec<Player>, generation: u64 },
    SearchFailed { message: String, generation: u64 },
    SquadSaved { id: String, generation: u64 },
    SquadSaveFailed { message: String, generation: u64 },
    SquadList { squads: Vec<SquadDoc> },
    SquadListFailed { message: String },
    Seeded,
    SeedFailed { message: String },
}

// ---------------------------------------------------------------------------
// Orchestrator -> TUI
// ---------------------------------------------------------------------------

/// Whether an enrichment request is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStatus {
    #[default]
    Idle,
    Pending,
}

/// Picker row for a saved squad.
#[derive(Debug, Clone, PartialEq)]
pub struct SquadSummary {
    pub id: String,
    pub name: String,
    pub formation: String,
}

/// Full render state pushed to the TUI after anything changes.
#[derive(Debug, Clone)]
pub struct AppSnapshot {
    pub squad_name: String,
    pub formation: Formation,
    pub persisted_id: Option<String>,
    pub slots: Vec<Slot>,
    pub stats: SquadStats,
    pub sync_status: SyncStatus,
    pub search_results: Vec<Player>,
    pub search_loading: bool,
    pub squads: Vec<SquadSummary>,
}

/// An update pushed from the orchestrator to the TUI render loop.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    Snapshot(Box<AppSnapshot>),
    /// User-visible notice line (save succeeded/failed, etc.). Ambient sync
    /// failures are logged, not surfaced here.
    Notice(String),
}
