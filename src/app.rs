// Application state and orchestration logic.
//
// The central event loop that coordinates user commands from the TUI,
// enrichment (calc) completions, and catalog/persistence completions. All
// mutable squad state lives here and is only touched between awaits, so
// every mutation and every merge is atomic with respect to the others.
//
// Network work runs in spawned tasks that report back over mpsc channels.
// Each task carries the generation counter it was issued under; the
// handlers discard completions whose generation is no longer current, so a
// response for a superseded roster key or search text can never clobber
// newer state. Superseded tasks are additionally aborted outright.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::BackendClient;
use crate::config::Config;
use crate::protocol::{
    ApiEvent, AppSnapshot, SquadSummary, SyncEvent, SyncStatus, UiUpdate, UserCommand,
};
use crate::squad::persist::{self, SquadDoc};
use crate::squad::roster::{Player, RequestKey};
use crate::squad::state::SquadState;

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub squad: SquadState,
    /// Backend client, shared with spawned tasks.
    pub api: Arc<BackendClient>,

    // --- stats sync ---
    /// The request key of the most recently issued enrichment request.
    /// Mutations that leave the key unchanged (re-placing the same player,
    /// clearing an already-empty slot, renames) never re-trigger a sync.
    pub last_issued_key: Option<RequestKey>,
    /// Monotonically increasing counter identifying the current enrichment
    /// request. Events from stale generations are discarded in
    /// `handle_sync_event`.
    pub sync_generation: u64,
    pub sync_status: SyncStatus,
    pub current_sync_task: Option<JoinHandle<()>>,
    pub sync_tx: mpsc::Sender<SyncEvent>,

    // --- search ---
    pub search_text: String,
    pub search_results: Vec<Player>,
    pub search_loading: bool,
    pub search_generation: u64,
    pub current_search_task: Option<JoinHandle<()>>,

    // --- persistence ---
    pub save_generation: u64,
    pub save_in_flight: bool,
    pub current_save_task: Option<JoinHandle<()>>,
    pub current_list_task: Option<JoinHandle<()>>,
    pub squad_list: Vec<SquadDoc>,

    pub current_seed_task: Option<JoinHandle<()>>,
    /// Sender for catalog/persistence events; spawned tasks use clones.
    pub api_tx: mpsc::Sender<ApiEvent>,
}

impl AppState {
    pub fn new(
        config: Config,
        api: BackendClient,
        sync_tx: mpsc::Sender<SyncEvent>,
        api_tx: mpsc::Sender<ApiEvent>,
    ) -> Self {
        AppState {
            config,
            squad: SquadState::new(),
            api: Arc::new(api),
            last_issued_key: None,
            sync_generation: 0,
            sync_status: SyncStatus::Idle,
            current_sync_task: None,
            sync_tx,
            search_text: String::new(),
            search_results: Vec::new(),
            search_loading: false,
            search_generation: 0,
            current_search_task: None,
            save_generation: 0,
            save_in_flight: false,
            current_save_task: None,
            current_list_task: None,
            squad_list: Vec::new(),
            current_seed_task: None,
            api_tx,
        }
    }

    /// Fire the startup requests: the browse search, the enrichment pass
    /// for the (empty) roster, and the saved-squad list.
    pub fn start_initial_requests(&mut self) {
        self.set_search_text(String::new());
        self.resync_if_needed();
        self.refresh_squad_list();
    }

    // -----------------------------------------------------------------------
    // Roster mutations (each re-derives the request key afterwards)
    // -----------------------------------------------------------------------

    /// Drop a player onto a specific slot (last-write-wins).
    pub fn place_player(&mut self, slot: usize, player: Player) {
        self.squad.place(slot, player);
        self.resync_if_needed();
    }

    /// Place into the first empty slot; a full roster is a no-op.
    pub fn add_to_first_empty(&mut self, player: Player) -> Option<usize> {
        let placed = self.squad.place_first_empty(player);
        if placed.is_none() {
            debug!("roster full; add ignored");
        }
        self.resync_if_needed();
        placed
    }

    pub fn clear_slot(&mut self, slot: usize) {
        self.squad.clear_slot(slot);
        self.resync_if_needed();
    }

    /// Start a fresh, unsaved squad. An in-flight save belongs to the old
    /// squad and is cancelled so a late create acknowledgement cannot attach
    /// its id to the new one.
    pub fn new_squad(&mut self) {
        self.cancel_save_task();
        self.squad.reset();
        self.resync_if_needed();
    }

    /// Load a saved squad from the fetched list by id. The roster becomes
    /// identifier-only stubs; the enrichment pass triggered by the key
    /// change resolves them into full records.
    pub fn load_squad(&mut self, id: &str) -> bool {
        let Some(doc) = self.squad_list.iter().find(|d| d.id == id).cloned() else {
            warn!(id, "load requested for unknown squad");
            return false;
        };
        self.cancel_save_task();
        self.squad.metadata = persist::metadata_from_document(&doc);
        self.squad.replace_all(persist::slots_from_document(&doc));
        self.squad.stats = Default::default();
        info!(id, name = %self.squad.metadata.name, "squad loaded, awaiting enrichment");
        self.resync_if_needed();
        true
    }

    // -----------------------------------------------------------------------
    // Stats sync controller
    // -----------------------------------------------------------------------

    /// Derive the request key and, only if it differs from the last issued
    /// one, cancel any in-flight enrichment request and issue a new one.
    pub fn resync_if_needed(&mut self) {
        let key = self.squad.request_key();
        if self.last_issued_key.as_ref() == Some(&key) {
            debug!("request key unchanged; enrichment not re-issued");
            return;
        }

        self.cancel_sync_task();
        self.sync_generation += 1;
        let generation = self.sync_generation;
        self.sync_status = SyncStatus::Pending;

        let api = Arc::clone(&self.api);
        let tx = self.sync_tx.clone();
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            match api.calc_squad(&task_key).await {
                Ok(response) => {
                    let _ = tx
                        .send(SyncEvent::Completed {
                            stats: response.stats,
                            players: response.players,
                            generation,
                        })
                        .await;
                }
                Err(e) => {
                    let _ = tx
                        .send(SyncEvent::Failed {
                            message: format!("{e:#}"),
                            generation,
                        })
                        .await;
                }
            }
        });

        self.current_sync_task = Some(handle);
        self.last_issued_key = Some(key);
        debug!(generation, "enrichment request issued");
    }

    pub fn cancel_sync_task(&mut self) {
        if let Some(handle) = self.current_sync_task.take() {
            handle.abort();
            debug!("cancelled in-flight enrichment request");
        }
    }

    /// Apply an enrichment completion. Returns whether state changed (stale
    /// generations change nothing).
    pub fn handle_sync_event(&mut self, event: SyncEvent) -> bool {
        let generation = event.generation();
        if generation != self.sync_generation {
            debug!(
                generation,
                current = self.sync_generation,
                "discarding stale enrichment completion"
            );
            return false;
        }

        match event {
            SyncEvent::Completed { stats, players, .. } => {
                self.squad.merge_enrichment(stats, players);
                self.sync_status = SyncStatus::Idle;
                self.current_sync_task = None;
                true
            }
            SyncEvent::Failed { message, .. } => {
                // Non-fatal: stats stay at last known good, roster untouched.
                // The next key change re-issues naturally; no retry here.
                warn!("enrichment request failed: {message}");
                self.sync_status = SyncStatus::Idle;
                self.current_sync_task = None;
                true
            }
        }
    }

    // -----------------------------------------------------------------------
    // Search session
    // -----------------------------------------------------------------------

    /// Record new search text and issue the (debounced) catalog query,
    /// superseding any in-flight one. Empty text is a valid browse query.
    pub fn set_search_text(&mut self, text: String) {
        self.cancel_search_task();
        self.search_generation += 1;
        let generation = self.search_generation;
        self.search_text = text.clone();
        self.search_loading = true;

        let api = Arc::clone(&self.api);
        let tx = self.api_tx.clone();
        let debounce = Duration::from_millis(self.config.search.debounce_ms);
        let handle = tokio::spawn(async move {
            // Debounce inside the task: if another keystroke lands before the
            // pause elapses, this task is aborted and never issues the fetch.
            tokio::time::sleep(debounce).await;
            match api.search_players(&text).await {
                Ok(players) => {
                    let _ = tx.send(ApiEvent::SearchResults { players, generation }).await;
                }
                Err(e) => {
                    let _ = tx
                        .send(ApiEvent::SearchFailed {
                            message: format!("{e:#}"),
                            generation,
                        })
                        .await;
                }
            }
        });
        self.current_search_task = Some(handle);
    }

    pub fn cancel_search_task(&mut self) {
        if let Some(handle) = self.current_search_task.take() {
            handle.abort();
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Save the current squad: create when it has no persisted id, update
    /// in place when it does. Returns `false` (nothing spawned) when a save
    /// is already in flight.
    pub fn save_squad(&mut self) -> bool {
        if self.save_in_flight {
            debug!("save already in flight; refusing");
            return false;
        }

        let payload = persist::build_save_payload(&self.squad.metadata, self.squad.roster());
        self.save_generation += 1;
        let generation = self.save_generation;
        self.save_in_flight = true;

        let api = Arc::clone(&self.api);
        let tx = self.api_tx.clone();
        let persisted_id = self.squad.metadata.persisted_id.clone();
        let handle = tokio::spawn(async move {
            let result = match &persisted_id {
                Some(id) => api.update_squad(id, &payload).await.map(|()| id.clone()),
                None => api.create_squad(&payload).await,
            };
            match result {
                Ok(id) => {
                    let _ = tx.send(ApiEvent::SquadSaved { id, generation }).await;
                }
                Err(e) => {
                    let _ = tx
                        .send(ApiEvent::SquadSaveFailed {
                            message: format!("{e:#}"),
                            generation,
                        })
                        .await;
                }
            }
        });
        self.current_save_task = Some(handle);
        true
    }

    /// Abort an in-flight save and bump the generation so a completion that
    /// already made it into the channel is discarded too.
    pub fn cancel_save_task(&mut self) {
        if let Some(handle) = self.current_save_task.take() {
            handle.abort();
            self.save_generation += 1;
            self.save_in_flight = false;
            debug!("cancelled in-flight save");
        }
    }

    pub fn refresh_squad_list(&mut self) {
        if let Some(handle) = self.current_list_task.take() {
            handle.abort();
        }
        let api = Arc::clone(&self.api);
        let tx = self.api_tx.clone();
        let handle = tokio::spawn(async move {
            match api.list_squads().await {
                Ok(squads) => {
                    let _ = tx.send(ApiEvent::SquadList { squads }).await;
                }
                Err(e) => {
                    let _ = tx
                        .send(ApiEvent::SquadListFailed {
                            message: format!("{e:#}"),
                        })
                        .await;
                }
            }
        });
        self.current_list_task = Some(handle);
    }

    pub fn seed_players(&mut self) {
        if let Some(handle) = self.current_seed_task.take() {
            handle.abort();
        }
        let api = Arc::clone(&self.api);
        let tx = self.api_tx.clone();
        let handle = tokio::spawn(async move {
            match api.seed_players().await {
                Ok(()) => {
                    let _ = tx.send(ApiEvent::Seeded).await;
                }
                Err(e) => {
                    let _ = tx
                        .send(ApiEvent::SeedFailed {
                            message: format!("{e:#}"),
                        })
                        .await;
                }
            }
        });
        self.current_seed_task = Some(handle);
    }

    /// Apply a catalog/persistence completion. Returns an optional
    /// user-visible notice; ambient failures only log.
    pub fn handle_api_event(&mut self, event: ApiEvent) -> Option<String> {
        match event {
            ApiEvent::SearchResults { players, generation } => {
                if generation != self.search_generation {
                    debug!(
                        generation,
                        current = self.search_generation,
                        "discarding stale search results"
                    );
                    return None;
                }
                self.search_results = players;
                self.search_loading = false;
                self.current_search_task = None;
                None
            }
            ApiEvent::SearchFailed { message, generation } => {
                if generation != self.search_generation {
                    return None;
                }
                // Keep the previous result list on failure.
                warn!("player search failed: {message}");
                self.search_loading = false;
                self.current_search_task = None;
                None
            }
            ApiEvent::SquadSaved { id, generation } => {
                if generation != self.save_generation {
                    debug!(
                        generation,
                        current = self.save_generation,
                        "discarding stale save acknowledgement"
                    );
                    return None;
                }
                self.save_in_flight = false;
                self.current_save_task = None;
                // First save captures the id; subsequent saves update in place.
                self.squad.metadata.persisted_id = Some(id.clone());
                info!(id, "squad saved");
                self.refresh_squad_list();
                Some(format!("Saved \"{}\"", self.squad.metadata.name))
            }
            ApiEvent::SquadSaveFailed { message, generation } => {
                if generation != self.save_generation {
                    return None;
                }
                self.save_in_flight = false;
                self.current_save_task = None;
                warn!("squad save failed: {message}");
                Some(format!("Save failed: {message}"))
            }
            ApiEvent::SquadList { squads } => {
                self.squad_list = squads;
                self.current_list_task = None;
                None
            }
            ApiEvent::SquadListFailed { message } => {
                warn!("squad list fetch failed: {message}");
                self.current_list_task = None;
                Some(format!("Could not fetch saved squads: {message}"))
            }
            ApiEvent::Seeded => {
                info!("sample players seeded");
                // Re-run the current query so the new catalog shows up.
                self.set_search_text(self.search_text.clone());
                Some("Sample players loaded".to_string())
            }
            ApiEvent::SeedFailed { message } => {
                warn!("seed request failed: {message}");
                Some(format!("Seeding failed: {message}"))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    pub fn build_snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            squad_name: self.squad.metadata.name.clone(),
            formation: self.squad.metadata.formation,
            persisted_id: self.squad.metadata.persisted_id.clone(),
            slots: self.squad.roster().slots().to_vec(),
            stats: self.squad.stats,
            sync_status: self.sync_status,
            search_results: self.search_results.clone(),
            search_loading: self.search_loading,
            squads: self
                .squad_list
                .iter()
                .map(|d| SquadSummary {
                    id: d.id.clone(),
                    name: d.name.clone(),
                    formation: d.formation.clone(),
                })
                .collect(),
        }
    }

    /// Abort every outstanding network task (teardown).
    pub fn cancel_all_tasks(&mut self) {
        self.cancel_sync_task();
        self.cancel_search_task();
        self.cancel_save_task();
        if let Some(handle) = self.current_list_task.take() {
            handle.abort();
        }
        if let Some(handle) = self.current_seed_task.take() {
            handle.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens on three channels using `tokio::select!`:
/// 1. User commands from the TUI
/// 2. Enrichment completions
/// 3. Catalog/persistence completions
///
/// Pushes UI updates through `ui_tx` for the TUI render loop.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut sync_rx: mpsc::Receiver<SyncEvent>,
    mut api_rx: mpsc::Receiver<ApiEvent>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("application event loop started");

    state.start_initial_requests();
    push_snapshot(&state, &ui_tx).await;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("command channel closed, shutting down");
                        break;
                    }
                }
            }

            event = sync_rx.recv() => {
                match event {
                    Some(event) => {
                        if state.handle_sync_event(event) {
                            push_snapshot(&state, &ui_tx).await;
                        }
                    }
                    None => {
                        info!("sync channel closed, shutting down");
                        break;
                    }
                }
            }

            event = api_rx.recv() => {
                match event {
                    Some(event) => {
                        if let Some(notice) = state.handle_api_event(event) {
                            let _ = ui_tx.send(UiUpdate::Notice(notice)).await;
                        }
                        push_snapshot(&state, &ui_tx).await;
                    }
                    None => {
                        info!("api channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    // Cleanup: nothing may mutate after the caller stops caring.
    state.cancel_all_tasks();
    info!("application event loop exiting");
    Ok(())
}

/// Handle a single user command and push the resulting snapshot.
async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::PlaceAt { slot, player } => state.place_player(slot, player),
        UserCommand::AddToFirstEmpty(player) => {
            state.add_to_first_empty(player);
        }
        UserCommand::ClearSlot(slot) => state.clear_slot(slot),
        UserCommand::NewSquad => state.new_squad(),
        UserCommand::SetSquadName(name) => state.squad.metadata.name = name,
        UserCommand::SetFormation(formation) => state.squad.metadata.formation = formation,
        UserCommand::SaveSquad => {
            if !state.save_squad() {
                let _ = ui_tx
                    .send(UiUpdate::Notice("A save is already in progress".to_string()))
                    .await;
            }
        }
        UserCommand::RefreshSquadList => state.refresh_squad_list(),
        UserCommand::LoadSquad(id) => {
            if !state.load_squad(&id) {
                let _ = ui_tx
                    .send(UiUpdate::Notice("Squad not found in the list".to_string()))
                    .await;
            }
        }
        UserCommand::SearchInput(text) => state.set_search_text(text),
        UserCommand::SeedSamplePlayers => state.seed_players(),
        // Quit is intercepted by the run loop before dispatch.
        UserCommand::Quit => {}
    }
    push_snapshot(state, ui_tx).await;
}

async fn push_snapshot(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let _ = ui_tx
        .send(UiUpdate::Snapshot(Box::new(state.build_snapshot())))
        .await;
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::squad::persist::SquadPlayerEntry;
    use crate::squad::roster::{Slot, SQUAD_SIZE};
    use crate::squad::state::{SquadStats, DEFAULT_SQUAD_NAME};

    /// State wired to an unreachable backend: spawned tasks fail fast and
    /// their events land in channels the tests own (and mostly ignore --
    /// events are injected by hand to keep the tests deterministic).
    fn make_state() -> (
        AppState,
        mpsc::Receiver<SyncEvent>,
        mpsc::Receiver<ApiEvent>,
    ) {
        let mut config = Config::default();
        config.backend.base_url = "http://127.0.0.1:9".to_string();
        config.search.debounce_ms = 1;
        let (sync_tx, sync_rx) = mpsc::channel(64);
        let (api_tx, api_rx) = mpsc::channel(64);
        let client = BackendClient::new(&config.backend.base_url);
        (AppState::new(config, client, sync_tx, api_tx), sync_rx, api_rx)
    }

    fn player(id: &str) -> Player {
        Player {
            id: id.to_string(),
            name: format!("Player {id}"),
            club: "FC Test".to_string(),
            nation: "Testland".to_string(),
            position: "ST".to_string(),
            rating: 80,
            img: None,
        }
    }

    // -- Sync triggering --

    #[tokio::test]
    async fn roster_change_bumps_sync_generation() {
        let (mut state, _sync_rx, _api_rx) = make_state();
        assert_eq!(state.sync_generation, 0);

        state.place_player(0, player("p1"));
        assert_eq!(state.sync_generation, 1);
        assert_eq!(state.sync_status, SyncStatus::Pending);

        state.place_player(1, player("p2"));
        assert_eq!(state.sync_generation, 2);
    }

    #[tokio::test]
    async fn key_preserving_mutations_do_not_resync() {
        let (mut state, _sync_rx, _api_rx) = make_state();
        state.place_player(0, player("p1"));
        let generation = state.sync_generation;

        // Same identity, different record data: key unchanged.
        let mut refreshed = player("p1");
        refreshed.rating = 93;
        state.place_player(0, refreshed);
        assert_eq!(state.sync_generation, generation);

        // Clearing an already-empty slot: key unchanged.
        state.clear_slot(5);
        assert_eq!(state.sync_generation, generation);

        // Renames and formation changes never touch the key.
        state.squad.metadata.name = "Renamed".to_string();
        assert_eq!(state.sync_generation, generation);
    }

    #[tokio::test]
    async fn stale_sync_completion_mutates_nothing() {
        let (mut state, _sync_rx, _api_rx) = make_state();
        state.place_player(0, player("p1"));
        let stale_generation = state.sync_generation;
        // A newer edit supersedes the in-flight request.
        state.place_player(1, player("p2"));

        let mut players = vec![None; SQUAD_SIZE];
        players[0] = Some(player("intruder"));
        let applied = state.handle_sync_event(SyncEvent::Completed {
            stats: SquadStats {
                players: 9,
                avg_rating: 99.0,
                chemistry: 33,
            },
            players: Some(players),
            generation: stale_generation,
        });

        assert!(!applied);
        assert_eq!(state.squad.stats, SquadStats::default());
        assert_eq!(state.squad.roster().slots()[0].player_id(), Some("p1"));
        assert_eq!(state.sync_status, SyncStatus::Pending);
    }

    #[tokio::test]
    async fn current_sync_completion_merges_and_goes_idle() {
        let (mut state, _sync_rx, _api_rx) = make_state();
        state.place_player(3, player("p3"));

        let stats = SquadStats {
            players: 1,
            avg_rating: 80.0,
            chemistry: 3,
        };
        let mut players = vec![None; SQUAD_SIZE];
        let mut enriched = player("p3");
        enriched.club = "Enriched FC".to_string();
        players[3] = Some(enriched);

        let applied = state.handle_sync_event(SyncEvent::Completed {
            stats,
            players: Some(players),
            generation: state.sync_generation,
        });

        assert!(applied);
        assert_eq!(state.squad.stats, stats);
        assert_eq!(
            state.squad.roster().slots()[3].player().map(|p| p.club.as_str()),
            Some("Enriched FC")
        );
        assert_eq!(state.sync_status, SyncStatus::Idle);
    }

    #[tokio::test]
    async fn sync_failure_keeps_last_known_stats() {
        let (mut state, _sync_rx, _api_rx) = make_state();
        state.place_player(0, player("p1"));
        let good = SquadStats {
            players: 1,
            avg_rating: 80.0,
            chemistry: 2,
        };
        state.handle_sync_event(SyncEvent::Completed {
            stats: good,
            players: None,
            generation: state.sync_generation,
        });

        state.place_player(1, player("p2"));
        state.handle_sync_event(SyncEvent::Failed {
            message: "backend down".to_string(),
            generation: state.sync_generation,
        });

        assert_eq!(state.squad.stats, good);
        assert_eq!(state.sync_status, SyncStatus::Idle);
        assert_eq!(state.squad.roster().filled_count(), 2);
    }

    // -- Search --

    #[tokio::test]
    async fn rapid_search_input_only_applies_the_latest_generation() {
        let (mut state, _sync_rx, _api_rx) = make_state();
        state.set_search_text("m".to_string());
        let first = state.search_generation;
        state.set_search_text("me".to_string());
        state.set_search_text("mes".to_string());
        let latest = state.search_generation;
        assert_eq!(latest, first + 2);

        // A late completion for "m" must not overwrite newer results.
        state.handle_api_event(ApiEvent::SearchResults {
            players: vec![player("stale")],
            generation: first,
        });
        assert!(state.search_results.is_empty());
        assert!(state.search_loading);

        state.handle_api_event(ApiEvent::SearchResults {
            players: vec![player("messi")],
            generation: latest,
        });
        assert_eq!(state.search_results.len(), 1);
        assert_eq!(state.search_results[0].id, "messi");
        assert!(!state.search_loading);
    }

    #[tokio::test]
    async fn search_failure_keeps_previous_results() {
        let (mut state, _sync_rx, _api_rx) = make_state();
        state.set_search_text("mes".to_string());
        state.handle_api_event(ApiEvent::SearchResults {
            players: vec![player("messi")],
            generation: state.search_generation,
        });

        state.set_search_text("mess".to_string());
        let notice = state.handle_api_event(ApiEvent::SearchFailed {
            message: "timeout".to_string(),
            generation: state.search_generation,
        });

        assert_eq!(notice, None, "ambient search failures are silent");
        assert_eq!(state.search_results[0].id, "messi");
        assert!(!state.search_loading);
    }

    // -- Persistence --

    #[tokio::test]
    async fn first_save_captures_the_persisted_id() {
        let (mut state, _sync_rx, _api_rx) = make_state();
        assert!(state.save_squad());
        assert!(state.save_in_flight);

        let notice = state.handle_api_event(ApiEvent::SquadSaved {
            id: "abc123".to_string(),
            generation: state.save_generation,
        });

        assert_eq!(state.squad.metadata.persisted_id.as_deref(), Some("abc123"));
        assert!(!state.save_in_flight);
        assert!(notice.is_some());

        // The next save is accepted again (and would target the update path).
        assert!(state.save_squad());
    }

    #[tokio::test]
    async fn save_is_refused_while_one_is_in_flight() {
        let (mut state, _sync_rx, _api_rx) = make_state();
        assert!(state.save_squad());
        assert!(!state.save_squad());
    }

    #[tokio::test]
    async fn cancelled_save_acknowledgement_is_discarded() {
        let (mut state, _sync_rx, _api_rx) = make_state();
        state.save_squad();
        let stale_generation = state.save_generation;

        // Starting a new squad supersedes the save.
        state.new_squad();

        state.handle_api_event(ApiEvent::SquadSaved {
            id: "late".to_string(),
            generation: stale_generation,
        });
        assert_eq!(state.squad.metadata.persisted_id, None);
    }

    #[tokio::test]
    async fn save_failure_produces_a_notice() {
        let (mut state, _sync_rx, _api_rx) = make_state();
        state.save_squad();
        let notice = state.handle_api_event(ApiEvent::SquadSaveFailed {
            message: "500".to_string(),
            generation: state.save_generation,
        });
        assert!(notice.unwrap().contains("Save failed"));
        assert!(!state.save_in_flight);
    }

    #[tokio::test]
    async fn load_builds_a_stub_roster_and_triggers_enrichment() {
        let (mut state, _sync_rx, _api_rx) = make_state();
        state.squad_list = vec![SquadDoc {
            id: "s1".to_string(),
            name: "Loaded XI".to_string(),
            formation: "4-4-2".to_string(),
            players: vec![SquadPlayerEntry {
                slot: 2,
                player_id: "p9".to_string(),
            }],
        }];
        let generation = state.sync_generation;

        assert!(state.load_squad("s1"));
        let slots = state.squad.roster().slots();
        assert_eq!(slots[2], Slot::Stub { id: "p9".to_string() });
        assert_eq!(slots.iter().filter(|s| !s.is_empty()).count(), 1);
        assert_eq!(state.squad.metadata.persisted_id.as_deref(), Some("s1"));
        assert_eq!(state.squad.metadata.name, "Loaded XI");
        assert_eq!(state.sync_generation, generation + 1, "enrichment issued");

        assert!(!state.load_squad("unknown"));
    }

    #[tokio::test]
    async fn new_squad_resets_everything() {
        let (mut state, _sync_rx, _api_rx) = make_state();
        state.place_player(0, player("p1"));
        state.squad.metadata.persisted_id = Some("abc".to_string());
        state.squad.metadata.name = "Old".to_string();

        state.new_squad();
        assert_eq!(state.squad.metadata.name, DEFAULT_SQUAD_NAME);
        assert_eq!(state.squad.metadata.persisted_id, None);
        assert_eq!(state.squad.roster().filled_count(), 0);
    }

    #[tokio::test]
    async fn seeding_reissues_the_current_search() {
        let (mut state, _sync_rx, _api_rx) = make_state();
        state.set_search_text("haaland".to_string());
        let generation = state.search_generation;

        let notice = state.handle_api_event(ApiEvent::Seeded);
        assert!(notice.is_some());
        assert_eq!(state.search_generation, generation + 1);
        assert_eq!(state.search_text, "haaland");
        assert!(state.search_loading);
    }

    // -- Snapshots --

    #[tokio::test]
    async fn snapshot_reflects_state() {
        let (mut state, _sync_rx, _api_rx) = make_state();
        state.place_player(4, player("p4"));
        state.squad_list = vec![SquadDoc {
            id: "s1".to_string(),
            name: "Saved".to_string(),
            formation: "3-5-2".to_string(),
            players: vec![],
        }];

        let snapshot = state.build_snapshot();
        assert_eq!(snapshot.slots.len(), SQUAD_SIZE);
        assert_eq!(snapshot.slots[4].player_id(), Some("p4"));
        assert_eq!(snapshot.sync_status, SyncStatus::Pending);
        assert_eq!(snapshot.squads.len(), 1);
        assert_eq!(snapshot.squads[0].name, "Saved");
    }
}
