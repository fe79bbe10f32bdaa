// Wire mapping between squad state and the persistence collaborator.
//
// Converts roster snapshots to the save payload (occupied slots only, as
// {slot, player_id} pairs) and loaded squad documents back into stub-only
// rosters. The HTTP calls themselves live in `api`; the automatic
// enrichment pass afterwards resolves stubs into full records.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::roster::{Roster, Slot, SQUAD_SIZE};
use super::state::{Formation, SquadMetadata};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One occupied slot in a saved squad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquadPlayerEntry {
    pub slot: usize,
    pub player_id: String,
}

/// Request body for both create (`POST /api/squads`) and update
/// (`PUT /api/squads/{id}`).
#[derive(Debug, Clone, Serialize)]
pub struct SquadPayload {
    pub name: String,
    pub formation: String,
    pub players: Vec<SquadPlayerEntry>,
}

/// A saved squad as returned by `GET /api/squads`. The summary fields
/// (`id`, `name`, `formation`) drive the picker; `players` is consumed on
/// load. Missing fields deserialize to empty rather than failing the list.
#[derive(Debug, Clone, Deserialize)]
pub struct SquadDoc {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub formation: String,
    #[serde(default)]
    pub players: Vec<SquadPlayerEntry>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Build the save payload from current metadata and roster. Empty slots are
/// omitted entirely (not sent as nulls); stub slots still carry an
/// identifier and are saved like any occupied slot.
pub fn build_save_payload(metadata: &SquadMetadata, roster: &Roster) -> SquadPayload {
    let players = roster
        .slots()
        .iter()
        .enumerate()
        .filter_map(|(slot, entry)| {
            entry.player_id().map(|id| SquadPlayerEntry {
                slot,
                player_id: id.to_string(),
            })
        })
        .collect();

    SquadPayload {
        name: metadata.name.clone(),
        formation: metadata.formation.as_str().to_string(),
        players,
    }
}

/// Rebuild a roster from a loaded document: stubs at the listed slots,
/// empty everywhere else. Out-of-range slot entries are dropped (logged);
/// duplicate entries for a slot resolve last-write-wins, like `place`.
pub fn slots_from_document(doc: &SquadDoc) -> Vec<Slot> {
    let mut slots = vec![Slot::Empty; SQUAD_SIZE];
    for entry in &doc.players {
        if entry.slot >= SQUAD_SIZE {
            warn!(
                squad = %doc.id,
                slot = entry.slot,
                "ignoring out-of-range slot in saved squad"
            );
            continue;
        }
        slots[entry.slot] = Slot::Stub {
            id: entry.player_id.clone(),
        };
    }
    slots
}

/// Metadata for a just-loaded document. An unknown formation string falls
/// back to the default rather than failing the load.
pub fn metadata_from_document(doc: &SquadDoc) -> SquadMetadata {
    let formation = Formation::parse(&doc.formation).unwrap_or_else(|| {
        warn!(squad = %doc.id, formation = %doc.formation, "unknown formation; using default");
        Formation::default()
    });
    SquadMetadata {
        name: doc.name.clone(),
        formation,
        persisted_id: Some(doc.id.clone()),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::squad::roster::Player;

    fn player(id: &str) -> Player {
        Player {
            id: id.to_string(),
            name: id.to_string(),
            club: String::new(),
            nation: String::new(),
            position: "ST".to_string(),
            rating: 75,
            img: None,
        }
    }

    #[test]
    fn save_payload_lists_occupied_slots_only() {
        let mut roster = Roster::new();
        roster.place(0, player("gk"));
        roster.place(7, player("cm"));
        let meta = SquadMetadata {
            name: "First XI".to_string(),
            formation: Formation::F442,
            persisted_id: None,
        };

        let payload = build_save_payload(&meta, &roster);
        assert_eq!(payload.name, "First XI");
        assert_eq!(payload.formation, "4-4-2");
        assert_eq!(
            payload.players,
            vec![
                SquadPlayerEntry { slot: 0, player_id: "gk".into() },
                SquadPlayerEntry { slot: 7, player_id: "cm".into() },
            ]
        );
    }

    #[test]
    fn save_payload_includes_stub_slots() {
        let mut roster = Roster::new();
        let mut slots = vec![Slot::Empty; SQUAD_SIZE];
        slots[4] = Slot::Stub { id: "p4".into() };
        roster.replace_all(slots);

        let payload = build_save_payload(&SquadMetadata::default(), &roster);
        assert_eq!(
            payload.players,
            vec![SquadPlayerEntry { slot: 4, player_id: "p4".into() }]
        );
    }

    #[test]
    fn save_payload_serializes_without_nulls() {
        let payload = build_save_payload(&SquadMetadata::default(), &Roster::new());
        let json = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(json["players"], serde_json::json!([]));
    }

    #[test]
    fn loaded_document_becomes_stub_roster() {
        // A single entry at slot 2 yields empty everywhere except a stub at
        // index 2, before any enrichment.
        let doc = SquadDoc {
            id: "s1".to_string(),
            name: "Loaded".to_string(),
            formation: "4-3-3".to_string(),
            players: vec![SquadPlayerEntry { slot: 2, player_id: "p9".into() }],
        };

        let slots = slots_from_document(&doc);
        assert_eq!(slots.len(), SQUAD_SIZE);
        for (i, slot) in slots.iter().enumerate() {
            if i == 2 {
                assert_eq!(*slot, Slot::Stub { id: "p9".into() });
            } else {
                assert!(slot.is_empty(), "slot {i} should be empty");
            }
        }
    }

    #[test]
    fn out_of_range_entries_are_dropped() {
        let doc = SquadDoc {
            id: "s1".to_string(),
            name: String::new(),
            formation: String::new(),
            players: vec![
                SquadPlayerEntry { slot: 11, player_id: "bad".into() },
                SquadPlayerEntry { slot: 3, player_id: "ok".into() },
            ],
        };
        let slots = slots_from_document(&doc);
        assert_eq!(slots.iter().filter(|s| !s.is_empty()).count(), 1);
        assert_eq!(slots[3].player_id(), Some("ok"));
    }

    #[test]
    fn document_metadata_keeps_id_and_parses_formation() {
        let doc = SquadDoc {
            id: "abc123".to_string(),
            name: "Weekend League".to_string(),
            formation: "3-5-2".to_string(),
            players: vec![],
        };
        let meta = metadata_from_document(&doc);
        assert_eq!(meta.persisted_id.as_deref(), Some("abc123"));
        assert_eq!(meta.formation, Formation::F352);
        assert_eq!(meta.name, "Weekend League");
    }

    #[test]
    fn unknown_formation_falls_back_to_default() {
        let doc = SquadDoc {
            id: "abc".to_string(),
            name: String::new(),
            formation: "2-2-2-2-2".to_string(),
            players: vec![],
        };
        assert_eq!(metadata_from_document(&doc).formation, Formation::default());
    }

    #[test]
    fn squad_doc_tolerates_missing_fields() {
        let doc: SquadDoc = serde_json::from_str(r#"{"id": "only-id"}"#).expect("parse");
        assert_eq!(doc.id, "only-id");
        assert!(doc.players.is_empty());
        assert!(doc.name.is_empty());
    }
}
