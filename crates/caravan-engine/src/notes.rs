//! Context notes: situational reminders items attach to rolls.

use caravan_core::document::CaravanDocument;
use caravan_core::item::{ItemData, ItemId};
use serde::Serialize;

use crate::buff_target::NOTE_ATTACK;
use crate::merge::Roster;

/// Notes one item contributes to a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteGroup {
    /// The item carrying the notes.
    pub item: ItemId,
    /// Its display name.
    pub item_name: String,
    /// Note texts, as written.
    pub notes: Vec<String>,
}

/// Legacy name for the attack note target.
const ATTACK_ALIAS: &str = "attacks.attack";

/// Notes of active caravan items matching `target`, grouped by item.
///
/// Travelers and wagons contribute their merged notes, so registry and
/// task notes are included. Items without a matching note are left out.
pub fn context_notes(doc: &CaravanDocument, roster: &Roster, target: &str) -> Vec<NoteGroup> {
    let target = if target == ATTACK_ALIAS {
        NOTE_ATTACK
    } else {
        target
    };

    let mut groups = Vec::new();
    for item in doc.active_module_items() {
        let common = match &item.data {
            ItemData::Traveler(t) => roster
                .traveler(item.id)
                .map(|m| &m.data().common)
                .unwrap_or(&t.common),
            ItemData::Wagon(w) => roster
                .wagon(item.id)
                .map(|m| &m.data().common)
                .unwrap_or(&w.common),
            ItemData::Equipment(e) => &e.common,
            ItemData::Feat(f) => &f.common,
            ItemData::Treasure(_) => continue,
        };
        let notes: Vec<String> = common
            .all_notes()
            .filter(|n| n.target == target)
            .map(|n| n.text.clone())
            .collect();
        if !notes.is_empty() {
            groups.push(NoteGroup {
                item: item.id,
                item_name: item.name.clone(),
                notes,
            });
        }
    }
    tracing::trace!(note_target = target, groups = groups.len(), "context notes collected");
    groups
}

/// Flatten note groups into single lines, splitting multi-line notes.
pub fn note_texts(groups: &[NoteGroup]) -> Vec<String> {
    groups
        .iter()
        .flat_map(|g| g.notes.iter())
        .flat_map(|note| note.split(['\n', '\r']))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buff_target::{NOTE_REST, NOTE_SECURITY};
    use crate::registry::Registries;
    use caravan_core::change::ContextNote;
    use caravan_core::item::{CaravanItem, Feat, ItemCommon, Traveler, Treasure};

    fn resolved(doc: &CaravanDocument) -> Roster {
        let mut roster = Roster::from_document(doc);
        roster.resolve(&Registries::default()).unwrap();
        roster
    }

    fn feat_with_note(target: &str, text: &str) -> ItemData {
        ItemData::Feat(Feat {
            common: ItemCommon {
                context_notes: vec![ContextNote::new(target, text)],
                ..ItemCommon::default()
            },
            ..Feat::default()
        })
    }

    #[test]
    fn registry_notes_come_through_merge() {
        let mut doc = CaravanDocument::default();
        doc.attach("Ysolde", ItemData::Traveler(Traveler::with_role("guard")));
        let groups = context_notes(&doc, &resolved(&doc), NOTE_SECURITY);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].item_name, "Ysolde");
        assert_eq!(groups[0].notes, vec!["+1 to avoid being surprised"]);
    }

    #[test]
    fn task_notes_follow_task() {
        let mut doc = CaravanDocument::default();
        let mut mage = Traveler::with_role("spellCaster");
        mage.task = Some("healer".to_string());
        doc.attach("Mira", ItemData::Traveler(mage));
        let roster = resolved(&doc);
        assert_eq!(context_notes(&doc, &roster, NOTE_REST).len(), 1);
        assert!(context_notes(&doc, &roster, NOTE_SECURITY).is_empty());
    }

    #[test]
    fn inactive_and_treasure_items_are_skipped() {
        let mut doc = CaravanDocument::default();
        doc.add_item(CaravanItem::new("Off", feat_with_note(NOTE_REST, "nope")).inactive())
            .unwrap();
        doc.attach("Idol", ItemData::Treasure(Treasure::default()));
        assert!(context_notes(&doc, &resolved(&doc), NOTE_REST).is_empty());
    }

    #[test]
    fn attack_alias_maps_to_attack_notes() {
        let mut doc = CaravanDocument::default();
        doc.attach("Sharp", feat_with_note(NOTE_ATTACK, "+2 vs undead"));
        let groups = context_notes(&doc, &resolved(&doc), "attacks.attack");
        assert_eq!(note_texts(&groups), vec!["+2 vs undead"]);
    }

    #[test]
    fn texts_split_on_newlines() {
        let groups = vec![NoteGroup {
            item: ItemId::new(),
            item_name: "Map".to_string(),
            notes: vec!["first\nsecond\r\n\nthird".to_string()],
        }];
        assert_eq!(note_texts(&groups), vec!["first", "second", "third"]);
    }
}
