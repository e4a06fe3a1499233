use serde::Deserialize;
use utoipa::ToSchema;

use crate::model::assigned_task::AssignedTask;

/// What an employee is allowed to change on an assignment: the done flag,
/// nothing else. Extra fields in the payload are dropped at deserialization.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DoneFlagPatch {
    #[schema(example = 1)]
    pub id: u64,
    pub is_done: bool,
}

/// Apply employee done-flag toggles onto the stored assignment set. Every
/// stored field except `is_done` is carried over from `existing`; patches
/// whose id matches no stored row are ignored.
pub fn merge_done_flags(existing: &[AssignedTask], incoming: &[DoneFlagPatch]) -> Vec<AssignedTask> {
    existing
        .iter()
        .map(|row| {
            let mut merged = row.clone();
            if let Some(patch) = incoming.iter().find(|p| p.id == row.id) {
                merged.is_done = patch.is_done;
            }
            merged
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn assignment(id: u64, company: &str, title: &str, is_done: bool) -> AssignedTask {
        AssignedTask {
            id,
            user_id: 7,
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            company_name: company.to_string(),
            task_title: title.to_string(),
            is_done,
            created_at: None,
        }
    }

    #[test]
    fn flips_only_the_matched_done_flag() {
        let existing = vec![
            assignment(1, "Acme", "Deck", false),
            assignment(2, "Globex", "Audit", false),
        ];
        let incoming = vec![DoneFlagPatch { id: 2, is_done: true }];

        let merged = merge_done_flags(&existing, &incoming);

        assert_eq!(merged.len(), 2);
        assert!(!merged[0].is_done);
        assert!(merged[1].is_done);
    }

    #[test]
    fn non_done_fields_are_byte_identical_after_merge() {
        let existing = vec![assignment(1, "Acme", "Deck", false)];
        let incoming = vec![DoneFlagPatch { id: 1, is_done: true }];

        let merged = merge_done_flags(&existing, &incoming);

        let mut expected = existing[0].clone();
        expected.is_done = true;
        assert_eq!(merged[0], expected);
    }

    #[test]
    fn unknown_patch_ids_are_ignored_and_rows_never_added() {
        let existing = vec![assignment(1, "Acme", "Deck", true)];
        let incoming = vec![
            DoneFlagPatch { id: 99, is_done: false },
            DoneFlagPatch { id: 1, is_done: false },
        ];

        let merged = merge_done_flags(&existing, &incoming);

        assert_eq!(merged.len(), 1);
        assert!(!merged[0].is_done);
    }

    #[test]
    fn payload_with_extra_fields_still_only_carries_id_and_done() {
        // Employees may post the whole assignment object back; everything but
        // id/is_done must be discarded on the way in.
        let patch: DoneFlagPatch = serde_json::from_str(
            r#"{"id": 3, "is_done": true, "company_name": "Evil Corp", "task_title": "Overwrite"}"#,
        )
        .unwrap();
        assert_eq!(patch.id, 3);
        assert!(patch.is_done);
    }
}
