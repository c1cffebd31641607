//! Fill-forward merge of thinking sub-task updates.
//!
//! Poll responses arrive with sub-task fields appearing and disappearing as
//! the backend assembles them. The merge keeps everything the client has
//! already seen: an incoming empty field never blanks out a populated one.

use super::model::ThinkEntry;
use std::collections::HashMap;

fn fill_forward(current: &mut Option<String>, incoming: &Option<String>) {
    if let Some(value) = incoming {
        if !value.is_empty() {
            *current = Some(value.clone());
        }
    }
}

/// Merges `incoming` sub-task entries into `cached`, keyed by sub-task id.
///
/// Existing entries keep their position and only gain data; unseen ids append
/// in arrival order. Merging the same batch twice yields the same result as
/// merging it once, and an empty batch is a no-op.
pub fn merge_entries(cached: &[ThinkEntry], incoming: &[ThinkEntry]) -> Vec<ThinkEntry> {
    let mut merged: Vec<ThinkEntry> = cached.to_vec();
    let mut index: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(pos, entry)| (entry.task_id.clone(), pos))
        .collect();

    for entry in incoming {
        match index.get(&entry.task_id) {
            Some(&pos) => {
                let existing = &mut merged[pos];
                fill_forward(&mut existing.goal, &entry.goal);
                fill_forward(&mut existing.payload, &entry.payload);
                fill_forward(&mut existing.assigned_expert_name, &entry.assigned_expert_name);
                if entry.status.is_some() {
                    existing.status = entry.status;
                }
            }
            None => {
                index.insert(entry.task_id.clone(), merged.len());
                merged.push(entry.clone());
            }
        }
    }

    merged
}
