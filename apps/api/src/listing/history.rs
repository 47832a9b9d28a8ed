//! Session history of generated listings and its condensed view.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::listing::models::ListingRequest;

const HISTORY_VIEW_LIMIT: usize = 5;
const PREVIEW_CHARS: usize = 160;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub inputs: ListingRequest,
    pub outputs: Vec<String>,
    pub ts: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryItemView {
    pub address: String,
    pub timestamp: String,
    pub caption: String,
    pub previews: Vec<String>,
}

/// Last five entries, newest first, with outputs cut to short previews.
pub fn recent_history(history: &[HistoryEntry]) -> Vec<HistoryItemView> {
    history
        .iter()
        .rev()
        .take(HISTORY_VIEW_LIMIT)
        .map(|entry| {
            let inputs = &entry.inputs;
            let address = if inputs.address.trim().is_empty() {
                "(no address)".to_string()
            } else {
                inputs.address.clone()
            };
            HistoryItemView {
                address,
                timestamp: entry
                    .ts
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string(),
                caption: format!(
                    "{} bd / {} ba · {}",
                    inputs.bedrooms,
                    inputs.bathrooms,
                    inputs.property_type.label()
                ),
                previews: entry.outputs.iter().map(|o| preview(o)).collect(),
            }
        })
        .collect()
}

fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let mut cut: String = text.chars().take(PREVIEW_CHARS).collect();
        cut.push('…');
        cut
    } else {
        text.to_string()
    }
}
