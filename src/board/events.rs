use okr_common::{KanbanColumn, WheelType};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Capacity of the board event channel. Slow receivers lag rather than
/// block the controller.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

// ── Board event types ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum BoardEvent {
    ItemMoved {
        item_id: i64,
        from_column: KanbanColumn,
        to_column: KanbanColumn,
        position: i32,
    },
    MoveDenied {
        item_id: i64,
        wheel: WheelType,
        column: KanbanColumn,
        limit: u32,
        current: usize,
        message: String,
    },
    NotesUpdated {
        item_id: i64,
        cleared: bool,
    },
    ItemDeleted {
        item_id: i64,
        title: String,
    },
    TitlesResolved {
        count: usize,
    },
}

impl BoardEvent {
    /// Card the event is about, if any.
    pub fn item_id(&self) -> Option<i64> {
        match self {
            Self::ItemMoved { item_id, .. }
            | Self::MoveDenied { item_id, .. }
            | Self::NotesUpdated { item_id, .. }
            | Self::ItemDeleted { item_id, .. } => Some(*item_id),
            Self::TitlesResolved { .. } => None,
        }
    }
}

pub fn channel() -> (broadcast::Sender<String>, broadcast::Receiver<String>) {
    broadcast::channel(EVENT_CHANNEL_CAPACITY)
}

/// Serialize and publish an event. Having no receivers is not an error.
pub fn broadcast_event(tx: &broadcast::Sender<String>, event: &BoardEvent) {
    match serde_json::to_string(event) {
        Ok(json) => {
            let _ = tx.send(json);
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize board event");
        }
    }
}

/// Decode an event received from the channel.
pub fn decode_event(json: &str) -> Option<BoardEvent> {
    serde_json::from_str(json).ok()
}
