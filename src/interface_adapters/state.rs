use std::sync::Arc;

use crate::use_cases::RoomRegistry;

#[derive(Clone)]
pub struct AppState {
    // Registry of live rooms; connections create/join rooms through it.
    pub room_registry: Arc<RoomRegistry>,
}
