//! Room registry: the only place room addresses live.
//!
//! Rooms are created on first join and purged when they cancel or
//! empty out; nothing outside this module holds a long-lived `Addr`.

use std::sync::Arc;

use actix::Addr;
use dashmap::DashMap;
use rand::Rng;
use tracing::info;

use crate::config::Settings;
use crate::ws::room::Room;

const ROOM_CODE_LEN: usize = 6;
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, Addr<Room>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    pub fn get(&self, room_id: &str) -> Option<Addr<Room>> {
        self.rooms.get(room_id).map(|entry| entry.value().clone())
    }

    /// Fetch the room, creating and starting it if it does not exist.
    pub fn get_or_create(
        self: &Arc<Self>,
        room_id: &str,
        settings: &Settings,
    ) -> Addr<Room> {
        if let Some(addr) = self.get(room_id) {
            return addr;
        }
        let addr = self
            .rooms
            .entry(room_id.to_string())
            .or_insert_with(|| {
                info!(room_id, "creating room");
                Room::start_new(room_id.to_string(), settings.clone(), Arc::clone(self))
            })
            .value()
            .clone();
        addr
    }

    /// Drop the room's address. The actor stops itself; this only makes
    /// the code unreachable for new joins.
    pub fn remove(&self, room_id: &str) {
        if self.rooms.remove(room_id).is_some() {
            info!(room_id, "room removed from registry");
        }
    }

    pub fn contains(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

/// Six characters from an unambiguous uppercase alphabet.
pub fn generate_room_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ROOM_CODE_LEN)
        .map(|_| {
            let i = rng.random_range(0..ROOM_CODE_ALPHABET.len());
            ROOM_CODE_ALPHABET[i] as char
        })
        .collect()
}
