//! Registry actor: the process-wide map of rooms and connections.
//!
//! The maps are owned by a single Tokio task. Every connection handler
//! talks to it through a cloneable [`RegistryHandle`], so lookups,
//! inserts and deletes are processed one at a time in arrival order and
//! never hold a room lock.

use std::collections::HashMap;
use std::sync::Arc;

use getaway_protocol::RoomId;
use getaway_transport::ConnectionId;
use tokio::sync::{Mutex, mpsc, oneshot};

use crate::{Room, RoomError};

/// A room shared between connection handlers. Holding the lock gives
/// exclusive access to the whole game.
pub type SharedRoom = Arc<Mutex<Room>>;

/// Commands sent to the registry task. Each carries a reply channel.
enum RegistryCommand {
    GetRoom {
        room_id: RoomId,
        reply: oneshot::Sender<Option<SharedRoom>>,
    },

    /// Inserts only if the id is free; replies whether it did.
    InsertRoom {
        room_id: RoomId,
        room: SharedRoom,
        reply: oneshot::Sender<bool>,
    },

    /// Inserts or replaces.
    SetRoom {
        room_id: RoomId,
        room: SharedRoom,
        reply: oneshot::Sender<()>,
    },

    DeleteRoom {
        room_id: RoomId,
        reply: oneshot::Sender<bool>,
    },

    /// Replies with the room the connection was previously associated with.
    Associate {
        conn_id: ConnectionId,
        room_id: RoomId,
        reply: oneshot::Sender<Option<RoomId>>,
    },

    Dissociate {
        conn_id: ConnectionId,
        reply: oneshot::Sender<Option<RoomId>>,
    },

    RoomCount {
        reply: oneshot::Sender<usize>,
    },
}

/// The state owned by the registry task.
#[derive(Default)]
pub struct Registry {
    rooms: HashMap<RoomId, SharedRoom>,
    /// The room each connection last joined.
    connections: HashMap<ConnectionId, RoomId>,
}

impl Registry {
    /// Spawns the registry task and returns a handle to it.
    ///
    /// The task stops once every handle is dropped.
    pub fn spawn(channel_size: usize) -> RegistryHandle {
        let (sender, receiver) = mpsc::channel(channel_size);
        tokio::spawn(Registry::default().run(receiver));
        RegistryHandle { sender }
    }

    async fn run(mut self, mut receiver: mpsc::Receiver<RegistryCommand>) {
        tracing::debug!("registry started");

        while let Some(cmd) = receiver.recv().await {
            match cmd {
                RegistryCommand::GetRoom { room_id, reply } => {
                    let _ = reply.send(self.rooms.get(&room_id).cloned());
                }
                RegistryCommand::InsertRoom {
                    room_id,
                    room,
                    reply,
                } => {
                    let inserted = !self.rooms.contains_key(&room_id);
                    if inserted {
                        tracing::info!(%room_id, "room created");
                        self.rooms.insert(room_id, room);
                    }
                    let _ = reply.send(inserted);
                }
                RegistryCommand::SetRoom {
                    room_id,
                    room,
                    reply,
                } => {
                    self.rooms.insert(room_id, room);
                    let _ = reply.send(());
                }
                RegistryCommand::DeleteRoom { room_id, reply } => {
                    let removed = self.rooms.remove(&room_id).is_some();
                    if removed {
                        self.connections.retain(|_, rid| *rid != room_id);
                        tracing::info!(%room_id, "room removed");
                    }
                    let _ = reply.send(removed);
                }
                RegistryCommand::Associate {
                    conn_id,
                    room_id,
                    reply,
                } => {
                    let _ = reply.send(self.connections.insert(conn_id, room_id));
                }
                RegistryCommand::Dissociate { conn_id, reply } => {
                    let _ = reply.send(self.connections.remove(&conn_id));
                }
                RegistryCommand::RoomCount { reply } => {
                    let _ = reply.send(self.rooms.len());
                }
            }
        }

        tracing::debug!("registry stopped");
    }
}

/// Handle to the registry task. Cheap to clone.
#[derive(Clone)]
pub struct RegistryHandle {
    sender: mpsc::Sender<RegistryCommand>,
}

impl RegistryHandle {
    /// Sends a command built around a fresh reply channel and waits for
    /// the answer.
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RegistryCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(build(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable)?;
        reply_rx.await.map_err(|_| RoomError::Unavailable)
    }

    pub async fn get_room(&self, room_id: &RoomId) -> Result<Option<SharedRoom>, RoomError> {
        let room_id = room_id.clone();
        self.request(|reply| RegistryCommand::GetRoom { room_id, reply })
            .await
    }

    /// Registers `room` unless the id is taken. Returns `false` on a
    /// collision.
    pub async fn insert_room(&self, room_id: RoomId, room: SharedRoom) -> Result<bool, RoomError> {
        self.request(|reply| RegistryCommand::InsertRoom {
            room_id,
            room,
            reply,
        })
        .await
    }

    /// Registers `room`, replacing any room with the same id.
    pub async fn set_room(&self, room_id: RoomId, room: SharedRoom) -> Result<(), RoomError> {
        self.request(|reply| RegistryCommand::SetRoom {
            room_id,
            room,
            reply,
        })
        .await
    }

    /// Removes a room and any connections pointing at it. Returns whether
    /// the room was registered.
    pub async fn delete_room(&self, room_id: &RoomId) -> Result<bool, RoomError> {
        let room_id = room_id.clone();
        self.request(|reply| RegistryCommand::DeleteRoom { room_id, reply })
            .await
    }

    /// Records that `conn_id` now plays in `room_id`. Returns the room it
    /// was associated with before, if any.
    pub async fn associate(
        &self,
        conn_id: ConnectionId,
        room_id: RoomId,
    ) -> Result<Option<RoomId>, RoomError> {
        self.request(|reply| RegistryCommand::Associate {
            conn_id,
            room_id,
            reply,
        })
        .await
    }

    /// Forgets `conn_id` and returns its room, if it had one.
    pub async fn dissociate(&self, conn_id: ConnectionId) -> Result<Option<RoomId>, RoomError> {
        self.request(|reply| RegistryCommand::Dissociate { conn_id, reply })
            .await
    }

    pub async fn room_count(&self) -> Result<usize, RoomError> {
        self.request(|reply| RegistryCommand::RoomCount { reply })
            .await
    }
}
