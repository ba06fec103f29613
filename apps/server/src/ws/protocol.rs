//! Wire protocol: JSON messages exchanged over the room socket.
//!
//! Every message is an object tagged with a camelCase `type` field.

use serde::{Deserialize, Serialize};

use crate::domain::{ConnId, GameSnapshot, Phase, PlayerBrief, PlayerId};

/// Messages a client may send.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMsg {
    /// First message on any connection: claim a seat in a room.
    /// Without a room id the server creates a room and mints a code.
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        #[serde(default)]
        room_id: Option<String>,
        player_name: String,
        /// Durable token the client keeps across page reloads.
        persistent_player_id: String,
        /// Transport id of the connection being replaced, if any.
        #[serde(default)]
        previous_transport_id: Option<ConnId>,
        #[serde(default)]
        is_reconnecting: bool,
    },

    #[serde(rename_all = "camelCase")]
    PlayerReady { ready: bool },

    #[serde(rename_all = "camelCase")]
    MakeGuess { value: u8 },

    #[serde(rename_all = "camelCase")]
    PlayCard { card_index: usize },

    /// Acknowledge the round summary and ask for the next deal.
    #[serde(alias = "continueToNextRound")]
    ReadyForNextRound,

    /// From the game-over screen: play again with the same table.
    RestartGame,

    /// Unanimous vote to drop back to the lobby after a game.
    AcceptReturnToLobby,

    /// Voluntary exit; the seat is dropped immediately and forfeited.
    LeaveRoom,

    /// Client-side fallback when it suspects its view has drifted. The
    /// persistent token lets the room rebind a seat the transport lost.
    #[serde(rename_all = "camelCase")]
    RequestFullSync {
        #[serde(default)]
        persistent_player_id: Option<String>,
    },
}

/// Messages the server pushes.
#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMsg {
    #[serde(rename_all = "camelCase")]
    PlayerJoined {
        room_id: String,
        player: PlayerBrief,
        players: Vec<PlayerBrief>,
        /// Set only on the copy sent to the joining connection.
        #[serde(skip_serializing_if = "Option::is_none")]
        your_id: Option<PlayerId>,
    },

    #[serde(rename_all = "camelCase")]
    PlayerLeft {
        player_id: PlayerId,
        player_name: String,
        players: Vec<PlayerBrief>,
    },

    /// Roster refresh (ready flags and the like).
    #[serde(rename_all = "camelCase")]
    PlayerUpdate { players: Vec<PlayerBrief> },

    /// Viewer-specific snapshot; unicast, never broadcast as-is.
    #[serde(rename_all = "camelCase")]
    GameState {
        #[serde(flatten)]
        snapshot: GameSnapshot,
    },

    #[serde(rename_all = "camelCase")]
    PhaseChanged { phase: Phase },

    #[serde(rename_all = "camelCase")]
    RoundStarted { round: u8, first_round: bool },

    /// Someone owes a guess; dealers also get their legal options.
    #[serde(rename_all = "camelCase")]
    AwaitingGuess {
        player_id: PlayerId,
        round: u8,
        #[serde(skip_serializing_if = "Option::is_none")]
        allowed_guesses: Option<Vec<u8>>,
    },

    /// Unicast nudge to the player expected to play a card.
    #[serde(rename_all = "camelCase")]
    YourTurn { round: u8, trick: u8 },

    #[serde(rename_all = "camelCase")]
    PlayerReconnected {
        old_transport_id: Option<ConnId>,
        new_transport_id: ConnId,
        player_id: PlayerId,
        player_name: String,
    },

    #[serde(rename_all = "camelCase")]
    FullSyncResponse {
        game_state: GameSnapshot,
        is_your_turn: bool,
        is_dealer: bool,
    },

    #[serde(rename_all = "camelCase")]
    SyncError { code: SyncErrorCode, message: String },

    #[serde(rename_all = "camelCase")]
    GameCancelled { reason: String },

    /// Everyone agreed to return to the lobby.
    GameReset,

    /// The room a reconnecting client named no longer exists.
    RoomInvalid,

    #[serde(rename_all = "camelCase")]
    RoomError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncErrorCode {
    NotInRoom,
    RoomGone,
    SeatForfeited,
}

/// Transport handle a session registers with its room so the room can
/// push `ServerMsg`s to it.
#[derive(actix::Message, Clone)]
#[rtype(result = "()")]
pub struct Outbound(pub ServerMsg);
