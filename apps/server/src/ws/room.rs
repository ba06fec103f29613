//! Room actor: single-threaded owner of one game's state.
//!
//! Sessions never touch `GameState` directly; every mutation arrives
//! here as a message and is applied in mailbox order, so two commands
//! can never interleave mid-update.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use actix::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::config::Settings;
use crate::domain::bidding::{allowed_dealer_guesses, make_guess, resolve_pending_bids};
use crate::domain::dealing::start_game;
use crate::domain::player_view::player_briefs;
use crate::domain::scoring::next_round;
use crate::domain::state::Phase;
use crate::domain::tricks::{play_card, resolve_pending_trick};
use crate::domain::{snapshot_for, ConnId, DomainError, GameState, PlayerBrief, PlayerId};
use crate::ws::protocol::{Outbound, ServerMsg, SyncErrorCode};
use crate::ws::registry::RoomRegistry;

#[derive(Message)]
#[rtype(result = "()")]
pub struct Join {
    pub conn: ConnId,
    pub recipient: Recipient<Outbound>,
    pub player_name: String,
    pub persistent_id: String,
    pub previous_transport: Option<ConnId>,
    pub reconnecting: bool,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct SetReady {
    pub conn: ConnId,
    pub ready: bool,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Guess {
    pub conn: ConnId,
    pub value: u8,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Play {
    pub conn: ConnId,
    pub card_index: usize,
}

/// Acknowledge the round summary; the first ack advances the round.
#[derive(Message)]
#[rtype(result = "()")]
pub struct AdvanceRound {
    pub conn: ConnId,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Restart {
    pub conn: ConnId,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct AcceptLobbyReturn {
    pub conn: ConnId,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Leave {
    pub conn: ConnId,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct FullSync {
    pub conn: ConnId,
    /// Durable token, for rebinding a seat the transport map lost.
    pub persistent_id: Option<String>,
}

/// Transport dropped without a leave; the seat enters its grace window.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnected {
    pub conn: ConnId,
}

/// Introspection for ops endpoints and tests.
#[derive(Message)]
#[rtype(result = "RoomStatus")]
pub struct Inspect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomStatus {
    pub players: usize,
    pub connected: usize,
    pub alive: usize,
    pub phase: Phase,
    pub current_round: u8,
}

pub struct Room {
    code: String,
    settings: Settings,
    registry: Arc<RoomRegistry>,
    game: GameState,
    conns: HashMap<ConnId, Recipient<Outbound>>,
    pending_removals: HashMap<PlayerId, SpawnHandle>,
    /// Persistent tokens of players who chose to leave; their seats are
    /// dropped at once and cannot be reclaimed.
    quit_tokens: HashSet<String>,
    lobby_votes: HashSet<PlayerId>,
    rng: StdRng,
}

impl Room {
    pub fn start_new(code: String, settings: Settings, registry: Arc<RoomRegistry>) -> Addr<Self> {
        Self {
            game: GameState::new(code.clone()),
            code,
            settings,
            registry,
            conns: HashMap::new(),
            pending_removals: HashMap::new(),
            quit_tokens: HashSet::new(),
            lobby_votes: HashSet::new(),
            rng: StdRng::from_os_rng(),
        }
        .start()
    }

    fn send_to(&self, conn: ConnId, msg: ServerMsg) {
        if let Some(recipient) = self.conns.get(&conn) {
            recipient.do_send(Outbound(msg));
        }
    }

    fn send_to_player(&self, id: PlayerId, msg: ServerMsg) {
        if let Some(p) = self.game.player(id) {
            self.send_to(p.conn, msg);
        }
    }

    fn broadcast(&self, msg: ServerMsg) {
        for recipient in self.conns.values() {
            recipient.do_send(Outbound(msg.clone()));
        }
    }

    fn roster(&self) -> Vec<PlayerBrief> {
        player_briefs(&self.game)
    }

    /// Push each connected player their own filtered snapshot.
    fn push_snapshots(&self) {
        for p in &self.game.players {
            if self.conns.contains_key(&p.conn) {
                self.send_to(
                    p.conn,
                    ServerMsg::GameState {
                        snapshot: snapshot_for(&self.game, p.id),
                    },
                );
            }
        }
    }

    fn announce_turn(&self) {
        match self.game.phase {
            Phase::Guess => {
                if let Some(current) = self.game.current_player() {
                    let allowed = self
                        .game
                        .is_dealer(current.id)
                        .then(|| allowed_dealer_guesses(&self.game));
                    self.broadcast(ServerMsg::AwaitingGuess {
                        player_id: current.id,
                        round: self.game.current_round,
                        allowed_guesses: allowed,
                    });
                }
            }
            Phase::Play => {
                if let Some(current) = self.game.current_player() {
                    self.send_to_player(
                        current.id,
                        ServerMsg::YourTurn {
                            round: self.game.current_round,
                            trick: self.game.trick_no + 1,
                        },
                    );
                }
            }
            _ => {}
        }
    }

    /// Protocol violation: log and discard. The offender gets no reply.
    fn reject(&self, conn: ConnId, err: DomainError) {
        warn!(room_id = %self.code, conn_id = %conn, error = %err, "command rejected");
    }

    fn player_id_by_conn(&self, conn: ConnId) -> Option<PlayerId> {
        self.game.player_by_conn(conn).map(|p| p.id)
    }

    fn full_sync_for(&self, id: PlayerId) -> ServerMsg {
        let in_hand_phase = matches!(self.game.phase, Phase::Guess | Phase::Play);
        ServerMsg::FullSyncResponse {
            game_state: snapshot_for(&self.game, id),
            is_your_turn: in_hand_phase && self.game.is_current(id),
            is_dealer: self.game.is_dealer(id),
        }
    }

    fn maybe_start_game(&mut self) {
        if self.game.started || !self.game.all_ready() {
            return;
        }
        match start_game(&mut self.game, &mut self.rng) {
            Ok(_) => {
                info!(
                    room_id = %self.code,
                    players = self.game.players.len(),
                    "game started"
                );
                self.begin_round();
            }
            Err(err) => {
                warn!(room_id = %self.code, error = %err, "could not start game");
            }
        }
    }

    fn begin_round(&self) {
        self.broadcast(ServerMsg::RoundStarted {
            round: self.game.current_round,
            first_round: self.game.first_round,
        });
        self.broadcast(ServerMsg::PhaseChanged {
            phase: self.game.phase,
        });
        self.push_snapshots();
        self.announce_turn();
    }

    /// Remove a seat for good, after its grace window ran out or the
    /// room decided it is forfeit.
    fn drop_seat(&mut self, id: PlayerId, ctx: &mut Context<Self>) {
        let Some(removed) = self.game.remove_player(id) else {
            return;
        };
        info!(
            room_id = %self.code,
            player_id = %id,
            player_name = %removed.name,
            "seat removed"
        );
        self.conns.remove(&removed.conn);
        self.lobby_votes.remove(&id);
        self.broadcast(ServerMsg::PlayerLeft {
            player_id: id,
            player_name: removed.name,
            players: self.roster(),
        });

        if self.game.players.is_empty() {
            self.registry.remove(&self.code);
            ctx.stop();
            return;
        }
        if self.cancel_if_underpopulated(ctx) {
            return;
        }

        // Mid-hand removal: the bidding or the trick may now be waiting
        // on nobody.
        match self.game.phase {
            Phase::Guess => {
                if resolve_pending_bids(&mut self.game) {
                    self.broadcast(ServerMsg::PhaseChanged {
                        phase: self.game.phase,
                    });
                }
            }
            Phase::Play => {
                resolve_pending_trick(&mut self.game);
                if self.game.phase == Phase::RoundEnd {
                    self.broadcast(ServerMsg::PhaseChanged {
                        phase: self.game.phase,
                    });
                }
            }
            _ => {}
        }
        if self.game.started {
            self.push_snapshots();
            self.announce_turn();
        }
    }

    /// A started game below the player floor cannot continue: announce,
    /// unregister, and stop. Returns true when the room is gone.
    fn cancel_if_underpopulated(&mut self, ctx: &mut Context<Self>) -> bool {
        if !self.game.started
            || matches!(self.game.phase, Phase::GameOver | Phase::Cancelled)
            || self.game.players.len() >= crate::domain::rules::MIN_PLAYERS
        {
            return false;
        }
        info!(room_id = %self.code, "cancelling under-populated game");
        self.game.phase = Phase::Cancelled;
        self.broadcast(ServerMsg::GameCancelled {
            reason: "not enough players to continue".to_string(),
        });
        self.registry.remove(&self.code);
        ctx.stop();
        true
    }

    /// Arm (or re-arm) the removal timer for a dropped seat.
    ///
    /// The callback re-checks that the seat still points at the stale
    /// transport: a reconnect that rebound it in the meantime wins, and
    /// the expired timer becomes a no-op.
    fn schedule_removal(
        &mut self,
        ctx: &mut Context<Self>,
        id: PlayerId,
        stale_conn: ConnId,
        window: std::time::Duration,
    ) {
        let handle = ctx.run_later(window, move |room, ctx| {
            room.pending_removals.remove(&id);
            let still_stale = room
                .game
                .player(id)
                .is_some_and(|p| p.conn == stale_conn && !room.conns.contains_key(&p.conn));
            if still_stale {
                room.drop_seat(id, ctx);
            }
        });
        if let Some(old) = self.pending_removals.insert(id, handle) {
            ctx.cancel_future(old);
        }
    }

    fn handle_fresh_join(&mut self, msg: Join) {
        if self.game.started {
            msg.recipient.do_send(Outbound(ServerMsg::RoomError {
                message: DomainError::GameInProgress.to_string(),
            }));
            return;
        }
        if self.game.players.len() >= self.settings.max_players {
            msg.recipient.do_send(Outbound(ServerMsg::RoomError {
                message: DomainError::RoomFull.to_string(),
            }));
            return;
        }
        match self
            .game
            .add_player(&msg.player_name, &msg.persistent_id, msg.conn)
        {
            Ok(id) => {
                self.quit_tokens.remove(&msg.persistent_id);
                self.conns.insert(msg.conn, msg.recipient);
                info!(
                    room_id = %self.code,
                    player_id = %id,
                    player_name = %msg.player_name,
                    "player joined"
                );
                let players = self.roster();
                let brief = PlayerBrief {
                    id,
                    name: msg.player_name,
                    is_ready: false,
                };
                for (conn, recipient) in &self.conns {
                    recipient.do_send(Outbound(ServerMsg::PlayerJoined {
                        room_id: self.code.clone(),
                        player: brief.clone(),
                        players: players.clone(),
                        your_id: (*conn == msg.conn).then_some(id),
                    }));
                }
            }
            Err(err) => {
                warn!(room_id = %self.code, error = %err, "join rejected");
                msg.recipient.do_send(Outbound(ServerMsg::RoomError {
                    message: err.to_string(),
                }));
            }
        }
    }

    fn handle_reconnect(&mut self, msg: Join, ctx: &mut Context<Self>) {
        if self.quit_tokens.contains(&msg.persistent_id) {
            msg.recipient.do_send(Outbound(ServerMsg::SyncError {
                code: SyncErrorCode::SeatForfeited,
                message: "this seat was given up voluntarily".to_string(),
            }));
            msg.recipient.do_send(Outbound(ServerMsg::RoomInvalid));
            return;
        }

        // Durable token first; the previous transport id is a fallback
        // for clients that lost their token but kept the old conn id.
        let seat = self
            .game
            .player_by_persistent(&msg.persistent_id)
            .or_else(|| {
                msg.previous_transport
                    .and_then(|old| self.game.player_by_conn(old))
            })
            .map(|p| (p.id, p.conn, p.name.clone()));
        let Some((id, old_conn, name)) = seat else {
            msg.recipient.do_send(Outbound(ServerMsg::RoomInvalid));
            return;
        };

        if let Some(handle) = self.pending_removals.remove(&id) {
            ctx.cancel_future(handle);
        }
        self.game.rebind_transport(old_conn, msg.conn);
        self.conns.remove(&old_conn);
        self.conns.insert(msg.conn, msg.recipient);
        info!(
            room_id = %self.code,
            player_id = %id,
            old_conn = %old_conn,
            new_conn = %msg.conn,
            "player reconnected"
        );

        self.broadcast(ServerMsg::PlayerReconnected {
            old_transport_id: msg.previous_transport.or(Some(old_conn)),
            new_transport_id: msg.conn,
            player_id: id,
            player_name: name,
        });
        self.send_to(msg.conn, self.full_sync_for(id));
        self.broadcast(ServerMsg::PlayerUpdate {
            players: self.roster(),
        });
        // Re-issue the prompt the returning client may have missed.
        self.announce_turn();
    }
}

impl Actor for Room {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!(room_id = %self.code, "room started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.registry.remove(&self.code);
        info!(room_id = %self.code, "room stopped");
    }
}

impl Handler<Join> for Room {
    type Result = ();

    fn handle(&mut self, msg: Join, ctx: &mut Self::Context) {
        if msg.reconnecting {
            self.handle_reconnect(msg, ctx);
        } else {
            self.handle_fresh_join(msg);
        }
    }
}

impl Handler<SetReady> for Room {
    type Result = ();

    fn handle(&mut self, msg: SetReady, _ctx: &mut Self::Context) {
        let Some(id) = self.player_id_by_conn(msg.conn) else {
            return;
        };
        self.game.set_ready(id, msg.ready);
        self.broadcast(ServerMsg::PlayerUpdate {
            players: self.roster(),
        });
        self.maybe_start_game();
    }
}

impl Handler<Guess> for Room {
    type Result = ();

    fn handle(&mut self, msg: Guess, _ctx: &mut Self::Context) {
        let Some(id) = self.player_id_by_conn(msg.conn) else {
            self.reject(msg.conn, DomainError::UnknownPlayer);
            return;
        };
        match make_guess(&mut self.game, id, msg.value) {
            Ok(outcome) => {
                self.push_snapshots();
                if outcome.bidding_complete {
                    self.broadcast(ServerMsg::PhaseChanged {
                        phase: self.game.phase,
                    });
                }
                self.announce_turn();
            }
            Err(err) => self.reject(msg.conn, err),
        }
    }
}

impl Handler<Play> for Room {
    type Result = ();

    fn handle(&mut self, msg: Play, _ctx: &mut Self::Context) {
        let Some(id) = self.player_id_by_conn(msg.conn) else {
            self.reject(msg.conn, DomainError::UnknownPlayer);
            return;
        };
        match play_card(&mut self.game, id, msg.card_index) {
            Ok(outcome) => {
                self.push_snapshots();
                if outcome.round_over {
                    self.broadcast(ServerMsg::PhaseChanged {
                        phase: self.game.phase,
                    });
                } else {
                    self.announce_turn();
                }
            }
            Err(err) => self.reject(msg.conn, err),
        }
    }
}

impl Handler<AdvanceRound> for Room {
    type Result = ();

    fn handle(&mut self, msg: AdvanceRound, _ctx: &mut Self::Context) {
        let Some(id) = self.player_id_by_conn(msg.conn) else {
            self.reject(msg.conn, DomainError::UnknownPlayer);
            return;
        };
        match next_round(&mut self.game, &mut self.rng) {
            Ok(outcome) if outcome.game_over => {
                info!(room_id = %self.code, "game over");
                self.broadcast(ServerMsg::PhaseChanged {
                    phase: self.game.phase,
                });
                self.push_snapshots();
            }
            Ok(outcome) => {
                if outcome.round_reset {
                    warn!(
                        room_id = %self.code,
                        players = self.game.alive_count(),
                        "deck exhausted, round size reset to one"
                    );
                }
                self.begin_round();
            }
            // A second ack races the first one here; drop it quietly.
            Err(DomainError::PhaseMismatch) => {
                info!(room_id = %self.code, player_id = %id, "late round ack ignored");
            }
            Err(err) => self.reject(msg.conn, err),
        }
    }
}

impl Handler<Restart> for Room {
    type Result = ();

    fn handle(&mut self, msg: Restart, _ctx: &mut Self::Context) {
        if self.game.phase != Phase::GameOver {
            self.reject(msg.conn, DomainError::PhaseMismatch);
            return;
        }
        self.game.reset_to_lobby();
        self.lobby_votes.clear();
        match start_game(&mut self.game, &mut self.rng) {
            Ok(_) => {
                info!(room_id = %self.code, "game restarted");
                self.broadcast(ServerMsg::GameReset);
                self.begin_round();
            }
            Err(err) => self.reject(msg.conn, err),
        }
    }
}

impl Handler<AcceptLobbyReturn> for Room {
    type Result = ();

    fn handle(&mut self, msg: AcceptLobbyReturn, _ctx: &mut Self::Context) {
        let Some(id) = self.player_id_by_conn(msg.conn) else {
            return;
        };
        if self.game.phase != Phase::GameOver {
            self.reject(msg.conn, DomainError::PhaseMismatch);
            return;
        }
        self.lobby_votes.insert(id);

        let all_connected_accepted = self
            .game
            .players
            .iter()
            .filter(|p| self.conns.contains_key(&p.conn))
            .all(|p| self.lobby_votes.contains(&p.id));
        if all_connected_accepted {
            info!(room_id = %self.code, "table returned to lobby");
            self.game.reset_to_lobby();
            self.lobby_votes.clear();
            self.broadcast(ServerMsg::GameReset);
            self.broadcast(ServerMsg::PlayerUpdate {
                players: self.roster(),
            });
        }
    }
}

impl Handler<Leave> for Room {
    type Result = ();

    fn handle(&mut self, msg: Leave, ctx: &mut Self::Context) {
        let Some(player) = self.game.player_by_conn(msg.conn) else {
            return;
        };
        let (id, persistent) = (player.id, player.persistent_id.clone());
        info!(room_id = %self.code, player_id = %id, "player left voluntarily");
        // No grace window for a deliberate exit: the seat goes now, and
        // the token can never reclaim it.
        self.quit_tokens.insert(persistent);
        if let Some(handle) = self.pending_removals.remove(&id) {
            ctx.cancel_future(handle);
        }
        self.drop_seat(id, ctx);
    }
}

impl Handler<FullSync> for Room {
    type Result = ();

    fn handle(&mut self, msg: FullSync, ctx: &mut Self::Context) {
        if let Some(id) = self.player_id_by_conn(msg.conn) {
            self.send_to(msg.conn, self.full_sync_for(id));
            return;
        }

        // The transport map lost this seat (e.g. a resync racing a
        // reconnect); fall back to the durable token and rebind.
        let seat = msg.persistent_id.as_deref().and_then(|token| {
            if self.quit_tokens.contains(token) {
                return None;
            }
            self.game
                .player_by_persistent(token)
                .map(|p| (p.id, p.conn, p.name.clone()))
        });
        if let Some((id, old_conn, name)) = seat {
            if let Some(handle) = self.pending_removals.remove(&id) {
                ctx.cancel_future(handle);
            }
            self.game.rebind_transport(old_conn, msg.conn);
            info!(
                room_id = %self.code,
                player_id = %id,
                "seat rebound during full sync"
            );
            self.broadcast(ServerMsg::PlayerReconnected {
                old_transport_id: Some(old_conn),
                new_transport_id: msg.conn,
                player_id: id,
                player_name: name,
            });
            self.send_to(msg.conn, self.full_sync_for(id));
            self.announce_turn();
            return;
        }

        self.send_to(
            msg.conn,
            ServerMsg::SyncError {
                code: SyncErrorCode::NotInRoom,
                message: "connection holds no seat in this room".to_string(),
            },
        );
    }
}

impl Handler<Disconnected> for Room {
    type Result = ();

    fn handle(&mut self, msg: Disconnected, ctx: &mut Self::Context) {
        self.conns.remove(&msg.conn);
        let Some(player) = self.game.player_by_conn(msg.conn) else {
            return;
        };
        let id = player.id;
        let window = self.settings.grace_period;
        info!(
            room_id = %self.code,
            player_id = %id,
            grace_ms = window.as_millis() as u64,
            "connection dropped, seat on grace window"
        );
        self.schedule_removal(ctx, id, msg.conn, window);
    }
}

impl Handler<Inspect> for Room {
    type Result = MessageResult<Inspect>;

    fn handle(&mut self, _msg: Inspect, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(RoomStatus {
            players: self.game.players.len(),
            connected: self.conns.len(),
            alive: self.game.alive_count(),
            phase: self.game.phase,
            current_round: self.game.current_round,
        })
    }
}
