//! Per-connection WebSocket actor.
//!
//! A session owns no game state: it parses client JSON, forwards
//! commands to its room's mailbox, and writes whatever the room pushes
//! back. The transport id it mints at upgrade time is the only identity
//! the room ever sees for this socket.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::ConnId;
use crate::state::app_state::AppState;
use crate::ws::protocol::{ClientMsg, Outbound, ServerMsg};
use crate::ws::registry;
use crate::ws::registry::RoomRegistry;
use crate::ws::room;
use crate::ws::room::Room;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let conn_id = Uuid::new_v4();
    let session = WsSession::new(conn_id, app_state);
    ws::start(session, &req, stream)
}

pub struct WsSession {
    conn_id: ConnId,
    app_state: web::Data<AppState>,
    room: Option<Addr<Room>>,
    last_heartbeat: Instant,
}

impl WsSession {
    fn new(conn_id: ConnId, app_state: web::Data<AppState>) -> Self {
        Self {
            conn_id,
            app_state,
            room: None,
            last_heartbeat: Instant::now(),
        }
    }

    fn registry(&self) -> &Arc<RoomRegistry> {
        self.app_state.registry()
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "failed to serialize outbound message"),
        }
    }

    fn send_error_and_close(&self, ctx: &mut ws::WebsocketContext<Self>, message: &str) {
        Self::send_json(
            ctx,
            &ServerMsg::RoomError {
                message: message.to_string(),
            },
        );
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
        ctx.stop();
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(conn_id = %actor.conn_id, "heartbeat timed out");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    fn handle_join(
        &mut self,
        ctx: &mut ws::WebsocketContext<Self>,
        room_id: Option<String>,
        player_name: String,
        persistent_player_id: String,
        previous_transport_id: Option<ConnId>,
        is_reconnecting: bool,
    ) {
        let addr = if is_reconnecting {
            // A reconnect may not conjure a room back into existence:
            // if it was purged, the seat is gone and the client must
            // start over.
            match room_id.as_deref().and_then(|id| self.registry().get(id)) {
                Some(addr) => addr,
                None => {
                    info!(conn_id = %self.conn_id, room_id = ?room_id, "reconnect to unknown room");
                    Self::send_json(ctx, &ServerMsg::RoomInvalid);
                    return;
                }
            }
        } else {
            let room_id = room_id
                .unwrap_or_else(|| registry::generate_room_code(&mut rand::rng()));
            let settings = self.app_state.settings().clone();
            self.registry().get_or_create(&room_id, &settings)
        };

        addr.do_send(room::Join {
            conn: self.conn_id,
            recipient: ctx.address().recipient::<Outbound>(),
            player_name,
            persistent_id: persistent_player_id,
            previous_transport: previous_transport_id,
            reconnecting: is_reconnecting,
        });
        self.room = Some(addr);
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(conn_id = %self.conn_id, "session started");
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(room) = &self.room {
            room.do_send(room::Disconnected {
                conn: self.conn_id,
            });
        }
        info!(conn_id = %self.conn_id, "session stopped");
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();

                let parsed: Result<ClientMsg, _> = serde_json::from_str(&text);
                let Ok(cmd) = parsed else {
                    self.send_error_and_close(ctx, "malformed JSON");
                    return;
                };

                if let ClientMsg::JoinRoom {
                    room_id,
                    player_name,
                    persistent_player_id,
                    previous_transport_id,
                    is_reconnecting,
                } = cmd
                {
                    self.handle_join(
                        ctx,
                        room_id,
                        player_name,
                        persistent_player_id,
                        previous_transport_id,
                        is_reconnecting,
                    );
                    return;
                }

                let Some(room) = self.room.clone() else {
                    self.send_error_and_close(ctx, "must join a room first");
                    return;
                };
                let conn = self.conn_id;

                match cmd {
                    ClientMsg::JoinRoom { .. } => unreachable!("handled above"),
                    ClientMsg::PlayerReady { ready } => {
                        room.do_send(room::SetReady { conn, ready });
                    }
                    ClientMsg::MakeGuess { value } => {
                        room.do_send(room::Guess { conn, value });
                    }
                    ClientMsg::PlayCard { card_index } => {
                        room.do_send(room::Play { conn, card_index });
                    }
                    ClientMsg::ReadyForNextRound => {
                        room.do_send(room::AdvanceRound { conn });
                    }
                    ClientMsg::RestartGame => {
                        room.do_send(room::Restart { conn });
                    }
                    ClientMsg::AcceptReturnToLobby => {
                        room.do_send(room::AcceptLobbyReturn { conn });
                    }
                    ClientMsg::LeaveRoom => {
                        room.do_send(room::Leave { conn });
                    }
                    ClientMsg::RequestFullSync {
                        persistent_player_id,
                    } => {
                        room.do_send(room::FullSync {
                            conn,
                            persistent_id: persistent_player_id,
                        });
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                self.send_error_and_close(ctx, "binary not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(conn_id = %self.conn_id, error = %err, "protocol error");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<Outbound> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: Outbound, ctx: &mut Self::Context) {
        Self::send_json(ctx, &msg.0);
    }
}
