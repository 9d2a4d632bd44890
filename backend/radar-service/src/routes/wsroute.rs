use crate::error::AppError;
use crate::geo::GeoPoint;
use crate::middleware::auth::bearer_token;
use crate::middleware::error_handling::map_error;
use crate::models::SendMessage;
use crate::state::AppState;
use crate::websocket::{SessionId, WsInboundEvent, WsOutboundEvent};
use actix::{Actor, ActorContext, AsyncContext, StreamHandler};
use actix_web::{get, http::header, web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::Deserialize;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: Option<String>,
}

// One actor per connected socket
struct WsSession {
    user_id: Uuid,
    session_id: SessionId,
    state: AppState,
    outbound: Option<UnboundedReceiver<String>>,
    inbound: Option<UnboundedSender<WsInboundEvent>>,
    hb: Instant,
}

impl WsSession {
    fn new(
        user_id: Uuid,
        session_id: SessionId,
        state: AppState,
        outbound: UnboundedReceiver<String>,
    ) -> Self {
        Self {
            user_id,
            session_id,
            state,
            outbound: Some(outbound),
            inbound: None,
            hb: Instant::now(),
        }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                tracing::warn!(user_id = %act.user_id, "WebSocket heartbeat failed, disconnecting");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(user_id = %self.user_id, "WebSocket session started");
        self.hb(ctx);

        // registry -> socket
        if let Some(rx) = self.outbound.take() {
            ctx.add_stream(UnboundedReceiverStream::new(rx));
        }

        // socket -> services, in arrival order
        let (tx, worker) = inbound_worker(self.state.clone(), self.user_id, self.session_id);
        self.inbound = Some(tx);
        actix::spawn(worker);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!(user_id = %self.user_id, "WebSocket session stopped");
        // closing the channel ends the worker once queued events drain
        self.inbound.take();

        let presence = self.state.presence.clone();
        let user_id = self.user_id;
        let session_id = self.session_id;
        actix::spawn(async move {
            presence.unregister(user_id, session_id).await;
        });
    }
}

// Events addressed to this user by the registry
impl StreamHandler<String> for WsSession {
    fn handle(&mut self, payload: String, ctx: &mut Self::Context) {
        ctx.text(payload);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.hb = Instant::now();
                match serde_json::from_str::<WsInboundEvent>(&text) {
                    Ok(evt) => {
                        let queued = self
                            .inbound
                            .as_ref()
                            .map(|tx| tx.send(evt).is_ok())
                            .unwrap_or(false);
                        if !queued {
                            tracing::warn!(user_id = %self.user_id, "inbound worker gone, closing session");
                            ctx.stop();
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to parse WS message");
                        let reply = WsOutboundEvent::Error {
                            code: "VALIDATION_ERROR".into(),
                            message: "unrecognised event".into(),
                        };
                        if let Ok(payload) = serde_json::to_string(&reply) {
                            ctx.text(payload);
                        }
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                tracing::warn!("Binary WebSocket messages not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::debug!(?reason, "WebSocket close message received");
                ctx.close(reason);
                ctx.stop();
            }
            Err(e) => {
                tracing::warn!(error = %e, "WebSocket protocol error");
                ctx.stop();
            }
            _ => {}
        }
    }
}

/// Channel plus the future that drains it. Events from one session are
/// handled one at a time, so two quick `message` frames are stored in the
/// order they arrived. The future ends when the sender is dropped.
pub fn inbound_worker(
    state: AppState,
    user_id: Uuid,
    session_id: SessionId,
) -> (UnboundedSender<WsInboundEvent>, impl Future<Output = ()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<WsInboundEvent>();
    let worker = async move {
        while let Some(evt) = rx.recv().await {
            handle_inbound(&state, user_id, session_id, evt).await;
        }
    };
    (tx, worker)
}

/// Handle one inbound client event. Failures are reported to the
/// originating session only.
pub async fn handle_inbound(
    state: &AppState,
    user_id: Uuid,
    session_id: SessionId,
    evt: WsInboundEvent,
) {
    let result = match evt {
        WsInboundEvent::LocationUpdate {
            latitude,
            longitude,
        } => match GeoPoint::new(latitude, longitude) {
            Ok(point) => {
                state.services.location.echo_location(user_id, point).await;
                Ok(())
            }
            Err(e) => Err(e),
        },
        WsInboundEvent::Message {
            receiver_id,
            content,
            media_url,
            signal_id,
        } => state
            .services
            .messages
            .send(
                user_id,
                SendMessage {
                    receiver_id,
                    content,
                    media_url,
                    signal_id,
                },
            )
            .await
            .map(|_| ()),
        WsInboundEvent::Typing { receiver_id } => state
            .services
            .messages
            .relay_typing(user_id, receiver_id, true)
            .await
            .map(|_| ()),
        WsInboundEvent::StopTyping { receiver_id } => state
            .services
            .messages
            .relay_typing(user_id, receiver_id, false)
            .await
            .map(|_| ()),
    };

    if let Err(err) = result {
        let (_, body) = map_error(&err);
        let reply = WsOutboundEvent::Error {
            code: body.code.to_string(),
            message: body.message,
        };
        state
            .presence
            .emit_to_session(user_id, session_id, &reply)
            .await;
    }
}

fn authenticate(state: &AppState, params: &WsParams, req: &HttpRequest) -> Result<Uuid, AppError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let token = params
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .or_else(|| bearer_token(header_value))
        .ok_or(AppError::Unauthorized)?;
    state.verifier.user_id(token)
}

/// GET /api/v1/ws
#[get("/ws")]
pub async fn ws_handler(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
    query: web::Query<WsParams>,
) -> Result<HttpResponse, Error> {
    let user_id = match authenticate(&state, &query, &req) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("WebSocket connection rejected: invalid or missing token");
            return Err(e.into());
        }
    };

    let (session_id, rx) = state.presence.register(user_id).await;
    let session = WsSession::new(user_id, session_id, state.get_ref().clone(), rx);

    let response = ws::start(session, &req, stream);
    if response.is_err() {
        // handshake failed: the actor never started
        state.presence.unregister(user_id, session_id).await;
    }
    response
}
