// Session client: connection lifecycle, outbound actions, event loop.
//
// One `SessionClient` owns the transport, the session state, and all
// three timing mechanisms (heartbeat, reconnect delay, countdown).
// Everything runs on the caller's task: `next_event` multiplexes the
// transport and the timer deadlines with `tokio::select!`, so no
// locking is needed and handlers can never observe half-applied
// state. Each deadline is an owned `Option<Instant>` — cancelling is
// setting it to `None`, and a pending reconnect cannot stack because
// scheduling overwrites the previous deadline.

use std::collections::VecDeque;

use serde_json::Value;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use quizlink_common::protocol::ws::{ClientCommand, Envelope};
use quizlink_common::types::SessionSettings;

use crate::config::ClientConfig;
use crate::error::{ClientError, TransportError};
use crate::events::SessionEvent;
use crate::router;
use crate::state::SessionState;
use crate::timer::Countdown;
use crate::transport::{
    is_intentional_close, Incoming, SessionTransport, CLOSE_GOING_AWAY, CLOSE_NORMAL,
};

/// Connection state as observed by the embedding UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

enum Wake {
    Incoming(Result<Incoming, TransportError>),
    Heartbeat,
    Reconnect,
    Tick,
}

/// Client-side half of the session protocol.
pub struct SessionClient<T: SessionTransport> {
    config: ClientConfig,
    transport: T,
    status: ConnectionStatus,
    last_error: Option<String>,
    state: SessionState,
    countdown: Option<Countdown>,
    /// Next keepalive send; `None` while disconnected.
    heartbeat_at: Option<Instant>,
    /// The single pending reconnect attempt, if any.
    reconnect_at: Option<Instant>,
    /// Session the client created or joined; stamped on outbound
    /// envelopes.
    session_id: Option<String>,
    pending: VecDeque<SessionEvent>,
}

impl<T: SessionTransport> SessionClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        let chat_limit = config.chat_history_limit;
        Self {
            config,
            transport,
            status: ConnectionStatus::Disconnected,
            last_error: None,
            state: SessionState::new(chat_limit),
            countdown: None,
            heartbeat_at: None,
            reconnect_at: None,
            session_id: None,
            pending: VecDeque::new(),
        }
    }

    // ── Read surface ────────────────────────────────────────────────

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Seconds left on the active question, if one is running.
    pub fn time_remaining(&self) -> Option<u32> {
        self.countdown.as_ref().map(|c| c.remaining(Instant::now()))
    }

    // ── Connection management ───────────────────────────────────────

    /// Establish the transport. A no-op while already connected.
    pub async fn connect(&mut self) -> Result<(), ClientError> {
        if self.status == ConnectionStatus::Connected {
            return Ok(());
        }
        self.status = ConnectionStatus::Connecting;
        match self.transport.connect(&self.config.server_url).await {
            Ok(()) => {
                self.on_open();
                Ok(())
            }
            Err(error) => {
                self.status = ConnectionStatus::Disconnected;
                self.last_error = Some(error.to_string());
                Err(error.into())
            }
        }
    }

    /// Close with a normal code and suppress any reconnection.
    pub async fn close(&mut self) {
        self.teardown(CLOSE_NORMAL).await;
    }

    /// Teardown for component shutdown: intentional close plus
    /// cancellation of every timer. Safe to call repeatedly, or
    /// before anything was ever started.
    pub async fn shutdown(&mut self) {
        self.teardown(CLOSE_GOING_AWAY).await;
    }

    async fn teardown(&mut self, code: u16) {
        self.heartbeat_at = None;
        self.reconnect_at = None;
        self.countdown = None;
        if self.transport.is_open() {
            self.transport.close(code).await;
        }
        if self.status != ConnectionStatus::Disconnected {
            self.status = ConnectionStatus::Disconnected;
            info!(code, "connection closed by client");
            self.pending.push_back(SessionEvent::Disconnected {
                reason: "closed by client".into(),
                will_retry: false,
            });
        }
    }

    /// Manual retry: drop any existing socket (intentionally, so its
    /// close schedules nothing), then connect again.
    pub async fn reconnect(&mut self) -> Result<(), ClientError> {
        if self.transport.is_open() {
            self.transport.close(CLOSE_NORMAL).await;
        }
        self.status = ConnectionStatus::Disconnected;
        self.heartbeat_at = None;
        self.reconnect_at = None;
        self.connect().await
    }

    fn on_open(&mut self) {
        self.status = ConnectionStatus::Connected;
        self.last_error = None;
        self.reconnect_at = None;
        self.heartbeat_at = Some(Instant::now() + self.config.heartbeat_interval());
        info!(url = %self.config.server_url, "session connection established");
        self.pending.push_back(SessionEvent::Connected);
    }

    /// Close handling owns the reconnect decision. An unintentional
    /// close schedules exactly one attempt, replacing any pending one.
    fn handle_close(&mut self, code: Option<u16>) {
        self.status = ConnectionStatus::Disconnected;
        self.heartbeat_at = None;
        let will_retry = !is_intentional_close(code);
        if will_retry {
            self.reconnect_at = Some(Instant::now() + self.config.reconnect_delay());
            info!(?code, delay_secs = self.config.reconnect_delay_secs, "connection lost, reconnect scheduled");
        } else {
            self.reconnect_at = None;
            info!(?code, "connection closed");
        }
        self.pending.push_back(SessionEvent::Disconnected {
            reason: match code {
                Some(code) => format!("connection closed (code {code})"),
                None => "connection lost".into(),
            },
            will_retry,
        });
    }

    // ── Outbound actions ────────────────────────────────────────────

    pub async fn create_session(
        &mut self,
        title: &str,
        description: Option<String>,
        question_ids: Vec<String>,
        settings: SessionSettings,
    ) -> Result<(), ClientError> {
        self.ensure_connected()?;
        self.send_command(ClientCommand::CreateSession {
            title: title.to_owned(),
            description,
            question_ids,
            settings,
        })
        .await
    }

    pub async fn join_session(
        &mut self,
        session_id: &str,
        display_name: &str,
        user_id: Option<String>,
    ) -> Result<(), ClientError> {
        self.ensure_connected()?;
        self.session_id = Some(session_id.to_owned());
        self.state.set_pending_identity(display_name);
        self.send_command(ClientCommand::JoinSession {
            display_name: display_name.to_owned(),
            user_id,
        })
        .await
    }

    /// Leave the session and drop all session-scoped state. The
    /// connection stays open and can join another session.
    pub async fn leave_session(&mut self) -> Result<(), ClientError> {
        self.ensure_connected()?;
        self.send_command(ClientCommand::LeaveSession).await?;
        self.state.reset_session_scope();
        self.countdown = None;
        self.session_id = None;
        Ok(())
    }

    pub async fn start_session(&mut self) -> Result<(), ClientError> {
        self.ensure_connected()?;
        self.send_command(ClientCommand::StartSession).await
    }

    pub async fn end_session(&mut self) -> Result<(), ClientError> {
        self.ensure_session_command()?;
        self.send_command(ClientCommand::EndSession).await
    }

    pub async fn pause_session(&mut self) -> Result<(), ClientError> {
        self.ensure_session_command()?;
        self.send_command(ClientCommand::PauseSession).await
    }

    pub async fn resume_session(&mut self) -> Result<(), ClientError> {
        self.ensure_session_command()?;
        self.send_command(ClientCommand::ResumeSession).await
    }

    pub async fn next_question(&mut self) -> Result<(), ClientError> {
        self.ensure_session_command()?;
        self.send_command(ClientCommand::NextQuestion).await
    }

    pub async fn skip_question(&mut self) -> Result<(), ClientError> {
        self.ensure_session_command()?;
        self.send_command(ClientCommand::SkipQuestion).await
    }

    pub async fn kick_participant(&mut self, participant_id: &str) -> Result<(), ClientError> {
        self.ensure_session_command()?;
        self.send_command(ClientCommand::KickParticipant {
            participant_id: participant_id.to_owned(),
        })
        .await
    }

    pub async fn send_chat_message(&mut self, message: &str) -> Result<(), ClientError> {
        self.ensure_connected()?;
        self.send_command(ClientCommand::SendMessage { message: message.to_owned() }).await
    }

    /// Submit an answer for the active question.
    ///
    /// Rejects locally — before any network round trip — when there
    /// is no active question, when an answer is already in, or when
    /// the window has run out. On a successful send the answer state
    /// moves optimistically to `Pending`; the authority's
    /// `answer_submitted` later confirms or corrects it.
    pub async fn submit_answer(&mut self, answer: Value) -> Result<(), ClientError> {
        self.ensure_connected()?;
        let now = Instant::now();
        let (question_id, response_time) = match self.state.active_question() {
            Some(active) => (
                active.question.id.clone(),
                now.saturating_duration_since(active.started_at).as_millis() as u64,
            ),
            None => return Err(ClientError::rejected("no active question")),
        };
        if self.state.has_answered() {
            return Err(ClientError::rejected("answer already submitted for this question"));
        }
        if let Some(countdown) = &self.countdown {
            if countdown.is_expired(now) {
                return Err(ClientError::rejected("time is up for this question"));
            }
        }
        self.send_command(ClientCommand::SubmitAnswer {
            question_id,
            answer: answer.clone(),
            response_time,
        })
        .await?;
        self.state.record_pending_answer(answer, response_time);
        Ok(())
    }

    fn ensure_connected(&self) -> Result<(), ClientError> {
        if self.status != ConnectionStatus::Connected {
            return Err(ClientError::rejected("not connected to the session server"));
        }
        Ok(())
    }

    /// Guard for commands that only make sense inside a session.
    fn ensure_session_command(&self) -> Result<(), ClientError> {
        self.ensure_connected()?;
        if self.state.session().is_none() && self.session_id.is_none() {
            return Err(ClientError::rejected("no active session"));
        }
        Ok(())
    }

    async fn send_command(&mut self, command: ClientCommand) -> Result<(), ClientError> {
        let session_id = match command {
            ClientCommand::Ping => None,
            _ => self.session_id.clone(),
        };
        let envelope = Envelope::command(session_id, command);
        let frame = serde_json::to_string(&envelope)
            .map_err(|e| ClientError::Protocol { reason: e.to_string() })?;
        if let Err(error) = self.transport.send(frame).await {
            self.last_error = Some(error.to_string());
            self.pending
                .push_back(SessionEvent::ConnectionError { message: error.to_string() });
            return Err(error.into());
        }
        Ok(())
    }

    // ── Event loop ──────────────────────────────────────────────────

    /// Drive the connection until the next observable event.
    ///
    /// Multiplexes the transport with the heartbeat, reconnect, and
    /// countdown deadlines. Returns `Err(Transport(NotConnected))`
    /// when nothing can make progress (disconnected with no retry
    /// pending) so the caller can decide to reconnect manually.
    pub async fn next_event(&mut self) -> Result<SessionEvent, ClientError> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(event);
            }

            let connected = self.status == ConnectionStatus::Connected;
            let heartbeat_at = self.heartbeat_at;
            let reconnect_at = self.reconnect_at;
            let tick_at = self.countdown.as_ref().map(|c| c.next_tick());

            let wake = tokio::select! {
                incoming = self.transport.recv(), if connected => Wake::Incoming(incoming),
                _ = deadline(heartbeat_at), if connected && heartbeat_at.is_some() => Wake::Heartbeat,
                _ = deadline(reconnect_at), if reconnect_at.is_some() => Wake::Reconnect,
                _ = deadline(tick_at), if tick_at.is_some() => Wake::Tick,
                else => return Err(TransportError::NotConnected.into()),
            };

            match wake {
                Wake::Incoming(Ok(Incoming::Frame(raw))) => self.on_frame(&raw),
                Wake::Incoming(Ok(Incoming::Closed { code })) => self.handle_close(code),
                Wake::Incoming(Err(error)) => {
                    // A hard read error means the socket is gone; run
                    // the same path as an abnormal close.
                    warn!(%error, "transport error");
                    self.last_error = Some(error.to_string());
                    self.pending
                        .push_back(SessionEvent::ConnectionError { message: error.to_string() });
                    self.handle_close(None);
                }
                Wake::Heartbeat => self.on_heartbeat().await,
                Wake::Reconnect => self.on_reconnect_due().await,
                Wake::Tick => self.on_countdown_tick(),
            }
        }
    }

    fn on_frame(&mut self, raw: &str) {
        let now = Instant::now();
        let events = router::handle(&mut self.state, raw, now);
        for event in &events {
            match event {
                SessionEvent::QuestionStarted { time_limit, .. } => {
                    self.countdown =
                        Some(Countdown::new(now, *time_limit, self.config.countdown_tick()));
                }
                SessionEvent::QuestionEnded { .. } | SessionEvent::SessionEnded => {
                    self.countdown = None;
                }
                _ => {}
            }
        }
        self.pending.extend(events);
    }

    async fn on_heartbeat(&mut self) {
        self.heartbeat_at = Some(Instant::now() + self.config.heartbeat_interval());
        if let Err(error) = self.send_command(ClientCommand::Ping).await {
            warn!(%error, "heartbeat send failed");
            self.handle_close(None);
        } else {
            debug!("heartbeat sent");
        }
    }

    /// The scheduled attempt fires once; on failure the client stays
    /// disconnected until a manual `reconnect`.
    async fn on_reconnect_due(&mut self) {
        self.reconnect_at = None;
        self.status = ConnectionStatus::Connecting;
        info!("attempting scheduled reconnect");
        match self.transport.connect(&self.config.server_url).await {
            Ok(()) => self.on_open(),
            Err(error) => {
                self.status = ConnectionStatus::Disconnected;
                self.last_error = Some(error.to_string());
                warn!(%error, "reconnect attempt failed");
                self.pending.push_back(SessionEvent::Disconnected {
                    reason: error.to_string(),
                    will_retry: false,
                });
            }
        }
    }

    fn on_countdown_tick(&mut self) {
        let now = Instant::now();
        let Some(countdown) = self.countdown.as_mut() else {
            return;
        };
        match countdown.on_tick(now) {
            Some(remaining) => {
                self.pending.push_back(SessionEvent::CountdownTick { remaining_secs: remaining });
                if remaining == 0 {
                    self.countdown = None;
                }
            }
            None => {
                if countdown.is_expired(now) {
                    self.countdown = None;
                }
            }
        }
    }
}

async fn deadline(at: Option<Instant>) {
    match at {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
