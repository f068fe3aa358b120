//! Proactive token renewal with a single in-flight refresh.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use portal_core::config::RenewalConfig;
use portal_core::error::AppError;
use portal_core::events::ClearReason;
use portal_core::traits::{AuditSink, RenewalEndpoint};
use portal_core::types::{AuditEntry, AuditLevel, Principal};

use crate::jwt::codec::{self, now_ms};

use super::credentials::CredentialPair;
use super::manager::SessionManager;

const AUDIT_CONTEXT: &str = "session";

/// Where the coordinator is in its check/refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorState {
    /// Waiting for the next wake.
    Idle,
    /// Inspecting the stored pair.
    Checking,
    /// A renewal call is in flight.
    Refreshing,
    /// The refresh token expired and the session was cleared. Left only
    /// when a new session is established.
    Failed,
}

/// What a single cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalOutcome {
    /// No credentials stored.
    NoSession,
    /// The access token is not close to expiry.
    NotDue,
    /// A new pair was stored.
    Renewed,
    /// The refresh token expired; the session was cleared.
    SessionExpired,
    /// Another cycle was already running; this trigger was dropped.
    InFlight,
    /// No refresh token was available to renew with.
    NoRefreshToken,
    /// The renewal call failed; credentials were kept for the next wake.
    TransientFailure,
    /// The renewal succeeded but the session changed meanwhile, so the
    /// result was dropped.
    Discarded,
}

/// Drives the renewal state machine from a timer and from explicit
/// triggers.
pub struct RenewalCoordinator {
    session: Arc<SessionManager>,
    endpoint: Arc<dyn RenewalEndpoint>,
    audit: Arc<dyn AuditSink>,
    config: RenewalConfig,
    /// Held for the whole of a cycle.
    flight: Mutex<()>,
    state: watch::Sender<CoordinatorState>,
    wake: Notify,
}

impl std::fmt::Debug for RenewalCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenewalCoordinator")
            .field("state", &*self.state.borrow())
            .field("config", &self.config)
            .finish()
    }
}

impl RenewalCoordinator {
    /// Creates a coordinator in the `Idle` state.
    pub fn new(
        session: Arc<SessionManager>,
        endpoint: Arc<dyn RenewalEndpoint>,
        audit: Arc<dyn AuditSink>,
        config: RenewalConfig,
    ) -> Self {
        let (state, _) = watch::channel(CoordinatorState::Idle);
        Self {
            session,
            endpoint,
            audit,
            config,
            flight: Mutex::new(()),
            state,
            wake: Notify::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> CoordinatorState {
        *self.state.borrow()
    }

    /// Watches state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<CoordinatorState> {
        self.state.subscribe()
    }

    /// Runs one timer cycle: renews only when the access token is close to
    /// expiry.
    pub async fn run_cycle(&self) -> RenewalOutcome {
        self.cycle(false).await
    }

    /// Renews now, regardless of the access token's own expiry. Called by
    /// the HTTP layer after a 401.
    pub async fn request_renewal(&self) -> RenewalOutcome {
        self.cycle(true).await
    }

    /// Wakes the timer loop for an immediate cycle.
    pub fn trigger(&self) {
        self.wake.notify_one();
    }

    /// Runs the timer loop until `cancel` turns `true` or its sender drops.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        let period = self.config.check_interval();
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        if !self.config.check_on_start {
            // the first tick completes immediately
            interval.tick().await;
        }

        info!(
            interval_seconds = period.as_secs(),
            buffer_minutes = self.config.expiring_soon_buffer_minutes,
            "Renewal coordinator started"
        );

        loop {
            if *cancel.borrow() {
                break;
            }
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    self.run_cycle().await;
                }
                _ = self.wake.notified() => {
                    self.run_cycle().await;
                }
            }
        }

        info!("Renewal coordinator stopped");
    }

    /// Spawns [`run`](Self::run) onto the runtime.
    pub fn spawn(self: &Arc<Self>, cancel: watch::Receiver<bool>) -> JoinHandle<()> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move { coordinator.run(cancel).await })
    }

    async fn cycle(&self, force: bool) -> RenewalOutcome {
        let Ok(_flight) = self.flight.try_lock() else {
            debug!("Renewal already in flight, ignoring trigger");
            return RenewalOutcome::InFlight;
        };

        let Some(pair) = self.session.credentials().await else {
            debug!("No stored credentials, nothing to renew");
            return RenewalOutcome::NoSession;
        };

        self.set_state(CoordinatorState::Checking);
        let now = now_ms();

        if pair.is_refresh_expired_at(now) {
            let principal = self.session.principal().await;
            self.session.clear(ClearReason::RefreshExpired).await;
            self.audit_as(
                principal,
                AuditLevel::Info,
                "Refresh token expired, session cleared",
                None,
            )
            .await;
            self.set_state(CoordinatorState::Failed);
            return RenewalOutcome::SessionExpired;
        }

        if !force
            && !codec::is_expiring_soon_at(
                &pair.access_token,
                self.config.expiring_soon_buffer_minutes,
                now,
            )
        {
            debug!("Access token not expiring soon");
            self.set_state(CoordinatorState::Idle);
            return RenewalOutcome::NotDue;
        }

        self.set_state(CoordinatorState::Refreshing);
        let outcome = self.refresh(&pair).await;
        self.set_state(CoordinatorState::Idle);
        outcome
    }

    async fn refresh(&self, current: &CredentialPair) -> RenewalOutcome {
        let result = if current.refresh_token.is_empty() {
            Err(AppError::missing_credential("No refresh token available"))
        } else {
            self.endpoint.renew(&current.refresh_token).await
        };

        match result {
            Ok(tokens) => {
                let renewed = CredentialPair::from_token_pair(&tokens, now_ms(), &self.config);
                let access_expires_at = renewed.access_expires_at;
                if self
                    .session
                    .apply_renewal(&current.refresh_token, renewed)
                    .await
                {
                    info!(access_expires_at, "Credentials renewed");
                    self.audit(
                        AuditLevel::Info,
                        "Credentials renewed",
                        Some(serde_json::json!({ "access_expires_at": access_expires_at })),
                    )
                    .await;
                    RenewalOutcome::Renewed
                } else {
                    debug!("Session changed during renewal, dropping result");
                    RenewalOutcome::Discarded
                }
            }
            Err(e) if e.is_missing_credential() => {
                debug!("No refresh token available, skipping renewal");
                RenewalOutcome::NoRefreshToken
            }
            Err(e) => {
                warn!(error = %e, kind = %e.kind, "Token renewal failed, keeping credentials");
                self.audit(
                    AuditLevel::Warn,
                    "Token renewal failed",
                    Some(serde_json::json!({ "error": e.to_string(), "kind": e.kind.to_string() })),
                )
                .await;
                RenewalOutcome::TransientFailure
            }
        }
    }

    async fn audit(&self, level: AuditLevel, message: &str, metadata: Option<serde_json::Value>) {
        let principal = self.session.principal().await;
        self.audit_as(principal, level, message, metadata).await;
    }

    async fn audit_as(
        &self,
        principal: Option<Principal>,
        level: AuditLevel,
        message: &str,
        metadata: Option<serde_json::Value>,
    ) {
        let mut entry = AuditEntry::new(level, message, AUDIT_CONTEXT);
        if let Some(principal) = principal {
            entry = entry.with_user(principal.id, principal.role.as_str());
        }
        if let Some(metadata) = metadata {
            entry = entry.with_metadata(metadata);
        }
        self.audit.record(entry).await;
    }

    fn set_state(&self, state: CoordinatorState) {
        self.state.send_replace(state);
    }
}
