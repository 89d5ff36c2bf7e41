//! The orchestrator: one entry point every transport collapses behind.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use rollcall_core::config::MentionConfig;
use rollcall_core::event::InboundEvent;
use rollcall_core::types::{AudienceClass, ChatIdent, UserRecord};
use rollcall_roster::RosterStore;

use crate::channel::MessageChannel;
use crate::composer::compose_mentions;
use crate::delivery::{DeliveryCoordinator, DeliveryOutcome, FanoutOutcome, FanoutReport};
use crate::error::Result;
use crate::limiter::{Gate, RateLimiter};
use crate::notices;
use crate::oracle::MembershipOracle;
use crate::resolver::resolve_audience;
use crate::triggers::TriggerSet;

/// One recognized trigger, resolved synchronously and never persisted.
#[derive(Debug, Clone)]
pub struct MentionRequest {
    pub chat: ChatIdent,
    pub chat_title: Option<String>,
    pub author: UserRecord,
    pub class: AudienceClass,
    pub message_id: i64,
}

/// Terminal outcome of one inbound event. Expected conditions — no trigger,
/// empty audience, throttled — are values here, not errors.
#[derive(Debug)]
pub enum EngineOutcome {
    /// No trigger matched (or the event carried nothing actionable).
    Ignored,
    /// A membership-change event; the roster was brought up to date.
    RosterUpdated,
    /// Trigger matched but nobody was eligible; the fixed notice went out.
    EmptyAudience,
    /// The rate limiter rejected the trigger; the throttle notice went out.
    Throttled,
    /// The mention ran to a delivery terminal state.
    Delivered {
        audience: usize,
        delivery: DeliveryOutcome,
        fanout: Vec<FanoutReport>,
    },
}

/// The mention orchestration engine.
///
/// Generic over its oracle and channel collaborators so tests can script
/// them; the roster arrives as a trait object because the backend is chosen
/// at configuration time.
pub struct MentionEngine<O, C> {
    roster: Arc<dyn RosterStore>,
    oracle: O,
    delivery: DeliveryCoordinator<C>,
    limiter: RateLimiter,
    triggers: TriggerSet,
    separator: String,
    private_fanout: bool,
    /// Per-chat guards: triggers for the same chat are serialized (no
    /// double-counted rate-limit window, no racing roster healing), triggers
    /// for different chats proceed without contention.
    chat_guards: DashMap<ChatIdent, Arc<Mutex<()>>>,
}

impl<O: MembershipOracle, C: MessageChannel> MentionEngine<O, C> {
    pub fn new(
        roster: Arc<dyn RosterStore>,
        oracle: O,
        channel: C,
        limiter: RateLimiter,
        triggers: TriggerSet,
        mention: &MentionConfig,
    ) -> Self {
        Self {
            roster,
            oracle,
            delivery: DeliveryCoordinator::new(channel),
            limiter,
            triggers,
            separator: mention.separator.clone(),
            private_fanout: mention.private_fanout,
            chat_guards: DashMap::new(),
        }
    }

    /// Process one normalized inbound event to a terminal outcome.
    ///
    /// Only roster storage faults propagate; oracle and channel failures are
    /// absorbed into the outcome per the component contracts.
    pub async fn handle_event(&self, event: InboundEvent) -> Result<EngineOutcome> {
        match event {
            InboundEvent::MembershipChange { chat, user } => {
                self.roster.upsert(chat, &user)?;
                Ok(EngineOutcome::RosterUpdated)
            }
            InboundEvent::Message {
                chat,
                chat_title,
                author,
                text,
                message_id,
            } => {
                // Observation precedes everything else, trigger or not.
                self.roster.upsert(chat, &author)?;

                let Some(class) = self.triggers.classify(&text) else {
                    return Ok(EngineOutcome::Ignored);
                };

                let request = MentionRequest {
                    chat,
                    chat_title,
                    author,
                    class,
                    message_id,
                };

                // Same-chat triggers run one at a time past this point.
                let guard = self.chat_guard(chat);
                let _serialized = guard.lock().await;
                self.process_trigger(request).await
            }
        }
    }

    async fn process_trigger(&self, request: MentionRequest) -> Result<EngineOutcome> {
        let audience = resolve_audience(
            self.roster.as_ref(),
            &self.oracle,
            request.chat,
            request.author.id,
            request.class,
        )
        .await?;

        if audience.is_empty() {
            // Negative feedback is never throttled — this path bypasses the
            // rate limiter and leaves its window untouched.
            debug!(chat = %request.chat, class = %request.class, "no eligible members");
            self.delivery
                .notice(request.chat, notices::NO_ELIGIBLE_MEMBERS, request.message_id)
                .await;
            return Ok(EngineOutcome::EmptyAudience);
        }

        if self.limiter.check(request.chat) == Gate::Throttled {
            debug!(chat = %request.chat, author = %request.author.id, "throttled");
            self.delivery
                .notice(request.chat, notices::THROTTLED, request.message_id)
                .await;
            return Ok(EngineOutcome::Throttled);
        }

        let body = compose_mentions(&audience, &self.separator);
        let delivery = self
            .delivery
            .deliver(request.chat, &body, request.message_id)
            .await;

        let fanout = if delivery.is_sent() && self.private_fanout {
            let reports = self
                .delivery
                .fan_out(&audience, request.chat_title.as_deref(), &request.author)
                .await;
            log_fanout(&reports);
            reports
        } else {
            Vec::new()
        };

        info!(
            chat = %request.chat,
            class = %request.class,
            audience = audience.len(),
            ?delivery,
            "mention processed"
        );

        Ok(EngineOutcome::Delivered {
            audience: audience.len(),
            delivery,
            fanout,
        })
    }

    fn chat_guard(&self, chat: ChatIdent) -> Arc<Mutex<()>> {
        self.chat_guards
            .entry(chat)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

fn log_fanout(reports: &[FanoutReport]) {
    let delivered = reports
        .iter()
        .filter(|r| r.outcome == FanoutOutcome::Delivered)
        .count();
    let unreachable = reports
        .iter()
        .filter(|r| r.outcome == FanoutOutcome::NoPrivateChannel)
        .count();
    debug!(
        total = reports.len(),
        delivered, unreachable, "private fan-out complete"
    );
}
