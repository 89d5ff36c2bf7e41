//! Per-chat sliding-window rate limiter for notify-worthy triggers.
//!
//! State is one timestamp history per chat inside a `DashMap`; the
//! check-and-append runs under the map's entry lock, so two concurrent
//! triggers for the same chat cannot double-count, while different chats
//! never contend. Purely time-based — no memory of class or author.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use rollcall_core::config::RateLimitConfig;
use rollcall_core::types::ChatIdent;

/// Outcome of the gate. A throttled request must not reach delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Accepted,
    Throttled,
}

pub struct RateLimiter {
    capacity: usize,
    window: Duration,
    history: DashMap<ChatIdent, Vec<Instant>>,
}

impl RateLimiter {
    pub fn new(capacity: usize, window: Duration) -> Self {
        Self {
            capacity,
            window,
            history: DashMap::new(),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.capacity, Duration::from_secs(config.window_secs))
    }

    pub fn check(&self, chat: ChatIdent) -> Gate {
        self.check_at(chat, Instant::now())
    }

    /// Prune, then count, then append on acceptance. A rejected request
    /// leaves no timestamp behind — throttled attempts never extend the
    /// throttle. Time is a parameter so tests control the clock.
    pub fn check_at(&self, chat: ChatIdent, now: Instant) -> Gate {
        let mut window = self.history.entry(chat).or_default();
        window.retain(|t| now.duration_since(*t) < self.window);
        if window.len() >= self.capacity {
            return Gate::Throttled;
        }
        window.push(now);
        Gate::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter {
        // The observed defaults: one mention per five seconds per chat.
        RateLimiter::new(1, Duration::from_secs(5))
    }

    #[test]
    fn first_request_is_accepted() {
        let l = limiter();
        assert_eq!(l.check_at(ChatIdent(-1), Instant::now()), Gate::Accepted);
    }

    #[test]
    fn request_inside_window_is_throttled() {
        let l = limiter();
        let t0 = Instant::now();
        assert_eq!(l.check_at(ChatIdent(-1), t0), Gate::Accepted);
        assert_eq!(
            l.check_at(ChatIdent(-1), t0 + Duration::from_secs(2)),
            Gate::Throttled
        );
    }

    #[test]
    fn window_expiry_admits_the_next_request() {
        let l = limiter();
        let t0 = Instant::now();
        assert_eq!(l.check_at(ChatIdent(-1), t0), Gate::Accepted);
        assert_eq!(
            l.check_at(ChatIdent(-1), t0 + Duration::from_millis(5_100)),
            Gate::Accepted
        );
    }

    #[test]
    fn rejection_does_not_extend_the_window() {
        let l = limiter();
        let t0 = Instant::now();
        assert_eq!(l.check_at(ChatIdent(-1), t0), Gate::Accepted);
        // Throttled at t0+2s; if this appended, t0+5.5s would still throttle.
        assert_eq!(
            l.check_at(ChatIdent(-1), t0 + Duration::from_secs(2)),
            Gate::Throttled
        );
        assert_eq!(
            l.check_at(ChatIdent(-1), t0 + Duration::from_millis(5_500)),
            Gate::Accepted
        );
    }

    #[test]
    fn chats_are_limited_independently() {
        let l = limiter();
        let t0 = Instant::now();
        assert_eq!(l.check_at(ChatIdent(-1), t0), Gate::Accepted);
        assert_eq!(l.check_at(ChatIdent(-2), t0), Gate::Accepted);
        assert_eq!(
            l.check_at(ChatIdent(-1), t0 + Duration::from_secs(1)),
            Gate::Throttled
        );
        assert_eq!(
            l.check_at(ChatIdent(-2), t0 + Duration::from_secs(4)),
            Gate::Throttled
        );
    }

    #[test]
    fn capacity_above_one_admits_a_burst() {
        let l = RateLimiter::new(3, Duration::from_secs(5));
        let t0 = Instant::now();
        let chat = ChatIdent(-9);
        for i in 0..3 {
            assert_eq!(
                l.check_at(chat, t0 + Duration::from_millis(i * 100)),
                Gate::Accepted
            );
        }
        assert_eq!(
            l.check_at(chat, t0 + Duration::from_secs(1)),
            Gate::Throttled
        );
        // Oldest timestamp ages out — one slot frees up.
        assert_eq!(
            l.check_at(chat, t0 + Duration::from_millis(5_050)),
            Gate::Accepted
        );
    }
}
