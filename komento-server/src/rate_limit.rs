use std::{collections::HashMap, net::IpAddr, sync::Mutex};

use chrono::Duration;
use komento_api::Time;

/// Admission control for the write path.
///
/// `check` decides, `record` commits. Handlers call `record` only after a
/// submission has passed every other check, so invalid payloads never
/// consume budget. Both take the clock as a parameter, which keeps tests
/// off the wall clock.
pub trait RateLimiter: Send + Sync {
    fn check(&self, ip: IpAddr, now: Time) -> bool;
    fn record(&self, ip: IpAddr, now: Time);
}

/// Fixed trailing window over per-IP submission timestamps.
///
/// Timestamp lists are pruned lazily on each check. The map itself is
/// capped at `max_tracked` IPs; reaching the cap sweeps entries whose whole
/// window has elapsed. The cap is soft: that many simultaneously-active IPs
/// can still grow the map until their windows lapse.
///
/// In-process only; a restart resets all history. The lock is never held
/// across an await point.
pub struct SlidingWindow {
    window: Duration,
    limit: usize,
    max_tracked: usize,
    entries: Mutex<HashMap<IpAddr, Vec<Time>>>,
}

impl SlidingWindow {
    pub fn new(window_secs: i64, limit: usize, max_tracked: usize) -> SlidingWindow {
        SlidingWindow {
            window: Duration::seconds(window_secs),
            limit,
            max_tracked,
            entries: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.entries.lock().expect("rate limiter lock poisoned").len()
    }
}

impl RateLimiter for SlidingWindow {
    fn check(&self, ip: IpAddr, now: Time) -> bool {
        let mut entries = self.entries.lock().expect("rate limiter lock poisoned");
        match entries.get_mut(&ip) {
            None => true,
            Some(stamps) => {
                stamps.retain(|&t| now - t < self.window);
                stamps.len() < self.limit
            }
        }
    }

    fn record(&self, ip: IpAddr, now: Time) {
        let mut entries = self.entries.lock().expect("rate limiter lock poisoned");
        if !entries.contains_key(&ip) && entries.len() >= self.max_tracked {
            let window = self.window;
            entries.retain(|_, stamps| stamps.iter().any(|&t| now - t < window));
        }
        entries.entry(ip).or_insert_with(Vec::new).push(now);
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::from([203, 0, 113, last])
    }

    fn at(secs: i64) -> Time {
        chrono::Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn limiter() -> SlidingWindow {
        SlidingWindow::new(60, 5, 1024)
    }

    #[test]
    fn allows_up_to_the_limit_within_the_window() {
        let l = limiter();
        for i in 0..5 {
            assert!(l.check(ip(1), at(i)), "submission {i} should pass");
            l.record(ip(1), at(i));
        }
        assert!(!l.check(ip(1), at(5)));
    }

    #[test]
    fn window_slides_past_old_submissions() {
        let l = limiter();
        for i in 0..5 {
            l.record(ip(1), at(i));
        }
        assert!(!l.check(ip(1), at(59)));
        // the first stamp (t=0) leaves the window at t=60
        assert!(l.check(ip(1), at(61)));
    }

    #[test]
    fn ips_are_throttled_independently() {
        let l = limiter();
        for i in 0..5 {
            l.record(ip(1), at(i));
        }
        assert!(!l.check(ip(1), at(10)));
        assert!(l.check(ip(2), at(10)));
    }

    #[test]
    fn check_alone_never_consumes_budget() {
        let l = limiter();
        for i in 0..100 {
            assert!(l.check(ip(1), at(i)));
        }
    }

    #[test]
    fn reaching_the_cap_sweeps_stale_ips() {
        let l = SlidingWindow::new(60, 5, 2);
        l.record(ip(1), at(0));
        l.record(ip(2), at(0));
        assert_eq!(l.tracked(), 2);
        // both previous windows have fully elapsed
        l.record(ip(3), at(120));
        assert_eq!(l.tracked(), 1);
    }

    #[test]
    fn cap_does_not_evict_active_ips() {
        let l = SlidingWindow::new(60, 5, 2);
        l.record(ip(1), at(0));
        l.record(ip(2), at(0));
        l.record(ip(3), at(30));
        // nothing was stale, so the cap is exceeded rather than losing state
        assert_eq!(l.tracked(), 3);
        assert!(l.check(ip(1), at(31)), "ip1's budget survived the sweep");
    }
}
