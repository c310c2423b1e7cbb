use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Once};

use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

use crate::config::TokenConfig;
use crate::services::jwt_service::TokenManager;
use crate::utils::clock::FixedClock;
use crate::utils::random::{OsRandom, RandomSource};

static INIT: Once = Once::new();

pub const ACCESS_SECRET: &str = "access-secret-for-tests";
pub const REFRESH_SECRET: &str = "refresh-secret-for-tests";
pub const TEST_KEY_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

/// Initialize logging exactly once
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_target(false)
            .with_thread_ids(true)
            .with_level(true)
            .with_file(true)
            .with_line_number(true)
            .with_max_level(Level::ERROR)
            .with_span_events(FmtSpan::NONE)
            .init();
    });
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
}

pub fn test_config(access_ttl: Duration) -> TokenConfig {
    TokenConfig::new(ACCESS_SECRET, REFRESH_SECRET, access_ttl, Duration::days(7))
}

/// Manager on a frozen clock; the clock is returned so tests can move time.
pub fn manager_with_clock(config: TokenConfig) -> (TokenManager, Arc<FixedClock>) {
    init_tracing();
    let clock = Arc::new(FixedClock::new(start_time()));
    let manager = TokenManager::with_sources(config, clock.clone(), Arc::new(OsRandom));
    (manager, clock)
}

/// Fills every request with the same byte.
pub struct ConstantRandom(pub u8);

impl RandomSource for ConstantRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        dest.fill(self.0);
    }
}

/// Deterministic but never repeating: each call uses the next byte value.
#[derive(Default)]
pub struct CountingRandom {
    next: AtomicU8,
}

impl RandomSource for CountingRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        let value = self.next.fetch_add(1, Ordering::SeqCst);
        dest.fill(value);
    }
}
