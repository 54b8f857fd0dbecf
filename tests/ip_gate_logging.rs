use chrono::{Duration, Utc};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::{Mutex, Once};

use login_api::config::RateLimitConfig;
use login_api::rate_limit::RateLimiter;

struct CaptureLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static CAPTURE: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};

fn install() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        log::set_logger(&CAPTURE).unwrap();
        log::set_max_level(LevelFilter::Debug);
    });
}

fn warnings_mentioning(needle: &str) -> usize {
    CAPTURE
        .records
        .lock()
        .unwrap()
        .iter()
        .filter(|(level, msg)| *level == Level::Warn && msg.contains(needle))
        .count()
}

#[test]
fn test_single_warning_per_blocked_window() {
    install();
    let ip = "203.0.113.9";
    let limiter = RateLimiter::new(RateLimitConfig::default());
    let start = Utc::now();

    for _ in 0..20 {
        assert!(limiter.check_ip_at(ip, start).is_ok());
    }
    assert_eq!(warnings_mentioning(ip), 0);

    for i in 0..30 {
        let err = limiter
            .check_ip_at(ip, start + Duration::seconds(i))
            .unwrap_err();
        assert!(err.retry_after() <= 60);
    }
    assert_eq!(warnings_mentioning(ip), 1);

    // 新窗口重新计数，再次超限时允许一条新的警告
    let next = start + Duration::seconds(60);
    for _ in 0..20 {
        assert!(limiter.check_ip_at(ip, next).is_ok());
    }
    for _ in 0..5 {
        assert!(limiter.check_ip_at(ip, next).is_err());
    }
    assert_eq!(warnings_mentioning(ip), 2);
}
