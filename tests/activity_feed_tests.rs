use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use miftah::config::FeedConfig;
use miftah::feed::{
    ActivityBuffer, ActivityFeedSimulator, ActivityGenerator, LevelFilter, LogLevel, LogModule,
    LogRecord, MESSAGE_POOL,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::time::Duration;
use uuid::Uuid;

fn seeded_generator(seed: u64) -> ActivityGenerator<StdRng> {
    ActivityGenerator::new(StdRng::seed_from_u64(seed))
}

fn record(level: LogLevel, module: LogModule, message: &'static str) -> LogRecord {
    LogRecord {
        id: Uuid::new_v4(),
        timestamp: Utc::now(),
        level,
        module,
        message,
        encrypted: false,
    }
}

fn steady_config(interval_ms: u64, capacity: usize) -> FeedConfig {
    FeedConfig {
        interval_ms,
        capacity,
        warmup_count: 0,
        warmup_spacing_ms: 100,
        seed: Some(7),
    }
}

// --- Buffer ---

#[test]
fn test_buffer_never_exceeds_capacity() {
    let mut gen = seeded_generator(1);
    let mut buffer = ActivityBuffer::new(50);
    for i in 0..500 {
        buffer.push(gen.next_record(Utc::now()));
        assert!(buffer.len() <= 50, "Buffer overflowed at push {}", i);
    }
    assert_eq!(buffer.len(), 50);
}

#[test]
fn test_buffer_is_newest_first_and_evicts_oldest() {
    let mut gen = seeded_generator(2);
    let mut buffer = ActivityBuffer::new(3);
    let records: Vec<LogRecord> = (0..5).map(|_| gen.next_record(Utc::now())).collect();
    for r in &records {
        buffer.push(r.clone());
    }

    let ids: Vec<Uuid> = buffer.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![records[4].id, records[3].id, records[2].id]);
    assert_eq!(buffer.head().map(|r| r.id), Some(records[4].id));
}

#[test]
fn test_shrinking_capacity_evicts_tail() {
    let mut gen = seeded_generator(3);
    let mut buffer = ActivityBuffer::new(10);
    for _ in 0..10 {
        buffer.push(gen.next_record(Utc::now()));
    }
    let head = buffer.head().cloned();

    buffer.set_capacity(4);
    assert_eq!(buffer.len(), 4);
    assert_eq!(buffer.head().cloned(), head, "Shrinking keeps the newest records");
}

#[test]
fn test_visible_all_returns_whole_buffer_in_order() {
    let mut gen = seeded_generator(4);
    let mut buffer = ActivityBuffer::new(50);
    for _ in 0..30 {
        buffer.push(gen.next_record(Utc::now()));
    }

    let visible = buffer.visible(LevelFilter::All, "");
    let expected: Vec<LogRecord> = buffer.iter().cloned().collect();
    assert_eq!(visible, expected);
}

#[test]
fn test_visible_level_filter_is_exact() {
    let mut gen = seeded_generator(5);
    let mut buffer = ActivityBuffer::new(50);
    for _ in 0..50 {
        buffer.push(gen.next_record(Utc::now()));
    }

    let filter: LevelFilter = "error".parse().expect("known level");
    let errors = buffer.visible(filter, "");
    assert!(errors.iter().all(|r| r.level == LogLevel::Error));
    assert_eq!(errors.len(), buffer.level_counts().get(LogLevel::Error));
}

#[test]
fn test_visible_search_matches_module_or_message_case_insensitively() {
    let mut buffer = ActivityBuffer::new(10);
    buffer.push(record(LogLevel::Info, LogModule::Atlas, "Network mapping in progress"));
    buffer.push(record(LogLevel::Error, LogModule::Omega, "Target acquired"));
    buffer.push(record(LogLevel::Debug, LogModule::System, "Analysis complete"));

    let omega = buffer.visible(LevelFilter::All, "omega");
    assert_eq!(omega.len(), 1);
    assert_eq!(omega[0].module, LogModule::Omega);

    let mapping = buffer.visible(LevelFilter::All, "MAPPING");
    assert_eq!(mapping.len(), 1);
    assert_eq!(mapping[0].message, "Network mapping in progress");

    // Both filters combine
    assert!(buffer.visible(LevelFilter::Only(LogLevel::Info), "omega").is_empty());

    assert!(buffer.visible(LevelFilter::All, "no such text").is_empty());
}

#[test]
fn test_visible_search_over_generated_records() {
    let mut gen = seeded_generator(6);
    let mut buffer = ActivityBuffer::new(50);
    for _ in 0..50 {
        buffer.push(gen.next_record(Utc::now()));
    }

    for r in buffer.visible(LevelFilter::All, "omega") {
        assert!(
            r.module.as_str().to_lowercase().contains("omega") || r.message.to_lowercase().contains("omega")
        );
    }
}

#[test]
fn test_level_filter_parsing() {
    assert_eq!("all".parse::<LevelFilter>(), Ok(LevelFilter::All));
    assert_eq!("ALL".parse::<LevelFilter>(), Ok(LevelFilter::All));
    assert_eq!("Warning".parse::<LevelFilter>(), Ok(LevelFilter::Only(LogLevel::Warning)));
    assert!("critical".parse::<LevelFilter>().is_err());
}

#[test]
fn test_level_counts_cover_whole_buffer() {
    let mut gen = seeded_generator(8);
    let mut buffer = ActivityBuffer::new(40);
    for _ in 0..100 {
        buffer.push(gen.next_record(Utc::now()));
    }

    let counts = buffer.level_counts();
    assert_eq!(counts.total(), 40);
    for (level, count) in counts.iter() {
        assert_eq!(count, buffer.iter().filter(|r| r.level == level).count());
    }
}

// --- Generator ---

#[test]
fn test_generator_timestamps_never_go_backwards() {
    let mut gen = seeded_generator(9);
    let t1 = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
    let t0 = t1 - ChronoDuration::seconds(30);

    let first = gen.next_record(t1);
    let second = gen.next_record(t0);
    assert_eq!(first.timestamp, t1);
    assert_eq!(second.timestamp, t1, "Clock step-back is clamped");

    let later = t1 + ChronoDuration::seconds(1);
    assert_eq!(gen.next_record(later).timestamp, later);
}

#[test]
fn test_generator_is_deterministic_for_a_seed() {
    let now = Utc::now();
    let mut a = seeded_generator(42);
    let mut b = seeded_generator(42);
    for _ in 0..20 {
        assert_eq!(a.next_record(now), b.next_record(now));
    }
}

#[test]
fn test_generator_draws_from_fixed_sets() {
    let mut gen = seeded_generator(10);
    let mut levels = HashSet::new();
    let mut modules = HashSet::new();
    let mut ids = HashSet::new();
    let mut encrypted = 0usize;
    let n = 10_000;

    for _ in 0..n {
        let r = gen.next_record(Utc::now());
        assert!(MESSAGE_POOL.contains(&r.message));
        levels.insert(r.level);
        modules.insert(r.module);
        ids.insert(r.id);
        if r.encrypted {
            encrypted += 1;
        }
    }

    assert_eq!(levels.len(), LogLevel::ALL.len());
    assert_eq!(modules.len(), LogModule::ALL.len());
    assert_eq!(ids.len(), n, "Record ids are unique");

    let ratio = encrypted as f64 / n as f64;
    assert!((0.27..0.33).contains(&ratio), "Encrypted ratio {} not near 0.3", ratio);
}

#[test]
fn test_record_display_line() {
    let mut r = record(LogLevel::Warning, LogModule::Security, "Security check passed");
    r.timestamp = Utc.with_ymd_and_hms(2025, 3, 4, 15, 5, 9).unwrap();
    assert_eq!(r.to_string(), "15:05:09 WARNING SECURITY Security check passed");

    r.encrypted = true;
    assert_eq!(r.to_string(), "15:05:09 WARNING SECURITY [ENCRYPTED] Security check passed");
}

#[test]
fn test_record_serializes_upper_case_enums() {
    let r = record(LogLevel::Success, LogModule::Prolitage, "Analysis complete");
    let json = serde_json::to_value(&r).expect("serialize");
    assert_eq!(json["level"], "SUCCESS");
    assert_eq!(json["module"], "PROLITAGE");
    assert_eq!(json["message"], "Analysis complete");
}

// --- Simulator ---

#[tokio::test(start_paused = true)]
async fn test_scenario_capacity_five_after_twenty_ticks() {
    let mut feed = ActivityFeedSimulator::new(steady_config(10, 5));
    let mut rx = feed.subscribe();
    feed.start();

    // Ticks land at 10, 20, ..., 200ms
    tokio::time::sleep(Duration::from_millis(205)).await;

    assert_eq!(feed.generated(), 20);
    assert_eq!(feed.len(), 5);

    let mut last = None;
    while let Ok(r) = rx.try_recv() {
        last = Some(r);
    }
    assert_eq!(feed.head(), last, "Head is the most recently generated record");

    feed.stop();
}

#[tokio::test(start_paused = true)]
async fn test_warmup_burst_fills_feed_before_first_period() {
    let mut feed = ActivityFeedSimulator::new(FeedConfig {
        seed: Some(11),
        ..FeedConfig::default()
    });
    assert!(feed.is_empty());
    feed.start();

    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(feed.generated(), 1, "First warm-up record is immediate");

    tokio::time::sleep(Duration::from_millis(1949)).await;
    assert_eq!(feed.generated(), 20, "Full burst of 20 within ~2s");

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(feed.generated(), 21, "Steady tick at 3000ms");
    assert_eq!(feed.len(), 21);

    feed.stop();
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_pending_warmup_ticks() {
    let mut feed = ActivityFeedSimulator::new(FeedConfig {
        seed: Some(12),
        ..FeedConfig::default()
    });
    feed.start();

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(feed.generated(), 3);

    feed.stop();
    assert!(!feed.is_running());

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(feed.generated(), 3, "No records after stop");
    assert_eq!(feed.len(), 3);

    // Idempotent
    feed.stop();
    feed.stop();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stop_is_final_on_multi_thread_runtime() {
    let mut feed = ActivityFeedSimulator::new(steady_config(1, 50));
    feed.start();
    tokio::time::sleep(Duration::from_millis(30)).await;

    feed.stop();
    let frozen = feed.generated();
    let head = feed.head();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(feed.generated(), frozen);
    assert_eq!(feed.head(), head);
}

#[tokio::test(start_paused = true)]
async fn test_pause_keeps_buffer_and_resume_skips_warmup() {
    let mut feed = ActivityFeedSimulator::new(FeedConfig {
        interval_ms: 100,
        warmup_count: 2,
        warmup_spacing_ms: 10,
        seed: Some(13),
        ..FeedConfig::default()
    });
    feed.start();

    // Warm-up at 0 and 10ms, steady at 100, 200, 300ms
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(feed.generated(), 5);

    feed.pause();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(feed.generated(), 5);
    assert_eq!(feed.len(), 5, "Pausing keeps the buffer");

    feed.resume();
    assert!(feed.is_running());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(feed.generated(), 5, "Resume does not replay the warm-up burst");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(feed.generated(), 6);

    feed.stop();
}

#[tokio::test(start_paused = true)]
async fn test_start_with_reparameterizes() {
    let mut feed = ActivityFeedSimulator::new(steady_config(10, 20));
    feed.start();
    tokio::time::sleep(Duration::from_millis(105)).await;
    assert_eq!(feed.len(), 10);

    feed.start_with(Duration::from_millis(50), 4).expect("valid parameters");
    assert_eq!(feed.len(), 4, "Smaller capacity evicts at once");

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(feed.generated(), 12, "Two ticks at the new 50ms period");
    assert_eq!(feed.len(), 4);

    assert!(feed.start_with(Duration::from_millis(50), 0).is_err());
    feed.stop();
}

#[tokio::test(start_paused = true)]
async fn test_simulator_filters_and_export() {
    let mut feed = ActivityFeedSimulator::new(steady_config(10, 50));
    feed.start();
    tokio::time::sleep(Duration::from_millis(505)).await;
    feed.stop();

    assert_eq!(feed.len(), 50);
    assert_eq!(feed.get_visible(LevelFilter::All, "").len(), 50);

    let errors = feed.get_visible_str("error", "");
    assert!(errors.iter().all(|r| r.level == LogLevel::Error));
    assert_eq!(errors.len(), feed.level_counts().get(LogLevel::Error));

    assert!(feed.get_visible_str("bogus", "").is_empty(), "Unknown level matches nothing");

    let exported: serde_json::Value = serde_json::from_str(&feed.export_json().expect("export")).expect("json");
    let array = exported.as_array().expect("array");
    assert_eq!(array.len(), 50);
    assert_eq!(
        array[0]["id"],
        serde_json::Value::String(feed.head().expect("head").id.to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_dropping_simulator_stops_timers() {
    let mut feed = ActivityFeedSimulator::new(steady_config(10, 50));
    let mut rx = feed.subscribe();
    feed.start();
    tokio::time::sleep(Duration::from_millis(35)).await;
    drop(feed);

    tokio::time::sleep(Duration::from_millis(100)).await;
    let mut received = 0;
    while rx.try_recv().is_ok() {
        received += 1;
    }
    assert_eq!(received, 3, "Only the ticks before the drop were published");
}

#[tokio::test(start_paused = true)]
async fn test_timestamps_are_monotonic_in_buffer() {
    let mut feed = ActivityFeedSimulator::new(steady_config(5, 50));
    feed.start();
    tokio::time::sleep(Duration::from_millis(200)).await;
    feed.stop();

    let records = feed.get_visible(LevelFilter::All, "");
    for pair in records.windows(2) {
        assert!(pair[0].timestamp >= pair[1].timestamp, "Newest first, non-decreasing generation time");
    }
}
