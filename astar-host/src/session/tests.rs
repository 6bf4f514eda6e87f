//! Scheduling and input delivery against real modules.

use std::time::Duration;

use super::*;
use crate::loader::BytesSource;
use crate::test_utils::*;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn interval_tick_is_deferred_then_periodic() {
    let mut session = start(&ticking_guest(
        "(call $start_interval_tick (i32.const 16))",
        "",
    ))
    .unwrap();

    // `init` returned without the module being ticked.
    assert_eq!(session.ticks_delivered(), 0);
    assert!(journal(&session).is_empty());
    assert_eq!(
        session.tick_mode(),
        TickMode::FixedInterval { period: ms(16) }
    );

    // The deferred first tick runs on the next turn, at the same instant.
    assert_eq!(session.run_until_idle().unwrap(), 1);
    assert_eq!(session.ticks_delivered(), 1);
    assert_eq!(last_tick_ms(&session), 0.0);

    session.advance(ms(16)).unwrap();
    assert_eq!(session.ticks_delivered(), 2);
    assert_eq!(last_tick_ms(&session), 16.0);

    session.advance(ms(48)).unwrap();
    assert_eq!(session.ticks_delivered(), 5);
    assert_eq!(last_tick_ms(&session), 64.0);
    assert_eq!(journal(&session), vec![TICK_MARK; 5]);
}

#[test]
fn request_tick_is_ignored_once_interval_runs() {
    let mut session = start(&ticking_guest(
        r#"
        (call $start_interval_tick (i32.const 16))
        (call $request_tick)
        (call $request_tick)
        (call $request_tick)
        "#,
        "(call $request_tick)",
    ))
    .unwrap();
    assert_eq!(session.pending_tasks(), 2);

    session.advance(ms(100)).unwrap();
    // Deferred tick plus 16, 32, 48, 64, 80, 96.
    assert_eq!(session.ticks_delivered(), 7);
    // Only the recurring interval is left; no animation frame was ever queued.
    assert_eq!(session.pending_tasks(), 1);
}

#[test]
fn repeated_interval_start_keeps_first_period() {
    let mut session = start(&ticking_guest(
        r#"
        (call $start_interval_tick (i32.const 20))
        (call $start_interval_tick (i32.const 5))
        "#,
        "(call $start_interval_tick (i32.const 1))",
    ))
    .unwrap();

    session.advance(ms(100)).unwrap();
    assert_eq!(session.ticks_delivered(), 6);
    assert_eq!(session.tick_mode(), TickMode::FixedInterval { period: ms(20) });
}

#[test]
fn animation_frames_follow_refresh_boundaries() {
    let mut session = start(&ticking_guest(
        "(call $request_tick) (call $request_tick)",
        "(call $request_tick)",
    ))
    .unwrap();
    assert_eq!(session.tick_mode(), TickMode::AnimationFrame);
    // Each request from `init` queued its own frame.
    assert_eq!(session.pending_tasks(), 2);

    // Nothing is due before the first refresh.
    assert_eq!(session.run_until_idle().unwrap(), 0);

    session.advance(ms(20)).unwrap();
    assert_eq!(session.ticks_delivered(), 2);
    assert_eq!(last_tick_ms(&session), 20.0);

    // Both callbacks re-request, so every refresh at 40..=120 ticks twice.
    session.advance(ms(100)).unwrap();
    assert_eq!(session.ticks_delivered(), 12);
    assert_eq!(last_tick_ms(&session), 120.0);
    assert_eq!(session.pending_tasks(), 2);
}

#[test]
fn two_requests_tick_twice_on_the_next_frame() {
    let mut session = start(&ticking_guest(
        "(call $request_tick) (call $request_tick)",
        "",
    ))
    .unwrap();

    session.advance(ms(20)).unwrap();
    assert_eq!(session.ticks_delivered(), 2);
    assert_eq!(journal(&session), vec![TICK_MARK; 2]);

    session.advance(Duration::from_secs(1)).unwrap();
    assert_eq!(session.ticks_delivered(), 2);
}

#[test]
fn animation_loop_stops_without_rerequest() {
    let mut session = start(&ticking_guest("(call $request_tick)", "")).unwrap();

    session.advance(Duration::from_secs(1)).unwrap();
    assert_eq!(session.ticks_delivered(), 1);
    assert_eq!(session.pending_tasks(), 0);
}

#[test]
fn interval_takes_over_from_animation_frames() {
    let mut session = start(&ticking_guest(
        "(call $request_tick)",
        r#"
        (call $start_interval_tick (i32.const 50))
        (call $request_tick)
        "#,
    ))
    .unwrap();

    // Frame at 20ms starts the interval: deferred tick at 20, then 70, 120.
    session.advance(ms(130)).unwrap();
    assert_eq!(session.ticks_delivered(), 4);
    assert_eq!(
        session.tick_mode(),
        TickMode::FixedInterval { period: ms(50) }
    );
}

#[test]
fn no_tick_without_a_request() {
    let mut session = start(&ticking_guest("", "")).unwrap();
    assert_eq!(session.tick_mode(), TickMode::Uninitialized);
    session.advance(Duration::from_secs(5)).unwrap();
    assert_eq!(session.ticks_delivered(), 0);
}

#[test]
fn keys_reach_module_in_publish_order() {
    let mut session = start(&ticking_guest("", "")).unwrap();
    let keys = session.publisher();
    keys.key_down(37);
    keys.key_up(37);
    keys.key_down(40);
    keys.key_down(40);

    assert_eq!(session.run_until_idle().unwrap(), 4);
    assert_eq!(
        journal(&session),
        vec![37, 37 + KEY_UP_OFFSET, 40, 40]
    );
}

#[test]
fn keys_interleave_with_ticks_in_delivery_order() {
    let mut session = start(&ticking_guest(
        "(call $start_interval_tick (i32.const 16))",
        "",
    ))
    .unwrap();
    let keys = session.publisher();

    // The deferred tick was queued by `init`, before this key was published.
    keys.key_down(1);
    session.run_until_idle().unwrap();
    assert_eq!(journal(&session), vec![TICK_MARK, 1]);

    // Published before the interval tick at 16ms comes due.
    keys.key_up(1);
    session.advance(ms(16)).unwrap();
    assert_eq!(
        journal(&session),
        vec![TICK_MARK, 1, 1 + KEY_UP_OFFSET, TICK_MARK]
    );
}

#[test]
fn keys_from_another_thread_are_delivered() {
    let mut session = start(&ticking_guest("", "")).unwrap();
    let keys = session.publisher();
    std::thread::spawn(move || {
        for code in [87, 65, 83, 68] {
            keys.key_down(code);
        }
    })
    .join()
    .unwrap();

    session.run_until_idle().unwrap();
    assert_eq!(journal(&session), vec![87, 65, 83, 68]);
}

#[test]
fn guest_trap_surfaces_with_entry_name() {
    let mut session = start(&ticking_guest(
        "(call $start_interval_tick (i32.const 10))",
        "unreachable",
    ))
    .unwrap();

    let err = session.run_until_idle().unwrap_err();
    assert!(matches!(err, BridgeError::Trap { entry: "tick", .. }));
    assert!(session.handle().executing().is_none());
}

#[test]
fn realtime_driver_honours_budget() {
    let mut session = start(&ticking_guest(
        "(call $start_interval_tick (i32.const 5))",
        "",
    ))
    .unwrap();

    let started = std::time::Instant::now();
    session.run_realtime(ms(30)).unwrap();
    assert!(started.elapsed() >= ms(30));
    assert_eq!(session.now(), ms(30));
    // Deferred tick plus one per 5ms.
    assert_eq!(session.ticks_delivered(), 7);
}

#[test]
fn composite_png_has_screen_size() {
    let session = start(&guest(
        &format!(
            r#"
            (call $set_screen_size (f64.const 64) (f64.const 32) (f64.const 2))
            (call $create_layer (i32.const {}) (i32.const {}) (i32.const 1))
            (call $set_layer_size (i32.const 1) (f64.const 64) (f64.const 32) (f64.const 2))
            (call $draw_tile (i32.const 1)
                (f64.const 0) (f64.const 0) (f64.const 64)
                (f64.const 0) (f64.const 100) (f64.const 50) (f64.const 1))
            "#,
            STR_BG.0, STR_BG.1
        ),
        "",
    ))
    .unwrap();

    let (w, h, frame) = session.composite();
    assert_eq!((w, h), (32, 16));
    assert!(frame.iter().all(|&px| px == 0xFFFF_0000));

    let mut png_bytes = Vec::new();
    session.write_png(&mut png_bytes).unwrap();
    let reader = png::Decoder::new(std::io::Cursor::new(png_bytes))
        .read_info()
        .unwrap();
    assert_eq!((reader.info().width, reader.info().height), (32, 16));
}

#[test]
fn init_receives_configured_arguments() {
    let wat = guest(
        "(call $record (local.get $debug)) (call $record (local.get $interval))",
        "",
    );
    let config = BridgeConfig {
        debug: false,
        render_interval_ms: 250,
        ..test_config()
    };
    let session = Session::start(config, &BytesSource::new(wat.as_bytes())).unwrap();
    assert_eq!(journal(&session), vec![0, 250]);
}
