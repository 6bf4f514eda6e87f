//! Shared helpers for tests that run real modules written in WAT.

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::loader::BytesSource;
use crate::session::Session;

// ============================================================================
// Guest template
// ============================================================================

/// Every import the bridge offers, bound to `$`-names without the `js_` prefix.
pub const IMPORTS: &str = r#"
    (import "env" "js_random" (func $random (result f64)))
    (import "env" "js_random_range" (func $random_range (param i32 i32) (result i32)))
    (import "env" "js_log" (func $log (param i32 i32)))
    (import "env" "js_request_tick" (func $request_tick))
    (import "env" "js_start_interval_tick" (func $start_interval_tick (param i32)))
    (import "env" "js_update" (func $update))
    (import "env" "js_create_layer" (func $create_layer (param i32 i32 i32)))
    (import "env" "js_set_screen_size" (func $set_screen_size (param f64 f64 f64)))
    (import "env" "js_set_layer_size" (func $set_layer_size (param i32 f64 f64 f64)))
    (import "env" "js_clear_screen" (func $clear_screen (param i32)))
    (import "env" "js_draw_tile" (func $draw_tile (param i32 f64 f64 f64 f64 f64 f64 f64)))
    (import "env" "js_draw_circle" (func $draw_circle (param i32 f64 f64 f64 f64 f64 f64 f64)))
    (import "env" "js_draw_fps" (func $draw_fps (param i32 f64)))
"#;

/// Static strings placed in guest memory: `(offset, len)`.
pub const STR_BG: (i32, i32) = (0, 2);
pub const STR_FG: (i32, i32) = (16, 2);
pub const STR_HELLO: (i32, i32) = (32, 16);

/// Where the last `tick` argument is stored (f64).
pub const LAST_TICK_ADDR: u32 = 1016;
/// Journal: entry count (i32) followed by the entries (i32 each).
pub const JOURNAL_ADDR: u32 = 1024;

/// Value journaled by each tick in [`ticking_guest`].
pub const TICK_MARK: i32 = 9999;
/// Added to a key code when journaling `key_up`.
pub const KEY_UP_OFFSET: i32 = 1000;

/// A full module: `init_body` runs in `init` (params `$debug`, `$interval`), `tick_body`
/// runs in `tick` (param `$t`) after the timestamp is stored. Key handlers journal the
/// key code (`key_up` adds [`KEY_UP_OFFSET`]).
pub fn guest(init_body: &str, tick_body: &str) -> String {
    format!(
        r#"
(module
    {IMPORTS}
    (memory (export "memory") 1)
    (data (i32.const 0) "bg")
    (data (i32.const 16) "fg")
    (data (i32.const 32) "hello from guest")

    (func $record (param $v i32)
        (local $n i32)
        (local.set $n (i32.load (i32.const {JOURNAL_ADDR})))
        (i32.store
            (i32.add (i32.const {entries}) (i32.mul (local.get $n) (i32.const 4)))
            (local.get $v))
        (i32.store (i32.const {JOURNAL_ADDR}) (i32.add (local.get $n) (i32.const 1))))

    (func (export "init") (param $debug i32) (param $interval i32)
        {init_body})
    (func (export "tick") (param $t f64)
        (f64.store (i32.const {LAST_TICK_ADDR}) (local.get $t))
        {tick_body})
    (func (export "key_down") (param $code i32)
        (call $record (local.get $code)))
    (func (export "key_up") (param $code i32)
        (call $record (i32.add (local.get $code) (i32.const {KEY_UP_OFFSET}))))
)
"#,
        entries = JOURNAL_ADDR + 4,
    )
}

/// Guest whose every tick journals [`TICK_MARK`].
pub fn ticking_guest(init_body: &str, tick_extra: &str) -> String {
    guest(
        init_body,
        &format!("(call $record (i32.const {TICK_MARK})) {tick_extra}"),
    )
}

// ============================================================================
// Session helpers
// ============================================================================

/// Deterministic config: seeded RNG and a 50 Hz display (20ms frames).
pub fn test_config() -> BridgeConfig {
    BridgeConfig {
        refresh_rate_hz: 50,
        rng_seed: Some(0x5eed),
        ..BridgeConfig::default()
    }
}

pub fn start(wat: &str) -> Result<Session, BridgeError> {
    Session::start(test_config(), &BytesSource::new(wat.as_bytes()))
}

fn read_i32(session: &Session, addr: u32) -> i32 {
    let bytes = session.handle().read_bytes(addr, 4).unwrap();
    i32::from_le_bytes(bytes.try_into().unwrap())
}

/// Everything the guest journaled so far.
pub fn journal(session: &Session) -> Vec<i32> {
    let count = read_i32(session, JOURNAL_ADDR) as u32;
    (0..count)
        .map(|i| read_i32(session, JOURNAL_ADDR + 4 + i * 4))
        .collect()
}

/// Timestamp passed to the most recent `tick`.
pub fn last_tick_ms(session: &Session) -> f64 {
    let bytes = session.handle().read_bytes(LAST_TICK_ADDR, 8).unwrap();
    f64::from_le_bytes(bytes.try_into().unwrap())
}
