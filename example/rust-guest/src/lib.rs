#![no_std]

// Minimal astar Rust guest.
//
// This crate is meant to be compiled to `wasm32-unknown-unknown` and loaded by `astar-host`.
//
// The host calls:
// - `init(debug, render_interval_ms)` once, after loading.
// - `tick(elapsed_ms)` once per frame (or per interval in debug mode).
// - `key_down(code)` / `key_up(code)` for every keyboard event.

extern crate alloc;

use alloc::format;
use astar_sdk::prelude::*;

#[global_allocator]
static ALLOC: astar_sdk::wee_alloc::WeeAlloc = astar_sdk::wee_alloc::WeeAlloc::INIT;

#[cfg(target_arch = "wasm32")]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    core::arch::wasm32::unreachable()
}

const LAYER_BG: i32 = 0;
const LAYER_FG: i32 = 1;
const LAYER_FPS: i32 = 2;

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 600.0;
const QUALITY: f64 = 1.0;
const TILE: f64 = 30.0;
const COLS: i32 = (WIDTH / TILE) as i32;
const ROWS: i32 = (HEIGHT / TILE) as i32;

static mut PLAYER_X: i32 = 0;
static mut PLAYER_Y: i32 = 0;
static mut GOAL_X: i32 = 0;
static mut GOAL_Y: i32 = 0;
static mut HELD_DX: i32 = 0;
static mut HELD_DY: i32 = 0;
static mut LAST_TICK_MS: f64 = 0.0;
static mut DEBUG: bool = false;

fn place_goal() {
    unsafe {
        GOAL_X = engine::random_range(0, COLS - 1);
        GOAL_Y = engine::random_range(0, ROWS - 1);
    }
}

fn draw_background() {
    layers::clear(LAYER_BG);
    for row in 0..ROWS {
        for col in 0..COLS {
            let light = if (row + col) % 2 == 0 { 12.0 } else { 16.0 };
            let color = Hsla::new(220.0, 20.0, light, 1.0);
            draw::tile(LAYER_BG, col as f64 * TILE, row as f64 * TILE, TILE, color);
        }
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn init(debug: i32, render_interval_ms: i32) {
    engine::log(&format!("init debug={debug} interval={render_interval_ms}ms"));

    layers::set_screen_size(WIDTH, HEIGHT, QUALITY);
    for (key, id) in [(LAYER_BG, "bg"), (LAYER_FG, "fg"), (LAYER_FPS, "fps")] {
        layers::create(id, key);
        layers::set_size(key, WIDTH, HEIGHT, QUALITY);
    }

    draw_background();
    place_goal();

    unsafe {
        DEBUG = debug != 0;
        PLAYER_X = COLS / 2;
        PLAYER_Y = ROWS / 2;
    }

    if debug != 0 {
        engine::start_interval_tick(render_interval_ms);
    } else {
        engine::request_tick();
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn tick(elapsed_ms: f64) {
    let (px, py, gx, gy, fps, debug) = unsafe {
        PLAYER_X = (PLAYER_X + HELD_DX).clamp(0, COLS - 1);
        PLAYER_Y = (PLAYER_Y + HELD_DY).clamp(0, ROWS - 1);
        if PLAYER_X == GOAL_X && PLAYER_Y == GOAL_Y {
            engine::log("goal reached");
            place_goal();
        }

        let delta = elapsed_ms - LAST_TICK_MS;
        LAST_TICK_MS = elapsed_ms;
        let fps = if delta > 0.0 { 1000.0 / delta } else { 0.0 };
        (PLAYER_X, PLAYER_Y, GOAL_X, GOAL_Y, fps, DEBUG)
    };

    layers::clear(LAYER_FG);
    draw::tile(
        LAYER_FG,
        gx as f64 * TILE,
        gy as f64 * TILE,
        TILE,
        Hsla::new(120.0, 60.0, 45.0, 0.8),
    );
    let half = TILE / 2.0;
    draw::circle(
        LAYER_FG,
        px as f64 * TILE + half,
        py as f64 * TILE + half,
        half - 2.0,
        Hsla::new(30.0, 90.0, 55.0, 1.0),
    );

    layers::clear(LAYER_FPS);
    draw::fps(LAYER_FPS, fps);
    engine::update();

    if !debug {
        engine::request_tick();
    }
}

fn direction(code: u32) -> Option<(i32, i32)> {
    match code {
        keys::LEFT | keys::A => Some((-1, 0)),
        keys::RIGHT | keys::D => Some((1, 0)),
        keys::UP | keys::W => Some((0, -1)),
        keys::DOWN | keys::S => Some((0, 1)),
        _ => None,
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn key_down(code: u32) {
    if let Some((dx, dy)) = direction(code) {
        unsafe {
            HELD_DX = dx;
            HELD_DY = dy;
        }
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn key_up(code: u32) {
    if let Some((dx, dy)) = direction(code) {
        unsafe {
            if HELD_DX == dx && HELD_DY == dy {
                HELD_DX = 0;
                HELD_DY = 0;
            }
        }
    }
}
