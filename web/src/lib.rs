//! Browser bindings. The host JavaScript drives the three entry points and,
//! after each `next_frame` call, uploads `vertex_count * 8` floats starting
//! at `vertex_buffer_ptr` straight out of wasm memory.

use gramita_core::Game;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

thread_local! {
    static GAME: RefCell<Option<Game>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn run_app() {
    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    let _ = console_log::init_with_level(log::Level::Debug);
    log::debug!("module loaded");
}

/// Starts a new game, fully replacing any prior board state.
#[wasm_bindgen]
pub fn initialize(seed: i32) {
    GAME.with_borrow_mut(|slot| *slot = Some(Game::new(seed)));
    log::debug!("game initialized with seed {}", seed);
}

/// Pixel-space click; `secondary` selects the mark action.
#[wasm_bindgen]
pub fn on_mouse_click(x: f32, y: f32, secondary: bool) {
    GAME.with_borrow_mut(|slot| {
        let Some(game) = slot.as_mut() else {
            log::warn!("on_mouse_click before initialize, ignored");
            return;
        };
        if let Err(err) = game.on_click(x, y, secondary) {
            log::error!("click dropped: {}", err);
        }
    });
}

/// Advances one frame and returns the vertex count written.
#[wasm_bindgen]
pub fn next_frame(timestamp: f64) -> i32 {
    GAME.with_borrow_mut(|slot| {
        let Some(game) = slot.as_mut() else {
            log::warn!("next_frame before initialize, ignored");
            return 0;
        };
        match game.advance_frame(timestamp) {
            Ok(count) => count as i32,
            Err(err) => {
                log::error!("frame dropped: {}", err);
                0
            }
        }
    })
}

/// Address of the current frame's vertex stream in wasm memory.
///
/// The backing storage is allocated once per game and never moves, so the
/// pointer stays valid between `initialize` calls; the contents are only
/// meaningful between one `next_frame` return and the next call in.
#[wasm_bindgen]
pub fn vertex_buffer_ptr() -> *const u8 {
    GAME.with_borrow(|slot| {
        slot.as_ref()
            .map_or(std::ptr::null(), |game| game.vertex_bytes().as_ptr())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_host_sequence_produces_a_frame() {
        initialize(99);
        on_mouse_click(10.0, 10.0, false);
        let count = next_frame(16.6);
        assert!(count >= 800);
        assert!(!vertex_buffer_ptr().is_null());
    }

    #[test]
    fn calls_before_initialize_are_harmless() {
        GAME.with_borrow_mut(|slot| *slot = None);
        on_mouse_click(1.0, 1.0, true);
        assert_eq!(next_frame(0.0), 0);
        assert!(vertex_buffer_ptr().is_null());
    }
}
