//! Double-buffered frame exchange between the canvas and the refresh side.

use std::thread;

use myrtio_led_matrix::{Rgb, frame_exchange};

const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
const BLUE: Rgb = Rgb { r: 0, g: 0, b: 255 };
const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

#[test]
fn slots_match_the_requested_size() {
    let (canvas, mut reader) = frame_exchange(48, 24);
    assert_eq!((canvas.width(), canvas.height()), (48, 24));
    let front = reader.acquire();
    assert_eq!((front.width(), front.height()), (48, 24));
}

#[test]
fn detached_swap_flips_immediately() {
    let (mut canvas, mut reader) = frame_exchange(8, 8);
    canvas.fill(None, RED);
    canvas.swap();

    assert_eq!(reader.acquire().get_pixel(0, 0), Ok(RED));
    assert_eq!(canvas.get_pixel(0, 0), Ok(BLACK));
}

#[test]
fn second_swap_returns_the_first_buffer() {
    let (mut canvas, mut reader) = frame_exchange(8, 8);
    canvas.fill(None, RED);
    canvas.swap();
    canvas.fill(None, BLUE);
    canvas.swap();

    assert_eq!(reader.acquire().get_pixel(3, 3), Ok(BLUE));
    assert_eq!(canvas.get_pixel(3, 3), Ok(RED));
}

#[test]
fn attached_swap_waits_for_adoption() {
    let (mut canvas, mut reader) = frame_exchange(8, 8);
    reader.attach();

    let painter = thread::spawn(move || {
        canvas.fill(None, RED);
        canvas.swap();
        canvas
    });

    // Nothing is adopted until the reader asks.
    while reader.acquire().get_pixel(0, 0) != Ok(RED) {
        assert!(!painter.is_finished(), "swap returned before adoption");
        thread::yield_now();
    }

    let canvas = painter.join().expect("painter thread");
    assert_eq!(canvas.get_pixel(0, 0), Ok(BLACK));
}

#[test]
fn detaching_releases_a_waiting_swap() {
    let (mut canvas, mut reader) = frame_exchange(8, 8);
    reader.attach();

    let painter = thread::spawn(move || {
        canvas.fill(None, BLUE);
        canvas.swap();
        canvas
    });
    reader.detach();

    let canvas = painter.join().expect("painter thread");
    assert_eq!(reader.acquire().get_pixel(0, 0), Ok(BLUE));
    assert_eq!(canvas.get_pixel(0, 0), Ok(BLACK));
}

#[test]
fn dropped_reader_never_blocks_the_canvas() {
    let (mut canvas, mut reader) = frame_exchange(8, 8);
    reader.attach();
    drop(reader);

    canvas.fill(None, RED);
    canvas.swap();
    assert_eq!(canvas.get_pixel(0, 0), Ok(BLACK));
}
