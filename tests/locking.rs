// Test the shared-canvas locking contract

use bitfont::{Canvas, Rgb, SharedCanvas};
use std::sync::{mpsc, Arc};
use std::thread;

const BG: Rgb = Rgb(255, 0, 255);
const INK: Rgb = Rgb(0, 0, 0);

#[test]
fn rebuild_is_never_observed_mid_build() {
    let shared = Arc::new(SharedCanvas::new(Canvas::new(32, 32, BG).unwrap()));
    let (tx, rx) = mpsc::channel();

    let writer = thread::spawn({
        let shared = Arc::clone(&shared);
        move || {
            // Hold the lock for the whole "build", as the packer does.
            let mut canvas = shared.lock();
            tx.send(()).unwrap();
            for y in 0..32 {
                for x in 0..32 {
                    canvas.set_pixel(x, y, INK);
                }
            }
        }
    });

    // The writer holds the lock; this read blocks until the build completes
    // and must observe the fully written canvas, never a partial state.
    rx.recv().unwrap();
    let (first, last) = shared.read(|c| (c.pixel(0, 0), c.pixel(31, 31)));
    assert_eq!(first, INK);
    assert_eq!(last, INK);

    writer.join().unwrap();
}

#[test]
fn resize_replaces_wholesale() {
    let shared = SharedCanvas::new(Canvas::new(32, 32, BG).unwrap());
    shared.lock().set_pixel(5, 5, INK);

    let old = shared.replace(Canvas::new(64, 48, BG).unwrap());
    assert_eq!(old.pixel(5, 5), INK);
    shared.read(|c| {
        assert_eq!((c.width(), c.height()), (64, 48));
        assert_eq!(c.pixel(5, 5), BG);
    });
}
