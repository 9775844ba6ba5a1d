//! Strip behavior over a capture transport: auto-update policy, batching,
//! range assignment, brightness scaling on output and the deinit state.

use std::cell::RefCell;
use std::num::NonZeroUsize;
use std::rc::Rc;

use dotstar_controller::{Color, Strip, StripConfig, StripError, Transmit};

/// Records every frame region handed to it.
#[derive(Clone, Default)]
struct Capture {
    frames: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl Capture {
    fn count(&self) -> usize {
        self.frames.borrow().len()
    }

    fn last(&self) -> Vec<u8> {
        self.frames.borrow().last().cloned().expect("no frame sent")
    }
}

impl Transmit for Capture {
    fn send(&mut self, bytes: &[u8]) -> Result<(), StripError> {
        self.frames.borrow_mut().push(bytes.to_vec());
        Ok(())
    }
}

fn strip_of(length: usize, lines: usize) -> (Strip<Capture>, Capture) {
    let capture = Capture::default();
    let config = StripConfig {
        length,
        lines,
        ..StripConfig::default()
    };
    let strip = Strip::with_transport(capture.clone(), &config).unwrap();
    (strip, capture)
}

fn step(by: usize) -> NonZeroUsize {
    NonZeroUsize::new(by).unwrap()
}

#[test]
fn construction_rejects_empty_strip() {
    let config = StripConfig {
        length: 0,
        ..StripConfig::default()
    };
    assert!(matches!(
        Strip::with_transport(Capture::default(), &config),
        Err(StripError::EmptyStrip)
    ));
}

#[test]
fn construction_does_not_flush() {
    let (_, capture) = strip_of(4, 1);
    assert_eq!(capture.count(), 0);
}

#[test]
fn auto_update_flushes_each_set() {
    let (mut strip, capture) = strip_of(4, 1);
    strip.set(0, (1, 2, 3)).unwrap();
    assert_eq!(capture.count(), 1);
    strip.set(1, (4, 5, 6)).unwrap();
    assert_eq!(capture.count(), 2);

    strip.set_auto_update(false);
    strip.set(2, (7, 8, 9)).unwrap();
    assert_eq!(capture.count(), 2);
}

#[test]
fn set_at_flushes_only_the_affected_line() {
    let (mut strip, capture) = strip_of(2, 3);
    strip.set_at(1, 0, (1, 2, 3)).unwrap();
    assert_eq!(capture.count(), 1);
    // line 1's region: start frame, two pixel frames, one end byte
    let frame = capture.last();
    assert_eq!(frame.len(), 4 + 2 * 4 + 1);
    assert_eq!(&frame[0..4], &[0, 0, 0, 0]);
    assert_eq!(&frame[4..8], &[0xFF, 3, 2, 1]);
}

#[test]
fn batch_flushes_once() {
    let (mut strip, capture) = strip_of(8, 1);
    strip
        .batch(|strip| {
            for i in 0..8 {
                strip.set(i, (1, 1, 1))?;
            }
            Ok(())
        })
        .unwrap();
    assert_eq!(capture.count(), 1);
    // auto-update is restored afterwards
    assert!(strip.auto_update());
    strip.set(0, (2, 2, 2)).unwrap();
    assert_eq!(capture.count(), 2);
}

#[test]
fn batch_without_auto_update_stays_quiet() {
    let (mut strip, capture) = strip_of(4, 1);
    strip.set_auto_update(false);
    strip.batch(|strip| strip.set(0, (1, 1, 1))).unwrap();
    assert_eq!(capture.count(), 0);
}

#[test]
fn stepped_range_touches_alternating_pixels() {
    let (mut strip, _) = strip_of(4, 1);
    strip.set_auto_update(false);
    let colors = [Color::Rgb(10, 0, 0), Color::Rgb(20, 0, 0)];
    strip.set_range(0, 4, step(2), &colors).unwrap();
    assert_eq!(strip.get(0).unwrap(), (10, 0, 0));
    assert_eq!(strip.get(1).unwrap(), (0, 0, 0));
    assert_eq!(strip.get(2).unwrap(), (20, 0, 0));
    assert_eq!(strip.get(3).unwrap(), (0, 0, 0));
}

#[test]
fn length_mismatch_mutates_nothing() {
    let (mut strip, capture) = strip_of(4, 1);
    strip.set_auto_update(false);
    strip.fill((9, 9, 9)).unwrap();

    let short = [Color::Rgb(1, 1, 1)];
    assert!(matches!(
        strip.set_range(0, 4, step(2), &short),
        Err(StripError::LengthMismatch {
            expected: 2,
            actual: 1
        })
    ));
    for i in 0..4 {
        assert_eq!(strip.get(i).unwrap(), (9, 9, 9));
    }
    assert_eq!(capture.count(), 0);
}

#[test]
fn get_range_reads_back_stepped() {
    let (mut strip, _) = strip_of(5, 1);
    strip.set_auto_update(false);
    for i in 0..5 {
        strip.set(i, (i as u8, 0, 0)).unwrap();
    }
    assert_eq!(
        strip.get_range(1, 5, step(2)),
        vec![(1, 0, 0), (3, 0, 0)]
    );
    // stop beyond the strip clamps
    assert_eq!(strip.get_range(0, 100, step(1)).len(), 5);
}

#[test]
fn fill_covers_every_line() {
    let (mut strip, capture) = strip_of(3, 2);
    strip.fill((5, 6, 7)).unwrap();
    for line in 0..2 {
        for i in 0..3 {
            assert_eq!(strip.get_at(line, i).unwrap(), (5, 6, 7));
        }
    }
    // one flush per line
    assert_eq!(capture.count(), 2);
}

#[test]
fn brightness_scales_the_transmitted_frame_only() {
    let (mut strip, capture) = strip_of(1, 1);
    strip.set_auto_update(false);
    strip.set(0, (200, 100, 50)).unwrap();
    strip.set_brightness(0.5).unwrap();
    strip.flush(0).unwrap();

    let frame = capture.last();
    assert_eq!(&frame[0..4], &[0, 0, 0, 0]);
    assert_eq!(frame[4], 0xFF);
    // BGR on the wire, halved with truncation
    assert_eq!(&frame[5..8], &[25, 50, 100]);
    assert_eq!(frame[8], 0xFF);
    // the live pixel value is untouched
    assert_eq!(strip.get(0).unwrap(), (200, 100, 50));
}

#[test]
fn brightness_clamps_silently() {
    let (mut strip, _) = strip_of(1, 1);
    strip.set_auto_update(false);
    strip.set_brightness(1.5).unwrap();
    assert_eq!(strip.brightness(), 1.0);
    strip.set_brightness(-0.5).unwrap();
    assert_eq!(strip.brightness(), 0.0);
}

#[test]
fn setting_brightness_flushes_under_auto_update() {
    let (mut strip, capture) = strip_of(2, 1);
    strip.set_brightness(0.5).unwrap();
    assert_eq!(capture.count(), 1);
}

#[test]
fn flush_line_out_of_range_fails() {
    let (mut strip, _) = strip_of(2, 1);
    assert!(matches!(
        strip.flush(1),
        Err(StripError::LineOutOfRange { line: 1, lines: 1 })
    ));
}

#[test]
fn deinit_blanks_flushes_and_releases() {
    let (mut strip, capture) = strip_of(2, 1);
    strip.set(0, (9, 9, 9)).unwrap();
    let before = capture.count();

    strip.deinit().unwrap();
    assert_eq!(capture.count(), before + 1);
    let frame = capture.last();
    // color bytes zeroed, pixel headers still present
    assert_eq!(&frame[4..8], &[0xFF, 0, 0, 0]);
    assert_eq!(&frame[8..12], &[0xFF, 0, 0, 0]);

    // second deinit is a no-op, not an error
    strip.deinit().unwrap();
    assert_eq!(capture.count(), before + 1);

    assert!(matches!(strip.flush(0), Err(StripError::Released)));
}

#[test]
fn transmission_failure_surfaces() {
    struct Failing;
    impl Transmit for Failing {
        fn send(&mut self, _bytes: &[u8]) -> Result<(), StripError> {
            Err(StripError::PinWrite)
        }
    }
    let config = StripConfig {
        length: 1,
        auto_update: false,
        ..StripConfig::default()
    };
    let mut strip = Strip::with_transport(Failing, &config).unwrap();
    assert!(matches!(strip.flush(0), Err(StripError::PinWrite)));
}
