//! Pixel-array surface over the frame buffer and transport.

use std::num::NonZeroUsize;

use log::info;

use crate::color::Color;
use crate::config::StripConfig;
use crate::error::StripError;
use crate::frame::FrameBuffer;
use crate::transport::{Transmit, Transport};

/// A chain of DotStar pixels, or several parallel chains sharing clock
/// timing.
///
/// Mutations edit the frame buffer in place. With auto-update enabled
/// (the default) each mutation also pushes the affected line out; turn it
/// off or use [`Strip::batch`] when writing many pixels per frame.
pub struct Strip<T = Transport> {
    frame: FrameBuffer,
    transport: Option<T>,
    brightness: f32,
    auto_update: bool,
}

impl Strip<Transport> {
    /// Acquire the transport described by `config` and build a blank strip.
    pub fn open(config: &StripConfig) -> Result<Self, StripError> {
        let transport = Transport::acquire(config.clock_pin, config.data_pin, config.baudrate)?;
        Self::with_transport(transport, config)
    }
}

impl<T: Transmit> Strip<T> {
    /// Build a strip over any transmit sink; [`Strip::open`] is the
    /// hardware shorthand.
    pub fn with_transport(transport: T, config: &StripConfig) -> Result<Self, StripError> {
        let frame = FrameBuffer::new(config.length, config.lines, config.pixel_order)?;
        let mut strip = Self {
            frame,
            transport: Some(transport),
            brightness: 1.0,
            auto_update: false,
        };
        // Route the configured brightness through the setter for the clamp,
        // with auto-update held off so nothing is flushed yet.
        strip.set_brightness(config.brightness)?;
        strip.auto_update = config.auto_update;
        Ok(strip)
    }

    /// Pixels per line.
    pub fn len(&self) -> usize {
        self.frame.length()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.length() == 0
    }

    /// Parallel lines.
    pub fn lines(&self) -> usize {
        self.frame.lines()
    }

    /// Color of a pixel on the first line.
    pub fn get(&self, index: usize) -> Result<(u8, u8, u8), StripError> {
        self.frame.pixel(0, index)
    }

    /// Color of a pixel on an explicit line.
    pub fn get_at(&self, line: usize, index: usize) -> Result<(u8, u8, u8), StripError> {
        self.frame.pixel(line, index)
    }

    /// Colors of the stepped range `start..stop` on the first line, with
    /// `stop` clamped to the strip length.
    pub fn get_range(&self, start: usize, stop: usize, step: NonZeroUsize) -> Vec<(u8, u8, u8)> {
        let stop = stop.min(self.len());
        (start..stop)
            .step_by(step.get())
            .filter_map(|index| self.frame.pixel(0, index).ok())
            .collect()
    }

    /// Set a pixel on the first line.
    pub fn set(&mut self, index: usize, color: impl Into<Color>) -> Result<(), StripError> {
        self.set_at(0, index, color)
    }

    /// Set a pixel on an explicit line.
    pub fn set_at(
        &mut self,
        line: usize,
        index: usize,
        color: impl Into<Color>,
    ) -> Result<(), StripError> {
        self.frame.set_pixel(line, index, color.into())?;
        self.maybe_flush_line(line)
    }

    /// Assign `colors` across the stepped range `start..stop` on the first
    /// line. All or nothing: a length mismatch mutates no pixel.
    pub fn set_range(
        &mut self,
        start: usize,
        stop: usize,
        step: NonZeroUsize,
        colors: &[Color],
    ) -> Result<(), StripError> {
        let stop = stop.min(self.len());
        let expected = stop.saturating_sub(start).div_ceil(step.get());
        if colors.len() != expected {
            return Err(StripError::LengthMismatch {
                expected,
                actual: colors.len(),
            });
        }
        for (&color, index) in colors.iter().zip((start..stop).step_by(step.get())) {
            self.frame.set_pixel(0, index, color)?;
        }
        self.maybe_flush_line(0)
    }

    /// Set every pixel on every line, then flush once per line.
    pub fn fill(&mut self, color: impl Into<Color>) -> Result<(), StripError> {
        let color = color.into();
        for line in 0..self.lines() {
            for index in 0..self.len() {
                self.frame.set_pixel(line, index, color)?;
            }
        }
        self.flush_if_auto()
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    /// Global output brightness, silently clamped to [0, 1]. Applied at
    /// transmission time; the stored pixel values are untouched.
    pub fn set_brightness(&mut self, brightness: f32) -> Result<(), StripError> {
        self.brightness = brightness.clamp(0.0, 1.0);
        self.flush_if_auto()
    }

    pub fn auto_update(&self) -> bool {
        self.auto_update
    }

    pub fn set_auto_update(&mut self, auto_update: bool) {
        self.auto_update = auto_update;
    }

    /// Run several mutations with auto-update suppressed, then flush every
    /// line once if auto-update was on.
    pub fn batch<F, R>(&mut self, f: F) -> Result<R, StripError>
    where
        F: FnOnce(&mut Self) -> Result<R, StripError>,
    {
        let auto = self.auto_update;
        self.auto_update = false;
        let result = f(self);
        self.auto_update = auto;
        let value = result?;
        self.flush_if_auto()?;
        Ok(value)
    }

    /// Transmit one line's region regardless of the auto-update policy.
    ///
    /// On the hardware path the colors may or may not be showing by the
    /// time this returns; the transfer can complete asynchronously.
    pub fn flush(&mut self, line: usize) -> Result<(), StripError> {
        let span = self.frame.line_span(line)?;
        let transport = self.transport.as_mut().ok_or(StripError::Released)?;
        let rendered = self.frame.rendered(self.brightness);
        transport.send(&rendered[span])
    }

    /// Transmit every line.
    pub fn flush_all(&mut self) -> Result<(), StripError> {
        for line in 0..self.lines() {
            self.flush(line)?;
        }
        Ok(())
    }

    /// Blank the strip, push the blank frame out, and release the
    /// transport. Safe to call more than once; later calls do nothing.
    pub fn deinit(&mut self) -> Result<(), StripError> {
        let Some(mut transport) = self.transport.take() else {
            return Ok(());
        };
        self.auto_update = false;
        self.frame.blank();
        for line in 0..self.frame.lines() {
            let span = self.frame.line_span(line)?;
            let rendered = self.frame.rendered(self.brightness);
            transport.send(&rendered[span])?;
        }
        info!("strip blanked and released");
        Ok(())
    }

    /// Hex dump of the raw frame buffer. Diagnostic only.
    pub fn dump(&self) -> String {
        self.frame.dump()
    }

    fn maybe_flush_line(&mut self, line: usize) -> Result<(), StripError> {
        if self.auto_update {
            self.flush(line)
        } else {
            Ok(())
        }
    }

    fn flush_if_auto(&mut self) -> Result<(), StripError> {
        if self.auto_update {
            self.flush_all()
        } else {
            Ok(())
        }
    }
}
