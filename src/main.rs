use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use log::{debug, trace, LevelFilter};

use dotstar_controller::{Color, PixelOrder, Strip, StripConfig};

/// DotStar LED Strip Controller
#[derive(Parser)]
#[command(version, about)]
struct Opts {
    /// Verbosity, can be used multiple times
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// YAML config file; the flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// BCM pin carrying the clock line
    #[arg(long)]
    clock_pin: Option<u8>,

    /// BCM pin carrying the data line
    #[arg(long)]
    data_pin: Option<u8>,

    /// Number of LEDs per line
    #[arg(short, long)]
    length: Option<usize>,

    /// Number of parallel lines
    #[arg(long)]
    lines: Option<usize>,

    /// Global brightness, 0.0 to 1.0
    #[arg(short, long)]
    brightness: Option<f32>,

    /// Channel order on the wire: rgb, rbg, grb, gbr, brg or bgr
    #[arg(short, long)]
    order: Option<PixelOrder>,

    /// SPI clock speed in hz
    #[arg(long)]
    spi_clock: Option<u32>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Set all LEDs a single color
    Set(SetOpts),
    /// Blank the strip and release it
    Off,
    /// Animate a moving hue wheel
    Cycle(CycleOpts),
    /// Measure raw frame throughput
    Throughput(ThroughputOpts),
}

#[derive(Parser)]
struct SetOpts {
    /// Red
    red: u8,
    /// Green
    green: u8,
    /// Blue
    blue: u8,
    /// Per-pixel brightness, 0.0 to 1.0
    #[arg(long, default_value_t = 1.0)]
    alpha: f32,
}

#[derive(Parser)]
struct CycleOpts {
    /// Seconds to run for
    #[arg(long, default_value_t = 10.0)]
    duration: f32,

    /// Hue revolutions per second
    #[arg(long, default_value_t = 0.2)]
    speed: f32,

    /// Frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,
}

#[derive(Parser)]
struct ThroughputOpts {
    /// Seconds to measure over
    #[arg(long, default_value_t = 4)]
    seconds: u64,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn build_config(opts: &Opts) -> Result<StripConfig> {
    let mut config = match &opts.config {
        Some(path) => StripConfig::from_path(path)?,
        None => StripConfig::default(),
    };
    if let Some(pin) = opts.clock_pin {
        config.clock_pin = pin;
    }
    if let Some(pin) = opts.data_pin {
        config.data_pin = pin;
    }
    if let Some(length) = opts.length {
        config.length = length;
    }
    if let Some(lines) = opts.lines {
        config.lines = lines;
    }
    if let Some(brightness) = opts.brightness {
        config.brightness = brightness;
    }
    if let Some(order) = opts.order {
        config.pixel_order = order;
    }
    if let Some(baudrate) = opts.spi_clock {
        config.baudrate = baudrate;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    init_logging(opts.verbose);

    let config = build_config(&opts)?;
    debug!("strip config: {:?}", config);

    let mut strip = Strip::open(&config)?;
    trace!("initial buffer:\n{}", strip.dump());

    match opts.cmd {
        Command::Set(set) => {
            strip.fill(Color::Rgba(set.red, set.green, set.blue, set.alpha))?;
            if !strip.auto_update() {
                strip.flush_all()?;
            }
            trace!("buffer after fill:\n{}", strip.dump());
        }
        Command::Off => {
            strip.deinit()?;
        }
        Command::Cycle(cycle) => {
            run_cycle(&mut strip, &cycle)?;
            strip.deinit()?;
        }
        Command::Throughput(throughput) => {
            strip.set_auto_update(false);
            strip.fill(Color::Packed(0x000000))?;
            let window = Duration::from_secs(throughput.seconds);
            let mut frames = 0u64;
            let start = Instant::now();
            while start.elapsed() < window {
                strip.flush_all()?;
                frames += 1;
            }
            println!(
                "{} frames in {}s ({} fps)",
                frames,
                throughput.seconds,
                frames / throughput.seconds.max(1)
            );
        }
    }

    Ok(())
}

fn run_cycle(strip: &mut Strip, cycle: &CycleOpts) -> Result<()> {
    let length = strip.len();
    let frame_period = Duration::from_secs_f32(1.0 / cycle.fps as f32);
    let start = Instant::now();
    while start.elapsed().as_secs_f32() < cycle.duration {
        let t = start.elapsed().as_secs_f32();
        strip.batch(|strip| {
            for i in 0..length {
                let phase = (t * cycle.speed + i as f32 / length as f32).fract();
                let color = hue_color(f64::from(phase) * 360.0);
                strip.set(i, color)?;
            }
            Ok(())
        })?;
        thread::sleep(frame_period);
    }
    Ok(())
}

fn hue_color(hue: f64) -> Color {
    let (r, g, b) = hsluv::hsluv_to_rgb((hue, 100.0, 60.0));
    // Rough gamma so mid hues don't wash out
    Color::Rgb(
        (255.5 * r * r) as u8,
        (255.5 * g * g) as u8,
        (255.5 * b * b) as u8,
    )
}
