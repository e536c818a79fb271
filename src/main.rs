use std::env;
use std::fs;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use minifb::{Key, Scale, Window, WindowOptions};
use tracing_subscriber::EnvFilter;

use emu8::display::{HEIGHT, WIDTH};
use emu8::Machine;

use sound::Beeper;

mod sound;

/// Host keyboard layout mirrored onto the 4x4 keypad: the 1234/QWER/ASDF/ZXCV
/// block maps to the pad's 123C/456D/789E/A0BF.
const KEY_MAP: [(Key, u8); 16] = [
    (Key::Key1, 0x1),
    (Key::Key2, 0x2),
    (Key::Key3, 0x3),
    (Key::Key4, 0xC),
    (Key::Q, 0x4),
    (Key::W, 0x5),
    (Key::E, 0x6),
    (Key::R, 0xD),
    (Key::A, 0x7),
    (Key::S, 0x8),
    (Key::D, 0x9),
    (Key::F, 0xE),
    (Key::Z, 0xA),
    (Key::X, 0x0),
    (Key::C, 0xB),
    (Key::V, 0xF),
];

const PIXEL_ON: u32 = 0x0000_7FFF;

/// Instructions interpreted per 60 Hz frame unless overridden on the
/// command line. 10 per frame approximates the usual ~700 Hz CPU.
const INSTRUCTIONS_PER_TICK: usize = 10;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("emu8=info".parse()?))
        .init();

    let mut args = env::args().skip(1);
    let Some(rom_path) = args.next() else {
        bail!("usage: emu8 <rom> [instructions-per-tick]");
    };
    let ipt = match args.next() {
        Some(raw) => raw
            .parse::<usize>()
            .context("instructions-per-tick must be a number")?,
        None => INSTRUCTIONS_PER_TICK,
    };

    let image = fs::read(&rom_path).with_context(|| format!("reading rom {rom_path}"))?;
    let mut machine = Machine::new();
    machine.load(&image)?;
    tracing::info!("loaded {} byte rom from {rom_path}", image.len());

    let beeper = match Beeper::new() {
        Ok(beeper) => Some(beeper),
        Err(err) => {
            tracing::warn!("audio disabled: {err:#}");
            None
        }
    };

    let mut window = Window::new(
        "emu8 - ESC to exit",
        WIDTH,
        HEIGHT,
        WindowOptions {
            scale: Scale::X16,
            ..WindowOptions::default()
        },
    )
    .context("opening window")?;
    window.set_position(500, 300);
    // Limit to max ~60 fps update rate
    window.limit_update_rate(Some(Duration::from_micros(16600)));

    let mut pixels = vec![0u32; WIDTH * HEIGHT];
    let mut frames = 0u32;
    let mut last_report = Instant::now();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        for (key, symbol) in KEY_MAP {
            machine.set_key(symbol, window.is_key_down(key));
        }

        for _ in 0..ipt {
            if machine.is_waiting_for_key() {
                break;
            }
            if let Err(err) = machine.step() {
                tracing::error!("halting: {err}");
                return Err(err.into());
            }
        }

        machine.tick_timers();
        if let Some(beeper) = &beeper {
            beeper.set_active(machine.sound_active());
        }

        for (out, on) in pixels.iter_mut().zip(machine.render_target().pixels()) {
            *out = if *on { PIXEL_ON } else { 0 };
        }
        window
            .update_with_buffer(&pixels, WIDTH, HEIGHT)
            .context("presenting frame")?;

        frames += 1;
        if last_report.elapsed() >= Duration::from_secs(1) {
            tracing::debug!("{frames} fps");
            frames = 0;
            last_report = Instant::now();
        }
    }

    Ok(())
}
