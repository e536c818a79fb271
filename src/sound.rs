use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};

const TONE_HZ: f32 = 440.0;

/// Buzzer gated by the sound timer. The output stream runs for the life of
/// the program; `set_active` flips between the tone and silence so the cue
/// never has to re-open the device.
pub struct Beeper {
    _stream: cpal::Stream,
    active: Arc<AtomicBool>,
}

impl Beeper {
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("no audio output device available"))?;
        let supported_config = device
            .supported_output_configs()
            .context("querying audio output configs")?
            .next()
            .ok_or_else(|| anyhow!("no supported audio output config"))?
            .with_max_sample_rate();
        let sample_format = supported_config.sample_format();
        let config = supported_config.into();
        let active = Arc::new(AtomicBool::new(false));

        let stream = match sample_format {
            cpal::SampleFormat::I8 => Self::build::<i8>(&device, &config, &active),
            cpal::SampleFormat::I16 => Self::build::<i16>(&device, &config, &active),
            cpal::SampleFormat::I32 => Self::build::<i32>(&device, &config, &active),
            cpal::SampleFormat::I64 => Self::build::<i64>(&device, &config, &active),
            cpal::SampleFormat::U8 => Self::build::<u8>(&device, &config, &active),
            cpal::SampleFormat::U16 => Self::build::<u16>(&device, &config, &active),
            cpal::SampleFormat::U32 => Self::build::<u32>(&device, &config, &active),
            cpal::SampleFormat::U64 => Self::build::<u64>(&device, &config, &active),
            cpal::SampleFormat::F32 => Self::build::<f32>(&device, &config, &active),
            cpal::SampleFormat::F64 => Self::build::<f64>(&device, &config, &active),
            sample_format => bail!("unsupported sample format '{sample_format}'"),
        }?;
        stream.play().context("starting audio stream")?;

        Ok(Self {
            _stream: stream,
            active,
        })
    }

    pub fn set_active(&self, on: bool) {
        self.active.store(on, Ordering::Relaxed);
    }

    fn build<T>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        active: &Arc<AtomicBool>,
    ) -> Result<cpal::Stream>
    where
        T: SizedSample + FromSample<f32>,
    {
        let sample_rate = config.sample_rate.0 as f32;
        let channels = config.channels as usize;
        let active = Arc::clone(active);

        // Sinusoid while active, flat silence otherwise.
        let mut sample_clock = 0f32;
        let mut next_value = move || {
            if !active.load(Ordering::Relaxed) {
                return 0.0;
            }
            sample_clock = (sample_clock + 1.0) % sample_rate;
            (sample_clock * TONE_HZ * 2.0 * std::f32::consts::PI / sample_rate).sin()
        };

        let err_fn = |err| tracing::warn!("an error occurred on the audio stream: {err}");

        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                Self::write_data(data, channels, &mut next_value)
            },
            err_fn,
            None,
        )?;
        Ok(stream)
    }

    fn write_data<T>(output: &mut [T], channels: usize, next_sample: &mut dyn FnMut() -> f32)
    where
        T: Sample + FromSample<f32>,
    {
        for frame in output.chunks_mut(channels) {
            let value: T = T::from_sample(next_sample());
            for sample in frame.iter_mut() {
                *sample = value;
            }
        }
    }
}
