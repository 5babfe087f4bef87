use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    Device, FromSample, Sample, SizedSample, Stream, StreamConfig,
};
use super::AudioOutput;
use crate::pipeline::Pipeline;
use std::sync::Arc;

pub struct CpalOutput {
    stream: Option<Stream>,
    device: Option<Device>,
    config: Option<StreamConfig>,
    sample_rate: f64,
    is_active: bool,
}

impl CpalOutput {
    pub fn new() -> Self {
        Self {
            stream: None,
            device: None,
            config: None,
            sample_rate: 44100.0,
            is_active: false,
        }
    }

    /// Build the output stream around a pipeline. The pipeline is prepared
    /// for the device sample rate first.
    pub fn create_stream(&mut self, pipeline: Arc<Pipeline>) -> Result<(), anyhow::Error> {
        let device = self.device.as_ref().ok_or_else(|| anyhow::anyhow!("Device not initialized"))?;
        let config = self.config.as_ref().ok_or_else(|| anyhow::anyhow!("Config not initialized"))?;

        pipeline.prepare(self.sample_rate);

        let supported_config = device.default_output_config()?;
        let stream = match supported_config.sample_format() {
            cpal::SampleFormat::I8 => Self::make_stream::<i8>(device, config, pipeline)?,
            cpal::SampleFormat::I16 => Self::make_stream::<i16>(device, config, pipeline)?,
            cpal::SampleFormat::I32 => Self::make_stream::<i32>(device, config, pipeline)?,
            cpal::SampleFormat::I64 => Self::make_stream::<i64>(device, config, pipeline)?,
            cpal::SampleFormat::U8 => Self::make_stream::<u8>(device, config, pipeline)?,
            cpal::SampleFormat::U16 => Self::make_stream::<u16>(device, config, pipeline)?,
            cpal::SampleFormat::U32 => Self::make_stream::<u32>(device, config, pipeline)?,
            cpal::SampleFormat::U64 => Self::make_stream::<u64>(device, config, pipeline)?,
            cpal::SampleFormat::F32 => Self::make_stream::<f32>(device, config, pipeline)?,
            cpal::SampleFormat::F64 => Self::make_stream::<f64>(device, config, pipeline)?,
            sample_format => return Err(anyhow::anyhow!("Unsupported sample format '{}'", sample_format)),
        };

        self.stream = Some(stream);
        Ok(())
    }

    fn setup_host_device(&mut self) -> Result<(), anyhow::Error> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow::anyhow!("Default output device is not available"))?;

        log::info!("Output device: {}", device.name()?);

        let config = device.default_output_config()?;
        log::debug!("Default output config: {:?}", config);
        if config.channels() < 2 {
            log::warn!("output device is mono; only the x channel will be heard");
        }

        self.sample_rate = config.sample_rate().0 as f64;
        self.device = Some(device);
        self.config = Some(config.into());

        Ok(())
    }

    fn make_stream<T>(device: &Device, config: &StreamConfig, pipeline: Arc<Pipeline>) -> Result<Stream, anyhow::Error>
    where
        T: SizedSample + FromSample<f32>,
    {
        let num_channels = config.channels as usize;
        let err_fn = |err| log::error!("Error building output sound stream: {}", err);

        // Device-format conversion goes through an f32 block
        let mut scratch: Vec<f32> = Vec::new();

        let stream = device.build_output_stream(
            config,
            move |output: &mut [T], _: &cpal::OutputCallbackInfo| {
                Self::process_block(output, &pipeline, num_channels, &mut scratch);
            },
            err_fn,
            None,
        )?;

        Ok(stream)
    }

    fn process_block<SampleType>(
        output: &mut [SampleType],
        pipeline: &Pipeline,
        num_channels: usize,
        scratch: &mut Vec<f32>,
    ) where
        SampleType: Sample + FromSample<f32>,
    {
        scratch.resize(output.len(), 0.0);
        pipeline.process_block(scratch, num_channels);
        for (sample, value) in output.iter_mut().zip(scratch.iter()) {
            *sample = SampleType::from_sample(*value);
        }
    }
}

impl Default for CpalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutput for CpalOutput {
    fn initialize(&mut self, sample_rate: f64) -> Result<(), anyhow::Error> {
        self.sample_rate = sample_rate;
        self.setup_host_device()?;
        Ok(())
    }

    fn start(&mut self) -> Result<(), anyhow::Error> {
        if let Some(stream) = &self.stream {
            stream.play()?;
            self.is_active = true;
            log::info!("Audio stream started at sample rate: {}", self.sample_rate);
        } else {
            return Err(anyhow::anyhow!("Stream not created. Call create_stream first."));
        }

        Ok(())
    }

    fn stop(&mut self) -> Result<(), anyhow::Error> {
        if let Some(stream) = &self.stream {
            stream.pause()?;
            self.is_active = false;
            log::info!("Audio stream stopped");
        }

        Ok(())
    }

    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}
