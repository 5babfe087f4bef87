//! Offline render of a pipeline to a stereo WAV file

use std::path::Path;

use anyhow::{Context, Result};

use crate::pipeline::Pipeline;

/// Frames rendered per `process_block` call
pub const BOUNCE_BLOCK_FRAMES: usize = 512;

/// Render `seconds` of interleaved stereo output at the pipeline's sample rate
pub fn render_stereo(pipeline: &Pipeline, seconds: f64) -> Vec<f32> {
    let total_frames = (seconds.max(0.0) * pipeline.sample_rate()).round() as usize;
    let mut rendered = Vec::with_capacity(total_frames * 2);
    let mut block = vec![0.0f32; BOUNCE_BLOCK_FRAMES * 2];

    let mut remaining = total_frames;
    while remaining > 0 {
        let frames = remaining.min(BOUNCE_BLOCK_FRAMES);
        let chunk = &mut block[..frames * 2];
        pipeline.process_block(chunk, 2);
        rendered.extend_from_slice(chunk);
        remaining -= frames;
    }
    rendered
}

/// Write `seconds` of output to a 32-bit float stereo WAV at `path`
pub fn bounce_to_wav(pipeline: &Pipeline, path: &Path, seconds: f64) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory: {}", parent.display()))?;
    }

    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: pipeline.sample_rate().round() as u32,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("failed to create wav file: {}", path.display()))?;

    let rendered = render_stereo(pipeline, seconds);
    for sample in &rendered {
        writer.write_sample(*sample).context("failed to write sample")?;
    }
    writer.finalize().context("failed to finalize wav file")?;

    log::info!(
        "bounced {} frames to {}",
        rendered.len() / 2,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineConfig;

    #[test]
    fn test_bounce_writes_stereo_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let pipeline = Pipeline::new(PipelineConfig {
            sample_rate: 8000.0,
            ..PipelineConfig::default()
        });

        bounce_to_wav(&pipeline, &path, 0.25).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 8000);
        assert_eq!(reader.len(), 4000, "0.25 s of stereo at 8 kHz");
    }

    #[test]
    fn test_render_partial_block() {
        let pipeline = Pipeline::default();
        let rendered = render_stereo(&pipeline, 600.0 / 44100.0);
        assert_eq!(rendered.len(), 1200);
        assert!(rendered.iter().all(|s| s.abs() <= 1.0));
    }
}
