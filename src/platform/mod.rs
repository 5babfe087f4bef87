/// Platform abstraction for audio output
/// The pipeline itself is platform independent; an output pulls blocks from
/// it on the device's callback thread.

/// Trait for platform-specific audio output implementations
pub trait AudioOutput {
    /// Open the default device. `sample_rate` is used only if the device
    /// does not report its own.
    fn initialize(&mut self, sample_rate: f64) -> Result<(), anyhow::Error>;

    /// Start the audio stream
    fn start(&mut self) -> Result<(), anyhow::Error>;

    /// Stop the audio stream
    fn stop(&mut self) -> Result<(), anyhow::Error>;

    /// Get the current sample rate
    fn sample_rate(&self) -> f64;

    /// Check if the audio output is active
    fn is_active(&self) -> bool;
}

#[cfg(feature = "native")]
pub mod cpal_output;

#[cfg(feature = "native")]
pub use self::cpal_output::CpalOutput;
