//! Sound cue playback.

use std::sync::Arc;

#[cfg(not(feature = "audio"))]
use dropwatch_core::NullSoundPlayer;
use dropwatch_core::SoundPlayer;

/// Player for the enabled audio back end, or a silent one.
pub fn default_player() -> Arc<dyn SoundPlayer> {
    #[cfg(feature = "audio")]
    return Arc::new(beep::BeepPlayer);

    #[cfg(not(feature = "audio"))]
    Arc::new(NullSoundPlayer)
}

#[cfg(feature = "audio")]
mod beep {
    use std::time::Duration;

    use dropwatch_core::{SoundCue, SoundPlayer};
    use rodio::source::{SineWave, Source};
    use rodio::{OutputStream, Sink};
    use tracing::warn;

    /// Plays a distinct tone per cue on the default output device.
    pub struct BeepPlayer;

    impl SoundPlayer for BeepPlayer {
        fn play(&self, cue: SoundCue) {
            let (freq, millis) = match cue {
                SoundCue::Start => (660.0, 180),
                SoundCue::Alert => (880.0, 250),
                SoundCue::Pause => (440.0, 180),
            };

            if let Err(e) = beep(freq, Duration::from_millis(millis)) {
                warn!("sound cue failed: {e}");
            }
        }
    }

    fn beep(freq: f32, length: Duration) -> anyhow::Result<()> {
        let (_stream, handle) = OutputStream::try_default()?;
        let sink = Sink::try_new(&handle)?;
        sink.append(SineWave::new(freq).take_duration(length).amplify(0.20));
        sink.sleep_until_end();
        Ok(())
    }
}
