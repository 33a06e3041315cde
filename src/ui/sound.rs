/// Sound effects: short synthesized cues via rodio.
///
/// Every cue is rendered once into an in-memory WAV buffer at startup and
/// replayed on a detached Sink, so playing never blocks the game loop.
///
/// Without the "sound" feature the stub `SoundEngine` below does nothing.

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        pickup: Arc<Vec<u8>>,
        bump: Arc<Vec<u8>>,
        start: Arc<Vec<u8>>,
        game_over: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        /// None when there is no usable audio device.
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::info!(error = %e, "no audio output, sound disabled");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                pickup: Arc::new(encode_wav(&pickup_chime())),
                bump: Arc::new(encode_wav(&wall_bump())),
                start: Arc::new(encode_wav(&start_jingle())),
                game_over: Arc::new(encode_wav(&game_over_dirge())),
            })
        }

        fn play(&self, wav: &Arc<Vec<u8>>) {
            let Ok(sink) = Sink::try_new(&self.handle) else { return };
            if let Ok(src) = rodio::Decoder::new(Cursor::new(wav.as_ref().clone())) {
                sink.append(src);
                sink.detach();
            }
        }

        pub fn play_pickup(&self) { self.play(&self.pickup); }
        pub fn play_bump(&self) { self.play(&self.bump); }
        pub fn play_start(&self) { self.play(&self.start); }
        pub fn play_game_over(&self) { self.play(&self.game_over); }
    }

    // ════════════════════════════════════════════════════════════
    //  Cues (mono f32 samples)
    // ════════════════════════════════════════════════════════════

    /// Play `(freq, seconds)` notes back to back. Each note decays with
    /// `curve` (1.0 = linear); `octave_mix` blends in the octave above.
    fn melody(notes: &[(f32, f32)], curve: f32, octave_mix: f32, volume: f32) -> Vec<f32> {
        let mut out = Vec::new();
        for &(freq, secs) in notes {
            let n = (SAMPLE_RATE as f32 * secs) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(curve);
                let wave = (t * freq * TAU).sin() * (1.0 - octave_mix)
                    + (t * freq * 2.0 * TAU).sin() * octave_mix;
                out.push(wave * env * volume);
            }
        }
        out
    }

    /// Two quick rising notes, E6 then A6.
    fn pickup_chime() -> Vec<f32> {
        melody(&[(1319.0, 0.035), (1760.0, 0.05)], 0.5, 0.25, 0.22)
    }

    /// Low thud with a bit of grit.
    fn wall_bump() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.09) as usize;
        let mut seed: u32 = 0x9e37_79b9;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let t = i as f32 / SAMPLE_RATE as f32;
                let freq = 140.0 - p * 60.0;
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                let noise = (seed as f32 / u32::MAX as f32) * 2.0 - 1.0;
                ((t * freq * TAU).sin() * 0.75 + noise * 0.25) * (1.0 - p).powi(2) * 0.35
            })
            .collect()
    }

    /// C5 E5 G5, held a little on the last note.
    fn start_jingle() -> Vec<f32> {
        melody(&[(523.0, 0.07), (659.0, 0.07), (784.0, 0.16)], 1.0, 0.3, 0.25)
    }

    /// G4 down to C4 with a long tail.
    fn game_over_dirge() -> Vec<f32> {
        let mut out = melody(
            &[(392.0, 0.14), (330.0, 0.14), (294.0, 0.14), (262.0, 0.35)],
            2.0,
            0.0,
            0.3,
        );
        let tail = out.len() / 3;
        let total = out.len();
        for (k, s) in out[total - tail..].iter_mut().enumerate() {
            *s *= 1.0 - k as f32 / tail as f32;
        }
        out
    }

    // ════════════════════════════════════════════════════════════
    //  WAV (16-bit PCM, mono)
    // ════════════════════════════════════════════════════════════

    fn encode_wav(samples: &[f32]) -> Vec<u8> {
        const BITS: u16 = 16;
        const CHANNELS: u16 = 1;
        let block_align = CHANNELS * BITS / 8;
        let byte_rate = SAMPLE_RATE * block_align as u32;
        let data_len = samples.len() as u32 * block_align as u32;

        let mut wav = Vec::with_capacity(44 + data_len as usize);
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + data_len).to_le_bytes());
        wav.extend_from_slice(b"WAVEfmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
        wav.extend_from_slice(&CHANNELS.to_le_bytes());
        wav.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        wav.extend_from_slice(&byte_rate.to_le_bytes());
        wav.extend_from_slice(&block_align.to_le_bytes());
        wav.extend_from_slice(&BITS.to_le_bytes());
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&data_len.to_le_bytes());
        for &s in samples {
            wav.extend_from_slice(&((s.clamp(-1.0, 1.0) * 32767.0) as i16).to_le_bytes());
        }
        wav
    }

}

// ════════════════════════════════════════════════════════════
//  Public API: no-ops when the sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_pickup(&self) {}
    pub fn play_bump(&self) {}
    pub fn play_start(&self) {}
    pub fn play_game_over(&self) {}
}
