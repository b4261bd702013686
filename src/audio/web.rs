//! Web Audio output
//!
//! Each note gets its own oscillator + gain pair, built on demand and
//! stopped explicitly; nothing is pooled or reused. Sample loops get a
//! buffer source that runs until stopped.

use web_sys::{AudioBufferSourceNode, AudioContext, GainNode, OscillatorNode, OscillatorType};

use super::{NoteEvent, SAMPLE_RATE, note_frequency};

/// One sounding note
pub struct Voice {
    osc: OscillatorNode,
    gain: GainNode,
}

impl Voice {
    fn new(ctx: &AudioContext, freq: f32, osc_type: OscillatorType) -> Option<Self> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some(Self { osc, gain })
    }

    /// Start now with a short attack and exponential release
    fn play(&self, ctx: &AudioContext, level: f32, duration: f64) {
        let t = ctx.current_time();
        let level = level.max(0.001);

        self.gain.gain().set_value_at_time(0.0001, t).ok();
        self.gain
            .gain()
            .exponential_ramp_to_value_at_time(level, t + 0.01)
            .ok();
        self.gain
            .gain()
            .exponential_ramp_to_value_at_time(0.0001, t + duration)
            .ok();

        self.osc.start().ok();
        self.stop_at(t + duration + 0.02);
    }

    /// Stop at an absolute context time
    pub fn stop_at(&self, when: f64) {
        self.osc.stop_with_when(when).ok();
    }

    /// Stop immediately
    pub fn stop(&self) {
        self.osc.stop().ok();
    }
}

/// A looping sample buffer
pub struct LoopVoice {
    source: AudioBufferSourceNode,
    _gain: GainNode,
}

impl LoopVoice {
    pub fn stop(&self) {
        self.source.stop().ok();
    }
}

/// Audio manager for the web backend
pub struct AudioOut {
    ctx: Option<AudioContext>,
    volume: f32,
    muted: bool,
}

impl AudioOut {
    pub fn new(volume: f32) -> Self {
        // May fail outside a secure context; toys keep running silently
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            volume: volume.clamp(0.0, 1.0),
            muted: false,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Play a note; returns the voice so callers can cut it short
    pub fn play(&self, note: &NoteEvent) -> Option<Voice> {
        if self.muted || self.volume <= 0.0 {
            return None;
        }
        let ctx = self.ctx.as_ref()?;

        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let voice = Voice::new(ctx, note_frequency(note.midi), OscillatorType::Triangle)?;
        voice.play(ctx, self.volume * note.velocity * 0.3, note.duration as f64);
        Some(voice)
    }

    /// Start looping `samples`; the caller stops the returned voice
    pub fn play_loop(&self, samples: &[f32]) -> Option<LoopVoice> {
        if self.muted || self.volume <= 0.0 || samples.is_empty() {
            return None;
        }
        let ctx = self.ctx.as_ref()?;

        let buffer = ctx
            .create_buffer(1, samples.len() as u32, SAMPLE_RATE as f32)
            .ok()?;
        buffer.copy_to_channel(samples, 0).ok()?;

        let source = ctx.create_buffer_source().ok()?;
        source.set_buffer(Some(&buffer));
        source.set_loop(true);

        let gain = ctx.create_gain().ok()?;
        gain.gain().set_value(self.volume);
        source.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        source.start().ok()?;
        Some(LoopVoice {
            source,
            _gain: gain,
        })
    }
}
