//! Cooperative sound sequencer
//!
//! A sequence is a static slice of [`Note`]s, terminated by [`Note::END`]
//! (or simply by the end of the slice). [`SoundPlayer::on_idle`] is called
//! from the UI tick and starts the next note once the previous one's
//! duration has passed, so playback never blocks the event loop.

use evetouch_protocol::sound::note;
use evetouch_protocol::{Effect, MemoryMap};
#[allow(unused_imports)]
use micromath::F32Ext;

use crate::link::RegisterLink;
use crate::timer::TinyTimer;

/// Delay before a sequence's first note
pub const SEQUENCE_START_DELAY_MS: u32 = 250;

/// One step of a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Note {
    pub effect: Effect,
    /// MIDI note; 0 plays middle C
    pub note: u8,
    /// Duration in 1/16 s; 0 plays until the sample finishes
    pub sixteenths: u8,
}

impl Note {
    /// Sequence terminator
    pub const END: Note = Note::new(Effect::Silence, note::END_SONG, 0);

    pub const fn new(effect: Effect, note: u8, sixteenths: u8) -> Self {
        Self {
            effect,
            note,
            sixteenths,
        }
    }

    pub const fn rest(sixteenths: u8) -> Self {
        Self::new(Effect::Silence, note::REST, sixteenths)
    }

    pub fn is_end(&self) -> bool {
        *self == Self::END
    }

    pub fn duration_ms(&self) -> u32 {
        self.sixteenths as u32 * 1000 / 16
    }
}

pub mod sequences {
    use super::Note;
    use evetouch_protocol::sound::note::*;
    use evetouch_protocol::Effect::*;

    pub static SILENCE: [Note; 1] = [Note::END];

    pub static CHIMES: [Note; 4] = [
        Note::new(Chimes, G3, 5),
        Note::new(Chimes, E4, 5),
        Note::new(Chimes, C4, 5),
        Note::END,
    ];

    pub static SAD_TROMBONE: [Note; 5] = [
        Note::new(Trumpet, A3S, 10),
        Note::new(Trumpet, A3, 10),
        Note::new(Trumpet, G3S, 10),
        Note::new(Trumpet, G3, 20),
        Note::END,
    ];

    pub static TWINKLE: [Note; 4] = [
        Note::new(Glockenspiel, C4, 1),
        Note::new(Glockenspiel, E4, 1),
        Note::new(Glockenspiel, G4, 16),
        Note::END,
    ];

    pub static FANFARE: [Note; 8] = [
        Note::new(Trumpet, A3, 4),
        Note::rest(1),
        Note::new(Trumpet, A3, 2),
        Note::rest(1),
        Note::new(Trumpet, A3, 2),
        Note::rest(1),
        Note::new(Trumpet, E4, 10),
        Note::END,
    ];

    pub static MEDIA_INSERTED: [Note; 3] = [
        Note::new(MusicBox, C4, 2),
        Note::new(MusicBox, E4, 2),
        Note::END,
    ];

    pub static MEDIA_REMOVED: [Note; 3] = [
        Note::new(MusicBox, E4, 2),
        Note::new(MusicBox, C4, 2),
        Note::END,
    ];
}

/// Nearest MIDI note for a frequency, clamped to the synthesizer's range
pub fn frequency_to_midi_note(frequency_hz: u16) -> u8 {
    if frequency_hz == 0 {
        return note::MIN;
    }
    let n = note::A4 as f32 + 12.0 * (frequency_hz as f32 / 440.0).log2() + 0.5;
    n.clamp(note::MIN as f32, note::MAX as f32) as u8
}

/// Plays effects directly and steps through sequences from the idle tick
#[derive(Debug, Clone, Copy)]
pub struct SoundPlayer {
    map: &'static MemoryMap,
    sequence: Option<&'static [Note]>,
    index: usize,
    timer: TinyTimer,
    /// Current note plays until the chip reports the sample finished
    wait_sample: bool,
}

impl SoundPlayer {
    pub const fn new(map: &'static MemoryMap) -> Self {
        Self {
            map,
            sequence: None,
            index: 0,
            timer: TinyTimer::new(),
            wait_sample: false,
        }
    }

    pub fn set_volume<L: RegisterLink>(&self, link: &mut L, volume: u8) -> Result<(), L::Error> {
        link.write8(self.map.reg_vol_sound, volume)
    }

    /// Start a single effect immediately
    pub fn play_effect<L: RegisterLink>(
        &self,
        link: &mut L,
        effect: Effect,
        note: u8,
    ) -> Result<(), L::Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("playing note {}, effect {}", note, effect);
        link.write16(self.map.reg_sound, effect.sound_word(note))?;
        link.write8(self.map.reg_play, 1)
    }

    /// Schedule `sequence` to start shortly after `now_ms`
    pub fn play(&mut self, sequence: &'static [Note], now_ms: u32) {
        self.sequence = Some(sequence);
        self.index = 0;
        self.wait_sample = false;
        self.timer.wait_for(now_ms, SEQUENCE_START_DELAY_MS);
    }

    /// Play the nearest note to `frequency_hz` and silence it after
    /// `duration_ms`
    pub fn play_tone<L: RegisterLink>(
        &mut self,
        link: &mut L,
        frequency_hz: u16,
        duration_ms: u16,
        now_ms: u32,
    ) -> Result<(), L::Error> {
        self.play_effect(link, Effect::Organ, frequency_to_midi_note(frequency_hz))?;
        self.sequence = Some(&sequences::SILENCE);
        self.index = 0;
        self.wait_sample = false;
        self.timer.wait_for(now_ms, duration_ms as u32);
        Ok(())
    }

    /// Whether the chip is still playing a sample
    pub fn is_playing<L: RegisterLink>(&self, link: &mut L) -> Result<bool, L::Error> {
        Ok(link.read8(self.map.reg_play)? & 0x1 != 0)
    }

    pub fn has_more_notes(&self) -> bool {
        self.sequence.is_some()
    }

    /// Advance the current sequence if the previous note is done
    pub fn on_idle<L: RegisterLink>(&mut self, link: &mut L, now_ms: u32) -> Result<(), L::Error> {
        let Some(sequence) = self.sequence else {
            return Ok(());
        };

        let ready = if self.wait_sample {
            !self.is_playing(link)?
        } else {
            self.timer.elapsed(now_ms)
        };
        if !ready {
            return Ok(());
        }

        match sequence.get(self.index) {
            Some(next) if !next.is_end() => {
                let ms = next.duration_ms();
                #[cfg(feature = "defmt")]
                defmt::trace!("scheduling note in {} ms", ms);
                self.wait_sample = ms == 0;
                if ms > 0 {
                    self.timer.wait_for(now_ms, ms);
                }
                let n = if next.note == 0 { note::C4 } else { next.note };
                self.index += 1;
                self.play_effect(link, next.effect, n)
            }
            _ => {
                self.sequence = None;
                self.index = 0;
                self.wait_sample = false;
                self.play_effect(link, Effect::Silence, note::REST)
            }
        }
    }
}
