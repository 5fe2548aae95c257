//! Synthesizer effects and notes
//!
//! `REG_SOUND` takes `(note << 8) | effect`; writing 1 to `REG_PLAY`
//! starts playback and the chip clears bit 0 when the sample ends.

/// Built-in synthesizer effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Effect {
    #[default]
    Silence = 0x00,
    SquareWave = 0x01,
    SineWave = 0x02,
    Sawtooth = 0x03,
    Triangle = 0x04,
    Beeping = 0x05,
    Alarm = 0x06,
    Warble = 0x07,
    Carousel = 0x08,
    Pips1 = 0x10,
    Harp = 0x40,
    Xylophone = 0x41,
    Tuba = 0x42,
    Glockenspiel = 0x43,
    Organ = 0x44,
    Trumpet = 0x45,
    Piano = 0x46,
    Chimes = 0x47,
    MusicBox = 0x48,
    Bell = 0x49,
    Click = 0x50,
    Switch = 0x51,
    Cowbell = 0x52,
    Notch = 0x53,
    Hihat = 0x54,
    Kickdrum = 0x55,
    Pop = 0x56,
    Clack = 0x57,
    Chack = 0x58,
    Mute = 0x60,
    Unmute = 0x61,
}

impl Effect {
    /// Look up an effect by its lowercase name
    pub fn from_name(name: &str) -> Option<Self> {
        let effect = match name {
            "silence" => Effect::Silence,
            "square" => Effect::SquareWave,
            "sine" => Effect::SineWave,
            "sawtooth" => Effect::Sawtooth,
            "triangle" => Effect::Triangle,
            "beeping" => Effect::Beeping,
            "alarm" => Effect::Alarm,
            "warble" => Effect::Warble,
            "carousel" => Effect::Carousel,
            "pips" => Effect::Pips1,
            "harp" => Effect::Harp,
            "xylophone" => Effect::Xylophone,
            "tuba" => Effect::Tuba,
            "glockenspiel" => Effect::Glockenspiel,
            "organ" => Effect::Organ,
            "trumpet" => Effect::Trumpet,
            "piano" => Effect::Piano,
            "chimes" => Effect::Chimes,
            "music_box" => Effect::MusicBox,
            "bell" => Effect::Bell,
            "click" => Effect::Click,
            "switch" => Effect::Switch,
            "cowbell" => Effect::Cowbell,
            "notch" => Effect::Notch,
            "hihat" => Effect::Hihat,
            "kickdrum" => Effect::Kickdrum,
            "pop" => Effect::Pop,
            "clack" => Effect::Clack,
            "chack" => Effect::Chack,
            "mute" => Effect::Mute,
            "unmute" => Effect::Unmute,
            _ => return None,
        };
        Some(effect)
    }

    /// Value written to `REG_SOUND` for this effect at `note`
    pub const fn sound_word(self, note: u8) -> u16 {
        ((note as u16) << 8) | self as u16
    }
}

/// MIDI note numbers
pub mod note {
    /// Terminates a sequence when paired with `Effect::Silence` and no duration
    pub const END_SONG: u8 = 0;
    pub const REST: u8 = 0;

    pub const C2: u8 = 36;
    pub const D2: u8 = 38;
    pub const E2: u8 = 40;
    pub const F2: u8 = 41;
    pub const G2: u8 = 43;
    pub const A2: u8 = 45;
    pub const B2: u8 = 47;

    pub const C3: u8 = 48;
    pub const C3S: u8 = 49;
    pub const D3: u8 = 50;
    pub const E3: u8 = 52;
    pub const F3: u8 = 53;
    pub const G3: u8 = 55;
    pub const G3S: u8 = 56;
    pub const A3: u8 = 57;
    pub const A3S: u8 = 58;
    pub const B3: u8 = 59;

    pub const C4: u8 = 60;
    pub const C4S: u8 = 61;
    pub const D4: u8 = 62;
    pub const D4S: u8 = 63;
    pub const E4: u8 = 64;
    pub const F4: u8 = 65;
    pub const F4S: u8 = 66;
    pub const G4: u8 = 67;
    pub const G4S: u8 = 68;
    pub const A4: u8 = 69;
    pub const A4S: u8 = 70;
    pub const B4: u8 = 71;

    pub const C5: u8 = 72;
    pub const D5: u8 = 74;
    pub const E5: u8 = 76;
    pub const F5: u8 = 77;
    pub const G5: u8 = 79;
    pub const A5: u8 = 81;
    pub const B5: u8 = 83;
    pub const C6: u8 = 84;

    /// Lowest and highest notes the synthesizer accepts
    pub const MIN: u8 = 21;
    pub const MAX: u8 = 108;
}

/// Line height in pixels of the built-in ROM fonts 16..=31
pub const ROM_FONT_HEIGHTS: [u8; 16] = [8, 8, 16, 16, 13, 17, 20, 22, 29, 38, 16, 20, 25, 28, 36, 49];

/// Line height of a ROM font, if `font` names one
pub fn rom_font_height(font: i16) -> Option<u8> {
    if (16..=31).contains(&font) {
        Some(ROM_FONT_HEIGHTS[(font - 16) as usize])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sound_word() {
        assert_eq!(Effect::Chack.sound_word(note::C4), (60 << 8) | 0x58);
        assert_eq!(Effect::Silence.sound_word(note::REST), 0);
    }

    #[test]
    fn test_effect_names() {
        assert_eq!(Effect::from_name("pop"), Some(Effect::Pop));
        assert_eq!(Effect::from_name("music_box"), Some(Effect::MusicBox));
        assert_eq!(Effect::from_name("kazoo"), None);
    }

    #[test]
    fn test_rom_font_heights() {
        assert_eq!(rom_font_height(16), Some(8));
        assert_eq!(rom_font_height(27), Some(20));
        assert_eq!(rom_font_height(31), Some(49));
        assert_eq!(rom_font_height(15), None);
        assert_eq!(rom_font_height(32), None);
    }
}
