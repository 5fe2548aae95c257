//! Co-processor commands
//!
//! A command is an opcode word followed by packed little-endian arguments.
//! Widgets that carry a label (text, button, keys, toggle) are followed in
//! the command stream by a NUL-terminated string; [`Command::takes_label`]
//! reports which ones do. The FIFO pads each write to a word boundary, so
//! encoders emit the exact argument layout without trailing padding.

/// Co-processor opcodes
pub mod opcode {
    pub const DLSTART: u32 = 0xFFFF_FF00;
    pub const SWAP: u32 = 0xFFFF_FF01;
    pub const BGCOLOR: u32 = 0xFFFF_FF09;
    pub const FGCOLOR: u32 = 0xFFFF_FF0A;
    pub const TEXT: u32 = 0xFFFF_FF0C;
    pub const BUTTON: u32 = 0xFFFF_FF0D;
    pub const KEYS: u32 = 0xFFFF_FF0E;
    pub const PROGRESS: u32 = 0xFFFF_FF0F;
    pub const SLIDER: u32 = 0xFFFF_FF10;
    pub const SCROLLBAR: u32 = 0xFFFF_FF11;
    pub const TOGGLE: u32 = 0xFFFF_FF12;
    pub const GAUGE: u32 = 0xFFFF_FF13;
    pub const CLOCK: u32 = 0xFFFF_FF14;
    pub const MEMCPY: u32 = 0xFFFF_FF1D;
    pub const APPEND: u32 = 0xFFFF_FF1E;
    pub const TRACK: u32 = 0xFFFF_FF2C;
    pub const DIAL: u32 = 0xFFFF_FF2D;
    pub const NUMBER: u32 = 0xFFFF_FF2E;
    pub const COLDSTART: u32 = 0xFFFF_FF32;
    pub const GRADCOLOR: u32 = 0xFFFF_FF34;
    /// FT810 and later only
    pub const SETROTATE: u32 = 0xFFFF_FF36;
}

/// Widget option flags
pub mod opt {
    pub const OPT_3D: u16 = 0;
    pub const OPT_FLAT: u16 = 256;
    pub const OPT_SIGNED: u16 = 256;
    pub const OPT_CENTERX: u16 = 512;
    pub const OPT_CENTERY: u16 = 1024;
    pub const OPT_CENTER: u16 = OPT_CENTERX | OPT_CENTERY;
    pub const OPT_RIGHTX: u16 = 2048;
    pub const OPT_NOBACK: u16 = 4096;
    pub const OPT_NOTICKS: u16 = 8192;
    pub const OPT_NOHM: u16 = 16384;
    pub const OPT_NOPOINTER: u16 = 16384;
    pub const OPT_NOSECS: u16 = 32768;
    pub const OPT_NOHANDS: u16 = OPT_NOPOINTER | OPT_NOSECS;
}

/// Largest fixed-size command encoding in bytes
pub const MAX_COMMAND_SIZE: usize = 24;

/// Encoded command bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandBuf {
    bytes: [u8; MAX_COMMAND_SIZE],
    len: usize,
}

impl CommandBuf {
    fn word(value: u32) -> Self {
        Self {
            bytes: [0; MAX_COMMAND_SIZE],
            len: 0,
        }
        .u32(value)
    }

    fn put(mut self, data: &[u8]) -> Self {
        self.bytes[self.len..self.len + data.len()].copy_from_slice(data);
        self.len += data.len();
        self
    }

    fn u32(self, value: u32) -> Self {
        self.put(&value.to_le_bytes())
    }

    fn i32(self, value: i32) -> Self {
        self.put(&value.to_le_bytes())
    }

    fn i16(self, value: i16) -> Self {
        self.put(&value.to_le_bytes())
    }

    fn u16(self, value: u16) -> Self {
        self.put(&value.to_le_bytes())
    }

    /// Encoded bytes (not padded)
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl core::ops::Deref for CommandBuf {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// One co-processor instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Start a new display list
    DlStart,
    /// Swap the current display list
    Swap,
    /// Reset co-processor state to defaults
    ColdStart,
    /// Raw display-list word
    Dl(u32),
    FgColor(u32),
    BgColor(u32),
    GradColor(u32),
    Text {
        x: i16,
        y: i16,
        font: i16,
        options: u16,
    },
    Button {
        x: i16,
        y: i16,
        w: i16,
        h: i16,
        font: i16,
        options: u16,
    },
    Keys {
        x: i16,
        y: i16,
        w: i16,
        h: i16,
        font: i16,
        options: u16,
    },
    Toggle {
        x: i16,
        y: i16,
        w: i16,
        font: i16,
        options: u16,
        state: bool,
    },
    Number {
        x: i16,
        y: i16,
        font: i16,
        options: u16,
        n: i32,
    },
    Clock {
        x: i16,
        y: i16,
        r: i16,
        options: u16,
        h: i16,
        m: i16,
        s: i16,
        ms: i16,
    },
    Gauge {
        x: i16,
        y: i16,
        r: i16,
        options: u16,
        major: u16,
        minor: u16,
        val: u16,
        range: u16,
    },
    Dial {
        x: i16,
        y: i16,
        r: i16,
        options: u16,
        val: u16,
    },
    Slider {
        x: i16,
        y: i16,
        w: i16,
        h: i16,
        options: u16,
        val: u16,
        range: u16,
    },
    Progress {
        x: i16,
        y: i16,
        w: i16,
        h: i16,
        options: u16,
        val: u16,
        range: u16,
    },
    Scrollbar {
        x: i16,
        y: i16,
        w: i16,
        h: i16,
        options: u16,
        val: u16,
        size: u16,
        range: u16,
    },
    Memcpy {
        dst: u32,
        src: u32,
        size: u32,
    },
    Append {
        ptr: u32,
        size: u32,
    },
    /// Track touches over a region; a zero-sized box stops tracking
    Track {
        x: i16,
        y: i16,
        w: i16,
        h: i16,
        tag: u8,
    },
    SetRotate(u32),
}

impl Command {
    /// Whether a NUL-terminated label follows this command
    pub fn takes_label(&self) -> bool {
        matches!(
            self,
            Command::Text { .. } | Command::Button { .. } | Command::Keys { .. } | Command::Toggle { .. }
        )
    }

    /// Encode into little-endian command bytes
    pub fn encode(&self) -> CommandBuf {
        use opcode::*;

        match *self {
            Command::DlStart => CommandBuf::word(DLSTART),
            Command::Swap => CommandBuf::word(SWAP),
            Command::ColdStart => CommandBuf::word(COLDSTART),
            Command::Dl(word) => CommandBuf::word(word),
            Command::FgColor(rgb) => CommandBuf::word(FGCOLOR).u32(rgb),
            Command::BgColor(rgb) => CommandBuf::word(BGCOLOR).u32(rgb),
            Command::GradColor(rgb) => CommandBuf::word(GRADCOLOR).u32(rgb),
            Command::Text { x, y, font, options } => CommandBuf::word(TEXT)
                .i16(x)
                .i16(y)
                .i16(font)
                .u16(options),
            Command::Button { x, y, w, h, font, options } => CommandBuf::word(BUTTON)
                .i16(x)
                .i16(y)
                .i16(w)
                .i16(h)
                .i16(font)
                .u16(options),
            Command::Keys { x, y, w, h, font, options } => CommandBuf::word(KEYS)
                .i16(x)
                .i16(y)
                .i16(w)
                .i16(h)
                .i16(font)
                .u16(options),
            Command::Toggle { x, y, w, font, options, state } => CommandBuf::word(TOGGLE)
                .i16(x)
                .i16(y)
                .i16(w)
                .i16(font)
                .u16(options)
                .u16(if state { 0xFFFF } else { 0 }),
            Command::Number { x, y, font, options, n } => CommandBuf::word(NUMBER)
                .i16(x)
                .i16(y)
                .i16(font)
                .u16(options)
                .i32(n),
            Command::Clock { x, y, r, options, h, m, s, ms } => CommandBuf::word(CLOCK)
                .i16(x)
                .i16(y)
                .i16(r)
                .u16(options)
                .i16(h)
                .i16(m)
                .i16(s)
                .i16(ms),
            Command::Gauge { x, y, r, options, major, minor, val, range } => CommandBuf::word(GAUGE)
                .i16(x)
                .i16(y)
                .i16(r)
                .u16(options)
                .u16(major)
                .u16(minor)
                .u16(val)
                .u16(range),
            Command::Dial { x, y, r, options, val } => CommandBuf::word(DIAL)
                .i16(x)
                .i16(y)
                .i16(r)
                .u16(options)
                .u16(val),
            Command::Slider { x, y, w, h, options, val, range } => CommandBuf::word(SLIDER)
                .i16(x)
                .i16(y)
                .i16(w)
                .i16(h)
                .u16(options)
                .u16(val)
                .u16(range),
            Command::Progress { x, y, w, h, options, val, range } => CommandBuf::word(PROGRESS)
                .i16(x)
                .i16(y)
                .i16(w)
                .i16(h)
                .u16(options)
                .u16(val)
                .u16(range),
            Command::Scrollbar { x, y, w, h, options, val, size, range } => {
                CommandBuf::word(SCROLLBAR)
                    .i16(x)
                    .i16(y)
                    .i16(w)
                    .i16(h)
                    .u16(options)
                    .u16(val)
                    .u16(size)
                    .u16(range)
            }
            Command::Memcpy { dst, src, size } => {
                CommandBuf::word(MEMCPY).u32(dst).u32(src).u32(size)
            }
            Command::Append { ptr, size } => CommandBuf::word(APPEND).u32(ptr).u32(size),
            Command::Track { x, y, w, h, tag } => CommandBuf::word(TRACK)
                .i16(x)
                .i16(y)
                .i16(w)
                .i16(h)
                .i16(tag as i16),
            Command::SetRotate(rotation) => CommandBuf::word(SETROTATE).u32(rotation),
        }
    }
}
