//! Memory maps and register addresses
//!
//! The FT800 and FT810 share a register set but place it at different
//! addresses. The FT810 additionally exposes a flow-controlled command
//! stream (`REG_CMDB_SPACE` / `REG_CMDB_WRITE`) that removes the need for
//! host-side ring bookkeeping.

/// Size of the co-processor command ring in bytes
pub const CMD_FIFO_SIZE: u32 = 4096;

/// Mask applied to command ring pointers
pub const CMD_FIFO_MASK: u32 = CMD_FIFO_SIZE - 1;

/// Value read from `REG_ID` once the controller has booted
pub const DEVICE_ID: u8 = 0x7C;

/// Bit set in `REG_TOUCH_DIRECT_XY` while no touch is present
pub const TOUCH_XY_NOT_TOUCHING: u32 = 0x8000_0000;

/// FT800 register addresses
pub mod ft800 {
    pub const RAM_G: u32 = 0x000000;
    pub const RAM_DL: u32 = 0x100000;
    pub const REG_ID: u32 = 0x102400;
    pub const REG_VOL_SOUND: u32 = 0x102480;
    pub const REG_SOUND: u32 = 0x102484;
    pub const REG_PLAY: u32 = 0x102488;
    pub const REG_PWM_DUTY: u32 = 0x1024C4;
    pub const REG_CMD_READ: u32 = 0x1024E4;
    pub const REG_CMD_WRITE: u32 = 0x1024E8;
    pub const REG_TOUCH_TAG: u32 = 0x102518;
    pub const REG_TOUCH_DIRECT_XY: u32 = 0x102574;
    pub const RAM_CMD: u32 = 0x108000;
    pub const REG_TRACKER: u32 = 0x109000;
}

/// FT810 register addresses
pub mod ft810 {
    pub const RAM_G: u32 = 0x000000;
    pub const RAM_DL: u32 = 0x300000;
    pub const REG_ID: u32 = 0x302000;
    pub const REG_VOL_SOUND: u32 = 0x302084;
    pub const REG_SOUND: u32 = 0x302088;
    pub const REG_PLAY: u32 = 0x30208C;
    pub const REG_PWM_DUTY: u32 = 0x3020D4;
    pub const REG_CMD_READ: u32 = 0x3020F8;
    pub const REG_CMD_WRITE: u32 = 0x3020FC;
    pub const REG_TOUCH_TAG: u32 = 0x30212C;
    pub const REG_TOUCH_DIRECT_XY: u32 = 0x30218C;
    /// Free bytes in the command stream (12 bits)
    pub const REG_CMDB_SPACE: u32 = 0x302574;
    /// Streaming write port into the command ring
    pub const REG_CMDB_WRITE: u32 = 0x302578;
    pub const RAM_CMD: u32 = 0x308000;
    pub const REG_TRACKER: u32 = 0x309000;
}

/// Supported controller generations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChipModel {
    /// FT800/FT801: host-managed ring pointers
    #[default]
    Ft800,
    /// FT810..FT813: flow-controlled streaming register
    Ft810,
}

/// Register addresses used by the toolkit, resolved per chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MemoryMap {
    pub ram_g: u32,
    pub ram_dl: u32,
    pub ram_cmd: u32,
    pub reg_id: u32,
    pub reg_cmd_read: u32,
    pub reg_cmd_write: u32,
    pub reg_touch_tag: u32,
    pub reg_touch_direct_xy: u32,
    pub reg_tracker: u32,
    pub reg_vol_sound: u32,
    pub reg_sound: u32,
    pub reg_play: u32,
    pub reg_pwm_duty: u32,
}

/// FT800 memory map
pub const FT800_MAP: MemoryMap = MemoryMap {
    ram_g: ft800::RAM_G,
    ram_dl: ft800::RAM_DL,
    ram_cmd: ft800::RAM_CMD,
    reg_id: ft800::REG_ID,
    reg_cmd_read: ft800::REG_CMD_READ,
    reg_cmd_write: ft800::REG_CMD_WRITE,
    reg_touch_tag: ft800::REG_TOUCH_TAG,
    reg_touch_direct_xy: ft800::REG_TOUCH_DIRECT_XY,
    reg_tracker: ft800::REG_TRACKER,
    reg_vol_sound: ft800::REG_VOL_SOUND,
    reg_sound: ft800::REG_SOUND,
    reg_play: ft800::REG_PLAY,
    reg_pwm_duty: ft800::REG_PWM_DUTY,
};

/// FT810 memory map
pub const FT810_MAP: MemoryMap = MemoryMap {
    ram_g: ft810::RAM_G,
    ram_dl: ft810::RAM_DL,
    ram_cmd: ft810::RAM_CMD,
    reg_id: ft810::REG_ID,
    reg_cmd_read: ft810::REG_CMD_READ,
    reg_cmd_write: ft810::REG_CMD_WRITE,
    reg_touch_tag: ft810::REG_TOUCH_TAG,
    reg_touch_direct_xy: ft810::REG_TOUCH_DIRECT_XY,
    reg_tracker: ft810::REG_TRACKER,
    reg_vol_sound: ft810::REG_VOL_SOUND,
    reg_sound: ft810::REG_SOUND,
    reg_play: ft810::REG_PLAY,
    reg_pwm_duty: ft810::REG_PWM_DUTY,
};

impl ChipModel {
    /// Register addresses for this chip
    pub const fn map(self) -> &'static MemoryMap {
        match self {
            ChipModel::Ft800 => &FT800_MAP,
            ChipModel::Ft810 => &FT810_MAP,
        }
    }

    /// Whether the chip provides the streaming command register
    pub const fn has_command_stream(self) -> bool {
        matches!(self, ChipModel::Ft810)
    }
}

/// Host commands sent as a 3-byte frame outside the memory space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum HostCommand {
    Active = 0x00,
    Standby = 0x41,
    Sleep = 0x42,
    ClkExt = 0x44,
    ClkInt = 0x48,
    PwrDown = 0x50,
    ClkSel = 0x62,
    RstPulse = 0x68,
}

impl HostCommand {
    /// Encode the 3-byte host command frame
    pub const fn frame(self) -> [u8; 3] {
        [self as u8, 0x00, 0x00]
    }
}
