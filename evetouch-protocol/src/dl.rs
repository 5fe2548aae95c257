//! Display-list words
//!
//! Each function returns one 32-bit display-list instruction. The opcode
//! lives in the top byte (or the top two bits for the vertex formats) and
//! arguments are masked into the remaining bits.

/// Graphics primitives accepted by `BEGIN`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Primitive {
    Bitmaps = 1,
    Points = 2,
    Lines = 3,
    LineStrip = 4,
    EdgeStripR = 5,
    EdgeStripL = 6,
    EdgeStripA = 7,
    EdgeStripB = 8,
    Rects = 9,
}

mod op {
    pub const DISPLAY: u32 = 0x00;
    pub const BITMAP_SOURCE: u32 = 0x01;
    pub const CLEAR_COLOR_RGB: u32 = 0x02;
    pub const TAG: u32 = 0x03;
    pub const COLOR_RGB: u32 = 0x04;
    pub const BITMAP_HANDLE: u32 = 0x05;
    pub const CELL: u32 = 0x06;
    pub const BITMAP_LAYOUT: u32 = 0x07;
    pub const BITMAP_SIZE: u32 = 0x08;
    pub const POINT_SIZE: u32 = 0x0D;
    pub const LINE_WIDTH: u32 = 0x0E;
    pub const CLEAR_COLOR_A: u32 = 0x0F;
    pub const COLOR_A: u32 = 0x10;
    pub const CLEAR_TAG: u32 = 0x12;
    pub const TAG_MASK: u32 = 0x14;
    pub const BEGIN: u32 = 0x1F;
    pub const COLOR_MASK: u32 = 0x20;
    pub const END: u32 = 0x21;
    pub const SAVE_CONTEXT: u32 = 0x22;
    pub const RESTORE_CONTEXT: u32 = 0x23;
    pub const CLEAR: u32 = 0x26;
}

#[inline]
const fn word(opcode: u32, args: u32) -> u32 {
    (opcode << 24) | args
}

/// Pack an `0xRRGGBB` color from components
pub const fn rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

pub const fn display() -> u32 {
    word(op::DISPLAY, 0)
}

pub const fn begin(prim: Primitive) -> u32 {
    word(op::BEGIN, (prim as u32) & 0xF)
}

pub const fn end() -> u32 {
    word(op::END, 0)
}

/// Clear the color, stencil and/or tag buffers
pub const fn clear(color: bool, stencil: bool, tag: bool) -> u32 {
    word(
        op::CLEAR,
        ((color as u32) << 2) | ((stencil as u32) << 1) | tag as u32,
    )
}

pub const fn clear_color_rgb(rgb: u32) -> u32 {
    word(op::CLEAR_COLOR_RGB, rgb & 0xFF_FFFF)
}

pub const fn clear_color_a(alpha: u8) -> u32 {
    word(op::CLEAR_COLOR_A, alpha as u32)
}

pub const fn clear_tag(tag: u8) -> u32 {
    word(op::CLEAR_TAG, tag as u32)
}

pub const fn color_rgb(rgb: u32) -> u32 {
    word(op::COLOR_RGB, rgb & 0xFF_FFFF)
}

pub const fn color_a(alpha: u8) -> u32 {
    word(op::COLOR_A, alpha as u32)
}

pub const fn color_mask(r: bool, g: bool, b: bool, a: bool) -> u32 {
    word(
        op::COLOR_MASK,
        ((r as u32) << 3) | ((g as u32) << 2) | ((b as u32) << 1) | a as u32,
    )
}

/// Tag value written into the tag buffer by subsequent primitives
pub const fn tag(tag: u8) -> u32 {
    word(op::TAG, tag as u32)
}

/// Enable or disable writes to the tag buffer
pub const fn tag_mask(enabled: bool) -> u32 {
    word(op::TAG_MASK, enabled as u32)
}

/// Line width in 1/16 pixel units
pub const fn line_width(width: u16) -> u32 {
    word(op::LINE_WIDTH, (width as u32) & 0xFFF)
}

/// Point radius in 1/16 pixel units
pub const fn point_size(size: u16) -> u32 {
    word(op::POINT_SIZE, (size as u32) & 0x1FFF)
}

pub const fn save_context() -> u32 {
    word(op::SAVE_CONTEXT, 0)
}

pub const fn restore_context() -> u32 {
    word(op::RESTORE_CONTEXT, 0)
}

pub const fn bitmap_source(ram_g_addr: u32) -> u32 {
    word(op::BITMAP_SOURCE, ram_g_addr & 0x0F_FFFF)
}

pub const fn bitmap_handle(handle: u8) -> u32 {
    word(op::BITMAP_HANDLE, (handle as u32) & 0x1F)
}

pub const fn bitmap_layout(format: u8, linestride: u16, height: u16) -> u32 {
    word(
        op::BITMAP_LAYOUT,
        (((format as u32) & 0x1F) << 19)
            | (((linestride as u32) & 0x3FF) << 9)
            | ((height as u32) & 0x1FF),
    )
}

pub const fn bitmap_size(filter: bool, wrap_x: bool, wrap_y: bool, width: u16, height: u16) -> u32 {
    word(
        op::BITMAP_SIZE,
        ((filter as u32) << 20)
            | ((wrap_x as u32) << 19)
            | ((wrap_y as u32) << 18)
            | (((width as u32) & 0x1FF) << 9)
            | ((height as u32) & 0x1FF),
    )
}

pub const fn cell(cell: u8) -> u32 {
    word(op::CELL, (cell as u32) & 0x7F)
}

/// Vertex in 1/16 pixel units
pub const fn vertex2f(x: i16, y: i16) -> u32 {
    (1 << 30) | (((x as u32) & 0x7FFF) << 15) | ((y as u32) & 0x7FFF)
}

/// Vertex in whole pixels with bitmap handle and cell
pub const fn vertex2ii(x: u16, y: u16, handle: u8, cell: u8) -> u32 {
    (2 << 30)
        | (((x as u32) & 0x1FF) << 21)
        | (((y as u32) & 0x1FF) << 12)
        | (((handle as u32) & 0x1F) << 7)
        | ((cell as u32) & 0x7F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_packs_primitive() {
        assert_eq!(begin(Primitive::Rects), (31 << 24) | 9);
        assert_eq!(begin(Primitive::Points), 0x1F00_0002);
    }

    #[test]
    fn test_clear_flags() {
        assert_eq!(clear(true, true, true), 0x2600_0007);
        assert_eq!(clear(true, false, false), 0x2600_0004);
    }

    #[test]
    fn test_colors() {
        assert_eq!(rgb(0x12, 0x34, 0x56), 0x12_3456);
        assert_eq!(color_rgb(0xFF_FFFF), 0x04FF_FFFF);
        assert_eq!(clear_color_rgb(0x0100_00FF), 0x0200_00FF);
    }

    #[test]
    fn test_vertices() {
        assert_eq!(vertex2f(16, 32), 0x4000_0000 | (16 << 15) | 32);
        assert_eq!(vertex2ii(1, 2, 3, 4), 0x8000_0000 | (1 << 21) | (2 << 12) | (3 << 7) | 4);
    }

    #[test]
    fn test_tag_words() {
        assert_eq!(tag(7), 0x0300_0007);
        assert_eq!(tag_mask(true), 0x1400_0001);
        assert_eq!(display(), 0);
    }
}
