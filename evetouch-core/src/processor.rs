//! Command processor
//!
//! A chaining builder over the command FIFO that constrains every widget to
//! a bounding box, so screens can be laid out on a resolution-independent
//! [`Grid`] instead of hand-tuned coordinates.
//!
//! ```text
//! cmd.font(27)
//!    .tag(1).button(grid.cell(1, 1, 2, 1), "Back")
//!    .tag(2).slider(grid.cell(1, 2, 4, 1), volume, 255)
//!    .execute()?;
//! ```
//!
//! Link errors are latched: the first failure stops further output and is
//! returned from [`CommandProcessor::finish`] or [`CommandProcessor::execute`].

use core::fmt;

use heapless::String;

use evetouch_protocol::commands::opt::{OPT_3D, OPT_CENTER, OPT_CENTERX, OPT_CENTERY, OPT_RIGHTX};
use evetouch_protocol::dl::{self, Primitive};
use evetouch_protocol::sound::rom_font_height;
use evetouch_protocol::Command;

use crate::fifo::{CommandFifo, FifoError};
use crate::link::{Payload, RegisterLink};

/// Default font for labels
pub const DEFAULT_FONT: i16 = 26;

/// Capacity of formatted labels
pub const MAX_LABEL_LEN: usize = 48;

/// A bounding box in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub x: i16,
    pub y: i16,
    pub w: i16,
    pub h: i16,
}

impl Rect {
    pub const fn new(x: i16, y: i16, w: i16, h: i16) -> Self {
        Self { x, y, w, h }
    }

    pub const fn center_x(&self) -> i16 {
        self.x + self.w / 2
    }

    pub const fn center_y(&self) -> i16 {
        self.y + self.h / 2
    }

    /// Radius of the largest circle centered in the box
    pub const fn radius(&self) -> i16 {
        if self.w < self.h {
            self.w / 2
        } else {
            self.h / 2
        }
    }

    /// Inset bar used by linear widgets: one height of margin on each end,
    /// half the height tall
    pub const fn bar(&self) -> Rect {
        Rect {
            x: self.x + self.h,
            y: self.y + self.h / 4,
            w: self.w - self.h * 2,
            h: self.h / 2,
        }
    }
}

/// Layout grid dividing the screen into equal cells with margins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Grid {
    pub width: u16,
    pub height: u16,
    pub cols: u8,
    pub rows: u8,
    pub margin: i16,
}

impl Grid {
    pub const fn new(width: u16, height: u16, cols: u8, rows: u8, margin: i16) -> Self {
        Self {
            width,
            height,
            cols,
            rows,
            margin,
        }
    }

    /// Position of vertical division `i`
    pub const fn grid_x(&self, i: u8) -> i16 {
        (i as i32 * self.width as i32 / self.cols as i32) as i16
    }

    /// Position of horizontal division `i`
    pub const fn grid_y(&self, i: u8) -> i16 {
        (i as i32 * self.height as i32 / self.rows as i32) as i16
    }

    /// Box spanning `w` x `h` cells with its top-left in 1-based cell `(x, y)`
    pub const fn cell(&self, x: u8, y: u8, w: u8, h: u8) -> Rect {
        Rect {
            x: self.grid_x(x.saturating_sub(1)) + self.margin,
            y: self.grid_y(y.saturating_sub(1)) + self.margin,
            w: self.grid_x(w) - 2 * self.margin,
            h: self.grid_y(h) - 2 * self.margin,
        }
    }
}

/// Chaining command builder
pub struct CommandProcessor<'a, L: RegisterLink, F: CommandFifo> {
    link: &'a mut L,
    fifo: &'a mut F,
    font: i16,
    options: Option<u16>,
    error: Option<FifoError<L::Error>>,
}

impl<'a, L: RegisterLink, F: CommandFifo> CommandProcessor<'a, L, F> {
    /// Start a batch on `fifo`
    pub fn new(link: &'a mut L, fifo: &'a mut F) -> Self {
        let mut cmd = Self {
            link,
            fifo,
            font: DEFAULT_FONT,
            options: None,
            error: None,
        };
        let result = cmd.fifo.start(&mut *cmd.link);
        cmd.latch(result);
        cmd
    }

    fn latch(&mut self, result: Result<(), FifoError<L::Error>>) {
        if let Err(e) = result {
            if self.error.is_none() {
                self.error = Some(e);
            }
        }
    }

    fn emit<P: Payload + ?Sized>(&mut self, payload: &P) -> &mut Self {
        if self.error.is_none() {
            let result = self.fifo.write(&mut *self.link, payload);
            self.latch(result);
        }
        self
    }

    fn take_options(&mut self, default: u16) -> u16 {
        self.options.take().unwrap_or(default)
    }

    /// Raw 32-bit word (usually a display-list instruction)
    pub fn cmd(&mut self, word: u32) -> &mut Self {
        self.emit(&word.to_le_bytes()[..])
    }

    /// Encoded co-processor command
    pub fn command(&mut self, command: Command) -> &mut Self {
        self.emit(command.encode().as_bytes())
    }

    /// NUL-terminated string argument
    pub fn label(&mut self, text: &str) -> &mut Self {
        self.emit(&crate::link::Text(text))
    }

    /// Font used by subsequent labelled widgets
    pub fn font(&mut self, font: i16) -> &mut Self {
        self.font = font;
        self
    }

    /// Option flags for the next widget only
    pub fn options(&mut self, options: u16) -> &mut Self {
        self.options = Some(options);
        self
    }

    /// Tag subsequent primitives for touch identification
    pub fn tag(&mut self, tag: u8) -> &mut Self {
        self.cmd(dl::tag(tag))
    }

    pub fn color(&mut self, rgb: u32) -> &mut Self {
        self.cmd(dl::color_rgb(rgb))
    }

    pub fn fgcolor(&mut self, rgb: u32) -> &mut Self {
        self.command(Command::FgColor(rgb))
    }

    pub fn bgcolor(&mut self, rgb: u32) -> &mut Self {
        self.command(Command::BgColor(rgb))
    }

    pub fn gradcolor(&mut self, rgb: u32) -> &mut Self {
        self.command(Command::GradColor(rgb))
    }

    pub fn button(&mut self, r: Rect, text: &str) -> &mut Self {
        let options = self.take_options(OPT_3D);
        self.command(Command::Button {
            x: r.x,
            y: r.y,
            w: r.w,
            h: r.h,
            font: self.font,
            options,
        })
        .label(text)
    }

    pub fn keys(&mut self, r: Rect, keys: &str) -> &mut Self {
        let options = self.take_options(OPT_3D);
        self.command(Command::Keys {
            x: r.x,
            y: r.y,
            w: r.w,
            h: r.h,
            font: self.font,
            options,
        })
        .label(keys)
    }

    /// Text placed inside the box according to its alignment options
    ///
    /// Defaults to centered. Without `OPT_CENTERY` the text baseline sits
    /// on the bottom edge of the box.
    pub fn text(&mut self, r: Rect, text: &str) -> &mut Self {
        let options = self.take_options(OPT_CENTER);
        let x = if options & OPT_CENTERX != 0 {
            r.x + r.w / 2
        } else if options & OPT_RIGHTX != 0 {
            r.x + r.w
        } else {
            r.x
        };
        let y = if options & OPT_CENTERY != 0 { r.y + r.h / 2 } else { r.y + r.h };
        self.command(Command::Text {
            x,
            y,
            font: self.font,
            options,
        })
        .label(text)
    }

    /// Text built from format arguments, truncated to [`MAX_LABEL_LEN`]
    pub fn text_fmt(&mut self, r: Rect, args: fmt::Arguments<'_>) -> &mut Self {
        let mut s: String<MAX_LABEL_LEN> = String::new();
        // Overflow truncates the label
        let _ = fmt::write(&mut s, args);
        self.text(r, &s)
    }

    /// Toggle switch vertically centered in the box
    pub fn toggle(&mut self, r: Rect, text: &str, state: bool) -> &mut Self {
        let options = self.take_options(OPT_3D);
        let line_h = rom_font_height(self.font).unwrap_or(16) as i16;
        let widget_h = line_h * 20 / 16;
        // The toggle's y coordinate is the text baseline
        let fudge_y = line_h * 5 / 16;
        self.command(Command::Toggle {
            x: r.x + r.h,
            y: r.y + r.h / 2 - widget_h / 2 + fudge_y,
            w: r.w - r.h * 2,
            font: self.font,
            options,
            state,
        })
        .label(text)
    }

    pub fn number(&mut self, r: Rect, n: i32) -> &mut Self {
        let options = self.take_options(OPT_CENTER);
        self.command(Command::Number {
            x: r.center_x(),
            y: r.center_y(),
            font: self.font,
            options,
            n,
        })
    }

    pub fn slider(&mut self, r: Rect, val: u16, range: u16) -> &mut Self {
        let options = self.take_options(OPT_3D);
        let b = r.bar();
        self.command(Command::Slider {
            x: b.x,
            y: b.y,
            w: b.w,
            h: b.h,
            options,
            val,
            range,
        })
    }

    pub fn progress(&mut self, r: Rect, val: u16, range: u16) -> &mut Self {
        let options = self.take_options(OPT_3D);
        let b = r.bar();
        self.command(Command::Progress {
            x: b.x,
            y: b.y,
            w: b.w,
            h: b.h,
            options,
            val,
            range,
        })
    }

    pub fn scrollbar(&mut self, r: Rect, val: u16, size: u16, range: u16) -> &mut Self {
        let options = self.take_options(0);
        let b = r.bar();
        self.command(Command::Scrollbar {
            x: b.x,
            y: b.y,
            w: b.w,
            h: b.h,
            options,
            val,
            size,
            range,
        })
    }

    pub fn dial(&mut self, r: Rect, val: u16) -> &mut Self {
        let options = self.take_options(OPT_3D);
        self.command(Command::Dial {
            x: r.center_x(),
            y: r.center_y(),
            r: r.radius(),
            options,
            val,
        })
    }

    pub fn gauge(&mut self, r: Rect, major: u16, minor: u16, val: u16, range: u16) -> &mut Self {
        let options = self.take_options(OPT_3D);
        self.command(Command::Gauge {
            x: r.center_x(),
            y: r.center_y(),
            r: r.radius(),
            options,
            major,
            minor,
            val,
            range,
        })
    }

    pub fn clock(&mut self, r: Rect, h: i16, m: i16, s: i16, ms: i16) -> &mut Self {
        let options = self.take_options(OPT_3D);
        self.command(Command::Clock {
            x: r.center_x(),
            y: r.center_y(),
            r: r.radius(),
            options,
            h,
            m,
            s,
            ms,
        })
    }

    /// Track touches over a widget; rotary tracking follows the angle
    /// around the box center
    pub fn track(&mut self, r: Rect, tag: u8, rotary: bool) -> &mut Self {
        let (x, y, w, h) = if rotary {
            (r.center_x(), r.center_y(), 1, 1)
        } else {
            let b = r.bar();
            (b.x, b.y, b.w, b.h)
        };
        self.command(Command::Track { x, y, w, h, tag })
    }

    /// Stop any active tracking
    pub fn untrack(&mut self) -> &mut Self {
        self.command(Command::Track {
            x: 0,
            y: 0,
            w: 0,
            h: 0,
            tag: 0,
        })
    }

    /// Filled rectangle
    pub fn rect(&mut self, r: Rect) -> &mut Self {
        self.cmd(dl::begin(Primitive::Rects))
            .cmd(dl::vertex2f(r.x * 16, r.y * 16))
            .cmd(dl::vertex2f((r.x + r.w) * 16, (r.y + r.h) * 16))
            .cmd(dl::end())
    }

    /// Reference lines along every grid division
    pub fn layout_grid(&mut self, grid: &Grid) -> &mut Self {
        self.cmd(dl::line_width(4)).cmd(dl::begin(Primitive::Lines));
        for i in 1..grid.cols {
            let x = grid.grid_x(i) * 16;
            self.cmd(dl::vertex2f(x, 0))
                .cmd(dl::vertex2f(x, grid.height as i16 * 16));
        }
        for i in 1..grid.rows {
            let y = grid.grid_y(i) * 16;
            self.cmd(dl::vertex2f(0, y))
                .cmd(dl::vertex2f(grid.width as i16 * 16, y));
        }
        self.cmd(dl::end()).cmd(dl::line_width(16))
    }

    /// Return the latched error, if any, without publishing
    pub fn finish(&mut self) -> Result<(), FifoError<L::Error>> {
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Publish everything written to the co-processor
    pub fn execute(&mut self) -> Result<(), FifoError<L::Error>> {
        self.finish()?;
        self.fifo.execute(&mut *self.link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fifo::AnyFifo;
    use crate::sim::SimulatedEve;
    use evetouch_protocol::commands::opcode;
    use evetouch_protocol::ChipModel;

    fn setup() -> (SimulatedEve, AnyFifo) {
        (
            SimulatedEve::new(ChipModel::Ft800),
            AnyFifo::for_chip(ChipModel::Ft800, None),
        )
    }

    fn halves(word: u32) -> (i16, i16) {
        (word as u16 as i16, (word >> 16) as u16 as i16)
    }

    #[test]
    fn test_grid_cells() {
        let grid = Grid::new(480, 272, 4, 4, 3);
        assert_eq!(grid.grid_x(1), 120);
        assert_eq!(grid.grid_y(2), 136);
        assert_eq!(grid.cell(1, 1, 1, 1), Rect::new(3, 3, 114, 62));
        assert_eq!(grid.cell(2, 3, 2, 1), Rect::new(123, 139, 234, 62));
    }

    #[test]
    fn test_bar_geometry() {
        let r = Rect::new(10, 20, 200, 40);
        assert_eq!(r.bar(), Rect::new(50, 30, 120, 20));
        assert_eq!(r.radius(), 20);
        assert_eq!((r.center_x(), r.center_y()), (110, 40));
    }

    #[test]
    fn test_button_with_label() {
        let (mut eve, mut fifo) = setup();
        CommandProcessor::new(&mut eve, &mut fifo)
            .font(28)
            .button(Rect::new(1, 2, 3, 4), "Go")
            .execute()
            .unwrap();
        let words = eve.consumed_words();
        assert_eq!(words[0], opcode::BUTTON);
        assert_eq!(halves(words[1]), (1, 2));
        assert_eq!(halves(words[2]), (3, 4));
        assert_eq!(halves(words[3]), (28, OPT_3D as i16));
        assert_eq!(words[4], u32::from_le_bytes([b'G', b'o', 0, 0]));
        assert_eq!(words.len(), 5);
    }

    #[test]
    fn test_text_alignment() {
        let (mut eve, mut fifo) = setup();
        let r = Rect::new(100, 50, 40, 20);
        CommandProcessor::new(&mut eve, &mut fifo)
            .text(r, "c")
            .options(OPT_RIGHTX)
            .text(r, "r")
            .text(r, "again centered")
            .execute()
            .unwrap();
        let words = eve.consumed_words();
        assert_eq!(halves(words[1]), (120, 60));
        // Second text starts after opcode, 2 argument words and a padded "r\0"
        assert_eq!(words[4], opcode::TEXT);
        assert_eq!(halves(words[5]), (140, 70));
        assert_eq!(words[8], opcode::TEXT);
        assert_eq!(halves(words[9]), (120, 60));
    }

    #[test]
    fn test_options_apply_to_next_widget_only() {
        let (mut eve, mut fifo) = setup();
        let r = Rect::new(0, 0, 100, 20);
        CommandProcessor::new(&mut eve, &mut fifo)
            .options(0x0100)
            .slider(r, 1, 2)
            .slider(r, 1, 2)
            .execute()
            .unwrap();
        let words = eve.consumed_words();
        // opcode, x/y, w/h, options/val, range (padded)
        assert_eq!(words[3] & 0xFFFF, 0x0100);
        assert_eq!(words[8] & 0xFFFF, OPT_3D as u32);
    }

    #[test]
    fn test_track_rotary_and_linear() {
        let (mut eve, mut fifo) = setup();
        let r = Rect::new(0, 0, 100, 40);
        CommandProcessor::new(&mut eve, &mut fifo)
            .track(r, 5, true)
            .track(r, 6, false)
            .untrack()
            .execute()
            .unwrap();
        let words = eve.consumed_words();
        assert_eq!(words[0], opcode::TRACK);
        assert_eq!(halves(words[1]), (50, 20));
        assert_eq!(halves(words[2]), (1, 1));
        assert_eq!(words[3], 5);
        assert_eq!(halves(words[5]), (40, 10));
        assert_eq!(halves(words[6]), (20, 20));
        assert_eq!(words[7], 6);
        assert_eq!(&words[8..12], &[opcode::TRACK, 0, 0, 0]);
    }

    #[test]
    fn test_text_fmt() {
        let (mut eve, mut fifo) = setup();
        CommandProcessor::new(&mut eve, &mut fifo)
            .text_fmt(Rect::new(0, 0, 10, 10), format_args!("v{}", 42))
            .execute()
            .unwrap();
        let words = eve.consumed_words();
        assert_eq!(words[3], u32::from_le_bytes([b'v', b'4', b'2', 0]));
    }

    #[test]
    fn test_nothing_published_until_execute() {
        let (mut eve, mut fifo) = setup();
        let mut cmd = CommandProcessor::new(&mut eve, &mut fifo);
        cmd.tag(3).rect(Rect::new(0, 0, 10, 10));
        assert_eq!(cmd.finish(), Ok(()));
        drop(cmd);
        assert!(eve.consumed().is_empty());
    }

    #[test]
    fn test_error_is_latched() {
        let mut eve = SimulatedEve::new(ChipModel::Ft800);
        eve.stall();
        let mut fifo = AnyFifo::for_chip(ChipModel::Ft800, Some(1));
        let block = [0u8; 3000];
        let mut cmd = CommandProcessor::new(&mut eve, &mut fifo);
        cmd.emit(&block[..]).emit(&block[..]).tag(1);
        assert_eq!(cmd.execute(), Err(FifoError::Timeout));
        assert_eq!(cmd.finish(), Ok(()));
    }
}
