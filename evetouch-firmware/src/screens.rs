//! Demo screens
//!
//! A twelve-key piano with an octave selector, and a settings screen
//! with tracked volume and brightness sliders. Screens are generic over
//! the link and clock so only `main` names the concrete board types.

use evetouch_core::sound::sequences;
use evetouch_core::{
    Clock, DisplaySession, FifoError, RegisterLink, Screen, ScreenContext, ScreenId, UiConfig,
};
use evetouch_protocol::{note, opt, Effect};

pub const PIANO: ScreenId = ScreenId(0);
pub const SETTINGS: ScreenId = ScreenId(1);

const TAG_OCTAVE_DOWN: u8 = 1;
const TAG_OCTAVE_UP: u8 = 2;
const TAG_SETTINGS: u8 = 3;
/// Keys use tags `TAG_FIRST_KEY..TAG_FIRST_KEY + 12`
const TAG_FIRST_KEY: u8 = 10;

const TAG_VOLUME: u8 = 40;
const TAG_BRIGHTNESS: u8 = 41;
const TAG_CLICKS: u8 = 42;
const TAG_INSTRUMENT: u8 = 43;
const TAG_CHIMES: u8 = 44;
const TAG_BACK: u8 = 45;

const MIN_OCTAVE: u8 = 2;
const MAX_OCTAVE: u8 = 6;

/// Full backlight duty
const MAX_BRIGHTNESS: u8 = 128;

const FONT: i16 = 27;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

const INSTRUMENTS: [(Effect, &str); 6] = [
    (Effect::Piano, "Piano"),
    (Effect::Harp, "Harp"),
    (Effect::Xylophone, "Xylophone"),
    (Effect::Organ, "Organ"),
    (Effect::Trumpet, "Trumpet"),
    (Effect::Glockenspiel, "Glockenspiel"),
];

/// State shared by the screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct App {
    pub octave: u8,
    /// Index into the instrument list
    pub instrument: usize,
    pub volume: u8,
    pub brightness: u8,
    /// Key clicks outside the piano screen
    pub clicks: bool,
}

impl App {
    pub fn new(config: &UiConfig) -> Self {
        Self {
            octave: 4,
            instrument: 0,
            volume: config.sound.volume,
            brightness: MAX_BRIGHTNESS,
            clicks: config.touch.sound,
        }
    }

    fn instrument(&self) -> (Effect, &'static str) {
        INSTRUMENTS[self.instrument % INSTRUMENTS.len()]
    }

    /// MIDI note for key `index` in the current octave
    fn key_note(&self, index: u8) -> u8 {
        12 * (self.octave + 1) + index
    }
}

type Session<L, K> = DisplaySession<L, K, App>;
type Outcome<L, T = ()> = Result<T, FifoError<<L as RegisterLink>::Error>>;

pub struct Piano;

impl<L, K> Screen<Session<L, K>> for Piano
where
    L: RegisterLink + 'static,
    K: Clock + 'static,
{
    fn on_entry(ctx: &mut Session<L, K>) -> Outcome<L> {
        // Clicks would cut off the notes
        ctx.set_touch_sound(false);
        ctx.refresh()
    }

    fn on_exit(ctx: &mut Session<L, K>) -> Outcome<L> {
        ctx.set_touch_sound(ctx.app.clicks);
        Ok(())
    }

    fn on_redraw(ctx: &mut Session<L, K>) -> Outcome<L> {
        let grid = ctx.config().layout.grid();
        let cols = ctx.config().layout.cols.max(3);
        let octave = ctx.app.octave;

        let mut cmd = ctx.cmd();
        cmd.font(FONT)
            .tag(TAG_OCTAVE_DOWN)
            .button(grid.cell(1, 1, 1, 1), "-")
            .tag(0)
            .text_fmt(grid.cell(2, 1, 1, 1), format_args!("Octave {}", octave))
            .tag(TAG_OCTAVE_UP)
            .button(grid.cell(3, 1, 1, 1), "+")
            .tag(TAG_SETTINGS)
            .button(grid.cell(cols, 1, 1, 1), "Setup");

        for (i, name) in NOTE_NAMES.iter().enumerate() {
            let i = i as u8;
            let sharp = name.len() > 1;
            cmd.fgcolor(if sharp { 0x20_20_20 } else { 0x80_80_70 })
                .tag(TAG_FIRST_KEY + i)
                .button(grid.cell(i % cols + 1, i / cols + 2, 1, 1), name);
        }
        cmd.finish()
    }

    fn on_touch_start(ctx: &mut Session<L, K>, tag: u8) -> Outcome<L, bool> {
        match tag {
            TAG_OCTAVE_DOWN | TAG_OCTAVE_UP => {
                let octave = if tag == TAG_OCTAVE_UP {
                    (ctx.app.octave + 1).min(MAX_OCTAVE)
                } else {
                    ctx.app.octave.saturating_sub(1).max(MIN_OCTAVE)
                };
                ctx.app.octave = octave;
                let (effect, _) = ctx.app.instrument();
                ctx.play_effect(effect, ctx.app.key_note(0))?;
                ctx.refresh()?;
                Ok(true)
            }
            TAG_SETTINGS => {
                ctx.go_to(SETTINGS)?;
                Ok(true)
            }
            t if (TAG_FIRST_KEY..TAG_FIRST_KEY + 12).contains(&t) => {
                let (effect, _) = ctx.app.instrument();
                ctx.play_effect(effect, ctx.app.key_note(t - TAG_FIRST_KEY))?;
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    fn on_touch_held(ctx: &mut Session<L, K>, tag: u8) -> Outcome<L, bool> {
        // Octave buttons repeat, keys do not
        match tag {
            TAG_OCTAVE_DOWN | TAG_OCTAVE_UP => {
                <Self as Screen<Session<L, K>>>::on_touch_start(ctx, tag)
            }
            _ => Ok(false),
        }
    }

    fn on_touch_end(ctx: &mut Session<L, K>, tag: u8) -> Outcome<L> {
        if (TAG_FIRST_KEY..TAG_FIRST_KEY + 12).contains(&tag) {
            ctx.play_effect(Effect::Silence, note::REST)?;
        }
        Ok(())
    }
}

pub struct Settings;

impl<L, K> Screen<Session<L, K>> for Settings
where
    L: RegisterLink + 'static,
    K: Clock + 'static,
{
    fn on_startup(ctx: &mut Session<L, K>) -> Outcome<L> {
        ctx.set_backlight(ctx.app.brightness)
    }

    fn on_idle(ctx: &mut Session<L, K>) -> Outcome<L> {
        if !ctx.is_tracking() {
            return Ok(());
        }
        let reading = ctx.tracker()?;
        match reading.tag {
            TAG_VOLUME => {
                ctx.app.volume = (reading.value >> 8) as u8;
                ctx.set_volume(ctx.app.volume)?;
            }
            TAG_BRIGHTNESS => {
                let duty = (reading.value as u32 * (MAX_BRIGHTNESS as u32 + 1)) >> 16;
                ctx.app.brightness = duty as u8;
                ctx.set_backlight(ctx.app.brightness)?;
            }
            _ => return Ok(()),
        }
        ctx.refresh()
    }

    fn on_redraw(ctx: &mut Session<L, K>) -> Outcome<L> {
        let grid = ctx.config().layout.grid();
        let cols = ctx.config().layout.cols.max(3);
        let app = ctx.app;
        let (_, instrument) = app.instrument();

        ctx.cmd()
            .font(FONT)
            .tag(0)
            .options(opt::OPT_CENTERY | opt::OPT_RIGHTX)
            .text(grid.cell(1, 1, 1, 1), "Volume")
            .tag(TAG_VOLUME)
            .slider(grid.cell(2, 1, cols - 1, 1), app.volume as u16, 255)
            .tag(0)
            .options(opt::OPT_CENTERY | opt::OPT_RIGHTX)
            .text(grid.cell(1, 2, 1, 1), "Brightness")
            .tag(TAG_BRIGHTNESS)
            .slider(
                grid.cell(2, 2, cols - 1, 1),
                app.brightness as u16,
                MAX_BRIGHTNESS as u16,
            )
            .tag(TAG_CLICKS)
            .toggle(grid.cell(1, 3, 2, 1), "Clicks", app.clicks)
            .tag(TAG_INSTRUMENT)
            .button(grid.cell(3, 3, cols - 2, 1), instrument)
            .tag(TAG_CHIMES)
            .button(grid.cell(1, 4, 2, 1), "Chimes")
            .tag(TAG_BACK)
            .button(grid.cell(3, 4, cols - 2, 1), "Back")
            .finish()
    }

    fn on_touch_start(ctx: &mut Session<L, K>, tag: u8) -> Outcome<L, bool> {
        let grid = ctx.config().layout.grid();
        let cols = ctx.config().layout.cols.max(3);
        match tag {
            TAG_VOLUME => {
                ctx.start_tracking(grid.cell(2, 1, cols - 1, 1), TAG_VOLUME, false)?;
                Ok(false)
            }
            TAG_BRIGHTNESS => {
                ctx.start_tracking(grid.cell(2, 2, cols - 1, 1), TAG_BRIGHTNESS, false)?;
                Ok(false)
            }
            TAG_CLICKS => {
                ctx.app.clicks = !ctx.app.clicks;
                ctx.set_touch_sound(ctx.app.clicks);
                ctx.refresh()?;
                Ok(true)
            }
            TAG_INSTRUMENT => {
                ctx.app.instrument = (ctx.app.instrument + 1) % INSTRUMENTS.len();
                ctx.refresh()?;
                Ok(true)
            }
            TAG_CHIMES => {
                ctx.play_sequence(&sequences::CHIMES);
                Ok(false)
            }
            TAG_BACK => {
                ctx.go_back()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
