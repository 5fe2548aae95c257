//! Display session
//!
//! Owns everything the UI loop touches: the register link, the command
//! FIFO, the screen stack, touch state, timers and the sound player. The
//! board calls [`DisplaySession::on_startup`] once and then
//! [`DisplaySession::on_update`] once per tick; every screen handler
//! receives the session as its context.
//!
//! Application state that screens need lives in the `app` field.

use evetouch_protocol::registers::TOUCH_XY_NOT_TOUCHING;
use evetouch_protocol::sound::note;
use evetouch_protocol::{dl, Command, Effect, MemoryMap};

use crate::boot::{self, BootError};
use crate::config::UiConfig;
use crate::fifo::{AnyFifo, CommandFifo, FifoError};
use crate::link::RegisterLink;
use crate::processor::{CommandProcessor, Rect};
use crate::screen::{ScreenContext, ScreenHandlers, ScreenId, ScreenStack};
use crate::sound::{Note, SoundPlayer};
use crate::timer::{Clock, TinyTimer};
use crate::touch::{TouchSink, TouchSound, TouchState, TouchTracker};

/// Tag and value reported by `REG_TRACKER`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrackerReading {
    pub tag: u8,
    /// Position along the tracked widget, 0..=65535
    pub value: u16,
}

/// The UI loop's state and hardware handles
pub struct DisplaySession<L, K, A>
where
    L: RegisterLink + 'static,
    K: Clock + 'static,
    A: 'static,
{
    link: L,
    fifo: AnyFifo,
    clock: K,
    screens: ScreenStack<Self>,
    touch: TouchTracker,
    refresh_timer: TinyTimer,
    tracking: bool,
    touch_sound: bool,
    sound: SoundPlayer,
    config: UiConfig,
    pub app: A,
}

impl<L, K, A> DisplaySession<L, K, A>
where
    L: RegisterLink + 'static,
    K: Clock + 'static,
    A: 'static,
{
    pub fn new(
        link: L,
        clock: K,
        screens: &'static [ScreenHandlers<Self>],
        initial: ScreenId,
        config: UiConfig,
        app: A,
    ) -> Self {
        Self {
            link,
            fifo: AnyFifo::for_chip(config.chip, config.fifo.wait_limit),
            clock,
            screens: ScreenStack::new(screens, initial),
            touch: TouchTracker::new(),
            refresh_timer: TinyTimer::new(),
            tracking: false,
            touch_sound: config.touch.sound,
            sound: SoundPlayer::new(config.chip.map()),
            config,
            app,
        }
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    pub fn map(&self) -> &'static MemoryMap {
        self.fifo.map()
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn fifo_mut(&mut self) -> &mut AnyFifo {
        &mut self.fifo
    }

    /// Command builder for the next batch of co-processor commands
    pub fn cmd(&mut self) -> CommandProcessor<'_, L, AnyFifo> {
        CommandProcessor::new(&mut self.link, &mut self.fifo)
    }

    /// Wait for the controller to answer and reset the command FIFO
    pub fn boot<D: embedded_hal::delay::DelayNs>(
        &mut self,
        delay: &mut D,
        max_polls: u32,
    ) -> Result<(), BootError<L::Error>> {
        boot::boot(&mut self.link, &mut self.fifo, delay, max_polls)
    }

    /// Apply the configured volume and enter the initial screen
    pub fn on_startup(&mut self) -> Result<(), FifoError<L::Error>> {
        self.sound
            .set_volume(&mut self.link, self.config.sound.volume)
            .map_err(FifoError::Link)?;
        let now = self.clock.now_ms();
        self.refresh_timer.wait_for(now, self.config.refresh_ms);
        self.start_screens()
    }

    /// One pass of the cooperative UI loop
    pub fn on_update(&mut self) -> Result<(), FifoError<L::Error>> {
        let now = self.clock.now_ms();

        self.sound
            .on_idle(&mut self.link, now)
            .map_err(FifoError::Link)?;

        if self.refresh_timer.elapsed(now) {
            let interval = if self.tracking {
                self.config.tracking_refresh_ms
            } else {
                self.config.refresh_ms
            };
            self.refresh_timer.wait_for(now, interval);
            self.screen_idle()?;
            if self.tracking && !self.is_touching()? {
                self.stop_tracking()?;
            }
        }

        // Tags are unreliable while a display list is being built
        if !self.fifo.is_idle(&mut self.link)? {
            return Ok(());
        }

        let tag = self
            .link
            .read8(self.map().reg_touch_tag)
            .map_err(FifoError::Link)?;

        let mut touch = self.touch;
        let config = self.config.touch;
        let result = touch.poll(&mut *self, tag, now, &config);
        self.touch = touch;
        result
    }

    pub fn touch_state(&self) -> TouchState {
        self.touch.state()
    }

    /// Whether a finger is on the panel, regardless of tags
    pub fn is_touching(&mut self) -> Result<bool, FifoError<L::Error>> {
        let xy = self
            .link
            .read32(self.map().reg_touch_direct_xy)
            .map_err(FifoError::Link)?;
        Ok(xy & TOUCH_XY_NOT_TOUCHING == 0)
    }

    /// Follow drags over a widget until the finger lifts
    pub fn start_tracking(&mut self, r: Rect, tag: u8, rotary: bool) -> Result<(), FifoError<L::Error>> {
        self.cmd().track(r, tag, rotary).execute()?;
        self.tracking = true;
        let now = self.clock.now_ms();
        self.refresh_timer
            .wait_for(now, self.config.tracking_refresh_ms);
        Ok(())
    }

    pub fn stop_tracking(&mut self) -> Result<(), FifoError<L::Error>> {
        self.tracking = false;
        self.cmd().untrack().execute()
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn tracker(&mut self) -> Result<TrackerReading, FifoError<L::Error>> {
        let raw = self
            .link
            .read32(self.map().reg_tracker)
            .map_err(FifoError::Link)?;
        Ok(TrackerReading {
            tag: raw as u8,
            value: (raw >> 16) as u16,
        })
    }

    pub fn set_touch_sound(&mut self, enabled: bool) {
        self.touch_sound = enabled;
    }

    pub fn touch_sound(&self) -> bool {
        self.touch_sound
    }

    pub fn set_volume(&mut self, volume: u8) -> Result<(), FifoError<L::Error>> {
        self.sound
            .set_volume(&mut self.link, volume)
            .map_err(FifoError::Link)
    }

    /// Backlight duty cycle, 0 (off) to 128 (full)
    pub fn set_backlight(&mut self, duty: u8) -> Result<(), FifoError<L::Error>> {
        self.link
            .write8(self.map().reg_pwm_duty, duty.min(128))
            .map_err(FifoError::Link)
    }

    pub fn play_effect(&mut self, effect: Effect, note: u8) -> Result<(), FifoError<L::Error>> {
        self.sound
            .play_effect(&mut self.link, effect, note)
            .map_err(FifoError::Link)
    }

    /// Queue a note sequence; it starts on a later update
    pub fn play_sequence(&mut self, sequence: &'static [Note]) {
        let now = self.clock.now_ms();
        self.sound.play(sequence, now);
    }

    pub fn play_tone(&mut self, frequency_hz: u16, duration_ms: u16) -> Result<(), FifoError<L::Error>> {
        let now = self.clock.now_ms();
        self.sound
            .play_tone(&mut self.link, frequency_hz, duration_ms, now)
            .map_err(FifoError::Link)
    }

    pub fn is_sound_playing(&mut self) -> Result<bool, FifoError<L::Error>> {
        self.sound.is_playing(&mut self.link).map_err(FifoError::Link)
    }

    pub fn has_more_notes(&self) -> bool {
        self.sound.has_more_notes()
    }
}

impl<L, K, A> ScreenContext for DisplaySession<L, K, A>
where
    L: RegisterLink + 'static,
    K: Clock + 'static,
    A: 'static,
{
    type Error = FifoError<L::Error>;

    fn screens(&self) -> &ScreenStack<Self> {
        &self.screens
    }

    fn screens_mut(&mut self) -> &mut ScreenStack<Self> {
        &mut self.screens
    }

    /// Rebuild the display list from the active screen and swap it in
    fn refresh(&mut self) -> Result<(), Self::Error> {
        let background = self.config.background;
        self.cmd()
            .command(Command::DlStart)
            .cmd(dl::clear_color_rgb(background))
            .cmd(dl::clear(true, true, true))
            .finish()?;
        self.screen_redraw()?;
        self.cmd()
            .cmd(dl::display())
            .command(Command::Swap)
            .execute()
    }
}

impl<L, K, A> TouchSink for DisplaySession<L, K, A>
where
    L: RegisterLink + 'static,
    K: Clock + 'static,
    A: 'static,
{
    fn play_touch_sound(&mut self, sound: TouchSound) -> Result<(), Self::Error> {
        if !self.touch_sound {
            return Ok(());
        }
        let effect = match sound {
            TouchSound::Press => self.config.sound.press,
            TouchSound::Repeat => self.config.sound.repeat,
            TouchSound::Unpress => self.config.sound.unpress,
        };
        self.play_effect(effect, note::C4)
    }
}
