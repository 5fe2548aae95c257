//! Screen registry and navigation
//!
//! Screens are a fixed, compile-time set of variants. Each variant
//! implements [`Screen`] and is registered as a row of function pointers
//! in a static table; a [`ScreenId`] is simply the row index. The active
//! screen and its back-navigation history live in a [`ScreenStack`] owned
//! by the context the handlers run against.
//!
//! ```text
//! static SCREENS: [ScreenHandlers<Ui>; 2] = [
//!     ScreenHandlers::of::<MainMenu>(),   // ScreenId(0)
//!     ScreenHandlers::of::<Settings>(),   // ScreenId(1)
//! ];
//! ```

mod stack;

pub use stack::{ScreenStack, HISTORY_DEPTH};

/// Index of a screen variant in the handler table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScreenId(pub u8);

/// The operation set every screen variant supplies
///
/// Only [`Screen::on_redraw`] is required. Handlers receive the whole
/// context, so they can draw, navigate, or touch application state.
pub trait Screen<C: ScreenContext> {
    /// One-time initialization, called for every variant at startup
    fn on_startup(_ctx: &mut C) -> Result<(), C::Error> {
        Ok(())
    }

    /// Called when this screen becomes active; redraws by default
    fn on_entry(ctx: &mut C) -> Result<(), C::Error> {
        ctx.refresh()
    }

    /// Called when this screen stops being active
    fn on_exit(_ctx: &mut C) -> Result<(), C::Error> {
        Ok(())
    }

    /// Called on every refresh tick while active
    fn on_idle(_ctx: &mut C) -> Result<(), C::Error> {
        Ok(())
    }

    /// Render the screen's widgets into the current display list
    fn on_redraw(ctx: &mut C) -> Result<(), C::Error>;

    /// A tagged widget was pressed; `true` arms key repeat and plays the
    /// press sound
    fn on_touch_start(_ctx: &mut C, _tag: u8) -> Result<bool, C::Error> {
        Ok(true)
    }

    /// The press is still held after the repeat interval; `true` repeats
    fn on_touch_held(_ctx: &mut C, _tag: u8) -> Result<bool, C::Error> {
        Ok(false)
    }

    /// The press was released
    fn on_touch_end(_ctx: &mut C, _tag: u8) -> Result<(), C::Error> {
        Ok(())
    }
}

type Handler<C> = fn(&mut C) -> Result<(), <C as ScreenContext>::Error>;
type TouchHandler<C> = fn(&mut C, u8) -> Result<bool, <C as ScreenContext>::Error>;
type ReleaseHandler<C> = fn(&mut C, u8) -> Result<(), <C as ScreenContext>::Error>;

/// One row of the dispatch table
pub struct ScreenHandlers<C: ScreenContext> {
    pub on_startup: Handler<C>,
    pub on_entry: Handler<C>,
    pub on_exit: Handler<C>,
    pub on_idle: Handler<C>,
    pub on_redraw: Handler<C>,
    pub on_touch_start: TouchHandler<C>,
    pub on_touch_held: TouchHandler<C>,
    pub on_touch_end: ReleaseHandler<C>,
}

impl<C: ScreenContext> ScreenHandlers<C> {
    /// Table row for screen variant `S`
    pub const fn of<S: Screen<C>>() -> Self {
        Self {
            on_startup: S::on_startup,
            on_entry: S::on_entry,
            on_exit: S::on_exit,
            on_idle: S::on_idle,
            on_redraw: S::on_redraw,
            on_touch_start: S::on_touch_start,
            on_touch_held: S::on_touch_held,
            on_touch_end: S::on_touch_end,
        }
    }
}

/// Whatever owns the screen stack and can redraw it
///
/// Navigation and event dispatch are provided; implementors only expose
/// the stack and define what a redraw means.
pub trait ScreenContext: Sized + 'static {
    type Error;

    fn screens(&self) -> &ScreenStack<Self>;
    fn screens_mut(&mut self) -> &mut ScreenStack<Self>;

    /// Redraw the active screen
    fn refresh(&mut self) -> Result<(), Self::Error>;

    fn current_screen(&self) -> ScreenId {
        self.screens().current()
    }

    /// Run every variant's startup hook, then enter the initial screen
    fn start_screens(&mut self) -> Result<(), Self::Error> {
        let table = self.screens().table();
        for handlers in table {
            (handlers.on_startup)(self)?;
        }
        self.screen_entry()
    }

    /// Navigate to `target`, remembering the current screen
    ///
    /// Returns `false` without side effects if `target` is not registered.
    fn go_to(&mut self, target: ScreenId) -> Result<bool, Self::Error> {
        let Some(next) = self.screens().lookup(target) else {
            #[cfg(feature = "defmt")]
            defmt::warn!("screen not found: {}", target);
            return Ok(false);
        };
        self.screen_exit()?;
        self.screens_mut().push();
        self.screens_mut().set_current(next);
        #[cfg(feature = "defmt")]
        defmt::debug!("new screen: {}", next);
        self.screen_entry()?;
        Ok(true)
    }

    /// Return to the most recently remembered screen
    fn go_back(&mut self) -> Result<(), Self::Error> {
        self.screen_exit()?;
        self.screens_mut().pop();
        #[cfg(feature = "defmt")]
        defmt::debug!("back to screen: {}", self.current_screen());
        self.screen_entry()
    }

    fn screen_entry(&mut self) -> Result<(), Self::Error> {
        match self.screens().active() {
            Some(h) => (h.on_entry)(self),
            None => Ok(()),
        }
    }

    fn screen_exit(&mut self) -> Result<(), Self::Error> {
        match self.screens().active() {
            Some(h) => (h.on_exit)(self),
            None => Ok(()),
        }
    }

    fn screen_idle(&mut self) -> Result<(), Self::Error> {
        match self.screens().active() {
            Some(h) => (h.on_idle)(self),
            None => Ok(()),
        }
    }

    fn screen_redraw(&mut self) -> Result<(), Self::Error> {
        match self.screens().active() {
            Some(h) => (h.on_redraw)(self),
            None => Ok(()),
        }
    }

    fn touch_start(&mut self, tag: u8) -> Result<bool, Self::Error> {
        match self.screens().active() {
            Some(h) => (h.on_touch_start)(self, tag),
            None => Ok(false),
        }
    }

    fn touch_held(&mut self, tag: u8) -> Result<bool, Self::Error> {
        match self.screens().active() {
            Some(h) => (h.on_touch_held)(self, tag),
            None => Ok(false),
        }
    }

    fn touch_end(&mut self, tag: u8) -> Result<(), Self::Error> {
        match self.screens().active() {
            Some(h) => (h.on_touch_end)(self, tag),
            None => Ok(()),
        }
    }
}
