//! Debounced touch event loop
//!
//! Once per tick the session samples the touch tag (0 = nothing touched,
//! otherwise the tag of the widget under the finger) and feeds it here.
//!
//! ```text
//! state          tag    action
//! Unpressed      != 0   on_touch_start, then Pressed(tag)
//!                       (IgnoreUnpress if the screen changed)
//! Pressed(t)     t      on_touch_held each time the repeat timer elapses
//! Pressed(t)     0      on_touch_end, arm debounce, Debouncing
//! Debouncing     0      Unpressed once the debounce timer elapses
//! Debouncing     != 0   IgnoreUnpress
//! IgnoreUnpress  0      arm debounce, Debouncing
//! ```
//!
//! A release after a press that switched screens is swallowed so the new
//! screen never sees an `on_touch_end` for a touch it did not start.

use crate::config::TouchConfig;
use crate::screen::ScreenContext;
use crate::timer::TinyTimer;

/// Debounce state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TouchState {
    #[default]
    Unpressed,
    /// A widget with this tag is held down
    Pressed(u8),
    /// Wait for the release without reporting it
    IgnoreUnpress,
    /// Released; presses are treated as bounces until the timer elapses
    Debouncing,
}

/// Feedback sounds played by the touch loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TouchSound {
    Press,
    Repeat,
    Unpress,
}

/// Screen context that can also give audible touch feedback
pub trait TouchSink: ScreenContext {
    fn play_touch_sound(&mut self, sound: TouchSound) -> Result<(), Self::Error>;
}

/// Touch debouncer plus the key repeat / debounce timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchTracker {
    state: TouchState,
    timer: TinyTimer,
}

impl TouchTracker {
    pub const fn new() -> Self {
        Self {
            state: TouchState::Unpressed,
            timer: TinyTimer::new(),
        }
    }

    pub fn state(&self) -> TouchState {
        self.state
    }

    /// Advance the state machine with the tag sampled at `now_ms`
    pub fn poll<C: TouchSink>(
        &mut self,
        ctx: &mut C,
        tag: u8,
        now_ms: u32,
        config: &TouchConfig,
    ) -> Result<(), C::Error> {
        match self.state {
            TouchState::Unpressed => {
                if tag != 0 {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("touch start: {}", tag);

                    let last_screen = ctx.current_screen();
                    if ctx.touch_start(tag)? {
                        self.timer.wait_for(now_ms, config.repeat_interval_ms());
                        ctx.play_touch_sound(TouchSound::Press)?;
                    }

                    if last_screen != ctx.current_screen() {
                        #[cfg(feature = "defmt")]
                        defmt::debug!("ignoring press: {}", tag);
                        self.state = TouchState::IgnoreUnpress;
                    } else {
                        self.state = TouchState::Pressed(tag);
                    }
                }
            }
            TouchState::Debouncing => {
                if tag == 0 {
                    if self.timer.elapsed(now_ms) {
                        self.state = TouchState::Unpressed;
                        ctx.play_touch_sound(TouchSound::Unpress)?;
                    }
                } else {
                    self.state = TouchState::IgnoreUnpress;
                }
            }
            TouchState::IgnoreUnpress => {
                if tag == 0 {
                    self.timer.wait_for(now_ms, config.debounce_ms as u32);
                    self.state = TouchState::Debouncing;
                }
            }
            TouchState::Pressed(pressed) => {
                if tag == pressed {
                    if self.timer.elapsed(now_ms) && ctx.touch_held(tag)? {
                        ctx.play_touch_sound(TouchSound::Repeat)?;
                        self.timer.wait_for(now_ms, config.repeat_interval_ms());
                    }
                } else if tag == 0 {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("touch end: {}", pressed);

                    ctx.touch_end(pressed)?;
                    self.timer.wait_for(now_ms, config.debounce_ms as u32);
                    self.state = TouchState::Debouncing;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::{Screen, ScreenHandlers, ScreenId, ScreenStack};
    use std::vec::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        Start(u8),
        Held(u8),
        End(u8),
        OtherEnd(u8),
    }

    /// Tag that navigates away when pressed
    const NAV_TAG: u8 = 9;

    struct Panel {
        stack: ScreenStack<Panel>,
        events: Vec<Event>,
        sounds: Vec<TouchSound>,
    }

    impl ScreenContext for Panel {
        type Error = ();

        fn screens(&self) -> &ScreenStack<Self> {
            &self.stack
        }

        fn screens_mut(&mut self) -> &mut ScreenStack<Self> {
            &mut self.stack
        }

        fn refresh(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    impl TouchSink for Panel {
        fn play_touch_sound(&mut self, sound: TouchSound) -> Result<(), ()> {
            self.sounds.push(sound);
            Ok(())
        }
    }

    struct Keypad;

    impl Screen<Panel> for Keypad {
        fn on_redraw(_ctx: &mut Panel) -> Result<(), ()> {
            Ok(())
        }

        fn on_touch_start(ctx: &mut Panel, tag: u8) -> Result<bool, ()> {
            ctx.events.push(Event::Start(tag));
            if tag == NAV_TAG {
                ctx.go_to(ScreenId(1))?;
            }
            Ok(true)
        }

        fn on_touch_held(ctx: &mut Panel, tag: u8) -> Result<bool, ()> {
            ctx.events.push(Event::Held(tag));
            Ok(true)
        }

        fn on_touch_end(ctx: &mut Panel, tag: u8) -> Result<(), ()> {
            ctx.events.push(Event::End(tag));
            Ok(())
        }
    }

    struct Other;

    impl Screen<Panel> for Other {
        fn on_redraw(_ctx: &mut Panel) -> Result<(), ()> {
            Ok(())
        }

        fn on_touch_end(ctx: &mut Panel, tag: u8) -> Result<(), ()> {
            ctx.events.push(Event::OtherEnd(tag));
            Ok(())
        }
    }

    static SCREENS: [ScreenHandlers<Panel>; 2] =
        [ScreenHandlers::of::<Keypad>(), ScreenHandlers::of::<Other>()];

    fn panel() -> Panel {
        Panel {
            stack: ScreenStack::new(&SCREENS, ScreenId(0)),
            events: Vec::new(),
            sounds: Vec::new(),
        }
    }

    /// Milliseconds at the start of timer tick `n`
    fn tick(n: u32) -> u32 {
        n * 64
    }

    #[test]
    fn test_press_release_sequence() {
        let mut ctx = panel();
        let mut touch = TouchTracker::new();
        let config = TouchConfig::default();

        for (i, tag) in [0u8, 7, 7, 0].into_iter().enumerate() {
            touch.poll(&mut ctx, tag, tick(i as u32), &config).unwrap();
            match i {
                0 => assert!(ctx.events.is_empty()),
                1 => assert_eq!(ctx.events, [Event::Start(7)]),
                2 => assert_eq!(ctx.events, [Event::Start(7)]),
                _ => assert_eq!(ctx.events, [Event::Start(7), Event::End(7)]),
            }
        }
        assert_eq!(touch.state(), TouchState::Debouncing);

        // Debounce window still open
        touch.poll(&mut ctx, 0, tick(4), &config).unwrap();
        assert_eq!(touch.state(), TouchState::Debouncing);

        touch.poll(&mut ctx, 0, tick(7), &config).unwrap();
        assert_eq!(touch.state(), TouchState::Unpressed);
        assert_eq!(ctx.sounds, [TouchSound::Press, TouchSound::Unpress]);
    }

    #[test]
    fn test_held_press_repeats() {
        let mut ctx = panel();
        let mut touch = TouchTracker::new();
        let config = TouchConfig::default();

        touch.poll(&mut ctx, 5, tick(0), &config).unwrap();
        touch.poll(&mut ctx, 5, tick(2), &config).unwrap();
        assert_eq!(ctx.events, [Event::Start(5)]);

        touch.poll(&mut ctx, 5, tick(6), &config).unwrap();
        assert_eq!(ctx.events, [Event::Start(5), Event::Held(5)]);
        assert_eq!(ctx.sounds, [TouchSound::Press, TouchSound::Repeat]);
        assert_eq!(touch.state(), TouchState::Pressed(5));
    }

    #[test]
    fn test_sliding_to_other_tag_is_ignored() {
        let mut ctx = panel();
        let mut touch = TouchTracker::new();
        let config = TouchConfig::default();

        touch.poll(&mut ctx, 5, tick(0), &config).unwrap();
        touch.poll(&mut ctx, 6, tick(10), &config).unwrap();
        assert_eq!(touch.state(), TouchState::Pressed(5));
        assert_eq!(ctx.events, [Event::Start(5)]);
    }

    #[test]
    fn test_screen_change_suppresses_release() {
        let mut ctx = panel();
        let mut touch = TouchTracker::new();
        let config = TouchConfig::default();

        touch.poll(&mut ctx, NAV_TAG, tick(0), &config).unwrap();
        assert_eq!(ctx.current_screen(), ScreenId(1));
        assert_eq!(touch.state(), TouchState::IgnoreUnpress);

        touch.poll(&mut ctx, NAV_TAG, tick(1), &config).unwrap();
        touch.poll(&mut ctx, 0, tick(2), &config).unwrap();
        assert_eq!(touch.state(), TouchState::Debouncing);
        assert_eq!(ctx.events, [Event::Start(NAV_TAG)]);
        assert!(!ctx.events.iter().any(|e| matches!(e, Event::OtherEnd(_))));
    }

    #[test]
    fn test_bounce_while_debouncing() {
        let mut ctx = panel();
        let mut touch = TouchTracker::new();
        let config = TouchConfig::default();

        touch.poll(&mut ctx, 3, tick(0), &config).unwrap();
        touch.poll(&mut ctx, 0, tick(1), &config).unwrap();
        assert_eq!(touch.state(), TouchState::Debouncing);

        touch.poll(&mut ctx, 3, tick(2), &config).unwrap();
        assert_eq!(touch.state(), TouchState::IgnoreUnpress);

        touch.poll(&mut ctx, 0, tick(3), &config).unwrap();
        touch.poll(&mut ctx, 0, tick(10), &config).unwrap();
        assert_eq!(touch.state(), TouchState::Unpressed);
        assert_eq!(ctx.events, [Event::Start(3), Event::End(3)]);
    }
}
