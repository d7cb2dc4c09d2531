//! Playback controller: arbitrates a single authoritative time position
//! between the model's playhead and the renderer's internal clock.
//!
//! While playing, a periodic `tick` reads the renderer clock back into the
//! playhead; otherwise the playhead is the source of truth and seeks are
//! only re-issued to the renderer when playback is active.

use log::debug;

use crate::core::observer::{ObserverRegistry, SubscriptionToken};
use crate::core::time::Time;
use crate::playback::state::{PlayState, TimeAuthority};
use crate::sync::renderer::Renderer;

/// Events emitted by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackEvent {
    StateChanged(PlayState),
    TimeChanged(Time),
}

pub struct PlaybackController {
    playhead: Time,
    state: PlayState,
    looping: bool,
    rate: f64,
    volume: f32,
    observers: ObserverRegistry<PlaybackEvent>,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self {
            playhead: 0,
            state: PlayState::Stopped,
            looping: false,
            rate: 1.0,
            volume: 1.0,
            observers: ObserverRegistry::new(),
        }
    }

    // ----- queries ---------------------------------------------------------

    pub fn playhead(&self) -> Time {
        self.playhead
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn authority(&self) -> TimeAuthority {
        self.state.authority()
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    // ----- transport -------------------------------------------------------

    /// Hand time authority to the renderer clock and start playback from
    /// the playhead.
    pub fn play(&mut self, renderer: &mut dyn Renderer) {
        if self.state.is_playing() {
            return;
        }
        renderer.set_time(self.playhead);
        renderer.play();
        self.set_state(PlayState::Playing);
    }

    /// Hand authority back to the playhead, keeping the current position.
    pub fn pause(&mut self, renderer: &mut dyn Renderer) {
        if self.state.is_playing() {
            self.playhead = renderer.get_time();
        }
        renderer.pause();
        self.set_state(PlayState::Paused);
    }

    /// Halt and rewind to zero.
    pub fn stop(&mut self, renderer: &mut dyn Renderer) {
        renderer.pause();
        renderer.set_time(0);
        self.playhead = 0;
        self.set_state(PlayState::Stopped);
        self.observers.emit(PlaybackEvent::TimeChanged(0));
    }

    /// Seek, clamping to `[0, duration]`. The seek is re-issued to the
    /// renderer only while playing; otherwise the playhead alone moves and
    /// the renderer picks the position up on the next `play`.
    pub fn seek_to(&mut self, t: Time, duration: Time, renderer: &mut dyn Renderer) {
        let clamped = t.clamp(0, duration.max(0));
        self.playhead = clamped;
        if self.state.is_playing() {
            renderer.set_time(clamped);
        }
        self.observers.emit(PlaybackEvent::TimeChanged(clamped));
    }

    /// Periodic read-back while playing: write the renderer's reported time
    /// into the playhead, looping or pausing at the end of the timeline.
    pub fn tick(&mut self, duration: Time, renderer: &mut dyn Renderer) {
        if !self.state.is_playing() {
            return;
        }
        let t = renderer.get_time();
        if t >= duration {
            if self.looping {
                debug!("loop: seeking renderer back to 0");
                renderer.set_time(0);
                self.playhead = 0;
            } else {
                renderer.pause();
                self.playhead = duration.max(0);
                self.set_state(PlayState::Paused);
            }
        } else {
            self.playhead = t;
        }
        self.observers.emit(PlaybackEvent::TimeChanged(self.playhead));
    }

    /// Re-clamp the playhead after the project duration changed (e.g. a
    /// clip at the end was removed).
    pub fn reconcile_duration(&mut self, duration: Time, renderer: &mut dyn Renderer) {
        if self.playhead > duration {
            self.seek_to(duration, duration, renderer);
        }
    }

    // ----- mirrored settings ----------------------------------------------

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Applied directly to the renderer and mirrored; never changes time
    /// authority.
    pub fn set_rate(&mut self, rate: f64, renderer: &mut dyn Renderer) {
        self.rate = rate;
        renderer.set_rate(rate);
    }

    pub fn set_volume(&mut self, volume: f32, renderer: &mut dyn Renderer) {
        self.volume = volume.clamp(0.0, 1.0);
        renderer.set_volume(self.volume);
    }

    // ----- observers -------------------------------------------------------

    pub fn subscribe(&mut self) -> (SubscriptionToken, crossbeam::channel::Receiver<PlaybackEvent>) {
        self.observers.subscribe()
    }

    pub fn unsubscribe(&mut self, token: SubscriptionToken) -> bool {
        self.observers.unsubscribe(token)
    }

    fn set_state(&mut self, state: PlayState) {
        if self.state != state {
            self.state = state;
            self.observers.emit(PlaybackEvent::StateChanged(state));
        }
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::from_millis;
    use crate::sync::renderer::{HeadlessRenderer, RendererConfig};

    fn setup() -> (PlaybackController, HeadlessRenderer) {
        let mut renderer = HeadlessRenderer::new();
        renderer.initialize(RendererConfig::default()).unwrap();
        (PlaybackController::new(), renderer)
    }

    #[test]
    fn test_seek_clamps_at_both_ends() {
        let (mut pc, mut renderer) = setup();
        let duration = from_millis(30_000);

        pc.seek_to(from_millis(-500), duration, &mut renderer);
        assert_eq!(pc.playhead(), 0);

        pc.seek_to(from_millis(45_000), duration, &mut renderer);
        assert_eq!(pc.playhead(), duration);
    }

    #[test]
    fn test_play_hands_authority_to_renderer() {
        let (mut pc, mut renderer) = setup();
        let duration = from_millis(10_000);
        pc.seek_to(from_millis(2000), duration, &mut renderer);

        pc.play(&mut renderer);
        assert_eq!(pc.authority(), TimeAuthority::RendererClock);
        assert!(renderer.is_playing());
        assert_eq!(renderer.get_time(), from_millis(2000));

        renderer.advance(from_millis(1500));
        pc.tick(duration, &mut renderer);
        assert_eq!(pc.playhead(), from_millis(3500));
    }

    #[test]
    fn test_pause_reads_back_renderer_time() {
        let (mut pc, mut renderer) = setup();
        pc.play(&mut renderer);
        renderer.advance(from_millis(4000));

        pc.pause(&mut renderer);
        assert_eq!(pc.playhead(), from_millis(4000));
        assert_eq!(pc.authority(), TimeAuthority::Playhead);
        assert!(!renderer.is_playing());
    }

    #[test]
    fn test_seek_while_paused_does_not_touch_renderer_clock() {
        let (mut pc, mut renderer) = setup();
        renderer.set_time(from_millis(5000));

        pc.seek_to(from_millis(1000), from_millis(30_000), &mut renderer);
        assert_eq!(pc.playhead(), from_millis(1000));
        assert_eq!(renderer.get_time(), from_millis(5000));

        // but play starts from the playhead
        pc.play(&mut renderer);
        assert_eq!(renderer.get_time(), from_millis(1000));
    }

    #[test]
    fn test_seek_while_playing_reissues_to_renderer() {
        let (mut pc, mut renderer) = setup();
        pc.play(&mut renderer);
        pc.seek_to(from_millis(7000), from_millis(30_000), &mut renderer);
        assert_eq!(renderer.get_time(), from_millis(7000));
        assert!(renderer.is_playing());
    }

    #[test]
    fn test_loop_wraps_to_zero_and_keeps_playing() {
        let (mut pc, mut renderer) = setup();
        let duration = from_millis(1000);
        pc.set_looping(true);
        pc.play(&mut renderer);

        renderer.advance(from_millis(1500));
        pc.tick(duration, &mut renderer);
        assert_eq!(pc.playhead(), 0);
        assert_eq!(renderer.get_time(), 0);
        assert!(renderer.is_playing());
    }

    #[test]
    fn test_end_without_loop_pauses_at_duration() {
        let (mut pc, mut renderer) = setup();
        let duration = from_millis(1000);
        pc.play(&mut renderer);

        renderer.advance(from_millis(1500));
        pc.tick(duration, &mut renderer);
        assert_eq!(pc.playhead(), duration);
        assert_eq!(pc.state(), PlayState::Paused);
        assert!(!renderer.is_playing());
    }

    #[test]
    fn test_rate_and_volume_are_mirrored() {
        let (mut pc, mut renderer) = setup();
        pc.set_rate(2.0, &mut renderer);
        pc.set_volume(0.5, &mut renderer);
        assert_eq!(renderer.rate(), 2.0);
        assert_eq!(renderer.volume(), 0.5);
        // authority is untouched
        assert_eq!(pc.authority(), TimeAuthority::Playhead);
    }

    #[test]
    fn test_events_are_emitted() {
        let (mut pc, mut renderer) = setup();
        let (_token, rx) = pc.subscribe();

        pc.play(&mut renderer);
        assert_eq!(
            rx.try_recv().unwrap(),
            PlaybackEvent::StateChanged(PlayState::Playing)
        );
    }

    #[test]
    fn test_reconcile_shrunk_duration() {
        let (mut pc, mut renderer) = setup();
        pc.seek_to(from_millis(20_000), from_millis(30_000), &mut renderer);
        pc.reconcile_duration(from_millis(10_000), &mut renderer);
        assert_eq!(pc.playhead(), from_millis(10_000));
    }
}
