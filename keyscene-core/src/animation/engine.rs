//! Keyframe playback and frame editing

use super::{AnimationClip, Easing, Keyframe, PoseTarget};
use crate::error::{AnimationError, AnimationResult};

/// Playback state machine over an optional clip.
///
/// Stopped or playing, forward or reverse; `replay` decides what happens at
/// either end of the clip.
#[derive(Debug, Clone)]
pub struct AnimationEngine {
    clip: Option<AnimationClip>,
    frame: usize,
    play: bool,
    reverse: bool,
    replay: bool,
    /// Fraction of a frame accumulated since the last commit
    delta_frame: f64,
    ease: Easing,
    fps: f64,
}

impl Default for AnimationEngine {
    fn default() -> Self {
        Self::new(30.0, Easing::default())
    }
}

impl AnimationEngine {
    pub fn new(fps: f64, ease: Easing) -> Self {
        Self {
            clip: None,
            frame: 0,
            play: false,
            reverse: false,
            replay: false,
            delta_frame: 0.0,
            ease,
            fps: fps.max(0.1),
        }
    }

    fn reset_status(&mut self) {
        self.frame = 0;
        self.play = false;
        self.reverse = false;
        self.replay = false;
        self.delta_frame = 0.0;
    }

    /// Swap in a new clip (or none), returning the previous one.
    /// Playback is reset to frame 0, stopped, forward, non-replay.
    pub fn set_clip(&mut self, clip: Option<AnimationClip>) -> Option<AnimationClip> {
        let previous = std::mem::replace(&mut self.clip, clip);
        self.reset_status();
        log::debug!("animation clip set, {} frames", self.length());
        previous
    }

    pub fn take_clip(&mut self) -> Option<AnimationClip> {
        self.set_clip(None)
    }

    pub fn clip(&self) -> Option<&AnimationClip> {
        self.clip.as_ref()
    }

    /// Number of frames; 0 without a clip
    pub fn length(&self) -> usize {
        self.clip.as_ref().map_or(0, AnimationClip::len)
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn current(&self) -> Option<&Keyframe> {
        self.clip.as_ref()?.get(self.frame)
    }

    pub fn is_playing(&self) -> bool {
        self.play
    }

    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    pub fn is_replay(&self) -> bool {
        self.replay
    }

    pub fn delta_frame(&self) -> f64 {
        self.delta_frame
    }

    pub fn ease(&self) -> Easing {
        self.ease
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// `"3 of 10"` (1-based) or `"No Animation"`
    pub fn status(&self) -> String {
        match self.length() {
            0 => "No Animation".to_string(),
            len => format!("{} of {}", self.frame + 1, len),
        }
    }

    pub fn play(&mut self) {
        if self.length() == 0 {
            log::debug!("play ignored, no animation loaded");
            return;
        }
        self.play = true;
    }

    pub fn pause(&mut self) {
        self.play = false;
    }

    pub fn toggle_reverse(&mut self) -> bool {
        self.reverse = !self.reverse;
        self.reverse
    }

    pub fn set_reverse(&mut self, reverse: bool) {
        self.reverse = reverse;
    }

    pub fn set_replay(&mut self, replay: bool) {
        self.replay = replay;
    }

    pub fn set_ease(&mut self, ease: Easing) {
        self.ease = ease;
    }

    pub fn set_fps(&mut self, fps: f64) {
        if fps.is_finite() && fps > 0.0 {
            self.fps = fps;
        } else {
            log::warn!("ignoring invalid fps {fps}");
        }
    }

    fn step_forward(&self) -> Option<usize> {
        let len = self.length();
        if len == 0 {
            None
        } else if self.frame + 1 < len {
            Some(self.frame + 1)
        } else if self.replay {
            Some(0)
        } else {
            None
        }
    }

    fn step_backward(&self) -> Option<usize> {
        let len = self.length();
        if len == 0 {
            None
        } else if self.frame > 0 {
            Some(self.frame - 1)
        } else if self.replay {
            Some(len - 1)
        } else {
            None
        }
    }

    /// Index the play direction leads to, if any
    fn upcoming(&self) -> Option<usize> {
        if self.reverse {
            self.step_backward()
        } else {
            self.step_forward()
        }
    }

    /// Next frame; wraps in replay mode, stays on the last frame otherwise
    pub fn next(&mut self) {
        if let Some(frame) = self.step_forward() {
            self.frame = frame;
        }
        self.delta_frame = 0.0;
    }

    /// Previous frame; wraps in replay mode, stays on the first frame otherwise
    pub fn prev(&mut self) {
        if let Some(frame) = self.step_backward() {
            self.frame = frame;
        }
        self.delta_frame = 0.0;
    }

    pub fn first(&mut self) {
        self.frame = 0;
        self.delta_frame = 0.0;
    }

    pub fn last(&mut self) {
        self.frame = self.length().saturating_sub(1);
        self.delta_frame = 0.0;
    }

    /// Jump to `frame`, clamped into the clip
    pub fn goto(&mut self, frame: usize) {
        self.frame = frame.min(self.length().saturating_sub(1));
        self.delta_frame = 0.0;
    }

    /// One step in play direction.
    ///
    /// Without replay, stepping off either end stops playback and keeps the
    /// frame. Returns whether the frame index changed.
    pub fn advance(&mut self) -> bool {
        match self.upcoming() {
            Some(frame) => {
                self.frame = frame;
                true
            }
            None => {
                if self.play {
                    log::debug!("animation reached the end at frame {}", self.frame);
                }
                self.play = false;
                false
            }
        }
    }

    /// Push the current frame to `target`
    pub fn apply_current<T: PoseTarget + ?Sized>(&self, target: &mut T) {
        if let Some(frame) = self.current() {
            target.apply(frame);
        }
    }

    /// Advance playback by `delta` seconds.
    ///
    /// Whole frames are committed one at a time; in between, the current
    /// and upcoming keyframes are blended with the selected easing.
    pub fn tick<T: PoseTarget + ?Sized>(&mut self, delta: f64, target: &mut T) {
        if !self.play || self.length() == 0 {
            return;
        }
        if !(delta.is_finite() && delta > 0.0) {
            log::debug!("ignoring tick with delta {delta}");
            return;
        }

        self.delta_frame += delta * self.fps;
        if self.delta_frame >= 1.0 {
            self.delta_frame = 0.0;
            self.advance();
            self.apply_current(target);
            return;
        }

        let blended = match (self.current(), self.upcoming().and_then(|i| self.clip.as_ref()?.get(i))) {
            (Some(current), Some(next)) => current.interpolate(next, self.ease.apply(self.delta_frame)),
            (Some(current), None) => current.clone(),
            (None, _) => return,
        };
        target.apply(&blended);
    }

    fn frames_mut(&mut self) -> AnimationResult<&mut Vec<Keyframe>> {
        match self.clip.as_mut() {
            Some(clip) if !clip.is_empty() => Ok(clip.frames_mut()),
            _ => Err(AnimationError::NoFrame),
        }
    }

    /// Snapshot `target` into a new first frame and jump to it
    pub fn add_first<T: PoseTarget + ?Sized>(&mut self, target: &T) {
        let frame = target.snapshot();
        self.clip.get_or_insert_with(AnimationClip::default).frames_mut().insert(0, frame);
        self.frame = 0;
        self.delta_frame = 0.0;
    }

    /// Snapshot `target` into a new last frame and jump to it
    pub fn add_last<T: PoseTarget + ?Sized>(&mut self, target: &T) {
        let frame = target.snapshot();
        let frames = self.clip.get_or_insert_with(AnimationClip::default).frames_mut();
        frames.push(frame);
        self.frame = frames.len() - 1;
        self.delta_frame = 0.0;
    }

    /// Remove the current frame; the index is clamped to the new length
    pub fn delete_frame(&mut self) -> AnimationResult<Keyframe> {
        let index = self.frame;
        let frames = self.frames_mut()?;
        let removed = frames.remove(index.min(frames.len() - 1));
        let remaining = frames.len();

        self.frame = index.min(remaining.saturating_sub(1));
        self.delta_frame = 0.0;
        if remaining == 0 {
            self.play = false;
        }
        Ok(removed)
    }

    /// Exchange the current frame with the one before it and follow it
    pub fn swap_frame_before(&mut self) -> AnimationResult<()> {
        let index = self.frame;
        let frames = self.frames_mut()?;
        if index > 0 && index < frames.len() {
            frames.swap(index, index - 1);
            self.frame = index - 1;
        }
        Ok(())
    }

    /// Exchange the current frame with the one after it and follow it
    pub fn swap_frame_after(&mut self) -> AnimationResult<()> {
        let index = self.frame;
        let frames = self.frames_mut()?;
        if index + 1 < frames.len() {
            frames.swap(index, index + 1);
            self.frame = index + 1;
        }
        Ok(())
    }

    /// Overwrite the current frame with the live pose of `target`
    pub fn save_frame<T: PoseTarget + ?Sized>(&mut self, target: &T) -> AnimationResult<()> {
        let index = self.frame;
        let frames = self.frames_mut()?;
        let slot = frames.get_mut(index).ok_or(AnimationError::NoFrame)?;
        *slot = target.snapshot();
        Ok(())
    }

    /// The whole clip as JSON; an empty array without a clip
    pub fn save_animation(&self) -> AnimationResult<String> {
        match &self.clip {
            Some(clip) => clip.to_json(),
            None => AnimationClip::default().to_json(),
        }
    }

    /// Replace the clip with one parsed from JSON; the old clip is kept on error
    pub fn load_animation(&mut self, json: &str) -> AnimationResult<()> {
        let clip = AnimationClip::from_json(json)?;
        self.set_clip(Some(clip));
        Ok(())
    }
}
