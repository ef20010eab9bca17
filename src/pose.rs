//! Joint angles, the idle animation and the one-shot "spark" reaction.
//!
//! A [`Pose`] carries two independent state bits:
//!
//! - **auto-animate**: every tick, all joint angles are overwritten by
//!   closed-form sinusoids of elapsed time
//! - **reaction**: a one-shot effect (eyes widen, cheeks flash, tail twitches)
//!   that advances a progress scalar each tick while the trigger is held
//!
//! Both may be active at once. With neither active the pose only changes
//! through [`Pose::set_angle`].

use crate::color::Color;

/// Arms hang at this angle; the idle swing oscillates around it.
pub const ARM_BASELINE: f32 = 200.0;

/// Baseline eye scale (no reaction).
pub const EYE_SCALE_BASELINE: f32 = 1.0;

/// Baseline cheek color (no reaction).
pub const CHEEK_BASELINE: Color = Color::rgb(0.93, 0.2, 0.15);

/// Cheek color at the peak of the reaction.
pub const CHEEK_SPARK: Color = Color::rgb(1.0, 0.95, 0.35);

/// Reaction progress bounds and per-tick increment.
pub const REACTION_START: f32 = 0.0;
pub const REACTION_END: f32 = 1.0;
pub const REACTION_STEP: f32 = 0.02;

const EYE_SCALE_GAIN: f32 = 0.6;
const TAIL_TWITCH_GAIN: f32 = 30.0;

/// `amplitude · sin(omega · t)` for one animated field.
#[derive(Clone, Copy, Debug)]
struct Wave {
    amplitude: f32,
    omega: f32,
}

impl Wave {
    const fn new(amplitude: f32, omega: f32) -> Self {
        Self { amplitude, omega }
    }

    fn at(self, t: f32) -> f32 {
        self.amplitude * (self.omega * t).sin()
    }
}

const HEAD_WAVE: Wave = Wave::new(10.0, 3.0);
const TAIL_BASE_WAVE: Wave = Wave::new(12.0, 2.0);
const TAIL_MID_WAVE: Wave = Wave::new(18.0, 2.5);
const TAIL_TIP_WAVE: Wave = Wave::new(24.0, 3.0);
const ARM_WAVE: Wave = Wave::new(25.0, 4.0);
const FOOT_WAVE: Wave = Wave::new(15.0, 4.0);

/// A user-posable joint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Joint {
    Head,
    TailBase,
    TailMid,
    TailTip,
    LeftArm,
    RightArm,
    LeftFoot,
    RightFoot,
}

impl Joint {
    pub const ALL: [Joint; 8] = [
        Joint::Head,
        Joint::TailBase,
        Joint::TailMid,
        Joint::TailTip,
        Joint::LeftArm,
        Joint::RightArm,
        Joint::LeftFoot,
        Joint::RightFoot,
    ];

    /// The joint after this one, wrapping around.
    pub fn next(self) -> Joint {
        let index = Self::ALL.iter().position(|j| *j == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Joint::Head => "head",
            Joint::TailBase => "tail base",
            Joint::TailMid => "tail mid",
            Joint::TailTip => "tail tip",
            Joint::LeftArm => "left arm",
            Joint::RightArm => "right arm",
            Joint::LeftFoot => "left foot",
            Joint::RightFoot => "right foot",
        }
    }
}

/// Complete posing state for one frame. Angles are in degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct Pose {
    pub head: f32,
    pub tail_base: f32,
    pub tail_mid: f32,
    pub tail_tip: f32,
    pub left_arm: f32,
    pub right_arm: f32,
    pub left_foot: f32,
    pub right_foot: f32,
    /// Extra tail-base rotation driven by the reaction.
    pub tail_twitch: f32,

    pub eye_scale: f32,
    pub cheek_color: Color,

    auto_animate: bool,
    reaction_triggered: bool,
    reaction_progress: f32,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            head: 0.0,
            tail_base: 0.0,
            tail_mid: 0.0,
            tail_tip: 0.0,
            left_arm: ARM_BASELINE,
            right_arm: ARM_BASELINE,
            left_foot: 0.0,
            right_foot: 0.0,
            tail_twitch: 0.0,
            eye_scale: EYE_SCALE_BASELINE,
            cheek_color: CHEEK_BASELINE,
            auto_animate: false,
            reaction_triggered: false,
            reaction_progress: REACTION_START,
        }
    }
}

impl Pose {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pose with every joint angle at zero, including the arms.
    pub fn zeroed() -> Self {
        Self {
            left_arm: 0.0,
            right_arm: 0.0,
            ..Self::default()
        }
    }

    pub fn is_animating(&self) -> bool {
        self.auto_animate
    }

    pub fn is_reacting(&self) -> bool {
        self.reaction_triggered
    }

    pub fn reaction_progress(&self) -> f32 {
        self.reaction_progress
    }

    /// Turns the idle animation on or off, effective from the next tick.
    pub fn set_auto_animate(&mut self, on: bool) {
        if self.auto_animate != on {
            log::debug!("idle animation {}", if on { "on" } else { "off" });
        }
        self.auto_animate = on;
    }

    /// Presses or releases the reaction trigger.
    ///
    /// Releasing cancels a running reaction; the next tick restores the
    /// baselines.
    pub fn set_trigger(&mut self, held: bool) {
        self.reaction_triggered = held;
    }

    pub fn angle(&self, joint: Joint) -> f32 {
        match joint {
            Joint::Head => self.head,
            Joint::TailBase => self.tail_base,
            Joint::TailMid => self.tail_mid,
            Joint::TailTip => self.tail_tip,
            Joint::LeftArm => self.left_arm,
            Joint::RightArm => self.right_arm,
            Joint::LeftFoot => self.left_foot,
            Joint::RightFoot => self.right_foot,
        }
    }

    /// Sets a joint angle directly.
    ///
    /// Ignored while the idle animation owns the joints; returns whether the
    /// value was written.
    pub fn set_angle(&mut self, joint: Joint, degrees: f32) -> bool {
        if self.auto_animate {
            return false;
        }
        *self.angle_mut(joint) = degrees;
        true
    }

    fn angle_mut(&mut self, joint: Joint) -> &mut f32 {
        match joint {
            Joint::Head => &mut self.head,
            Joint::TailBase => &mut self.tail_base,
            Joint::TailMid => &mut self.tail_mid,
            Joint::TailTip => &mut self.tail_tip,
            Joint::LeftArm => &mut self.left_arm,
            Joint::RightArm => &mut self.right_arm,
            Joint::LeftFoot => &mut self.left_foot,
            Joint::RightFoot => &mut self.right_foot,
        }
    }

    /// Advances the pose by one tick at `elapsed` seconds since start.
    pub fn update(&mut self, elapsed: f32) {
        if self.auto_animate {
            self.animate(elapsed);
        }

        if self.reaction_triggered {
            self.advance_reaction();
        } else {
            self.reset_reaction();
        }
    }

    fn animate(&mut self, t: f32) {
        self.head = HEAD_WAVE.at(t);
        self.tail_base = TAIL_BASE_WAVE.at(t);
        self.tail_mid = TAIL_MID_WAVE.at(t);
        self.tail_tip = TAIL_TIP_WAVE.at(t);
        self.left_arm = ARM_BASELINE + ARM_WAVE.at(t);
        self.right_arm = ARM_BASELINE - ARM_WAVE.at(t);
        self.left_foot = FOOT_WAVE.at(t);
        // The composer mirrors the second foot.
        self.right_foot = FOOT_WAVE.at(t);
    }

    fn advance_reaction(&mut self) {
        self.reaction_progress = (self.reaction_progress + REACTION_STEP).min(REACTION_END);

        if self.reaction_progress >= REACTION_END {
            // One-shot: end and rearm. The trigger must be pressed again.
            self.reaction_triggered = false;
            self.reset_reaction();
            return;
        }

        let p = self.reaction_progress;
        self.eye_scale = EYE_SCALE_BASELINE + EYE_SCALE_GAIN * p;
        self.cheek_color = CHEEK_BASELINE.lerp(CHEEK_SPARK, p);
        self.tail_twitch = TAIL_TWITCH_GAIN * p;
    }

    fn reset_reaction(&mut self) {
        self.reaction_progress = REACTION_START;
        self.eye_scale = EYE_SCALE_BASELINE;
        self.cheek_color = CHEEK_BASELINE;
        self.tail_twitch = 0.0;
    }
}
