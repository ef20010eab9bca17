//! Keyboard and mouse state, and its mapping onto [`ControlEvent`]s.
//!
//! [`Input`] follows winit window events and keeps per-frame pressed/released
//! sets. [`Controls`] reads it once per frame and turns it into control events:
//!
//! | Input                   | Event                              |
//! |-------------------------|------------------------------------|
//! | Left drag               | `Drag { dx }`                      |
//! | Shift + left press      | `Trigger(true)`, release → `false` |
//! | Space                   | `ToggleAnimation`                  |
//! | Tab                     | select next joint                  |
//! | Up / Down               | selected joint ±5°                 |
//! | Left / Right            | global rotation slider ±5°         |

use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::pose::Joint;
use crate::render_loop::ControlEvent;

/// Degrees per key press for joints and the rotation slider.
pub const KEY_STEP_DEGREES: f32 = 5.0;

/// Tracks input state for keyboard and mouse.
#[derive(Debug, Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
    mouse_buttons_down: HashSet<MouseButton>,
    mouse_buttons_pressed: HashSet<MouseButton>,
    mouse_buttons_released: HashSet<MouseButton>,
    mouse_position: Option<Vec2>,
    mouse_delta: Vec2,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call after each frame to reset per-frame state.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.mouse_buttons_pressed.clear();
        self.mouse_buttons_released.clear();
        self.mouse_delta = Vec2::ZERO;
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.press_key(key),
                        ElementState::Released => self.release_key(key),
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => self.press_button(*button),
                ElementState::Released => self.release_button(*button),
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.move_cursor(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => self.mouse_position = None,
            // Buttons released outside the window never report back.
            WindowEvent::Focused(false) => {
                self.keys_released.extend(self.keys_down.drain());
                self.mouse_buttons_released
                    .extend(self.mouse_buttons_down.drain());
            }
            _ => {}
        }
    }

    fn press_key(&mut self, key: KeyCode) {
        // Key repeat reports Pressed again without a release.
        if self.keys_down.insert(key) {
            self.keys_pressed.insert(key);
        }
    }

    fn release_key(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
        self.keys_released.insert(key);
    }

    fn press_button(&mut self, button: MouseButton) {
        if self.mouse_buttons_down.insert(button) {
            self.mouse_buttons_pressed.insert(button);
        }
    }

    fn release_button(&mut self, button: MouseButton) {
        self.mouse_buttons_down.remove(&button);
        self.mouse_buttons_released.insert(button);
    }

    fn move_cursor(&mut self, position: Vec2) {
        // The first position after entering carries no movement.
        if let Some(previous) = self.mouse_position {
            self.mouse_delta += position - previous;
        }
        self.mouse_position = Some(position);
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Returns true if the mouse button is currently held down.
    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons_down.contains(&button)
    }

    /// Returns true if the mouse button was pressed this frame.
    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons_pressed.contains(&button)
    }

    /// Returns true if the mouse button was released this frame.
    pub fn mouse_released(&self, button: MouseButton) -> bool {
        self.mouse_buttons_released.contains(&button)
    }

    /// Mouse movement delta this frame.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    fn shift_down(&self) -> bool {
        self.key_down(KeyCode::ShiftLeft) || self.key_down(KeyCode::ShiftRight)
    }
}

/// Maps raw [`Input`] onto control events and remembers the selected joint.
#[derive(Debug)]
pub struct Controls {
    selected: Joint,
    /// Set while a Shift + click holds the reaction trigger.
    triggering: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            selected: Joint::ALL[0],
            triggering: false,
        }
    }
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    /// The joint that Up/Down adjust.
    pub fn selected(&self) -> Joint {
        self.selected
    }

    /// Reads this frame's input. Call once per frame, before
    /// [`Input::end_frame`].
    pub fn poll(&mut self, input: &Input) -> Vec<ControlEvent> {
        let mut events = Vec::new();

        if input.mouse_pressed(MouseButton::Left) && input.shift_down() {
            self.triggering = true;
            events.push(ControlEvent::Trigger(true));
        }
        if self.triggering && !input.mouse_down(MouseButton::Left) {
            self.triggering = false;
            events.push(ControlEvent::Trigger(false));
        }

        let dx = input.mouse_delta().x;
        if !self.triggering && input.mouse_down(MouseButton::Left) && dx != 0.0 {
            events.push(ControlEvent::Drag { dx });
        }

        if input.key_pressed(KeyCode::Space) {
            events.push(ControlEvent::ToggleAnimation);
        }
        if input.key_pressed(KeyCode::Tab) {
            self.selected = self.selected.next();
            log::info!("Selected joint: {}", self.selected.name());
        }
        if input.key_pressed(KeyCode::ArrowUp) {
            events.push(ControlEvent::AdjustAngle(self.selected, KEY_STEP_DEGREES));
        }
        if input.key_pressed(KeyCode::ArrowDown) {
            events.push(ControlEvent::AdjustAngle(self.selected, -KEY_STEP_DEGREES));
        }
        if input.key_pressed(KeyCode::ArrowRight) {
            events.push(ControlEvent::AdjustGlobalRotation(KEY_STEP_DEGREES));
        }
        if input.key_pressed(KeyCode::ArrowLeft) {
            events.push(ControlEvent::AdjustGlobalRotation(-KEY_STEP_DEGREES));
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_repeat_is_not_a_new_press() {
        let mut input = Input::new();
        input.press_key(KeyCode::Space);
        input.end_frame();
        input.press_key(KeyCode::Space);

        assert!(input.key_down(KeyCode::Space));
        assert!(!input.key_pressed(KeyCode::Space));
    }

    #[test]
    fn first_cursor_position_has_no_delta() {
        let mut input = Input::new();
        input.move_cursor(Vec2::new(300.0, 200.0));
        assert_eq!(input.mouse_delta(), Vec2::ZERO);

        input.move_cursor(Vec2::new(310.0, 195.0));
        input.move_cursor(Vec2::new(312.0, 195.0));
        assert_eq!(input.mouse_delta(), Vec2::new(12.0, -5.0));
    }

    #[test]
    fn left_drag_becomes_drag_events() {
        let mut input = Input::new();
        let mut controls = Controls::new();
        input.move_cursor(Vec2::ZERO);
        input.press_button(MouseButton::Left);
        input.move_cursor(Vec2::new(10.0, 3.0));

        assert_eq!(controls.poll(&input), vec![ControlEvent::Drag { dx: 10.0 }]);

        input.end_frame();
        assert!(controls.poll(&input).is_empty());
    }

    #[test]
    fn moving_without_a_button_does_not_drag() {
        let mut input = Input::new();
        let mut controls = Controls::new();
        input.move_cursor(Vec2::ZERO);
        input.move_cursor(Vec2::new(40.0, 0.0));
        assert!(controls.poll(&input).is_empty());
    }

    #[test]
    fn shift_click_holds_the_trigger_until_release() {
        let mut input = Input::new();
        let mut controls = Controls::new();
        input.press_key(KeyCode::ShiftLeft);
        input.move_cursor(Vec2::ZERO);
        input.press_button(MouseButton::Left);

        assert_eq!(controls.poll(&input), vec![ControlEvent::Trigger(true)]);
        input.end_frame();

        // Held and moving: still triggering, no drag.
        input.move_cursor(Vec2::new(25.0, 0.0));
        assert!(controls.poll(&input).is_empty());
        input.end_frame();

        input.release_button(MouseButton::Left);
        assert_eq!(controls.poll(&input), vec![ControlEvent::Trigger(false)]);
    }

    #[test]
    fn losing_focus_releases_held_buttons() {
        let mut input = Input::new();
        let mut controls = Controls::new();
        input.press_key(KeyCode::ShiftRight);
        input.press_button(MouseButton::Left);
        assert_eq!(controls.poll(&input), vec![ControlEvent::Trigger(true)]);
        input.end_frame();

        input.handle_event(&WindowEvent::Focused(false));

        assert!(input.mouse_released(MouseButton::Left));
        assert!(!input.mouse_down(MouseButton::Left));
        assert!(!input.key_down(KeyCode::ShiftRight));
        assert_eq!(controls.poll(&input), vec![ControlEvent::Trigger(false)]);

        input.end_frame();
        assert!(!input.mouse_released(MouseButton::Left));
    }

    #[test]
    fn keys_map_to_animation_joint_and_slider_events() {
        let mut input = Input::new();
        let mut controls = Controls::new();
        let first = controls.selected();

        input.press_key(KeyCode::Space);
        input.press_key(KeyCode::Tab);
        input.press_key(KeyCode::ArrowUp);
        input.press_key(KeyCode::ArrowLeft);

        let events = controls.poll(&input);
        assert_eq!(controls.selected(), first.next());
        assert_eq!(
            events,
            vec![
                ControlEvent::ToggleAnimation,
                ControlEvent::AdjustAngle(first.next(), KEY_STEP_DEGREES),
                ControlEvent::AdjustGlobalRotation(-KEY_STEP_DEGREES),
            ]
        );
    }

    #[test]
    fn tab_cycles_through_every_joint() {
        let mut input = Input::new();
        let mut controls = Controls::new();
        let start = controls.selected();

        for _ in 0..Joint::ALL.len() {
            input.press_key(KeyCode::Tab);
            controls.poll(&input);
            input.release_key(KeyCode::Tab);
            input.end_frame();
        }
        assert_eq!(controls.selected(), start);
    }
}
