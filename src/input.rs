//! Keyboard and joystick input
//!
//! Host callbacks land here and never touch the match directly; the host
//! takes one [`TickInput`] per frame and hands it to the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::sim::{DekeCommand, TickInput};

/// Joystick pad size (travel is clamped to this square)
pub const JOYSTICK_SIZE: f32 = 100.0;

/// Keys the game responds to (macOS virtual key codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum ControlKey {
    /// W
    Up = 13,
    /// A
    Left = 0,
    /// S
    Down = 1,
    /// D
    Right = 2,
    LeftArrow = 123,
    RightArrow = 124,
    UpArrow = 126,
    DownArrow = 125,
    Space = 49,
}

impl ControlKey {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            13 => Some(ControlKey::Up),
            0 => Some(ControlKey::Left),
            1 => Some(ControlKey::Down),
            2 => Some(ControlKey::Right),
            123 => Some(ControlKey::LeftArrow),
            124 => Some(ControlKey::RightArrow),
            126 => Some(ControlKey::UpArrow),
            125 => Some(ControlKey::DownArrow),
            49 => Some(ControlKey::Space),
            _ => None,
        }
    }

    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn opposite(self) -> ControlKey {
        match self {
            ControlKey::Up => ControlKey::Down,
            ControlKey::Down => ControlKey::Up,
            ControlKey::Left => ControlKey::Right,
            ControlKey::Right => ControlKey::Left,
            ControlKey::LeftArrow => ControlKey::RightArrow,
            ControlKey::RightArrow => ControlKey::LeftArrow,
            ControlKey::UpArrow => ControlKey::DownArrow,
            ControlKey::DownArrow => ControlKey::UpArrow,
            ControlKey::Space => ControlKey::Space,
        }
    }

    pub fn is_movement(self) -> bool {
        matches!(
            self,
            ControlKey::Up | ControlKey::Left | ControlKey::Down | ControlKey::Right
        )
    }

    pub fn is_deke(self) -> bool {
        matches!(self, ControlKey::LeftArrow | ControlKey::RightArrow)
    }

    /// Unit direction for a movement key
    pub fn movement_vector(self) -> Vec2 {
        match self {
            ControlKey::Up => Vec2::Y,
            ControlKey::Down => Vec2::NEG_Y,
            ControlKey::Left => Vec2::NEG_X,
            ControlKey::Right => Vec2::X,
            _ => Vec2::ZERO,
        }
    }
}

/// Held movement keys, newest last
#[derive(Debug, Clone, Default)]
pub struct KeyTracker {
    active: Vec<ControlKey>,
}

impl KeyTracker {
    /// Register a movement key press. Pressing a key while already moving
    /// cancels its opposite.
    pub fn press(&mut self, key: ControlKey) {
        if !key.is_movement() || self.active.contains(&key) {
            return;
        }
        if !self.active.is_empty() {
            self.active.retain(|&k| k != key.opposite());
        }
        self.active.push(key);
    }

    pub fn release(&mut self, key: ControlKey) {
        if let Some(index) = self.active.iter().position(|&k| k == key) {
            self.active.remove(index);
        }
    }

    pub fn active(&self) -> &[ControlKey] {
        &self.active
    }

    pub fn is_moving(&self) -> bool {
        !self.active.is_empty()
    }

    /// Sum of held directions (None when nothing is held)
    pub fn direction(&self) -> Option<Vec2> {
        if self.active.is_empty() {
            return None;
        }
        Some(self.active.iter().map(|k| k.movement_vector()).sum())
    }
}

/// Joystick gesture phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GestureState {
    Began,
    Changed,
    Ended,
}

/// Joystick deflection in pad units, y up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JoystickData {
    pub x: f32,
    pub y: f32,
    /// Radians in [0, 2π)
    pub angle: f32,
    pub magnitude: f32,
}

impl JoystickData {
    pub fn from_delta(dx: f32, dy: f32) -> Self {
        let magnitude = (dx * dx + dy * dy).sqrt();
        let angle = if magnitude == 0.0 {
            0.0
        } else {
            let base = (dx / magnitude).clamp(-1.0, 1.0).acos();
            if dy < 0.0 { 2.0 * PI - base } else { base }
        };
        Self {
            x: dx,
            y: dy,
            angle,
            magnitude,
        }
    }

    pub fn from_polar(angle: f32, magnitude: f32) -> Self {
        Self {
            x: magnitude * angle.cos(),
            y: magnitude * angle.sin(),
            angle,
            magnitude,
        }
    }

    pub fn vector(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// On-screen joystick driven by a pan gesture
#[derive(Debug, Clone, Default)]
pub struct Joystick {
    data: Option<JoystickData>,
    active: bool,
}

impl Joystick {
    /// Feed a pan gesture; `translation` is in screen coordinates (y down)
    pub fn handle(&mut self, state: GestureState, translation: Vec2) -> Option<JoystickData> {
        match state {
            GestureState::Began => {
                self.active = true;
                None
            }
            GestureState::Changed => {
                let center = Vec2::splat(JOYSTICK_SIZE / 2.0);
                let knob = (center + translation).clamp(Vec2::ZERO, Vec2::splat(JOYSTICK_SIZE));
                let data = JoystickData::from_delta(knob.x - center.x, -(knob.y - center.y));
                self.active = true;
                self.data = Some(data);
                Some(data)
            }
            GestureState::Ended => {
                self.active = false;
                self.data = None;
                None
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current deflection, if the stick is off center
    pub fn direction(&self) -> Option<Vec2> {
        self.data
            .filter(|d| d.magnitude > 0.0)
            .map(|d| d.vector())
    }
}

/// Everything the host has collected since the last tick
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub keys: KeyTracker,
    pub joystick: Joystick,
    pending: TickInput,
}

impl InputState {
    pub fn key_down(&mut self, key: ControlKey) {
        self.pending.dismiss = true;
        if key.is_movement() {
            self.keys.press(key);
        } else if key.is_deke() {
            self.pending.deke = Some(if key == ControlKey::LeftArrow {
                DekeCommand::Left
            } else {
                DekeCommand::Right
            });
        } else if key == ControlKey::UpArrow {
            self.pending.shoot = true;
        } else if key == ControlKey::Space {
            self.pending.switch_player = true;
        }
    }

    pub fn key_up(&mut self, key: ControlKey) {
        if key.is_deke() {
            self.pending.deke = Some(DekeCommand::Release);
        } else if key.is_movement() {
            self.keys.release(key);
        }
    }

    /// Raw key code variant (unknown codes are ignored)
    pub fn key_code_down(&mut self, code: u16) {
        if let Some(key) = ControlKey::from_code(code) {
            self.key_down(key);
        }
    }

    pub fn key_code_up(&mut self, code: u16) {
        if let Some(key) = ControlKey::from_code(code) {
            self.key_up(key);
        }
    }

    pub fn joystick(&mut self, state: GestureState, translation: Vec2) {
        if state == GestureState::Began {
            self.pending.dismiss = true;
        }
        self.joystick.handle(state, translation);
    }

    /// On-screen switch/pass button
    pub fn switch_pressed(&mut self) {
        self.pending.dismiss = true;
        self.pending.switch_player = true;
    }

    pub fn shoot_pressed(&mut self) {
        self.pending.dismiss = true;
        self.pending.shoot = true;
    }

    pub fn toggle_pause(&mut self) {
        self.pending.pause = true;
    }

    pub fn set_idle_mode(&mut self, idle: bool) {
        self.pending.idle_mode = idle;
    }

    /// This frame's input, with movement refreshed from the keys and stick.
    /// One-shots stay pending until a tick consumes them (see
    /// [`FixedStep::advance`](crate::sim::FixedStep::advance)).
    pub fn frame_input(&mut self) -> &mut TickInput {
        self.pending.movement = self.joystick.direction().or_else(|| self.keys.direction());
        &mut self.pending
    }
}
