use winit::keyboard::{KeyCode, PhysicalKey};

/// Pointer travel past which a press/release pair counts as a drag rather
/// than a click.
const CLICK_SLOP_PX: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    None,
    Drag { dx: f32, dy: f32 },
    Click { x: f32, y: f32 },
}

#[derive(Default, Debug, Clone, Copy)]
pub struct InputState {
    pub orbit_left: bool,
    pub orbit_right: bool,
    pub orbit_up: bool,
    pub orbit_down: bool,
    cursor: Option<(f32, f32)>,
    left_down: bool,
    press_pos: Option<(f32, f32)>,
    travel: f32,
}

impl InputState {
    pub fn handle_key(&mut self, key: PhysicalKey, pressed: bool) {
        match key {
            PhysicalKey::Code(KeyCode::ArrowLeft) => self.orbit_left = pressed,
            PhysicalKey::Code(KeyCode::ArrowRight) => self.orbit_right = pressed,
            PhysicalKey::Code(KeyCode::ArrowUp) => self.orbit_up = pressed,
            PhysicalKey::Code(KeyCode::ArrowDown) => self.orbit_down = pressed,
            _ => {}
        }
    }

    /// Track the cursor; while the primary button is held, report the drag
    /// delta since the previous position.
    pub fn cursor_moved(&mut self, x: f32, y: f32) -> PointerAction {
        let previous = self.cursor.replace((x, y));
        if self.left_down {
            if let Some((px, py)) = previous {
                let dx = x - px;
                let dy = y - py;
                self.travel += dx.abs() + dy.abs();
                return PointerAction::Drag { dx, dy };
            }
        }
        PointerAction::None
    }

    pub fn cursor_left(&mut self) {
        self.cursor = None;
    }

    /// Primary button transition. A release with little travel since the
    /// press is a click at the release position.
    pub fn handle_left_button(&mut self, pressed: bool) -> PointerAction {
        if pressed {
            self.left_down = true;
            self.press_pos = self.cursor;
            self.travel = 0.0;
            return PointerAction::None;
        }
        if !self.left_down {
            return PointerAction::None;
        }
        self.left_down = false;
        if self.travel <= CLICK_SLOP_PX {
            if let Some((x, y)) = self.cursor.or(self.press_pos) {
                return PointerAction::Click { x, y };
            }
        }
        PointerAction::None
    }

    /// Forget the in-flight press, e.g. when the UI consumed the event.
    pub fn cancel_pointer(&mut self) {
        self.left_down = false;
        self.press_pos = None;
        self.travel = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::{InputState, PointerAction};
    use winit::keyboard::{KeyCode, PhysicalKey};

    #[test]
    fn still_press_release_is_a_click_at_the_cursor() {
        let mut input = InputState::default();
        input.cursor_moved(100.0, 200.0);
        assert_eq!(input.handle_left_button(true), PointerAction::None);
        assert_eq!(
            input.handle_left_button(false),
            PointerAction::Click { x: 100.0, y: 200.0 }
        );
    }

    #[test]
    fn long_drag_suppresses_the_click() {
        let mut input = InputState::default();
        input.cursor_moved(100.0, 100.0);
        input.handle_left_button(true);
        assert_eq!(
            input.cursor_moved(130.0, 100.0),
            PointerAction::Drag { dx: 30.0, dy: 0.0 }
        );
        assert_eq!(input.handle_left_button(false), PointerAction::None);
    }

    #[test]
    fn release_without_press_does_nothing() {
        let mut input = InputState::default();
        input.cursor_moved(10.0, 10.0);
        assert_eq!(input.handle_left_button(false), PointerAction::None);
    }

    #[test]
    fn cancel_discards_the_pending_click() {
        let mut input = InputState::default();
        input.cursor_moved(50.0, 50.0);
        input.handle_left_button(true);
        input.cancel_pointer();
        assert_eq!(input.handle_left_button(false), PointerAction::None);
    }

    #[test]
    fn arrow_keys_toggle_orbit_flags() {
        let mut input = InputState::default();
        input.handle_key(PhysicalKey::Code(KeyCode::ArrowLeft), true);
        input.handle_key(PhysicalKey::Code(KeyCode::ArrowUp), true);
        assert!(input.orbit_left && input.orbit_up);
        input.handle_key(PhysicalKey::Code(KeyCode::ArrowLeft), false);
        assert!(!input.orbit_left);
    }
}
