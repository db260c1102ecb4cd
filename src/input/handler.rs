use crate::{
    core::{bounds::Bounds, geo::Point, map::ZoomDirection},
    input::events::{InputEvent, KeyModifiers, MouseButton},
};

/// What the map should do in response to input
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Pointer dragged by `delta` view pixels; the map follows the pointer
    Pan { delta: Point },
    /// Zoom one level about `anchor`, or about the view centre when `None`
    Zoom {
        direction: ZoomDirection,
        anchor: Option<Point>,
    },
    PointSelect {
        position: Point,
        button: MouseButton,
        modifiers: KeyModifiers,
    },
    BoxSelect {
        start: Point,
        end: Point,
        button: MouseButton,
        modifiers: KeyModifiers,
    },
    /// Rubber-band box moved
    SelectionBox { start: Point, end: Point },
    PointerMoved { position: Point },
    PointerLeft,
    Resize { width: u32, height: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    /// Left button held without shift
    Dragging { last: Point, moved: bool },
    /// Shift held at press: dragging out a selection box
    BoxSelecting {
        start: Point,
        current: Point,
        button: MouseButton,
    },
    /// Right button held without shift
    Pressed { button: MouseButton },
}

/// Pointer state machine turning raw input into map actions.
///
/// A left drag pans, a shift drag selects a box, a press and release without
/// movement selects a point. Double clicks zoom in (shift: out) about the
/// pointer and the release that follows them is swallowed.
pub struct InputHandler {
    pub enabled: bool,
    pub zoom_on_wheel: bool,
    pub zoom_on_double_click: bool,
    pub pan_on_drag: bool,
    gesture: Gesture,
    ignore_left_up: bool,
    ignore_right_up: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            enabled: true,
            zoom_on_wheel: true,
            zoom_on_double_click: true,
            pan_on_drag: true,
            gesture: Gesture::Idle,
            ignore_left_up: false,
            ignore_right_up: false,
        }
    }

    /// Handle one input event and generate actions
    pub fn handle_event(&mut self, event: InputEvent) -> Vec<Action> {
        if !self.enabled {
            return vec![];
        }

        let mut actions = vec![];

        match event {
            InputEvent::PointerDown {
                position,
                button,
                modifiers,
            } => {
                self.gesture = match button {
                    MouseButton::Left | MouseButton::Right if modifiers.shift => {
                        Gesture::BoxSelecting {
                            start: position,
                            current: position,
                            button,
                        }
                    }
                    MouseButton::Left => Gesture::Dragging {
                        last: position,
                        moved: false,
                    },
                    MouseButton::Right => Gesture::Pressed { button },
                    _ => Gesture::Idle,
                };
            }
            InputEvent::PointerMove { position } => {
                match &mut self.gesture {
                    Gesture::Dragging { last, moved } => {
                        let delta = position.subtract(last);
                        if delta.x != 0.0 || delta.y != 0.0 {
                            *moved = true;
                            *last = position;
                            if self.pan_on_drag {
                                actions.push(Action::Pan { delta });
                            }
                        }
                    }
                    Gesture::BoxSelecting { start, current, .. } => {
                        *current = position;
                        actions.push(Action::SelectionBox {
                            start: *start,
                            end: position,
                        });
                    }
                    Gesture::Pressed { .. } | Gesture::Idle => {}
                }
                actions.push(Action::PointerMoved { position });
            }
            InputEvent::PointerUp {
                position,
                button,
                modifiers,
            } => {
                if self.take_ignore(button) {
                    self.gesture = Gesture::Idle;
                    return actions;
                }

                match std::mem::replace(&mut self.gesture, Gesture::Idle) {
                    Gesture::Dragging { moved: false, .. } if button == MouseButton::Left => {
                        actions.push(Action::PointSelect {
                            position,
                            button,
                            modifiers,
                        });
                    }
                    Gesture::BoxSelecting {
                        start,
                        button: pressed,
                        ..
                    } if pressed == button => {
                        actions.push(Action::BoxSelect {
                            start,
                            end: position,
                            button,
                            modifiers,
                        });
                    }
                    Gesture::Pressed { button: pressed } if pressed == button => {
                        actions.push(Action::PointSelect {
                            position,
                            button,
                            modifiers,
                        });
                    }
                    _ => {}
                }
            }
            InputEvent::DoubleClick {
                position,
                button,
                modifiers,
            } => {
                self.gesture = Gesture::Idle;
                match button {
                    MouseButton::Left => {
                        self.ignore_left_up = true;
                        if self.zoom_on_double_click {
                            let direction = if modifiers.shift {
                                ZoomDirection::Out
                            } else {
                                ZoomDirection::In
                            };
                            actions.push(Action::Zoom {
                                direction,
                                anchor: Some(position),
                            });
                        }
                    }
                    MouseButton::Right => self.ignore_right_up = true,
                    _ => {}
                }
            }
            InputEvent::Scroll { delta, .. } => {
                if self.zoom_on_wheel && delta != 0.0 {
                    let direction = if delta > 0.0 {
                        ZoomDirection::In
                    } else {
                        ZoomDirection::Out
                    };
                    actions.push(Action::Zoom {
                        direction,
                        anchor: None,
                    });
                }
            }
            InputEvent::PointerLeave => actions.push(Action::PointerLeft),
            InputEvent::Resize { width, height } => actions.push(Action::Resize { width, height }),
        }

        actions
    }

    fn take_ignore(&mut self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => std::mem::take(&mut self.ignore_left_up),
            MouseButton::Right => std::mem::take(&mut self.ignore_right_up),
            _ => false,
        }
    }

    /// Rubber-band box being dragged out, in view pixels
    pub fn selection_box(&self) -> Option<Bounds> {
        match self.gesture {
            Gesture::BoxSelecting { start, current, .. } => Some(Bounds::from_corners(start, current)),
            _ => None,
        }
    }

    /// Forget any gesture in progress
    pub fn cancel(&mut self) {
        self.gesture = Gesture::Idle;
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
