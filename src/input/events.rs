use crate::{
    core::{
        constants::MAX_QUEUED_EVENTS,
        geo::{LatLng, Point},
    },
    layers::{base::LayerId, hit_test::Selection, manager::LayerRegistry},
    prelude::{HashMap, VecDeque},
};
use serde::{Deserialize, Serialize};

/// Raw pointer input forwarded by the host toolkit, in view pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerDown {
        position: Point,
        button: MouseButton,
        modifiers: KeyModifiers,
    },
    PointerMove {
        position: Point,
    },
    PointerUp {
        position: Point,
        button: MouseButton,
        modifiers: KeyModifiers,
    },
    DoubleClick {
        position: Point,
        button: MouseButton,
        modifiers: KeyModifiers,
    },
    /// Scroll wheel; positive `delta` zooms in
    Scroll {
        delta: f64,
        position: Point,
    },
    /// Pointer left the view
    PointerLeave,
    /// Viewport/window resize
    Resize {
        width: u32,
        height: u32,
    },
}

/// Keyboard modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyModifiers {
    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }
}

/// Mouse button types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// A click resolved against one layer
#[derive(Debug, Clone, PartialEq)]
pub struct PointSelect {
    pub layer_id: LayerId,
    /// `None` when nothing in the layer was close enough
    pub selection: Option<Selection>,
    pub map_position: LatLng,
    pub view_position: Point,
}

/// A drag box resolved against one layer
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSelect {
    pub layer_id: LayerId,
    pub selections: Vec<Selection>,
}

/// Events emitted by the map
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    PointSelect(PointSelect),
    BoxSelect(BoxSelect),
    RightPointSelect(PointSelect),
    RightBoxSelect(BoxSelect),
    /// The map switched to a new level
    LevelChange { level: u8 },
    /// Pointer moved; `None` when it is off the map or out of the view
    PositionChange { position: Option<LatLng> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointSelect,
    BoxSelect,
    RightPointSelect,
    RightBoxSelect,
    LevelChange,
    PositionChange,
}

impl MapEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            MapEvent::PointSelect(_) => EventKind::PointSelect,
            MapEvent::BoxSelect(_) => EventKind::BoxSelect,
            MapEvent::RightPointSelect(_) => EventKind::RightPointSelect,
            MapEvent::RightBoxSelect(_) => EventKind::RightBoxSelect,
            MapEvent::LevelChange { .. } => EventKind::LevelChange,
            MapEvent::PositionChange { .. } => EventKind::PositionChange,
        }
    }
}

/// Synchronous listener. It may add, delete or reorder layers.
pub type EventCallback = Box<dyn FnMut(&MapEvent, &mut LayerRegistry)>;

/// Queues emitted events and runs listeners as they are emitted
#[derive(Default)]
pub struct EventManager {
    /// Event listeners by event kind
    listeners: HashMap<EventKind, Vec<EventCallback>>,
    /// Emitted events waiting for the host
    event_queue: VecDeque<MapEvent>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event listener
    pub fn on<F>(&mut self, kind: EventKind, callback: F)
    where
        F: FnMut(&MapEvent, &mut LayerRegistry) + 'static,
    {
        self.listeners.entry(kind).or_default().push(Box::new(callback));
    }

    /// Queues `event` and runs its listeners now.
    ///
    /// Returns true if any listener ran. The queue keeps the newest
    /// [`MAX_QUEUED_EVENTS`] events.
    pub fn emit(&mut self, event: MapEvent, registry: &mut LayerRegistry) -> bool {
        let kind = event.kind();
        let mut heard = false;
        if let Some(callbacks) = self.listeners.get_mut(&kind) {
            for callback in callbacks.iter_mut() {
                callback(&event, registry);
                heard = true;
            }
        }

        if self.event_queue.len() >= MAX_QUEUED_EVENTS {
            self.event_queue.pop_front();
        }
        self.event_queue.push_back(event);
        heard
    }

    /// Drains the queue, oldest first
    pub fn take_events(&mut self) -> Vec<MapEvent> {
        self.event_queue.drain(..).collect()
    }

    /// Get number of pending events
    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }
}
