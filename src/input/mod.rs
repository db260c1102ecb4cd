pub mod events;
pub mod handler;

// Re-export the essential types
pub use events::{
    BoxSelect, EventCallback, EventKind, EventManager, InputEvent, KeyModifiers, MapEvent,
    MouseButton, PointSelect,
};
pub use handler::{Action, InputHandler};
