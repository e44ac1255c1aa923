//! Panelkit Core
//!
//! Element state change tracking and the host/screen synchronization
//! protocol.
//!
//! # Features
//!
//! - [`ElementState`]: the serializable visual state of one element, with a
//!   change flag and per-category diffing into [`UpdateFlags`]
//! - Paint color composition from style, touch, blink phase and
//!   [`ColorScheme`]
//! - [`SyncSession`] and [`ScreenMirror`]: full and incremental updates
//!   between host and screen
//!
//! # Example
//!
//! ```ignore
//! use panelkit_core::{ElementId, ElementState, ScreenMirror, Style, SyncSession};
//!
//! let mut session = SyncSession::new(0);
//! let mut mirror = ScreenMirror::new();
//! let mut state = ElementState::new(bounds, Style::default());
//!
//! state.set_alpha(0.5);
//! let batch = session.collect_cycle([(ElementId(1), &mut state)]);
//! mirror.apply_batch(batch);
//! ```

pub mod codec;
pub mod compose;
pub mod error;
pub mod flags;
pub mod scheme;
pub mod state;
pub mod style;
pub mod sync;

pub use codec::{decode_batch, encode_batch};
pub use compose::{compose_paint_state, PaintColors, PaintState};
pub use error::{Result, SyncError};
pub use flags::UpdateFlags;
pub use scheme::{CategoryColors, ColorScheme, PanelState};
pub use state::{ElementState, StateChange, StateChanges};
pub use style::{Style, StyleCategory, StyleFlags, TouchState};
pub use sync::{BatchOutcome, ElementId, ScreenMirror, StateUpdate, SyncSession, UpdateBatch};
