//! The progress board.
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | `resolver`   | `TitleResolver`: polymorphic title/number/domain lookup    |
//! | `wip`        | `WipLimits` and the drop evaluator                         |
//! | `wheels`     | life domain to wheel index                                 |
//! | `filters`    | view mode, type, domain, wheel and context filters         |
//! | `view`       | column grouping and the rendered `BoardView`               |
//! | `cache`      | keyed query cache with invalidation                        |
//! | `events`     | `BoardEvent` broadcast channel                             |
//! | `controller` | `BoardController`: loading, drag and drop, notes, delete   |

pub mod cache;
pub mod controller;
pub mod events;
pub mod filters;
pub mod resolver;
pub mod view;
pub mod wheels;
pub mod wip;

pub use controller::{
    BoardController, BoardSession, BoardSource, DeleteConfirmation, DragState, DropOutcome,
    DropTarget, NoOpReason,
};
pub use events::BoardEvent;
pub use filters::{BoardFilters, GoalsOkrContext, ViewMode};
pub use resolver::{ResolvedTitles, TitleResolver};
pub use view::{BoardView, CardView, ColumnView};
pub use wheels::WheelIndex;
pub use wip::{WipDecision, WipDenial, WipLimits};
