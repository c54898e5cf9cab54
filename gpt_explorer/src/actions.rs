//! Control actions raised by the control panel and consumed by the owning subsystems.
//!
//! Every consuming plugin registers the event itself; `add_event` is idempotent.

use bevy::prelude::*;

use crate::camera::ViewPreset;
use crate::scene::Category;

#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub enum ControlAction {
    SetCategoryVisible(Category, bool),
    Play,
    Pause,
    Reset,
    SetSpeed(f32),
    ViewPreset(ViewPreset),
    ToggleEducationMode,
    ToggleControlPanel,
    ToggleInfoPanel,
}
