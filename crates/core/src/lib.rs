// Pointer speed synchronization core

pub mod controller;
pub mod store;
pub mod value;

pub use controller::{ControllerState, Severity, SpeedController, SyncStatus};
pub use store::{CommandFailure, GsettingsStore, PreferenceKey, SettingStore, StoreError};
pub use value::{round_to_tenth, PreferenceValue};
