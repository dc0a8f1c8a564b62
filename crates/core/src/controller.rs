//! Pointer speed controller.
//!
//! Owns the slider's pending value and the status of the last store
//! operation. Store failures never escape: they are folded into
//! [`SyncStatus`] so the panel stays usable.

use log::{debug, info, warn};

use crate::store::{CommandFailure, SettingStore, StoreError};
use crate::value::PreferenceValue;

/// Outcome of the most recent store operation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SyncStatus {
    #[default]
    Idle,
    Loaded(PreferenceValue),
    AppliedOk(PreferenceValue),
    LoadFailed(StoreError),
    ApplyFailed(StoreError),
}

/// How a status should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl SyncStatus {
    /// User-facing status line.
    pub fn message(&self) -> String {
        match self {
            SyncStatus::Idle => String::new(),
            SyncStatus::Loaded(_) => "Loaded current setting".to_string(),
            SyncStatus::AppliedOk(v) => format!("Applied: {}", v),
            SyncStatus::LoadFailed(StoreError::CommandFailed(
                CommandFailure::Exit { .. } | CommandFailure::Io(_),
            )) => "Error: Could not read current setting".to_string(),
            SyncStatus::LoadFailed(
                StoreError::CommandFailed(CommandFailure::NotFound) | StoreError::ParseError(_),
            ) => "Error: gsettings not found or invalid value".to_string(),
            SyncStatus::ApplyFailed(err) if err.is_not_found() => {
                "Error: gsettings command not found".to_string()
            }
            SyncStatus::ApplyFailed(_) => "Error: Failed to apply setting".to_string(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            SyncStatus::Idle | SyncStatus::Loaded(_) => Severity::Info,
            SyncStatus::AppliedOk(_) => Severity::Success,
            SyncStatus::LoadFailed(_) | SyncStatus::ApplyFailed(_) => Severity::Error,
        }
    }

    pub fn error(&self) -> Option<&StoreError> {
        match self {
            SyncStatus::LoadFailed(err) | SyncStatus::ApplyFailed(err) => Some(err),
            _ => None,
        }
    }

    /// Stable machine-readable name, used in JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Idle => "idle",
            SyncStatus::Loaded(_) => "loaded",
            SyncStatus::AppliedOk(_) => "applied",
            SyncStatus::LoadFailed(_) => "load_failed",
            SyncStatus::ApplyFailed(_) => "apply_failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Ready,
    /// The pending value was edited since the last load or apply attempt.
    Editing,
}

pub struct SpeedController<S> {
    store: S,
    pending: PreferenceValue,
    /// Last value known to be in the store (loaded or applied).
    stored: Option<PreferenceValue>,
    status: SyncStatus,
    state: ControllerState,
}

impl<S: SettingStore> SpeedController<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            pending: PreferenceValue::DEFAULT,
            stored: None,
            status: SyncStatus::Idle,
            state: ControllerState::Uninitialized,
        }
    }

    /// Load the current value from the store.
    ///
    /// On failure the pending value stays at the default and the controller
    /// is still usable.
    pub fn initialize(&mut self) {
        match self.store.read() {
            Ok(value) => {
                info!("loaded {} = {}", self.store.describe(), value);
                self.pending = value;
                self.stored = Some(value);
                self.status = SyncStatus::Loaded(value);
            }
            Err(err) => {
                warn!("could not load {}: {}", self.store.describe(), err);
                self.pending = PreferenceValue::DEFAULT;
                self.stored = None;
                self.status = SyncStatus::LoadFailed(err);
            }
        }
        self.state = ControllerState::Ready;
    }

    /// Set the pending value, clamped and rounded. Never touches the store.
    pub fn edit(&mut self, raw: f32) {
        let Some(value) = PreferenceValue::clamped(raw) else {
            debug!("ignoring non-numeric edit");
            return;
        };
        self.pending = value;
        self.state = ControllerState::Editing;
    }

    /// Move the pending value by `steps` slider notches.
    pub fn nudge(&mut self, steps: i32) {
        let base = self.pending.get().clamp(PreferenceValue::MIN, PreferenceValue::MAX);
        self.edit(base + steps as f32 * PreferenceValue::STEP);
    }

    /// Write the pending value to the store.
    pub fn apply(&mut self) {
        let value = self.pending;
        match self.store.write(value) {
            Ok(()) => {
                info!("applied {} = {}", self.store.describe(), value);
                self.stored = Some(value);
                self.status = SyncStatus::AppliedOk(value);
            }
            Err(err) => {
                warn!("could not apply {} = {}: {}", self.store.describe(), value, err);
                self.status = SyncStatus::ApplyFailed(err);
            }
        }
        self.state = ControllerState::Ready;
    }

    /// Set the pending value to the default and apply it, even if it is
    /// already the default.
    pub fn reset(&mut self) {
        self.pending = PreferenceValue::DEFAULT;
        self.apply();
    }

    pub fn pending(&self) -> PreferenceValue {
        self.pending
    }

    pub fn status(&self) -> &SyncStatus {
        &self.status
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// True when the pending value differs from what the store last held.
    pub fn is_dirty(&self) -> bool {
        self.stored != Some(self.pending)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::parse_value;

    /// In-memory store that records writes and can be told to fail.
    #[derive(Default)]
    struct FakeStore {
        /// Raw getter output, as the external program would print it.
        output: String,
        read_error: Option<StoreError>,
        /// Successful reads allowed before `read_error` kicks in.
        reads_before_error: usize,
        write_error: Option<StoreError>,
        writes: Vec<PreferenceValue>,
    }

    impl FakeStore {
        fn with_output(output: &str) -> Self {
            Self { output: output.to_string(), ..Default::default() }
        }

        fn exit_failure() -> StoreError {
            StoreError::CommandFailed(CommandFailure::Exit { code: Some(1), stderr: String::new() })
        }
    }

    impl SettingStore for FakeStore {
        fn read(&mut self) -> Result<PreferenceValue, StoreError> {
            if self.reads_before_error > 0 {
                self.reads_before_error -= 1;
            } else if let Some(err) = &self.read_error {
                return Err(err.clone());
            }
            parse_value(&self.output)
        }

        fn write(&mut self, value: PreferenceValue) -> Result<(), StoreError> {
            self.writes.push(value);
            if let Some(err) = &self.write_error {
                return Err(err.clone());
            }
            self.output = value.to_string();
            Ok(())
        }

        fn describe(&self) -> String {
            "fake speed".to_string()
        }
    }

    fn ready(output: &str) -> SpeedController<FakeStore> {
        let mut c = SpeedController::new(FakeStore::with_output(output));
        c.initialize();
        c
    }

    fn v(raw: f32) -> PreferenceValue {
        PreferenceValue::from_store(raw)
    }

    #[test]
    fn starts_uninitialized() {
        let c = SpeedController::new(FakeStore::default());
        assert_eq!(c.state(), ControllerState::Uninitialized);
        assert_eq!(c.status(), &SyncStatus::Idle);
        assert_eq!(c.pending(), PreferenceValue::DEFAULT);
        assert_eq!(c.status().message(), "");
    }

    #[test]
    fn initialize_loads_store_value() {
        let c = ready("0.3");
        assert_eq!(c.pending(), v(0.3));
        assert_eq!(c.status(), &SyncStatus::Loaded(v(0.3)));
        assert_eq!(c.state(), ControllerState::Ready);
        assert_eq!(c.status().message(), "Loaded current setting");
        assert!(!c.is_dirty());
        assert!(c.store().writes.is_empty());
    }

    #[test]
    fn initialize_with_failing_getter_falls_back_to_default() {
        let mut store = FakeStore::with_output("0.7");
        store.read_error = Some(FakeStore::exit_failure());
        let mut c = SpeedController::new(store);
        c.initialize();
        assert_eq!(c.pending(), PreferenceValue::DEFAULT);
        assert!(matches!(c.status(), SyncStatus::LoadFailed(_)));
        assert_eq!(c.state(), ControllerState::Ready);
        assert_eq!(c.status().message(), "Error: Could not read current setting");
        assert_eq!(c.status().severity(), Severity::Error);
    }

    #[test]
    fn failed_reload_forgets_stored_value() {
        let mut store = FakeStore::with_output("0.0");
        store.read_error = Some(FakeStore::exit_failure());
        store.reads_before_error = 1;
        let mut c = SpeedController::new(store);
        c.initialize();
        assert!(!c.is_dirty());

        c.initialize();
        assert!(matches!(c.status(), SyncStatus::LoadFailed(_)));
        assert_eq!(c.pending(), PreferenceValue::DEFAULT);
        assert!(c.is_dirty());
    }

    #[test]
    fn initialize_with_missing_program_or_bad_output() {
        let mut store = FakeStore::default();
        store.read_error = Some(StoreError::CommandFailed(CommandFailure::NotFound));
        let mut c = SpeedController::new(store);
        c.initialize();
        assert_eq!(c.status().message(), "Error: gsettings not found or invalid value");

        let c = ready("'fast'");
        assert_eq!(c.status(), &SyncStatus::LoadFailed(StoreError::ParseError("'fast'".into())));
        assert_eq!(c.status().message(), "Error: gsettings not found or invalid value");
        assert_eq!(c.pending(), PreferenceValue::DEFAULT);
    }

    #[test]
    fn out_of_range_load_is_kept_until_edited() {
        let mut c = ready("1.5");
        assert_eq!(c.pending(), v(1.5));
        assert_eq!(c.pending().to_string(), "1.5");
        c.nudge(-1);
        assert_eq!(c.pending(), v(0.9));
    }

    #[test]
    fn edit_rounds_and_enters_editing() {
        let mut c = ready("0.0");
        c.edit(0.37);
        assert_eq!(c.pending(), v(0.4));
        assert_eq!(c.state(), ControllerState::Editing);
        assert!(c.is_dirty());
        c.edit(0.41);
        assert_eq!(c.state(), ControllerState::Editing);
        assert!(c.store().writes.is_empty());
    }

    #[test]
    fn edit_identity_on_grid() {
        let mut c = ready("0.0");
        for i in -10..=10 {
            let x = i as f32 / 10.0;
            c.edit(x);
            assert_eq!(c.pending().get(), x);
        }
    }

    #[test]
    fn edit_clamps_outside_domain() {
        let mut c = ready("0.0");
        c.edit(2.5);
        assert_eq!(c.pending(), v(1.0));
        c.edit(-1.05);
        assert_eq!(c.pending(), v(-1.0));
    }

    #[test]
    fn edit_ignores_nan() {
        let mut c = ready("0.2");
        c.edit(f32::NAN);
        assert_eq!(c.pending(), v(0.2));
        assert_eq!(c.state(), ControllerState::Ready);
    }

    #[test]
    fn nudge_steps_and_stops_at_bounds() {
        let mut c = ready("0.9");
        c.nudge(1);
        assert_eq!(c.pending(), v(1.0));
        c.nudge(1);
        assert_eq!(c.pending(), v(1.0));
        c.nudge(-3);
        assert_eq!(c.pending(), v(0.7));
    }

    #[test]
    fn apply_round_trips_through_store() {
        let mut c = ready("0.0");
        c.edit(-0.6);
        c.apply();
        assert_eq!(c.status(), &SyncStatus::AppliedOk(v(-0.6)));
        assert_eq!(c.status().message(), "Applied: -0.6");
        assert_eq!(c.status().severity(), Severity::Success);
        assert_eq!(c.state(), ControllerState::Ready);
        assert!(!c.is_dirty());

        let mut store = c.into_store();
        assert_eq!(store.read().unwrap(), v(-0.6));
    }

    #[test]
    fn failed_apply_keeps_pending() {
        let mut store = FakeStore::with_output("0.1");
        store.write_error = Some(FakeStore::exit_failure());
        let mut c = SpeedController::new(store);
        c.initialize();
        c.edit(0.5);
        c.apply();
        assert!(matches!(c.status(), SyncStatus::ApplyFailed(_)));
        assert_eq!(c.status().message(), "Error: Failed to apply setting");
        assert_eq!(c.pending(), v(0.5));
        assert_eq!(c.state(), ControllerState::Ready);
        assert!(c.is_dirty());
    }

    #[test]
    fn apply_with_missing_program() {
        let mut store = FakeStore::with_output("0.1");
        store.write_error = Some(StoreError::CommandFailed(CommandFailure::NotFound));
        let mut c = SpeedController::new(store);
        c.initialize();
        c.apply();
        assert_eq!(c.status().message(), "Error: gsettings command not found");
    }

    #[test]
    fn reset_writes_default_once() {
        let mut c = ready("0.8");
        c.reset();
        assert_eq!(c.pending(), PreferenceValue::DEFAULT);
        assert_eq!(c.store().writes, vec![PreferenceValue::DEFAULT]);
        assert_eq!(c.status().message(), "Applied: 0.0");
    }

    #[test]
    fn reset_reapplies_when_already_default() {
        let mut c = ready("0.0");
        c.reset();
        c.reset();
        assert_eq!(c.store().writes.len(), 2);
    }

    #[test]
    fn failed_reset_leaves_store_untouched() {
        let mut store = FakeStore::with_output("0.6");
        store.write_error = Some(FakeStore::exit_failure());
        let mut c = SpeedController::new(store);
        c.initialize();
        c.reset();
        assert!(matches!(c.status(), SyncStatus::ApplyFailed(_)));
        assert_eq!(c.pending(), PreferenceValue::DEFAULT);
        let mut store = c.into_store();
        assert_eq!(store.read().unwrap(), v(0.6));
    }

    #[test]
    fn status_is_overwritten_not_accumulated() {
        let mut store = FakeStore::with_output("0.1");
        store.write_error = Some(FakeStore::exit_failure());
        let mut c = SpeedController::new(store);
        c.initialize();
        c.apply();
        assert_eq!(c.status().as_str(), "apply_failed");
        c.initialize();
        assert_eq!(c.status().as_str(), "loaded");
        assert!(c.status().error().is_none());
    }
}
