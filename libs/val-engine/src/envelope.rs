//! Per-vessel aggregation of independently published sub-records.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use val_api::record::{Assignments, RecordKind, TypedRecord, VesselEnvelope};

/// Settable field of a [`VesselEnvelope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeField {
    MeasurementPropertiesMessages,
    MeasurementValues,
    AisVesselMessage,
    VesselStaticsMessage,
    LocationMessage,
    Alerts,
    ExerciseState,
    Assignments,
    AutopilotSettings,
    /// A complete envelope; every field it carries is applied.
    Envelope,
}

impl EnvelopeField {
    pub fn as_str(self) -> &'static str {
        match self {
            EnvelopeField::MeasurementPropertiesMessages => "measurement_properties_messages",
            EnvelopeField::MeasurementValues => "measurement_values",
            EnvelopeField::AisVesselMessage => "ais_vessel_message",
            EnvelopeField::VesselStaticsMessage => "vessel_statics_message",
            EnvelopeField::LocationMessage => "location_message",
            EnvelopeField::Alerts => "alerts",
            EnvelopeField::ExerciseState => "exercise_state",
            EnvelopeField::Assignments => "assignments",
            EnvelopeField::AutopilotSettings => "autopilot_settings",
            EnvelopeField::Envelope => "envelope",
        }
    }

    /// Field a record kind lands in when the binding does not name one.
    pub fn for_kind(kind: RecordKind) -> Option<Self> {
        let field = match kind {
            RecordKind::MeasurementProperties => EnvelopeField::MeasurementPropertiesMessages,
            RecordKind::MeasurementValue => EnvelopeField::MeasurementValues,
            RecordKind::AisVessel => EnvelopeField::AisVesselMessage,
            RecordKind::VesselStatics => EnvelopeField::VesselStaticsMessage,
            RecordKind::Location => EnvelopeField::LocationMessage,
            RecordKind::Alert | RecordKind::Alerts => EnvelopeField::Alerts,
            RecordKind::ExerciseState => EnvelopeField::ExerciseState,
            RecordKind::Assignment | RecordKind::Assignments => EnvelopeField::Assignments,
            RecordKind::AutopilotSettings => EnvelopeField::AutopilotSettings,
            RecordKind::VesselEnvelope => EnvelopeField::Envelope,
            RecordKind::Vessel | RecordKind::Vessels => return None,
        };
        Some(field)
    }

    /// Whether a record of `kind` can be written into this field.
    pub fn accepts(self, kind: RecordKind) -> bool {
        match Self::for_kind(kind) {
            Some(field) => field == self,
            None => false,
        }
    }
}

impl FromStr for EnvelopeField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: [EnvelopeField; 10] = [
            EnvelopeField::MeasurementPropertiesMessages,
            EnvelopeField::MeasurementValues,
            EnvelopeField::AisVesselMessage,
            EnvelopeField::VesselStaticsMessage,
            EnvelopeField::LocationMessage,
            EnvelopeField::Alerts,
            EnvelopeField::ExerciseState,
            EnvelopeField::Assignments,
            EnvelopeField::AutopilotSettings,
            EnvelopeField::Envelope,
        ];
        ALL.into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown envelope field '{s}'"))
    }
}

// ═══════════════════════════════════════════════════════════════
//  EnvelopeComposer
// ═══════════════════════════════════════════════════════════════

/// Table of per-vessel envelopes.
///
/// The map lock is held only to look up or insert an entry; each envelope
/// has its own mutex, so updates to different vessels never contend.
#[derive(Debug, Default)]
pub struct EnvelopeComposer {
    envelopes: RwLock<HashMap<u32, Arc<Mutex<VesselEnvelope>>>>,
}

impl EnvelopeComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `record` to field `field_name` of the envelope for `entity_id`.
    ///
    /// Returns a snapshot of the updated envelope, or `None` when the update
    /// was dropped (unknown field, record kind that does not fit the field,
    /// or a record with no vessel identifier).
    pub fn compose(
        &self,
        entity_id: u32,
        field_name: &str,
        record: &TypedRecord,
    ) -> Option<VesselEnvelope> {
        self.compose_with(entity_id, field_name, record, VesselEnvelope::clone)
    }

    /// Like [`compose`](Self::compose), but hands the updated envelope to
    /// `on_update` while the entity is still locked. Calls for one vessel
    /// observe its updates in the order they were applied.
    pub fn compose_with<R>(
        &self,
        entity_id: u32,
        field_name: &str,
        record: &TypedRecord,
        on_update: impl FnOnce(&VesselEnvelope) -> R,
    ) -> Option<R> {
        if entity_id == 0 {
            tracing::debug!(field = field_name, kind = ?record.kind(), "record has no mmsi, not composed");
            return None;
        }

        let field = match field_name.parse::<EnvelopeField>() {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(mmsi = entity_id, error = %e, "dropping envelope update");
                return None;
            }
        };

        if !field.accepts(record.kind()) {
            tracing::warn!(
                mmsi = entity_id,
                field = field.as_str(),
                kind = ?record.kind(),
                "record kind does not fit envelope field, dropping"
            );
            return None;
        }

        let entry = self.entry(entity_id);
        let mut envelope = lock_entity(&entry, entity_id);
        apply(&mut envelope, field, record);
        Some(on_update(&*envelope))
    }

    pub fn snapshot(&self, entity_id: u32) -> Option<VesselEnvelope> {
        let entry = self.read_map().get(&entity_id).cloned()?;
        let envelope = lock_entity(&entry, entity_id);
        Some(envelope.clone())
    }

    pub fn len(&self) -> usize {
        self.read_map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entity_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.read_map().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn entry(&self, entity_id: u32) -> Arc<Mutex<VesselEnvelope>> {
        if let Some(entry) = self.read_map().get(&entity_id) {
            return Arc::clone(entry);
        }
        let mut guard = match self.envelopes.write() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("envelope table write lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        Arc::clone(guard.entry(entity_id).or_insert_with(|| {
            tracing::debug!(mmsi = entity_id, "new vessel envelope");
            Arc::new(Mutex::new(VesselEnvelope {
                mmsi: entity_id,
                ..Default::default()
            }))
        }))
    }

    fn read_map(&self) -> std::sync::RwLockReadGuard<'_, HashMap<u32, Arc<Mutex<VesselEnvelope>>>> {
        match self.envelopes.read() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("envelope table read lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

fn lock_entity(entry: &Mutex<VesselEnvelope>, entity_id: u32) -> MutexGuard<'_, VesselEnvelope> {
    match entry.lock() {
        Ok(g) => g,
        Err(poisoned) => {
            tracing::warn!(mmsi = entity_id, "envelope lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

/// Write `record` into `field`. Callers check [`EnvelopeField::accepts`] first.
fn apply(env: &mut VesselEnvelope, field: EnvelopeField, record: &TypedRecord) {
    match (field, record) {
        (EnvelopeField::MeasurementPropertiesMessages, TypedRecord::MeasurementProperties(m)) => {
            let name = m.measurement_properties.as_ref().map(|p| p.name.as_str());
            upsert(&mut env.measurement_properties_messages, m.clone(), |old| {
                old.measurement_properties.as_ref().map(|p| p.name.as_str()) == name
            });
        }
        (EnvelopeField::MeasurementValues, TypedRecord::MeasurementValue(m)) => {
            let name = m.measurement.as_ref().map(|v| v.name.as_str());
            upsert(&mut env.measurement_values, m.clone(), |old| {
                old.measurement.as_ref().map(|v| v.name.as_str()) == name
            });
        }
        (EnvelopeField::AisVesselMessage, TypedRecord::AisVessel(m)) => {
            env.ais_vessel_message = Some(m.clone());
        }
        (EnvelopeField::VesselStaticsMessage, TypedRecord::VesselStatics(m)) => {
            env.vessel_statics_message = Some(m.clone());
        }
        (EnvelopeField::LocationMessage, TypedRecord::Location(m)) => {
            env.location_message = Some(m.clone());
        }
        (EnvelopeField::Alerts, TypedRecord::Alerts(m)) => {
            for alert in &m.alerts {
                upsert(&mut env.alerts, alert.clone(), |old| old.id == alert.id);
            }
        }
        (EnvelopeField::Alerts, TypedRecord::Alert(a)) => {
            upsert(&mut env.alerts, a.clone(), |old| old.id == a.id);
        }
        (EnvelopeField::ExerciseState, TypedRecord::ExerciseState(m)) => {
            env.exercise_state = Some(m.clone());
        }
        (EnvelopeField::Assignments, TypedRecord::Assignments(m)) => {
            env.assignments = Some(m.clone());
        }
        (EnvelopeField::Assignments, TypedRecord::Assignment(a)) => {
            let list = env.assignments.get_or_insert_with(Assignments::default);
            upsert(&mut list.assignments, a.clone(), |old| old.id == a.id);
        }
        (EnvelopeField::AutopilotSettings, TypedRecord::AutopilotSettings(m)) => {
            upsert(&mut env.autopilot_settings, m.clone(), |old| old.mmsi == m.mmsi);
        }
        (EnvelopeField::Envelope, TypedRecord::VesselEnvelope(m)) => merge_envelope(env, m),
        _ => {}
    }
}

/// Later envelope wins for every field it carries.
fn merge_envelope(env: &mut VesselEnvelope, update: &VesselEnvelope) {
    if update.publish_stamp.is_some() {
        env.publish_stamp = update.publish_stamp;
    }
    if !update.measurement_properties_messages.is_empty() {
        env.measurement_properties_messages = update.measurement_properties_messages.clone();
    }
    if !update.measurement_values.is_empty() {
        env.measurement_values = update.measurement_values.clone();
    }
    if update.ais_vessel_message.is_some() {
        env.ais_vessel_message = update.ais_vessel_message.clone();
    }
    if update.vessel_statics_message.is_some() {
        env.vessel_statics_message = update.vessel_statics_message.clone();
    }
    if update.location_message.is_some() {
        env.location_message = update.location_message.clone();
    }
    if !update.alerts.is_empty() {
        env.alerts = update.alerts.clone();
    }
    if update.exercise_state.is_some() {
        env.exercise_state = update.exercise_state.clone();
    }
    if update.assignments.is_some() {
        env.assignments = update.assignments.clone();
    }
    if !update.autopilot_settings.is_empty() {
        env.autopilot_settings = update.autopilot_settings.clone();
    }
}

fn upsert<T>(list: &mut Vec<T>, item: T, same: impl Fn(&T) -> bool) {
    match list.iter_mut().find(|old| same(old)) {
        Some(slot) => *slot = item,
        None => list.push(item),
    }
}
