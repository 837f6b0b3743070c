//! Typed records of the `val` standard schema.
//!
//! Every record is a protobuf message (binary wire form for the publish sink)
//! that also derives serde, so the extractor can populate it from a generic
//! JSON tree by field name. Enumerations are stored as `i32` on the wire, the
//! way prost represents them; each enum module exports the [`SymbolTable`]
//! used to resolve its string form.
//!
//! [`SymbolTable`]: crate::symbol::SymbolTable

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::symbol::SymbolTable;

#[derive(Clone, Copy, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Timestamp {
    #[prost(int32, tag = "1")]
    pub sec: i32,
    #[prost(uint32, tag = "2")]
    pub nanosec: u32,
}

// ---------------------------------------------------------------------------
// Exercise
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseState {
    #[prost(message, optional, tag = "1")]
    pub publish_stamp: Option<Timestamp>,
    #[prost(enumeration = "exercise_state::State", tag = "2")]
    pub state: i32,
}

pub mod exercise_state {
    use super::SymbolTable;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum State {
        Unknown = 0,
        Initializing = 1,
        Running = 2,
        Paused = 3,
        Stopped = 4,
    }

    pub const STATE: SymbolTable = crate::symbol_table!("ExerciseState.State", State, fallback = Unknown, [
        "UNKNOWN" => Unknown,
        "INITIALIZING" => Initializing,
        "RUNNING" => Running,
        "PAUSED" => Paused,
        "STOPPED" => Stopped,
    ]);
}

// ---------------------------------------------------------------------------
// Measurements
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementProperties {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub unit: String,
    #[prost(string, tag = "3")]
    pub description: String,
    #[prost(double, tag = "4")]
    pub min_value: f64,
    #[prost(double, tag = "5")]
    pub max_value: f64,
    #[prost(string, tag = "6")]
    pub source: String,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementPropertiesMessage {
    #[prost(uint32, tag = "1")]
    pub mmsi: u32,
    #[prost(message, optional, tag = "2")]
    pub publish_stamp: Option<Timestamp>,
    #[prost(message, optional, tag = "3")]
    pub measurement_properties: Option<MeasurementProperties>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Measurement {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(double, tag = "2")]
    pub value: f64,
    #[prost(string, tag = "3")]
    pub unit: String,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementValue {
    #[prost(uint32, tag = "1")]
    pub mmsi: u32,
    #[prost(message, optional, tag = "2")]
    pub publish_stamp: Option<Timestamp>,
    #[prost(message, optional, tag = "3")]
    pub measurement: Option<Measurement>,
}

// ---------------------------------------------------------------------------
// Vessels
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct AisVessel {
    #[prost(uint32, tag = "1")]
    pub mmsi: u32,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub call_sign: String,
    #[prost(uint32, tag = "4")]
    pub imo: u32,
    #[prost(uint32, tag = "5")]
    pub ship_type: u32,
    #[prost(double, tag = "6")]
    pub length: f64,
    #[prost(double, tag = "7")]
    pub beam: f64,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct AisVesselMessage {
    #[prost(message, optional, tag = "1")]
    pub publish_stamp: Option<Timestamp>,
    #[prost(message, optional, tag = "2")]
    pub ais_vessel: Option<AisVessel>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Vessel {
    #[prost(uint32, tag = "1")]
    pub mmsi: u32,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(enumeration = "vessel::VesselType", tag = "3")]
    pub r#type: i32,
}

pub mod vessel {
    use super::SymbolTable;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum VesselType {
        Unknown = 0,
        Cargo = 1,
        Tanker = 2,
        Passenger = 3,
        Fishing = 4,
        Tug = 5,
        Pleasure = 6,
        Military = 7,
        Other = 8,
    }

    pub const VESSEL_TYPE: SymbolTable = crate::symbol_table!("Vessel.VesselType", VesselType, fallback = Unknown, [
        "UNKNOWN" => Unknown,
        "CARGO" => Cargo,
        "TANKER" => Tanker,
        "PASSENGER" => Passenger,
        "FISHING" => Fishing,
        "TUG" => Tug,
        "PLEASURE" => Pleasure,
        "MILITARY" => Military,
        "OTHER" => Other,
    ]);
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Vessels {
    #[prost(message, optional, tag = "1")]
    pub publish_stamp: Option<Timestamp>,
    #[prost(message, repeated, tag = "2")]
    pub vessels: Vec<Vessel>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct VesselStatics {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(double, tag = "2")]
    pub length: f64,
    #[prost(double, tag = "3")]
    pub beam: f64,
    #[prost(double, tag = "4")]
    pub draft: f64,
    #[prost(enumeration = "vessel_statics::Model", tag = "5")]
    pub model: i32,
    #[prost(enumeration = "vessel_statics::PropulsionType", tag = "6")]
    pub propulsion_type: i32,
}

pub mod vessel_statics {
    use super::SymbolTable;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Model {
        Unknown = 0,
        Usv = 1,
        Auv = 2,
        Rov = 3,
        Crewed = 4,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum PropulsionType {
        Unknown = 0,
        Diesel = 1,
        Electric = 2,
        Hybrid = 3,
        Sail = 4,
        Waterjet = 5,
    }

    pub const MODEL: SymbolTable = crate::symbol_table!("VesselStatics.Model", Model, fallback = Unknown, [
        "UNKNOWN" => Unknown,
        "USV" => Usv,
        "AUV" => Auv,
        "ROV" => Rov,
        "CREWED" => Crewed,
    ]);

    pub const PROPULSION_TYPE: SymbolTable = crate::symbol_table!("VesselStatics.PropulsionType", PropulsionType, fallback = Unknown, [
        "UNKNOWN" => Unknown,
        "DIESEL" => Diesel,
        "ELECTRIC" => Electric,
        "HYBRID" => Hybrid,
        "SAIL" => Sail,
        "WATERJET" => Waterjet,
    ]);
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct VesselStaticsMessage {
    #[prost(uint32, tag = "1")]
    pub mmsi: u32,
    #[prost(message, optional, tag = "2")]
    pub publish_stamp: Option<Timestamp>,
    #[prost(message, optional, tag = "3")]
    pub statics: Option<VesselStatics>,
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    #[prost(double, tag = "1")]
    pub latitude: f64,
    #[prost(double, tag = "2")]
    pub longitude: f64,
    #[prost(double, tag = "3")]
    pub altitude: f64,
    #[prost(double, tag = "4")]
    pub heading: f64,
    #[prost(double, tag = "5")]
    pub course_over_ground: f64,
    #[prost(double, tag = "6")]
    pub speed_over_ground: f64,
    #[prost(enumeration = "location::Quality", tag = "7")]
    pub quality: i32,
}

pub mod location {
    use super::SymbolTable;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Quality {
        NoFix = 0,
        Gps = 1,
        Dgps = 2,
        RtkFixed = 3,
        RtkFloat = 4,
        DeadReckoning = 5,
    }

    // No UNKNOWN symbol in this enum: an unresolved fix quality is NO_FIX.
    pub const QUALITY: SymbolTable = crate::symbol_table!("Location.Quality", Quality, fallback = NoFix, [
        "NO_FIX" => NoFix,
        "GPS" => Gps,
        "DGPS" => Dgps,
        "RTK_FIXED" => RtkFixed,
        "RTK_FLOAT" => RtkFloat,
        "DEAD_RECKONING" => DeadReckoning,
    ]);
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationMessage {
    #[prost(uint32, tag = "1")]
    pub mmsi: u32,
    #[prost(message, optional, tag = "2")]
    pub publish_stamp: Option<Timestamp>,
    #[prost(message, optional, tag = "3")]
    pub location: Option<Location>,
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Alert {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub title: String,
    #[prost(string, tag = "3")]
    pub description: String,
    #[prost(string, tag = "4")]
    pub source: String,
    #[prost(enumeration = "alert::Category", tag = "5")]
    pub category: i32,
    #[prost(enumeration = "alert::Priority", tag = "6")]
    pub priority: i32,
    #[prost(enumeration = "alert::AckScheme", tag = "7")]
    pub ack_scheme: i32,
    #[prost(enumeration = "alert::Audio", tag = "8")]
    pub audio: i32,
    #[prost(enumeration = "alert::Visual", tag = "9")]
    pub visual: i32,
    #[prost(message, optional, tag = "10")]
    pub activation_time: Option<Timestamp>,
    #[prost(bool, tag = "11")]
    pub acknowledged: bool,
}

pub mod alert {
    use super::SymbolTable;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Category {
        Unknown = 0,
        CategoryA = 1,
        CategoryB = 2,
        CategoryC = 3,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Priority {
        Unknown = 0,
        EmergencyAlarm = 1,
        Alarm = 2,
        Warning = 3,
        Caution = 4,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum AckScheme {
        Unknown = 0,
        Local = 1,
        Remote = 2,
        LocalOrRemote = 3,
        None = 4,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Audio {
        Unknown = 0,
        Silent = 1,
        Single = 2,
        Repeating = 3,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Visual {
        Unknown = 0,
        Off = 1,
        Steady = 2,
        Flashing = 3,
    }

    pub const CATEGORY: SymbolTable = crate::symbol_table!("Alert.Category", Category, fallback = Unknown, [
        "UNKNOWN" => Unknown,
        "CATEGORY_A" => CategoryA,
        "CATEGORY_B" => CategoryB,
        "CATEGORY_C" => CategoryC,
    ]);

    pub const PRIORITY: SymbolTable = crate::symbol_table!("Alert.Priority", Priority, fallback = Unknown, [
        "UNKNOWN" => Unknown,
        "EMERGENCY_ALARM" => EmergencyAlarm,
        "ALARM" => Alarm,
        "WARNING" => Warning,
        "CAUTION" => Caution,
    ]);

    pub const ACK_SCHEME: SymbolTable = crate::symbol_table!("Alert.AckScheme", AckScheme, fallback = Unknown, [
        "UNKNOWN" => Unknown,
        "LOCAL" => Local,
        "REMOTE" => Remote,
        "LOCAL_OR_REMOTE" => LocalOrRemote,
        "NONE" => None,
    ]);

    pub const AUDIO: SymbolTable = crate::symbol_table!("Alert.Audio", Audio, fallback = Unknown, [
        "UNKNOWN" => Unknown,
        "SILENT" => Silent,
        "SINGLE" => Single,
        "REPEATING" => Repeating,
    ]);

    pub const VISUAL: SymbolTable = crate::symbol_table!("Alert.Visual", Visual, fallback = Unknown, [
        "UNKNOWN" => Unknown,
        "OFF" => Off,
        "STEADY" => Steady,
        "FLASHING" => Flashing,
    ]);
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Alerts {
    #[prost(uint32, tag = "1")]
    pub mmsi: u32,
    #[prost(message, optional, tag = "2")]
    pub publish_stamp: Option<Timestamp>,
    #[prost(enumeration = "alerts::Health", tag = "3")]
    pub health: i32,
    #[prost(message, repeated, tag = "4")]
    pub alerts: Vec<Alert>,
}

pub mod alerts {
    use super::SymbolTable;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Health {
        Unknown = 0,
        Ok = 1,
        Warning = 2,
        Alarm = 3,
        Fault = 4,
    }

    pub const HEALTH: SymbolTable = crate::symbol_table!("Alerts.Health", Health, fallback = Unknown, [
        "UNKNOWN" => Unknown,
        "OK" => Ok,
        "WARNING" => Warning,
        "ALARM" => Alarm,
        "FAULT" => Fault,
    ]);
}

// ---------------------------------------------------------------------------
// Assignments / autopilot
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Assignment {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(uint32, tag = "2")]
    pub mmsi: u32,
    #[prost(string, tag = "3")]
    pub description: String,
    #[prost(enumeration = "assignment::State", tag = "4")]
    pub state: i32,
}

pub mod assignment {
    use super::SymbolTable;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum State {
        Unknown = 0,
        Pending = 1,
        Active = 2,
        Completed = 3,
        Cancelled = 4,
    }

    pub const STATE: SymbolTable = crate::symbol_table!("Assignment.State", State, fallback = Unknown, [
        "UNKNOWN" => Unknown,
        "PENDING" => Pending,
        "ACTIVE" => Active,
        "COMPLETED" => Completed,
        "CANCELLED" => Cancelled,
    ]);
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Assignments {
    #[prost(message, optional, tag = "1")]
    pub publish_stamp: Option<Timestamp>,
    #[prost(message, repeated, tag = "2")]
    pub assignments: Vec<Assignment>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotSettings {
    #[prost(uint32, tag = "1")]
    pub mmsi: u32,
    #[prost(enumeration = "autopilot_settings::Mode", tag = "2")]
    pub mode: i32,
    #[prost(double, tag = "3")]
    pub heading_setpoint: f64,
    #[prost(double, tag = "4")]
    pub speed_setpoint: f64,
    #[prost(double, tag = "5")]
    pub rate_of_turn_limit: f64,
}

pub mod autopilot_settings {
    use super::SymbolTable;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Mode {
        Unknown = 0,
        Standby = 1,
        Heading = 2,
        Track = 3,
        Speed = 4,
    }

    pub const MODE: SymbolTable = crate::symbol_table!("AutopilotSettings.Mode", Mode, fallback = Unknown, [
        "UNKNOWN" => Unknown,
        "STANDBY" => Standby,
        "HEADING" => Heading,
        "TRACK" => Track,
        "SPEED" => Speed,
    ]);
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Composite per-vessel record. Each field is set independently, by the
/// envelope composer or by a whole `vessel_envelope` payload.
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct VesselEnvelope {
    #[prost(uint32, tag = "1")]
    pub mmsi: u32,
    #[prost(message, optional, tag = "2")]
    pub publish_stamp: Option<Timestamp>,
    #[prost(message, repeated, tag = "3")]
    pub measurement_properties_messages: Vec<MeasurementPropertiesMessage>,
    #[prost(message, repeated, tag = "4")]
    pub measurement_values: Vec<MeasurementValue>,
    #[prost(message, optional, tag = "5")]
    pub ais_vessel_message: Option<AisVesselMessage>,
    #[prost(message, optional, tag = "6")]
    pub vessel_statics_message: Option<VesselStaticsMessage>,
    #[prost(message, optional, tag = "7")]
    pub location_message: Option<LocationMessage>,
    #[prost(message, repeated, tag = "8")]
    pub alerts: Vec<Alert>,
    #[prost(message, optional, tag = "9")]
    pub exercise_state: Option<ExerciseState>,
    #[prost(message, optional, tag = "10")]
    pub assignments: Option<Assignments>,
    #[prost(message, repeated, tag = "11")]
    pub autopilot_settings: Vec<AutopilotSettings>,
}

// ═══════════════════════════════════════════════════════════════
//  RecordKind / TypedRecord
// ═══════════════════════════════════════════════════════════════

/// Target record type of a schema descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    ExerciseState,
    MeasurementProperties,
    MeasurementValue,
    AisVessel,
    Vessel,
    Vessels,
    VesselStatics,
    Location,
    Alert,
    Alerts,
    Assignment,
    Assignments,
    AutopilotSettings,
    VesselEnvelope,
}

/// Schema-conformant output of extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedRecord {
    ExerciseState(ExerciseState),
    MeasurementProperties(MeasurementPropertiesMessage),
    MeasurementValue(MeasurementValue),
    AisVessel(AisVesselMessage),
    Vessel(Vessel),
    Vessels(Vessels),
    VesselStatics(VesselStaticsMessage),
    Location(LocationMessage),
    Alert(Alert),
    Alerts(Alerts),
    Assignment(Assignment),
    Assignments(Assignments),
    AutopilotSettings(AutopilotSettings),
    VesselEnvelope(VesselEnvelope),
}

impl RecordKind {
    /// Protobuf message name.
    pub fn message_name(self) -> &'static str {
        match self {
            RecordKind::ExerciseState => "ExerciseState",
            RecordKind::MeasurementProperties => "MeasurementPropertiesMessage",
            RecordKind::MeasurementValue => "MeasurementValue",
            RecordKind::AisVessel => "AISVesselMessage",
            RecordKind::Vessel => "Vessel",
            RecordKind::Vessels => "Vessels",
            RecordKind::VesselStatics => "VesselStaticsMessage",
            RecordKind::Location => "LocationMessage",
            RecordKind::Alert => "Alert",
            RecordKind::Alerts => "Alerts",
            RecordKind::Assignment => "Assignment",
            RecordKind::Assignments => "Assignments",
            RecordKind::AutopilotSettings => "AutopilotSettings",
            RecordKind::VesselEnvelope => "VesselEnvelope",
        }
    }

    /// Populate the record from a JSON tree by field name.
    ///
    /// Unknown keys are ignored and absent fields take their default; a value
    /// of the wrong type is a `SchemaMismatch`.
    pub fn populate(self, tree: serde_json::Value) -> Result<TypedRecord, DecodeError> {
        use serde_json::from_value;
        let record = match self {
            RecordKind::ExerciseState => TypedRecord::ExerciseState(from_value(tree)?),
            RecordKind::MeasurementProperties => TypedRecord::MeasurementProperties(from_value(tree)?),
            RecordKind::MeasurementValue => TypedRecord::MeasurementValue(from_value(tree)?),
            RecordKind::AisVessel => TypedRecord::AisVessel(from_value(tree)?),
            RecordKind::Vessel => TypedRecord::Vessel(from_value(tree)?),
            RecordKind::Vessels => TypedRecord::Vessels(from_value(tree)?),
            RecordKind::VesselStatics => TypedRecord::VesselStatics(from_value(tree)?),
            RecordKind::Location => TypedRecord::Location(from_value(tree)?),
            RecordKind::Alert => TypedRecord::Alert(from_value(tree)?),
            RecordKind::Alerts => TypedRecord::Alerts(from_value(tree)?),
            RecordKind::Assignment => TypedRecord::Assignment(from_value(tree)?),
            RecordKind::Assignments => TypedRecord::Assignments(from_value(tree)?),
            RecordKind::AutopilotSettings => TypedRecord::AutopilotSettings(from_value(tree)?),
            RecordKind::VesselEnvelope => TypedRecord::VesselEnvelope(from_value(tree)?),
        };
        Ok(record)
    }
}

impl TypedRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            TypedRecord::ExerciseState(_) => RecordKind::ExerciseState,
            TypedRecord::MeasurementProperties(_) => RecordKind::MeasurementProperties,
            TypedRecord::MeasurementValue(_) => RecordKind::MeasurementValue,
            TypedRecord::AisVessel(_) => RecordKind::AisVessel,
            TypedRecord::Vessel(_) => RecordKind::Vessel,
            TypedRecord::Vessels(_) => RecordKind::Vessels,
            TypedRecord::VesselStatics(_) => RecordKind::VesselStatics,
            TypedRecord::Location(_) => RecordKind::Location,
            TypedRecord::Alert(_) => RecordKind::Alert,
            TypedRecord::Alerts(_) => RecordKind::Alerts,
            TypedRecord::Assignment(_) => RecordKind::Assignment,
            TypedRecord::Assignments(_) => RecordKind::Assignments,
            TypedRecord::AutopilotSettings(_) => RecordKind::AutopilotSettings,
            TypedRecord::VesselEnvelope(_) => RecordKind::VesselEnvelope,
        }
    }

    /// Vessel identifier (MMSI) the record is addressed to, if it carries one.
    ///
    /// `0` means "not set" on the wire and is reported as `None`.
    pub fn entity_id(&self) -> Option<u32> {
        let mmsi = match self {
            TypedRecord::MeasurementProperties(m) => m.mmsi,
            TypedRecord::MeasurementValue(m) => m.mmsi,
            TypedRecord::AisVessel(m) => m.ais_vessel.as_ref().map_or(0, |v| v.mmsi),
            TypedRecord::Vessel(m) => m.mmsi,
            TypedRecord::VesselStatics(m) => m.mmsi,
            TypedRecord::Location(m) => m.mmsi,
            TypedRecord::Alerts(m) => m.mmsi,
            TypedRecord::Assignment(m) => m.mmsi,
            TypedRecord::AutopilotSettings(m) => m.mmsi,
            TypedRecord::VesselEnvelope(m) => m.mmsi,
            TypedRecord::ExerciseState(_)
            | TypedRecord::Vessels(_)
            | TypedRecord::Alert(_)
            | TypedRecord::Assignments(_) => 0,
        };
        (mmsi != 0).then_some(mmsi)
    }

    /// Binary protobuf encoding.
    pub fn encode_to_vec(&self) -> Vec<u8> {
        use prost::Message;
        match self {
            TypedRecord::ExerciseState(m) => m.encode_to_vec(),
            TypedRecord::MeasurementProperties(m) => m.encode_to_vec(),
            TypedRecord::MeasurementValue(m) => m.encode_to_vec(),
            TypedRecord::AisVessel(m) => m.encode_to_vec(),
            TypedRecord::Vessel(m) => m.encode_to_vec(),
            TypedRecord::Vessels(m) => m.encode_to_vec(),
            TypedRecord::VesselStatics(m) => m.encode_to_vec(),
            TypedRecord::Location(m) => m.encode_to_vec(),
            TypedRecord::Alert(m) => m.encode_to_vec(),
            TypedRecord::Alerts(m) => m.encode_to_vec(),
            TypedRecord::Assignment(m) => m.encode_to_vec(),
            TypedRecord::Assignments(m) => m.encode_to_vec(),
            TypedRecord::AutopilotSettings(m) => m.encode_to_vec(),
            TypedRecord::VesselEnvelope(m) => m.encode_to_vec(),
        }
    }

    /// JSON form of the record (enums as numbers).
    pub fn to_json(&self) -> Result<serde_json::Value, DecodeError> {
        let value = match self {
            TypedRecord::ExerciseState(m) => serde_json::to_value(m),
            TypedRecord::MeasurementProperties(m) => serde_json::to_value(m),
            TypedRecord::MeasurementValue(m) => serde_json::to_value(m),
            TypedRecord::AisVessel(m) => serde_json::to_value(m),
            TypedRecord::Vessel(m) => serde_json::to_value(m),
            TypedRecord::Vessels(m) => serde_json::to_value(m),
            TypedRecord::VesselStatics(m) => serde_json::to_value(m),
            TypedRecord::Location(m) => serde_json::to_value(m),
            TypedRecord::Alert(m) => serde_json::to_value(m),
            TypedRecord::Alerts(m) => serde_json::to_value(m),
            TypedRecord::Assignment(m) => serde_json::to_value(m),
            TypedRecord::Assignments(m) => serde_json::to_value(m),
            TypedRecord::AutopilotSettings(m) => serde_json::to_value(m),
            TypedRecord::VesselEnvelope(m) => serde_json::to_value(m),
        };
        value.map_err(|e| DecodeError::unexpected(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;
    use serde_json::json;

    #[test]
    fn test_populate_ignores_unknown_and_defaults_missing() {
        let tree = json!({"mmsi": 7, "publish_stamp": {"sec": 3}, "not_a_field": true});
        let record = RecordKind::MeasurementValue.populate(tree).unwrap();
        let TypedRecord::MeasurementValue(m) = record else { panic!("wrong kind") };
        assert_eq!(m.mmsi, 7);
        assert_eq!(m.publish_stamp, Some(Timestamp { sec: 3, nanosec: 0 }));
        assert!(m.measurement.is_none());
    }

    #[test]
    fn test_populate_type_error_is_mismatch() {
        let err = RecordKind::Location.populate(json!({"mmsi": "abc"})).unwrap_err();
        assert_eq!(err.kind, crate::error::DecodeErrorKind::SchemaMismatch);
    }

    #[test]
    fn test_vessel_type_field_uses_plain_name() {
        let record = RecordKind::Vessel.populate(json!({"mmsi": 1, "type": 2})).unwrap();
        let TypedRecord::Vessel(v) = record else { panic!("wrong kind") };
        assert_eq!(v.r#type, vessel::VesselType::Tanker as i32);
    }

    #[test]
    fn test_entity_id_zero_is_none() {
        let record = TypedRecord::Location(LocationMessage::default());
        assert_eq!(record.entity_id(), None);
    }

    #[test]
    fn test_encode_decodes_back() {
        let state = ExerciseState {
            publish_stamp: Some(Timestamp { sec: 5, nanosec: 0 }),
            state: exercise_state::State::Running as i32,
        };
        let bytes = TypedRecord::ExerciseState(state.clone()).encode_to_vec();
        assert_eq!(ExerciseState::decode(bytes.as_slice()).unwrap(), state);
    }
}
