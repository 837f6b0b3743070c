//! Built-in schema descriptors and the default binding table.

use val_api::record::{
    alert, alerts, assignment, autopilot_settings, exercise_state, location, vessel, vessel_statics,
    RecordKind,
};

use crate::config::BindingConfig;
use crate::schema::{Nesting, NestedField, RepeatedField, RootKey, SchemaDescriptor};
use crate::sink::SinkKind;

// ---------------------------------------------------------------------------
// List elements
// ---------------------------------------------------------------------------

pub static VESSEL: SchemaDescriptor = SchemaDescriptor {
    enum_fields: &[("type", &vessel::VESSEL_TYPE)],
    ..SchemaDescriptor::flat("vessel", RecordKind::Vessel)
};

pub static ALERT: SchemaDescriptor = SchemaDescriptor {
    root: Some(RootKey { key: "alert", required: false }),
    enum_fields: &[
        ("category", &alert::CATEGORY),
        ("priority", &alert::PRIORITY),
        ("ack_scheme", &alert::ACK_SCHEME),
        ("audio", &alert::AUDIO),
        ("visual", &alert::VISUAL),
    ],
    ..SchemaDescriptor::flat("alert", RecordKind::Alert)
};

pub static ASSIGNMENT: SchemaDescriptor = SchemaDescriptor {
    root: Some(RootKey { key: "assignment", required: false }),
    enum_fields: &[("state", &assignment::STATE)],
    ..SchemaDescriptor::flat("assignment", RecordKind::Assignment)
};

pub static AUTOPILOT_SETTINGS: SchemaDescriptor = SchemaDescriptor {
    enum_fields: &[("mode", &autopilot_settings::MODE)],
    ..SchemaDescriptor::flat("autopilot_settings", RecordKind::AutopilotSettings)
};

// ---------------------------------------------------------------------------
// Routable schemas (loosely-typed producer JSON)
// ---------------------------------------------------------------------------

pub static MEASUREMENT_PROPERTIES: SchemaDescriptor =
    SchemaDescriptor::flat("measurement_properties", RecordKind::MeasurementProperties);

pub static MEASUREMENT_VALUE: SchemaDescriptor =
    SchemaDescriptor::flat("measurement_value", RecordKind::MeasurementValue);

pub static EXERCISE_STATE: SchemaDescriptor = SchemaDescriptor {
    root: Some(RootKey { key: "exercise_state", required: true }),
    merge_keys: &["publish_stamp"],
    enum_fields: &[("state", &exercise_state::STATE)],
    ..SchemaDescriptor::flat("exercise_state", RecordKind::ExerciseState)
};

pub static AIS_VESSEL: SchemaDescriptor = SchemaDescriptor {
    root: Some(RootKey { key: "ais_vessel", required: true }),
    merge_keys: &["mmsi"],
    nest: Some(Nesting { key: "ais_vessel", carry: &["publish_stamp"] }),
    ..SchemaDescriptor::flat("ais_vessel", RecordKind::AisVessel)
};

pub static VESSELS: SchemaDescriptor = SchemaDescriptor {
    repeated_fields: &[RepeatedField { field: "vessels", element: &VESSEL }],
    ..SchemaDescriptor::flat("vessels", RecordKind::Vessels)
};

pub static LOCATION: SchemaDescriptor = SchemaDescriptor {
    root: Some(RootKey { key: "location", required: true }),
    enum_fields: &[("quality", &location::QUALITY)],
    nest: Some(Nesting { key: "location", carry: &["mmsi", "publish_stamp"] }),
    ..SchemaDescriptor::flat("location", RecordKind::Location)
};

pub static ALERTS: SchemaDescriptor = SchemaDescriptor {
    enum_fields: &[("health", &alerts::HEALTH)],
    repeated_fields: &[RepeatedField { field: "alerts", element: &ALERT }],
    ..SchemaDescriptor::flat("alerts", RecordKind::Alerts)
};

pub static VESSEL_STATICS: SchemaDescriptor = SchemaDescriptor {
    root: Some(RootKey { key: "vessel_statics", required: true }),
    enum_fields: &[
        ("model", &vessel_statics::MODEL),
        ("propulsion_type", &vessel_statics::PROPULSION_TYPE),
    ],
    nest: Some(Nesting { key: "statics", carry: &["mmsi", "publish_stamp"] }),
    ..SchemaDescriptor::flat("vessel_statics", RecordKind::VesselStatics)
};

pub static ASSIGNMENTS: SchemaDescriptor = SchemaDescriptor {
    repeated_fields: &[RepeatedField { field: "assignments", element: &ASSIGNMENT }],
    ..SchemaDescriptor::flat("assignments", RecordKind::Assignments)
};

// ---------------------------------------------------------------------------
// Envelope (already in record layout; only enums and lists need work)
// ---------------------------------------------------------------------------

static LOCATION_FIX: SchemaDescriptor = SchemaDescriptor {
    enum_fields: &[("quality", &location::QUALITY)],
    ..SchemaDescriptor::flat("location", RecordKind::Location)
};

static LOCATION_MESSAGE: SchemaDescriptor = SchemaDescriptor {
    nested_fields: &[NestedField { field: "location", descriptor: &LOCATION_FIX }],
    ..SchemaDescriptor::flat("location_message", RecordKind::Location)
};

static STATICS_BODY: SchemaDescriptor = SchemaDescriptor {
    enum_fields: &[
        ("model", &vessel_statics::MODEL),
        ("propulsion_type", &vessel_statics::PROPULSION_TYPE),
    ],
    ..SchemaDescriptor::flat("statics", RecordKind::VesselStatics)
};

static VESSEL_STATICS_MESSAGE: SchemaDescriptor = SchemaDescriptor {
    nested_fields: &[NestedField { field: "statics", descriptor: &STATICS_BODY }],
    ..SchemaDescriptor::flat("vessel_statics_message", RecordKind::VesselStatics)
};

static EXERCISE_STATE_RECORD: SchemaDescriptor = SchemaDescriptor {
    enum_fields: &[("state", &exercise_state::STATE)],
    ..SchemaDescriptor::flat("exercise_state", RecordKind::ExerciseState)
};

static AIS_VESSEL_MESSAGE: SchemaDescriptor =
    SchemaDescriptor::flat("ais_vessel_message", RecordKind::AisVessel);

pub static VESSEL_ENVELOPE: SchemaDescriptor = SchemaDescriptor {
    repeated_fields: &[
        RepeatedField { field: "measurement_properties_messages", element: &MEASUREMENT_PROPERTIES },
        RepeatedField { field: "measurement_values", element: &MEASUREMENT_VALUE },
        RepeatedField { field: "alerts", element: &ALERT },
        RepeatedField { field: "autopilot_settings", element: &AUTOPILOT_SETTINGS },
    ],
    nested_fields: &[
        NestedField { field: "ais_vessel_message", descriptor: &AIS_VESSEL_MESSAGE },
        NestedField { field: "vessel_statics_message", descriptor: &VESSEL_STATICS_MESSAGE },
        NestedField { field: "location_message", descriptor: &LOCATION_MESSAGE },
        NestedField { field: "exercise_state", descriptor: &EXERCISE_STATE_RECORD },
        NestedField { field: "assignments", descriptor: &ASSIGNMENTS },
    ],
    ..SchemaDescriptor::flat("vessel_envelope", RecordKind::VesselEnvelope)
};

/// Every schema a binding may name.
pub static SCHEMAS: &[&SchemaDescriptor] = &[
    &MEASUREMENT_PROPERTIES,
    &EXERCISE_STATE,
    &AIS_VESSEL,
    &VESSELS,
    &MEASUREMENT_VALUE,
    &LOCATION,
    &ALERTS,
    &VESSEL_STATICS,
    &ASSIGNMENTS,
    &VESSEL_ENVELOPE,
    &AUTOPILOT_SETTINGS,
];

pub fn by_name(name: &str) -> Option<&'static SchemaDescriptor> {
    SCHEMAS.iter().copied().find(|d| d.name == name)
}

/// Default binding table. Patterns are relative to the configured prefix.
///
/// `**` → alerts is a catch-all: every topic under the prefix is also
/// offered to the alerts schema.
pub fn default_bindings() -> Vec<BindingConfig> {
    const TABLE: &[(&str, &str, bool)] = &[
        ("**/properties", "measurement_properties", true),
        ("exercise_state", "exercise_state", false),
        ("**/aisvessel", "ais_vessel", true),
        ("vessels", "vessels", false),
        ("**/value", "measurement_value", true),
        ("**/location", "location", true),
        ("**", "alerts", false),
        ("**/vessel_statics", "vessel_statics", true),
        ("assignments", "assignments", false),
        ("**/vessel_envelope", "vessel_envelope", true),
    ];

    let mut bindings = Vec::new();
    for (pattern, schema, compose) in TABLE {
        bindings.push(BindingConfig {
            pattern: pattern.to_string(),
            schema: schema.to_string(),
            sink: SinkKind::Log,
        });
        if *compose {
            bindings.push(BindingConfig {
                pattern: pattern.to_string(),
                schema: schema.to_string(),
                sink: SinkKind::Compose { field: None },
            });
        }
    }
    bindings
}
