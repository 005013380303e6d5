use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, Result};

server_enum! {
    /// Low/medium/high reading of a feeder metric.
    pub enum MetricState ("metric state") {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
    }
}

server_enum! {
    /// How often the feeder wakes up to take postcards.
    pub enum PowerProfile ("power profile") {
        Frenzy => "FRENZY_MODE",
        PowerSaver => "POWER_SAVER_MODE",
        Standard => "STANDARD_MODE",
    }
}

server_enum! {
    /// Connectivity and activity state of a feeder.
    pub enum FeederState ("feeder state") {
        DeepSleep => "DEEP_SLEEP",
        FactoryReset => "FACTORY_RESET",
        FirmwareUpdate => "FIRMWARE_UPDATE",
        Offline => "OFFLINE",
        OffGrid => "OFF_GRID",
        Online => "ONLINE",
        OutOfFeeder => "OUT_OF_FEEDER",
        PendingFactoryReset => "PENDING_FACTORY_RESET",
        PendingRemoval => "PENDING_REMOVAL",
        ReadyToStream => "READY_TO_STREAM",
        Streaming => "STREAMING",
        TakingPostcards => "TAKING_POSTCARDS",
    }
}

const FEEDER_FOR_OWNER: &str = "FeederForOwner";
const FEEDER_FOR_MEMBER_PENDING: &str = "FeederForMemberPending";
const FEEDER_FOR_PUBLIC: &str = "FeederForPublic";
const DEFAULT_FEEDER_NAME: &str = "Bird Buddy";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Battery {
    #[serde(default)]
    pub percentage: Option<i64>,
    #[serde(default)]
    pub charging: Option<bool>,
    #[serde(default)]
    pub state: Option<MetricState>,
}

impl Battery {
    pub fn is_charging(&self) -> bool {
        self.charging.unwrap_or(false)
    }
}

/// Wifi signal metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// RSSI.
    #[serde(default)]
    pub value: Option<i64>,
    #[serde(default)]
    pub state: Option<MetricState>,
}

impl Signal {
    /// Signal strength, `-1` when unknown.
    pub fn rssi(&self) -> i64 {
        self.value.unwrap_or(-1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodLevel {
    #[serde(default)]
    pub state: Option<MetricState>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    #[serde(default)]
    pub value: Option<f64>,
}

/// One Bird Buddy device as seen by the logged-in account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feeder {
    pub id: String,
    /// `FeederForOwner`, `FeederForMember`, `FeederForMemberPending`, ...
    #[serde(rename = "__typename", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub firmware_version: Option<String>,
    #[serde(default)]
    pub available_firmware_version: Option<String>,
    #[serde(default)]
    pub state: Option<FeederState>,
    #[serde(default)]
    pub off_grid: Option<bool>,
    #[serde(default)]
    pub audio_enabled: Option<bool>,
    /// Username of the account that first paired the feeder.
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub battery: Option<Battery>,
    #[serde(default)]
    pub signal: Option<Signal>,
    #[serde(default)]
    pub location_city: Option<String>,
    #[serde(default)]
    pub location_country: Option<String>,
    #[serde(default)]
    pub power_profile: Option<PowerProfile>,
    #[serde(default)]
    pub food: Option<FoodLevel>,
    #[serde(default)]
    pub temperature: Option<Temperature>,
    #[serde(default)]
    pub low_battery_notification: Option<bool>,
    #[serde(default)]
    pub low_food_notification: Option<bool>,
}

impl Feeder {
    /// Feeder name as set in the app.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_FEEDER_NAME)
    }

    /// Whether the logged-in user owns this feeder.
    pub fn is_owner(&self) -> bool {
        self.kind.as_deref() == Some(FEEDER_FOR_OWNER)
    }

    /// Waiting for the owner to approve access.
    pub fn is_pending(&self) -> bool {
        self.kind.as_deref() == Some(FEEDER_FOR_MEMBER_PENDING)
    }

    pub fn is_public(&self) -> bool {
        self.kind.as_deref() == Some(FEEDER_FOR_PUBLIC)
    }

    pub fn is_off_grid(&self) -> Option<bool> {
        self.off_grid
    }

    pub fn is_audio_enabled(&self) -> Option<bool> {
        self.audio_enabled
    }

    /// Configured power profile; the server omits it for standard mode.
    pub fn power_profile(&self) -> PowerProfile {
        self.power_profile.clone().unwrap_or(PowerProfile::Standard)
    }

    pub fn battery(&self) -> Battery {
        self.battery.clone().unwrap_or_default()
    }

    pub fn signal(&self) -> Signal {
        self.signal.clone().unwrap_or_default()
    }

    /// Configured `(city, country)`.
    pub fn location(&self) -> (Option<&str>, Option<&str>) {
        (
            self.location_city.as_deref(),
            self.location_country.as_deref(),
        )
    }

    /// Seed level. The server does not reliably populate this yet.
    pub fn food(&self) -> Option<&MetricState> {
        self.food.as_ref()?.state.as_ref()
    }

    /// Temperature at the feeder. The server does not reliably populate this yet.
    pub fn temperature(&self) -> Option<f64> {
        self.temperature.as_ref()?.value
    }
}

impl std::fmt::Display for Feeder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Feeder: {}", self.name())?;
        if let Some(state) = &self.state {
            write!(f, ", {}", state)?;
        }
        if let Some(pct) = self.battery().percentage {
            write!(f, ", {}%", pct)?;
        }
        write!(f, ">")
    }
}

/// Raw feeder fields as last reported by the server.
///
/// Feeder payloads arrive partially (a toggle result carries one field, a
/// full refresh carries all of them), so the raw object is merged
/// field-by-field and parsed into a [`Feeder`] on read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeederRecord {
    fields: Map<String, JsonValue>,
}

impl FeederRecord {
    /// Start a record from a feeder object.
    pub fn new(fields: Map<String, JsonValue>) -> Self {
        Self { fields }
    }

    /// Overwrite the fields present in `update`, keeping the rest.
    pub fn merge(&mut self, update: &Map<String, JsonValue>) {
        for (key, value) in update {
            self.fields.insert(key.clone(), value.clone());
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.fields.get("id").and_then(JsonValue::as_str)
    }

    /// The raw field map.
    pub fn fields(&self) -> &Map<String, JsonValue> {
        &self.fields
    }

    /// Parse the current fields.
    pub fn feeder(&self) -> Result<Feeder> {
        serde_json::from_value(JsonValue::Object(self.fields.clone()))
            .map_err(|e| Error::UnexpectedResponse(format!("invalid feeder payload: {}", e)))
    }
}

/// Owner-settable feeder options; unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeederOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_battery_notification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_food_notification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub off_grid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offline_mode: Option<bool>,
}

const UPDATE_SUCCEEDED: &str = "FeederFirmwareUpdateSucceededResult";
const UPDATE_PROGRESS: &str = "FeederFirmwareUpdateProgressResult";
const UPDATE_FAILED: &str = "FeederFirmwareUpdateFailedResult";

/// Result of starting or checking a firmware update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeederUpdateStatus {
    #[serde(rename = "__typename")]
    pub kind: String,
    #[serde(default)]
    pub progress: Option<i64>,
    #[serde(default)]
    pub failed_reason: Option<String>,
    /// Partial feeder fields reported with the status.
    #[serde(default)]
    pub feeder: Option<Map<String, JsonValue>>,
}

impl FeederUpdateStatus {
    /// The update finished successfully.
    pub fn is_complete(&self) -> bool {
        self.kind == UPDATE_SUCCEEDED
    }

    pub fn is_in_progress(&self) -> bool {
        self.kind == UPDATE_PROGRESS && self.progress.is_some()
    }

    pub fn is_failed(&self) -> bool {
        self.kind == UPDATE_FAILED
    }
}
