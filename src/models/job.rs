use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VehicleType {
    Sedan,
    Suv,
    Pickup,
    BoxTruck,
    CargoVan,
}

impl VehicleType {
    pub fn label(&self) -> &'static str {
        match self {
            VehicleType::Sedan => "Sedan (Small Items)",
            VehicleType::Suv => "SUV (Medium Items)",
            VehicleType::Pickup => "Pickup Truck (Large Items)",
            VehicleType::BoxTruck => "Box Truck (Whole Room)",
            VehicleType::CargoVan => "Cargo Van (Weather Sensitive)",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Accepted,
    Completed,
}

/// Which side of a haul performed an action. Not stored on the user:
/// the same account may request one job and drive another.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    Driver,
    Requester,
}

impl Role {
    pub fn other(&self) -> Role {
        match self {
            Role::Driver => Role::Requester,
            Role::Requester => Role::Driver,
        }
    }
}

/// One haul request. `status` is `Completed` exactly when both
/// confirmation flags are set; the flags only ever go from false to true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub status: JobStatus,
    /// Driver payout in whole dollars.
    pub payout: f64,
    /// Fixed at creation time from the payout; authoritative thereafter.
    pub platform_fee: f64,
    pub vehicle_type: VehicleType,
    pub image_url: Option<String>,
    pub distance_miles: f64,
    pub fragility: Option<String>,
    pub handling_instructions: Option<String>,
    pub driver_confirmed: bool,
    pub requester_confirmed: bool,
    pub rating_for_driver: Option<u8>,
    pub rating_for_requester: Option<u8>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn confirmed_by(&self, role: Role) -> bool {
        match role {
            Role::Driver => self.driver_confirmed,
            Role::Requester => self.requester_confirmed,
        }
    }

    pub fn apply(&mut self, patch: JobPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        // Confirmation flags are monotonic; a patch can set them, never
        // clear them.
        if patch.driver_confirmed == Some(true) {
            self.driver_confirmed = true;
        }
        if patch.requester_confirmed == Some(true) {
            self.requester_confirmed = true;
        }
        if let Some(score) = patch.rating_for_driver {
            self.rating_for_driver = Some(score);
        }
        if let Some(score) = patch.rating_for_requester {
            self.rating_for_requester = Some(score);
        }
    }
}

/// Partial update merged onto a stored job. Absent fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub driver_confirmed: Option<bool>,
    pub requester_confirmed: Option<bool>,
    pub rating_for_driver: Option<u8>,
    pub rating_for_requester: Option<u8>,
}
