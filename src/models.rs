use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub type RoomId = i64;
pub type ServiceId = i64;

// Room classification, each type carries a fixed occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomType {
    Single,
    Double,
    Deluxe,
    Suite,
}

impl RoomType {
    pub fn max_occupancy(self) -> u32 {
        match self {
            RoomType::Single => 1,
            RoomType::Double => 2,
            RoomType::Deluxe => 3,
            RoomType::Suite => 4,
        }
    }

    pub fn default_price_per_night(self) -> f64 {
        match self {
            RoomType::Single => 100.0,
            RoomType::Double => 150.0,
            RoomType::Deluxe => 250.0,
            RoomType::Suite => 400.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Available,
    Occupied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingType {
    PerOrder,
    PerNight,
    PerHour,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub room_number: String,
    pub room_type: RoomType,
    pub room_status: RoomStatus,
    pub price_per_night: f64,
    pub max_occupancy: u32,
}

impl Room {
    /// Builds a room with the occupancy and nightly price implied by its type.
    pub fn of_type(id: RoomId, room_number: impl Into<String>, room_type: RoomType) -> Self {
        Self {
            id,
            room_number: room_number.into(),
            room_type,
            room_status: RoomStatus::Available,
            price_per_night: room_type.default_price_per_night(),
            max_occupancy: room_type.max_occupancy(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelService {
    pub id: ServiceId,
    pub name: String,
    pub price: f64,
    pub pricing_type: PricingType,
    #[serde(default)]
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub country: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub booking_ids: Vec<i64>,
}

// Booking as returned by the entity lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub booking_reference: String,
    pub check_in_date_time: NaiveDateTime,
    pub check_out_date_time: NaiveDateTime,
    pub total_price: f64,
    pub guest: Guest,
    pub room: Room,
    #[serde(default)]
    pub additional_guest_names: Vec<String>,
    #[serde(default)]
    pub selected_services: Vec<HotelService>,
    #[serde(default)]
    pub total_guests: Option<u32>,
    #[serde(default)]
    pub service_quantities: BTreeMap<ServiceId, u32>,
}

impl Booking {
    pub fn guest_count(&self) -> u32 {
        self.total_guests
            .unwrap_or(1 + self.additional_guest_names.len() as u32)
    }
}

// Response of apply/update and of the response-entity lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub booking_id: i64,
    #[serde(default)]
    pub booking_reference: String,
    pub check_in_date_time: NaiveDateTime,
    pub check_out_date_time: NaiveDateTime,
    pub total_price: f64,
    #[serde(default)]
    pub additional_guest_names: Vec<String>,
    #[serde(default)]
    pub total_guests: Option<u32>,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub selected_services: Vec<HotelService>,
    #[serde(default)]
    pub service_quantities: BTreeMap<ServiceId, u32>,
}

// Raw stored record from the response-entity lookup; additional guests are
// listed under `additionalGuests` and the nested records may be absent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingEntity {
    pub id: i64,
    #[serde(default)]
    pub booking_reference: String,
    pub check_in_date_time: NaiveDateTime,
    pub check_out_date_time: NaiveDateTime,
    #[serde(default)]
    pub total_price: f64,
    #[serde(default)]
    pub guest: Option<Guest>,
    #[serde(default)]
    pub room: Option<Room>,
    #[serde(default)]
    pub additional_guests: Vec<String>,
    #[serde(default)]
    pub selected_services: Vec<HotelService>,
    #[serde(default)]
    pub total_guests: Option<u32>,
    #[serde(default)]
    pub service_quantities: BTreeMap<ServiceId, u32>,
}

/// Body of both `POST /apply-booking` and `PUT /update-booking/{reference}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub full_name: String,
    pub additional_guest_names: Vec<String>,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub country: String,
    pub address: String,
    pub city: String,
    pub check_in_date_time: String,
    pub check_out_date_time: String,
    pub room_id: RoomId,
    pub hotel_service_ids: Vec<ServiceId>,
    pub service_quantities: BTreeMap<ServiceId, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintRequest {
    #[validate(email(message = "Guest Email should be valid"))]
    pub guest_email: String,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub created_at: Option<NaiveDateTime>,
    pub guest_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactUsRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactUsMessage {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    Manager,
    Receptionist,
    Housekeeping,
    Maintenance,
    Kitchen,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffLogin {
    pub token: String,
    #[serde(rename = "type", default = "bearer")]
    pub token_type: String,
    pub email: String,
    pub role: StaffRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestLogin {
    pub token: String,
    #[serde(rename = "type", default = "bearer")]
    pub token_type: String,
    pub email: String,
    #[serde(default)]
    pub user_type: Option<String>,
}

fn bearer() -> String {
    "Bearer".to_string()
}
