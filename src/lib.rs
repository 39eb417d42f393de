// Booking availability and price/occupancy validation for the hotel backend

pub mod api;
pub mod availability;
pub mod booking_form;
pub mod config;
pub mod models;
pub mod rules;
pub mod session;
pub mod stay;
pub mod submission;

// Re-export key types for convenience
pub use api::{extract_error_message, ApiError, ClientStats, HotelApi, HttpHotelApi};
pub use availability::{with_current_room, AvailabilityLookup, RoomAvailability};
pub use booking_form::{BookingForm, GuestProfile};
pub use config::{ClientConfig, ConfigError};
pub use models::{
    Booking, BookingConfirmation, BookingEntity, BookingRequest, HotelService, PricingType, Room,
    RoomType,
};
pub use rules::{RuleViolation, ServiceSelection};
pub use session::{Principal, Session};
pub use stay::nights_between;
pub use submission::{
    cancel_booking, load_existing_booking, BookingSubmitter, SubmissionError, SubmissionState,
    Submitted,
};
