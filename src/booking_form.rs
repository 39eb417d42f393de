// Form state for the create and update booking flows

use chrono::NaiveDateTime;
use tracing::debug;
use validator::{Validate, ValidationErrors};

use crate::models::{Booking, BookingEntity, HotelService, Room, RoomId, ServiceId};
use crate::rules::{self, RuleViolation, ServiceSelection};
use crate::stay::{billable_nights, is_ordered, nights_between};

const PROFILE_FIELDS: [&str; 7] = [
    "full_name",
    "email",
    "password",
    "phone_number",
    "country",
    "address",
    "city",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct GuestProfile {
    #[validate(length(min = 2, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 10, message = "Phone number is required"))]
    pub phone_number: String,
    #[validate(length(min = 2, message = "Country is required"))]
    pub country: String,
    #[validate(length(min = 5, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 2, message = "City is required"))]
    pub city: String,
}

/// Message of the first failing field, walking `fields` in order.
pub(crate) fn first_validation_message(
    errors: &ValidationErrors,
    fields: &[&'static str],
) -> Option<String> {
    let field_errors = errors.field_errors();
    let mut ordered = fields.iter().filter_map(|field| field_errors.get(field));
    let mut remaining = field_errors.values();

    ordered
        .next()
        .or_else(|| remaining.next())
        .and_then(|errors| errors.first())
        .map(|error| match &error.message {
            Some(message) => message.to_string(),
            None => error.code.to_string(),
        })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingForm {
    pub profile: GuestProfile,
    check_in: Option<NaiveDateTime>,
    check_out: Option<NaiveDateTime>,
    selected_room_id: Option<RoomId>,
    additional_guests: Vec<String>,
    services: ServiceSelection,
}

impl BookingForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the form from a stored booking. The password is never returned
    /// by the backend and has to be entered again.
    pub fn from_existing(booking: &Booking, record: Option<&BookingEntity>) -> Self {
        let guest = &booking.guest;
        let profile = GuestProfile {
            full_name: guest.full_name.clone(),
            email: guest.email.clone(),
            password: String::new(),
            phone_number: guest.phone_number.clone(),
            country: guest.country.clone(),
            address: guest.address.clone(),
            city: guest.city.clone(),
        };

        let additional_guests = record
            .map(|r| r.additional_guests.clone())
            .filter(|names| !names.is_empty())
            .unwrap_or_else(|| booking.additional_guest_names.clone());

        let quantities = record
            .map(|r| r.service_quantities.clone())
            .filter(|q| !q.is_empty())
            .unwrap_or_else(|| booking.service_quantities.clone());
        let services = ServiceSelection::restore(
            booking.selected_services.iter().map(|s| s.id).collect(),
            quantities,
        );

        Self {
            profile,
            check_in: Some(booking.check_in_date_time),
            check_out: Some(booking.check_out_date_time),
            selected_room_id: Some(booking.room.id),
            additional_guests,
            services,
        }
    }

    pub fn check_in(&self) -> Option<NaiveDateTime> {
        self.check_in
    }

    pub fn check_out(&self) -> Option<NaiveDateTime> {
        self.check_out
    }

    // A different stay range means a different set of free rooms
    pub fn set_check_in(&mut self, value: Option<NaiveDateTime>) {
        if self.check_in != value {
            self.check_in = value;
            self.selected_room_id = None;
        }
    }

    pub fn set_check_out(&mut self, value: Option<NaiveDateTime>) {
        if self.check_out != value {
            self.check_out = value;
            self.selected_room_id = None;
        }
    }

    pub fn nights(&self) -> u32 {
        nights_between(self.check_in, self.check_out)
    }

    /// The range to query availability for, once both dates are set and
    /// ordered.
    pub fn availability_window(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) if is_ordered(self.check_in, self.check_out) => {
                Some((check_in, check_out))
            }
            _ => None,
        }
    }

    pub fn select_room(&mut self, room_id: Option<RoomId>) {
        self.selected_room_id = room_id;
    }

    pub fn selected_room_id(&self) -> Option<RoomId> {
        self.selected_room_id
    }

    pub fn selected_room<'a>(&self, rooms: &'a [Room]) -> Option<&'a Room> {
        let id = self.selected_room_id?;
        rooms.iter().find(|room| room.id == id)
    }

    pub fn max_guests(&self, rooms: &[Room]) -> u32 {
        rules::occupancy_limit(self.selected_room(rooms))
    }

    pub fn total_guests(&self) -> u32 {
        rules::total_guests(self.additional_guests.len())
    }

    pub fn can_add_guest(&self, rooms: &[Room]) -> bool {
        rules::can_add_guest(self.selected_room(rooms), self.additional_guests.len())
    }

    /// Appends an empty guest name slot and returns its index.
    pub fn add_guest(&mut self, rooms: &[Room]) -> Result<usize, RuleViolation> {
        if !self.can_add_guest(rooms) {
            return Err(RuleViolation::OccupancyExceeded {
                max_occupancy: self.max_guests(rooms),
                total_guests: self.total_guests() + 1,
            });
        }
        self.additional_guests.push(String::new());
        Ok(self.additional_guests.len() - 1)
    }

    pub fn remove_guest(&mut self, index: usize) -> Option<String> {
        (index < self.additional_guests.len()).then(|| self.additional_guests.remove(index))
    }

    pub fn set_guest_name(&mut self, index: usize, name: impl Into<String>) -> bool {
        match self.additional_guests.get_mut(index) {
            Some(slot) => {
                *slot = name.into();
                true
            }
            None => false,
        }
    }

    pub fn additional_guests(&self) -> &[String] {
        &self.additional_guests
    }

    pub fn toggle_service(&mut self, id: ServiceId, checked: bool) {
        self.services.toggle(id, checked);
    }

    pub fn set_service_quantity(&mut self, service: &HotelService, requested: u32) -> Option<u32> {
        let nights = self.nights();
        self.services.set_quantity(service, nights, requested)
    }

    pub fn max_quantity(&self, service: &HotelService) -> u32 {
        rules::max_quantity(service, self.nights())
    }

    pub fn services(&self) -> &ServiceSelection {
        &self.services
    }

    /// Price preview using whole nights, or `None` until a room and both
    /// dates are chosen.
    pub fn estimate_total(&self, rooms: &[Room], catalog: &[HotelService]) -> Option<f64> {
        let room = self.selected_room(rooms)?;
        let (check_in, check_out) = self.availability_window()?;
        Some(rules::estimate_total(
            room,
            billable_nights(check_in, check_out),
            &self.services,
            catalog,
        ))
    }

    /// Field-level checks run before any rule; returns the first message.
    pub fn validate_fields(&self) -> Result<(), String> {
        if let Err(errors) = self.profile.validate() {
            if let Some(message) = first_validation_message(&errors, &PROFILE_FIELDS) {
                return Err(message);
            }
        }
        if self.check_in.is_none() {
            return Err("Check-in date is required".to_string());
        }
        if self.check_out.is_none() {
            return Err("Check-out date is required".to_string());
        }
        if self.selected_room_id.is_none() {
            return Err("Please select a room".to_string());
        }
        if self.additional_guests.iter().any(|name| name.trim().is_empty()) {
            return Err("Guest name is required".to_string());
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        debug!("booking form reset");
        *self = Self::default();
    }
}
