// Validates a booking form and hands it to the backend

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::api::{ApiError, HotelApi};
use crate::availability::RoomAvailability;
use crate::booking_form::{first_validation_message, BookingForm};
use crate::config::ClientConfig;
use crate::models::{
    Booking, BookingConfirmation, BookingRequest, Complaint, ComplaintRequest, ContactUsMessage,
    ContactUsRequest, HotelService, Room,
};
use crate::rules::{self, RuleViolation};
use crate::stay::to_wire_timestamp;

pub const CREATE_FALLBACK: &str = "Error creating apply booking";
pub const UPDATE_FALLBACK: &str = "Error updating booking";
pub const LOAD_FALLBACK: &str = "Error loading booking";
pub const CANCEL_FALLBACK: &str = "Error cancelling booking";
pub const COMPLAINT_FALLBACK: &str = "Error submitting complaint";
pub const CONTACT_FALLBACK: &str = "Error sending message";

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Booking reference is missing. Cannot update booking.")]
    MissingReference,

    #[error("Booking reference is invalid. Cannot update booking.")]
    InvalidReference,

    #[error("{0}")]
    InvalidForm(String),

    #[error(transparent)]
    Rule(#[from] RuleViolation),

    #[error("{message}")]
    Rejected { message: String, source: ApiError },
}

impl SubmissionError {
    // Backend message when there is one, the flow's fallback otherwise
    fn rejected(source: ApiError, fallback: &str) -> Self {
        let message = source
            .backend_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string());
        warn!(error = %source, %message, "backend rejected the request");
        SubmissionError::Rejected { message, source }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingFlow {
    Create,
    Update {
        reference: Option<String>,
        // Account the booking belongs to, as loaded
        guest_email: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submitted {
    pub confirmation: BookingConfirmation,
    pub notice: &'static str,
    pub redirect: String,
}

/// A booking loaded for editing.
#[derive(Debug, Clone, PartialEq)]
pub struct ExistingBooking {
    pub reference: String,
    pub form: BookingForm,
    pub current_room: Room,
    pub booking: Booking,
}

fn check_reference(reference: Option<&str>) -> Result<&str, SubmissionError> {
    match reference {
        None => Err(SubmissionError::MissingReference),
        Some(r) if r.trim().is_empty() => Err(SubmissionError::InvalidReference),
        Some(r) => Ok(r.trim()),
    }
}

pub struct BookingSubmitter<A: HotelApi + ?Sized> {
    api: Arc<A>,
    flow: BookingFlow,
    availability: Option<Arc<RoomAvailability>>,
    timestamp_offset_hours: i64,
    state: SubmissionState,
}

impl<A: HotelApi + ?Sized> BookingSubmitter<A> {
    pub fn new_booking(api: Arc<A>, config: &ClientConfig) -> Self {
        Self::with_flow(api, config, BookingFlow::Create)
    }

    pub fn update_booking(api: Arc<A>, config: &ClientConfig, reference: Option<String>) -> Self {
        Self::with_flow(
            api,
            config,
            BookingFlow::Update {
                reference,
                guest_email: None,
            },
        )
    }

    /// Update flow for a loaded booking; the redirect goes to its owner's page.
    pub fn for_existing(api: Arc<A>, config: &ClientConfig, existing: &ExistingBooking) -> Self {
        Self::with_flow(
            api,
            config,
            BookingFlow::Update {
                reference: Some(existing.reference.clone()),
                guest_email: Some(existing.booking.guest.email.clone())
                    .filter(|email| !email.trim().is_empty()),
            },
        )
    }

    fn with_flow(api: Arc<A>, config: &ClientConfig, flow: BookingFlow) -> Self {
        Self {
            api,
            flow,
            availability: None,
            timestamp_offset_hours: config.timestamp_offset_hours,
            state: SubmissionState::Idle,
        }
    }

    /// Cache to invalidate once a booking goes through.
    pub fn with_availability(mut self, availability: Arc<RoomAvailability>) -> Self {
        self.availability = Some(availability);
        self
    }

    pub fn flow(&self) -> &BookingFlow {
        &self.flow
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self.state,
            SubmissionState::Validating | SubmissionState::Submitting
        )
    }

    /// Runs every local check and builds the request body. Nothing is sent.
    pub fn prepare(
        &self,
        form: &BookingForm,
        rooms: &[Room],
        catalog: &[HotelService],
    ) -> Result<BookingRequest, SubmissionError> {
        if let BookingFlow::Update { reference, .. } = &self.flow {
            check_reference(reference.as_deref())?;
        }

        form.validate_fields().map_err(SubmissionError::InvalidForm)?;
        let (Some(check_in), Some(check_out)) = (form.check_in(), form.check_out()) else {
            return Err(SubmissionError::InvalidForm(
                "Check-in date is required".to_string(),
            ));
        };

        rules::check_stay_order(check_in, check_out)?;
        rules::check_occupancy(form.selected_room(rooms), form.additional_guests().len())?;
        rules::check_per_night_quantities(catalog, form.services().quantities(), form.nights())?;

        let room_id = form
            .selected_room_id()
            .ok_or_else(|| SubmissionError::InvalidForm("Please select a room".to_string()))?;
        let profile = &form.profile;
        let offset = self.timestamp_offset_hours;
        let (Some(check_in_date_time), Some(check_out_date_time)) = (
            to_wire_timestamp(check_in, offset),
            to_wire_timestamp(check_out, offset),
        ) else {
            return Err(SubmissionError::InvalidForm(format!(
                "Invalid timestamp offset of {offset} hours"
            )));
        };

        Ok(BookingRequest {
            full_name: profile.full_name.clone(),
            additional_guest_names: form.additional_guests().to_vec(),
            email: profile.email.clone(),
            password: profile.password.clone(),
            phone_number: profile.phone_number.clone(),
            country: profile.country.clone(),
            address: profile.address.clone(),
            city: profile.city.clone(),
            check_in_date_time,
            check_out_date_time,
            room_id,
            hotel_service_ids: form.services().ids().to_vec(),
            service_quantities: form.services().quantities().clone(),
        })
    }

    /// Validates, sends, and on success clears the form.
    pub async fn submit(
        &mut self,
        form: &mut BookingForm,
        rooms: &[Room],
        catalog: &[HotelService],
    ) -> Result<Submitted, SubmissionError> {
        self.state = SubmissionState::Validating;
        let request = match self.prepare(form, rooms, catalog) {
            Ok(request) => request,
            Err(e) => return Err(self.fail(e)),
        };

        self.state = SubmissionState::Submitting;
        let email = request.email.clone();
        let confirmation = match self.send(request).await {
            Ok(confirmation) => confirmation,
            Err(e) => return Err(self.fail(e)),
        };

        form.reset();
        if let Some(availability) = &self.availability {
            availability.invalidate();
        }
        self.state = SubmissionState::Succeeded;

        let (notice, redirect) = match &self.flow {
            BookingFlow::Create => ("You booked a room!", "/".to_string()),
            BookingFlow::Update { guest_email, .. } => {
                let owner = guest_email.as_deref().unwrap_or(&email);
                ("Booking updated successfully!", format!("/guest/{owner}"))
            }
        };
        info!(reference = %confirmation.booking_reference, "booking saved");
        Ok(Submitted {
            confirmation,
            notice,
            redirect,
        })
    }

    async fn send(&self, request: BookingRequest) -> Result<BookingConfirmation, SubmissionError> {
        match &self.flow {
            BookingFlow::Create => {
                debug!(room_id = request.room_id, "applying booking");
                self.api
                    .apply_booking(request)
                    .await
                    .map_err(|e| SubmissionError::rejected(e, CREATE_FALLBACK))
            }
            BookingFlow::Update { reference, .. } => {
                let reference = check_reference(reference.as_deref())?;
                debug!(%reference, "updating booking");
                self.api
                    .update_booking(reference, request)
                    .await
                    .map_err(|e| SubmissionError::rejected(e, UPDATE_FALLBACK))
            }
        }
    }

    fn fail(&mut self, error: SubmissionError) -> SubmissionError {
        debug!(%error, "submission failed");
        self.state = SubmissionState::Failed(error.to_string());
        error
    }
}

/// Fetches both views of a booking at once and seeds an edit form from them.
/// Only the entity view is required; the stored record just fills in guest
/// names and quantities when it loads.
pub async fn load_existing_booking<A: HotelApi + ?Sized>(
    api: &A,
    reference: Option<&str>,
) -> Result<ExistingBooking, SubmissionError> {
    let reference = check_reference(reference)?;

    let (booking, record) =
        futures::join!(api.booking_entity(reference), api.booking_record(reference));
    let booking = booking.map_err(|e| SubmissionError::rejected(e, LOAD_FALLBACK))?;
    let record = match record {
        Ok(record) => Some(record),
        Err(error) => {
            warn!(%reference, %error, "stored booking record unavailable");
            None
        }
    };

    Ok(ExistingBooking {
        reference: reference.to_string(),
        form: BookingForm::from_existing(&booking, record.as_ref()),
        current_room: booking.room.clone(),
        booking,
    })
}

pub async fn cancel_booking<A: HotelApi + ?Sized>(
    api: &A,
    availability: Option<&RoomAvailability>,
    reference: Option<&str>,
) -> Result<(), SubmissionError> {
    let reference = check_reference(reference)?;
    api.cancel_booking(reference)
        .await
        .map_err(|e| SubmissionError::rejected(e, CANCEL_FALLBACK))?;

    if let Some(availability) = availability {
        availability.invalidate();
    }
    info!(%reference, "booking cancelled");
    Ok(())
}

pub async fn submit_complaint<A: HotelApi + ?Sized>(
    api: &A,
    request: ComplaintRequest,
) -> Result<Complaint, SubmissionError> {
    if let Err(errors) = request.validate() {
        let message = first_validation_message(&errors, &["guest_email", "title", "message"])
            .unwrap_or_else(|| COMPLAINT_FALLBACK.to_string());
        return Err(SubmissionError::InvalidForm(message));
    }

    api.create_complaint(request)
        .await
        .map_err(|e| SubmissionError::rejected(e, COMPLAINT_FALLBACK))
}

pub async fn send_contact_message<A: HotelApi + ?Sized>(
    api: &A,
    request: ContactUsRequest,
) -> Result<ContactUsMessage, SubmissionError> {
    if let Err(errors) = request.validate() {
        let message = first_validation_message(
            &errors,
            &["first_name", "last_name", "email", "subject", "message"],
        )
        .unwrap_or_else(|| CONTACT_FALLBACK.to_string());
        return Err(SubmissionError::InvalidForm(message));
    }

    api.contact_us(request)
        .await
        .map_err(|e| SubmissionError::rejected(e, CONTACT_FALLBACK))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock_server::{catalog, MockHotelApi, BREAKFAST, TRANSFER};
    use crate::availability::AvailabilityLookup;
    use crate::booking_form::GuestProfile;
    use crate::models::RoomType;
    use crate::stay::parse_form_datetime;
    use std::collections::BTreeMap;
    use std::time::Duration;
    use test_case::test_case;

    fn rooms() -> Vec<Room> {
        vec![
            Room::of_type(1, "101", RoomType::Single),
            Room::of_type(2, "102", RoomType::Double),
            Room::of_type(3, "201", RoomType::Suite),
        ]
    }

    fn hotel() -> Arc<MockHotelApi> {
        Arc::new(MockHotelApi::new().with_rooms(rooms()).with_services(catalog()))
    }

    fn form(check_in: &str, check_out: &str, room_id: i64) -> BookingForm {
        let mut form = BookingForm::new();
        form.profile = GuestProfile {
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret1".to_string(),
            phone_number: "5550001111".to_string(),
            country: "UK".to_string(),
            address: "12 St James Square".to_string(),
            city: "London".to_string(),
        };
        form.set_check_in(parse_form_datetime(check_in));
        form.set_check_out(parse_form_datetime(check_out));
        form.select_room(Some(room_id));
        form
    }

    #[tokio::test]
    async fn test_double_room_two_nights_with_breakfast() {
        let api = hotel();
        let availability = Arc::new(RoomAvailability::new(Duration::from_secs(30)));
        let mut submitter = BookingSubmitter::new_booking(Arc::clone(&api), &ClientConfig::default())
            .with_availability(Arc::clone(&availability));
        let catalog = catalog();

        let mut form = form("2024-01-01T14:00", "2024-01-03T14:00", 2);
        let lookup = availability
            .fetch(api.as_ref(), form.check_in(), form.check_out())
            .await
            .unwrap();
        assert!(matches!(lookup, AvailabilityLookup::Ready(_)));

        form.toggle_service(BREAKFAST, true);
        assert_eq!(form.set_service_quantity(&catalog[0], 2), Some(2));

        let submitted = submitter.submit(&mut form, &rooms(), &catalog).await.unwrap();
        assert_eq!(submitted.notice, "You booked a room!");
        assert_eq!(submitted.redirect, "/");
        assert!(submitted.confirmation.booking_reference.starts_with("BK"));
        assert_eq!(submitted.confirmation.booking_reference.len(), 8);
        assert_eq!(submitted.confirmation.total_price, 320.0);
        assert_eq!(submitter.state(), &SubmissionState::Succeeded);

        let sent = api.last_booking_request().unwrap();
        assert_eq!(sent.service_quantities, BTreeMap::from([(BREAKFAST, 2)]));
        assert_eq!(sent.hotel_service_ids, vec![BREAKFAST]);
        assert!(sent.additional_guest_names.is_empty());
        assert_eq!(sent.check_in_date_time, "2024-01-01T17:00:00.000Z");
        assert_eq!(sent.check_out_date_time, "2024-01-03T17:00:00.000Z");
        assert_eq!(sent.room_id, 2);

        // form cleared, cache dropped
        assert_eq!(form, BookingForm::default());
        assert_eq!(availability.stats().items_count, 0);
    }

    #[tokio::test]
    async fn test_reversed_dates_never_reach_backend() {
        let api = hotel();
        let mut submitter = BookingSubmitter::new_booking(Arc::clone(&api), &ClientConfig::default());
        let mut form = form("2024-01-03T14:00", "2024-01-01T14:00", 2);

        let err = submitter.submit(&mut form, &rooms(), &catalog()).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Rule(RuleViolation::CheckOutNotAfterCheckIn)));
        assert_eq!(err.to_string(), "Check-out date must be after check-in date");
        assert_eq!(
            submitter.state(),
            &SubmissionState::Failed("Check-out date must be after check-in date".to_string())
        );
        assert_eq!(api.booking_calls(), 0);
        assert_eq!(form.selected_room_id(), Some(2));
    }

    #[tokio::test]
    async fn test_occupancy_checked_before_quantities() {
        let api = hotel();
        let mut submitter = BookingSubmitter::new_booking(Arc::clone(&api), &ClientConfig::default());
        let catalog = catalog();
        let mut form = form("2024-01-01T14:00", "2024-01-03T14:00", 3);
        form.add_guest(&rooms()).unwrap();
        form.set_guest_name(0, "Charles Babbage");
        form.toggle_service(BREAKFAST, true);
        form.set_service_quantity(&catalog[0], 2);

        // switch to a single room after the guest was added
        form.select_room(Some(1));
        let err = submitter.submit(&mut form, &rooms(), &catalog).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "This room can accommodate a maximum of 1 guests. You have 2 guests."
        );
        assert_eq!(api.booking_calls(), 0);
    }

    #[test]
    fn test_per_night_quantity_rechecked_after_dates_shrink() {
        let api = hotel();
        let submitter = BookingSubmitter::new_booking(Arc::clone(&api), &ClientConfig::default());
        let catalog = catalog();
        let mut form = form("2024-01-01T14:00", "2024-01-04T14:00", 2);
        form.toggle_service(BREAKFAST, true);
        assert_eq!(form.set_service_quantity(&catalog[0], 3), Some(3));

        form.set_check_out(parse_form_datetime("2024-01-02T14:00"));
        form.select_room(Some(2));
        let err = submitter.prepare(&form, &rooms(), &catalog).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot order 3 Breakfast - maximum is 1 (number of nights booked)"
        );
    }

    #[tokio::test]
    async fn test_schema_errors_come_first() {
        let api = hotel();
        let mut submitter = BookingSubmitter::new_booking(Arc::clone(&api), &ClientConfig::default());
        let mut form = form("2024-01-03T14:00", "2024-01-01T14:00", 2);
        form.profile.password = "123".to_string();

        let err = submitter.submit(&mut form, &rooms(), &catalog()).await.unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 6 characters");
        assert!(matches!(err, SubmissionError::InvalidForm(_)));
        assert!(!submitter.is_busy());
    }

    #[test_case(Some("Room is not available for the selected dates"), "Room is not available for the selected dates"; "backend message verbatim")]
    #[test_case(None, "Error creating apply booking"; "fallback without message")]
    #[tokio::test]
    async fn test_create_rejection_message(backend: Option<&str>, expected: &str) {
        let api = hotel();
        api.fail_next_request(409, backend);
        let mut submitter = BookingSubmitter::new_booking(Arc::clone(&api), &ClientConfig::default());
        let mut form = form("2024-01-01T14:00", "2024-01-03T14:00", 2);

        let err = submitter.submit(&mut form, &rooms(), &catalog()).await.unwrap_err();
        assert_eq!(err.to_string(), expected);
        assert_eq!(submitter.state(), &SubmissionState::Failed(expected.to_string()));
        assert_eq!(api.booking_calls(), 1);
        // the guest keeps what they typed
        assert_eq!(form.selected_room_id(), Some(2));
    }

    #[test_case(None, "Booking reference is missing. Cannot update booking."; "missing")]
    #[test_case(Some("  "), "Booking reference is invalid. Cannot update booking."; "blank")]
    #[tokio::test]
    async fn test_update_requires_reference(reference: Option<&str>, expected: &str) {
        let api = hotel();
        let mut submitter = BookingSubmitter::update_booking(
            Arc::clone(&api),
            &ClientConfig::default(),
            reference.map(str::to_string),
        );
        let mut form = form("2024-01-03T14:00", "2024-01-01T14:00", 2);

        let err = submitter.submit(&mut form, &rooms(), &catalog()).await.unwrap_err();
        assert_eq!(err.to_string(), expected);
        assert_eq!(api.request_count(), 0);
    }

    #[tokio::test]
    async fn test_load_then_update_existing_booking() {
        let api = hotel();
        let config = ClientConfig::default();
        let catalog = catalog();

        let mut create = BookingSubmitter::new_booking(Arc::clone(&api), &config);
        let mut form = form("2024-01-01T14:00", "2024-01-03T14:00", 2);
        form.toggle_service(TRANSFER, true);
        let created = create.submit(&mut form, &rooms(), &catalog).await.unwrap();
        let reference = created.confirmation.booking_reference;

        let existing = load_existing_booking(api.as_ref(), Some(&reference)).await.unwrap();
        assert_eq!(existing.reference, reference);
        assert_eq!(existing.current_room.id, 2);
        assert_eq!(existing.form.services().ids(), &[TRANSFER]);
        assert_eq!(existing.form.profile.email, "ada@example.com");

        let mut form = existing.form;
        form.profile.password = "secret1".to_string();
        form.add_guest(&rooms()).unwrap();
        form.set_guest_name(0, "Charles Babbage");

        let mut update = BookingSubmitter::update_booking(Arc::clone(&api), &config, Some(reference.clone()));
        let updated = update.submit(&mut form, &rooms(), &catalog).await.unwrap();
        assert_eq!(updated.notice, "Booking updated successfully!");
        assert_eq!(updated.redirect, "/guest/ada@example.com");
        assert_eq!(updated.confirmation.booking_reference, reference);
        assert_eq!(updated.confirmation.additional_guest_names, vec!["Charles Babbage".to_string()]);
        assert_eq!(api.booking(&reference).unwrap().guest_count(), 2);
    }

    #[tokio::test]
    async fn test_update_redirects_to_booking_owner() {
        let api = hotel();
        let config = ClientConfig::default();
        let mut create = BookingSubmitter::new_booking(Arc::clone(&api), &config);
        let mut form = form("2024-01-01T14:00", "2024-01-03T14:00", 2);
        let reference = create
            .submit(&mut form, &rooms(), &catalog())
            .await
            .unwrap()
            .confirmation
            .booking_reference;

        let existing = load_existing_booking(api.as_ref(), Some(&reference)).await.unwrap();
        let mut update = BookingSubmitter::for_existing(Arc::clone(&api), &config, &existing);
        assert_eq!(
            update.flow(),
            &BookingFlow::Update {
                reference: Some(reference.clone()),
                guest_email: Some("ada@example.com".to_string()),
            }
        );

        let mut form = existing.form;
        form.profile.password = "secret1".to_string();
        form.profile.email = "ada.lovelace@example.org".to_string();
        let updated = update.submit(&mut form, &rooms(), &catalog()).await.unwrap();
        assert_eq!(updated.redirect, "/guest/ada@example.com");
        assert_eq!(
            api.last_booking_request().unwrap().email,
            "ada.lovelace@example.org"
        );
    }

    #[tokio::test]
    async fn test_load_survives_missing_stored_record() {
        let api = hotel();
        let mut create = BookingSubmitter::new_booking(Arc::clone(&api), &ClientConfig::default());
        let mut form = form("2024-01-01T14:00", "2024-01-03T14:00", 2);
        form.add_guest(&rooms()).unwrap();
        form.set_guest_name(0, "Charles Babbage");
        let reference = create
            .submit(&mut form, &rooms(), &catalog())
            .await
            .unwrap()
            .confirmation
            .booking_reference;

        api.fail_next_record();
        let existing = load_existing_booking(api.as_ref(), Some(&reference)).await.unwrap();
        assert_eq!(existing.current_room.id, 2);
        // the entity view still carries the guest names
        assert_eq!(existing.form.additional_guests(), &["Charles Babbage".to_string()]);
        assert_eq!(existing.form.profile.email, "ada@example.com");
    }

    #[test_case(i64::MAX; "overflowing offset")]
    #[test_case(24 * 365 * 300_000; "offset past the calendar")]
    #[tokio::test]
    async fn test_unrepresentable_offset_is_rejected(offset_hours: i64) {
        let api = hotel();
        let config = ClientConfig {
            timestamp_offset_hours: offset_hours,
            ..ClientConfig::default()
        };
        let mut submitter = BookingSubmitter::new_booking(Arc::clone(&api), &config);
        let mut form = form("2024-01-01T14:00", "2024-01-03T14:00", 2);

        let err = submitter.submit(&mut form, &rooms(), &catalog()).await.unwrap_err();
        assert!(matches!(err, SubmissionError::InvalidForm(_)));
        assert!(err.to_string().starts_with("Invalid timestamp offset"));
        assert_eq!(api.booking_calls(), 0);
        assert_eq!(form.selected_room_id(), Some(2));
    }

    #[tokio::test]
    async fn test_update_unknown_reference_uses_backend_message() {
        let api = hotel();
        let mut submitter = BookingSubmitter::update_booking(
            Arc::clone(&api),
            &ClientConfig::default(),
            Some("BK000000".to_string()),
        );
        let mut form = form("2024-01-01T14:00", "2024-01-03T14:00", 2);

        let err = submitter.submit(&mut form, &rooms(), &catalog()).await.unwrap_err();
        assert_eq!(err.to_string(), "Booking not found with reference: BK000000");
        assert!(matches!(err, SubmissionError::Rejected { source: ApiError::ApiResponseError { status_code: 404, .. }, .. }));
    }

    #[tokio::test]
    async fn test_load_existing_booking_fails_without_reference() {
        let api = hotel();
        let err = load_existing_booking(api.as_ref(), None).await.unwrap_err();
        assert!(matches!(err, SubmissionError::MissingReference));

        let err = load_existing_booking(api.as_ref(), Some("BK999999")).await.unwrap_err();
        assert_eq!(err.to_string(), "Booking not found with reference: BK999999");
    }

    #[tokio::test]
    async fn test_cancel_frees_room_and_invalidates() {
        let api = hotel();
        let availability = RoomAvailability::new(Duration::from_secs(30));
        let mut submitter = BookingSubmitter::new_booking(Arc::clone(&api), &ClientConfig::default());
        let mut form = form("2024-01-01T14:00", "2024-01-03T14:00", 2);
        let (check_in, check_out) = (form.check_in(), form.check_out());
        let reference = submitter
            .submit(&mut form, &rooms(), &catalog())
            .await
            .unwrap()
            .confirmation
            .booking_reference;

        availability.fetch(api.as_ref(), check_in, check_out).await.unwrap();
        cancel_booking(api.as_ref(), Some(&availability), Some(&reference))
            .await
            .unwrap();
        assert_eq!(availability.stats().items_count, 0);
        assert!(api.booking(&reference).is_none());

        api.fail_next_request(500, None);
        let err = cancel_booking(api.as_ref(), None, Some("BK123456")).await.unwrap_err();
        assert_eq!(err.to_string(), "Error cancelling booking");
    }

    #[tokio::test]
    async fn test_complaint_validated_before_sending() {
        let api = hotel();
        let err = submit_complaint(
            api.as_ref(),
            ComplaintRequest {
                guest_email: "ada".to_string(),
                title: "Noise".to_string(),
                message: "Loud music at night".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Guest Email should be valid");
        assert_eq!(api.request_count(), 0);

        let sent = send_contact_message(
            api.as_ref(),
            ContactUsRequest {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                subject: "Parking".to_string(),
                message: "Is there parking on site?".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(sent.subject, "Parking");
    }
}
