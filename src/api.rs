// Backend client for the public booking funnel and staff/guest login

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use parking_lot::Mutex;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::models::{
    Booking, BookingConfirmation, BookingEntity, BookingRequest, Complaint, ComplaintRequest,
    ContactUsMessage, ContactUsRequest, GuestLogin, HotelService, LoginRequest, Room, StaffLogin,
};
use crate::session::Session;
use crate::stay::to_query_timestamp;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error: {status_code} - {}", .message.as_deref().unwrap_or("no message"))]
    ApiResponseError {
        status_code: u16,
        message: Option<String>,
    },

    #[error("Unauthorized: {}", .message.as_deref().unwrap_or("no message"))]
    Unauthorized { message: Option<String> },

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Client error: {0}")]
    ClientError(String),
}

impl ApiError {
    /// The message the backend put in its error body, if it sent one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::ApiResponseError { message, .. } | ApiError::Unauthorized { message } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::ApiResponseError { status_code, .. } => Some(*status_code),
            ApiError::Unauthorized { .. } => Some(401),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClientStats {
    pub requests_sent: usize,
    pub requests_succeeded: usize,
    pub requests_failed: usize,
    pub unauthorized_responses: usize,
    pub average_response_time_ms: f64,
    pub max_response_time_ms: f64,
}

// Everything the booking funnel needs from the backend
#[async_trait]
pub trait HotelApi: Send + Sync + 'static {
    // Rooms without a reservation overlapping the range
    async fn available_rooms(
        &self,
        check_in: NaiveDateTime,
        check_out: NaiveDateTime,
    ) -> Result<Vec<Room>, ApiError>;

    async fn rooms(&self) -> Result<Vec<Room>, ApiError>;

    // Service catalog with pricing types
    async fn services(&self) -> Result<Vec<HotelService>, ApiError>;

    // Creates the booking and the guest account in one call
    async fn apply_booking(&self, request: BookingRequest)
        -> Result<BookingConfirmation, ApiError>;

    async fn update_booking(
        &self,
        reference: &str,
        request: BookingRequest,
    ) -> Result<BookingConfirmation, ApiError>;

    async fn booking_entity(&self, reference: &str) -> Result<Booking, ApiError>;

    // Stored record behind the booking, additional guests included
    async fn booking_record(&self, reference: &str) -> Result<BookingEntity, ApiError>;

    async fn cancel_booking(&self, reference: &str) -> Result<(), ApiError>;

    async fn bookings_by_guest_email(&self, email: &str) -> Result<Vec<Booking>, ApiError>;

    async fn create_complaint(&self, request: ComplaintRequest) -> Result<Complaint, ApiError>;

    async fn contact_us(&self, request: ContactUsRequest) -> Result<ContactUsMessage, ApiError>;

    async fn login(&self, request: LoginRequest) -> Result<StaffLogin, ApiError>;

    async fn guest_login(&self, request: LoginRequest) -> Result<GuestLogin, ApiError>;

    fn stats(&self) -> ClientStats;
}

/// Pulls the human readable `message` out of a backend error body.
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

pub struct HttpHotelApi {
    http: reqwest::Client,
    config: ClientConfig,
    session: Arc<Session>,
    stats: Mutex<ClientStats>,
}

impl HttpHotelApi {
    pub fn new(config: ClientConfig, session: Arc<Session>) -> Result<Self, ApiError> {
        endpoint(&config.base_url, &[])?;
        endpoint(&config.auth_url, &[])?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::ClientError(e.to_string()))?;

        Ok(Self {
            http,
            config,
            session,
            stats: Mutex::new(ClientStats::default()),
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn hotel(&self, segments: &[&str]) -> Result<Url, ApiError> {
        endpoint(&self.config.base_url, segments)
    }

    fn auth(&self, segments: &[&str]) -> Result<Url, ApiError> {
        endpoint(&self.config.auth_url, segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "backend request");
        let builder = self.http.request(method, url);
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.dispatch(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::DecodeError(e.to_string()))
    }

    async fn dispatch(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let started = Instant::now();
        let outcome = match builder.send().await {
            Ok(response) => self.check_status(response).await,
            Err(e) => Err(ApiError::NetworkError(e.to_string())),
        };
        self.record(started, &outcome);
        outcome
    }

    async fn check_status(&self, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        if status == StatusCode::UNAUTHORIZED {
            warn!("backend rejected the credentials, ending session");
            self.session.logout();
            return Err(ApiError::Unauthorized { message });
        }

        warn!(status = status.as_u16(), ?message, "backend returned an error");
        Err(ApiError::ApiResponseError {
            status_code: status.as_u16(),
            message,
        })
    }

    fn record(&self, started: Instant, outcome: &Result<Response, ApiError>) {
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        let mut stats = self.stats.lock();
        stats.requests_sent += 1;
        match outcome {
            Ok(_) => stats.requests_succeeded += 1,
            Err(ApiError::Unauthorized { .. }) => {
                stats.requests_failed += 1;
                stats.unauthorized_responses += 1;
            }
            Err(_) => stats.requests_failed += 1,
        }
        let sent = stats.requests_sent as f64;
        stats.average_response_time_ms =
            (stats.average_response_time_ms * (sent - 1.0) + elapsed_ms) / sent;
        stats.max_response_time_ms = stats.max_response_time_ms.max(elapsed_ms);
    }
}

fn endpoint(base: &str, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = Url::parse(base)
        .map_err(|e| ApiError::ClientError(format!("invalid base url {base}: {e}")))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ApiError::ClientError(format!("base url {base} cannot take a path")))?;
        path.pop_if_empty().extend(segments);
    }
    Ok(url)
}

#[async_trait]
impl HotelApi for HttpHotelApi {
    async fn available_rooms(
        &self,
        check_in: NaiveDateTime,
        check_out: NaiveDateTime,
    ) -> Result<Vec<Room>, ApiError> {
        let url = self.hotel(&["rooms", "available"])?;
        let builder = self.request(Method::GET, url).query(&[
            ("checkIn", to_query_timestamp(check_in)),
            ("checkOut", to_query_timestamp(check_out)),
        ]);
        self.send(builder).await
    }

    async fn rooms(&self) -> Result<Vec<Room>, ApiError> {
        let url = self.hotel(&["rooms"])?;
        self.send(self.request(Method::GET, url)).await
    }

    async fn services(&self) -> Result<Vec<HotelService>, ApiError> {
        let url = self.hotel(&["services"])?;
        self.send(self.request(Method::GET, url)).await
    }

    async fn apply_booking(
        &self,
        request: BookingRequest,
    ) -> Result<BookingConfirmation, ApiError> {
        let url = self.hotel(&["apply-booking"])?;
        self.send(self.request(Method::POST, url).json(&request))
            .await
    }

    async fn update_booking(
        &self,
        reference: &str,
        request: BookingRequest,
    ) -> Result<BookingConfirmation, ApiError> {
        let url = self.hotel(&["update-booking", reference])?;
        self.send(self.request(Method::PUT, url).json(&request))
            .await
    }

    async fn booking_entity(&self, reference: &str) -> Result<Booking, ApiError> {
        let url = self.hotel(&["bookings", "entity", reference])?;
        self.send(self.request(Method::GET, url)).await
    }

    async fn booking_record(&self, reference: &str) -> Result<BookingEntity, ApiError> {
        let url = self.hotel(&["bookings", "response-entity", reference])?;
        self.send(self.request(Method::GET, url)).await
    }

    async fn cancel_booking(&self, reference: &str) -> Result<(), ApiError> {
        let url = self.hotel(&["bookings", "reference", reference])?;
        self.dispatch(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn bookings_by_guest_email(&self, email: &str) -> Result<Vec<Booking>, ApiError> {
        let url = self.hotel(&["bookings", "guest", email])?;
        self.send(self.request(Method::GET, url)).await
    }

    async fn create_complaint(&self, request: ComplaintRequest) -> Result<Complaint, ApiError> {
        let url = self.hotel(&["complaints"])?;
        self.send(self.request(Method::POST, url).json(&request))
            .await
    }

    async fn contact_us(&self, request: ContactUsRequest) -> Result<ContactUsMessage, ApiError> {
        let url = self.hotel(&["contact-us"])?;
        self.send(self.request(Method::POST, url).json(&request))
            .await
    }

    async fn login(&self, request: LoginRequest) -> Result<StaffLogin, ApiError> {
        let url = self.auth(&["login"])?;
        let login: StaffLogin = self
            .send(self.request(Method::POST, url).json(&request))
            .await?;
        self.session.login_staff(login.clone());
        Ok(login)
    }

    async fn guest_login(&self, request: LoginRequest) -> Result<GuestLogin, ApiError> {
        let url = self.auth(&["guestlogin"])?;
        let login: GuestLogin = self
            .send(self.request(Method::POST, url).json(&request))
            .await?;
        self.session.login_guest(login.clone());
        Ok(login)
    }

    fn stats(&self) -> ClientStats {
        self.stats.lock().clone()
    }
}
