// Occupancy and service-quantity rules shared by the create and update flows

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::{HotelService, PricingType, Room, ServiceId};

/// Ceiling for every service that is not billed per night.
pub const MAX_SERVICE_QUANTITY: u32 = 99;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("Check-out date must be after check-in date")]
    CheckOutNotAfterCheckIn,

    #[error("This room can accommodate a maximum of {max_occupancy} guests. You have {total_guests} guests.")]
    OccupancyExceeded {
        max_occupancy: u32,
        total_guests: u32,
    },

    #[error("Cannot order {requested} {service_name} - maximum is {max} (number of nights booked)")]
    QuantityExceeded {
        service_name: String,
        requested: u32,
        max: u32,
    },
}

pub fn check_stay_order(
    check_in: NaiveDateTime,
    check_out: NaiveDateTime,
) -> Result<(), RuleViolation> {
    if check_out <= check_in {
        return Err(RuleViolation::CheckOutNotAfterCheckIn);
    }
    Ok(())
}

pub fn total_guests(additional_guests: usize) -> u32 {
    1 + u32::try_from(additional_guests).unwrap_or(u32::MAX - 1)
}

/// Guest cap for the selected room. Without a room (or with a room that
/// reports no capacity) only the primary guest fits.
pub fn occupancy_limit(room: Option<&Room>) -> u32 {
    room.map(|r| r.max_occupancy).filter(|&max| max > 0).unwrap_or(1)
}

pub fn can_add_guest(room: Option<&Room>, additional_guests: usize) -> bool {
    total_guests(additional_guests) < occupancy_limit(room)
}

pub fn check_occupancy(room: Option<&Room>, additional_guests: usize) -> Result<(), RuleViolation> {
    let max_occupancy = occupancy_limit(room);
    let total_guests = total_guests(additional_guests);
    if total_guests > max_occupancy {
        return Err(RuleViolation::OccupancyExceeded {
            max_occupancy,
            total_guests,
        });
    }
    Ok(())
}

pub fn max_quantity(service: &HotelService, nights: u32) -> u32 {
    match service.pricing_type {
        PricingType::PerNight => nights,
        PricingType::PerOrder | PricingType::PerHour => MAX_SERVICE_QUANTITY,
    }
}

/// Quantity the input is allowed to hold: never below one, never above the
/// service's ceiling.
pub fn clamp_quantity(service: &HotelService, nights: u32, requested: u32) -> u32 {
    requested.min(max_quantity(service, nights)).max(1)
}

/// Re-checks every per-night service in the catalog against the stay length.
pub fn check_per_night_quantities(
    catalog: &[HotelService],
    quantities: &BTreeMap<ServiceId, u32>,
    nights: u32,
) -> Result<(), RuleViolation> {
    for service in catalog
        .iter()
        .filter(|s| s.pricing_type == PricingType::PerNight)
    {
        let requested = quantities.get(&service.id).copied().unwrap_or(0);
        if requested > nights {
            return Err(RuleViolation::QuantityExceeded {
                service_name: service.name.clone(),
                requested,
                max: nights,
            });
        }
    }
    Ok(())
}

/// Services picked on the form together with their quantities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceSelection {
    ids: Vec<ServiceId>,
    quantities: BTreeMap<ServiceId, u32>,
}

impl ServiceSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, id: ServiceId) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
        self.quantities.insert(id, 1);
    }

    pub fn deselect(&mut self, id: ServiceId) {
        self.ids.retain(|&selected| selected != id);
        self.quantities.remove(&id);
    }

    pub fn toggle(&mut self, id: ServiceId, checked: bool) {
        if checked {
            self.select(id);
        } else {
            self.deselect(id);
        }
    }

    /// Stores the clamped quantity and returns it, or `None` when the
    /// service is not selected.
    pub fn set_quantity(&mut self, service: &HotelService, nights: u32, requested: u32) -> Option<u32> {
        if !self.is_selected(service.id) {
            return None;
        }
        let quantity = clamp_quantity(service, nights, requested);
        self.quantities.insert(service.id, quantity);
        Some(quantity)
    }

    pub fn is_selected(&self, id: ServiceId) -> bool {
        self.ids.contains(&id)
    }

    pub fn quantity(&self, id: ServiceId) -> Option<u32> {
        self.quantities.get(&id).copied()
    }

    pub fn ids(&self) -> &[ServiceId] {
        &self.ids
    }

    pub fn quantities(&self) -> &BTreeMap<ServiceId, u32> {
        &self.quantities
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.quantities.clear();
    }

    // Quantities arrive as-is from a stored booking; ids without a quantity default to 1
    pub(crate) fn restore(ids: Vec<ServiceId>, mut quantities: BTreeMap<ServiceId, u32>) -> Self {
        let mut unique = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        quantities.retain(|id, _| unique.contains(id));
        for id in &unique {
            quantities.entry(*id).or_insert(1);
        }
        Self {
            ids: unique,
            quantities,
        }
    }
}

/// Price preview using the backend's billing rule: room rate per whole night
/// plus each selected service times its quantity.
pub fn estimate_total(
    room: &Room,
    billable_nights: u32,
    selection: &ServiceSelection,
    catalog: &[HotelService],
) -> f64 {
    let room_total = room.price_per_night * f64::from(billable_nights);
    let services_total: f64 = catalog
        .iter()
        .filter(|service| selection.is_selected(service.id))
        .map(|service| service.price * f64::from(selection.quantity(service.id).unwrap_or(1)))
        .sum();
    room_total + services_total
}
