// Stay duration and timestamp normalization

use chrono::{Duration, NaiveDate, NaiveDateTime};

pub const MILLIS_PER_DAY: i64 = 86_400_000;

const FORM_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];
const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
const QUERY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Nights stayed between two instants: any started day counts as a full
/// night, the order of the arguments does not matter, and a missing date
/// yields zero.
pub fn nights_between(check_in: Option<NaiveDateTime>, check_out: Option<NaiveDateTime>) -> u32 {
    let (Some(check_in), Some(check_out)) = (check_in, check_out) else {
        return 0;
    };

    let millis = (check_out - check_in).num_milliseconds().unsigned_abs();
    let day = MILLIS_PER_DAY as u64;
    let nights = millis / day + u64::from(millis % day != 0);
    u32::try_from(nights).unwrap_or(u32::MAX)
}

// Whole elapsed days, as the backend bills the room
pub fn billable_nights(check_in: NaiveDateTime, check_out: NaiveDateTime) -> u32 {
    u32::try_from((check_out - check_in).num_days().max(0)).unwrap_or(u32::MAX)
}

/// True once both dates are set and check-out falls after check-in.
pub fn is_ordered(check_in: Option<NaiveDateTime>, check_out: Option<NaiveDateTime>) -> bool {
    matches!((check_in, check_out), (Some(check_in), Some(check_out)) if check_out > check_in)
}

/// Parses what a `datetime-local` or date input produces. Blank or
/// malformed input counts as "not set".
pub fn parse_form_datetime(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    FORM_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Shifts a form timestamp by `offset_hours` and renders it the way the
/// booking endpoints expect it. `None` when the shift leaves chrono's range.
pub fn to_wire_timestamp(value: NaiveDateTime, offset_hours: i64) -> Option<String> {
    let shift = Duration::try_hours(offset_hours)?;
    value
        .checked_add_signed(shift)
        .map(|shifted| shifted.format(WIRE_FORMAT).to_string())
}

pub fn to_query_timestamp(value: NaiveDateTime) -> String {
    value.format(QUERY_FORMAT).to_string()
}
