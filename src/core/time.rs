use time::{format_description::well_known::Rfc3339, OffsetDateTime, PrimitiveDateTime};

/// All timestamps are stored as UTC wall-clock values without an offset.
pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

/// Whole minutes from `from` to `to`, truncated toward zero. Negative when
/// `to` precedes `from`.
pub(crate) fn whole_minutes_between(from: PrimitiveDateTime, to: PrimitiveDateTime) -> i64 {
    (to - from).whole_minutes()
}

/// Whole minutes elapsed, never negative.
pub(crate) fn elapsed_minutes(from: PrimitiveDateTime, to: PrimitiveDateTime) -> i64 {
    whole_minutes_between(from, to).max(0)
}
