//! Conversion of recorded wall-clock times to UTC instants.
//!
//! Recordings carry no zone information. Every timeline value is read as a
//! wall-clock time in the zone of the machine doing the processing, and the
//! UTC offset in effect at that instant is subtracted. Results are only
//! correct when the recording was made in the same zone as the processing
//! machine; tests and callers that know the zone pass an explicit
//! [`FixedOffset`] instead of [`HostLocal`].
//!
//! Daylight-saving edges:
//!
//! - an ambiguous wall-clock time (clocks set back) resolves to the earliest
//!   instant, i.e. the offset before the change;
//! - a wall-clock time inside a gap (clocks set forward) uses the offset in
//!   effect before the transition.

use chrono::{
    DateTime, FixedOffset, Local, MappedLocalTime, NaiveDateTime, TimeDelta, TimeZone, Utc,
};

use crate::error::TimestampError;

/// How far back to look for the pre-transition offset of a gap.
const GAP_SEARCH_HOURS: i64 = 24;

/// Source of UTC offsets for wall-clock times.
pub trait LocalOffset {
    /// All offsets the wall-clock time `local` may carry.
    fn local_offsets(&self, local: &NaiveDateTime) -> MappedLocalTime<FixedOffset>;

    /// Offset in effect at the UTC instant `utc`.
    fn utc_offset(&self, utc: &NaiveDateTime) -> FixedOffset;

    /// The single offset used to normalize `local`.
    fn offset_at_local(&self, local: &NaiveDateTime) -> Result<FixedOffset, TimestampError> {
        match self.local_offsets(local) {
            MappedLocalTime::Single(offset) => Ok(offset),
            MappedLocalTime::Ambiguous(earliest, _) => Ok(earliest),
            MappedLocalTime::None => (1..=GAP_SEARCH_HOURS)
                .filter_map(|hours| local.checked_sub_signed(TimeDelta::hours(hours)))
                .find_map(|before| match self.local_offsets(&before) {
                    MappedLocalTime::Single(offset) => Some(offset),
                    MappedLocalTime::Ambiguous(_, latest) => Some(latest),
                    MappedLocalTime::None => None,
                })
                .ok_or(TimestampError::Unresolvable { value: *local }),
        }
    }
}

/// Offsets of the processing machine's local zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostLocal;

impl LocalOffset for HostLocal {
    fn local_offsets(&self, local: &NaiveDateTime) -> MappedLocalTime<FixedOffset> {
        Local.offset_from_local_datetime(local)
    }

    fn utc_offset(&self, utc: &NaiveDateTime) -> FixedOffset {
        Local.offset_from_utc_datetime(utc)
    }
}

impl LocalOffset for FixedOffset {
    fn local_offsets(&self, _local: &NaiveDateTime) -> MappedLocalTime<FixedOffset> {
        MappedLocalTime::Single(*self)
    }

    fn utc_offset(&self, _utc: &NaiveDateTime) -> FixedOffset {
        *self
    }
}

/// Interpret `local` as wall-clock time under `rule` and return the UTC instant.
pub fn normalize<L: LocalOffset + ?Sized>(
    local: NaiveDateTime,
    rule: &L,
) -> Result<DateTime<Utc>, TimestampError> {
    let offset = rule.offset_at_local(&local)?;
    local
        .checked_sub_signed(TimeDelta::seconds(i64::from(offset.local_minus_utc())))
        .map(|utc| utc.and_utc())
        .ok_or(TimestampError::OutOfRange { value: local })
}

/// Inverse of [`normalize`]: the wall-clock time of `instant` under `rule`.
pub fn to_local<L: LocalOffset + ?Sized>(
    instant: DateTime<Utc>,
    rule: &L,
) -> Result<NaiveDateTime, TimestampError> {
    let utc = instant.naive_utc();
    let offset = rule.utc_offset(&utc);
    utc.checked_add_signed(TimeDelta::seconds(i64::from(offset.local_minus_utc())))
        .ok_or(TimestampError::OutOfRange { value: utc })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, 0))
            .unwrap()
    }

    /// Central European rules for 2021: +01:00, +02:00 from 03-28 01:00 UTC
    /// until 10-31 01:00 UTC.
    struct Cet2021;

    impl Cet2021 {
        fn winter() -> FixedOffset {
            FixedOffset::east_opt(3600).unwrap()
        }

        fn summer() -> FixedOffset {
            FixedOffset::east_opt(7200).unwrap()
        }
    }

    impl LocalOffset for Cet2021 {
        fn local_offsets(&self, local: &NaiveDateTime) -> MappedLocalTime<FixedOffset> {
            let spring_gap = at(2021, 3, 28, 2, 0)..at(2021, 3, 28, 3, 0);
            let autumn_overlap = at(2021, 10, 31, 2, 0)..at(2021, 10, 31, 3, 0);
            if spring_gap.contains(local) {
                MappedLocalTime::None
            } else if autumn_overlap.contains(local) {
                MappedLocalTime::Ambiguous(Self::summer(), Self::winter())
            } else if *local >= spring_gap.end && *local < autumn_overlap.start {
                MappedLocalTime::Single(Self::summer())
            } else {
                MappedLocalTime::Single(Self::winter())
            }
        }

        fn utc_offset(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc >= at(2021, 3, 28, 1, 0) && *utc < at(2021, 10, 31, 1, 0) {
                Self::summer()
            } else {
                Self::winter()
            }
        }
    }

    #[test]
    fn fixed_offset_subtracts() {
        let rule = FixedOffset::west_opt(5 * 3600).unwrap();
        let utc = normalize(at(2021, 6, 1, 9, 30), &rule).unwrap();
        assert_eq!(utc.naive_utc(), at(2021, 6, 1, 14, 30));
    }

    #[test]
    fn offset_follows_the_instant() {
        assert_eq!(
            normalize(at(2021, 1, 15, 12, 0), &Cet2021).unwrap().naive_utc(),
            at(2021, 1, 15, 11, 0)
        );
        assert_eq!(
            normalize(at(2021, 7, 15, 12, 0), &Cet2021).unwrap().naive_utc(),
            at(2021, 7, 15, 10, 0)
        );
    }

    #[test]
    fn ambiguous_time_takes_earliest_instant() {
        let utc = normalize(at(2021, 10, 31, 2, 30), &Cet2021).unwrap();
        assert_eq!(utc.naive_utc(), at(2021, 10, 31, 0, 30));
    }

    #[test]
    fn gap_uses_offset_before_transition() {
        let utc = normalize(at(2021, 3, 28, 2, 30), &Cet2021).unwrap();
        assert_eq!(utc.naive_utc(), at(2021, 3, 28, 1, 30));
    }

    #[test]
    fn to_local_inverts_normalize() {
        let local = at(2021, 7, 15, 12, 0);
        let utc = normalize(local, &Cet2021).unwrap();
        assert_eq!(to_local(utc, &Cet2021).unwrap(), local);
    }

    #[test]
    fn out_of_range_is_an_error() {
        let rule = FixedOffset::west_opt(3600).unwrap();
        assert_eq!(
            normalize(NaiveDateTime::MAX, &rule),
            Err(TimestampError::OutOfRange {
                value: NaiveDateTime::MAX
            })
        );
    }
}
