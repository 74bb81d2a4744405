//! Practice metrics engine.
//!
//! Pure projections over rows the caller already fetched. Nothing here
//! touches storage, reads the clock, or fails: inputs are assumed to have
//! passed boundary validation (see `crate::db::snapshot` and
//! `crate::practice::intake`).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::db::{
    ClientRecord, DocumentRecord, DocumentType, HearingRecord, HearingStatus, MatterRecord,
    TimeEntryRecord,
};

/// Hearings split by whether they still lie ahead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HearingPartition<'a> {
    pub upcoming: Vec<&'a HearingRecord>,
    pub past: Vec<&'a HearingRecord>,
}

/// A hearing is upcoming when it is still scheduled and not before `now`.
pub fn is_upcoming(hearing: &HearingRecord, now: DateTime<Utc>) -> bool {
    hearing.status == HearingStatus::Scheduled && hearing.hearing_date >= now
}

/// Split hearings into upcoming and past, preserving input order in both.
///
/// Every hearing lands in exactly one side. Callers pass hearings sorted by
/// `hearing_date` ascending to get chronological lists.
pub fn partition_hearings(hearings: &[HearingRecord], now: DateTime<Utc>) -> HearingPartition<'_> {
    let (upcoming, past): (Vec<_>, Vec<_>) =
        hearings.iter().partition(|h| is_upcoming(h, now));
    HearingPartition { upcoming, past }
}

/// Hour and revenue totals over a set of time entries.
///
/// Values are kept at full precision; use the `display_*` helpers for the
/// two-decimal rendering shown on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TimeTotals {
    pub total_hours: Decimal,
    pub billable_hours: Decimal,
    pub total_revenue: Decimal,
}

impl TimeTotals {
    pub fn display_total_hours(&self) -> String {
        format_hours(self.total_hours)
    }

    pub fn display_billable_hours(&self) -> String {
        format_hours(self.billable_hours)
    }

    pub fn display_total_revenue(&self) -> String {
        format_fixed_2(self.total_revenue)
    }
}

/// What a single entry adds to revenue: hours × rate when billable, else 0.
pub fn revenue_contribution(entry: &TimeEntryRecord) -> Decimal {
    if !entry.is_billable {
        return Decimal::ZERO;
    }
    entry
        .billable_rate
        .map_or(Decimal::ZERO, |rate| entry.hours.saturating_mul(rate))
}

/// Sum hours and revenue. Sums saturate at `Decimal::MAX` rather than
/// overflow.
pub fn aggregate_time_entries(entries: &[TimeEntryRecord]) -> TimeTotals {
    entries
        .iter()
        .fold(TimeTotals::default(), |mut totals, entry| {
            totals.total_hours = totals.total_hours.saturating_add(entry.hours);
            if entry.is_billable {
                totals.billable_hours = totals.billable_hours.saturating_add(entry.hours);
            }
            totals.total_revenue = totals
                .total_revenue
                .saturating_add(revenue_contribution(entry));
            totals
        })
}

/// Count documents per type.
///
/// Types with no documents are left out unless `include_zero` is set, in
/// which case every known type is present. Untyped documents are not counted.
pub fn count_by_type(
    documents: &[DocumentRecord],
    include_zero: bool,
) -> BTreeMap<DocumentType, usize> {
    let mut counts = BTreeMap::new();
    if include_zero {
        for kind in DocumentType::ALL {
            counts.insert(kind, 0);
        }
    }
    for kind in documents.iter().filter_map(|doc| doc.document_type) {
        *counts.entry(kind).or_insert(0) += 1;
    }
    counts
}

/// Render a second count as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn elapsed_time_format(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Records that expose named text fields to [`fuzzy_search`].
pub trait Searchable {
    type Field: Copy;

    /// Text for `field`, or `None` when the record has no value for it.
    fn field_text(&self, field: Self::Field) -> Option<&str>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatterField {
    Title,
    MatterNumber,
    ClientName,
}

impl MatterField {
    pub const ALL: [MatterField; 3] = [Self::Title, Self::MatterNumber, Self::ClientName];
}

impl Searchable for MatterRecord {
    type Field = MatterField;

    fn field_text(&self, field: MatterField) -> Option<&str> {
        match field {
            MatterField::Title => Some(&self.title),
            MatterField::MatterNumber => Some(&self.matter_number),
            MatterField::ClientName => self.client_name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentField {
    Title,
    MatterNumber,
}

impl DocumentField {
    pub const ALL: [DocumentField; 2] = [Self::Title, Self::MatterNumber];
}

impl Searchable for DocumentRecord {
    type Field = DocumentField;

    fn field_text(&self, field: DocumentField) -> Option<&str> {
        match field {
            DocumentField::Title => Some(&self.title),
            DocumentField::MatterNumber => self.matter_number.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientField {
    FullName,
    Email,
    CompanyName,
}

impl ClientField {
    pub const ALL: [ClientField; 3] = [Self::FullName, Self::Email, Self::CompanyName];
}

impl Searchable for ClientRecord {
    type Field = ClientField;

    fn field_text(&self, field: ClientField) -> Option<&str> {
        match field {
            ClientField::FullName => Some(&self.full_name),
            ClientField::Email => self.email.as_deref(),
            ClientField::CompanyName => self.company_name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HearingField {
    Title,
    Court,
    Judge,
    Location,
}

impl HearingField {
    pub const ALL: [HearingField; 4] = [Self::Title, Self::Court, Self::Judge, Self::Location];
}

impl Searchable for HearingRecord {
    type Field = HearingField;

    fn field_text(&self, field: HearingField) -> Option<&str> {
        match field {
            HearingField::Title => Some(&self.title),
            HearingField::Court => self.court_name.as_deref(),
            HearingField::Judge => self.judge_name.as_deref(),
            HearingField::Location => self.location.as_deref(),
        }
    }
}

/// Case-insensitive substring search over the given fields.
///
/// A record matches when any of `fields` contains `query`. An empty query
/// keeps every record, in order.
pub fn fuzzy_search<'a, T: Searchable>(
    records: &'a [T],
    query: &str,
    fields: &[T::Field],
) -> Vec<&'a T> {
    if query.is_empty() {
        return records.iter().collect();
    }
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| {
            fields.iter().any(|field| {
                record
                    .field_text(*field)
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
            })
        })
        .collect()
}

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human file size, e.g. `1536` → `"1.5 KB"`.
///
/// Sizes of 1024^4 bytes and above stay in GB (no TB unit), so the number
/// grows past 1024 instead of switching suffix.
pub fn file_size_label(bytes: Option<u64>) -> String {
    let Some(bytes) = bytes else {
        return "N/A".to_string();
    };
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0usize;
    let mut divisor: u64 = 1;
    while unit + 1 < SIZE_UNITS.len() && bytes >= divisor * 1024 {
        divisor *= 1024;
        unit += 1;
    }

    let scaled = (Decimal::from(bytes) / Decimal::from(divisor))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    format!("{} {}", scaled, SIZE_UNITS[unit])
}

fn format_fixed_2(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// Hours fixed to two decimal places.
pub fn format_hours(hours: Decimal) -> String {
    format_fixed_2(hours)
}

/// Currency amount with a leading symbol, two decimal places.
pub fn format_currency(amount: Decimal, symbol: &str) -> String {
    format!("{symbol}{}", format_fixed_2(amount))
}

/// Round half away from zero to one decimal place.
pub fn round_to_tenth(value: Decimal) -> Decimal {
    value
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::*;
    use crate::db::{MatterStatus, Priority};

    fn entry(hours: Decimal, is_billable: bool, rate: Option<Decimal>) -> TimeEntryRecord {
        TimeEntryRecord {
            id: Uuid::new_v4(),
            matter_id: None,
            user_id: "u1".to_string(),
            description: "Work".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date"),
            hours,
            is_billable,
            billable_rate: rate,
        }
    }

    fn hearing(title: &str, date: DateTime<Utc>, status: HearingStatus) -> HearingRecord {
        HearingRecord {
            id: Uuid::new_v4(),
            matter_id: Uuid::nil(),
            title: title.to_string(),
            hearing_date: date,
            status,
            court_name: None,
            judge_name: None,
            location: None,
            notes: None,
            created_by: "u1".to_string(),
        }
    }

    fn document(title: &str, kind: Option<DocumentType>) -> DocumentRecord {
        DocumentRecord {
            id: Uuid::new_v4(),
            matter_id: Uuid::nil(),
            title: title.to_string(),
            matter_number: None,
            document_type: kind,
            file_size: None,
            created_at: Utc::now(),
        }
    }

    fn matter(title: &str, number: &str, client: Option<&str>) -> MatterRecord {
        MatterRecord {
            id: Uuid::new_v4(),
            matter_number: number.to_string(),
            title: title.to_string(),
            status: MatterStatus::Active,
            priority: Priority::Medium,
            client_id: Uuid::nil(),
            client_name: client.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn aggregate_of_empty_input_is_zero() {
        let totals = aggregate_time_entries(&[]);
        assert_eq!(totals, TimeTotals::default());
        assert_eq!(totals.display_total_hours(), "0.00");
        assert_eq!(totals.display_total_revenue(), "0.00");
    }

    #[test]
    fn aggregate_mixed_billable_entries() {
        let totals = aggregate_time_entries(&[
            entry(dec!(2), true, Some(dec!(100))),
            entry(dec!(1), false, Some(dec!(200))),
        ]);
        assert_eq!(totals.display_total_hours(), "3.00");
        assert_eq!(totals.display_billable_hours(), "2.00");
        assert_eq!(totals.display_total_revenue(), "200.00");
    }

    #[test]
    fn non_billable_entries_never_contribute_revenue() {
        let entries = vec![
            entry(dec!(4.5), false, Some(dec!(999))),
            entry(dec!(0.25), false, None),
        ];
        let totals = aggregate_time_entries(&entries);
        assert_eq!(totals.billable_hours, Decimal::ZERO);
        assert_eq!(totals.total_revenue, Decimal::ZERO);
        assert_eq!(totals.total_hours, dec!(4.75));
    }

    #[test]
    fn missing_rate_contributes_zero_revenue_but_counts_hours() {
        let totals = aggregate_time_entries(&[
            entry(dec!(1.5), true, None),
            entry(dec!(0.5), true, Some(dec!(300))),
        ]);
        assert_eq!(totals.billable_hours, dec!(2.0));
        assert_eq!(totals.total_revenue, dec!(150));
    }

    #[test]
    fn oversized_entries_saturate_instead_of_panicking() {
        let totals = aggregate_time_entries(&[
            entry(Decimal::MAX, true, Some(dec!(2))),
            entry(Decimal::MAX, true, Some(dec!(1))),
        ]);
        assert_eq!(totals.total_hours, Decimal::MAX);
        assert_eq!(totals.billable_hours, Decimal::MAX);
        assert_eq!(totals.total_revenue, Decimal::MAX);
    }

    #[test]
    fn stored_totals_are_not_rounded() {
        let totals = aggregate_time_entries(&[
            entry(dec!(0.333), true, Some(dec!(100))),
            entry(dec!(0.333), true, Some(dec!(100))),
        ]);
        assert_eq!(totals.total_hours, dec!(0.666));
        assert_eq!(totals.display_total_hours(), "0.67");
        assert_eq!(totals.total_revenue, dec!(66.6));
        assert_eq!(totals.display_total_revenue(), "66.60");
    }

    #[test]
    fn partition_scenario_from_calendar() {
        let now = Utc
            .with_ymd_and_hms(2026, 4, 15, 12, 0, 0)
            .single()
            .expect("valid now");
        let hearings = vec![
            hearing("yesterday", now - Duration::days(1), HearingStatus::Scheduled),
            hearing("tomorrow", now + Duration::days(1), HearingStatus::Scheduled),
            hearing("cancelled", now + Duration::days(1), HearingStatus::Cancelled),
        ];

        let split = partition_hearings(&hearings, now);
        let upcoming: Vec<&str> = split.upcoming.iter().map(|h| h.title.as_str()).collect();
        let past: Vec<&str> = split.past.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(upcoming, vec!["tomorrow"]);
        assert_eq!(past, vec!["yesterday", "cancelled"]);
    }

    #[test]
    fn partition_is_total_and_disjoint_for_any_now() {
        let base = Utc
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("valid base");
        let statuses = [
            HearingStatus::Scheduled,
            HearingStatus::Completed,
            HearingStatus::Postponed,
            HearingStatus::Cancelled,
        ];
        let hearings: Vec<HearingRecord> = (0..12)
            .map(|i| {
                hearing(
                    &format!("h{i}"),
                    base + Duration::days(i),
                    statuses[(i as usize) % statuses.len()],
                )
            })
            .collect();

        for offset in [-5, 0, 3, 6, 11, 30] {
            let now = base + Duration::days(offset);
            let split = partition_hearings(&hearings, now);
            assert_eq!(split.upcoming.len() + split.past.len(), hearings.len());
            for h in &hearings {
                let in_upcoming = split.upcoming.iter().any(|u| u.id == h.id);
                let in_past = split.past.iter().any(|p| p.id == h.id);
                assert!(in_upcoming ^ in_past, "{} must be on exactly one side", h.title);
            }
        }
    }

    #[test]
    fn hearing_exactly_at_now_is_upcoming() {
        let now = Utc::now();
        let h = hearing("now", now, HearingStatus::Scheduled);
        assert!(is_upcoming(&h, now));
        assert!(!is_upcoming(&h, now + Duration::seconds(1)));
    }

    #[test]
    fn count_by_type_omits_zero_counts_by_default() {
        let docs = vec![
            document("a", Some(DocumentType::Contract)),
            document("b", Some(DocumentType::Contract)),
            document("c", Some(DocumentType::Evidence)),
            document("d", None),
        ];
        let counts = count_by_type(&docs, false);
        assert_eq!(
            counts.into_iter().collect::<Vec<_>>(),
            vec![(DocumentType::Contract, 2), (DocumentType::Evidence, 1)]
        );
    }

    #[test]
    fn count_by_type_can_report_every_type() {
        let docs = vec![document("a", Some(DocumentType::Affidavit))];
        let counts = count_by_type(&docs, true);
        assert_eq!(counts.len(), DocumentType::ALL.len());
        assert_eq!(counts[&DocumentType::Affidavit], 1);
        assert_eq!(counts[&DocumentType::Pleading], 0);
    }

    #[test]
    fn elapsed_time_format_pads_and_does_not_wrap_hours() {
        assert_eq!(elapsed_time_format(0), "00:00:00");
        assert_eq!(elapsed_time_format(59), "00:00:59");
        assert_eq!(elapsed_time_format(3661), "01:01:01");
        assert_eq!(elapsed_time_format(90000), "25:00:00");
        assert_eq!(elapsed_time_format(360_000), "100:00:00");
    }

    #[test]
    fn empty_query_is_identity() {
        let matters = vec![
            matter("Acme v. Foo", "M-1", Some("Acme")),
            matter("Estate of Roe", "M-2", None),
        ];
        let found = fuzzy_search(&matters, "", &MatterField::ALL);
        assert_eq!(found.len(), matters.len());
        assert!(found.iter().zip(&matters).all(|(a, b)| std::ptr::eq(*a, b)));
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let matters = vec![
            matter("Acme v. Foo", "M-1", Some("Acme Holdings")),
            matter("Estate of Roe", "M-2", None),
            matter("Lease dispute", "LD-77", Some("Globex")),
        ];
        let titles = |query: &str, fields: &[MatterField]| -> Vec<String> {
            fuzzy_search(&matters, query, fields)
                .into_iter()
                .map(|m| m.title.clone())
                .collect()
        };

        assert_eq!(titles("ROE", &MatterField::ALL), vec!["Estate of Roe"]);
        assert_eq!(titles("ld-7", &MatterField::ALL), vec!["Lease dispute"]);
        assert_eq!(titles("globex", &MatterField::ALL), vec!["Lease dispute"]);
        assert!(titles("globex", &[MatterField::Title]).is_empty());
    }

    #[test]
    fn search_skips_absent_fields() {
        let docs = vec![document("Engagement letter", None)];
        assert!(fuzzy_search(&docs, "M-1", &[DocumentField::MatterNumber]).is_empty());
        assert_eq!(fuzzy_search(&docs, "letter", &DocumentField::ALL).len(), 1);
    }

    #[test]
    fn file_size_labels() {
        assert_eq!(file_size_label(None), "N/A");
        assert_eq!(file_size_label(Some(0)), "0 Bytes");
        assert_eq!(file_size_label(Some(512)), "512 Bytes");
        assert_eq!(file_size_label(Some(1023)), "1023 Bytes");
        assert_eq!(file_size_label(Some(1024)), "1 KB");
        assert_eq!(file_size_label(Some(1536)), "1.5 KB");
        assert_eq!(file_size_label(Some(1_234_567)), "1.18 MB");
        assert_eq!(file_size_label(Some(3 * 1024 * 1024 * 1024)), "3 GB");
    }

    #[test]
    fn file_sizes_past_gigabytes_stay_in_gb() {
        let two_tib = 2 * 1024u64.pow(4);
        assert_eq!(file_size_label(Some(two_tib)), "2048 GB");
    }

    #[test]
    fn display_helpers_round_half_away_from_zero() {
        assert_eq!(format_hours(dec!(1.005)), "1.01");
        assert_eq!(format_currency(dec!(1234.5), "$"), "$1234.50");
        assert_eq!(round_to_tenth(dec!(12.25)), dec!(12.3));
        assert_eq!(round_to_tenth(dec!(7)), dec!(7));
    }
}
