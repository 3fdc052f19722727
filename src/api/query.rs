/// Translation of filter state into an image-listing request
///
/// The request is derived fresh for every fetch and never stored.
use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::{Serialize, Serializer};

use crate::state::filter::{FilterState, SizeClass, SortOrder};

/// Query parameters of `GET /images`; `None` fields are left out of the URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImagesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Zero-based
    pub page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<String>,
    pub order: SortOrder,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "timestamp")]
    pub after: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "timestamp")]
    pub before: Option<DateTime<Utc>>,
    pub limit: u32,
}

/// Build the request for the current filters in the viewer's time zone
pub fn build_request<Tz: TimeZone>(filter: &FilterState, tz: &Tz) -> ImagesRequest {
    let window = filter.date().and_then(|date| day_window(date, tz));

    ImagesRequest {
        query: Some(filter.query())
            .filter(|q| !q.is_empty())
            .map(str::to_owned),
        page: filter.page().saturating_sub(1),
        size: Some(filter.size()).filter(|size| size.as_param().is_some()),
        checkpoint: filter
            .checkpoint()
            .filter(|name| !name.is_empty())
            .map(str::to_owned),
        order: filter.order(),
        after: window.map(|(after, _)| after),
        before: window.map(|(_, before)| before),
        limit: filter.thumb_size().page_limit(),
    }
}

/// Start of `date` and start of the following day in `tz`, as UTC instants.
///
/// The upper bound is exclusive and sits on the next local midnight, so a
/// DST switch day spans 23 or 25 hours.
pub fn day_window<Tz: TimeZone>(
    date: NaiveDate,
    tz: &Tz,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let after = start_of_day(date, tz)?;
    let before = start_of_day(date.succ_opt()?, tz)?;
    Some((after, before))
}

fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    // Zones that skip midnight on a DST switch start the day an hour later
    let one_am = midnight + chrono::Duration::hours(1);
    let local = tz
        .from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&one_am).earliest())?;
    Some(local.with_timezone(&Utc))
}

fn timestamp<S: Serializer>(
    value: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(time) => {
            serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::Millis, true))
        }
        None => serializer.serialize_none(),
    }
}
