//! Patient listing: request mapping, pagination and the table row model.
//!
//! The listing screen never queries the API with an empty search. When a search is valid,
//! the live query parameters are mapped to request parameters by [`listing_request`] and
//! then cleaned of sentinel-empty values by [`clean_params`].

use crate::constants::{
    gender_label, ANTENATAL_WINDOW_MONTHS, DISCHARGE_REASON_KEY, LOCAL_BODY_FILTER_KEY,
};
use crate::query::{QueryParamStore, QueryParams, QueryValue};
use crate::remote::{CareApi, PatientListItem, PatientPage};
use crate::search::{SearchController, SearchField};
use crate::DeskResult;
use chrono::{Datelike, Months, NaiveDate};
use desk_types::PhoneNumber;

/// A page/limit window over the listing results.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit,
        }
    }

    /// Reads `page` from the query, defaulting to the first page.
    pub fn from_params(params: &QueryParams, limit: u32) -> Self {
        let page = params
            .get("page")
            .and_then(QueryValue::as_positive)
            .unwrap_or(1);
        Self::new(page, limit)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn total_pages(&self, count: u64) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        count.div_ceil(u64::from(self.limit))
    }
}

/// Drops entries whose value is exactly empty text or the number zero.
///
/// Zero is treated as "unset" because several filters use it as a sentinel. The text `"0"`
/// read from a URL is a real value and is kept.
pub fn clean_params(params: &QueryParams) -> QueryParams {
    let mut cleaned = params.clone();
    cleaned.retain(|_, v| !matches!(v, QueryValue::Number(0)) && v.as_text() != Some(""));
    cleaned
}

/// Lower bound for "last menstruation date" when listing antenatal patients.
pub fn antenatal_lower_bound(today: NaiveDate) -> String {
    today
        .checked_sub_months(Months::new(ANTENATAL_WINDOW_MONTHS))
        .unwrap_or(NaiveDate::MIN)
        .format("%Y-%m-%d")
        .to_string()
}

fn non_empty<'a>(params: &'a QueryParams, key: &str) -> Option<&'a QueryValue> {
    params
        .get(key)
        .filter(|v| !matches!(v, QueryValue::Text(s) if s.is_empty()))
}

/// Maps live query parameters to cleaned listing request parameters.
pub fn listing_request(params: &QueryParams, limit: u32, today: NaiveDate) -> QueryParams {
    let window = Pagination::from_params(params, limit);
    let mut request = params.clone();

    request.set("page", i64::from(window.page));
    request.set("limit", i64::from(limit));

    if non_empty(params, DISCHARGE_REASON_KEY).is_some() {
        request.set("is_active", false);
    } else {
        let is_active = non_empty(params, "is_active")
            .cloned()
            .unwrap_or_else(|| QueryValue::text("True"));
        request.set("is_active", is_active);
    }

    for key in [
        SearchField::PhoneNumber.query_key(),
        SearchField::EmergencyPhoneNumber.query_key(),
    ] {
        let normalised = params
            .text(key)
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| PhoneNumber::parse(raw).ok());
        match normalised {
            Some(phone) => request.set(key, phone.as_str()),
            None => {
                request.remove(key);
            }
        }
    }

    match non_empty(params, LOCAL_BODY_FILTER_KEY) {
        Some(local_body) => request.set("local_body", local_body.clone()),
        None => {
            request.remove("local_body");
        }
    }

    request.set("offset", window.offset() as i64);

    if params.text("is_antenatal") == Some("true") {
        request.set(
            "last_menstruation_start_date_after",
            antenatal_lower_bound(today),
        );
    } else {
        request.remove("last_menstruation_start_date_after");
    }

    clean_params(&request)
}

/// Controller state behind the patient search screen.
#[derive(Clone, Debug)]
pub struct PatientSearch {
    store: QueryParamStore,
    controller: SearchController,
    limit: u32,
}

impl PatientSearch {
    /// Creates a search screen whose search terms are volatile.
    pub fn new(limit: u32) -> Self {
        Self {
            store: QueryParamStore::new(SearchField::ALL.map(SearchField::query_key)),
            controller: SearchController::new(),
            limit,
        }
    }

    pub fn store(&self) -> &QueryParamStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut QueryParamStore {
        &mut self.store
    }

    pub fn search(&mut self, widget_key: &str, raw: &str) -> bool {
        self.controller.search(&mut self.store, widget_key, raw)
    }

    pub fn clear_search(&mut self) {
        self.controller.clear_search(&mut self.store);
    }

    pub fn set_page(&mut self, page: u32) {
        self.store
            .update([("page", Some(QueryValue::text(page.max(1).to_string())))]);
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::from_params(self.store.params(), self.limit)
    }

    pub fn is_valid_search(&self) -> bool {
        self.controller.is_valid_search(self.store.params())
    }

    pub fn request(&self, today: NaiveDate) -> QueryParams {
        listing_request(self.store.params(), self.limit, today)
    }

    /// Fetches the current page, or `None` without any remote call when the search is empty.
    pub async fn fetch<A: CareApi + ?Sized>(
        &self,
        api: &A,
        today: NaiveDate,
    ) -> DeskResult<Option<PatientPage>> {
        if !self.is_valid_search() {
            tracing::debug!("search is empty; skipping patient listing");
            return Ok(None);
        }
        let request = self.request(today);
        let page = api.list_patients(&request).await?;
        tracing::debug!(count = page.count, "patient listing fetched");
        Ok(Some(page))
    }
}

/// One row of the listing table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientRow {
    pub name: String,
    pub patient_no: Option<String>,
    pub phone_number: String,
    pub date_of_birth: String,
    pub age: String,
    pub gender: Option<&'static str>,
}

impl PatientRow {
    pub fn from_item(item: &PatientListItem, today: NaiveDate) -> Self {
        Self {
            name: item.name.clone(),
            patient_no: item
                .last_consultation
                .as_ref()
                .and_then(|c| c.patient_no.clone()),
            phone_number: item.phone_number.clone().unwrap_or_default(),
            date_of_birth: item.date_of_birth.clone().unwrap_or_default(),
            age: format_age(item, today),
            gender: item.gender.and_then(gender_label),
        }
    }

    /// The DOB cell text: `date (age)`.
    pub fn dob_cell(&self) -> String {
        format!("{} ({})", self.date_of_birth, self.age)
    }
}

/// Formats a patient's age as `N Y`, `N M N D` or `N D`.
///
/// Without a full date of birth only whole years from `year_of_birth` are shown.
pub fn format_age(item: &PatientListItem, today: NaiveDate) -> String {
    let dob = item
        .date_of_birth
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());

    let start = match (dob, item.year_of_birth) {
        (Some(d), _) => d,
        (None, Some(year)) => match NaiveDate::from_ymd_opt(year, 1, 1) {
            Some(d) => d,
            None => return "0 Y".to_string(),
        },
        (None, None) => return "0 Y".to_string(),
    };

    let months = whole_months_between(start, today);
    if months >= 12 {
        return format!("{} Y", months / 12);
    }
    if dob.is_none() {
        return "0 Y".to_string();
    }

    let anchor = start
        .checked_add_months(Months::new(months))
        .unwrap_or(start);
    let days = (today - anchor).num_days().max(0);
    if months > 0 {
        format!("{months} M {days} D")
    } else {
        format!("{days} D")
    }
}

fn whole_months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }
    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    if end.day() < start.day() {
        months -= 1;
    }
    months.max(0) as u32
}
