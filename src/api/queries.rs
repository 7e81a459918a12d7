use chrono::NaiveDate;

use crate::api::query::{Direction, TableQuery};

pub const THOUGHTS_TABLE: &str = "thoughts";
pub const PROFILES_TABLE: &str = "user_profiles";

/// Upper bound on rows read by the distinct-date probe.
pub const DATE_PROBE_LIMIT: usize = 100;

/// Most recent `date` values for an owner, optionally strictly before a cursor.
pub fn recent_dates(user_id: &str, before: Option<NaiveDate>) -> TableQuery {
    let mut query = TableQuery::new().select("date").eq("user_id", user_id);
    if let Some(cursor) = before {
        query = query.lt("date", cursor);
    }
    query.order("date", Direction::Desc).limit(DATE_PROBE_LIMIT)
}

pub fn thoughts_on_dates(user_id: &str, dates: &[NaiveDate]) -> TableQuery {
    TableQuery::new()
        .select("*")
        .eq("user_id", user_id)
        .in_list("date", dates)
        .order("date", Direction::Desc)
        .order("created_at", Direction::Desc)
}

/// Scopes a write to one thought of one owner.
pub fn owned_thought(user_id: &str, id: &str) -> TableQuery {
    TableQuery::new().eq("id", id).eq("user_id", user_id)
}

pub fn profile_for(user_id: &str) -> TableQuery {
    TableQuery::new().select("*").eq("user_id", user_id).limit(1)
}

pub fn profile_scope(user_id: &str) -> TableQuery {
    TableQuery::new().eq("user_id", user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn recent_dates_without_cursor_has_no_date_filter() {
        let params = recent_dates("u1", None).to_params();
        assert_eq!(param(&params, "select"), Some("date"));
        assert_eq!(param(&params, "user_id"), Some("eq.u1"));
        assert_eq!(param(&params, "date"), None);
        assert_eq!(param(&params, "order"), Some("date.desc"));
        assert_eq!(param(&params, "limit"), Some("100"));
    }

    #[test]
    fn recent_dates_with_cursor_filters_strictly_before() {
        let params = recent_dates("u1", Some(day(2024, 1, 1))).to_params();
        assert_eq!(param(&params, "date"), Some("lt.2024-01-01"));
    }

    #[test]
    fn thoughts_on_dates_orders_by_date_then_created_at() {
        let params = thoughts_on_dates("u1", &[day(2024, 1, 2), day(2024, 1, 1)]).to_params();
        assert_eq!(param(&params, "select"), Some("*"));
        assert_eq!(param(&params, "date"), Some("in.(2024-01-02,2024-01-01)"));
        assert_eq!(param(&params, "order"), Some("date.desc,created_at.desc"));
        assert_eq!(param(&params, "limit"), None);
    }

    #[test]
    fn owned_thought_scopes_by_id_and_owner() {
        let params = owned_thought("u1", "t1").to_params();
        assert_eq!(param(&params, "id"), Some("eq.t1"));
        assert_eq!(param(&params, "user_id"), Some("eq.u1"));
    }

    #[test]
    fn profile_for_limits_to_one_row() {
        let params = profile_for("u1").to_params();
        assert_eq!(param(&params, "limit"), Some("1"));
        assert_eq!(param(&params, "user_id"), Some("eq.u1"));
    }
}
