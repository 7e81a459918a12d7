use chrono::{NaiveDate, Utc};

use crate::api::client::RestClient;
use crate::api::queries::{self, PROFILES_TABLE};
use crate::api::types::{BirthDateUpdate, NewUserProfile, UserProfile};
use crate::dates::life_days;
use crate::error::{ProfileError, ProfileResult, Result};

#[derive(Clone)]
pub struct ProfileService {
    client: RestClient,
}

impl ProfileService {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    /// The owner's profile, or `None` if it was never created.
    pub async fn load_profile(&self, user_id: &str) -> ProfileResult<Option<UserProfile>> {
        let rows: Result<Vec<UserProfile>> = self
            .client
            .select(PROFILES_TABLE, &queries::profile_for(user_id))
            .await;
        rows.map(|rows| rows.into_iter().next()).map_err(|err| {
            tracing::error!(?err, user_id, "load profile failed");
            ProfileError::LoadFailed
        })
    }

    /// Stores the birth date, creating the profile row on first use.
    pub async fn save_birth_date(
        &self,
        user_id: &str,
        birth_date: Option<NaiveDate>,
    ) -> ProfileResult<UserProfile> {
        self.upsert_birth_date(user_id, birth_date)
            .await
            .map_err(|err| {
                tracing::error!(?err, user_id, "update profile failed");
                ProfileError::UpdateFailed
            })
    }

    async fn upsert_birth_date(
        &self,
        user_id: &str,
        birth_date: Option<NaiveDate>,
    ) -> Result<UserProfile> {
        let update = BirthDateUpdate {
            birth_date,
            updated_at: Utc::now(),
        };
        let updated: Vec<UserProfile> = self
            .client
            .update(PROFILES_TABLE, &queries::profile_scope(user_id), &update)
            .await?;
        if let Some(profile) = updated.into_iter().next() {
            return Ok(profile);
        }
        tracing::info!(user_id, "creating user profile");
        self.client
            .insert(PROFILES_TABLE, &NewUserProfile { user_id, birth_date })
            .await
    }
}

/// Heading label for a date: its life-day number when the birth date is
/// known and not after `date`, otherwise the date itself.
pub fn life_day_label(date: NaiveDate, profile: Option<&UserProfile>) -> String {
    profile
        .and_then(|p| p.birth_date)
        .and_then(|birth| life_days(date, birth))
        .map(|n| n.to_string())
        .unwrap_or_else(|| date.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{day, mock_client, ts, OWNER};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    fn profile_json(birth_date: Option<&str>) -> serde_json::Value {
        json!({
            "id": "p1",
            "user_id": OWNER,
            "birth_date": birth_date,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    fn profile(birth_date: Option<&str>) -> UserProfile {
        UserProfile {
            id: "p1".into(),
            user_id: OWNER.into(),
            birth_date: birth_date.map(day),
            created_at: ts("2024-01-01T00:00:00Z"),
            updated_at: ts("2024-01-01T00:00:00Z"),
        }
    }

    #[tokio::test]
    async fn load_returns_none_when_no_row() {
        let (server, client) = mock_client().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/user_profiles"))
            .and(query_param("user_id", format!("eq.{}", OWNER)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let loaded = ProfileService::new(client).load_profile(OWNER).await.unwrap();
        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn load_returns_existing_profile() {
        let (server, client) = mock_client().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/user_profiles"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([profile_json(Some("1990-05-01"))])),
            )
            .mount(&server)
            .await;

        let loaded = ProfileService::new(client).load_profile(OWNER).await.unwrap();
        assert_eq!(loaded, Some(profile(Some("1990-05-01"))));
    }

    #[tokio::test]
    async fn load_failure_maps_to_fixed_error() {
        let (server, client) = mock_client().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = ProfileService::new(client).load_profile(OWNER).await.unwrap_err();
        assert_eq!(err, ProfileError::LoadFailed);
    }

    #[tokio::test]
    async fn save_updates_existing_row() {
        let (server, client) = mock_client().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/user_profiles"))
            .and(body_partial_json(json!({"birth_date": "1990-05-01"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([profile_json(Some("1990-05-01"))])),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let saved = ProfileService::new(client)
            .save_birth_date(OWNER, Some(day("1990-05-01")))
            .await
            .unwrap();
        assert_eq!(saved.birth_date, Some(day("1990-05-01")));
    }

    #[tokio::test]
    async fn save_inserts_when_no_row_exists() {
        let (server, client) = mock_client().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/user_profiles"))
            .and(body_partial_json(json!({"user_id": OWNER, "birth_date": "1990-05-01"})))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!([profile_json(Some("1990-05-01"))])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let saved = ProfileService::new(client)
            .save_birth_date(OWNER, Some(day("1990-05-01")))
            .await
            .unwrap();
        assert_eq!(saved.id, "p1");
    }

    #[tokio::test]
    async fn save_failure_maps_to_fixed_error() {
        let (server, client) = mock_client().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = ProfileService::new(client)
            .save_birth_date(OWNER, None)
            .await
            .unwrap_err();
        assert_eq!(err, ProfileError::UpdateFailed);
    }

    #[test]
    fn label_uses_life_day_when_birth_date_known() {
        let p = profile(Some("1990-05-01"));
        assert_eq!(life_day_label(day("1990-05-03"), Some(&p)), "3");
    }

    #[test]
    fn label_falls_back_to_date() {
        assert_eq!(life_day_label(day("2024-01-02"), None), "2024-01-02");
        let p = profile(None);
        assert_eq!(life_day_label(day("2024-01-02"), Some(&p)), "2024-01-02");
        let future = profile(Some("2030-01-01"));
        assert_eq!(life_day_label(day("2024-01-02"), Some(&future)), "2024-01-02");
    }
}
