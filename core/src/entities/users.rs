use super::API_V2;
use crate::entity::{append_filter, append_query, require, BaseEntity};
use crate::error::ApiError;
use crate::filter::{FieldsFilter, UserFilter};
use crate::request::Request;
use crate::types::{User, UsersPage};

/// Operations on `api/v2/users` and `api/v2/users-by-email`.
#[derive(Debug, Clone)]
pub struct UsersEntity {
    base: BaseEntity,
}

impl UsersEntity {
    pub fn new(base: BaseEntity) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &BaseEntity {
        &self.base
    }

    fn url(&self, collection: &str, id: Option<&str>) -> url::Url {
        let mut segments = API_V2.to_vec();
        segments.push(collection);
        segments.extend(id);
        self.base.endpoint(&segments)
    }

    pub fn list(&self, filter: Option<&UserFilter>) -> Request<UsersPage> {
        let mut url = self.url("users", None);
        append_filter(&mut url, filter);
        self.base.get(url)
    }

    /// Users whose email matches exactly, across connections.
    pub fn list_by_email(
        &self,
        email: &str,
        filter: Option<&FieldsFilter>,
    ) -> Result<Request<Vec<User>>, ApiError> {
        let email = require(email, "email")?;
        let mut url = self.url("users-by-email", None);
        append_query(&mut url, [("email", email)]);
        append_filter(&mut url, filter);
        Ok(self.base.get(url))
    }

    pub fn get(&self, user_id: &str, filter: Option<&FieldsFilter>) -> Result<Request<User>, ApiError> {
        let user_id = require(user_id, "user id")?;
        let mut url = self.url("users", Some(user_id));
        append_filter(&mut url, filter);
        Ok(self.base.get(url))
    }

    pub fn create(&self, user: &User) -> Result<Request<User>, ApiError> {
        let mut request = self.base.post(self.url("users", None));
        request.set_body(user)?;
        Ok(request)
    }

    pub fn update(&self, user_id: &str, user: &User) -> Result<Request<User>, ApiError> {
        let user_id = require(user_id, "user id")?;
        let mut request = self.base.patch(self.url("users", Some(user_id)));
        request.set_body(user)?;
        Ok(request)
    }

    pub fn delete(&self, user_id: &str) -> Result<Request<()>, ApiError> {
        let user_id = require(user_id, "user id")?;
        Ok(self.base.delete(self.url("users", Some(user_id))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::transport::HttpClient;
    use url::Url;

    fn users() -> UsersEntity {
        UsersEntity::new(BaseEntity::new(
            HttpClient::default(),
            Url::parse("https://tenant.example.com/").unwrap(),
            "apiToken",
        ))
    }

    #[test]
    fn list_with_search_query() {
        let filter = UserFilter::new().with_query("name:jane").with_totals(true);
        let req = users().list(Some(&filter));
        assert_eq!(
            req.url(),
            "https://tenant.example.com/api/v2/users?q=name%3Ajane&search_engine=v3&include_totals=true"
        );
    }

    #[test]
    fn list_by_email_puts_email_first() {
        let filter = FieldsFilter::new().with_fields("user_id", true);
        let req = users()
            .list_by_email("jane@example.com", Some(&filter))
            .unwrap();
        assert_eq!(
            req.url(),
            "https://tenant.example.com/api/v2/users-by-email?email=jane%40example.com&fields=user_id&include_fields=true"
        );
    }

    #[test]
    fn get_encodes_user_id() {
        let req = users().get("email|5f3a 01", None).unwrap();
        assert_eq!(req.url(), "https://tenant.example.com/api/v2/users/email%7C5f3a%2001");
    }

    #[test]
    fn create_and_update_bodies() {
        let user = User {
            email: Some("jane@example.com".to_string()),
            connection: Some("Username-Password-Authentication".to_string()),
            password: Some("Passw0rd!".to_string()),
            ..User::default()
        };
        let created = users().create(&user).unwrap();
        assert_eq!(created.method(), HttpMethod::Post);
        let body: serde_json::Value = serde_json::from_str(created.body().unwrap()).unwrap();
        assert_eq!(body["connection"], "Username-Password-Authentication");

        let patch = User {
            blocked: Some(true),
            ..User::default()
        };
        let updated = users().update("auth0|1", &patch).unwrap();
        assert_eq!(updated.method(), HttpMethod::Patch);
        assert_eq!(updated.body(), Some(r#"{"blocked":true}"#));
    }

    #[test]
    fn required_arguments() {
        assert!(matches!(users().get("", None), Err(ApiError::InvalidArgument(_))));
        assert!(matches!(users().list_by_email(" ", None), Err(ApiError::InvalidArgument(_))));
        assert!(matches!(users().delete(""), Err(ApiError::InvalidArgument(_))));
        assert!(matches!(
            users().update("", &User::default()),
            Err(ApiError::InvalidArgument(_))
        ));
    }
}
