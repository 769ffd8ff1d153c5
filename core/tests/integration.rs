//! Full lifecycle tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every entity over
//! real HTTP through the default ureq transport. Validates that request
//! building, the interceptor chain and response parsing agree with the
//! server end to end.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use mgmt_core::{
    ApiError, BearerAuth, HttpClient, HttpRequest, HttpResponse, Interceptor, ManagementApi, Rule,
    RulesFilter, User, UserFilter,
};

const TOKEN: &str = "integration-token";

/// Start the mock server on a random port and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, TOKEN).await
        })
        .unwrap();
    });

    format!("http://{addr}/")
}

#[test]
#[allow(deprecated)]
fn rules_lifecycle() {
    let api = ManagementApi::new(&start_server(), TOKEN).unwrap();
    let rules = api.rules();

    // Step 1: list is empty and answered as a bare array.
    let page = rules.list_all(None).execute().unwrap();
    assert!(page.items().is_empty());
    assert!(page.total.is_none());

    // Step 2: create two rules.
    let first = rules
        .create(&Rule::new("first", "function (u, c, cb) { cb(null, u, c); }"))
        .unwrap()
        .execute()
        .unwrap();
    let second = rules
        .create(&Rule {
            enabled: Some(false),
            ..Rule::new("second", "function (u, c, cb) { cb(null, u, c); }")
        })
        .unwrap()
        .execute()
        .unwrap();
    let first_id = first.id.clone().unwrap();
    assert_eq!(first.stage.as_deref(), Some("login_success"));
    assert_eq!(second.enabled, Some(false));

    // Step 3: get by id.
    let fetched = rules.get(&first_id, None).unwrap().execute().unwrap();
    assert_eq!(fetched, first);

    // Step 4: paginated list with totals.
    let filter = RulesFilter::new().with_totals(true).with_page(0, 1);
    let page = rules.list_all(Some(&filter)).execute().unwrap();
    assert_eq!(page.total, Some(2));
    assert_eq!(page.items().len(), 1);

    // Step 5: the legacy list drops include_totals and still decodes an array.
    let all = rules.list(Some(&RulesFilter::new().with_totals(true))).execute().unwrap();
    assert_eq!(all.len(), 2);

    let enabled = rules
        .list(Some(&RulesFilter::new().with_enabled(true)))
        .execute()
        .unwrap();
    assert_eq!(enabled.len(), 1);
    assert_eq!(enabled[0].name.as_deref(), Some("first"));

    // Step 6: update.
    let patch = Rule {
        enabled: Some(false),
        ..Rule::default()
    };
    let updated = rules.update(&first_id, &patch).unwrap().execute().unwrap();
    assert_eq!(updated.enabled, Some(false));
    assert_eq!(updated.name.as_deref(), Some("first"));

    // Step 7: delete, then everything about it is NotFound.
    rules.delete(&first_id).unwrap().execute().unwrap();
    let err = rules.get(&first_id, None).unwrap().execute().unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.payload().and_then(|p| p.code()), Some("inexistent_rule"));
    let err = rules.delete(&first_id).unwrap().execute().unwrap_err();
    assert!(matches!(err, ApiError::Api { status: 404, .. }));
}

#[test]
fn duplicate_rule_name_conflicts() {
    let api = ManagementApi::new(&start_server(), TOKEN).unwrap();
    let rule = Rule::new("dup", "function () {}");
    api.rules().create(&rule).unwrap().execute().unwrap();
    let err = api.rules().create(&rule).unwrap().execute().unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.payload().and_then(|p| p.code()), Some("rule_conflict"));
}

#[test]
fn stats_endpoints() {
    let api = ManagementApi::new(&start_server(), TOKEN).unwrap();

    let count = api.stats().get_active_users_count().execute().unwrap();
    assert_eq!(count, 0);

    let from = NaiveDate::from_ymd_opt(2021, 3, 5).unwrap();
    let to = NaiveDate::from_ymd_opt(2021, 3, 6).unwrap();
    let days = api.stats().get_daily_stats(from, to).execute().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0].date.map(|d| d.date_naive()), Some(from));
    assert_eq!(days[1].date.map(|d| d.date_naive()), Some(to));
}

#[test]
fn users_lifecycle() {
    let api = ManagementApi::new(&start_server(), TOKEN).unwrap();
    let users = api.users();

    let created = users
        .create(&User {
            connection: Some("Username-Password-Authentication".to_string()),
            email: Some("jane@example.com".to_string()),
            password: Some("Passw0rd!".to_string()),
            ..User::default()
        })
        .unwrap()
        .execute()
        .unwrap();
    let user_id = created.user_id.clone().unwrap();
    assert!(user_id.starts_with("auth0|"));

    // The `|` in the id must survive the path round trip.
    let fetched = users.get(&user_id, None).unwrap().execute().unwrap();
    assert_eq!(fetched.email.as_deref(), Some("jane@example.com"));

    let by_email = users
        .list_by_email("jane@example.com", None)
        .unwrap()
        .execute()
        .unwrap();
    assert_eq!(by_email.len(), 1);

    let page = users
        .list(Some(&UserFilter::new().with_totals(true)))
        .execute()
        .unwrap();
    assert_eq!(page.total, Some(1));

    assert_eq!(api.stats().get_active_users_count().execute().unwrap(), 1);

    let blocked = users
        .update(
            &user_id,
            &User {
                blocked: Some(true),
                ..User::default()
            },
        )
        .unwrap()
        .execute()
        .unwrap();
    assert_eq!(blocked.blocked, Some(true));
    assert_eq!(api.stats().get_active_users_count().execute().unwrap(), 0);

    users.delete(&user_id).unwrap().execute().unwrap();
    let err = users.get(&user_id, None).unwrap().execute().unwrap_err();
    assert_eq!(err.payload().and_then(|p| p.code()), Some("inexistent_user"));
}

#[test]
fn wrong_token_is_api_error_with_payload() {
    let api = ManagementApi::new(&start_server(), "stale-token").unwrap();
    let err = api.rules().list_all(None).execute().unwrap_err();
    assert_eq!(err.status(), Some(401));
    let payload = err.payload().unwrap();
    assert_eq!(payload.code(), Some("invalid_token"));
    assert_eq!(payload.description(), Some("Invalid token"));
}

#[test]
fn bearer_interceptor_replaces_placeholder_token() {
    let base_url = start_server();
    let current = Arc::new(Mutex::new("stale-token".to_string()));
    let provider = {
        let current = Arc::clone(&current);
        move || -> Result<String, ApiError> { Ok(current.lock().unwrap().clone()) }
    };
    let client = HttpClient::default().with_interceptor(BearerAuth::new(provider));
    let api = ManagementApi::with_client(&base_url, "placeholder", client).unwrap();

    let err = api.stats().get_active_users_count().execute().unwrap_err();
    assert_eq!(err.status(), Some(401));

    // Rotating the token reaches the already-built entities.
    *current.lock().unwrap() = TOKEN.to_string();
    assert_eq!(api.stats().get_active_users_count().execute().unwrap(), 0);
}

#[derive(Default)]
struct StatusLog {
    statuses: Mutex<Vec<u16>>,
    sent: AtomicUsize,
}

struct Observe(Arc<StatusLog>);

impl Interceptor for Observe {
    fn before_send(&self, _request: &mut HttpRequest) -> Result<(), ApiError> {
        self.0.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn after_receive(&self, _request: &HttpRequest, response: &HttpResponse) {
        self.0.statuses.lock().unwrap().push(response.status);
    }
}

#[test]
fn delete_against_live_server_yields_no_payload() {
    let log = Arc::new(StatusLog::default());
    let client = HttpClient::default().with_interceptor(Observe(Arc::clone(&log)));
    let api = ManagementApi::with_client(&start_server(), TOKEN, client).unwrap();

    let created = api
        .rules()
        .create(&Rule::new("to-delete", "function () {}"))
        .unwrap()
        .execute()
        .unwrap();
    let request = api.rules().delete(created.id.as_deref().unwrap()).unwrap();
    assert!(request.body().is_none());
    let () = request.execute().unwrap();

    assert_eq!(log.sent.load(Ordering::SeqCst), 2);
    assert_eq!(*log.statuses.lock().unwrap(), vec![201, 204]);
}

#[test]
fn unreachable_server_is_transport_failure() {
    // Bind then drop to get a port nobody listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let api = ManagementApi::new(&format!("http://{addr}/"), TOKEN).unwrap();
    let err = api.stats().get_active_users_count().execute().unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.status(), None);
}
