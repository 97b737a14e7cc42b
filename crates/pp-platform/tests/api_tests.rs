//! Platform API Integration Tests
//!
//! Drives the assembled router against an in-memory database.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Datelike, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use pp_platform::repository;
use pp_platform::service::{Argon2Config, AuthConfig, PasswordService};
use pp_platform::{build_router, PlatformServices};

const TEST_SECRET: &str = "integration-test-secret-at-least-32-chars";

struct TestApp {
    router: Router,
}

impl TestApp {
    async fn new() -> Self {
        let pool = repository::connect("sqlite::memory:", 1).await.unwrap();
        repository::init_schema(&pool).await.unwrap();

        let services = PlatformServices::new(
            &pool,
            AuthConfig::new(TEST_SECRET),
            PasswordService::new(Argon2Config::minimal()),
        );
        services.ensure_bootstrap_admin("admin", "admin-password").await.unwrap();

        Self {
            router: build_router(&services),
        }
    }

    async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .post("/api/auth/login", None, json!({ "username": username, "password": password }))
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["accessToken"].as_str().unwrap().to_string()
    }

    /// Register a club and return (token, club id).
    async fn club(&self, username: &str) -> (String, String) {
        let (status, body) = self
            .post(
                "/api/auth/register/club",
                None,
                json!({
                    "username": username,
                    "password": "club-password",
                    "name": format!("{} FC", username),
                    "sport": "football"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "club registration failed: {}", body);
        let id = body["club"]["id"].as_str().unwrap().to_string();
        (self.login(username, "club-password").await, id)
    }

    /// Register a sponsor and return (token, sponsor id).
    async fn sponsor(&self, username: &str) -> (String, String) {
        let (status, body) = self
            .post(
                "/api/auth/register/sponsor",
                None,
                json!({
                    "username": username,
                    "password": "sponsor-password",
                    "companyName": format!("{} GmbH", username)
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "sponsor registration failed: {}", body);
        let id = body["sponsor"]["id"].as_str().unwrap().to_string();
        (self.login(username, "sponsor-password").await, id)
    }
}

mod public_tests {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new().await;
        let (status, body) = app.get("/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_openapi_document() {
        let app = TestApp::new().await;
        let (status, body) = app.get("/q/openapi", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["info"]["title"], "Pitch Partner API");
        assert!(body["paths"]["/api/club/invoices"].is_object());
        assert!(body["components"]["securitySchemes"]["bearer_auth"].is_object());
    }
}

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let app = TestApp::new().await;
        let (status, body) = app.get("/api/club/budgets", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "UNAUTHORIZED");

        let (status, _) = app.get("/api/messages", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let app = TestApp::new().await;
        let (status, _) = app.get("/api/auth/me", Some("not-a-jwt")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_role_is_forbidden() {
        let app = TestApp::new().await;
        let (sponsor_token, _) = app.sponsor("acme").await;
        let (club_token, _) = app.club("rovers").await;

        let (status, _) = app.get("/api/club/budgets", Some(&sponsor_token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app.get("/api/admin/clubs", Some(&club_token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app.get("/api/sponsor/marketplace", Some(&club_token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let app = TestApp::new().await;
        let (status, _) = app
            .post("/api/auth/login", None, json!({ "username": "admin", "password": "wrong-password" }))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let app = TestApp::new().await;
        app.club("rovers").await;
        let (status, _) = app
            .post(
                "/api/auth/register/sponsor",
                None,
                json!({ "username": "rovers", "password": "another-password", "companyName": "Dup" }),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_me_includes_profile() {
        let app = TestApp::new().await;
        let (token, club_id) = app.club("rovers").await;
        let (status, body) = app.get("/api/auth/me", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["account"]["role"], "club");
        assert_eq!(body["club"]["id"], club_id.as_str());
        assert!(body.get("sponsor").is_none());
    }

    #[tokio::test]
    async fn test_deactivated_account_cannot_login() {
        let app = TestApp::new().await;
        let admin = app.login("admin", "admin-password").await;
        let (_, club_id) = app.club("rovers").await;

        let (status, _) = app
            .put(
                &format!("/api/admin/accounts/{}/status", club_id),
                Some(&admin),
                json!({ "active": false }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app
            .post("/api/auth/login", None, json!({ "username": "rovers", "password": "club-password" }))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

mod budget_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_fetch_with_spend() {
        let app = TestApp::new().await;
        let (token, _) = app.club("rovers").await;

        let (status, budget) = app
            .post(
                "/api/club/budgets",
                Some(&token),
                json!({ "name": "Youth academy", "season": "2024/25", "totalCents": 100000 }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = budget["id"].as_str().unwrap().to_string();

        let (status, _) = app
            .post(
                &format!("/api/club/budgets/{}/expenses", id),
                Some(&token),
                json!({ "description": "Kits", "amountCents": 25000, "spentOn": "2024-09-01" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, fetched) = app.get(&format!("/api/club/budgets/{}", id), Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["name"], "Youth academy");
        assert_eq!(fetched["spentCents"], 25000);
        assert_eq!(fetched["remainingCents"], 75000);
    }

    #[tokio::test]
    async fn test_other_club_forbidden_and_absent_not_found() {
        let app = TestApp::new().await;
        let (owner, _) = app.club("rovers").await;
        let (other, _) = app.club("united").await;

        let (_, budget) = app
            .post(
                "/api/club/budgets",
                Some(&owner),
                json!({ "name": "Stadium", "season": "2024/25", "totalCents": 5000 }),
            )
            .await;
        let id = budget["id"].as_str().unwrap();

        let (status, _) = app.get(&format!("/api/club/budgets/{}", id), Some(&other)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app.get("/api/club/budgets/does-not-exist", Some(&owner)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, list) = app.get("/api/club/budgets", Some(&other)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let app = TestApp::new().await;
        let (token, _) = app.club("rovers").await;
        let (status, body) = app
            .post("/api/club/budgets", Some(&token), json!({ "name": "No season" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }
}

mod contract_tests {
    use super::*;

    async fn draft(app: &TestApp, club: &str, sponsor_id: &str) -> Value {
        let (status, contract) = app
            .post(
                "/api/club/contracts",
                Some(club),
                json!({
                    "sponsorId": sponsor_id,
                    "title": "Shirt sponsorship",
                    "valueCents": 1500000,
                    "startDate": "2024-07-01",
                    "endDate": "2025-06-30"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", contract);
        contract
    }

    #[tokio::test]
    async fn test_send_view_sign_flow() {
        let app = TestApp::new().await;
        let (club, _) = app.club("rovers").await;
        let (sponsor, sponsor_id) = app.sponsor("acme").await;

        let contract = draft(&app, &club, &sponsor_id).await;
        let id = contract["id"].as_str().unwrap();
        assert_eq!(contract["status"], "draft");

        // Drafts stay hidden from the sponsor
        let (status, _) = app.get(&format!("/api/sponsor/contracts/{}", id), Some(&sponsor)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, sent) = app
            .request(Method::POST, &format!("/api/club/contracts/{}/send", id), Some(&club), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sent["status"], "sent");
        let token = sent["signToken"].as_str().unwrap().to_string();

        let (status, notifications) = app.get("/api/notifications", Some(&sponsor)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(notifications.as_array().unwrap().len(), 1);

        let (status, viewed) = app.get(&format!("/api/contracts/sign/{}", token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(viewed["status"], "viewed");
        assert_eq!(viewed["clubName"], "rovers FC");
        assert!(viewed.get("signToken").is_none());

        let (status, _) = app
            .post(&format!("/api/contracts/sign/{}", token), None, json!({ "signerName": "  " }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, signed) = app
            .post(&format!("/api/contracts/sign/{}", token), None, json!({ "signerName": "Jane Doe" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(signed["status"], "signed");
        assert_eq!(signed["signedBy"], "Jane Doe");

        let (status, _) = app
            .post(&format!("/api/contracts/sign/{}", token), None, json!({ "signerName": "Jane Doe" }))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = app
            .put(&format!("/api/club/contracts/{}", id), Some(&club), json!({ "title": "Changed" }))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_unknown_sign_token() {
        let app = TestApp::new().await;
        let (status, _) = app.get("/api/contracts/sign/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_contract_for_unknown_sponsor() {
        let app = TestApp::new().await;
        let (club, _) = app.club("rovers").await;
        let (status, _) = app
            .post(
                "/api/club/contracts",
                Some(&club),
                json!({
                    "sponsorId": "ghost",
                    "title": "Nothing",
                    "valueCents": 1,
                    "startDate": "2024-07-01",
                    "endDate": "2024-07-02"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

mod invoice_tests {
    use super::*;

    #[tokio::test]
    async fn test_numbers_are_sequential_per_year() {
        let app = TestApp::new().await;
        let (club, _) = app.club("rovers").await;
        let (other_club, _) = app.club("united").await;
        let (_, sponsor_id) = app.sponsor("acme").await;
        let year = Utc::now().year();

        let mut numbers = Vec::new();
        for token in [&club, &other_club] {
            let (status, invoice) = app
                .post(
                    "/api/club/invoices",
                    Some(token),
                    json!({ "sponsorId": sponsor_id, "amountCents": 10000, "dueDate": format!("{}-12-31", year) }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{}", invoice);
            assert_eq!(invoice["status"], "draft");
            numbers.push(invoice["invoiceNumber"].as_str().unwrap().to_string());
        }

        assert_eq!(numbers[0], format!("PP-{}-0001", year));
        assert_eq!(numbers[1], format!("PP-{}-0002", year));
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let app = TestApp::new().await;
        let (club, _) = app.club("rovers").await;
        let (sponsor, sponsor_id) = app.sponsor("acme").await;

        let (_, invoice) = app
            .post(
                "/api/club/invoices",
                Some(&club),
                json!({
                    "sponsorId": sponsor_id,
                    "amountCents": 10000,
                    "issueDate": "2024-03-01",
                    "dueDate": "2024-03-31"
                }),
            )
            .await;
        assert_eq!(invoice["invoiceNumber"], "PP-2024-0001");
        let uri = format!("/api/club/invoices/{}/status", invoice["id"].as_str().unwrap());

        let (status, _) = app.put(&uri, Some(&club), json!({ "status": "paid" })).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, sent) = app.put(&uri, Some(&club), json!({ "status": "sent" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sent["status"], "sent");

        let (status, list) = app.get("/api/sponsor/invoices", Some(&sponsor)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_due_before_issue_rejected() {
        let app = TestApp::new().await;
        let (club, _) = app.club("rovers").await;
        let (_, sponsor_id) = app.sponsor("acme").await;
        let (status, _) = app
            .post(
                "/api/club/invoices",
                Some(&club),
                json!({
                    "sponsorId": sponsor_id,
                    "amountCents": 10000,
                    "issueDate": "2024-03-10",
                    "dueDate": "2024-03-01"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

mod inventory_tests {
    use super::*;

    #[tokio::test]
    async fn test_overbooking_is_conflict() {
        let app = TestApp::new().await;
        let (club, _) = app.club("rovers").await;

        let (status, asset) = app
            .post(
                "/api/club/assets",
                Some(&club),
                json!({ "name": "VIP box", "assetType": "hospitality", "quantity": 2 }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/api/club/assets/{}/bookings", asset["id"].as_str().unwrap());

        let booking = json!({
            "startsAt": "2024-09-14T12:00:00Z",
            "endsAt": "2024-09-14T18:00:00Z",
            "quantity": 2
        });
        let (status, first) = app.post(&uri, Some(&club), booking.clone()).await;
        assert_eq!(status, StatusCode::CREATED);

        let overlapping = json!({
            "startsAt": "2024-09-14T16:00:00Z",
            "endsAt": "2024-09-14T20:00:00Z"
        });
        let (status, _) = app.post(&uri, Some(&club), overlapping.clone()).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let cancel = format!("/api/club/bookings/{}/cancel", first["id"].as_str().unwrap());
        let (status, cancelled) = app.request(Method::PUT, &cancel, Some(&club), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cancelled["status"], "cancelled");

        let (status, _) = app.post(&uri, Some(&club), overlapping).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_capacity_at_i64_limit_is_conflict() {
        let app = TestApp::new().await;
        let (club, _) = app.club("rovers").await;

        let (status, asset) = app
            .post(
                "/api/club/assets",
                Some(&club),
                json!({ "name": "Season tickets", "assetType": "ticketing", "quantity": i64::MAX }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/api/club/assets/{}/bookings", asset["id"].as_str().unwrap());

        let window = |quantity: i64| {
            json!({
                "startsAt": "2024-09-14T12:00:00Z",
                "endsAt": "2024-09-14T18:00:00Z",
                "quantity": quantity
            })
        };
        let (status, _) = app.post(&uri, Some(&club), window(i64::MAX)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = app.post(&uri, Some(&club), window(1)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_blank_sponsor_releases_right() {
        let app = TestApp::new().await;
        let (club, _) = app.club("rovers").await;
        let (_, acme) = app.sponsor("acme").await;

        let (_, right) = app
            .post(
                "/api/club/rights",
                Some(&club),
                json!({
                    "name": "Sleeve logo",
                    "category": "apparel",
                    "sponsorId": acme,
                    "startDate": "2024-07-01",
                    "endDate": "2025-06-30"
                }),
            )
            .await;
        let uri = format!("/api/club/rights/{}", right["id"].as_str().unwrap());

        let (status, renamed) = app.put(&uri, Some(&club), json!({ "name": "Left sleeve" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(renamed["sponsorId"], acme.as_str());

        let (status, released) = app.put(&uri, Some(&club), json!({ "sponsorId": "" })).await;
        assert_eq!(status, StatusCode::OK);
        assert!(released["sponsorId"].is_null());

        let (_, fetched) = app.get(&uri, Some(&club)).await;
        assert!(fetched["sponsorId"].is_null());
    }

    #[tokio::test]
    async fn test_exclusive_right_conflict() {
        let app = TestApp::new().await;
        let (club, _) = app.club("rovers").await;
        let (_, acme) = app.sponsor("acme").await;
        let (_, globex) = app.sponsor("globex").await;

        let (status, _) = app
            .post(
                "/api/club/rights",
                Some(&club),
                json!({
                    "name": "Official beverage",
                    "category": "beverages",
                    "exclusive": true,
                    "sponsorId": acme,
                    "startDate": "2024-07-01",
                    "endDate": "2025-06-30"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = app
            .post(
                "/api/club/rights",
                Some(&club),
                json!({
                    "name": "Stadium drinks",
                    "category": "Beverages",
                    "sponsorId": globex,
                    "startDate": "2025-01-01",
                    "endDate": "2025-12-31"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        // Same category after the exclusive window closes
        let (status, _) = app
            .post(
                "/api/club/rights",
                Some(&club),
                json!({
                    "name": "Stadium drinks",
                    "category": "beverages",
                    "sponsorId": globex,
                    "startDate": "2025-07-01",
                    "endDate": "2026-06-30"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

mod marketplace_tests {
    use super::*;

    #[tokio::test]
    async fn test_apply_and_decide() {
        let app = TestApp::new().await;
        let (club, _) = app.club("rovers").await;
        let (sponsor, _) = app.sponsor("acme").await;

        let (status, opportunity) = app
            .post(
                "/api/club/opportunities",
                Some(&club),
                json!({ "title": "Stadium naming", "category": "naming", "priceCents": 900000 }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", opportunity);
        let id = opportunity["id"].as_str().unwrap();

        let (status, listed) = app.get("/api/sponsor/marketplace", Some(&sponsor)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let apply = format!("/api/sponsor/marketplace/{}/apply", id);
        let (status, application) = app
            .post(&apply, Some(&sponsor), json!({ "message": "Interested" }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(application["status"], "pending");

        let (status, _) = app.post(&apply, Some(&sponsor), json!({})).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let decide = format!(
            "/api/club/opportunities/applications/{}",
            application["id"].as_str().unwrap()
        );
        let (status, decided) = app.put(&decide, Some(&club), json!({ "status": "accepted" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(decided["status"], "accepted");

        let (status, _) = app.put(&decide, Some(&club), json!({ "status": "rejected" })).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}

mod messaging_tests {
    use super::*;

    #[tokio::test]
    async fn test_message_flow() {
        let app = TestApp::new().await;
        let (club, club_id) = app.club("rovers").await;
        let (sponsor, sponsor_id) = app.sponsor("acme").await;
        let (outsider, _) = app.club("united").await;

        let (status, _) = app
            .post("/api/messages", Some(&club), json!({ "recipientId": club_id, "body": "Hi me" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, message) = app
            .post(
                "/api/messages",
                Some(&club),
                json!({ "recipientId": sponsor_id, "subject": "Renewal", "body": "Shall we talk?" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", message);
        let id = message["id"].as_str().unwrap();

        let (status, inbox) = app.get("/api/messages?box=inbox", Some(&sponsor)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(inbox.as_array().unwrap().len(), 1);

        let (status, _) = app.get(&format!("/api/messages/{}", id), Some(&outsider)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let read = format!("/api/messages/{}/read", id);
        let (status, _) = app.request(Method::PUT, &read, Some(&club), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, marked) = app.request(Method::PUT, &read, Some(&sponsor), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(marked["readAt"].is_string());

        let (status, unread) = app.get("/api/notifications?unread=true", Some(&sponsor)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(unread.as_array().unwrap().len(), 1);
    }
}

mod admin_tests {
    use super::*;

    #[tokio::test]
    async fn test_crm_and_audit_trail() {
        let app = TestApp::new().await;
        let admin = app.login("admin", "admin-password").await;
        let (_, club_id) = app.club("rovers").await;

        let (status, clubs) = app.get("/api/admin/clubs", Some(&admin)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(clubs.as_array().unwrap().len(), 1);

        let (status, _) = app
            .post(
                "/api/admin/notes",
                Some(&admin),
                json!({ "entityType": "club", "entityId": club_id, "body": "Met at expo" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = app
            .post(
                "/api/admin/notes",
                Some(&admin),
                json!({ "entityType": "club", "entityId": "ghost", "body": "Nobody" }),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app.post("/api/admin/tags", Some(&admin), json!({ "name": "vip" })).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = app.post("/api/admin/tags", Some(&admin), json!({ "name": "vip" })).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, page) = app
            .get("/api/admin/audit-logs?entityType=Note", Some(&admin))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["items"].as_array().unwrap().len(), 1);
        assert_eq!(page["limit"], 50);
    }
}

mod round_trip_tests {
    use super::*;

    #[tokio::test]
    async fn test_created_bodies_match_fetched_bodies() {
        let app = TestApp::new().await;
        let (club, _) = app.club("rovers").await;
        let (_, sponsor_id) = app.sponsor("acme").await;

        let cases = [
            (
                "/api/club/budgets",
                json!({ "name": "Youth academy", "season": "2024/25", "totalCents": 100000 }),
            ),
            (
                "/api/club/assets",
                json!({ "name": "LED board", "assetType": "digital", "quantity": 4 }),
            ),
            (
                "/api/club/rights",
                json!({
                    "name": "Official beverage",
                    "category": "beverages",
                    "exclusive": true,
                    "sponsorId": sponsor_id,
                    "startDate": "2024-07-01",
                    "endDate": "2025-06-30"
                }),
            ),
            (
                "/api/club/contracts",
                json!({
                    "sponsorId": sponsor_id,
                    "title": "Shirt sponsorship",
                    "valueCents": 1500000,
                    "startDate": "2024-07-01",
                    "endDate": "2025-06-30"
                }),
            ),
            (
                "/api/club/invoices",
                json!({ "sponsorId": sponsor_id, "amountCents": 10000, "issueDate": "2024-03-01", "dueDate": "2024-03-31" }),
            ),
            (
                "/api/club/opportunities",
                json!({ "title": "Stadium naming", "category": "naming", "priceCents": 900000 }),
            ),
        ];

        for (collection, body) in cases {
            let (status, created) = app.post(collection, Some(&club), body).await;
            assert_eq!(status, StatusCode::CREATED, "{}: {}", collection, created);
            let uri = format!("{}/{}", collection, created["id"].as_str().unwrap());
            let (status, fetched) = app.get(&uri, Some(&club)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(created, fetched, "{} changed between create and fetch", collection);
        }
    }

    #[tokio::test]
    async fn test_booking_with_sub_millisecond_instants() {
        let app = TestApp::new().await;
        let (club, _) = app.club("rovers").await;
        let (_, asset) = app
            .post(
                "/api/club/assets",
                Some(&club),
                json!({ "name": "VIP box", "assetType": "hospitality", "quantity": 1 }),
            )
            .await;
        let uri = format!("/api/club/assets/{}/bookings", asset["id"].as_str().unwrap());

        let (status, created) = app
            .post(
                &uri,
                Some(&club),
                json!({
                    "startsAt": "2024-09-14T12:00:00.123456789Z",
                    "endsAt": "2024-09-14T18:00:00.987654321Z"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["startsAt"], "2024-09-14T12:00:00.123Z");

        let (_, listed) = app.get(&uri, Some(&club)).await;
        assert_eq!(listed[0], created);
    }
}

mod calendar_tests {
    use super::*;

    async fn event(app: &TestApp, club: &str, title: &str, starts_at: &str, ends_at: &str) -> Value {
        let (status, event) = app
            .post(
                "/api/club/calendar",
                Some(club),
                json!({ "title": title, "eventType": "match", "startsAt": starts_at, "endsAt": ends_at }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", event);
        event
    }

    #[tokio::test]
    async fn test_window_filter() {
        let app = TestApp::new().await;
        let (club, _) = app.club("rovers").await;
        let september = event(&app, &club, "Derby", "2024-09-14T15:00:00Z", "2024-09-14T17:00:00Z").await;
        event(&app, &club, "Cup tie", "2024-10-05T15:00:00Z", "2024-10-05T17:00:00Z").await;

        let (status, all) = app.get("/api/club/calendar", Some(&club)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().unwrap().len(), 2);

        let (status, window) = app
            .get(
                "/api/club/calendar?from=2024-09-01T00:00:00Z&to=2024-09-30T23:59:59Z",
                Some(&club),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(window.as_array().unwrap().len(), 1);
        assert_eq!(window[0], september);
    }

    #[tokio::test]
    async fn test_malformed_window_is_bad_request() {
        let app = TestApp::new().await;
        let (club, _) = app.club("rovers").await;

        let (status, body) = app
            .get(
                "/api/club/calendar?from=2024-09-30T00:00:00Z&to=2024-09-01T00:00:00Z",
                Some(&club),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");

        let (status, _) = app.get("/api/club/calendar?from=yesterday", Some(&club)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_ownership() {
        let app = TestApp::new().await;
        let (owner, _) = app.club("rovers").await;
        let (other, _) = app.club("united").await;
        let created = event(&app, &owner, "Derby", "2024-09-14T15:00:00Z", "2024-09-14T17:00:00Z").await;
        let uri = format!("/api/club/calendar/{}", created["id"].as_str().unwrap());

        let (status, _) = app.delete(&uri, Some(&other)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app.delete(&uri, Some(&owner)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = app.delete(&uri, Some(&owner)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

mod profile_tests {
    use super::*;

    #[tokio::test]
    async fn test_club_profile_update_then_fetch() {
        let app = TestApp::new().await;
        let (club, club_id) = app.club("rovers").await;

        let (status, updated) = app
            .put(
                "/api/club/profile",
                Some(&club),
                json!({ "city": "Bristol", "contactEmail": "office@rovers.example" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], club_id.as_str());
        assert_eq!(updated["city"], "Bristol");
        assert_eq!(updated["name"], "rovers FC");

        let (status, fetched) = app.get("/api/club/profile", Some(&club)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, updated);

        let (status, _) = app.put("/api/club/profile", Some(&club), json!({ "name": " " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_sponsor_profile_update_then_fetch() {
        let app = TestApp::new().await;
        let (sponsor, _) = app.sponsor("acme").await;

        let (status, updated) = app
            .put(
                "/api/sponsor/profile",
                Some(&sponsor),
                json!({ "industry": "Beverages", "website": "https://acme.example" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["companyName"], "acme GmbH");

        let (status, fetched) = app.get("/api/sponsor/profile", Some(&sponsor)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, updated);
        assert_eq!(fetched["industry"], "Beverages");
    }
}

mod query_tests {
    use super::*;

    #[tokio::test]
    async fn test_malformed_query_is_json_validation_error() {
        let app = TestApp::new().await;
        let (sponsor, _) = app.sponsor("acme").await;

        let (status, body) = app.get("/api/notifications?unread=maybe", Some(&sponsor)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");

        let (status, body) = app.get("/api/messages?box=trash", Some(&sponsor)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }
}
