// rest_api/tests/api.rs

use std::sync::Arc;

use lib::seed::{seed_demo_data, DEMO_PASSWORD};
use lib::{open_sled_db, ClinicStorageEngine, SledClinicStorage, StorageConfig};
use models::RecordId;
use reqwest::{Client, Response, StatusCode};
use rest_api::{serve, RestApiConfig};
use security::TokenService;
use serde_json::{json, Value};
use tokio::net::TcpListener;

struct TestApp {
    base: String,
    client: Client,
    storage: Arc<SledClinicStorage>,
    config: RestApiConfig,
}

impl TestApp {
    async fn spawn() -> Self {
        let db = open_sled_db(&StorageConfig::temporary()).unwrap();
        let storage = Arc::new(SledClinicStorage::new(db).unwrap());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let config = RestApiConfig::default();

        let served: Arc<dyn ClinicStorageEngine> = storage.clone();
        let server_config = config.clone();
        tokio::spawn(async move {
            serve(listener, served, &server_config, std::future::pending()).await
        });

        TestApp {
            base: format!("http://{}/api", addr),
            client: Client::new(),
            storage,
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get(&self, path: &str) -> Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    async fn post(&self, path: &str, body: Value) -> Response {
        self.client.post(self.url(path)).json(&body).send().await.unwrap()
    }

    async fn put(&self, path: &str, body: Value) -> Response {
        self.client.put(self.url(path)).json(&body).send().await.unwrap()
    }

    async fn delete(&self, path: &str) -> Response {
        self.client.delete(self.url(path)).send().await.unwrap()
    }

    async fn create_patient(&self, name: &str, email: &str) -> String {
        let response = self
            .post("/patients", json!({ "name": name, "email": email, "password": "secret1" }))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().await.unwrap();
        body["id"].as_str().unwrap().to_string()
    }

    async fn create_appointment(&self, patient_id: &str) -> Value {
        let response = self
            .post(
                &format!("/patients/{}/appointments", patient_id),
                json!({
                    "provider": "Dr Kim West",
                    "datetime": "2025-09-16T16:30:00.000-07:00",
                    "repeat": "weekly",
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json().await.unwrap()
    }

    async fn create_prescription(&self, patient_id: &str) -> Value {
        let response = self
            .post(
                &format!("/patients/{}/prescriptions", patient_id),
                json!({
                    "medication": "Lexapro",
                    "dosage": "5mg",
                    "quantity": 2,
                    "refill_on": "2025-10-05",
                    "refill_schedule": "monthly",
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json().await.unwrap()
    }
}

async fn expect_error(response: Response, status: StatusCode, message: &str) {
    assert_eq!(response.status(), status);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], message);
    assert_eq!(body["detail"], message);
}

#[tokio::test]
async fn health_reports_service_name() {
    let app = TestApp::spawn().await;
    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "status": "healthy", "service": "clinic-portal-api" }));
}

#[tokio::test]
async fn created_patient_is_readable_without_password() {
    let app = TestApp::spawn().await;
    let id = app.create_patient("Ada Lovelace", "ada@example.com").await;

    let response = app.get(&format!("/patients/{}", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["_id"], id.as_str());
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["name"], "Ada Lovelace");
    assert_eq!(body["email"], "ada@example.com");
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = TestApp::spawn().await;
    app.create_patient("Ada", "ada@example.com").await;

    let response = app
        .post("/patients", json!({ "name": "Other", "email": "ada@example.com", "password": "secret1" }))
        .await;
    expect_error(response, StatusCode::CONFLICT, "A patient with this email already exists").await;
}

#[tokio::test]
async fn concurrent_duplicate_creates_admit_exactly_one() {
    let app = TestApp::spawn().await;
    let body = json!({ "name": "Twin", "email": "twin@example.com", "password": "secret1" });

    let (first, second) = tokio::join!(app.post("/patients", body.clone()), app.post("/patients", body));
    let mut statuses = vec![first.status(), second.status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[tokio::test]
async fn patient_input_is_validated() {
    let app = TestApp::spawn().await;

    let short_password = app
        .post("/patients", json!({ "name": "Ada", "email": "ada@example.com", "password": "12345" }))
        .await;
    assert_eq!(short_password.status(), StatusCode::BAD_REQUEST);

    let bad_email = app
        .post("/patients", json!({ "name": "Ada", "email": "not-an-email", "password": "secret1" }))
        .await;
    assert_eq!(bad_email.status(), StatusCode::BAD_REQUEST);

    let malformed = app
        .client
        .post(app.url("/patients"))
        .header("content-type", "application/json")
        .body("{\"name\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
    let body: Value = malformed.json().await.unwrap();
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn malformed_and_unknown_patient_ids() {
    let app = TestApp::spawn().await;

    expect_error(app.get("/patients/not-an-id").await, StatusCode::BAD_REQUEST, "Invalid patient ID").await;

    let unknown = RecordId::new();
    expect_error(
        app.get(&format!("/patients/{}", unknown)).await,
        StatusCode::NOT_FOUND,
        "Patient not found",
    )
    .await;
}

#[tokio::test]
async fn patient_updates() {
    let app = TestApp::spawn().await;
    let ada = app.create_patient("Ada", "ada@example.com").await;
    app.create_patient("Grace", "grace@example.com").await;
    let path = format!("/patients/{}", ada);

    expect_error(app.put(&path, json!({})).await, StatusCode::BAD_REQUEST, "No fields to update").await;
    expect_error(
        app.put(&path, json!({ "email": "grace@example.com" })).await,
        StatusCode::CONFLICT,
        "Email already in use",
    )
    .await;

    let response = app.put(&path, json!({ "name": "Ada King", "email": "ada@example.org" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "Ada King");
    assert_eq!(body["email"], "ada@example.org");

    // The old address is free again.
    app.create_patient("Ada Two", "ada@example.com").await;

    expect_error(
        app.put(&format!("/patients/{}", RecordId::new()), json!({ "name": "Nobody" })).await,
        StatusCode::NOT_FOUND,
        "Patient not found",
    )
    .await;
}

#[tokio::test]
async fn patient_list_carries_record_counts() {
    let app = TestApp::spawn().await;
    let ada = app.create_patient("Ada", "ada@example.com").await;
    let grace = app.create_patient("Grace", "grace@example.com").await;
    app.create_appointment(&ada).await;
    app.create_appointment(&ada).await;
    app.create_prescription(&ada).await;

    let response = app.get("/patients").await;
    assert_eq!(response.status(), StatusCode::OK);
    let list: Vec<Value> = response.json().await.unwrap();
    assert_eq!(list.len(), 2);

    let entry = |id: &str| list.iter().find(|p| p["id"] == id).cloned().unwrap();
    assert_eq!(entry(&ada)["appointment_count"], 2);
    assert_eq!(entry(&ada)["prescription_count"], 1);
    assert_eq!(entry(&ada)["appointments"].as_array().unwrap().len(), 2);
    assert_eq!(entry(&ada)["prescriptions"].as_array().unwrap().len(), 1);
    assert_eq!(entry(&grace)["appointment_count"], 0);
    assert_eq!(entry(&grace)["appointments"], json!([]));
    assert!(entry(&grace).get("password_hash").is_none());
}

#[tokio::test]
async fn login_and_current_patient() {
    let app = TestApp::spawn().await;
    seed_demo_data(app.storage.as_ref()).await.unwrap();

    let wrong_password = app
        .post("/auth/login", json!({ "email": "mark@some-email-provider.net", "password": "nope-nope" }))
        .await;
    let unknown_email = app
        .post("/auth/login", json!({ "email": "ghost@example.com", "password": DEMO_PASSWORD }))
        .await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let wrong_body: Value = wrong_password.json().await.unwrap();
    let unknown_body: Value = unknown_email.json().await.unwrap();
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["message"], "Invalid email or password");

    let response = app
        .post("/auth/login", json!({ "email": "mark@some-email-provider.net", "password": DEMO_PASSWORD }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["user"]["name"], "Mark Johnson");
    assert!(body["user"].get("password_hash").is_none());

    let me = app.client.get(app.url("/auth/me")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(me.status(), StatusCode::OK);
    let me_body: Value = me.json().await.unwrap();
    assert_eq!(me_body["id"], body["user"]["id"]);
    assert_eq!(me_body["email"], "mark@some-email-provider.net");
}

#[tokio::test]
async fn current_patient_requires_a_valid_token() {
    let app = TestApp::spawn().await;

    expect_error(app.get("/auth/me").await, StatusCode::UNAUTHORIZED, "Missing bearer token").await;

    let garbage = app.client.get(app.url("/auth/me")).bearer_auth("garbage").send().await.unwrap();
    expect_error(garbage, StatusCode::UNAUTHORIZED, "Invalid or expired token").await;

    let tokens = TokenService::new(app.config.jwt_secret.as_bytes(), app.config.token_ttl_hours);
    let orphan = tokens.issue(&RecordId::new().to_string()).unwrap();
    let response = app.client.get(app.url("/auth/me")).bearer_auth(orphan).send().await.unwrap();
    expect_error(response, StatusCode::UNAUTHORIZED, "User not found").await;
}

#[tokio::test]
async fn appointment_lifecycle() {
    let app = TestApp::spawn().await;
    let ada = app.create_patient("Ada", "ada@example.com").await;

    let missing_patient = app
        .post(
            &format!("/patients/{}/appointments", RecordId::new()),
            json!({ "provider": "Dr X", "datetime": "2025-01-01T10:00:00Z", "repeat": "weekly" }),
        )
        .await;
    expect_error(missing_patient, StatusCode::NOT_FOUND, "Patient not found").await;

    let created = app.create_appointment(&ada).await;
    assert_eq!(created["patient_id"], ada.as_str());
    assert_eq!(created["end_date"], Value::Null);
    let path = format!("/patients/{}/appointments/{}", ada, created["id"].as_str().unwrap());

    let response = app.put(&path, json!({ "end_date": "2025-12-31" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["end_date"], "2025-12-31");
    assert_eq!(body["provider"], "Dr Kim West");

    let response = app.put(&path, json!({ "end_date": null })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["end_date"], Value::Null);

    expect_error(app.put(&path, json!({})).await, StatusCode::BAD_REQUEST, "No fields to update").await;
    expect_error(
        app.put(&path, json!({ "provider": null })).await,
        StatusCode::BAD_REQUEST,
        "No fields to update",
    )
    .await;

    let list: Vec<Value> = app.get(&format!("/patients/{}/appointments", ada)).await.json().await.unwrap();
    assert_eq!(list.len(), 1);

    let response = app.delete(&path).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Appointment deleted");
    expect_error(app.delete(&path).await, StatusCode::NOT_FOUND, "Appointment not found").await;
}

#[tokio::test]
async fn records_of_another_patient_are_not_found() {
    let app = TestApp::spawn().await;
    let ada = app.create_patient("Ada", "ada@example.com").await;
    let grace = app.create_patient("Grace", "grace@example.com").await;
    let appointment = app.create_appointment(&ada).await;
    let prescription = app.create_prescription(&ada).await;

    let foreign_appointment = format!("/patients/{}/appointments/{}", grace, appointment["id"].as_str().unwrap());
    expect_error(
        app.put(&foreign_appointment, json!({ "provider": "Dr Evil" })).await,
        StatusCode::NOT_FOUND,
        "Appointment not found",
    )
    .await;
    expect_error(app.delete(&foreign_appointment).await, StatusCode::NOT_FOUND, "Appointment not found").await;

    let foreign_prescription = format!("/patients/{}/prescriptions/{}", grace, prescription["id"].as_str().unwrap());
    expect_error(
        app.put(&foreign_prescription, json!({ "quantity": 9 })).await,
        StatusCode::NOT_FOUND,
        "Prescription not found",
    )
    .await;
    expect_error(app.delete(&foreign_prescription).await, StatusCode::NOT_FOUND, "Prescription not found").await;

    // Untouched for the owner.
    let list: Vec<Value> = app.get(&format!("/patients/{}/prescriptions", ada)).await.json().await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["quantity"], 2);
}

#[tokio::test]
async fn malformed_record_ids_name_the_identifier() {
    let app = TestApp::spawn().await;
    let ada = app.create_patient("Ada", "ada@example.com").await;

    expect_error(
        app.delete(&format!("/patients/{}/appointments/xyz", ada)).await,
        StatusCode::BAD_REQUEST,
        "Invalid appointment ID",
    )
    .await;
    expect_error(
        app.delete(&format!("/patients/{}/prescriptions/xyz", ada)).await,
        StatusCode::BAD_REQUEST,
        "Invalid prescription ID",
    )
    .await;
    expect_error(
        app.get("/patients/xyz/prescriptions").await,
        StatusCode::BAD_REQUEST,
        "Invalid patient ID",
    )
    .await;
}

#[tokio::test]
async fn prescription_lifecycle() {
    let app = TestApp::spawn().await;
    let ada = app.create_patient("Ada", "ada@example.com").await;

    let zero = app
        .post(
            &format!("/patients/{}/prescriptions", ada),
            json!({
                "medication": "Lexapro",
                "dosage": "5mg",
                "quantity": 0,
                "refill_on": "2025-10-05",
                "refill_schedule": "monthly",
            }),
        )
        .await;
    assert_eq!(zero.status(), StatusCode::BAD_REQUEST);

    let created = app.create_prescription(&ada).await;
    let path = format!("/patients/{}/prescriptions/{}", ada, created["id"].as_str().unwrap());

    let response = app.put(&path, json!({ "quantity": 3, "refill_schedule": "weekly" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["quantity"], 3);
    assert_eq!(body["refill_schedule"], "weekly");
    assert_eq!(body["medication"], "Lexapro");

    expect_error(app.put(&path, json!({})).await, StatusCode::BAD_REQUEST, "No fields to update").await;

    let response = app.delete(&path).await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Prescription deleted");
}

#[tokio::test]
async fn reference_lists_follow_the_seed() {
    let app = TestApp::spawn().await;
    let empty: Vec<String> = app.get("/reference/medications").await.json().await.unwrap();
    assert!(empty.is_empty());

    seed_demo_data(app.storage.as_ref()).await.unwrap();

    let medications: Vec<String> = app.get("/reference/medications").await.json().await.unwrap();
    let dosages: Vec<String> = app.get("/reference/dosages").await.json().await.unwrap();
    assert_eq!(medications.len(), 7);
    assert_eq!(dosages.len(), 11);
    assert!(medications.contains(&"Lexapro".to_string()));
}
