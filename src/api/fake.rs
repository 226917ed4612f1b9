//! In-process stand-in for the elder-care backend, used by async tests.

use crate::api::ApiClient;
use crate::models::{
    Assignment, Caregiver, Credentials, Elderly, Medication, NewAssignment, NewCaregiver,
    NewElderly, NewMedication, NewTask, SalaryComponent, SalaryUpdate, Task, User,
};
use crate::session::Session;
use axum::extract::{Path, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const TOKEN: &str = "test-token";
pub const PASSWORD: &str = "secret";

pub fn demo_user() -> User {
    User {
        id: 1,
        email: "nurse@example.com".into(),
        full_name: "Dana Levi".into(),
        is_active: true,
    }
}

#[derive(Default)]
struct Db {
    caregivers: BTreeMap<u64, Caregiver>,
    elderly: BTreeMap<u64, Elderly>,
    assignments: Vec<Assignment>,
    users: Vec<User>,
    next_id: u64,
}

impl Db {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn caregiver_view(&self, caregiver: &Caregiver) -> Caregiver {
        let mut view = caregiver.clone();
        view.assignments = self
            .assignments
            .iter()
            .filter(|a| a.caregiver_id == caregiver.id)
            .cloned()
            .collect();
        view
    }

    fn elderly_view(&self, elderly: &Elderly) -> Elderly {
        let mut view = elderly.clone();
        view.assignments = self
            .assignments
            .iter()
            .filter(|a| a.elderly_id == elderly.id)
            .cloned()
            .collect();
        view
    }
}

#[derive(Default)]
struct Shared {
    db: Mutex<Db>,
    requests: AtomicUsize,
    reject_token: AtomicBool,
    fail_status: Mutex<Option<StatusCode>>,
}

type Fake = Arc<Shared>;
type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn fail(status: StatusCode, detail: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": detail })))
}

pub struct FakeBackend {
    url: String,
    shared: Fake,
    dir: TempDir,
}

impl FakeBackend {
    pub async fn start() -> FakeBackend {
        let shared: Fake = Arc::default();
        shared.db.lock().unwrap().users.push(demo_user());

        let app = router(shared.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        FakeBackend {
            url: format!("http://{}", addr),
            shared,
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn session(&self) -> Session {
        Session::new(self.dir.path().join("session.json"))
    }

    pub fn download_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("downloads")
    }

    /// Client signed in with the token the fake accepts.
    pub fn client(&self) -> ApiClient {
        let session = self.session();
        session.save(TOKEN, demo_user()).unwrap();
        ApiClient::new(&self.url, session)
    }

    pub fn client_signed_out(&self) -> ApiClient {
        let session = self.session();
        session.clear().unwrap();
        ApiClient::new(&self.url, session)
    }

    pub fn request_count(&self) -> usize {
        self.shared.requests.load(Ordering::SeqCst)
    }

    pub fn reject_token(&self) {
        self.shared.reject_token.store(true, Ordering::SeqCst);
    }

    pub fn fail_with(&self, status: StatusCode) {
        *self.shared.fail_status.lock().unwrap() = Some(status);
    }

    pub fn seed_caregiver(&self, name: &str, prices: [f64; 3]) -> u64 {
        let mut db = self.shared.db.lock().unwrap();
        let id = db.next_id();
        let component = |price: f64| SalaryComponent {
            price,
            amount: 1.0,
            total: price,
        };
        db.caregivers.insert(
            id,
            Caregiver {
                id,
                name: name.to_string(),
                custom_id: Some(id + 100),
                bank_name: "Leumi".into(),
                bank_account: "12345".into(),
                branch_number: "800".into(),
                salary: component(prices[0]),
                allowance: component(prices[1]),
                saturday: component(prices[2]),
                total_bank: prices.iter().sum(),
                assignments: Vec::new(),
            },
        );
        id
    }

    pub fn seed_elderly(&self, name: &str) -> u64 {
        let mut db = self.shared.db.lock().unwrap();
        let id = db.next_id();
        db.elderly.insert(
            id,
            Elderly {
                id,
                name: name.to_string(),
                custom_id: Some(id + 500),
                assignments: Vec::new(),
                tasks: Vec::new(),
                medications: Vec::new(),
            },
        );
        id
    }

    pub fn seed_assignment(&self, caregiver_id: u64, elderly_id: u64) -> u64 {
        let mut db = self.shared.db.lock().unwrap();
        let id = db.next_id();
        db.assignments.push(Assignment {
            id,
            caregiver_id,
            elderly_id,
        });
        id
    }

    /// Removes the record but leaves assignment rows pointing at it.
    pub fn drop_elderly_record(&self, id: u64) {
        self.shared.db.lock().unwrap().elderly.remove(&id);
    }

    pub fn assignments(&self) -> Vec<Assignment> {
        self.shared.db.lock().unwrap().assignments.clone()
    }

    pub fn elderly_record(&self, id: u64) -> Option<Elderly> {
        self.shared.db.lock().unwrap().elderly.get(&id).cloned()
    }

    pub fn caregiver_record(&self, id: u64) -> Option<Caregiver> {
        self.shared.db.lock().unwrap().caregivers.get(&id).cloned()
    }
}

fn router(shared: Fake) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/me", get(me))
        .route("/caregivers", get(list_caregivers).post(create_caregiver))
        .route("/caregivers/:id", get(get_caregiver).delete(delete_caregiver))
        .route("/caregivers/:id/update-salary", put(update_salary))
        .route("/caregivers/:id/generate-pdf", get(generate_pdf))
        .route("/elderly", get(list_elderly).post(create_elderly))
        .route("/elderly/:id", get(get_elderly).delete(delete_elderly))
        .route("/elderly/:id/tasks", post(add_task))
        .route("/elderly/:id/medications", post(add_medication))
        .route(
            "/caregiver-assignments",
            get(list_assignments).post(create_assignment),
        )
        .route("/caregiver-assignments/:id", delete(delete_assignment))
        .layer(middleware::from_fn_with_state(shared.clone(), gate))
        .with_state(shared)
}

async fn gate(State(shared): State<Fake>, req: Request, next: Next) -> Response {
    shared.requests.fetch_add(1, Ordering::SeqCst);

    let forced = *shared.fail_status.lock().unwrap();
    if let Some(status) = forced {
        return fail(status, "forced failure").into_response();
    }

    if req.uri().path().starts_with("/auth/") && req.uri().path() != "/auth/me" {
        return next.run(req).await;
    }

    let authorized = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false);
    if !authorized || shared.reject_token.load(Ordering::SeqCst) {
        return fail(StatusCode::UNAUTHORIZED, "Could not validate credentials").into_response();
    }
    next.run(req).await
}

async fn login(State(shared): State<Fake>, Json(body): Json<Credentials>) -> Reply {
    let db = shared.db.lock().unwrap();
    match db.users.iter().find(|u| u.email == body.email) {
        Some(user) if body.password == PASSWORD => Ok(Json(json!({
            "access_token": TOKEN,
            "token_type": "bearer",
            "user_id": user.id,
            "email": user.email,
            "full_name": user.full_name,
        }))),
        _ => Err(fail(
            StatusCode::UNAUTHORIZED,
            "Incorrect email or password",
        )),
    }
}

async fn register(State(shared): State<Fake>, Json(body): Json<Value>) -> Reply {
    let mut db = shared.db.lock().unwrap();
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if db.users.iter().any(|u| u.email == email) {
        return Err(fail(StatusCode::BAD_REQUEST, "Email already registered"));
    }
    let id = db.next_id();
    let user = User {
        id,
        email,
        full_name: body["full_name"].as_str().unwrap_or_default().to_string(),
        is_active: true,
    };
    db.users.push(user.clone());
    Ok(Json(json!(user)))
}

async fn me() -> Reply {
    Ok(Json(json!(demo_user())))
}

async fn list_caregivers(State(shared): State<Fake>) -> Reply {
    let db = shared.db.lock().unwrap();
    let list: Vec<Caregiver> = db.caregivers.values().map(|c| db.caregiver_view(c)).collect();
    Ok(Json(json!(list)))
}

async fn get_caregiver(State(shared): State<Fake>, Path(id): Path<u64>) -> Reply {
    let db = shared.db.lock().unwrap();
    match db.caregivers.get(&id) {
        Some(c) => Ok(Json(json!(db.caregiver_view(c)))),
        None => Err(fail(StatusCode::NOT_FOUND, "Caregiver not found")),
    }
}

async fn create_caregiver(State(shared): State<Fake>, Json(body): Json<NewCaregiver>) -> Reply {
    let mut db = shared.db.lock().unwrap();
    if db
        .caregivers
        .values()
        .any(|c| c.custom_id == Some(body.custom_id))
    {
        return Err(fail(
            StatusCode::BAD_REQUEST,
            "Caregiver with this ID already exists for this user",
        ));
    }
    let id = db.next_id();
    let caregiver = Caregiver {
        id,
        name: body.name,
        custom_id: Some(body.custom_id),
        bank_name: body.bank_name,
        bank_account: body.bank_account,
        branch_number: body.branch_number,
        salary: SalaryComponent::default(),
        allowance: SalaryComponent::default(),
        saturday: SalaryComponent::default(),
        total_bank: 0.0,
        assignments: Vec::new(),
    };
    db.caregivers.insert(id, caregiver.clone());
    Ok(Json(json!(caregiver)))
}

async fn delete_caregiver(State(shared): State<Fake>, Path(id): Path<u64>) -> Reply {
    let mut db = shared.db.lock().unwrap();
    match db.caregivers.remove(&id) {
        Some(c) => {
            db.assignments.retain(|a| a.caregiver_id != id);
            Ok(Json(
                json!({ "message": format!("Caregiver {} deleted successfully", c.name) }),
            ))
        }
        None => Err(fail(StatusCode::NOT_FOUND, "Caregiver not found")),
    }
}

async fn update_salary(
    State(shared): State<Fake>,
    Path(id): Path<u64>,
    Json(body): Json<SalaryUpdate>,
) -> Reply {
    let mut db = shared.db.lock().unwrap();
    let Some(c) = db.caregivers.get_mut(&id) else {
        return Err(fail(StatusCode::NOT_FOUND, "Caregiver not found"));
    };
    let component = |price: f64, amount: f64| SalaryComponent {
        price,
        amount,
        total: price * amount,
    };
    c.salary = component(body.salary_price, body.salary_amount);
    c.saturday = component(body.saturday_price, body.saturday_amount);
    c.allowance = component(body.allowance_price, body.allowance_amount);
    c.total_bank = body.preview_total();
    Ok(Json(json!(c.clone())))
}

async fn generate_pdf(State(shared): State<Fake>, Path(id): Path<u64>) -> Response {
    let db = shared.db.lock().unwrap();
    match db.caregivers.get(&id) {
        Some(c) => (
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!(
                        "attachment; filename=\"caregiver_{}_report.pdf\"",
                        c.display_id()
                    ),
                ),
            ],
            format!("%PDF-1.4\n% {}\n", c.name).into_bytes(),
        )
            .into_response(),
        None => fail(StatusCode::NOT_FOUND, "Caregiver not found").into_response(),
    }
}

async fn list_elderly(State(shared): State<Fake>) -> Reply {
    let db = shared.db.lock().unwrap();
    // Reverse order so clients that sort by id are exercised.
    let list: Vec<Elderly> = db.elderly.values().rev().map(|e| db.elderly_view(e)).collect();
    Ok(Json(json!(list)))
}

async fn get_elderly(State(shared): State<Fake>, Path(id): Path<u64>) -> Reply {
    let db = shared.db.lock().unwrap();
    match db.elderly.get(&id) {
        Some(e) => Ok(Json(json!(db.elderly_view(e)))),
        None => Err(fail(StatusCode::NOT_FOUND, "Elderly person not found")),
    }
}

async fn create_elderly(State(shared): State<Fake>, Json(body): Json<NewElderly>) -> Reply {
    let mut db = shared.db.lock().unwrap();
    let id = db.next_id();
    let elderly = Elderly {
        id,
        name: body.name,
        custom_id: Some(body.custom_id),
        assignments: Vec::new(),
        tasks: Vec::new(),
        medications: Vec::new(),
    };
    db.elderly.insert(id, elderly.clone());
    Ok(Json(json!(elderly)))
}

async fn delete_elderly(State(shared): State<Fake>, Path(id): Path<u64>) -> Reply {
    let mut db = shared.db.lock().unwrap();
    match db.elderly.remove(&id) {
        Some(_) => {
            db.assignments.retain(|a| a.elderly_id != id);
            Ok(Json(json!({ "message": "Elderly deleted successfully" })))
        }
        None => Err(fail(StatusCode::NOT_FOUND, "Elderly person not found")),
    }
}

async fn add_task(
    State(shared): State<Fake>,
    Path(id): Path<u64>,
    Json(body): Json<NewTask>,
) -> Reply {
    let mut db = shared.db.lock().unwrap();
    let task_id = db.next_id();
    let Some(e) = db.elderly.get_mut(&id) else {
        return Err(fail(StatusCode::NOT_FOUND, "Elderly person not found"));
    };
    let task = Task {
        id: Some(task_id),
        description: body.description,
        status: body.status,
    };
    e.tasks.push(task.clone());
    Ok(Json(json!(task)))
}

async fn add_medication(
    State(shared): State<Fake>,
    Path(id): Path<u64>,
    Json(body): Json<NewMedication>,
) -> Reply {
    let mut db = shared.db.lock().unwrap();
    let med_id = db.next_id();
    let Some(e) = db.elderly.get_mut(&id) else {
        return Err(fail(StatusCode::NOT_FOUND, "Elderly person not found"));
    };
    let medication = Medication {
        id: Some(med_id),
        name: body.name,
        dosage: body.dosage,
        frequency: body.frequency,
    };
    e.medications.push(medication.clone());
    Ok(Json(json!(medication)))
}

async fn list_assignments(State(shared): State<Fake>) -> Reply {
    let db = shared.db.lock().unwrap();
    Ok(Json(json!(db.assignments)))
}

async fn create_assignment(
    State(shared): State<Fake>,
    Json(body): Json<NewAssignment>,
) -> Reply {
    let mut db = shared.db.lock().unwrap();
    if !db.caregivers.contains_key(&body.caregiver_id) || !db.elderly.contains_key(&body.elderly_id)
    {
        return Err(fail(StatusCode::NOT_FOUND, "not found"));
    }
    if db
        .assignments
        .iter()
        .any(|a| a.caregiver_id == body.caregiver_id && a.elderly_id == body.elderly_id)
    {
        return Err(fail(StatusCode::BAD_REQUEST, "Assignment already exists"));
    }
    let id = db.next_id();
    let assignment = Assignment {
        id,
        caregiver_id: body.caregiver_id,
        elderly_id: body.elderly_id,
    };
    db.assignments.push(assignment.clone());
    Ok(Json(json!(assignment)))
}

async fn delete_assignment(State(shared): State<Fake>, Path(id): Path<u64>) -> Reply {
    let mut db = shared.db.lock().unwrap();
    let before = db.assignments.len();
    db.assignments.retain(|a| a.id != id);
    if db.assignments.len() == before {
        return Err(fail(StatusCode::NOT_FOUND, "Assignment not found"));
    }
    Ok(Json(json!({ "message": "Assignment deleted successfully" })))
}
