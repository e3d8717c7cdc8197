#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use conges::auth::Claims;
use conges::config::Config;
use conges::database::models::{
    ActivityRecord, Actor, LeaveType, NewVacationRequest, Notification, VacationRequest,
    VacationStatus,
};
use conges::error::AppError;
use conges::services::{
    AuditTrail, EntitlementSource, NotificationDispatcher, OwnershipResolver, VacationRepository,
    VacationService,
};

pub const TENANT_A: i64 = 100;
pub const TENANT_B: i64 = 200;

pub const ALICE: i64 = 5; // employee, tenant A
pub const BOB: i64 = 6; // employee, tenant A
pub const CAROL: i64 = 7; // employee, tenant B
pub const MANAGER_A: i64 = 8;
pub const ADMIN_A: i64 = 9;
pub const MANAGER_B: i64 = 10;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-key-that-is-long-enough";

pub fn setup_test_env() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Employees, their tenants, and each tenant's managers and admins.
pub struct InMemoryDirectory {
    tenants: HashMap<i64, i64>,
    staff: HashMap<i64, Vec<i64>>,
    pub fail_staff_lookup: AtomicBool,
}

impl InMemoryDirectory {
    pub fn seeded() -> Self {
        Self {
            tenants: HashMap::from([
                (ALICE, TENANT_A),
                (BOB, TENANT_A),
                (CAROL, TENANT_B),
            ]),
            staff: HashMap::from([
                (TENANT_A, vec![MANAGER_A, ADMIN_A]),
                (TENANT_B, vec![MANAGER_B]),
            ]),
            fail_staff_lookup: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl OwnershipResolver for InMemoryDirectory {
    async fn tenant_of(&self, employee_id: i64) -> Result<Option<i64>, AppError> {
        Ok(self.tenants.get(&employee_id).copied())
    }

    async fn tenant_staff(&self, tenant_id: i64) -> Result<Vec<i64>, AppError> {
        if self.fail_staff_lookup.load(Ordering::SeqCst) {
            return Err(AppError::DependencyFailure("directory offline".into()));
        }
        Ok(self.staff.get(&tenant_id).cloned().unwrap_or_default())
    }
}

pub struct InMemoryVacationRepository {
    rows: Mutex<HashMap<i64, VacationRequest>>,
    next_id: AtomicI64,
    directory: Arc<InMemoryDirectory>,
    interleaved_write: Mutex<Option<i64>>,
    pub insert_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl InMemoryVacationRepository {
    pub fn new(directory: Arc<InMemoryDirectory>) -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            directory,
            interleaved_write: Mutex::new(None),
            insert_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }

    /// Stores a request directly, bypassing the service. `created_at` grows
    /// with the id so that ordering is deterministic.
    pub fn seed(
        &self,
        employee_id: i64,
        leave_type: LeaveType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        status: VacationStatus,
        reason: Option<&str>,
    ) -> VacationRequest {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap() + Duration::hours(id);
        let request = VacationRequest {
            id,
            employee_id,
            creator_id: employee_id,
            leave_type,
            start_date,
            end_date,
            duration: conges::services::working_days(start_date, end_date),
            reason: reason.map(str::to_string),
            status,
            approved_by: None,
            approved_at: None,
            rejected_by: None,
            rejected_at: None,
            quota_exceeded: false,
            attachment: None,
            version: 1,
            created_at,
            updated_at: created_at,
        };
        self.rows.lock().unwrap().insert(id, request.clone());
        request
    }

    pub fn stored(&self, id: i64) -> Option<VacationRequest> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    /// The next `update` or `delete` of `id` finds the row already approved
    /// by someone else.
    pub fn interleave_write(&self, id: i64) {
        *self.interleaved_write.lock().unwrap() = Some(id);
    }

    fn apply_interleaved_write(&self, rows: &mut HashMap<i64, VacationRequest>, id: i64) {
        if self.interleaved_write.lock().unwrap().take() != Some(id) {
            return;
        }
        if let Some(row) = rows.get_mut(&id) {
            row.status = VacationStatus::Approved;
            row.approved_by = Some(MANAGER_A);
            row.approved_at = Some(Utc::now());
            row.version += 1;
        }
    }
}

fn stale(id: i64) -> AppError {
    AppError::Conflict(format!("vacation request {} was modified concurrently", id))
}

#[async_trait]
impl VacationRepository for InMemoryVacationRepository {
    async fn get(&self, id: i64) -> Result<Option<VacationRequest>, AppError> {
        Ok(self.stored(id))
    }

    async fn insert(&self, request: NewVacationRequest) -> Result<VacationRequest, AppError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let stored = VacationRequest {
            id,
            employee_id: request.employee_id,
            creator_id: request.creator_id,
            leave_type: request.leave_type,
            start_date: request.start_date,
            end_date: request.end_date,
            duration: request.duration,
            reason: request.reason,
            status: VacationStatus::Pending,
            approved_by: None,
            approved_at: None,
            rejected_by: None,
            rejected_at: None,
            quota_exceeded: request.quota_exceeded,
            attachment: request.attachment,
            version: 1,
            created_at: request.created_at,
            updated_at: request.created_at,
        };
        self.rows.lock().unwrap().insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, request: &VacationRequest) -> Result<VacationRequest, AppError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        self.apply_interleaved_write(&mut rows, request.id);

        let Some(current) = rows.get(&request.id) else {
            return Err(AppError::not_found(format!("vacation request {}", request.id)));
        };
        if current.version != request.version {
            return Err(stale(request.id));
        }

        let mut stored = request.clone();
        stored.version += 1;
        rows.insert(request.id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: i64, expected_version: i32) -> Result<(), AppError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        self.apply_interleaved_write(&mut rows, id);

        let Some(current) = rows.get(&id) else {
            return Err(AppError::not_found(format!("vacation request {}", id)));
        };
        if current.version != expected_version {
            return Err(stale(id));
        }

        rows.remove(&id);
        Ok(())
    }

    async fn list_by_employee(&self, employee_id: i64) -> Result<Vec<VacationRequest>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect())
    }

    async fn list_by_tenant(&self, tenant_id: i64) -> Result<Vec<VacationRequest>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|r| self.directory.tenants.get(&r.employee_id) == Some(&tenant_id))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct RecordingAudit {
    pub records: Mutex<Vec<ActivityRecord>>,
    pub failing: AtomicBool,
}

impl RecordingAudit {
    pub fn records(&self) -> Vec<ActivityRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditTrail for RecordingAudit {
    async fn record(&self, record: ActivityRecord) -> Result<(), AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::DependencyFailure("audit store offline".into()));
        }
        self.records.lock().unwrap().push(record);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notification>>,
    pub failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn recipients(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.sent().iter().map(|n| n.user_id).collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingNotifier {
    async fn send(&self, notification: Notification) -> Result<(), AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::DependencyFailure("mailer offline".into()));
        }
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

/// Fixed remaining quota per leave type, or an outage.
pub struct FixedEntitlements {
    pub remaining: HashMap<LeaveType, i32>,
    pub failing: bool,
}

#[async_trait]
impl EntitlementSource for FixedEntitlements {
    async fn remaining_quota(
        &self,
        _employee_id: i64,
        leave_type: LeaveType,
    ) -> Result<Option<i32>, AppError> {
        if self.failing {
            return Err(AppError::DependencyFailure("entitlements offline".into()));
        }
        Ok(self.remaining.get(&leave_type).copied())
    }
}

pub struct TestHarness {
    pub directory: Arc<InMemoryDirectory>,
    pub repository: Arc<InMemoryVacationRepository>,
    pub audit: Arc<RecordingAudit>,
    pub notifier: Arc<RecordingNotifier>,
    pub service: VacationService,
}

impl TestHarness {
    pub fn new() -> Self {
        setup_test_env();
        let directory = Arc::new(InMemoryDirectory::seeded());
        let repository = Arc::new(InMemoryVacationRepository::new(directory.clone()));
        let audit = Arc::new(RecordingAudit::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let service = VacationService::new(
            repository.clone(),
            directory.clone(),
            audit.clone(),
            notifier.clone(),
        );

        Self {
            directory,
            repository,
            audit,
            notifier,
            service,
        }
    }

    pub fn with_entitlements(mut self, entitlements: FixedEntitlements) -> Self {
        self.service = self.service.with_entitlements(Arc::new(entitlements));
        self
    }

    pub fn seed_pending(&self, employee_id: i64) -> VacationRequest {
        self.repository.seed(
            employee_id,
            LeaveType::Paid,
            date(2024, 7, 1),
            date(2024, 7, 5),
            VacationStatus::Pending,
            Some("Congés d'été"),
        )
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost:5432/conges_test".to_string(),
        database_max_connections: 1,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        client_base_url: "http://localhost:3000".to_string(),
        leave_quotas: None,
    }
}

pub fn bearer_token(actor: Actor) -> String {
    let claims = Claims {
        sub: actor.id,
        email: format!("user{}@example.com", actor.id),
        role: actor.role,
        tenant_id: Some(actor.tenant_id),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_ref()),
    )
    .unwrap();
    format!("Bearer {}", token)
}
