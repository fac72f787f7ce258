//! In-memory backend for unit tests.
//!
//! Behaves like the real backend for the calls the client makes and records
//! every call, so tests can assert that nothing was sent.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use estate_core::{
    resolve_booking, BookedFlat, Customer, CustomerRef, Flat, FlatKey, FlatPayment, FlatStatus,
    KycFilter, KycStatus, KycSubmission, Money, NewProject, Page, Project, ProjectName,
};
use tokio::sync::Notify;

use crate::api::{DirectoryApi, InventoryApi, LedgerApi};
use crate::error::{ClientError, ClientResult};
use crate::wire::{AddPaymentRequest, BookFlatRequest};

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    BookFlat(FlatKey, Money),
    BookedFlat(FlatKey),
    AddPayment(FlatKey, Money),
    History(FlatKey),
    AllPayments(u32),
    SearchPayments(String, u32),
    ApproveLoan(FlatKey),
    ListCustomers(KycFilter, u32),
    SearchCustomers(KycFilter, String, u32),
    SubmitKyc(String),
    ApproveKyc(String),
    DeleteKyc(String),
    Projects,
    ProjectNames,
    ProjectFlats(String),
    CreateProject(String),
    DeleteProject(String),
}

/// Operations that can be made to fail once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Book,
    Pay,
    Booked,
    History,
    ApproveLoan,
    SearchCustomers,
    SubmitKyc,
}

#[derive(Default)]
struct State {
    flats: HashMap<FlatKey, Flat>,
    bookings: HashMap<FlatKey, BookedFlat>,
    payments: HashMap<FlatKey, Vec<FlatPayment>>,
    customers: Vec<Customer>,
    projects: Vec<Project>,
    calls: Vec<Call>,
    failures: HashMap<Op, VecDeque<ClientError>>,
    payment_gate: Option<Arc<Notify>>,
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    fn record(&self, op: Option<Op>, call: Call) -> ClientResult<()> {
        self.with_state(|s| {
            s.calls.push(call);
            match op.and_then(|op| s.failures.get_mut(&op)).and_then(|q| q.pop_front()) {
                Some(err) => Err(err),
                None => Ok(()),
            }
        })
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    pub fn flat(key: &FlatKey, status: FlatStatus) -> Flat {
        Flat {
            project_id: key.project_id.clone(),
            flat_id: key.flat_id.clone(),
            block: "A".to_string(),
            floor: 1,
            flat_number: format!("A-{}", key.flat_id),
            square_feet: 1100,
            bedrooms: 2,
            status,
            created_at: None,
        }
    }

    pub fn insert_flat(&self, flat: Flat) {
        self.with_state(|s| {
            s.flats.insert(flat.key(), flat);
        });
    }

    pub fn insert_free_flat(&self, key: &FlatKey) -> Flat {
        let flat = Self::flat(key, FlatStatus::Free);
        self.insert_flat(flat.clone());
        flat
    }

    /// Seeds a booked (or sold) flat with a single opening payment.
    pub fn insert_booking(&self, key: &FlatKey, total: Money, paid: Money) -> Flat {
        let booking = BookedFlat {
            project_id: key.project_id.clone(),
            flat_id: key.flat_id.clone(),
            customer_id: "c1".to_string(),
            customer_name: "Asha Rao".to_string(),
            total_payment: total,
            paid,
            loan_approved: false,
        };
        let status = resolve_booking(&booking).unwrap();
        let flat = Self::flat(key, status);

        self.with_state(|s| {
            s.payments
                .entry(key.clone())
                .or_default()
                .push(payment(key, &booking.customer_id, paid, s.calls.len()));
            s.bookings.insert(key.clone(), booking);
            s.flats.insert(key.clone(), flat.clone());
        });
        flat
    }

    pub fn insert_customer(&self, id: &str, name: &str, status: KycStatus) -> Customer {
        let customer = Customer {
            id: id.to_string(),
            name: name.to_string(),
            phone: "9876543210".to_string(),
            address: "12 MG Road".to_string(),
            status,
            aadhaar_key: None,
            pan_key: None,
            voter_key: None,
            other_key: None,
            aadhaar: None,
            pan: None,
            voter_id: None,
            other_id: None,
            created_at: None,
        };
        self.with_state(|s| s.customers.push(customer.clone()));
        customer
    }

    pub fn insert_project(&self, project_id: &str, name: &str) {
        self.with_state(|s| {
            s.projects.push(Project {
                project_id: project_id.to_string(),
                name: name.to_string(),
                total_apartments: 0,
                total_blocks: 0,
                sold_apartments: 0,
                free_apartments: 0,
                booked_apartments: 0,
                created_at: None,
            })
        });
    }

    // =========================================================================
    // Failure Injection
    // =========================================================================

    pub fn fail_next(&self, op: Op, err: ClientError) {
        self.with_state(|s| s.failures.entry(op).or_default().push_back(err));
    }

    pub fn fail_next_payment(&self, err: ClientError) {
        self.fail_next(Op::Pay, err);
    }

    /// Holds every payment until the returned `Notify` fires.
    pub fn gate_payments(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.with_state(|s| s.payment_gate = Some(Arc::clone(&gate)));
        gate
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn calls(&self) -> Vec<Call> {
        self.with_state(|s| s.calls.clone())
    }

    pub fn booking(&self, key: &FlatKey) -> Option<BookedFlat> {
        self.with_state(|s| s.bookings.get(key).cloned())
    }

    pub fn payments_for(&self, key: &FlatKey) -> Vec<FlatPayment> {
        self.with_state(|s| s.payments.get(key).cloned().unwrap_or_default())
    }
}

fn payment(key: &FlatKey, customer_id: &str, amount: Money, seq: usize) -> FlatPayment {
    FlatPayment {
        project_name: "Skyline Residency".to_string(),
        project_id: key.project_id.clone(),
        payment_id: format!("pay-{}-{}", key.flat_id, seq),
        flat_id: key.flat_id.clone(),
        customer: CustomerRef {
            id: customer_id.to_string(),
            name: None,
            phone: None,
        },
        amount,
        summary: Default::default(),
        created_at: Utc::now(),
    }
}

fn page_of<T>(items: Vec<T>, page: u32) -> Page<T> {
    Page {
        total_count: items.len() as u64,
        total_pages: 1,
        current_page: page,
        items,
    }
}

impl LedgerApi for FakeBackend {
    async fn book_flat(&self, key: &FlatKey, request: &BookFlatRequest) -> ClientResult<()> {
        self.record(Some(Op::Book), Call::BookFlat(key.clone(), request.amount))?;

        self.with_state(|s| {
            let flat = s
                .flats
                .get_mut(key)
                .ok_or_else(|| ClientError::NotFound(format!("flat {}", key)))?;
            if flat.status != FlatStatus::Free {
                return Err(ClientError::Conflict(format!("flat {} is already booked", key)));
            }

            let booking = BookedFlat {
                project_id: key.project_id.clone(),
                flat_id: key.flat_id.clone(),
                customer_id: request.customer.id.clone(),
                customer_name: request.customer.name.clone().unwrap_or_default(),
                total_payment: request.total_payment,
                paid: request.amount,
                loan_approved: false,
            };
            flat.status = resolve_booking(&booking)
                .map_err(|e| ClientError::Status { status: 400, message: e.to_string() })?;

            let mut record = payment(key, &booking.customer_id, request.amount, s.calls.len());
            record.summary = request.summary.clone();
            s.payments.entry(key.clone()).or_default().push(record);
            s.bookings.insert(key.clone(), booking);
            Ok(())
        })
    }

    async fn booked_flat(&self, key: &FlatKey) -> ClientResult<BookedFlat> {
        self.record(Some(Op::Booked), Call::BookedFlat(key.clone()))?;
        self.booking(key)
            .ok_or_else(|| ClientError::NotFound(format!("booking for {}", key)))
    }

    async fn add_payment(&self, key: &FlatKey, request: &AddPaymentRequest) -> ClientResult<Money> {
        let gate = self.with_state(|s| s.payment_gate.clone());
        self.record(Some(Op::Pay), Call::AddPayment(key.clone(), request.amount))?;

        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.with_state(|s| {
            let booking = s
                .bookings
                .get_mut(key)
                .ok_or_else(|| ClientError::NotFound(format!("booking for {}", key)))?;
            booking.paid += request.amount;
            let paid = booking.paid;
            let status = resolve_booking(booking)
                .map_err(|e| ClientError::Status { status: 400, message: e.to_string() })?;
            let customer_id = booking.customer_id.clone();

            if let Some(flat) = s.flats.get_mut(key) {
                if flat.status != FlatStatus::Sold {
                    flat.status = status;
                }
            }
            let mut record = payment(key, &customer_id, request.amount, s.calls.len());
            record.summary = request.summary.clone();
            s.payments.entry(key.clone()).or_default().push(record);
            Ok(paid)
        })
    }

    async fn payment_history(&self, key: &FlatKey) -> ClientResult<Vec<FlatPayment>> {
        self.record(Some(Op::History), Call::History(key.clone()))?;
        Ok(self.payments_for(key))
    }

    async fn all_payments(&self, page: u32) -> ClientResult<Page<FlatPayment>> {
        self.record(None, Call::AllPayments(page))?;
        let all = self.with_state(|s| s.payments.values().flatten().cloned().collect());
        Ok(page_of(all, page))
    }

    async fn search_payments(&self, query: &str, page: u32) -> ClientResult<Page<FlatPayment>> {
        self.record(None, Call::SearchPayments(query.to_string(), page))?;
        let hits = self.with_state(|s| {
            s.payments
                .values()
                .flatten()
                .filter(|p| p.flat_id.contains(query) || p.payment_id.contains(query))
                .cloned()
                .collect()
        });
        Ok(page_of(hits, page))
    }

    async fn approve_loan(&self, key: &FlatKey) -> ClientResult<()> {
        self.record(Some(Op::ApproveLoan), Call::ApproveLoan(key.clone()))?;
        self.with_state(|s| {
            // The backend marks the flat sold; booking records carry no loan flag.
            if !s.bookings.contains_key(key) {
                return Err(ClientError::NotFound(format!("booking for {}", key)));
            }
            if let Some(flat) = s.flats.get_mut(key) {
                flat.status = FlatStatus::Sold;
            }
            Ok(())
        })
    }
}

fn matches_filter(customer: &Customer, filter: KycFilter) -> bool {
    match filter {
        KycFilter::All => true,
        KycFilter::Approved => customer.status == KycStatus::Approved,
        KycFilter::Pending => customer.status == KycStatus::Pending,
    }
}

impl DirectoryApi for FakeBackend {
    async fn list_customers(&self, filter: KycFilter, page: u32) -> ClientResult<Page<Customer>> {
        self.record(None, Call::ListCustomers(filter, page))?;
        let customers = self.with_state(|s| {
            s.customers
                .iter()
                .filter(|c| matches_filter(c, filter))
                .cloned()
                .collect()
        });
        Ok(page_of(customers, page))
    }

    async fn search_customers(
        &self,
        filter: KycFilter,
        query: &str,
        page: u32,
    ) -> ClientResult<Page<Customer>> {
        self.record(
            Some(Op::SearchCustomers),
            Call::SearchCustomers(filter, query.to_string(), page),
        )?;
        let needle = query.to_lowercase();
        let customers = self.with_state(|s| {
            s.customers
                .iter()
                .filter(|c| matches_filter(c, filter))
                .filter(|c| c.name.to_lowercase().contains(&needle) || c.phone.contains(query))
                .cloned()
                .collect()
        });
        Ok(page_of(customers, page))
    }

    async fn submit_kyc(&self, submission: &KycSubmission) -> ClientResult<Option<Customer>> {
        self.record(
            Some(Op::SubmitKyc),
            Call::SubmitKyc(submission.normalized_name.clone()),
        )?;
        Ok(Some(self.insert_customer(
            &submission.customer_id,
            &submission.name,
            KycStatus::Pending,
        )))
    }

    async fn approve_kyc(&self, customer_id: &str) -> ClientResult<()> {
        self.record(None, Call::ApproveKyc(customer_id.to_string()))?;
        self.with_state(|s| {
            let customer = s
                .customers
                .iter_mut()
                .find(|c| c.id == customer_id)
                .ok_or_else(|| ClientError::NotFound(format!("customer {}", customer_id)))?;
            customer.status = KycStatus::Approved;
            Ok(())
        })
    }

    async fn delete_kyc(&self, customer_id: &str) -> ClientResult<()> {
        self.record(None, Call::DeleteKyc(customer_id.to_string()))?;
        self.with_state(|s| s.customers.retain(|c| c.id != customer_id));
        Ok(())
    }
}

impl InventoryApi for FakeBackend {
    async fn projects(&self) -> ClientResult<Vec<Project>> {
        self.record(None, Call::Projects)?;
        Ok(self.with_state(|s| s.projects.clone()))
    }

    async fn project_names(&self) -> ClientResult<Vec<ProjectName>> {
        self.record(None, Call::ProjectNames)?;
        Ok(self.with_state(|s| {
            s.projects
                .iter()
                .map(|p| ProjectName {
                    id: p.project_id.clone(),
                    name: p.name.clone(),
                })
                .collect()
        }))
    }

    async fn project_flats(&self, project_id: &str) -> ClientResult<Vec<Flat>> {
        self.record(None, Call::ProjectFlats(project_id.to_string()))?;
        let mut flats: Vec<Flat> = self.with_state(|s| {
            s.flats
                .values()
                .filter(|f| f.project_id == project_id)
                .cloned()
                .collect()
        });
        flats.sort_by(|a, b| a.flat_id.cmp(&b.flat_id));
        Ok(flats)
    }

    async fn create_project(&self, project: &NewProject) -> ClientResult<Project> {
        self.record(None, Call::CreateProject(project.name.clone()))?;
        let project_id = format!("proj-{}", project.name.to_lowercase().replace(' ', "-"));
        self.insert_project(&project_id, &project.name);
        self.with_state(|s| {
            s.projects
                .iter()
                .find(|p| p.project_id == project_id)
                .cloned()
        })
        .ok_or(ClientError::NotFound(project_id))
    }

    async fn delete_project(&self, project_id: &str) -> ClientResult<()> {
        self.record(None, Call::DeleteProject(project_id.to_string()))?;
        self.with_state(|s| s.projects.retain(|p| p.project_id != project_id));
        Ok(())
    }
}
