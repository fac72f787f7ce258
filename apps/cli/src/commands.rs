//! # Commands
//!
//! One function per subcommand. Each checks the operator's role, calls the
//! client and hands the result to [`output`](crate::output).
//!
//! ## Flat Commands
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  estate flat p1 A-101                                                   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  Inventory::find_flat ──► BookingController::new ──► refresh()          │
//! │                                                        │                │
//! │        ┌──────────────┬──────────────┬─────────────────┤                │
//! │        ▼              ▼              ▼                 ▼                │
//! │      book           pay        approve-loan         revert              │
//! │                                                                         │
//! │  Each prints the resulting FlatView (status + phase, booking, history)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `config` is handled by [`configure`] before any session exists; every
//! other command goes through [`dispatch`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Subcommand};
use estate_client::{
    group_by_block_floor, require, tally, ActionCode, ActionError, ActionResult,
    BookingController, ClientConfig, CustomerDirectory, Inventory, PaymentLedger, RestClient,
    Session,
};
use estate_core::validation::{parse_payment_amount, parse_total_payment, validate_confirmed};
use estate_core::{
    Capability, Customer, FlatKey, KycFilter, KycSubmission, NewFlat, NewProject, PaymentMode,
    PaymentSummary,
};
use serde::Serialize;
use tracing::debug;

use crate::output;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List projects with their inventory counts
    Projects,

    /// Show a project's flats grouped by block and floor
    Flats {
        /// Project id
        project: String,
    },

    /// Show one flat with its booking and payment history
    Flat {
        project: String,
        flat: String,
    },

    /// Book a free flat for a KYC-approved customer
    Book {
        project: String,
        flat: String,

        /// Customer id, or a name/phone matching exactly one approved customer
        #[arg(long)]
        customer: String,

        /// Agreed sale price in rupees
        #[arg(long)]
        total: String,

        /// First payment in rupees
        #[arg(long)]
        amount: String,

        #[command(flatten)]
        payment: PaymentArgs,
    },

    /// Record a further payment against a booked or sold flat
    Pay {
        project: String,
        flat: String,

        /// Amount in rupees, e.g. 25000 or 25,000.50
        amount: String,

        #[command(flatten)]
        payment: PaymentArgs,
    },

    /// Mark a booked flat sold after its home loan is sanctioned
    ApproveLoan {
        project: String,
        flat: String,

        /// Acknowledge that this overrides the payment threshold
        #[arg(long)]
        yes: bool,
    },

    /// Return a booked flat to free
    Revert {
        project: String,
        flat: String,

        /// Must be exactly `confirm`
        #[arg(long, value_name = "TEXT")]
        confirm: String,
    },

    /// List or search payments across all flats
    Payments {
        /// Matches customer, project, flat or payment id
        #[arg(long, short)]
        query: Option<String>,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// List or search KYC customers
    Customers {
        /// Name or phone
        query: Option<String>,

        /// all, approved or pending
        #[arg(long, default_value = "all")]
        filter: KycFilter,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Submit, approve or delete customer KYC
    Kyc {
        #[command(subcommand)]
        action: KycCommand,
    },

    /// Create or delete projects
    Project {
        #[command(subcommand)]
        action: ProjectCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum KycCommand {
    /// Submit KYC for a customer whose documents are already uploaded
    Submit(KycArgs),

    /// Mark a pending customer approved
    Approve { customer_id: String },

    /// Delete a customer's KYC record
    Delete {
        customer_id: String,

        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct KycArgs {
    #[arg(long)]
    customer_id: String,

    #[arg(long)]
    name: String,

    #[arg(long)]
    phone: String,

    #[arg(long)]
    address: String,

    #[arg(long)]
    aadhaar: String,

    #[arg(long)]
    pan: String,

    #[arg(long)]
    voter: Option<String>,

    #[arg(long)]
    other: Option<String>,

    /// Storage key of the uploaded Aadhaar scan
    #[arg(long)]
    aadhaar_key: String,

    /// Storage key of the uploaded PAN scan
    #[arg(long)]
    pan_key: String,

    #[arg(long, default_value = "")]
    voter_key: String,

    #[arg(long, default_value = "")]
    other_key: String,
}

impl KycArgs {
    /// The normalised name is filled in by validation.
    fn submission(self) -> KycSubmission {
        KycSubmission {
            customer_id: self.customer_id,
            name: self.name,
            normalized_name: String::new(),
            phone: self.phone,
            address: self.address,
            aadhaar: self.aadhaar,
            pan: self.pan,
            voter: self.voter,
            other: self.other,
            aadhaar_key: self.aadhaar_key,
            pan_key: self.pan_key,
            voter_key: self.voter_key,
            other_key: self.other_key,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// Create a project, optionally with its flats
    Create {
        name: String,

        /// JSON array of flats: block, floor, flatno, sqft, bhk, status
        #[arg(long, value_name = "FILE")]
        flats: Option<PathBuf>,
    },

    /// Delete a project and its flats
    Delete {
        project_id: String,

        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write client.toml with the given backend settings
    Init {
        /// Backend API root, e.g. https://erp.example.in/api/
        #[arg(long)]
        base_url: String,

        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },

    /// Print the settings the client would use
    Show,
}

/// Payment mode and cheque details.
#[derive(Args, Debug)]
pub struct PaymentArgs {
    /// Bank Transfer, Cheque, UPI, Cash, Demand Draft or Others
    #[arg(long, default_value = "UPI")]
    mode: PaymentMode,

    #[arg(long)]
    cheque_number: Option<String>,

    #[arg(long)]
    bank: Option<String>,
}

impl PaymentArgs {
    fn summary(self) -> PaymentSummary {
        PaymentSummary {
            mode: self.mode,
            cheque_number: self.cheque_number,
            bank_name: self.bank,
        }
        .normalized()
    }
}

/// Everything a command needs: the backend and who is asking.
pub struct Context {
    backend: Arc<RestClient>,
    session: Session,
    json: bool,
}

impl Context {
    pub fn new(backend: Arc<RestClient>, session: Session, json: bool) -> Self {
        Context {
            backend,
            session,
            json,
        }
    }

    fn inventory(&self) -> Inventory<RestClient> {
        Inventory::new(Arc::clone(&self.backend))
    }

    fn directory(&self) -> CustomerDirectory<RestClient> {
        CustomerDirectory::new(Arc::clone(&self.backend))
    }

    fn ledger(&self) -> PaymentLedger<RestClient> {
        PaymentLedger::new(Arc::clone(&self.backend))
    }

    /// Loads a flat and its booking into a controller.
    async fn controller(&self, key: &FlatKey) -> ActionResult<BookingController<RestClient>> {
        let flat = self.inventory().find_flat(key).await?;
        let controller =
            BookingController::new(Arc::clone(&self.backend), self.session.clone(), flat);
        controller.refresh().await?;
        Ok(controller)
    }

    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> ActionResult<()> {
        emit(self.json, value, text)
    }
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> ActionResult<()> {
    if json {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| ActionError::new(ActionCode::Internal, e.to_string()))?;
        println!("{}", json);
    } else {
        println!("{}", text());
    }
    Ok(())
}

pub async fn dispatch(ctx: &Context, command: Command) -> ActionResult<()> {
    debug!(?command, "Dispatching");

    match command {
        Command::Projects => projects(ctx).await,
        Command::Flats { project } => flats(ctx, &project).await,
        Command::Flat { project, flat } => show_flat(ctx, FlatKey::new(project, flat)).await,
        Command::Book {
            project,
            flat,
            customer,
            total,
            amount,
            payment,
        } => {
            book(
                ctx,
                FlatKey::new(project, flat),
                &customer,
                &total,
                &amount,
                payment.summary(),
            )
            .await
        }
        Command::Pay {
            project,
            flat,
            amount,
            payment,
        } => pay(ctx, FlatKey::new(project, flat), &amount, payment.summary()).await,
        Command::ApproveLoan { project, flat, yes } => {
            approve_loan(ctx, FlatKey::new(project, flat), yes).await
        }
        Command::Revert {
            project,
            flat,
            confirm,
        } => revert(ctx, FlatKey::new(project, flat), &confirm).await,
        Command::Payments { query, page } => payments(ctx, query.as_deref(), page).await,
        Command::Customers {
            query,
            filter,
            page,
        } => customers(ctx, query.as_deref(), filter, page).await,
        Command::Kyc { action } => kyc(ctx, action).await,
        Command::Project { action } => project(ctx, action).await,
    }
}

/// Writes or shows the client configuration. Needs no session.
pub fn configure(path: Option<PathBuf>, action: ConfigCommand, json: bool) -> ActionResult<()> {
    match action {
        ConfigCommand::Init {
            base_url,
            timeout_secs,
        } => {
            let mut config = ClientConfig::with_base_url(base_url);
            config.api.request_timeout_secs = timeout_secs;
            config.validate()?;
            config.save(path)?;
            emit(json, &config, || output::config(&config))
        }
        ConfigCommand::Show => {
            let config = ClientConfig::load_or_default(path);
            emit(json, &config, || output::config(&config))
        }
    }
}

async fn projects(ctx: &Context) -> ActionResult<()> {
    require(&ctx.session, Capability::ViewProjects)?;
    let projects = ctx.inventory().projects().await?;
    ctx.emit(&projects, || output::projects(&projects))
}

async fn flats(ctx: &Context, project_id: &str) -> ActionResult<()> {
    require(&ctx.session, Capability::ViewApartments)?;
    let flats = ctx.inventory().project_flats(project_id).await?;
    let counts = tally(&flats);
    let layout = group_by_block_floor(&flats);

    ctx.emit(
        &serde_json::json!({ "tally": counts, "flats": flats }),
        || output::flats(&layout, &counts),
    )
}

async fn show_flat(ctx: &Context, key: FlatKey) -> ActionResult<()> {
    let controller = ctx.controller(&key).await?;
    let view = controller.view();
    ctx.emit(&view, || output::flat_view(&view))
}

async fn book(
    ctx: &Context,
    key: FlatKey,
    customer: &str,
    total: &str,
    amount: &str,
    summary: PaymentSummary,
) -> ActionResult<()> {
    require(&ctx.session, Capability::BookFlat)?;
    let total = parse_total_payment(total)?;
    let amount = parse_payment_amount(amount)?;
    let customer = find_customer(ctx, customer).await?;

    let controller = ctx.controller(&key).await?;
    let view = controller
        .book(Some(&customer), total, amount, summary)
        .await?;
    ctx.emit(&view, || output::flat_view(&view))
}

async fn pay(ctx: &Context, key: FlatKey, amount: &str, summary: PaymentSummary) -> ActionResult<()> {
    require(&ctx.session, Capability::AddPayment)?;
    let controller = ctx.controller(&key).await?;
    let view = controller.add_payment(amount, summary).await?;
    ctx.emit(&view, || output::flat_view(&view))
}

async fn approve_loan(ctx: &Context, key: FlatKey, confirmed: bool) -> ActionResult<()> {
    require(&ctx.session, Capability::ApproveLoan)?;
    let controller = ctx.controller(&key).await?;
    let view = controller.approve_loan(confirmed).await?;
    ctx.emit(&view, || output::flat_view(&view))
}

async fn revert(ctx: &Context, key: FlatKey, confirmation: &str) -> ActionResult<()> {
    require(&ctx.session, Capability::RevertBooking)?;
    let controller = ctx.controller(&key).await?;
    let view = controller.revert(confirmation).await?;
    ctx.emit(&view, || {
        format!(
            "{}\n\nReverted on this terminal only. The backend keeps the booking until it is \
             cleared there.",
            output::flat_view(&view)
        )
    })
}

async fn payments(ctx: &Context, query: Option<&str>, page: u32) -> ActionResult<()> {
    require(&ctx.session, Capability::ViewPayments)?;
    let page = ctx.ledger().payments(query, page).await?;
    ctx.emit(&page, || output::payments(&page))
}

async fn customers(
    ctx: &Context,
    query: Option<&str>,
    filter: KycFilter,
    page: u32,
) -> ActionResult<()> {
    require(&ctx.session, Capability::ViewCustomers)?;
    let page = ctx.directory().list(filter, query, page).await?;
    ctx.emit(&page, || output::customers(&page))
}

async fn kyc(ctx: &Context, action: KycCommand) -> ActionResult<()> {
    match action {
        KycCommand::Submit(args) => {
            require(&ctx.session, Capability::SubmitKyc)?;
            let submission = args.submission();
            let customer_id = submission.customer_id.clone();
            let created = ctx.directory().submit_kyc(submission).await?;
            ctx.emit(&created, || match &created {
                Some(c) => format!("KYC submitted for {} ({}), status {}", c.name, c.id, c.status),
                None => format!("KYC submitted for {}", customer_id),
            })
        }
        KycCommand::Approve { customer_id } => {
            require(&ctx.session, Capability::ApproveKyc)?;
            ctx.directory().approve(&customer_id).await?;
            ctx.emit(&customer_id, || format!("KYC approved for {}", customer_id))
        }
        KycCommand::Delete { customer_id, yes } => {
            require(&ctx.session, Capability::DeleteKyc)?;
            validate_confirmed("delete KYC", yes)?;
            ctx.directory().delete(&customer_id).await?;
            ctx.emit(&customer_id, || format!("KYC deleted for {}", customer_id))
        }
    }
}

async fn project(ctx: &Context, action: ProjectCommand) -> ActionResult<()> {
    require(&ctx.session, Capability::ManageProjects)?;

    match action {
        ProjectCommand::Create { name, flats } => {
            let flats = match flats {
                Some(path) => read_flats(&path)?,
                None => Vec::new(),
            };
            let created = ctx
                .inventory()
                .create_project(&NewProject { name, flats })
                .await?;
            ctx.emit(&created, || output::projects(std::slice::from_ref(&created)))
        }
        ProjectCommand::Delete { project_id, yes } => {
            validate_confirmed("delete project", yes)?;
            ctx.inventory().delete_project(&project_id).await?;
            ctx.emit(&project_id, || format!("Project {} deleted", project_id))
        }
    }
}

fn read_flats(path: &Path) -> ActionResult<Vec<NewFlat>> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ActionError::validation(format!("Cannot read {}: {}", path.display(), e))
    })?;
    parse_flats(&raw)
        .map_err(|e| ActionError::validation(format!("{}: {}", path.display(), e.message)))
}

fn parse_flats(raw: &str) -> ActionResult<Vec<NewFlat>> {
    serde_json::from_str(raw)
        .map_err(|e| ActionError::validation(format!("not a list of flats ({})", e)))
}

/// Resolves `--customer` to exactly one approved customer.
async fn find_customer(ctx: &Context, query: &str) -> ActionResult<Customer> {
    let hits = ctx.directory().search_approved(query).await;
    pick_customer(query, hits)
}

fn pick_customer(query: &str, mut hits: Vec<Customer>) -> ActionResult<Customer> {
    let query = query.trim();
    if let Some(i) = hits.iter().position(|c| c.id == query) {
        return Ok(hits.swap_remove(i));
    }

    match hits.len() {
        0 => Err(ActionError::new(
            ActionCode::NotFound,
            format!("No approved customer matches '{}'", query),
        )),
        1 => Ok(hits.remove(0)),
        n => Err(ActionError::validation(format!(
            "'{}' matches {} approved customers ({}); pass the customer id",
            query,
            n,
            hits.iter()
                .map(|c| format!("{} {}", c.id, c.name))
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}
