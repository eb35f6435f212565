use std::fs;
use std::io::{stdout, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::application::{page_request, AppError, LedgerService};
use crate::domain::{format_cents, parse_cents, CustomerNumber, PageRequest, TenantNumber};
use crate::io::Exporter;

mod output;

pub use output::*;

/// Tenant Ledger - multi-tenant transaction ledger
#[derive(Parser)]
#[command(name = "tenant-ledger")]
#[command(about = "Book and roll back transactions per tenant customer, derive balances and audit trails")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(
        short,
        long,
        env = "TENANT_LEDGER_DATABASE",
        default_value = "tenant-ledger.db"
    )]
    pub database: String,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Provision the sample tenants, customers and bookings
    Seed,

    /// Tenant management commands
    #[command(subcommand)]
    Tenant(TenantCommands),

    /// Customer management commands
    #[command(subcommand)]
    Customer(CustomerCommands),

    /// Book a transaction for a customer
    Book {
        /// Amount (e.g., "50.00", "-12.5"); bounded to +/-999999.99
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Tenant number
        #[arg(long)]
        tenant: TenantNumber,

        /// Customer number within the tenant
        #[arg(long)]
        customer: CustomerNumber,
    },

    /// Roll back a transaction
    Rollback {
        /// Transaction ID
        id: i64,
    },

    /// Show a single transaction
    Show {
        /// Transaction ID
        id: i64,
    },

    /// List account statements with page-scoped balances
    List(PageArgs),

    /// Flat audit trail, one record per transaction
    Audit(PageArgs),

    /// Export a view to a file or stdout
    Export {
        /// What to export
        #[arg(value_enum)]
        view: ExportView,

        #[command(flatten)]
        filter: PageArgs,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TenantCommands {
    /// Create a tenant
    Create {
        /// Tenant number (must be unique)
        number: TenantNumber,

        /// Tenant name
        name: String,
    },

    /// List all tenants
    List,
}

#[derive(Subcommand)]
pub enum CustomerCommands {
    /// Create a customer within a tenant
    Create {
        /// Tenant number
        #[arg(long)]
        tenant: TenantNumber,

        /// Customer number (unique within the tenant)
        number: CustomerNumber,

        /// Customer name
        name: String,
    },

    /// List the customers of a tenant
    List {
        /// Tenant number
        #[arg(long)]
        tenant: TenantNumber,
    },
}

/// Filters and pagination shared by read commands. Zero means "no filter".
#[derive(Args, Debug, Clone, Copy)]
pub struct PageArgs {
    /// Tenant number filter
    #[arg(long, default_value_t = 0)]
    pub tenant: TenantNumber,

    /// Customer number filter (takes precedence over a tenant-only filter)
    #[arg(long, default_value_t = 0)]
    pub customer: CustomerNumber,

    /// Zero-based page index
    #[arg(long, default_value_t = 0)]
    pub page: u32,

    /// Page size
    #[arg(long, default_value_t = crate::domain::DEFAULT_PAGE_SIZE)]
    pub size: u32,
}

impl PageArgs {
    fn page_request(&self) -> Result<PageRequest, AppError> {
        page_request(self.page, self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportView {
    /// Audit trail as CSV
    Audit,
    /// Account statements as JSON
    Statements,
}

/// Install the global tracing subscriber. Logs go to stderr.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

impl Cli {
    pub async fn run(self) -> Result<ExitCode> {
        let format = self.format;
        let err = match self.execute().await {
            Ok(()) => return Ok(ExitCode::SUCCESS),
            Err(err) => err,
        };

        if format == OutputFormat::Json {
            if let Some(app_err) = err.downcast_ref::<AppError>() {
                error!(kind = ?app_err.kind(), "{app_err}");
                println!("{}", Envelope::<String>::from_error(app_err).to_json()?);
                return Ok(ExitCode::FAILURE);
            }
        }
        Err(err)
    }

    async fn execute(self) -> Result<()> {
        let format = self.format;

        match self.command {
            Commands::Init => {
                LedgerService::init(&self.database).await?;
                info!(database = %self.database, "database initialized");
                emit(format, &self.database, || {
                    println!("Database initialized: {}", self.database)
                })?;
            }

            Commands::Seed => {
                let service = LedgerService::init(&self.database).await?;
                let summary = service.seed_sample_data().await?;
                info!(
                    tenants = summary.tenants,
                    customers = summary.customers,
                    transactions = summary.transactions,
                    "sample data loaded"
                );
                let message = format!(
                    "Seeded {} tenants, {} customers, {} transactions",
                    summary.tenants, summary.customers, summary.transactions
                );
                emit(format, &message, || println!("{message}"))?;
            }

            Commands::Tenant(cmd) => {
                let service = LedgerService::connect(&self.database).await?;
                run_tenant_command(&service, cmd, format).await?;
            }

            Commands::Customer(cmd) => {
                let service = LedgerService::connect(&self.database).await?;
                run_customer_command(&service, cmd, format).await?;
            }

            Commands::Book {
                amount,
                tenant,
                customer,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let amount_cents = parse_cents(&amount)
                    .map_err(|e| AppError::Validation(e.to_string()))?;

                let transaction = service.book(tenant, customer, amount_cents).await?;
                info!(id = transaction.id, tenant, customer, "transaction booked");

                let message = format!(
                    "Transaction with ID: {} booked successfully!!",
                    transaction.id
                );
                emit(format, &message, || {
                    println!(
                        "Booked {} for customer {} of tenant {} ({})",
                        format_cents(transaction.amount_cents),
                        customer,
                        tenant,
                        transaction.id
                    )
                })?;
            }

            Commands::Rollback { id } => {
                let service = LedgerService::connect(&self.database).await?;
                let transaction = service.rollback(id).await?;
                info!(id = transaction.id, "transaction rolled back");

                let message = format!("Transaction with ID {id} rolled back successfully.");
                emit(format, &message, || println!("{message}"))?;
            }

            Commands::Show { id } => {
                let service = LedgerService::connect(&self.database).await?;
                let transaction = service.get_transaction(id).await?;
                emit(format, &transaction, || print_transaction(&transaction))?;
            }

            Commands::List(args) => {
                let service = LedgerService::connect(&self.database).await?;
                let statements = service
                    .list(args.tenant, args.customer, args.page_request()?)
                    .await?;
                info!(groups = statements.len(), "transactions retrieved");
                emit(format, &statements, || print_statements(&statements))?;
            }

            Commands::Audit(args) => {
                let service = LedgerService::connect(&self.database).await?;
                let records = service
                    .audit(args.tenant, args.customer, args.page_request()?)
                    .await?;
                info!(records = records.len(), "audit data retrieved");
                emit(format, &records, || print_audit(&records))?;
            }

            Commands::Export {
                view,
                filter,
                output,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                run_export_command(&service, view, filter, output.as_deref()).await?;
            }
        }

        Ok(())
    }
}

/// Print `data` wrapped in an envelope in JSON mode, otherwise run `table`.
fn emit<T: Serialize>(format: OutputFormat, data: &T, table: impl FnOnce()) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", Envelope::ok(data).to_json()?),
        OutputFormat::Table => table(),
    }
    Ok(())
}

async fn run_tenant_command(
    service: &LedgerService,
    cmd: TenantCommands,
    format: OutputFormat,
) -> Result<()> {
    match cmd {
        TenantCommands::Create { number, name } => {
            let tenant = service.create_tenant(number, name).await?;
            info!(number = tenant.number, "tenant created");
            emit(format, &tenant, || {
                println!("Created tenant: {} ({})", tenant.name, tenant.number)
            })?;
        }

        TenantCommands::List => {
            let tenants = service.list_tenants().await?;
            emit(format, &tenants, || {
                if tenants.is_empty() {
                    println!("No tenants found.");
                    return;
                }
                println!("{:>8} NAME", "NUMBER");
                println!("{}", "-".repeat(44));
                for tenant in &tenants {
                    println!("{:>8} {}", tenant.number, tenant.name);
                }
            })?;
        }
    }
    Ok(())
}

async fn run_customer_command(
    service: &LedgerService,
    cmd: CustomerCommands,
    format: OutputFormat,
) -> Result<()> {
    match cmd {
        CustomerCommands::Create {
            tenant,
            number,
            name,
        } => {
            let customer = service.create_customer(tenant, number, name).await?;
            info!(tenant, number = customer.number, "customer created");
            emit(format, &customer, || {
                println!(
                    "Created customer: {} ({}) in tenant {}",
                    customer.name, customer.number, tenant
                )
            })?;
        }

        CustomerCommands::List { tenant } => {
            let customers = service.list_customers(tenant).await?;
            emit(format, &customers, || {
                if customers.is_empty() {
                    println!("No customers found.");
                    return;
                }
                println!("{:>8} NAME", "NUMBER");
                println!("{}", "-".repeat(44));
                for customer in &customers {
                    println!("{:>8} {}", customer.number, customer.name);
                }
            })?;
        }
    }
    Ok(())
}

async fn run_export_command(
    service: &LedgerService,
    view: ExportView,
    args: PageArgs,
    output: Option<&str>,
) -> Result<()> {
    let exporter = Exporter::new(service);
    let page = args.page_request()?;

    // A failed query must not truncate an existing output file.
    let mut buffer = Vec::new();
    let count = match view {
        ExportView::Audit => {
            exporter
                .export_audit_csv(&mut buffer, args.tenant, args.customer, page)
                .await?
        }
        ExportView::Statements => {
            exporter
                .export_statements_json(&mut buffer, args.tenant, args.customer, page)
                .await?
        }
    };

    match output {
        Some(path) => fs::write(path, &buffer)
            .with_context(|| format!("Failed to write output file: {}", path))?,
        None => stdout()
            .write_all(&buffer)
            .context("Failed to write export to stdout")?,
    }

    info!(?view, count, "export finished");
    Ok(())
}
