//! Repository Layer
//!
//! SQLite repositories for all domain entities.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::info;

use crate::error::{PlatformError, Result};

pub mod account;
pub mod budget;
pub mod contract;
pub mod invoice;
pub mod marketplace;
pub mod inventory;
pub mod calendar;
pub mod message;
pub mod notification;
pub mod crm;
pub mod audit_log;
mod schema;

pub use account::AccountRepository;
pub use budget::BudgetRepository;
pub use contract::ContractRepository;
pub use invoice::InvoiceRepository;
pub use marketplace::{ApplicationRepository, OpportunityRepository};
pub use inventory::{BookingRepository, InventoryAssetRepository, RightRepository};
pub use calendar::CalendarEventRepository;
pub use message::MessageRepository;
pub use notification::NotificationRepository;
pub use crm::{NoteRepository, TagRepository};
pub use audit_log::{AuditLogFilter, AuditLogRepository};

/// Open a connection pool with foreign keys enforced.
///
/// In-memory databases live and die with their connection, so they are
/// pinned to a single connection that is never recycled.
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let in_memory = url.contains(":memory:") || url.contains("mode=memory");
    let mut pool_options = SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(5));
    pool_options = if in_memory {
        pool_options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool_options.max_connections(max_connections)
    };

    let pool = pool_options.connect_with(options).await?;
    info!(url = %url, in_memory, "Database pool opened");
    Ok(pool)
}

/// Create all tables and indexes if they do not exist yet.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in schema::STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    info!(tables = schema::STATEMENTS.len(), "Database schema ready");
    Ok(())
}

/// Timestamps are stored as epoch milliseconds.
pub(crate) fn millis(ts: &DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

pub(crate) fn opt_millis(ts: &Option<DateTime<Utc>>) -> Option<i64> {
    ts.as_ref().map(millis)
}

pub(crate) fn timestamp(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>> {
    let value: i64 = row.try_get(column)?;
    DateTime::from_timestamp_millis(value)
        .ok_or_else(|| PlatformError::internal(format!("Invalid timestamp in column {}", column)))
}

pub(crate) fn opt_timestamp(row: &SqliteRow, column: &str) -> Result<Option<DateTime<Utc>>> {
    let value: Option<i64> = row.try_get(column)?;
    value
        .map(|v| {
            DateTime::from_timestamp_millis(v).ok_or_else(|| {
                PlatformError::internal(format!("Invalid timestamp in column {}", column))
            })
        })
        .transpose()
}

/// Read a text column holding one of the `text_enum!` values.
pub(crate) fn parse_column<T>(row: &SqliteRow, column: &str) -> Result<T>
where
    T: std::str::FromStr<Err = PlatformError>,
{
    let value: String = row.try_get(column)?;
    value.parse()
}

/// All repositories over one pool
#[derive(Clone)]
pub struct Repositories {
    pub accounts: Arc<AccountRepository>,
    pub budgets: Arc<BudgetRepository>,
    pub contracts: Arc<ContractRepository>,
    pub invoices: Arc<InvoiceRepository>,
    pub opportunities: Arc<OpportunityRepository>,
    pub applications: Arc<ApplicationRepository>,
    pub assets: Arc<InventoryAssetRepository>,
    pub bookings: Arc<BookingRepository>,
    pub rights: Arc<RightRepository>,
    pub calendar: Arc<CalendarEventRepository>,
    pub messages: Arc<MessageRepository>,
    pub notifications: Arc<NotificationRepository>,
    pub notes: Arc<NoteRepository>,
    pub tags: Arc<TagRepository>,
    pub audit_logs: Arc<AuditLogRepository>,
}

impl Repositories {
    pub fn new(pool: &SqlitePool) -> Self {
        Self {
            accounts: Arc::new(AccountRepository::new(pool.clone())),
            budgets: Arc::new(BudgetRepository::new(pool.clone())),
            contracts: Arc::new(ContractRepository::new(pool.clone())),
            invoices: Arc::new(InvoiceRepository::new(pool.clone())),
            opportunities: Arc::new(OpportunityRepository::new(pool.clone())),
            applications: Arc::new(ApplicationRepository::new(pool.clone())),
            assets: Arc::new(InventoryAssetRepository::new(pool.clone())),
            bookings: Arc::new(BookingRepository::new(pool.clone())),
            rights: Arc::new(RightRepository::new(pool.clone())),
            calendar: Arc::new(CalendarEventRepository::new(pool.clone())),
            messages: Arc::new(MessageRepository::new(pool.clone())),
            notifications: Arc::new(NotificationRepository::new(pool.clone())),
            notes: Arc::new(NoteRepository::new(pool.clone())),
            tags: Arc::new(TagRepository::new(pool.clone())),
            audit_logs: Arc::new(AuditLogRepository::new(pool.clone())),
        }
    }
}
