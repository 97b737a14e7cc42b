//! Budget and Expense Repository

use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use super::{millis, timestamp};
use crate::domain::{Budget, Expense};
use crate::error::Result;

const BUDGET_COLUMNS: &str = "id, club_id, name, season, total_cents, created_at, updated_at";
const EXPENSE_COLUMNS: &str =
    "id, budget_id, description, amount_cents, spent_on, category, created_at";

pub struct BudgetRepository {
    pool: SqlitePool,
}

impl BudgetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, budget: &Budget) -> Result<()> {
        sqlx::query(
            "INSERT INTO budgets (id, club_id, name, season, total_cents, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&budget.id)
        .bind(&budget.club_id)
        .bind(&budget.name)
        .bind(&budget.season)
        .bind(budget.total_cents)
        .bind(millis(&budget.created_at))
        .bind(millis(&budget.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Budget>> {
        let row = sqlx::query(&format!("SELECT {} FROM budgets WHERE id = ?", BUDGET_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(budget_from_row).transpose()
    }

    pub async fn find_by_club(&self, club_id: &str) -> Result<Vec<Budget>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM budgets WHERE club_id = ? ORDER BY created_at DESC",
            BUDGET_COLUMNS
        ))
        .bind(club_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(budget_from_row).collect()
    }

    pub async fn update(&self, budget: &Budget) -> Result<()> {
        sqlx::query(
            "UPDATE budgets SET name = ?, season = ?, total_cents = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&budget.name)
        .bind(&budget.season)
        .bind(budget.total_cents)
        .bind(millis(&budget.updated_at))
        .bind(&budget.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Expenses go with the budget through `ON DELETE CASCADE`.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn spent_cents(&self, budget_id: &str) -> Result<i64> {
        let spent: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM expenses WHERE budget_id = ?",
        )
        .bind(budget_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(spent)
    }

    // Expenses

    pub async fn insert_expense(&self, expense: &Expense) -> Result<()> {
        sqlx::query(
            "INSERT INTO expenses (id, budget_id, description, amount_cents, spent_on, category, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&expense.id)
        .bind(&expense.budget_id)
        .bind(&expense.description)
        .bind(expense.amount_cents)
        .bind(expense.spent_on)
        .bind(&expense.category)
        .bind(millis(&expense.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_expense(&self, id: &str) -> Result<Option<Expense>> {
        let row = sqlx::query(&format!("SELECT {} FROM expenses WHERE id = ?", EXPENSE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(expense_from_row).transpose()
    }

    pub async fn find_expenses(&self, budget_id: &str) -> Result<Vec<Expense>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM expenses WHERE budget_id = ? ORDER BY spent_on DESC, created_at DESC",
            EXPENSE_COLUMNS
        ))
        .bind(budget_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(expense_from_row).collect()
    }

    pub async fn delete_expense(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn budget_from_row(row: &SqliteRow) -> Result<Budget> {
    Ok(Budget {
        id: row.try_get("id")?,
        club_id: row.try_get("club_id")?,
        name: row.try_get("name")?,
        season: row.try_get("season")?,
        total_cents: row.try_get("total_cents")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}

fn expense_from_row(row: &SqliteRow) -> Result<Expense> {
    Ok(Expense {
        id: row.try_get("id")?,
        budget_id: row.try_get("budget_id")?,
        description: row.try_get("description")?,
        amount_cents: row.try_get("amount_cents")?,
        spent_on: row.try_get("spent_on")?,
        category: row.try_get("category")?,
        created_at: timestamp(row, "created_at")?,
    })
}
