//! Serde types matching the finance API's request and response bodies.
//!
//! Monetary amounts arrive as decimal strings (`"100.00"`) and are kept that
//! way - formatting and arithmetic are the caller's concern. Create payloads
//! send plain numbers, mirroring what the server accepts.

use serde::{Deserialize, Serialize};

// ============================================================================
// Shared enums
// ============================================================================

/// Direction of money movement; used by categories and transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowType {
  Income,
  Expense,
}

impl FlowType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Income => "income",
      Self::Expense => "expense",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
  Pending,
  Completed,
  Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
  Weekly,
  Biweekly,
  Monthly,
  Yearly,
}

// ============================================================================
// Budgets
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRead {
  pub id: i64,
  pub category_id: i64,
  /// Decimal string, e.g. `"100.00"`.
  pub amount: String,
  /// `YYYY-MM`.
  pub month_year: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCreate {
  pub category_id: i64,
  pub amount: f64,
  pub month_year: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetUpdate {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub category_id: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub amount: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub month_year: Option<String>,
}

/// Filter for budget lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetListParams {
  pub month_year: Option<String>,
}

impl BudgetListParams {
  pub fn to_query(&self) -> Vec<(String, String)> {
    let mut query = Vec::new();
    if let Some(month_year) = &self.month_year {
      query.push(("month_year".into(), month_year.clone()));
    }
    query
  }
}

// ============================================================================
// Transactions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRead {
  pub id: i64,
  pub user_id: i64,
  pub category_id: i64,
  /// Decimal string.
  pub amount: String,
  /// ISO date, `YYYY-MM-DD`.
  pub date: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub kind: Option<FlowType>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<TransactionStatus>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub recurring_id: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub failure_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionCreate {
  pub user_id: i64,
  pub category_id: i64,
  pub amount: f64,
  pub date: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub kind: Option<FlowType>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<TransactionStatus>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub recurring_id: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub failure_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionUpdate {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub category_id: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub amount: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub date: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub kind: Option<FlowType>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<TransactionStatus>,
}

/// Filter and pagination for transaction lists; passed through to the server
/// uninterpreted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionListParams {
  pub skip: Option<u32>,
  pub limit: Option<u32>,
  pub category_id: Option<i64>,
  pub kind: Option<FlowType>,
  pub start_date: Option<String>,
  pub end_date: Option<String>,
}

impl TransactionListParams {
  pub fn to_query(&self) -> Vec<(String, String)> {
    let mut query = Vec::new();
    if let Some(skip) = self.skip {
      query.push(("skip".into(), skip.to_string()));
    }
    if let Some(limit) = self.limit {
      query.push(("limit".into(), limit.to_string()));
    }
    if let Some(category_id) = self.category_id {
      query.push(("category_id".into(), category_id.to_string()));
    }
    if let Some(kind) = self.kind {
      query.push(("type".into(), kind.as_str().into()));
    }
    if let Some(start_date) = &self.start_date {
      query.push(("start_date".into(), start_date.clone()));
    }
    if let Some(end_date) = &self.end_date {
      query.push(("end_date".into(), end_date.clone()));
    }
    query
  }
}

// ============================================================================
// Categories
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRead {
  pub id: i64,
  pub name: String,
  #[serde(rename = "type")]
  pub kind: FlowType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCreate {
  pub name: String,
  #[serde(rename = "type")]
  pub kind: FlowType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryUpdate {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub kind: Option<FlowType>,
}

// ============================================================================
// Recurring payments
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringPaymentRead {
  pub id: i64,
  pub category_id: i64,
  /// Decimal string.
  pub amount: String,
  pub frequency: Frequency,
  /// ISO date of the next scheduled charge.
  pub next_due_date: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringPaymentCreate {
  pub category_id: i64,
  pub amount: f64,
  pub frequency: Frequency,
  pub next_due_date: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_id: Option<i64>,
}

// ============================================================================
// Reports
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
  Daily,
  Weekly,
  Monthly,
}

impl Granularity {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Daily => "daily",
      Self::Weekly => "weekly",
      Self::Monthly => "monthly",
    }
  }
}

/// Date range shared by every report query.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRange {
  /// `YYYY-MM-DD`, inclusive.
  pub start_date: String,
  /// `YYYY-MM-DD`, inclusive.
  pub end_date: String,
}

impl ReportRange {
  pub fn to_query(&self) -> Vec<(String, String)> {
    vec![
      ("start_date".into(), self.start_date.clone()),
      ("end_date".into(), self.end_date.clone()),
    ]
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeExpenseItem {
  pub period: String,
  pub income: String,
  pub expense: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeExpenseReport {
  pub items: Vec<IncomeExpenseItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub category_id: Option<i64>,
  pub category_name: String,
  pub total: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ByCategoryReport {
  pub items: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
  pub period: String,
  pub total: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
  pub items: Vec<TrendPoint>,
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginData {
  pub email: String,
  pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
  pub access_token: String,
  pub refresh_token: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub token_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCreate {
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub telephone: Option<String>,
  pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRead {
  pub id: i64,
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub telephone: Option<String>,
}
