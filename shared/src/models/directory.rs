//! Directory Models
//!
//! Suppliers, employees, operations and products are owned elsewhere; the
//! scheduler only resolves them by id.

use serde::{Deserialize, Serialize};

/// Supplier (external party booking deliveries)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: i64,
    pub company_name: String,
    pub contact_email: Option<String>,
    pub is_active: bool,
}

/// Employee (receives deliveries)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub operation_id: Option<i64>,
    pub is_active: bool,
}

/// Operation (location receiving deliveries)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Operation {
    pub id: i64,
    pub name: String,
    pub code: String,
    /// Business hours opening time (HH:MM format, e.g. "08:00")
    pub opening_time: String,
    /// Business hours closing time (HH:MM format, e.g. "18:00")
    pub closing_time: String,
    pub is_active: bool,
}

impl Operation {
    pub const DEFAULT_OPENING: &'static str = "08:00";
    pub const DEFAULT_CLOSING: &'static str = "18:00";
}

/// Product (what is being delivered)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub supplier_id: Option<i64>,
    pub is_active: bool,
}
