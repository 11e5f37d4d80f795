//! Directory Repository (suppliers, employees, operations, products)
//!
//! Lookups only return active rows. Insert helpers exist for seeding.

use super::RepoResult;
use shared::models::{Employee, Operation, Product, Supplier};
use sqlx::SqlitePool;

pub async fn find_supplier(pool: &SqlitePool, id: i64) -> RepoResult<Option<Supplier>> {
    let supplier = sqlx::query_as::<_, Supplier>(
        "SELECT id, company_name, contact_email, is_active FROM supplier WHERE id = ? AND is_active = 1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(supplier)
}

pub async fn find_employee(pool: &SqlitePool, id: i64) -> RepoResult<Option<Employee>> {
    let employee = sqlx::query_as::<_, Employee>(
        "SELECT id, name, operation_id, is_active FROM employee WHERE id = ? AND is_active = 1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(employee)
}

pub async fn find_operation(pool: &SqlitePool, id: i64) -> RepoResult<Option<Operation>> {
    let operation = sqlx::query_as::<_, Operation>(
        "SELECT id, name, code, opening_time, closing_time, is_active FROM operation WHERE id = ? AND is_active = 1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(operation)
}

pub async fn find_product(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        "SELECT id, name, sku, supplier_id, is_active FROM product WHERE id = ? AND is_active = 1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(product)
}

pub async fn insert_supplier(pool: &SqlitePool, s: &Supplier) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO supplier (id, company_name, contact_email, is_active) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(s.id)
    .bind(&s.company_name)
    .bind(&s.contact_email)
    .bind(s.is_active)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn insert_employee(pool: &SqlitePool, e: &Employee) -> RepoResult<()> {
    sqlx::query("INSERT INTO employee (id, name, operation_id, is_active) VALUES (?1, ?2, ?3, ?4)")
        .bind(e.id)
        .bind(&e.name)
        .bind(e.operation_id)
        .bind(e.is_active)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn insert_operation(pool: &SqlitePool, o: &Operation) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO operation (id, name, code, opening_time, closing_time, is_active) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(o.id)
    .bind(&o.name)
    .bind(&o.code)
    .bind(&o.opening_time)
    .bind(&o.closing_time)
    .bind(o.is_active)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn insert_product(pool: &SqlitePool, p: &Product) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO product (id, name, sku, supplier_id, is_active) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(p.id)
    .bind(&p.name)
    .bind(&p.sku)
    .bind(p.supplier_id)
    .bind(p.is_active)
    .execute(pool)
    .await?;
    Ok(())
}
