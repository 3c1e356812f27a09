//! Customer queries.
//!
//! Every statement binds its parameters; nothing user-supplied is ever
//! formatted into SQL text. Writes validate first and touch the table only
//! when the input is acceptable.

use chrono::Local;
use sqlx::{QueryBuilder, Sqlite};

use crate::db::{Customer, CustomerInput, CustomerQuery, CustomerType, DbPool, TypeFilter};
use crate::error::CrmResult;
use crate::validation::validate_customer;

const CUSTOMER_COLUMNS: &str =
    "id, company_name, contact_name, phone, customer_type, notes, registration_date";

pub async fn count_all(db: &DbPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM customers")
        .fetch_one(db)
        .await
}

pub async fn count_by_type(db: &DbPool, customer_type: CustomerType) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE customer_type = ?")
        .bind(customer_type.as_str())
        .fetch_one(db)
        .await
}

/// The `limit` customers with the highest ids, newest first
pub async fn list_recent(db: &DbPool, limit: u32) -> Result<Vec<Customer>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY id DESC LIMIT ?"
    ))
    .bind(i64::from(limit))
    .fetch_all(db)
    .await
}

pub async fn find(db: &DbPool, id: i64) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

/// Substring match on company or contact name, ANDed with an exact type match.
/// Blank text and `TypeFilter::All` return every row. Case folding is ASCII-only,
/// the same as SQLite's `LOWER`, so both sides of the comparison agree.
pub async fn search(db: &DbPool, query: &CustomerQuery) -> Result<Vec<Customer>, sqlx::Error> {
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {CUSTOMER_COLUMNS} FROM customers"));
    let mut has_condition = false;

    let text = query.text.trim().to_ascii_lowercase();
    if !text.is_empty() {
        let pattern = format!("%{}%", escape_like(&text));
        builder
            .push(" WHERE (LOWER(company_name) LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR LOWER(contact_name) LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
        has_condition = true;
    }

    if let TypeFilter::Only(customer_type) = query.type_filter {
        builder
            .push(if has_condition { " AND " } else { " WHERE " })
            .push("customer_type = ")
            .push_bind(customer_type.as_str());
    }

    builder.push(" ORDER BY id DESC");
    let customers = builder.build_query_as().fetch_all(db).await?;
    Ok(customers)
}

/// Insert a customer registered today. Returns the new id.
pub async fn insert(db: &DbPool, input: &CustomerInput) -> CrmResult<i64> {
    let input = input.trimmed();
    validate_customer(&input)?;

    let registration_date = Local::now().format("%Y-%m-%d").to_string();
    let result = sqlx::query(
        r#"
        INSERT INTO customers (company_name, contact_name, phone, customer_type, notes, registration_date)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.company_name)
    .bind(&input.contact_name)
    .bind(&input.phone)
    .bind(input.customer_type.as_str())
    .bind(&input.notes)
    .bind(&registration_date)
    .execute(db)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Update the editable fields of a customer; the registration date is kept.
/// Returns the number of rows changed, zero when the id does not exist.
pub async fn update(db: &DbPool, id: i64, input: &CustomerInput) -> CrmResult<u64> {
    let input = input.trimmed();
    validate_customer(&input)?;

    let result = sqlx::query(
        r#"
        UPDATE customers
        SET company_name = ?, contact_name = ?, phone = ?, customer_type = ?, notes = ?
        WHERE id = ?
        "#,
    )
    .bind(&input.company_name)
    .bind(&input.contact_name)
    .bind(&input.phone)
    .bind(input.customer_type.as_str())
    .bind(&input.notes)
    .bind(id)
    .execute(db)
    .await?;

    Ok(result.rows_affected())
}

/// Delete by id. Deleting an unknown id changes nothing.
pub async fn delete(db: &DbPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM customers WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

/// Escape LIKE wildcards so the text matches literally
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::temp_store;
    use crate::error::{CrmError, ValidationError};

    fn input(company: &str, contact: &str, phone: &str, t: CustomerType) -> CustomerInput {
        CustomerInput::new(company, contact, phone, t, "")
    }

    #[tokio::test]
    async fn test_search_non_ascii_names() {
        let (_dir, store) = temp_store().await;
        let db = store.pool();
        insert(&db, &input("Émile Coal", "Zoë", "13800138000", CustomerType::CleanCoal))
            .await
            .unwrap();

        for text in ["Émile", "ÉMILE COAL", "zoë", "coal"] {
            let rows = search(&db, &CustomerQuery::new(text, TypeFilter::All))
                .await
                .unwrap();
            assert_eq!(rows.len(), 1, "text {text:?}");
        }
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("abc"), "abc");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[tokio::test]
    async fn test_insert_then_search_returns_fields() {
        let (_dir, store) = temp_store().await;
        let db = store.pool();

        let new = CustomerInput::new(
            "凯川煤业",
            "王五",
            "13800138000",
            CustomerType::Middlings,
            "月结",
        );
        let id = insert(&db, &new).await.unwrap();

        let rows = search(&db, &CustomerQuery::all()).await.unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.id, id);
        assert_eq!(row.company_name, "凯川煤业");
        assert_eq!(row.contact_name, "王五");
        assert_eq!(row.phone, "13800138000");
        assert_eq!(row.customer_type, "中煤");
        assert_eq!(row.notes.as_deref(), Some("月结"));
        assert_eq!(
            row.registration_date,
            Local::now().format("%Y-%m-%d").to_string()
        );
    }

    #[tokio::test]
    async fn test_invalid_phone_rejected_without_write() {
        let (_dir, store) = temp_store().await;
        let db = store.pool();

        for phone in ["12345", "23456789012", ""] {
            let err = insert(&db, &input("A", "B", phone, CustomerType::CleanCoal))
                .await
                .unwrap_err();
            assert!(matches!(err, CrmError::Validation(_)), "phone {phone:?}");
        }
        assert_eq!(count_all(&db).await.unwrap(), 0);

        let id = insert(&db, &input("A", "B", "13800138000", CustomerType::CleanCoal))
            .await
            .unwrap();
        let err = update(&db, id, &input("A2", "B2", "12345", CustomerType::Middlings))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CrmError::Validation(ValidationError::InvalidPhone)
        ));

        let row = find(&db, id).await.unwrap().unwrap();
        assert_eq!(row.company_name, "A");
        assert_eq!(row.customer_type, "精煤");
    }

    #[tokio::test]
    async fn test_missing_required_field_rejected() {
        let (_dir, store) = temp_store().await;
        let db = store.pool();

        let err = insert(&db, &input("  ", "B", "13800138000", CustomerType::CleanCoal))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CrmError::Validation(ValidationError::MissingRequired)
        ));
        assert_eq!(count_all(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_counts_and_recent_order() {
        let (_dir, store) = temp_store().await;
        let db = store.pool();

        let a = insert(&db, &input("A", "a", "13800000001", CustomerType::CleanCoal))
            .await
            .unwrap();
        let b = insert(&db, &input("B", "b", "13800000002", CustomerType::Middlings))
            .await
            .unwrap();
        let c = insert(&db, &input("C", "c", "13800000003", CustomerType::CleanCoal))
            .await
            .unwrap();
        assert!(a < b && b < c);

        assert_eq!(count_all(&db).await.unwrap(), 3);
        assert_eq!(
            count_by_type(&db, CustomerType::CleanCoal).await.unwrap(),
            2
        );
        assert_eq!(
            count_by_type(&db, CustomerType::Middlings).await.unwrap(),
            1
        );

        let recent = list_recent(&db, 2).await.unwrap();
        let ids: Vec<i64> = recent.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![c, b]);
    }

    #[tokio::test]
    async fn test_search_filters() {
        let (_dir, store) = temp_store().await;
        let db = store.pool();

        insert(&db, &input("Acme Coal", "Zhang", "13800000001", CustomerType::CleanCoal))
            .await
            .unwrap();
        insert(&db, &input("Beta Mining", "Li", "13800000002", CustomerType::Middlings))
            .await
            .unwrap();
        insert(&db, &input("Gamma", "ACME rep", "13800000003", CustomerType::Middlings))
            .await
            .unwrap();
        insert(&db, &input("100% Coal", "Wang", "13800000004", CustomerType::CleanCoal))
            .await
            .unwrap();

        let names = |rows: Vec<Customer>| -> Vec<String> {
            rows.into_iter().map(|c| c.company_name).collect()
        };

        let all = search(&db, &CustomerQuery::all()).await.unwrap();
        assert_eq!(
            names(all),
            vec!["100% Coal", "Gamma", "Beta Mining", "Acme Coal"]
        );

        let acme = search(&db, &CustomerQuery::new("acme", TypeFilter::All))
            .await
            .unwrap();
        assert_eq!(names(acme), vec!["Gamma", "Acme Coal"]);

        let acme_middlings = search(
            &db,
            &CustomerQuery::new(" ACME ", TypeFilter::Only(CustomerType::Middlings)),
        )
        .await
        .unwrap();
        assert_eq!(names(acme_middlings), vec!["Gamma"]);

        let clean = search(
            &db,
            &CustomerQuery::new("", TypeFilter::Only(CustomerType::CleanCoal)),
        )
        .await
        .unwrap();
        assert_eq!(names(clean), vec!["100% Coal", "Acme Coal"]);

        let percent = search(&db, &CustomerQuery::new("%", TypeFilter::All))
            .await
            .unwrap();
        assert_eq!(names(percent), vec!["100% Coal"]);

        let none = search(&db, &CustomerQuery::new("nobody", TypeFilter::All))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_registration_date() {
        let (_dir, store) = temp_store().await;
        let db = store.pool();

        let id = insert(&db, &input("A", "a", "13800000001", CustomerType::CleanCoal))
            .await
            .unwrap();
        sqlx::query("UPDATE customers SET registration_date = '2020-01-02' WHERE id = ?")
            .bind(id)
            .execute(&*db)
            .await
            .unwrap();

        let changed = update(
            &db,
            id,
            &CustomerInput::new("A Ltd", "b", "13900000001", CustomerType::Middlings, "vip"),
        )
        .await
        .unwrap();
        assert_eq!(changed, 1);

        let row = find(&db, id).await.unwrap().unwrap();
        assert_eq!(row.company_name, "A Ltd");
        assert_eq!(row.contact_name, "b");
        assert_eq!(row.phone, "13900000001");
        assert_eq!(row.customer_type, "中煤");
        assert_eq!(row.notes.as_deref(), Some("vip"));
        assert_eq!(row.registration_date, "2020-01-02");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_noop() {
        let (_dir, store) = temp_store().await;
        let db = store.pool();

        let id = insert(&db, &input("A", "a", "13800000001", CustomerType::CleanCoal))
            .await
            .unwrap();
        let changed = update(&db, id + 100, &input("X", "x", "13800000009", CustomerType::Middlings))
            .await
            .unwrap();
        assert_eq!(changed, 0);
        assert_eq!(find(&db, id).await.unwrap().unwrap().company_name, "A");
    }

    #[tokio::test]
    async fn test_delete() {
        let (_dir, store) = temp_store().await;
        let db = store.pool();

        let a = insert(&db, &input("A", "a", "13800000001", CustomerType::CleanCoal))
            .await
            .unwrap();
        let b = insert(&db, &input("B", "b", "13800000002", CustomerType::CleanCoal))
            .await
            .unwrap();

        assert_eq!(delete(&db, b).await.unwrap(), 1);
        assert_eq!(delete(&db, b + 50).await.unwrap(), 0);

        let rows = search(&db, &CustomerQuery::all()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, a);
        assert_eq!(count_all(&db).await.unwrap(), 1);

        // Ids are not handed out again after the highest row is deleted
        let c = insert(&db, &input("C", "c", "13800000003", CustomerType::CleanCoal))
            .await
            .unwrap();
        assert!(c > b);
    }
}
