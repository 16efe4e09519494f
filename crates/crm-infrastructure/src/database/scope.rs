//! SQL fragments shared by the scoped queries.
//!
//! Every scoped query joins `customers cu`, `salespersons sp` and `users u`
//! (the salesperson's account) so the helpers below can refer to them.

use sqlx::{Postgres, QueryBuilder};

use crm_core::access::AccessScope;
use crm_core::domain::{ContactFilter, CustomerFilter};

/// Display name of the owning salesperson, falling back to the username.
pub(crate) const SALESPERSON_NAME: &str =
    "COALESCE(NULLIF(TRIM(u.first_name || ' ' || u.last_name), ''), u.username)";

pub(crate) const CUSTOMER_JOINS: &str = " FROM customers cu \
     JOIN salespersons sp ON sp.id = cu.salesperson_id \
     JOIN users u ON u.id = sp.user_id";

/// Appends the `AND ...` restriction for `scope`.
pub(crate) fn push_scope(qb: &mut QueryBuilder<'_, Postgres>, scope: &AccessScope) {
    match scope {
        AccessScope::All => {}
        AccessScope::Department(dept) => {
            qb.push(" AND cu.department = ").push_bind(dept.as_str());
        }
        AccessScope::Salesperson(salesperson_id) => {
            qb.push(" AND cu.salesperson_id = ").push_bind(*salesperson_id);
        }
        AccessScope::Nothing => {
            qb.push(" AND FALSE");
        }
    }
}

pub(crate) fn push_customer_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &CustomerFilter) {
    if let Some(dept) = filter.department {
        qb.push(" AND cu.department = ").push_bind(dept.as_str());
    }
    if let Some(salesperson_id) = filter.salesperson_id {
        qb.push(" AND cu.salesperson_id = ").push_bind(salesperson_id);
    }
    if let Some(term) = filter.search_term() {
        qb.push(" AND cu.name ILIKE ").push_bind(like_pattern(term));
    }
}

/// Contact filters; expects `contacts c` joined to `cu`.
pub(crate) fn push_contact_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ContactFilter) {
    if let Some(dept) = filter.department {
        qb.push(" AND cu.department = ").push_bind(dept.as_str());
    }
    if let Some(salesperson_id) = filter.salesperson_id {
        qb.push(" AND cu.salesperson_id = ").push_bind(salesperson_id);
    }
    if let Some(customer_id) = filter.customer_id {
        qb.push(" AND c.customer_id = ").push_bind(customer_id);
    }
    if let Some(is_active) = filter.status.as_active_flag() {
        qb.push(" AND c.is_active = ").push_bind(is_active);
    }
    if let Some(term) = filter.search_term() {
        qb.push(" AND c.name ILIKE ").push_bind(like_pattern(term));
    }
}

/// `%term%` with LIKE wildcards in `term` escaped.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crm_core::domain::{ContactStatusFilter, Department};
    use uuid::Uuid;

    fn base() -> QueryBuilder<'static, Postgres> {
        QueryBuilder::new("SELECT cu.id FROM customers cu WHERE TRUE")
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rose"), "%rose%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_scope_sql() {
        let mut qb = base();
        push_scope(&mut qb, &AccessScope::All);
        assert!(qb.sql().ends_with("WHERE TRUE"));

        let mut qb = base();
        push_scope(&mut qb, &AccessScope::Department(Department::Wholesale));
        assert!(qb.sql().ends_with("AND cu.department = $1"));

        let mut qb = base();
        push_scope(&mut qb, &AccessScope::Salesperson(Uuid::new_v4()));
        assert!(qb.sql().ends_with("AND cu.salesperson_id = $1"));

        let mut qb = base();
        push_scope(&mut qb, &AccessScope::Nothing);
        assert!(qb.sql().ends_with("AND FALSE"));
    }

    #[test]
    fn test_contact_filter_numbers_binds_after_scope() {
        let mut qb = base();
        push_scope(&mut qb, &AccessScope::Department(Department::Ecommerce));
        let filter = ContactFilter {
            status: ContactStatusFilter::Inactive,
            search: Some("ana".to_string()),
            ..Default::default()
        };
        push_contact_filter(&mut qb, &filter);
        let sql = qb.sql();
        assert!(sql.contains("c.is_active = $2"));
        assert!(sql.contains("c.name ILIKE $3"));
    }
}
