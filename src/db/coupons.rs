//! Coupon lookup. Coupons are read-only here; management is external.

use sqlx::PgExecutor;

use crate::models::Coupon;

pub async fn find_by_code(
    exec: impl PgExecutor<'_>,
    code: &str,
) -> Result<Option<Coupon>, sqlx::Error> {
    sqlx::query_as::<_, Coupon>("SELECT * FROM coupons WHERE code = $1")
        .bind(code)
        .fetch_optional(exec)
        .await
}
