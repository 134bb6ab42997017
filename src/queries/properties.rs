use crate::DbConn;
use crate::{
    error::{Error, Result},
    models::properties::{Property, UnitFilters, UnitListing, UnitStatus},
};
use uuid::Uuid;

/// All known properties, for name matching and the project question.
pub async fn list_properties(conn: &mut DbConn) -> Result<Vec<Property>> {
    let properties = sqlx::query_as::<_, Property>(
        r#"
        SELECT id, name, address
        FROM properties
        ORDER BY name
        "#,
    )
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(properties)
}

/// Available units joined with their property, filtered server-side.
/// Area/project preference is applied by the caller because it is a
/// normalized-substring rule, not a column predicate.
pub async fn get_available_units(
    conn: &mut DbConn,
    filters: &UnitFilters,
) -> Result<Vec<UnitListing>> {
    let units = sqlx::query_as::<_, UnitListing>(
        r#"
        SELECT u.id AS unit_id, u.rooms, u.price, u.has_parking, u.area_sqm,
               u.image_url, u.floorplan_url,
               p.name AS property_name, p.address AS property_address
        FROM units u
        JOIN properties p ON p.id = u.property_id
        WHERE u.status = 'available'
          AND ($1::integer IS NULL OR u.rooms >= $1)
          AND ($2::integer IS NULL OR u.rooms <= $2)
          AND ($3::bigint IS NULL OR u.price >= $3)
          AND ($4::bigint IS NULL OR u.price <= $4)
          AND ($5::boolean IS NULL OR u.has_parking = $5)
        ORDER BY u.price ASC
        "#,
    )
    .bind(filters.min_rooms)
    .bind(filters.max_rooms)
    .bind(filters.min_price)
    .bind(filters.max_price)
    .bind(filters.parking)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(units)
}

/// Moves a unit between available/hold/rented.
pub async fn update_unit_status(conn: &mut DbConn, unit_id: Uuid, status: UnitStatus) -> Result<()> {
    let rows_affected = sqlx::query(
        r#"
        UPDATE units
        SET status = $2, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(unit_id)
    .bind(status)
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    if rows_affected == 0 {
        return Err(Error::NotFound(format!("Unit with ID {} not found", unit_id)));
    }

    Ok(())
}
