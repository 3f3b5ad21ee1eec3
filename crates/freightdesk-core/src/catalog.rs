//! The logistics backend's resources, registered once at start-up.

use crate::errors::Result;
use crate::schema::{EntityConfig, EntityRegistry, FieldKind};
use crate::sort::OrderBy;

pub fn orders() -> Result<EntityConfig> {
    EntityConfig::builder("orders")
        .fields(
            FieldKind::Text,
            [
                "id",
                "reference",
                "notes",
                "terminal_id",
                "eta_driver",
                "eta_driver_phone",
                "eta_truck",
                "eta_trailer",
                "etd_driver",
                "etd_driver_phone",
                "etd_truck",
                "etd_trailer",
            ],
        )
        .fields(FieldKind::Enumerated, ["service", "commodity"])
        .fields(
            FieldKind::Temporal,
            ["eta_date", "eta_time", "etd_date", "etd_time", "created_at", "updated_at"],
        )
        .fields(FieldKind::Numeric, ["pallets", "boxes", "kilos"])
        .field("priority", FieldKind::Boolean)
        .sortable(["id", "reference"])
        .build()
}

pub fn drivers() -> Result<EntityConfig> {
    EntityConfig::builder("drivers")
        .fields(FieldKind::Text, ["id", "name", "phone"])
        .sortable(["id", "name"])
        .build()
}

fn vehicle(name: &str) -> Result<EntityConfig> {
    EntityConfig::builder(name)
        .fields(FieldKind::Text, ["id", "name", "license_plate"])
        .sortable(["id", "name", "license_plate"])
        .build()
}

pub fn trucks() -> Result<EntityConfig> {
    vehicle("trucks")
}

pub fn trailers() -> Result<EntityConfig> {
    vehicle("trailers")
}

pub fn terminals() -> Result<EntityConfig> {
    let text = ["id", "name", "time_zone", "address", "short_name", "account_code"];
    EntityConfig::builder("terminals")
        .fields(FieldKind::Text, text)
        .sortable(text)
        .build()
}

pub fn order_documents() -> Result<EntityConfig> {
    EntityConfig::builder("order_documents")
        .fields(FieldKind::Text, ["id", "order_id", "title"])
        .field("type", FieldKind::Enumerated)
        .field("created_at", FieldKind::Temporal)
        .sortable(["id", "title", "created_at"])
        .default_order(OrderBy::desc("created_at"))
        .build()
}

/// Registry with every resource the backend serves.
pub fn logistics() -> Result<EntityRegistry> {
    EntityRegistry::new([
        orders()?,
        drivers()?,
        trucks()?,
        trailers()?,
        terminals()?,
        order_documents()?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_registers_every_resource() {
        let reg = logistics().unwrap();
        let names: Vec<_> = reg.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["drivers", "order_documents", "orders", "terminals", "trailers", "trucks"]
        );
    }

    #[test]
    fn order_fields_carry_expected_kinds() {
        let o = orders().unwrap();
        assert_eq!(o.schema.kind_of("reference"), Some(FieldKind::Text));
        assert_eq!(o.schema.kind_of("pallets"), Some(FieldKind::Numeric));
        assert_eq!(o.schema.kind_of("priority"), Some(FieldKind::Boolean));
        assert_eq!(o.schema.kind_of("eta_date"), Some(FieldKind::Temporal));
        assert_eq!(o.schema.kind_of("service"), Some(FieldKind::Enumerated));
        assert!(o.sortable.contains("reference"));
        assert!(!o.sortable.contains("pallets"));
    }
}
