use super::*;
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_typed_id_creation() {
    let id = CustomerId::new();
    assert!(!id.to_string().is_empty());
}

#[test]
fn test_typed_id_from_uuid() {
    let uuid = Uuid::new_v4();
    let id = RouteId::from_uuid(uuid);
    assert_eq!(id.into_inner(), uuid);
}

#[test]
fn test_typed_id_display() {
    let uuid = Uuid::new_v4();
    let id = InvoiceId::from_uuid(uuid);
    assert_eq!(format!("{id}"), uuid.to_string());
}

#[test]
fn test_typed_id_from_str() {
    let uuid = Uuid::new_v4();
    let id = PricingId::from_str(&uuid.to_string()).unwrap();
    assert_eq!(id.into_inner(), uuid);
}

#[test]
fn test_typed_id_from_str_error() {
    assert!(SubscriptionId::from_str("invalid").is_err());
}

#[test]
fn test_typed_id_short() {
    let id = InvoiceId::from_str("0f8c2a1b-1111-2222-3333-444455556666").unwrap();
    assert_eq!(id.short(), "0f8c2a1b");
}

#[test]
fn test_typed_id_ordering_follows_uuid() {
    let low = PricingId::from_uuid(Uuid::from_u128(1));
    let high = PricingId::from_uuid(Uuid::from_u128(2));
    assert!(low < high);
    assert_eq!(low.max(high), high);
}

#[test]
fn test_typed_id_serde_transparent() {
    let uuid = Uuid::new_v4();
    let id = CustomerId::from_uuid(uuid);
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{uuid}\""));
}
