//! One-time normalization of legacy records.
//!
//! Data written by earlier versions of the marketplace identified the owning
//! artisan through whichever of several fields happened to be set, stored
//! numeric ids, and left quantities or statuses implicit. Current code
//! requires a single `artisanId` string populated at creation time, so this
//! migration rewrites old records once at startup instead of re-running the
//! multi-field scan on every read.

use crate::{error::CraftoraDbResult as Result, store::Store};
use serde_json::{Map, Value};

const UNKNOWN_ARTISAN: &str = "unknown-artisan";

// In the order the legacy scan consulted them.
const LEGACY_OWNER_FIELDS: [&str; 5] = ["artisanId", "addedBy", "seller", "owner", "postedBy"];

const LEGACY_IMAGE_FIELDS: [&str; 4] = ["imageUrl", "img", "thumbnail", "thumb"];

/// Bring every slot the workflows read up to the current record shapes.
/// Slots that are missing, corrupt or already clean are left untouched.
pub fn run_legacy_migrations(store: &Store) -> Result<()> {
    migrate_slot(store, "cart", migrate_cart_item)?;
    migrate_slot(store, "orders", migrate_order)?;
    migrate_slot(store, "pendingProducts", |p| migrate_product(p, "pending"))?;
    migrate_slot(store, "adminProducts", |p| migrate_product(p, "approved"))?;
    migrate_slot(store, "productFeedbacks", migrate_feedback)?;
    Ok(())
}

fn migrate_slot<F>(store: &Store, name: &str, mut f: F) -> Result<()>
where
    F: FnMut(&mut Map<String, Value>) -> bool,
{
    let raw = match store.read_raw(name)? {
        Some(raw) => raw,
        None => return Ok(()),
    };
    // A corrupt slot recovers to empty at read time; nothing to rewrite here.
    let mut value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(_) => return Ok(()),
    };
    let entries = match value.as_array_mut() {
        Some(entries) => entries,
        None => return Ok(()),
    };

    let mut changed = false;
    for entry in entries {
        if let Some(obj) = entry.as_object_mut() {
            changed |= f(obj);
        }
    }
    if changed {
        store.write_raw(name, &serde_json::to_string(&value)?)?;
    }
    Ok(())
}

fn as_id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// Old records stored ids as numbers (millisecond timestamps); everything is
// compared as strings now.
fn stringify_field(obj: &mut Map<String, Value>, key: &str) -> bool {
    if let Some(Value::Number(n)) = obj.get(key) {
        let as_string = n.to_string();
        obj.insert(key.to_string(), Value::String(as_string));
        return true;
    }
    false
}

fn resolve_owner(obj: &Map<String, Value>) -> Option<String> {
    for field in &LEGACY_OWNER_FIELDS {
        if let Some(owner) = obj.get(*field).and_then(as_id_string) {
            return Some(owner);
        }
    }
    obj.get("merchant")
        .and_then(|m| m.get("id"))
        .and_then(as_id_string)
}

// Make `artisanId` the single, always-present ownership field.
fn ensure_owner(obj: &mut Map<String, Value>) -> bool {
    if matches!(obj.get("artisanId"), Some(Value::String(s)) if !s.is_empty()) {
        return false;
    }
    let owner = resolve_owner(obj).unwrap_or_else(|| UNKNOWN_ARTISAN.to_string());
    obj.insert("artisanId".to_string(), Value::String(owner));
    true
}

fn migrate_cart_item(obj: &mut Map<String, Value>) -> bool {
    let mut changed = ensure_owner(obj);

    // name || title
    if !matches!(obj.get("name"), Some(Value::String(_))) {
        if let Some(title) = obj.get("title").cloned() {
            obj.insert("name".to_string(), title);
            changed = true;
        }
    }

    // price ?? amount ?? 0
    if !matches!(obj.get("price"), Some(Value::Number(_))) {
        let price = match obj.get("amount") {
            Some(Value::Number(n)) => Value::Number(n.clone()),
            _ => Value::from(0),
        };
        obj.insert("price".to_string(), price);
        changed = true;
    }

    // quantity || 1
    let quantity = obj.get("quantity").and_then(Value::as_u64).unwrap_or(0);
    if quantity == 0 {
        obj.insert("quantity".to_string(), Value::from(1));
        changed = true;
    }

    // image || imageUrl || img || thumbnail || thumb
    if !matches!(obj.get("image"), Some(Value::String(_))) {
        let image = LEGACY_IMAGE_FIELDS
            .iter()
            .find_map(|f| obj.get(*f).and_then(Value::as_str).map(str::to_string))
            .unwrap_or_default();
        obj.insert("image".to_string(), Value::String(image));
        changed = true;
    }

    changed
}

fn migrate_order(obj: &mut Map<String, Value>) -> bool {
    let mut changed = stringify_field(obj, "id");

    if !matches!(obj.get("status"), Some(Value::String(_))) {
        obj.insert("status".to_string(), Value::String("placed".to_string()));
        changed = true;
    }

    let mut item_owner = None;
    if let Some(Value::Array(items)) = obj.get_mut("items") {
        for item in items {
            if let Some(item_obj) = item.as_object_mut() {
                changed |= migrate_cart_item(item_obj);
                if item_owner.is_none() {
                    item_owner = item_obj.get("artisanId").and_then(as_id_string);
                }
            }
        }
    }

    // An order missing its top-level owner inherits it from its items.
    if !matches!(obj.get("artisanId"), Some(Value::String(s)) if !s.is_empty()) {
        let owner = resolve_owner(obj)
            .or(item_owner)
            .unwrap_or_else(|| UNKNOWN_ARTISAN.to_string());
        obj.insert("artisanId".to_string(), Value::String(owner));
        changed = true;
    }

    changed
}

fn migrate_product(obj: &mut Map<String, Value>, status: &str) -> bool {
    let mut changed = stringify_field(obj, "id");
    changed |= ensure_owner(obj);
    if !matches!(obj.get("status"), Some(Value::String(_))) {
        obj.insert("status".to_string(), Value::String(status.to_string()));
        changed = true;
    }
    changed
}

fn migrate_feedback(obj: &mut Map<String, Value>) -> bool {
    let mut changed = stringify_field(obj, "id");
    changed |= stringify_field(obj, "productId");
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        orders::{Cart, OrderFinder},
        products::ProductFinder,
        test_utils::establish_store,
    };
    use rust_decimal::Decimal;

    #[test]
    fn cart_items_gain_an_owner() {
        let store = establish_store();
        store
            .write_raw(
                "cart",
                r#"[
                    {"name":"Rug","price":50,"quantity":2,"image":"r.jpg","addedBy":"weaver"},
                    {"title":"Bowl","amount":15,"image":"b.jpg","merchant":{"id":"potter"}},
                    {"name":"Vase","price":10,"quantity":1,"image":"v.jpg"}
                ]"#,
            )
            .unwrap();

        run_legacy_migrations(&store).unwrap();

        let items = Cart::items(&store).unwrap();
        assert_eq!(items[0].get_artisan_id(), "weaver");
        assert_eq!(items[1].get_artisan_id(), "potter");
        assert_eq!(items[1].get_name(), "Bowl");
        assert_eq!(items[1].get_price(), Decimal::from(15));
        assert_eq!(items[1].get_quantity(), 1);
        assert_eq!(items[2].get_artisan_id(), "unknown-artisan");
    }

    #[test]
    fn orders_inherit_ownership_from_items() {
        let store = establish_store();
        store
            .write_raw(
                "orders",
                r#"[{
                    "id": 1736941200000,
                    "customerId": null,
                    "date": "2025-01-15T10:20:00Z",
                    "items": [{"name":"Rug","price":50,"quantity":1,"image":"","seller":"weaver"}]
                }]"#,
            )
            .unwrap();

        run_legacy_migrations(&store).unwrap();

        let order = OrderFinder::new(&store).unwrap().first().unwrap();
        assert_eq!(order.get_id(), "1736941200000");
        assert_eq!(order.get_artisan_id(), "weaver");
        assert_eq!(order.get_status().to_string(), "placed");
        assert_eq!(order.get_items()[0].get_artisan_id(), "weaver");
    }

    #[test]
    fn products_get_string_ids_and_statuses() {
        let store = establish_store();
        store
            .write_raw(
                "adminProducts",
                r#"[{"id":1700000000001,"name":"Vase","price":10,"imageUrl":"x.jpg","description":"clay vase","owner":"potter"}]"#,
            )
            .unwrap();

        run_legacy_migrations(&store).unwrap();

        let vase = ProductFinder::published(&store)
            .unwrap()
            .id("1700000000001")
            .first()
            .unwrap();
        assert_eq!(vase.get_artisan_id(), "potter");
        assert_eq!(vase.get_price(), Decimal::from(10));
    }

    #[test]
    fn already_clean_slots_are_left_untouched() {
        let store = establish_store();
        let clean = r#"[{"name":"Rug","price":50,"quantity":2,"image":"r.jpg","artisanId":"weaver"}]"#;
        store.write_raw("cart", clean).unwrap();

        run_legacy_migrations(&store).unwrap();
        assert_eq!(store.read_raw("cart").unwrap().unwrap(), clean);
    }

    #[test]
    fn corrupt_and_missing_slots_are_ignored() {
        let store = establish_store();
        store.write_raw("orders", "not json at all").unwrap();
        run_legacy_migrations(&store).unwrap();
        assert_eq!(store.read_raw("orders").unwrap().unwrap(), "not json at all");
    }
}
