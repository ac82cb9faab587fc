use super::*;
use crate::test_utils::{artisan_session, consultant_session, establish_store};

fn vase() -> IncompleteProduct {
    IncompleteProduct::new("Vase", Decimal::from(10), "x.jpg", "clay vase").unwrap()
}

#[test]
fn submission_requires_every_field() {
    assert!(matches!(
        IncompleteProduct::new("", Decimal::from(10), "x.jpg", "clay vase"),
        Err(CraftoraDbError::MissingField("name"))
    ));
    assert!(matches!(
        IncompleteProduct::new("Vase", Decimal::from(10), " ", "clay vase"),
        Err(CraftoraDbError::MissingField("imageUrl"))
    ));
    assert!(matches!(
        IncompleteProduct::new("Vase", Decimal::from(10), "x.jpg", ""),
        Err(CraftoraDbError::MissingField("description"))
    ));
}

#[test]
fn submit_lands_in_the_pending_queue() {
    let store = establish_store();
    let artisan = artisan_session("potter");

    let id = Products::submit(&store, &artisan, vase()).unwrap();

    let pending = ProductFinder::pending(&store).unwrap().search();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].get_id(), id);
    assert_eq!(pending[0].get_status(), &ProductStatus::Pending);
    assert_eq!(pending[0].get_artisan_id(), "potter");
    assert!(ProductFinder::published(&store).unwrap().search().is_empty());

    // customers are not allowed to submit
    let customer = Session {
        id: "c-1".to_string(),
        username: "asha".to_string(),
        role: Role::Customer,
    };
    assert!(matches!(
        Products::submit(&store, &customer, vase()),
        Err(CraftoraDbError::PermissionDenied)
    ));
}

#[test]
fn approve_publishes_exactly_once() {
    let store = establish_store();
    let artisan = artisan_session("potter");
    let id = Products::submit(&store, &artisan, vase()).unwrap();

    Products::approve(&store, &consultant_session(), &id).unwrap();

    assert!(ProductFinder::pending(&store).unwrap().search().is_empty());
    let published = ProductFinder::published(&store).unwrap().search();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].get_id(), id);
    assert_eq!(published[0].get_status(), &ProductStatus::Approved);
    // every other field survives the move
    assert_eq!(published[0].get_name(), "Vase");
    assert_eq!(published[0].get_price(), Decimal::from(10));
    assert_eq!(published[0].get_image_url(), "x.jpg");
    assert_eq!(published[0].get_description(), "clay vase");
    assert_eq!(published[0].get_artisan_id(), "potter");

    // the entry left the queue, so approving again misses
    assert!(matches!(
        Products::approve(&store, &consultant_session(), &id),
        Err(CraftoraDbError::ProductNotFound)
    ));
    assert_eq!(ProductFinder::published(&store).unwrap().search().len(), 1);
}

#[test]
fn reject_goes_to_the_audit_log() {
    let store = establish_store();
    let artisan = artisan_session("potter");
    let id = Products::submit(&store, &artisan, vase()).unwrap();

    Products::reject(&store, &consultant_session(), &id, "blurry photo").unwrap();

    assert!(ProductFinder::pending(&store).unwrap().search().is_empty());
    assert!(ProductFinder::published(&store).unwrap().search().is_empty());
    let rejected = Products::rejected(&store).unwrap();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].get_product().get_id(), id);
    assert_eq!(rejected[0].get_reason(), "blurry photo");
}

#[test]
fn review_is_consultant_only() {
    let store = establish_store();
    let artisan = artisan_session("potter");
    let id = Products::submit(&store, &artisan, vase()).unwrap();

    assert!(matches!(
        Products::approve(&store, &artisan, &id),
        Err(CraftoraDbError::PermissionDenied)
    ));
    assert!(matches!(
        Products::reject(&store, &artisan, &id, ""),
        Err(CraftoraDbError::PermissionDenied)
    ));
    assert_eq!(ProductFinder::pending(&store).unwrap().search().len(), 1);
}

#[test]
fn edits_land_in_the_slot_the_product_lives_in() {
    let store = establish_store();
    let artisan = artisan_session("potter");
    let pending_id = Products::submit(&store, &artisan, vase()).unwrap();
    let approved_id = Products::submit(
        &store,
        &artisan,
        IncompleteProduct::new("Bowl", Decimal::from(15), "b.jpg", "glazed bowl").unwrap(),
    )
    .unwrap();
    Products::approve(&store, &consultant_session(), &approved_id).unwrap();

    let update = UpdateProduct {
        price: Some(Decimal::from(12)),
        ..UpdateProduct::default()
    };
    Products::update(&store, &artisan, &pending_id, update.clone()).unwrap();
    Products::update(&store, &artisan, &approved_id, update).unwrap();

    // neither product moved queues
    let pending = ProductFinder::pending(&store).unwrap().id(&pending_id).first().unwrap();
    assert_eq!(pending.get_price(), Decimal::from(12));
    assert_eq!(pending.get_status(), &ProductStatus::Pending);
    let approved = ProductFinder::published(&store)
        .unwrap()
        .id(&approved_id)
        .first()
        .unwrap();
    assert_eq!(approved.get_price(), Decimal::from(12));
    assert_eq!(approved.get_status(), &ProductStatus::Approved);
    // untouched fields stay put
    assert_eq!(approved.get_name(), "Bowl");
}

#[test]
fn only_the_owner_edits_or_deletes() {
    let store = establish_store();
    let artisan = artisan_session("potter");
    let id = Products::submit(&store, &artisan, vase()).unwrap();

    let other = artisan_session("weaver");
    assert!(matches!(
        Products::update(&store, &other, &id, UpdateProduct::default()),
        Err(CraftoraDbError::PermissionDenied)
    ));
    assert!(matches!(
        Products::delete(&store, &other, &id),
        Err(CraftoraDbError::PermissionDenied)
    ));

    Products::delete(&store, &artisan, &id).unwrap();
    assert!(ProductFinder::pending(&store).unwrap().search().is_empty());
}

#[test]
fn delete_follows_the_status() {
    let store = establish_store();
    let artisan = artisan_session("potter");
    let id = Products::submit(&store, &artisan, vase()).unwrap();
    Products::approve(&store, &consultant_session(), &id).unwrap();

    Products::delete(&store, &artisan, &id).unwrap();
    assert!(ProductFinder::published(&store).unwrap().search().is_empty());

    assert!(matches!(
        Products::delete(&store, &artisan, &id),
        Err(CraftoraDbError::ProductNotFound)
    ));
}

#[test]
fn search_by_name_or_id() {
    let store = establish_store();
    let artisan = artisan_session("potter");
    let vase_id = Products::submit(&store, &artisan, vase()).unwrap();
    let bowl_id = Products::submit(
        &store,
        &artisan,
        IncompleteProduct::new("Serving Bowl", Decimal::from(15), "b.jpg", "glazed").unwrap(),
    )
    .unwrap();
    Products::approve(&store, &consultant_session(), &vase_id).unwrap();
    Products::approve(&store, &consultant_session(), &bowl_id).unwrap();

    let hits = ProductFinder::published(&store)
        .unwrap()
        .name_or_id_contains("bowl")
        .search();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].get_name(), "Serving Bowl");

    let hits = ProductFinder::published(&store)
        .unwrap()
        .name_or_id_contains(&vase_id[..8])
        .search();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].get_id(), vase_id);

    assert_eq!(
        ProductFinder::published(&store)
            .unwrap()
            .artisan("potter")
            .search()
            .len(),
        2
    );
}
