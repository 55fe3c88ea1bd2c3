//! End-to-end resolution scenarios: invalid stores, store swaps, subtype
//! fallback, and handles used as real stores.

use datastore::{
    DataObject, DataStore, DataStoreExt, DataStoreHandle, DatabaseConfig, LocatorConfig,
    LocatorError, StoreImpl, StoreMapping,
};
use datastore_testkit::{TestFixture, DUMMY_CUSTOM_TABLE_STORE, DUMMY_OBJECT_STORE};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .with_test_writer()
        .try_init();
}

#[test]
fn invalid_store_raises_fixed_message() {
    let fixture = TestFixture::new();

    match DataStoreHandle::new(&fixture.locator, "bogus") {
        Err(err @ LocatorError::InvalidStore { .. }) => {
            assert_eq!(err.to_string(), "Invalid data store.");
        }
        other => panic!("invalid data store error not raised: {other:?}"),
    }
}

#[test]
fn invalid_store_load_returns_none() {
    let fixture = TestFixture::new();
    assert!(DataStoreHandle::load(&fixture.locator, "product-test")
        .unwrap()
        .is_none());
}

#[test]
fn store_swap() {
    init_tracing();
    let fixture = TestFixture::new();
    fixture.load_dummy_store();

    let store = DataStoreHandle::new(&fixture.locator, "dummy").unwrap();
    assert_eq!(store.current_class_name(), DUMMY_OBJECT_STORE);

    fixture.swap_dummy_store();
    let swapped = DataStoreHandle::new(&fixture.locator, "dummy").unwrap();
    assert_eq!(swapped.current_class_name(), DUMMY_CUSTOM_TABLE_STORE);

    // Swapping back by registering a later override.
    fixture.restore_dummy_store();
    let restored = DataStoreHandle::new(&fixture.locator, "dummy").unwrap();
    assert_eq!(restored.current_class_name(), DUMMY_OBJECT_STORE);

    // Earlier handles keep what they were resolved to.
    assert_eq!(store.current_class_name(), DUMMY_OBJECT_STORE);
    assert_eq!(swapped.current_class_name(), DUMMY_CUSTOM_TABLE_STORE);
}

#[test]
fn store_swap_by_clearing_override() {
    let fixture = TestFixture::new();
    fixture.load_dummy_store();
    fixture.swap_dummy_store();
    assert_eq!(
        fixture.locator.get("dummy").unwrap().current_class_name(),
        DUMMY_CUSTOM_TABLE_STORE
    );

    fixture.hooks.clear("dummy_data_store");
    assert_eq!(
        fixture.locator.get("dummy").unwrap().current_class_name(),
        DUMMY_OBJECT_STORE
    );
}

#[test]
fn store_sub_type_falls_back_to_base() {
    let fixture = TestFixture::new();
    fixture.load_dummy_store();

    let store = DataStoreHandle::load(&fixture.locator, "dummy_sub")
        .unwrap()
        .unwrap();
    assert_eq!(store.current_class_name(), DUMMY_OBJECT_STORE);
    assert_eq!(store.object_type(), "dummy");

    assert!(DataStoreHandle::load(&fixture.locator, "other_sub")
        .unwrap()
        .is_none());
    assert!(matches!(
        DataStoreHandle::new(&fixture.locator, "other_sub").unwrap_err(),
        LocatorError::InvalidStore { .. }
    ));
}

#[test]
fn registered_subtype_wins_over_fallback() {
    let fixture = TestFixture::new();
    fixture.load_dummy_store();
    fixture.register_store("dummy_sub", StoreImpl::memory());

    assert_eq!(
        fixture.class_of("dummy_sub").as_deref(),
        Some(StoreImpl::MEMORY)
    );
    assert_eq!(
        fixture.class_of("dummy_other").as_deref(),
        Some(DUMMY_OBJECT_STORE)
    );
}

#[test]
fn last_mapping_registration_wins() {
    let fixture = TestFixture::new();
    fixture.register_store("dummy", StoreImpl::memory());
    fixture.load_dummy_store();

    assert_eq!(fixture.class_of("dummy").as_deref(), Some(DUMMY_OBJECT_STORE));
}

#[test]
fn override_can_depend_on_default() {
    let fixture = TestFixture::new();
    fixture.hooks.register("product_data_store", |current: StoreImpl| {
        if current.name() == StoreImpl::OBJECT_TABLE {
            StoreImpl::memory()
        } else {
            current
        }
    });

    assert_eq!(fixture.class_of("product").as_deref(), Some(StoreImpl::MEMORY));
    assert_eq!(
        fixture.class_of("customer").as_deref(),
        Some(StoreImpl::CUSTOM_TABLE)
    );
}

#[test]
fn mapping_hook_sees_builtins() {
    let fixture = TestFixture::new();
    fixture.hooks.register("data_stores", |stores: StoreMapping| {
        assert!(stores.contains_key("product"));
        assert!(stores.contains_key("order-item"));
        stores
    });

    assert_eq!(fixture.locator.mapping().len(), 10);
}

#[test]
fn cached_mapping_tracks_hook_changes() {
    let fixture = TestFixture::with_config(LocatorConfig {
        cache_mapping: true,
        ..LocatorConfig::default()
    });
    assert!(fixture.class_of("dummy").is_none());

    fixture.load_dummy_store();
    assert_eq!(fixture.class_of("dummy").as_deref(), Some(DUMMY_OBJECT_STORE));

    fixture.hooks.clear("data_stores");
    assert!(fixture.class_of("dummy").is_none());
}

#[tokio::test]
async fn swapped_handles_use_separate_backends() -> anyhow::Result<()> {
    let fixture = TestFixture::new();
    fixture.load_dummy_store();

    let original = fixture.locator.get("dummy")?;
    let mut obj = DataObject::new("dummy").with_prop("name", "kept");
    original.save(&mut obj).await?;

    fixture.swap_dummy_store();
    let swapped = fixture.locator.get("dummy")?;

    assert!(swapped.read(1).await?.is_none());
    assert_eq!(original.read(1).await?, Some(obj));
    Ok(())
}

#[tokio::test]
async fn builtin_handles_share_default_database() -> anyhow::Result<()> {
    let fixture = TestFixture::new();

    let mut product = DataObject::new("product").with_prop("sku", "W-1");
    fixture.locator.get("product")?.save(&mut product).await?;
    let mut order = DataObject::new("order").with_prop("total", 30);
    fixture.locator.get("order")?.save(&mut order).await?;

    assert_eq!(fixture.locator.get("product")?.read(1).await?, Some(product));
    assert_eq!(fixture.locator.get("order")?.read(2).await?, Some(order));
    assert!(fixture.locator.get("order")?.read(1).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn builtin_stores_round_trip_through_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let fixture = TestFixture::with_config(LocatorConfig {
        database: DatabaseConfig::Path(dir.path().join("shop.db")),
        ..LocatorConfig::default()
    });

    let items = fixture.locator.get("order-item")?;
    let mut line = DataObject::new("order-item")
        .with_prop("order_id", 1)
        .with_prop("qty", 2);
    items.save(&mut line).await?;
    items.update_meta(1, "_reduced_stock", "2").await?;

    let variations = fixture.locator.get("product-variation")?;
    let mut variation = DataObject::new("product-variation").with_prop("sku", "W-1-RED");
    variations.save(&mut variation).await?;

    let again = fixture.locator.get("order-item")?;
    assert_eq!(again.read(1).await?, Some(line));
    assert_eq!(again.read_meta(1).await?["_reduced_stock"], "2");

    let variation_read = fixture.locator.get("product-variation")?.read(1).await?;
    assert_eq!(variation_read, Some(variation));
    Ok(())
}

#[test]
fn snapshot_survives_serialization() -> anyhow::Result<()> {
    let fixture = TestFixture::new();
    fixture.load_dummy_store();

    let handle = fixture.locator.get("dummy_sub")?;
    let json = serde_json::to_string(&handle.snapshot())?;

    fixture.swap_dummy_store();
    let restored = fixture.locator.restore(&serde_json::from_str(&json)?)?;

    assert_eq!(restored.requested_name(), "dummy_sub");
    assert_eq!(restored.current_class_name(), DUMMY_CUSTOM_TABLE_STORE);
    Ok(())
}
