use schemabind::{
    CatalogError, Column, Constraint, DataType, Index, Registry, SchemaSynchronizer, TableBuilder,
    clone_with_schema, models, rebind_in_place,
};

fn test_table(name: &str) -> TableBuilder {
    TableBuilder::new(name)
        .column(Column::new("id", DataType::Uuid).primary_key())
        .column(Column::new("name", DataType::Text).not_null())
}

#[test]
fn test_clone_unqualified_registry() {
    let source = models::metadata().unwrap();

    let cloned = clone_with_schema(&source, "tenant_a").unwrap();

    assert_eq!(cloned.list_tables(), vec!["tenant_a.test"]);
    assert_eq!(source.list_tables(), vec!["test"]);
}

#[test]
fn test_rebind_already_bound_is_noop() {
    let mut registry = Registry::new();
    registry
        .define_table(test_table("test").schema("tenant_a"))
        .unwrap();
    let before = registry.clone();

    let report = rebind_in_place(&mut registry, "tenant_a").unwrap();

    assert!(report.is_noop());
    assert_eq!(registry.list_tables(), vec!["tenant_a.test"]);
    assert_eq!(
        registry.get_table("tenant_a.test").unwrap().schema(),
        Some("tenant_a")
    );
    assert_eq!(registry, before);
}

#[test]
fn test_setting_default_schema_is_not_retroactive() {
    let mut registry = models::metadata().unwrap();

    registry.set_default_schema(Some("new_schema")).unwrap();

    // The stale key is still there and the table kept its schema.
    assert_eq!(registry.list_tables(), vec!["test"]);
    assert_eq!(registry.get_table("test").unwrap().schema(), None);
    assert!(registry.get_table("new_schema.test").is_err());

    // Rebinding fixes both.
    rebind_in_place(&mut registry, "new_schema").unwrap();
    assert_eq!(registry.list_tables(), vec!["new_schema.test"]);
    registry.check_consistency().unwrap();
}

#[test]
fn test_rebind_twice_equals_once() {
    let mut once = models::metadata().unwrap();
    models::define_another(&mut once).unwrap();
    let mut twice = once.clone();

    rebind_in_place(&mut once, "tenant_a").unwrap();
    rebind_in_place(&mut twice, "tenant_a").unwrap();
    let second = rebind_in_place(&mut twice, "tenant_a").unwrap();

    assert!(second.is_noop());
    assert_eq!(second.unchanged, 2);
    assert_eq!(once, twice);
}

#[test]
fn test_rebind_to_another_tenant() {
    let mut registry = models::registry_with_schema("tenant_a").unwrap();

    let report = rebind_in_place(&mut registry, "tenant_b").unwrap();

    assert_eq!(
        report.moved,
        vec![("tenant_a.test".to_string(), "tenant_b.test".to_string())]
    );
    assert_eq!(registry.list_tables(), vec!["tenant_b.test"]);
    assert_eq!(registry.default_schema(), Some("tenant_b"));
}

#[test]
fn test_tables_defined_after_rebind_use_new_default() {
    let mut registry = models::metadata().unwrap();
    rebind_in_place(&mut registry, "tenant_a").unwrap();

    models::define_another(&mut registry).unwrap();

    assert_eq!(
        registry.list_tables(),
        vec!["tenant_a.another", "tenant_a.test"]
    );
}

#[test]
fn test_empty_schema_is_rejected_atomically() {
    let mut registry = models::metadata().unwrap();
    let before = registry.clone();

    assert_eq!(
        rebind_in_place(&mut registry, "").unwrap_err(),
        CatalogError::InvalidSchema(String::new())
    );
    assert!(matches!(
        clone_with_schema(&registry, ""),
        Err(CatalogError::InvalidSchema(_))
    ));
    assert_eq!(registry, before);
}

#[test]
fn test_clone_is_isolated_from_source() {
    let source = models::metadata().unwrap();
    let mut cloned = clone_with_schema(&source, "tenant_a").unwrap();

    let table = cloned.table_mut("tenant_a.test").unwrap();
    table
        .add_column(Column::new("created_at", DataType::Timestamp))
        .unwrap();
    table.add_index(Index::new(["name"])).unwrap();

    let original = source.get_table("test").unwrap();
    assert_eq!(original.columns().len(), 2);
    assert!(original.structure().indexes.is_empty());
    assert_eq!(cloned.get_table("tenant_a.test").unwrap().columns().len(), 3);

    // Rebinding the clone does not move the source either.
    rebind_in_place(&mut cloned, "tenant_b").unwrap();
    assert_eq!(source.list_tables(), vec!["test"]);
}

#[test]
fn test_clone_preserves_structure() {
    let mut source = Registry::new();
    source
        .define_table(
            test_table("membership")
                .column(Column::new("group_id", DataType::Uuid).not_null())
                .constraint(Constraint::ForeignKey {
                    columns: vec!["group_id".into()],
                    references: "group.id".into(),
                })
                .index(Index::new(["group_id", "name"]).unique()),
        )
        .unwrap();

    let cloned = clone_with_schema(&source, "tenant_a").unwrap();

    let original = source.get_table("membership").unwrap();
    let copy = cloned.get_table("tenant_a.membership").unwrap();
    assert_eq!(copy.structure(), original.structure());
    assert_eq!(copy.name(), original.name());
}

#[test]
fn test_collision_across_registries() {
    let mut first = Registry::with_default_schema("a").unwrap();
    first.define_table(test_table("x")).unwrap();
    let mut second = Registry::with_default_schema("b").unwrap();
    second.define_table(test_table("x")).unwrap();

    let sync = SchemaSynchronizer::new("t").unwrap();

    let err = sync.merge_with_schema([&first, &second]).unwrap_err();
    assert_eq!(err, CatalogError::DuplicateKey("t.x".into()));

    let mut destination = sync.clone_with_schema(&first).unwrap();
    let err = sync.clone_into(&second, &mut destination).unwrap_err();
    assert_eq!(err, CatalogError::DuplicateKey("t.x".into()));
    assert_eq!(destination.list_tables(), vec!["t.x"]);
}

#[test]
fn test_schema_labels_are_case_sensitive() {
    let mut registry = Registry::new();
    registry
        .define_table(test_table("test").schema("Tenant_A"))
        .unwrap();

    let report = rebind_in_place(&mut registry, "tenant_a").unwrap();

    assert_eq!(report.moved.len(), 1);
    assert_eq!(registry.list_tables(), vec!["tenant_a.test"]);
}

#[test]
fn test_multiple_tenants_coexist() {
    let shared = models::metadata().unwrap();

    let tenant_a = clone_with_schema(&shared, "tenant_a").unwrap();
    let tenant_b = clone_with_schema(&shared, "tenant_b").unwrap();

    assert_eq!(tenant_a.default_schema(), Some("tenant_a"));
    assert_eq!(tenant_b.default_schema(), Some("tenant_b"));
    assert_eq!(tenant_a.list_tables(), vec!["tenant_a.test"]);
    assert_eq!(tenant_b.list_tables(), vec!["tenant_b.test"]);
    assert_eq!(shared.default_schema(), None);
}
