use std::collections::HashMap;

use schemabind::migration::{BIND_STRATEGY_ENV, DATABASE_URL_ENV, TARGET_SCHEMA_ENV};
use schemabind::{
    BindStrategy, CatalogError, MigrationConfig, MigrationEnvironment, Registry, RunMode, models,
};

fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn test_default_environment_clones_into_tenant_a() {
    let config = MigrationConfig::from_lookup(env(&[])).unwrap();
    let mut source = models::metadata().unwrap();

    let context = MigrationEnvironment::new(config)
        .configure(&mut source)
        .unwrap();

    assert_eq!(
        context.target_metadata().list_tables(),
        vec!["tenant_a.test"]
    );
    assert_eq!(context.version_table_schema(), "tenant_a");
    assert_eq!(source.list_tables(), vec!["test"]);
}

#[test]
fn test_environment_variables_drive_binding() {
    let config = MigrationConfig::from_lookup(env(&[
        (TARGET_SCHEMA_ENV, "tenant_x"),
        (BIND_STRATEGY_ENV, "rebind"),
        (DATABASE_URL_ENV, "postgres://app@localhost/app"),
    ]))
    .unwrap()
    .mode(RunMode::Online);
    let mut source = models::metadata().unwrap();

    let context = MigrationEnvironment::new(config)
        .configure(&mut source)
        .unwrap();

    assert_eq!(source.list_tables(), vec!["tenant_x.test"]);
    assert_eq!(context.url(), Some("postgres://app@localhost/app"));
    assert!(!context.is_offline());
    assert_eq!(context.version_table_key(), "tenant_x.alembic_version");
}

#[test]
fn test_two_tenants_from_one_shared_registry() {
    let mut shared = models::metadata().unwrap();
    models::define_another(&mut shared).unwrap();

    let a = MigrationEnvironment::new(MigrationConfig::new("tenant_a").unwrap())
        .configure(&mut shared)
        .unwrap();
    let b = MigrationEnvironment::new(MigrationConfig::new("tenant_b").unwrap())
        .configure(&mut shared)
        .unwrap();

    assert_eq!(
        a.target_metadata().list_tables(),
        vec!["tenant_a.another", "tenant_a.test"]
    );
    assert_eq!(
        b.target_metadata().list_tables(),
        vec!["tenant_b.another", "tenant_b.test"]
    );
    assert_eq!(shared.list_tables(), vec!["another", "test"]);
}

#[test]
fn test_invalid_configuration() {
    assert!(matches!(
        MigrationConfig::from_lookup(env(&[(TARGET_SCHEMA_ENV, "   ")])),
        Err(CatalogError::InvalidSchema(_))
    ));
    assert!(matches!(
        MigrationConfig::from_lookup(env(&[(BIND_STRATEGY_ENV, "mirror")])),
        Err(CatalogError::Config(_))
    ));

    let config = MigrationConfig::new("tenant_a").unwrap().version_table(" ");
    let err = MigrationEnvironment::new(config)
        .configure(&mut Registry::new())
        .unwrap_err();
    assert!(matches!(err, CatalogError::Config(_)));
}

#[test]
fn test_rebind_collision_surfaces_duplicate_key() {
    let mut source = models::metadata().unwrap();
    source
        .define_table(models::test_table().schema("legacy"))
        .unwrap();
    let before = source.clone();

    let config = MigrationConfig::new("tenant_a")
        .unwrap()
        .strategy(BindStrategy::Rebind);
    let err = MigrationEnvironment::new(config)
        .configure(&mut source)
        .unwrap_err();

    assert_eq!(err, CatalogError::DuplicateKey("tenant_a.test".into()));
    assert_eq!(source, before);
}

#[test]
fn test_offline_script() {
    let mut shared = models::metadata().unwrap();
    let config = MigrationConfig::new("tenant_a")
        .unwrap()
        .version_table_schema("public")
        .unwrap();

    let script = MigrationEnvironment::new(config)
        .configure(&mut shared)
        .unwrap()
        .render_offline_script();

    let expected = "\
CREATE SCHEMA IF NOT EXISTS \"public\";

CREATE SCHEMA IF NOT EXISTS \"tenant_a\";

CREATE TABLE IF NOT EXISTS \"public\".\"alembic_version\" (
    \"version_num\" VARCHAR(32) NOT NULL,
    CONSTRAINT \"alembic_version_pkc\" PRIMARY KEY (\"version_num\")
);

CREATE TABLE \"tenant_a\".\"test\" (
    \"id\" UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    \"name\" TEXT NOT NULL
);
";
    assert_eq!(script, expected);
}
