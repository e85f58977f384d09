use std::sync::Arc;

use pathguard_application::{
    FieldAccessService, PermissionSnapshotCache, RoleAdminService, RoleStore, SchemaCatalog,
};
use pathguard_core::{AppError, AppResult};
use pathguard_domain::{
    ModelAction, ModelDefinition, ModelFieldDefinition, ModelKey, PermissionType, RoleGrant,
};
use pathguard_infrastructure::{
    InMemoryPermissionSnapshotCache, InMemoryRoleStore, InMemorySchemaCatalog,
};
use tracing::info;

use crate::demo_config::DemoConfig;

const DEMO_NAMESPACE: &str = "library";
const CATALOG_READER_ROLE: &str = "catalog_reader";
const CONTACT_READER_ROLE: &str = "contact_reader";
const CATALOG_READER_SUBJECT: &str = "alice";
const CONTACT_READER_SUBJECT: &str = "bob";

pub async fn run(config: DemoConfig) -> AppResult<()> {
    let store = Arc::new(InMemoryRoleStore::new());
    let catalog: Arc<dyn SchemaCatalog> = Arc::new(library_catalog()?);
    let role_store: Arc<dyn RoleStore> = store.clone();
    let cache: Arc<dyn PermissionSnapshotCache> = Arc::new(InMemoryPermissionSnapshotCache::new());

    let access = FieldAccessService::new(config.engine, catalog, role_store, cache);
    let admin = RoleAdminService::new(store, access.snapshots().clone());

    seed_roles(&admin).await?;

    let book = model_key("book")?;
    for (subject, path) in [
        (CATALOG_READER_SUBJECT, "author__name"),
        (CATALOG_READER_SUBJECT, "author__publisher__name"),
        (CONTACT_READER_SUBJECT, "author__email"),
        (CONTACT_READER_SUBJECT, "author__salary"),
    ] {
        let allowed = access
            .check_nested_field_permissions(&book, path, subject, PermissionType::Read)
            .await?;
        info!(subject, root = %book, path, allowed, "checked nested read access");
    }

    let lookup = access.validate_filter_field(&book, "author__salary__gte")?;
    let allowed = access
        .check_nested_field_permissions(
            &book,
            lookup.path.as_str(),
            CONTACT_READER_SUBJECT,
            PermissionType::Read,
        )
        .await?;
    info!(
        subject = CONTACT_READER_SUBJECT,
        path = %lookup.path,
        lookup = ?lookup.lookup,
        allowed,
        "validated filter key"
    );

    match access.validate_filter_field(&book, "author__publisher__country__iexact") {
        Ok(_) => info!("unexpectedly accepted filter on an undeclared field"),
        Err(error) => info!(%error, "rejected filter key"),
    }

    for subject in [CATALOG_READER_SUBJECT, CONTACT_READER_SUBJECT] {
        let snapshot = access.permission_snapshot(subject, &book).await?;
        let rendered = serde_json::to_string(snapshot.as_ref()).map_err(|error| {
            AppError::Internal(format!("failed to render permission snapshot: {error}"))
        })?;
        info!(subject, snapshot = %rendered, "built permission snapshot");
    }

    admin
        .add_grant(RoleGrant::model(
            CATALOG_READER_ROLE,
            model_key("publisher")?,
            ModelAction::Read,
        )?)
        .await?;
    let allowed = access
        .check_nested_field_permissions(
            &book,
            "author__publisher__name",
            CATALOG_READER_SUBJECT,
            PermissionType::Read,
        )
        .await?;
    let snapshot = access
        .permission_snapshot(CATALOG_READER_SUBJECT, &book)
        .await?;
    info!(
        subject = CATALOG_READER_SUBJECT,
        allowed,
        snapshot_allows = snapshot.can_read("author__publisher__name"),
        "re-checked after granting publisher read"
    );

    Ok(())
}

async fn seed_roles(admin: &RoleAdminService) -> AppResult<()> {
    admin.create_role(CATALOG_READER_ROLE).await?;
    for model in ["book", "author"] {
        admin
            .add_grant(RoleGrant::model(
                CATALOG_READER_ROLE,
                model_key(model)?,
                ModelAction::Read,
            )?)
            .await?;
    }
    admin
        .assign_role(CATALOG_READER_SUBJECT, CATALOG_READER_ROLE)
        .await?;

    admin.create_role(CONTACT_READER_ROLE).await?;
    for model in ["book", "author"] {
        admin
            .add_grant(RoleGrant::model(
                CONTACT_READER_ROLE,
                model_key(model)?,
                ModelAction::Read,
            )?)
            .await?;
    }
    for field in ["name", "email"] {
        admin
            .add_grant(RoleGrant::field(
                CONTACT_READER_ROLE,
                model_key("author")?,
                field,
                PermissionType::Read,
            )?)
            .await?;
    }
    admin
        .assign_role(CONTACT_READER_SUBJECT, CONTACT_READER_ROLE)
        .await?;

    Ok(())
}

fn model_key(model_name: &str) -> AppResult<ModelKey> {
    ModelKey::new(DEMO_NAMESPACE, model_name)
}

fn library_catalog() -> AppResult<InMemorySchemaCatalog> {
    let book = ModelDefinition::new(
        model_key("book")?,
        vec![
            ModelFieldDefinition::scalar("title")?,
            ModelFieldDefinition::scalar("isbn")?,
            ModelFieldDefinition::relation("author", model_key("author")?)?,
        ],
    )?;
    let author = ModelDefinition::new(
        model_key("author")?,
        vec![
            ModelFieldDefinition::scalar("name")?,
            ModelFieldDefinition::scalar("email")?,
            ModelFieldDefinition::scalar("salary")?,
            ModelFieldDefinition::relation("publisher", model_key("publisher")?)?,
        ],
    )?;
    let publisher = ModelDefinition::new(
        model_key("publisher")?,
        vec![
            ModelFieldDefinition::scalar("name")?,
            ModelFieldDefinition::scalar("revenue")?,
        ],
    )?;

    InMemorySchemaCatalog::new(vec![book, author, publisher])
}
