use std::collections::HashMap;
use std::sync::Arc;

use crate::aggregate::{fetch_all, DEFAULT_PAGE_SIZE};
use crate::client::ApiClient;
use crate::error::{AppError, AppResult};
use crate::model::{Material, Site};

/// Read-only lookup tables shared across screens (material and site names for
/// cross-referencing foreign keys). Cheap to clone, scoped to the session of
/// the caller that loaded it; screens receive it as an explicit dependency.
#[derive(Clone, Default)]
pub struct Catalog {
    materials: Arc<HashMap<String, Material>>,
    sites: Arc<HashMap<String, Site>>,
}

impl Catalog {
    pub fn new(materials: Vec<Material>, sites: Vec<Site>) -> Self {
        Catalog {
            materials: Arc::new(materials.into_iter().map(|m| (m.id.clone(), m)).collect()),
            sites: Arc::new(sites.into_iter().map(|s| (s.id.clone(), s)).collect()),
        }
    }

    /// Assemble the catalog from the backend's full material and site
    /// listings. Partial listings are taken as-is; a lookup miss later just
    /// falls back to the raw id.
    pub async fn load(client: &ApiClient) -> AppResult<Self> {
        let materials = fetch_all::<Material>(client, &Material::RESOURCE, DEFAULT_PAGE_SIZE, &[])
            .await
            .map_err(|err| AppError::from(err).with_context("resource", "materials"))?;
        let sites = fetch_all::<Site>(client, &Site::RESOURCE, DEFAULT_PAGE_SIZE, &[])
            .await
            .map_err(|err| AppError::from(err).with_context("resource", "sites"))?;

        if !materials.complete || !sites.complete {
            tracing::warn!(
                target: "sitedesk",
                materials_complete = materials.complete,
                sites_complete = sites.complete,
                "catalog loaded from partial listings"
            );
        }

        Ok(Catalog::new(materials.items, sites.items))
    }

    pub fn material(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn site(&self, id: &str) -> Option<&Site> {
        self.sites.get(id)
    }

    /// Display name for a material id, falling back to the id itself.
    pub fn material_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.materials.get(id).map(|m| m.name.as_str()).unwrap_or(id)
    }

    /// Display name for a site id, falling back to the id itself.
    pub fn site_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.sites.get(id).map(|s| s.name.as_str()).unwrap_or(id)
    }

    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    pub fn sites(&self) -> impl Iterator<Item = &Site> {
        self.sites.values()
    }
}
