//! Permission-filtered views on the host platform's site registry.
//!
//! Repositories expose only the sites and languages the current actor may
//! warm up: the `exclude` configuration flag and the permission guard are
//! applied to every lookup. Unresolvable lookups return `None`.

use indexmap::IndexMap;
use std::sync::Arc;

use crate::permission::{PermissionContext, PermissionGuard};
use crate::traits::registry::SiteRegistry;
use crate::types::site::{Site, SiteLanguage};

/// Sites visible to the current actor.
pub struct SiteRepository {
    registry: Arc<dyn SiteRegistry>,
    guard: Arc<PermissionGuard>,
}

impl SiteRepository {
    pub fn new(registry: Arc<dyn SiteRegistry>, guard: Arc<PermissionGuard>) -> Self {
        Self { registry, guard }
    }

    /// All warmable sites, keyed by identifier, in registry order.
    pub async fn find_all(&self, ctx: &PermissionContext) -> IndexMap<String, Site> {
        let mut sites = IndexMap::new();
        for site in self.registry.all_sites().await {
            if self.accessible(&site, ctx).await {
                sites.insert(site.identifier().to_owned(), site);
            }
        }
        sites
    }

    pub async fn find_one_by_identifier(
        &self,
        identifier: &str,
        ctx: &PermissionContext,
    ) -> Option<Site> {
        self.filter(self.registry.find_by_identifier(identifier).await, ctx)
            .await
    }

    pub async fn find_one_by_root_page_id(
        &self,
        root_page_id: u32,
        ctx: &PermissionContext,
    ) -> Option<Site> {
        self.filter(self.registry.find_by_root_page_id(root_page_id).await, ctx)
            .await
    }

    pub async fn find_one_by_page_id(&self, page_id: u32, ctx: &PermissionContext) -> Option<Site> {
        self.filter(self.registry.find_by_page_id(page_id).await, ctx)
            .await
    }

    async fn filter(&self, site: Option<Site>, ctx: &PermissionContext) -> Option<Site> {
        match site {
            Some(site) if self.accessible(&site, ctx).await => Some(site),
            _ => None,
        }
    }

    async fn accessible(&self, site: &Site, ctx: &PermissionContext) -> bool {
        if site.excluded() {
            tracing::debug!(site = site.identifier(), "site excluded from warmup");
            return false;
        }
        self.guard.can_warmup_site(site, ctx).await
    }
}

/// Languages of a site visible to the current actor.
pub struct SiteLanguageRepository {
    sites: Arc<SiteRepository>,
    guard: Arc<PermissionGuard>,
}

impl SiteLanguageRepository {
    pub fn new(sites: Arc<SiteRepository>, guard: Arc<PermissionGuard>) -> Self {
        Self { sites, guard }
    }

    /// All warmable languages of a site, keyed by language id, in site order.
    ///
    /// Empty when the site itself is not accessible to the actor.
    pub async fn find_all(
        &self,
        site: &Site,
        ctx: &PermissionContext,
    ) -> IndexMap<u32, SiteLanguage> {
        let mut languages = IndexMap::new();
        if self
            .sites
            .find_one_by_identifier(site.identifier(), ctx)
            .await
            .is_none()
        {
            return languages;
        }

        for language in site.languages() {
            if self.accessible(site, language, ctx).await {
                languages.insert(language.id(), language.clone());
            }
        }
        languages
    }

    pub async fn find_one_by_language_id(
        &self,
        site: &Site,
        language_id: u32,
        ctx: &PermissionContext,
    ) -> Option<SiteLanguage> {
        self.find_all(site, ctx).await.shift_remove(&language_id)
    }

    async fn accessible(
        &self,
        site: &Site,
        language: &SiteLanguage,
        ctx: &PermissionContext,
    ) -> bool {
        if !language.enabled() || language.excluded() {
            return false;
        }
        let scoped = ctx.clone().with_language(language.id());
        self.guard.can_warmup_site(site, &scoped).await
    }
}
