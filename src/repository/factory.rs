use crate::error::Result;
use crate::gradle::Repository as GradleRepository;
use crate::maven::MavenRepository;
use crate::repository::{CachedRepositoryClient, RepositoryClient};
use std::sync::Arc;

pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Client for regular dependencies, resolved against the project's repositories.
    pub fn create_maven(
        repositories: Vec<GradleRepository>,
        concurrency: usize,
    ) -> Result<Arc<dyn RepositoryClient>> {
        let client = MavenRepository::with_repositories(repositories)?;
        Ok(Arc::new(CachedRepositoryClient::new(
            Arc::new(client),
            concurrency,
        )))
    }

    /// Client for plugin markers and buildscript classpath entries: the Gradle
    /// Plugin Portal first, then the project's repositories.
    pub fn create_plugin_portal(
        repositories: Vec<GradleRepository>,
        concurrency: usize,
    ) -> Result<Arc<dyn RepositoryClient>> {
        let portal = GradleRepository::plugin_portal();
        let mut plugin_repositories: Vec<GradleRepository> = repositories
            .into_iter()
            .filter(|repo| repo.url != portal.url)
            .collect();
        plugin_repositories.insert(0, portal);
        let client = MavenRepository::with_repositories(plugin_repositories)?;
        Ok(Arc::new(CachedRepositoryClient::new(
            Arc::new(client),
            concurrency,
        )))
    }
}
