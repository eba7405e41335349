use crate::dashboard::{DashboardService, ResourceKind};
use crate::error::{Error, Result};
use crate::models::Repository;

impl DashboardService {
    /// Creates a repository, then refreshes the repository list. There is
    /// no optimistic update: the list only changes after the upstream
    /// confirms the new repository.
    pub async fn create_repository(
        &self,
        name: &str,
        description: &str,
        private: bool,
    ) -> Result<Repository> {
        if name.trim().is_empty() {
            return Err(Error::InvalidInput(
                "repository name must not be empty".to_string(),
            ));
        }
        if description.trim().is_empty() {
            return Err(Error::InvalidInput(
                "repository description must not be empty".to_string(),
            ));
        }

        let created = self.client.create_repo(name, description, private).await?;
        tracing::info!("Created repository: {}", created.name);

        self.refresh_repositories().await;
        Ok(created)
    }

    /// Deletes an owned repository. The credential must resolve to an
    /// identity and that identity must own the target, otherwise the
    /// upstream DELETE is never issued.
    pub async fn delete_repository(&self, name: &str) -> Result<()> {
        let viewer = self.client.get_viewer().await?;
        let repo = self.client.get_repo(self.ctx.login(), name).await?;

        if repo.owner.login != viewer.login {
            return Err(Error::Authorization(format!(
                "{} is not the owner of {}",
                viewer.login, repo.name
            )));
        }

        self.client.delete_repo(&repo.owner.login, &repo.name).await?;
        tracing::info!("Deleted repository: {}", name);

        self.refresh_repositories().await;
        Ok(())
    }

    /// Flips a repository between public and private. The PATCH response
    /// confirms the change, so the cached entry is updated in place and the
    /// list is not refetched.
    pub async fn set_repository_visibility(
        &self,
        name: &str,
        private: bool,
    ) -> Result<Repository> {
        let updated = self
            .client
            .set_visibility(self.ctx.login(), name, private)
            .await?;
        tracing::info!(
            "Repository {} is now {}",
            updated.name,
            if updated.private { "private" } else { "public" }
        );

        self.cache.repositories.update(|repos| {
            if let Some(entry) = repos.iter_mut().find(|r| r.name == name) {
                entry.private = updated.private;
            }
        });

        Ok(updated)
    }

    // The write already succeeded when the re-fetch runs, so a re-fetch
    // failure must not turn the mutation into an error; the slot keeps the
    // failure state for the next render.
    async fn refresh_repositories(&self) {
        if let Err(err) = self.refresh(ResourceKind::Repositories).await {
            tracing::warn!("Repository list refresh failed: {}", err);
        }
    }
}
