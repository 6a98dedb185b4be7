//! Admin interface for the featurehub store.
//!
//! Registers problems and reports features. The active problem is a
//! [`ProblemContext`] value: returned by [`Admin::resolve_problem`] and
//! [`Admin::create_problem`], passed into [`Admin::get_features`].

use std::path::Path;

use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::db::{schema, FeatureRepo, ProblemRepo, Store};
use crate::error::{AdminError, Result};
use crate::models::{
    problem_documents, FeatureReport, NewProblem, Problem, ProblemContext, ProblemOutcome,
};

pub struct Admin {
    store: Store,
}

impl Admin {
    /// Connect to an existing featurehub database.
    ///
    /// Fails with [`AdminError::DatabaseMissing`] when the database has not
    /// been created; run schema initialization first.
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        if !schema::database_exists(config).await? {
            warn!("database {} does not seem to exist", config.name);
            return Err(AdminError::DatabaseMissing {
                name: config.name.clone(),
            });
        }

        Ok(Self {
            store: Store::connect(config).await?,
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Look up a problem by name.
    ///
    /// A missing problem is not an error: it is logged with a hint and
    /// `None` is returned.
    pub async fn resolve_problem(&self, name: &str) -> Result<Option<ProblemContext>> {
        let lookup = name.to_owned();
        let found = self
            .store
            .session_scope(move |conn| {
                Box::pin(async move { ProblemRepo::new(conn).find_context(&lookup).await })
            })
            .await?;

        if found.is_none() {
            warn!("Problem {} does not exist!", name);
            warn!("You might want to create it with `featurehub create-problem`");
        }
        Ok(found)
    }

    /// Create a problem unless one with the same name exists.
    ///
    /// Lookup and insert share one transaction. An existing problem is left
    /// untouched and its context is returned as [`ProblemOutcome::AlreadyExists`],
    /// whatever the rest of `problem` says. Validation applies only when a new
    /// row would be written.
    pub async fn create_problem(&self, problem: &NewProblem) -> Result<ProblemOutcome> {
        let problem = problem.clone();
        let outcome = self
            .store
            .session_scope(move |conn| {
                Box::pin(async move {
                    let mut repo = ProblemRepo::new(conn);
                    if let Some(existing) = repo.find_context(&problem.name).await? {
                        return Ok(ProblemOutcome::AlreadyExists(existing));
                    }

                    problem.validate()?;
                    match repo.insert(&problem).await? {
                        Some(created) => Ok(ProblemOutcome::Created(created)),
                        // a concurrent creator committed first
                        None => {
                            let existing = repo
                                .find_context(&problem.name)
                                .await?
                                .ok_or(sqlx::Error::RowNotFound)?;
                            Ok(ProblemOutcome::AlreadyExists(existing))
                        }
                    }
                })
            })
            .await?;

        match &outcome {
            ProblemOutcome::Created(ctx) => {
                info!(id = ctx.id, "Problem {} successfully created", ctx.name)
            }
            ProblemOutcome::AlreadyExists(ctx) => {
                info!(id = ctx.id, "Problem {} already exists", ctx.name)
            }
        }
        Ok(outcome)
    }

    /// Create a problem from a file holding exactly one YAML document.
    pub async fn create_problem_yml(&self, path: impl AsRef<Path>) -> Result<ProblemOutcome> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await?;
        let problem = NewProblem::from_yaml(path, &text)?;
        self.create_problem(&problem).await
    }

    /// Create one problem per document of a `---` delimited YAML stream.
    ///
    /// Documents are handled in order, each in its own transaction. The
    /// first failing document stops the run; problems created before it
    /// stay committed.
    pub async fn bulk_create_problem_yml(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Vec<ProblemOutcome>> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await?;
        // The YAML parser is not Send, so it must not live across an await.
        // Parse results keep their position; nothing after the first error
        // is acted on.
        let documents: Vec<Result<NewProblem>> = problem_documents(path, &text).collect();

        let mut outcomes = Vec::with_capacity(documents.len());
        for document in documents {
            let problem = document?;
            outcomes.push(self.create_problem(&problem).await?);
        }

        let created = outcomes.iter().filter(|o| o.is_created()).count();
        info!(
            documents = outcomes.len(),
            created,
            "processed {}",
            path.display()
        );
        Ok(outcomes)
    }

    /// Names of all problems, oldest first.
    pub async fn get_problems(&self) -> Result<Vec<String>> {
        self.store
            .session_scope(|conn| Box::pin(async move { ProblemRepo::new(conn).list_names().await }))
            .await
    }

    pub async fn get_problem(&self, name: &str) -> Result<Option<Problem>> {
        let lookup = name.to_owned();
        self.store
            .session_scope(move |conn| {
                Box::pin(async move { ProblemRepo::new(conn).find_by_name(&lookup).await })
            })
            .await
    }

    /// Report the features of a problem, one row per feature with one
    /// column per metric name.
    ///
    /// Returns `None` when no feature matches, which is distinct from a
    /// report with rows.
    pub async fn get_features(
        &self,
        problem: &ProblemContext,
        user_name: Option<&str>,
    ) -> Result<Option<FeatureReport>> {
        let problem_id = problem.id;
        let user = user_name.map(str::to_owned);

        let report = self
            .store
            .session_scope(move |conn| {
                Box::pin(async move {
                    let mut repo = FeatureRepo::new(conn);
                    let features = repo.list_for_problem(problem_id, user.as_deref()).await?;
                    let ids: Vec<i32> = features.iter().map(|f| f.id).collect();
                    let metrics = repo.metrics_for(&ids).await?;
                    Ok(FeatureReport::pivot(features, metrics))
                })
            })
            .await?;

        if report.is_none() {
            info!(problem = %problem.name, "No features found");
        }
        Ok(report)
    }
}
