//! Problem records and problem creation documents.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::columns::Details;
use crate::error::{AdminError, Result};

/// Kind of predictive task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemType {
    Classification,
    Regression,
}

impl ProblemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classification => "classification",
            Self::Regression => "regression",
        }
    }
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProblemType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "classification" => Ok(Self::Classification),
            "regression" => Ok(Self::Regression),
            other => Err(format!("unknown problem type '{}'", other)),
        }
    }
}

/// Everything needed to register a problem.
///
/// This is also the shape of one YAML problem document. Unknown keys are
/// rejected; only `problem_type_details` may be omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewProblem {
    pub name: String,
    pub problem_type: ProblemType,
    #[serde(default)]
    pub problem_type_details: Details,
    /// Directory holding the training data files
    pub data_dir_train: String,
    /// Directory holding the testing data files, named as in `data_dir_train`
    pub data_dir_test: String,
    /// File paths relative to the data directories
    pub files: Vec<String>,
    /// Table name for each entry of `files`, position by position
    pub table_names: Vec<String>,
    pub entities_table_name: String,
    pub entities_featurized_table_name: String,
    /// Table holding the label column only
    pub target_table_name: String,
}

impl NewProblem {
    /// Check that `files` and `table_names` line up and that the entity,
    /// featurized-entity, and target tables are all among `table_names`.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AdminError::invalid_problem(&self.name, "name cannot be empty"));
        }

        if self.files.len() != self.table_names.len() {
            return Err(AdminError::invalid_problem(
                &self.name,
                format!(
                    "{} files but {} table_names; they must correspond one to one",
                    self.files.len(),
                    self.table_names.len()
                ),
            ));
        }

        let references = [
            ("entities_table_name", &self.entities_table_name),
            ("entities_featurized_table_name", &self.entities_featurized_table_name),
            ("target_table_name", &self.target_table_name),
        ];
        for (field, table) in references {
            if !self.table_names.contains(table) {
                return Err(AdminError::invalid_problem(
                    &self.name,
                    format!("{} '{}' is not listed in table_names", field, table),
                ));
            }
        }

        Ok(())
    }

    /// Parse exactly one problem document.
    pub fn from_yaml(path: &Path, text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| AdminError::document(path, e))
    }
}

/// Parse a `---` delimited stream of problem documents, in order.
///
/// Empty documents (a trailing `---`, say) are skipped. A document that fails
/// to parse yields an error in its own position without hiding the ones
/// before it. The iterator borrows the YAML parser, which is not `Send`.
pub fn problem_documents<'a>(
    path: &'a Path,
    text: &'a str,
) -> impl Iterator<Item = Result<NewProblem>> + 'a {
    serde_yaml::Deserializer::from_str(text)
        .enumerate()
        .filter_map(move |(index, document)| {
            let value = match serde_yaml::Value::deserialize(document) {
                Ok(value) => value,
                Err(e) => return Some(Err(AdminError::document(path, e))),
            };
            if value.is_null() {
                debug!(index, "skipping empty document");
                return None;
            }
            Some(serde_yaml::from_value(value).map_err(|e| AdminError::document(path, e)))
        })
}

/// A problem as stored, with its JSON-text columns decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Problem {
    pub id: i32,
    pub name: String,
    pub problem_type: ProblemType,
    pub problem_type_details: Details,
    pub data_dir_train: String,
    pub data_dir_test: String,
    pub files: Vec<String>,
    pub table_names: Vec<String>,
    pub entities_table_name: String,
    pub entities_featurized_table_name: String,
    pub target_table_name: String,
    pub created_at: DateTime<Utc>,
}

impl Problem {
    pub fn context(&self) -> ProblemContext {
        ProblemContext {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// The active problem: scopes feature queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemContext {
    pub id: i32,
    pub name: String,
}

/// Result of a problem creation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProblemOutcome {
    Created(ProblemContext),
    /// The name was taken; nothing was written
    AlreadyExists(ProblemContext),
}

impl ProblemOutcome {
    pub fn context(&self) -> &ProblemContext {
        match self {
            Self::Created(ctx) | Self::AlreadyExists(ctx) => ctx,
        }
    }

    pub fn into_context(self) -> ProblemContext {
        match self {
            Self::Created(ctx) | Self::AlreadyExists(ctx) => ctx,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P1: &str = r#"
name: p1
problem_type: classification
problem_type_details:
  classification_type: binary
data_dir_train: /data/p1/train
data_dir_test: /data/p1/test
files: [entities.csv, target.csv]
table_names: [entities, target]
entities_table_name: entities
entities_featurized_table_name: entities
target_table_name: target
"#;

    fn path() -> &'static Path {
        Path::new("problems.yml")
    }

    #[test]
    fn parses_single_document() {
        let problem = NewProblem::from_yaml(path(), P1).unwrap();
        assert_eq!(problem.name, "p1");
        assert_eq!(problem.problem_type, ProblemType::Classification);
        assert_eq!(problem.files, vec!["entities.csv", "target.csv"]);
        assert_eq!(problem.table_names, vec!["entities", "target"]);
        assert_eq!(
            problem.problem_type_details.get("classification_type"),
            Some(&serde_json::json!("binary"))
        );
        problem.validate().unwrap();
    }

    #[test]
    fn details_default_to_empty() {
        let text = P1.replace("problem_type_details:\n  classification_type: binary\n", "");
        let problem = NewProblem::from_yaml(path(), &text).unwrap();
        assert!(problem.problem_type_details.is_empty());
    }

    #[test]
    fn missing_key_is_a_document_error() {
        let text = P1.replace("target_table_name: target\n", "");
        let err = NewProblem::from_yaml(path(), &text).unwrap_err();
        assert!(matches!(err, AdminError::Document { .. }));
        assert!(err.to_string().contains("target_table_name"));
    }

    #[test]
    fn unknown_key_is_a_document_error() {
        let text = format!("{}colour: blue\n", P1);
        assert!(NewProblem::from_yaml(path(), &text).is_err());
    }

    #[test]
    fn unknown_problem_type_is_rejected() {
        let text = P1.replace("problem_type: classification", "problem_type: ranking");
        assert!(NewProblem::from_yaml(path(), &text).is_err());
        assert!("ranking".parse::<ProblemType>().is_err());
        assert_eq!("regression".parse::<ProblemType>(), Ok(ProblemType::Regression));
    }

    #[test]
    fn single_document_parser_rejects_streams() {
        let text = format!("{}---\n{}", P1, P1);
        assert!(NewProblem::from_yaml(path(), &text).is_err());
    }

    #[test]
    fn stream_yields_documents_in_order() {
        let second = P1.replace("name: p1", "name: p2");
        let text = format!("---\n{}---\n{}---\n", P1, second);

        let names: Vec<String> = problem_documents(path(), &text)
            .map(|doc| doc.unwrap().name)
            .collect();
        assert_eq!(names, vec!["p1", "p2"]);
    }

    #[test]
    fn stream_reports_bad_document_in_place() {
        let broken = P1.replace("name: p1", "nom: p2");
        let text = format!("{}---\n{}", P1, broken);

        let docs: Vec<Result<NewProblem>> = problem_documents(path(), &text).collect();
        assert_eq!(docs.len(), 2);
        assert!(docs[0].is_ok());
        assert!(matches!(docs[1], Err(AdminError::Document { .. })));
    }

    #[test]
    fn validate_rejects_misaligned_lists() {
        let mut problem = NewProblem::from_yaml(path(), P1).unwrap();
        problem.files.push("extra.csv".into());

        let err = problem.validate().unwrap_err();
        assert!(err.to_string().contains("3 files but 2 table_names"));
    }

    #[test]
    fn validate_rejects_unlisted_tables() {
        let mut problem = NewProblem::from_yaml(path(), P1).unwrap();
        problem.target_table_name = "labels".into();

        let err = problem.validate().unwrap_err();
        assert!(err.to_string().contains("target_table_name 'labels'"));
    }

    #[test]
    fn outcome_exposes_context() {
        let ctx = ProblemContext {
            id: 7,
            name: "p1".into(),
        };
        let outcome = ProblemOutcome::AlreadyExists(ctx.clone());
        assert!(!outcome.is_created());
        assert_eq!(outcome.context(), &ctx);
        assert_eq!(outcome.into_context(), ctx);
    }
}
