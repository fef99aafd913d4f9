use thiserror::Error;

/// Error reported by an external collaborator such as a [`PlotSink`](crate::PlotSink) or a
/// [`ResultStore`](crate::ResultStore).
pub type ExportError = Box<dyn std::error::Error + Send + Sync>;

fn aborted_message(unit: &str, hooks: &[String]) -> String {
    match hooks {
        [hook] => format!("Evaluation of {unit} was aborted by hook {hook}"),
        hooks => format!("Evaluation of {unit} was aborted by hooks {}", hooks.join(", ")),
    }
}

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("At least one metric provider must be registered before running an evaluation")]
    NoProviders,

    #[error("A metric provider of kind {kind} with identifier {identifier} is already registered")]
    DuplicateProvider { kind: &'static str, identifier: String },

    #[error("{}", aborted_message(.unit, .hooks))]
    Aborted { unit: String, hooks: Vec<String> },

    #[error("Post-evaluation step {step} failed")]
    Export {
        step: &'static str,
        #[source]
        source: ExportError,
    },

    #[error("Could not start the progress reporter")]
    Progress(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::EvaluationError;

    #[test]
    fn aborted_phrasing() {
        let single = EvaluationError::Aborted {
            unit: "segment s1".into(),
            hooks: vec!["too short".into()],
        };

        let multiple = EvaluationError::Aborted {
            unit: "segment s1".into(),
            hooks: vec!["too short".into(), "no ego".into()],
        };

        assert_eq!(single.to_string(), "Evaluation of segment s1 was aborted by hook too short");
        assert_eq!(multiple.to_string(), "Evaluation of segment s1 was aborted by hooks too short, no ego");
    }
}
