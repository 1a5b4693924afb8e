use crate::record::Record;

/// The classified result of one end-to-end request.
///
/// Exactly one outcome is produced per delivered request and consumed once by
/// the delivery sink. `Success` is never constructed with an empty record
/// list; callers classify an empty drain as `NoResults` instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success(Vec<Record>),
    /// The provider completed but matched nothing.
    NoResults { search_term: String },
    /// A required configuration or secret key was absent or undecryptable.
    Configuration { reason: String },
    /// The underlying provider call failed.
    Provider { reason: String },
}

impl Outcome {
    /// Classify a successful provider drain, folding empty into `NoResults`.
    pub fn from_records(search_term: &str, records: Vec<Record>) -> Self {
        if records.is_empty() {
            Self::NoResults { search_term: search_term.to_owned() }
        } else {
            Self::Success(records)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

#[cfg(test)]
mod tests {
    use super::Outcome;
    use crate::record::Record;

    #[test]
    fn empty_drain_classifies_as_no_results() {
        let outcome = Outcome::from_records("web-1", Vec::new());
        assert_eq!(outcome, Outcome::NoResults { search_term: "web-1".to_owned() });
    }

    #[test]
    fn non_empty_drain_classifies_as_success() {
        let records = vec![Record::new().with("Name", "web-1")];
        let outcome = Outcome::from_records("web-1", records.clone());
        assert_eq!(outcome, Outcome::Success(records));
        assert!(Outcome::from_records("web-1", vec![Record::new()]).is_success());
    }
}
