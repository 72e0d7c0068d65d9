use thiserror::Error;

use crate::assets::AssetUrlError;
use crate::model::{ProgressError, QuizError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    AssetUrl(#[from] AssetUrlError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProgressPercent;

    #[test]
    fn domain_errors_convert() {
        let err: Error = ProgressPercent::new(140).unwrap_err().into();
        assert!(matches!(err, Error::Progress(ProgressError::OutOfRange(140))));
        let err: Error = "bard".parse::<crate::model::Archetype>().unwrap_err().into();
        assert_eq!(err.to_string(), QuizError::UnknownArchetype("bard".into()).to_string());
    }
}
