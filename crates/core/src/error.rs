use thiserror::Error;

use crate::model::{ItemError, ParseIdError, QuizResultError, QuizSettingsError};

/// Any validation failure raised by the domain model.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Item(#[from] ItemError),
    #[error(transparent)]
    Id(#[from] ParseIdError),
    #[error(transparent)]
    QuizResult(#[from] QuizResultError),
    #[error(transparent)]
    Settings(#[from] QuizSettingsError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemDraft, ItemId, QuizSettings, SetId};

    fn validate_all() -> Result<(), Error> {
        SetId::new("n5")?;
        QuizSettings::new(10, 4)?;
        ItemDraft {
            id: ItemId::new("x")?,
            kanji: "木".into(),
            readings: Vec::new(),
            meanings: Vec::new(),
            set_id: None,
            examples: Vec::new(),
        }
        .validate()?;
        Ok(())
    }

    #[test]
    fn model_errors_convert_into_aggregate() {
        assert!(matches!(validate_all(), Err(Error::Item(ItemError::NoMeanings(_)))));
        assert!(matches!(
            QuizSettings::new(0, 4).map_err(Error::from),
            Err(Error::Settings(_))
        ));
        assert!(matches!(ItemId::new(" ").map_err(Error::from), Err(Error::Id(_))));
    }
}
