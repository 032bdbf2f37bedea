use crate::errors::GenUiError;

/// Generic adapter behavior options.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AdapterOptions {
    /// Bounded UI update buffer between the adapter task and the reader.
    pub ui_buffer_capacity: usize,
}

impl AdapterOptions {
    pub fn ui_buffer_capacity(mut self, capacity: usize) -> Self {
        self.ui_buffer_capacity = capacity;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), GenUiError> {
        if self.ui_buffer_capacity == 0 {
            return Err(GenUiError::Validation(
                "ui_buffer_capacity must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            ui_buffer_capacity: 128,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_buffer_capacity() {
        assert_eq!(AdapterOptions::default().ui_buffer_capacity, 128);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = AdapterOptions::default().ui_buffer_capacity(0).validate();
        assert!(matches!(err, Err(GenUiError::Validation(msg)) if msg.contains("ui_buffer_capacity")));
    }
}
