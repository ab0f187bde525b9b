use crate::world_result::ComponentError;

/// Storage for singleton kinds: one value per world, readable through any
/// entity once set.
pub(crate) struct SingletonStorage<T> {
    value: Option<T>,
}

impl<T> SingletonStorage<T> {
    pub(crate) fn new() -> SingletonStorage<T> {
        SingletonStorage { value: None }
    }

    pub(crate) fn is_set(&self) -> bool {
        self.value.is_some()
    }

    pub(crate) fn insert(&mut self, value: T) -> Result<(), ComponentError> {
        if self.value.is_some() {
            return Err(ComponentError::AlreadyPresent);
        }
        self.value = Some(value);
        Ok(())
    }

    pub(crate) fn overwrite(&mut self, value: T) -> Result<(), ComponentError> {
        if self.value.is_none() {
            return Err(ComponentError::Missing);
        }
        self.value = Some(value);
        Ok(())
    }

    /// Returns true when the value was newly set.
    pub(crate) fn upsert(&mut self, value: T) -> bool {
        let added = self.value.is_none();
        self.value = Some(value);
        added
    }

    pub(crate) fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub(crate) fn get_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }

    pub(crate) fn clear(&mut self) -> usize {
        match self.value.take() {
            Some(_) => 1,
            None => 0,
        }
    }
}
