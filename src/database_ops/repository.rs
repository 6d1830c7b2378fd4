use crate::database_ops::entities::Entity;
use crate::database_ops::error::StoreError;
use crate::database_ops::tracked::{Changed, Tracked};

/// Find-or-create plus save for one entity type.
///
/// `find_or_create` never writes: a missing row comes back as an unsaved
/// [`Tracked`] built from the filter. `save` writes only when the row is new or
/// modified and reports which of the three happened.
pub trait Repository<E: Entity> {
    fn find_or_create(&mut self, filter: &E::Filter) -> Result<Tracked<E>, StoreError>;

    fn save(&mut self, row: &mut Tracked<E>) -> Result<Changed, StoreError>;
}

impl<E, R> Repository<E> for &mut R
where
    E: Entity,
    R: Repository<E> + ?Sized,
{
    fn find_or_create(&mut self, filter: &E::Filter) -> Result<Tracked<E>, StoreError> {
        Repository::<E>::find_or_create(&mut **self, filter)
    }

    fn save(&mut self, row: &mut Tracked<E>) -> Result<Changed, StoreError> {
        Repository::<E>::save(&mut **self, row)
    }
}
