use uuid::Uuid;

/// The requester does not own the resource they tried to modify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("you are not the author of this resource")]
pub struct NotOwner;

/// Allows the operation only when `requester` owns `resource`.
///
/// `owner` picks the owning user's id out of the resource, so the same
/// check serves articles, comments and anything else with an author.
pub fn ensure_owner<T>(
	resource: &T,
	requester: Uuid,
	owner: impl FnOnce(&T) -> Uuid,
) -> Result<(), NotOwner> {
	if owner(resource) == requester {
		Ok(())
	} else {
		Err(NotOwner)
	}
}
