use crate::error::{validation, HardwareError};
use gatehouse_common::{HardwareAuthority, Location};
use gatehouse_config::Session;

/// Picks the location an operator acts on.
///
/// Super-admins may name any location and must name one if their session has
/// none. Everyone else is pinned to the session's location.
pub fn resolve_location(session: &Session, requested: Option<&str>) -> Result<String, HardwareError> {
    let requested = requested.map(str::trim).filter(|id| !id.is_empty());
    let home = session
        .location_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    match (requested, home) {
        (Some(requested), _) if session.can_select_location() => Ok(requested.to_string()),
        (Some(requested), Some(home)) if requested == home => Ok(home.to_string()),
        (Some(_), _) => Err(validation(
            "Only super-admins can act on another location",
        )),
        (None, Some(home)) => Ok(home.to_string()),
        (None, None) if session.can_select_location() => {
            Err(validation("Select a location with --location"))
        }
        (None, None) => Err(validation("The session has no location assigned")),
    }
}

/// Lists every location. Restricted to super-admins.
pub async fn list_locations<A>(authority: &A, session: &Session) -> Result<Vec<Location>, HardwareError>
where
    A: HardwareAuthority<Error = HardwareError>,
{
    if !session.can_select_location() {
        return Err(validation("Only super-admins can list locations"));
    }
    authority.list_locations().await
}
