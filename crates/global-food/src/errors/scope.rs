/// Where an error is allowed to travel.
///
/// | Scope | Returned from `search`? | Recorded in provider status? |
/// |-------|-------------------------|------------------------------|
/// | `Provider` | No | Yes |
/// | `Search` | Yes | No |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorScope {
    /// Belongs to one provider. Siblings and the overall search carry on.
    Provider,

    /// Ends the search call.
    Search,
}
