/// The authenticated state of the caller behind the current request.
///
/// An [AuthorizationContext] is consumed - never mutated - by token issuance
/// and verification. It is scoped to a single request's authenticated
/// identity; the embedding application constructs one per request from its
/// own session machinery.
pub trait AuthorizationContext: Send + Sync {
    /// A fingerprint of the caller's authenticated session state. The hash
    /// must change whenever the caller's identity or session materially
    /// changes, so that a token bound to it stops validating.
    fn context_hash(&self) -> String;

    /// Whether the caller currently holds the given role.
    fn has_role(&self, role: &str) -> bool;

    /// All roles the caller currently holds, for denial diagnostics.
    fn roles(&self) -> Vec<String>;
}
