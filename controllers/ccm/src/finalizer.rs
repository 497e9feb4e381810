//! Finalizer lifecycle
//!
//! The finalizer token is present on a Service exactly while its downstream
//! LoadBalancer exists or its deletion is pending. It is removed only after
//! the LoadBalancer delete succeeded or reported NotFound.

use k8s_openapi::api::core::v1::Service;

/// Finalizer token guarding the downstream LoadBalancer.
pub const LB_FINALIZER_NAME: &str = "kubelb.k8c.io/lb-finalizer";

/// Where a Service stands in the finalizer lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizerState {
    /// No token; nothing downstream to protect
    Unmanaged,
    /// Token just added, first reconcile not finished yet
    Registering,
    /// Token present, downstream kept in sync
    Active,
    /// Deletion requested while the token is present
    Deleting,
}

impl FinalizerState {
    /// State of a Service as read from the store.
    ///
    /// `Registering` is never observed here; it only exists between
    /// [`register`] and the end of the same reconcile.
    pub fn of(service: &Service) -> Self {
        match (has_finalizer(service), service.metadata.deletion_timestamp.is_some()) {
            (true, true) => Self::Deleting,
            (true, false) => Self::Active,
            (false, _) => Self::Unmanaged,
        }
    }
}

pub fn has_finalizer(service: &Service) -> bool {
    service
        .metadata
        .finalizers
        .as_ref()
        .is_some_and(|finalizers| finalizers.iter().any(|f| f == LB_FINALIZER_NAME))
}

/// Appends the token unless present. Returns the resulting state.
pub fn register(service: &mut Service) -> FinalizerState {
    if has_finalizer(service) {
        return FinalizerState::of(service);
    }
    service
        .metadata
        .finalizers
        .get_or_insert_with(Vec::new)
        .push(LB_FINALIZER_NAME.to_string());
    FinalizerState::Registering
}

/// Removes every occurrence of the token. Returns whether anything changed.
pub fn release(service: &mut Service) -> bool {
    let Some(finalizers) = service.metadata.finalizers.as_mut() else {
        return false;
    };
    let before = finalizers.len();
    finalizers.retain(|f| f != LB_FINALIZER_NAME);
    finalizers.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_service, deleting};

    #[test]
    fn test_register_appends_once() {
        let mut service = create_test_service("default", "web", "uid-1", "LoadBalancer", true);
        service.metadata.finalizers = Some(vec!["other/finalizer".to_string()]);

        assert_eq!(register(&mut service), FinalizerState::Registering);
        assert_eq!(register(&mut service), FinalizerState::Active);
        assert_eq!(
            service.metadata.finalizers.unwrap(),
            vec!["other/finalizer".to_string(), LB_FINALIZER_NAME.to_string()]
        );
    }

    #[test]
    fn test_release_keeps_foreign_finalizers() {
        let mut service = create_test_service("default", "web", "uid-1", "LoadBalancer", true);
        service.metadata.finalizers =
            Some(vec![LB_FINALIZER_NAME.to_string(), "other/finalizer".to_string()]);

        assert!(release(&mut service));
        assert!(!release(&mut service));
        assert_eq!(service.metadata.finalizers.unwrap(), vec!["other/finalizer".to_string()]);
    }

    #[test]
    fn test_state_of() {
        let mut service = create_test_service("default", "web", "uid-1", "LoadBalancer", true);
        assert_eq!(FinalizerState::of(&service), FinalizerState::Unmanaged);

        register(&mut service);
        assert_eq!(FinalizerState::of(&service), FinalizerState::Active);

        let service = deleting(service);
        assert_eq!(FinalizerState::of(&service), FinalizerState::Deleting);
    }
}
