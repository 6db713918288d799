//! Registry binding tests against a mocked dispatcher port.

use std::sync::Arc;

use mockall::{Sequence, mock};
use rstest::rstest;
use switchboard::capabilities::{self, echo};
use switchboard::capability::{
    ports::{Dispatcher, DispatcherError, DispatcherResult, Operation, RequestHandler},
    services::{Registry, RegistryConfig, RegistryError, RegistryStatus},
};

mod mocks {
    use super::{Dispatcher, DispatcherResult, Operation, RequestHandler, mock};

    mock! {
        pub Transport {}

        impl Dispatcher for Transport {
            fn register_handler(
                &self,
                operation: Operation,
                handler: RequestHandler,
            ) -> DispatcherResult<()>;
        }
    }
}

use mocks::MockTransport;

#[test]
fn handlers_are_installed_in_operation_order() {
    let mut transport = MockTransport::new();
    let mut sequence = Sequence::new();
    for operation in Operation::ALL {
        transport
            .expect_register_handler()
            .withf(move |candidate, _| *candidate == operation)
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _| Ok(()));
    }
    let registry = Registry::new(RegistryConfig::default());
    capabilities::bootstrap(&registry).expect("bundled capabilities register");

    let summary = registry
        .bind_dispatcher(Arc::new(transport))
        .expect("binding succeeds");

    assert_eq!(summary.action_count(), 2);
    assert_eq!(summary.template_count(), 2);
    assert_eq!(registry.status(), RegistryStatus::Ready);
}

#[rstest]
#[case(Operation::ListActions)]
#[case(Operation::InvokeAction)]
#[case(Operation::ListTemplates)]
#[case(Operation::GenerateTemplate)]
fn any_wiring_failure_moves_the_registry_to_error(#[case] failing: Operation) {
    let mut transport = MockTransport::new();
    transport
        .expect_register_handler()
        .returning(move |operation, _| {
            if operation == failing {
                Err(DispatcherError::HandlerAlreadyRegistered(operation))
            } else {
                Ok(())
            }
        });
    let registry = Registry::new(RegistryConfig::default());

    let error = registry
        .bind_dispatcher(Arc::new(transport))
        .expect_err("binding fails");

    assert!(matches!(
        error,
        RegistryError::Initialization(DispatcherError::HandlerAlreadyRegistered(operation))
            if operation == failing
    ));
    assert_eq!(registry.status(), RegistryStatus::Error);
    assert!(registry.last_error().is_some());
}

#[test]
fn errored_registry_rejects_further_changes() {
    let mut transport = MockTransport::new();
    transport
        .expect_register_handler()
        .withf(|operation, _| *operation == Operation::ListActions)
        .returning(|_, _| Err(DispatcherError::Unavailable("closed".to_owned())));
    let registry = Registry::new(RegistryConfig::default());
    let bound = registry.bind_dispatcher(Arc::new(transport));
    assert!(bound.is_err());

    let register = registry.register_action(echo::capability().expect("echo builds"));
    let unregister = registry.unregister_action("echo");
    let rebind = registry.bind_dispatcher(Arc::new(MockTransport::new()));

    assert!(matches!(register, Err(RegistryError::Errored)));
    assert!(matches!(unregister, Err(RegistryError::Errored)));
    assert!(matches!(rebind, Err(RegistryError::Errored)));
}
