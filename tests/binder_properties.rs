// Property tests for resubscription decisions over arbitrary prop sequences.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dao_header::subscription::source::Source;
use dao_header::subscription::{Phase, SubscriptionBinder, SubscriptionSpec};
use proptest::prelude::*;

#[derive(Debug, Clone, PartialEq)]
struct Props {
    id: u8,
    noise: u8,
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("test runtime")
}

fn binder(calls: &Arc<AtomicUsize>) -> SubscriptionBinder<Props, u8, Option<u8>> {
    let calls = calls.clone();
    let spec = SubscriptionSpec::new(
        move |props: &Props| {
            calls.fetch_add(1, Ordering::SeqCst);
            if props.id == 0 {
                Ok(Source::pending())
            } else {
                Ok(Source::once(props.id))
            }
        },
        |_, sub| Some(*sub.data),
    )
    .resubscribe_when(|old: &Props, new: &Props| old.id != new.id);
    SubscriptionBinder::new(spec)
}

fn props_strategy() -> impl Strategy<Value = Props> {
    (0..3_u8, any::<u8>()).prop_map(|(id, noise)| Props { id, noise })
}

proptest! {
    #[test]
    fn resubscribes_exactly_when_predicate_holds(
        first in props_strategy(),
        updates in prop::collection::vec(props_strategy(), 0..32),
    ) {
        let rt = runtime();
        let _guard = rt.enter();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut binder = binder(&calls);

        binder.attach(first.clone());
        let mut expected_calls = 1;
        let mut previous = first;

        for update in updates {
            let handle_before = binder.handle_id();
            let resubscribe = previous.id != update.id;
            binder.on_props_changed(update.clone());

            if resubscribe {
                expected_calls += 1;
                prop_assert!(binder.handle_id() > handle_before);
            } else {
                prop_assert_eq!(binder.handle_id(), handle_before);
            }
            prop_assert_eq!(calls.load(Ordering::SeqCst), expected_calls);
            prop_assert_eq!(binder.props(), Some(&update));
            previous = update;
        }
    }

    #[test]
    fn phase_follows_latest_subscription(
        updates in prop::collection::vec(props_strategy(), 1..16),
    ) {
        let rt = runtime();
        let _guard = rt.enter();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut binder = binder(&calls);

        binder.attach(updates[0].clone());
        for update in &updates[1..] {
            binder.on_props_changed(update.clone());
        }

        // Sources for id 0 never emit; any other id emits itself.
        let current = updates[updates.len() - 1].id;
        if current == 0 {
            prop_assert_eq!(binder.phase(), Phase::Loading);
            prop_assert_eq!(binder.render(), None);
        } else {
            prop_assert_eq!(binder.phase(), Phase::Ready);
            prop_assert_eq!(binder.value(), Some(&current));
        }
    }

    #[test]
    fn detach_is_idempotent(times in 1..4_usize, first in props_strategy()) {
        let rt = runtime();
        let _guard = rt.enter();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut binder = binder(&calls);

        binder.attach(first);
        for _ in 0..times {
            binder.detach();
            prop_assert_eq!(binder.phase(), Phase::Detached);
            prop_assert_eq!(binder.handle_id(), None);
            prop_assert_eq!(binder.props(), None);
        }
        prop_assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
