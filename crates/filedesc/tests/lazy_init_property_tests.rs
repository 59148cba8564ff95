use filedesc::{
    json_camel_case, Base, File, FileDescriptor, FileL1, FileL2, MessageL2, MessageNode, ParentRef,
};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

fn counted_file(runs: Arc<AtomicUsize>, messages: usize) -> FileDescriptor {
    let mut l1 = FileL1::default();
    for i in 0..messages {
        let id = l1.arena.push_message(MessageNode::new(Base::new(
            format!("M{i}"),
            ParentRef::File,
            i,
        )));
        l1.messages.push(id);
    }
    File::new(l1, Vec::new(), move |_| {
        runs.fetch_add(1, Ordering::SeqCst);
        // Widen the race window.
        thread::yield_now();
        FileL2 {
            messages: (0..messages).map(|_| MessageL2::default()).collect(),
            ..FileL2::default()
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn concurrent_first_access_runs_deferred_pass_once(threads in 1usize..16, messages in 0usize..8) {
        let runs = Arc::new(AtomicUsize::new(0));
        let fd = counted_file(runs.clone(), messages);
        let barrier = Arc::new(Barrier::new(threads));

        let handles: Vec<_> = (0..threads)
            .map(|i| {
                let fd = fd.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    // Different threads enter through different descendants.
                    if messages > 0 {
                        let md = fd.messages().get(i % messages);
                        let _ = md.fields().len();
                    }
                    fd.file().lazy_init() as *const FileL2 as usize
                })
            })
            .collect();

        let ptrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        prop_assert_eq!(runs.load(Ordering::SeqCst), 1);
        prop_assert!(ptrs.windows(2).all(|w| w[0] == w[1]));
        prop_assert!(fd.is_initialized());
    }

    #[test]
    fn camel_case_never_keeps_underscores(name in "[a-z_][a-z0-9_]{0,16}") {
        let json = json_camel_case(&name);
        prop_assert!(!json.contains('_'));
        prop_assert!(json.len() <= name.len());
    }

    #[test]
    fn camel_case_is_identity_on_lower_camel(name in "[a-z][a-zA-Z0-9]{0,16}") {
        prop_assert_eq!(json_camel_case(&name), name);
    }
}
