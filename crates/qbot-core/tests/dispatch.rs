//! End-to-end dispatch behaviour through the public API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use qbot_core::model::Message;
use qbot_core::{
    DispatchError, Dispatcher, Envelope, EventType, HandlerRegistry, OpCode, routed_event_types,
};

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("handler failed with code {0}")]
struct HandlerFailure(u32);

fn dispatch_envelope(event_type: EventType, raw: &[u8]) -> Envelope {
    Envelope::new(OpCode::Dispatch, event_type, raw.to_vec())
}

/// Registers a spy on every category; each records its own name.
fn spy_registry(calls: &Arc<Mutex<Vec<&'static str>>>) -> HandlerRegistry {
    macro_rules! spy {
        ($registry:ident, $( $setter:ident => $name:literal ),* $(,)?) => {
            $(
                let log = Arc::clone(calls);
                $registry.$setter(move |_, _| {
                    let log = Arc::clone(&log);
                    async move {
                        log.lock().unwrap().push($name);
                        Ok(())
                    }
                });
            )*
        };
    }

    let mut registry = HandlerRegistry::new();
    spy!(registry,
        on_guild => "guild",
        on_channel => "channel",
        on_guild_member => "guild_member",
        on_message => "message",
        on_message_delete => "message_delete",
        on_message_reaction => "message_reaction",
        on_at_message => "at_message",
        on_public_message_delete => "public_message_delete",
        on_direct_message => "direct_message",
        on_direct_message_delete => "direct_message_delete",
        on_audio => "audio",
        on_message_audit => "message_audit",
        on_thread => "thread",
        on_post => "post",
        on_reply => "reply",
        on_forum_audit => "forum_audit",
        on_interaction => "interaction",
        on_c2c_message => "c2c_message",
        on_group_at_message => "group_at_message",
        on_plain => "plain",
    );
    registry
}

#[tokio::test]
async fn every_route_invokes_its_category_once() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = Dispatcher::new(spy_registry(&calls));

    for event_type in routed_event_types() {
        let route = qbot_core::lookup(OpCode::Dispatch, &event_type).unwrap();
        calls.lock().unwrap().clear();

        dispatcher
            .dispatch(dispatch_envelope(event_type.clone(), br#"{"op":0,"d":{}}"#))
            .await
            .unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec![route.category()],
            "event type {event_type}"
        );
    }
}

#[tokio::test]
async fn unrouted_envelope_reaches_plain_with_full_frame() {
    let received = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&received);

    let mut registry = HandlerRegistry::new();
    registry.on_plain(move |envelope, raw| {
        let sink = Arc::clone(&sink);
        async move {
            *sink.lock().unwrap() = Some((envelope.event_type.clone(), raw.to_vec()));
            Ok(())
        }
    });
    let dispatcher = Dispatcher::new(registry);

    let frame = br#"{"op":0,"s":1,"t":"READY","d":{"session_id":"abc"}}"#;
    dispatcher
        .dispatch(Envelope::from_frame(&frame[..]).unwrap())
        .await
        .unwrap();

    let (event_type, raw) = received.lock().unwrap().take().unwrap();
    assert_eq!(event_type, EventType::Ready);
    assert_eq!(raw, frame.to_vec());
}

#[tokio::test]
async fn unrouted_envelope_without_plain_is_dropped() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);

    let mut registry = HandlerRegistry::new();
    registry.on_message(move |_, _| {
        let c = Arc::clone(&c);
        async move {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    });
    let dispatcher = Dispatcher::new(registry);

    // Garbage body: never inspected because nothing handles it.
    let result = dispatcher
        .dispatch(dispatch_envelope(
            EventType::Other("UNKNOWN_EVENT".into()),
            b"not even json",
        ))
        .await;
    assert!(result.is_ok());

    let result = dispatcher
        .dispatch(Envelope::new(OpCode::Hello, EventType::MessageCreate, b"{}".to_vec()))
        .await;
    assert!(result.is_ok());

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_body_is_a_decode_error_and_skips_handler() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = Dispatcher::new(spy_registry(&calls));

    let bodies: [&[u8]; 4] = [
        br#"{"op":0,"d":{"id":123,"content":"hi"}}"#,
        br#"{"op":0}"#,
        br#"{"op":0,"d":null}"#,
        b"{\"op\":0,\"d\":{",
    ];
    for body in bodies {
        let err = dispatcher
            .dispatch(dispatch_envelope(EventType::MessageCreate, body))
            .await
            .unwrap_err();
        assert!(err.is_decode(), "{err}");
    }

    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn null_fields_decode_as_absent() {
    let received: Arc<Mutex<Vec<Message>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let mut registry = HandlerRegistry::new();
    registry.on_message(move |_, msg| {
        let sink = Arc::clone(&sink);
        async move {
            sink.lock().unwrap().push(msg);
            Ok(())
        }
    });
    let dispatcher = Dispatcher::new(registry);

    let frame = br#"{"d":{"id":"m1","content":null,"attachments":null,"mention_everyone":null,"author":null}}"#;
    dispatcher
        .dispatch(dispatch_envelope(EventType::MessageCreate, frame))
        .await
        .unwrap();

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].id, "m1");
    assert_eq!(received[0].content, "");
    assert!(received[0].attachments.is_empty());
    assert!(!received[0].mention_everyone);
    assert!(received[0].author.is_none());
}

#[tokio::test]
async fn decode_error_without_handler_still_surfaces() {
    let dispatcher = Dispatcher::new(HandlerRegistry::new());
    let err = dispatcher
        .dispatch(dispatch_envelope(
            EventType::GuildCreate,
            br#"{"d":{"member_count":"many"}}"#,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Decode(_)));
}

#[tokio::test]
async fn handler_error_is_returned_unchanged() {
    let mut registry = HandlerRegistry::new();
    registry
        .on_interaction(|_, _| async { Err(anyhow::Error::new(HandlerFailure(7))) })
        .on_plain(|_, _| async { Err(anyhow::Error::new(HandlerFailure(9))) });
    let dispatcher = Dispatcher::new(registry);

    let err = dispatcher
        .dispatch(dispatch_envelope(
            EventType::InteractionCreate,
            br#"{"d":{"id":"i1"}}"#,
        ))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "handler failed with code 7");
    let inner = err.into_handler_error().unwrap();
    assert_eq!(inner.downcast_ref::<HandlerFailure>(), Some(&HandlerFailure(7)));

    let err = dispatcher
        .dispatch(dispatch_envelope(EventType::Resumed, b"{}"))
        .await
        .unwrap_err();
    let inner = err.into_handler_error().unwrap();
    assert_eq!(inner.downcast_ref::<HandlerFailure>(), Some(&HandlerFailure(9)));
}

#[tokio::test]
async fn last_registration_wins() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    let mut registry = HandlerRegistry::new();
    let c = Arc::clone(&first);
    registry.on_at_message(move |_, _| {
        let c = Arc::clone(&c);
        async move {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    });
    let c = Arc::clone(&second);
    registry.on_at_message(move |_, _| {
        let c = Arc::clone(&c);
        async move {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    });

    let dispatcher = Dispatcher::new(registry);
    dispatcher
        .dispatch(dispatch_envelope(
            EventType::AtMessageCreate,
            br#"{"d":{"id":"m2"}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn message_create_scenario() {
    let frame = br#"{"d": {"id":"m1","content":"hi"}}"#;

    let received: Arc<Mutex<Vec<Message>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let mut registry = HandlerRegistry::new();
    registry.on_message(move |_, msg| {
        let sink = Arc::clone(&sink);
        async move {
            sink.lock().unwrap().push(msg);
            Ok(())
        }
    });

    Dispatcher::new(registry)
        .dispatch(dispatch_envelope(EventType::MessageCreate, frame))
        .await
        .unwrap();

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].id, "m1");
    assert_eq!(received[0].content, "hi");

    // Same envelope, nothing registered.
    let result = Dispatcher::new(HandlerRegistry::new())
        .dispatch(dispatch_envelope(EventType::MessageCreate, frame))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn concurrent_dispatch_through_clones() {
    let seen = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&seen);

    let mut registry = HandlerRegistry::new();
    registry.on_c2c_message(move |_, _| {
        let c = Arc::clone(&c);
        async move {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    });
    let dispatcher = Dispatcher::new(registry);

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                let frame = format!(r#"{{"d":{{"id":"m{i}"}}}}"#);
                dispatcher
                    .dispatch(dispatch_envelope(
                        EventType::C2cMessageCreate,
                        frame.as_bytes(),
                    ))
                    .await
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }
    assert_eq!(seen.load(Ordering::SeqCst), 8);
}
